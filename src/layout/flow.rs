//! Flowing tagged text into bordered, padded, justified blocks that continue
//! across pages.

use crate::layout::breaker::{Line, LineBreaker};
use crate::layout::config::FlowConfig;
use crate::layout::margins::Padding;
use crate::layout::render::{render_line, Align};
use crate::layout::style::{Style, StyleRegistry};
use crate::layout::surface::{Border, Cell, Surface};
use crate::layout::tags::{TagParser, DEFAULT_TAG};
use crate::units::Pt;
use crate::PDFError;
use std::collections::VecDeque;

/// Most page breaks a single flow call may perform
pub const PAGE_BREAK_LIMIT: usize = 9999;

/// Width used when measuring text without a width constraint
pub const UNBOUNDED_WIDTH: Pt = Pt(999_999.0);

/// Geometry and decoration of a flowed block of text
#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    /// Width of the block including padding; zero spans to the right margin
    pub width: Pt,
    pub line_height: Pt,
    pub border: Border,
    pub align: Align,
    pub fill: bool,
    pub padding: Padding,
}

impl Block {
    /// An unframed, justified block
    pub fn new<W: Into<Pt>, H: Into<Pt>>(width: W, line_height: H) -> Block {
        Block {
            width: width.into(),
            line_height: line_height.into(),
            border: Border::NONE,
            align: Align::Justify,
            fill: false,
            padding: Padding::empty(),
        }
    }

    pub fn with_border(mut self, border: Border) -> Block {
        self.border = border;
        self
    }

    pub fn with_align(mut self, align: Align) -> Block {
        self.align = align;
        self
    }

    pub fn with_fill(mut self, fill: bool) -> Block {
        self.fill = fill;
        self
    }

    pub fn with_padding(mut self, padding: Padding) -> Block {
        self.padding = padding;
        self
    }
}

/// Lays out markup on a [Surface], using the styles of a [StyleRegistry]
///
/// ```
/// use pdf_flow::layout::{Block, FlowConfig, Recorder, Style, StyleRegistry, TextFlow};
/// use pdf_flow::{colours, Pt};
///
/// let config = FlowConfig::default();
/// let mut styles = StyleRegistry::new();
/// styles.set_style("b", "", "B", "100%", "").unwrap();
/// let mut surface = Recorder::default();
///
/// let base = Style::new("mono", "", Pt(10.0), colours::BLACK);
/// let mut flow = TextFlow::new(&mut surface, &mut styles, &config);
/// flow.flow(&base, &Block::new(Pt(100.0), Pt(12.0)), "some <b>bold</b> text")
///     .unwrap();
///
/// assert_eq!(surface.text_cells().count(), 3);
/// ```
pub struct TextFlow<'a, S: Surface> {
    surface: &'a mut S,
    styles: &'a mut StyleRegistry,
    config: &'a FlowConfig,
}

impl<'a, S: Surface> TextFlow<'a, S> {
    pub fn new(
        surface: &'a mut S,
        styles: &'a mut StyleRegistry,
        config: &'a FlowConfig,
    ) -> TextFlow<'a, S> {
        TextFlow {
            surface,
            styles,
            config,
        }
    }

    /// Break `markup` into lines at most `width` wide without drawing anything.
    /// A width of zero uses the room between the cursor and the right margin.
    pub fn measure_lines(
        &mut self,
        base: &Style,
        width: Pt,
        markup: &str,
    ) -> Result<Vec<Line>, PDFError> {
        self.styles.seed(base);
        let runs = TagParser::new(self.config).parse(markup);
        let mut breaker = LineBreaker::new(self.config, runs);

        let mut lines = Vec::new();
        while !breaker.is_finished() {
            lines.push(breaker.next_line(&mut *self.surface, &mut *self.styles, width)?);
        }
        self.styles.apply(&mut *self.surface, DEFAULT_TAG)?;
        Ok(lines)
    }

    /// Lay out `markup` as a block starting at the cursor, breaking to new pages
    /// as needed. The cursor ends below the block, at the left margin.
    pub fn flow(&mut self, base: &Style, block: &Block, markup: &str) -> Result<(), PDFError> {
        let width = self.block_width(block);
        let text_width = width - self.effective_padding(block, width).horizontal();
        let lines = self.measure_lines(base, text_width, markup)?;
        self.flow_lines(base, block, lines)
    }

    /// Lay out lines produced by [TextFlow::measure_lines] as a block starting
    /// at the cursor
    pub fn flow_lines(
        &mut self,
        base: &Style,
        block: &Block,
        lines: Vec<Line>,
    ) -> Result<(), PDFError> {
        self.styles.seed(base);
        let start_x = self.surface.x();
        let mut pending: VecDeque<Line> = lines.into();
        let mut first_chunk = true;

        for _ in 0..PAGE_BREAK_LIMIT {
            let room = self.surface.remaining_height() - block.padding.vertical();
            let capacity = if block.line_height > Pt::ZERO {
                (room / block.line_height).floor().max(0.0) as usize
            } else {
                usize::MAX
            };

            let page_break = pending.len() > capacity && self.surface.accept_page_break();
            let take = if page_break { capacity } else { pending.len() };
            let chunk: Vec<Line> = pending.drain(..take).collect();

            self.render_chunk(block, &chunk, first_chunk, !page_break)?;
            if !page_break {
                return Ok(());
            }

            log::debug!(
                "{} lines placed, {} continue on a new page",
                chunk.len(),
                pending.len()
            );
            self.surface.before_page_break();
            self.surface.start_new_page()?;
            self.surface.after_page_break();
            self.surface.set_x(start_x);
            first_chunk &= chunk.is_empty();
        }

        log::warn!("giving up after {PAGE_BREAK_LIMIT} page breaks");
        Err(PDFError::PaginationRunaway(PAGE_BREAK_LIMIT))
    }

    /// Width of the widest line of `markup` when broken at `width`, or when only
    /// broken at newlines if `width` is `None`
    pub fn max_line_width(
        &mut self,
        base: &Style,
        markup: &str,
        width: Option<Pt>,
    ) -> Result<Pt, PDFError> {
        let lines = self.measure_lines(base, width.unwrap_or(UNBOUNDED_WIDTH), markup)?;
        Ok(lines
            .iter()
            .map(Line::width)
            .fold(Pt::ZERO, Pt::max))
    }

    /// Height `markup` would take up when flowed at `width` with the given line
    /// height, padding excluded
    pub fn block_height(
        &mut self,
        base: &Style,
        width: Pt,
        line_height: Pt,
        markup: &str,
    ) -> Result<Pt, PDFError> {
        let lines = self.measure_lines(base, width, markup)?;
        Ok(line_height * lines.len() as f32)
    }

    fn block_width(&self, block: &Block) -> Pt {
        if block.width == Pt::ZERO {
            let (page_width, _) = self.surface.page_size();
            page_width - self.surface.margins().right - self.surface.x()
        } else {
            block.width
        }
    }

    /// Padding that doesn't fit horizontally is dropped on the left and right
    fn effective_padding(&self, block: &Block, width: Pt) -> Padding {
        if block.padding.horizontal() > width {
            block.padding.without_horizontal()
        } else {
            block.padding
        }
    }

    /// Draws the lines that go on one page. Top padding and the top edge only
    /// belong to the first line of the block, bottom padding and the bottom edge
    /// only to its last.
    fn render_chunk(
        &mut self,
        block: &Block,
        lines: &[Line],
        first_chunk: bool,
        last_chunk: bool,
    ) -> Result<(), PDFError> {
        let width = self.block_width(block);
        let padding = self.effective_padding(block, width);
        let text_width = width - padding.horizontal();
        let start_x = self.surface.x();

        let sides = block.border.sides();
        let mut top_edges = sides.with_top(block.border.top);
        let mut single_edges = block.border;
        let bottom_edges = sides.with_bottom(block.border.bottom);

        for (index, line) in lines.iter().enumerate() {
            let first = first_chunk && index == 0;
            let last = last_chunk && index + 1 == lines.len();

            if first && padding.top > Pt::ZERO {
                let (x, y) = self.surface.position();
                self.surface.draw_cell(
                    &Cell::empty(width, padding.top)
                        .with_border(top_edges)
                        .with_fill(block.fill),
                )?;
                top_edges.top = false;
                single_edges.top = false;
                self.surface.set_position(x, y + padding.top);
            }

            if block.fill {
                self.surface
                    .draw_cell(&Cell::empty(width, block.line_height).with_fill(true))?;
                self.surface.set_x(start_x);
            }

            let align = if last && block.align == Align::Justify {
                Align::Left
            } else {
                block.align
            };
            self.surface.set_x(start_x + padding.left);
            render_line(
                &mut *self.surface,
                &mut *self.styles,
                text_width,
                block.line_height,
                line,
                align,
            )?;

            let edges = match (first, last) {
                (true, true) => single_edges,
                (true, false) => top_edges,
                (false, true) => bottom_edges,
                (false, false) => sides,
            };
            self.surface.set_x(start_x);
            if last && padding.bottom > Pt::ZERO {
                self.surface.draw_cell(
                    &Cell::empty(width, block.line_height)
                        .with_border(edges.with_bottom(false))
                        .below(),
                )?;
                self.surface.set_x(start_x);
                self.surface.draw_cell(
                    &Cell::empty(width, padding.bottom)
                        .with_border(sides.with_bottom(block.border.bottom))
                        .with_fill(block.fill)
                        .below(),
                )?;
            } else {
                self.surface.draw_cell(
                    &Cell::empty(width, block.line_height)
                        .with_border(edges)
                        .below(),
                )?;
            }
        }

        self.styles.apply(&mut *self.surface, DEFAULT_TAG)?;
        let left = self.surface.margins().left;
        self.surface.set_x(left);
        Ok(())
    }
}
