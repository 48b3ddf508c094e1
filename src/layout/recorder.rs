//! A [Surface] that draws nothing and remembers everything.
//!
//! Glyph widths come from a simple table in em units, scaled by the style's size,
//! which makes layouts easy to predict: with the default metrics every glyph is
//! half an em wide.

use crate::layout::margins::Margins;
use crate::layout::style::Style;
use crate::layout::surface::{Border, Cell, CellAdvance, Surface};
use crate::pagesize::{PageSize, A4};
use crate::units::Pt;
use crate::PDFError;
use std::collections::HashMap;

/// A cell as it was drawn
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedCell {
    /// 0-based index of the page the cell is on
    pub page: usize,
    pub x: Pt,
    pub y: Pt,
    pub width: Pt,
    pub height: Pt,
    pub text: String,
    pub border: Border,
    pub fill: bool,
    pub link: Option<String>,
    pub word_spacing: Pt,
    /// Tag of the style active when the cell was drawn
    pub tag: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Recorded {
    Style(Style),
    Cell(RecordedCell),
    PageBreak,
}

#[derive(Debug, Clone)]
pub struct Recorder {
    pub page_size: PageSize,
    pub margins: Margins,
    /// Whether [Surface::accept_page_break] says yes
    pub accept_breaks: bool,
    /// Width of glyphs missing from the width table, in em
    pub default_em: f32,
    widths: HashMap<char, f32>,
    x: Pt,
    y: Pt,
    page: usize,
    word_spacing: Pt,
    style: Option<Style>,
    pub events: Vec<Recorded>,
}

impl Default for Recorder {
    fn default() -> Self {
        Recorder::new(A4, Margins::empty())
    }
}

impl Recorder {
    /// A recorder with its cursor at the top-left margin of the first page
    pub fn new(page_size: PageSize, margins: Margins) -> Recorder {
        Recorder {
            page_size,
            margins,
            accept_breaks: true,
            default_em: 0.5,
            widths: HashMap::new(),
            x: margins.left,
            y: margins.top,
            page: 0,
            word_spacing: Pt::ZERO,
            style: None,
            events: Vec::new(),
        }
    }

    pub fn with_glyph_width(mut self, ch: char, em: f32) -> Recorder {
        self.widths.insert(ch, em);
        self
    }

    pub fn with_page_breaks(mut self, accept: bool) -> Recorder {
        self.accept_breaks = accept;
        self
    }

    /// 0-based index of the current page
    pub fn page(&self) -> usize {
        self.page
    }

    pub fn word_spacing(&self) -> Pt {
        self.word_spacing
    }

    pub fn style(&self) -> Option<&Style> {
        self.style.as_ref()
    }

    pub fn cells(&self) -> impl Iterator<Item = &RecordedCell> {
        self.events.iter().filter_map(|e| match e {
            Recorded::Cell(cell) => Some(cell),
            _ => None,
        })
    }

    /// Cells that carry text
    pub fn text_cells(&self) -> impl Iterator<Item = &RecordedCell> {
        self.cells().filter(|c| !c.text.is_empty())
    }

    /// Tags of every style activation, in order
    pub fn activated_tags(&self) -> Vec<&str> {
        self.events
            .iter()
            .filter_map(|e| match e {
                Recorded::Style(style) => Some(style.tag.as_str()),
                _ => None,
            })
            .collect()
    }

    pub fn page_breaks(&self) -> usize {
        self.events
            .iter()
            .filter(|e| matches!(e, Recorded::PageBreak))
            .count()
    }
}

impl Surface for Recorder {
    fn advance(&mut self, style: &Style, ch: char) -> Result<Pt, PDFError> {
        let em = self.widths.get(&ch).copied().unwrap_or(self.default_em);
        Ok(style.size * em)
    }

    fn activate_style(&mut self, style: &Style) -> Result<(), PDFError> {
        self.style = Some(style.clone());
        self.events.push(Recorded::Style(style.clone()));
        Ok(())
    }

    fn position(&self) -> (Pt, Pt) {
        (self.x, self.y)
    }

    fn set_position(&mut self, x: Pt, y: Pt) {
        self.x = x;
        self.y = y;
    }

    fn page_size(&self) -> (Pt, Pt) {
        self.page_size
    }

    fn margins(&self) -> Margins {
        self.margins
    }

    fn set_word_spacing(&mut self, spacing: Pt) {
        self.word_spacing = spacing;
    }

    fn draw_cell(&mut self, cell: &Cell<'_>) -> Result<(), PDFError> {
        self.events.push(Recorded::Cell(RecordedCell {
            page: self.page,
            x: self.x,
            y: self.y,
            width: cell.width,
            height: cell.height,
            text: cell.text.to_string(),
            border: cell.border,
            fill: cell.fill,
            link: cell.link.map(str::to_string),
            word_spacing: self.word_spacing,
            tag: self.style.as_ref().map(|s| s.tag.clone()),
        }));
        match cell.advance {
            CellAdvance::Right => self.x += cell.width,
            CellAdvance::Below => self.y += cell.height,
        }
        Ok(())
    }

    fn accept_page_break(&mut self) -> bool {
        self.accept_breaks
    }

    fn start_new_page(&mut self) -> Result<(), PDFError> {
        self.page += 1;
        self.x = self.margins.left;
        self.y = self.margins.top;
        self.events.push(Recorded::PageBreak);
        Ok(())
    }
}
