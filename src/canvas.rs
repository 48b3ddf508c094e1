//! A [Surface] that draws into a PDF [Document].

use crate::colour::{colours, Colour};
use crate::document::Document;
use crate::font::Font;
use crate::layout::{Border, Cell, CellAdvance, Margins, Style, Surface};
use crate::page::{Page, TextSpan};
use crate::pagesize::PageSize;
use crate::rect::Rect;
use crate::units::Pt;
use crate::PDFError;
use id_arena::Id;
use std::collections::HashMap;
use std::io::Write;

#[derive(Debug, Clone, Copy)]
struct ActiveFont {
    id: Id<Font>,
    size: Pt,
    colour: Colour,
}

fn family_key(family: &str) -> String {
    family.trim().to_ascii_uppercase()
}

/// Variants are order-insensitive: `"BI"` and `"ib"` name the same face
fn variant_key(variant: &str) -> String {
    let mut letters: Vec<char> = variant
        .trim()
        .chars()
        .map(|c| c.to_ascii_uppercase())
        .collect();
    letters.sort_unstable();
    letters.dedup();
    letters.into_iter().collect()
}

/// Draws cells onto the pages of a PDF document, cell by cell, the way a pen moves
/// across paper: the cursor is kept top-down and converted to PDF page space when
/// something is drawn.
///
/// Fonts are registered under a family and variant, which is how styles refer to them.
///
/// ```no_run
/// use pdf_flow::layout::{Block, FlowConfig, Margins, Style, StyleRegistry, TextFlow};
/// use pdf_flow::{colours, pagesize, Font, PdfCanvas, Pt};
///
/// let regular = Font::load(std::fs::read("fonts/Sans-Regular.ttf").unwrap()).unwrap();
/// let bold = Font::load(std::fs::read("fonts/Sans-Bold.ttf").unwrap()).unwrap();
///
/// let mut canvas = PdfCanvas::new(pagesize::A4, Margins::all(Pt(56.0)));
/// canvas.add_font("sans", "", regular);
/// canvas.add_font("sans", "B", bold);
/// canvas.add_page();
///
/// let config = FlowConfig::default();
/// let mut styles = StyleRegistry::new();
/// styles.set_style("b", "sans", "B", "100%", "").unwrap();
///
/// let base = Style::new("sans", "", Pt(11.0), colours::BLACK);
/// TextFlow::new(&mut canvas, &mut styles, &config)
///     .flow(&base, &Block::new(Pt(0.0), Pt(14.0)), "Hello <b>world</b>!")
///     .unwrap();
///
/// canvas.write(std::fs::File::create("hello.pdf").unwrap()).unwrap();
/// ```
pub struct PdfCanvas {
    document: Document,
    families: HashMap<(String, String), Id<Font>>,
    page_size: PageSize,
    margins: Margins,
    page: Option<Id<Page>>,
    x: Pt,
    y: Pt,
    font: Option<ActiveFont>,
    word_spacing: Pt,
    /// Colour cell backgrounds are filled with
    pub fill_colour: Colour,
    /// Colour of cell borders
    pub draw_colour: Colour,
    /// Width of cell borders
    pub line_width: Pt,
    /// Whether text flows may continue onto new pages
    pub auto_page_break: bool,
}

impl PdfCanvas {
    /// A canvas on a new, empty document. Pages added to it get the given size and
    /// margins.
    pub fn new(page_size: PageSize, margins: Margins) -> PdfCanvas {
        PdfCanvas::with_document(Document::default(), page_size, margins)
    }

    pub fn with_document(document: Document, page_size: PageSize, margins: Margins) -> PdfCanvas {
        PdfCanvas {
            document,
            families: HashMap::new(),
            page_size,
            margins,
            page: None,
            x: margins.left,
            y: margins.top,
            font: None,
            word_spacing: Pt::ZERO,
            fill_colour: colours::WHITE,
            draw_colour: colours::BLACK,
            line_width: Pt(0.567),
            auto_page_break: true,
        }
    }

    /// Register `font` as the `variant` (e.g. `""`, `"B"`, `"I"`, `"BI"`) of `family`
    pub fn add_font(&mut self, family: &str, variant: &str, font: Font) -> Id<Font> {
        let id = self.document.add_font(font);
        self.families
            .insert((family_key(family), variant_key(variant)), id);
        id
    }

    /// Start a new page and put the cursor at its top-left margin
    pub fn add_page(&mut self) -> Id<Page> {
        let id = self.document.add_page(Page::new(self.page_size, self.margins));
        self.page = Some(id);
        self.x = self.margins.left;
        self.y = self.margins.top;
        id
    }

    /// The page currently drawn on
    pub fn page(&self) -> Option<&Page> {
        self.page.and_then(|id| self.document.pages.get(id))
    }

    pub fn page_count(&self) -> usize {
        self.document.page_count()
    }

    pub fn set_fill_colour(&mut self, colour: Colour) {
        self.fill_colour = colour;
    }

    pub fn set_draw_colour(&mut self, colour: Colour) {
        self.draw_colour = colour;
    }

    pub fn set_line_width<W: Into<Pt>>(&mut self, width: W) {
        self.line_width = width.into();
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn into_document(self) -> Document {
        self.document
    }

    /// Write the document drawn so far
    pub fn write<W: Write>(self, w: W) -> Result<(), PDFError> {
        self.document.write(w)
    }

    /// The font registered for a style's family and variant, falling back to the
    /// family's regular face
    fn font_for(&self, style: &Style) -> Result<Id<Font>, PDFError> {
        let family = family_key(&style.family);
        let variant = variant_key(&style.variant);
        if let Some(&id) = self.families.get(&(family.clone(), variant.clone())) {
            return Ok(id);
        }
        match self.families.get(&(family, String::new())) {
            Some(&id) => Ok(id),
            None => Err(PDFError::UnknownFont {
                family: style.family.clone(),
                variant: style.variant.clone(),
            }),
        }
    }

    fn stroke_border(&mut self, page_id: Id<Page>, border: Border, rect: Rect) {
        let Some(page) = self.document.pages.get_mut(page_id) else {
            return;
        };
        let (left, bottom, right, top) = (rect.x1, rect.y1, rect.x2, rect.y2);
        let sides = [
            (border.left, (left, top), (left, bottom)),
            (border.top, (left, top), (right, top)),
            (border.right, (right, top), (right, bottom)),
            (border.bottom, (left, bottom), (right, bottom)),
        ];
        for (on, from, to) in sides {
            if on {
                page.stroke_line(from, to, self.line_width, self.draw_colour);
            }
        }
    }
}

impl Surface for PdfCanvas {
    fn advance(&mut self, style: &Style, ch: char) -> Result<Pt, PDFError> {
        let id = self.font_for(style)?;
        Ok(self.document.fonts[id].advance(ch, style.size))
    }

    fn activate_style(&mut self, style: &Style) -> Result<(), PDFError> {
        let id = self.font_for(style)?;
        if !self
            .families
            .contains_key(&(family_key(&style.family), variant_key(&style.variant)))
        {
            log::warn!(
                "no `{}` variant of font family `{}`, using the regular face",
                style.variant,
                style.family
            );
        }
        self.font = Some(ActiveFont {
            id,
            size: style.size,
            colour: style.colour,
        });
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
        let page_id = self.page.ok_or(PDFError::NoPage)?;
        let page_height = self
            .document
            .pages
            .get(page_id)
            .ok_or(PDFError::PageMissing)?
            .height();

        let top = page_height - self.y;
        let area = Rect::from_origin_size(self.x, top - cell.height, cell.width, cell.height);

        if cell.fill {
            if let Some(page) = self.document.pages.get_mut(page_id) {
                page.fill_rect(area, self.fill_colour);
            }
        }
        if !cell.border.is_empty() {
            self.stroke_border(page_id, cell.border, area);
        }

        if !cell.text.is_empty() {
            let font = self.font.ok_or(PDFError::NoActiveStyle)?;
            let baseline = top - cell.height / 2.0 - font.size * 0.3;
            let page = self
                .document
                .pages
                .get_mut(page_id)
                .ok_or(PDFError::PageMissing)?;
            page.add_text(TextSpan {
                text: cell.text.to_string(),
                font: font.id,
                size: font.size,
                colour: font.colour,
                word_spacing: self.word_spacing,
                origin: (self.x, baseline),
            });
            if let Some(uri) = cell.link {
                page.add_link(area, uri);
            }
        }

        match cell.advance {
            CellAdvance::Right => self.x += cell.width,
            CellAdvance::Below => self.y += cell.height,
        }
        Ok(())
    }

    fn accept_page_break(&mut self) -> bool {
        self.auto_page_break
    }

    fn start_new_page(&mut self) -> Result<(), PDFError> {
        self.add_page();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::page::PageContents;
    use crate::pagesize::LETTER;

    fn canvas() -> PdfCanvas {
        let mut canvas = PdfCanvas::new(LETTER, Margins::all(Pt(72.0)));
        canvas.add_page();
        canvas
    }

    #[test]
    fn variants_are_order_insensitive() {
        assert_eq!(variant_key("ib"), "BI");
        assert_eq!(variant_key(" B "), "B");
        assert_eq!(family_key(" Sans "), "SANS");
    }

    #[test]
    fn cells_become_fills_and_strokes() {
        let mut canvas = canvas();
        canvas
            .draw_cell(
                &Cell::empty(Pt(100.0), Pt(20.0))
                    .with_border(Border::ALL.sides())
                    .with_fill(true)
                    .below(),
            )
            .unwrap();
        assert_eq!(canvas.position(), (Pt(72.0), Pt(92.0)));

        let contents = &canvas.page().unwrap().contents;
        assert_eq!(contents.len(), 3);
        match &contents[0] {
            PageContents::Fill { rect, .. } => {
                assert_eq!(rect.y2, Pt(11.0 * 72.0 - 72.0));
                assert_eq!(rect.height(), Pt(20.0));
            }
            other => panic!("expected a fill, got {other:?}"),
        }
    }

    #[test]
    fn drawing_needs_a_page_and_a_font() {
        let mut canvas = PdfCanvas::new(LETTER, Margins::empty());
        assert!(matches!(
            canvas.draw_cell(&Cell::empty(Pt(1.0), Pt(1.0))),
            Err(PDFError::NoPage)
        ));
        canvas.add_page();
        assert!(matches!(
            canvas.draw_cell(&Cell::text(Pt(10.0), Pt(10.0), "x")),
            Err(PDFError::NoActiveStyle)
        ));
        let style = Style::new("missing", "B", Pt(10.0), colours::BLACK);
        assert!(matches!(
            canvas.activate_style(&style),
            Err(PDFError::UnknownFont { .. })
        ));
    }

    #[test]
    fn new_pages_reset_the_cursor() {
        let mut canvas = canvas();
        canvas.set_position(Pt(300.0), Pt(500.0));
        canvas.start_new_page().unwrap();
        assert_eq!(canvas.position(), (Pt(72.0), Pt(72.0)));
        assert_eq!(canvas.page_count(), 2);
    }

    #[test]
    fn writes_a_pdf() {
        let mut canvas = canvas();
        canvas
            .draw_cell(&Cell::empty(Pt(10.0), Pt(10.0)).with_border(Border::ALL))
            .unwrap();
        let mut out: Vec<u8> = Vec::new();
        canvas.write(&mut out).unwrap();
        assert!(out.starts_with(b"%PDF-"));
    }
}
