use crate::colour::Colour;
use crate::font::Font;
use crate::layout::Margins;
use crate::pagesize::PageSize;
use crate::rect::Rect;
use crate::refs::{ObjectReferences, RefType};
use crate::units::Pt;
use crate::PDFError;
use id_arena::{Arena, Id};
use pdf_writer::types::{ActionType, AnnotationType};
use pdf_writer::{Filter, Finish, Name, Pdf, Str};
use std::io::Write;

/// A run of text drawn from a single baseline origin, in PDF page space
#[derive(Clone, PartialEq, Debug)]
pub struct TextSpan {
    pub text: String,
    pub font: Id<Font>,
    pub size: Pt,
    pub colour: Colour,
    /// Extra advance after every space
    pub word_spacing: Pt,
    /// Start of the baseline
    pub origin: (Pt, Pt),
}

#[derive(Clone, PartialEq, Debug)]
pub enum PageContents {
    Text(TextSpan),
    /// A filled rectangle
    Fill { rect: Rect, colour: Colour },
    /// A straight line
    Stroke {
        from: (Pt, Pt),
        to: (Pt, Pt),
        width: Pt,
        colour: Colour,
    },
}

/// A clickable area opening a URI
#[derive(Clone, PartialEq, Debug)]
pub struct Link {
    pub rect: Rect,
    pub uri: String,
}

/// A page of the document. Contents are positioned in PDF page space, with the
/// origin at the bottom-left corner.
pub struct Page {
    pub media_box: Rect,
    /// Where content is meant to live, i.e. within the margins
    pub content_box: Rect,
    pub contents: Vec<PageContents>,
    pub links: Vec<Link>,
}

impl Page {
    pub fn new(size: PageSize, margins: Margins) -> Page {
        let (width, height) = size;
        Page {
            media_box: Rect {
                x1: Pt::ZERO,
                y1: Pt::ZERO,
                x2: width,
                y2: height,
            },
            content_box: Rect {
                x1: margins.left,
                y1: margins.bottom,
                x2: width - margins.right,
                y2: height - margins.top,
            },
            contents: Vec::default(),
            links: Vec::default(),
        }
    }

    pub fn width(&self) -> Pt {
        self.media_box.width()
    }

    pub fn height(&self) -> Pt {
        self.media_box.height()
    }

    pub fn add_text(&mut self, span: TextSpan) {
        self.contents.push(PageContents::Text(span));
    }

    pub fn fill_rect(&mut self, rect: Rect, colour: Colour) {
        self.contents.push(PageContents::Fill { rect, colour });
    }

    pub fn stroke_line(&mut self, from: (Pt, Pt), to: (Pt, Pt), width: Pt, colour: Colour) {
        self.contents.push(PageContents::Stroke {
            from,
            to,
            width,
            colour,
        });
    }

    pub fn add_link<S: ToString>(&mut self, rect: Rect, uri: S) {
        self.links.push(Link {
            rect,
            uri: uri.to_string(),
        });
    }

    #[allow(clippy::write_with_newline)]
    fn render(&self, fonts: &Arena<Font>) -> Result<Vec<u8>, std::io::Error> {
        let mut content: Vec<u8> = Vec::default();

        for item in self.contents.iter() {
            match item {
                PageContents::Text(span) => {
                    let Some(font) = fonts.get(span.font) else {
                        log::warn!("skipping text drawn with a font missing from the document");
                        continue;
                    };
                    write!(content, "q\n")?;
                    write_colour(&mut content, span.colour, false)?;
                    write!(content, "BT\n")?;
                    write!(content, "/F{} {} Tf\n", span.font.index(), span.size)?;
                    write!(content, "{} {} Td\n", span.origin.0, span.origin.1)?;

                    // spaces are stretched with TJ adjustments, as Tw doesn't apply to
                    // two-byte encodings
                    let adjust = if span.size > Pt::ZERO {
                        -span.word_spacing.0 * 1000.0 / span.size.0
                    } else {
                        0.0
                    };
                    write!(content, "[<")?;
                    for ch in span.text.chars() {
                        write!(content, "{:04x}", font.glyph_or_fallback(ch))?;
                        if ch == ' ' && adjust != 0.0 {
                            write!(content, "> {adjust} <")?;
                        }
                    }
                    write!(content, ">] TJ\n")?;
                    write!(content, "ET\n")?;
                    write!(content, "Q\n")?;
                }
                PageContents::Fill { rect, colour } => {
                    write!(content, "q\n")?;
                    write_colour(&mut content, *colour, false)?;
                    write!(
                        content,
                        "{} {} {} {} re f\n",
                        rect.x1,
                        rect.y1,
                        rect.width(),
                        rect.height()
                    )?;
                    write!(content, "Q\n")?;
                }
                PageContents::Stroke {
                    from,
                    to,
                    width,
                    colour,
                } => {
                    write!(content, "q\n")?;
                    write_colour(&mut content, *colour, true)?;
                    write!(content, "{width} w\n")?;
                    write!(content, "{} {} m {} {} l S\n", from.0, from.1, to.0, to.1)?;
                    write!(content, "Q\n")?;
                }
            }
        }

        Ok(content)
    }

    pub(crate) fn write(
        &self,
        refs: &mut ObjectReferences,
        page_index: usize,
        fonts: &Arena<Font>,
        writer: &mut Pdf,
    ) -> Result<(), PDFError> {
        let id = refs.get(RefType::Page(page_index)).ok_or(PDFError::PageMissing)?;
        let page_tree_id = refs.get(RefType::PageTree).ok_or(PDFError::PageMissing)?;
        let link_ids: Vec<_> = (0..self.links.len())
            .map(|i| refs.gen(RefType::Link(page_index, i)))
            .collect();
        let content_id = refs.gen(RefType::ContentForPage(page_index));

        let mut page = writer.page(id);
        page.media_box(self.media_box.into());
        page.art_box(self.content_box.into());
        page.parent(page_tree_id);

        let mut resources = page.resources();
        let mut resource_fonts = resources.fonts();
        for (font_id, _) in fonts.iter() {
            if let Some(font_ref) = refs.get(RefType::Font(font_id.index())) {
                resource_fonts.pair(Name(format!("F{}", font_id.index()).as_bytes()), font_ref);
            }
        }
        resource_fonts.finish();
        resources.finish();

        if !link_ids.is_empty() {
            page.annotations(link_ids.iter().copied());
        }
        page.contents(content_id);
        page.finish();

        for (link, &link_id) in self.links.iter().zip(link_ids.iter()) {
            let mut annotation = writer.annotation(link_id);
            annotation.subtype(AnnotationType::Link);
            annotation.rect(link.rect.into());
            annotation.border(0.0, 0.0, 0.0, None);
            annotation
                .action()
                .action_type(ActionType::Uri)
                .uri(Str(link.uri.as_bytes()));
            annotation.finish();
        }

        let rendered = self.render(fonts)?;
        let compressed = miniz_oxide::deflate::compress_to_vec_zlib(
            rendered.as_slice(),
            miniz_oxide::deflate::CompressionLevel::DefaultCompression as u8,
        );
        writer
            .stream(content_id, compressed.as_slice())
            .filter(Filter::FlateDecode);

        Ok(())
    }
}

#[allow(clippy::write_with_newline)]
fn write_colour(content: &mut Vec<u8>, colour: Colour, stroke: bool) -> Result<(), std::io::Error> {
    match (colour, stroke) {
        (Colour::RGB { r, g, b }, false) => write!(content, "{r} {g} {b} rg\n"),
        (Colour::RGB { r, g, b }, true) => write!(content, "{r} {g} {b} RG\n"),
        (Colour::CMYK { c, m, y, k }, false) => write!(content, "{c} {m} {y} {k} k\n"),
        (Colour::CMYK { c, m, y, k }, true) => write!(content, "{c} {m} {y} {k} K\n"),
        (Colour::Grey { g }, false) => write!(content, "{g} g\n"),
        (Colour::Grey { g }, true) => write!(content, "{g} G\n"),
    }
}
