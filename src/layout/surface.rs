//! The drawing surface the text flow is laid out on.
//!
//! The flow engine never talks to a document format directly: it measures glyphs,
//! moves a cursor, and draws cells through [Surface]. [PdfCanvas](crate::PdfCanvas)
//! implements it for PDF output, [Recorder](crate::layout::Recorder) for dry runs.
//!
//! Coordinates used by a surface are top-down: `y` grows towards the bottom of the
//! page, the way a pen moves while writing.

use crate::layout::margins::Margins;
use crate::layout::style::Style;
use crate::units::Pt;
use crate::PDFError;
use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

/// Which sides of a cell get a border line
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Border {
    pub left: bool,
    pub top: bool,
    pub right: bool,
    pub bottom: bool,
}

impl Border {
    pub const NONE: Border = Border {
        left: false,
        top: false,
        right: false,
        bottom: false,
    };

    pub const ALL: Border = Border {
        left: true,
        top: true,
        right: true,
        bottom: true,
    };

    /// Only the left and right sides of this border
    pub fn sides(self) -> Border {
        Border {
            top: false,
            bottom: false,
            ..self
        }
    }

    pub fn with_top(self, top: bool) -> Border {
        Border { top, ..self }
    }

    pub fn with_bottom(self, bottom: bool) -> Border {
        Border { bottom, ..self }
    }

    pub fn is_empty(self) -> bool {
        self == Border::NONE
    }
}

/// Parses the classic border notation: `"0"` or `""` for no border, `"1"` for a
/// full frame, otherwise any combination of the letters `L`, `T`, `R`, and `B`.
///
/// ```
/// use pdf_flow::layout::Border;
///
/// let border: Border = "LTB".parse().unwrap();
/// assert!(border.left && border.top && border.bottom && !border.right);
/// assert_eq!("1".parse::<Border>().unwrap(), Border::ALL);
/// ```
impl FromStr for Border {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s == "1" {
            return Ok(Border::ALL);
        }
        let has = |side: char| s.chars().any(|c| c.eq_ignore_ascii_case(&side));
        Ok(Border {
            left: has('L'),
            top: has('T'),
            right: has('R'),
            bottom: has('B'),
        })
    }
}

impl fmt::Display for Border {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (on, side) in [
            (self.left, 'L'),
            (self.top, 'T'),
            (self.right, 'R'),
            (self.bottom, 'B'),
        ] {
            if on {
                write!(f, "{side}")?;
            }
        }
        Ok(())
    }
}

/// Where the cursor goes after a cell has been drawn
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum CellAdvance {
    /// To the right edge of the cell, same row
    #[default]
    Right,
    /// Below the cell, same column
    Below,
}

/// A rectangular area starting at the cursor, optionally filled, framed, and
/// holding a single run of text drawn in the active style starting at its left edge
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Cell<'a> {
    pub width: Pt,
    pub height: Pt,
    pub text: &'a str,
    pub border: Border,
    pub advance: CellAdvance,
    pub fill: bool,
    pub link: Option<&'a str>,
}

impl<'a> Cell<'a> {
    /// A cell without text, border, or fill
    pub fn empty(width: Pt, height: Pt) -> Cell<'static> {
        Cell {
            width,
            height,
            text: "",
            border: Border::NONE,
            advance: CellAdvance::Right,
            fill: false,
            link: None,
        }
    }

    pub fn text(width: Pt, height: Pt, text: &'a str) -> Cell<'a> {
        Cell {
            text,
            ..Cell::empty(width, height)
        }
    }

    pub fn with_border(self, border: Border) -> Cell<'a> {
        Cell { border, ..self }
    }

    pub fn with_fill(self, fill: bool) -> Cell<'a> {
        Cell { fill, ..self }
    }

    pub fn with_link(self, link: Option<&'a str>) -> Cell<'a> {
        Cell { link, ..self }
    }

    pub fn below(self) -> Cell<'a> {
        Cell {
            advance: CellAdvance::Below,
            ..self
        }
    }
}

/// Everything the text flow needs from the document it draws into
pub trait Surface {
    /// Horizontal advance of `ch` when set in `style`
    fn advance(&mut self, style: &Style, ch: char) -> Result<Pt, PDFError>;

    /// Make `style` the one subsequent text is drawn with
    fn activate_style(&mut self, style: &Style) -> Result<(), PDFError>;

    /// Cursor position, top-down
    fn position(&self) -> (Pt, Pt);

    fn set_position(&mut self, x: Pt, y: Pt);

    /// Width and height of the current page
    fn page_size(&self) -> (Pt, Pt);

    fn margins(&self) -> Margins;

    /// Extra advance added after every space character of subsequently drawn text
    fn set_word_spacing(&mut self, spacing: Pt);

    /// Draw a cell at the cursor and move the cursor according to [Cell::advance]
    fn draw_cell(&mut self, cell: &Cell<'_>) -> Result<(), PDFError>;

    /// Whether the surface allows breaking to a new page right now
    fn accept_page_break(&mut self) -> bool;

    /// Start a new page, placing the cursor at its top-left margin
    fn start_new_page(&mut self) -> Result<(), PDFError>;

    /// Called just before a flow starts a new page
    fn before_page_break(&mut self) {}

    /// Called right after a flow has started a new page
    fn after_page_break(&mut self) {}

    fn x(&self) -> Pt {
        self.position().0
    }

    fn y(&self) -> Pt {
        self.position().1
    }

    fn set_x(&mut self, x: Pt) {
        let y = self.y();
        self.set_position(x, y);
    }

    fn set_y(&mut self, y: Pt) {
        let x = self.x();
        self.set_position(x, y);
    }

    /// Horizontal room between the cursor and the right margin
    fn remaining_width(&self) -> Pt {
        let (width, _) = self.page_size();
        (width - self.margins().right - self.x()).max(Pt::ZERO)
    }

    /// Vertical room between the cursor and the bottom margin
    fn remaining_height(&self) -> Pt {
        let (_, height) = self.page_size();
        height - self.margins().bottom - self.y()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn border_notation() {
        assert_eq!("0".parse::<Border>().unwrap(), Border::NONE);
        assert_eq!("".parse::<Border>().unwrap(), Border::NONE);
        assert_eq!("rl".parse::<Border>().unwrap(), Border::ALL.sides());
        assert_eq!(Border::ALL.to_string(), "LTRB");
        assert_eq!(Border::ALL.sides().with_bottom(true).to_string(), "LRB");
    }
}
