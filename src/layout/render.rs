use crate::layout::breaker::Line;
use crate::layout::style::StyleRegistry;
use crate::layout::surface::{Cell, Surface};
use crate::units::Pt;
use crate::PDFError;
use std::fmt;
use std::str::FromStr;

/// Horizontal alignment of lines within a block
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum Align {
    #[default]
    Left,
    Right,
    Center,
    /// Stretch spaces so the line fills the block; the last line of a block is
    /// set left-aligned
    Justify,
}

/// Accepts the single-letter notation `L`, `R`, `C`, `J` as well as the full
/// names, in any case
impl FromStr for Align {
    type Err = PDFError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "l" | "left" => Ok(Align::Left),
            "r" | "right" => Ok(Align::Right),
            "c" | "center" | "centre" => Ok(Align::Center),
            "j" | "justify" => Ok(Align::Justify),
            _ => Err(PDFError::InvalidAlign(s.to_string())),
        }
    }
}

impl fmt::Display for Align {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let letter = match self {
            Align::Left => "L",
            Align::Right => "R",
            Align::Center => "C",
            Align::Justify => "J",
        };
        f.write_str(letter)
    }
}

/// How a line was placed within its width
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct PlacedLine {
    /// Empty space before the first segment
    pub offset: Pt,
    /// Extra advance given to every space
    pub word_spacing: Pt,
    /// Empty space after the last segment
    pub trailing: Pt,
}

/// Draws `line` at the cursor, within `width`, as a row of cells `height` high.
/// The cursor ends at the right edge of the row.
pub fn render_line<S: Surface>(
    surface: &mut S,
    styles: &mut StyleRegistry,
    width: Pt,
    height: Pt,
    line: &Line,
    align: Align,
) -> Result<PlacedLine, PDFError> {
    let line_width = line.width();
    let spaces = line.spaces();
    let slack = width - line_width;

    let mut placed = PlacedLine::default();
    match align {
        Align::Right => placed.offset = slack,
        Align::Center => placed.offset = slack / 2.0,
        Align::Justify if spaces > 0 => placed.word_spacing = slack / spaces as f32,
        _ => {}
    }

    let mut remaining = width;
    if placed.offset != Pt::ZERO {
        surface.draw_cell(&Cell::empty(placed.offset, height))?;
        remaining -= placed.offset;
    }

    for segment in line.segments.iter() {
        if segment.width == Pt::ZERO {
            continue;
        }
        styles.apply(surface, &segment.tag)?;

        let baseline = (segment.vertical_offset != Pt::ZERO).then(|| {
            let y = surface.y();
            surface.set_y(y - segment.vertical_offset);
            y
        });

        let spacing = if segment.spaces > 0 {
            placed.word_spacing
        } else {
            Pt::ZERO
        };
        surface.set_word_spacing(spacing);
        surface.draw_cell(
            &Cell::text(segment.width, height, &segment.text).with_link(segment.link.as_deref()),
        )?;
        remaining -= segment.width;

        let stretch = spacing * segment.spaces as f32;
        if stretch != Pt::ZERO {
            let x = surface.x();
            surface.set_x(x + stretch);
            remaining -= stretch;
        }

        if let Some(y) = baseline {
            surface.set_y(y);
        }
    }
    surface.set_word_spacing(Pt::ZERO);

    if remaining.rounded() != 0.0 {
        surface.draw_cell(&Cell::empty(remaining, height))?;
        placed.trailing = remaining;
    }

    Ok(placed)
}
