use crate::units::Pt;

/// Distances from the four sides of a box. Used both for page margins (the cursor
/// never starts a line outside them and page breaks happen at the bottom one) and
/// for the padding around a flowed text block.
#[derive(Debug, Default, Copy, Clone, PartialEq)]
pub struct Edges {
    pub top: Pt,
    pub right: Pt,
    pub bottom: Pt,
    pub left: Pt,
}

/// Page margins
pub type Margins = Edges;

/// Space between a block's border and its text
pub type Padding = Edges;

impl Edges {
    /// Create edges by specifying individual components in a clockwise fashion
    /// starting at the top (in the same order as CSS margins)
    pub fn trbl(top: Pt, right: Pt, bottom: Pt, left: Pt) -> Edges {
        Edges {
            top,
            right,
            bottom,
            left,
        }
    }

    /// Create edges where all values are equal
    pub fn all<D: Into<Pt>>(value: D) -> Edges {
        let value: Pt = value.into();
        Edges {
            top: value,
            right: value,
            bottom: value,
            left: value,
        }
    }

    /// Create edges by specifying different values for vertical (top and bottom)
    /// and horizontal (left and right) sides
    pub fn symmetric<V: Into<Pt>, H: Into<Pt>>(vertical: V, horizontal: H) -> Edges {
        let vertical: Pt = vertical.into();
        let horizontal: Pt = horizontal.into();
        Edges {
            top: vertical,
            right: horizontal,
            bottom: vertical,
            left: horizontal,
        }
    }

    /// Create edges where all values are 0.0
    pub fn empty() -> Edges {
        Edges::default()
    }

    /// Sum of the left and right edges
    pub fn horizontal(&self) -> Pt {
        self.left + self.right
    }

    /// Sum of the top and bottom edges
    pub fn vertical(&self) -> Pt {
        self.top + self.bottom
    }

    /// The same edges with left and right zeroed out
    pub fn without_horizontal(&self) -> Edges {
        Edges {
            left: Pt::ZERO,
            right: Pt::ZERO,
            ..*self
        }
    }
}
