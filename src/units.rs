//! Physical length units. Everything in the crate is measured in [Pt] (1/72 inch,
//! the native PDF unit); [Mm] and [In] exist so callers can express lengths the way
//! they think about paper.

use derive_more::{Add, AddAssign, Display, From, Into, Sub, SubAssign, Sum};
use std::ops::{Div, Mul, Neg};

/// PostScript points, 1/72 of an inch
#[derive(
    Debug,
    Default,
    Copy,
    Clone,
    PartialEq,
    PartialOrd,
    Add,
    AddAssign,
    Sub,
    SubAssign,
    Sum,
    Display,
    From,
    Into,
)]
pub struct Pt(pub f32);

/// Millimetres
#[derive(Debug, Default, Copy, Clone, PartialEq, PartialOrd, Add, Sub, Display, From, Into)]
pub struct Mm(pub f32);

/// Inches
#[derive(Debug, Default, Copy, Clone, PartialEq, PartialOrd, Add, Sub, Display, From, Into)]
pub struct In(pub f32);

impl Pt {
    pub const ZERO: Pt = Pt(0.0);

    pub fn max(self, other: Pt) -> Pt {
        Pt(self.0.max(other.0))
    }

    pub fn min(self, other: Pt) -> Pt {
        Pt(self.0.min(other.0))
    }

    /// The value rounded to 5 decimal places
    pub fn rounded(self) -> f64 {
        round_width(self.0 as f64)
    }

    /// Whether a width summed up in `f64` is wider than `self`. Both sides are
    /// compared at 5 decimals, with `self` widened by the precision an `f32` keeps
    /// at its magnitude, so a run of glyphs that exactly fills a line still fits.
    pub fn is_exceeded_by(self, width: f64) -> bool {
        let limit = self.0 as f64;
        let slack = limit.abs() * f32::EPSILON as f64;
        round_width(width) > round_width(limit + slack)
    }
}

/// Rounds a width to the 5 decimal places line breaking compares at
pub fn round_width(width: f64) -> f64 {
    (width * 1e5).round() / 1e5
}

impl Mul<f32> for Pt {
    type Output = Pt;

    fn mul(self, rhs: f32) -> Pt {
        Pt(self.0 * rhs)
    }
}

impl Div<f32> for Pt {
    type Output = Pt;

    fn div(self, rhs: f32) -> Pt {
        Pt(self.0 / rhs)
    }
}

/// How many times `rhs` fits into `self`
impl Div<Pt> for Pt {
    type Output = f32;

    fn div(self, rhs: Pt) -> f32 {
        self.0 / rhs.0
    }
}

impl Neg for Pt {
    type Output = Pt;

    fn neg(self) -> Pt {
        Pt(-self.0)
    }
}

impl From<Mm> for Pt {
    fn from(mm: Mm) -> Pt {
        Pt(mm.0 * 72.0 / 25.4)
    }
}

impl From<In> for Pt {
    fn from(inches: In) -> Pt {
        Pt(inches.0 * 72.0)
    }
}

impl From<Pt> for Mm {
    fn from(pt: Pt) -> Mm {
        Mm(pt.0 * 25.4 / 72.0)
    }
}

impl From<Pt> for In {
    fn from(pt: Pt) -> In {
        In(pt.0 / 72.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn converts_between_units() {
        assert_eq!(Pt::from(In(1.0)), Pt(72.0));
        let ten_mm: Pt = Mm(10.0).into();
        assert!((ten_mm.0 - 28.346_457).abs() < 1e-4);
        let back: Mm = ten_mm.into();
        assert!((back.0 - 10.0).abs() < 1e-4);
    }

    #[test]
    fn rounding_hides_accumulated_error() {
        let sum: Pt = std::iter::repeat(Pt(0.1)).take(10).sum();
        assert_eq!(sum.rounded(), Pt(1.0).rounded());
    }

    #[test]
    fn exact_fits_are_not_exceeded() {
        let glyph = Pt(11.0) * 0.61;
        for n in 1..60 {
            let exact = glyph.0 as f64 * n as f64;
            let summed: f64 = (0..n).map(|_| glyph.0 as f64).sum();
            let target = Pt(exact as f32);
            assert!(!target.is_exceeded_by(summed), "{n} glyphs");
            assert!(target.is_exceeded_by(summed + glyph.0 as f64), "{n} + 1 glyphs");
        }
    }

    #[test]
    fn arithmetic() {
        let mut p = Pt(3.0) + Pt(1.5) - Pt(0.5);
        p += Pt(1.0);
        assert_eq!(p, Pt(5.0));
        assert_eq!(p * 2.0, Pt(10.0));
        assert_eq!(p / 2.0, Pt(2.5));
        assert_eq!(Pt(9.0) / Pt(3.0), 3.0);
        assert_eq!(-Pt(1.0), Pt(-1.0));
    }
}
