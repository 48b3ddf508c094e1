use crate::PDFError;
use std::str::FromStr;

/// A colour, expressed in RGB, CMYK, or greyscale colour spaces
#[derive(Copy, Clone, PartialEq, Debug)]
pub enum Colour {
    /// DeviceRGB colour; r, g, b, range from 0.0 to 1.0
    RGB { r: f32, g: f32, b: f32 },
    /// DeviceCMYK colour; c, m, y, and k range from 0.0 to 1.0
    CMYK { c: f32, m: f32, y: f32, k: f32 },
    /// DeviceGray colour; g ranges from 0.0 to 1.0
    Grey { g: f32 },
}

impl Colour {
    /// Create a new colour in the RGB space. r, g, and b range from 0.0 to 1.0
    pub fn new_rgb(r: f32, g: f32, b: f32) -> Colour {
        Colour::RGB { r, g, b }
    }

    /// Create a new colour in the RGB space. r, g, and b range from 0 to 255
    pub fn new_rgb_bytes(r: u8, g: u8, b: u8) -> Colour {
        Colour::RGB {
            r: r as f32 / 255.0,
            g: g as f32 / 255.0,
            b: b as f32 / 255.0,
        }
    }

    /// Create a new colour in the CMYK space. c, m, y, and k range from 0 to 255
    pub fn new_cmyk_bytes(c: u8, m: u8, y: u8, k: u8) -> Colour {
        Colour::CMYK {
            c: c as f32 / 255.0,
            m: m as f32 / 255.0,
            y: y as f32 / 255.0,
            k: k as f32 / 255.0,
        }
    }

    /// Create a new colour in the Gray space, g ranges from 0 to 255
    pub fn new_grey_bytes(g: u8) -> Colour {
        Colour::Grey {
            g: g as f32 / 255.0,
        }
    }
}

/// Parses the comma-separated colour notation used by style definitions.
/// The number of components picks the colour space:
///
/// * `"128"` => grey
/// * `"200,10,10"` => RGB
/// * `"0,255,255,0"` => CMYK
///
/// Components range from 0 to 255.
///
/// ```
/// use pdf_flow::Colour;
///
/// let red: Colour = "255, 0, 0".parse().expect("valid colour");
/// assert_eq!(red, Colour::new_rgb(1.0, 0.0, 0.0));
/// ```
impl FromStr for Colour {
    type Err = PDFError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let components = s
            .split(',')
            .map(|c| c.trim().parse::<f32>())
            .collect::<Result<Vec<f32>, _>>()
            .map_err(|_| PDFError::InvalidColour(s.to_string()))?;

        if components.iter().any(|c| !(0.0..=255.0).contains(c)) {
            return Err(PDFError::InvalidColour(s.to_string()));
        }

        let unit = |v: f32| v / 255.0;
        match components.as_slice() {
            [g] => Ok(Colour::Grey { g: unit(*g) }),
            [r, g, b] => Ok(Colour::RGB {
                r: unit(*r),
                g: unit(*g),
                b: unit(*b),
            }),
            [c, m, y, k] => Ok(Colour::CMYK {
                c: unit(*c),
                m: unit(*m),
                y: unit(*y),
                k: unit(*k),
            }),
            _ => Err(PDFError::InvalidColour(s.to_string())),
        }
    }
}

/// A list of pre-defined colour constants
pub mod colours {
    use super::*;

    pub const BLACK: Colour = Colour::Grey { g: 0.0 };
    pub const WHITE: Colour = Colour::Grey { g: 1.0 };
    pub const RED: Colour = Colour::RGB {
        r: 1.0,
        g: 0.0,
        b: 0.0,
    };
    pub const BLUE: Colour = Colour::RGB {
        r: 0.0,
        g: 0.0,
        b: 1.0,
    };
}
