//! RGBA colors with CSS-style parsing and formatting.

use crate::error::ColorError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// An 8-bit RGB color with a floating point alpha.
///
/// Serialized as its CSS text (`#rrggbb` or `rgba(r, g, b, a)`).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: f64,
}

impl Rgba {
    /// Brand orange, `#f97316`.
    pub const ACCENT: Rgba = Rgba::rgb(249, 115, 22);

    /// Opaque color.
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    /// Color with alpha in [0, 1].
    pub const fn rgba(r: u8, g: u8, b: u8, a: f64) -> Self {
        Self { r, g, b, a }
    }

    /// Returns the same color with a different alpha.
    pub fn with_alpha(self, a: f64) -> Self {
        Self {
            a: a.clamp(0.0, 1.0),
            ..self
        }
    }

    /// Parses `#rrggbb` or `#rgb` (the leading `#` is optional).
    pub fn from_hex(text: &str) -> Result<Self, ColorError> {
        let invalid = || ColorError::InvalidHex(text.to_string());
        let hex = text.trim().trim_start_matches('#');
        if !hex.is_ascii() {
            return Err(invalid());
        }

        let channel = |s: &str| u8::from_str_radix(s, 16).map_err(|_| invalid());
        match hex.len() {
            6 => Ok(Self::rgb(
                channel(&hex[0..2])?,
                channel(&hex[2..4])?,
                channel(&hex[4..6])?,
            )),
            3 => {
                // #abc == #aabbcc
                let r = channel(&hex[0..1])?;
                let g = channel(&hex[1..2])?;
                let b = channel(&hex[2..3])?;
                Ok(Self::rgb(r * 17, g * 17, b * 17))
            }
            _ => Err(invalid()),
        }
    }

    /// Converts HSL to RGB.
    ///
    /// `hue` in degrees (wrapped), `saturation` and `lightness` in [0, 1].
    pub fn from_hsl(hue: f64, saturation: f64, lightness: f64) -> Self {
        let h = hue.rem_euclid(360.0) / 60.0;
        let s = saturation.clamp(0.0, 1.0);
        let l = lightness.clamp(0.0, 1.0);

        let c = (1.0 - (2.0 * l - 1.0).abs()) * s;
        let x = c * (1.0 - (h % 2.0 - 1.0).abs());
        let m = l - c / 2.0;

        let (r, g, b) = match h as u32 {
            0 => (c, x, 0.0),
            1 => (x, c, 0.0),
            2 => (0.0, c, x),
            3 => (0.0, x, c),
            4 => (x, 0.0, c),
            _ => (c, 0.0, x),
        };

        let to_u8 = |v: f64| ((v + m) * 255.0).round().clamp(0.0, 255.0) as u8;
        Self::rgb(to_u8(r), to_u8(g), to_u8(b))
    }

    /// True when fully opaque.
    pub fn is_opaque(&self) -> bool {
        self.a >= 1.0
    }
}

impl fmt::Display for Rgba {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_opaque() {
            write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
        } else {
            write!(f, "rgba({}, {}, {}, {})", self.r, self.g, self.b, self.a)
        }
    }
}

impl FromStr for Rgba {
    type Err = ColorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if let Some(body) = s.strip_prefix("rgba(").and_then(|rest| rest.strip_suffix(')')) {
            let fields: Vec<&str> = body.split(',').map(str::trim).collect();
            let invalid = || ColorError::InvalidHex(s.to_string());
            if fields.len() != 4 {
                return Err(invalid());
            }
            let channel = |v: &str| v.parse::<u8>().map_err(|_| invalid());
            let alpha = fields[3].parse::<f64>().map_err(|_| invalid())?;
            return Ok(Self::rgba(
                channel(fields[0])?,
                channel(fields[1])?,
                channel(fields[2])?,
                alpha.clamp(0.0, 1.0),
            ));
        }
        Self::from_hex(s)
    }
}

impl From<Rgba> for String {
    fn from(color: Rgba) -> Self {
        color.to_string()
    }
}

impl TryFrom<String> for Rgba {
    type Error = ColorError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hex_parsing() {
        assert_eq!(Rgba::from_hex("#f97316").unwrap(), Rgba::ACCENT);
        assert_eq!(Rgba::from_hex("3b82f6").unwrap(), Rgba::rgb(0x3b, 0x82, 0xf6));
        assert_eq!(Rgba::from_hex("#fff").unwrap(), Rgba::rgb(255, 255, 255));
        assert!(Rgba::from_hex("#12345").is_err());
        assert!(Rgba::from_hex("#gg0000").is_err());
        assert!(Rgba::from_hex("#ééé").is_err());
    }

    #[test]
    fn test_css_display() {
        assert_eq!(Rgba::ACCENT.to_string(), "#f97316");
        assert_eq!(
            Rgba::rgba(249, 115, 22, 0.7).to_string(),
            "rgba(249, 115, 22, 0.7)"
        );
    }

    #[test]
    fn test_rgba_text_parses_back() {
        let color: Rgba = "rgba(249, 115, 22, 0.7)".parse().unwrap();
        assert_eq!(color, Rgba::rgba(249, 115, 22, 0.7));
    }

    #[test]
    fn test_hsl_primaries() {
        assert_eq!(Rgba::from_hsl(0.0, 1.0, 0.5), Rgba::rgb(255, 0, 0));
        assert_eq!(Rgba::from_hsl(120.0, 1.0, 0.5), Rgba::rgb(0, 255, 0));
        assert_eq!(Rgba::from_hsl(240.0, 1.0, 0.5), Rgba::rgb(0, 0, 255));
        assert_eq!(Rgba::from_hsl(360.0, 1.0, 0.5), Rgba::rgb(255, 0, 0));
        // Particle pastel: hsl(h, 100%, 70%) never drops below 40% per channel
        let pastel = Rgba::from_hsl(200.0, 1.0, 0.7);
        assert!(pastel.r >= 102 && pastel.g >= 102 && pastel.b >= 102);
    }

    #[test]
    fn test_serde_as_css_text() {
        let json = serde_json::to_string(&Rgba::ACCENT).unwrap();
        assert_eq!(json, "\"#f97316\"");
        let back: Rgba = serde_json::from_str(&json).unwrap();
        assert_eq!(back, Rgba::ACCENT);
    }
}
