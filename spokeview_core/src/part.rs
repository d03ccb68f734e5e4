//! Replaceable bicycle parts shown as repair hotspots.

use crate::color::Rgba;
use serde::{Deserialize, Serialize};

/// A labeled, colored part.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Part {
    pub name: String,
    pub color: Rgba,
}

impl Part {
    pub fn new(name: impl Into<String>, color: Rgba) -> Self {
        Self {
            name: name.into(),
            color,
        }
    }
}

/// The five parts shown when the parent supplies none.
pub fn default_parts() -> Vec<Part> {
    vec![
        Part::new("Frame", Rgba::rgb(0xf9, 0x73, 0x16)),
        Part::new("Wheels", Rgba::rgb(0x3b, 0x82, 0xf6)),
        Part::new("Drivetrain", Rgba::rgb(0x10, 0xb9, 0x81)),
        Part::new("Brakes", Rgba::rgb(0xef, 0x44, 0x44)),
        Part::new("Handlebars", Rgba::rgb(0x8b, 0x5c, 0xf6)),
    ]
}

/// Uses `parts` when given, otherwise [`default_parts`].
pub fn parts_or_default(parts: Option<Vec<Part>>) -> Vec<Part> {
    parts.unwrap_or_else(default_parts)
}
