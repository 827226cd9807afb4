use serde::Serialize;

use crate::common::Color;
use crate::error::ColorError;

/// Theming colors derived from one base color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Palette {
    pub primary: Color,
    pub secondary: Color,
    pub accent: Color,
    pub text: Color,
    pub background: Color,
    pub is_light: bool,
}

// Luma weights scaled by 1000 so the threshold comparison stays exact.
const LUMA_R: u32 = 299;
const LUMA_G: u32 = 587;
const LUMA_B: u32 = 114;
const LIGHT_THRESHOLD: u32 = 125;

impl Palette {
    /// Text color on light primaries.
    pub const DARK_TEXT: Color = Color::new(0x1a, 0x1f, 0x2c);
    /// Text color on dark primaries.
    pub const LIGHT_TEXT: Color = Color::new(0xf6, 0xf6, 0xf7);

    pub fn generate(primary: Color) -> Self {
        let is_light = is_light(primary);
        Self {
            primary,
            secondary: primary.map_channels(|c| darken(c, 20)),
            accent: primary.map_channels(|c| lighten(c, 40)),
            text: if is_light {
                Self::DARK_TEXT
            } else {
                Self::LIGHT_TEXT
            },
            background: primary.map_channels(|c| darken(c, 80)),
            is_light,
        }
    }

    pub fn from_hex(hex: &str) -> Result<Self, ColorError> {
        Color::from_hex(hex).map(Self::generate)
    }
}

impl From<Color> for Palette {
    fn from(primary: Color) -> Self {
        Self::generate(primary)
    }
}

/// `0.299 R + 0.587 G + 0.114 B`, on the 0–255 scale.
pub fn brightness(color: Color) -> f64 {
    luma_milli(color) as f64 / 1000.0
}

pub fn is_light(color: Color) -> bool {
    luma_milli(color) > LIGHT_THRESHOLD * 1000
}

fn luma_milli(color: Color) -> u32 {
    LUMA_R * color.r as u32 + LUMA_G * color.g as u32 + LUMA_B * color.b as u32
}

/// `floor(c * (1 - percent / 100))`
pub fn darken(channel: u8, percent: u8) -> u8 {
    let percent = percent.min(100) as u32;
    (channel as u32 * (100 - percent) / 100) as u8
}

/// `floor(c + (255 - c) * percent / 100)`
pub fn lighten(channel: u8, percent: u8) -> u8 {
    let percent = percent.min(100) as u32;
    let c = channel as u32;
    (c + (255 - c) * percent / 100).min(255) as u8
}
