use egui::Color32;

use crate::error::ColorParseError;

pub const MIN_WIDTH: u8 = 1;
pub const MAX_WIDTH: u8 = 50;

/// What the freehand brush paints with on the next stroke
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Brush {
    pub color: Color32,
    pub width: u8,
}

/// Paint and erase brushes share a width but never a color.
///
/// The eraser paints with the canvas background color, so its color is not
/// stored here at all and is supplied by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct BrushSettings {
    color: [u8; 3],
    width: u8,
}

impl Default for BrushSettings {
    fn default() -> Self {
        Self::new(Color32::BLACK, 5)
    }
}

impl BrushSettings {
    pub fn new(color: Color32, width: u8) -> Self {
        Self {
            color: [color.r(), color.g(), color.b()],
            width: width.clamp(MIN_WIDTH, MAX_WIDTH),
        }
    }

    pub fn color(&self) -> Color32 {
        let [r, g, b] = self.color;
        Color32::from_rgb(r, g, b)
    }

    /// Alpha is dropped, brush colors are always opaque
    pub fn set_color(&mut self, color: Color32) {
        self.color = [color.r(), color.g(), color.b()];
    }

    pub fn set_color_hex(&mut self, hex: &str) -> Result<(), ColorParseError> {
        self.set_color(parse_hex_color(hex)?);
        Ok(())
    }

    pub fn color_hex(&self) -> String {
        format_hex_color(self.color())
    }

    pub fn width(&self) -> u8 {
        self.width.clamp(MIN_WIDTH, MAX_WIDTH)
    }

    pub fn set_width(&mut self, width: u8) {
        self.width = width.clamp(MIN_WIDTH, MAX_WIDTH);
    }

    pub fn paint_brush(&self) -> Brush {
        Brush {
            color: self.color(),
            width: self.width(),
        }
    }

    pub fn erase_brush(&self, background: Color32) -> Brush {
        Brush {
            color: background,
            width: self.width(),
        }
    }
}

/// Parse `#rrggbb` (the leading `#` is optional).
pub fn parse_hex_color(hex: &str) -> Result<Color32, ColorParseError> {
    let digits = hex.trim().trim_start_matches('#');
    if digits.len() != 6 || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(ColorParseError::Format(hex.to_owned()));
    }
    let channel = |i: usize| {
        u8::from_str_radix(&digits[i..i + 2], 16).map_err(|_| ColorParseError::Format(hex.to_owned()))
    };
    Ok(Color32::from_rgb(channel(0)?, channel(2)?, channel(4)?))
}

pub fn format_hex_color(color: Color32) -> String {
    format!("#{:02x}{:02x}{:02x}", color.r(), color.g(), color.b())
}
