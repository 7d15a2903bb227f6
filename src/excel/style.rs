//! Cell style options for the cell-level editor.

use crate::error::{BridgeError, BridgeResult};
use rust_xlsxwriter::{Color, Format, FormatAlign};

/// Horizontal alignment options recognized by `CellStyle`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Align {
    Left,
    Center,
    Right,
}

/// Style attributes applicable to a single cell. Unset fields leave the
/// corresponding attribute at the spreadsheet default.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CellStyle {
    pub bold: bool,
    pub size: Option<f64>,
    /// Background fill as an RGB hex string, e.g. "FFFF00".
    pub background: Option<String>,
    pub align: Option<Align>,
}

impl CellStyle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn bold(mut self) -> Self {
        self.bold = true;
        self
    }

    pub fn size(mut self, size: f64) -> Self {
        self.size = Some(size);
        self
    }

    pub fn background(mut self, hex: impl Into<String>) -> Self {
        self.background = Some(hex.into());
        self
    }

    pub fn align(mut self, align: Align) -> Self {
        self.align = Some(align);
        self
    }

    /// Validate the style. Called when the style is attached to a cell so a
    /// bad hex string fails at `format_cell` time, not at save time.
    pub fn validate(&self) -> BridgeResult<()> {
        if let Some(hex) = &self.background {
            parse_hex(hex)?;
        }
        Ok(())
    }

    /// Build the writer-side format for this style.
    pub(crate) fn to_format(&self) -> Format {
        let mut format = Format::new();
        if self.bold {
            format = format.set_bold();
        }
        if let Some(size) = self.size {
            format = format.set_font_size(size);
        }
        if let Some(hex) = &self.background {
            // validate() already ran; fall back to default fill on a bad value.
            if let Ok(rgb) = parse_hex(hex) {
                format = format.set_background_color(Color::RGB(rgb));
            }
        }
        if let Some(align) = self.align {
            format = format.set_align(match align {
                Align::Left => FormatAlign::Left,
                Align::Center => FormatAlign::Center,
                Align::Right => FormatAlign::Right,
            });
        }
        format
    }
}

fn parse_hex(hex: &str) -> BridgeResult<u32> {
    let trimmed = hex.trim_start_matches('#');
    if trimmed.len() != 6 {
        return Err(BridgeError::Format(format!(
            "invalid RGB hex color '{}': expected 6 hex digits",
            hex
        )));
    }
    u32::from_str_radix(trimmed, 16)
        .map_err(|_| BridgeError::Format(format!("invalid RGB hex color '{}'", hex)))
}
