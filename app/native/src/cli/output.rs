//! CLI output formatting utilities.

use colored::Colorize;
use image::Rgb;
use serde::Serialize;

use crate::color::{GradientPair, Palette, saturation, to_hex};

/// A two-character block painted in `color`, followed by its hex code.
#[must_use]
pub fn swatch(color: Rgb<u8>) -> String {
    let [r, g, b] = color.0;
    format!("{} {}", "  ".on_truecolor(r, g, b), to_hex(color))
}

/// Formats a boolean as a colored check mark or cross.
#[must_use]
pub fn format_bool(value: bool) -> String {
    if value {
        "✓".green().to_string()
    } else {
        "✗".red().to_string()
    }
}

/// Lines describing a palette and the gradient chosen from it.
#[must_use]
pub fn palette_lines(palette: &Palette, pair: GradientPair) -> Vec<String> {
    let mut lines = Vec::with_capacity(palette.len() + 4);

    lines.push("Palette (most common first):".bold().to_string());
    for (index, color) in palette.colors().iter().enumerate() {
        lines.push(format!(
            "  {:>2}. {}  saturation {:.2}",
            index + 1,
            swatch(*color),
            saturation(*color)
        ));
    }

    lines.push(String::new());
    lines.push("Gradient:".bold().to_string());
    lines.push(format!("  {}  →  {}", swatch(pair.from), swatch(pair.to)));

    lines
}

/// Prints a palette with swatches.
pub fn print_palette(palette: &Palette, pair: GradientPair) {
    for line in palette_lines(palette, pair) {
        println!("{line}");
    }
}

/// Machine-readable palette report.
#[derive(Debug, Serialize)]
pub struct PaletteReport {
    pub colors: Vec<String>,
    pub gradient: [String; 2],
}

impl PaletteReport {
    #[must_use]
    pub fn new(palette: &Palette, pair: GradientPair) -> Self {
        Self {
            colors: palette.colors().iter().copied().map(to_hex).collect(),
            gradient: [to_hex(pair.from), to_hex(pair.to)],
        }
    }
}
