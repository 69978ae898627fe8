//! Region Palette Module
//! Fixed colour list and the one-time region → colour pairing.

use crate::error::{PipelineError, Result};
use plotters::style::RGBColor;

/// 20 categorical colours followed by 6 pastels; enough for 26 cantons.
pub const PALETTE: [RGBColor; 26] = [
    RGBColor(31, 119, 180),  // Blue
    RGBColor(174, 199, 232), // Light Blue
    RGBColor(255, 127, 14),  // Orange
    RGBColor(255, 187, 120), // Light Orange
    RGBColor(44, 160, 44),   // Green
    RGBColor(152, 223, 138), // Light Green
    RGBColor(214, 39, 40),   // Red
    RGBColor(255, 152, 150), // Light Red
    RGBColor(148, 103, 189), // Purple
    RGBColor(197, 176, 213), // Light Purple
    RGBColor(140, 86, 75),   // Brown
    RGBColor(196, 156, 148), // Light Brown
    RGBColor(227, 119, 194), // Pink
    RGBColor(247, 182, 210), // Light Pink
    RGBColor(127, 127, 127), // Grey
    RGBColor(199, 199, 199), // Light Grey
    RGBColor(188, 189, 34),  // Olive
    RGBColor(219, 219, 141), // Light Olive
    RGBColor(23, 190, 207),  // Cyan
    RGBColor(158, 218, 229), // Light Cyan
    RGBColor(251, 180, 174), // Pastel Red
    RGBColor(179, 205, 227), // Pastel Blue
    RGBColor(204, 235, 197), // Pastel Green
    RGBColor(222, 203, 228), // Pastel Purple
    RGBColor(254, 217, 166), // Pastel Orange
    RGBColor(255, 255, 204), // Pastel Yellow
];

/// Regions paired positionally with palette entries.
#[derive(Debug, Clone, PartialEq)]
pub struct ColorAssignment {
    pairs: Vec<(String, RGBColor)>,
}

impl ColorAssignment {
    /// Pair each region with the palette entry at the same position.
    /// Fails when there are more regions than colours.
    pub fn new<S: AsRef<str>>(regions: &[S], palette: &[RGBColor]) -> Result<Self> {
        if regions.len() > palette.len() {
            return Err(PipelineError::config(format!(
                "{} regions but only {} palette colours",
                regions.len(),
                palette.len()
            )));
        }

        let pairs = regions
            .iter()
            .zip(palette.iter())
            .map(|(region, color)| (region.as_ref().to_string(), *color))
            .collect();
        Ok(Self { pairs })
    }

    /// Colour for a region, if it was assigned one.
    pub fn color_of(&self, region: &str) -> Option<RGBColor> {
        self.pairs
            .iter()
            .find(|(name, _)| name == region)
            .map(|(_, color)| *color)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, RGBColor)> {
        self.pairs.iter().map(|(name, color)| (name.as_str(), *color))
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}

/// `#RRGGBB`, upper-case as in plotters' SVG output.
pub fn hex(color: RGBColor) -> String {
    let RGBColor(r, g, b) = color;
    format!("#{:02X}{:02X}{:02X}", r, g, b)
}
