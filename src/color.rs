use std::collections::{BTreeMap, BTreeSet};

use palette::{Hsl, IntoColor, Srgb};
use serde::Serialize;

// ---------------------------------------------------------------------------
// Color palette generator
// ---------------------------------------------------------------------------

/// Generates `n` visually distinct `#rrggbb` colours using evenly spaced hues.
pub fn generate_palette(n: usize) -> Vec<String> {
    if n == 0 {
        return Vec::new();
    }
    (0..n)
        .map(|i| {
            // Offset so the first two labels ("No", "Yes") land on blue and orange.
            let hue = 210.0 + (i as f32 / n as f32) * 360.0;
            let hsl = Hsl::new(hue % 360.0, 0.75, 0.55);
            let rgb: Srgb = hsl.into_color();
            format!(
                "#{:02x}{:02x}{:02x}",
                (rgb.red * 255.0) as u8,
                (rgb.green * 255.0) as u8,
                (rgb.blue * 255.0) as u8,
            )
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Churn label → colour
// ---------------------------------------------------------------------------

/// Maps every churn label of a dataset to a fixed colour, so series keep
/// their colour when filters change.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChurnPalette {
    mapping: BTreeMap<String, String>,
    default_color: String,
}

impl ChurnPalette {
    /// Build the palette from every label in the dataset (duplicates allowed).
    pub fn new<'a>(labels: impl IntoIterator<Item = &'a str>) -> Self {
        let unique: BTreeSet<&str> = labels.into_iter().collect();
        let colors = generate_palette(unique.len());
        let mapping = unique
            .into_iter()
            .zip(colors)
            .map(|(label, color)| (label.to_string(), color))
            .collect();

        ChurnPalette {
            mapping,
            default_color: "#888888".to_string(),
        }
    }

    /// Look up the colour for a churn label.
    pub fn color_for(&self, label: &str) -> &str {
        self.mapping
            .get(label)
            .map(String::as_str)
            .unwrap_or(&self.default_color)
    }

    /// Legend entries (label, colour) in label order.
    pub fn legend_entries(&self) -> Vec<(String, String)> {
        self.mapping
            .iter()
            .map(|(label, color)| (label.clone(), color.clone()))
            .collect()
    }
}
