use std::collections::{BTreeMap, BTreeSet};

use eframe::egui::Color32;
use palette::{Hsl, IntoColor, Srgb};

use crate::data::aggregate::Stat;
use crate::data::model::CellValue;

// ---------------------------------------------------------------------------
// Color palette generator
// ---------------------------------------------------------------------------

fn hsl_to_color32(hue: f32, saturation: f32, lightness: f32) -> Color32 {
    let hsl = Hsl::new(hue, saturation, lightness);
    let rgb: Srgb = hsl.into_color();
    Color32::from_rgb(
        (rgb.red * 255.0) as u8,
        (rgb.green * 255.0) as u8,
        (rgb.blue * 255.0) as u8,
    )
}

/// Generates `n` visually distinct colours using evenly spaced hues.
pub fn generate_palette(n: usize) -> Vec<Color32> {
    if n == 0 {
        return Vec::new();
    }
    (0..n)
        .map(|i| hsl_to_color32((i as f32 / n as f32) * 360.0, 0.75, 0.55))
        .collect()
}

// ---------------------------------------------------------------------------
// Color mapping: grouping value → Color32
// ---------------------------------------------------------------------------

/// Maps the distinct values of the grouping column to distinct colours, so a
/// group keeps its colour while the selection changes.
#[derive(Debug, Clone)]
pub struct ColorMap {
    pub column: String,
    mapping: BTreeMap<CellValue, Color32>,
    default_color: Color32,
}

impl ColorMap {
    pub fn new(column: &str, unique_values: &BTreeSet<CellValue>) -> Self {
        let palette = generate_palette(unique_values.len());
        let mapping = unique_values.iter().cloned().zip(palette).collect();

        ColorMap {
            column: column.to_string(),
            mapping,
            default_color: Color32::GRAY,
        }
    }

    pub fn color_for(&self, value: &CellValue) -> Color32 {
        self.mapping
            .get(value)
            .copied()
            .unwrap_or(self.default_color)
    }
}

// ---------------------------------------------------------------------------
// Diverging scale for the correlation heatmap
// ---------------------------------------------------------------------------

/// Fill used for undefined cells; distinct from every value on the scale.
pub const UNDEFINED_FILL: Color32 = Color32::from_rgb(90, 90, 90);

/// Blue for negative, red for positive, near-white around zero.
pub fn correlation_color(value: Stat) -> Color32 {
    match value.value() {
        Some(r) => {
            let strength = r.abs().clamp(0.0, 1.0) as f32;
            let hue = if r < 0.0 { 220.0 } else { 0.0 };
            hsl_to_color32(hue, 0.7, 0.95 - 0.5 * strength)
        }
        None => UNDEFINED_FILL,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn palette_has_requested_size() {
        assert_eq!(generate_palette(5).len(), 5);
        assert!(generate_palette(0).is_empty());
    }

    #[test]
    fn unknown_group_gets_default_color() {
        let values: BTreeSet<CellValue> = [CellValue::Text("Goa".into())].into_iter().collect();
        let map = ColorMap::new("State", &values);
        assert_eq!(map.color_for(&CellValue::Text("Bihar".into())), Color32::GRAY);
        assert_ne!(map.color_for(&CellValue::Text("Goa".into())), Color32::GRAY);
    }

    #[test]
    fn undefined_correlation_has_its_own_fill() {
        assert_eq!(correlation_color(Stat::Undefined), UNDEFINED_FILL);
        assert_ne!(correlation_color(Stat::Value(0.0)), UNDEFINED_FILL);
        assert_ne!(correlation_color(Stat::Value(1.0)), correlation_color(Stat::Value(-1.0)));
    }
}
