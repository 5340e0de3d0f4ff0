use eframe::egui::Color32;
use palette::{Hsl, IntoColor, Srgb};

// ---------------------------------------------------------------------------
// Category colours
// ---------------------------------------------------------------------------

/// Accent colour for histogram bars and the ROC curve.
pub const ACCENT: Color32 = Color32::from_rgb(86, 156, 214);
/// Chance-diagonal colour on the ROC plot.
pub const DIAGONAL: Color32 = Color32::GRAY;

/// `n` visually distinct colours from evenly spaced hues. Used for the
/// categorical bar charts (sex, smoker, region) and the importance bars.
pub fn generate_palette(n: usize) -> Vec<Color32> {
    (0..n)
        .map(|i| {
            let hue = (i as f32 / n.max(1) as f32) * 360.0;
            let hsl = Hsl::new(hue, 0.65, 0.55);
            let rgb: Srgb = hsl.into_color();
            Color32::from_rgb(
                (rgb.red * 255.0) as u8,
                (rgb.green * 255.0) as u8,
                (rgb.blue * 255.0) as u8,
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn palette_has_requested_size_and_distinct_entries() {
        let colors = generate_palette(4);
        assert_eq!(colors.len(), 4);
        assert_ne!(colors[0], colors[2]);
        assert!(generate_palette(0).is_empty());
    }
}
