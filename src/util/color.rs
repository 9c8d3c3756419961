//! Color utility functions for visualization.

use eframe::egui::Color32;

/// Background color for unlit texels.
pub const BACKGROUND: Color32 = Color32::from_rgb(13, 13, 13);

/// Convert HSV to RGB as floating point values (0.0-1.0).
///
/// # Arguments
/// * `h` - Hue in degrees (0-360)
/// * `s` - Saturation (0.0-1.0)
/// * `v` - Value/brightness (0.0-1.0)
#[inline]
pub fn hsv_to_rgb_f32(h: f32, s: f32, v: f32) -> (f32, f32, f32) {
    let h = h.rem_euclid(360.0);
    let c = v * s;
    let x = c * (1.0 - ((h / 60.0) % 2.0 - 1.0).abs());
    let m = v - c;

    let (r, g, b) = if h < 60.0 {
        (c, x, 0.0)
    } else if h < 120.0 {
        (x, c, 0.0)
    } else if h < 180.0 {
        (0.0, c, x)
    } else if h < 240.0 {
        (0.0, x, c)
    } else if h < 300.0 {
        (x, 0.0, c)
    } else {
        (c, 0.0, x)
    };

    (r + m, g + m, b + m)
}

/// Convert HSV to an egui Color32.
#[inline]
pub fn hsv_to_color32(h: f32, s: f32, v: f32) -> Color32 {
    let (r, g, b) = hsv_to_rgb_f32(h, s, v);
    Color32::from_rgb((r * 255.0) as u8, (g * 255.0) as u8, (b * 255.0) as u8)
}

/// Map accumulated point-cloud intensity to a phosphor-style color.
///
/// Dim accumulation renders green, saturating through white as points pile
/// up. Intensity above 1.0 is clamped.
#[inline]
pub fn phosphor_color(intensity: f32) -> Color32 {
    let t = intensity.clamp(0.0, 1.0);
    if t <= 0.0 {
        return BACKGROUND;
    }
    let g = t.sqrt();
    let rb = t * t;
    Color32::from_rgb(
        (rb * 255.0).max(13.0) as u8,
        (g * 255.0).max(13.0) as u8,
        (rb * 255.0).max(13.0) as u8,
    )
}

/// Color for a digram cell: hue encodes the mean source offset of the pair,
/// brightness its relative frequency.
#[inline]
pub fn digram_color(mean_offset: f32, intensity: f32) -> Color32 {
    let t = intensity.clamp(0.0, 1.0);
    if t <= 0.0 {
        return BACKGROUND;
    }
    let hue = mean_offset.clamp(0.0, 1.0) * 300.0;
    hsv_to_color32(hue, 0.85, 0.2 + 0.8 * t.sqrt())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hsv_primaries() {
        let (r, g, b) = hsv_to_rgb_f32(0.0, 1.0, 1.0);
        assert!(r > 0.99 && g < 0.01 && b < 0.01);

        let (r, g, b) = hsv_to_rgb_f32(120.0, 1.0, 1.0);
        assert!(r < 0.01 && g > 0.99 && b < 0.01);

        let (r, g, b) = hsv_to_rgb_f32(240.0, 1.0, 1.0);
        assert!(r < 0.01 && g < 0.01 && b > 0.99);
    }

    #[test]
    fn test_phosphor_ramp() {
        assert_eq!(phosphor_color(0.0), BACKGROUND);

        let dim = phosphor_color(0.2);
        // Low intensity reads green.
        assert!(dim.g() > dim.r());

        let hot = phosphor_color(1.0);
        assert_eq!(hot, phosphor_color(5.0), "intensity clamps at 1.0");
        assert_eq!(hot.r(), 255);
        assert_eq!(hot.g(), 255);
    }

    #[test]
    fn test_digram_color_hue_tracks_offset() {
        let early = digram_color(0.0, 0.8);
        let late = digram_color(1.0, 0.8);
        assert_ne!(early, late);
        assert_eq!(digram_color(0.5, 0.0), BACKGROUND);
    }
}
