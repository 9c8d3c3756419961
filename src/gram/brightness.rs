//! Automatic brightness estimation for the point-cloud views.
//!
//! Additive point clouds wash out on buffers dominated by a few byte values
//! and fade to nothing on near-uniform data. The heuristic measures how many
//! distinct byte values carry most of the buffer and darkens the suggested
//! exposure when that number is large.

/// Lower bound of the brightness slider.
pub const MIN_BRIGHTNESS: i32 = 25;

/// Upper bound of the brightness slider.
pub const MAX_BRIGHTNESS: i32 = 103;

/// Fraction of the buffer the dominant byte values must cover.
const HEURISTIC_THRESHOLD: f64 = 0.66;

/// Floor for the suggested value.
const HEURISTIC_MIN: i32 = 38;

/// Ceiling the suggestion counts down from.
const HEURISTIC_MAX: i32 = 66;

// Larger values keep more noise visible; smaller ones may hide sparse data.
const HEURISTIC_SCALING: f64 = 2.0;

/// Buffers shorter than this give a meaningless distribution.
const MIN_SAMPLE: usize = 100;

/// Suggest a brightness slider value for the given buffer.
///
/// Builds a 256-bin byte histogram, sorts it, and walks bins from the most
/// frequent down until the covered fraction passes the threshold. The number
/// of bins consumed, scaled down, is subtracted from the ceiling and floored.
/// The result always lies within the slider range.
pub fn suggest_brightness(data: &[u8]) -> i32 {
    if data.len() < MIN_SAMPLE {
        return (MIN_BRIGHTNESS + MAX_BRIGHTNESS) / 2;
    }

    let mut counts = [0u64; 256];
    for &byte in data {
        counts[byte as usize] += 1;
    }
    counts.sort_unstable();

    let threshold = (HEURISTIC_THRESHOLD * data.len() as f64) as u64;
    let mut covered = 0u64;
    let mut bins = 0usize;
    while bins < 255 && covered < threshold {
        covered += counts[255 - bins];
        bins += 1;
    }

    let offset = (bins as f64 / HEURISTIC_SCALING) as i32;
    (HEURISTIC_MAX - offset).max(HEURISTIC_MIN)
}

/// Exposure factor handed to the point scatter.
///
/// Grows cubically with the slider value and shrinks with buffer size so a
/// larger file does not saturate the accumulation. Clamped to 1.2.
pub fn shader_brightness(value: i32, data_len: usize) -> f32 {
    if data_len == 0 {
        return 0.0;
    }
    let v = value as f32;
    (v * v * v / data_len as f32).min(1.2)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_buffer_returns_midpoint() {
        assert_eq!(suggest_brightness(&[]), 64);
        assert_eq!(suggest_brightness(&[0u8; 99]), 64);
    }

    #[test]
    fn test_constant_data_suggests_ceiling() {
        // One bin covers everything, so the suggestion stays at the ceiling.
        let data = vec![0xaau8; 10_000];
        assert_eq!(suggest_brightness(&data), 66);
    }

    #[test]
    fn test_uniform_data_suggests_floor() {
        // Every value equally likely: ~169 bins needed for 66% coverage.
        let data: Vec<u8> = (0..65536).map(|i| (i % 256) as u8).collect();
        assert_eq!(suggest_brightness(&data), 38);
    }

    #[test]
    fn test_suggestion_always_within_bounds() {
        let inputs: Vec<Vec<u8>> = vec![
            vec![0u8; 5000],
            (0..5000).map(|i| (i * 37 % 256) as u8).collect(),
            (0..5000).map(|i| if i % 10 == 0 { 0xff } else { 0x20 }).collect(),
            (0..5000).map(|i| (i % 3) as u8).collect(),
        ];
        for data in inputs {
            let suggestion = suggest_brightness(&data);
            assert!(suggestion >= HEURISTIC_MIN && suggestion <= HEURISTIC_MAX);
            assert!(suggestion >= MIN_BRIGHTNESS && suggestion <= MAX_BRIGHTNESS);
        }
    }

    #[test]
    fn test_shader_brightness_clamped() {
        // Tiny buffer: the cubic term explodes, the clamp holds it at 1.2.
        assert_eq!(shader_brightness(MAX_BRIGHTNESS, 100), 1.2);
        // Huge buffer: fraction shrinks toward zero but stays non-negative.
        let dim = shader_brightness(MIN_BRIGHTNESS, 1 << 30);
        assert!(dim >= 0.0 && dim < 0.001);
        // Empty buffer contributes nothing rather than dividing by zero.
        assert_eq!(shader_brightness(MAX_BRIGHTNESS, 0), 0.0);
    }
}
