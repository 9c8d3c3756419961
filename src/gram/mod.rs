//! Frequency statistics driving the visualisations.
//!
//! - Adjacent byte-pair table for the digram texture
//! - Byte-distribution brightness heuristic for the point-cloud views

pub mod brightness;
pub mod histogram;

pub use brightness::{
    shader_brightness, suggest_brightness, MAX_BRIGHTNESS, MIN_BRIGHTNESS,
};
pub use histogram::{DigramTable, TABLE_CELLS, TABLE_DIM};
