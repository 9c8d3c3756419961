//! Visualization pixel generation.
//!
//! This module contains the projection math shared by the CPU and GPU paths
//! and the CPU-based pixel generators for each view:
//! - Digram texture (byte-pair frequencies, square/circle morph)
//! - Trigram / n-gram point cloud (byte triples, cube/cylinder/sphere morph)

mod generators;
pub mod projection;

pub use generators::{generate_cloud_pixels, generate_digram_pixels, CloudParams};
pub use projection::{digram_cell_position, project_point, BlendCoeffs};
