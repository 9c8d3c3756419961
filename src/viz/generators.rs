//! CPU pixel generation for the visualisation textures.
//!
//! Fallback path when no GPU renderer is available. Each generator scatters
//! points into an intensity grid and resolves the grid to colors; the math
//! mirrors the WGSL compute shaders.

use eframe::egui::Color32;
use glam::Mat4;
use rayon::prelude::*;

use crate::gram::{DigramTable, TABLE_CELLS, TABLE_DIM};
use crate::util::color::{digram_color, phosphor_color, BACKGROUND};
use crate::viz::projection::{digram_cell_position, project_point, BlendCoeffs};

/// A cell this many times brighter than the uniform expectation saturates.
const DIGRAM_EXPOSURE: f32 = 8.0;

/// Parameters for one point-cloud frame.
pub struct CloudParams {
    /// Combined perspective * model transform.
    pub view_proj: Mat4,
    /// Shape/mode blend coefficients.
    pub coeffs: BlendCoeffs,
    /// Per-point exposure from the brightness slider.
    pub brightness: f32,
    /// Render every n-th triple (1 = all). Large buffers are subsampled to
    /// keep the frame interactive; the skipped weight is folded back in.
    pub stride: usize,
}

/// Render the digram table to a square texture.
///
/// Each cell scatters once at its morphed position; intensity is the cell's
/// frequency relative to a uniform distribution, hue its mean source offset.
pub fn generate_digram_pixels(
    table: &DigramTable,
    data_len: usize,
    tex_size: usize,
    square: f32,
    circle: f32,
) -> Vec<Color32> {
    let mut intensity = vec![0.0f32; tex_size * tex_size];
    let mut hue_weight = vec![0.0f32; tex_size * tex_size];

    if data_len >= 2 {
        let scale = (tex_size - 1) as f32;
        for cell in 0..TABLE_CELLS {
            let count = table.count_at(cell);
            if count == 0 {
                continue;
            }
            let ratio = count as f64 * TABLE_CELLS as f64 / data_len as f64;
            let value = ((ratio as f32 / DIGRAM_EXPOSURE).sqrt()).min(1.0);

            let first = (cell / TABLE_DIM) as u8;
            let second = (cell % TABLE_DIM) as u8;
            let pos = digram_cell_position(first, second, square, circle);
            let x = (pos.x * scale) as usize;
            let y = (pos.y * scale) as usize;
            let idx = y * tex_size + x;
            intensity[idx] += value;
            hue_weight[idx] += value * table.mean_offset(cell, data_len);
        }
    }

    intensity
        .into_iter()
        .zip(hue_weight)
        .map(|(value, weighted)| {
            if value <= 0.0 {
                BACKGROUND
            } else {
                digram_color(weighted / value, value)
            }
        })
        .collect()
}

/// Render the byte-triple point cloud to a square texture.
///
/// Triples are projected through the blend coefficients and the camera
/// matrix, then accumulated additively per pixel. Runs in parallel with one
/// partial grid per rayon worker, summed at the end.
pub fn generate_cloud_pixels(data: &[u8], tex_size: usize, params: &CloudParams) -> Vec<Color32> {
    let total = data.len().saturating_sub(2);
    if total == 0 {
        return vec![BACKGROUND; tex_size * tex_size];
    }

    let stride = params.stride.max(1);
    // Subsampled points carry the weight of the ones skipped.
    let weight = params.brightness * stride as f32;
    let scale = (tex_size - 1) as f32;

    let grid = (0..total)
        .into_par_iter()
        .step_by(stride)
        .fold(
            || vec![0.0f32; tex_size * tex_size],
            |mut grid, i| {
                let triple = [data[i], data[i + 1], data[i + 2]];
                let p = project_point(triple, i, total, &params.coeffs);
                let clip = params.view_proj * p.extend(1.0);
                if clip.w > 0.0 {
                    let ndc = clip.truncate() / clip.w;
                    if ndc.x.abs() <= 1.0 && ndc.y.abs() <= 1.0 {
                        let x = ((ndc.x * 0.5 + 0.5) * scale) as usize;
                        let y = ((0.5 - ndc.y * 0.5) * scale) as usize;
                        grid[y * tex_size + x] += weight;
                    }
                }
                grid
            },
        )
        .reduce(
            || vec![0.0f32; tex_size * tex_size],
            |mut a, b| {
                for (acc, partial) in a.iter_mut().zip(b) {
                    *acc += partial;
                }
                a
            },
        );

    grid.into_iter().map(phosphor_color).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::{Mat4, Vec3};

    fn test_matrix() -> Mat4 {
        Mat4::perspective_rh(45f32.to_radians(), 1.0, 0.01, 100.0)
            * Mat4::from_translation(Vec3::new(0.0, 0.0, -5.0))
    }

    #[test]
    fn test_digram_texture_size() {
        let data: Vec<u8> = (0..1024).map(|i| (i % 251) as u8).collect();
        let table = DigramTable::build(&data);
        let pixels = generate_digram_pixels(&table, data.len(), 64, 1.0, 0.0);
        assert_eq!(pixels.len(), 64 * 64);
        assert!(pixels.iter().any(|&p| p != BACKGROUND), "some cells must light up");
    }

    #[test]
    fn test_digram_empty_buffer_renders_background() {
        let table = DigramTable::build(&[]);
        let pixels = generate_digram_pixels(&table, 0, 32, 1.0, 0.0);
        assert!(pixels.iter().all(|&p| p == BACKGROUND));
    }

    #[test]
    fn test_cloud_lights_pixels() {
        let data: Vec<u8> = (0..4096).map(|i| (i * 31 % 256) as u8).collect();
        let params = CloudParams {
            view_proj: test_matrix(),
            coeffs: BlendCoeffs::default(),
            brightness: 0.5,
            stride: 1,
        };
        let pixels = generate_cloud_pixels(&data, 64, &params);
        assert_eq!(pixels.len(), 64 * 64);
        assert!(pixels.iter().any(|&p| p != BACKGROUND));
    }

    #[test]
    fn test_cloud_short_buffers_render_background() {
        let params = CloudParams {
            view_proj: test_matrix(),
            coeffs: BlendCoeffs::default(),
            brightness: 1.0,
            stride: 1,
        };
        for data in [&[][..], &[1u8][..], &[1u8, 2][..]] {
            let pixels = generate_cloud_pixels(data, 16, &params);
            assert!(pixels.iter().all(|&p| p == BACKGROUND));
        }
    }

    #[test]
    fn test_cloud_stride_keeps_total_weight() {
        // With a pinhole camera every point lands somewhere; subsampling with
        // the compensating weight should keep overall exposure comparable.
        let data: Vec<u8> = (0..8192).map(|i| (i * 7 % 256) as u8).collect();
        let base = CloudParams {
            view_proj: test_matrix(),
            coeffs: BlendCoeffs::default(),
            brightness: 0.001,
            stride: 1,
        };
        let strided = CloudParams {
            view_proj: base.view_proj,
            coeffs: base.coeffs,
            brightness: base.brightness,
            stride: 8,
        };
        let sum = |pixels: Vec<Color32>| -> u64 {
            pixels.iter().map(|p| p.g() as u64).sum()
        };
        let full = sum(generate_cloud_pixels(&data, 32, &base));
        let sampled = sum(generate_cloud_pixels(&data, 32, &strided));
        let ratio = sampled as f64 / full as f64;
        assert!((0.5..=2.0).contains(&ratio), "stride weighting off: {ratio}");
    }
}
