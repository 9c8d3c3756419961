//! Point placement for the digram texture and the 3D point clouds.
//!
//! The same math runs in the WGSL scatter shaders; keep the two in sync.

use glam::{Vec2, Vec3};
use std::f32::consts::{PI, TAU};

/// Blend coefficients morphing the point cloud between projections.
///
/// Each field is an eased value in [0, 1]. The trigram view's layered-digram
/// mode drives `layered_z`; the n-gram view drives all five.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct BlendCoeffs {
    pub cylinder: f32,
    pub sphere: f32,
    pub flat: f32,
    pub layered_x: f32,
    pub layered_z: f32,
}

/// Place one byte triple in [-1, 1]^3 space.
///
/// `index` is the triple's offset in the buffer, `total` the number of
/// triples; their ratio becomes the layering coordinate.
pub fn project_point(triple: [u8; 3], index: usize, total: usize, k: &BlendCoeffs) -> Vec3 {
    let a = triple[0] as f32 / 255.0;
    let b = triple[1] as f32 / 255.0;
    let c = triple[2] as f32 / 255.0;
    let t = if total > 1 {
        index as f32 / (total - 1) as f32
    } else {
        0.0
    };

    let cube = Vec3::new(a, b, c) * 2.0 - 1.0;

    // Cylinder wraps the first byte around the axis, radius from the third.
    let theta = TAU * a;
    let cylinder = Vec3::new(c * theta.sin(), b * 2.0 - 1.0, c * theta.cos());

    // Sphere maps the first two bytes to angles, radius from the third.
    let phi = PI * b;
    let sphere = Vec3::new(phi.sin() * theta.sin(), phi.cos(), phi.sin() * theta.cos()) * c;

    let mut p = cube.lerp(cylinder, k.cylinder).lerp(sphere, k.sphere);
    p.z *= 1.0 - k.flat;
    let layer = 2.0 * t - 1.0;
    p.x += (layer - p.x) * k.layered_x;
    p.z += (layer - p.z) * k.layered_z;
    p
}

/// Place one digram cell in the unit square, morphing between the plain
/// square layout and a polar one.
///
/// `square` and `circle` are the two shape easings; while both are mid-flight
/// the position is their weighted average.
pub fn digram_cell_position(first: u8, second: u8, square: f32, circle: f32) -> Vec2 {
    let u = (first as f32 + 0.5) / 256.0;
    let v = (second as f32 + 0.5) / 256.0;
    let square_pos = Vec2::new(u, v);

    let theta = TAU * u;
    let radius = 0.5 * v;
    let circle_pos = Vec2::new(0.5 + radius * theta.sin(), 0.5 + radius * theta.cos());

    let total = square + circle;
    if total <= f32::EPSILON {
        square_pos
    } else {
        (square_pos * square + circle_pos * circle) / total
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn all_triples() -> impl Iterator<Item = [u8; 3]> {
        (0..64u32).map(|i| [(i * 4) as u8, (i * 7 % 256) as u8, (i * 13 % 256) as u8])
    }

    #[test]
    fn test_zero_coeffs_give_cube() {
        let k = BlendCoeffs::default();
        let p = project_point([0, 0, 0], 0, 10, &k);
        assert_eq!(p, Vec3::splat(-1.0));
        let p = project_point([255, 255, 255], 0, 10, &k);
        assert_eq!(p, Vec3::splat(1.0));
    }

    #[test]
    fn test_projection_bounded() {
        let coeff_sets = [
            BlendCoeffs::default(),
            BlendCoeffs { cylinder: 1.0, ..Default::default() },
            BlendCoeffs { sphere: 1.0, ..Default::default() },
            BlendCoeffs { cylinder: 0.5, sphere: 0.5, flat: 0.5, layered_x: 0.3, layered_z: 0.7 },
        ];
        for k in &coeff_sets {
            for (i, triple) in all_triples().enumerate() {
                let p = project_point(triple, i, 64, k);
                assert!(p.abs().max_element() <= 1.0 + 1e-5, "{p:?} escapes the unit cube");
            }
        }
    }

    #[test]
    fn test_full_layering_pins_axes() {
        let k = BlendCoeffs { layered_z: 1.0, ..Default::default() };
        let first = project_point([9, 9, 9], 0, 100, &k);
        let last = project_point([9, 9, 9], 99, 100, &k);
        assert!((first.z + 1.0).abs() < 1e-6);
        assert!((last.z - 1.0).abs() < 1e-6);

        let k = BlendCoeffs { layered_x: 1.0, ..Default::default() };
        let mid = project_point([0, 0, 0], 50, 101, &k);
        assert!(mid.x.abs() < 1e-6);
    }

    #[test]
    fn test_flat_squashes_depth() {
        let k = BlendCoeffs { flat: 1.0, ..Default::default() };
        for (i, triple) in all_triples().enumerate() {
            let p = project_point(triple, i, 64, &k);
            assert!(p.z.abs() < 1e-6);
        }
    }

    #[test]
    fn test_single_triple_has_no_layer() {
        let k = BlendCoeffs { layered_z: 1.0, ..Default::default() };
        let p = project_point([128, 128, 128], 0, 1, &k);
        assert!((p.z + 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_digram_positions_in_unit_square() {
        for &(square, circle) in &[(1.0, 0.0), (0.0, 1.0), (0.4, 0.6), (0.0, 0.0)] {
            for first in (0..=255u8).step_by(17) {
                for second in (0..=255u8).step_by(17) {
                    let p = digram_cell_position(first, second, square, circle);
                    assert!((0.0..=1.0).contains(&p.x) && (0.0..=1.0).contains(&p.y));
                }
            }
        }
    }
}
