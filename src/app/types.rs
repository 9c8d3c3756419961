//! Core types for the per-view visualisation state.

use std::path::PathBuf;
use std::sync::Arc;

use memmap2::Mmap;

use crate::anim::{Arcball, Camera, Easing, FLAT_VIEW, HOME};
use crate::viz::BlendCoeffs;

// =============================================================================
// View Mode
// =============================================================================

/// Available visualisation views.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum ViewMode {
    /// 2D byte-pair frequency texture.
    #[default]
    Digram,
    /// 3D byte-triple point cloud with a layered-digram mode.
    Trigram,
    /// Extended 3D point cloud with layering toggles and a free camera.
    Ngram,
}

impl ViewMode {
    /// Get display name for the view.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Digram => "Digram",
            Self::Trigram => "Trigram",
            Self::Ngram => "N-gram",
        }
    }

    /// Get all available views.
    pub fn all() -> &'static [Self] {
        &[Self::Digram, Self::Trigram, Self::Ngram]
    }
}

// =============================================================================
// Shapes and Modes
// =============================================================================

/// Layouts for the digram texture.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum DigramShape {
    #[default]
    Square,
    Circle,
}

/// Solid projections for the point-cloud views.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum SolidShape {
    #[default]
    Cube,
    Cylinder,
    Sphere,
}

/// Display modes of the trigram view.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum TrigramMode {
    #[default]
    Trigram,
    /// Byte pairs in the plane, file position along the depth axis.
    LayeredDigram,
}

// =============================================================================
// Per-View State
// =============================================================================

/// State of the 2D digram view.
#[derive(Default)]
pub struct DigramView {
    pub shape: DigramShape,
    pub square: Easing,
    pub circle: Easing,
}

impl DigramView {
    /// Advance the shape easings one tick. Returns true while still moving.
    pub fn tick(&mut self) -> bool {
        let square = self.square.step_toward(self.shape == DigramShape::Square);
        let circle = self.circle.step_toward(self.shape == DigramShape::Circle);
        square || circle
    }
}

/// State of the 3D trigram view.
pub struct TrigramView {
    pub shape: SolidShape,
    pub mode: TrigramMode,
    pub cylinder: Easing,
    pub sphere: Easing,
    /// Drives the layered-digram depth blend.
    pub layer: Easing,
    pub arcball: Arcball,
    pub playing: bool,
}

impl Default for TrigramView {
    fn default() -> Self {
        Self {
            shape: SolidShape::default(),
            mode: TrigramMode::default(),
            cylinder: Easing::default(),
            sphere: Easing::default(),
            layer: Easing::default(),
            arcball: Arcball::default(),
            playing: true,
        }
    }
}

impl TrigramView {
    /// Switch display mode, jumping the blend when `animate` is false.
    pub fn set_mode(&mut self, mode: TrigramMode, animate: bool) {
        self.mode = mode;
        if !animate {
            self.layer.set(match mode {
                TrigramMode::LayeredDigram => 1.0,
                TrigramMode::Trigram => 0.0,
            });
        }
    }

    pub fn toggle_play(&mut self) {
        self.playing = !self.playing;
        if self.playing {
            self.arcball.kick();
        }
    }

    /// Advance easings and rotation one tick.
    pub fn tick(&mut self) -> bool {
        let cylinder = self.cylinder.step_toward(self.shape == SolidShape::Cylinder);
        let sphere = self.sphere.step_toward(self.shape == SolidShape::Sphere);
        let layer = self.layer.step_toward(self.mode == TrigramMode::LayeredDigram);
        let rotation = self.arcball.tick(self.playing);
        cylinder || sphere || layer || rotation
    }

    pub fn coeffs(&self) -> BlendCoeffs {
        BlendCoeffs {
            cylinder: self.cylinder.value(),
            sphere: self.sphere.value(),
            flat: 0.0,
            layered_x: 0.0,
            layered_z: self.layer.value(),
        }
    }
}

/// State of the 3D n-gram view.
pub struct NgramView {
    pub shape: SolidShape,
    pub flat: bool,
    pub layered_x: bool,
    pub layered_z: bool,
    pub cylinder: Easing,
    pub sphere: Easing,
    pub flat_coeff: Easing,
    pub layered_x_coeff: Easing,
    pub layered_z_coeff: Easing,
    pub arcball: Arcball,
    pub camera: Camera,
    pub playing: bool,
}

impl Default for NgramView {
    fn default() -> Self {
        Self {
            shape: SolidShape::default(),
            flat: false,
            layered_x: false,
            layered_z: false,
            cylinder: Easing::default(),
            sphere: Easing::default(),
            flat_coeff: Easing::default(),
            layered_x_coeff: Easing::default(),
            layered_z_coeff: Easing::default(),
            arcball: Arcball::default(),
            camera: Camera::default(),
            playing: true,
        }
    }
}

impl NgramView {
    pub fn toggle_play(&mut self) {
        self.playing = !self.playing;
        if self.playing {
            self.arcball.kick();
        }
    }

    /// Toggle layering along x. The two layered modes are mutually exclusive
    /// unless `combine` is set.
    pub fn set_layered_x(&mut self, value: bool, combine: bool) {
        if value && !combine {
            self.layered_z = false;
        }
        self.layered_x = value;
    }

    /// Toggle layering along z (disabled while flat).
    pub fn set_layered_z(&mut self, value: bool, combine: bool) {
        if value && !combine {
            self.layered_x = false;
        }
        self.layered_z = value;
    }

    /// Ease the camera back to a sensible viewpoint.
    ///
    /// A flat non-sphere projection reads best face-on: stop the spin and
    /// straighten the rotation while closing in. Otherwise return to the
    /// orbit distance and let the spin resume.
    pub fn center_view(&mut self) {
        if self.flat && self.shape != SolidShape::Sphere {
            self.playing = false;
            self.camera.ease_to(FLAT_VIEW);
            self.arcball.begin_centering();
        } else {
            if !self.playing {
                self.playing = true;
                self.arcball.kick();
            }
            self.camera.ease_to(HOME);
        }
    }

    /// Advance easings, rotation and camera one tick.
    pub fn tick(&mut self) -> bool {
        let cylinder = self.cylinder.step_toward(self.shape == SolidShape::Cylinder);
        let sphere = self.sphere.step_toward(self.shape == SolidShape::Sphere);
        let flat = self.flat_coeff.step_toward(self.flat);
        let lx = self.layered_x_coeff.step_toward(self.layered_x);
        let lz = self.layered_z_coeff.step_toward(self.layered_z);
        let rotation = self.arcball.tick(self.playing);
        let camera = self.camera.tick();
        cylinder || sphere || flat || lx || lz || rotation || camera
    }

    pub fn coeffs(&self) -> BlendCoeffs {
        BlendCoeffs {
            cylinder: self.cylinder.value(),
            sphere: self.sphere.value(),
            flat: self.flat_coeff.value(),
            layered_x: self.layered_x_coeff.value(),
            layered_z: self.layered_z_coeff.value(),
        }
    }
}

// =============================================================================
// File Data
// =============================================================================

/// Loaded file information and data.
pub struct FileData {
    /// Memory-mapped file data (efficient for large files).
    pub data: Arc<Mmap>,
    /// File size in bytes.
    pub size: u64,
    /// Original file path.
    pub path: PathBuf,
    /// File name for the title bar.
    pub title: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_digram_view_settles_on_active_shape() {
        let mut view = DigramView::default();
        for _ in 0..150 {
            view.tick();
        }
        assert_eq!(view.square.value(), 1.0);
        assert_eq!(view.circle.value(), 0.0);

        view.shape = DigramShape::Circle;
        for _ in 0..150 {
            view.tick();
        }
        assert_eq!(view.square.value(), 0.0);
        assert_eq!(view.circle.value(), 1.0);
        assert!(!view.tick(), "settled view reports no motion");
    }

    #[test]
    fn test_trigram_mode_jump_without_animation() {
        let mut view = TrigramView::default();
        view.set_mode(TrigramMode::LayeredDigram, false);
        assert_eq!(view.layer.value(), 1.0);
        view.set_mode(TrigramMode::Trigram, false);
        assert_eq!(view.layer.value(), 0.0);
    }

    #[test]
    fn test_trigram_coeffs_follow_shape() {
        let mut view = TrigramView::default();
        view.shape = SolidShape::Sphere;
        for _ in 0..150 {
            view.tick();
        }
        let coeffs = view.coeffs();
        assert_eq!(coeffs.sphere, 1.0);
        assert_eq!(coeffs.cylinder, 0.0);
    }

    #[test]
    fn test_ngram_layered_modes_exclusive() {
        let mut view = NgramView::default();
        view.set_layered_x(true, false);
        view.set_layered_z(true, false);
        assert!(!view.layered_x);
        assert!(view.layered_z);

        view.set_layered_x(true, true);
        assert!(view.layered_x && view.layered_z);
    }

    #[test]
    fn test_ngram_center_view_flat() {
        let mut view = NgramView::default();
        view.flat = true;
        view.center_view();
        assert!(!view.playing);
        assert!(view.camera.is_targeting());
        assert!(view.arcball.is_centering());
    }

    #[test]
    fn test_ngram_center_view_resumes_spin() {
        let mut view = NgramView::default();
        view.playing = false;
        view.arcball.stop();
        view.center_view();
        assert!(view.playing);
        assert!(view.arcball.angular_speed > 0.0);
    }

    #[test]
    fn test_ngram_coeffs_stay_in_unit_range() {
        let mut view = NgramView::default();
        view.flat = true;
        view.layered_x = true;
        for _ in 0..500 {
            view.tick();
            let k = view.coeffs();
            for v in [k.cylinder, k.sphere, k.flat, k.layered_x, k.layered_z] {
                assert!((0.0..=1.0).contains(&v));
            }
        }
    }
}
