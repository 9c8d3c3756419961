//! Free-flight camera with eased targeting.

use glam::Vec3;

/// Speed magnitude above which movement input stops accruing.
const MAX_SPEED: f32 = 5.0;

/// Speed multiplier applied per tick.
const DECAY: f32 = 0.90;

/// Per-component speeds below this collapse to zero.
const DEAD_ZONE: f32 = 0.001;

/// Fraction of the speed applied to the position per tick.
const STEP_SCALE: f32 = 0.01;

/// Fly-around viewing distance.
pub const HOME: Vec3 = Vec3::new(0.0, 0.0, -5.0);

/// Close-up position framing a flattened projection.
pub const FLAT_VIEW: Vec3 = Vec3::new(0.0, 0.0, -2.414);

/// Camera state for the n-gram view.
///
/// Keyboard input sets a unit movement vector; speed accrues from it scaled
/// by distance from the origin, decays every tick, and integrates into the
/// position. "Center view" installs a target that overrides the speed until
/// the camera arrives or overshoots, then snaps.
pub struct Camera {
    pub position: Vec3,
    speed: Vec3,
    pub movement: Vec3,
    target: Option<Vec3>,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            position: HOME,
            speed: Vec3::ZERO,
            movement: Vec3::ZERO,
            target: None,
        }
    }
}

impl Camera {
    /// Start easing toward `target`.
    pub fn ease_to(&mut self, target: Vec3) {
        self.target = Some(target);
    }

    pub fn is_targeting(&self) -> bool {
        self.target.is_some()
    }

    /// Mouse-wheel zoom: quadratic in the scroll distance, signed.
    pub fn nudge_z(&mut self, wheel_delta: f32) {
        let m = wheel_delta / 8.0 / 15.0;
        self.speed.z += 2.0 * m * m.abs();
    }

    /// Advance one tick. Returns true while anything is still moving.
    pub fn tick(&mut self) -> bool {
        if self.speed.length() < MAX_SPEED {
            // Farther from the origin, faster response to held keys.
            let reach = (1.0 + self.position.length()).sqrt().ln();
            self.speed += self.movement * reach + self.movement * (0.2 * self.speed.length());
        }

        if self.speed.x.abs() < DEAD_ZONE {
            self.speed.x = 0.0;
        }
        if self.speed.y.abs() < DEAD_ZONE {
            self.speed.y = 0.0;
        }
        if self.speed.z.abs() < DEAD_ZONE {
            self.speed.z = 0.0;
        }

        let approach = self
            .target
            .map(|t| (t - self.position).normalize_or_zero());
        if let Some(target) = self.target {
            let delta = target - self.position;
            self.speed = delta.normalize_or_zero() * (1.0 + delta.length()).powi(2);
        }

        self.position += self.speed * STEP_SCALE;
        self.speed *= DECAY;

        if let (Some(target), Some(dir)) = (self.target, approach) {
            let after = (target - self.position).normalize_or_zero();
            // Arrived, or stepped past the target and flipped direction.
            if after == Vec3::ZERO || after.dot(dir) < 0.999 {
                self.position = target;
                self.speed = Vec3::ZERO;
                self.target = None;
            }
        }

        self.speed != Vec3::ZERO || self.movement != Vec3::ZERO || self.target.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_idle_camera_reports_no_motion() {
        let mut cam = Camera::default();
        assert!(!cam.tick());
        assert_eq!(cam.position, HOME);
    }

    #[test]
    fn test_movement_accelerates_and_decays() {
        let mut cam = Camera::default();
        cam.movement = Vec3::new(1.0, 0.0, 0.0);
        for _ in 0..50 {
            cam.tick();
        }
        assert!(cam.position.x > 0.0);

        cam.movement = Vec3::ZERO;
        for _ in 0..500 {
            cam.tick();
        }
        assert!(!cam.tick(), "camera coasts to a stop after input ends");
    }

    #[test]
    fn test_targeting_terminates_at_target() {
        for target in [FLAT_VIEW, HOME, Vec3::new(2.0, -1.0, -8.0)] {
            let mut cam = Camera::default();
            cam.position = Vec3::new(-3.0, 4.0, -1.0);
            cam.ease_to(target);
            let mut ticks = 0;
            while cam.is_targeting() {
                cam.tick();
                ticks += 1;
                assert!(ticks < 10_000, "targeting diverged for {target:?}");
            }
            assert_eq!(cam.position, target);
        }
    }

    #[test]
    fn test_targeting_already_at_target() {
        let mut cam = Camera::default();
        cam.ease_to(cam.position);
        for _ in 0..100 {
            cam.tick();
            if !cam.is_targeting() {
                break;
            }
        }
        assert!(!cam.is_targeting());
    }

    #[test]
    fn test_wheel_zoom_is_signed() {
        let mut cam = Camera::default();
        cam.nudge_z(120.0);
        assert!(cam.tick());
        assert!(cam.position.z > HOME.z);

        let mut cam = Camera::default();
        cam.nudge_z(-120.0);
        cam.tick();
        assert!(cam.position.z < HOME.z);
    }
}
