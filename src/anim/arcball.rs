//! Mouse-driven rotation with inertia.

use glam::{Quat, Vec2, Vec3};

/// Angular speed multiplier applied per tick while paused.
const FRICTION: f32 = 0.90;

/// Speeds below this snap to a full stop.
const STOP_THRESHOLD: f32 = 0.01;

/// How much of the previous axis survives a new drag impulse.
const AXIS_MEMORY: f32 = 0.1875;

/// Blend factor easing the rotation toward its target per tick.
const TARGET_BLEND: f32 = 0.1;

/// Distance below which targeting snaps and stops.
const TARGET_SNAP: f32 = 0.01;

/// Default spin speed in degrees per tick.
pub const DEFAULT_SPIN: f32 = 0.3;

/// Rotation state for the 3D views.
///
/// Dragging blends the rotation axis toward the perpendicular of the sweep
/// and adds angular speed; each tick composes the axis rotation onto the
/// accumulated quaternion. Friction drains the speed while playback is
/// paused. An optional target eases the rotation back to identity.
pub struct Arcball {
    pub rotation: Quat,
    axis: Vec3,
    pub angular_speed: f32,
    targeting: bool,
}

impl Default for Arcball {
    fn default() -> Self {
        Self {
            rotation: Quat::IDENTITY,
            axis: Vec3::new(-1.0, 1.0, 0.0).normalize(),
            angular_speed: DEFAULT_SPIN,
            targeting: false,
        }
    }
}

impl Arcball {
    /// Apply a drag impulse.
    ///
    /// `diff` is the pointer sweep in pixels, `viewport` the widget size.
    /// The rotation axis is perpendicular to the sweep; the acceleration
    /// grows with the square of the sweep length, normalised by the
    /// viewport diagonal.
    pub fn drag(&mut self, diff: Vec2, viewport: Vec2) {
        let normal = Vec3::new(diff.y, diff.x, 0.0).normalize_or_zero();
        let acc = diff.length_squared() / viewport.length().max(1.0);
        if acc > 0.0 {
            self.axis = (self.axis * self.angular_speed * AXIS_MEMORY + normal * acc)
                .normalize_or_zero();
            if self.axis == Vec3::ZERO {
                self.axis = Vec3::new(-1.0, 1.0, 0.0).normalize();
            }
            self.angular_speed += acc;
        }
    }

    /// Kill the spin immediately (pointer grabbed the view).
    pub fn stop(&mut self) {
        self.angular_speed = 0.0;
    }

    /// Restart the default spin if the view has come to rest.
    pub fn kick(&mut self) {
        if self.angular_speed == 0.0 {
            self.angular_speed = DEFAULT_SPIN;
        }
    }

    /// Begin easing the rotation back to identity.
    pub fn begin_centering(&mut self) {
        self.targeting = true;
    }

    pub fn is_centering(&self) -> bool {
        self.targeting
    }

    /// Advance one tick. Returns true while anything is still moving.
    pub fn tick(&mut self, playing: bool) -> bool {
        let mut moving = false;

        if !playing {
            self.angular_speed *= FRICTION;
        }
        if self.angular_speed < STOP_THRESHOLD {
            self.angular_speed = 0.0;
        } else {
            self.rotation =
                Quat::from_axis_angle(self.axis, self.angular_speed.to_radians()) * self.rotation;
            moving = true;
        }

        if self.targeting {
            let target = Quat::IDENTITY;
            // Take the short arc; q and -q are the same rotation.
            if self.rotation.dot(target) < 0.0 {
                self.rotation = -self.rotation;
            }
            let blended = self.rotation * (1.0 - TARGET_BLEND) + target * TARGET_BLEND;
            if (target - blended).length() < TARGET_SNAP {
                self.rotation = target;
                self.targeting = false;
            } else {
                self.rotation = blended.normalize();
            }
            moving = true;
        }

        moving
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_friction_stops_rotation() {
        let mut ball = Arcball::default();
        ball.angular_speed = 10.0;
        for _ in 0..200 {
            ball.tick(false);
        }
        assert_eq!(ball.angular_speed, 0.0);
        assert!(!ball.tick(false), "stopped arcball reports no motion");
    }

    #[test]
    fn test_playing_keeps_speed() {
        let mut ball = Arcball::default();
        for _ in 0..100 {
            ball.tick(true);
        }
        assert!((ball.angular_speed - DEFAULT_SPIN).abs() < 1e-6);
    }

    #[test]
    fn test_rotation_stays_normalised() {
        let mut ball = Arcball::default();
        ball.drag(Vec2::new(40.0, 25.0), Vec2::new(800.0, 600.0));
        for _ in 0..500 {
            ball.tick(true);
        }
        assert!((ball.rotation.length() - 1.0).abs() < 1e-3);
    }

    #[test]
    fn test_drag_accelerates() {
        let mut ball = Arcball::default();
        let before = ball.angular_speed;
        ball.drag(Vec2::new(100.0, 0.0), Vec2::new(800.0, 600.0));
        assert!(ball.angular_speed > before);
    }

    #[test]
    fn test_centering_converges_to_identity() {
        let mut ball = Arcball::default();
        ball.angular_speed = 0.0;
        ball.rotation = Quat::from_axis_angle(Vec3::Y, 2.0);
        ball.begin_centering();
        for _ in 0..1000 {
            ball.tick(false);
            if !ball.is_centering() {
                break;
            }
        }
        assert!(!ball.is_centering(), "centering never terminated");
        assert_eq!(ball.rotation, Quat::IDENTITY);
    }

    #[test]
    fn test_centering_from_negated_quaternion() {
        let mut ball = Arcball::default();
        ball.angular_speed = 0.0;
        // Nearly -identity: same rotation, opposite sign.
        ball.rotation = -Quat::from_axis_angle(Vec3::X, 0.05);
        ball.begin_centering();
        for _ in 0..1000 {
            ball.tick(false);
            if !ball.is_centering() {
                break;
            }
        }
        assert!(!ball.is_centering());
    }
}
