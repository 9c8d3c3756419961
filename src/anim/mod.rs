//! Per-frame animation state for the visualisation views.
//!
//! All three pieces advance on a fixed ~16 ms tick:
//! - `Easing` - blend coefficients moving linearly toward 0 or 1
//! - `Arcball` - drag-driven rotation with friction
//! - `Camera` - free-flight position with eased targeting

pub mod arcball;
pub mod camera;
pub mod easing;

pub use arcball::Arcball;
pub use camera::{Camera, FLAT_VIEW, HOME};
pub use easing::Easing;

/// Seconds per animation tick.
pub const TICK_SECONDS: f32 = 0.016;
