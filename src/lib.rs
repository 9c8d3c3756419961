//! Gramscope - digram/trigram/n-gram visualiser for binary files.
//!
//! This library provides the building blocks of the visualiser:
//! - Byte-pair frequency tables and the brightness heuristic
//! - Animation easing, arcball rotation and camera physics
//! - CPU pixel generators and the wgpu compute renderer
//! - Persistent settings and the keyboard shortcut registry

pub mod anim;
pub mod app;
pub mod gpu;
pub mod gram;
pub mod settings;
pub mod util;
pub mod viz;
