//! Persistent settings and the shortcut registry.
//!
//! - `Settings` - TOML-backed key/value store (theme, hex columns,
//!   shortcut overrides)
//! - `ShortcutRegistry` - action name -> key binding, persisted through
//!   the store

pub mod shortcuts;
pub mod store;

pub use shortcuts::{KeyBinding, Shortcut, ShortcutRegistry};
pub use store::Settings;
