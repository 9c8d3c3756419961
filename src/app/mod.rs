//! Application state and types.
//!
//! - `GramApp` - main application state
//! - `ViewMode` - digram / trigram / n-gram selection
//! - Per-view state structs holding shape choices and animation easings
//! - `FileData` - loaded file information

mod state;
mod types;

pub use state::GramApp;
pub use types::{
    DigramShape, DigramView, FileData, NgramView, SolidShape, TrigramMode, TrigramView, ViewMode,
};
