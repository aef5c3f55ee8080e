//! Project model: script items, `project.json`, audio file resolution.
//!
//! # On-disk layout
//!
//! ```text
//! <project>/
//! ├── project.json          ← Project (items in script order)
//! ├── wavs/                 ← raw takes, file_0001.wav …
//! └── wavs_processed/       ← effect-processed takes, processed_{id}.wav …
//! ```

pub mod item;
pub mod source;
pub mod stats;
pub mod store;

pub use item::{ItemStatus, ScriptItem};
pub use source::{
    indexed_filename, processed_filename, SourcePolicy, SourceResolver, PROCESSED_DIR, RAW_DIR,
};
pub use stats::{format_duration, total_recorded_duration, ProjectStats};
pub use store::{Project, ProjectError, PROJECT_FILE};
