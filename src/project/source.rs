//! Source resolution: which audio file stands behind a script item.
//!
//! A project keeps raw takes in `wavs/` and effect-processed copies in
//! `wavs_processed/`.  Files are named `file_{N:04d}.wav` after the item's
//! 1-based position in the full item list, unless the item pins its own
//! `source_filename`.  The batch processor writes `processed_{id}.wav`.
//!
//! ```text
//! PerFile (default)                       WholeExport (legacy)
//! ─────────────────                       ────────────────────
//! 1. wavs_processed/<name>                wavs_processed/ exists?
//! 2. wavs_processed/processed_{id}.wav      yes → 1. and 2. only
//! 3. wavs/<name>                            no  → 3. only
//! ```

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::item::ScriptItem;

/// Directory of as-recorded takes, relative to the project.
pub const RAW_DIR: &str = "wavs";

/// Directory of effect-processed takes, relative to the project.
pub const PROCESSED_DIR: &str = "wavs_processed";

/// `file_{n:04d}.wav`, the on-disk name of the item at 1-based index `n`.
///
/// ```
/// use voice_dataset_studio::project::indexed_filename;
///
/// assert_eq!(indexed_filename(1), "file_0001.wav");
/// assert_eq!(indexed_filename(12345), "file_12345.wav");
/// ```
pub fn indexed_filename(n: usize) -> String {
    format!("file_{n:04}.wav")
}

/// `processed_{id}.wav`, the batch processor's output name for an item.
///
/// Like pinned names, the id is reduced to its final path component so the
/// file always lands directly inside the processed directory.
///
/// ```
/// use voice_dataset_studio::project::processed_filename;
///
/// assert_eq!(processed_filename("abc"), "processed_abc.wav");
/// assert_eq!(processed_filename("../../etc/x"), "processed_x.wav");
/// ```
pub fn processed_filename(id: &str) -> String {
    let id = Path::new(id)
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or_default();
    format!("processed_{id}.wav")
}

// ---------------------------------------------------------------------------
// SourcePolicy
// ---------------------------------------------------------------------------

/// How processed and raw takes are chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourcePolicy {
    /// Check the processed directory per file, fall back to raw per file.
    #[default]
    PerFile,
    /// Use `wavs_processed/` for everything if it exists at all.
    WholeExport,
}

impl fmt::Display for SourcePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourcePolicy::PerFile => write!(f, "per_file"),
            SourcePolicy::WholeExport => write!(f, "whole_export"),
        }
    }
}

impl FromStr for SourcePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "per_file" => Ok(SourcePolicy::PerFile),
            "whole_export" => Ok(SourcePolicy::WholeExport),
            other => Err(format!(
                "unknown source policy `{other}` (expected per_file or whole_export)"
            )),
        }
    }
}

// ---------------------------------------------------------------------------
// SourceResolver
// ---------------------------------------------------------------------------

/// Resolves script items to audio files inside one project directory.
///
/// The `WholeExport` decision is taken once, when the resolver is built, so
/// a whole export pass sees a single answer.
#[derive(Debug, Clone)]
pub struct SourceResolver {
    raw_dir: PathBuf,
    processed_dir: PathBuf,
    policy: SourcePolicy,
    processed_dir_exists: bool,
}

impl SourceResolver {
    pub fn new(project_dir: impl AsRef<Path>, policy: SourcePolicy) -> Self {
        let project_dir = project_dir.as_ref();
        let processed_dir = project_dir.join(PROCESSED_DIR);
        Self {
            raw_dir: project_dir.join(RAW_DIR),
            processed_dir_exists: processed_dir.is_dir(),
            processed_dir,
            policy,
        }
    }

    pub fn policy(&self) -> SourcePolicy {
        self.policy
    }

    pub fn raw_dir(&self) -> &Path {
        &self.raw_dir
    }

    pub fn processed_dir(&self) -> &Path {
        &self.processed_dir
    }

    /// File name of the item's take: the pinned name, or the index-derived one.
    ///
    /// Pinned names are reduced to their final component so a project file
    /// cannot point outside its audio directories.
    pub fn filename_for(index: usize, item: &ScriptItem) -> String {
        item.source_filename
            .as_deref()
            .and_then(|name| Path::new(name).file_name())
            .and_then(|name| name.to_str())
            .map(str::to_owned)
            .unwrap_or_else(|| indexed_filename(index))
    }

    /// Path of the raw take, whether or not it exists.
    pub fn raw_path(&self, index: usize, item: &ScriptItem) -> PathBuf {
        self.raw_dir.join(Self::filename_for(index, item))
    }

    /// Every path that may hold the item's audio, most preferred first.
    pub fn candidates(&self, index: usize, item: &ScriptItem) -> Vec<PathBuf> {
        let name = Self::filename_for(index, item);
        let processed = [
            self.processed_dir.join(&name),
            self.processed_dir.join(processed_filename(&item.id)),
        ];
        let raw = self.raw_dir.join(&name);

        match self.policy {
            SourcePolicy::PerFile => processed.into_iter().chain(Some(raw)).collect(),
            SourcePolicy::WholeExport if self.processed_dir_exists => processed.into(),
            SourcePolicy::WholeExport => vec![raw],
        }
    }

    /// First existing candidate for the item at 1-based `index`, or `None`
    /// when the item has no audio on disk.
    pub fn resolve(&self, index: usize, item: &ScriptItem) -> Option<PathBuf> {
        self.candidates(index, item)
            .into_iter()
            .find(|path| path.is_file())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
