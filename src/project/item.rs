//! Script items: one utterance slot of a recording project.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// ItemStatus
// ---------------------------------------------------------------------------

/// Recording state of a [`ScriptItem`].
///
/// Only [`ItemStatus::Recorded`] items are batch-processed and exported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemStatus {
    #[default]
    Pending,
    Recorded,
    Skipped,
}

impl ItemStatus {
    /// Lowercase label, identical to the JSON tag.
    pub fn label(&self) -> &'static str {
        match self {
            ItemStatus::Pending => "pending",
            ItemStatus::Recorded => "recorded",
            ItemStatus::Skipped => "skipped",
        }
    }
}

// ---------------------------------------------------------------------------
// ScriptItem
// ---------------------------------------------------------------------------

/// One sentence of the project script.
///
/// Position in the project's item list matters: unless `source_filename` is
/// pinned, the item's audio lives at `file_{N:04d}.wav` where `N` is its
/// 1-based position in the full list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScriptItem {
    /// Opaque, stable, never reused.
    pub id: String,
    pub text: String,
    #[serde(default)]
    pub status: ItemStatus,
    /// Seconds; meaningful only while `status == Recorded`.
    #[serde(default)]
    pub duration: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_path: Option<String>,
    /// Audio file name pinned at recording time.  Replaces the index-derived
    /// name when present.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_filename: Option<String>,
}

impl ScriptItem {
    /// A fresh, unrecorded item.
    pub fn new(id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
            status: ItemStatus::Pending,
            duration: 0.0,
            file_path: None,
            source_filename: None,
        }
    }

    /// An item that already has a take of `duration` seconds.
    pub fn recorded(id: impl Into<String>, text: impl Into<String>, duration: f64) -> Self {
        Self {
            status: ItemStatus::Recorded,
            duration,
            ..Self::new(id, text)
        }
    }

    /// Mark as skipped (builder style, mostly for tests and imports).
    pub fn skipped(mut self) -> Self {
        self.status = ItemStatus::Skipped;
        self.duration = 0.0;
        self
    }

    pub fn is_recorded(&self) -> bool {
        self.status == ItemStatus::Recorded
    }

    /// Duration that counts towards totals: `0` unless recorded, and never
    /// negative or NaN.
    pub fn effective_duration(&self) -> f64 {
        if self.is_recorded() && self.duration.is_finite() && self.duration > 0.0 {
            self.duration
        } else {
            0.0
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
