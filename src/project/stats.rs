//! Recording progress figures shown on the dashboard.

use std::fmt;

use super::item::{ItemStatus, ScriptItem};

/// Sum of the durations of all recorded items, in seconds.
pub fn total_recorded_duration(items: &[ScriptItem]) -> f64 {
    items.iter().map(ScriptItem::effective_duration).sum()
}

/// `h:mm:ss` from one hour up, `m:ss` below.  Negative or non-finite input
/// formats as `0:00`.
///
/// ```
/// use voice_dataset_studio::project::format_duration;
///
/// assert_eq!(format_duration(65.0), "1:05");
/// assert_eq!(format_duration(3_725.9), "1:02:05");
/// ```
pub fn format_duration(total_secs: f64) -> String {
    let total = if total_secs.is_finite() && total_secs > 0.0 {
        total_secs.floor() as u64
    } else {
        0
    };
    let (h, m, s) = (total / 3_600, (total % 3_600) / 60, total % 60);

    if h > 0 {
        format!("{h}:{m:02}:{s:02}")
    } else {
        format!("{m}:{s:02}")
    }
}

/// Item counts per status plus the recorded total.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ProjectStats {
    pub total: usize,
    pub recorded: usize,
    pub pending: usize,
    pub skipped: usize,
    pub recorded_secs: f64,
}

impl ProjectStats {
    pub fn from_items(items: &[ScriptItem]) -> Self {
        let mut stats = Self {
            total: items.len(),
            recorded_secs: total_recorded_duration(items),
            ..Self::default()
        };
        for item in items {
            match item.status {
                ItemStatus::Recorded => stats.recorded += 1,
                ItemStatus::Pending => stats.pending += 1,
                ItemStatus::Skipped => stats.skipped += 1,
            }
        }
        stats
    }
}

impl fmt::Display for ProjectStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{} recorded ({} pending, {} skipped), {} of audio",
            self.recorded,
            self.total,
            self.pending,
            self.skipped,
            format_duration(self.recorded_secs)
        )
    }
}
