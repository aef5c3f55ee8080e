//! Batch progress: the callback counter and a pollable snapshot.
//!
//! [`ProgressCounter`] owns the completed-count of one run.  Each finished
//! item increments it and invokes the caller's `on_progress` **while the
//! lock is held**, so reported counts are strictly increasing at any
//! concurrency.
//!
//! [`SharedProgress`] is a type alias for `Arc<Mutex<BatchProgress>>`:
//! cheap to clone, and updated by the counter so a status line or UI can
//! poll the run without a callback.

use std::sync::{Arc, Mutex, PoisonError};

// ---------------------------------------------------------------------------
// BatchPhase
// ---------------------------------------------------------------------------

/// Lifecycle of a batch run.
///
/// ```text
/// Idle ──process()──▶ Running ──all items accounted──▶ Finished
///                        └──── cancel_handle().cancel() ─▶ Cancelled
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BatchPhase {
    #[default]
    Idle,
    Running,
    Finished,
    Cancelled,
}

impl BatchPhase {
    /// A short human-readable label for status output.
    pub fn label(&self) -> &'static str {
        match self {
            BatchPhase::Idle => "Idle",
            BatchPhase::Running => "Processing",
            BatchPhase::Finished => "Done",
            BatchPhase::Cancelled => "Cancelled",
        }
    }
}

// ---------------------------------------------------------------------------
// BatchProgress / SharedProgress
// ---------------------------------------------------------------------------

/// Snapshot of a batch run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BatchProgress {
    pub phase: BatchPhase,
    /// Items accounted for, whatever their outcome.
    pub completed: usize,
    pub total: usize,
    /// Items that finished without output.
    pub failed: usize,
}

impl BatchProgress {
    /// Completion in `[0, 1]`; an empty run counts as complete.
    pub fn fraction(&self) -> f32 {
        if self.total == 0 {
            1.0
        } else {
            self.completed as f32 / self.total as f32
        }
    }
}

/// Thread-safe handle to [`BatchProgress`].
///
/// Lock for a short critical section; do **not** hold the lock across
/// `.await` points.
pub type SharedProgress = Arc<Mutex<BatchProgress>>;

/// Construct a new [`SharedProgress`] in the `Idle` phase.
pub fn new_shared_progress() -> SharedProgress {
    Arc::new(Mutex::new(BatchProgress::default()))
}

// ---------------------------------------------------------------------------
// ProgressCounter
// ---------------------------------------------------------------------------

pub(crate) type ProgressFn = dyn Fn(usize, usize) + Send + Sync;

/// Completed-count of one batch run plus its reporting sinks.
pub(crate) struct ProgressCounter {
    completed: Mutex<usize>,
    total: usize,
    on_progress: Box<ProgressFn>,
    shared: SharedProgress,
}

impl ProgressCounter {
    /// Reset `shared` to `Running` and report `(0, total)`.
    pub(crate) fn start(
        total: usize,
        on_progress: Box<ProgressFn>,
        shared: SharedProgress,
    ) -> Self {
        {
            let mut snap = shared.lock().unwrap_or_else(PoisonError::into_inner);
            *snap = BatchProgress {
                phase: BatchPhase::Running,
                completed: 0,
                total,
                failed: 0,
            };
        }
        on_progress(0, total);

        Self {
            completed: Mutex::new(0),
            total,
            on_progress,
            shared,
        }
    }

    /// Account for one more item (increment-then-report under the lock).
    pub(crate) fn tick(&self, failed: bool) {
        let mut done = self.completed.lock().unwrap_or_else(PoisonError::into_inner);
        *done += 1;

        {
            let mut snap = self.shared.lock().unwrap_or_else(PoisonError::into_inner);
            snap.completed = *done;
            if failed {
                snap.failed += 1;
            }
        }

        (self.on_progress)(*done, self.total);
    }

    /// Close the run in the shared snapshot.
    pub(crate) fn finish(&self, cancelled: bool) {
        let mut snap = self.shared.lock().unwrap_or_else(PoisonError::into_inner);
        snap.phase = if cancelled {
            BatchPhase::Cancelled
        } else {
            BatchPhase::Finished
        };
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
