//! Batch effects processing: one profile over many recordings.
//!
//! # Architecture
//!
//! ```text
//! Vec<BatchItem> ──▶ BatchProcessor ──(Semaphore, JoinSet)──▶ item tasks
//!                        │                                      │
//!                        │    AudioReader ─▶ decode/render/encode ─▶ AudioWriter
//!                        │                                      │
//!                        ◀──────── ProgressCounter ◀────────────┘
//!                        │            ├─▶ on_progress(done, total)
//!                        │            └─▶ SharedProgress snapshot
//!                        ▼
//!                   BatchReport (input order)
//! ```

pub mod io;
pub mod processor;
pub mod progress;
pub mod report;

pub use io::{AudioReader, AudioWriter, FsReader, ProcessedDirWriter};
pub use processor::{process_batch, BatchItem, BatchProcessor, CancelHandle};
pub use progress::{new_shared_progress, BatchPhase, BatchProgress, SharedProgress};
pub use report::{BatchReport, ItemError, ItemOutcome, ItemReport};
