//! Batch processor: applies one sound profile to many recordings.
//!
//! # Per-item flow
//!
//! ```text
//! BatchItem { id, file_path }
//!   └─▶ AudioReader::read                         (async I/O)
//!         └─▶ spawn_blocking {
//!               AudioDecoder::decode
//!               EffectsGraph::render(profile)
//!               resample_buffer      (only with a target rate)
//!               encode_wav
//!             }
//!               └─▶ AudioWriter::write("processed_{id}.wav")
//!                     └─▶ on_progress(completed, total)
//! ```
//!
//! Items are dequeued in input order, each one waiting for a permit from a
//! `tokio::sync::Semaphore` sized by `batch.concurrency` (default 1, fully
//! serial).  A failure anywhere in the flow is caught, logged and reported as
//! [`ItemOutcome::Failed`]; it never stops the queue.

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::sync::Semaphore;
use tokio::task::JoinSet;

use crate::audio::{encode_wav, resample_buffer, AudioDecoder, WavDecoder};
use crate::config::AppConfig;
use crate::effects::{EffectsGraph, SoundProfile};
use crate::project::processed_filename;

use super::io::{AudioReader, AudioWriter};
use super::progress::{new_shared_progress, ProgressCounter, SharedProgress};
use super::report::{BatchReport, ItemError, ItemOutcome, ItemReport};

// ---------------------------------------------------------------------------
// BatchItem
// ---------------------------------------------------------------------------

/// One unit of work: an item id and the recording to process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchItem {
    pub id: String,
    pub file_path: PathBuf,
}

impl BatchItem {
    pub fn new(id: impl Into<String>, file_path: impl Into<PathBuf>) -> Self {
        Self {
            id: id.into(),
            file_path: file_path.into(),
        }
    }
}

// ---------------------------------------------------------------------------
// CancelHandle
// ---------------------------------------------------------------------------

/// Stops a running batch from dequeuing further items.
///
/// Items already rendering finish normally; the rest are reported as
/// [`ItemOutcome::Cancelled`].  Cancellation is sticky for the processor
/// that issued the handle.
#[derive(Debug, Clone, Default)]
pub struct CancelHandle(Arc<AtomicBool>);

impl CancelHandle {
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

// ---------------------------------------------------------------------------
// BatchProcessor
// ---------------------------------------------------------------------------

/// Shared, read-only state of one run, handed to every item task.
struct ItemContext {
    reader: Arc<dyn AudioReader>,
    writer: Arc<dyn AudioWriter>,
    decoder: Arc<dyn AudioDecoder>,
    graph: EffectsGraph,
    profile: SoundProfile,
    target_sample_rate: Option<u32>,
}

/// Drives the effects graph over a list of recordings.
///
/// ```rust,no_run
/// use std::sync::Arc;
/// use voice_dataset_studio::batch::{BatchProcessor, FsReader, ProcessedDirWriter};
/// use voice_dataset_studio::config::AppConfig;
/// use voice_dataset_studio::effects::SoundProfile;
/// use voice_dataset_studio::project::Project;
///
/// # async fn example() -> anyhow::Result<()> {
/// let project = Project::load("/data/my-voice")?;
/// let processor = BatchProcessor::from_config(
///     &AppConfig::load()?,
///     Arc::new(FsReader),
///     Arc::new(ProcessedDirWriter::new(&project.path)),
/// );
///
/// let report = processor
///     .process(project.batch_items(), &SoundProfile::identity(), |done, total| {
///         println!("{done}/{total}");
///     })
///     .await;
/// assert_eq!(report.completed(), project.batch_items().len());
/// # Ok(())
/// # }
/// ```
pub struct BatchProcessor {
    reader: Arc<dyn AudioReader>,
    writer: Arc<dyn AudioWriter>,
    decoder: Arc<dyn AudioDecoder>,
    graph: EffectsGraph,
    concurrency: usize,
    target_sample_rate: Option<u32>,
    cancel: CancelHandle,
    progress: SharedProgress,
}

impl BatchProcessor {
    /// A serial processor with the default effects chain and WAV decoding.
    pub fn new(reader: Arc<dyn AudioReader>, writer: Arc<dyn AudioWriter>) -> Self {
        Self {
            reader,
            writer,
            decoder: Arc::new(WavDecoder),
            graph: EffectsGraph::default(),
            concurrency: 1,
            target_sample_rate: None,
            cancel: CancelHandle::default(),
            progress: new_shared_progress(),
        }
    }

    /// Build from the `[batch]` and `[effects]` settings sections.
    pub fn from_config(
        config: &AppConfig,
        reader: Arc<dyn AudioReader>,
        writer: Arc<dyn AudioWriter>,
    ) -> Self {
        Self::new(reader, writer)
            .with_graph(EffectsGraph::from_config(&config.effects))
            .with_concurrency(config.batch.concurrency)
            .with_target_sample_rate(config.batch.target_sample_rate)
    }

    pub fn with_decoder(mut self, decoder: Arc<dyn AudioDecoder>) -> Self {
        self.decoder = decoder;
        self
    }

    pub fn with_graph(mut self, graph: EffectsGraph) -> Self {
        self.graph = graph;
        self
    }

    /// Maximum in-flight items; `0` is treated as `1`.
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    /// Conform every output to `rate`; `None` keeps each source's rate.
    pub fn with_target_sample_rate(mut self, rate: Option<u32>) -> Self {
        self.target_sample_rate = rate.filter(|&r| r > 0);
        self
    }

    pub fn concurrency(&self) -> usize {
        self.concurrency
    }

    pub fn cancel_handle(&self) -> CancelHandle {
        self.cancel.clone()
    }

    /// Pollable snapshot of the current (or last) run.
    pub fn progress(&self) -> SharedProgress {
        Arc::clone(&self.progress)
    }

    // -----------------------------------------------------------------------
    // Run
    // -----------------------------------------------------------------------

    /// Process `items` with a snapshot of `profile`.
    ///
    /// `on_progress(0, total)` is reported first, then once per item with a
    /// strictly increasing count ending at `total`.  Completion order may
    /// differ from input order when concurrency exceeds 1; the returned
    /// report is always in input order.
    pub async fn process<F>(
        &self,
        items: Vec<BatchItem>,
        profile: &SoundProfile,
        on_progress: F,
    ) -> BatchReport
    where
        F: Fn(usize, usize) + Send + Sync + 'static,
    {
        let total = items.len();
        log::info!(
            "batch: processing {total} item(s) with profile {:?} (concurrency {})",
            profile.name,
            self.concurrency
        );

        let counter = Arc::new(ProgressCounter::start(
            total,
            Box::new(on_progress),
            Arc::clone(&self.progress),
        ));
        let ctx = Arc::new(ItemContext {
            reader: Arc::clone(&self.reader),
            writer: Arc::clone(&self.writer),
            decoder: Arc::clone(&self.decoder),
            graph: self.graph.clone(),
            profile: profile.clone(),
            target_sample_rate: self.target_sample_rate,
        });
        let semaphore = Arc::new(Semaphore::new(self.concurrency));

        let ids: Vec<String> = items.iter().map(|item| item.id.clone()).collect();
        let mut outcomes: Vec<Option<ItemOutcome>> = vec![None; total];
        let mut tasks = JoinSet::new();

        for (pos, item) in items.into_iter().enumerate() {
            let permit = match Arc::clone(&semaphore).acquire_owned().await {
                Ok(permit) => permit,
                Err(e) => {
                    outcomes[pos] = Some(ItemOutcome::Failed(ItemError::Internal(e.to_string())));
                    counter.tick(true);
                    continue;
                }
            };

            if self.cancel.is_cancelled() {
                log::debug!("batch: skipping {} (cancelled)", item.id);
                outcomes[pos] = Some(ItemOutcome::Cancelled);
                counter.tick(false);
                continue;
            }

            let ctx = Arc::clone(&ctx);
            let counter = Arc::clone(&counter);
            tasks.spawn(async move {
                let _permit = permit;
                let outcome = match process_item(&ctx, &item).await {
                    Ok(output) => {
                        log::debug!("batch: {} → {}", item.id, output.display());
                        ItemOutcome::Processed { output }
                    }
                    Err(e) => {
                        log::warn!("batch: item {} failed: {e}", item.id);
                        ItemOutcome::Failed(e)
                    }
                };
                counter.tick(matches!(outcome, ItemOutcome::Failed(_)));
                (pos, outcome)
            });
        }

        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((pos, outcome)) => outcomes[pos] = Some(outcome),
                Err(e) => log::error!("batch: item task panicked: {e}"),
            }
        }

        let report = BatchReport {
            items: ids
                .into_iter()
                .zip(outcomes)
                .map(|(id, outcome)| {
                    let outcome = outcome.unwrap_or_else(|| {
                        counter.tick(true);
                        ItemOutcome::Failed(ItemError::Internal("item task panicked".into()))
                    });
                    ItemReport { id, outcome }
                })
                .collect(),
        };

        counter.finish(self.cancel.is_cancelled());
        let phase = self
            .progress
            .lock()
            .map(|p| p.phase)
            .unwrap_or_else(|poisoned| poisoned.into_inner().phase);
        log::info!(
            "batch: {}, {} processed, {} failed, {} cancelled",
            phase.label(),
            report.processed_count(),
            report.failed().len(),
            report.cancelled_count()
        );
        report
    }
}

/// Read → decode → render → (resample) → encode → write, for one item.
async fn process_item(ctx: &Arc<ItemContext>, item: &BatchItem) -> Result<PathBuf, ItemError> {
    let bytes = ctx
        .reader
        .read(&item.file_path)
        .await
        .map_err(|e| ItemError::Read(format!("{}: {e}", item.file_path.display())))?;

    let job = Arc::clone(ctx);
    let wav = tokio::task::spawn_blocking(move || -> Result<Vec<u8>, ItemError> {
        let source = job
            .decoder
            .decode(&bytes)
            .map_err(|e| ItemError::Decode(e.to_string()))?;
        let mut rendered = job
            .graph
            .render(&source, &job.profile)
            .map_err(|e| ItemError::Render(e.to_string()))?;
        if let Some(rate) = job.target_sample_rate {
            rendered = resample_buffer(rendered, rate)
                .map_err(|e| ItemError::Render(e.to_string()))?;
        }
        encode_wav(&rendered).map_err(|e| ItemError::Encode(e.to_string()))
    })
    .await
    .map_err(|e| ItemError::Internal(e.to_string()))??;

    ctx.writer
        .write(wav, &processed_filename(&item.id))
        .await
        .map_err(|e| ItemError::Write(e.to_string()))
}

/// Process `items` serially with the default chain, reading and writing
/// through the given capabilities.
pub async fn process_batch<F>(
    items: Vec<BatchItem>,
    profile: &SoundProfile,
    on_progress: F,
    reader: Arc<dyn AudioReader>,
    writer: Arc<dyn AudioWriter>,
) -> BatchReport
where
    F: Fn(usize, usize) + Send + Sync + 'static,
{
    BatchProcessor::new(reader, writer)
        .process(items, profile, on_progress)
        .await
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
