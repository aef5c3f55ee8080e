//! Dataset export: filter, resolve, renumber, zip.
//!
//! ```text
//! items ──filter(recorded)──▶ (source index, item)
//!       ──SourceResolver────▶ drop items without audio (logged)
//!       ──renumber 1..M─────▶ DatasetEntry
//!       ──ZipWriter─────────▶ audio entries + sidecars + metadata ──finish + fsync──▶ Ok(path)
//! ```
//!
//! The archive is written from a single blocking call.  Any failure removes
//! the partial destination file before the error is returned.

use std::fs::File;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use thiserror::Error;
use zip::result::ZipError;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, DateTime, ZipWriter};

use crate::config::ExportConfig;
use crate::project::{ScriptItem, SourcePolicy, SourceResolver};

use super::format::ExportFormat;
use super::metadata::{metadata_file, DatasetEntry};
use super::speaker::{sanitize_speaker_name, DEFAULT_SPEAKER};

// ---------------------------------------------------------------------------
// ExportError
// ---------------------------------------------------------------------------

/// Errors that abort a whole export.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("export I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("archive error: {0}")]
    Archive(#[from] ZipError),

    #[error("could not build metadata: {0}")]
    Metadata(#[from] serde_json::Error),

    #[error("internal error: {0}")]
    Internal(String),
}

// ---------------------------------------------------------------------------
// ExportRequest
// ---------------------------------------------------------------------------

/// Everything one export needs.
#[derive(Debug, Clone)]
pub struct ExportRequest {
    /// Zip file to create (overwritten if present).
    pub destination: PathBuf,
    pub project_path: PathBuf,
    /// The full item list; filtered to recorded items internally.
    pub items: Vec<ScriptItem>,
    pub format: ExportFormat,
    /// Raw speaker name; sanitized before use.
    pub speaker_name: String,
}

impl ExportRequest {
    pub fn new(
        destination: impl Into<PathBuf>,
        project_path: impl Into<PathBuf>,
        items: Vec<ScriptItem>,
        format: ExportFormat,
    ) -> Self {
        Self {
            destination: destination.into(),
            project_path: project_path.into(),
            items,
            format,
            speaker_name: DEFAULT_SPEAKER.to_owned(),
        }
    }

    pub fn with_speaker(mut self, name: impl Into<String>) -> Self {
        self.speaker_name = name.into();
        self
    }
}

// ---------------------------------------------------------------------------
// DatasetExporter
// ---------------------------------------------------------------------------

/// Writes dataset archives.
#[derive(Debug, Clone)]
pub struct DatasetExporter {
    source_policy: SourcePolicy,
    compression_level: i64,
}

impl Default for DatasetExporter {
    fn default() -> Self {
        Self::from_config(&ExportConfig::default())
    }
}

impl DatasetExporter {
    /// Build from the `[export]` settings section.
    pub fn from_config(config: &ExportConfig) -> Self {
        Self {
            source_policy: config.source_policy,
            compression_level: config.compression_level.clamp(0, 9),
        }
    }

    pub fn with_source_policy(mut self, policy: SourcePolicy) -> Self {
        self.source_policy = policy;
        self
    }

    /// Resolve and renumber the recorded items of `request`.
    ///
    /// Recorded items whose audio cannot be found are logged and left out;
    /// the remaining entries are numbered `1..=M` without gaps.
    pub fn plan(&self, request: &ExportRequest) -> Vec<DatasetEntry> {
        let resolver = SourceResolver::new(&request.project_path, self.source_policy);

        request
            .items
            .iter()
            .enumerate()
            .filter(|(_, item)| item.is_recorded())
            .filter_map(|(i, item)| {
                let source_index = i + 1;
                match resolver.resolve(source_index, item) {
                    Some(source) => Some((source_index, item, source)),
                    None => {
                        log::warn!(
                            "export: no audio for item {} (#{source_index}), skipping",
                            item.id
                        );
                        None
                    }
                }
            })
            .enumerate()
            .map(|(t, (source_index, item, source))| DatasetEntry {
                target: t + 1,
                source_index,
                source,
                text: item.text.clone(),
                duration: item.effective_duration(),
            })
            .collect()
    }

    /// Write the archive described by `request` and return its path.
    ///
    /// # Errors
    ///
    /// I/O, archive and metadata errors.  A partially written archive is
    /// removed before the error is returned.  A request with no exportable
    /// item still yields a valid archive with empty metadata.
    pub fn export(&self, request: &ExportRequest) -> Result<PathBuf, ExportError> {
        let speaker = sanitize_speaker_name(&request.speaker_name);
        let entries = self.plan(request);
        self.write_dataset(request, &entries, &speaker)
    }

    fn write_dataset(
        &self,
        request: &ExportRequest,
        entries: &[DatasetEntry],
        speaker: &str,
    ) -> Result<PathBuf, ExportError> {
        if entries.is_empty() {
            log::warn!(
                "export: no recorded item has audio, writing an empty {} dataset",
                request.format
            );
        }
        let metadata = metadata_file(request.format, entries, speaker)?;

        log::info!(
            "export: writing {} item(s) as {} to {}",
            entries.len(),
            request.format,
            request.destination.display()
        );

        let file = File::create(&request.destination)?;
        match self.write_archive(file, request.format, entries, speaker, metadata) {
            Ok(()) => Ok(request.destination.clone()),
            Err(e) => {
                log::warn!("export: failed, removing partial archive: {e}");
                remove_partial(&request.destination);
                Err(e)
            }
        }
    }

    /// Async front end: runs [`export`](Self::export) on the blocking pool.
    pub async fn export_in_background(
        &self,
        request: ExportRequest,
    ) -> Result<PathBuf, ExportError> {
        let exporter = self.clone();
        tokio::task::spawn_blocking(move || exporter.export(&request))
            .await
            .map_err(|e| ExportError::Internal(e.to_string()))?
    }

    // -----------------------------------------------------------------------
    // Archive writing
    // -----------------------------------------------------------------------

    fn entry_options(&self) -> SimpleFileOptions {
        SimpleFileOptions::default()
            .compression_method(CompressionMethod::Deflated)
            .compression_level(Some(self.compression_level))
            .last_modified_time(DateTime::default())
    }

    fn write_archive(
        &self,
        file: File,
        format: ExportFormat,
        entries: &[DatasetEntry],
        speaker: &str,
        metadata: Option<(String, Vec<u8>)>,
    ) -> Result<(), ExportError> {
        let mut zip = ZipWriter::new(file);

        for entry in entries {
            zip.start_file(format.audio_entry(entry.target, speaker), self.entry_options())?;
            let mut source = File::open(&entry.source)?;
            io::copy(&mut source, &mut zip)?;

            if let Some(lab) = format.sidecar_entry(entry.target, speaker) {
                zip.start_file(lab, self.entry_options())?;
                zip.write_all(entry.text.as_bytes())?;
            }
        }

        if let Some((path, bytes)) = metadata {
            zip.start_file(path, self.entry_options())?;
            zip.write_all(&bytes)?;
        }

        let file = zip.finish()?;
        file.sync_all()?;
        Ok(())
    }
}

fn remove_partial(path: &Path) {
    if let Err(e) = std::fs::remove_file(path) {
        if e.kind() != io::ErrorKind::NotFound {
            log::warn!("export: could not remove {}: {e}", path.display());
        }
    }
}

/// Export with default settings on the blocking pool; resolves to
/// `destination` on success.
pub async fn export_dataset_to_path(
    destination: impl Into<PathBuf>,
    project_path: impl Into<PathBuf>,
    items: Vec<ScriptItem>,
    format: ExportFormat,
    speaker_name: &str,
) -> Result<PathBuf, ExportError> {
    let request =
        ExportRequest::new(destination, project_path, items, format).with_speaker(speaker_name);
    DatasetExporter::default()
        .export_in_background(request)
        .await
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::project::{PROCESSED_DIR, RAW_DIR};
    use std::io::Read;
    use tempfile::{tempdir, TempDir};
    use zip::ZipArchive;

    // -----------------------------------------------------------------------
    // Helpers
    // -----------------------------------------------------------------------

    fn put(project: &Path, dir: &str, name: &str, bytes: &[u8]) {
        let d = project.join(dir);
        std::fs::create_dir_all(&d).unwrap();
        std::fs::write(d.join(name), bytes).unwrap();
    }

    /// Items 1 and 3 recorded, 2 pending; raw files for 1 and 3.
    fn scenario() -> (TempDir, Vec<ScriptItem>) {
        let dir = tempdir().unwrap();
        put(dir.path(), RAW_DIR, "file_0001.wav", b"audio-one");
        put(dir.path(), RAW_DIR, "file_0003.wav", b"audio-three");
        let items = vec![
            ScriptItem::recorded("a", "Sentence 1", 5.0),
            ScriptItem::new("b", "Sentence 2"),
            ScriptItem::recorded("c", "Sentence 3", 3.0),
        ];
        (dir, items)
    }

    fn read_entry(archive: &Path, name: &str) -> Vec<u8> {
        let mut zip = ZipArchive::new(File::open(archive).unwrap()).unwrap();
        let mut entry = zip.by_name(name).unwrap();
        let mut out = Vec::new();
        entry.read_to_end(&mut out).unwrap();
        out
    }

    fn names(archive: &Path) -> Vec<String> {
        let zip = ZipArchive::new(File::open(archive).unwrap()).unwrap();
        let mut names: Vec<String> = zip.file_names().map(str::to_owned).collect();
        names.sort();
        names
    }

    fn export(
        project: &Path,
        items: Vec<ScriptItem>,
        format: ExportFormat,
        speaker: &str,
    ) -> Result<PathBuf, ExportError> {
        let dest = project.join(format!("{format}.zip"));
        DatasetExporter::default()
            .export(&ExportRequest::new(dest, project, items, format).with_speaker(speaker))
    }

    // -----------------------------------------------------------------------
    // Tests
    // -----------------------------------------------------------------------

    #[test]
    fn f5_scenario() {
        let (dir, items) = scenario();
        let zip = export(dir.path(), items, ExportFormat::F5, "Speaker").unwrap();

        assert_eq!(
            names(&zip),
            vec![
                "dataset/dataset.json",
                "dataset/wavs/file_0001.wav",
                "dataset/wavs/file_0002.wav"
            ]
        );
        assert_eq!(read_entry(&zip, "dataset/wavs/file_0001.wav"), b"audio-one");
        assert_eq!(read_entry(&zip, "dataset/wavs/file_0002.wav"), b"audio-three");
        assert_eq!(
            String::from_utf8(read_entry(&zip, "dataset/dataset.json")).unwrap(),
            r#"[{"audio_path":"wavs/file_0001.wav","text":"Sentence 1","duration":5},{"audio_path":"wavs/file_0002.wav","text":"Sentence 3","duration":3}]"#
        );
    }

    #[test]
    fn piper_scenario() {
        let dir = tempdir().unwrap();
        put(dir.path(), RAW_DIR, "file_0001.wav", b"1");
        put(dir.path(), RAW_DIR, "file_0002.wav", b"2");
        let items = vec![
            ScriptItem::recorded("h", "Hello", 1.0),
            ScriptItem::recorded("w", "World", 1.0),
        ];

        let zip = export(dir.path(), items, ExportFormat::Piper, "Speaker").unwrap();
        assert_eq!(
            read_entry(&zip, "dataset/metadata.csv"),
            b"file_0001|Hello\nfile_0002|World"
        );
    }

    #[test]
    fn xtts_uses_sanitized_speaker() {
        let (dir, items) = scenario();
        let zip = export(dir.path(), items, ExportFormat::Xtts, "Ashan!! 2024").unwrap();
        assert_eq!(
            String::from_utf8(read_entry(&zip, "dataset/metadata.csv")).unwrap(),
            "wavs/file_0001.wav|Sentence 1|Ashan__2024\nwavs/file_0002.wav|Sentence 3|Ashan__2024"
        );
    }

    #[test]
    fn fish_writes_lab_sidecars_under_speaker() {
        let (dir, items) = scenario();
        let zip = export(dir.path(), items, ExportFormat::Fish, "???").unwrap();

        assert_eq!(
            names(&zip),
            vec![
                "dataset/data/Speaker/file_0001.lab",
                "dataset/data/Speaker/file_0001.wav",
                "dataset/data/Speaker/file_0002.lab",
                "dataset/data/Speaker/file_0002.wav",
            ]
        );
        assert_eq!(
            read_entry(&zip, "dataset/data/Speaker/file_0002.lab"),
            b"Sentence 3"
        );
    }

    #[test]
    fn ljspeech_duplicates_transcript() {
        let (dir, items) = scenario();
        let zip = export(dir.path(), items, ExportFormat::Ljspeech, "Speaker").unwrap();
        assert_eq!(
            names(&zip),
            vec!["metadata.csv", "wavs/file_0001.wav", "wavs/file_0002.wav"]
        );
        assert_eq!(read_entry(&zip, "wavs/file_0002.wav"), b"audio-three");
        assert_eq!(
            String::from_utf8(read_entry(&zip, "metadata.csv")).unwrap(),
            "\u{FEFF}file_0001|Sentence 1|Sentence 1\nfile_0002|Sentence 3|Sentence 3"
        );
    }

    #[test]
    fn renumbering_is_dense_for_every_format() {
        let dir = tempdir().unwrap();
        let mut items = Vec::new();
        for i in 1..=9 {
            let item = match i % 3 {
                0 => ScriptItem::new(format!("i{i}"), "pending"),
                1 => ScriptItem::recorded(format!("i{i}"), format!("text {i}"), 1.0),
                _ => ScriptItem::new(format!("i{i}"), "skipped").skipped(),
            };
            if item.is_recorded() {
                put(dir.path(), RAW_DIR, &crate::project::indexed_filename(i), b"x");
            }
            items.push(item);
        }

        for format in ExportFormat::ALL {
            let zip = export(dir.path(), items.clone(), format, "S").unwrap();
            let wavs: Vec<String> = names(&zip)
                .into_iter()
                .filter(|n| n.ends_with(".wav"))
                .map(|n| n.rsplit('/').next().unwrap().to_owned())
                .collect();
            assert_eq!(
                wavs,
                vec!["file_0001.wav", "file_0002.wav", "file_0003.wav"],
                "{format}"
            );
        }
    }

    #[test]
    fn missing_source_is_skipped_and_count_drifts() {
        let (dir, mut items) = scenario();
        items.push(ScriptItem::recorded("d", "No audio", 2.0));

        let zip = export(dir.path(), items, ExportFormat::Piper, "S").unwrap();
        assert_eq!(
            read_entry(&zip, "dataset/metadata.csv"),
            b"file_0001|Sentence 1\nfile_0002|Sentence 3"
        );
    }

    #[test]
    fn processed_take_preferred_per_file() {
        let (dir, items) = scenario();
        put(dir.path(), PROCESSED_DIR, "processed_c.wav", b"processed-three");

        let zip = export(dir.path(), items, ExportFormat::F5, "S").unwrap();
        assert_eq!(read_entry(&zip, "dataset/wavs/file_0001.wav"), b"audio-one");
        assert_eq!(
            read_entry(&zip, "dataset/wavs/file_0002.wav"),
            b"processed-three"
        );
    }

    #[test]
    fn whole_export_policy_ignores_raw_when_processed_exists() {
        let (dir, items) = scenario();
        put(dir.path(), PROCESSED_DIR, "file_0003.wav", b"p3");

        let exporter = DatasetExporter::default().with_source_policy(SourcePolicy::WholeExport);
        let dest = dir.path().join("legacy.zip");
        exporter
            .export(&ExportRequest::new(&dest, dir.path(), items, ExportFormat::Piper))
            .unwrap();

        assert_eq!(read_entry(&dest, "dataset/metadata.csv"), b"file_0001|Sentence 3");
    }

    #[test]
    fn repeated_exports_are_byte_identical() {
        let (dir, items) = scenario();
        let exporter = DatasetExporter::default();

        let a = dir.path().join("a.zip");
        let b = dir.path().join("b.zip");
        exporter
            .export(&ExportRequest::new(&a, dir.path(), items.clone(), ExportFormat::F5))
            .unwrap();
        exporter
            .export(&ExportRequest::new(&b, dir.path(), items, ExportFormat::F5))
            .unwrap();

        assert_eq!(
            read_entry(&a, "dataset/dataset.json"),
            read_entry(&b, "dataset/dataset.json")
        );
        assert_eq!(std::fs::read(&a).unwrap(), std::fs::read(&b).unwrap());
    }

    #[test]
    fn nothing_recorded_writes_empty_dataset() {
        let dir = tempdir().unwrap();
        let items = vec![ScriptItem::new("a", "x")];

        let zip = export(dir.path(), items.clone(), ExportFormat::Piper, "S").unwrap();
        assert_eq!(names(&zip), vec!["dataset/metadata.csv"]);
        assert!(read_entry(&zip, "dataset/metadata.csv").is_empty());

        let zip = export(dir.path(), items.clone(), ExportFormat::F5, "S").unwrap();
        assert_eq!(read_entry(&zip, "dataset/dataset.json"), b"[]");

        let zip = export(dir.path(), items, ExportFormat::Fish, "S").unwrap();
        assert!(names(&zip).is_empty());
    }

    #[test]
    fn all_sources_missing_still_finalizes_archive() {
        let dir = tempdir().unwrap();
        let items = vec![ScriptItem::recorded("a", "No audio", 1.0)];

        let zip = export(dir.path(), items, ExportFormat::Ljspeech, "S").unwrap();
        assert_eq!(names(&zip), vec!["metadata.csv"]);
        assert_eq!(read_entry(&zip, "metadata.csv"), "\u{FEFF}".as_bytes());
    }

    #[test]
    fn vanished_source_removes_partial_archive() {
        let (dir, items) = scenario();
        let exporter = DatasetExporter::default();
        let request = ExportRequest::new(
            dir.path().join("out.zip"),
            dir.path(),
            items,
            ExportFormat::F5,
        );

        let entries = exporter.plan(&request);
        std::fs::remove_file(&entries[1].source).unwrap();

        let err = exporter
            .write_dataset(&request, &entries, "S")
            .unwrap_err();
        assert!(matches!(err, ExportError::Io(_)));
        assert!(!request.destination.exists());
    }

    #[test]
    fn missing_destination_dir_is_io_error() {
        let (dir, items) = scenario();
        let dest = dir.path().join("no/such/dir/out.zip");
        let err = DatasetExporter::default()
            .export(&ExportRequest::new(&dest, dir.path(), items, ExportFormat::Piper))
            .unwrap_err();
        assert!(matches!(err, ExportError::Io(_)));
        assert!(!dest.exists());
    }

    #[tokio::test]
    async fn async_wrapper_resolves_to_destination() {
        let (dir, items) = scenario();
        let dest = dir.path().join("async.zip");

        let out = export_dataset_to_path(&dest, dir.path(), items, ExportFormat::Fish, "Ann")
            .await
            .unwrap();
        assert_eq!(out, dest);
        assert!(names(&dest).contains(&"dataset/data/Ann/file_0001.wav".to_owned()));
    }
}
