//! Metadata artifacts, as pure functions of the resolved entries.
//!
//! Nothing here touches the filesystem, so the same entries always produce
//! the same bytes.

use std::path::PathBuf;

use serde::Serialize;
use serde_json::Number;

use super::format::{target_stem, ExportFormat};

/// One resolved, renumbered item of an export.
#[derive(Debug, Clone, PartialEq)]
pub struct DatasetEntry {
    /// Dense 1-based index within the export.
    pub target: usize,
    /// 1-based index in the full project list.
    pub source_index: usize,
    /// Audio file copied into the archive.
    pub source: PathBuf,
    pub text: String,
    pub duration: f64,
}

/// Line-oriented formats keep one record per line.
fn single_line(text: &str) -> String {
    text.replace("\r\n", " ").replace(['\r', '\n'], " ")
}

/// Whole seconds are written as JSON integers (`5`, not `5.0`).
fn duration_number(secs: f64) -> Number {
    if secs.is_finite() && secs.fract() == 0.0 && secs.abs() < i64::MAX as f64 {
        Number::from(secs as i64)
    } else {
        Number::from_f64(secs).unwrap_or_else(|| Number::from(0))
    }
}

#[derive(Serialize)]
struct F5Record<'a> {
    audio_path: String,
    text: &'a str,
    duration: Number,
}

/// F5-TTS `dataset.json`: a compact JSON array.
///
/// ```
/// use std::path::PathBuf;
/// use voice_dataset_studio::export::{f5_json, DatasetEntry};
///
/// let entries = [DatasetEntry {
///     target: 1,
///     source_index: 4,
///     source: PathBuf::from("wavs/file_0004.wav"),
///     text: "Hello".into(),
///     duration: 2.0,
/// }];
/// assert_eq!(
///     f5_json(&entries).unwrap(),
///     r#"[{"audio_path":"wavs/file_0001.wav","text":"Hello","duration":2}]"#
/// );
/// ```
pub fn f5_json(entries: &[DatasetEntry]) -> Result<String, serde_json::Error> {
    let records: Vec<F5Record<'_>> = entries
        .iter()
        .map(|e| F5Record {
            audio_path: format!("wavs/{}.wav", target_stem(e.target)),
            text: &e.text,
            duration: duration_number(e.duration),
        })
        .collect();
    serde_json::to_string(&records)
}

/// Piper `metadata.csv`: `file_NNNN|text`, no header, no trailing newline.
pub fn piper_csv(entries: &[DatasetEntry]) -> String {
    entries
        .iter()
        .map(|e| format!("{}|{}", target_stem(e.target), single_line(&e.text)))
        .collect::<Vec<_>>()
        .join("\n")
}

/// XTTS `metadata.csv`: `wavs/file_NNNN.wav|text|speaker`.
pub fn xtts_csv(entries: &[DatasetEntry], speaker: &str) -> String {
    entries
        .iter()
        .map(|e| {
            format!(
                "wavs/{}.wav|{}|{speaker}",
                target_stem(e.target),
                single_line(&e.text)
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// LJSpeech `metadata.csv`: `file_NNNN|text|text`, prefixed with a UTF-8 BOM.
pub fn ljspeech_csv(entries: &[DatasetEntry]) -> String {
    let body = entries
        .iter()
        .map(|e| {
            let text = single_line(&e.text);
            format!("{}|{text}|{text}", target_stem(e.target))
        })
        .collect::<Vec<_>>()
        .join("\n");
    format!("\u{FEFF}{body}")
}

/// The metadata file of `format` as `(archive path, bytes)`, or `None` for
/// sidecar-only formats.
pub fn metadata_file(
    format: ExportFormat,
    entries: &[DatasetEntry],
    speaker: &str,
) -> Result<Option<(String, Vec<u8>)>, serde_json::Error> {
    let Some(path) = format.metadata_entry() else {
        return Ok(None);
    };
    let content = match format {
        ExportFormat::F5 => f5_json(entries)?,
        ExportFormat::Piper => piper_csv(entries),
        ExportFormat::Xtts => xtts_csv(entries, speaker),
        ExportFormat::Ljspeech => ljspeech_csv(entries),
        ExportFormat::Fish => return Ok(None),
    };
    Ok(Some((path, content.into_bytes())))
}
