//! Trainer dataset layouts.
//!
//! | Format     | Audio entry                                  | Metadata                 |
//! |------------|----------------------------------------------|--------------------------|
//! | `f5`       | `dataset/wavs/file_NNNN.wav`                 | `dataset/dataset.json`   |
//! | `piper`    | `dataset/wavs/file_NNNN.wav`                 | `dataset/metadata.csv`   |
//! | `xtts`     | `dataset/wavs/file_NNNN.wav`                 | `dataset/metadata.csv`   |
//! | `fish`     | `dataset/data/{speaker}/file_NNNN.wav`       | `.lab` sidecar per file  |
//! | `ljspeech` | `wavs/file_NNNN.wav`                         | `metadata.csv`           |
//!
//! LJSpeech archives are flat: `wavs/` and `metadata.csv` sit at the archive
//! root, which is where LJSpeech loaders look for them.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Top-level directory of every archive except LJSpeech.
pub const DATASET_ROOT: &str = "dataset";

/// `file_{n:04d}` without extension.
pub(crate) fn target_stem(n: usize) -> String {
    format!("file_{n:04}")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    /// F5-TTS: JSON array of `{audio_path, text, duration}`.
    #[default]
    F5,
    /// Piper: `file_NNNN|text`.
    Piper,
    /// Coqui XTTS: `wavs/file_NNNN.wav|text|speaker`.
    Xtts,
    /// Fish Speech: per-speaker folder with `.lab` transcripts.
    Fish,
    /// LJSpeech: `file_NNNN|text|text`.
    Ljspeech,
}

impl ExportFormat {
    pub const ALL: [ExportFormat; 5] = [
        ExportFormat::F5,
        ExportFormat::Piper,
        ExportFormat::Xtts,
        ExportFormat::Fish,
        ExportFormat::Ljspeech,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ExportFormat::F5 => "f5",
            ExportFormat::Piper => "piper",
            ExportFormat::Xtts => "xtts",
            ExportFormat::Fish => "fish",
            ExportFormat::Ljspeech => "ljspeech",
        }
    }

    /// Archive path of the audio file with target index `n`.
    ///
    /// ```
    /// use voice_dataset_studio::export::ExportFormat;
    ///
    /// assert_eq!(ExportFormat::Piper.audio_entry(3, "Speaker"), "dataset/wavs/file_0003.wav");
    /// assert_eq!(ExportFormat::Fish.audio_entry(3, "Ann"), "dataset/data/Ann/file_0003.wav");
    /// ```
    pub fn audio_entry(&self, n: usize, speaker: &str) -> String {
        match self {
            ExportFormat::Fish => format!("{DATASET_ROOT}/data/{speaker}/{}.wav", target_stem(n)),
            ExportFormat::Ljspeech => format!("wavs/{}.wav", target_stem(n)),
            _ => format!("{DATASET_ROOT}/wavs/{}.wav", target_stem(n)),
        }
    }

    /// Archive path of the `.lab` transcript sidecar, for formats that use one.
    pub fn sidecar_entry(&self, n: usize, speaker: &str) -> Option<String> {
        match self {
            ExportFormat::Fish => Some(format!(
                "{DATASET_ROOT}/data/{speaker}/{}.lab",
                target_stem(n)
            )),
            _ => None,
        }
    }

    /// Archive path of the single metadata file, for formats that have one.
    pub fn metadata_entry(&self) -> Option<String> {
        match self {
            ExportFormat::F5 => Some(format!("{DATASET_ROOT}/dataset.json")),
            ExportFormat::Piper | ExportFormat::Xtts => Some(format!("{DATASET_ROOT}/metadata.csv")),
            ExportFormat::Ljspeech => Some("metadata.csv".to_owned()),
            ExportFormat::Fish => None,
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ExportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "f5" | "f5-tts" | "f5tts" => Ok(ExportFormat::F5),
            "piper" => Ok(ExportFormat::Piper),
            "xtts" | "coqui" => Ok(ExportFormat::Xtts),
            "fish" | "fish-speech" => Ok(ExportFormat::Fish),
            "ljspeech" | "lj" => Ok(ExportFormat::Ljspeech),
            other => Err(format!(
                "unknown export format `{other}` (expected one of f5, piper, xtts, fish, ljspeech)"
            )),
        }
    }
}
