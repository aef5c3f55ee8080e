//! Application settings structs, defaults and TOML persistence.
//!
//! All structs implement `Serialize`, `Deserialize`, `Default` and `Clone`
//! so they can be round-tripped through TOML files and shared across threads.
//! Missing keys fall back to their defaults, so older settings files keep
//! loading as sections are added.

use std::path::Path;

use anyhow::Result;
use serde::{Deserialize, Serialize};

use super::AppPaths;
use crate::effects::{ProfileError, SoundProfile};
use crate::export::ExportFormat;
use crate::project::SourcePolicy;

// ---------------------------------------------------------------------------
// BatchConfig
// ---------------------------------------------------------------------------

/// Settings for the batch effects processor.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BatchConfig {
    /// Maximum number of items rendered at once.  Each in-flight item holds a
    /// decoded buffer plus a render buffer, so the default is strictly serial.
    pub concurrency: usize,
    /// Conform rendered audio to this rate before encoding.  `None` keeps the
    /// source rate.
    pub target_sample_rate: Option<u32>,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            concurrency: 1,
            target_sample_rate: None,
        }
    }
}

// ---------------------------------------------------------------------------
// EffectsConfig
// ---------------------------------------------------------------------------

/// Fixed parameters of the effects chain (the per-recording knobs live in
/// [`SoundProfile`]).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EffectsConfig {
    /// Silence appended to the render window so tails are not cut off.
    pub tail_secs: f32,
    /// Crossfade window of the pitch shifter.
    pub pitch_window_secs: f32,
    /// Limiter ceiling in dBFS.
    pub limiter_ceiling_db: f32,
    /// Limiter release time.
    pub limiter_release_ms: f32,
    /// Low-shelf corner.
    pub eq_low_hz: f64,
    /// Mid peak centre.
    pub eq_mid_hz: f64,
    /// Mid peak Q.
    pub eq_mid_q: f64,
    /// High-shelf corner.
    pub eq_high_hz: f64,
}

impl Default for EffectsConfig {
    fn default() -> Self {
        Self {
            tail_secs: 0.1,
            pitch_window_secs: 0.05,
            limiter_ceiling_db: -1.0,
            limiter_release_ms: 50.0,
            eq_low_hz: 400.0,
            eq_mid_hz: 1_000.0,
            eq_mid_q: 0.5,
            eq_high_hz: 2_500.0,
        }
    }
}

// ---------------------------------------------------------------------------
// ExportConfig
// ---------------------------------------------------------------------------

/// Defaults for dataset export.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    /// Layout used when none is given on the command line.
    pub default_format: ExportFormat,
    /// Speaker name written into XTTS metadata and the Fish folder name.
    pub speaker_name: String,
    /// Deflate level, 0–9.
    pub compression_level: i64,
    /// How source audio is picked between `wavs_processed/` and `wavs/`.
    pub source_policy: SourcePolicy,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            default_format: ExportFormat::F5,
            speaker_name: "Speaker".into(),
            compression_level: 9,
            source_policy: SourcePolicy::PerFile,
        }
    }
}

// ---------------------------------------------------------------------------
// AppConfig  (top-level)
// ---------------------------------------------------------------------------

/// Top-level application configuration, serialised as `settings.toml`.
///
/// # Persistence
///
/// ```rust,no_run
/// use voice_dataset_studio::config::AppConfig;
///
/// // Load (returns Default when file is missing)
/// let config = AppConfig::load().unwrap();
///
/// // Modify and save
/// // config.save().unwrap();
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Batch processor settings.
    pub batch: BatchConfig,
    /// Effects chain settings.
    pub effects: EffectsConfig,
    /// Dataset export settings.
    pub export: ExportConfig,
    /// Saved sound profiles, in creation order.
    pub profiles: Vec<SoundProfile>,
}

impl AppConfig {
    /// Load configuration from the platform-appropriate `settings.toml`.
    ///
    /// Returns `Ok(AppConfig::default())` when the file does not exist yet
    /// (first-run scenario) so callers never need to special-case a missing
    /// file.
    pub fn load() -> Result<Self> {
        Self::load_from(&AppPaths::new().settings_file)
    }

    /// Load from an explicit path (useful for tests).
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to the platform-appropriate `settings.toml`,
    /// creating parent directories as needed.
    pub fn save(&self) -> Result<()> {
        self.save_to(&AppPaths::new().settings_file)
    }

    /// Save to an explicit path (useful for tests).
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Sound profiles
    // -----------------------------------------------------------------------

    /// Store `profile`.  Profiles are replace-only: an existing profile with
    /// the same id is swapped out in place.
    pub fn add_profile(&mut self, profile: SoundProfile) -> Result<(), ProfileError> {
        profile.validate()?;
        match self.profiles.iter_mut().find(|p| p.id == profile.id) {
            Some(existing) => *existing = profile,
            None => self.profiles.push(profile),
        }
        Ok(())
    }

    /// Delete the profile with `id`.  Returns `false` when none matched.
    pub fn remove_profile(&mut self, id: &str) -> bool {
        let before = self.profiles.len();
        self.profiles.retain(|p| p.id != id);
        self.profiles.len() != before
    }

    /// Look a profile up by id, then by case-insensitive name.
    pub fn find_profile(&self, key: &str) -> Option<&SoundProfile> {
        self.profiles
            .iter()
            .find(|p| p.id == key)
            .or_else(|| self.profiles.iter().find(|p| p.name.eq_ignore_ascii_case(key)))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
