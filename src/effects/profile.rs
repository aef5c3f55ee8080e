//! Sound profiles: named pitch/EQ presets.
//!
//! A [`SoundProfile`] is created from the current live control values and is
//! never mutated afterwards: editing a profile means replacing it.  Profiles
//! are persisted in [`AppConfig::profiles`](crate::config::AppConfig).

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Inclusive pitch range in semitones.
pub const PITCH_RANGE: (i32, i32) = (-12, 12);

/// Inclusive per-band EQ gain range in dB.
pub const EQ_RANGE_DB: (f32, f32) = (-12.0, 12.0);

// ---------------------------------------------------------------------------
// ProfileError
// ---------------------------------------------------------------------------

/// A profile value lies outside its domain.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ProfileError {
    #[error("pitch {0} semitones is outside [-12, 12]")]
    PitchOutOfRange(i32),

    #[error("{band} gain {gain_db} dB is outside [-12, 12]")]
    GainOutOfRange { band: &'static str, gain_db: f32 },
}

// ---------------------------------------------------------------------------
// EqGains
// ---------------------------------------------------------------------------

/// Three-band EQ gains in dB.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct EqGains {
    pub low: f32,
    pub mid: f32,
    pub high: f32,
}

impl EqGains {
    pub fn new(low: f32, mid: f32, high: f32) -> Self {
        Self { low, mid, high }
    }

    /// `true` when every band is exactly 0 dB.
    pub fn is_flat(&self) -> bool {
        self.low == 0.0 && self.mid == 0.0 && self.high == 0.0
    }
}

// ---------------------------------------------------------------------------
// SoundProfile
// ---------------------------------------------------------------------------

/// A named effects preset: pitch shift plus 3-band EQ.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SoundProfile {
    pub id: String,
    pub name: String,
    /// Semitones, `[-12, 12]`.
    pub pitch: i32,
    pub eq: EqGains,
}

impl SoundProfile {
    pub fn new(id: impl Into<String>, name: impl Into<String>, pitch: i32, eq: EqGains) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            pitch,
            eq,
        }
    }

    /// The zero profile: no pitch shift, flat EQ.  Rendering with it is an
    /// identity pass apart from the limiter ceiling.
    ///
    /// ```rust
    /// use voice_dataset_studio::effects::SoundProfile;
    ///
    /// assert!(SoundProfile::identity().is_identity());
    /// ```
    pub fn identity() -> Self {
        Self::new("identity", "Identity", 0, EqGains::default())
    }

    pub fn is_identity(&self) -> bool {
        self.pitch == 0 && self.eq.is_flat()
    }

    /// Check pitch and EQ gains against their domains.
    pub fn validate(&self) -> Result<(), ProfileError> {
        if self.pitch < PITCH_RANGE.0 || self.pitch > PITCH_RANGE.1 {
            return Err(ProfileError::PitchOutOfRange(self.pitch));
        }

        for (band, gain_db) in [
            ("low", self.eq.low),
            ("mid", self.eq.mid),
            ("high", self.eq.high),
        ] {
            if !(EQ_RANGE_DB.0..=EQ_RANGE_DB.1).contains(&gain_db) {
                return Err(ProfileError::GainOutOfRange { band, gain_db });
            }
        }

        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identity_is_valid() {
        assert!(SoundProfile::identity().validate().is_ok());
    }

    #[test]
    fn range_edges_are_valid() {
        let p = SoundProfile::new("p", "Edge", -12, EqGains::new(-12.0, 12.0, 0.5));
        assert!(p.validate().is_ok());
        assert!(!p.is_identity());
    }

    #[test]
    fn pitch_out_of_range() {
        let p = SoundProfile::new("p", "Chipmunk", 13, EqGains::default());
        assert_eq!(p.validate(), Err(ProfileError::PitchOutOfRange(13)));
    }

    #[test]
    fn gain_out_of_range_names_band() {
        let p = SoundProfile::new("p", "Boomy", 0, EqGains::new(0.0, 0.0, -12.5));
        match p.validate() {
            Err(ProfileError::GainOutOfRange { band, .. }) => assert_eq!(band, "high"),
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn nan_gain_is_rejected() {
        let p = SoundProfile::new("p", "Broken", 0, EqGains::new(f32::NAN, 0.0, 0.0));
        assert!(p.validate().is_err());
    }

    #[test]
    fn json_shape_matches_settings_store() {
        let p = SoundProfile::new("1700000000000", "Deep", -3, EqGains::new(2.0, 0.0, -1.5));
        let json = serde_json::to_value(&p).unwrap();
        assert_eq!(json["pitch"], -3);
        assert_eq!(json["eq"]["high"], -1.5);
        let back: SoundProfile = serde_json::from_value(json).unwrap();
        assert_eq!(back, p);
    }
}
