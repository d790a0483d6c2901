//! Track records and the summaries handed to the presentation layer.
//!
//! A [`Track`] is created once during corpus load and never mutated. The
//! engine's data structures hold track ids and read-only references, never
//! ownership that would allow mutation after the construction barrier.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::config::EngineConfig;
use crate::error::EngineError;

/// A single validated track record.
///
/// `genre_path` is the ordered genre hierarchy from root to most specific
/// (e.g. `["rock", "metal"]`). `audio_features` is a fixed-length vector
/// whose length and meaning are fixed by [`EngineConfig::audio_features`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Track {
    /// Unique track identifier.
    pub id: String,
    /// Track title.
    #[serde(default)]
    pub name: String,
    /// Performing artist.
    #[serde(default)]
    pub artist: String,
    /// Genre labels from root to most specific. Never empty.
    pub genre_path: Vec<String>,
    /// Mood tags. May be empty; emptiness is handled by the neutral mood
    /// score during similarity construction, not penalized.
    #[serde(default)]
    pub mood_tags: BTreeSet<String>,
    /// Audio feature vector (energy, valence, tempo, ...).
    pub audio_features: Vec<f64>,
    /// Popularity on the source platform, if known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub popularity: Option<u32>,
    /// Duration in seconds, if known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_secs: Option<u32>,
}

impl Track {
    /// Validate this record against the configuration.
    ///
    /// # Errors
    ///
    /// - [`EngineError::InvalidTrack`] for a missing id, empty genre path,
    ///   or non-finite feature values.
    /// - [`EngineError::FeatureVectorMismatch`] when the feature vector
    ///   length disagrees with the configured feature list.
    pub fn validate(&self, config: &EngineConfig) -> Result<(), EngineError> {
        if self.id.trim().is_empty() {
            return Err(EngineError::InvalidTrack {
                id: "<unset>".to_string(),
                reason: "track id is empty".to_string(),
            });
        }
        if self.genre_path.is_empty() {
            return Err(EngineError::InvalidTrack {
                id: self.id.clone(),
                reason: "genre_path is empty".to_string(),
            });
        }
        if self.genre_path.iter().any(|label| label.trim().is_empty()) {
            return Err(EngineError::InvalidTrack {
                id: self.id.clone(),
                reason: "genre_path contains an empty label".to_string(),
            });
        }
        if self.audio_features.len() != config.feature_len() {
            return Err(EngineError::FeatureVectorMismatch {
                id: self.id.clone(),
                expected: config.feature_len(),
                found: self.audio_features.len(),
            });
        }
        if self.audio_features.iter().any(|v| !v.is_finite()) {
            return Err(EngineError::InvalidTrack {
                id: self.id.clone(),
                reason: "audio_features contains a non-finite value".to_string(),
            });
        }
        Ok(())
    }

    /// The most specific genre label of this track (last path element).
    #[must_use]
    pub fn terminal_genre(&self) -> &str {
        // validate() guarantees a non-empty path
        self.genre_path.last().map(String::as_str).unwrap_or("")
    }
}

/// Read-only track snapshot exposed to the presentation collaborator.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrackSummary {
    pub id: String,
    pub name: String,
    pub artist: String,
    pub genre_path: Vec<String>,
    pub mood_tags: Vec<String>,
    pub audio_features: Vec<f64>,
}

impl From<&Track> for TrackSummary {
    fn from(track: &Track) -> Self {
        Self {
            id: track.id.clone(),
            name: track.name.clone(),
            artist: track.artist.clone(),
            genre_path: track.genre_path.clone(),
            mood_tags: track.mood_tags.iter().cloned().collect(),
            audio_features: track.audio_features.clone(),
        }
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;

    /// Build a track with the 5 default audio features, for unit tests.
    pub fn track(id: &str, genre_path: &[&str], moods: &[&str], features: [f64; 5]) -> Track {
        Track {
            id: id.to_string(),
            name: format!("Name of {id}"),
            artist: format!("Artist of {id}"),
            genre_path: genre_path.iter().map(ToString::to_string).collect(),
            mood_tags: moods.iter().map(ToString::to_string).collect(),
            audio_features: features.to_vec(),
            popularity: None,
            duration_secs: None,
        }
    }
}
