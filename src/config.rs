//! # Configuration Module
//!
//! This module defines the immutable engine configuration and the platform
//! data directory helpers for Cadence.
//!
//! ## Data Storage
//!
//! Cadence keeps its corpus and configuration in the platform-standard data
//! directory:
//! - Linux: `~/.local/share/cadence/`
//! - macOS: `~/Library/Application Support/cadence/`
//! - Windows: `%APPDATA%\cadence\`
//!
//! ## Configuration Surface
//!
//! All engine tunables live in a single [`EngineConfig`] object constructed
//! once and never mutated afterwards. There are no hidden global defaults
//! outside this object. A JSON config file may override any subset of
//! fields; everything left out falls back to the documented default.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::EngineError;

/// Fallback top-up policy for under-filled query results.
///
/// The widening order is fixed (query genre first, then one ancestor level
/// at a time up to the root) but can be disabled or cut short here.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FallbackConfig {
    /// Whether fallback filling runs at all.
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Maximum number of ancestor levels to climb. `None` climbs to the root.
    #[serde(default)]
    pub max_hops: Option<usize>,
}

impl Default for FallbackConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            max_hops: None,
        }
    }
}

/// Immutable engine configuration, supplied once at engine construction.
///
/// Defaults follow the values the recommendation algorithms were tuned
/// with; see individual fields. Deserializing from JSON fills missing
/// fields with these defaults, so a config file only needs the overrides.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct EngineConfig {
    /// Ordered audio feature names. Fixes the expected length and meaning
    /// of every track's `audio_features` vector.
    pub audio_features: Vec<String>,

    /// Minimum combined score for a similarity edge to be retained.
    pub similarity_threshold: f64,

    /// Weight of the audio-feature cosine similarity. Must sum to 1.0
    /// with `mood_weight`.
    pub audio_weight: f64,

    /// Weight of the mood-tag Jaccard similarity.
    pub mood_weight: f64,

    /// Substitute mood score when either track has no mood tags, so
    /// tag-less tracks are not structurally penalized.
    pub neutral_mood_score: f64,

    /// Per-track adjacency cap in the similarity graph.
    pub max_neighbors: usize,

    /// Cap on how many tracks participate in pairwise similarity.
    /// Bounds construction cost, trading completeness for predictable
    /// startup latency.
    pub max_corpus_for_similarity: usize,

    /// Default depth bound for breadth-first genre exploration.
    pub bfs_max_depth: usize,

    /// Default per-node branch bound for depth-first genre exploration.
    pub dfs_max_breadth: usize,

    /// Default result count when a query does not specify one.
    pub default_limit: usize,

    /// When true, corpus loading aborts on the first invalid record
    /// instead of skipping and logging it.
    pub strict_load: bool,

    /// Fallback top-up policy.
    pub fallback: FallbackConfig,
}

fn default_true() -> bool {
    true
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            audio_features: vec![
                "energy".to_string(),
                "valence".to_string(),
                "tempo".to_string(),
                "danceability".to_string(),
                "acousticness".to_string(),
            ],
            similarity_threshold: 0.1,
            audio_weight: 0.6,
            mood_weight: 0.4,
            neutral_mood_score: 0.5,
            max_neighbors: 20,
            max_corpus_for_similarity: 500,
            bfs_max_depth: 2,
            dfs_max_breadth: 5,
            default_limit: 10,
            strict_load: false,
            fallback: FallbackConfig::default(),
        }
    }
}

impl EngineConfig {
    /// Load configuration from a JSON file, or return defaults when no
    /// path is given.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed, or if the
    /// resulting configuration fails [`EngineConfig::validate`].
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config = match path {
            Some(path) => {
                let raw = fs::read_to_string(path)
                    .with_context(|| format!("Failed to read config file {}", path.display()))?;
                let config: Self = serde_json::from_str(&raw)
                    .with_context(|| format!("Failed to parse config file {}", path.display()))?;
                log::info!("Loaded configuration from {}", path.display());
                config
            }
            None => Self::default(),
        };

        config.validate()?;
        Ok(config)
    }

    /// Check internal consistency of the tunables.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::InvalidConfig`] naming the offending field.
    pub fn validate(&self) -> std::result::Result<(), EngineError> {
        if self.audio_features.is_empty() {
            return Err(EngineError::InvalidConfig(
                "audio_features must name at least one feature".to_string(),
            ));
        }
        if (self.audio_weight + self.mood_weight - 1.0).abs() > 1e-9 {
            return Err(EngineError::InvalidConfig(format!(
                "audio_weight ({}) + mood_weight ({}) must sum to 1.0",
                self.audio_weight, self.mood_weight
            )));
        }
        if self.audio_weight < 0.0 || self.mood_weight < 0.0 {
            return Err(EngineError::InvalidConfig(
                "similarity weights must be non-negative".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&self.similarity_threshold) {
            return Err(EngineError::InvalidConfig(format!(
                "similarity_threshold ({}) must be in [0, 1]",
                self.similarity_threshold
            )));
        }
        if !(0.0..=1.0).contains(&self.neutral_mood_score) {
            return Err(EngineError::InvalidConfig(format!(
                "neutral_mood_score ({}) must be in [0, 1]",
                self.neutral_mood_score
            )));
        }
        if self.default_limit == 0 {
            return Err(EngineError::InvalidConfig(
                "default_limit must be at least 1".to_string(),
            ));
        }
        if self.max_corpus_for_similarity == 0 {
            return Err(EngineError::InvalidConfig(
                "max_corpus_for_similarity must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Number of audio features every track must carry.
    #[must_use]
    pub fn feature_len(&self) -> usize {
        self.audio_features.len()
    }
}

/// Returns the platform-appropriate Cadence data directory, creating it
/// if necessary.
///
/// # Errors
///
/// Returns an error if the system data directory cannot be determined or
/// the `cadence` subdirectory cannot be created.
pub fn get_data_dir() -> Result<PathBuf> {
    let data_dir = dirs::data_dir().ok_or_else(|| {
        anyhow::anyhow!(
            "Could not determine system data directory. Please ensure your platform supports standard data directories."
        )
    })?;

    let cadence_dir = data_dir.join("cadence");
    fs::create_dir_all(&cadence_dir).with_context(|| {
        format!(
            "Failed to create Cadence data directory at {}. Please check file permissions.",
            cadence_dir.display()
        )
    })?;

    Ok(cadence_dir)
}

/// Returns the default corpus file location (`<data dir>/corpus.json`).
///
/// # Errors
///
/// Propagates [`get_data_dir`] failures.
pub fn default_corpus_path() -> Result<PathBuf> {
    Ok(get_data_dir()?.join("corpus.json"))
}
