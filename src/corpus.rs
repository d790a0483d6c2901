//! Corpus loading and validation.
//!
//! The corpus is the immutable collection of track records everything else
//! is built from. It is loaded once at startup (or on explicit reload) from
//! a JSON file produced by the ingestion pipeline; after [`Corpus::build`]
//! returns, nothing in it ever changes.
//!
//! Validation happens here, at the boundary: malformed records are rejected
//! with a typed error instead of deferring failures into query time. In
//! lenient mode (the default) an invalid record is skipped and logged; with
//! `strict_load` the whole load aborts on the first bad record.

use anyhow::{Context, Result};
use log::{debug, info, warn};
use std::collections::HashMap;
use std::fs;
use std::path::Path;

use crate::config::EngineConfig;
use crate::error::EngineError;
use crate::track::Track;

/// Immutable, index-backed collection of validated tracks.
///
/// Track order is the (deterministic) input order, which also fixes the
/// similarity sampling prefix and therefore build determinism.
#[derive(Debug, Clone)]
pub struct Corpus {
    tracks: Vec<Track>,
    by_id: HashMap<String, usize>,
}

impl Corpus {
    /// Build a corpus from raw records, validating each against the
    /// configuration.
    ///
    /// # Errors
    ///
    /// With `strict_load` set, returns the first validation error.
    /// [`EngineError::FeatureVectorMismatch`] and duplicate ids are fatal
    /// in both modes: letting them through would corrupt similarity
    /// scoring and id-based lookups.
    pub fn build(
        records: Vec<Track>,
        config: &EngineConfig,
    ) -> std::result::Result<Self, EngineError> {
        let total = records.len();
        let mut tracks = Vec::with_capacity(total);
        let mut by_id: HashMap<String, usize> = HashMap::with_capacity(total);
        let mut skipped = 0usize;

        for record in records {
            match record.validate(config) {
                Ok(()) => {}
                Err(err @ EngineError::FeatureVectorMismatch { .. }) => return Err(err),
                Err(err) if config.strict_load => return Err(err),
                Err(err) => {
                    warn!("Skipping invalid track record: {err}");
                    skipped += 1;
                    continue;
                }
            }

            if by_id.contains_key(&record.id) {
                return Err(EngineError::InvalidTrack {
                    id: record.id.clone(),
                    reason: "duplicate track id".to_string(),
                });
            }

            by_id.insert(record.id.clone(), tracks.len());
            tracks.push(record);
        }

        if skipped > 0 {
            info!("Corpus loaded: {} tracks ({} skipped)", tracks.len(), skipped);
        } else {
            debug!("Corpus loaded: {} tracks", tracks.len());
        }

        Ok(Self { tracks, by_id })
    }

    /// Load and validate a corpus from a JSON file containing an array of
    /// track records.
    ///
    /// Records are parsed one at a time so a single record missing a
    /// required field follows the same lenient/strict branch as semantic
    /// validation: skipped and logged by default, fatal with `strict_load`.
    /// A file that is not a JSON array at all is always fatal.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not a JSON array,
    /// or if validation fails per [`Corpus::build`].
    pub fn load(path: &Path, config: &EngineConfig) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("Failed to read corpus file {}", path.display()))?;
        let values: Vec<serde_json::Value> = serde_json::from_str(&raw)
            .with_context(|| format!("Failed to parse corpus file {}", path.display()))?;

        info!("Read {} track records from {}", values.len(), path.display());

        let mut records = Vec::with_capacity(values.len());
        for value in values {
            let id = value
                .get("id")
                .and_then(serde_json::Value::as_str)
                .unwrap_or("<unparsed>")
                .to_string();
            match serde_json::from_value::<Track>(value) {
                Ok(record) => records.push(record),
                Err(err) => {
                    let invalid = EngineError::InvalidTrack {
                        id,
                        reason: format!("record does not parse: {err}"),
                    };
                    if config.strict_load {
                        return Err(invalid.into());
                    }
                    warn!("Skipping unparsable track record: {invalid}");
                }
            }
        }

        Ok(Self::build(records, config)?)
    }

    /// All tracks in input order.
    #[must_use]
    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    /// Look up a track by id.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&Track> {
        self.by_id.get(id).map(|&i| &self.tracks[i])
    }

    /// Whether the corpus contains a track with this id.
    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.by_id.contains_key(id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::track::test_support::track;

    #[test]
    fn test_build_indexes_tracks_by_id() {
        let config = EngineConfig::default();
        let corpus = Corpus::build(
            vec![
                track("a", &["rock"], &[], [0.1; 5]),
                track("b", &["jazz"], &["calm"], [0.2; 5]),
            ],
            &config,
        )
        .expect("Valid records should build");

        assert_eq!(corpus.len(), 2);
        assert!(corpus.contains("a"));
        assert_eq!(corpus.get("b").unwrap().terminal_genre(), "jazz");
        assert!(corpus.get("c").is_none());
    }

    #[test]
    fn test_lenient_load_skips_invalid_records() {
        let config = EngineConfig::default();
        let bad = Track {
            genre_path: vec![],
            ..track("bad", &["rock"], &[], [0.0; 5])
        };
        let corpus = Corpus::build(
            vec![track("good", &["rock"], &[], [0.1; 5]), bad],
            &config,
        )
        .expect("Lenient mode should skip the bad record");

        assert_eq!(corpus.len(), 1);
        assert!(corpus.contains("good"));
        assert!(!corpus.contains("bad"));
    }

    #[test]
    fn test_strict_load_aborts_on_invalid_record() {
        let config = EngineConfig {
            strict_load: true,
            ..EngineConfig::default()
        };
        let bad = Track {
            genre_path: vec![],
            ..track("bad", &["rock"], &[], [0.0; 5])
        };
        let result = Corpus::build(vec![track("good", &["rock"], &[], [0.1; 5]), bad], &config);
        assert!(matches!(result, Err(EngineError::InvalidTrack { .. })));
    }

    #[test]
    fn test_feature_mismatch_is_fatal_even_in_lenient_mode() {
        let config = EngineConfig::default();
        let short = Track {
            audio_features: vec![0.5],
            ..track("short", &["rock"], &[], [0.0; 5])
        };
        let result = Corpus::build(vec![short], &config);
        assert!(matches!(
            result,
            Err(EngineError::FeatureVectorMismatch { .. })
        ));
    }

    #[test]
    fn test_duplicate_ids_rejected() {
        let config = EngineConfig::default();
        let result = Corpus::build(
            vec![
                track("dup", &["rock"], &[], [0.1; 5]),
                track("dup", &["jazz"], &[], [0.2; 5]),
            ],
            &config,
        );
        assert!(matches!(result, Err(EngineError::InvalidTrack { .. })));
    }

    #[test]
    fn test_lenient_load_skips_record_missing_required_field() {
        let config = EngineConfig::default();
        let json = r#"[
            {"id": "good", "genre_path": ["rock"], "audio_features": [0.1, 0.2, 0.3, 0.4, 0.5]},
            {"id": "bad", "genre_path": ["rock"]}
        ]"#;

        let dir = tempfile::tempdir().expect("Temp dir should be created");
        let path = dir.path().join("corpus.json");
        fs::write(&path, json).expect("Corpus file should be written");

        let corpus = Corpus::load(&path, &config)
            .expect("Lenient mode should skip the unparsable record");
        assert_eq!(corpus.len(), 1);
        assert!(corpus.contains("good"));
        assert!(!corpus.contains("bad"));
    }

    #[test]
    fn test_strict_load_aborts_on_unparsable_record() {
        let config = EngineConfig {
            strict_load: true,
            ..EngineConfig::default()
        };
        let json = r#"[{"id": "bad", "genre_path": ["rock"]}]"#;

        let dir = tempfile::tempdir().expect("Temp dir should be created");
        let path = dir.path().join("corpus.json");
        fs::write(&path, json).expect("Corpus file should be written");

        let err = Corpus::load(&path, &config).unwrap_err();
        let engine_err = err
            .downcast::<EngineError>()
            .expect("Strict mode should surface a typed record error");
        assert!(matches!(engine_err, EngineError::InvalidTrack { .. }));
    }

    #[test]
    fn test_load_round_trip_through_file() {
        let config = EngineConfig::default();
        let records = vec![
            track("a", &["rock", "metal"], &["dark"], [0.9, 0.1, 0.8, 0.4, 0.2]),
            track("b", &["electronic"], &[], [0.7, 0.8, 0.5, 0.9, 0.1]),
        ];

        let dir = tempfile::tempdir().expect("Temp dir should be created");
        let path = dir.path().join("corpus.json");
        fs::write(&path, serde_json::to_string(&records).unwrap())
            .expect("Corpus file should be written");

        let corpus = Corpus::load(&path, &config).expect("Corpus file should load");
        assert_eq!(corpus.len(), 2);
        assert_eq!(corpus.get("a").unwrap().genre_path, vec!["rock", "metal"]);
    }
}
