//! Typed error kinds for the recommendation engine.
//!
//! Query-time failures (`GenreNotFound`, `UnknownTrack`) are recoverable and
//! surfaced to the caller; construction-time failures (`InvalidTrack`,
//! `FeatureVectorMismatch`) abort or skip a record depending on the
//! configured strictness. An empty-but-valid result is never an error.

use thiserror::Error;

/// Every failure condition the engine can signal.
#[derive(Debug, Error, PartialEq)]
pub enum EngineError {
    /// The queried genre label does not exist anywhere in the tree.
    #[error("genre '{0}' not found in the hierarchy")]
    GenreNotFound(String),

    /// The seed track id was not part of the corpus sample used to build
    /// the similarity graph.
    #[error("track '{0}' is not in the similarity graph")]
    UnknownTrack(String),

    /// A record failed validation during corpus load.
    #[error("invalid track record '{id}': {reason}")]
    InvalidTrack { id: String, reason: String },

    /// A track's audio feature vector length disagrees with the configured
    /// feature list. Fatal for construction: similarity scoring requires
    /// uniform dimensionality.
    #[error("track '{id}' has {found} audio features, expected {expected}")]
    FeatureVectorMismatch {
        id: String,
        expected: usize,
        found: usize,
    },

    /// The configuration itself is inconsistent (weights, ranges, limits).
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

pub type Result<T> = std::result::Result<T, EngineError>;
