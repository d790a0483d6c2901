//! Mood-driven music recommendations over genre hierarchies.
//!
//! Core modules:
//! - [`engine`] - The four query strategies and the fallback policy
//! - [`genre_tree`] - Arena-backed genre hierarchy index
//! - [`similarity`] - Pairwise scoring and sparse similarity graph
//! - [`corpus`] - Corpus loading and boundary validation
//!
//! ### Supporting Modules
//!
//! - [`config`] - Engine tunables and data directory management
//! - [`track`] - Validated track records and presentation summaries
//! - [`search`] - Free-text resolution of queries to track ids
//! - [`sample`] - Seeded sample-corpus generation
//! - [`cli`] - Command-line interface definitions with clap integration
//! - [`error`] - Typed error kinds for every failure condition
//!
//! ## Quick Start Example
//!
//! ```
//! use cadence::config::EngineConfig;
//! use cadence::corpus::Corpus;
//! use cadence::engine::Recommender;
//! use cadence::sample;
//!
//! // Build an engine over a deterministic demo corpus
//! let config = EngineConfig::default();
//! let corpus = Corpus::build(sample::generate(100, 42), &config)?;
//! let engine = Recommender::new(corpus, config)?;
//!
//! // Breadth-first exploration of the rock subtree
//! let results = engine.bfs("rock", None, 2, 10)?;
//! assert!(!results.is_empty());
//!
//! // Similarity lookup seeded by a known track id
//! let similar = engine.similar_to(&results[0].track.id, 5)?;
//! for rec in &similar {
//!     println!("{} - {} ({:?})", rec.track.artist, rec.track.name, rec.source);
//! }
//! # Ok::<(), cadence::error::EngineError>(())
//! ```
//!
//! ## Lifecycle
//!
//! The corpus and configuration are supplied once; [`engine::Recommender::new`]
//! builds the genre tree and similarity graph synchronously and nothing is
//! mutated afterwards. Queries are pure reads, bounded by depth, breadth
//! and limit, and safe to run concurrently from any number of threads.
//! Reloading a corpus means building a fresh engine and swapping the
//! handle, never mutating in place.
//!
//! ## Error Handling
//!
//! Query-time failures (`GenreNotFound`, `UnknownTrack`) are typed results
//! the caller must handle; an empty-but-valid recommendation list is a
//! successful result, never an error. Construction rejects malformed
//! records at the boundary (`InvalidTrack`, `FeatureVectorMismatch`).

pub mod cli;
pub mod config;
pub mod corpus;
pub mod engine;
pub mod error;
pub mod genre_tree;
pub mod sample;
pub mod search;
pub mod similarity;
pub mod track;
