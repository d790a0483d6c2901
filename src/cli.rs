//! # Command-Line Interface Module
//!
//! This module defines the command-line interface for Cadence using Clap
//! derive macros. It provides a type-safe way to parse command-line
//! arguments and route them to the query strategies of the engine.
//!
//! ## Commands
//!
//! - `direct`: tracks filed exactly under a genre
//! - `explore`: breadth-first exploration of a genre's subtree
//! - `dig`: depth-first exploration of the strongest subgenre branches
//! - `similar`: similarity neighbors of a seed track
//! - `mood`: mood-tag browsing across the whole hierarchy
//! - `genres` / `moods`: list what the corpus offers
//! - `info`: detailed view of one track
//! - `sample`: generate a seeded demo corpus
//!
//! ## Examples
//!
//! ```bash
//! cadence sample --count 300
//! cadence explore rock --mood energetic
//! cadence similar --query "so what"
//! ```

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Shell types supported for completion generation
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, ValueEnum, Debug)]
pub enum Shell {
    /// Bash shell
    Bash,
    /// Zsh shell
    Zsh,
    /// Fish shell
    Fish,
    /// PowerShell
    PowerShell,
    /// Elvish shell
    Elvish,
}

/// Main application arguments structure.
///
/// Uses Clap derive macros to automatically generate argument parsing,
/// help text, and validation. Global options select the corpus and
/// configuration files shared by every subcommand.
#[derive(Parser)]
#[command(name = "cadence")]
#[command(about = "Cadence: Mood-driven music recommendations over genre hierarchies")]
#[command(version)]
pub struct Args {
    /// Path to the corpus JSON file
    ///
    /// Defaults to `corpus.json` in the platform data directory. The file
    /// must contain an array of track records as produced by the ingestion
    /// pipeline or by `cadence sample`.
    #[arg(long, global = true, env = "CADENCE_CORPUS")]
    pub corpus: Option<PathBuf>,

    /// Path to an engine configuration JSON file
    ///
    /// Any subset of tunables may be given; omitted fields use the built-in
    /// defaults.
    #[arg(long, global = true, env = "CADENCE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Emit results as JSON instead of a human-readable table
    #[arg(long, global = true)]
    pub json: bool,

    /// The subcommand to execute
    #[command(subcommand)]
    pub command: Command,
}

/// Enumeration of all available subcommands.
///
/// Each variant corresponds to one query strategy of the engine or a
/// supporting utility. Command arguments are embedded directly in the enum
/// variants for type safety and automatic validation.
#[derive(Subcommand)]
pub enum Command {
    /// Recommend tracks filed exactly under a genre
    ///
    /// Returns only tracks whose genre path terminates at the given genre,
    /// not at one of its subgenres. Under-filled results are topped up
    /// from the genre's ancestors.
    Direct {
        /// Genre label to query
        genre: String,

        /// Only return tracks carrying this mood tag
        #[arg(short, long)]
        mood: Option<String>,

        /// Maximum number of recommendations
        #[arg(short, long)]
        limit: Option<usize>,
    },

    /// Explore a genre's subtree breadth-first
    ///
    /// Walks the subtree level by level, so diverse subgenres appear
    /// before any single branch is exhausted. Depth is bounded.
    Explore {
        /// Genre label to start from
        genre: String,

        /// Only return tracks carrying this mood tag
        #[arg(short, long)]
        mood: Option<String>,

        /// Levels below the genre to visit (default from config)
        #[arg(short, long)]
        depth: Option<usize>,

        /// Maximum number of recommendations
        #[arg(short, long)]
        limit: Option<usize>,
    },

    /// Dig into a genre's strongest subgenre branches depth-first
    ///
    /// Follows the most populated child genres first and explores each
    /// deeply before moving on, for a few closely related subgenres
    /// rather than a broad sweep.
    Dig {
        /// Genre label to start from
        genre: String,

        /// Only return tracks carrying this mood tag
        #[arg(short, long)]
        mood: Option<String>,

        /// Children to descend into per node (default from config)
        #[arg(short, long)]
        breadth: Option<usize>,

        /// Maximum number of recommendations
        #[arg(short, long)]
        limit: Option<usize>,
    },

    /// Recommend tracks similar to a seed track
    ///
    /// The seed is either a track id or a free-text query resolved against
    /// track names and artists. Results come from the precomputed
    /// similarity graph; a seed with no qualifying neighbors falls back to
    /// its own genre.
    Similar {
        /// Seed track id
        #[arg(required_unless_present = "query", conflicts_with = "query")]
        track_id: Option<String>,

        /// Free-text seed query (name or artist)
        #[arg(short, long)]
        query: Option<String>,

        /// Maximum number of recommendations
        #[arg(short, long)]
        limit: Option<usize>,
    },

    /// Recommend tracks by mood alone, regardless of genre
    ///
    /// Walks the whole genre hierarchy and keeps only tracks carrying the
    /// given mood tag. A tag no track carries yields an empty result.
    Mood {
        /// Mood tag to match
        mood: String,

        /// Maximum number of recommendations
        #[arg(short, long)]
        limit: Option<usize>,
    },

    /// Search tracks by name or artist
    Search {
        /// Free-text query
        query: String,

        /// Maximum number of hits
        #[arg(short, long)]
        limit: Option<usize>,
    },

    /// List all genres in the corpus
    Genres,

    /// List all mood tags in the corpus
    Moods,

    /// Show detailed information about one track
    Info {
        /// Track id to inspect
        track_id: String,
    },

    /// Generate a seeded sample corpus
    ///
    /// Writes a deterministic pseudo-random corpus to the corpus path
    /// (or `--out`). Useful for demos and for exercising the engine
    /// without real catalog data.
    Sample {
        /// Number of tracks to generate
        #[arg(short, long, default_value = "300")]
        count: usize,

        /// RNG seed; the same seed always yields the same corpus
        #[arg(short, long, default_value = "42")]
        seed: u64,

        /// Output file (defaults to the corpus path)
        #[arg(short, long)]
        out: Option<PathBuf>,
    },

    /// Generate shell completions
    ///
    /// Usage: cadence completion bash > ~/.local/share/bash-completion/completions/cadence
    Completion {
        /// Shell to generate completions for
        shell: Shell,
    },
}
