//! # Cadence - Mood-Driven Music Recommendations
//!
//! Cadence recommends tracks by combining a hierarchical genre index with
//! a precomputed track-similarity network and mood-tag filtering. The
//! corpus is loaded once at startup; every query afterwards is a bounded,
//! read-only lookup against the built structures.
//!
//! ## Usage
//!
//! ```bash
//! # Generate a demo corpus
//! cadence sample --count 300
//!
//! # Query it
//! cadence direct rock
//! cadence explore rock --mood energetic --depth 2
//! cadence dig electronic --breadth 2
//! cadence mood calm
//! cadence similar --query "midnight"
//! ```

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser};
use log::info;
use std::path::PathBuf;

use cadence::cli::{self, Args, Command};
use cadence::config::{self, EngineConfig};
use cadence::corpus::Corpus;
use cadence::engine::{Recommendation, Recommender, Source};
use cadence::{sample, search};

/// Resolve the corpus file location: explicit flag/env first, then the
/// platform default.
fn corpus_path(args: &Args) -> Result<PathBuf> {
    match &args.corpus {
        Some(path) => Ok(path.clone()),
        None => config::default_corpus_path(),
    }
}

/// Load config + corpus and build the engine. Shared by all query commands.
fn build_engine(args: &Args) -> Result<Recommender> {
    let config = EngineConfig::load(args.config.as_deref())?;
    let path = corpus_path(args)?;
    let corpus = Corpus::load(&path, &config)?;
    if corpus.is_empty() {
        anyhow::bail!(
            "Corpus at {} is empty. Generate one with `cadence sample` or point --corpus at real data.",
            path.display()
        );
    }
    let engine = Recommender::new(corpus, config)?;
    Ok(engine)
}

fn print_recommendations(results: &[Recommendation], json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(results)?);
        return Ok(());
    }

    if results.is_empty() {
        println!("No tracks match this query anywhere in the hierarchy.");
        return Ok(());
    }

    for (i, rec) in results.iter().enumerate() {
        let source = match &rec.source {
            Source::Strategy => String::new(),
            Source::Similarity { score } => format!("  [similarity {score:.3}]"),
            Source::SameGenre => "  [fallback: same genre]".to_string(),
            Source::Ancestor { genre } => format!("  [fallback: {genre}]"),
        };
        println!(
            "{:3}. {} - {} ({}){}",
            i + 1,
            rec.track.artist,
            rec.track.name,
            rec.track.genre_path.join("/"),
            source
        );
    }
    Ok(())
}

/// Main entry point for the Cadence application.
///
/// Initializes logging, parses command-line arguments, and routes commands
/// to the engine. All operations return Results for consistent error
/// handling throughout the application.
///
/// # Logging
///
/// Initializes environment logger which can be controlled via `RUST_LOG`:
/// - `RUST_LOG=debug cadence explore rock` - Enable debug logging
/// - `RUST_LOG=cadence::similarity=debug cadence direct jazz` - Module-specific
fn main() -> Result<()> {
    env_logger::init();

    let args = Args::parse();

    match &args.command {
        Command::Direct { genre, mood, limit } => {
            let engine = build_engine(&args)?;
            let limit = limit.unwrap_or_else(|| engine.default_limit());
            let results = engine.direct(genre, mood.as_deref(), limit)?;
            print_recommendations(&results, args.json)?;
        }
        Command::Explore {
            genre,
            mood,
            depth,
            limit,
        } => {
            let engine = build_engine(&args)?;
            let depth = depth.unwrap_or(engine.config().bfs_max_depth);
            let limit = limit.unwrap_or_else(|| engine.default_limit());
            let results = engine.bfs(genre, mood.as_deref(), depth, limit)?;
            print_recommendations(&results, args.json)?;
        }
        Command::Dig {
            genre,
            mood,
            breadth,
            limit,
        } => {
            let engine = build_engine(&args)?;
            let breadth = breadth.unwrap_or(engine.config().dfs_max_breadth);
            let limit = limit.unwrap_or_else(|| engine.default_limit());
            let results = engine.dfs(genre, mood.as_deref(), breadth, limit)?;
            print_recommendations(&results, args.json)?;
        }
        Command::Similar {
            track_id,
            query,
            limit,
        } => {
            let engine = build_engine(&args)?;
            let limit = limit.unwrap_or_else(|| engine.default_limit());

            let seed = match (track_id, query) {
                (Some(id), _) => id.clone(),
                (None, Some(query)) => {
                    let track = search::resolve_one(engine.tracks(), query)
                        .with_context(|| format!("No track matches '{query}'"))?;
                    info!("Resolved '{query}' to track {} ({})", track.id, track.name);
                    track.id.clone()
                }
                (None, None) => unreachable!("clap enforces one of track_id/query"),
            };

            let results = engine.similar_to(&seed, limit)?;
            print_recommendations(&results, args.json)?;
        }
        Command::Mood { mood, limit } => {
            let engine = build_engine(&args)?;
            let limit = limit.unwrap_or_else(|| engine.default_limit());
            let results = engine.by_mood(mood, limit);
            print_recommendations(&results, args.json)?;
        }
        Command::Search { query, limit } => {
            let engine = build_engine(&args)?;
            let limit = limit.unwrap_or_else(|| engine.default_limit());
            let hits = search::resolve(engine.tracks(), query, limit);
            if args.json {
                let tracks: Vec<_> = hits.iter().map(|h| h.track).collect();
                println!("{}", serde_json::to_string_pretty(&tracks)?);
            } else if hits.is_empty() {
                println!("No tracks match '{query}'.");
            } else {
                for hit in &hits {
                    println!(
                        "{}  {} - {} ({})",
                        hit.track.id,
                        hit.track.artist,
                        hit.track.name,
                        hit.track.genre_path.join("/")
                    );
                }
            }
        }
        Command::Genres => {
            let engine = build_engine(&args)?;
            for genre in engine.available_genres() {
                println!("{genre}");
            }
        }
        Command::Moods => {
            let engine = build_engine(&args)?;
            for mood in engine.available_moods() {
                println!("{mood}");
            }
        }
        Command::Info { track_id } => {
            let engine = build_engine(&args)?;
            let info = engine.track_info(track_id)?;
            println!("{}", serde_json::to_string_pretty(&info)?);
        }
        Command::Sample { count, seed, out } => {
            let path = match out {
                Some(path) => path.clone(),
                None => corpus_path(&args)?,
            };
            sample::write_sample_corpus(&path, *count, *seed)?;
            println!("Wrote {count} tracks to {}", path.display());
        }
        Command::Completion { shell } => {
            let shell = match shell {
                cli::Shell::Bash => clap_complete::Shell::Bash,
                cli::Shell::Zsh => clap_complete::Shell::Zsh,
                cli::Shell::Fish => clap_complete::Shell::Fish,
                cli::Shell::PowerShell => clap_complete::Shell::PowerShell,
                cli::Shell::Elvish => clap_complete::Shell::Elvish,
            };
            let mut cmd = Args::command();
            clap_complete::generate(shell, &mut cmd, "cadence", &mut std::io::stdout());
        }
    }

    Ok(())
}
