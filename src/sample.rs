//! Seeded sample-corpus generation.
//!
//! Produces a plausible corpus for demos, tests and benchmarks without
//! shipping real catalog data. Generation is fully determined by the seed,
//! so two runs with the same seed and track count produce byte-identical
//! corpora, which keeps engine rebuild determinism testable end to end.

use anyhow::{Context, Result};
use log::info;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

use crate::track::Track;

/// Genre hierarchy used for generated corpora. Paths run root to specific.
const GENRE_PATHS: &[&[&str]] = &[
    &["rock"],
    &["rock", "metal"],
    &["rock", "punk"],
    &["rock", "alternative"],
    &["electronic"],
    &["electronic", "house"],
    &["electronic", "techno"],
    &["electronic", "ambient"],
    &["jazz"],
    &["jazz", "fusion"],
    &["classical"],
    &["hiphop"],
    &["hiphop", "trap"],
    &["pop"],
];

const MOODS: &[&str] = &[
    "energetic", "calm", "dark", "upbeat", "melancholic", "dreamy", "aggressive", "warm",
];

const ADJECTIVES: &[&str] = &[
    "Midnight", "Electric", "Golden", "Silent", "Broken", "Neon", "Velvet", "Hollow",
];

const NOUNS: &[&str] = &[
    "Horizon", "Echoes", "River", "Machine", "Garden", "Signal", "Mirror", "Tide",
];

/// Generate `count` deterministic pseudo-random tracks with the 5 default
/// audio features (energy, valence, tempo, danceability, acousticness).
///
/// Roughly one track in six carries no mood tags, exercising the neutral
/// mood path of similarity scoring.
#[must_use]
pub fn generate(count: usize, seed: u64) -> Vec<Track> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut tracks = Vec::with_capacity(count);

    for i in 0..count {
        let genre_path = GENRE_PATHS
            .choose(&mut rng)
            .expect("genre table is non-empty");

        let mood_tags: BTreeSet<String> = if rng.gen_range(0..6) == 0 {
            BTreeSet::new()
        } else {
            let tag_count = rng.gen_range(1..=3);
            MOODS
                .choose_multiple(&mut rng, tag_count)
                .map(ToString::to_string)
                .collect()
        };

        let audio_features = vec![
            rng.gen_range(0.0..1.0),      // energy
            rng.gen_range(0.0..1.0),      // valence
            rng.gen_range(60.0..200.0) / 200.0, // tempo, normalized
            rng.gen_range(0.0..1.0),      // danceability
            rng.gen_range(0.0..1.0),      // acousticness
        ];

        let adjective = ADJECTIVES.choose(&mut rng).expect("non-empty");
        let noun = NOUNS.choose(&mut rng).expect("non-empty");

        tracks.push(Track {
            id: format!("track_{i:05}"),
            name: format!("{adjective} {noun}"),
            artist: format!("Artist {:02}", rng.gen_range(0..30)),
            genre_path: genre_path.iter().map(ToString::to_string).collect(),
            mood_tags,
            audio_features,
            popularity: Some(rng.gen_range(0..100)),
            duration_secs: Some(rng.gen_range(90..420)),
        });
    }

    tracks
}

/// Generate a sample corpus and write it as a JSON array to `path`.
///
/// # Errors
///
/// Returns an error when serialization or the file write fails.
pub fn write_sample_corpus(path: &Path, count: usize, seed: u64) -> Result<()> {
    let tracks = generate(count, seed);
    let json = serde_json::to_string_pretty(&tracks).context("Failed to serialize sample corpus")?;
    fs::write(path, json)
        .with_context(|| format!("Failed to write sample corpus to {}", path.display()))?;
    info!("Wrote {count} sample tracks to {}", path.display());
    Ok(())
}
