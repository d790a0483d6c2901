//! # Integration Tests for Cadence
//!
//! End-to-end tests exercising the engine from a consumer perspective:
//! corpus file round trips, all four query strategies, the fallback
//! policy, and the determinism guarantees.

use anyhow::Result;
use std::fs;
use tempfile::TempDir;

use cadence::config::EngineConfig;
use cadence::corpus::Corpus;
use cadence::engine::{Recommender, Source};
use cadence::track::Track;
use cadence::{sample, search};

/// Build an engine over a seeded 200-track sample corpus.
fn sample_engine(seed: u64) -> Result<Recommender> {
    let config = EngineConfig::default();
    let corpus = Corpus::build(sample::generate(200, seed), &config)?;
    Ok(Recommender::new(corpus, config)?)
}

mod corpus_file_tests {
    use super::*;

    #[test]
    fn test_corpus_round_trips_through_disk() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let path = temp_dir.path().join("corpus.json");

        sample::write_sample_corpus(&path, 50, 7)?;

        let config = EngineConfig::default();
        let corpus = Corpus::load(&path, &config)?;
        assert_eq!(corpus.len(), 50);

        let engine = Recommender::new(corpus, config)?;
        assert!(!engine.available_genres().is_empty());
        Ok(())
    }

    #[test]
    fn test_malformed_corpus_file_is_rejected() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let path = temp_dir.path().join("broken.json");
        fs::write(&path, "{ not json")?;

        let config = EngineConfig::default();
        assert!(Corpus::load(&path, &config).is_err());
        Ok(())
    }

    #[test]
    fn test_lenient_load_drops_bad_records_from_file() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let path = temp_dir.path().join("mixed.json");

        let mut records = sample::generate(3, 1);
        records[1].genre_path.clear(); // invalidate one record
        fs::write(&path, serde_json::to_string(&records)?)?;

        let config = EngineConfig::default();
        let corpus = Corpus::load(&path, &config)?;
        assert_eq!(corpus.len(), 2);
        Ok(())
    }
}

mod strategy_tests {
    use super::*;

    /// The reference scenario: genres {rock, rock/metal x2, electronic,
    /// electronic/house}.
    fn scenario_engine() -> Recommender {
        let config = EngineConfig::default();
        let json = serde_json::json!([
            {"id": "rock1", "name": "R1", "artist": "A", "genre_path": ["rock"],
             "mood_tags": ["energetic"], "audio_features": [0.9, 0.5, 0.7, 0.6, 0.1]},
            {"id": "metal1", "name": "M1", "artist": "B", "genre_path": ["rock", "metal"],
             "mood_tags": ["dark"], "audio_features": [0.95, 0.3, 0.8, 0.5, 0.05]},
            {"id": "metal2", "name": "M2", "artist": "C", "genre_path": ["rock", "metal"],
             "mood_tags": ["dark"], "audio_features": [0.92, 0.2, 0.85, 0.4, 0.1]},
            {"id": "elec1", "name": "E1", "artist": "D", "genre_path": ["electronic"],
             "mood_tags": ["upbeat"], "audio_features": [0.7, 0.8, 0.6, 0.9, 0.02]},
            {"id": "house1", "name": "H1", "artist": "E", "genre_path": ["electronic", "house"],
             "mood_tags": ["upbeat"], "audio_features": [0.75, 0.85, 0.65, 0.95, 0.01]}
        ]);
        let records: Vec<Track> = serde_json::from_value(json).expect("scenario corpus parses");
        let corpus = Corpus::build(records, &config).expect("scenario corpus builds");
        Recommender::new(corpus, config).expect("engine builds")
    }

    #[test]
    fn test_direct_excludes_descendants() {
        let engine = scenario_engine();
        let results = engine.direct("rock", None, 1).unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].track.id, "rock1");
    }

    #[test]
    fn test_bfs_returns_rock_family_before_electronic() {
        let engine = scenario_engine();
        let results = engine.bfs("rock", None, 1, 10).unwrap();
        let ids: Vec<&str> = results.iter().map(|r| r.track.id.as_str()).collect();
        assert_eq!(&ids[..3], &["rock1", "metal1", "metal2"]);
        // Anything after the family can only come from fallback widening.
        for rec in &results[3..] {
            assert!(matches!(rec.source, Source::Ancestor { .. }));
        }
    }

    #[test]
    fn test_dfs_with_breadth_one_covers_rock_then_metal() {
        let engine = scenario_engine();
        let results = engine.dfs("rock", None, 1, 3).unwrap();
        let ids: Vec<&str> = results.iter().map(|r| r.track.id.as_str()).collect();
        // Pre-order with alphabetical tie-break: the top-level rock track,
        // then the metal branch explored deeply.
        assert_eq!(ids, vec!["rock1", "metal1", "metal2"]);
    }

    #[test]
    fn test_mood_only_browsing_crosses_genres() {
        let engine = scenario_engine();
        let results = engine.by_mood("upbeat", 10);
        let ids: Vec<&str> = results.iter().map(|r| r.track.id.as_str()).collect();
        // Both electronic-family tracks, found without naming a genre.
        assert_eq!(ids, vec!["elec1", "house1"]);
        assert!(engine.by_mood("no-such-mood", 10).is_empty());
    }

    #[test]
    fn test_similar_with_suppressed_graph_falls_back_to_genre() {
        let config = EngineConfig {
            similarity_threshold: 1.0, // no pair qualifies
            ..EngineConfig::default()
        };
        let corpus = Corpus::build(
            serde_json::from_value(serde_json::json!([
                {"id": "seed", "genre_path": ["rock"], "mood_tags": ["dark"],
                 "audio_features": [1.0, 0.0, 0.0, 0.0, 0.0]},
                {"id": "mate", "genre_path": ["rock"], "mood_tags": ["warm"],
                 "audio_features": [0.0, 1.0, 0.0, 0.0, 0.0]}
            ]))
            .unwrap(),
            &config,
        )
        .unwrap();
        let engine = Recommender::new(corpus, config).unwrap();

        let results = engine.similar_to("seed", 5).unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].track.id, "mate");
        assert_eq!(results[0].source, Source::SameGenre);
    }
}

mod property_tests {
    use super::*;

    #[test]
    fn test_similarity_graph_symmetry_on_sample_corpus() -> Result<()> {
        let engine = sample_engine(11)?;
        for (id, neighbors) in engine.graph().iter() {
            for neighbor in neighbors {
                let reverse = engine
                    .graph()
                    .neighbors(&neighbor.id)
                    .expect("neighbor must be a graph node")
                    .iter()
                    .find(|n| &n.id == id);
                assert_eq!(
                    reverse.map(|n| n.score),
                    Some(neighbor.score),
                    "score(a,b) must equal score(b,a)"
                );
            }
        }
        Ok(())
    }

    #[test]
    fn test_bounded_fan_out_on_sample_corpus() -> Result<()> {
        let engine = sample_engine(12)?;
        let cap = engine.config().max_neighbors;
        for (_, neighbors) in engine.graph().iter() {
            assert!(neighbors.len() <= cap);
        }
        Ok(())
    }

    #[test]
    fn test_no_duplicates_in_any_strategy() -> Result<()> {
        let engine = sample_engine(13)?;
        for genre in engine.available_genres() {
            for results in [
                engine.direct(&genre, None, 25)?,
                engine.bfs(&genre, None, 2, 25)?,
                engine.dfs(&genre, None, 3, 25)?,
            ] {
                let mut ids: Vec<&str> = results.iter().map(|r| r.track.id.as_str()).collect();
                let total = ids.len();
                ids.sort_unstable();
                ids.dedup();
                assert_eq!(ids.len(), total, "duplicate id in results for {genre}");
            }
        }
        Ok(())
    }

    #[test]
    fn test_liveness_on_sample_corpus() -> Result<()> {
        let engine = sample_engine(14)?;
        for genre in engine.available_genres() {
            assert!(
                !engine.direct(&genre, None, 1)?.is_empty(),
                "every present genre must yield at least one recommendation"
            );
        }
        Ok(())
    }

    #[test]
    fn test_rebuild_determinism_end_to_end() -> Result<()> {
        let first = sample_engine(42)?;
        let second = sample_engine(42)?;

        // Identical adjacency ordering...
        for (id, neighbors) in first.graph().iter() {
            assert_eq!(Some(neighbors.as_slice()), second.graph().neighbors(id));
        }

        // ...and identical query results.
        for genre in first.available_genres() {
            assert_eq!(
                first.bfs(&genre, None, 2, 20)?,
                second.bfs(&genre, None, 2, 20)?
            );
            assert_eq!(
                first.dfs(&genre, None, 3, 20)?,
                second.dfs(&genre, None, 3, 20)?
            );
        }
        Ok(())
    }

    #[test]
    fn test_limit_is_always_respected() -> Result<()> {
        let engine = sample_engine(15)?;
        for limit in [1, 3, 10] {
            assert!(engine.direct("rock", None, limit)?.len() <= limit);
            assert!(engine.bfs("rock", None, 3, limit)?.len() <= limit);
            assert!(engine.dfs("rock", None, 3, limit)?.len() <= limit);
        }
        Ok(())
    }
}

mod search_tests {
    use super::*;

    #[test]
    fn test_search_resolves_seed_for_similarity() -> Result<()> {
        let engine = sample_engine(21)?;
        let first = &engine.tracks()[0];

        let hit = search::resolve_one(engine.tracks(), &first.name)
            .expect("a track's own name must resolve");
        // The resolved seed feeds SimilarTo without further knowledge.
        let results = engine.similar_to(&hit.id, 5)?;
        assert!(!results.is_empty());
        assert!(results.iter().all(|r| r.track.id != hit.id));
        Ok(())
    }
}
