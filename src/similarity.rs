//! Similarity scoring and sparse graph construction.
//!
//! Two heterogeneous signals are combined into one score in `[0, 1]`:
//! cosine similarity over the audio feature vectors and Jaccard similarity
//! over the mood tag sets. When either track carries no mood tags the
//! Jaccard term is undefined, so a fixed neutral value substitutes for it;
//! tag-less tracks must not be structurally penalized.
//!
//! Construction cost is bounded: at most `max_corpus_for_similarity`
//! tracks (a deterministic corpus prefix) participate in pairwise scoring,
//! each score is computed once per unordered pair, and every adjacency
//! list is truncated to `max_neighbors`. Pair scoring fans out across
//! rayon workers; the merge is order-independent because edge retention
//! and sorting depend only on the pair, never on completion order.

use log::{debug, info};
use rayon::prelude::*;
use std::collections::HashMap;

use crate::config::EngineConfig;
use crate::track::Track;

/// One retained edge of the similarity graph.
#[derive(Debug, Clone, PartialEq)]
pub struct Neighbor {
    pub id: String,
    pub score: f64,
}

/// Sparse, symmetric track-similarity network.
///
/// Every sampled track appears as a key, including tracks that ended up
/// with zero qualifying neighbors; absence of a key means the track was
/// not part of the construction sample.
#[derive(Debug, Clone, Default)]
pub struct SimilarityGraph {
    adjacency: HashMap<String, Vec<Neighbor>>,
}

/// Cosine similarity of two equal-length vectors, clipped to `[0, 1]`.
/// A zero vector yields 0 by definition (explicit division-by-zero guard).
#[must_use]
pub fn cosine_similarity(a: &[f64], b: &[f64]) -> f64 {
    let mut dot = 0.0;
    let mut norm_a = 0.0;
    let mut norm_b = 0.0;
    for (x, y) in a.iter().zip(b) {
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    (dot / (norm_a.sqrt() * norm_b.sqrt())).clamp(0.0, 1.0)
}

/// Combined similarity score for a pair of tracks.
///
/// `audio_weight * cosine + mood_weight * jaccard`, with the configured
/// neutral value replacing Jaccard when either tag set is empty.
#[must_use]
pub fn pair_score(a: &Track, b: &Track, config: &EngineConfig) -> f64 {
    let audio_score = cosine_similarity(&a.audio_features, &b.audio_features);

    let mood_score = if a.mood_tags.is_empty() || b.mood_tags.is_empty() {
        config.neutral_mood_score
    } else {
        let intersection = a.mood_tags.intersection(&b.mood_tags).count();
        let union = a.mood_tags.union(&b.mood_tags).count();
        intersection as f64 / union as f64
    };

    config.audio_weight * audio_score + config.mood_weight * mood_score
}

impl SimilarityGraph {
    /// Build the graph over a deterministic prefix of the corpus.
    #[must_use]
    pub fn build(tracks: &[Track], config: &EngineConfig) -> Self {
        let sample_len = tracks.len().min(config.max_corpus_for_similarity);
        if sample_len < tracks.len() {
            info!(
                "Similarity sample capped at {} of {} tracks",
                sample_len,
                tracks.len()
            );
        }
        let sample = &tracks[..sample_len];

        // Score each row of the upper triangle in parallel. Each (i, j)
        // pair is scored exactly once, so both endpoints see the same
        // value and the graph is symmetric by construction.
        let candidate_edges: Vec<Vec<(usize, usize, f64)>> = (0..sample_len)
            .into_par_iter()
            .map(|i| {
                let mut row = Vec::new();
                for j in (i + 1)..sample_len {
                    let score = pair_score(&sample[i], &sample[j], config);
                    if score >= config.similarity_threshold {
                        row.push((i, j, score));
                    }
                }
                row
            })
            .collect();

        let mut adjacency: HashMap<String, Vec<Neighbor>> = sample
            .iter()
            .map(|track| (track.id.clone(), Vec::new()))
            .collect();

        let mut edge_count = 0usize;
        for (i, j, score) in candidate_edges.into_iter().flatten() {
            adjacency
                .get_mut(&sample[i].id)
                .expect("sampled track has an adjacency entry")
                .push(Neighbor {
                    id: sample[j].id.clone(),
                    score,
                });
            adjacency
                .get_mut(&sample[j].id)
                .expect("sampled track has an adjacency entry")
                .push(Neighbor {
                    id: sample[i].id.clone(),
                    score,
                });
            edge_count += 1;
        }

        for neighbors in adjacency.values_mut() {
            neighbors.sort_by(|a, b| {
                b.score
                    .total_cmp(&a.score)
                    .then_with(|| a.id.cmp(&b.id))
            });
            neighbors.truncate(config.max_neighbors);
        }

        debug!(
            "Similarity graph: {} nodes, {} retained edges",
            adjacency.len(),
            edge_count
        );

        Self { adjacency }
    }

    /// Stored adjacency of a track, already sorted by descending score.
    /// `None` means the track was outside the construction sample.
    #[must_use]
    pub fn neighbors(&self, id: &str) -> Option<&[Neighbor]> {
        self.adjacency.get(id).map(Vec::as_slice)
    }

    /// Whether the track participated in graph construction.
    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.adjacency.contains_key(id)
    }

    /// Number of tracks in the construction sample.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.adjacency.len()
    }

    /// Iterate over `(track_id, adjacency)` entries. Iteration order is
    /// unspecified; callers needing determinism must sort.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Vec<Neighbor>)> {
        self.adjacency.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::track::test_support::track;

    #[test]
    fn test_cosine_of_identical_vectors_is_one() {
        let v = [0.9, 0.2, 0.7];
        assert!((cosine_similarity(&v, &v) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_cosine_of_zero_vector_is_zero() {
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[0.5, 0.5]), 0.0);
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[0.0, 0.0]), 0.0);
    }

    #[test]
    fn test_cosine_is_clipped_to_unit_interval() {
        // Opposed vectors have cosine -1; the engine clips to 0.
        assert_eq!(cosine_similarity(&[1.0, 0.0], &[-1.0, 0.0]), 0.0);
    }

    #[test]
    fn test_pair_score_uses_jaccard_when_both_tagged() {
        let config = EngineConfig::default();
        let a = track("a", &["rock"], &["dark", "loud"], [0.5; 5]);
        let b = track("b", &["rock"], &["loud", "warm"], [0.5; 5]);
        // cosine = 1.0, jaccard = 1/3
        let expected = 0.6 * 1.0 + 0.4 * (1.0 / 3.0);
        assert!((pair_score(&a, &b, &config) - expected).abs() < 1e-12);
    }

    #[test]
    fn test_neutral_mood_substitutes_for_missing_tags() {
        let config = EngineConfig::default();
        let tagged = track("a", &["rock"], &["dark"], [0.5; 5]);
        let untagged = track("b", &["rock"], &[], [0.5; 5]);
        // cosine = 1.0, mood = neutral 0.5, never 0
        let expected = 0.6 * 1.0 + 0.4 * 0.5;
        assert!((pair_score(&tagged, &untagged, &config) - expected).abs() < 1e-12);
        assert!((pair_score(&untagged, &tagged, &config) - expected).abs() < 1e-12);
    }

    #[test]
    fn test_disjoint_tags_score_zero_mood() {
        let config = EngineConfig::default();
        let a = track("a", &["rock"], &["dark"], [0.5; 5]);
        let b = track("b", &["rock"], &["warm"], [0.5; 5]);
        let expected = 0.6 * 1.0;
        assert!((pair_score(&a, &b, &config) - expected).abs() < 1e-12);
    }

    #[test]
    fn test_graph_is_symmetric() {
        let config = EngineConfig::default();
        let tracks = vec![
            track("a", &["rock"], &["dark"], [0.9, 0.1, 0.8, 0.3, 0.2]),
            track("b", &["rock"], &["dark", "loud"], [0.8, 0.2, 0.7, 0.4, 0.1]),
            track("c", &["jazz"], &[], [0.1, 0.9, 0.2, 0.5, 0.8]),
        ];
        let graph = SimilarityGraph::build(&tracks, &config);

        for (id, neighbors) in graph.iter() {
            for neighbor in neighbors {
                let reverse = graph
                    .neighbors(&neighbor.id)
                    .unwrap()
                    .iter()
                    .find(|n| &n.id == id)
                    .expect("Edge must exist in both directions");
                assert_eq!(
                    reverse.score, neighbor.score,
                    "score(a,b) must equal score(b,a) exactly"
                );
            }
        }
    }

    #[test]
    fn test_fan_out_is_bounded() {
        let config = EngineConfig {
            max_neighbors: 2,
            similarity_threshold: 0.0,
            ..EngineConfig::default()
        };
        let tracks: Vec<_> = (0..10)
            .map(|i| track(&format!("t{i}"), &["rock"], &[], [0.5; 5]))
            .collect();
        let graph = SimilarityGraph::build(&tracks, &config);

        for (_, neighbors) in graph.iter() {
            assert!(neighbors.len() <= 2, "adjacency must respect max_neighbors");
        }
    }

    #[test]
    fn test_threshold_filters_edges() {
        let config = EngineConfig {
            similarity_threshold: 0.9,
            ..EngineConfig::default()
        };
        // Orthogonal audio features, disjoint moods: score well below 0.9.
        let tracks = vec![
            track("a", &["rock"], &["dark"], [1.0, 0.0, 0.0, 0.0, 0.0]),
            track("b", &["rock"], &["warm"], [0.0, 1.0, 0.0, 0.0, 0.0]),
        ];
        let graph = SimilarityGraph::build(&tracks, &config);

        // Both nodes present, neither has edges.
        assert!(graph.contains("a"));
        assert!(graph.neighbors("a").unwrap().is_empty());
        assert!(graph.neighbors("b").unwrap().is_empty());
    }

    #[test]
    fn test_sample_cap_excludes_suffix() {
        let config = EngineConfig {
            max_corpus_for_similarity: 2,
            ..EngineConfig::default()
        };
        let tracks: Vec<_> = (0..4)
            .map(|i| track(&format!("t{i}"), &["rock"], &[], [0.5; 5]))
            .collect();
        let graph = SimilarityGraph::build(&tracks, &config);

        assert_eq!(graph.node_count(), 2);
        assert!(graph.contains("t0"));
        assert!(graph.contains("t1"));
        assert!(!graph.contains("t2"));
    }

    #[test]
    fn test_neighbor_order_is_deterministic() {
        let config = EngineConfig {
            similarity_threshold: 0.0,
            ..EngineConfig::default()
        };
        let tracks: Vec<_> = (0..20)
            .map(|i| {
                let x = f64::from(i) / 20.0;
                track(
                    &format!("t{i:02}"),
                    &["rock"],
                    &[],
                    [x, 1.0 - x, 0.5, x * x, 0.3],
                )
            })
            .collect();

        let first = SimilarityGraph::build(&tracks, &config);
        let second = SimilarityGraph::build(&tracks, &config);

        for (id, neighbors) in first.iter() {
            assert_eq!(
                Some(neighbors.as_slice()),
                second.neighbors(id),
                "rebuild must yield identical adjacency ordering"
            );
        }
    }
}
