//! # Recommendation Engine
//!
//! The [`Recommender`] orchestrates the genre tree and the similarity
//! graph to answer four query strategies:
//!
//! - **Direct**: tracks whose genre path terminates exactly at the genre.
//! - **BFS**: level-order subtree exploration, favoring breadth (diverse
//!   subgenres) over depth.
//! - **DFS**: depth-first exploration of the most populated branches,
//!   favoring a few closely related subgenres explored deeply.
//! - **SimilarTo**: precomputed similarity neighbors of a seed track.
//!
//! A fifth, genre-free query browses by mood alone: [`Recommender::by_mood`]
//! walks the whole hierarchy and keeps only tracks carrying the tag.
//!
//! Every strategy is a pure function of the immutable built structures:
//! nothing is mutated during query handling, every traversal is bounded
//! by depth/breadth/limit, and a shared fallback policy tops up
//! under-filled results so a valid query against a non-empty corpus never
//! comes back empty unless the genre/mood combination matches nothing
//! anywhere in the hierarchy (in which case the result is an explicit
//! empty list, not an error).

use log::{debug, info};
use serde::Serialize;
use std::collections::HashSet;

use crate::config::EngineConfig;
use crate::corpus::Corpus;
use crate::error::EngineError;
use crate::genre_tree::GenreTree;
use crate::similarity::SimilarityGraph;
use crate::track::{Track, TrackSummary};

/// Which source produced a recommendation entry. Exposed so the UI can
/// explain why an entry is present.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Source {
    /// Produced by the primary query strategy.
    Strategy,
    /// Produced by direct similarity lookup, with the edge score.
    Similarity { score: f64 },
    /// Fallback: direct tracks of the query/seed genre itself.
    SameGenre,
    /// Fallback: subtree of a widened ancestor genre.
    Ancestor { genre: String },
}

/// One entry of an ordered recommendation list.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Recommendation {
    #[serde(flatten)]
    pub track: TrackSummary,
    pub source: Source,
}

/// The immutable recommendation engine.
///
/// Built synchronously at startup; queries may only run after construction
/// completes. After that barrier nothing is mutated, so the engine is safe
/// for unsynchronized concurrent reads. A corpus reload means building a
/// fresh `Recommender` and swapping the handle, never mutating in place.
#[derive(Debug)]
pub struct Recommender {
    corpus: Corpus,
    tree: GenreTree,
    graph: SimilarityGraph,
    config: EngineConfig,
}

impl Recommender {
    /// Build the genre tree and similarity graph from a validated corpus.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::InvalidConfig`] when the configuration is
    /// inconsistent. Corpus validation happens earlier, in
    /// [`Corpus::build`].
    pub fn new(corpus: Corpus, config: EngineConfig) -> Result<Self, EngineError> {
        config.validate()?;

        info!("Building engine structures for {} tracks", corpus.len());
        let mut tree = GenreTree::new();
        for track in corpus.tracks() {
            tree.insert(track);
        }
        debug!("Genre tree: {} nodes", tree.node_count());

        let graph = SimilarityGraph::build(corpus.tracks(), &config);

        Ok(Self {
            corpus,
            tree,
            graph,
            config,
        })
    }

    /// Tracks whose `genre_path` terminates exactly at `genre` (not at a
    /// descendant), optionally filtered by mood, topped up by fallback.
    ///
    /// # Errors
    ///
    /// [`EngineError::GenreNotFound`] when the genre is absent from the tree.
    pub fn direct(
        &self,
        genre: &str,
        mood: Option<&str>,
        limit: usize,
    ) -> Result<Vec<Recommendation>, EngineError> {
        let node = self.tree.find(genre)?;
        let mut seen = HashSet::new();

        let mut results: Vec<Recommendation> = self
            .tree
            .node(node)
            .track_ids
            .iter()
            .filter(|id| self.mood_matches(id, mood))
            .take(limit)
            .map(|id| self.recommendation(id, Source::Strategy))
            .collect();
        seen.extend(results.iter().map(|r| r.track.id.clone()));

        self.fill_fallback(node, mood, limit, &mut seen, &mut results);
        Ok(results)
    }

    /// Breadth-first exploration: the genre's subtree in level order,
    /// bounded to `max_depth` levels below the queried node.
    ///
    /// # Errors
    ///
    /// [`EngineError::GenreNotFound`] when the genre is absent from the tree.
    pub fn bfs(
        &self,
        genre: &str,
        mood: Option<&str>,
        max_depth: usize,
        limit: usize,
    ) -> Result<Vec<Recommendation>, EngineError> {
        let node = self.tree.find(genre)?;
        let mut seen = HashSet::new();

        let ids = self
            .tree
            .collect_subtree(node, Some(max_depth), |id| self.mood_matches(id, mood));
        let mut results: Vec<Recommendation> = ids
            .into_iter()
            .take(limit)
            .map(|id| self.recommendation(&id, Source::Strategy))
            .collect();
        seen.extend(results.iter().map(|r| r.track.id.clone()));

        self.fill_fallback(node, mood, limit, &mut seen, &mut results);
        Ok(results)
    }

    /// Depth-first exploration: at most `max_breadth` children per node,
    /// most populated branches first, each explored deeply before the next.
    ///
    /// # Errors
    ///
    /// [`EngineError::GenreNotFound`] when the genre is absent from the tree.
    pub fn dfs(
        &self,
        genre: &str,
        mood: Option<&str>,
        max_breadth: usize,
        limit: usize,
    ) -> Result<Vec<Recommendation>, EngineError> {
        let node = self.tree.find(genre)?;
        let mut seen = HashSet::new();

        let ids = self
            .tree
            .collect_depth_first(node, max_breadth, |id| self.mood_matches(id, mood));
        let mut results: Vec<Recommendation> = ids
            .into_iter()
            .take(limit)
            .map(|id| self.recommendation(&id, Source::Strategy))
            .collect();
        seen.extend(results.iter().map(|r| r.track.id.clone()));

        self.fill_fallback(node, mood, limit, &mut seen, &mut results);
        Ok(results)
    }

    /// Neighbors of a seed track in stored (descending score) order,
    /// topped up from the seed's own genre when the adjacency runs short.
    ///
    /// # Errors
    ///
    /// [`EngineError::UnknownTrack`] when the seed was not part of the
    /// corpus sample used for graph construction.
    pub fn similar_to(
        &self,
        track_id: &str,
        limit: usize,
    ) -> Result<Vec<Recommendation>, EngineError> {
        let neighbors = self
            .graph
            .neighbors(track_id)
            .ok_or_else(|| EngineError::UnknownTrack(track_id.to_string()))?;

        let mut seen = HashSet::new();
        seen.insert(track_id.to_string());

        let mut results: Vec<Recommendation> = neighbors
            .iter()
            .take(limit)
            .map(|n| self.recommendation(&n.id, Source::Similarity { score: n.score }))
            .collect();
        seen.extend(results.iter().map(|r| r.track.id.clone()));

        // The seed is in the graph, therefore in the corpus and the tree.
        if let Some(seed) = self.corpus.get(track_id) {
            if let Ok(node) = self.tree.find(seed.terminal_genre()) {
                self.fill_fallback(node, None, limit, &mut seen, &mut results);
            }
        }
        Ok(results)
    }

    /// Tracks carrying `mood` anywhere in the hierarchy, in level order
    /// from the root, truncated to `limit`.
    ///
    /// There is no genre anchor and therefore no fallback stage: the walk
    /// already covers the entire tree, and the mood filter is never
    /// relaxed. A mood matching nothing yields an empty list, not an error.
    #[must_use]
    pub fn by_mood(&self, mood: &str, limit: usize) -> Vec<Recommendation> {
        let ids = self
            .tree
            .collect_subtree(self.tree.root(), None, |id| {
                self.mood_matches(id, Some(mood))
            });
        ids.into_iter()
            .take(limit)
            .map(|id| self.recommendation(&id, Source::Strategy))
            .collect()
    }

    /// Top up `results` to `limit` entries without duplicating ids.
    ///
    /// Widening order: direct tracks of the anchor genre first, then one
    /// ancestor level at a time (each ancestor contributes its whole
    /// subtree in level order) until the limit is met or the root subtree
    /// is exhausted. A mood filter is never relaxed, so a genre/mood
    /// combination matching zero tracks anywhere yields an empty result.
    fn fill_fallback(
        &self,
        anchor: usize,
        mood: Option<&str>,
        limit: usize,
        seen: &mut HashSet<String>,
        results: &mut Vec<Recommendation>,
    ) {
        if !self.config.fallback.enabled || results.len() >= limit {
            return;
        }

        for id in self.tree.node(anchor).track_ids.iter() {
            if results.len() >= limit {
                return;
            }
            if seen.contains(id.as_str()) || !self.mood_matches(id, mood) {
                continue;
            }
            seen.insert(id.clone());
            results.push(self.recommendation(id, Source::SameGenre));
        }

        let mut ancestors = self.tree.ancestors(anchor);
        if let Some(max_hops) = self.config.fallback.max_hops {
            ancestors.truncate(max_hops);
        }

        for ancestor in ancestors {
            if results.len() >= limit {
                return;
            }
            let genre = self.tree.node(ancestor).label.clone();
            let ids = self.tree.collect_subtree(ancestor, None, |id| {
                !seen.contains(id) && self.mood_matches(id, mood)
            });
            for id in ids {
                if results.len() >= limit {
                    return;
                }
                if !seen.insert(id.clone()) {
                    continue;
                }
                results.push(self.recommendation(
                    &id,
                    Source::Ancestor {
                        genre: genre.clone(),
                    },
                ));
            }
        }
    }

    fn mood_matches(&self, id: &str, mood: Option<&str>) -> bool {
        match mood {
            None => true,
            Some(mood) => self
                .corpus
                .get(id)
                .map_or(false, |track| track.mood_tags.contains(mood)),
        }
    }

    fn recommendation(&self, id: &str, source: Source) -> Recommendation {
        // Structures only ever hold ids taken from the corpus.
        let track = self
            .corpus
            .get(id)
            .expect("every indexed id resolves to a corpus track");
        Recommendation {
            track: TrackSummary::from(track),
            source,
        }
    }

    /// All genre labels known to the tree, sorted. For the UI collaborator.
    #[must_use]
    pub fn available_genres(&self) -> Vec<String> {
        self.tree.all_genres()
    }

    /// All mood tags present in the corpus, sorted and unique.
    #[must_use]
    pub fn available_moods(&self) -> Vec<String> {
        let mut moods: Vec<String> = self
            .corpus
            .tracks()
            .iter()
            .flat_map(|track| track.mood_tags.iter().cloned())
            .collect();
        moods.sort();
        moods.dedup();
        moods
    }

    /// Detailed summary of a single track.
    ///
    /// # Errors
    ///
    /// [`EngineError::UnknownTrack`] for ids absent from the corpus.
    pub fn track_info(&self, id: &str) -> Result<TrackSummary, EngineError> {
        self.corpus
            .get(id)
            .map(TrackSummary::from)
            .ok_or_else(|| EngineError::UnknownTrack(id.to_string()))
    }

    /// Direct children of a genre, alphabetical. For the UI collaborator.
    ///
    /// # Errors
    ///
    /// [`EngineError::GenreNotFound`] for an unknown label.
    pub fn children_of(&self, genre: &str) -> Result<Vec<String>, EngineError> {
        self.tree.children_of(genre)
    }

    /// Read access for the search collaborator and the CLI.
    #[must_use]
    pub fn corpus(&self) -> &Corpus {
        &self.corpus
    }

    /// Read access to the built similarity graph (tests, benches).
    #[must_use]
    pub fn graph(&self) -> &SimilarityGraph {
        &self.graph
    }

    /// The configuration this engine was built with.
    #[must_use]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Convenience accessor used by the CLI to apply configured defaults.
    #[must_use]
    pub fn default_limit(&self) -> usize {
        self.config.default_limit
    }

    #[must_use]
    pub fn tracks(&self) -> &[Track] {
        self.corpus.tracks()
    }
}
