//! Genre hierarchy index.
//!
//! The tree indexes tracks by their genre path and answers "which tracks
//! belong to genre X or any of its descendants". Nodes live in an arena
//! (`Vec<GenreNode>` addressed by stable indices) so traversal is worklist
//! based rather than recursive, and parent links are plain indices rather
//! than owning pointers.
//!
//! A single synthetic root labelled `"∅"` anchors all top-level genres.
//! The tree is populated during engine construction and read-only after.

use std::collections::{BTreeMap, BTreeSet, HashMap, VecDeque};

use crate::error::EngineError;
use crate::track::Track;

/// Label of the synthetic root node.
pub const ROOT_LABEL: &str = "∅";

/// One node in the genre arena.
#[derive(Debug, Clone)]
pub struct GenreNode {
    /// Genre label of this node.
    pub label: String,
    /// Arena index of the parent; `None` only for the root.
    pub parent: Option<usize>,
    /// Child label -> arena index. BTreeMap keeps iteration alphabetical.
    pub children: BTreeMap<String, usize>,
    /// Ids of tracks whose genre path terminates exactly here (not lower).
    pub track_ids: BTreeSet<String>,
    /// Number of tracks in this node's whole subtree, self included.
    pub subtree_tracks: usize,
}

impl GenreNode {
    fn new(label: String, parent: Option<usize>) -> Self {
        Self {
            label,
            parent,
            children: BTreeMap::new(),
            track_ids: BTreeSet::new(),
            subtree_tracks: 0,
        }
    }
}

/// Arena-backed genre hierarchy with per-label lookup.
///
/// When the same label appears in several places of the hierarchy, lookups
/// resolve to the node created first, which is deterministic because
/// construction follows corpus order.
#[derive(Debug, Clone, Default)]
pub struct GenreTree {
    nodes: Vec<GenreNode>,
    by_label: HashMap<String, usize>,
}

impl GenreTree {
    /// Create a tree containing only the synthetic root.
    #[must_use]
    pub fn new() -> Self {
        let root = GenreNode::new(ROOT_LABEL.to_string(), None);
        let mut by_label = HashMap::new();
        by_label.insert(ROOT_LABEL.to_string(), 0);
        Self {
            nodes: vec![root],
            by_label,
        }
    }

    /// Walk (creating on demand) the node path of `track.genre_path` and
    /// record the track id at the terminal node. Construction only.
    pub fn insert(&mut self, track: &Track) {
        let mut current = 0usize;
        for label in &track.genre_path {
            current = match self.nodes[current].children.get(label) {
                Some(&child) => child,
                None => {
                    let child = self.nodes.len();
                    self.nodes.push(GenreNode::new(label.clone(), Some(current)));
                    self.nodes[current].children.insert(label.clone(), child);
                    self.by_label.entry(label.clone()).or_insert(child);
                    child
                }
            };
        }

        if self.nodes[current].track_ids.insert(track.id.clone()) {
            // Population counts feed the DFS branch ordering.
            let mut up = Some(current);
            while let Some(idx) = up {
                self.nodes[idx].subtree_tracks += 1;
                up = self.nodes[idx].parent;
            }
        }
    }

    /// Resolve a genre label to its arena index.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::GenreNotFound`] for labels absent from the
    /// tree. This is the only error this component raises.
    pub fn find(&self, genre: &str) -> Result<usize, EngineError> {
        self.by_label
            .get(genre)
            .copied()
            .ok_or_else(|| EngineError::GenreNotFound(genre.to_string()))
    }

    /// Arena index of the synthetic root. Always valid.
    #[must_use]
    pub fn root(&self) -> usize {
        0
    }

    /// Node access by arena index.
    #[must_use]
    pub fn node(&self, index: usize) -> &GenreNode {
        &self.nodes[index]
    }

    /// Labels of a genre's direct children, alphabetical.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::GenreNotFound`] for an unknown label.
    pub fn children_of(&self, genre: &str) -> Result<Vec<String>, EngineError> {
        let index = self.find(genre)?;
        Ok(self.nodes[index].children.keys().cloned().collect())
    }

    /// Collect track ids of a node and its descendants, level by level
    /// (breadth-first) from the queried node. Within one level, tracks are
    /// grouped by node, with sibling nodes visited alphabetically and ids
    /// ascending within each node; there is no global id sort across
    /// sibling nodes of the same level. `max_depth` bounds how many levels
    /// below the start node are visited (`None` means the whole subtree).
    /// `filter` decides per track id whether it is kept.
    pub fn collect_subtree<F>(
        &self,
        start: usize,
        max_depth: Option<usize>,
        mut filter: F,
    ) -> Vec<String>
    where
        F: FnMut(&str) -> bool,
    {
        let mut results = Vec::new();
        let mut queue = VecDeque::new();
        queue.push_back((start, 0usize));

        while let Some((index, depth)) = queue.pop_front() {
            let node = &self.nodes[index];
            for id in &node.track_ids {
                if filter(id) {
                    results.push(id.clone());
                }
            }
            if max_depth.map_or(true, |limit| depth < limit) {
                for &child in node.children.values() {
                    queue.push_back((child, depth + 1));
                }
            }
        }

        results
    }

    /// Depth-first collection from `start`, descending into at most
    /// `max_breadth` children per node, highest subtree population first
    /// (ties broken alphabetically). Pre-order: a node's own tracks are
    /// emitted before its children's.
    pub fn collect_depth_first<F>(
        &self,
        start: usize,
        max_breadth: usize,
        mut filter: F,
    ) -> Vec<String>
    where
        F: FnMut(&str) -> bool,
    {
        let mut results = Vec::new();
        let mut stack = vec![start];

        while let Some(index) = stack.pop() {
            let node = &self.nodes[index];
            for id in &node.track_ids {
                if filter(id) {
                    results.push(id.clone());
                }
            }

            let mut branches: Vec<(&String, usize)> = node
                .children
                .iter()
                .map(|(label, &child)| (label, child))
                .collect();
            // Highest-population branches first; BTreeMap order already
            // breaks population ties alphabetically, and the sort is stable.
            branches.sort_by(|a, b| {
                self.nodes[b.1]
                    .subtree_tracks
                    .cmp(&self.nodes[a.1].subtree_tracks)
            });
            // Reversed push so the best branch is explored first.
            for &(_, child) in branches.iter().take(max_breadth).rev() {
                stack.push(child);
            }
        }

        results
    }

    /// Arena indices of `start`'s ancestors, nearest first, root last.
    #[must_use]
    pub fn ancestors(&self, start: usize) -> Vec<usize> {
        let mut chain = Vec::new();
        let mut up = self.nodes[start].parent;
        while let Some(index) = up {
            chain.push(index);
            up = self.nodes[index].parent;
        }
        chain
    }

    /// All genre labels in the tree (root excluded), sorted.
    #[must_use]
    pub fn all_genres(&self) -> Vec<String> {
        let mut labels: Vec<String> = self
            .nodes
            .iter()
            .skip(1)
            .map(|node| node.label.clone())
            .collect();
        labels.sort();
        labels.dedup();
        labels
    }

    /// Number of nodes including the root.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }
}
