//! Free-text track resolution.
//!
//! The engine itself only understands track ids; this module is the narrow
//! collaborator that turns a human-typed query into candidate ids for the
//! `SimilarTo` strategy. Matching is deliberately simple: case-insensitive
//! substring over track name and artist, ranked by where and how tightly
//! the query matches.

use crate::track::Track;

/// A ranked search hit.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchHit<'a> {
    pub track: &'a Track,
    /// Lower is better.
    rank: (u8, usize, usize),
}

/// Resolve a free-text query to up to `limit` candidate tracks.
///
/// Ranking: name matches before artist matches, earlier match positions
/// before later ones, shorter matched fields before longer ones, track id
/// as the final deterministic tie-break. An empty or whitespace query
/// matches nothing.
#[must_use]
pub fn resolve<'a>(tracks: &'a [Track], query: &str, limit: usize) -> Vec<SearchHit<'a>> {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return Vec::new();
    }

    let mut hits: Vec<SearchHit<'a>> = tracks
        .iter()
        .filter_map(|track| {
            let name = track.name.to_lowercase();
            let artist = track.artist.to_lowercase();
            if let Some(pos) = name.find(&needle) {
                Some(SearchHit {
                    track,
                    rank: (0, pos, name.len()),
                })
            } else {
                artist.find(&needle).map(|pos| SearchHit {
                    track,
                    rank: (1, pos, artist.len()),
                })
            }
        })
        .collect();

    hits.sort_by(|a, b| a.rank.cmp(&b.rank).then_with(|| a.track.id.cmp(&b.track.id)));
    hits.truncate(limit);
    hits
}

/// Resolve a query to the single best-matching track, if any.
#[must_use]
pub fn resolve_one<'a>(tracks: &'a [Track], query: &str) -> Option<&'a Track> {
    resolve(tracks, query, 1).into_iter().next().map(|hit| hit.track)
}
