//! Read-side roster views: search + rating order, and tier grouping.

use std::cmp::Ordering;

use serde::Serialize;

use crate::db::models::PlayerRecord;
use crate::presenter;

/// Approximate username matching.
///
/// Returns the indices of matching `records`, best match first.
pub trait FuzzyMatcher: Send + Sync {
    fn search(&self, query: &str, records: &[PlayerRecord]) -> Vec<usize>;
}

/// Typo-tolerant matcher over normalized Levenshtein similarity.
///
/// A name's score is its best similarity against the query, taken over the
/// whole name and over every window of the query's length, so `"ali"` finds
/// `"alice"`. Comparison is case-insensitive. A record matches when
/// `1 - score <= threshold`.
#[derive(Debug, Clone)]
pub struct EditDistanceMatcher {
    threshold: f64,
}

impl EditDistanceMatcher {
    pub fn new(threshold: f64) -> Self {
        Self { threshold }
    }

    fn score(&self, query: &str, name: &str) -> f64 {
        let name: Vec<char> = name.to_lowercase().chars().collect();
        let q_len = query.chars().count();
        let whole: String = name.iter().collect();
        let mut best = strsim::normalized_levenshtein(query, &whole);
        if q_len > 0 && name.len() > q_len {
            for window in name.windows(q_len) {
                let w: String = window.iter().collect();
                best = best.max(strsim::normalized_levenshtein(query, &w));
            }
        }
        best
    }
}

impl Default for EditDistanceMatcher {
    fn default() -> Self {
        Self::new(0.3)
    }
}

impl FuzzyMatcher for EditDistanceMatcher {
    fn search(&self, query: &str, records: &[PlayerRecord]) -> Vec<usize> {
        let query = query.to_lowercase();
        let mut hits: Vec<(usize, f64)> = records
            .iter()
            .enumerate()
            .map(|(i, r)| (i, self.score(&query, &r.username)))
            .filter(|(_, score)| 1.0 - score <= self.threshold)
            .collect();
        hits.sort_by(|a, b| b.1.total_cmp(&a.1));
        hits.into_iter().map(|(i, _)| i).collect()
    }
}

/// Rating descending; equal ratings keep their input order.
pub fn sort_by_rating(records: &mut [PlayerRecord]) {
    records.sort_by(|a, b| b.rating.partial_cmp(&a.rating).unwrap_or(Ordering::Equal));
}

/// Filter `records` by an optional search term, then order by rating.
///
/// A blank term returns every record. The final order is always rating
/// descending regardless of match relevance.
pub fn query(
    records: &[PlayerRecord],
    search: Option<&str>,
    matcher: &dyn FuzzyMatcher,
) -> Vec<PlayerRecord> {
    let term = search.map(str::trim).unwrap_or_default();
    let mut out: Vec<PlayerRecord> = if term.is_empty() {
        records.to_vec()
    } else {
        let mut idx = matcher.search(term, records);
        idx.sort_unstable();
        idx.dedup();
        idx.into_iter()
            .filter_map(|i| records.get(i).cloned())
            .collect()
    };
    sort_by_rating(&mut out);
    out
}

/// One row of the tier list.
#[derive(Debug, Clone, Serialize)]
pub struct TierGroup {
    pub tier: f64,
    pub label: String,
    pub heading: presenter::HeadingColor,
    pub players: Vec<PlayerRecord>,
}

/// Bucket records by truncated tier; highest tier first, players by rating.
pub fn group_by_tier(records: &[PlayerRecord]) -> Vec<TierGroup> {
    let mut sorted = records.to_vec();
    sort_by_rating(&mut sorted);

    let mut groups: Vec<TierGroup> = Vec::new();
    for record in sorted {
        let tier = presenter::tier(record.rating);
        if let Some(g) = groups.last_mut().filter(|g| g.tier == tier) {
            g.players.push(record);
            continue;
        }
        groups.push(TierGroup {
            tier,
            label: format!("{tier:.1}"),
            heading: presenter::tier_heading_color(tier),
            players: vec![record],
        });
    }
    groups
}
