//! "Magnet" search: URLs outside a cluster that would fit it better than
//! where they currently live.

use crate::index::AssignmentStore;
use crate::vector::cosine_similarity;
use serde::Serialize;
use std::cmp::Ordering;

/// Scores below this count as "no current home".
pub const NEAR_ZERO: f32 = 1e-3;

/// New score needed for a URL with no current home.
const PURE_GAIN_SCORE: f32 = 0.85;

/// Minimum uplift over the current score for a meaningful move.
const MIN_UPLIFT: f32 = 0.02;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OpportunityMatch {
    pub url: String,
    /// Similarity to the target centroid
    pub new_score: f32,
    /// Best score in the URL's current placement
    pub current_score: f32,
    /// Primary cluster before the move, if any
    pub current_cluster: Option<String>,
    /// The URL had effectively no home before
    pub pure_gain: bool,
}

/// Finds URLs not tagged with `target` whose embedding sits closer to the
/// target centroid than to their current placement.
///
/// A URL qualifies when its similarity to the target is at least
/// `min_match_score` and either it has no real current score and the new
/// score exceeds 0.85, or its current score is below `max_current_score` and
/// the new score beats it by more than 0.02. Results are sorted by new score,
/// best first. An unknown target or one without a centroid yields nothing.
pub fn find_missed_opportunities(
    store: &AssignmentStore,
    target: &str,
    min_match_score: f32,
    max_current_score: f32,
) -> Vec<OpportunityMatch> {
    let Some(target_id) = store.cluster_id(target) else {
        return Vec::new();
    };
    let target_record = store.cluster(target_id);
    if !target_record.has_centroid() {
        return Vec::new();
    }

    let mut matches = Vec::new();

    for (url_id, record) in store.urls() {
        if store.contains(url_id, target_id) {
            continue;
        }
        let Some(embedding) = store.embedding_for(url_id) else {
            continue;
        };

        let new_score = cosine_similarity(embedding, &target_record.centroid);
        if new_score < min_match_score {
            continue;
        }

        let mut current_score = record.max_score;
        if current_score < NEAR_ZERO {
            if let Some(primary) = record.primary {
                let primary_record = store.cluster(primary);
                if primary_record.has_centroid() {
                    current_score = cosine_similarity(embedding, &primary_record.centroid);
                }
            }
        }

        let pure_gain = current_score < NEAR_ZERO && new_score > PURE_GAIN_SCORE;
        let uplift = current_score < max_current_score && new_score > current_score + MIN_UPLIFT;
        if !(pure_gain || uplift) {
            continue;
        }

        matches.push(OpportunityMatch {
            url: record.url.clone(),
            new_score,
            current_score,
            current_cluster: record.primary.map(|c| store.cluster(c).name.clone()),
            pure_gain,
        });
    }

    matches.sort_by(|a, b| {
        b.new_score
            .partial_cmp(&a.new_score)
            .unwrap_or(Ordering::Equal)
    });
    matches
}
