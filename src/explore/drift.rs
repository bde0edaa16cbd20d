//! Drift search: members that no longer fit their own cluster.

use crate::index::AssignmentStore;
use crate::vector::cosine_similarity;
use serde::Serialize;
use std::cmp::Ordering;

/// An alternative home must score at least this well.
pub const ALTERNATIVE_FLOOR: f32 = 0.82;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Alternative {
    pub cluster: String,
    pub score: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DriftMatch {
    pub url: String,
    /// Similarity to the cluster's own centroid
    pub score: f32,
    /// Best-fitting other cluster, if one clears the floor
    pub alternative: Option<Alternative>,
}

/// Lists members of `target` whose similarity to its centroid is below
/// `threshold`, worst first.
///
/// Each match carries the best other cluster whose centroid beats both the
/// member's current score and [`ALTERNATIVE_FLOOR`]. A member without an
/// embedding scores 0 and never has an alternative. An unknown target or one
/// without a centroid yields nothing.
pub fn find_drift(store: &AssignmentStore, target: &str, threshold: f32) -> Vec<DriftMatch> {
    let Some(target_id) = store.cluster_id(target) else {
        return Vec::new();
    };
    let target_record = store.cluster(target_id);
    if !target_record.has_centroid() {
        return Vec::new();
    }

    let mut drifted = Vec::new();

    for member in store.members(target_id) {
        let embedding = member.embedding().unwrap_or(&[]);
        let score = cosine_similarity(embedding, &target_record.centroid);
        if score >= threshold {
            continue;
        }

        let mut best: Option<Alternative> = None;
        for (other_id, other) in store.clusters() {
            if other_id == target_id || !other.has_centroid() {
                continue;
            }
            let candidate = cosine_similarity(embedding, &other.centroid);
            let bar = best.as_ref().map_or(score.max(ALTERNATIVE_FLOOR), |b| b.score);
            if candidate > bar {
                best = Some(Alternative {
                    cluster: other.name.clone(),
                    score: candidate,
                });
            }
        }

        drifted.push(DriftMatch {
            url: store.url(member.url).url.clone(),
            score,
            alternative: best,
        });
    }

    drifted.sort_by(|a, b| a.score.partial_cmp(&b.score).unwrap_or(Ordering::Equal));
    drifted
}
