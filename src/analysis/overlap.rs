//! Cross-cluster overlap detection.
//!
//! For each ordered pair (source, target) the finder measures two signals:
//! - Structural: share of the source's URLs also tagged with the target
//! - Semantic: cosine similarity of the two centroids
//!
//! Targets below [`MIN_TARGET_SIZE`] are never proposed as merge destinations,
//! which keeps small noisy clusters from attracting cascading merges.

use crate::index::AssignmentStore;
use crate::types::{ClusterId, OverlapKind};
use crate::vector::cosine_similarity;
use serde::Serialize;
use std::cmp::Ordering;

/// Targets with fewer members are skipped.
pub const MIN_TARGET_SIZE: usize = 10;

/// Candidates kept per source cluster.
pub const MAX_CANDIDATES: usize = 5;

/// Structural overlap must exceed this to record a candidate.
const STRUCTURAL_FLOOR: f32 = 0.1;

/// Centroid similarity must exceed this to record a candidate.
const SEMANTIC_FLOOR: f32 = 0.75;

/// A potential merge destination for a cluster.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OverlapCandidate {
    #[serde(skip)]
    pub target: ClusterId,
    /// Target cluster name
    pub name: String,
    /// Source members also tagged with the target
    pub count: usize,
    /// `count / source size`
    pub percent: f32,
    #[serde(rename = "type")]
    pub kind: OverlapKind,
    /// Centroid cosine similarity
    pub similarity: f32,
    pub target_size: usize,
    /// Whichever of `percent` / `similarity` is larger
    pub score: f32,
}

/// Computes the ranked candidate list for one source cluster.
pub fn candidates_for(store: &AssignmentStore, source: ClusterId) -> Vec<OverlapCandidate> {
    let source_record = store.cluster(source);
    let source_size = source_record.metrics.total_urls;
    let mut candidates = Vec::new();

    for (target, target_record) in store.clusters() {
        if target == source || target_record.metrics.total_urls < MIN_TARGET_SIZE {
            continue;
        }

        let count = store
            .members(source)
            .filter(|member| store.contains(member.url, target))
            .count();
        let percent = if source_size == 0 {
            0.0
        } else {
            count as f32 / source_size as f32
        };

        let similarity = if source_record.has_centroid() && target_record.has_centroid() {
            cosine_similarity(&source_record.centroid, &target_record.centroid)
        } else {
            0.0
        };

        if percent <= STRUCTURAL_FLOOR && similarity <= SEMANTIC_FLOOR {
            continue;
        }

        let (kind, score) = if percent > similarity {
            (OverlapKind::Structural, percent)
        } else {
            (OverlapKind::Semantic, similarity)
        };

        candidates.push(OverlapCandidate {
            target,
            name: target_record.name.clone(),
            count,
            percent,
            kind,
            similarity,
            target_size: target_record.metrics.total_urls,
            score,
        });
    }

    // Prefer the larger, established target when scores tie
    candidates.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(Ordering::Equal)
            .then_with(|| b.target_size.cmp(&a.target_size))
    });
    candidates.truncate(MAX_CANDIDATES);
    candidates
}

/// Recomputes candidates for every cluster. Expects metrics to be current.
pub fn find_overlaps(store: &mut AssignmentStore) -> usize {
    let mut with_match = 0;
    for source in store.cluster_ids() {
        let candidates = candidates_for(store, source);
        if !candidates.is_empty() {
            with_match += 1;
        }
        store.cluster_mut(source).candidates = candidates;
    }
    with_match
}
