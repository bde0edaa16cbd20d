//! Cluster centroids and score backfill.

use crate::index::AssignmentStore;
use crate::types::ClusterId;
use crate::vector::{centroid, cosine_similarity};
use tracing::warn;

/// Recomputes one cluster's centroid from members that carry an embedding.
///
/// A cluster without embedded members gets an empty centroid.
pub fn compute_cluster_centroid(store: &mut AssignmentStore, cluster: ClusterId) {
    let embeddings: Vec<&[f32]> = store
        .members(cluster)
        .filter_map(|member| member.embedding())
        .collect();
    let center = centroid(&embeddings);
    store.cluster_mut(cluster).centroid = center;
}

pub fn compute_centroids(store: &mut AssignmentStore) {
    for cluster in store.cluster_ids() {
        compute_cluster_centroid(store, cluster);
    }
}

/// Overwrites each embedded member's score with its similarity to the
/// cluster centroid.
///
/// Members without an embedding keep their score, as does every member of a
/// cluster with an empty centroid. A NaN result is discarded. Returns the
/// number of scores written.
pub fn backfill_cluster_scores(store: &mut AssignmentStore, cluster: ClusterId) -> usize {
    let record = store.cluster(cluster);
    if !record.has_centroid() {
        return 0;
    }

    let updates: Vec<_> = record
        .members
        .iter()
        .filter_map(|&id| {
            let member = store.assignment(id);
            let embedding = member.embedding()?;
            Some((id, cosine_similarity(embedding, &record.centroid)))
        })
        .collect();

    let mut written = 0;
    for (id, score) in updates {
        if score.is_nan() {
            warn!(
                "Discarding NaN score for '{}' in cluster '{}'",
                store.url(store.assignment(id).url).url,
                store.cluster(cluster).name
            );
            continue;
        }
        store.set_score(id, score);
        written += 1;
    }
    written
}

pub fn backfill_scores(store: &mut AssignmentStore) -> usize {
    store
        .cluster_ids()
        .map(|cluster| backfill_cluster_scores(store, cluster))
        .sum()
}
