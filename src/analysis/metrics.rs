//! Per-URL primaries and per-cluster duplication metrics.

use crate::index::AssignmentStore;
use crate::types::{ClusterId, HealthStatus};
use serde::Serialize;

/// Size, duplication and quality figures for one cluster.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct ClusterMetrics {
    pub total_urls: usize,
    /// Members whose URL carries no other tag.
    pub unique_urls: usize,
    /// Members whose URL is also tagged elsewhere.
    pub shared_urls: usize,
    /// `shared_urls / total_urls`, 0 for an empty cluster.
    pub duplication_rate: f32,
    /// Mean of strictly positive member scores, 0 if there are none.
    pub avg_score: f32,
    pub health_status: HealthStatus,
}

/// Re-sorts every URL's assignments and re-derives its primary cluster.
pub fn refresh_url_primaries(store: &mut AssignmentStore) {
    for url in store.url_ids() {
        store.refresh_url(url);
    }
}

/// Recomputes size, duplication and average score for one cluster.
///
/// The health status is left as it was; classification is a later stage.
pub fn compute_cluster_metrics(store: &mut AssignmentStore, cluster: ClusterId) {
    let mut total = 0usize;
    let mut unique = 0usize;
    let mut positive_sum = 0.0f32;
    let mut positive_count = 0usize;

    for member in store.members(cluster) {
        total += 1;
        if store.url(member.url).tag_count() == 1 {
            unique += 1;
        }
        if member.score > 0.0 {
            positive_sum += member.score;
            positive_count += 1;
        }
    }

    let shared = total - unique;
    let metrics = &mut store.cluster_mut(cluster).metrics;
    metrics.total_urls = total;
    metrics.unique_urls = unique;
    metrics.shared_urls = shared;
    metrics.duplication_rate = if total == 0 {
        0.0
    } else {
        shared as f32 / total as f32
    };
    metrics.avg_score = if positive_count == 0 {
        0.0
    } else {
        positive_sum / positive_count as f32
    };
}

/// Full metrics pass: URL primaries first, then every cluster.
///
/// Resets every cluster's health status to `Pending`.
pub fn compute_metrics(store: &mut AssignmentStore) {
    refresh_url_primaries(store);
    for cluster in store.cluster_ids() {
        compute_cluster_metrics(store, cluster);
        store.cluster_mut(cluster).metrics.health_status = HealthStatus::Pending;
    }
}
