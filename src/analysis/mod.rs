//! Analysis stages run by the pipeline, leaves first.
//!
//! Each stage reads what earlier stages wrote into the assignment store:
//! centroids → score backfill → metrics → overlap → hierarchy → health.
//! Stages are plain functions over `&mut AssignmentStore` so the edit path
//! can re-run any of them scoped to a single cluster.

mod centroids;
mod health;
mod hierarchy;
mod metrics;
mod overlap;

pub use centroids::{
    backfill_cluster_scores, backfill_scores, compute_centroids, compute_cluster_centroid,
};
pub use health::{HealthVerdict, SUNSET_SIZE, classify, classify_all};
pub use hierarchy::build_hierarchy;
pub use metrics::{ClusterMetrics, compute_cluster_metrics, compute_metrics, refresh_url_primaries};
pub use overlap::{MAX_CANDIDATES, MIN_TARGET_SIZE, OverlapCandidate, candidates_for, find_overlaps};
