//! Rule-based health classification.
//!
//! Rules are evaluated in order and the first match wins:
//! 1. Fewer than [`SUNSET_SIZE`] URLs: sunset, merging away when the best
//!    match is a near duplicate
//! 2. A strong merge signal: the smaller partner is reviewed, the larger one
//!    is dominant
//! 3. Low positive average score: quality review
//! 4. Below the configured minimum size: volume review
//! 5. Duplication at or above the configured maximum: fragmentation review
//! 6. Healthy

use crate::config::AnalysisConfig;
use crate::index::AssignmentStore;
use crate::types::{ClusterId, HealthStatus, Issue, Recommendation, Role};
use serde::Serialize;

use super::{ClusterMetrics, OverlapCandidate};

/// Clusters smaller than this are always sunset.
pub const SUNSET_SIZE: usize = 5;

/// Best-match similarity at which a sunset cluster should merge, not vanish.
const SUNSET_MERGE_SIMILARITY: f32 = 0.9;

/// Classifier output for one cluster.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct HealthVerdict {
    pub status: HealthStatus,
    pub recommendation: Recommendation,
    pub issue: Issue,
    /// Cluster the recommendation points at, if any
    pub target_cluster: Option<String>,
    #[serde(skip)]
    pub target: Option<ClusterId>,
}

impl HealthVerdict {
    fn new(status: HealthStatus, recommendation: Recommendation, issue: Issue) -> Self {
        Self {
            status,
            recommendation,
            issue,
            target_cluster: None,
            target: None,
        }
    }

    fn pointing_at(mut self, candidate: &OverlapCandidate) -> Self {
        self.target_cluster = Some(candidate.name.clone());
        self.target = Some(candidate.target);
        self
    }
}

/// Classifies one cluster. Pure function of its state and the config.
pub fn classify(
    metrics: &ClusterMetrics,
    top_match: Option<&OverlapCandidate>,
    role: Role,
    config: &AnalysisConfig,
) -> HealthVerdict {
    use HealthStatus as S;
    use Recommendation as R;

    if metrics.total_urls < SUNSET_SIZE {
        return match top_match {
            Some(top) if top.similarity >= SUNSET_MERGE_SIMILARITY => {
                HealthVerdict::new(S::Sunset, R::SunsetMerge, Issue::LowVolume).pointing_at(top)
            }
            _ => HealthVerdict::new(S::Sunset, R::Sunset, Issue::LowVolume),
        };
    }

    if let Some(top) = top_match {
        if role == Role::Child || has_merge_signal(top, config) {
            if metrics.total_urls >= top.target_size {
                return HealthVerdict::new(S::Healthy, R::DominantCluster, Issue::None);
            }
            let verdict = if top.target_size < config.min_url_count {
                HealthVerdict::new(S::Review, R::ReviewTargetTooSmall, Issue::Isolation)
            } else if metrics.total_urls < config.min_url_count {
                HealthVerdict::new(S::Review, R::ReviewLowVolume, Issue::LowVolume)
            } else {
                HealthVerdict::new(S::Review, R::ConsiderMerge, Issue::IntentOverlap)
            };
            return verdict.pointing_at(top);
        }
    }

    if metrics.avg_score < config.min_avg_score && metrics.avg_score > 0.0 {
        HealthVerdict::new(S::Review, R::ReviewQuality, Issue::LowQuality)
    } else if metrics.total_urls < config.min_url_count {
        HealthVerdict::new(S::Review, R::ReviewLowVolume, Issue::LowVolume)
    } else if metrics.duplication_rate >= config.max_dup_rate {
        HealthVerdict::new(S::Review, R::ReviewHighDup, Issue::Fragmentation)
    } else {
        HealthVerdict::new(S::Healthy, R::Healthy, Issue::None)
    }
}

/// Rule 2 looks at both signals regardless of which one ranked the match.
fn has_merge_signal(top: &OverlapCandidate, config: &AnalysisConfig) -> bool {
    top.percent >= config.merge_threshold || top.similarity >= config.vector_threshold
}

/// Classifies every cluster and writes status into its metrics.
pub fn classify_all(store: &mut AssignmentStore, config: &AnalysisConfig) {
    for cluster in store.cluster_ids() {
        let record = store.cluster(cluster);
        let verdict = classify(&record.metrics, record.top_match(), record.role, config);

        let record = store.cluster_mut(cluster);
        record.metrics.health_status = verdict.status;
        record.verdict = verdict;
    }
}
