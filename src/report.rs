//! Owned, serializable snapshots of the engine state.
//!
//! A report never borrows from the engine, so hosts can keep one around
//! across edits and diff it against a later snapshot.

use crate::analysis::{ClusterMetrics, OverlapCandidate};
use crate::index::AssignmentStore;
use crate::types::{ClusterId, HealthStatus, Issue, Recommendation, Role, TagStatus};
use serde::{Serialize, Serializer};
use std::fmt::Display;

/// Serializes a value through its `Display` label.
fn as_label<T: Display, S: Serializer>(value: &T, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_str(value)
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClusterSummary {
    pub name: String,
    pub metrics: ClusterMetrics,
    pub candidates: Vec<OverlapCandidate>,
    pub top_match: Option<OverlapCandidate>,
    pub role: Role,
    /// The cluster this one is a child of
    pub parent: Option<String>,
    pub children: Vec<String>,
    pub status: HealthStatus,
    #[serde(serialize_with = "as_label")]
    pub recommendation: Recommendation,
    #[serde(serialize_with = "as_label")]
    pub issue: Issue,
    pub target_cluster: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AssignmentView {
    pub cluster: String,
    pub score: f32,
}

/// Deep analysis of one URL.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UrlAnalysis {
    pub url: String,
    pub assignment_count: usize,
    /// Best score first
    pub assignments: Vec<AssignmentView>,
    pub primary_cluster: Option<String>,
    pub max_score: f32,
    pub status: TagStatus,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ReportTotals {
    pub clusters: usize,
    pub urls: usize,
    /// URLs carrying two or more tags
    pub shared_urls: usize,
    pub healthy: usize,
    pub review: usize,
    pub sunset: usize,
    pub pending: usize,
    /// Mean duplication rate over non-empty clusters
    pub mean_duplication_rate: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisReport {
    pub clusters: Vec<ClusterSummary>,
    pub urls: Vec<UrlAnalysis>,
    pub totals: ReportTotals,
}

impl AnalysisReport {
    pub fn from_store(store: &AssignmentStore) -> Self {
        let name_of = |id: ClusterId| store.cluster(id).name.clone();

        let clusters: Vec<ClusterSummary> = store
            .clusters()
            .map(|(_, record)| ClusterSummary {
                name: record.name.clone(),
                metrics: record.metrics,
                candidates: record.candidates.clone(),
                top_match: record.top_match().cloned(),
                role: record.role,
                parent: record.parent.map(name_of),
                children: record.children.iter().copied().map(name_of).collect(),
                status: record.verdict.status,
                recommendation: record.verdict.recommendation,
                issue: record.verdict.issue,
                target_cluster: record.verdict.target_cluster.clone(),
            })
            .collect();

        let urls: Vec<UrlAnalysis> = store
            .urls()
            .map(|(id, record)| UrlAnalysis {
                url: record.url.clone(),
                assignment_count: record.tag_count(),
                assignments: store
                    .assignments_of(id)
                    .map(|a| AssignmentView {
                        cluster: name_of(a.cluster),
                        score: a.score,
                    })
                    .collect(),
                primary_cluster: record.primary.map(name_of),
                max_score: record.max_score,
                status: TagStatus::from_tag_count(record.tag_count()),
            })
            .collect();

        let totals = ReportTotals::tally(&clusters, &urls);
        Self {
            clusters,
            urls,
            totals,
        }
    }

    pub fn cluster(&self, name: &str) -> Option<&ClusterSummary> {
        self.clusters.iter().find(|c| c.name == name)
    }

    pub fn url(&self, url: &str) -> Option<&UrlAnalysis> {
        self.urls.iter().find(|u| u.url == url)
    }

    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

impl ReportTotals {
    fn tally(clusters: &[ClusterSummary], urls: &[UrlAnalysis]) -> Self {
        let mut totals = ReportTotals {
            clusters: clusters.len(),
            urls: urls.len(),
            shared_urls: urls.iter().filter(|u| u.assignment_count >= 2).count(),
            ..ReportTotals::default()
        };

        let mut dup_sum = 0.0f32;
        let mut non_empty = 0usize;
        for cluster in clusters {
            match cluster.status {
                HealthStatus::Healthy => totals.healthy += 1,
                HealthStatus::Review => totals.review += 1,
                HealthStatus::Sunset => totals.sunset += 1,
                HealthStatus::Pending => totals.pending += 1,
            }
            if cluster.metrics.total_urls > 0 {
                dup_sum += cluster.metrics.duplication_rate;
                non_empty += 1;
            }
        }
        if non_empty > 0 {
            totals.mean_duplication_rate = dup_sum / non_empty as f32;
        }
        totals
    }
}
