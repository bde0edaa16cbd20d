//! The cluster analysis engine.
//!
//! A [`ClusterEngine`] owns the assignment store built from one dataset and
//! is the single source of truth for the session. It is built once through
//! the [`Pipeline`], queried with the what-if finders, and mutated only
//! through [`EditBatch`] transactions.

mod edit;
mod pipeline;

pub use edit::{Edit, EditBatch, EditOutcome};
pub use pipeline::{Pipeline, Stage, StageReport};

use crate::analysis::{
    backfill_cluster_scores, build_hierarchy, classify_all, compute_cluster_centroid,
    compute_cluster_metrics, find_overlaps,
};
use crate::config::AnalysisConfig;
use crate::explore::{DriftMatch, OpportunityMatch, find_drift, find_missed_opportunities};
use crate::index::{AssignmentStore, ClusterRecord, IngestSummary, RawAssignment, UrlRecord};
use crate::report::AnalysisReport;
use crate::types::ClusterId;

#[derive(Debug, Clone)]
pub struct ClusterEngine {
    store: AssignmentStore,
    config: AnalysisConfig,
    ingest: IngestSummary,
    /// Snapshot taken at the end of the initial build
    baseline: Option<AnalysisReport>,
}

impl ClusterEngine {
    /// Runs the full pipeline over `rows`.
    pub fn build<R>(rows: R, config: AnalysisConfig) -> Self
    where
        R: IntoIterator<Item = RawAssignment>,
    {
        Pipeline::new(rows, config).finish()
    }

    /// Runs the full pipeline, calling `progress` after every stage.
    pub fn build_with_progress<R, F>(rows: R, config: AnalysisConfig, progress: F) -> Self
    where
        R: IntoIterator<Item = RawAssignment>,
        F: FnMut(&StageReport),
    {
        Pipeline::new(rows, config).finish_with(progress)
    }

    /// Returns a stage-by-stage driver for hosts that interleave their own work.
    pub fn pipeline<R>(rows: R, config: AnalysisConfig) -> Pipeline<R::IntoIter>
    where
        R: IntoIterator<Item = RawAssignment>,
    {
        Pipeline::new(rows, config)
    }

    pub fn store(&self) -> &AssignmentStore {
        &self.store
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    /// Replaces the thresholds. Takes effect on the next
    /// [`refresh_relationships`](Self::refresh_relationships).
    pub fn set_config(&mut self, config: AnalysisConfig) {
        self.config = config;
    }

    pub fn ingest_summary(&self) -> IngestSummary {
        self.ingest
    }

    /// Report as it stood right after the initial build.
    pub fn baseline_report(&self) -> Option<&AnalysisReport> {
        self.baseline.as_ref()
    }

    /// Fresh snapshot of the current state.
    pub fn report(&self) -> AnalysisReport {
        AnalysisReport::from_store(&self.store)
    }

    pub fn cluster(&self, name: &str) -> Option<&ClusterRecord> {
        self.store.cluster_id(name).map(|id| self.store.cluster(id))
    }

    pub fn url(&self, url: &str) -> Option<&UrlRecord> {
        self.store.url_id(url).map(|id| self.store.url(id))
    }

    /// URLs outside `target` that would fit it better than their current home.
    pub fn find_missed_opportunities(
        &self,
        target: &str,
        min_match_score: f32,
        max_current_score: f32,
    ) -> Vec<OpportunityMatch> {
        find_missed_opportunities(&self.store, target, min_match_score, max_current_score)
    }

    /// [`find_missed_opportunities`](Self::find_missed_opportunities) with the
    /// configured magnet thresholds.
    pub fn find_missed_opportunities_with_config(&self, target: &str) -> Vec<OpportunityMatch> {
        self.find_missed_opportunities(
            target,
            self.config.magnet_min_score,
            self.config.magnet_max_current_score,
        )
    }

    /// Members of `target` that no longer fit its centroid.
    pub fn find_drift(&self, target: &str, threshold: f32) -> Vec<DriftMatch> {
        find_drift(&self.store, target, threshold)
    }

    pub fn find_drift_with_config(&self, target: &str) -> Vec<DriftMatch> {
        self.find_drift(target, self.config.drift_threshold)
    }

    /// Recomputes one cluster's centroid, member scores and metrics after its
    /// membership changed.
    ///
    /// URLs of the cluster get their primaries re-derived since their scores
    /// may have moved. Returns `false` if the cluster does not exist.
    ///
    /// [`apply`](Self::apply) already runs this for every cluster a batch
    /// touches; call it directly only to force a refresh of one cluster.
    pub fn recalculate_cluster_stats(&mut self, name: &str) -> bool {
        let Some(cluster) = self.store.cluster_id(name) else {
            return false;
        };
        self.recompute_membership(cluster);
        compute_cluster_metrics(&mut self.store, cluster);
        true
    }

    /// Re-runs overlap, hierarchy and health over the current state.
    ///
    /// Edits only refresh per-cluster statistics; call this when the
    /// recommendations should reflect them too.
    pub fn refresh_relationships(&mut self) {
        find_overlaps(&mut self.store);
        build_hierarchy(&mut self.store, &self.config);
        classify_all(&mut self.store, &self.config);
    }

    /// Centroid and scores for one cluster, then primaries for its URLs.
    fn recompute_membership(&mut self, cluster: ClusterId) {
        compute_cluster_centroid(&mut self.store, cluster);
        backfill_cluster_scores(&mut self.store, cluster);

        let urls: Vec<_> = self.store.members(cluster).map(|m| m.url).collect();
        for url in urls {
            self.store.refresh_url(url);
        }
    }
}
