//! Stage-by-stage pipeline driver.
//!
//! [`Pipeline`] is an iterator: every call to `next()` runs exactly one stage
//! to completion and yields a [`StageReport`]. Hosts that must stay
//! responsive can do their own work between stages; everyone else calls
//! [`Pipeline::finish`].

use super::ClusterEngine;
use crate::analysis::{
    backfill_scores, build_hierarchy, classify_all, compute_centroids, compute_metrics,
    find_overlaps,
};
use crate::config::AnalysisConfig;
use crate::index::{AssignmentStore, IngestSummary, RawAssignment, ingest_rows};
use crate::report::AnalysisReport;
use std::time::{Duration, Instant};
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    Ingest,
    Centroids,
    Backfill,
    Metrics,
    Overlap,
    Hierarchy,
    Health,
    Finalize,
}

impl Stage {
    /// Stages in execution order.
    pub const ALL: [Stage; 8] = [
        Stage::Ingest,
        Stage::Centroids,
        Stage::Backfill,
        Stage::Metrics,
        Stage::Overlap,
        Stage::Hierarchy,
        Stage::Health,
        Stage::Finalize,
    ];

    /// Short human-readable label for progress displays.
    pub fn label(self) -> &'static str {
        match self {
            Stage::Ingest => "Indexing URLs and clusters",
            Stage::Centroids => "Calculating cluster centroids",
            Stage::Backfill => "Scoring members against centroids",
            Stage::Metrics => "Computing duplication metrics",
            Stage::Overlap => "Detecting cluster overlap",
            Stage::Hierarchy => "Inferring cluster hierarchy",
            Stage::Health => "Classifying cluster health",
            Stage::Finalize => "Building report",
        }
    }

    /// 1-based position in [`Stage::ALL`].
    pub fn ordinal(self) -> usize {
        Stage::ALL
            .iter()
            .position(|&s| s == self)
            .map_or(0, |i| i + 1)
    }

    fn next(self) -> Option<Stage> {
        Stage::ALL.get(self.ordinal()).copied()
    }
}

/// Emitted after each completed stage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageReport {
    pub stage: Stage,
    pub label: &'static str,
    /// 1-based stage number
    pub step: usize,
    pub total_steps: usize,
    pub elapsed: Duration,
}

pub struct Pipeline<I> {
    rows: Option<I>,
    store: AssignmentStore,
    config: AnalysisConfig,
    ingest: IngestSummary,
    baseline: Option<AnalysisReport>,
    next_stage: Option<Stage>,
}

impl<I> Pipeline<I>
where
    I: Iterator<Item = RawAssignment>,
{
    pub fn new<R>(rows: R, config: AnalysisConfig) -> Self
    where
        R: IntoIterator<Item = RawAssignment, IntoIter = I>,
    {
        Self {
            rows: Some(rows.into_iter()),
            store: AssignmentStore::new(),
            config,
            ingest: IngestSummary::default(),
            baseline: None,
            next_stage: Some(Stage::Ingest),
        }
    }

    /// Stage that the next call to `next()` will run.
    pub fn pending_stage(&self) -> Option<Stage> {
        self.next_stage
    }

    /// Runs the remaining stages and hands over the built engine.
    pub fn finish(mut self) -> ClusterEngine {
        for _ in self.by_ref() {}
        self.into_engine()
    }

    /// Like [`finish`](Self::finish), reporting every stage to `sink`.
    pub fn finish_with<F>(mut self, mut sink: F) -> ClusterEngine
    where
        F: FnMut(&StageReport),
    {
        for report in self.by_ref() {
            sink(&report);
        }
        self.into_engine()
    }

    fn into_engine(self) -> ClusterEngine {
        ClusterEngine {
            store: self.store,
            config: self.config,
            ingest: self.ingest,
            baseline: self.baseline,
        }
    }

    fn run_stage(&mut self, stage: Stage) {
        let store = &mut self.store;
        match stage {
            Stage::Ingest => {
                if let Some(rows) = self.rows.take() {
                    self.ingest = ingest_rows(store, rows);
                }
            }
            Stage::Centroids => compute_centroids(store),
            Stage::Backfill => {
                let written = backfill_scores(store);
                debug!("Backfilled {written} member scores");
            }
            Stage::Metrics => compute_metrics(store),
            Stage::Overlap => {
                let with_match = find_overlaps(store);
                debug!("{with_match} clusters have merge candidates");
            }
            Stage::Hierarchy => {
                let edges = build_hierarchy(store, &self.config);
                debug!("{edges} child clusters linked to a parent");
            }
            Stage::Health => classify_all(store, &self.config),
            Stage::Finalize => {
                self.baseline = Some(AnalysisReport::from_store(store));
            }
        }
    }
}

impl<I> Iterator for Pipeline<I>
where
    I: Iterator<Item = RawAssignment>,
{
    type Item = StageReport;

    fn next(&mut self) -> Option<StageReport> {
        let stage = self.next_stage?;
        let started = Instant::now();
        self.run_stage(stage);
        self.next_stage = stage.next();

        let report = StageReport {
            stage,
            label: stage.label(),
            step: stage.ordinal(),
            total_steps: Stage::ALL.len(),
            elapsed: started.elapsed(),
        };
        debug!(
            "[{}/{}] {} in {:?}",
            report.step, report.total_steps, report.label, report.elapsed
        );
        Some(report)
    }
}
