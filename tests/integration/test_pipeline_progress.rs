//! Driving the pipeline stage by stage and reading progress.

use crate::common::{hub_and_spoke, page};
use clusterlens::{AnalysisConfig, ClusterEngine, HealthStatus, RawAssignment, Stage};

#[test]
fn test_progress_sink_sees_every_stage_in_order() {
    let mut steps = Vec::new();
    let engine = ClusterEngine::build_with_progress(
        hub_and_spoke(),
        AnalysisConfig::default(),
        |report| steps.push((report.step, report.total_steps, report.label)),
    );

    assert_eq!(steps.len(), Stage::ALL.len());
    for (i, (step, total, label)) in steps.iter().enumerate() {
        assert_eq!(*step, i + 1);
        assert_eq!(*total, 8);
        assert!(!label.is_empty());
    }
    assert_eq!(engine.store().cluster_count(), 2);
}

#[test]
fn test_host_work_between_stages_sees_partial_state() {
    let mut pipeline = ClusterEngine::pipeline(hub_and_spoke(), AnalysisConfig::default());

    let mut health_ran = false;
    while let Some(stage) = pipeline.pending_stage() {
        if stage == Stage::Finalize {
            break;
        }
        let report = pipeline.next().unwrap();
        health_ran |= report.stage == Stage::Health;
    }
    assert!(health_ran);
    assert_eq!(pipeline.pending_stage(), Some(Stage::Finalize));

    let engine = pipeline.finish();
    assert!(engine.baseline_report().is_some());
    let hub = engine.cluster("hub").unwrap();
    assert_ne!(hub.metrics.health_status, HealthStatus::Pending);
}

#[test]
fn test_ingest_summary_counts_rejected_rows() {
    let rows = vec![
        RawAssignment::new(page(1), "seo").with_score(0.7),
        RawAssignment::new(page(1), "seo").with_score(0.2),
        RawAssignment::new("   ", "seo"),
        RawAssignment::new(page(2), ""),
        RawAssignment::new(format!("  {}  ", page(2)), " seo ").with_score(f32::NAN),
    ];
    let engine = ClusterEngine::build(rows, AnalysisConfig::default());

    let summary = engine.ingest_summary();
    assert_eq!(summary.rows, 5);
    assert_eq!(summary.accepted, 2);
    assert_eq!(summary.duplicates, 1);
    assert_eq!(summary.skipped, 2);

    let seo = engine.cluster("seo").unwrap();
    assert_eq!(seo.metrics.total_urls, 2);
    // First row wins, NaN reads as 0 and is left out of the average
    assert!((seo.metrics.avg_score - 0.7).abs() < 1e-6);
}

#[test]
fn test_empty_feed_builds_empty_report() {
    let engine = ClusterEngine::build(Vec::new(), AnalysisConfig::default());
    let report = engine.report();
    assert!(report.clusters.is_empty());
    assert!(report.urls.is_empty());
    assert_eq!(report.totals.mean_duplication_rate, 0.0);
}
