//! End-to-end classification scenarios through the public engine API.

use crate::common::{assert_close, build, embedded_rows, hub_and_spoke, page, scored_rows};
use clusterlens::{HealthStatus, Issue, OverlapKind, RawAssignment, Recommendation, Role};

#[test]
fn test_shared_url_sets_duplication_rate() {
    let engine = build(vec![
        RawAssignment::new(page(1), "blog/seo").with_score(0.8),
        RawAssignment::new(page(2), "blog/seo").with_score(0.8),
        RawAssignment::new(page(3), "blog/seo").with_score(0.8),
        RawAssignment::new(page(3), "blog/marketing").with_score(0.8),
    ]);

    let seo = engine.cluster("blog/seo").unwrap();
    assert_eq!(seo.metrics.total_urls, 3);
    assert_eq!(seo.metrics.shared_urls, 1);
    assert_close(seo.metrics.duplication_rate, 1.0 / 3.0);
    // Three URLs is below the sunset size
    assert_eq!(seo.metrics.health_status, HealthStatus::Sunset);
}

#[test]
fn test_tiny_near_duplicate_is_merged_away() {
    let mut rows = embedded_rows("hub", 0..12, &[1.0, 0.0]);
    rows.extend(embedded_rows("tiny", 100..103, &[0.95, 0.31225]));
    let engine = build(rows);

    let tiny = engine.cluster("tiny").unwrap();
    let top = tiny.top_match().unwrap();
    assert_eq!(top.name, "hub");
    assert_eq!(top.kind, OverlapKind::Semantic);
    assert_close(top.similarity, 0.95);

    assert_eq!(tiny.verdict.status, HealthStatus::Sunset);
    assert_eq!(tiny.verdict.recommendation, Recommendation::SunsetMerge);
    assert_eq!(tiny.verdict.issue, Issue::LowVolume);
    assert_eq!(tiny.verdict.target_cluster.as_deref(), Some("hub"));

    let hub = engine.cluster("hub").unwrap();
    assert_eq!(hub.verdict.recommendation, Recommendation::Healthy);
    assert!(hub.candidates.is_empty());
}

#[test]
fn test_structural_overlap_builds_hierarchy() {
    let engine = build(hub_and_spoke());

    let spoke = engine.cluster("spoke").unwrap();
    let top = spoke.top_match().unwrap();
    assert_eq!(top.name, "hub");
    assert_eq!(top.count, 7);
    assert_close(top.percent, 7.0 / 12.0);
    assert_eq!(top.kind, OverlapKind::Structural);

    assert_eq!(spoke.role, Role::Child);
    assert_eq!(spoke.verdict.recommendation, Recommendation::ConsiderMerge);
    assert_eq!(spoke.verdict.issue, Issue::IntentOverlap);
    assert_eq!(spoke.verdict.target_cluster.as_deref(), Some("hub"));

    let hub = engine.cluster("hub").unwrap();
    assert_eq!(hub.role, Role::Parent);
    assert_eq!(hub.verdict.recommendation, Recommendation::Healthy);

    let report = engine.report();
    let hub_summary = report.cluster("hub").unwrap();
    assert_eq!(hub_summary.children, vec!["spoke".to_string()]);
    assert_eq!(report.cluster("spoke").unwrap().parent.as_deref(), Some("hub"));
}

#[test]
fn test_low_average_score_needs_quality_review() {
    let engine = build(scored_rows("thin", 0..12, 0.5));
    let thin = engine.cluster("thin").unwrap();
    assert_eq!(thin.verdict.status, HealthStatus::Review);
    assert_eq!(thin.verdict.recommendation, Recommendation::ReviewQuality);
    assert_eq!(thin.verdict.issue, Issue::LowQuality);
}

#[test]
fn test_report_totals() {
    let mut rows = hub_and_spoke();
    rows.extend(scored_rows("stub", 200..202, 0.9));
    let report = build(rows).report();

    assert_eq!(report.totals.clusters, 3);
    assert_eq!(report.totals.urls, 57);
    assert_eq!(report.totals.shared_urls, 7);
    assert_eq!(report.totals.healthy, 1);
    assert_eq!(report.totals.review, 1);
    assert_eq!(report.totals.sunset, 1);
    assert_eq!(report.totals.pending, 0);

    let expected = (7.0 / 50.0 + 7.0 / 12.0 + 0.0) / 3.0;
    assert_close(report.totals.mean_duplication_rate, expected);
}
