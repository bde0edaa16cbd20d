//! Edit batches against a built engine.

use crate::common::{build, hub_and_spoke, page, scored_rows};
use clusterlens::{Edit, EditBatch, EditError, HealthStatus, Recommendation, Role};

#[test]
fn test_rejected_batch_is_all_or_nothing() {
    let mut engine = build(hub_and_spoke());
    let before = engine.report();

    let batch = EditBatch::new()
        .unassign(page(0), "hub")
        .assign(page(0), "spoke")
        .move_url(page(1), "hub", "does-not-exist");
    let err = engine.apply(batch).unwrap_err();

    assert_eq!(
        err,
        EditError::UnknownCluster {
            name: "does-not-exist".to_string()
        }
    );
    assert!(err.to_string().contains("Suggestion:"));
    assert_eq!(engine.report(), before);
}

#[test]
fn test_edits_refresh_metrics_but_not_relationships() {
    let mut engine = build(hub_and_spoke());

    // Take every shared page out of the spoke
    let batch: EditBatch = (43..50)
        .map(|i| Edit::Unassign {
            url: page(i),
            cluster: "spoke".to_string(),
        })
        .collect();
    let outcome = engine.apply(batch).unwrap();
    assert_eq!(outcome.applied, 7);
    assert_eq!(outcome.urls.len(), 7);
    assert_eq!(outcome.clusters, vec!["hub".to_string(), "spoke".to_string()]);

    let spoke = engine.cluster("spoke").unwrap();
    assert_eq!(spoke.metrics.total_urls, 5);
    assert_eq!(spoke.metrics.duplication_rate, 0.0);
    assert_eq!(engine.cluster("hub").unwrap().metrics.shared_urls, 0);
    // Still the verdict from the build
    assert_eq!(spoke.role, Role::Child);

    engine.refresh_relationships();
    let spoke = engine.cluster("spoke").unwrap();
    assert_eq!(spoke.role, Role::Orphan);
    assert!(spoke.candidates.is_empty());
    assert_eq!(spoke.verdict.recommendation, Recommendation::ReviewLowVolume);
}

#[test]
fn test_merge_then_refresh_sunsets_the_source() {
    let mut engine = build(hub_and_spoke());
    let outcome = engine.merge_cluster("spoke", "hub").unwrap();
    assert_eq!(outcome.applied, 12);

    engine.refresh_relationships();
    let spoke = engine.cluster("spoke").unwrap();
    assert_eq!(spoke.metrics.total_urls, 0);
    assert_eq!(spoke.metrics.health_status, HealthStatus::Sunset);
    assert_eq!(spoke.verdict.recommendation, Recommendation::Sunset);

    let hub = engine.cluster("hub").unwrap();
    assert_eq!(hub.metrics.total_urls, 55);
    assert_eq!(hub.metrics.shared_urls, 0);
    assert_eq!(hub.verdict.recommendation, Recommendation::Healthy);

    // The build-time snapshot is kept for comparison
    let baseline = engine.baseline_report().unwrap();
    assert_eq!(
        baseline.cluster("spoke").unwrap().recommendation,
        Recommendation::ConsiderMerge
    );
}

#[test]
fn test_assign_creates_cluster_and_recalculates() {
    let mut engine = build(scored_rows("seo", 0..6, 0.8));
    let outcome = engine
        .apply(EditBatch::new().assign_with_embedding(page(0), "fresh", vec![0.6, 0.8]))
        .unwrap();
    assert_eq!(outcome.created_clusters, vec!["fresh".to_string()]);

    let fresh = engine.cluster("fresh").unwrap();
    assert_eq!(fresh.metrics.total_urls, 1);
    assert!(fresh.has_centroid());
    assert_eq!(engine.cluster("seo").unwrap().metrics.shared_urls, 1);

    assert!(engine.recalculate_cluster_stats("fresh"));
    assert!(!engine.recalculate_cluster_stats("stale"));
}
