//! Opportunity and drift searches, and accepting what they suggest.

use crate::common::{assert_close, build, embedded_rows, page};
use clusterlens::RawAssignment;

fn guides_and_misc() -> Vec<RawAssignment> {
    let mut rows = embedded_rows("guides", 0..10, &[1.0, 0.0]);
    rows.extend(embedded_rows("misc", 100..103, &[0.0, 1.0]));
    rows.push(RawAssignment::new(page(200), "misc").with_embedding(vec![1.0, 0.2]));
    rows
}

#[test]
fn test_opportunity_found_and_accepted() {
    let mut engine = build(guides_and_misc());

    let matches = engine.find_missed_opportunities_with_config("guides");
    assert_eq!(matches.len(), 1);
    let hit = &matches[0];
    assert_eq!(hit.url, page(200));
    assert_eq!(hit.current_cluster.as_deref(), Some("misc"));
    assert!(!hit.pure_gain);
    assert_close(hit.new_score, 1.0 / 1.04f32.sqrt());
    assert!(hit.current_score < 0.5);

    let outcome = engine.accept_opportunities("guides", &matches).unwrap();
    assert_eq!(outcome.urls, vec![page(200)]);

    assert_eq!(engine.cluster("guides").unwrap().metrics.total_urls, 11);
    assert_eq!(engine.cluster("misc").unwrap().metrics.total_urls, 3);
    let moved = engine.url(&page(200)).unwrap();
    assert_eq!(moved.primary, engine.store().cluster_id("guides"));
    assert_eq!(moved.tag_count(), 1);
    assert!(moved.max_score > 0.9);

    assert!(engine.find_missed_opportunities_with_config("guides").is_empty());
}

#[test]
fn test_opportunities_for_unknown_target_are_empty() {
    let engine = build(guides_and_misc());
    assert!(engine.find_missed_opportunities("nope", 0.0, 1.0).is_empty());
    assert!(engine.find_drift("nope", 1.0).is_empty());
}

#[test]
fn test_drift_found_and_accepted() {
    let mut rows = embedded_rows("guides", 0..10, &[1.0, 0.0]);
    rows.push(RawAssignment::new(page(50), "guides").with_embedding(vec![0.0, 1.0]));
    rows.extend(embedded_rows("pricing", 100..110, &[0.0, 1.0]));
    let mut engine = build(rows);

    let drift = engine.find_drift_with_config("guides");
    assert_eq!(drift.len(), 1);
    assert_eq!(drift[0].url, page(50));
    assert!(drift[0].score < 0.2);
    let alternative = drift[0].alternative.as_ref().unwrap();
    assert_eq!(alternative.cluster, "pricing");
    assert_close(alternative.score, 1.0);

    engine.accept_drift("guides", &drift).unwrap();
    assert_eq!(engine.cluster("guides").unwrap().metrics.total_urls, 10);
    assert_eq!(engine.cluster("pricing").unwrap().metrics.total_urls, 11);
    assert!(engine.find_drift_with_config("guides").is_empty());
}

#[test]
fn test_drift_into_cluster_already_holding_the_url() {
    let mut rows = embedded_rows("guides", 0..10, &[1.0, 0.0]);
    rows.push(RawAssignment::new(page(50), "guides").with_embedding(vec![0.0, 1.0]));
    rows.extend(embedded_rows("pricing", 100..110, &[0.0, 1.0]));
    rows.push(RawAssignment::new(page(50), "pricing").with_embedding(vec![0.0, 1.0]));
    let mut engine = build(rows);

    let drift = engine.find_drift_with_config("guides");
    assert_eq!(drift.len(), 1);

    engine.accept_drift("guides", &drift).unwrap();
    let url = engine.url(&page(50)).unwrap();
    assert_eq!(url.tag_count(), 1);
    assert_eq!(url.primary, engine.store().cluster_id("pricing"));
}
