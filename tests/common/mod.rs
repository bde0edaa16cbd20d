//! Fixture builders shared by the integration tests.
#![allow(dead_code)]

use clusterlens::{AnalysisConfig, ClusterEngine, RawAssignment};

pub fn page(i: usize) -> String {
    format!("https://example.com/page-{i}")
}

/// One row per page, all carrying the same input score and no embedding.
pub fn scored_rows(
    cluster: &str,
    pages: impl IntoIterator<Item = usize>,
    score: f32,
) -> Vec<RawAssignment> {
    pages
        .into_iter()
        .map(|i| RawAssignment::new(page(i), cluster).with_score(score))
        .collect()
}

/// One row per page, all sharing `embedding`.
pub fn embedded_rows(
    cluster: &str,
    pages: impl IntoIterator<Item = usize>,
    embedding: &[f32],
) -> Vec<RawAssignment> {
    pages
        .into_iter()
        .map(|i| RawAssignment::new(page(i), cluster).with_embedding(embedding.to_vec()))
        .collect()
}

pub fn build(rows: Vec<RawAssignment>) -> ClusterEngine {
    ClusterEngine::build(rows, AnalysisConfig::default())
}

/// Cluster "hub" with 50 pages and "spoke" with 12, sharing pages 43..50.
pub fn hub_and_spoke() -> Vec<RawAssignment> {
    let mut rows = scored_rows("hub", 0..50, 0.9);
    rows.extend(scored_rows("spoke", 43..55, 0.9));
    rows
}

pub fn assert_close(actual: f32, expected: f32) {
    assert!(
        (actual - expected).abs() < 1e-4,
        "expected {expected}, got {actual}"
    );
}
