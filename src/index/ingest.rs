//! Turns flat input rows into the assignment store.

use super::store::{AssignmentStore, Embedding};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;

/// One input row: a URL tagged with a cluster.
///
/// Several rows may share a URL (competing tags) or a cluster name
/// (membership).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawAssignment {
    pub url: String,
    pub cluster_name: String,
    #[serde(default)]
    pub semantic_score: f32,
    #[serde(default)]
    pub embedding: Vec<f32>,
}

impl RawAssignment {
    pub fn new(url: impl Into<String>, cluster_name: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            cluster_name: cluster_name.into(),
            semantic_score: 0.0,
            embedding: Vec::new(),
        }
    }

    pub fn with_score(mut self, score: f32) -> Self {
        self.semantic_score = score;
        self
    }

    pub fn with_embedding(mut self, embedding: Vec<f32>) -> Self {
        self.embedding = embedding;
        self
    }
}

/// Counters describing what ingestion did with the feed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct IngestSummary {
    /// Rows read from the feed
    pub rows: usize,
    /// Rows that became a new assignment
    pub accepted: usize,
    /// Rows with a blank url or cluster name
    pub skipped: usize,
    /// Rows repeating an (url, cluster) pair already seen
    pub duplicates: usize,
}

/// Loads rows into `store`.
///
/// Blank rows are skipped silently. A repeated (url, cluster) pair keeps the
/// first row's score; the repeat only contributes an embedding when the first
/// row had none. Non-finite scores are read as 0.
pub fn ingest_rows<I>(store: &mut AssignmentStore, rows: I) -> IngestSummary
where
    I: IntoIterator<Item = RawAssignment>,
{
    let mut summary = IngestSummary::default();

    for row in rows {
        summary.rows += 1;

        let url = row.url.trim();
        let cluster_name = row.cluster_name.trim();
        if url.is_empty() || cluster_name.is_empty() {
            summary.skipped += 1;
            continue;
        }

        let url_id = store.intern_url(url);
        let cluster_id = store.intern_cluster(cluster_name);

        let embedding: Option<Embedding> =
            (!row.embedding.is_empty()).then(|| Arc::from(row.embedding));
        if let Some(embedding) = &embedding {
            let record = store.url_mut(url_id);
            if record.fallback_embedding.is_none() {
                record.fallback_embedding = Some(Arc::clone(embedding));
            }
        }

        if let Some(existing) = store.find(url_id, cluster_id) {
            summary.duplicates += 1;
            if let Some(embedding) = embedding {
                store.fill_embedding(existing, embedding);
            }
            continue;
        }

        let score = if row.semantic_score.is_finite() {
            row.semantic_score
        } else {
            0.0
        };
        store.insert(url_id, cluster_id, score, embedding);
        summary.accepted += 1;
    }

    debug!(
        "Ingested {} rows: {} accepted, {} skipped, {} duplicate",
        summary.rows, summary.accepted, summary.skipped, summary.duplicates
    );
    summary
}
