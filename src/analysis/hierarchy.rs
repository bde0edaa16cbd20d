//! Parent / child inference from each cluster's best overlap match.
//!
//! A source becomes a child of its top match when the match clears the
//! configured threshold for its kind and the target is strictly larger. Size
//! strictly increases along every child→parent edge, so the hierarchy can
//! never contain a cycle.
//!
//! Roles are resolved after all edges are known: a cluster with a parent is a
//! `Child` even if other clusters point at it, a cluster that only has
//! children is a `Parent`, everything else is an `Orphan`. Several sources may
//! share a parent; children are listed in cluster ingestion order.

use crate::config::AnalysisConfig;
use crate::index::AssignmentStore;
use crate::types::{ClusterId, OverlapKind, Role};

use super::OverlapCandidate;

/// Whether `candidate` is strong enough to imply a merge into its target.
pub(crate) fn clears_merge_threshold(candidate: &OverlapCandidate, config: &AnalysisConfig) -> bool {
    match candidate.kind {
        OverlapKind::Structural => candidate.percent >= config.merge_threshold,
        OverlapKind::Semantic => candidate.similarity >= config.vector_threshold,
    }
}

/// Rebuilds roles, parents and children for every cluster.
///
/// Returns the number of child→parent edges.
pub fn build_hierarchy(store: &mut AssignmentStore, config: &AnalysisConfig) -> usize {
    let mut edges: Vec<(ClusterId, ClusterId)> = Vec::new();

    for (source, record) in store.clusters() {
        let Some(top) = record.top_match() else {
            continue;
        };
        if !clears_merge_threshold(top, config) {
            continue;
        }
        // A stale candidate may name a cluster that has since been emptied
        let target_size = store.cluster(top.target).metrics.total_urls;
        if target_size > record.metrics.total_urls {
            edges.push((source, top.target));
        }
    }

    for cluster in store.cluster_ids() {
        let record = store.cluster_mut(cluster);
        record.role = Role::Orphan;
        record.parent = None;
        record.children.clear();
    }

    for &(child, parent) in &edges {
        store.cluster_mut(child).parent = Some(parent);
        store.cluster_mut(parent).children.push(child);
    }

    for cluster in store.cluster_ids() {
        let record = store.cluster_mut(cluster);
        record.role = if record.parent.is_some() {
            Role::Child
        } else if !record.children.is_empty() {
            Role::Parent
        } else {
            Role::Orphan
        };
    }

    edges.len()
}
