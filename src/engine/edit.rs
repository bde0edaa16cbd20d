//! Edit transactions over a built engine.
//!
//! A batch is validated in full against the current state plus its own
//! earlier edits before anything is touched. Either every edit lands or the
//! engine is left exactly as it was.

use super::ClusterEngine;
use crate::analysis::{backfill_cluster_scores, compute_cluster_centroid, compute_cluster_metrics};
use crate::error::{EditError, EditResult};
use crate::explore::{DriftMatch, OpportunityMatch};
use crate::index::{AssignmentStore, Embedding};
use crate::types::{ClusterId, UrlId};
use serde::Serialize;
use std::collections::{BTreeSet, HashSet};
use std::sync::Arc;
use tracing::{debug, info};

/// One structural change to the URL↔cluster table.
#[derive(Debug, Clone, PartialEq)]
pub enum Edit {
    /// Tags `url` with `cluster`, creating the cluster if it is new.
    ///
    /// Without an explicit embedding the URL's existing one is reused.
    Assign {
        url: String,
        cluster: String,
        embedding: Option<Vec<f32>>,
    },
    Unassign {
        url: String,
        cluster: String,
    },
    /// Retags `url` from `from` to `to`, carrying its embedding along.
    Move {
        url: String,
        from: String,
        to: String,
    },
}

impl Edit {
    fn trimmed(&self) -> EditResult<Edit> {
        fn name(value: &str) -> EditResult<String> {
            let value = value.trim();
            if value.is_empty() {
                return Err(EditError::EmptyName);
            }
            Ok(value.to_string())
        }

        Ok(match self {
            Edit::Assign {
                url,
                cluster,
                embedding,
            } => Edit::Assign {
                url: name(url)?,
                cluster: name(cluster)?,
                embedding: embedding.clone(),
            },
            Edit::Unassign { url, cluster } => Edit::Unassign {
                url: name(url)?,
                cluster: name(cluster)?,
            },
            Edit::Move { url, from, to } => Edit::Move {
                url: name(url)?,
                from: name(from)?,
                to: name(to)?,
            },
        })
    }
}

/// Ordered list of edits applied as one transaction.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EditBatch {
    edits: Vec<Edit>,
}

impl EditBatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn assign(mut self, url: impl Into<String>, cluster: impl Into<String>) -> Self {
        self.edits.push(Edit::Assign {
            url: url.into(),
            cluster: cluster.into(),
            embedding: None,
        });
        self
    }

    pub fn assign_with_embedding(
        mut self,
        url: impl Into<String>,
        cluster: impl Into<String>,
        embedding: Vec<f32>,
    ) -> Self {
        self.edits.push(Edit::Assign {
            url: url.into(),
            cluster: cluster.into(),
            embedding: Some(embedding),
        });
        self
    }

    pub fn unassign(mut self, url: impl Into<String>, cluster: impl Into<String>) -> Self {
        self.edits.push(Edit::Unassign {
            url: url.into(),
            cluster: cluster.into(),
        });
        self
    }

    pub fn move_url(
        mut self,
        url: impl Into<String>,
        from: impl Into<String>,
        to: impl Into<String>,
    ) -> Self {
        self.edits.push(Edit::Move {
            url: url.into(),
            from: from.into(),
            to: to.into(),
        });
        self
    }

    pub fn push(&mut self, edit: Edit) {
        self.edits.push(edit);
    }

    pub fn edits(&self) -> &[Edit] {
        &self.edits
    }

    pub fn len(&self) -> usize {
        self.edits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.edits.is_empty()
    }
}

impl FromIterator<Edit> for EditBatch {
    fn from_iter<T: IntoIterator<Item = Edit>>(iter: T) -> Self {
        Self {
            edits: iter.into_iter().collect(),
        }
    }
}

/// What a committed batch changed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct EditOutcome {
    pub applied: usize,
    /// Clusters whose statistics were recomputed
    pub clusters: Vec<String>,
    /// URLs whose tags changed
    pub urls: Vec<String>,
    /// Clusters that did not exist before the batch
    pub created_clusters: Vec<String>,
}

/// Membership as it would look after the edits validated so far.
struct Overlay<'a> {
    store: &'a AssignmentStore,
    added: HashSet<(String, String)>,
    removed: HashSet<(String, String)>,
    created: HashSet<String>,
}

impl<'a> Overlay<'a> {
    fn new(store: &'a AssignmentStore) -> Self {
        Self {
            store,
            added: HashSet::new(),
            removed: HashSet::new(),
            created: HashSet::new(),
        }
    }

    fn require_url(&self, url: &str) -> EditResult<()> {
        match self.store.url_id(url) {
            Some(_) => Ok(()),
            None => Err(EditError::UnknownUrl {
                url: url.to_string(),
            }),
        }
    }

    fn cluster_exists(&self, name: &str) -> bool {
        self.store.cluster_id(name).is_some() || self.created.contains(name)
    }

    fn require_cluster(&self, name: &str) -> EditResult<()> {
        if self.cluster_exists(name) {
            Ok(())
        } else {
            Err(EditError::UnknownCluster {
                name: name.to_string(),
            })
        }
    }

    fn has(&self, url: &str, cluster: &str) -> bool {
        let key = (url.to_string(), cluster.to_string());
        if self.added.contains(&key) {
            return true;
        }
        if self.removed.contains(&key) {
            return false;
        }
        match (self.store.url_id(url), self.store.cluster_id(cluster)) {
            (Some(u), Some(c)) => self.store.contains(u, c),
            _ => false,
        }
    }

    fn add(&mut self, url: &str, cluster: &str) {
        let key = (url.to_string(), cluster.to_string());
        self.removed.remove(&key);
        self.added.insert(key);
    }

    fn remove(&mut self, url: &str, cluster: &str) {
        let key = (url.to_string(), cluster.to_string());
        self.added.remove(&key);
        self.removed.insert(key);
    }

    fn check(&mut self, edit: &Edit) -> EditResult<()> {
        match edit {
            Edit::Assign { url, cluster, .. } => {
                self.require_url(url)?;
                if !self.cluster_exists(cluster) {
                    self.created.insert(cluster.clone());
                }
                if self.has(url, cluster) {
                    return Err(EditError::DuplicateAssignment {
                        url: url.clone(),
                        cluster: cluster.clone(),
                    });
                }
                self.add(url, cluster);
            }
            Edit::Unassign { url, cluster } => {
                self.require_url(url)?;
                self.require_cluster(cluster)?;
                if !self.has(url, cluster) {
                    return Err(EditError::MissingAssignment {
                        url: url.clone(),
                        cluster: cluster.clone(),
                    });
                }
                self.remove(url, cluster);
            }
            Edit::Move { url, from, to } => {
                self.require_url(url)?;
                if from == to {
                    return Err(EditError::SameCluster {
                        url: url.clone(),
                        cluster: from.clone(),
                    });
                }
                self.require_cluster(from)?;
                self.require_cluster(to)?;
                if !self.has(url, from) {
                    return Err(EditError::MissingAssignment {
                        url: url.clone(),
                        cluster: from.clone(),
                    });
                }
                if self.has(url, to) {
                    return Err(EditError::DuplicateAssignment {
                        url: url.clone(),
                        cluster: to.clone(),
                    });
                }
                self.remove(url, from);
                self.add(url, to);
            }
        }
        Ok(())
    }
}

/// Ids collected while applying, in creation order.
#[derive(Default)]
struct Touched {
    clusters: BTreeSet<ClusterId>,
    urls: BTreeSet<UrlId>,
    created: Vec<String>,
}

impl ClusterEngine {
    /// Applies `batch` as one transaction.
    ///
    /// The whole batch is validated before the first mutation. On success
    /// every cluster whose membership changed gets a new centroid and member
    /// scores, every affected URL its primary, and every cluster holding an
    /// affected URL fresh metrics. Relationships and health are left to
    /// [`refresh_relationships`](Self::refresh_relationships).
    pub fn apply(&mut self, batch: EditBatch) -> EditResult<EditOutcome> {
        let edits = batch
            .edits
            .iter()
            .map(Edit::trimmed)
            .collect::<EditResult<Vec<_>>>()?;
        if edits.is_empty() {
            return Ok(EditOutcome::default());
        }

        let mut overlay = Overlay::new(&self.store);
        for edit in &edits {
            if let Err(err) = overlay.check(edit) {
                debug!("Rejected edit batch: {err}");
                return Err(err);
            }
        }

        let mut touched = Touched::default();
        for edit in &edits {
            self.apply_one(edit, &mut touched);
        }
        let outcome = self.recompute(&touched, edits.len());

        info!(
            "Committed {} edits: {} clusters recomputed, {} URLs retagged",
            outcome.applied,
            outcome.clusters.len(),
            outcome.urls.len()
        );
        Ok(outcome)
    }

    /// Moves each suggested URL into `target` from its primary cluster, or
    /// assigns it when it has none.
    pub fn accept_opportunities(
        &mut self,
        target: &str,
        matches: &[OpportunityMatch],
    ) -> EditResult<EditOutcome> {
        let mut batch = EditBatch::new();
        for hit in matches {
            let primary = self
                .url(&hit.url)
                .and_then(|record| record.primary)
                .map(|id| self.store.cluster(id).name.clone());
            batch = match primary {
                Some(from) if from == target => continue,
                Some(from) => batch.move_url(hit.url.as_str(), from, target),
                None => batch.assign(hit.url.as_str(), target),
            };
        }
        self.apply(batch)
    }

    /// Moves drifted members of `target` to their suggested alternative.
    ///
    /// Matches without an alternative are skipped. A URL already tagged with
    /// its alternative just loses the `target` tag.
    pub fn accept_drift(&mut self, target: &str, drift: &[DriftMatch]) -> EditResult<EditOutcome> {
        let mut batch = EditBatch::new();
        for item in drift {
            let Some(alternative) = &item.alternative else {
                continue;
            };
            let already_there = match (
                self.store.url_id(&item.url),
                self.store.cluster_id(&alternative.cluster),
            ) {
                (Some(url), Some(cluster)) => self.store.contains(url, cluster),
                _ => false,
            };
            batch = if already_there {
                batch.unassign(item.url.as_str(), target)
            } else {
                batch.move_url(item.url.as_str(), target, alternative.cluster.as_str())
            };
        }
        self.apply(batch)
    }

    /// Moves every member of `source` into `target`, leaving `source` empty.
    ///
    /// Members already in `target` just lose the `source` tag. Merging a
    /// name into itself is a no-op, whether or not the cluster exists.
    pub fn merge_cluster(&mut self, source: &str, target: &str) -> EditResult<EditOutcome> {
        if source.trim() == target.trim() {
            return Ok(EditOutcome::default());
        }
        let source_id = self
            .store
            .cluster_id(source.trim())
            .ok_or_else(|| EditError::UnknownCluster {
                name: source.to_string(),
            })?;
        let target_id = self.store.cluster_id(target.trim());

        let mut batch = EditBatch::new();
        for member in self.store.members(source_id) {
            let url = self.store.url(member.url).url.as_str();
            let in_target = target_id.is_some_and(|t| self.store.contains(member.url, t));
            batch = if in_target {
                batch.unassign(url, source)
            } else {
                batch.move_url(url, source, target)
            };
        }
        self.apply(batch)
    }

    /// Structural mutation only. The edit has already been validated.
    fn apply_one(&mut self, edit: &Edit, touched: &mut Touched) {
        let store = &mut self.store;
        match edit {
            Edit::Assign {
                url,
                cluster,
                embedding,
            } => {
                let Some(url_id) = store.url_id(url) else {
                    return;
                };
                if store.cluster_id(cluster).is_none() {
                    touched.created.push(cluster.clone());
                }
                let cluster_id = store.intern_cluster(cluster);
                let embedding: Option<Embedding> = match embedding {
                    Some(values) if !values.is_empty() => Some(Arc::from(values.as_slice())),
                    _ => store.shared_embedding(url_id),
                };
                store.insert(url_id, cluster_id, 0.0, embedding);
                touched.clusters.insert(cluster_id);
                touched.urls.insert(url_id);
            }
            Edit::Unassign { url, cluster } => {
                let (Some(url_id), Some(cluster_id)) = (store.url_id(url), store.cluster_id(cluster))
                else {
                    return;
                };
                store.remove(url_id, cluster_id);
                touched.clusters.insert(cluster_id);
                touched.urls.insert(url_id);
            }
            Edit::Move { url, from, to } => {
                let (Some(url_id), Some(from_id), Some(to_id)) = (
                    store.url_id(url),
                    store.cluster_id(from),
                    store.cluster_id(to),
                ) else {
                    return;
                };
                let carried = store
                    .remove(url_id, from_id)
                    .and_then(|old| old.embedding)
                    .filter(|e| !e.is_empty())
                    .or_else(|| store.shared_embedding(url_id));
                store.insert(url_id, to_id, 0.0, carried);
                touched.clusters.insert(from_id);
                touched.clusters.insert(to_id);
                touched.urls.insert(url_id);
            }
        }
    }

    fn recompute(&mut self, touched: &Touched, applied: usize) -> EditOutcome {
        let store = &mut self.store;

        for &cluster in &touched.clusters {
            compute_cluster_centroid(store, cluster);
            backfill_cluster_scores(store, cluster);
        }

        // Backfill may have moved scores of members that were not edited
        let mut refresh: BTreeSet<UrlId> = touched.urls.clone();
        for &cluster in &touched.clusters {
            refresh.extend(store.members(cluster).map(|m| m.url));
        }
        for &url in &refresh {
            store.refresh_url(url);
        }

        let mut stale: BTreeSet<ClusterId> = touched.clusters.clone();
        for &url in &touched.urls {
            stale.extend(store.assignments_of(url).map(|a| a.cluster));
        }
        for &cluster in &stale {
            compute_cluster_metrics(store, cluster);
        }

        EditOutcome {
            applied,
            clusters: stale
                .iter()
                .map(|&id| store.cluster(id).name.clone())
                .collect(),
            urls: touched
                .urls
                .iter()
                .map(|&id| store.url(id).url.clone())
                .collect(),
            created_clusters: touched.created.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AnalysisConfig;
    use crate::index::RawAssignment;

    fn engine() -> ClusterEngine {
        let rows = vec![
            RawAssignment::new("https://site.com/a", "seo").with_embedding(vec![1.0, 0.0]),
            RawAssignment::new("https://site.com/b", "seo").with_embedding(vec![0.9, 0.1]),
            RawAssignment::new("https://site.com/c", "ads").with_embedding(vec![0.0, 1.0]),
            RawAssignment::new("https://site.com/d", "ads").with_embedding(vec![0.1, 0.9]),
        ];
        ClusterEngine::build(rows, AnalysisConfig::default())
    }

    #[test]
    fn test_move_carries_embedding_and_rescores() {
        let mut engine = engine();
        let outcome = engine
            .apply(EditBatch::new().move_url("https://site.com/b", "seo", "ads"))
            .unwrap();

        assert_eq!(outcome.applied, 1);
        assert_eq!(outcome.urls, vec!["https://site.com/b".to_string()]);
        assert!(outcome.clusters.contains(&"seo".to_string()));
        assert!(outcome.clusters.contains(&"ads".to_string()));

        let ads = engine.cluster("ads").unwrap();
        assert_eq!(ads.metrics.total_urls, 3);
        assert_eq!(engine.cluster("seo").unwrap().metrics.total_urls, 1);

        let store = engine.store();
        let b = store.url_id("https://site.com/b").unwrap();
        let moved = store.assignments_of(b).next().unwrap();
        assert_eq!(moved.embedding(), Some(&[0.9f32, 0.1][..]));
        assert!(moved.score > 0.0);
        assert_eq!(store.url(b).primary, store.cluster_id("ads"));
    }

    #[test]
    fn test_failed_batch_leaves_state_untouched() {
        let mut engine = engine();
        let before = engine.report();

        let err = engine
            .apply(
                EditBatch::new()
                    .move_url("https://site.com/a", "seo", "ads")
                    .unassign("https://site.com/c", "seo"),
            )
            .unwrap_err();
        assert_eq!(err.status_code(), "MISSING_ASSIGNMENT");
        assert_eq!(engine.report(), before);
    }

    #[test]
    fn test_batch_sees_its_own_earlier_edits() {
        let mut engine = engine();
        let outcome = engine
            .apply(
                EditBatch::new()
                    .assign("https://site.com/a", "guides")
                    .move_url("https://site.com/a", "guides", "ads")
                    .unassign("https://site.com/a", "seo"),
            )
            .unwrap();
        assert_eq!(outcome.created_clusters, vec!["guides".to_string()]);

        let store = engine.store();
        let a = store.url_id("https://site.com/a").unwrap();
        assert_eq!(store.url(a).tag_count(), 1);
        assert_eq!(store.url(a).primary, store.cluster_id("ads"));
        assert_eq!(engine.cluster("guides").unwrap().member_count(), 0);
    }

    #[test]
    fn test_validation_errors() {
        let mut engine = engine();
        let cases = [
            (
                EditBatch::new().assign("https://site.com/zzz", "seo"),
                "UNKNOWN_URL",
            ),
            (
                EditBatch::new().assign("https://site.com/a", "seo"),
                "DUPLICATE_ASSIGNMENT",
            ),
            (
                EditBatch::new().unassign("https://site.com/a", "missing"),
                "UNKNOWN_CLUSTER",
            ),
            (
                EditBatch::new().move_url("https://site.com/a", "seo", "seo"),
                "SAME_CLUSTER",
            ),
            (
                EditBatch::new().move_url("https://site.com/a", "seo", "nowhere"),
                "UNKNOWN_CLUSTER",
            ),
            (EditBatch::new().assign("  ", "seo"), "EMPTY_NAME"),
        ];
        for (batch, code) in cases {
            assert_eq!(engine.apply(batch).unwrap_err().status_code(), code);
        }
    }

    #[test]
    fn test_merge_cluster_empties_source() {
        let mut engine = engine();
        engine
            .apply(EditBatch::new().assign("https://site.com/c", "seo"))
            .unwrap();

        engine.merge_cluster("ads", "seo").unwrap();
        assert_eq!(engine.cluster("ads").unwrap().metrics.total_urls, 0);
        let seo = engine.cluster("seo").unwrap();
        assert_eq!(seo.metrics.total_urls, 4);
        assert_eq!(seo.metrics.shared_urls, 0);

        assert_eq!(engine.merge_cluster("seo", "seo").unwrap(), EditOutcome::default());
        assert!(engine.merge_cluster("missing", "seo").is_err());
    }

    #[test]
    fn test_self_merge_never_fails() {
        let mut engine = engine();
        let before = engine.report();
        assert_eq!(
            engine.merge_cluster("missing", " missing ").unwrap(),
            EditOutcome::default()
        );
        assert_eq!(engine.merge_cluster("ads", "ads").unwrap(), EditOutcome::default());
        assert_eq!(engine.report(), before);
    }
}
