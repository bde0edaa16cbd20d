//! Single-table storage for URL↔cluster assignments.
//!
//! Every (url, cluster) edge lives exactly once in an arena of assignment
//! slots. URL and cluster records only hold lists of assignment ids, so the
//! "URL's clusters" and "cluster's URLs" views can never disagree about a
//! score or an embedding. The composite `(UrlId, ClusterId)` map doubles as
//! the O(1) membership test.

use crate::analysis::{ClusterMetrics, HealthVerdict, OverlapCandidate};
use crate::types::{AssignmentId, ClusterId, Role, UrlId};
use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::Arc;

/// Shared embedding buffer. Cloning an assignment never copies vector data.
pub type Embedding = Arc<[f32]>;

/// One (url, cluster) edge.
#[derive(Debug, Clone)]
pub struct Assignment {
    pub url: UrlId,
    pub cluster: ClusterId,
    /// Similarity of this URL to the cluster centroid once backfilled,
    /// otherwise the score carried by the input row.
    pub score: f32,
    pub embedding: Option<Embedding>,
}

impl Assignment {
    /// Embedding as a slice, `None` when absent or empty.
    pub fn embedding(&self) -> Option<&[f32]> {
        self.embedding.as_deref().filter(|e| !e.is_empty())
    }
}

/// Per-URL view. `primary` and `max_score` are derived from `assignments[0]`.
#[derive(Debug, Clone)]
pub struct UrlRecord {
    pub url: String,
    /// Sorted by score descending after every refresh.
    pub(crate) assignments: Vec<AssignmentId>,
    pub primary: Option<ClusterId>,
    pub max_score: f32,
    /// First non-empty embedding seen in the raw feed for this URL.
    pub(crate) fallback_embedding: Option<Embedding>,
}

impl UrlRecord {
    fn new(url: String) -> Self {
        Self {
            url,
            assignments: Vec::new(),
            primary: None,
            max_score: 0.0,
            fallback_embedding: None,
        }
    }

    pub fn tag_count(&self) -> usize {
        self.assignments.len()
    }

    pub fn fallback_embedding(&self) -> Option<&[f32]> {
        self.fallback_embedding.as_deref()
    }
}

/// Per-cluster view plus everything the analysis stages derive for it.
#[derive(Debug, Clone)]
pub struct ClusterRecord {
    pub name: String,
    /// Insertion ordered.
    pub(crate) members: Vec<AssignmentId>,
    /// Empty or unit length.
    pub centroid: Vec<f32>,
    pub metrics: ClusterMetrics,
    /// Top merge candidates, best first.
    pub candidates: Vec<OverlapCandidate>,
    pub role: Role,
    pub parent: Option<ClusterId>,
    pub children: Vec<ClusterId>,
    pub verdict: HealthVerdict,
}

impl ClusterRecord {
    fn new(name: String) -> Self {
        Self {
            name,
            members: Vec::new(),
            centroid: Vec::new(),
            metrics: ClusterMetrics::default(),
            candidates: Vec::new(),
            role: Role::Orphan,
            parent: None,
            children: Vec::new(),
            verdict: HealthVerdict::default(),
        }
    }

    pub fn top_match(&self) -> Option<&OverlapCandidate> {
        self.candidates.first()
    }

    pub fn member_count(&self) -> usize {
        self.members.len()
    }

    pub fn has_centroid(&self) -> bool {
        !self.centroid.is_empty()
    }
}

#[derive(Debug, Clone, Default)]
pub struct AssignmentStore {
    slots: Vec<Option<Assignment>>,
    by_pair: HashMap<(UrlId, ClusterId), AssignmentId>,
    urls: Vec<UrlRecord>,
    url_ids: HashMap<String, UrlId>,
    clusters: Vec<ClusterRecord>,
    cluster_ids: HashMap<String, ClusterId>,
}

impl AssignmentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the id for `url`, creating the record on first sight.
    pub fn intern_url(&mut self, url: &str) -> UrlId {
        if let Some(&id) = self.url_ids.get(url) {
            return id;
        }
        let id = UrlId::from_index(self.urls.len());
        self.urls.push(UrlRecord::new(url.to_string()));
        self.url_ids.insert(url.to_string(), id);
        id
    }

    /// Returns the id for cluster `name`, creating the record on first sight.
    pub fn intern_cluster(&mut self, name: &str) -> ClusterId {
        if let Some(&id) = self.cluster_ids.get(name) {
            return id;
        }
        let id = ClusterId::from_index(self.clusters.len());
        self.clusters.push(ClusterRecord::new(name.to_string()));
        self.cluster_ids.insert(name.to_string(), id);
        id
    }

    pub fn url_id(&self, url: &str) -> Option<UrlId> {
        self.url_ids.get(url).copied()
    }

    pub fn cluster_id(&self, name: &str) -> Option<ClusterId> {
        self.cluster_ids.get(name).copied()
    }

    pub fn url(&self, id: UrlId) -> &UrlRecord {
        &self.urls[id.index()]
    }

    pub(crate) fn url_mut(&mut self, id: UrlId) -> &mut UrlRecord {
        &mut self.urls[id.index()]
    }

    pub fn cluster(&self, id: ClusterId) -> &ClusterRecord {
        &self.clusters[id.index()]
    }

    pub(crate) fn cluster_mut(&mut self, id: ClusterId) -> &mut ClusterRecord {
        &mut self.clusters[id.index()]
    }

    pub fn url_count(&self) -> usize {
        self.urls.len()
    }

    pub fn cluster_count(&self) -> usize {
        self.clusters.len()
    }

    /// Number of live (url, cluster) edges.
    pub fn assignment_count(&self) -> usize {
        self.by_pair.len()
    }

    pub fn url_ids(&self) -> impl Iterator<Item = UrlId> + use<> {
        (0..self.urls.len()).map(UrlId::from_index)
    }

    pub fn cluster_ids(&self) -> impl Iterator<Item = ClusterId> + use<> {
        (0..self.clusters.len()).map(ClusterId::from_index)
    }

    pub fn clusters(&self) -> impl Iterator<Item = (ClusterId, &ClusterRecord)> {
        self.clusters
            .iter()
            .enumerate()
            .map(|(i, record)| (ClusterId::from_index(i), record))
    }

    pub fn urls(&self) -> impl Iterator<Item = (UrlId, &UrlRecord)> {
        self.urls
            .iter()
            .enumerate()
            .map(|(i, record)| (UrlId::from_index(i), record))
    }

    pub fn assignment(&self, id: AssignmentId) -> &Assignment {
        self.slots[id.index()]
            .as_ref()
            .expect("assignment ids held by records always point at live slots")
    }

    pub fn find(&self, url: UrlId, cluster: ClusterId) -> Option<AssignmentId> {
        self.by_pair.get(&(url, cluster)).copied()
    }

    /// O(1) membership test.
    pub fn contains(&self, url: UrlId, cluster: ClusterId) -> bool {
        self.by_pair.contains_key(&(url, cluster))
    }

    /// Members of a cluster in insertion order.
    pub fn members(&self, cluster: ClusterId) -> impl Iterator<Item = &Assignment> {
        self.cluster(cluster)
            .members
            .iter()
            .map(|&id| self.assignment(id))
    }

    pub fn member_ids(&self, cluster: ClusterId) -> &[AssignmentId] {
        &self.cluster(cluster).members
    }

    /// Assignments of a URL, best score first once refreshed.
    pub fn assignments_of(&self, url: UrlId) -> impl Iterator<Item = &Assignment> {
        self.url(url)
            .assignments
            .iter()
            .map(|&id| self.assignment(id))
    }

    /// Best available embedding for a URL: the first assignment carrying one,
    /// else the raw-feed fallback.
    pub fn embedding_for(&self, url: UrlId) -> Option<&[f32]> {
        self.assignments_of(url)
            .find_map(Assignment::embedding)
            .or_else(|| self.url(url).fallback_embedding())
    }

    /// Same lookup as [`embedding_for`](Self::embedding_for), sharing the buffer.
    pub(crate) fn shared_embedding(&self, url: UrlId) -> Option<Embedding> {
        self.assignments_of(url)
            .find(|a| a.embedding().is_some())
            .and_then(|a| a.embedding.clone())
            .or_else(|| self.url(url).fallback_embedding.clone())
    }

    /// Adds an edge. Returns `None` if the pair already exists.
    pub fn insert(
        &mut self,
        url: UrlId,
        cluster: ClusterId,
        score: f32,
        embedding: Option<Embedding>,
    ) -> Option<AssignmentId> {
        if self.contains(url, cluster) {
            return None;
        }
        let id = AssignmentId::from_index(self.slots.len());
        self.slots.push(Some(Assignment {
            url,
            cluster,
            score,
            embedding,
        }));
        self.by_pair.insert((url, cluster), id);
        self.url_mut(url).assignments.push(id);
        self.cluster_mut(cluster).members.push(id);
        Some(id)
    }

    /// Removes an edge from the table and from both views.
    pub fn remove(&mut self, url: UrlId, cluster: ClusterId) -> Option<Assignment> {
        let id = self.by_pair.remove(&(url, cluster))?;
        self.url_mut(url).assignments.retain(|&a| a != id);
        self.cluster_mut(cluster).members.retain(|&a| a != id);
        self.slots[id.index()].take()
    }

    pub fn set_score(&mut self, id: AssignmentId, score: f32) {
        if let Some(assignment) = self.slots[id.index()].as_mut() {
            assignment.score = score;
        }
    }

    /// Fills in an embedding on an existing edge if it has none.
    pub(crate) fn fill_embedding(&mut self, id: AssignmentId, embedding: Embedding) {
        if let Some(assignment) = self.slots[id.index()].as_mut() {
            if assignment.embedding().is_none() {
                assignment.embedding = Some(embedding);
            }
        }
    }

    /// Re-sorts a URL's assignments by score descending and re-derives
    /// `primary` / `max_score`. Ties keep insertion order.
    pub fn refresh_url(&mut self, url: UrlId) {
        let slots = &self.slots;
        let record = &mut self.urls[url.index()];
        let score_of = |id: &AssignmentId| {
            slots[id.index()]
                .as_ref()
                .map(|a| a.score)
                .unwrap_or(f32::NEG_INFINITY)
        };
        record
            .assignments
            .sort_by(|a, b| score_of(b).partial_cmp(&score_of(a)).unwrap_or(Ordering::Equal));

        match record.assignments.first() {
            Some(first) => {
                record.primary = slots[first.index()].as_ref().map(|a| a.cluster);
                record.max_score = score_of(first);
            }
            None => {
                record.primary = None;
                record.max_score = 0.0;
            }
        }
    }
}
