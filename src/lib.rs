//! Topic cluster health analysis for SEO datasets.
//!
//! Feed URL↔cluster rows into [`ClusterEngine::build`] and read back
//! centroids, duplication metrics, merge candidates, hierarchy roles and
//! consolidation advice. The engine can then be edited in transactions and
//! re-queried for missed opportunities and drifted members.

pub mod analysis;
pub mod config;
pub mod engine;
pub mod error;
pub mod explore;
pub mod index;
pub mod logging;
pub mod report;
pub mod types;
pub mod vector;

// Explicit exports for better API clarity
pub use analysis::{ClusterMetrics, HealthVerdict, OverlapCandidate, classify};
pub use config::{AnalysisConfig, Settings};
pub use engine::{ClusterEngine, Edit, EditBatch, EditOutcome, Pipeline, Stage, StageReport};
pub use error::{ConfigError, ConfigResult, EditError, EditResult};
pub use explore::{Alternative, DriftMatch, OpportunityMatch};
pub use index::{AssignmentStore, IngestSummary, RawAssignment};
pub use report::{AnalysisReport, AssignmentView, ClusterSummary, ReportTotals, UrlAnalysis};
pub use types::{
    AssignmentId, ClusterId, HealthStatus, Issue, OverlapKind, Recommendation, Role, TagStatus,
    UrlId,
};
