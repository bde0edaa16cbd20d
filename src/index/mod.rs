//! In-memory assignment index: storage and ingestion.

mod ingest;
mod store;

pub use ingest::{IngestSummary, RawAssignment, ingest_rows};
pub use store::{Assignment, AssignmentStore, ClusterRecord, Embedding, UrlRecord};
