//! Error types for the cluster analysis engine
//!
//! The analysis pipeline itself never fails: malformed rows are skipped and
//! degenerate vectors score 0. Errors only surface from the edit API and from
//! configuration loading.

use thiserror::Error;

/// Errors raised while validating an edit batch.
///
/// A batch that produces any of these is rejected before any state changes.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EditError {
    #[error(
        "Cluster '{name}' does not exist\nSuggestion: Rebuild the report, the cluster may have been merged away"
    )]
    UnknownCluster { name: String },

    #[error(
        "URL '{url}' is not part of the dataset\nSuggestion: Only URLs from the ingested feed can be reassigned"
    )]
    UnknownUrl { url: String },

    #[error("URL '{url}' is not tagged with cluster '{cluster}'")]
    MissingAssignment { url: String, cluster: String },

    #[error("URL '{url}' is already tagged with cluster '{cluster}'")]
    DuplicateAssignment { url: String, cluster: String },

    #[error("Cannot move URL '{url}' from cluster '{cluster}' into itself")]
    SameCluster { url: String, cluster: String },

    #[error("URL and cluster names must not be blank")]
    EmptyName,
}

impl EditError {
    /// Get a stable status code for this error type.
    ///
    /// Hosts can match on these without parsing the display message.
    pub fn status_code(&self) -> &'static str {
        match self {
            Self::UnknownCluster { .. } => "UNKNOWN_CLUSTER",
            Self::UnknownUrl { .. } => "UNKNOWN_URL",
            Self::MissingAssignment { .. } => "MISSING_ASSIGNMENT",
            Self::DuplicateAssignment { .. } => "DUPLICATE_ASSIGNMENT",
            Self::SameCluster { .. } => "SAME_CLUSTER",
            Self::EmptyName => "EMPTY_NAME",
        }
    }

    /// Get recovery suggestions for this error
    pub fn recovery_suggestions(&self) -> Vec<&'static str> {
        match self {
            Self::UnknownCluster { .. } | Self::MissingAssignment { .. } => vec![
                "The batch was rejected, engine state is unchanged",
                "Refresh the report and build the batch from current suggestions",
            ],
            Self::DuplicateAssignment { .. } => {
                vec!["Drop the edit, the URL already carries this tag"]
            }
            Self::UnknownUrl { .. } => {
                vec!["Re-ingest the dataset if the URL was added after the last build"]
            }
            _ => vec![],
        }
    }
}

/// Errors from loading or saving settings
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to load settings: {0}")]
    Load(#[from] Box<figment::Error>),

    #[error("Failed to serialize settings: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("Failed to write settings file: {0}\nSuggestion: Check directory permissions")]
    Io(#[from] std::io::Error),
}

/// Result type alias for edit operations
pub type EditResult<T> = Result<T, EditError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = Result<T, ConfigError>;
