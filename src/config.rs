//! Configuration for the cluster analysis engine.
//!
//! Settings are layered:
//! - Default values
//! - TOML configuration file
//! - Environment variable overrides
//!
//! # Environment Variables
//!
//! Environment variables must be prefixed with `CLUSTERLENS_` and use double
//! underscores to separate nested levels:
//! - `CLUSTERLENS_ANALYSIS__MERGE_THRESHOLD=0.6` sets `analysis.merge_threshold`
//! - `CLUSTERLENS_DEBUG=true` sets `debug`
//!
//! Threshold ranges are not validated. Out-of-range values degrade the
//! analysis (a negative threshold matches everything) but never fail it.

use crate::error::ConfigResult;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

const ENV_PREFIX: &str = "CLUSTERLENS_";
const CONFIG_DIR: &str = ".clusterlens";

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct Settings {
    /// Version of the configuration schema
    #[serde(default = "default_version")]
    pub version: u32,

    /// Emit debug-level tracing events
    #[serde(default)]
    pub debug: bool,

    /// Thresholds used by the analysis stages
    #[serde(default)]
    pub analysis: AnalysisConfig,
}

/// Caller-tunable thresholds. The engine treats these as pure inputs.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct AnalysisConfig {
    /// Duplication rate at or above which a cluster is flagged as fragmented
    #[serde(default = "default_max_dup_rate")]
    pub max_dup_rate: f32,

    /// Average member score below which a cluster is flagged for quality
    #[serde(default = "default_min_avg_score")]
    pub min_avg_score: f32,

    /// Structural overlap (shared URL share) that makes a merge candidate
    #[serde(default = "default_merge_threshold")]
    pub merge_threshold: f32,

    /// Centroid similarity that makes a merge candidate
    #[serde(default = "default_vector_threshold")]
    pub vector_threshold: f32,

    /// Cluster size under which volume is considered too low
    #[serde(default = "default_min_url_count")]
    pub min_url_count: usize,

    /// Minimum similarity to a target centroid for an opportunity
    #[serde(default = "default_magnet_min_score")]
    pub magnet_min_score: f32,

    /// Current score above which a URL is considered well placed
    #[serde(default = "default_magnet_max_current_score")]
    pub magnet_max_current_score: f32,

    /// Similarity to its own centroid below which a member has drifted
    #[serde(default = "default_drift_threshold")]
    pub drift_threshold: f32,
}

fn default_version() -> u32 {
    1
}
fn default_max_dup_rate() -> f32 {
    0.3
}
fn default_min_avg_score() -> f32 {
    0.75
}
fn default_merge_threshold() -> f32 {
    0.5
}
fn default_vector_threshold() -> f32 {
    0.88
}
fn default_min_url_count() -> usize {
    10
}
fn default_magnet_min_score() -> f32 {
    0.82
}
fn default_magnet_max_current_score() -> f32 {
    0.93
}
fn default_drift_threshold() -> f32 {
    0.75
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            version: default_version(),
            debug: false,
            analysis: AnalysisConfig::default(),
        }
    }
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            max_dup_rate: default_max_dup_rate(),
            min_avg_score: default_min_avg_score(),
            merge_threshold: default_merge_threshold(),
            vector_threshold: default_vector_threshold(),
            min_url_count: default_min_url_count(),
            magnet_min_score: default_magnet_min_score(),
            magnet_max_current_score: default_magnet_max_current_score(),
            drift_threshold: default_drift_threshold(),
        }
    }
}

impl Settings {
    /// Load configuration from all sources
    ///
    /// The settings file is looked up as `.clusterlens/settings.toml` in the
    /// current directory or its nearest ancestor that has one.
    pub fn load() -> ConfigResult<Self> {
        let config_path = Self::find_workspace_config()
            .unwrap_or_else(|| PathBuf::from(CONFIG_DIR).join("settings.toml"));
        Self::load_from(config_path)
    }

    /// Load configuration from a specific file, still honoring env overrides
    pub fn load_from(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let settings = Figment::new()
            .merge(Serialized::defaults(Settings::default()))
            .merge(Toml::file(path.as_ref()))
            // Double underscore separates nesting, single underscore stays in names
            .merge(Env::prefixed(ENV_PREFIX).map(|key| {
                key.as_str().to_lowercase().replace("__", ".").into()
            }))
            .extract()
            .map_err(Box::new)?;
        Ok(settings)
    }

    /// Save current configuration to file
    pub fn save(&self, path: impl AsRef<Path>) -> ConfigResult<()> {
        if let Some(parent) = path.as_ref().parent() {
            std::fs::create_dir_all(parent)?;
        }
        let toml_string = toml::to_string_pretty(self)?;
        std::fs::write(path, toml_string)?;
        Ok(())
    }

    fn find_workspace_config() -> Option<PathBuf> {
        let current = std::env::current_dir().ok()?;

        current
            .ancestors()
            .map(|ancestor| ancestor.join(CONFIG_DIR))
            .find(|dir| dir.is_dir())
            .map(|dir| dir.join("settings.toml"))
    }
}
