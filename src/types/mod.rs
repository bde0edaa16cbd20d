//! Core identifiers and classification enums shared across the engine.
//!
//! Identifiers are `NonZeroU32` newtypes handed out by the assignment store.
//! They are only meaningful for the store that created them.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::num::NonZeroU32;

macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub struct $name(NonZeroU32);

        impl $name {
            /// Creates an id from a non-zero value.
            ///
            /// Returns `None` if `value` is zero.
            #[must_use]
            pub fn new(value: u32) -> Option<Self> {
                NonZeroU32::new(value).map(Self)
            }

            /// Creates an id from a zero-based slot index.
            pub(crate) fn from_index(index: usize) -> Self {
                let value = u32::try_from(index + 1).expect("id space exhausted");
                Self(NonZeroU32::new(value).expect("index + 1 is non-zero"))
            }

            /// Zero-based slot index for arena lookups.
            pub(crate) fn index(self) -> usize {
                (self.0.get() - 1) as usize
            }

            /// Returns the underlying u32 value.
            #[must_use]
            pub fn get(self) -> u32 {
                self.0.get()
            }
        }
    };
}

define_id!(
    /// Identity of a distinct URL.
    UrlId
);
define_id!(
    /// Identity of a distinct cluster name.
    ClusterId
);
define_id!(
    /// Identity of one (url, cluster) edge in the assignment table.
    AssignmentId
);

/// Hierarchy role derived from a cluster's best overlap match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Role {
    Parent,
    Child,
    #[default]
    Orphan,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Role::Parent => "Parent",
            Role::Child => "Child",
            Role::Orphan => "Orphan",
        };
        f.write_str(label)
    }
}

/// Which signal produced an overlap candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OverlapKind {
    /// Shared URL sets dominate.
    Structural,
    /// Centroid similarity dominates.
    Semantic,
}

impl fmt::Display for OverlapKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OverlapKind::Structural => f.write_str("Structural"),
            OverlapKind::Semantic => f.write_str("Semantic"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum HealthStatus {
    /// Metrics computed, classifier not yet run.
    #[default]
    Pending,
    Healthy,
    Review,
    Sunset,
}

impl fmt::Display for HealthStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            HealthStatus::Pending => "Pending",
            HealthStatus::Healthy => "Healthy",
            HealthStatus::Review => "Review",
            HealthStatus::Sunset => "Sunset",
        };
        f.write_str(label)
    }
}

/// Issue tag attached by the health classifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Issue {
    #[default]
    None,
    LowVolume,
    Isolation,
    IntentOverlap,
    LowQuality,
    Fragmentation,
}

impl fmt::Display for Issue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Issue::None => "None",
            Issue::LowVolume => "Low Volume",
            Issue::Isolation => "Isolation",
            Issue::IntentOverlap => "Intent Overlap",
            Issue::LowQuality => "Low Quality",
            Issue::Fragmentation => "Fragmentation",
        };
        f.write_str(label)
    }
}

/// Human-readable advice emitted by the health classifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Recommendation {
    #[default]
    Pending,
    Sunset,
    SunsetMerge,
    ReviewTargetTooSmall,
    ReviewLowVolume,
    ConsiderMerge,
    DominantCluster,
    ReviewQuality,
    ReviewHighDup,
    Healthy,
}

impl fmt::Display for Recommendation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Recommendation::Pending => "Pending",
            Recommendation::Sunset => "Sunset",
            Recommendation::SunsetMerge => "Sunset (Merge)",
            Recommendation::ReviewTargetTooSmall => "Review (Target too small)",
            Recommendation::ReviewLowVolume => "Review (Low Vol)",
            Recommendation::ConsiderMerge => "Consider Merge - Analyse Intent",
            Recommendation::DominantCluster => "Dominant Cluster",
            Recommendation::ReviewQuality => "Review Quality",
            Recommendation::ReviewHighDup => "Review (High Dup)",
            Recommendation::Healthy => "Healthy",
        };
        f.write_str(label)
    }
}

/// Tag-count bucket used by the per-URL deep analysis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TagStatus {
    Untagged,
    Focused,
    Competing,
    Cannibalized,
}

impl TagStatus {
    pub fn from_tag_count(count: usize) -> Self {
        match count {
            0 => TagStatus::Untagged,
            1 => TagStatus::Focused,
            2 => TagStatus::Competing,
            _ => TagStatus::Cannibalized,
        }
    }
}

impl fmt::Display for TagStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            TagStatus::Untagged => "Untagged",
            TagStatus::Focused => "Focused",
            TagStatus::Competing => "Competing",
            TagStatus::Cannibalized => "Cannibalized",
        };
        f.write_str(label)
    }
}
