//! Vector math used by every analysis stage.
//!
//! Pure functions, no state. Scores are `f32` throughout, matching the
//! precision embedding providers export.

mod math;

pub use math::{centroid, cosine_similarity, l2_norm};
