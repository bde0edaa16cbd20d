//! Out-of-band "what-if" queries against an already built index.
//!
//! Both finders are read-only. Applying what they suggest goes through the
//! engine's edit batches.

mod drift;
mod opportunity;

pub use drift::{ALTERNATIVE_FLOOR, Alternative, DriftMatch, find_drift};
pub use opportunity::{NEAR_ZERO, OpportunityMatch, find_missed_opportunities};
