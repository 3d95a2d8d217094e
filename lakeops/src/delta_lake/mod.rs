//! Delta Lake Integration
//!
//! Adapters over delta-rs for the write, MERGE, DELETE and scan operations.

pub mod merge;
pub mod operations;

pub use merge::{MatchedPolicy, MergeOutcome, MergeSpec, NotMatchedPolicy};
pub use operations::{CreateOutcome, DeleteOutcome};
