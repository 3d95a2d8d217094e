//! Storage layer: where tables live on the local filesystem

pub mod path;

pub use path::{TableRef, DELTA_LOG_DIR};
