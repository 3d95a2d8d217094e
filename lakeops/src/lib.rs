// lakeops - create, upsert-merge and delete on Delta Lake tables
// The Delta engine is delta-rs; this crate sequences and checks the calls

// Core modules
pub mod delta_lake;
pub mod error;
pub mod predicate;
pub mod storage;

// Table mutation operations
pub mod table_ops;

// Example run
pub mod demo;

// Public API
pub use error::{Error, Result};
pub use predicate::{CompareOp, Literal, Predicate};
pub use storage::TableRef;
pub use table_ops::{
    create_table, delete_from_table, delete_where, merge_into_table, merge_with_spec,
    query_table, read_table, row_count,
};
