//! Schema registry
//!
//! Describes which tables and columns the server declares, the value type
//! of each column and the version range it is valid in.
//!
//! # Design Principles
//!
//! - Loaded once, immutable after load
//! - Shared read-only across builders and views (`Arc`), no locking
//! - Unknown tables and columns are errors, never defaults

mod errors;
mod loader;
mod types;

pub use errors::{SchemaError, SchemaErrorCode, SchemaResult};
pub use loader::SchemaLoader;
pub use types::{
    AtomicType, BaseType, ColumnSchema, ColumnType, DatabaseSchema, TableSchema, ValueKind,
    UUID_COLUMN, VERSION_COLUMN,
};
pub(crate) use types::check_base;
