//! ovsdb-txn - client-side OVSDB data and transaction model
//!
//! Generic rows and columns checked against the server's schema, typed
//! table views gated by schema version, and a transaction builder that lets
//! operations in one batch reference rows inserted earlier in the same
//! batch (RFC 7047 named uuids).

pub mod config;
pub mod error;
pub mod notation;
pub mod observability;
pub mod schema;
pub mod tables;
pub mod transaction;
pub mod typed;

pub use config::{BuilderConfig, ConfigError};
pub use error::{Error, Result};
pub use notation::{Column, Datum, Row, RowUuid, Version};
pub use schema::{DatabaseSchema, SchemaError, SchemaLoader, TableSchema};
pub use transaction::{Operation, OperationResult, TransactionBuilder, UuidMapping};
pub use typed::{TypedRow, TypedTable};
