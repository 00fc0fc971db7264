//! Schema error types
//!
//! Error codes:
//! - OVSDB_UNKNOWN_TABLE
//! - OVSDB_UNKNOWN_COLUMN
//! - OVSDB_INCOMPATIBLE_VERSION
//! - OVSDB_MALFORMED_SCHEMA
//! - OVSDB_SCHEMA_CONFLICT
//!
//! All of them reject the single operation being built; none is retried.

use std::fmt;

use crate::notation::Version;

/// Schema-specific error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaErrorCode {
    /// Table not declared by the database schema
    OvsdbUnknownTable,
    /// Column not declared by the table schema
    OvsdbUnknownColumn,
    /// Server schema version does not carry a table or required column
    OvsdbIncompatibleVersion,
    /// Schema description that does not follow RFC 7047 §3.2
    OvsdbMalformedSchema,
    /// Different schema registered under an existing name and version
    OvsdbSchemaConflict,
}

impl SchemaErrorCode {
    /// Returns the string code
    pub fn code(&self) -> &'static str {
        match self {
            SchemaErrorCode::OvsdbUnknownTable => "OVSDB_UNKNOWN_TABLE",
            SchemaErrorCode::OvsdbUnknownColumn => "OVSDB_UNKNOWN_COLUMN",
            SchemaErrorCode::OvsdbIncompatibleVersion => "OVSDB_INCOMPATIBLE_VERSION",
            SchemaErrorCode::OvsdbMalformedSchema => "OVSDB_MALFORMED_SCHEMA",
            SchemaErrorCode::OvsdbSchemaConflict => "OVSDB_SCHEMA_CONFLICT",
        }
    }
}

impl fmt::Display for SchemaErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Schema error type with full context
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaError {
    code: SchemaErrorCode,
    message: String,
    table: Option<String>,
    column: Option<String>,
}

impl SchemaError {
    /// Create an unknown table error
    pub fn unknown_table(table: impl Into<String>) -> Self {
        let table = table.into();
        Self {
            code: SchemaErrorCode::OvsdbUnknownTable,
            message: format!("Table '{}' not found", table),
            table: Some(table),
            column: None,
        }
    }

    /// Create an unknown column error
    pub fn unknown_column(table: impl Into<String>, column: impl Into<String>) -> Self {
        let table = table.into();
        let column = column.into();
        Self {
            code: SchemaErrorCode::OvsdbUnknownColumn,
            message: format!("Column '{}' not found in table '{}'", column, table),
            table: Some(table),
            column: Some(column),
        }
    }

    /// Create an incompatible version error for a table
    pub fn table_not_in_version(table: impl Into<String>, from: Version, schema: Version) -> Self {
        let table = table.into();
        Self {
            code: SchemaErrorCode::OvsdbIncompatibleVersion,
            message: format!(
                "Table '{}' requires schema {} but server reports {}",
                table, from, schema
            ),
            table: Some(table),
            column: None,
        }
    }

    /// Create an incompatible version error for a required column
    pub fn incompatible_column(
        table: impl Into<String>,
        column: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        let table = table.into();
        let column = column.into();
        Self {
            code: SchemaErrorCode::OvsdbIncompatibleVersion,
            message: format!(
                "Column '{}' of table '{}' is incompatible: {}",
                column,
                table,
                reason.into()
            ),
            table: Some(table),
            column: Some(column),
        }
    }

    /// Create an error for a malformed schema description
    pub fn malformed_schema(location: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            code: SchemaErrorCode::OvsdbMalformedSchema,
            message: format!("Malformed schema at '{}': {}", location.into(), reason.into()),
            table: None,
            column: None,
        }
    }

    /// Create a conflicting registration error
    pub fn schema_conflict(name: impl Into<String>, version: Version) -> Self {
        Self {
            code: SchemaErrorCode::OvsdbSchemaConflict,
            message: format!(
                "A different schema '{}' version {} is already registered",
                name.into(),
                version
            ),
            table: None,
            column: None,
        }
    }

    /// Create an error for combining work built against two schema versions
    pub fn version_mismatch(database: impl Into<String>, expected: Version, actual: Version) -> Self {
        Self {
            code: SchemaErrorCode::OvsdbSchemaConflict,
            message: format!(
                "Cannot combine operations on database '{}' built against version {} with version {}",
                database.into(),
                expected,
                actual
            ),
            table: None,
            column: None,
        }
    }

    /// Create an error for combining work against two different databases
    pub fn database_mismatch(expected: impl Into<String>, actual: impl Into<String>) -> Self {
        Self {
            code: SchemaErrorCode::OvsdbSchemaConflict,
            message: format!(
                "Cannot combine operations on database '{}' with database '{}'",
                expected.into(),
                actual.into()
            ),
            table: None,
            column: None,
        }
    }

    /// Returns the error code
    pub fn code(&self) -> SchemaErrorCode {
        self.code
    }

    /// Returns the error message
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns the table name if applicable
    pub fn table(&self) -> Option<&str> {
        self.table.as_deref()
    }

    /// Returns the column name if applicable
    pub fn column(&self) -> Option<&str> {
        self.column.as_deref()
    }
}

impl fmt::Display for SchemaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code.code(), self.message)
    }
}

impl std::error::Error for SchemaError {}

/// Result type for schema operations
pub type SchemaResult<T> = Result<T, SchemaError>;
