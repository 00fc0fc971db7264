//! Static capability descriptors
//!
//! One `TableDescriptor` per typed table lists the accessors a typed view
//! offers, the column each one reads and writes, the value kind it expects,
//! and the schema versions in which it exists.

use crate::notation::Version;
use crate::schema::ValueKind;

/// One accessor of a typed table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnDescriptor {
    pub accessor: &'static str,
    pub column: &'static str,
    pub kind: ValueKind,
    pub from_version: Version,
    pub until_version: Option<Version>,
    /// Binding fails if the server lacks this column in a compatible version
    pub required: bool,
}

impl ColumnDescriptor {
    pub const fn new(accessor: &'static str, column: &'static str, kind: ValueKind) -> Self {
        Self {
            accessor,
            column,
            kind,
            from_version: Version::NULL,
            until_version: None,
            required: false,
        }
    }

    pub const fn since(self, version: Version) -> Self {
        Self {
            from_version: version,
            ..self
        }
    }

    pub const fn until(self, version: Version) -> Self {
        Self {
            until_version: Some(version),
            ..self
        }
    }

    pub const fn required(self) -> Self {
        Self {
            required: true,
            ..self
        }
    }

    pub fn is_available_in(&self, schema_version: Version) -> bool {
        Version::is_compatible(self.from_version, self.until_version, schema_version)
    }
}

/// Capability table of one typed table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableDescriptor {
    pub table: &'static str,
    pub database: &'static str,
    pub from_version: Version,
    pub columns: &'static [ColumnDescriptor],
}

impl TableDescriptor {
    pub fn accessor(&self, accessor: &str) -> Option<&'static ColumnDescriptor> {
        self.columns.iter().find(|c| c.accessor == accessor)
    }

    pub fn is_available_in(&self, schema_version: Version) -> bool {
        Version::is_compatible(self.from_version, None, schema_version)
    }
}
