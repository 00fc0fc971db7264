//! Database, table and column schema types
//!
//! Atomic types per RFC 7047 §3.2: integer, real, boolean, string, uuid.
//! Column value kinds: atom, set, map.
//!
//! Everything here is built once at schema-load time and only read after.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::notation::{Atom, Datum, ValidationError, ValidationResult, Version};

use super::errors::{SchemaError, SchemaResult};

/// Implicit row identifier column
pub const UUID_COLUMN: &str = "_uuid";
/// Implicit row version column
pub const VERSION_COLUMN: &str = "_version";

/// Protocol atomic types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AtomicType {
    Integer,
    Real,
    Boolean,
    String,
    Uuid,
}

impl AtomicType {
    pub fn name(&self) -> &'static str {
        match self {
            AtomicType::Integer => "integer",
            AtomicType::Real => "real",
            AtomicType::Boolean => "boolean",
            AtomicType::String => "string",
            AtomicType::Uuid => "uuid",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "integer" => Some(AtomicType::Integer),
            "real" => Some(AtomicType::Real),
            "boolean" => Some(AtomicType::Boolean),
            "string" => Some(AtomicType::String),
            "uuid" => Some(AtomicType::Uuid),
            _ => None,
        }
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, AtomicType::Integer | AtomicType::Real)
    }
}

/// Shape of a column value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    Atom,
    Set,
    Map,
}

impl ValueKind {
    pub fn name(&self) -> &'static str {
        match self {
            ValueKind::Atom => "atom",
            ValueKind::Set => "set",
            ValueKind::Map => "map",
        }
    }
}

/// Key or value type of a column, with its optional reference target
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BaseType {
    pub atomic: AtomicType,
    /// Target table for uuid references
    pub ref_table: Option<String>,
}

impl BaseType {
    pub fn new(atomic: AtomicType) -> Self {
        Self {
            atomic,
            ref_table: None,
        }
    }

    pub fn reference(table: impl Into<String>) -> Self {
        Self {
            atomic: AtomicType::Uuid,
            ref_table: Some(table.into()),
        }
    }
}

/// Declared type of a column.
///
/// `max: None` means "unlimited".
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ColumnType {
    /// Exactly one value (min 1, max 1)
    Atom(BaseType),
    /// Any other key-only type, including optional (min 0, max 1)
    Set {
        key: BaseType,
        min: u64,
        max: Option<u64>,
    },
    /// Key/value pairs
    Map {
        key: BaseType,
        value: BaseType,
        min: u64,
        max: Option<u64>,
    },
}

impl ColumnType {
    pub fn atom(atomic: AtomicType) -> Self {
        ColumnType::Atom(BaseType::new(atomic))
    }

    /// Unbounded set, min 0
    pub fn set_of(key: BaseType) -> Self {
        ColumnType::Set {
            key,
            min: 0,
            max: None,
        }
    }

    /// Optional value (set of at most one)
    pub fn optional(atomic: AtomicType) -> Self {
        ColumnType::Set {
            key: BaseType::new(atomic),
            min: 0,
            max: Some(1),
        }
    }

    /// Unbounded map, min 0
    pub fn map_of(key: AtomicType, value: AtomicType) -> Self {
        ColumnType::Map {
            key: BaseType::new(key),
            value: BaseType::new(value),
            min: 0,
            max: None,
        }
    }

    pub fn value_kind(&self) -> ValueKind {
        match self {
            ColumnType::Atom(_) => ValueKind::Atom,
            ColumnType::Set { .. } => ValueKind::Set,
            ColumnType::Map { .. } => ValueKind::Map,
        }
    }

    pub fn key(&self) -> &BaseType {
        match self {
            ColumnType::Atom(key) | ColumnType::Set { key, .. } | ColumnType::Map { key, .. } => {
                key
            }
        }
    }

    /// Checks kind, base types and cardinality of `datum`.
    ///
    /// No coercion: an atom offered for a set column is rejected.
    pub fn validate(&self, column: &str, datum: &Datum) -> ValidationResult<()> {
        self.validate_shape(column, datum)?;
        match (self, datum) {
            (ColumnType::Set { min, max, .. }, Datum::Set(set)) => {
                check_cardinality(column, set.len(), *min, *max)
            }
            (ColumnType::Map { min, max, .. }, Datum::Map(map)) => {
                check_cardinality(column, map.len(), *min, *max)
            }
            _ => Ok(()),
        }
    }

    /// Checks kind and base types only, ignoring cardinality.
    pub fn validate_shape(&self, column: &str, datum: &Datum) -> ValidationResult<()> {
        if datum.kind() != self.value_kind() {
            return Err(ValidationError::KindMismatch {
                column: column.to_string(),
                expected: self.value_kind().name(),
                actual: datum.kind().name(),
            });
        }

        match (self, datum) {
            (ColumnType::Atom(base), Datum::Atom(atom)) => check_base(column, base, atom),
            (ColumnType::Set { key, .. }, Datum::Set(set)) => {
                set.iter().try_for_each(|atom| check_base(column, key, atom))
            }
            (ColumnType::Map { key, value, .. }, Datum::Map(map)) => {
                map.iter().try_for_each(|(k, v)| {
                    check_base(column, key, k)?;
                    check_base(column, value, v)
                })
            }
            // Kinds already agree
            _ => Ok(()),
        }
    }
}

pub(crate) fn check_base(column: &str, base: &BaseType, atom: &Atom) -> ValidationResult<()> {
    if atom.atomic_type() == base.atomic {
        Ok(())
    } else {
        Err(ValidationError::BaseTypeMismatch {
            column: column.to_string(),
            expected: base.atomic.name(),
            actual: atom.atomic_type().name(),
        })
    }
}

fn check_cardinality(column: &str, len: usize, min: u64, max: Option<u64>) -> ValidationResult<()> {
    let len64 = len as u64;
    if len64 < min || max.map_or(false, |max| len64 > max) {
        return Err(ValidationError::Cardinality {
            column: column.to_string(),
            len,
            min,
            max: max.map_or_else(|| "unlimited".to_string(), |m| m.to_string()),
        });
    }
    Ok(())
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColumnType::Atom(base) => write!(f, "{}", base.atomic.name()),
            ColumnType::Set { key, .. } => write!(f, "set of {}", key.atomic.name()),
            ColumnType::Map { key, value, .. } => {
                write!(f, "map of {} to {}", key.atomic.name(), value.atomic.name())
            }
        }
    }
}

/// One column of a table
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ColumnSchema {
    name: String,
    column_type: ColumnType,
    mutable: bool,
    from_version: Version,
    deprecated_version: Option<Version>,
}

impl ColumnSchema {
    pub fn new(name: impl Into<String>, column_type: ColumnType) -> Self {
        Self {
            name: name.into(),
            column_type,
            mutable: true,
            from_version: Version::NULL,
            deprecated_version: None,
        }
    }

    /// Marks the column as immutable (`"mutable": false`)
    pub fn immutable(mut self) -> Self {
        self.mutable = false;
        self
    }

    pub fn with_version_range(mut self, from: Version, deprecated: Option<Version>) -> Self {
        self.from_version = from;
        self.deprecated_version = deprecated;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn column_type(&self) -> &ColumnType {
        &self.column_type
    }

    pub fn value_kind(&self) -> ValueKind {
        self.column_type.value_kind()
    }

    pub fn is_mutable(&self) -> bool {
        self.mutable
    }

    pub fn from_version(&self) -> Version {
        self.from_version
    }

    pub fn deprecated_version(&self) -> Option<Version> {
        self.deprecated_version
    }

    pub fn is_available_in(&self, schema_version: Version) -> bool {
        Version::is_compatible(self.from_version, self.deprecated_version, schema_version)
    }

    /// Validates `datum` against this column's declared type
    pub fn validate(&self, datum: &Datum) -> ValidationResult<()> {
        self.column_type.validate(&self.name, datum)
    }
}

/// One table of a database
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableSchema {
    name: String,
    columns: HashMap<String, Arc<ColumnSchema>>,
    is_root: bool,
    indexes: Vec<Vec<String>>,
    from_version: Version,
    deprecated_version: Option<Version>,
}

impl TableSchema {
    /// Creates a table carrying only the implicit `_uuid` and `_version` columns
    pub fn new(name: impl Into<String>) -> Self {
        let mut columns = HashMap::new();
        for implicit in [UUID_COLUMN, VERSION_COLUMN] {
            columns.insert(
                implicit.to_string(),
                Arc::new(ColumnSchema::new(implicit, ColumnType::atom(AtomicType::Uuid)).immutable()),
            );
        }
        Self {
            name: name.into(),
            columns,
            is_root: false,
            indexes: Vec::new(),
            from_version: Version::NULL,
            deprecated_version: None,
        }
    }

    pub fn with_column(mut self, column: ColumnSchema) -> Self {
        self.columns.insert(column.name.clone(), Arc::new(column));
        self
    }

    pub fn root(mut self) -> Self {
        self.is_root = true;
        self
    }

    pub fn with_index(mut self, columns: Vec<String>) -> Self {
        self.indexes.push(columns);
        self
    }

    pub fn with_version_range(mut self, from: Version, deprecated: Option<Version>) -> Self {
        self.from_version = from;
        self.deprecated_version = deprecated;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_root(&self) -> bool {
        self.is_root
    }

    pub fn indexes(&self) -> &[Vec<String>] {
        &self.indexes
    }

    pub fn from_version(&self) -> Version {
        self.from_version
    }

    pub fn deprecated_version(&self) -> Option<Version> {
        self.deprecated_version
    }

    pub fn is_available_in(&self, schema_version: Version) -> bool {
        Version::is_compatible(self.from_version, self.deprecated_version, schema_version)
    }

    /// Looks up a column by name
    pub fn column_schema(&self, name: &str) -> SchemaResult<&Arc<ColumnSchema>> {
        self.columns
            .get(name)
            .ok_or_else(|| SchemaError::unknown_column(&self.name, name))
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.columns.contains_key(name)
    }

    /// Column names, sorted
    pub fn column_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.columns.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn columns(&self) -> impl Iterator<Item = &Arc<ColumnSchema>> {
        self.columns.values()
    }
}

/// A whole database as described by the server
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatabaseSchema {
    name: String,
    version: Version,
    tables: HashMap<String, Arc<TableSchema>>,
}

impl DatabaseSchema {
    pub fn new(name: impl Into<String>, version: Version) -> Self {
        Self {
            name: name.into(),
            version,
            tables: HashMap::new(),
        }
    }

    pub fn with_table(mut self, table: TableSchema) -> Self {
        self.tables.insert(table.name.clone(), Arc::new(table));
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn version(&self) -> Version {
        self.version
    }

    /// Looks up a table by name
    pub fn table_schema(&self, name: &str) -> SchemaResult<&Arc<TableSchema>> {
        self.tables
            .get(name)
            .ok_or_else(|| SchemaError::unknown_table(name))
    }

    pub fn has_table(&self, name: &str) -> bool {
        self.tables.contains_key(name)
    }

    /// Explicit presence check for callers that need a guaranteed column
    pub fn has_column(&self, table: &str, column: &str) -> bool {
        self.tables
            .get(table)
            .map_or(false, |t| t.has_column(column))
    }

    /// Table names, sorted
    pub fn table_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.tables.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}
