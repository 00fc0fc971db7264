//! Mutations (RFC 7047 §5.1): `[column, mutator, value]`

use std::fmt;

use serde_json::{json, Value};

use super::errors::{ValidationError, ValidationResult};
use super::row_uuid::RowUuid;
use super::value::Datum;
use crate::schema::{check_base, AtomicType, ColumnSchema, ColumnType, ValueKind};

/// Mutator verbs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mutator {
    Sum,
    Difference,
    Product,
    Quotient,
    Remainder,
    Insert,
    Delete,
}

impl Mutator {
    /// Wire spelling
    pub fn as_str(&self) -> &'static str {
        match self {
            Mutator::Sum => "+=",
            Mutator::Difference => "-=",
            Mutator::Product => "*=",
            Mutator::Quotient => "/=",
            Mutator::Remainder => "%=",
            Mutator::Insert => "insert",
            Mutator::Delete => "delete",
        }
    }

    pub fn from_wire(text: &str) -> Option<Self> {
        match text {
            "+=" => Some(Mutator::Sum),
            "-=" => Some(Mutator::Difference),
            "*=" => Some(Mutator::Product),
            "/=" => Some(Mutator::Quotient),
            "%=" => Some(Mutator::Remainder),
            "insert" => Some(Mutator::Insert),
            "delete" => Some(Mutator::Delete),
            _ => None,
        }
    }

    pub fn is_arithmetic(&self) -> bool {
        !matches!(self, Mutator::Insert | Mutator::Delete)
    }
}

impl fmt::Display for Mutator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One mutation of a mutate operation
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Mutation {
    column: String,
    mutator: Mutator,
    value: Datum,
}

impl Mutation {
    pub fn new(column: impl Into<String>, mutator: Mutator, value: Datum) -> Self {
        Self {
            column: column.into(),
            mutator,
            value,
        }
    }

    pub fn column(&self) -> &str {
        &self.column
    }

    pub fn mutator(&self) -> Mutator {
        self.mutator
    }

    pub fn value(&self) -> &Datum {
        &self.value
    }

    /// Checks the verb against the column's kind and the value's shape.
    ///
    /// - arithmetic: integer/real atom or set column; value is one atom of
    ///   the key type (`%=` integers only)
    /// - insert: set or map column; value of the same kind
    /// - delete: set column with a set value; map column with a map or a set
    ///   of keys
    pub fn validate(&self, schema: &ColumnSchema) -> ValidationResult<()> {
        let column_type = schema.column_type();
        let bad_mutator = || ValidationError::BadMutator {
            column: self.column.clone(),
            mutator: self.mutator.as_str(),
            kind: column_type.to_string(),
        };

        if self.mutator.is_arithmetic() {
            let key = match column_type {
                ColumnType::Atom(key) | ColumnType::Set { key, .. } => key,
                ColumnType::Map { .. } => return Err(bad_mutator()),
            };
            let numeric = match self.mutator {
                Mutator::Remainder => key.atomic == AtomicType::Integer,
                _ => key.atomic.is_numeric(),
            };
            if !numeric {
                return Err(bad_mutator());
            }
            return match &self.value {
                Datum::Atom(atom) => check_base(&self.column, key, atom),
                other => Err(ValidationError::KindMismatch {
                    column: self.column.clone(),
                    expected: ValueKind::Atom.name(),
                    actual: other.kind().name(),
                }),
            };
        }

        match (column_type, self.mutator, &self.value) {
            (ColumnType::Atom(_), _, _) => Err(bad_mutator()),
            (ColumnType::Map { key, .. }, Mutator::Delete, Datum::Set(keys)) => keys
                .iter()
                .try_for_each(|atom| check_base(&self.column, key, atom)),
            (_, _, value) => column_type.validate_shape(&self.column, value),
        }
    }

    /// Returns a copy with every uuid in the value passed through `f`
    pub fn map_uuids<F: FnMut(&RowUuid) -> RowUuid>(&self, f: &mut F) -> Mutation {
        Mutation {
            column: self.column.clone(),
            mutator: self.mutator,
            value: self.value.map_uuids(f),
        }
    }

    pub fn to_json(&self) -> Value {
        json!([self.column, self.mutator.as_str(), self.value.to_json()])
    }
}
