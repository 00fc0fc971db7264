//! Where-clause conditions (RFC 7047 §5.1): `[column, function, value]`

use std::fmt;

use serde_json::{json, Value};

use super::errors::{ValidationError, ValidationResult};
use super::row::Row;
use super::row_uuid::RowUuid;
use super::value::Datum;
use crate::schema::{ColumnSchema, ColumnType, UUID_COLUMN};

/// Condition functions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Function {
    LessThan,
    LessThanOrEquals,
    Equals,
    NotEquals,
    GreaterThanOrEquals,
    GreaterThan,
    Includes,
    Excludes,
}

impl Function {
    /// Wire spelling
    pub fn as_str(&self) -> &'static str {
        match self {
            Function::LessThan => "<",
            Function::LessThanOrEquals => "<=",
            Function::Equals => "==",
            Function::NotEquals => "!=",
            Function::GreaterThanOrEquals => ">=",
            Function::GreaterThan => ">",
            Function::Includes => "includes",
            Function::Excludes => "excludes",
        }
    }

    pub fn from_wire(text: &str) -> Option<Self> {
        match text {
            "<" => Some(Function::LessThan),
            "<=" => Some(Function::LessThanOrEquals),
            "==" => Some(Function::Equals),
            "!=" => Some(Function::NotEquals),
            ">=" => Some(Function::GreaterThanOrEquals),
            ">" => Some(Function::GreaterThan),
            "includes" => Some(Function::Includes),
            "excludes" => Some(Function::Excludes),
            _ => None,
        }
    }

    /// `<`, `<=`, `>=`, `>`
    pub fn is_ordering(&self) -> bool {
        matches!(
            self,
            Function::LessThan
                | Function::LessThanOrEquals
                | Function::GreaterThanOrEquals
                | Function::GreaterThan
        )
    }
}

impl fmt::Display for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One term of a where clause
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Condition {
    column: String,
    function: Function,
    value: Datum,
}

impl Condition {
    pub fn new(column: impl Into<String>, function: Function, value: Datum) -> Self {
        Self {
            column: column.into(),
            function,
            value,
        }
    }

    /// `column == value`
    pub fn equals(column: impl Into<String>, value: Datum) -> Self {
        Self::new(column, Function::Equals, value)
    }

    /// `_uuid == uuid`
    pub fn uuid_equals(uuid: RowUuid) -> Self {
        Self::equals(UUID_COLUMN, Datum::uuid(uuid))
    }

    /// Equality on every column present in `row`, by column name
    pub fn matching_row(row: &Row) -> Vec<Condition> {
        row.entries()
            .into_iter()
            .map(|(name, column)| Condition::equals(name, column.data().clone()))
            .collect()
    }

    pub fn column(&self) -> &str {
        &self.column
    }

    pub fn function(&self) -> Function {
        self.function
    }

    pub fn value(&self) -> &Datum {
        &self.value
    }

    /// Ordering functions need an integer or real atom column; every
    /// function needs a value of the column's shape.
    pub fn validate(&self, schema: &ColumnSchema) -> ValidationResult<()> {
        let column_type = schema.column_type();
        if self.function.is_ordering() {
            let numeric_atom = matches!(column_type, ColumnType::Atom(base) if base.atomic.is_numeric());
            if !numeric_atom {
                return Err(ValidationError::BadFunction {
                    column: self.column.clone(),
                    function: self.function.as_str(),
                    kind: column_type.to_string(),
                });
            }
        }
        column_type.validate_shape(&self.column, &self.value)
    }

    /// Returns a copy with every uuid in the value passed through `f`
    pub fn map_uuids<F: FnMut(&RowUuid) -> RowUuid>(&self, f: &mut F) -> Condition {
        Condition {
            column: self.column.clone(),
            function: self.function,
            value: self.value.map_uuids(f),
        }
    }

    pub fn to_json(&self) -> Value {
        json!([self.column, self.function.as_str(), self.value.to_json()])
    }
}
