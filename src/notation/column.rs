//! One named value of a row, paired with the schema rule that governs it

use std::sync::Arc;

use serde_json::Value;

use super::errors::ValidationResult;
use super::value::{ColumnData, Datum};
use crate::schema::ColumnSchema;

/// A column value together with the server-declared column schema.
///
/// Two columns are equal when both schema and data are equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Column {
    schema: Arc<ColumnSchema>,
    data: Datum,
}

impl Column {
    /// Validates `data` against `schema` and wraps it
    pub fn new(schema: Arc<ColumnSchema>, data: Datum) -> ValidationResult<Self> {
        schema.validate(&data)?;
        Ok(Self { schema, data })
    }

    /// Wraps typed data, see [`Column::new`]
    pub fn from_data<T: ColumnData>(schema: Arc<ColumnSchema>, data: T) -> ValidationResult<Self> {
        Self::new(schema, data.into_datum())
    }

    pub fn schema(&self) -> &Arc<ColumnSchema> {
        &self.schema
    }

    pub fn name(&self) -> &str {
        self.schema.name()
    }

    pub fn data(&self) -> &Datum {
        &self.data
    }

    /// Typed view of the data, `None` if the shape does not match `T`
    pub fn data_as<T: ColumnData>(&self) -> Option<T> {
        T::from_datum(&self.data)
    }

    pub fn into_data(self) -> Datum {
        self.data
    }

    pub fn to_json(&self) -> Value {
        self.data.to_json()
    }

    pub(crate) fn with_data(&self, data: Datum) -> Self {
        Self {
            schema: Arc::clone(&self.schema),
            data,
        }
    }
}
