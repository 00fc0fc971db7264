//! Generic, schema-agnostic row

use std::collections::HashMap;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use serde_json::{Map, Value};

use super::column::Column;
use super::errors::ValidationError;
use super::row_uuid::RowUuid;
use super::value::{ColumnData, Datum};
use crate::error::Result;
use crate::schema::{ColumnSchema, SchemaError, TableSchema};

/// A database record as a set of columns keyed by column name.
///
/// A row may be partial (a projection). `==` and `Hash` cover every
/// present column, so two projections of the same record with different
/// column sets are unequal. Use [`Row::projection_eq`] to compare rows on
/// a chosen set of columns.
#[derive(Debug, Clone, Default)]
pub struct Row {
    table_schema: Option<Arc<TableSchema>>,
    columns: HashMap<String, Column>,
}

impl Row {
    /// An unbound row; accepts any column name
    pub fn new() -> Self {
        Self::default()
    }

    /// A row bound to `table`; only declared columns may be added
    pub fn with_schema(table: Arc<TableSchema>) -> Self {
        Self {
            table_schema: Some(table),
            columns: HashMap::new(),
        }
    }

    pub fn table_schema(&self) -> Option<&Arc<TableSchema>> {
        self.table_schema.as_ref()
    }

    pub fn set_table_schema(&mut self, table: Arc<TableSchema>) {
        self.table_schema = Some(table);
    }

    /// Returns the column governed by `schema`, if present
    pub fn get_column(&self, schema: &ColumnSchema) -> Option<&Column> {
        self.columns.get(schema.name())
    }

    /// Returns the column named `name`, if present
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.get(name)
    }

    /// Inserts or replaces a column; last write wins.
    ///
    /// `name` must be the column's own schema name.
    pub fn add_column(&mut self, name: impl Into<String>, column: Column) -> Result<()> {
        let name = name.into();
        if name != column.name() {
            return Err(ValidationError::MisplacedColumn {
                key: name,
                column: column.name().to_string(),
            }
            .into());
        }
        if let Some(table) = &self.table_schema {
            if !table.has_column(&name) {
                return Err(SchemaError::unknown_column(table.name(), name).into());
            }
        }
        self.columns.insert(name, column);
        Ok(())
    }

    /// Validates `data` against `schema` and stores it under the schema's name
    pub fn set<T: ColumnData>(&mut self, schema: &Arc<ColumnSchema>, data: T) -> Result<()> {
        let column = Column::from_data(Arc::clone(schema), data)?;
        self.add_column(schema.name(), column)?;
        Ok(())
    }

    pub fn remove_column(&mut self, name: &str) -> Option<Column> {
        self.columns.remove(name)
    }

    pub fn columns(&self) -> impl Iterator<Item = &Column> {
        self.columns.values()
    }

    /// `(key, column)` pairs, sorted by key
    pub fn entries(&self) -> Vec<(&str, &Column)> {
        let mut entries: Vec<(&str, &Column)> = self
            .columns
            .iter()
            .map(|(name, column)| (name.as_str(), column))
            .collect();
        entries.sort_unstable_by(|a, b| a.0.cmp(b.0));
        entries
    }

    /// Present column names, sorted
    pub fn column_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.columns.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Equality restricted to `columns`.
    ///
    /// A column absent from both rows counts as equal; absent from one only
    /// counts as different.
    pub fn projection_eq(&self, other: &Row, columns: &[&str]) -> bool {
        columns
            .iter()
            .all(|name| self.columns.get(*name) == other.columns.get(*name))
    }

    /// `{"column": <value>, ...}`
    pub fn to_json(&self) -> Value {
        let mut obj = Map::new();
        for name in self.column_names() {
            if let Some(column) = self.columns.get(name) {
                obj.insert(name.to_string(), column.to_json());
            }
        }
        Value::Object(obj)
    }

    /// Decodes a row object (e.g. from a select result) against `table`
    pub fn from_json(table: &Arc<TableSchema>, json: &Value) -> Result<Row> {
        let obj = json.as_object().ok_or_else(|| ValidationError::Undecodable {
            column: table.name().to_string(),
            json: json.to_string(),
        })?;

        let mut row = Row::with_schema(Arc::clone(table));
        for (name, value) in obj {
            let schema = table.column_schema(name)?;
            let datum = Datum::from_json(name, schema.column_type(), value)?;
            row.columns
                .insert(name.clone(), Column::new(Arc::clone(schema), datum)?);
        }
        Ok(row)
    }

    /// Returns a copy with every uuid in every column passed through `f`
    pub fn map_uuids<F: FnMut(&RowUuid) -> RowUuid>(&self, f: &mut F) -> Row {
        Row {
            table_schema: self.table_schema.clone(),
            columns: self
                .columns
                .iter()
                .map(|(name, column)| (name.clone(), column.with_data(column.data().map_uuids(&mut *f))))
                .collect(),
        }
    }

    /// Every uuid mentioned by any column
    pub fn uuids(&self) -> Vec<&RowUuid> {
        self.columns.values().flat_map(|c| c.data().uuids()).collect()
    }
}

impl PartialEq for Row {
    fn eq(&self, other: &Self) -> bool {
        self.columns == other.columns
    }
}

impl Eq for Row {}

impl Hash for Row {
    fn hash<H: Hasher>(&self, state: &mut H) {
        let mut entries: Vec<(&String, &Column)> = self.columns.iter().collect();
        entries.sort_unstable_by(|a, b| a.0.cmp(b.0));
        entries.hash(state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::schema::{AtomicType, BaseType, ColumnType};
    use serde_json::json;

    fn bridge_table() -> Arc<TableSchema> {
        Arc::new(
            TableSchema::new("Bridge")
                .with_column(ColumnSchema::new("name", ColumnType::atom(AtomicType::String)))
                .with_column(ColumnSchema::new(
                    "ports",
                    ColumnType::set_of(BaseType::reference("Port")),
                )),
        )
    }

    #[test]
    fn test_get_absent_column_is_none() {
        let table = bridge_table();
        let row = Row::with_schema(Arc::clone(&table));
        assert!(row.get_column(table.column_schema("name").unwrap()).is_none());
    }

    #[test]
    fn test_add_column_last_write_wins() {
        let table = bridge_table();
        let name = table.column_schema("name").unwrap();
        let mut row = Row::with_schema(Arc::clone(&table));
        row.set(name, "br0".to_string()).unwrap();
        row.set(name, "br1".to_string()).unwrap();
        assert_eq!(row.len(), 1);
        assert_eq!(row.get_column(name).unwrap().data_as::<String>().unwrap(), "br1");
    }

    #[test]
    fn test_bound_row_rejects_undeclared_column() {
        let table = bridge_table();
        let stray = Arc::new(ColumnSchema::new("color", ColumnType::atom(AtomicType::String)));
        let mut row = Row::with_schema(table);
        let err = row.set(&stray, "red".to_string()).unwrap_err();
        assert!(matches!(err, Error::Schema(_)));

        let mut unbound = Row::new();
        assert!(unbound.set(&stray, "red".to_string()).is_ok());
    }

    #[test]
    fn test_add_column_under_foreign_key_rejected() {
        let table = bridge_table();
        let ports = Arc::clone(table.column_schema("ports").unwrap());
        let column = Column::from_data(
            ports,
            std::collections::BTreeSet::from([RowUuid::named("a"), RowUuid::named("b")]),
        )
        .unwrap();

        let mut row = Row::with_schema(Arc::clone(&table));
        let err = row.add_column("name", column.clone()).unwrap_err();
        assert!(matches!(
            err,
            Error::Validation(ValidationError::MisplacedColumn { ref key, ref column })
                if key == "name" && column == "ports"
        ));
        assert!(row.is_empty());

        let mut unbound = Row::new();
        assert!(unbound.add_column("name", column.clone()).is_err());
        assert!(unbound.add_column("ports", column).is_ok());
        assert_eq!(unbound.entries()[0].0, "ports");
    }

    #[test]
    fn test_json_round_trip_through_schema() {
        let table = bridge_table();
        let json = json!({"name": "br0", "ports": ["set", []]});
        let row = Row::from_json(&table, &json).unwrap();
        assert_eq!(row.to_json(), json);
    }

    #[test]
    fn test_from_json_unknown_column() {
        let table = bridge_table();
        let err = Row::from_json(&table, &json!({"nme": "br0"})).unwrap_err();
        assert!(matches!(err, Error::Schema(_)));
    }
}
