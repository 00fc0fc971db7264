//! Schema loader: parses the server's schema description (RFC 7047 §3.2)
//! and keeps an in-memory registry of database schemas by name.
//!
//! A parsed schema is immutable and handed out as `Arc<DatabaseSchema>` so
//! any number of builders can read it without locking.

use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::sync::Arc;

use serde_json::{Map, Value};

use super::errors::{SchemaError, SchemaResult};
use super::types::{AtomicType, BaseType, ColumnSchema, ColumnType, DatabaseSchema, TableSchema};
use crate::notation::Version;
use crate::observability::{log_event_with_fields, Event};

impl DatabaseSchema {
    /// Parses a schema description as returned by `get_schema`.
    ///
    /// A missing `version` reads as `Version::NULL`.
    pub fn from_json(json: &Value) -> SchemaResult<Self> {
        let result = parse_database(json);
        if let Err(ref e) = result {
            log_event_with_fields(Event::SchemaRejected, &[("reason", e.message())]);
        }
        result
    }
}

fn parse_database(json: &Value) -> SchemaResult<DatabaseSchema> {
    let obj = json
        .as_object()
        .ok_or_else(|| SchemaError::malformed_schema("$", "schema must be an object"))?;

    let name = obj
        .get("name")
        .and_then(Value::as_str)
        .ok_or_else(|| SchemaError::malformed_schema("$.name", "missing or not a string"))?;

    let version = match obj.get("version") {
        None => Version::NULL,
        Some(v) => {
            let text = v
                .as_str()
                .ok_or_else(|| SchemaError::malformed_schema("$.version", "not a string"))?;
            Version::parse(text)
                .map_err(|e| SchemaError::malformed_schema("$.version", e.to_string()))?
        }
    };

    let tables = obj
        .get("tables")
        .and_then(Value::as_object)
        .ok_or_else(|| SchemaError::malformed_schema("$.tables", "missing or not an object"))?;

    let mut schema = DatabaseSchema::new(name, version);
    for (table_name, table_json) in tables {
        schema = schema.with_table(parse_table(table_name, table_json)?);
    }
    Ok(schema)
}

fn parse_table(name: &str, json: &Value) -> SchemaResult<TableSchema> {
    let path = format!("$.tables.{}", name);
    let obj = json
        .as_object()
        .ok_or_else(|| SchemaError::malformed_schema(&path, "table must be an object"))?;

    let columns = obj
        .get("columns")
        .and_then(Value::as_object)
        .ok_or_else(|| SchemaError::malformed_schema(&path, "missing columns"))?;

    let mut table = TableSchema::new(name);
    for (column_name, column_json) in columns {
        table = table.with_column(parse_column(&path, column_name, column_json)?);
    }

    if obj.get("isRoot").and_then(Value::as_bool).unwrap_or(false) {
        table = table.root();
    }

    if let Some(indexes) = obj.get("indexes").and_then(Value::as_array) {
        for index in indexes {
            let columns = index
                .as_array()
                .and_then(|cols| {
                    cols.iter()
                        .map(|c| c.as_str().map(str::to_string))
                        .collect::<Option<Vec<_>>>()
                })
                .ok_or_else(|| SchemaError::malformed_schema(&path, "index must list column names"))?;
            table = table.with_index(columns);
        }
    }

    Ok(table)
}

fn parse_column(table_path: &str, name: &str, json: &Value) -> SchemaResult<ColumnSchema> {
    let path = format!("{}.columns.{}", table_path, name);
    let obj = json
        .as_object()
        .ok_or_else(|| SchemaError::malformed_schema(&path, "column must be an object"))?;

    let type_json = obj
        .get("type")
        .ok_or_else(|| SchemaError::malformed_schema(&path, "missing type"))?;
    let column_type = parse_type(&path, type_json)?;

    let column = ColumnSchema::new(name, column_type);
    if obj.get("mutable").and_then(Value::as_bool) == Some(false) {
        Ok(column.immutable())
    } else {
        Ok(column)
    }
}

fn parse_type(path: &str, json: &Value) -> SchemaResult<ColumnType> {
    if let Some(atomic) = json.as_str() {
        return Ok(ColumnType::Atom(BaseType::new(parse_atomic(path, atomic)?)));
    }

    let obj = json
        .as_object()
        .ok_or_else(|| SchemaError::malformed_schema(path, "type must be a string or object"))?;

    let key = parse_base(
        path,
        obj.get("key")
            .ok_or_else(|| SchemaError::malformed_schema(path, "type without key"))?,
    )?;
    let value = obj.get("value").map(|v| parse_base(path, v)).transpose()?;
    let min = match obj.get("min") {
        None => 1,
        Some(v) => v
            .as_u64()
            .ok_or_else(|| SchemaError::malformed_schema(path, "min must be a non-negative integer"))?,
    };
    let max = parse_max(path, obj)?;

    if max.map_or(false, |max| max < min) {
        return Err(SchemaError::malformed_schema(path, "max below min"));
    }

    Ok(match value {
        Some(value) => ColumnType::Map { key, value, min, max },
        None if min == 1 && max == Some(1) => ColumnType::Atom(key),
        None => ColumnType::Set { key, min, max },
    })
}

fn parse_max(path: &str, obj: &Map<String, Value>) -> SchemaResult<Option<u64>> {
    match obj.get("max") {
        None => Ok(Some(1)),
        Some(Value::String(s)) if s == "unlimited" => Ok(None),
        Some(v) => v
            .as_u64()
            .filter(|m| *m >= 1)
            .map(Some)
            .ok_or_else(|| SchemaError::malformed_schema(path, "max must be a positive integer or \"unlimited\"")),
    }
}

fn parse_base(path: &str, json: &Value) -> SchemaResult<BaseType> {
    if let Some(atomic) = json.as_str() {
        return Ok(BaseType::new(parse_atomic(path, atomic)?));
    }
    let obj = json
        .as_object()
        .ok_or_else(|| SchemaError::malformed_schema(path, "base type must be a string or object"))?;
    let atomic = obj
        .get("type")
        .and_then(Value::as_str)
        .ok_or_else(|| SchemaError::malformed_schema(path, "base type without type"))?;

    Ok(BaseType {
        atomic: parse_atomic(path, atomic)?,
        ref_table: obj
            .get("refTable")
            .and_then(Value::as_str)
            .map(str::to_string),
    })
}

fn parse_atomic(path: &str, name: &str) -> SchemaResult<AtomicType> {
    AtomicType::from_name(name)
        .ok_or_else(|| SchemaError::malformed_schema(path, format!("unknown atomic type '{}'", name)))
}

/// In-memory registry of database schemas, keyed by database name.
#[derive(Debug, Default)]
pub struct SchemaLoader {
    schemas: HashMap<String, Arc<DatabaseSchema>>,
}

impl SchemaLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads a schema description file and registers it.
    pub fn load_file(&mut self, path: &Path) -> SchemaResult<Arc<DatabaseSchema>> {
        let content = fs::read_to_string(path).map_err(|e| {
            SchemaError::malformed_schema(path.display().to_string(), format!("Failed to read file: {}", e))
        })?;

        let json: Value = serde_json::from_str(&content).map_err(|e| {
            SchemaError::malformed_schema(path.display().to_string(), format!("Invalid JSON: {}", e))
        })?;

        self.load_json(&json)
    }

    /// Parses a schema description and registers it.
    pub fn load_json(&mut self, json: &Value) -> SchemaResult<Arc<DatabaseSchema>> {
        let schema = DatabaseSchema::from_json(json)?;
        self.register(schema)
    }

    /// Registers a schema.
    ///
    /// Registering an identical schema again is a no-op. A different schema
    /// with the same name and version is rejected; a newer version replaces
    /// the old one.
    pub fn register(&mut self, schema: DatabaseSchema) -> SchemaResult<Arc<DatabaseSchema>> {
        if let Some(existing) = self.schemas.get(schema.name()) {
            if existing.version() == schema.version() {
                if **existing != schema {
                    return Err(SchemaError::schema_conflict(schema.name(), schema.version()));
                }
                return Ok(Arc::clone(existing));
            }
        }

        let version = schema.version().to_string();
        let tables = schema.table_names().len().to_string();
        log_event_with_fields(
            Event::SchemaLoaded,
            &[("database", schema.name()), ("version", &version), ("tables", &tables)],
        );

        let schema = Arc::new(schema);
        self.schemas
            .insert(schema.name().to_string(), Arc::clone(&schema));
        Ok(schema)
    }

    /// Gets a schema by database name.
    pub fn get(&self, name: &str) -> Option<Arc<DatabaseSchema>> {
        self.schemas.get(name).cloned()
    }

    pub fn exists(&self, name: &str) -> bool {
        self.schemas.contains_key(name)
    }

    pub fn schema_count(&self) -> usize {
        self.schemas.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::ValueKind;
    use serde_json::json;
    use std::io::Write;

    fn sample() -> Value {
        json!({
            "name": "Open_vSwitch",
            "version": "8.3.0",
            "tables": {
                "Open_vSwitch": {
                    "columns": {
                        "bridges": {"type": {"key": {"type": "uuid", "refTable": "Bridge"}, "min": 0, "max": "unlimited"}},
                        "ovs_version": {"type": {"key": "string", "min": 0, "max": 1}}
                    },
                    "isRoot": true,
                    "maxRows": 1
                },
                "Bridge": {
                    "columns": {
                        "name": {"type": "string", "mutable": false},
                        "other_config": {"type": {"key": "string", "value": "string", "min": 0, "max": "unlimited"}}
                    },
                    "indexes": [["name"]]
                }
            }
        })
    }

    #[test]
    fn test_parse_sample() {
        let schema = DatabaseSchema::from_json(&sample()).unwrap();
        assert_eq!(schema.name(), "Open_vSwitch");
        assert_eq!(schema.version(), Version::new(8, 3, 0));

        let ovs = schema.table_schema("Open_vSwitch").unwrap();
        assert!(ovs.is_root());
        let bridges = ovs.column_schema("bridges").unwrap();
        assert_eq!(bridges.value_kind(), ValueKind::Set);
        assert_eq!(bridges.column_type().key().ref_table.as_deref(), Some("Bridge"));
        assert_eq!(
            ovs.column_schema("ovs_version").unwrap().column_type(),
            &ColumnType::optional(AtomicType::String)
        );

        let bridge = schema.table_schema("Bridge").unwrap();
        assert_eq!(bridge.column_schema("name").unwrap().value_kind(), ValueKind::Atom);
        assert!(!bridge.column_schema("name").unwrap().is_mutable());
        assert_eq!(bridge.column_schema("other_config").unwrap().value_kind(), ValueKind::Map);
        assert_eq!(bridge.indexes(), &[vec!["name".to_string()]]);
    }

    #[test]
    fn test_malformed_rejected() {
        let err = DatabaseSchema::from_json(&json!({"name": "x", "tables": {"T": {"columns": {"c": {"type": "float"}}}}}))
            .unwrap_err();
        assert_eq!(err.code().code(), "OVSDB_MALFORMED_SCHEMA");
        assert!(DatabaseSchema::from_json(&json!({"name": "x", "version": "1.2", "tables": {}})).is_err());
        assert!(DatabaseSchema::from_json(&json!([])).is_err());
    }

    #[test]
    fn test_missing_version_is_null() {
        let schema = DatabaseSchema::from_json(&json!({"name": "x", "tables": {}})).unwrap();
        assert!(schema.version().is_null());
    }

    #[test]
    fn test_register_conflict() {
        let mut loader = SchemaLoader::new();
        loader.load_json(&sample()).unwrap();
        assert!(loader.load_json(&sample()).is_ok());

        let other = DatabaseSchema::new("Open_vSwitch", Version::new(8, 3, 0));
        let err = loader.register(other).unwrap_err();
        assert_eq!(err.code().code(), "OVSDB_SCHEMA_CONFLICT");

        let newer = DatabaseSchema::new("Open_vSwitch", Version::new(8, 4, 0));
        loader.register(newer).unwrap();
        assert_eq!(loader.get("Open_vSwitch").unwrap().version(), Version::new(8, 4, 0));
        assert_eq!(loader.schema_count(), 1);
    }

    #[test]
    fn test_load_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(sample().to_string().as_bytes()).unwrap();

        let mut loader = SchemaLoader::new();
        let schema = loader.load_file(file.path()).unwrap();
        assert!(schema.has_table("Bridge"));
        assert!(loader.exists("Open_vSwitch"));
    }
}
