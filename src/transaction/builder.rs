//! Transaction builder
//!
//! Accumulates operations against one database schema. Every operation is
//! checked against the schema when it is added, so a batch that reaches
//! [`TransactionBuilder::build`] only names declared tables and columns and
//! only carries values of the declared shapes.
//!
//! Inserts get a `uuid-name` from a per-builder counter (`row1`, `row2`,
//! ...) unless the caller fixed one. Later operations in the same batch
//! refer to the new row through that name; after the server replies,
//! [`TransactionBuilder::resolve`] maps each name to the real uuid.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde_json::{json, Value};

use super::errors::ResolutionError;
use super::operation::{Insert, Operation};
use super::resolve::{resolve, UuidMapping};
use super::result::{parse_results, OperationResult};
use crate::config::{is_identifier, BuilderConfig};
use crate::error::{Error, Result};
use crate::notation::{Row, RowUuid, ValidationError};
use crate::observability::{log_event_with_fields, Event};
use crate::schema::{DatabaseSchema, SchemaError, TableSchema, UUID_COLUMN, VERSION_COLUMN};

/// Ordered batch of operations for one `transact` request
#[derive(Debug, Clone)]
pub struct TransactionBuilder {
    schema: Arc<DatabaseSchema>,
    config: BuilderConfig,
    operations: Vec<Operation>,
    /// uuid-name to index of the declaring insert
    names: BTreeMap<String, usize>,
    next_name: u64,
}

impl TransactionBuilder {
    pub fn new(schema: Arc<DatabaseSchema>) -> Self {
        Self {
            schema,
            config: BuilderConfig::default(),
            operations: Vec::new(),
            names: BTreeMap::new(),
            next_name: 1,
        }
    }

    pub fn with_config(schema: Arc<DatabaseSchema>, config: BuilderConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            ..Self::new(schema)
        })
    }

    pub fn database_schema(&self) -> &Arc<DatabaseSchema> {
        &self.schema
    }

    pub fn config(&self) -> &BuilderConfig {
        &self.config
    }

    /// Queued operations in submission order
    pub fn operations(&self) -> &[Operation] {
        &self.operations
    }

    pub fn len(&self) -> usize {
        self.operations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }

    /// Declared uuid-names and the index of the insert declaring each
    pub fn names(&self) -> &BTreeMap<String, usize> {
        &self.names
    }

    /// Validates and appends an operation, returning its index.
    ///
    /// A rejected operation leaves the batch unchanged.
    pub fn add(&mut self, operation: impl Into<Operation>) -> Result<usize> {
        match operation.into() {
            Operation::Insert(insert) => self.push_insert(insert).map(|(index, _)| index),
            other => self.push(other),
        }
    }

    /// Queues an insert of `row` into `table` and returns the named uuid
    /// that refers to the new row within this batch.
    pub fn add_insert(&mut self, table: &TableSchema, row: Row) -> Result<RowUuid> {
        self.push_insert(Insert::new(table.name(), row))
            .map(|(_, uuid)| uuid)
    }

    /// Queued inserts into `table`, in submission order
    pub fn extract_insert(&self, table: &TableSchema) -> Vec<&Insert> {
        self.operations
            .iter()
            .filter_map(Operation::as_insert)
            .filter(|insert| insert.table() == table.name())
            .collect()
    }

    /// Named uuid of an insert; `None` only for an insert never queued
    pub fn extract_named_uuid(insert: &Insert) -> Option<RowUuid> {
        insert.named_uuid()
    }

    /// Appends `other`'s operations after this batch's own.
    ///
    /// Names declared by `other` are renumbered from this builder's counter
    /// and every reference inside `other` is rewritten to match.
    pub fn merge(&mut self, other: TransactionBuilder) -> Result<()> {
        if other.schema.name() != self.schema.name() {
            return Err(SchemaError::database_mismatch(self.schema.name(), other.schema.name()).into());
        }
        if other.schema.version() != self.schema.version() {
            return Err(SchemaError::version_mismatch(
                self.schema.name(),
                self.schema.version(),
                other.schema.version(),
            )
            .into());
        }

        let mut declared: Vec<(&String, usize)> = other.names.iter().map(|(n, &i)| (n, i)).collect();
        declared.sort_by_key(|&(_, index)| index);
        let mut renames: BTreeMap<String, String> = BTreeMap::new();
        for (name, _) in declared {
            let fresh = self.fresh_name();
            renames.insert(name.clone(), fresh);
        }

        let offset = self.operations.len();
        let merged = other.operations.len();
        for (i, operation) in other.operations.into_iter().enumerate() {
            let mut operation = operation.map_uuids(&mut |uuid| match uuid {
                RowUuid::Named(name) => renames
                    .get(name)
                    .map(RowUuid::named)
                    .unwrap_or_else(|| uuid.clone()),
                RowUuid::Real(_) => uuid.clone(),
            });
            if let Operation::Insert(insert) = &mut operation {
                let renamed = insert.uuid_name().and_then(|name| renames.get(name)).cloned();
                if let Some(name) = renamed {
                    insert.set_uuid_name(name.clone());
                    self.names.insert(name, offset + i);
                }
            }
            self.operations.push(operation);
        }

        log_event_with_fields(
            Event::TransactionMerged,
            &[
                ("database", self.schema.name()),
                ("merged", &merged.to_string()),
                ("operations", &self.operations.len().to_string()),
            ],
        );
        Ok(())
    }

    /// Emits the `transact` params: the database name followed by each
    /// operation's protocol object.
    pub fn build(&self) -> Result<Value> {
        if self.config.validate_references {
            self.check_references()?;
        }

        let mut params = Vec::with_capacity(self.operations.len() + 1);
        params.push(json!(self.schema.name()));
        params.extend(self.operations.iter().map(Operation::to_json));

        log_event_with_fields(
            Event::TransactionBuilt,
            &[
                ("database", self.schema.name()),
                ("operations", &self.operations.len().to_string()),
            ],
        );
        Ok(Value::Array(params))
    }

    /// Maps every declared uuid-name to its server-assigned uuid.
    pub fn resolve(&self, results: &[OperationResult]) -> Result<UuidMapping> {
        match resolve(&self.operations, &self.names, results) {
            Ok(mapping) => {
                log_event_with_fields(
                    Event::ResolutionComplete,
                    &[
                        ("database", self.schema.name()),
                        ("resolved", &mapping.len().to_string()),
                    ],
                );
                Ok(mapping)
            }
            Err(err) => Err(self.resolution_failed(err)),
        }
    }

    /// Parses a raw `transact` result array, then resolves it.
    pub fn resolve_json(&self, results: &Value) -> Result<UuidMapping> {
        let results = parse_results(results).map_err(|err| self.resolution_failed(err))?;
        self.resolve(&results)
    }

    fn resolution_failed(&self, err: ResolutionError) -> Error {
        let err = Error::from(err);
        log_event_with_fields(
            Event::ResolutionFailed,
            &[
                ("database", self.schema.name()),
                ("kind", err.kind()),
                ("reason", &err.to_string()),
            ],
        );
        err
    }

    fn push(&mut self, operation: Operation) -> Result<usize> {
        self.validate(&operation)
            .map_err(|err| Self::rejected(&operation, err))?;

        let index = self.operations.len();
        log_event_with_fields(
            Event::OperationQueued,
            &[
                ("op", operation.name()),
                ("table", operation.table().unwrap_or("")),
                ("index", &index.to_string()),
            ],
        );
        self.operations.push(operation);
        Ok(index)
    }

    fn push_insert(&mut self, mut insert: Insert) -> Result<(usize, RowUuid)> {
        let operation = Operation::Insert(insert.clone());
        self.validate(&operation)
            .map_err(|err| Self::rejected(&operation, err))?;

        let name = match insert.uuid_name() {
            Some(name) => name.to_string(),
            None => self.fresh_name(),
        };
        insert.set_uuid_name(name.clone());

        let index = self.operations.len();
        log_event_with_fields(
            Event::InsertQueued,
            &[
                ("table", insert.table()),
                ("uuid_name", &name),
                ("index", &index.to_string()),
            ],
        );
        self.names.insert(name.clone(), index);
        self.operations.push(Operation::Insert(insert));
        Ok((index, RowUuid::named(name)))
    }

    fn rejected(operation: &Operation, err: Error) -> Error {
        log_event_with_fields(
            Event::OperationRejected,
            &[
                ("op", operation.name()),
                ("table", operation.table().unwrap_or("")),
                ("kind", err.kind()),
                ("reason", &err.to_string()),
            ],
        );
        err
    }

    /// Next `<prefix><n>` not already declared in this batch
    fn fresh_name(&mut self) -> String {
        loop {
            let name = format!("{}{}", self.config.named_uuid_prefix, self.next_name);
            self.next_name += 1;
            if !self.names.contains_key(&name) {
                return name;
            }
        }
    }

    fn validate(&self, operation: &Operation) -> Result<()> {
        let Some(table_name) = operation.table() else {
            return Ok(());
        };
        let table = self.schema.table_schema(table_name)?;

        for condition in operation.where_clause() {
            let column = table.column_schema(condition.column())?;
            condition.validate(column)?;
        }

        match operation {
            Operation::Insert(insert) => {
                if let Some(name) = insert.uuid_name() {
                    if !is_identifier(name) {
                        return Err(ValidationError::InvalidIdentifier(name.to_string()).into());
                    }
                    if self.names.contains_key(name) {
                        return Err(ValidationError::DuplicateNamedUuid(name.to_string()).into());
                    }
                }
                validate_row(table, insert.row(), false)
            }
            Operation::Update(update) => validate_row(table, update.row(), true),
            Operation::Mutate(mutate) => {
                for mutation in mutate.mutations() {
                    let column = table.column_schema(mutation.column())?;
                    if !column.is_mutable() {
                        return Err(ValidationError::ImmutableColumn {
                            column: mutation.column().to_string(),
                        }
                        .into());
                    }
                    mutation.validate(column)?;
                }
                Ok(())
            }
            Operation::Select(select) => {
                for column in select.columns() {
                    table.column_schema(column)?;
                }
                Ok(())
            }
            Operation::Delete(_) | Operation::Comment(_) => Ok(()),
        }
    }

    fn check_references(&self) -> Result<()> {
        for operation in &self.operations {
            for uuid in operation.uuids() {
                if let Some(name) = uuid.as_named() {
                    if !self.names.contains_key(name) {
                        return Err(ValidationError::UndeclaredNamedUuid(name.to_string()).into());
                    }
                }
            }
        }
        Ok(())
    }
}

/// Checks row values against the server's column schemas.
///
/// `_uuid` and `_version` are never written; updates also may not touch
/// immutable columns.
fn validate_row(table: &TableSchema, row: &Row, update: bool) -> Result<()> {
    for (name, column) in row.entries() {
        if name != column.name() {
            return Err(ValidationError::MisplacedColumn {
                key: name.to_string(),
                column: column.name().to_string(),
            }
            .into());
        }
        let schema = table.column_schema(name)?;
        if name == UUID_COLUMN || name == VERSION_COLUMN || (update && !schema.is_mutable()) {
            return Err(ValidationError::ImmutableColumn {
                column: name.to_string(),
            }
            .into());
        }
        schema.validate(column.data())?;
    }
    Ok(())
}
