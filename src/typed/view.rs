//! Typed row views
//!
//! A [`TypedRow`] binds a static [`TableDescriptor`] to the server's
//! schema and to a [`Row`]. Accessors are looked up by name in the
//! descriptor and gated by the server schema version: a gated getter
//! returns `None` and a gated setter does nothing, so one typed view works
//! against servers speaking different schema versions.

use std::sync::Arc;

use super::descriptor::{ColumnDescriptor, TableDescriptor};
use crate::error::Result;
use crate::notation::{Column, ColumnData, Mutation, Mutator, Row, RowUuid};
use crate::observability::{log_event_with_fields, Event};
use crate::schema::{ColumnSchema, DatabaseSchema, SchemaError, TableSchema, UUID_COLUMN};
use crate::transaction::{Insert, Update};

/// How an accessor resolves against the bound server schema
enum Access<'a> {
    Live(&'a Arc<ColumnSchema>),
    Gated,
    /// Compatible version, but the server does not declare the column
    Missing,
}

/// Generic typed view over a [`Row`]
#[derive(Debug, Clone)]
pub struct TypedRow {
    descriptor: &'static TableDescriptor,
    schema: Arc<DatabaseSchema>,
    table: Arc<TableSchema>,
    row: Row,
}

impl TypedRow {
    /// Empty view, ready to be filled through setters
    pub fn new(descriptor: &'static TableDescriptor, schema: &Arc<DatabaseSchema>) -> Result<Self> {
        Self::bind(descriptor, schema, Row::new())
    }

    /// Binds an existing row, e.g. one decoded from a select result.
    ///
    /// Each column of `row` is re-stamped with the server-declared column
    /// schema, so data built against an assumed type is validated against
    /// the real one here.
    pub fn bind(descriptor: &'static TableDescriptor, schema: &Arc<DatabaseSchema>, row: Row) -> Result<Self> {
        let version = schema.version();
        let table = Arc::clone(schema.table_schema(descriptor.table)?);

        if !descriptor.is_available_in(version) || !table.is_available_in(version) {
            let from = descriptor.from_version.max(table.from_version());
            return Err(SchemaError::table_not_in_version(descriptor.table, from, version).into());
        }

        for column in descriptor
            .columns
            .iter()
            .filter(|c| c.required && c.is_available_in(version))
        {
            let declared = table.column_schema(column.column).map_err(|_| {
                SchemaError::incompatible_column(descriptor.table, column.column, "not declared by the server")
            })?;
            if declared.value_kind() != column.kind {
                return Err(SchemaError::incompatible_column(
                    descriptor.table,
                    column.column,
                    format!(
                        "declared as {}, expected {}",
                        declared.value_kind().name(),
                        column.kind.name()
                    ),
                )
                .into());
            }
        }

        let row = adopt(&table, row)?;
        Ok(Self {
            descriptor,
            schema: Arc::clone(schema),
            table,
            row,
        })
    }

    /// Creates an empty concrete adapter
    pub fn wrap<T: TypedTable>(schema: &Arc<DatabaseSchema>) -> Result<T> {
        Self::new(T::descriptor(), schema).map(T::from_typed)
    }

    /// Wraps an existing row in a concrete adapter
    pub fn wrap_row<T: TypedTable>(schema: &Arc<DatabaseSchema>, row: Row) -> Result<T> {
        Self::bind(T::descriptor(), schema, row).map(T::from_typed)
    }

    pub fn descriptor(&self) -> &'static TableDescriptor {
        self.descriptor
    }

    pub fn database_schema(&self) -> &Arc<DatabaseSchema> {
        &self.schema
    }

    pub fn table_schema(&self) -> &Arc<TableSchema> {
        &self.table
    }

    pub fn row(&self) -> &Row {
        &self.row
    }

    pub fn into_row(self) -> Row {
        self.row
    }

    /// True if `accessor` reads and writes a column on this server
    pub fn is_available(&self, accessor: &str) -> bool {
        self.descriptor
            .accessor(accessor)
            .map_or(false, |c| matches!(self.access(c), Access::Live(_)))
    }

    /// Server column schema governing `accessor`
    pub fn column_schema(&self, accessor: &str) -> Option<&Arc<ColumnSchema>> {
        let descriptor = self.descriptor.accessor(accessor)?;
        match self.access(descriptor) {
            Access::Live(schema) => Some(schema),
            Access::Gated => {
                self.gated(descriptor);
                None
            }
            Access::Missing => None,
        }
    }

    pub fn column(&self, accessor: &str) -> Option<&Column> {
        let schema = self.column_schema(accessor)?;
        self.row.get_column(schema)
    }

    pub fn data<T: ColumnData>(&self, accessor: &str) -> Option<T> {
        self.column(accessor)?.data_as()
    }

    /// Validates `value` against the server's column schema and stores it.
    ///
    /// A version-gated accessor is a no-op. An accessor the descriptor does
    /// not list, or whose column the server lacks, is an error.
    pub fn set<T: ColumnData>(&mut self, accessor: &str, value: T) -> Result<()> {
        let descriptor = self
            .descriptor
            .accessor(accessor)
            .ok_or_else(|| SchemaError::unknown_column(self.descriptor.table, accessor))?;

        let schema = match self.access(descriptor) {
            Access::Live(schema) => Arc::clone(schema),
            Access::Gated => {
                self.gated(descriptor);
                return Ok(());
            }
            Access::Missing => {
                return Err(SchemaError::unknown_column(self.descriptor.table, descriptor.column).into())
            }
        };
        self.row.set(&schema, value)
    }

    /// Server-assigned uuid, present on rows read back from the server
    pub fn uuid(&self) -> Option<RowUuid> {
        self.row.column(UUID_COLUMN)?.data_as()
    }

    /// Mutation applying the current value of `accessor` with `mutator`.
    ///
    /// `None` if the accessor is gated or holds no value.
    pub fn mutation(&self, accessor: &str, mutator: Mutator) -> Option<Mutation> {
        let column = self.column(accessor)?;
        Some(Mutation::new(column.name(), mutator, column.data().clone()))
    }

    pub fn insert(&self) -> Insert {
        Insert::new(self.table.name(), self.row.clone())
    }

    pub fn update(&self) -> Update {
        Update::new(self.table.name(), self.row.clone())
    }

    fn access(&self, descriptor: &ColumnDescriptor) -> Access<'_> {
        let version = self.schema.version();
        if !descriptor.is_available_in(version) {
            return Access::Gated;
        }
        match self.table.column_schema(descriptor.column) {
            Ok(schema) if schema.is_available_in(version) => Access::Live(schema),
            Ok(_) => Access::Gated,
            Err(_) => Access::Missing,
        }
    }

    fn gated(&self, descriptor: &ColumnDescriptor) {
        log_event_with_fields(
            Event::AccessorVersionGated,
            &[
                ("table", self.descriptor.table),
                ("accessor", descriptor.accessor),
                ("from_version", &descriptor.from_version.to_string()),
                ("schema_version", &self.schema.version().to_string()),
            ],
        );
    }
}

fn adopt(table: &Arc<TableSchema>, row: Row) -> Result<Row> {
    let mut bound = Row::with_schema(Arc::clone(table));
    for column in row.columns() {
        let declared = table.column_schema(column.name())?;
        let column = if column.schema() == declared {
            column.clone()
        } else {
            Column::new(Arc::clone(declared), column.data().clone())?
        };
        bound.add_column(declared.name(), column)?;
    }
    Ok(bound)
}

/// A concrete adapter over [`TypedRow`] for one table
pub trait TypedTable: Sized {
    fn descriptor() -> &'static TableDescriptor;

    fn from_typed(row: TypedRow) -> Self;

    fn typed(&self) -> &TypedRow;

    fn typed_mut(&mut self) -> &mut TypedRow;

    fn into_typed(self) -> TypedRow;

    fn table_schema(&self) -> &Arc<TableSchema> {
        self.typed().table_schema()
    }

    fn row(&self) -> &Row {
        self.typed().row()
    }

    fn into_row(self) -> Row {
        self.into_typed().into_row()
    }

    fn uuid(&self) -> Option<RowUuid> {
        self.typed().uuid()
    }
}
