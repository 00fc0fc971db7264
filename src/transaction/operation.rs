//! Database operations (RFC 7047 §5.2)
//!
//! Each operation serializes to its protocol object. Operations name their
//! table; the builder checks names and values against the database schema.

use serde_json::{json, Map, Value};

use crate::notation::{Condition, Datum, Mutation, Mutator, Row, RowUuid};

/// Insert a row. `uuid_name` lets later operations reference the new row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Insert {
    table: String,
    row: Row,
    uuid_name: Option<String>,
}

impl Insert {
    pub fn new(table: impl Into<String>, row: Row) -> Self {
        Self {
            table: table.into(),
            row,
            uuid_name: None,
        }
    }

    /// Fixes the `uuid-name` instead of letting the builder generate one
    pub fn with_uuid_name(mut self, name: impl Into<String>) -> Self {
        self.uuid_name = Some(name.into());
        self
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    pub fn row(&self) -> &Row {
        &self.row
    }

    pub fn uuid_name(&self) -> Option<&str> {
        self.uuid_name.as_deref()
    }

    /// Reference to the row this insert creates, usable in the same batch
    pub fn named_uuid(&self) -> Option<RowUuid> {
        self.uuid_name.as_deref().map(RowUuid::named)
    }

    pub(crate) fn set_uuid_name(&mut self, name: String) {
        self.uuid_name = Some(name);
    }
}

/// Update matching rows with the columns of `row`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Update {
    table: String,
    where_clause: Vec<Condition>,
    row: Row,
}

impl Update {
    pub fn new(table: impl Into<String>, row: Row) -> Self {
        Self {
            table: table.into(),
            where_clause: Vec::new(),
            row,
        }
    }

    pub fn with_condition(mut self, condition: Condition) -> Self {
        self.where_clause.push(condition);
        self
    }

    /// Restricts the update to rows equal to `match_row` on its present columns
    pub fn matching(mut self, match_row: &Row) -> Self {
        self.where_clause.extend(Condition::matching_row(match_row));
        self
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    pub fn where_clause(&self) -> &[Condition] {
        &self.where_clause
    }

    pub fn row(&self) -> &Row {
        &self.row
    }
}

/// Apply mutations to matching rows
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mutate {
    table: String,
    where_clause: Vec<Condition>,
    mutations: Vec<Mutation>,
}

impl Mutate {
    pub fn new(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            where_clause: Vec::new(),
            mutations: Vec::new(),
        }
    }

    pub fn add_mutation(mut self, column: impl Into<String>, mutator: Mutator, value: Datum) -> Self {
        self.mutations.push(Mutation::new(column, mutator, value));
        self
    }

    pub fn with_mutation(mut self, mutation: Mutation) -> Self {
        self.mutations.push(mutation);
        self
    }

    pub fn with_condition(mut self, condition: Condition) -> Self {
        self.where_clause.push(condition);
        self
    }

    pub fn matching(mut self, match_row: &Row) -> Self {
        self.where_clause.extend(Condition::matching_row(match_row));
        self
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    pub fn where_clause(&self) -> &[Condition] {
        &self.where_clause
    }

    /// Mutations in the order they will be applied
    pub fn mutations(&self) -> &[Mutation] {
        &self.mutations
    }
}

/// Delete matching rows
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Delete {
    table: String,
    where_clause: Vec<Condition>,
}

impl Delete {
    pub fn new(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            where_clause: Vec::new(),
        }
    }

    pub fn with_condition(mut self, condition: Condition) -> Self {
        self.where_clause.push(condition);
        self
    }

    pub fn matching(mut self, match_row: &Row) -> Self {
        self.where_clause.extend(Condition::matching_row(match_row));
        self
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    pub fn where_clause(&self) -> &[Condition] {
        &self.where_clause
    }
}

/// Read matching rows, optionally projected onto `columns`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Select {
    table: String,
    where_clause: Vec<Condition>,
    columns: Vec<String>,
}

impl Select {
    pub fn new(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            where_clause: Vec::new(),
            columns: Vec::new(),
        }
    }

    pub fn with_condition(mut self, condition: Condition) -> Self {
        self.where_clause.push(condition);
        self
    }

    pub fn matching(mut self, match_row: &Row) -> Self {
        self.where_clause.extend(Condition::matching_row(match_row));
        self
    }

    pub fn column(mut self, column: impl Into<String>) -> Self {
        self.columns.push(column.into());
        self
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    pub fn where_clause(&self) -> &[Condition] {
        &self.where_clause
    }

    /// Projection; empty means all columns
    pub fn columns(&self) -> &[String] {
        &self.columns
    }
}

/// One operation of a transaction
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operation {
    Insert(Insert),
    Update(Update),
    Mutate(Mutate),
    Delete(Delete),
    Select(Select),
    Comment(String),
}

impl Operation {
    /// Wire name (`op` member)
    pub fn name(&self) -> &'static str {
        match self {
            Operation::Insert(_) => "insert",
            Operation::Update(_) => "update",
            Operation::Mutate(_) => "mutate",
            Operation::Delete(_) => "delete",
            Operation::Select(_) => "select",
            Operation::Comment(_) => "comment",
        }
    }

    pub fn table(&self) -> Option<&str> {
        match self {
            Operation::Insert(op) => Some(op.table()),
            Operation::Update(op) => Some(op.table()),
            Operation::Mutate(op) => Some(op.table()),
            Operation::Delete(op) => Some(op.table()),
            Operation::Select(op) => Some(op.table()),
            Operation::Comment(_) => None,
        }
    }

    pub fn as_insert(&self) -> Option<&Insert> {
        match self {
            Operation::Insert(insert) => Some(insert),
            _ => None,
        }
    }

    /// Conditions selecting the rows the operation applies to
    pub fn where_clause(&self) -> &[Condition] {
        match self {
            Operation::Update(op) => op.where_clause(),
            Operation::Mutate(op) => op.where_clause(),
            Operation::Delete(op) => op.where_clause(),
            Operation::Select(op) => op.where_clause(),
            Operation::Insert(_) | Operation::Comment(_) => &[],
        }
    }

    /// Every uuid embedded in rows, mutations and conditions
    pub fn uuids(&self) -> Vec<&RowUuid> {
        let mut uuids: Vec<&RowUuid> = self
            .where_clause()
            .iter()
            .flat_map(|c| c.value().uuids())
            .collect();
        match self {
            Operation::Insert(op) => uuids.extend(op.row.uuids()),
            Operation::Update(op) => uuids.extend(op.row.uuids()),
            Operation::Mutate(op) => {
                uuids.extend(op.mutations.iter().flat_map(|m| m.value().uuids()))
            }
            _ => {}
        }
        uuids
    }

    /// Returns a copy with every embedded uuid passed through `f`.
    ///
    /// The insert's own `uuid-name` is left alone.
    pub fn map_uuids<F: FnMut(&RowUuid) -> RowUuid>(&self, f: &mut F) -> Operation {
        match self {
            Operation::Insert(op) => Operation::Insert(Insert {
                table: op.table.clone(),
                row: op.row.map_uuids(&mut *f),
                uuid_name: op.uuid_name.clone(),
            }),
            Operation::Update(op) => Operation::Update(Update {
                table: op.table.clone(),
                where_clause: map_conditions(&op.where_clause, &mut *f),
                row: op.row.map_uuids(&mut *f),
            }),
            Operation::Mutate(op) => Operation::Mutate(Mutate {
                table: op.table.clone(),
                where_clause: map_conditions(&op.where_clause, &mut *f),
                mutations: op.mutations.iter().map(|m| m.map_uuids(&mut *f)).collect(),
            }),
            Operation::Delete(op) => Operation::Delete(Delete {
                table: op.table.clone(),
                where_clause: map_conditions(&op.where_clause, &mut *f),
            }),
            Operation::Select(op) => Operation::Select(Select {
                table: op.table.clone(),
                where_clause: map_conditions(&op.where_clause, &mut *f),
                columns: op.columns.clone(),
            }),
            Operation::Comment(text) => Operation::Comment(text.clone()),
        }
    }

    /// Protocol object for the `transact` params array
    pub fn to_json(&self) -> Value {
        let mut obj = Map::new();
        obj.insert("op".into(), json!(self.name()));
        if let Some(table) = self.table() {
            obj.insert("table".into(), json!(table));
        }

        match self {
            Operation::Insert(op) => {
                obj.insert("row".into(), op.row.to_json());
                if let Some(name) = &op.uuid_name {
                    obj.insert("uuid-name".into(), json!(name));
                }
            }
            Operation::Update(op) => {
                obj.insert("where".into(), conditions_json(&op.where_clause));
                obj.insert("row".into(), op.row.to_json());
            }
            Operation::Mutate(op) => {
                obj.insert("where".into(), conditions_json(&op.where_clause));
                let mutations: Vec<Value> = op.mutations.iter().map(Mutation::to_json).collect();
                obj.insert("mutations".into(), Value::Array(mutations));
            }
            Operation::Delete(op) => {
                obj.insert("where".into(), conditions_json(&op.where_clause));
            }
            Operation::Select(op) => {
                obj.insert("where".into(), conditions_json(&op.where_clause));
                if !op.columns.is_empty() {
                    obj.insert("columns".into(), json!(op.columns));
                }
            }
            Operation::Comment(text) => {
                obj.insert("comment".into(), json!(text));
            }
        }
        Value::Object(obj)
    }
}

fn map_conditions<F: FnMut(&RowUuid) -> RowUuid>(clause: &[Condition], f: &mut F) -> Vec<Condition> {
    clause.iter().map(|c| c.map_uuids(&mut *f)).collect()
}

fn conditions_json(clause: &[Condition]) -> Value {
    Value::Array(clause.iter().map(Condition::to_json).collect())
}

impl From<Insert> for Operation {
    fn from(op: Insert) -> Self {
        Operation::Insert(op)
    }
}

impl From<Update> for Operation {
    fn from(op: Update) -> Self {
        Operation::Update(op)
    }
}

impl From<Mutate> for Operation {
    fn from(op: Mutate) -> Self {
        Operation::Mutate(op)
    }
}

impl From<Delete> for Operation {
    fn from(op: Delete) -> Self {
        Operation::Delete(op)
    }
}

impl From<Select> for Operation {
    fn from(op: Select) -> Self {
        Operation::Select(op)
    }
}
