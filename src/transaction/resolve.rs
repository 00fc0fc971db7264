//! Named-uuid resolution
//!
//! Maps each `uuid-name` declared in a batch to the real uuid the server
//! assigned to that insert. Resolution is all-or-nothing: if any result is
//! an error, or an insert has no uuid result, no mapping is produced.

use std::collections::BTreeMap;

use uuid::Uuid;

use super::errors::{ResolutionError, ResolutionResult};
use super::operation::Operation;
use super::result::OperationResult;
use crate::notation::{Column, Datum, Row, RowUuid};

/// Named uuid to server-assigned uuid
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UuidMapping {
    uuids: BTreeMap<String, Uuid>,
}

impl UuidMapping {
    /// Real uuid for a `uuid-name`
    pub fn get(&self, name: &str) -> Option<Uuid> {
        self.uuids.get(name).copied()
    }

    /// Real uuids resolve to themselves, named ones through the mapping
    pub fn resolve(&self, uuid: &RowUuid) -> Option<Uuid> {
        match uuid {
            RowUuid::Real(uuid) => Some(*uuid),
            RowUuid::Named(name) => self.get(name),
        }
    }

    pub fn len(&self) -> usize {
        self.uuids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.uuids.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, Uuid)> {
        self.uuids.iter().map(|(name, uuid)| (name.as_str(), *uuid))
    }

    fn rewrite(&self, uuid: &RowUuid) -> RowUuid {
        self.resolve(uuid).map(RowUuid::Real).unwrap_or_else(|| uuid.clone())
    }

    /// Replaces resolvable named uuids; unknown names are left as they are.
    pub fn rewrite_datum(&self, datum: &Datum) -> Datum {
        datum.map_uuids(&mut |u| self.rewrite(u))
    }

    pub fn rewrite_column(&self, column: &Column) -> Column {
        column.with_data(self.rewrite_datum(column.data()))
    }

    pub fn rewrite_row(&self, row: &Row) -> Row {
        row.map_uuids(&mut |u| self.rewrite(u))
    }

    pub fn rewrite_operations(&self, operations: &[Operation]) -> Vec<Operation> {
        operations
            .iter()
            .map(|op| op.map_uuids(&mut |u| self.rewrite(u)))
            .collect()
    }
}

/// Resolves `names` (uuid-name to operation index) against `results`.
///
/// Pure: calling it twice with the same inputs yields the same mapping.
pub fn resolve(
    operations: &[Operation],
    names: &BTreeMap<String, usize>,
    results: &[OperationResult],
) -> ResolutionResult<UuidMapping> {
    if results.len() < operations.len() {
        return Err(ResolutionError::ResultsShort {
            expected: operations.len(),
            actual: results.len(),
        });
    }

    // Any error, including a trailing commit error, aborts the transaction.
    let failure = results.iter().enumerate().find_map(|(index, result)| match result {
        OperationResult::Error { error, details } => Some(ResolutionError::OperationFailed {
            index,
            error: error.clone(),
            details: details.clone(),
        }),
        _ => None,
    });
    if let Some(err) = failure {
        return Err(err);
    }

    let mut uuids = BTreeMap::new();
    for (name, &index) in names {
        let declared = operations
            .get(index)
            .and_then(Operation::as_insert)
            .and_then(|insert| insert.uuid_name());
        if declared != Some(name.as_str()) {
            return Err(ResolutionError::malformed(
                Some(index),
                format!("operation {} does not declare '{}'", index, name),
            ));
        }

        match results[index].uuid() {
            Some(uuid) => {
                uuids.insert(name.clone(), uuid);
            }
            None => {
                return Err(ResolutionError::MissingResult {
                    name: name.clone(),
                    index,
                })
            }
        }
    }

    Ok(UuidMapping { uuids })
}
