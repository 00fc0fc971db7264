//! Per-operation results of a `transact` reply (RFC 7047 §4.1.3)

use std::sync::Arc;

use serde_json::Value;
use uuid::Uuid;

use super::errors::{ResolutionError, ResolutionResult};
use crate::error::Result;
use crate::notation::{Row, RowUuid};
use crate::schema::TableSchema;

/// Result of one operation, positionally matched to the operation list
#[derive(Debug, Clone, PartialEq)]
pub enum OperationResult {
    /// `{"uuid": ["uuid", ...]}` from an insert
    Insert { uuid: Uuid },
    /// `{"count": n}` from update, mutate or delete
    Count(u64),
    /// `{"rows": [...]}` from select, still encoded
    Rows(Vec<Value>),
    /// `{}` from comment and similar
    Empty,
    /// `{"error": ..., "details": ...}`
    Error {
        error: String,
        details: Option<String>,
    },
    /// `null`; the server did not execute this operation
    Null,
}

impl OperationResult {
    pub fn from_json(value: &Value) -> ResolutionResult<Self> {
        Self::decode(None, value)
    }

    fn decode(index: Option<usize>, value: &Value) -> ResolutionResult<Self> {
        let obj = match value {
            Value::Null => return Ok(OperationResult::Null),
            Value::Object(obj) => obj,
            other => {
                return Err(ResolutionError::malformed(
                    index,
                    format!("expected object or null, got {}", other),
                ))
            }
        };

        if let Some(error) = obj.get("error") {
            let error = error
                .as_str()
                .ok_or_else(|| ResolutionError::malformed(index, "'error' is not a string"))?;
            let details = obj.get("details").and_then(Value::as_str).map(str::to_string);
            return Ok(OperationResult::Error {
                error: error.to_string(),
                details,
            });
        }

        if let Some(uuid) = obj.get("uuid") {
            return match RowUuid::from_json(uuid) {
                Some(RowUuid::Real(uuid)) => Ok(OperationResult::Insert { uuid }),
                _ => Err(ResolutionError::malformed(
                    index,
                    format!("'uuid' is not a uuid: {}", uuid),
                )),
            };
        }

        if let Some(count) = obj.get("count") {
            return count
                .as_u64()
                .map(OperationResult::Count)
                .ok_or_else(|| ResolutionError::malformed(index, "'count' is not a count"));
        }

        if let Some(rows) = obj.get("rows") {
            return rows
                .as_array()
                .map(|rows| OperationResult::Rows(rows.clone()))
                .ok_or_else(|| ResolutionError::malformed(index, "'rows' is not an array"));
        }

        Ok(OperationResult::Empty)
    }

    pub fn is_error(&self) -> bool {
        matches!(self, OperationResult::Error { .. })
    }

    pub fn uuid(&self) -> Option<Uuid> {
        match self {
            OperationResult::Insert { uuid } => Some(*uuid),
            _ => None,
        }
    }

    pub fn count(&self) -> Option<u64> {
        match self {
            OperationResult::Count(count) => Some(*count),
            _ => None,
        }
    }

    /// Decodes selected rows against the server's table schema.
    ///
    /// Empty for any non-`rows` result.
    pub fn rows(&self, table: &Arc<TableSchema>) -> Result<Vec<Row>> {
        match self {
            OperationResult::Rows(rows) => rows.iter().map(|row| Row::from_json(table, row)).collect(),
            _ => Ok(Vec::new()),
        }
    }
}

/// Parses the `result` array of a `transact` reply.
///
/// The server may append one extra error result (e.g. a commit failure)
/// after the per-operation results; it is kept.
pub fn parse_results(value: &Value) -> ResolutionResult<Vec<OperationResult>> {
    let items = value
        .as_array()
        .ok_or_else(|| ResolutionError::malformed(None, "transact result is not an array"))?;
    items
        .iter()
        .enumerate()
        .map(|(i, item)| OperationResult::decode(Some(i), item))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const ID: &str = "36bb4b6c-3f28-4f6b-8b71-4fb6f0b3c8d1";

    #[test]
    fn test_each_result_shape() {
        let results = parse_results(&json!([
            {"uuid": ["uuid", ID]},
            {"count": 2},
            {"rows": [{"name": "br0"}]},
            {},
            {"error": "constraint violation", "details": "duplicate"},
            null
        ]))
        .unwrap();

        assert_eq!(results[0].uuid(), Some(Uuid::parse_str(ID).unwrap()));
        assert_eq!(results[1].count(), Some(2));
        assert!(matches!(&results[2], OperationResult::Rows(rows) if rows.len() == 1));
        assert_eq!(results[3], OperationResult::Empty);
        assert!(results[4].is_error());
        assert_eq!(results[5], OperationResult::Null);
    }

    #[test]
    fn test_error_without_details() {
        let result = OperationResult::from_json(&json!({"error": "timed out"})).unwrap();
        assert_eq!(
            result,
            OperationResult::Error {
                error: "timed out".into(),
                details: None
            }
        );
    }

    #[test]
    fn test_malformed_results() {
        assert!(parse_results(&json!({"uuid": 1})).is_err());

        let err = parse_results(&json!([{}, {"uuid": ["named-uuid", "row1"]}])).unwrap_err();
        assert!(matches!(err, ResolutionError::MalformedResult { index: Some(1), .. }));

        assert!(OperationResult::from_json(&json!({"count": -1})).is_err());
        assert!(OperationResult::from_json(&json!(7)).is_err());
    }
}
