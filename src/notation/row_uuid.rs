//! Row identifiers: server-assigned or transaction-local

use std::fmt;

use serde_json::{json, Value};
use uuid::Uuid;

/// A row identifier.
///
/// `Named` is a placeholder for the row an insert in the same transaction
/// will create. It means nothing outside that transaction.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum RowUuid {
    /// Server-assigned identifier
    Real(Uuid),
    /// Transaction-local `uuid-name`
    Named(String),
}

impl RowUuid {
    pub fn named(name: impl Into<String>) -> Self {
        RowUuid::Named(name.into())
    }

    pub fn is_named(&self) -> bool {
        matches!(self, RowUuid::Named(_))
    }

    /// Returns the real identifier, `None` for a named one
    pub fn as_real(&self) -> Option<Uuid> {
        match self {
            RowUuid::Real(uuid) => Some(*uuid),
            RowUuid::Named(_) => None,
        }
    }

    /// Returns the `uuid-name`, `None` for a real identifier
    pub fn as_named(&self) -> Option<&str> {
        match self {
            RowUuid::Named(name) => Some(name),
            RowUuid::Real(_) => None,
        }
    }

    /// `["uuid", "<uuid>"]` or `["named-uuid", "<id>"]`
    pub fn to_json(&self) -> Value {
        match self {
            RowUuid::Real(uuid) => json!(["uuid", uuid.to_string()]),
            RowUuid::Named(name) => json!(["named-uuid", name]),
        }
    }

    /// Decodes the two-element tagged form. `None` if `value` is anything else.
    pub fn from_json(value: &Value) -> Option<Self> {
        let pair = value.as_array()?;
        if pair.len() != 2 {
            return None;
        }
        let text = pair[1].as_str()?;
        match pair[0].as_str()? {
            "uuid" => Uuid::parse_str(text).ok().map(RowUuid::Real),
            "named-uuid" => Some(RowUuid::Named(text.to_string())),
            _ => None,
        }
    }
}

impl From<Uuid> for RowUuid {
    fn from(uuid: Uuid) -> Self {
        RowUuid::Real(uuid)
    }
}

impl fmt::Display for RowUuid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RowUuid::Real(uuid) => write!(f, "{}", uuid),
            RowUuid::Named(name) => write!(f, "{}", name),
        }
    }
}
