//! Observable events
//!
//! Events are explicit and typed.

use std::fmt;

/// Observable events raised while loading schemas and building transactions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    // Schema
    /// Database schema parsed
    SchemaLoaded,
    /// Database schema description rejected
    SchemaRejected,

    // Configuration
    /// Builder configuration loaded
    ConfigLoaded,

    // Building
    /// Operation validated and appended
    OperationQueued,
    /// Insert appended with a fresh named uuid
    InsertQueued,
    /// Operation rejected before it was appended
    OperationRejected,
    /// Another builder's operations were appended
    TransactionMerged,
    /// Params array produced for the transport
    TransactionBuilt,

    // Typed views
    /// Accessor skipped because the server schema version does not carry it
    AccessorVersionGated,

    // Resolution
    /// Named uuids mapped to real uuids
    ResolutionComplete,
    /// Result list inconsistent with the operation list (FATAL)
    ResolutionFailed,
}

impl Event {
    /// Returns the canonical event name
    pub fn as_str(&self) -> &'static str {
        match self {
            Event::SchemaLoaded => "SCHEMA_LOADED",
            Event::SchemaRejected => "SCHEMA_REJECTED",
            Event::ConfigLoaded => "CONFIG_LOADED",
            Event::OperationQueued => "OPERATION_QUEUED",
            Event::InsertQueued => "INSERT_QUEUED",
            Event::OperationRejected => "OPERATION_REJECTED",
            Event::TransactionMerged => "TRANSACTION_MERGED",
            Event::TransactionBuilt => "TRANSACTION_BUILT",
            Event::AccessorVersionGated => "ACCESSOR_VERSION_GATED",
            Event::ResolutionComplete => "RESOLUTION_COMPLETE",
            Event::ResolutionFailed => "RESOLUTION_FAILED",
        }
    }

    /// Returns whether this event is fatal for the transaction it belongs to
    pub fn is_fatal(&self) -> bool {
        matches!(self, Event::ResolutionFailed)
    }

    /// Returns whether this event reports a rejection
    pub fn is_rejection(&self) -> bool {
        matches!(self, Event::SchemaRejected | Event::OperationRejected)
    }

    /// Returns whether this event is emitted once per operation
    pub fn is_per_operation(&self) -> bool {
        matches!(
            self,
            Event::OperationQueued | Event::InsertQueued | Event::AccessorVersionGated
        )
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_names_are_screaming_snake() {
        let events = [
            Event::SchemaLoaded,
            Event::InsertQueued,
            Event::ResolutionFailed,
            Event::AccessorVersionGated,
        ];
        for event in events {
            let name = event.as_str();
            assert!(name.chars().all(|c| c.is_ascii_uppercase() || c == '_'));
        }
    }

    #[test]
    fn test_only_resolution_failure_is_fatal() {
        assert!(Event::ResolutionFailed.is_fatal());
        assert!(!Event::OperationRejected.is_fatal());
        assert!(!Event::ResolutionComplete.is_fatal());
    }
}
