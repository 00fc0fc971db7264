//! Observability for schema loading and transaction building
//!
//! Structured JSON log lines only. Logging is read-only: it never changes
//! what a builder produces and never fails the caller.
//!
//! # Usage
//!
//! ```ignore
//! use ovsdb_txn::observability::{log_event_with_fields, Event, Logger, Severity};
//!
//! Logger::set_min_severity(Severity::Trace);
//! log_event_with_fields(Event::InsertQueued, &[("table", "Bridge"), ("uuid-name", "row1")]);
//! ```

mod events;
mod logger;

pub use events::Event;
pub use logger::{Logger, Severity};

/// Severity an event is logged at when the caller does not pick one
pub fn default_severity(event: Event) -> Severity {
    if event.is_fatal() {
        Severity::Fatal
    } else if event.is_rejection() {
        Severity::Warn
    } else if event.is_per_operation() {
        Severity::Trace
    } else {
        Severity::Info
    }
}

/// Log a lifecycle event
pub fn log_event(event: Event) {
    Logger::log(default_severity(event), event.as_str(), &[]);
}

/// Log a lifecycle event with fields
pub fn log_event_with_fields(event: Event, fields: &[(&str, &str)]) {
    Logger::log(default_severity(event), event.as_str(), fields);
}
