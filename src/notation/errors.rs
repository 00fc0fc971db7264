//! Value-level error types

use thiserror::Error;

/// Result type for value validation
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Malformed version text
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormatError {
    /// Fewer than two '.' separators
    #[error("<{0}> does not match format <digits>.<digits>.<digits>")]
    MissingSeparator(String),

    /// A segment without any digit
    #[error("<{text}> has an empty {segment} segment")]
    EmptySegment { text: String, segment: &'static str },

    /// A non-digit inside the major or minor segment
    #[error("<{text}>: not a digit: '{character}'")]
    NotADigit { text: String, character: char },

    /// A segment that does not fit in 32 bits
    #[error("<{text}>: {segment} segment out of range")]
    Overflow { text: String, segment: &'static str },
}

/// Value shape rejected against the declared column type
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// Atom given for a set column, set for a map column, ...
    #[error("column '{column}': expected {expected} value, got {actual}")]
    KindMismatch {
        column: String,
        expected: &'static str,
        actual: &'static str,
    },

    /// Atom of the wrong base type
    #[error("column '{column}': expected {expected} atom, got {actual}")]
    BaseTypeMismatch {
        column: String,
        expected: &'static str,
        actual: &'static str,
    },

    /// Set or map size outside the declared bounds
    #[error("column '{column}': {len} elements outside [{min}, {max}]")]
    Cardinality {
        column: String,
        len: usize,
        min: u64,
        max: String,
    },

    /// Update or mutate on a column the server declares immutable
    #[error("column '{column}' is immutable")]
    ImmutableColumn { column: String },

    /// Mutator verb not applicable to the column
    #[error("column '{column}': mutator '{mutator}' not applicable to {kind}")]
    BadMutator {
        column: String,
        mutator: &'static str,
        kind: String,
    },

    /// Condition function not applicable to the column
    #[error("column '{column}': function '{function}' not applicable to {kind}")]
    BadFunction {
        column: String,
        function: &'static str,
        kind: String,
    },

    /// Named uuid referenced but not declared by any insert in the batch
    #[error("named uuid '{0}' is not declared by any insert in this transaction")]
    UndeclaredNamedUuid(String),

    /// Two inserts in one batch declaring the same `uuid-name`
    #[error("named uuid '{0}' is declared twice in this transaction")]
    DuplicateNamedUuid(String),

    /// Column stored under a row key other than its own name
    #[error("column '{column}' cannot be stored under key '{key}'")]
    MisplacedColumn { key: String, column: String },

    /// Text that is not a protocol identifier
    #[error("'{0}' is not a valid identifier")]
    InvalidIdentifier(String),

    /// Encoded value that cannot be decoded for the column
    #[error("column '{column}': cannot decode {json}")]
    Undecodable { column: String, json: String },
}

impl ValidationError {
    /// Returns the column the error refers to, if any
    pub fn column(&self) -> Option<&str> {
        match self {
            ValidationError::KindMismatch { column, .. }
            | ValidationError::BaseTypeMismatch { column, .. }
            | ValidationError::Cardinality { column, .. }
            | ValidationError::ImmutableColumn { column }
            | ValidationError::BadMutator { column, .. }
            | ValidationError::BadFunction { column, .. }
            | ValidationError::Undecodable { column, .. }
            | ValidationError::MisplacedColumn { column, .. } => Some(column),
            ValidationError::UndeclaredNamedUuid(_)
            | ValidationError::DuplicateNamedUuid(_)
            | ValidationError::InvalidIdentifier(_) => None,
        }
    }
}
