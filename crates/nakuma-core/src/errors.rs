//! Validation errors raised before anything touches persistence.

use crate::room::EntityKind;

/// A message or one of its fields failed validation.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum DomainError {
    /// The entity ID the message is keyed by is missing or empty.
    #[error("{kind} edit is missing its id")]
    MissingId {
        /// Which entity the edit targeted.
        kind: EntityKind,
    },

    /// A view group-by names a column issues cannot be grouped on.
    #[error("unknown group-by dimension: {0}")]
    UnknownDimension(String),

    /// A date field is neither `YYYY-MM-DD` nor RFC 3339.
    #[error("invalid {field}: {value}")]
    InvalidDate {
        /// Field name.
        field: &'static str,
        /// Rejected input.
        value: String,
    },

    /// `end_date` falls before `start_date`.
    #[error("end date {end} is before start date {start}")]
    InvertedDateRange {
        /// Submitted start.
        start: String,
        /// Submitted end.
        end: String,
    },
}
