//! Error types produced while comparing or collecting embedding records.

use thiserror::Error;

use crate::embedded::EmbeddedInfo;

/// Error returned when a comparison receives something that is not an
/// [`EmbeddedInfo`].
///
/// The statically typed query methods cannot fail; this only surfaces through
/// [`EmbeddedInfo::compare_dyn`] where the other operand is type-erased.
///
/// # Examples
///
/// ```
/// use femora_embed::{ComparisonError, EmbeddedInfo};
///
/// let info = EmbeddedInfo::new([1, 2], 0, Vec::<(Vec<i64>, Vec<i64>)>::new());
/// let error = info.compare_dyn(&42_u32).expect_err("integers are rejected");
/// assert_eq!(error, ComparisonError::TypeMismatch);
/// ```
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
pub enum ComparisonError {
    /// Returned when the other operand has a different type.
    #[error("cannot compare an embedding record with a value of another type")]
    TypeMismatch,
}

/// Error returned by [`EmbeddingRegistry`](crate::EmbeddingRegistry).
#[derive(Debug, Error, PartialEq)]
pub enum RegistryError {
    /// Returned under [`ConflictPolicy::Reject`](crate::ConflictPolicy::Reject)
    /// when an incoming record collides with a stored one.
    #[error("record {incoming} conflicts with stored record {existing}")]
    Conflict {
        /// The record that was refused.
        incoming: Box<EmbeddedInfo>,
        /// The stored record it collides with.
        existing: Box<EmbeddedInfo>,
    },
    /// Returned when a conflict policy name cannot be parsed.
    #[error("unknown conflict policy {0:?} (expected \"reject\" or \"skip\")")]
    UnknownPolicy(String),
}
