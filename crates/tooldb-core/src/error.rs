use std::fmt;
use thiserror::Error as ThisError;

///
/// InternalError
///
/// Structured runtime error with a stable class + origin classification.
/// Every failure in the core surfaces as one of these; nothing is retried.
///

#[derive(Debug, ThisError)]
#[error("{message}")]
pub struct InternalError {
    pub class: ErrorClass,
    pub origin: ErrorOrigin,
    pub message: String,
}

impl InternalError {
    pub fn new(class: ErrorClass, origin: ErrorOrigin, message: impl Into<String>) -> Self {
        Self {
            class,
            origin,
            message: message.into(),
        }
    }

    /// Construct a uniqueness violation raised by the constraint layer.
    pub(crate) fn duplicate_key(path: &str, index: &str, values: &str) -> Self {
        Self::new(
            ErrorClass::DuplicateKey,
            ErrorOrigin::Constraint,
            format!("unique constraint violation: {path} {index} = ({values})"),
        )
    }

    /// Construct a foreign-key miss raised by the constraint layer.
    pub(crate) fn dangling_reference(path: &str, field: &str, target: &str, key: u64) -> Self {
        Self::new(
            ErrorClass::DanglingReference,
            ErrorOrigin::Constraint,
            format!("dangling reference: {path}.{field} -> {target}#{key} does not exist"),
        )
    }

    /// Construct a record-rule violation raised by the constraint layer.
    pub(crate) fn constraint_violation(message: impl Into<String>) -> Self {
        Self::new(
            ErrorClass::ConstraintViolation,
            ErrorOrigin::Constraint,
            message,
        )
    }

    pub fn store_not_found(key: impl fmt::Display) -> Self {
        Self::new(
            ErrorClass::NotFound,
            ErrorOrigin::Store,
            format!("data key not found: {key}"),
        )
    }

    pub(crate) fn resolve_not_found(key: u64) -> Self {
        Self::new(
            ErrorClass::NotFound,
            ErrorOrigin::Resolve,
            format!("id {key} matches no geometry group, offset or geometry"),
        )
    }

    /// Construct the error returned by declared-but-unimplemented operations.
    pub(crate) fn session_unsupported(operation: &str) -> Self {
        Self::new(
            ErrorClass::Unsupported,
            ErrorOrigin::Session,
            format!("operation '{operation}' is not implemented"),
        )
    }

    pub(crate) fn commit_failure(message: impl Into<String>) -> Self {
        Self::new(ErrorClass::CommitFailure, ErrorOrigin::Commit, message)
    }

    pub(crate) fn store_corruption(message: impl Into<String>) -> Self {
        Self::new(ErrorClass::Corruption, ErrorOrigin::Store, message)
    }

    pub(crate) fn resolve_corruption(message: impl Into<String>) -> Self {
        Self::new(ErrorClass::Corruption, ErrorOrigin::Resolve, message)
    }

    pub(crate) fn commit_internal(message: impl Into<String>) -> Self {
        Self::new(ErrorClass::Internal, ErrorOrigin::Commit, message)
    }

    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self.class, ErrorClass::NotFound)
    }

    #[must_use]
    pub const fn is_duplicate_key(&self) -> bool {
        matches!(self.class, ErrorClass::DuplicateKey)
    }

    #[must_use]
    pub fn display_with_class(&self) -> String {
        format!("{}:{}: {}", self.origin, self.class, self.message)
    }
}

///
/// ErrorClass
/// Error taxonomy for callers. Constraint failures never reach the store.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ErrorClass {
    DuplicateKey,
    DanglingReference,
    NotFound,
    CommitFailure,
    Unsupported,
    ConstraintViolation,
    Corruption,
    Internal,
}

impl fmt::Display for ErrorClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::DuplicateKey => "duplicate_key",
            Self::DanglingReference => "dangling_reference",
            Self::NotFound => "not_found",
            Self::CommitFailure => "commit_failure",
            Self::Unsupported => "unsupported",
            Self::ConstraintViolation => "constraint_violation",
            Self::Corruption => "corruption",
            Self::Internal => "internal",
        };
        write!(f, "{label}")
    }
}

///
/// ErrorOrigin
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ErrorOrigin {
    Backend,
    Commit,
    Constraint,
    Resolve,
    Serialize,
    Session,
    Store,
}

impl fmt::Display for ErrorOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Backend => "backend",
            Self::Commit => "commit",
            Self::Constraint => "constraint",
            Self::Resolve => "resolve",
            Self::Serialize => "serialize",
            Self::Session => "session",
            Self::Store => "store",
        };
        write!(f, "{label}")
    }
}
