//! Error taxonomy for member resolution

use std::fmt;

use thiserror::Error;

use crate::backend::{ClassRef, InstanceRef};

/// Failures raised by the introspection backend itself
#[derive(Debug, Clone, Error, PartialEq)]
pub enum BackendError {
    /// Class reference is not known to the backend
    #[error("Unknown class reference: {0}")]
    UnknownClass(ClassRef),

    /// Type name or handle could not be resolved
    #[error("Unknown type: {name}")]
    UnknownType {
        /// Type name (or candidate list) that was not found
        name: String,
    },

    /// Platform or policy restriction prevented introspection
    #[error("Introspection denied for {class}: {reason}")]
    AccessDenied {
        /// Class that was being inspected
        class: String,
        /// Restriction reason
        reason: String,
    },

    /// Instance reference is dangling or foreign
    #[error("Unknown instance reference: {0}")]
    UnknownInstance(InstanceRef),

    /// Non-static member read or written without an instance
    #[error("Field {member} is not static and requires an instance")]
    InstanceRequired {
        /// Member name
        member: String,
    },

    /// Instance does not carry the member's declaring class
    #[error("Instance of {actual} has no field {member} declared by {expected}")]
    IncompatibleInstance {
        /// Member name
        member: String,
        /// Declaring class of the member
        expected: String,
        /// Class of the supplied instance
        actual: String,
    },

    /// Value cannot be stored in the member's declared type
    #[error("Cannot assign {value} to field {member} of type {expected}")]
    IncompatibleValue {
        /// Member name
        member: String,
        /// Declared type name
        expected: String,
        /// Offending value, rendered
        value: String,
    },
}

/// Last context observed before a lookup gave up
#[derive(Debug, Clone, PartialEq)]
pub enum MissReason {
    /// Target is the universal root type, nothing to scan
    EmptyScope,
    /// The scanned level declares no members at all
    NoMembers,
    /// Members existed but none passed the criteria
    Filtered,
    /// Index selector pointed past the candidate list
    IndexOutOfRange {
        /// Requested index
        index: usize,
        /// Number of candidates available
        len: usize,
    },
    /// Backend failed while enumerating or resolving a type
    Backend(BackendError),
}

impl fmt::Display for MissReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MissReason::EmptyScope => write!(f, "search scope is empty"),
            MissReason::NoMembers => write!(f, "no declared fields"),
            MissReason::Filtered => write!(f, "no field satisfied the conditions"),
            MissReason::IndexOutOfRange { index, len } => {
                write!(f, "index {} out of range for {} candidates", index, len)
            }
            MissReason::Backend(e) => write!(f, "{}", e),
        }
    }
}

/// Errors surfaced by the finder layers
#[derive(Debug, Clone, Error, PartialEq)]
pub enum FinderError {
    /// Criteria are malformed or empty
    #[error("Invalid finder spec: {reason}")]
    InvalidSpec {
        /// What is wrong with the criteria
        reason: String,
    },

    /// Resolution completed without a match
    #[error("Can't find this field in [{class}]: {reason}")]
    NotFound {
        /// Name of the target class
        class: String,
        /// Last context observed
        reason: MissReason,
    },

    /// Every alternative of a remedy plan failed
    #[error("Trying {attempts} times and all failure by RemedyPlan: {last}")]
    RemedyExhausted {
        /// Number of alternatives attempted
        attempts: usize,
        /// Error of the last alternative
        last: Box<FinderError>,
    },
}

impl FinderError {
    /// Shorthand for an [`FinderError::InvalidSpec`]
    pub fn invalid_spec(reason: impl Into<String>) -> Self {
        FinderError::InvalidSpec {
            reason: reason.into(),
        }
    }

    /// Backend failure wrapped somewhere in this error, if any
    pub fn backend_cause(&self) -> Option<&BackendError> {
        match self {
            FinderError::NotFound {
                reason: MissReason::Backend(e),
                ..
            } => Some(e),
            FinderError::RemedyExhausted { last, .. } => last.backend_cause(),
            _ => None,
        }
    }

    /// Whether this failure must be reported even when errors are suppressed
    pub fn is_backend_failure(&self) -> bool {
        self.backend_cause().is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_cause_through_not_found() {
        let err = FinderError::NotFound {
            class: "Foo".to_string(),
            reason: MissReason::Backend(BackendError::UnknownClass(ClassRef(9))),
        };
        assert!(err.is_backend_failure());
        assert_eq!(
            err.backend_cause(),
            Some(&BackendError::UnknownClass(ClassRef(9)))
        );
    }

    #[test]
    fn test_filtered_is_not_backend_failure() {
        let err = FinderError::NotFound {
            class: "Foo".to_string(),
            reason: MissReason::Filtered,
        };
        assert!(!err.is_backend_failure());
        assert!(err.to_string().contains("Foo"));
    }

    #[test]
    fn test_exhausted_keeps_last_cause() {
        let last = FinderError::NotFound {
            class: "Foo".to_string(),
            reason: MissReason::IndexOutOfRange { index: 4, len: 2 },
        };
        let err = FinderError::RemedyExhausted {
            attempts: 3,
            last: Box::new(last.clone()),
        };
        match err {
            FinderError::RemedyExhausted { attempts, last: boxed } => {
                assert_eq!(attempts, 3);
                assert_eq!(*boxed, last);
            }
            _ => panic!("expected RemedyExhausted"),
        }
    }
}
