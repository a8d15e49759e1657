use thiserror::Error;

use crate::{KeyId, ValueType};

/// Binding a property to a key failed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BindError {
    #[error("cannot bind {property} property to key '{key}' of type {actual}")]
    TypeMismatch {
        key: String,
        property: ValueType,
        actual: ValueType,
    },
}

/// A blackboard mutation or value conversion was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BlackboardError {
    #[error("unknown value type '{0}'")]
    UnknownType(String),

    #[error("type mismatch: expected {expected}, got {actual}")]
    TypeMismatch {
        expected: ValueType,
        actual: ValueType,
    },

    #[error("no blackboard key with id {0}")]
    MissingKey(KeyId),

    #[error("blackboard key name must not be empty")]
    EmptyName,

    #[error("blackboard key '{0}' already exists")]
    DuplicateName(String),
}
