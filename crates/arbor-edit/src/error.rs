use arbor_bt::TreeError;
use arbor_core::{BindError, BlackboardError, NodeId};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EditError {
    #[error("node {0} not found")]
    NodeNotFound(NodeId),

    #[error("blackboard key '{0}' not found")]
    KeyNotFound(String),

    #[error("blackboard key '{0}' already exists")]
    DuplicateKey(String),

    #[error("blackboard key name must not be empty")]
    EmptyKeyName,

    #[error("node {node} has no property '{field}'")]
    PropertyNotFound { node: NodeId, field: String },

    #[error("the root node cannot be copied")]
    RootNotCopyable,

    #[error("nothing to undo")]
    NothingToUndo,

    #[error("nothing to redo")]
    NothingToRedo,

    #[error(transparent)]
    Bind(#[from] BindError),

    #[error(transparent)]
    Blackboard(BlackboardError),

    #[error(transparent)]
    Tree(TreeError),
}

impl From<TreeError> for EditError {
    fn from(err: TreeError) -> Self {
        match err {
            TreeError::NodeNotFound(id) => EditError::NodeNotFound(id),
            TreeError::Blackboard(err) => err.into(),
            err => EditError::Tree(err),
        }
    }
}

impl From<BlackboardError> for EditError {
    fn from(err: BlackboardError) -> Self {
        match err {
            BlackboardError::EmptyName => EditError::EmptyKeyName,
            BlackboardError::DuplicateName(name) => EditError::DuplicateKey(name),
            err => EditError::Blackboard(err),
        }
    }
}

pub type Result<T> = std::result::Result<T, EditError>;
