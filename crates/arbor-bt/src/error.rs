use arbor_core::{BlackboardError, KeyId, NodeId};
use thiserror::Error;

/// Errors raised by structural tree operations and document loading.
#[derive(Debug, Error)]
pub enum TreeError {
    #[error("unknown node type '{0}'")]
    UnknownNodeType(String),

    #[error("node {0} not found")]
    NodeNotFound(NodeId),

    #[error("a tree has exactly one root node")]
    SecondRoot,

    #[error("the root node cannot be removed")]
    RootNotRemovable,

    #[error("node {0} cannot have children")]
    NotAParent(NodeId),

    #[error("the root node cannot be a child")]
    RootAsChild,

    #[error("node {0} cannot be its own child")]
    SelfLink(NodeId),

    #[error("linking {child} under {parent} would create a cycle")]
    Cycle { parent: NodeId, child: NodeId },

    #[error("node {0} appears more than once")]
    DuplicateNode(NodeId),

    #[error("root node {0} is missing from the node list")]
    MissingRoot(NodeId),

    #[error("root reference {0} is not a root node")]
    NotARoot(NodeId),

    #[error("node {0} has more children than its slot holds")]
    TooManyChildren(NodeId),

    #[error("node {parent} references unknown child {child}")]
    DanglingChild { parent: NodeId, child: NodeId },

    #[error("node {0} is owned by more than one parent")]
    SharedChild(NodeId),

    #[error("blackboard key id {0} is used by more than one key")]
    DuplicateKey(KeyId),

    #[error("invalid fields for node type '{type_name}': {source}")]
    Fields {
        type_name: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("malformed tree document: {0}")]
    Document(#[from] serde_json::Error),

    #[error("blackboard: {0}")]
    Blackboard(#[from] BlackboardError),
}

pub type Result<T> = std::result::Result<T, TreeError>;
