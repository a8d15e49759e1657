//! Behavior tree runtime built on `arbor-core`.
//!
//! A [`Tree`] owns a flat arena of nodes (one [`RootNode`] plus any number of decorators,
//! composites and actions), a [`Blackboard`](arbor_core::Blackboard) and the injected
//! [`Context`](arbor_core::Context). Ticking the tree updates the root, which propagates
//! depth-first through [`Scope::update_child`].

#![cfg_attr(docsrs, feature(doc_cfg))]
#![forbid(unsafe_code)]

pub mod behavior;
pub mod document;
mod engine;
pub mod error;
pub mod node;
pub mod nodes;
pub mod registry;
pub mod tree;

pub use behavior::{AsAny, Behavior, CopyReport, NodeShape};
pub use document::{NodeRecord, TreeDocument};
pub use engine::Scope;
pub use error::{Result, TreeError};
pub use node::{Links, Node};
pub use nodes::{
    Condition, Failure, Log, ReactiveSelector, ReactiveSequence, RootNode, Selector, Sequence,
    SetProperty, Succeed, Wait,
};
pub use registry::NodeRegistry;
pub use tree::{Tree, ViewTransform};
