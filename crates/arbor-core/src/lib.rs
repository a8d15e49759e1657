//! Engine-agnostic primitives shared by the arbor behavior-tree runtime and editor.
//!
//! - [`Blackboard`]: the per-tree named, typed value store.
//! - [`NodeProperty`]: a node field that is either a literal or a blackboard binding.
//! - [`Context`]: typed resources injected by the embedding application.

#![cfg_attr(docsrs, feature(doc_cfg))]
#![forbid(unsafe_code)]

pub mod blackboard;
pub mod context;
pub mod error;
pub mod id;
pub mod property;
pub mod status;
pub mod tick;
pub mod value;

pub use blackboard::{Blackboard, BlackboardKey};
pub use context::Context;
pub use error::{BindError, BlackboardError};
pub use id::{KeyId, NodeId};
pub use property::{NodeProperty, PropertySlot};
pub use status::{NodeState, Status};
pub use tick::TickContext;
pub use value::{KeyValue, Value, ValueType, Vec2, Vec3};
