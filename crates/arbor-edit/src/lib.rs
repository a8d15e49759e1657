//! Structural edit model for arbor trees.
//!
//! [`TreeEditor`] is the only path that mutates a tree's shape, node fields and blackboard
//! once it is being edited. Edits run inside a [`Batch`]: they apply immediately, and the
//! batch's commit notifies [`EditListener`]s once and records one undo step.

#![forbid(unsafe_code)]

mod batch;
mod change;
mod editor;
mod error;
mod history;
mod settings;

pub use batch::{Batch, NodeCopy};
pub use change::{Change, ChangeSet, Deletion, EditListener, ListenerId};
pub use editor::TreeEditor;
pub use error::{EditError, Result};
pub use settings::EditorSettings;
