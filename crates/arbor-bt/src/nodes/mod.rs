//! Built-in node types.

mod action;
mod composite;
mod decorator;
mod root;

pub use action::{Condition, Log, SetProperty, Wait};
pub use composite::{ReactiveSelector, ReactiveSequence, Selector, Sequence};
pub use decorator::{Failure, Succeed};
pub use root::RootNode;
