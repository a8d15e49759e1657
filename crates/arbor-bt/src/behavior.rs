use std::any::Any;

use arbor_core::{PropertySlot, Status};

use crate::engine::Scope;

/// The four node variants. The shape fixes how many children a node may hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeShape {
    /// Single overwritable child slot; exactly one per tree.
    Root,
    /// Single child slot whose result it may transform.
    Decorator,
    /// Ordered children and a selection policy.
    Composite,
    /// Leaf.
    Action,
}

impl NodeShape {
    pub fn accepts_children(self) -> bool {
        !matches!(self, NodeShape::Action)
    }

    pub fn single_child(self) -> bool {
        matches!(self, NodeShape::Root | NodeShape::Decorator)
    }
}

/// Upcast helper so `dyn Behavior` can be downcast to its concrete type.
pub trait AsAny {
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<T: Any> AsAny for T {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// Concrete node logic.
///
/// The engine drives the lifecycle; implementations never call their own hooks:
/// - `on_init` once each time the tree is bound to a context. Returning `false` marks the
///   node non-runnable: it still starts and stops, but every update fails.
/// - `on_start` when an inactive node is updated.
/// - `on_update` on every update; `Running` keeps the node active.
/// - `on_stop` exactly once after the node settles or is aborted.
///
/// Decorators and composites reach their children only through [`Scope`]: by position
/// ([`Scope::update_child`]) or by id ([`Scope::update_child_by_id`]). Edits between ticks can
/// reorder children, so state kept across ticks should name children by id.
pub trait Behavior: AsAny + 'static {
    /// Stable type tag used by [`crate::NodeRegistry`] and persisted documents.
    fn type_name(&self) -> &'static str;

    fn shape(&self) -> NodeShape;

    fn on_init(&mut self, _scope: &mut Scope<'_>) -> bool {
        true
    }

    fn on_start(&mut self, _scope: &mut Scope<'_>) {}

    fn on_stop(&mut self, _scope: &mut Scope<'_>) {}

    fn on_update(&mut self, scope: &mut Scope<'_>) -> Status;

    /// Named [`NodeProperty`](arbor_core::NodeProperty) fields.
    fn properties(&self) -> Vec<(&'static str, &dyn PropertySlot)> {
        Vec::new()
    }

    fn properties_mut(&mut self) -> Vec<(&'static str, &mut dyn PropertySlot)> {
        Vec::new()
    }

    /// Field-by-field copy for a new node.
    ///
    /// Value fields are copied, property bindings are shared (cloning a `NodeProperty` does
    /// both). Fields that cannot be duplicated are left at their default and named in `report`.
    /// Runtime progress (indices, timers) is not copied.
    fn duplicate(&self, report: &mut CopyReport) -> Box<dyn Behavior>;

    /// Persisted fields, loaded back through the registry.
    fn save(&self) -> serde_json::Result<serde_json::Value>;
}

impl dyn Behavior {
    pub fn downcast_ref<T: Behavior>(&self) -> Option<&T> {
        self.as_any().downcast_ref::<T>()
    }

    pub fn downcast_mut<T: Behavior>(&mut self) -> Option<&mut T> {
        self.as_any_mut().downcast_mut::<T>()
    }

    pub fn property(&self, field: &str) -> Option<&dyn PropertySlot> {
        self.properties()
            .into_iter()
            .find_map(|(name, slot)| (name == field).then_some(slot))
    }

    pub fn property_mut(&mut self, field: &str) -> Option<&mut dyn PropertySlot> {
        self.properties_mut()
            .into_iter()
            .find_map(|(name, slot)| (name == field).then_some(slot))
    }
}

/// Fields a [`Behavior::duplicate`] call could not carry over.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CopyReport {
    degraded: Vec<String>,
}

impl CopyReport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that `field` was reset to its default in the copy.
    pub fn degraded(&mut self, field: impl Into<String>) {
        self.degraded.push(field.into());
    }

    pub fn is_clean(&self) -> bool {
        self.degraded.is_empty()
    }

    pub fn fields(&self) -> &[String] {
        &self.degraded
    }

    pub fn into_fields(self) -> Vec<String> {
        self.degraded
    }
}
