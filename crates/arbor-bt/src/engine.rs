//! Node lifecycle state machine and depth-first tick propagation.

use std::borrow::Cow;

use arbor_core::{Blackboard, Context, NodeId, NodeState, Status, TickContext};
use arbor_tools::{emit as trace_emit, TraceEvent};
use tracing::{debug, warn};

use crate::node::NodeArena;

pub(crate) struct Runtime<'a> {
    pub(crate) nodes: &'a mut NodeArena,
    pub(crate) blackboard: &'a mut Blackboard,
    pub(crate) context: &'a mut Context,
    pub(crate) tick: TickContext,
}

impl Runtime<'_> {
    fn reborrow(&mut self) -> Runtime<'_> {
        Runtime {
            nodes: &mut *self.nodes,
            blackboard: &mut *self.blackboard,
            context: &mut *self.context,
            tick: self.tick,
        }
    }
}

/// What a [`Behavior`](crate::Behavior) hook can see and touch: the tick clock, the tree's
/// blackboard, the injected context and its own children.
pub struct Scope<'a> {
    node: NodeId,
    rt: Runtime<'a>,
}

impl<'a> Scope<'a> {
    fn new(node: NodeId, rt: Runtime<'a>) -> Self {
        Self { node, rt }
    }

    /// Id of the node whose hook is running.
    pub fn node(&self) -> NodeId {
        self.node
    }

    pub fn tick(&self) -> TickContext {
        self.rt.tick
    }

    pub fn blackboard(&self) -> &Blackboard {
        &*self.rt.blackboard
    }

    pub fn blackboard_mut(&mut self) -> &mut Blackboard {
        &mut *self.rt.blackboard
    }

    pub fn context(&self) -> &Context {
        &*self.rt.context
    }

    pub fn context_mut(&mut self) -> &mut Context {
        &mut *self.rt.context
    }

    pub fn child_count(&self) -> usize {
        self.rt
            .nodes
            .get(self.node)
            .map(|n| n.children().len())
            .unwrap_or(0)
    }

    pub fn child_id(&self, index: usize) -> Option<NodeId> {
        self.rt.nodes.get(self.node)?.children().get(index).copied()
    }

    pub fn child_state(&self, index: usize) -> NodeState {
        self.child_id(index)
            .and_then(|id| self.rt.nodes.get(id))
            .map(|n| n.state)
            .unwrap_or_default()
    }

    /// Update the child at `index`. A missing child is a `Failure`.
    pub fn update_child(&mut self, index: usize) -> Status {
        match self.child_id(index) {
            Some(child) => update(&mut self.rt, child),
            None => Status::Failure,
        }
    }

    /// Stop the child at `index` (and its running descendants) if it is running.
    pub fn abort_child(&mut self, index: usize) {
        if let Some(child) = self.child_id(index) {
            abort(&mut self.rt, child);
        }
    }

    /// This node's children in order, as of now. Edits between ticks may reorder them.
    pub fn child_ids(&self) -> Vec<NodeId> {
        self.rt
            .nodes
            .get(self.node)
            .map(|n| n.children().to_vec())
            .unwrap_or_default()
    }

    pub fn has_child(&self, child: NodeId) -> bool {
        self.rt
            .nodes
            .get(self.node)
            .is_some_and(|n| n.links.contains(child))
    }

    /// Update `child`. A node that is not a child of this one is a `Failure`.
    pub fn update_child_by_id(&mut self, child: NodeId) -> Status {
        if !self.has_child(child) {
            return Status::Failure;
        }
        update(&mut self.rt, child)
    }

    /// Stop `child` if it is still one of this node's children and running.
    pub fn abort_child_by_id(&mut self, child: NodeId) {
        if self.has_child(child) {
            abort(&mut self.rt, child);
        }
    }

    /// Record a trace event for this node.
    pub fn trace(&mut self, tag: impl Into<Cow<'static, str>>) {
        trace_emit(
            &mut *self.rt.context,
            TraceEvent::new(self.rt.tick.tick, tag).with_node(self.node),
        );
    }
}

/// `update` contract: start if inactive, update, and stop on `Success`/`Failure`.
///
/// A node that settles aborts any child still running before its own `on_stop`, so no
/// descendant stays active under an inactive ancestor.
pub(crate) fn update(rt: &mut Runtime<'_>, id: NodeId) -> Status {
    let Some(node) = rt.nodes.get_mut(id) else {
        warn!(node = %id, "update of unknown node");
        return Status::Failure;
    };
    let Some(mut behavior) = node.behavior.take() else {
        warn!(node = %id, "node re-entered during its own update");
        return Status::Failure;
    };
    let starting = node.state == NodeState::Inactive;
    let can_run = node.can_run;
    node.state = NodeState::Running;

    let status = {
        let mut scope = Scope::new(id, rt.reborrow());
        if starting {
            behavior.on_start(&mut scope);
            scope.trace("node.start");
        }
        if can_run {
            behavior.on_update(&mut scope)
        } else {
            Status::Failure
        }
    };

    if status.is_settled() {
        abort_children(rt, id);
        let mut scope = Scope::new(id, rt.reborrow());
        behavior.on_stop(&mut scope);
        scope.trace("node.stop");
    }

    if let Some(node) = rt.nodes.get_mut(id) {
        if status.is_settled() {
            node.state = NodeState::Inactive;
        }
        node.behavior = Some(behavior);
    }
    status
}

/// Stop a running node: running descendants first, then its own `on_stop`, exactly once.
pub(crate) fn abort(rt: &mut Runtime<'_>, id: NodeId) {
    let Some(node) = rt.nodes.get_mut(id) else {
        return;
    };
    if node.state != NodeState::Running {
        return;
    }
    let Some(mut behavior) = node.behavior.take() else {
        warn!(node = %id, "abort requested while the node is updating; ignored");
        return;
    };

    abort_children(rt, id);
    {
        let mut scope = Scope::new(id, rt.reborrow());
        behavior.on_stop(&mut scope);
        scope.trace("node.abort");
    }

    if let Some(node) = rt.nodes.get_mut(id) {
        node.state = NodeState::Inactive;
        node.behavior = Some(behavior);
    }
}

fn abort_children(rt: &mut Runtime<'_>, id: NodeId) {
    let children = rt
        .nodes
        .get(id)
        .map(|n| n.children().to_vec())
        .unwrap_or_default();
    for child in children {
        abort(rt, child);
    }
}

/// Run `on_init` for one node and record whether it can run.
pub(crate) fn init(rt: &mut Runtime<'_>, id: NodeId) {
    let Some(mut behavior) = rt.nodes.get_mut(id).and_then(|n| n.behavior.take()) else {
        return;
    };
    let can_run = {
        let mut scope = Scope::new(id, rt.reborrow());
        behavior.on_init(&mut scope)
    };
    if !can_run {
        debug!(node = %id, "node marked non-runnable by on_init");
    }
    if let Some(node) = rt.nodes.get_mut(id) {
        node.can_run = can_run;
        node.behavior = Some(behavior);
    }
}
