use std::collections::HashMap;

use arbor_core::{NodeId, NodeState, Vec2};

use crate::behavior::{Behavior, NodeShape};

/// Child slot(s) of a node, shaped by its [`NodeShape`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Links {
    Leaf,
    Single(Option<NodeId>),
    Many(Vec<NodeId>),
}

impl Links {
    pub fn for_shape(shape: NodeShape) -> Self {
        match shape {
            NodeShape::Root | NodeShape::Decorator => Links::Single(None),
            NodeShape::Composite => Links::Many(Vec::new()),
            NodeShape::Action => Links::Leaf,
        }
    }

    pub fn as_slice(&self) -> &[NodeId] {
        match self {
            Links::Leaf => &[],
            Links::Single(child) => child.as_slice(),
            Links::Many(children) => children,
        }
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.as_slice().contains(&id)
    }

    /// Remove the first occurrence of `id`; `false` if it was not linked.
    pub(crate) fn remove(&mut self, id: NodeId) -> bool {
        match self {
            Links::Leaf => false,
            Links::Single(child) => {
                if *child == Some(id) {
                    *child = None;
                    true
                } else {
                    false
                }
            }
            Links::Many(children) => match children.iter().position(|c| *c == id) {
                Some(index) => {
                    children.remove(index);
                    true
                }
                None => false,
            },
        }
    }
}

/// One node of a [`crate::Tree`]: identity, editor data, child slots, lifecycle state and the
/// concrete [`Behavior`].
pub struct Node {
    pub(crate) id: NodeId,
    pub(crate) position: Vec2,
    pub(crate) description: String,
    pub(crate) shape: NodeShape,
    pub(crate) type_name: &'static str,
    pub(crate) links: Links,
    pub(crate) state: NodeState,
    pub(crate) can_run: bool,
    // `None` only while the engine is running one of the behavior's hooks.
    pub(crate) behavior: Option<Box<dyn Behavior>>,
}

impl Node {
    pub(crate) fn new(id: NodeId, behavior: Box<dyn Behavior>, position: Vec2) -> Self {
        let shape = behavior.shape();
        Self {
            id,
            position,
            description: String::new(),
            shape,
            type_name: behavior.type_name(),
            links: Links::for_shape(shape),
            state: NodeState::Inactive,
            can_run: true,
            behavior: Some(behavior),
        }
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn position(&self) -> Vec2 {
        self.position
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn shape(&self) -> NodeShape {
        self.shape
    }

    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    pub fn links(&self) -> &Links {
        &self.links
    }

    pub fn children(&self) -> &[NodeId] {
        self.links.as_slice()
    }

    pub fn state(&self) -> NodeState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state == NodeState::Running
    }

    pub fn can_run(&self) -> bool {
        self.can_run
    }

    pub fn behavior(&self) -> Option<&(dyn Behavior + 'static)> {
        self.behavior.as_deref()
    }

    pub fn behavior_mut(&mut self) -> Option<&mut (dyn Behavior + 'static)> {
        self.behavior.as_deref_mut()
    }

    pub fn behavior_as<T: Behavior>(&self) -> Option<&T> {
        self.behavior()?.downcast_ref::<T>()
    }
}

impl core::fmt::Debug for Node {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Node")
            .field("id", &self.id)
            .field("type", &self.type_name)
            .field("links", &self.links)
            .field("state", &self.state)
            .finish()
    }
}

/// Flat node storage keyed by id, iterated in insertion order.
#[derive(Default)]
pub(crate) struct NodeArena {
    nodes: HashMap<NodeId, Node>,
    order: Vec<NodeId>,
}

impl NodeArena {
    pub(crate) fn len(&self) -> usize {
        self.order.len()
    }

    pub(crate) fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains_key(&id)
    }

    pub(crate) fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(&id)
    }

    pub(crate) fn get_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(&id)
    }

    pub(crate) fn insert(&mut self, node: Node) {
        let id = node.id;
        if self.nodes.insert(id, node).is_none() {
            self.order.push(id);
        }
    }

    pub(crate) fn remove(&mut self, id: NodeId) -> Option<Node> {
        let node = self.nodes.remove(&id)?;
        self.order.retain(|n| *n != id);
        Some(node)
    }

    pub(crate) fn ids(&self) -> &[NodeId] {
        &self.order
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = &Node> {
        self.order.iter().filter_map(|id| self.nodes.get(id))
    }

    pub(crate) fn parent_of(&self, child: NodeId) -> Option<NodeId> {
        self.iter()
            .find(|n| n.links.contains(child))
            .map(|n| n.id)
    }
}
