use std::collections::{HashMap, HashSet};

use arbor_core::{Blackboard, Context, NodeId, Status, TickContext, Vec2, Vec3};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::behavior::{Behavior, NodeShape};
use crate::document::{NodeRecord, TreeDocument};
use crate::engine::{self, Runtime};
use crate::error::{Result, TreeError};
use crate::node::{Links, Node, NodeArena};
use crate::nodes::RootNode;
use crate::registry::NodeRegistry;

/// Editor pan and zoom. Persisted with the tree; no execution meaning.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ViewTransform {
    pub position: Vec3,
    pub scale: Vec3,
}

impl Default for ViewTransform {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            scale: Vec3::ONE,
        }
    }
}

/// A behavior tree: one root, a flat node collection, a blackboard and the injected context.
///
/// Structural primitives here keep the shape invariants (single root, acyclic, no shared
/// child) and abort running nodes they detach. They do not notify anyone; editors wrap them.
pub struct Tree {
    root: NodeId,
    nodes: NodeArena,
    blackboard: Blackboard,
    context: Context,
    view: ViewTransform,
    initialized: bool,
    last_tick: TickContext,
}

impl Default for Tree {
    fn default() -> Self {
        Self::new()
    }
}

impl Tree {
    /// Empty tree holding only its [`RootNode`].
    pub fn new() -> Self {
        let root = NodeId::new();
        let mut nodes = NodeArena::default();
        nodes.insert(Node::new(root, Box::new(RootNode), Vec2::ZERO));
        Self {
            root,
            nodes,
            blackboard: Blackboard::new(),
            context: Context::new(),
            view: ViewTransform::default(),
            initialized: false,
            last_tick: TickContext::default(),
        }
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id)
    }

    /// All nodes in insertion order, root first.
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.iter()
    }

    pub fn node_ids(&self) -> &[NodeId] {
        self.nodes.ids()
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains(id)
    }

    pub fn blackboard(&self) -> &Blackboard {
        &self.blackboard
    }

    pub fn blackboard_mut(&mut self) -> &mut Blackboard {
        &mut self.blackboard
    }

    pub fn context(&self) -> &Context {
        &self.context
    }

    pub fn context_mut(&mut self) -> &mut Context {
        &mut self.context
    }

    pub fn view(&self) -> ViewTransform {
        self.view
    }

    pub fn set_view(&mut self, view: ViewTransform) {
        self.view = view;
    }

    pub fn is_bound(&self) -> bool {
        self.initialized
    }

    pub fn parent_of(&self, child: NodeId) -> Option<NodeId> {
        self.nodes.parent_of(child)
    }

    /// Children of `id`; empty for leaves and unknown ids.
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.nodes.get(id).map(Node::children).unwrap_or(&[])
    }

    /// Every parent-to-child link, parents in insertion order.
    pub fn edges(&self) -> Vec<(NodeId, NodeId)> {
        self.nodes
            .iter()
            .flat_map(|n| n.children().iter().map(move |c| (n.id, *c)))
            .collect()
    }

    pub fn is_reachable(&self, id: NodeId) -> bool {
        self.subtree_contains(self.root, id)
    }

    /// Non-root nodes without a parent.
    pub fn orphans(&self) -> Vec<NodeId> {
        let linked: HashSet<NodeId> = self.edges().into_iter().map(|(_, c)| c).collect();
        self.nodes
            .ids()
            .iter()
            .copied()
            .filter(|id| *id != self.root && !linked.contains(id))
            .collect()
    }

    fn subtree_contains(&self, from: NodeId, target: NodeId) -> bool {
        let mut stack = vec![from];
        let mut seen = HashSet::new();
        while let Some(id) = stack.pop() {
            if id == target {
                return true;
            }
            if seen.insert(id) {
                stack.extend_from_slice(self.children(id));
            }
        }
        false
    }

    fn runtime(&mut self) -> Runtime<'_> {
        Runtime {
            nodes: &mut self.nodes,
            blackboard: &mut self.blackboard,
            context: &mut self.context,
            tick: self.last_tick,
        }
    }

    /// Attach a live context and run `on_init` on every node.
    ///
    /// A running tree is aborted first. Returns the previously bound context.
    pub fn bind(&mut self, context: Context) -> Context {
        self.abort_all();
        let previous = std::mem::replace(&mut self.context, context);
        self.initialize();
        previous
    }

    fn initialize(&mut self) {
        let ids = self.nodes.ids().to_vec();
        let mut rt = self.runtime();
        for id in ids {
            engine::init(&mut rt, id);
        }
        self.initialized = true;
        debug!(nodes = self.nodes.len(), "tree bound");
    }

    /// Update the root once. Binds an empty context on first use if [`Tree::bind`] was never
    /// called.
    pub fn tick(&mut self, tick: TickContext) -> Status {
        if !self.initialized {
            self.initialize();
        }
        self.last_tick = tick;
        let root = self.root;
        engine::update(&mut self.runtime(), root)
    }

    /// Abort `id` and its running descendants.
    pub fn abort(&mut self, id: NodeId) -> Result<()> {
        if !self.nodes.contains(id) {
            return Err(TreeError::NodeNotFound(id));
        }
        engine::abort(&mut self.runtime(), id);
        Ok(())
    }

    fn abort_all(&mut self) {
        let running: Vec<NodeId> = self
            .nodes
            .iter()
            .filter(|n| n.is_running() && self.nodes.parent_of(n.id).is_none())
            .map(|n| n.id)
            .collect();
        let mut rt = self.runtime();
        for id in running {
            engine::abort(&mut rt, id);
        }
    }

    /// Add a parentless node. A second root is rejected.
    pub fn insert_node(&mut self, behavior: Box<dyn Behavior>, position: Vec2) -> Result<NodeId> {
        self.insert_with_id(NodeId::new(), behavior, position)
    }

    pub(crate) fn insert_with_id(
        &mut self,
        id: NodeId,
        behavior: Box<dyn Behavior>,
        position: Vec2,
    ) -> Result<NodeId> {
        if behavior.shape() == NodeShape::Root {
            return Err(TreeError::SecondRoot);
        }
        if self.nodes.contains(id) {
            return Err(TreeError::DuplicateNode(id));
        }
        self.nodes.insert(Node::new(id, behavior, position));
        if self.initialized {
            engine::init(&mut self.runtime(), id);
        }
        Ok(id)
    }

    /// Delete a node: abort it, sever it from its parent and drop it. Its children stay in the
    /// tree as orphans.
    pub fn remove_node(&mut self, id: NodeId) -> Result<Node> {
        if id == self.root {
            return Err(TreeError::RootNotRemovable);
        }
        if !self.nodes.contains(id) {
            return Err(TreeError::NodeNotFound(id));
        }
        engine::abort(&mut self.runtime(), id);
        if let Some(parent) = self.nodes.parent_of(id).and_then(|p| self.nodes.get_mut(p)) {
            parent.links.remove(id);
        }
        self.nodes.remove(id).ok_or(TreeError::NodeNotFound(id))
    }

    /// Link `child` under `parent`.
    ///
    /// Single slots are overwritten and the displaced child (aborted if running) is returned.
    /// Composites append. A child with another parent is detached (and aborted) first.
    pub fn link(&mut self, parent: NodeId, child: NodeId) -> Result<Option<NodeId>> {
        let parent_shape = self
            .nodes
            .get(parent)
            .ok_or(TreeError::NodeNotFound(parent))?
            .shape;
        if !self.nodes.contains(child) {
            return Err(TreeError::NodeNotFound(child));
        }
        if parent == child {
            return Err(TreeError::SelfLink(child));
        }
        if child == self.root {
            return Err(TreeError::RootAsChild);
        }
        if !parent_shape.accepts_children() {
            return Err(TreeError::NotAParent(parent));
        }
        if self.subtree_contains(child, parent) {
            return Err(TreeError::Cycle { parent, child });
        }

        let previous_parent = self.nodes.parent_of(child);
        if previous_parent == Some(parent) && parent_shape.single_child() {
            return Ok(None);
        }
        if let Some(old) = previous_parent {
            if let Some(node) = self.nodes.get_mut(old) {
                node.links.remove(child);
            }
            if old != parent {
                engine::abort(&mut self.runtime(), child);
            }
        }

        let node = self
            .nodes
            .get_mut(parent)
            .ok_or(TreeError::NodeNotFound(parent))?;
        let displaced = match &mut node.links {
            Links::Single(slot) => slot.replace(child),
            Links::Many(children) => {
                children.push(child);
                None
            }
            Links::Leaf => return Err(TreeError::NotAParent(parent)),
        };
        if let Some(old) = displaced {
            engine::abort(&mut self.runtime(), old);
        }
        Ok(displaced)
    }

    /// Remove `child` from `parent`'s slot(s), aborting it first. `false` if it was not there.
    pub fn unlink(&mut self, parent: NodeId, child: NodeId) -> Result<bool> {
        let linked = self
            .nodes
            .get(parent)
            .ok_or(TreeError::NodeNotFound(parent))?
            .links
            .contains(child);
        if !self.nodes.contains(child) {
            return Err(TreeError::NodeNotFound(child));
        }
        if !linked {
            return Ok(false);
        }
        engine::abort(&mut self.runtime(), child);
        Ok(self
            .nodes
            .get_mut(parent)
            .is_some_and(|n| n.links.remove(child)))
    }

    pub fn set_position(&mut self, id: NodeId, position: Vec2) -> Result<Vec2> {
        let node = self.nodes.get_mut(id).ok_or(TreeError::NodeNotFound(id))?;
        Ok(std::mem::replace(&mut node.position, position))
    }

    pub fn set_description(&mut self, id: NodeId, description: impl Into<String>) -> Result<()> {
        let node = self.nodes.get_mut(id).ok_or(TreeError::NodeNotFound(id))?;
        node.description = description.into();
        Ok(())
    }

    /// Order a composite's children left to right by position. `false` if nothing moved.
    pub fn sort_children(&mut self, id: NodeId) -> Result<bool> {
        let positions: HashMap<NodeId, f32> =
            self.nodes.iter().map(|n| (n.id, n.position.x)).collect();
        let node = self.nodes.get_mut(id).ok_or(TreeError::NodeNotFound(id))?;
        let Links::Many(children) = &mut node.links else {
            return Ok(false);
        };
        let before = children.clone();
        let x = |id: &NodeId| positions.get(id).copied().unwrap_or_default();
        children.sort_by(|a, b| x(a).total_cmp(&x(b)));
        Ok(*children != before)
    }

    pub fn behavior(&self, id: NodeId) -> Result<&(dyn Behavior + 'static)> {
        self.nodes
            .get(id)
            .and_then(Node::behavior)
            .ok_or(TreeError::NodeNotFound(id))
    }

    pub fn behavior_mut(&mut self, id: NodeId) -> Result<&mut (dyn Behavior + 'static)> {
        self.nodes
            .get_mut(id)
            .and_then(Node::behavior_mut)
            .ok_or(TreeError::NodeNotFound(id))
    }

    /// Snapshot of the design-time state. Runtime state (node states, context) is not saved.
    pub fn to_document(&self) -> Result<TreeDocument> {
        let mut nodes = Vec::with_capacity(self.nodes.len());
        for node in self.nodes.iter() {
            let fields = match node.behavior() {
                Some(behavior) => behavior.save().map_err(|source| TreeError::Fields {
                    type_name: node.type_name.to_string(),
                    source,
                })?,
                None => serde_json::Value::Null,
            };
            nodes.push(NodeRecord {
                id: node.id,
                type_name: node.type_name.to_string(),
                position: node.position,
                description: node.description.clone(),
                children: node.children().to_vec(),
                fields,
            });
        }
        Ok(TreeDocument {
            root: self.root,
            nodes,
            blackboard: self.blackboard.clone(),
            view: self.view,
        })
    }

    /// Build a tree from a document, checking every structural invariant.
    pub fn from_document(document: &TreeDocument, registry: &NodeRegistry) -> Result<Self> {
        let mut nodes = NodeArena::default();
        let mut root_seen = false;
        for record in &document.nodes {
            if nodes.contains(record.id) {
                return Err(TreeError::DuplicateNode(record.id));
            }
            let behavior = registry.load(&record.type_name, record.fields.clone())?;
            if behavior.shape() == NodeShape::Root {
                if record.id != document.root {
                    return Err(TreeError::SecondRoot);
                }
                root_seen = true;
            }
            let mut node = Node::new(record.id, behavior, record.position);
            node.description = record.description.clone();
            nodes.insert(node);
        }
        if !root_seen {
            if nodes.contains(document.root) {
                return Err(TreeError::NotARoot(document.root));
            }
            return Err(TreeError::MissingRoot(document.root));
        }

        let mut parents: HashMap<NodeId, NodeId> = HashMap::new();
        for record in &document.nodes {
            for child in &record.children {
                if !nodes.contains(*child) {
                    return Err(TreeError::DanglingChild {
                        parent: record.id,
                        child: *child,
                    });
                }
                if *child == record.id {
                    return Err(TreeError::SelfLink(*child));
                }
                if *child == document.root {
                    return Err(TreeError::RootAsChild);
                }
                if parents.insert(*child, record.id).is_some() {
                    return Err(TreeError::SharedChild(*child));
                }
            }
            let node = nodes
                .get_mut(record.id)
                .ok_or(TreeError::NodeNotFound(record.id))?;
            node.links = match (&node.links, record.children.as_slice()) {
                (_, []) => Links::for_shape(node.shape),
                (Links::Leaf, _) => return Err(TreeError::NotAParent(record.id)),
                (Links::Single(_), [only]) => Links::Single(Some(*only)),
                (Links::Single(_), _) => return Err(TreeError::TooManyChildren(record.id)),
                (Links::Many(_), children) => Links::Many(children.to_vec()),
            };
        }

        // Every node has at most one parent now, so walking up from any node either ends at a
        // parentless node or loops.
        for start in nodes.ids() {
            let mut seen = HashSet::new();
            let mut current = *start;
            while let Some(parent) = parents.get(&current) {
                if !seen.insert(current) {
                    return Err(TreeError::Cycle {
                        parent: *parent,
                        child: current,
                    });
                }
                current = *parent;
            }
        }

        let mut blackboard = Blackboard::new();
        for key in document.blackboard.keys() {
            if blackboard.contains(key.id()) {
                return Err(TreeError::DuplicateKey(key.id()));
            }
            blackboard.insert(key.clone())?;
        }

        Ok(Self {
            root: document.root,
            nodes,
            blackboard,
            context: Context::new(),
            view: document.view,
            initialized: false,
            last_tick: TickContext::default(),
        })
    }

    /// Fresh, unbound copy of this tree for execution, made by reserializing it.
    pub fn instantiate(&self, registry: &NodeRegistry) -> Result<Self> {
        Self::from_document(&self.to_document()?, registry)
    }

    /// Replace the design-time state with `document`, keeping the bound context.
    ///
    /// When `document` only differs in layout (positions, descriptions, view) it is applied in
    /// place and running nodes are untouched. Otherwise the current tree is aborted and rebuilt;
    /// if it was bound, the new nodes run `on_init`.
    pub fn restore(&mut self, document: &TreeDocument, registry: &NodeRegistry) -> Result<()> {
        if self.restore_layout(document)? {
            return Ok(());
        }
        let mut restored = Self::from_document(document, registry)?;
        self.abort_all();
        restored.context = std::mem::take(&mut self.context);
        restored.last_tick = self.last_tick;
        let bound = self.initialized;
        *self = restored;
        if bound {
            self.initialize();
        }
        Ok(())
    }

    /// Apply `document`'s layout in place if it has the same nodes, links, fields and keys.
    fn restore_layout(&mut self, document: &TreeDocument) -> Result<bool> {
        let current = self.to_document()?;
        let same_structure = current.root == document.root
            && current.blackboard == document.blackboard
            && current.nodes.len() == document.nodes.len()
            && current.nodes.iter().zip(&document.nodes).all(|(a, b)| {
                a.id == b.id
                    && a.type_name == b.type_name
                    && a.children == b.children
                    && a.fields == b.fields
            });
        if !same_structure {
            return Ok(false);
        }
        for record in &document.nodes {
            if let Some(node) = self.nodes.get_mut(record.id) {
                node.position = record.position;
                node.description = record.description.clone();
            }
        }
        self.view = document.view;
        debug!(nodes = document.nodes.len(), "layout restored in place");
        Ok(true)
    }
}

impl core::fmt::Debug for Tree {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Tree")
            .field("root", &self.root)
            .field("nodes", &self.nodes.len())
            .field("keys", &self.blackboard.len())
            .finish()
    }
}
