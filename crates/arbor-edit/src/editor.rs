use arbor_bt::{Behavior, NodeRegistry, Tree};
use arbor_core::{Context, KeyId, NodeId, Status, TickContext, Value, ValueType, Vec2, Vec3};
use tracing::{debug, warn};

use crate::batch::{Batch, NodeCopy};
use crate::change::{Change, ChangeSet, Deletion, EditListener, ListenerId};
use crate::error::{EditError, Result};
use crate::history::History;
use crate::settings::EditorSettings;

/// Owns a [`Tree`] being edited, the registry used to create nodes, undo history and the
/// listeners to notify.
///
/// Single operations (`create_node`, `add_child`...) each run in their own batch: they apply
/// and notify immediately, and a failed one leaves the tree untouched. Use
/// [`TreeEditor::begin_batch`] to group several into one notification and one undo step.
pub struct TreeEditor {
    pub(crate) tree: Tree,
    pub(crate) registry: NodeRegistry,
    pub(crate) settings: EditorSettings,
    pub(crate) history: History,
    listeners: Vec<(ListenerId, Box<dyn EditListener>)>,
    next_listener: u64,
}

impl TreeEditor {
    pub fn new(tree: Tree, registry: NodeRegistry) -> Self {
        Self {
            tree,
            registry,
            settings: EditorSettings::default(),
            history: History::default(),
            listeners: Vec::new(),
            next_listener: 0,
        }
    }

    pub fn with_settings(mut self, settings: EditorSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn tree(&self) -> &Tree {
        &self.tree
    }

    pub fn into_tree(self) -> Tree {
        self.tree
    }

    pub fn registry(&self) -> &NodeRegistry {
        &self.registry
    }

    pub fn settings(&self) -> &EditorSettings {
        &self.settings
    }

    pub fn set_settings(&mut self, settings: EditorSettings) {
        self.settings = settings;
    }

    /// Bind the edited tree to a live context. See [`Tree::bind`].
    pub fn bind(&mut self, context: Context) -> Context {
        self.tree.bind(context)
    }

    /// Tick the edited tree. Edits and ticks never overlap: both need `&mut self`.
    pub fn tick(&mut self, tick: TickContext) -> Status {
        self.tree.tick(tick)
    }

    pub fn subscribe(&mut self, listener: impl EditListener + 'static) -> ListenerId {
        let id = ListenerId(self.next_listener);
        self.next_listener += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(l, _)| *l != id);
        self.listeners.len() != before
    }

    pub(crate) fn notify(&mut self, deletions: &[Deletion], changes: &ChangeSet) {
        for (_, listener) in &mut self.listeners {
            for deletion in deletions {
                listener.deleted(deletion);
            }
            listener.applied(changes);
        }
    }

    /// Open a batch. Edits through it apply immediately and are reported once it ends.
    pub fn begin_batch(&mut self) -> Result<Batch<'_>> {
        Batch::new(self)
    }

    fn single<R>(&mut self, op: &str, edit: impl FnOnce(&mut Batch<'_>) -> Result<R>) -> Result<R> {
        let mut batch = self.begin_batch()?;
        match edit(&mut batch) {
            Ok(out) => {
                batch.commit();
                Ok(out)
            }
            Err(err) => {
                batch.discard()?;
                warn!(op, %err, "edit rejected");
                Err(err)
            }
        }
    }

    pub fn create_node(&mut self, type_name: &str, position: Vec2) -> Result<NodeId> {
        self.single("create_node", |b| b.create_node(type_name, position))
    }

    pub fn insert_node(&mut self, behavior: Box<dyn Behavior>, position: Vec2) -> Result<NodeId> {
        self.single("insert_node", |b| b.insert_node(behavior, position))
    }

    pub fn create_node_copy(&mut self, node: NodeId, position: Vec2) -> Result<NodeCopy> {
        self.single("create_node_copy", |b| b.create_node_copy(node, position))
    }

    pub fn delete_node(&mut self, node: NodeId) -> Result<()> {
        self.single("delete_node", |b| b.delete_node(node))
    }

    pub fn add_child(&mut self, parent: NodeId, child: NodeId) -> Result<()> {
        self.single("add_child", |b| b.add_child(parent, child))
    }

    pub fn remove_child(&mut self, parent: NodeId, child: NodeId) -> Result<bool> {
        self.single("remove_child", |b| b.remove_child(parent, child))
    }

    pub fn insert_parent(&mut self, type_name: &str, position: Vec2, child: NodeId) -> Result<NodeId> {
        self.single("insert_parent", |b| b.insert_parent(type_name, position, child))
    }

    pub fn set_node_position(&mut self, node: NodeId, position: Vec2) -> Result<()> {
        self.single("set_node_position", |b| b.set_node_position(node, position))
    }

    pub fn set_description(&mut self, node: NodeId, description: &str) -> Result<()> {
        self.single("set_description", |b| b.set_description(node, description))
    }

    pub fn sort_children(&mut self, node: NodeId) -> Result<bool> {
        self.single("sort_children", |b| b.sort_children(node))
    }

    pub fn set_view_transform(&mut self, position: Vec3, scale: Vec3) -> Result<()> {
        self.single("set_view_transform", |b| {
            b.set_view_transform(position, scale);
            Ok(())
        })
    }

    pub fn bind_property(&mut self, node: NodeId, field: &str, key: &str) -> Result<()> {
        self.single("bind_property", |b| b.bind_property(node, field, key))
    }

    pub fn unbind_property(&mut self, node: NodeId, field: &str) -> Result<bool> {
        self.single("unbind_property", |b| b.unbind_property(node, field))
    }

    pub fn edit_node<R>(
        &mut self,
        node: NodeId,
        edit: impl FnOnce(&mut (dyn Behavior + 'static)) -> R,
    ) -> Result<R> {
        self.single("edit_node", |b| b.edit_node(node, edit))
    }

    pub fn create_blackboard_key(&mut self, name: &str, value_type: ValueType) -> Result<KeyId> {
        self.single("create_blackboard_key", |b| {
            b.create_blackboard_key(name, value_type)
        })
    }

    pub fn rename_blackboard_key(&mut self, name: &str, new_name: &str) -> Result<()> {
        self.single("rename_blackboard_key", |b| {
            b.rename_blackboard_key(name, new_name)
        })
    }

    pub fn set_blackboard_value(&mut self, name: &str, value: Value) -> Result<()> {
        self.single("set_blackboard_value", |b| b.set_blackboard_value(name, value))
    }

    pub fn delete_blackboard_key(&mut self, name: &str) -> Result<()> {
        self.single("delete_blackboard_key", |b| b.delete_blackboard_key(name))
    }

    pub fn delete_blackboard_keys<S: AsRef<str>>(&mut self, names: &[S]) -> Result<()> {
        self.single("delete_blackboard_keys", |b| b.delete_blackboard_keys(names))
    }

    /// Paste copies of `nodes` offset by [`EditorSettings::paste_offset`], as one undo step.
    pub fn paste(&mut self, nodes: &[NodeId]) -> Result<Vec<(NodeId, NodeId)>> {
        let offset = self.settings.paste_offset;
        self.single("paste", |b| b.paste(nodes, offset))
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    /// Revert the last committed batch. The view transform is left as it is.
    ///
    /// Like [`Batch::discard`], anything beyond a layout change rebuilds the tree and aborts
    /// running nodes.
    pub fn undo(&mut self) -> Result<()> {
        let Some(target) = self.history.peek_undo() else {
            return Err(EditError::NothingToUndo);
        };
        let current = self.tree.to_document()?;
        let view = self.tree.view();
        self.tree.restore(target, &self.registry)?;
        self.tree.set_view(view);
        self.history.step_back(current);
        debug!("undo");
        self.notify(&[], &ChangeSet::new(vec![Change::Restored]));
        Ok(())
    }

    /// Re-apply the last undone batch.
    pub fn redo(&mut self) -> Result<()> {
        let Some(target) = self.history.peek_redo() else {
            return Err(EditError::NothingToRedo);
        };
        let current = self.tree.to_document()?;
        let view = self.tree.view();
        self.tree.restore(target, &self.registry)?;
        self.tree.set_view(view);
        self.history.step_forward(current);
        debug!("redo");
        self.notify(&[], &ChangeSet::new(vec![Change::Restored]));
        Ok(())
    }
}

impl core::fmt::Debug for TreeEditor {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("TreeEditor")
            .field("tree", &self.tree)
            .field("listeners", &self.listeners.len())
            .field("settings", &self.settings)
            .finish()
    }
}
