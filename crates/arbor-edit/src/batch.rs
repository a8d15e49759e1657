use std::collections::HashMap;

use arbor_bt::{Behavior, CopyReport, NodeShape, Tree, TreeDocument};
use arbor_core::{BlackboardKey, KeyId, NodeId, Value, ValueType, Vec2, Vec3};
use tracing::{debug, warn};

use crate::change::{Change, ChangeSet, Deletion};
use crate::editor::TreeEditor;
use crate::error::{EditError, Result};

/// Result of [`Batch::create_node_copy`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeCopy {
    pub id: NodeId,
    /// Fields left at their default because they could not be duplicated.
    pub degraded: Vec<String>,
}

impl NodeCopy {
    pub fn is_clean(&self) -> bool {
        self.degraded.is_empty()
    }
}

/// An open edit transaction.
///
/// Every operation mutates the tree right away and fails without side effects. Nothing is
/// reported until the batch ends:
/// - [`Batch::commit`] (or dropping the batch) notifies listeners once and records one undo
///   step, if anything changed;
/// - [`Batch::discard`] puts the tree back as it was when the batch began and notifies no one.
pub struct Batch<'e> {
    editor: &'e mut TreeEditor,
    before: Option<TreeDocument>,
    changes: Vec<Change>,
    deletions: Vec<Deletion>,
    finished: bool,
}

impl<'e> Batch<'e> {
    pub(crate) fn new(editor: &'e mut TreeEditor) -> Result<Self> {
        let before = editor.tree.to_document()?;
        Ok(Self {
            editor,
            before: Some(before),
            changes: Vec::new(),
            deletions: Vec::new(),
            finished: false,
        })
    }

    pub fn tree(&self) -> &Tree {
        &self.editor.tree
    }

    /// Changes applied so far.
    pub fn changes(&self) -> &[Change] {
        &self.changes
    }

    fn tree_mut(&mut self) -> &mut Tree {
        &mut self.editor.tree
    }

    fn push(&mut self, change: Change) {
        debug!(?change, "edit applied");
        self.changes.push(change);
    }

    fn key_id(&self, name: &str) -> Result<KeyId> {
        self.tree()
            .blackboard()
            .find(name)
            .map(BlackboardKey::id)
            .ok_or_else(|| EditError::KeyNotFound(name.to_string()))
    }

    /// Instantiate a registered node type with no parent.
    pub fn create_node(&mut self, type_name: &str, position: Vec2) -> Result<NodeId> {
        let behavior = self.editor.registry.create(type_name)?;
        self.insert_node(behavior, position)
    }

    /// Add an already-built behavior as a parentless node.
    pub fn insert_node(&mut self, behavior: Box<dyn Behavior>, position: Vec2) -> Result<NodeId> {
        let id = self.tree_mut().insert_node(behavior, position)?;
        self.push(Change::NodeCreated(id));
        Ok(id)
    }

    /// Duplicate `node`'s fields into a new parentless node at `position`.
    pub fn create_node_copy(&mut self, node: NodeId, position: Vec2) -> Result<NodeCopy> {
        let source = self.tree().node(node).ok_or(EditError::NodeNotFound(node))?;
        if source.shape() == NodeShape::Root {
            return Err(EditError::RootNotCopyable);
        }
        let description = source.description().to_string();
        let mut report = CopyReport::new();
        let behavior = self.tree().behavior(node)?.duplicate(&mut report);

        let id = self.tree_mut().insert_node(behavior, position)?;
        self.tree_mut().set_description(id, description)?;
        if !report.is_clean() {
            warn!(source = %node, copy = %id, fields = ?report.fields(), "fields could not be copied");
        }
        self.push(Change::NodeCreated(id));
        Ok(NodeCopy {
            id,
            degraded: report.into_fields(),
        })
    }

    /// Remove a node. It is aborted if running and detached from its parent; its children
    /// become orphans.
    pub fn delete_node(&mut self, node: NodeId) -> Result<()> {
        let parent = self.tree().parent_of(node);
        self.tree_mut().remove_node(node)?;
        if let Some(parent) = parent {
            self.push(Change::ChildRemoved {
                parent,
                child: node,
            });
        }
        self.push(Change::NodeDeleted(node));
        self.deletions.push(Deletion::Node(node));
        Ok(())
    }

    /// Link `child` under `parent`, detaching it from any previous parent.
    ///
    /// Root and decorator slots are overwritten; the displaced child stays in the tree.
    pub fn add_child(&mut self, parent: NodeId, child: NodeId) -> Result<()> {
        let previous = self.tree().parent_of(child);
        let displaced = self.tree_mut().link(parent, child)?;
        if let Some(old) = previous.filter(|p| *p != parent) {
            self.push(Change::ChildRemoved { parent: old, child });
        }
        if let Some(old) = displaced {
            self.push(Change::ChildRemoved { parent, child: old });
        }
        self.push(Change::ChildAdded { parent, child });
        Ok(())
    }

    /// Unlink `child` from `parent`. `false` (and no change) if it was not linked there.
    pub fn remove_child(&mut self, parent: NodeId, child: NodeId) -> Result<bool> {
        let removed = self.tree_mut().unlink(parent, child)?;
        if removed {
            self.push(Change::ChildRemoved { parent, child });
        }
        Ok(removed)
    }

    /// Create a node of `type_name` and move `child` under it.
    pub fn insert_parent(
        &mut self,
        type_name: &str,
        position: Vec2,
        child: NodeId,
    ) -> Result<NodeId> {
        if !self.tree().contains(child) {
            return Err(EditError::NodeNotFound(child));
        }
        let behavior = self.editor.registry.create(type_name)?;
        let parent = self.tree_mut().insert_node(behavior, position)?;
        let previous = self.tree().parent_of(child);
        if let Err(err) = self.tree_mut().link(parent, child) {
            // Leave no trace of the half-built parent.
            let _ = self.tree_mut().remove_node(parent);
            return Err(err.into());
        }
        self.push(Change::NodeCreated(parent));
        if let Some(old) = previous {
            self.push(Change::ChildRemoved { parent: old, child });
        }
        self.push(Change::ChildAdded { parent, child });
        Ok(parent)
    }

    pub fn set_node_position(&mut self, node: NodeId, position: Vec2) -> Result<()> {
        self.tree_mut().set_position(node, position)?;
        self.push(Change::NodeMoved { node, position });
        Ok(())
    }

    pub fn set_description(&mut self, node: NodeId, description: &str) -> Result<()> {
        self.tree_mut().set_description(node, description)?;
        self.push(Change::DescriptionChanged(node));
        Ok(())
    }

    /// Order a composite's children by horizontal position. `false` if nothing moved.
    pub fn sort_children(&mut self, node: NodeId) -> Result<bool> {
        let moved = self.tree_mut().sort_children(node)?;
        if moved {
            self.push(Change::ChildrenSorted(node));
        }
        Ok(moved)
    }

    /// Pan and zoom. Notified like any edit but never undone.
    pub fn set_view_transform(&mut self, position: Vec3, scale: Vec3) {
        self.tree_mut()
            .set_view(arbor_bt::ViewTransform { position, scale });
        self.push(Change::ViewChanged);
    }

    /// Bind the property `field` of `node` to the key named `key`.
    pub fn bind_property(&mut self, node: NodeId, field: &str, key: &str) -> Result<()> {
        let key = self
            .tree()
            .blackboard()
            .find(key)
            .cloned()
            .ok_or_else(|| EditError::KeyNotFound(key.to_string()))?;
        let slot = self
            .tree_mut()
            .behavior_mut(node)?
            .property_mut(field)
            .ok_or_else(|| EditError::PropertyNotFound {
                node,
                field: field.to_string(),
            })?;
        slot.bind_key(&key)?;
        self.push(Change::PropertyBound {
            node,
            field: field.to_string(),
        });
        Ok(())
    }

    /// Drop the binding of `field`; it reads its own default again. `false` if it was unbound.
    pub fn unbind_property(&mut self, node: NodeId, field: &str) -> Result<bool> {
        let slot = self
            .tree_mut()
            .behavior_mut(node)?
            .property_mut(field)
            .ok_or_else(|| EditError::PropertyNotFound {
                node,
                field: field.to_string(),
            })?;
        if slot.key().is_none() {
            return Ok(false);
        }
        slot.unbind();
        self.push(Change::PropertyUnbound {
            node,
            field: field.to_string(),
        });
        Ok(true)
    }

    /// Mutate a node's behavior fields in place.
    pub fn edit_node<R>(
        &mut self,
        node: NodeId,
        edit: impl FnOnce(&mut (dyn Behavior + 'static)) -> R,
    ) -> Result<R> {
        let out = edit(self.tree_mut().behavior_mut(node)?);
        self.push(Change::NodeEdited(node));
        Ok(out)
    }

    pub fn create_blackboard_key(&mut self, name: &str, value_type: ValueType) -> Result<KeyId> {
        let id = self
            .tree_mut()
            .blackboard_mut()
            .insert(BlackboardKey::new(name, value_type))?;
        self.push(Change::KeyCreated(id));
        Ok(id)
    }

    /// Rename a key. Bindings follow the key's id, so they survive.
    pub fn rename_blackboard_key(&mut self, name: &str, new_name: &str) -> Result<()> {
        let id = self.key_id(name)?;
        self.tree_mut().blackboard_mut().rename(id, new_name)?;
        self.push(Change::KeyRenamed(id));
        Ok(())
    }

    pub fn set_blackboard_value(&mut self, name: &str, value: Value) -> Result<()> {
        let id = self.key_id(name)?;
        self.tree_mut().blackboard_mut().set_value(id, value)?;
        self.push(Change::KeyValueChanged(id));
        Ok(())
    }

    /// Delete a key and unbind every property bound to it.
    pub fn delete_blackboard_key(&mut self, name: &str) -> Result<()> {
        let id = self.key_id(name)?;
        self.remove_key(id);
        Ok(())
    }

    /// Delete several keys. Every name must exist; otherwise nothing is deleted.
    pub fn delete_blackboard_keys<S: AsRef<str>>(&mut self, names: &[S]) -> Result<()> {
        let ids = names
            .iter()
            .map(|name| self.key_id(name.as_ref()))
            .collect::<Result<Vec<_>>>()?;
        for id in ids {
            self.remove_key(id);
        }
        Ok(())
    }

    fn remove_key(&mut self, id: KeyId) {
        let Some(key) = self.tree_mut().blackboard_mut().remove(id) else {
            return;
        };
        let nodes = self.tree().node_ids().to_vec();
        let mut unbound = Vec::new();
        for node in nodes {
            let Ok(behavior) = self.tree_mut().behavior_mut(node) else {
                continue;
            };
            for (field, slot) in behavior.properties_mut() {
                if slot.key() == Some(id) {
                    slot.unbind();
                    unbound.push((node, field));
                }
            }
        }
        for (node, field) in unbound {
            self.push(Change::PropertyUnbound {
                node,
                field: field.to_string(),
            });
        }
        self.push(Change::KeyDeleted(id));
        self.deletions.push(Deletion::Key {
            id,
            name: key.name().to_string(),
        });
    }

    /// Copy `nodes` (the root is skipped) to `offset` from their positions and recreate the
    /// links whose parent and child were both copied. Returns `(original, copy)` pairs.
    ///
    /// With [`EditorSettings::copy_node_values`](crate::EditorSettings) off, copies are fresh
    /// defaults of the same registered type.
    pub fn paste(&mut self, nodes: &[NodeId], offset: Vec2) -> Result<Vec<(NodeId, NodeId)>> {
        if let Some(missing) = nodes.iter().find(|id| !self.tree().contains(**id)) {
            return Err(EditError::NodeNotFound(*missing));
        }
        let copy_values = self.editor.settings.copy_node_values;
        let root = self.tree().root();

        let mut pasted: Vec<(NodeId, NodeId)> = Vec::new();
        let mut mapping: HashMap<NodeId, NodeId> = HashMap::new();
        for &old in nodes {
            if old == root || mapping.contains_key(&old) {
                continue;
            }
            let Some(node) = self.tree().node(old) else {
                continue;
            };
            let position = node.position() + offset;
            let new = if copy_values {
                self.create_node_copy(old, position)?.id
            } else {
                let type_name = node.type_name();
                self.create_node(type_name, position)?
            };
            mapping.insert(old, new);
            pasted.push((old, new));
        }

        for &(old, new) in &pasted {
            let children = self.tree().children(old).to_vec();
            for child in children {
                if let Some(&new_child) = mapping.get(&child) {
                    self.add_child(new, new_child)?;
                }
            }
        }
        debug!(nodes = pasted.len(), "pasted");
        Ok(pasted)
    }

    /// End the batch, notifying listeners once if anything changed.
    pub fn commit(mut self) {
        self.finish();
    }

    /// End the batch by restoring the tree to its state at [`TreeEditor::begin_batch`].
    ///
    /// A batch that only touched layout is reverted in place. Any other batch rebuilds the
    /// tree: running nodes are aborted and, in a bound tree, every node runs `on_init` again.
    pub fn discard(mut self) -> Result<()> {
        self.finished = true;
        if self.changes.is_empty() {
            return Ok(());
        }
        let Some(before) = self.before.take() else {
            return Ok(());
        };
        self.editor.tree.restore(&before, &self.editor.registry)?;
        debug!(changes = self.changes.len(), "batch discarded");
        Ok(())
    }

    fn finish(&mut self) {
        if self.finished {
            return;
        }
        self.finished = true;
        if self.changes.is_empty() {
            return;
        }
        let changes = ChangeSet::new(std::mem::take(&mut self.changes));
        let deletions = std::mem::take(&mut self.deletions);
        if changes.iter().any(Change::is_undoable) {
            if let Some(before) = self.before.take() {
                let limit = self.editor.settings.history_limit;
                self.editor.history.record(before, limit);
            }
        }
        debug!(changes = changes.len(), "batch committed");
        self.editor.notify(&deletions, &changes);
    }
}

impl Drop for Batch<'_> {
    fn drop(&mut self) {
        self.finish();
    }
}
