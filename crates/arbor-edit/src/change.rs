use arbor_core::{KeyId, NodeId, Vec2};

/// One applied edit, as reported to listeners.
#[derive(Debug, Clone, PartialEq)]
pub enum Change {
    NodeCreated(NodeId),
    NodeDeleted(NodeId),
    ChildAdded { parent: NodeId, child: NodeId },
    ChildRemoved { parent: NodeId, child: NodeId },
    NodeMoved { node: NodeId, position: Vec2 },
    DescriptionChanged(NodeId),
    ChildrenSorted(NodeId),
    NodeEdited(NodeId),
    PropertyBound { node: NodeId, field: String },
    PropertyUnbound { node: NodeId, field: String },
    KeyCreated(KeyId),
    KeyRenamed(KeyId),
    KeyValueChanged(KeyId),
    KeyDeleted(KeyId),
    ViewChanged,
    /// The whole tree was replaced by an undo or redo step.
    Restored,
}

impl Change {
    /// View changes are applied and notified but never enter undo history.
    pub fn is_undoable(&self) -> bool {
        !matches!(self, Change::ViewChanged | Change::Restored)
    }
}

/// Everything one committed batch changed, in application order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChangeSet {
    changes: Vec<Change>,
}

impl ChangeSet {
    pub(crate) fn new(changes: Vec<Change>) -> Self {
        Self { changes }
    }

    pub fn len(&self) -> usize {
        self.changes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Change> {
        self.changes.iter()
    }

    pub fn contains(&self, change: &Change) -> bool {
        self.changes.contains(change)
    }

    pub fn as_slice(&self) -> &[Change] {
        &self.changes
    }
}

/// A node or key removed by a committed batch.
#[derive(Debug, Clone, PartialEq)]
pub enum Deletion {
    Node(NodeId),
    Key { id: KeyId, name: String },
}

/// Observer of committed edits (typically a view that redraws).
pub trait EditListener {
    /// Called once per committed batch that changed something.
    fn applied(&mut self, changes: &ChangeSet);

    /// Called for each node or key removed by the batch, before [`EditListener::applied`].
    fn deleted(&mut self, _deletion: &Deletion) {}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(pub(crate) u64);
