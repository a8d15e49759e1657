use arbor_bt::TreeDocument;

/// Undo/redo stacks of whole-tree snapshots, one per committed batch.
#[derive(Debug, Default)]
pub(crate) struct History {
    undo: Vec<TreeDocument>,
    redo: Vec<TreeDocument>,
}

impl History {
    pub(crate) fn record(&mut self, before: TreeDocument, limit: usize) {
        self.redo.clear();
        self.undo.push(before);
        if limit > 0 && self.undo.len() > limit {
            let excess = self.undo.len() - limit;
            self.undo.drain(..excess);
        }
    }

    pub(crate) fn can_undo(&self) -> bool {
        !self.undo.is_empty()
    }

    pub(crate) fn can_redo(&self) -> bool {
        !self.redo.is_empty()
    }

    pub(crate) fn peek_undo(&self) -> Option<&TreeDocument> {
        self.undo.last()
    }

    pub(crate) fn peek_redo(&self) -> Option<&TreeDocument> {
        self.redo.last()
    }

    /// Move the top undo step to the redo stack, replacing it with `current`.
    pub(crate) fn step_back(&mut self, current: TreeDocument) {
        if self.undo.pop().is_some() {
            self.redo.push(current);
        }
    }

    pub(crate) fn step_forward(&mut self, current: TreeDocument) {
        if self.redo.pop().is_some() {
            self.undo.push(current);
        }
    }
}
