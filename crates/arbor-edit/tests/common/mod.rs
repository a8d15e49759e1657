#![allow(dead_code)]

use std::cell::RefCell;
use std::rc::Rc;

use arbor_bt::{Behavior, CopyReport, NodeRegistry, NodeShape, Scope, Tree};
use arbor_core::{NodeProperty, PropertySlot, Status};
use arbor_edit::{ChangeSet, Deletion, EditListener, TreeEditor};
use serde::{Deserialize, Serialize};

#[derive(Debug, Default)]
pub struct Recorded {
    pub applied: Vec<ChangeSet>,
    pub deleted: Vec<Deletion>,
}

/// Listener that records into a cell shared with the test.
pub struct Recorder(pub Rc<RefCell<Recorded>>);

impl EditListener for Recorder {
    fn applied(&mut self, changes: &ChangeSet) {
        self.0.borrow_mut().applied.push(changes.clone());
    }

    fn deleted(&mut self, deletion: &Deletion) {
        self.0.borrow_mut().deleted.push(deletion.clone());
    }
}

/// Action holding a handle that cannot be duplicated.
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Sensor {
    pub range: NodeProperty<f32>,
    #[serde(skip)]
    pub handle: Option<Rc<()>>,
}

impl Behavior for Sensor {
    fn type_name(&self) -> &'static str {
        "Sensor"
    }

    fn shape(&self) -> NodeShape {
        NodeShape::Action
    }

    fn on_update(&mut self, _scope: &mut Scope<'_>) -> Status {
        Status::Running
    }

    fn properties(&self) -> Vec<(&'static str, &dyn PropertySlot)> {
        vec![("range", &self.range as &dyn PropertySlot)]
    }

    fn properties_mut(&mut self) -> Vec<(&'static str, &mut dyn PropertySlot)> {
        vec![("range", &mut self.range as &mut dyn PropertySlot)]
    }

    fn duplicate(&self, report: &mut CopyReport) -> Box<dyn Behavior> {
        if self.handle.is_some() {
            report.degraded("handle");
        }
        Box::new(Sensor {
            range: self.range.clone(),
            handle: None,
        })
    }

    fn save(&self) -> serde_json::Result<serde_json::Value> {
        serde_json::to_value(self)
    }
}

pub fn registry() -> NodeRegistry {
    let mut registry = NodeRegistry::with_builtins();
    registry.register::<Sensor>();
    registry
}

/// Editor over an empty tree plus the cell its recorder writes to.
pub fn editor() -> (TreeEditor, Rc<RefCell<Recorded>>) {
    let mut editor = TreeEditor::new(Tree::new(), registry());
    let recorded = Rc::new(RefCell::new(Recorded::default()));
    editor.subscribe(Recorder(Rc::clone(&recorded)));
    (editor, recorded)
}
