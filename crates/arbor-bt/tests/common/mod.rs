#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use arbor_bt::{Behavior, CopyReport, NodeShape, Scope};
use arbor_core::Status;

/// Lifecycle calls recorded by [`Probe`]s, shared with the test body.
pub type Journal = Rc<RefCell<Vec<String>>>;

pub fn journal() -> Journal {
    Rc::new(RefCell::new(Vec::new()))
}

pub fn drain(journal: &Journal) -> Vec<String> {
    journal.borrow_mut().drain(..).collect()
}

/// Scripted action that records every hook call as `"<name>:<hook>"`.
pub struct Probe {
    name: &'static str,
    journal: Journal,
    script: VecDeque<Status>,
    fallback: Status,
    runnable: bool,
}

impl Probe {
    pub fn new(name: &'static str, journal: &Journal) -> Self {
        Self {
            name,
            journal: Rc::clone(journal),
            script: VecDeque::new(),
            fallback: Status::Running,
            runnable: true,
        }
    }

    /// Status returned once the script is exhausted.
    pub fn returning(mut self, status: Status) -> Self {
        self.fallback = status;
        self
    }

    pub fn script(mut self, statuses: impl IntoIterator<Item = Status>) -> Self {
        self.script.extend(statuses);
        self
    }

    pub fn not_runnable(mut self) -> Self {
        self.runnable = false;
        self
    }

    fn record(&self, hook: &str) {
        self.journal.borrow_mut().push(format!("{}:{hook}", self.name));
    }
}

impl Behavior for Probe {
    fn type_name(&self) -> &'static str {
        "Probe"
    }

    fn shape(&self) -> NodeShape {
        NodeShape::Action
    }

    fn on_init(&mut self, _scope: &mut Scope<'_>) -> bool {
        self.record("init");
        self.runnable
    }

    fn on_start(&mut self, _scope: &mut Scope<'_>) {
        self.record("start");
    }

    fn on_stop(&mut self, _scope: &mut Scope<'_>) {
        self.record("stop");
    }

    fn on_update(&mut self, _scope: &mut Scope<'_>) -> Status {
        self.record("update");
        self.script.pop_front().unwrap_or(self.fallback)
    }

    fn duplicate(&self, _report: &mut CopyReport) -> Box<dyn Behavior> {
        Box::new(Self {
            name: self.name,
            journal: Rc::clone(&self.journal),
            script: self.script.clone(),
            fallback: self.fallback,
            runnable: self.runnable,
        })
    }

    fn save(&self) -> serde_json::Result<serde_json::Value> {
        Ok(serde_json::json!({ "name": self.name }))
    }
}
