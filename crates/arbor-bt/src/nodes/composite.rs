use arbor_core::{NodeId, Status};
use serde::{Deserialize, Serialize};

use crate::behavior::{Behavior, CopyReport, NodeShape};
use crate::engine::Scope;

/// Runs children in order until one fails, resuming at the running child on later ticks.
///
/// The running child is remembered by id and found again after edits reorder the list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sequence {
    #[serde(skip)]
    running: Option<NodeId>,
}

impl Behavior for Sequence {
    fn type_name(&self) -> &'static str {
        "Sequence"
    }

    fn shape(&self) -> NodeShape {
        NodeShape::Composite
    }

    fn on_start(&mut self, _scope: &mut Scope<'_>) {
        self.running = None;
    }

    fn on_stop(&mut self, _scope: &mut Scope<'_>) {
        self.running = None;
    }

    fn on_update(&mut self, scope: &mut Scope<'_>) -> Status {
        let children = scope.child_ids();
        for &child in &children[resume_at(self.running, &children)..] {
            match scope.update_child_by_id(child) {
                Status::Running => {
                    switch_running(&mut self.running, child, scope);
                    return Status::Running;
                }
                Status::Failure => return Status::Failure,
                Status::Success => {}
            }
        }
        Status::Success
    }

    fn duplicate(&self, _report: &mut CopyReport) -> Box<dyn Behavior> {
        Box::new(Self::default())
    }

    fn save(&self) -> serde_json::Result<serde_json::Value> {
        serde_json::to_value(self)
    }
}

/// Runs children in order until one succeeds, resuming at the running child on later ticks.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Selector {
    #[serde(skip)]
    running: Option<NodeId>,
}

impl Behavior for Selector {
    fn type_name(&self) -> &'static str {
        "Selector"
    }

    fn shape(&self) -> NodeShape {
        NodeShape::Composite
    }

    fn on_start(&mut self, _scope: &mut Scope<'_>) {
        self.running = None;
    }

    fn on_stop(&mut self, _scope: &mut Scope<'_>) {
        self.running = None;
    }

    fn on_update(&mut self, scope: &mut Scope<'_>) -> Status {
        let children = scope.child_ids();
        for &child in &children[resume_at(self.running, &children)..] {
            match scope.update_child_by_id(child) {
                Status::Running => {
                    switch_running(&mut self.running, child, scope);
                    return Status::Running;
                }
                Status::Success => return Status::Success,
                Status::Failure => {}
            }
        }
        Status::Failure
    }

    fn duplicate(&self, _report: &mut CopyReport) -> Box<dyn Behavior> {
        Box::new(Self::default())
    }

    fn save(&self) -> serde_json::Result<serde_json::Value> {
        serde_json::to_value(self)
    }
}

/// Re-checks every child from the first on each tick; any failure fails the sequence.
///
/// When a different child becomes the running one, the previous running child is aborted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReactiveSequence {
    #[serde(skip)]
    running: Option<NodeId>,
}

impl Behavior for ReactiveSequence {
    fn type_name(&self) -> &'static str {
        "ReactiveSequence"
    }

    fn shape(&self) -> NodeShape {
        NodeShape::Composite
    }

    fn on_stop(&mut self, _scope: &mut Scope<'_>) {
        self.running = None;
    }

    fn on_update(&mut self, scope: &mut Scope<'_>) -> Status {
        for child in scope.child_ids() {
            match scope.update_child_by_id(child) {
                Status::Success => continue,
                Status::Failure => return Status::Failure,
                Status::Running => {
                    switch_running(&mut self.running, child, scope);
                    return Status::Running;
                }
            }
        }
        Status::Success
    }

    fn duplicate(&self, _report: &mut CopyReport) -> Box<dyn Behavior> {
        Box::new(Self::default())
    }

    fn save(&self) -> serde_json::Result<serde_json::Value> {
        serde_json::to_value(self)
    }
}

/// Re-checks every child from the first on each tick; the first child not failing decides.
///
/// When a different child becomes the running one, the previous running child is aborted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReactiveSelector {
    #[serde(skip)]
    running: Option<NodeId>,
}

impl Behavior for ReactiveSelector {
    fn type_name(&self) -> &'static str {
        "ReactiveSelector"
    }

    fn shape(&self) -> NodeShape {
        NodeShape::Composite
    }

    fn on_stop(&mut self, _scope: &mut Scope<'_>) {
        self.running = None;
    }

    fn on_update(&mut self, scope: &mut Scope<'_>) -> Status {
        for child in scope.child_ids() {
            match scope.update_child_by_id(child) {
                Status::Failure => continue,
                Status::Success => return Status::Success,
                Status::Running => {
                    switch_running(&mut self.running, child, scope);
                    return Status::Running;
                }
            }
        }
        Status::Failure
    }

    fn duplicate(&self, _report: &mut CopyReport) -> Box<dyn Behavior> {
        Box::new(Self::default())
    }

    fn save(&self) -> serde_json::Result<serde_json::Value> {
        serde_json::to_value(self)
    }
}

/// Position of the running child in the current list, or the first child if it was unlinked.
fn resume_at(running: Option<NodeId>, children: &[NodeId]) -> usize {
    running
        .and_then(|id| children.iter().position(|c| *c == id))
        .unwrap_or(0)
}

/// Record `child` as the running one, aborting the previous running child if it differs.
fn switch_running(running: &mut Option<NodeId>, child: NodeId, scope: &mut Scope<'_>) {
    if let Some(prev) = running.filter(|prev| *prev != child) {
        scope.abort_child_by_id(prev);
    }
    *running = Some(child);
}
