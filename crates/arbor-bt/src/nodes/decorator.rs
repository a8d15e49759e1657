use arbor_core::Status;
use serde::{Deserialize, Serialize};

use crate::behavior::{Behavior, CopyReport, NodeShape};
use crate::engine::Scope;

/// Turns a child `Success` into `Failure`. Without a child it fails.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Failure;

impl Behavior for Failure {
    fn type_name(&self) -> &'static str {
        "Failure"
    }

    fn shape(&self) -> NodeShape {
        NodeShape::Decorator
    }

    fn on_update(&mut self, scope: &mut Scope<'_>) -> Status {
        if scope.child_count() == 0 {
            return Status::Failure;
        }
        match scope.update_child(0) {
            Status::Success => Status::Failure,
            status => status,
        }
    }

    fn duplicate(&self, _report: &mut CopyReport) -> Box<dyn Behavior> {
        Box::new(*self)
    }

    fn save(&self) -> serde_json::Result<serde_json::Value> {
        serde_json::to_value(self)
    }
}

/// Turns a child `Failure` into `Success`. Without a child it fails.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Succeed;

impl Behavior for Succeed {
    fn type_name(&self) -> &'static str {
        "Succeed"
    }

    fn shape(&self) -> NodeShape {
        NodeShape::Decorator
    }

    fn on_update(&mut self, scope: &mut Scope<'_>) -> Status {
        if scope.child_count() == 0 {
            return Status::Failure;
        }
        match scope.update_child(0) {
            Status::Failure => Status::Success,
            status => status,
        }
    }

    fn duplicate(&self, _report: &mut CopyReport) -> Box<dyn Behavior> {
        Box::new(*self)
    }

    fn save(&self) -> serde_json::Result<serde_json::Value> {
        serde_json::to_value(self)
    }
}
