use arbor_core::Status;
use serde::{Deserialize, Serialize};

use crate::behavior::{Behavior, CopyReport, NodeShape};
use crate::engine::Scope;

/// Entry point of every tree. Delegates to its single child; `Failure` without one.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RootNode;

impl Behavior for RootNode {
    fn type_name(&self) -> &'static str {
        "Root"
    }

    fn shape(&self) -> NodeShape {
        NodeShape::Root
    }

    fn on_update(&mut self, scope: &mut Scope<'_>) -> Status {
        scope.update_child(0)
    }

    fn duplicate(&self, _report: &mut CopyReport) -> Box<dyn Behavior> {
        Box::new(*self)
    }

    fn save(&self) -> serde_json::Result<serde_json::Value> {
        serde_json::to_value(self)
    }
}
