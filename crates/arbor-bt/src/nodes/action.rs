use arbor_core::{KeyId, NodeProperty, PropertySlot, Status, Value};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::behavior::{Behavior, CopyReport, NodeShape};
use crate::engine::Scope;

/// Logs its message and succeeds.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Log {
    pub message: NodeProperty<String>,
}

impl Log {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: NodeProperty::new(message.into()),
        }
    }
}

impl Behavior for Log {
    fn type_name(&self) -> &'static str {
        "Log"
    }

    fn shape(&self) -> NodeShape {
        NodeShape::Action
    }

    fn on_update(&mut self, scope: &mut Scope<'_>) -> Status {
        let message = self.message.get(scope.blackboard());
        info!(node = %scope.node(), "{message}");
        Status::Success
    }

    fn properties(&self) -> Vec<(&'static str, &dyn PropertySlot)> {
        vec![("message", &self.message as &dyn PropertySlot)]
    }

    fn properties_mut(&mut self) -> Vec<(&'static str, &mut dyn PropertySlot)> {
        vec![("message", &mut self.message as &mut dyn PropertySlot)]
    }

    fn duplicate(&self, _report: &mut CopyReport) -> Box<dyn Behavior> {
        Box::new(self.clone())
    }

    fn save(&self) -> serde_json::Result<serde_json::Value> {
        serde_json::to_value(self)
    }
}

/// Writes a literal into a blackboard key.
///
/// Fails when no key is set, the key no longer exists or its type differs from the literal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SetProperty {
    pub key: Option<KeyId>,
    pub value: Value,
}

impl SetProperty {
    pub fn new(key: KeyId, value: Value) -> Self {
        Self {
            key: Some(key),
            value,
        }
    }
}

impl Default for SetProperty {
    fn default() -> Self {
        Self {
            key: None,
            value: Value::Bool(false),
        }
    }
}

impl Behavior for SetProperty {
    fn type_name(&self) -> &'static str {
        "SetProperty"
    }

    fn shape(&self) -> NodeShape {
        NodeShape::Action
    }

    fn on_update(&mut self, scope: &mut Scope<'_>) -> Status {
        let Some(key) = self.key else {
            return Status::Failure;
        };
        match scope.blackboard_mut().set_value(key, self.value.clone()) {
            Ok(()) => Status::Success,
            Err(err) => {
                debug!(node = %scope.node(), %err, "set property failed");
                Status::Failure
            }
        }
    }

    fn duplicate(&self, _report: &mut CopyReport) -> Box<dyn Behavior> {
        Box::new(self.clone())
    }

    fn save(&self) -> serde_json::Result<serde_json::Value> {
        serde_json::to_value(self)
    }
}

/// Stays `Running` until `duration` seconds of tick time have passed since it started.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Wait {
    pub duration: NodeProperty<f32>,
    #[serde(skip)]
    elapsed: f32,
}

impl Wait {
    pub fn new(seconds: f32) -> Self {
        Self {
            duration: NodeProperty::new(seconds),
            elapsed: 0.0,
        }
    }
}

impl Default for Wait {
    fn default() -> Self {
        Self::new(1.0)
    }
}

impl Behavior for Wait {
    fn type_name(&self) -> &'static str {
        "Wait"
    }

    fn shape(&self) -> NodeShape {
        NodeShape::Action
    }

    fn on_start(&mut self, _scope: &mut Scope<'_>) {
        self.elapsed = 0.0;
    }

    fn on_update(&mut self, scope: &mut Scope<'_>) -> Status {
        self.elapsed += scope.tick().dt_seconds;
        if self.elapsed >= self.duration.get(scope.blackboard()) {
            Status::Success
        } else {
            Status::Running
        }
    }

    fn properties(&self) -> Vec<(&'static str, &dyn PropertySlot)> {
        vec![("duration", &self.duration as &dyn PropertySlot)]
    }

    fn properties_mut(&mut self) -> Vec<(&'static str, &mut dyn PropertySlot)> {
        vec![("duration", &mut self.duration as &mut dyn PropertySlot)]
    }

    fn duplicate(&self, _report: &mut CopyReport) -> Box<dyn Behavior> {
        Box::new(Self {
            duration: self.duration.clone(),
            elapsed: 0.0,
        })
    }

    fn save(&self) -> serde_json::Result<serde_json::Value> {
        serde_json::to_value(self)
    }
}

/// Succeeds when its flag is `true`, fails otherwise.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Condition {
    pub value: NodeProperty<bool>,
}

impl Condition {
    pub fn new(value: bool) -> Self {
        Self {
            value: NodeProperty::new(value),
        }
    }
}

impl Behavior for Condition {
    fn type_name(&self) -> &'static str {
        "Condition"
    }

    fn shape(&self) -> NodeShape {
        NodeShape::Action
    }

    fn on_update(&mut self, scope: &mut Scope<'_>) -> Status {
        Status::from_bool(self.value.get(scope.blackboard()))
    }

    fn properties(&self) -> Vec<(&'static str, &dyn PropertySlot)> {
        vec![("value", &self.value as &dyn PropertySlot)]
    }

    fn properties_mut(&mut self) -> Vec<(&'static str, &mut dyn PropertySlot)> {
        vec![("value", &mut self.value as &mut dyn PropertySlot)]
    }

    fn duplicate(&self, _report: &mut CopyReport) -> Box<dyn Behavior> {
        Box::new(self.clone())
    }

    fn save(&self) -> serde_json::Result<serde_json::Value> {
        serde_json::to_value(self)
    }
}
