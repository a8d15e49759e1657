use serde::{Deserialize, Serialize};

use crate::{BindError, Blackboard, BlackboardError, BlackboardKey, KeyId, KeyValue, Value, ValueType};

/// A node field that is either a literal owned by the node or a binding to a blackboard key.
///
/// Unbound, the property has value semantics. Bound, every property sharing the key reads and
/// writes the same slot. Cloning keeps that split: the literal is copied, the binding is shared.
///
/// A binding whose key no longer exists (or no longer has type `T`) behaves as unbound.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(bound = "T: KeyValue")]
pub struct NodeProperty<T> {
    #[serde(rename = "value")]
    default: T,
    #[serde(default)]
    key: Option<KeyId>,
}

impl<T: KeyValue> NodeProperty<T> {
    pub fn new(default: T) -> Self {
        Self { default, key: None }
    }

    pub fn default_value(&self) -> &T {
        &self.default
    }

    pub fn set_default(&mut self, value: T) {
        self.default = value;
    }

    pub fn key(&self) -> Option<KeyId> {
        self.key
    }

    pub fn is_bound(&self) -> bool {
        self.key.is_some()
    }

    pub fn bind(&mut self, key: &BlackboardKey) -> Result<(), BindError> {
        if key.value_type() != T::TYPE {
            return Err(BindError::TypeMismatch {
                key: key.name().to_string(),
                property: T::TYPE,
                actual: key.value_type(),
            });
        }
        self.key = Some(key.id());
        Ok(())
    }

    pub fn unbind(&mut self) {
        self.key = None;
    }

    /// Current value: the bound key's value when it resolves, the local default otherwise.
    pub fn get(&self, blackboard: &Blackboard) -> T {
        self.key
            .and_then(|id| blackboard.read::<T>(id))
            .unwrap_or_else(|| self.default.clone())
    }

    /// Write through to the bound key, or overwrite the local default.
    pub fn set(&mut self, blackboard: &mut Blackboard, value: T) {
        if let Some(key) = self.key.and_then(|id| blackboard.get_mut(id)) {
            if key.value_type() == T::TYPE {
                // Type was checked above; the write cannot fail.
                let _ = key.set_value(value.into_value());
                return;
            }
        }
        self.default = value;
    }
}

impl<T: KeyValue> From<T> for NodeProperty<T> {
    fn from(value: T) -> Self {
        Self::new(value)
    }
}

/// Type-erased view of a [`NodeProperty`], used by editors to bind, unbind and sweep fields
/// without knowing their concrete type.
pub trait PropertySlot {
    fn value_type(&self) -> ValueType;

    fn key(&self) -> Option<KeyId>;

    fn bind_key(&mut self, key: &BlackboardKey) -> Result<(), BindError>;

    fn unbind(&mut self);

    fn default_value(&self) -> Value;

    fn set_default_value(&mut self, value: Value) -> Result<(), BlackboardError>;
}

impl<T: KeyValue> PropertySlot for NodeProperty<T> {
    fn value_type(&self) -> ValueType {
        T::TYPE
    }

    fn key(&self) -> Option<KeyId> {
        self.key
    }

    fn bind_key(&mut self, key: &BlackboardKey) -> Result<(), BindError> {
        self.bind(key)
    }

    fn unbind(&mut self) {
        NodeProperty::unbind(self)
    }

    fn default_value(&self) -> Value {
        self.default.clone().into_value()
    }

    fn set_default_value(&mut self, value: Value) -> Result<(), BlackboardError> {
        let actual = value.value_type();
        let v = T::from_value(&value).ok_or(BlackboardError::TypeMismatch {
            expected: T::TYPE,
            actual,
        })?;
        self.default = v;
        Ok(())
    }
}
