use serde::{Deserialize, Serialize};

use crate::{BlackboardError, KeyId, KeyValue, Value, ValueType};

/// A named, typed slot in a [`Blackboard`].
///
/// The value type is fixed at creation: every later write must carry the same [`ValueType`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlackboardKey {
    id: KeyId,
    name: String,
    value: Value,
}

impl BlackboardKey {
    /// New key holding the type's default value.
    pub fn new(name: impl Into<String>, value_type: ValueType) -> Self {
        Self::with_value(name, value_type.default_value())
    }

    pub fn with_value(name: impl Into<String>, value: Value) -> Self {
        Self {
            id: KeyId::new(),
            name: name.into(),
            value,
        }
    }

    pub fn id(&self) -> KeyId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn value_type(&self) -> ValueType {
        self.value.value_type()
    }

    pub fn value(&self) -> &Value {
        &self.value
    }

    pub fn read<T: KeyValue>(&self) -> Option<T> {
        T::from_value(&self.value)
    }

    pub fn set_value(&mut self, value: Value) -> Result<(), BlackboardError> {
        let expected = self.value_type();
        let actual = value.value_type();
        if expected != actual {
            return Err(BlackboardError::TypeMismatch { expected, actual });
        }
        self.value = value;
        Ok(())
    }

    pub(crate) fn set_name(&mut self, name: String) {
        self.name = name;
    }
}

/// Per-tree ordered store of named, typed values.
///
/// Names are unique (case-sensitive). Keys are addressed by name for lookup and by [`KeyId`]
/// for bindings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Blackboard {
    keys: Vec<BlackboardKey>,
}

impl Blackboard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &BlackboardKey> {
        self.keys.iter()
    }

    pub fn find(&self, name: &str) -> Option<&BlackboardKey> {
        self.keys.iter().find(|k| k.name == name)
    }

    pub fn find_mut(&mut self, name: &str) -> Option<&mut BlackboardKey> {
        self.keys.iter_mut().find(|k| k.name == name)
    }

    pub fn get(&self, id: KeyId) -> Option<&BlackboardKey> {
        self.keys.iter().find(|k| k.id == id)
    }

    pub fn get_mut(&mut self, id: KeyId) -> Option<&mut BlackboardKey> {
        self.keys.iter_mut().find(|k| k.id == id)
    }

    pub fn contains(&self, id: KeyId) -> bool {
        self.get(id).is_some()
    }

    /// Append a key, rejecting empty or already used names.
    pub fn insert(&mut self, key: BlackboardKey) -> Result<KeyId, BlackboardError> {
        if key.name.is_empty() {
            return Err(BlackboardError::EmptyName);
        }
        if self.find(&key.name).is_some() {
            return Err(BlackboardError::DuplicateName(key.name));
        }
        let id = key.id;
        self.keys.push(key);
        Ok(id)
    }

    pub fn remove(&mut self, id: KeyId) -> Option<BlackboardKey> {
        let index = self.keys.iter().position(|k| k.id == id)?;
        Some(self.keys.remove(index))
    }

    pub fn rename(&mut self, id: KeyId, name: impl Into<String>) -> Result<(), BlackboardError> {
        let name = name.into();
        if name.is_empty() {
            return Err(BlackboardError::EmptyName);
        }
        if self.keys.iter().any(|k| k.name == name && k.id != id) {
            return Err(BlackboardError::DuplicateName(name));
        }
        let key = self.get_mut(id).ok_or(BlackboardError::MissingKey(id))?;
        key.set_name(name);
        Ok(())
    }

    pub fn value(&self, id: KeyId) -> Option<&Value> {
        self.get(id).map(BlackboardKey::value)
    }

    pub fn set_value(&mut self, id: KeyId, value: Value) -> Result<(), BlackboardError> {
        self.get_mut(id)
            .ok_or(BlackboardError::MissingKey(id))?
            .set_value(value)
    }

    /// Typed read; `None` if the key is missing or holds another type.
    pub fn read<T: KeyValue>(&self, id: KeyId) -> Option<T> {
        self.get(id)?.read()
    }

    pub fn write<T: KeyValue>(&mut self, id: KeyId, value: T) -> Result<(), BlackboardError> {
        self.set_value(id, value.into_value())
    }
}
