use std::collections::BTreeMap;

use serde::de::DeserializeOwned;

use crate::behavior::{Behavior, NodeShape};
use crate::error::{Result, TreeError};
use crate::nodes::{
    Condition, Failure, Log, ReactiveSelector, ReactiveSequence, RootNode, Selector, Sequence,
    SetProperty, Succeed, Wait,
};

struct Entry {
    shape: NodeShape,
    make: fn() -> Box<dyn Behavior>,
    load: fn(serde_json::Value) -> serde_json::Result<Box<dyn Behavior>>,
}

fn make<T: Behavior + Default>() -> Box<dyn Behavior> {
    Box::new(T::default())
}

fn load<T: Behavior + DeserializeOwned>(
    fields: serde_json::Value,
) -> serde_json::Result<Box<dyn Behavior>> {
    // Omitted fields: unit-like nodes read `null`, struct nodes read `{}`.
    let behavior = match fields {
        serde_json::Value::Null => serde_json::from_value::<T>(serde_json::Value::Null)
            .or_else(|_| serde_json::from_value::<T>(serde_json::json!({})))?,
        fields => serde_json::from_value::<T>(fields)?,
    };
    Ok(Box::new(behavior))
}

/// Concrete node types by type tag: how to make a default instance and how to load one from
/// persisted fields.
#[derive(Default)]
pub struct NodeRegistry {
    entries: BTreeMap<&'static str, Entry>,
}

impl NodeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with every node type shipped by this crate.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.register::<RootNode>();
        registry.register::<Failure>();
        registry.register::<Succeed>();
        registry.register::<Sequence>();
        registry.register::<Selector>();
        registry.register::<ReactiveSequence>();
        registry.register::<ReactiveSelector>();
        registry.register::<Log>();
        registry.register::<SetProperty>();
        registry.register::<Wait>();
        registry.register::<Condition>();
        registry
    }

    /// Register `T` under its [`Behavior::type_name`], replacing any earlier entry.
    pub fn register<T: Behavior + Default + DeserializeOwned>(&mut self) {
        let sample = T::default();
        self.entries.insert(
            sample.type_name(),
            Entry {
                shape: sample.shape(),
                make: make::<T>,
                load: load::<T>,
            },
        );
    }

    pub fn contains(&self, type_name: &str) -> bool {
        self.entries.contains_key(type_name)
    }

    pub fn type_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.entries.keys().copied()
    }

    pub fn shape_of(&self, type_name: &str) -> Option<NodeShape> {
        self.entries.get(type_name).map(|e| e.shape)
    }

    pub fn create(&self, type_name: &str) -> Result<Box<dyn Behavior>> {
        let entry = self
            .entries
            .get(type_name)
            .ok_or_else(|| TreeError::UnknownNodeType(type_name.to_string()))?;
        Ok((entry.make)())
    }

    pub fn load(&self, type_name: &str, fields: serde_json::Value) -> Result<Box<dyn Behavior>> {
        let entry = self
            .entries
            .get(type_name)
            .ok_or_else(|| TreeError::UnknownNodeType(type_name.to_string()))?;
        (entry.load)(fields).map_err(|source| TreeError::Fields {
            type_name: type_name.to_string(),
            source,
        })
    }
}
