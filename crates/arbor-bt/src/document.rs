//! Persisted form of a [`Tree`](crate::Tree).

use arbor_core::{Blackboard, NodeId, Vec2};
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::tree::ViewTransform;

/// Serialized tree: root id, flat node list, ordered blackboard keys and the view transform.
///
/// Loading goes through [`Tree::from_document`](crate::Tree::from_document), which validates
/// the structure; a document on its own may be malformed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TreeDocument {
    pub root: NodeId,
    pub nodes: Vec<NodeRecord>,
    #[serde(default)]
    pub blackboard: Blackboard,
    #[serde(default)]
    pub view: ViewTransform,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeRecord {
    pub id: NodeId,
    #[serde(rename = "type")]
    pub type_name: String,
    #[serde(default)]
    pub position: Vec2,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<NodeId>,
    #[serde(default)]
    pub fields: serde_json::Value,
}

impl TreeDocument {
    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn node(&self, id: NodeId) -> Option<&NodeRecord> {
        self.nodes.iter().find(|n| n.id == id)
    }
}
