use arbor_core::Vec2;
use serde::{Deserialize, Serialize};

/// Editor behavior knobs, loadable from the `editor` section of the CLI config.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorSettings {
    /// Paste copies field values; when off, pasted nodes are fresh defaults of the same type.
    pub copy_node_values: bool,
    pub paste_offset: Vec2,
    /// Undo steps kept; 0 keeps everything.
    pub history_limit: usize,
}

impl Default for EditorSettings {
    fn default() -> Self {
        Self {
            copy_node_values: true,
            paste_offset: Vec2::new(50.0, 50.0),
            history_limit: 100,
        }
    }
}
