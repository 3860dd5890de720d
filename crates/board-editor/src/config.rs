//! Editor tuning knobs. Deserializable so a host can pass them as JSON;
//! every field is optional on the wire.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EditorConfig {
    /// Quiet period after the last data change before autosave writes.
    pub debounce_ms: u64,
    /// Unconditional backstop save interval.
    pub autosave_interval_ms: u64,
    /// Maximum undo entries kept.
    pub history_depth: usize,
    /// Canvas offset applied to pasted duplicates, on both axes.
    pub paste_offset: f32,
    /// Record store key the board lives under.
    pub record_key: String,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            debounce_ms: 800,
            autosave_interval_ms: 5000,
            history_depth: 100,
            paste_offset: 40.0,
            record_key: "default".to_string(),
        }
    }
}
