//! Host-facing string and JSON vocabulary.
//!
//! Everything here is plain Rust so the mapping can be tested natively;
//! `lib.rs` only moves values across the wasm boundary.

use board_core::embed::EmbedLoadState;
use board_core::id::{EdgeId, NodeId};
use board_core::model::{ArrowDirection, HandleId, Node, NodeKind, Point, Size};
use board_core::store::{EdgeChange, NodeChange};
use board_editor::InlineEditor;
use board_editor::shortcuts::ShortcutAction;
use serde::Deserialize;

/// Node delta as the host's canvas library reports it.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum HostNodeChange {
    Position { id: NodeId, position: Point },
    Dimensions { id: NodeId, dimensions: Size },
    Select { id: NodeId, selected: bool },
    Remove { id: NodeId },
    Add { item: Node },
}

impl From<HostNodeChange> for NodeChange {
    fn from(change: HostNodeChange) -> Self {
        match change {
            HostNodeChange::Position { id, position } => NodeChange::Position { id, position },
            HostNodeChange::Dimensions { id, dimensions } => NodeChange::Dimensions {
                id,
                size: dimensions,
            },
            HostNodeChange::Select { id, selected } => NodeChange::Select { id, selected },
            HostNodeChange::Remove { id } => NodeChange::Remove { id },
            HostNodeChange::Add { item } => NodeChange::Add { node: item },
        }
    }
}

pub fn parse_node_changes(json: &str) -> Result<Vec<NodeChange>, serde_json::Error> {
    let changes: Vec<HostNodeChange> = serde_json::from_str(json)?;
    Ok(changes.into_iter().map(NodeChange::from).collect())
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum HostEdgeChange {
    Select { id: EdgeId, selected: bool },
    Remove { id: EdgeId },
}

pub fn parse_edge_changes(json: &str) -> Result<Vec<EdgeChange>, serde_json::Error> {
    let changes: Vec<HostEdgeChange> = serde_json::from_str(json)?;
    Ok(changes
        .into_iter()
        .map(|c| match c {
            HostEdgeChange::Select { id, selected } => EdgeChange::Select { id, selected },
            HostEdgeChange::Remove { id } => EdgeChange::Remove { id },
        })
        .collect())
}

/// Connection handle from the host. Absent or `""` is the unnamed top or
/// bottom handle; any other unknown string is an error (`None`).
pub fn parse_handle(raw: Option<&str>) -> Option<Option<HandleId>> {
    match raw {
        None | Some("") => Some(None),
        Some(s) => HandleId::parse(s).map(Some),
    }
}

pub fn parse_kind(kind: &str) -> Option<NodeKind> {
    match kind {
        "markdown" => Some(NodeKind::Markdown),
        "image" => Some(NodeKind::Image),
        "iframe" => Some(NodeKind::Iframe),
        _ => None,
    }
}

pub fn parse_direction(dir: &str) -> Option<ArrowDirection> {
    match dir {
        "forward" => Some(ArrowDirection::Forward),
        "backward" => Some(ArrowDirection::Backward),
        "both" => Some(ArrowDirection::Both),
        "none" => Some(ArrowDirection::None),
        _ => None,
    }
}

pub fn parse_embed_state(state: &str) -> EmbedLoadState {
    match state {
        "loaded" => EmbedLoadState::Loaded,
        "blocked" => EmbedLoadState::Blocked,
        _ => EmbedLoadState::Unknown,
    }
}

/// `"title" | "description" | "footer" | "node"` (the last needs an id).
pub fn parse_editor(target: &str, node_id: Option<&str>) -> Option<InlineEditor> {
    match target {
        "title" => Some(InlineEditor::Title),
        "description" => Some(InlineEditor::Description),
        "footer" => Some(InlineEditor::Footer),
        "node" => node_id.map(|id| InlineEditor::Node(NodeId::intern(id))),
        _ => None,
    }
}

pub fn action_name(action: ShortcutAction) -> &'static str {
    match action {
        ShortcutAction::Undo => "undo",
        ShortcutAction::Redo => "redo",
        ShortcutAction::Copy => "copy",
        ShortcutAction::Paste => "paste",
        ShortcutAction::Delete => "delete",
        ShortcutAction::Deselect => "deselect",
    }
}
