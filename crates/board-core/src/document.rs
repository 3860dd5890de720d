//! Persisted board record and the export/import codec.
//!
//! The record is lenient on the way in: every field defaults when missing,
//! and edges that reference unknown handle ids or missing nodes are dropped
//! with a warning. On the way out it is pretty-printed JSON.

use crate::error::DocumentError;
use crate::id::{EdgeId, NodeId};
use crate::model::*;
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashSet;

/// In-memory document: the graph plus its metadata.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct BoardDocument {
    pub nodes: Vec<Node>,
    pub edges: Vec<Edge>,
    pub meta: BoardMeta,
}

/// Edge as stored on disk. Handle ids stay raw strings until validated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EdgeRecord {
    pub id: EdgeId,
    pub source: NodeId,
    pub target: NodeId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_handle: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_handle: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub marker_start: Option<Marker>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub marker_end: Option<Marker>,
    #[serde(default)]
    pub animated: bool,
}

/// An empty handle string is the same as no handle.
fn parse_handle(raw: &Option<String>) -> Result<Option<HandleId>, ()> {
    match raw.as_deref() {
        None | Some("") => Ok(None),
        Some(s) => HandleId::parse(s).map(Some).ok_or(()),
    }
}

impl EdgeRecord {
    fn into_edge(self) -> Option<Edge> {
        let source_handle = parse_handle(&self.source_handle).ok()?;
        let target_handle = parse_handle(&self.target_handle).ok()?;
        Some(Edge {
            id: self.id,
            source: self.source,
            target: self.target,
            source_handle,
            target_handle,
            marker_start: self.marker_start,
            marker_end: self.marker_end,
            animated: self.animated,
            selected: false,
        })
    }
}

impl From<&Edge> for EdgeRecord {
    fn from(e: &Edge) -> Self {
        Self {
            id: e.id,
            source: e.source,
            target: e.target,
            source_handle: e.source_handle.map(|h| h.as_str().to_string()),
            target_handle: e.target_handle.map(|h| h.as_str().to_string()),
            marker_start: e.marker_start,
            marker_end: e.marker_end,
            animated: e.animated,
        }
    }
}

/// The durable record: one per board.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BoardRecord {
    #[serde(deserialize_with = "nodes_with_legacy_size")]
    pub nodes: Vec<Node>,
    pub edges: Vec<EdgeRecord>,
    pub title: String,
    pub description: String,
    pub desc_size: DescSize,
    pub links: Vec<Link>,
    pub footer_text: String,
}

impl Default for BoardRecord {
    fn default() -> Self {
        Self {
            nodes: Vec::new(),
            edges: Vec::new(),
            title: DEFAULT_TITLE.to_string(),
            description: String::new(),
            desc_size: DescSize::default(),
            links: Vec::new(),
            footer_text: String::new(),
        }
    }
}

/// Older exports keep a node's size inside its payload as `data.width` /
/// `data.height`, each falling back to the type default on its own. A
/// top-level `size` wins when both are present.
fn nodes_with_legacy_size<'de, D: Deserializer<'de>>(de: D) -> Result<Vec<Node>, D::Error> {
    let raw: Vec<serde_json::Value> = Vec::deserialize(de)?;
    raw.into_iter()
        .map(|mut value| {
            lift_legacy_size(&mut value);
            serde_json::from_value(value).map_err(D::Error::custom)
        })
        .collect()
}

fn lift_legacy_size(node: &mut serde_json::Value) {
    let Some(obj) = node.as_object_mut() else {
        return;
    };
    if obj.get("size").is_some_and(|s| !s.is_null()) {
        return;
    }
    let Some(kind) = obj
        .get("type")
        .and_then(|t| NodeKind::deserialize(t).ok())
    else {
        return;
    };
    let dim = |key: &str| {
        obj.get("data")
            .and_then(|d| d.get(key))
            .and_then(serde_json::Value::as_f64)
            .filter(|v| *v > 0.0)
    };
    let (width, height) = (dim("width"), dim("height"));
    if width.is_none() && height.is_none() {
        return;
    }
    let default = kind.default_size();
    let size = Size::new(
        width.map_or(default.width, |w| w as f32),
        height.map_or(default.height, |h| h as f32),
    );
    obj.insert(
        "size".to_string(),
        serde_json::json!({ "width": size.width, "height": size.height }),
    );
}

impl BoardRecord {
    /// Validate into a document: drops edges with unknown handle ids or
    /// dangling endpoints, and clears transient flags.
    pub fn into_document(self) -> BoardDocument {
        let mut nodes = self.nodes;
        for n in &mut nodes {
            n.selected = false;
            n.draggable = false;
        }
        let live: HashSet<NodeId> = nodes.iter().map(|n| n.id).collect();

        let edges = self
            .edges
            .into_iter()
            .filter_map(|rec| {
                let id = rec.id;
                let Some(edge) = rec.into_edge() else {
                    log::warn!("dropping edge {id:?}: unknown handle id");
                    return None;
                };
                if !live.contains(&edge.source) || !live.contains(&edge.target) {
                    log::warn!("dropping edge {id:?}: missing endpoint");
                    return None;
                }
                Some(edge)
            })
            .collect();

        BoardDocument {
            nodes,
            edges,
            meta: BoardMeta {
                title: self.title,
                description: self.description,
                desc_size: self.desc_size,
                links: self.links,
                footer_text: self.footer_text,
            },
        }
    }
}

impl From<&BoardDocument> for BoardRecord {
    fn from(doc: &BoardDocument) -> Self {
        Self {
            nodes: doc.nodes.clone(),
            edges: doc.edges.iter().map(EdgeRecord::from).collect(),
            title: doc.meta.title.clone(),
            description: doc.meta.description.clone(),
            desc_size: doc.meta.desc_size,
            links: doc.meta.links.clone(),
            footer_text: doc.meta.footer_text.clone(),
        }
    }
}

// ─── Export / import ─────────────────────────────────────────────────────

/// A file ready to hand to the host's download mechanism.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportFile {
    pub filename: String,
    pub contents: String,
}

/// `<title>.json` with everything except ASCII alphanumerics, space, `-` and
/// `_` stripped. An empty result becomes `untitled`.
pub fn export_filename(title: &str) -> String {
    let stem: String = title
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, ' ' | '-' | '_'))
        .collect();
    if stem.trim().is_empty() {
        "untitled.json".to_string()
    } else {
        format!("{stem}.json")
    }
}

pub fn export_document(doc: &BoardDocument) -> Result<ExportFile, DocumentError> {
    let contents =
        serde_json::to_string_pretty(&BoardRecord::from(doc)).map_err(DocumentError::Encode)?;
    Ok(ExportFile {
        filename: export_filename(&doc.meta.title),
        contents,
    })
}

/// Parse an exported (or persisted) document. Lenient about missing fields,
/// strict about malformed JSON.
pub fn parse_document(text: &str) -> Result<BoardDocument, DocumentError> {
    let value: serde_json::Value = serde_json::from_str(text).map_err(DocumentError::Parse)?;
    if !value.is_object() {
        return Err(DocumentError::NotADocument);
    }
    let record: BoardRecord = serde_json::from_value(value).map_err(DocumentError::Parse)?;
    Ok(record.into_document())
}
