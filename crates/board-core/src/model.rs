//! Board data model: typed content nodes, directed edges, and document
//! metadata.
//!
//! Nodes are positioned in canvas space and carry a type-specific payload.
//! Edges connect two nodes through optional named handles and encode arrow
//! direction as independent start/end markers. The serialized shape mirrors
//! the persisted record: `{id, type, position, size?, draggable, selected, data}`
//! for nodes and `{id, source, target, sourceHandle?, ...}` for edges.

use crate::id::{EdgeId, NodeId};
use serde::{Deserialize, Serialize};

// ─── Geometry ────────────────────────────────────────────────────────────

/// A point in canvas coordinate space.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn offset(self, dx: f32, dy: f32) -> Self {
        Self::new(self.x + dx, self.y + dy)
    }
}

/// Width × height in canvas units.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Size {
    pub width: f32,
    pub height: f32,
}

impl Size {
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }
}

/// Axis-aligned rectangle in canvas space.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub fn from_origin(origin: Point, size: Size) -> Self {
        Self {
            x: origin.x,
            y: origin.y,
            width: size.width,
            height: size.height,
        }
    }

    /// Normalize a rectangle spanned by two arbitrary corners.
    pub fn from_corners(a: Point, b: Point) -> Self {
        Self {
            x: a.x.min(b.x),
            y: a.y.min(b.y),
            width: (b.x - a.x).abs(),
            height: (b.y - a.y).abs(),
        }
    }

    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.x && p.x <= self.right() && p.y >= self.y && p.y <= self.bottom()
    }

    /// AABB overlap (partial selection semantics).
    pub fn intersects(&self, other: &Rect) -> bool {
        self.x < other.right()
            && self.right() > other.x
            && self.y < other.bottom()
            && self.bottom() > other.y
    }

    pub fn union(&self, other: &Rect) -> Rect {
        let x = self.x.min(other.x);
        let y = self.y.min(other.y);
        Rect {
            x,
            y,
            width: self.right().max(other.right()) - x,
            height: self.bottom().max(other.bottom()) - y,
        }
    }
}

// ─── Node kinds & payloads ───────────────────────────────────────────────

/// The closed set of content block types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    Markdown,
    Image,
    Iframe,
}

impl NodeKind {
    /// Size used when a node carries no explicit size.
    pub const fn default_size(self) -> Size {
        match self {
            NodeKind::Markdown => Size::new(300.0, 120.0),
            NodeKind::Image => Size::new(220.0, 160.0),
            NodeKind::Iframe => Size::new(480.0, 320.0),
        }
    }

    /// Smallest size a resize gesture may produce.
    pub const fn min_size(self) -> Size {
        match self {
            NodeKind::Markdown => Size::new(100.0, 60.0),
            NodeKind::Image => Size::new(80.0, 60.0),
            NodeKind::Iframe => Size::new(160.0, 120.0),
        }
    }

    /// Wire name, also used as the id prefix for pasted duplicates.
    pub const fn as_str(self) -> &'static str {
        match self {
            NodeKind::Markdown => "markdown",
            NodeKind::Image => "image",
            NodeKind::Iframe => "iframe",
        }
    }

    /// Id prefix for nodes created from the toolbar or a drop.
    pub const fn creation_prefix(self) -> &'static str {
        match self {
            NodeKind::Markdown => "md",
            NodeKind::Image => "img",
            NodeKind::Iframe => "iframe",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct MarkdownData {
    pub content: String,
    pub censored: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub show_outline: Option<bool>,
}

/// Image or video; `src` is a remote URI or a self-contained data URI.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ImageData {
    pub src: String,
    pub censored: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub show_outline: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct IframeData {
    pub url: String,
    pub censored: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub show_outline: Option<bool>,
}

/// Type-specific node data. Serialized adjacently as `"type"` + `"data"`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "lowercase")]
pub enum Payload {
    Markdown(MarkdownData),
    Image(ImageData),
    Iframe(IframeData),
}

impl Payload {
    pub fn markdown(content: impl Into<String>) -> Self {
        Payload::Markdown(MarkdownData {
            content: content.into(),
            ..Default::default()
        })
    }

    pub fn image(src: impl Into<String>) -> Self {
        Payload::Image(ImageData {
            src: src.into(),
            ..Default::default()
        })
    }

    pub fn iframe(url: impl Into<String>) -> Self {
        Payload::Iframe(IframeData {
            url: url.into(),
            ..Default::default()
        })
    }

    pub fn kind(&self) -> NodeKind {
        match self {
            Payload::Markdown(_) => NodeKind::Markdown,
            Payload::Image(_) => NodeKind::Image,
            Payload::Iframe(_) => NodeKind::Iframe,
        }
    }

    pub fn censored(&self) -> bool {
        match self {
            Payload::Markdown(d) => d.censored,
            Payload::Image(d) => d.censored,
            Payload::Iframe(d) => d.censored,
        }
    }

    pub fn show_outline(&self) -> Option<bool> {
        match self {
            Payload::Markdown(d) => d.show_outline,
            Payload::Image(d) => d.show_outline,
            Payload::Iframe(d) => d.show_outline,
        }
    }

    /// Shallow merge: write only the fields present in `patch`. Fields that
    /// do not exist on this payload's type are ignored. Returns whether
    /// anything changed.
    pub fn merge(&mut self, patch: &PayloadPatch) -> bool {
        let mut changed = false;
        let (censored, show_outline) = match self {
            Payload::Markdown(d) => {
                changed |= set_if(&mut d.content, &patch.content);
                (&mut d.censored, &mut d.show_outline)
            }
            Payload::Image(d) => {
                changed |= set_if(&mut d.src, &patch.src);
                (&mut d.censored, &mut d.show_outline)
            }
            Payload::Iframe(d) => {
                changed |= set_if(&mut d.url, &patch.url);
                (&mut d.censored, &mut d.show_outline)
            }
        };
        if let Some(c) = patch.censored
            && *censored != c
        {
            *censored = c;
            changed = true;
        }
        if let Some(o) = patch.show_outline
            && *show_outline != Some(o)
        {
            *show_outline = Some(o);
            changed = true;
        }
        changed
    }
}

fn set_if(slot: &mut String, value: &Option<String>) -> bool {
    match value {
        Some(v) if slot != v => {
            slot.clone_from(v);
            true
        }
        _ => false,
    }
}

/// Partial payload update. `None` fields are left untouched.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PayloadPatch {
    pub content: Option<String>,
    pub src: Option<String>,
    pub url: Option<String>,
    pub censored: Option<bool>,
    pub show_outline: Option<bool>,
}

impl PayloadPatch {
    pub fn is_empty(&self) -> bool {
        self == &PayloadPatch::default()
    }
}

// ─── Nodes ───────────────────────────────────────────────────────────────

/// A positioned content block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Node {
    pub id: NodeId,
    pub position: Point,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<Size>,
    #[serde(default)]
    pub draggable: bool,
    #[serde(default)]
    pub selected: bool,
    #[serde(flatten)]
    pub payload: Payload,
}

impl Node {
    /// A new unselected, non-draggable node with the type's default size.
    pub fn new(id: NodeId, position: Point, payload: Payload) -> Self {
        Self {
            id,
            position,
            size: None,
            draggable: false,
            selected: false,
            payload,
        }
    }

    pub fn kind(&self) -> NodeKind {
        self.payload.kind()
    }

    /// Explicit size, or the type default when absent.
    pub fn effective_size(&self) -> Size {
        self.size.unwrap_or_else(|| self.kind().default_size())
    }

    pub fn bounds(&self) -> Rect {
        Rect::from_origin(self.position, self.effective_size())
    }
}

/// Partial node update, the single entry point renderers use to report
/// changes back. First-class fields replace wholesale; payload merges.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct NodePatch {
    pub position: Option<Point>,
    pub size: Option<Size>,
    pub draggable: Option<bool>,
    pub selected: Option<bool>,
    #[serde(flatten)]
    pub payload: PayloadPatch,
}

impl NodePatch {
    pub fn position(position: Point) -> Self {
        Self {
            position: Some(position),
            ..Default::default()
        }
    }

    pub fn bounds(position: Point, size: Size) -> Self {
        Self {
            position: Some(position),
            size: Some(size),
            ..Default::default()
        }
    }

    pub fn draggable(draggable: bool) -> Self {
        Self {
            draggable: Some(draggable),
            ..Default::default()
        }
    }

    pub fn selected(selected: bool) -> Self {
        Self {
            selected: Some(selected),
            ..Default::default()
        }
    }

    pub fn payload(payload: PayloadPatch) -> Self {
        Self {
            payload,
            ..Default::default()
        }
    }
}

// ─── Edges ───────────────────────────────────────────────────────────────

/// Named attachment points. Top (target) and bottom (source) carry no id;
/// left and right each carry a collocated source + target pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HandleId {
    #[serde(rename = "left-src")]
    LeftSource,
    #[serde(rename = "left-tgt")]
    LeftTarget,
    #[serde(rename = "right-src")]
    RightSource,
    #[serde(rename = "right-tgt")]
    RightTarget,
}

impl HandleId {
    pub const ALL: [HandleId; 4] = [
        HandleId::LeftSource,
        HandleId::LeftTarget,
        HandleId::RightSource,
        HandleId::RightTarget,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            HandleId::LeftSource => "left-src",
            HandleId::LeftTarget => "left-tgt",
            HandleId::RightSource => "right-src",
            HandleId::RightTarget => "right-tgt",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|h| h.as_str() == s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum MarkerKind {
    #[default]
    #[serde(rename = "arrow")]
    Arrow,
    #[serde(rename = "arrowclosed")]
    ArrowClosed,
}

/// Arrow head drawn at one end of an edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Marker {
    #[serde(rename = "type")]
    pub kind: MarkerKind,
}

impl Marker {
    pub const ARROW: Marker = Marker {
        kind: MarkerKind::Arrow,
    };
}

/// The four exhaustive arrow states of an edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArrowDirection {
    #[default]
    Forward,
    Backward,
    Both,
    None,
}

impl ArrowDirection {
    pub fn from_markers(start: bool, end: bool) -> Self {
        match (start, end) {
            (false, true) => ArrowDirection::Forward,
            (true, false) => ArrowDirection::Backward,
            (true, true) => ArrowDirection::Both,
            (false, false) => ArrowDirection::None,
        }
    }

    /// `(marker_start, marker_end)` for this direction.
    pub fn markers(self) -> (Option<Marker>, Option<Marker>) {
        match self {
            ArrowDirection::Forward => (None, Some(Marker::ARROW)),
            ArrowDirection::Backward => (Some(Marker::ARROW), None),
            ArrowDirection::Both => (Some(Marker::ARROW), Some(Marker::ARROW)),
            ArrowDirection::None => (None, None),
        }
    }
}

/// A proposed connection from a user connect gesture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Connection {
    pub source: NodeId,
    pub target: NodeId,
    #[serde(default)]
    pub source_handle: Option<HandleId>,
    #[serde(default)]
    pub target_handle: Option<HandleId>,
}

/// A connection between two node endpoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Edge {
    pub id: EdgeId,
    pub source: NodeId,
    pub target: NodeId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_handle: Option<HandleId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_handle: Option<HandleId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub marker_start: Option<Marker>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub marker_end: Option<Marker>,
    #[serde(default)]
    pub animated: bool,
    #[serde(default)]
    pub selected: bool,
}

impl Edge {
    /// Materialize an accepted connection: forward arrow, animated.
    pub fn from_connection(id: EdgeId, conn: Connection) -> Self {
        Self {
            id,
            source: conn.source,
            target: conn.target,
            source_handle: conn.source_handle,
            target_handle: conn.target_handle,
            marker_start: None,
            marker_end: Some(Marker::ARROW),
            animated: true,
            selected: false,
        }
    }

    pub fn connection(&self) -> Connection {
        Connection {
            source: self.source,
            target: self.target,
            source_handle: self.source_handle,
            target_handle: self.target_handle,
        }
    }

    pub fn direction(&self) -> ArrowDirection {
        ArrowDirection::from_markers(self.marker_start.is_some(), self.marker_end.is_some())
    }

    pub fn set_direction(&mut self, direction: ArrowDirection) {
        (self.marker_start, self.marker_end) = direction.markers();
    }
}

/// Partial edge update from the contextual edge menu.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct EdgePatch {
    pub direction: Option<ArrowDirection>,
    pub animated: Option<bool>,
    pub selected: Option<bool>,
}

// ─── Document metadata ───────────────────────────────────────────────────

pub const DEFAULT_TITLE: &str = "Untitled Canvas";

/// Remembered size of the description editor.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct DescSize {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<f32>,
}

/// An entry in the board's link list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Link {
    pub id: String,
    pub label: String,
    pub url: String,
}

/// Partial link update.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LinkPatch {
    pub label: Option<String>,
    pub url: Option<String>,
}

/// Free-form page chrome, persisted alongside the graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoardMeta {
    pub title: String,
    pub description: String,
    pub desc_size: DescSize,
    pub links: Vec<Link>,
    pub footer_text: String,
}

impl Default for BoardMeta {
    fn default() -> Self {
        Self {
            title: DEFAULT_TITLE.to_string(),
            description: String::new(),
            desc_size: DescSize::default(),
            links: Vec::new(),
            footer_text: String::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn payload_merge_keeps_unspecified_fields() {
        let mut p = Payload::Markdown(MarkdownData {
            content: "old".into(),
            censored: false,
            show_outline: Some(true),
        });
        let changed = p.merge(&PayloadPatch {
            content: Some("x".into()),
            ..Default::default()
        });
        assert!(changed);
        assert_eq!(
            p,
            Payload::Markdown(MarkdownData {
                content: "x".into(),
                censored: false,
                show_outline: Some(true),
            })
        );
    }

    #[test]
    fn payload_merge_ignores_foreign_fields() {
        let mut p = Payload::image("a.png");
        let changed = p.merge(&PayloadPatch {
            url: Some("https://example.com".into()),
            content: Some("text".into()),
            ..Default::default()
        });
        assert!(!changed);
        assert_eq!(p, Payload::image("a.png"));
    }

    #[test]
    fn outline_toggle_does_not_erase_media_source() {
        let mut p = Payload::image("data:image/png;base64,AAAA");
        p.merge(&PayloadPatch {
            show_outline: Some(false),
            ..Default::default()
        });
        match &p {
            Payload::Image(d) => {
                assert_eq!(d.src, "data:image/png;base64,AAAA");
                assert_eq!(d.show_outline, Some(false));
            }
            _ => panic!("expected image payload"),
        }
    }

    #[test]
    fn node_wire_shape() {
        let mut node = Node::new(
            NodeId::intern("md_1"),
            Point::new(10.0, 20.0),
            Payload::markdown("# hi"),
        );
        node.size = Some(Size::new(300.0, 200.0));
        let json = serde_json::to_value(&node).unwrap();
        assert_eq!(json["type"], "markdown");
        assert_eq!(json["data"]["content"], "# hi");
        assert_eq!(json["position"]["x"], 10.0);
        assert_eq!(json["size"]["height"], 200.0);

        let back: Node = serde_json::from_value(json).unwrap();
        assert_eq!(back, node);
    }

    #[test]
    fn node_without_optional_fields_parses() {
        let json = r#"{"id":"img_9","type":"image","position":{"x":1,"y":2},"data":{"src":"a.png"}}"#;
        let node: Node = serde_json::from_str(json).unwrap();
        assert_eq!(node.kind(), NodeKind::Image);
        assert!(!node.draggable);
        assert_eq!(node.effective_size(), NodeKind::Image.default_size());
    }

    #[test]
    fn arrow_direction_markers() {
        for dir in [
            ArrowDirection::Forward,
            ArrowDirection::Backward,
            ArrowDirection::Both,
            ArrowDirection::None,
        ] {
            let (s, e) = dir.markers();
            assert_eq!(ArrowDirection::from_markers(s.is_some(), e.is_some()), dir);
        }
    }

    #[test]
    fn new_edge_is_forward_and_animated() {
        let conn = Connection {
            source: NodeId::intern("a"),
            target: NodeId::intern("b"),
            source_handle: Some(HandleId::RightSource),
            target_handle: None,
        };
        let edge = Edge::from_connection(EdgeId::intern("e_1"), conn);
        assert_eq!(edge.direction(), ArrowDirection::Forward);
        assert!(edge.animated);
        let json = serde_json::to_value(&edge).unwrap();
        assert_eq!(json["sourceHandle"], "right-src");
        assert_eq!(json["markerEnd"]["type"], "arrow");
        assert!(json.get("targetHandle").is_none());
    }

    #[test]
    fn rect_intersection_is_partial() {
        let a = Rect::from_origin(Point::new(0.0, 0.0), Size::new(100.0, 100.0));
        let b = Rect::from_corners(Point::new(150.0, 150.0), Point::new(90.0, 90.0));
        assert!(a.intersects(&b));
        let c = Rect::from_origin(Point::new(101.0, 0.0), Size::new(10.0, 10.0));
        assert!(!a.intersects(&c));
    }
}
