//! Graph store: the single source of truth for nodes, edges, document
//! metadata and transient UI state.
//!
//! Every effective mutation publishes one [`StoreEvent`] naming the
//! [`Channel`]s it touched. Subscribers (autosave, renderers) decide what to
//! do from the channel list alone:
//!
//! - **data** channels (`Nodes`, `Edges`, `Title`, ...) describe persisted
//!   content and arm autosave;
//! - **UI** channels (`Selection`, `Draggable`, `Locked`, ...) describe view
//!   state that is never written to storage.
//!
//! No-op mutations publish nothing.

use crate::document::BoardDocument;
use crate::id::{EdgeId, NodeId, suffixed};
use crate::model::*;
use smallvec::SmallVec;
use std::collections::{HashMap, HashSet};

// ─── Events ──────────────────────────────────────────────────────────────

/// A slice of store state that subscribers can react to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Channel {
    Nodes,
    Edges,
    Title,
    Description,
    DescSize,
    FooterText,
    Links,
    Selection,
    Draggable,
    Locked,
    Outline,
    Editing,
    DescVisible,
    Connecting,
}

impl Channel {
    /// Whether this channel carries persisted document content.
    pub const fn is_data(self) -> bool {
        matches!(
            self,
            Channel::Nodes
                | Channel::Edges
                | Channel::Title
                | Channel::Description
                | Channel::DescSize
                | Channel::FooterText
                | Channel::Links
        )
    }
}

pub type Channels = SmallVec<[Channel; 4]>;

/// Published after every effective mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreEvent {
    pub channels: Channels,
}

impl StoreEvent {
    pub fn touches_data(&self) -> bool {
        self.channels.iter().any(|c| c.is_data())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Listener = Box<dyn FnMut(&StoreEvent)>;

// ─── Structural deltas ───────────────────────────────────────────────────

/// Node delta reported by built-in drag, resize and selection handling.
#[derive(Debug, Clone, PartialEq)]
pub enum NodeChange {
    Position { id: NodeId, position: Point },
    Dimensions { id: NodeId, size: Size },
    Select { id: NodeId, selected: bool },
    Remove { id: NodeId },
    Add { node: Node },
}

impl NodeChange {
    pub fn id(&self) -> NodeId {
        match self {
            NodeChange::Position { id, .. }
            | NodeChange::Dimensions { id, .. }
            | NodeChange::Select { id, .. }
            | NodeChange::Remove { id } => *id,
            NodeChange::Add { node } => node.id,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EdgeChange {
    Select { id: EdgeId, selected: bool },
    Remove { id: EdgeId },
}

// ─── Snapshot & UI state ─────────────────────────────────────────────────

/// Deep copy of the graph content used by history.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Snapshot {
    pub nodes: Vec<Node>,
    pub edges: Vec<Edge>,
}

impl Snapshot {
    /// Compare graph content, ignoring selection and draggable flags.
    pub fn same_content(&self, other: &Snapshot) -> bool {
        fn node_eq(a: &Node, b: &Node) -> bool {
            a.id == b.id && a.position == b.position && a.size == b.size && a.payload == b.payload
        }
        fn edge_eq(a: &Edge, b: &Edge) -> bool {
            a.id == b.id
                && a.connection() == b.connection()
                && a.marker_start == b.marker_start
                && a.marker_end == b.marker_end
                && a.animated == b.animated
        }
        self.nodes.len() == other.nodes.len()
            && self.edges.len() == other.edges.len()
            && self.nodes.iter().zip(&other.nodes).all(|(a, b)| node_eq(a, b))
            && self.edges.iter().zip(&other.edges).all(|(a, b)| edge_eq(a, b))
    }
}

/// Transient view state, never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UiState {
    pub locked: bool,
    pub show_outline: bool,
    pub editing: bool,
    pub show_desc: bool,
    pub connecting: bool,
}

impl Default for UiState {
    fn default() -> Self {
        Self {
            locked: false,
            show_outline: true,
            editing: false,
            show_desc: true,
            connecting: false,
        }
    }
}

// ─── Store ───────────────────────────────────────────────────────────────

/// Owns the board graph. Nodes and edges keep insertion order (render
/// order); id lookups go through a side index.
#[derive(Default)]
pub struct GraphStore {
    nodes: Vec<Node>,
    node_index: HashMap<NodeId, usize>,
    edges: Vec<Edge>,
    edge_index: HashMap<EdgeId, usize>,
    /// Every node id ever accepted; fresh ids never collide with these.
    issued_nodes: HashSet<NodeId>,
    issued_edges: HashSet<EdgeId>,
    meta: BoardMeta,
    ui: UiState,
    listeners: Vec<(SubscriptionId, Listener)>,
    next_subscription: u64,
}

impl std::fmt::Debug for GraphStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GraphStore")
            .field("nodes", &self.nodes.len())
            .field("edges", &self.edges.len())
            .field("meta", &self.meta)
            .field("ui", &self.ui)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

impl GraphStore {
    pub fn new() -> Self {
        Self::default()
    }

    // ─── Subscription ────────────────────────────────────────────────────

    pub fn subscribe(&mut self, listener: impl FnMut(&StoreEvent) + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(sid, _)| *sid != id);
        self.listeners.len() != before
    }

    fn publish(&mut self, mut channels: Channels) {
        if channels.is_empty() {
            return;
        }
        let mut seen = HashSet::with_capacity(channels.len());
        channels.retain(|c| seen.insert(*c));
        let event = StoreEvent { channels };
        for (_, listener) in &mut self.listeners {
            listener(&event);
        }
    }

    // ─── Queries ─────────────────────────────────────────────────────────

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.node_index.get(&id).map(|&i| &self.nodes[i])
    }

    pub fn edge(&self, id: EdgeId) -> Option<&Edge> {
        self.edge_index.get(&id).map(|&i| &self.edges[i])
    }

    pub fn contains_node(&self, id: NodeId) -> bool {
        self.node_index.contains_key(&id)
    }

    pub fn meta(&self) -> &BoardMeta {
        &self.meta
    }

    pub fn ui(&self) -> &UiState {
        &self.ui
    }

    pub fn selected_nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.iter().filter(|n| n.selected)
    }

    pub fn selected_edges(&self) -> impl Iterator<Item = &Edge> {
        self.edges.iter().filter(|e| e.selected)
    }

    /// Whether an edge with this endpoint 4-tuple already exists.
    pub fn has_connection(&self, conn: &Connection) -> bool {
        self.edges.iter().any(|e| e.connection() == *conn)
    }

    pub fn document(&self) -> BoardDocument {
        BoardDocument {
            nodes: self.nodes.clone(),
            edges: self.edges.clone(),
            meta: self.meta.clone(),
        }
    }

    // ─── Id issuance ─────────────────────────────────────────────────────

    /// Reserve a never-before-issued node id `prefix_stamp` (suffixed on
    /// collision).
    pub fn fresh_node_id(&mut self, prefix: &str, stamp: u64) -> NodeId {
        self.reserve_node_id(&format!("{prefix}_{stamp}"))
    }

    /// Reserve a never-before-issued node id starting from `base`.
    pub fn reserve_node_id(&mut self, base: &str) -> NodeId {
        let mut attempt = 0;
        loop {
            let id = NodeId::intern(&suffixed(base, attempt));
            if self.issued_nodes.insert(id) {
                return id;
            }
            attempt += 1;
        }
    }

    /// Reserve a never-before-issued edge id `e_stamp`.
    pub fn fresh_edge_id(&mut self, stamp: u64) -> EdgeId {
        let base = format!("e_{stamp}");
        let mut attempt = 0;
        loop {
            let id = EdgeId::intern(&suffixed(&base, attempt));
            if self.issued_edges.insert(id) {
                return id;
            }
            attempt += 1;
        }
    }

    // ─── Node mutations ──────────────────────────────────────────────────

    /// Replace every node. Duplicate ids keep the first occurrence; edges
    /// left dangling are dropped.
    pub fn set_nodes(&mut self, nodes: Vec<Node>) {
        let mut channels = Channels::new();
        self.replace_nodes(nodes, &mut channels);
        self.publish(channels);
    }

    fn replace_nodes(&mut self, nodes: Vec<Node>, channels: &mut Channels) {
        let mut seen = HashSet::with_capacity(nodes.len());
        let nodes: Vec<Node> = nodes
            .into_iter()
            .filter(|n| {
                let fresh = seen.insert(n.id);
                if !fresh {
                    log::warn!("dropping duplicate node {:?}", n.id);
                }
                fresh
            })
            .collect();
        if nodes == self.nodes {
            return;
        }
        self.issued_nodes.extend(nodes.iter().map(|n| n.id));
        self.nodes = nodes;
        self.reindex_nodes();
        channels.push(Channel::Nodes);
        let live = &self.node_index;
        let before = self.edges.len();
        self.edges
            .retain(|e| live.contains_key(&e.source) && live.contains_key(&e.target));
        if self.edges.len() != before {
            self.reindex_edges();
            channels.push(Channel::Edges);
        }
    }

    /// Insert a node. Rejected when its id is already live.
    pub fn add_node(&mut self, node: Node) -> bool {
        let mut channels = Channels::new();
        let added = self.insert_node(node, &mut channels);
        self.publish(channels);
        added
    }

    fn insert_node(&mut self, node: Node, channels: &mut Channels) -> bool {
        if self.node_index.contains_key(&node.id) {
            log::debug!("add_node rejected: {:?} already exists", node.id);
            return false;
        }
        self.issued_nodes.insert(node.id);
        self.node_index.insert(node.id, self.nodes.len());
        if node.selected {
            channels.push(Channel::Selection);
        }
        self.nodes.push(node);
        channels.push(Channel::Nodes);
        true
    }

    /// Merge `patch` into the node. Unknown ids are ignored.
    pub fn patch_node(&mut self, id: NodeId, patch: &NodePatch) -> bool {
        let mut channels = Channels::new();
        self.patch_node_into(id, patch, &mut channels);
        let changed = !channels.is_empty();
        self.publish(channels);
        changed
    }

    fn patch_node_into(&mut self, id: NodeId, patch: &NodePatch, channels: &mut Channels) {
        let Some(&i) = self.node_index.get(&id) else {
            return;
        };
        let node = &mut self.nodes[i];
        let mut content = false;
        if let Some(p) = patch.position
            && node.position != p
        {
            node.position = p;
            content = true;
        }
        if let Some(s) = patch.size {
            // No resize path may shrink a node below its type minimum.
            let min = node.kind().min_size();
            let s = Size::new(s.width.max(min.width), s.height.max(min.height));
            if node.size != Some(s) {
                node.size = Some(s);
                content = true;
            }
        }
        content |= node.payload.merge(&patch.payload);
        if content {
            channels.push(Channel::Nodes);
        }
        if let Some(d) = patch.draggable
            && node.draggable != d
        {
            node.draggable = d;
            channels.push(Channel::Draggable);
        }
        if let Some(s) = patch.selected
            && node.selected != s
        {
            node.selected = s;
            channels.push(Channel::Selection);
        }
    }

    /// Delete a node and every edge attached to it.
    pub fn remove_node(&mut self, id: NodeId) -> bool {
        let mut channels = Channels::new();
        let removed = self.remove_node_into(id, &mut channels);
        self.publish(channels);
        removed
    }

    fn remove_node_into(&mut self, id: NodeId, channels: &mut Channels) -> bool {
        let Some(i) = self.node_index.remove(&id) else {
            return false;
        };
        self.nodes.remove(i);
        self.reindex_nodes();
        channels.push(Channel::Nodes);
        let before = self.edges.len();
        self.edges.retain(|e| e.source != id && e.target != id);
        if self.edges.len() != before {
            self.reindex_edges();
            channels.push(Channel::Edges);
        }
        true
    }

    /// Apply a batch of structural deltas as one published event.
    pub fn apply_node_changes(&mut self, changes: Vec<NodeChange>) {
        let mut channels = Channels::new();
        for change in changes {
            match change {
                NodeChange::Position { id, position } => {
                    self.patch_node_into(id, &NodePatch::position(position), &mut channels)
                }
                NodeChange::Dimensions { id, size } => {
                    let patch = NodePatch {
                        size: Some(size),
                        ..Default::default()
                    };
                    self.patch_node_into(id, &patch, &mut channels)
                }
                NodeChange::Select { id, selected } => {
                    self.patch_node_into(id, &NodePatch::selected(selected), &mut channels)
                }
                NodeChange::Remove { id } => {
                    self.remove_node_into(id, &mut channels);
                }
                NodeChange::Add { node } => {
                    self.insert_node(node, &mut channels);
                }
            }
        }
        self.publish(channels);
    }

    /// Set the selection flag of every node and edge.
    pub fn select_all(&mut self, selected: bool) -> bool {
        let mut changed = false;
        for n in &mut self.nodes {
            changed |= n.selected != selected;
            n.selected = selected;
        }
        for e in &mut self.edges {
            changed |= e.selected != selected;
            e.selected = selected;
        }
        if changed {
            self.publish(Channels::from_slice(&[Channel::Selection]));
        }
        changed
    }

    /// Select exactly `ids` among nodes (edges are deselected).
    pub fn select_nodes(&mut self, ids: &HashSet<NodeId>) -> bool {
        let mut changed = false;
        for n in &mut self.nodes {
            let selected = ids.contains(&n.id);
            changed |= n.selected != selected;
            n.selected = selected;
        }
        for e in &mut self.edges {
            changed |= e.selected;
            e.selected = false;
        }
        if changed {
            self.publish(Channels::from_slice(&[Channel::Selection]));
        }
        changed
    }

    /// Turn free drag off for every node.
    pub fn disable_drag_all(&mut self) -> bool {
        let mut changed = false;
        for n in &mut self.nodes {
            changed |= n.draggable;
            n.draggable = false;
        }
        if changed {
            self.publish(Channels::from_slice(&[Channel::Draggable]));
        }
        changed
    }

    // ─── Edge mutations ──────────────────────────────────────────────────

    /// Replace every edge. Duplicate ids or endpoint tuples keep the first
    /// occurrence; edges pointing at missing nodes are dropped.
    pub fn set_edges(&mut self, edges: Vec<Edge>) {
        let mut channels = Channels::new();
        self.replace_edges(edges, &mut channels);
        self.publish(channels);
    }

    fn replace_edges(&mut self, edges: Vec<Edge>, channels: &mut Channels) {
        let mut ids = HashSet::with_capacity(edges.len());
        let mut tuples = HashSet::with_capacity(edges.len());
        let edges: Vec<Edge> = edges
            .into_iter()
            .filter(|e| {
                let keep = self.node_index.contains_key(&e.source)
                    && self.node_index.contains_key(&e.target)
                    && ids.insert(e.id)
                    && tuples.insert(e.connection());
                if !keep {
                    log::warn!("dropping edge {:?}", e.id);
                }
                keep
            })
            .collect();
        if edges == self.edges {
            return;
        }
        self.issued_edges.extend(edges.iter().map(|e| e.id));
        self.edges = edges;
        self.reindex_edges();
        channels.push(Channel::Edges);
    }

    /// Insert an edge. Rejected on a live duplicate id, a duplicate endpoint
    /// tuple, or a missing endpoint.
    pub fn add_edge(&mut self, edge: Edge) -> bool {
        if self.edge_index.contains_key(&edge.id) || self.has_connection(&edge.connection()) {
            log::debug!("add_edge rejected: duplicate {:?}", edge.id);
            return false;
        }
        if !self.contains_node(edge.source) || !self.contains_node(edge.target) {
            log::debug!("add_edge rejected: {:?} has a missing endpoint", edge.id);
            return false;
        }
        self.issued_edges.insert(edge.id);
        self.edge_index.insert(edge.id, self.edges.len());
        self.edges.push(edge);
        self.publish(Channels::from_slice(&[Channel::Edges]));
        true
    }

    pub fn patch_edge(&mut self, id: EdgeId, patch: &EdgePatch) -> bool {
        let Some(&i) = self.edge_index.get(&id) else {
            return false;
        };
        let edge = &mut self.edges[i];
        let mut channels = Channels::new();
        if let Some(dir) = patch.direction
            && edge.direction() != dir
        {
            edge.set_direction(dir);
            channels.push(Channel::Edges);
        }
        if let Some(a) = patch.animated
            && edge.animated != a
        {
            edge.animated = a;
            channels.push(Channel::Edges);
        }
        if let Some(s) = patch.selected
            && edge.selected != s
        {
            edge.selected = s;
            channels.push(Channel::Selection);
        }
        let changed = !channels.is_empty();
        self.publish(channels);
        changed
    }

    pub fn remove_edge(&mut self, id: EdgeId) -> bool {
        let Some(i) = self.edge_index.remove(&id) else {
            return false;
        };
        self.edges.remove(i);
        self.reindex_edges();
        self.publish(Channels::from_slice(&[Channel::Edges]));
        true
    }

    pub fn apply_edge_changes(&mut self, changes: Vec<EdgeChange>) {
        let mut channels = Channels::new();
        let mut removed = false;
        for change in changes {
            match change {
                EdgeChange::Select { id, selected } => {
                    if let Some(&i) = self.edge_index.get(&id)
                        && self.edges[i].selected != selected
                    {
                        self.edges[i].selected = selected;
                        channels.push(Channel::Selection);
                    }
                }
                EdgeChange::Remove { id } => {
                    if let Some(i) = self.edge_index.remove(&id) {
                        self.edges.remove(i);
                        self.reindex_edges();
                        removed = true;
                    }
                }
            }
        }
        if removed {
            channels.push(Channel::Edges);
        }
        self.publish(channels);
    }

    // ─── Document metadata ───────────────────────────────────────────────

    pub fn set_title(&mut self, title: impl Into<String>) -> bool {
        let title = title.into();
        if self.meta.title == title {
            return false;
        }
        self.meta.title = title;
        self.publish(Channels::from_slice(&[Channel::Title]));
        true
    }

    pub fn set_description(&mut self, description: impl Into<String>) -> bool {
        let description = description.into();
        if self.meta.description == description {
            return false;
        }
        self.meta.description = description;
        self.publish(Channels::from_slice(&[Channel::Description]));
        true
    }

    pub fn set_desc_size(&mut self, size: DescSize) -> bool {
        if self.meta.desc_size == size {
            return false;
        }
        self.meta.desc_size = size;
        self.publish(Channels::from_slice(&[Channel::DescSize]));
        true
    }

    pub fn set_footer_text(&mut self, text: impl Into<String>) -> bool {
        let text = text.into();
        if self.meta.footer_text == text {
            return false;
        }
        self.meta.footer_text = text;
        self.publish(Channels::from_slice(&[Channel::FooterText]));
        true
    }

    pub fn set_links(&mut self, links: Vec<Link>) -> bool {
        if self.meta.links == links {
            return false;
        }
        self.meta.links = links;
        self.publish(Channels::from_slice(&[Channel::Links]));
        true
    }

    /// Append a link. Rejected when the id is already present.
    pub fn add_link(&mut self, link: Link) -> bool {
        if self.meta.links.iter().any(|l| l.id == link.id) {
            return false;
        }
        self.meta.links.push(link);
        self.publish(Channels::from_slice(&[Channel::Links]));
        true
    }

    pub fn update_link(&mut self, id: &str, patch: &LinkPatch) -> bool {
        let Some(link) = self.meta.links.iter_mut().find(|l| l.id == id) else {
            return false;
        };
        let mut changed = false;
        if let Some(label) = &patch.label
            && link.label != *label
        {
            link.label.clone_from(label);
            changed = true;
        }
        if let Some(url) = &patch.url
            && link.url != *url
        {
            link.url.clone_from(url);
            changed = true;
        }
        if changed {
            self.publish(Channels::from_slice(&[Channel::Links]));
        }
        changed
    }

    pub fn remove_link(&mut self, id: &str) -> bool {
        let before = self.meta.links.len();
        self.meta.links.retain(|l| l.id != id);
        if self.meta.links.len() == before {
            return false;
        }
        self.publish(Channels::from_slice(&[Channel::Links]));
        true
    }

    // ─── UI state ────────────────────────────────────────────────────────

    fn set_ui_flag(&mut self, channel: Channel, value: bool) -> bool {
        let slot = match channel {
            Channel::Locked => &mut self.ui.locked,
            Channel::Outline => &mut self.ui.show_outline,
            Channel::Editing => &mut self.ui.editing,
            Channel::DescVisible => &mut self.ui.show_desc,
            Channel::Connecting => &mut self.ui.connecting,
            _ => return false,
        };
        if *slot == value {
            return false;
        }
        *slot = value;
        self.publish(Channels::from_slice(&[channel]));
        true
    }

    pub fn set_locked(&mut self, locked: bool) -> bool {
        self.set_ui_flag(Channel::Locked, locked)
    }

    pub fn toggle_locked(&mut self) -> bool {
        let next = !self.ui.locked;
        self.set_locked(next);
        next
    }

    pub fn set_show_outline(&mut self, show: bool) -> bool {
        self.set_ui_flag(Channel::Outline, show)
    }

    pub fn toggle_show_outline(&mut self) -> bool {
        let next = !self.ui.show_outline;
        self.set_show_outline(next);
        next
    }

    pub fn set_editing(&mut self, editing: bool) -> bool {
        self.set_ui_flag(Channel::Editing, editing)
    }

    pub fn set_show_desc(&mut self, show: bool) -> bool {
        self.set_ui_flag(Channel::DescVisible, show)
    }

    pub fn set_connecting(&mut self, connecting: bool) -> bool {
        self.set_ui_flag(Channel::Connecting, connecting)
    }

    // ─── Whole-graph operations ──────────────────────────────────────────

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            nodes: self.nodes.clone(),
            edges: self.edges.clone(),
        }
    }

    /// Restore nodes and edges from a snapshot as one event.
    pub fn restore(&mut self, snapshot: &Snapshot) {
        let mut channels = Channels::new();
        self.replace_nodes(snapshot.nodes.clone(), &mut channels);
        self.replace_edges(snapshot.edges.clone(), &mut channels);
        self.publish(channels);
    }

    /// Replace the whole document (load or import). Publishes exactly the
    /// channels whose content differs.
    pub fn replace_document(&mut self, doc: BoardDocument) {
        let BoardDocument { nodes, edges, meta } = doc;
        let mut channels = Channels::new();
        self.replace_nodes(nodes, &mut channels);
        self.replace_edges(edges, &mut channels);

        let old = std::mem::replace(&mut self.meta, meta);
        let new = &self.meta;
        if old.title != new.title {
            channels.push(Channel::Title);
        }
        if old.description != new.description {
            channels.push(Channel::Description);
        }
        if old.desc_size != new.desc_size {
            channels.push(Channel::DescSize);
        }
        if old.footer_text != new.footer_text {
            channels.push(Channel::FooterText);
        }
        if old.links != new.links {
            channels.push(Channel::Links);
        }
        self.publish(channels);
    }

    // ─── Index maintenance ───────────────────────────────────────────────

    fn reindex_nodes(&mut self) {
        self.node_index = self
            .nodes
            .iter()
            .enumerate()
            .map(|(i, n)| (n.id, i))
            .collect();
    }

    fn reindex_edges(&mut self) {
        self.edge_index = self
            .edges
            .iter()
            .enumerate()
            .map(|(i, e)| (e.id, i))
            .collect();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn md(id: &str, x: f32, y: f32) -> Node {
        Node::new(NodeId::intern(id), Point::new(x, y), Payload::markdown(id))
    }

    fn recorder(store: &mut GraphStore) -> Rc<RefCell<Vec<StoreEvent>>> {
        let log = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&log);
        store.subscribe(move |e| sink.borrow_mut().push(e.clone()));
        log
    }

    fn connect(store: &mut GraphStore, id: &str, a: &str, b: &str) -> bool {
        let conn = Connection {
            source: NodeId::intern(a),
            target: NodeId::intern(b),
            source_handle: None,
            target_handle: None,
        };
        store.add_edge(Edge::from_connection(EdgeId::intern(id), conn))
    }

    #[test]
    fn add_node_rejects_live_duplicate() {
        let mut store = GraphStore::new();
        assert!(store.add_node(md("store_dup", 0.0, 0.0)));
        assert!(!store.add_node(md("store_dup", 5.0, 5.0)));
        assert_eq!(store.nodes().len(), 1);
        assert_eq!(store.nodes()[0].position, Point::new(0.0, 0.0));
    }

    #[test]
    fn patch_unknown_node_is_noop() {
        let mut store = GraphStore::new();
        let events = recorder(&mut store);
        assert!(!store.patch_node(NodeId::intern("store_ghost"), &NodePatch::selected(true)));
        assert!(events.borrow().is_empty());
    }

    #[test]
    fn selection_only_patch_publishes_ui_channel() {
        let mut store = GraphStore::new();
        store.add_node(md("store_sel", 0.0, 0.0));
        let events = recorder(&mut store);
        store.patch_node(NodeId::intern("store_sel"), &NodePatch::selected(true));
        store.patch_node(NodeId::intern("store_sel"), &NodePatch::draggable(true));
        let events = events.borrow();
        assert_eq!(events.len(), 2);
        assert!(events.iter().all(|e| !e.touches_data()));
    }

    #[test]
    fn content_patch_publishes_nodes() {
        let mut store = GraphStore::new();
        store.add_node(md("store_content", 0.0, 0.0));
        let events = recorder(&mut store);
        let patch = NodePatch::payload(PayloadPatch {
            content: Some("hello".into()),
            ..Default::default()
        });
        store.patch_node(NodeId::intern("store_content"), &patch);
        assert_eq!(events.borrow()[0].channels.as_slice(), &[Channel::Nodes]);
    }

    #[test]
    fn size_patches_respect_type_minimum() {
        let mut store = GraphStore::new();
        let id = NodeId::intern("store_tiny");
        store.add_node(Node::new(id, Point::new(0.0, 0.0), Payload::iframe("")));
        store.apply_node_changes(vec![NodeChange::Dimensions {
            id,
            size: Size::new(5.0, 3.0),
        }]);
        assert_eq!(store.node(id).unwrap().size, Some(Size::new(160.0, 120.0)));

        let patch = NodePatch {
            size: Some(Size::new(1.0, 400.0)),
            ..Default::default()
        };
        store.patch_node(id, &patch);
        assert_eq!(store.node(id).unwrap().size, Some(Size::new(160.0, 400.0)));
    }

    #[test]
    fn duplicate_connection_rejected() {
        let mut store = GraphStore::new();
        store.add_node(md("store_a", 0.0, 0.0));
        store.add_node(md("store_b", 0.0, 0.0));
        assert!(connect(&mut store, "store_e1", "store_a", "store_b"));
        assert!(!connect(&mut store, "store_e2", "store_a", "store_b"));
        assert!(connect(&mut store, "store_e3", "store_b", "store_a"));
        assert_eq!(store.edges().len(), 2);
    }

    #[test]
    fn removing_node_drops_attached_edges() {
        let mut store = GraphStore::new();
        store.add_node(md("store_r1", 0.0, 0.0));
        store.add_node(md("store_r2", 0.0, 0.0));
        connect(&mut store, "store_re", "store_r1", "store_r2");
        let events = recorder(&mut store);
        assert!(store.remove_node(NodeId::intern("store_r1")));
        assert!(store.edges().is_empty());
        assert_eq!(
            events.borrow()[0].channels.as_slice(),
            &[Channel::Nodes, Channel::Edges]
        );
    }

    #[test]
    fn fresh_ids_are_never_reused() {
        let mut store = GraphStore::new();
        let a = store.fresh_node_id("img", 1000);
        assert_eq!(a.as_str(), "img_1000");
        store.add_node(Node::new(a, Point::default(), Payload::image("")));
        store.remove_node(a);
        let b = store.fresh_node_id("img", 1000);
        assert_eq!(b.as_str(), "img_1000_1");
        let c = store.fresh_node_id("img", 1000);
        assert_eq!(c.as_str(), "img_1000_2");
    }

    #[test]
    fn unsubscribe_stops_delivery() {
        let mut store = GraphStore::new();
        let count = Rc::new(RefCell::new(0));
        let sink = Rc::clone(&count);
        let sub = store.subscribe(move |_| *sink.borrow_mut() += 1);
        store.set_title("One");
        assert!(store.unsubscribe(sub));
        store.set_title("Two");
        assert_eq!(*count.borrow(), 1);
    }

    #[test]
    fn noop_setters_publish_nothing() {
        let mut store = GraphStore::new();
        let events = recorder(&mut store);
        assert!(!store.set_title(DEFAULT_TITLE));
        assert!(!store.set_locked(false));
        assert!(!store.select_all(false));
        assert!(events.borrow().is_empty());
    }

    #[test]
    fn link_lifecycle() {
        let mut store = GraphStore::new();
        let link = Link {
            id: "l1".into(),
            label: "Docs".into(),
            url: "https://example.com".into(),
        };
        assert!(store.add_link(link.clone()));
        assert!(!store.add_link(link));
        assert!(store.update_link(
            "l1",
            &LinkPatch {
                label: Some("Home".into()),
                url: None,
            }
        ));
        assert_eq!(store.meta().links[0].label, "Home");
        assert!(store.remove_link("l1"));
        assert!(store.meta().links.is_empty());
    }

    #[test]
    fn restore_roundtrips_snapshot() {
        let mut store = GraphStore::new();
        store.add_node(md("store_s1", 1.0, 1.0));
        let snap = store.snapshot();
        store.patch_node(
            NodeId::intern("store_s1"),
            &NodePatch::position(Point::new(50.0, 50.0)),
        );
        store.restore(&snap);
        assert_eq!(store.snapshot(), snap);
    }

    #[test]
    fn same_content_ignores_ui_flags() {
        let mut store = GraphStore::new();
        store.add_node(md("store_flags", 0.0, 0.0));
        let before = store.snapshot();
        store.patch_node(
            NodeId::intern("store_flags"),
            &NodePatch {
                selected: Some(true),
                draggable: Some(true),
                ..Default::default()
            },
        );
        assert!(before.same_content(&store.snapshot()));
        assert_ne!(before, store.snapshot());
    }
}
