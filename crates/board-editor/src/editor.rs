//! Interaction controller.
//!
//! [`BoardEditor`] owns the graph store, history, clipboard and persistence
//! synchronizer, and is the one place that decides which user gestures may
//! mutate the board. Every rule that depends on lock mode lives here:
//!
//! - while **locked**, nothing structural changes: no drag, resize, connect,
//!   select, paste, drop, delete, undo/redo or inline editing;
//! - while **editing** text inline, marquee selection and panning stand down;
//! - drag permission is **gesture-scoped**: a handle drag elevates one node
//!   and every completion path (release, cancel, lock, a new gesture)
//!   revokes it for all nodes.

use crate::clipboard::Clipboard;
use crate::clock::{Clock, SystemClock};
use crate::commands::History;
use crate::config::EditorConfig;
use crate::error::StorageError;
use crate::input::{DropData, FocusTarget, Hit, InputEvent, Modifiers};
use crate::records::{FileRecordStore, RecordStore};
use crate::shortcuts::{ShortcutAction, ShortcutMap};
use crate::sync::{PersistenceSync, SaveReason};
use crate::tools::{GraphMutation, HandleDragTool, MarqueeTool, ResizeTool, Tool};
use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use board_core::document::{ExportFile, parse_document};
use board_core::embed::{
    Embed, EmbedFallback, EmbedLoadState, EmbedNormalizer, IdentityNormalizer, fallback_for,
};
use board_core::error::DocumentError;
use board_core::id::{EdgeId, NodeId};
use board_core::model::*;
use board_core::store::{EdgeChange, GraphStore, NodeChange};
use board_core::viewport::{self, ViewTransform, Viewport};
use serde::Serialize;
use smallvec::{SmallVec, smallvec};
use std::collections::{HashMap, HashSet};
use std::path::PathBuf;
use std::rc::Rc;

// ─── Policy & views ──────────────────────────────────────────────────────

/// Which pointer buttons pan the canvas.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "mode", content = "buttons", rename_all = "camelCase")]
pub enum PanBinding {
    /// Panning is off (an inline editor owns the pointer).
    Disabled,
    /// Any drag pans; used in locked mode where nothing else can be dragged.
    Primary,
    /// Only the listed buttons pan (DOM button numbers).
    Buttons(SmallVec<[u8; 2]>),
}

/// Interaction switches the host canvas should apply.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InteractionPolicy {
    pub nodes_draggable: bool,
    pub nodes_connectable: bool,
    pub elements_selectable: bool,
    pub edges_focusable: bool,
    pub selection_on_drag: bool,
    pub pan_on_drag: PanBinding,
    pub multi_selection_key: &'static str,
    pub min_zoom: f32,
}

/// Everything a renderer needs to draw one node.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeView {
    pub id: NodeId,
    pub kind: NodeKind,
    pub position: Point,
    pub size: Size,
    pub selected: bool,
    pub payload: Payload,
    /// Per-node override, else the board-wide setting.
    pub show_outline: bool,
    /// Draw an opaque placeholder instead of the content.
    pub censored_placeholder: bool,
}

/// A text field edited in place.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InlineEditor {
    Title,
    Description,
    Footer,
    Node(NodeId),
}

// ─── Controller ──────────────────────────────────────────────────────────

pub struct BoardEditor {
    store: GraphStore,
    history: History,
    sync: PersistenceSync,
    clipboard: Clipboard,
    clock: Rc<dyn Clock>,
    config: EditorConfig,
    /// The gesture in progress, if it needs pointer tracking.
    tool: Option<Box<dyn Tool>>,
    editors: HashSet<InlineEditor>,
    view: ViewTransform,
    viewport: Viewport,
    normalizer: Box<dyn EmbedNormalizer>,
    embed_states: HashMap<NodeId, EmbedLoadState>,
}

impl BoardEditor {
    pub fn new(records: Box<dyn RecordStore>, clock: Rc<dyn Clock>, config: EditorConfig) -> Self {
        let mut store = GraphStore::new();
        let sync = PersistenceSync::attach(&mut store, records, Rc::clone(&clock), &config);
        Self {
            store,
            history: History::new(config.history_depth),
            sync,
            clipboard: Clipboard::new(),
            clock,
            config,
            tool: None,
            editors: HashSet::new(),
            view: ViewTransform::default(),
            viewport: Viewport::default(),
            normalizer: Box::new(IdentityNormalizer),
            embed_states: HashMap::new(),
        }
    }

    /// Desktop setup: one JSON file per record under `dir`, wall-clock time.
    pub fn native(dir: impl Into<PathBuf>, config: EditorConfig) -> Self {
        Self::new(
            Box::new(FileRecordStore::new(dir)),
            Rc::new(SystemClock),
            config,
        )
    }

    pub fn with_normalizer(mut self, normalizer: Box<dyn EmbedNormalizer>) -> Self {
        self.normalizer = normalizer;
        self
    }

    pub fn store(&self) -> &GraphStore {
        &self.store
    }

    /// Direct store access for metadata and renderer patches.
    pub fn store_mut(&mut self) -> &mut GraphStore {
        &mut self.store
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn persistence(&self) -> &PersistenceSync {
        &self.sync
    }

    fn locked(&self) -> bool {
        self.store.ui().locked
    }

    fn refuse(&self, what: &str) -> bool {
        if self.locked() {
            log::debug!("{what} refused: board is locked");
            true
        } else {
            false
        }
    }

    // ─── Persistence ─────────────────────────────────────────────────────

    /// Load the stored board, replacing whatever is in memory. History is
    /// reset.
    pub fn load(&mut self) -> Result<bool, StorageError> {
        self.end_gesture();
        let found = self.sync.load(&mut self.store)?;
        self.history.clear();
        self.forget_dead_embeds();
        Ok(found)
    }

    /// Drive autosave timers. Call from the host's timer loop.
    pub fn tick(&mut self) -> Option<SaveReason> {
        self.sync.tick(&self.store)
    }

    pub fn save_now(&mut self) -> Result<(), StorageError> {
        self.sync.save_now(&self.store)
    }

    pub fn unload(&mut self) {
        self.end_gesture();
        self.sync.unload(&self.store);
    }

    pub fn export(&self) -> Result<ExportFile, DocumentError> {
        self.sync.export(&self.store)
    }

    /// Replace the board with an exported document. On a parse failure the
    /// board is left untouched.
    pub fn import_json(&mut self, text: &str) -> Result<(), DocumentError> {
        let doc = parse_document(text)?;
        self.end_gesture();
        self.close_all_editors();
        self.history.record(&self.store);
        log::info!(
            "importing {:?}: {} nodes, {} edges",
            doc.meta.title,
            doc.nodes.len(),
            doc.edges.len()
        );
        self.store.replace_document(doc);
        self.forget_dead_embeds();
        Ok(())
    }

    // ─── Connections ─────────────────────────────────────────────────────

    /// Create a forward, animated edge for a connect gesture. Returns `None`
    /// when locked, when an endpoint is missing, or when the same
    /// source/target/handle tuple is already connected.
    pub fn connect(&mut self, conn: Connection) -> Option<EdgeId> {
        if self.refuse("connect") {
            return None;
        }
        if !self.store.contains_node(conn.source) || !self.store.contains_node(conn.target) {
            log::debug!("connect refused: missing endpoint in {conn:?}");
            return None;
        }
        if self.store.has_connection(&conn) {
            log::debug!("connect refused: duplicate {conn:?}");
            return None;
        }
        self.history.record(&self.store);
        let id = self.store.fresh_edge_id(self.clock.now_ms());
        self.store.add_edge(Edge::from_connection(id, conn)).then_some(id)
    }

    pub fn set_connecting(&mut self, connecting: bool) {
        self.store.set_connecting(connecting && !self.locked());
    }

    pub fn set_edge_direction(&mut self, id: EdgeId, direction: ArrowDirection) -> bool {
        if self.refuse("edge direction") {
            return false;
        }
        match self.store.edge(id) {
            Some(e) if e.direction() != direction => {}
            _ => return false,
        }
        self.history.record(&self.store);
        self.store.patch_edge(
            id,
            &EdgePatch {
                direction: Some(direction),
                ..Default::default()
            },
        )
    }

    pub fn delete_edge(&mut self, id: EdgeId) -> bool {
        if self.refuse("delete edge") || self.store.edge(id).is_none() {
            return false;
        }
        self.history.record(&self.store);
        self.store.remove_edge(id)
    }

    // ─── Host-reported changes ───────────────────────────────────────────

    /// Filter and apply node deltas from the host's built-in drag, resize and
    /// selection handling.
    pub fn on_nodes_change(&mut self, changes: Vec<NodeChange>) {
        let locked = self.locked();
        let accepted: Vec<NodeChange> = changes
            .into_iter()
            .filter(|change| {
                let ok = match change {
                    NodeChange::Position { id, .. } | NodeChange::Dimensions { id, .. } => {
                        !locked && self.store.node(*id).is_some_and(|n| n.draggable)
                    }
                    NodeChange::Select { .. } | NodeChange::Remove { .. } | NodeChange::Add { .. } => {
                        !locked
                    }
                };
                if !ok {
                    log::debug!("suppressed node change {change:?}");
                }
                ok
            })
            .collect();
        if accepted.is_empty() {
            return;
        }
        let removes = accepted
            .iter()
            .any(|c| matches!(c, NodeChange::Remove { .. }));
        if removes {
            self.history.record(&self.store);
        }
        self.store.apply_node_changes(accepted);
        if removes {
            self.forget_dead_embeds();
        }
    }

    pub fn on_edges_change(&mut self, changes: Vec<EdgeChange>) {
        if self.refuse("edge change") || changes.is_empty() {
            return;
        }
        if changes.iter().any(|c| matches!(c, EdgeChange::Remove { .. })) {
            self.history.record(&self.store);
        }
        self.store.apply_edge_changes(changes);
    }

    /// Renderer write-back path (text edits, outline and censor toggles).
    pub fn patch_node(&mut self, id: NodeId, patch: &NodePatch) -> bool {
        self.store.patch_node(id, patch)
    }

    // ─── Pointer gestures ────────────────────────────────────────────────

    /// Feed a pointer event. `hit` is only consulted on pointer down.
    pub fn handle_pointer(&mut self, event: &InputEvent, hit: Hit) {
        match event {
            InputEvent::PointerDown { x, y, modifiers } => {
                self.pointer_down(hit, Point::new(*x, *y), *modifiers)
            }
            InputEvent::PointerMove { .. } => {
                if let Some(tool) = self.tool.as_mut() {
                    let mutations = tool.handle(event);
                    self.apply(mutations);
                }
            }
            InputEvent::PointerUp { .. } | InputEvent::PointerCancel => {
                if let Some(tool) = self.tool.as_mut() {
                    let mutations = tool.handle(event);
                    self.apply(mutations);
                }
                self.end_gesture();
            }
        }
    }

    fn pointer_down(&mut self, hit: Hit, at: Point, modifiers: Modifiers) {
        // A new gesture releases whatever the previous one held.
        self.end_gesture();
        if self.refuse("pointer gesture") {
            return;
        }
        match hit {
            Hit::MoveHandle { id, .. } => {
                let Some(node) = self.store.node(id) else {
                    return;
                };
                let (tool, start) = HandleDragTool::start(id, node.position, at);
                self.history.begin_gesture(&self.store);
                self.apply(start);
                self.tool = Some(Box::new(tool));
            }
            Hit::ResizeCorner { id, corner } => {
                let Some(node) = self.store.node(id) else {
                    return;
                };
                let tool = ResizeTool::start(node, corner, at);
                self.history.begin_gesture(&self.store);
                self.tool = Some(Box::new(tool));
            }
            Hit::Body { id } => {
                let Some(node) = self.store.node(id) else {
                    return;
                };
                let selected = node.selected;
                // Host-reported free drag may follow; batch it as one step.
                self.history.begin_gesture(&self.store);
                if modifiers.shift {
                    self.store.patch_node(id, &NodePatch::selected(!selected));
                } else if !selected {
                    self.store.select_nodes(&HashSet::from([id]));
                }
            }
            Hit::Canvas => {
                if self.policy().selection_on_drag {
                    self.tool = Some(Box::new(MarqueeTool::start(at, modifiers.shift)));
                }
            }
        }
    }

    fn apply(&mut self, mutations: Vec<GraphMutation>) {
        for m in mutations {
            match m {
                GraphMutation::Patch { id, patch } => {
                    self.store.patch_node(id, &patch);
                }
                GraphMutation::DisableDragAll => {
                    self.store.disable_drag_all();
                }
                GraphMutation::SelectRect { rect, additive } => {
                    self.select_in_rect(rect, additive);
                }
            }
        }
    }

    /// Close the active gesture from any completion path: release held
    /// permissions and push one history entry if the graph changed.
    fn end_gesture(&mut self) {
        if let Some(mut tool) = self.tool.take() {
            let release = tool.abort();
            self.apply(release);
        }
        self.history.end_gesture(&self.store);
    }

    pub fn gesture_active(&self) -> bool {
        self.tool.is_some() || self.history.in_gesture()
    }

    /// Select nodes whose bounds intersect `rect` (partial containment).
    pub fn select_in_rect(&mut self, rect: Rect, additive: bool) -> bool {
        if !self.policy().elements_selectable {
            return false;
        }
        let ids: HashSet<NodeId> = self
            .store
            .nodes()
            .iter()
            .filter(|n| n.bounds().intersects(&rect) || (additive && n.selected))
            .map(|n| n.id)
            .collect();
        self.store.select_nodes(&ids)
    }

    // ─── Clipboard ───────────────────────────────────────────────────────

    pub fn copy(&mut self) -> usize {
        self.clipboard.copy_selection(&self.store)
    }

    /// Insert offset duplicates of the clipboard, selected. Returns their ids.
    pub fn paste(&mut self) -> Vec<NodeId> {
        if self.clipboard.is_empty() {
            log::debug!("paste ignored: clipboard is empty");
            return Vec::new();
        }
        if self.refuse("paste") {
            return Vec::new();
        }
        self.history.record(&self.store);
        self.store.select_all(false);
        let copies =
            self.clipboard
                .duplicates(&mut self.store, self.clock.now_ms(), self.config.paste_offset);
        let ids = copies.iter().map(|n| n.id).collect();
        self.store.apply_node_changes(
            copies
                .into_iter()
                .map(|node| NodeChange::Add { node })
                .collect(),
        );
        ids
    }

    /// Delete the selected nodes (with their edges) and selected edges.
    pub fn delete_selection(&mut self) -> bool {
        if self.refuse("delete") {
            return false;
        }
        let nodes: Vec<NodeChange> = self
            .store
            .selected_nodes()
            .map(|n| NodeChange::Remove { id: n.id })
            .collect();
        let edges: Vec<EdgeChange> = self
            .store
            .selected_edges()
            .map(|e| EdgeChange::Remove { id: e.id })
            .collect();
        if nodes.is_empty() && edges.is_empty() {
            return false;
        }
        self.history.record(&self.store);
        self.store.apply_edge_changes(edges);
        self.store.apply_node_changes(nodes);
        self.forget_dead_embeds();
        true
    }

    // ─── Creation ────────────────────────────────────────────────────────

    /// Create an image node from a drop at `screen` (viewport pixels).
    pub fn drop_data(&mut self, screen: Point, data: &DropData) -> Option<NodeId> {
        if self.refuse("drop") {
            return None;
        }
        let src = match data.files.first() {
            Some(file) if file.is_media() => {
                format!("data:{};base64,{}", file.mime, BASE64.encode(&file.bytes))
            }
            Some(file) => {
                log::debug!("drop ignored: {:?} is not media ({})", file.name, file.mime);
                return None;
            }
            None => data.uri()?.to_string(),
        };
        let position = self.view.project(screen);
        let id = self
            .store
            .fresh_node_id(NodeKind::Image.creation_prefix(), self.clock.now_ms());
        self.history.record(&self.store);
        self.store
            .add_node(Node::new(id, position, Payload::image(src)))
            .then_some(id)
    }

    /// Toolbar creation: a new node centered on the viewport.
    pub fn create_node(&mut self, kind: NodeKind) -> Option<NodeId> {
        if self.refuse("create node") {
            return None;
        }
        let center = self.view.center(self.viewport);
        let size = kind.default_size();
        let position = center.offset(-size.width / 2.0, -size.height / 2.0);
        let payload = match kind {
            NodeKind::Markdown => Payload::markdown("# New note"),
            NodeKind::Image => Payload::image(""),
            NodeKind::Iframe => Payload::iframe(""),
        };
        let id = self
            .store
            .fresh_node_id(kind.creation_prefix(), self.clock.now_ms());
        self.history.record(&self.store);
        self.store
            .add_node(Node::new(id, position, payload))
            .then_some(id)
    }

    // ─── Inline editors ──────────────────────────────────────────────────

    pub fn open_editor(&mut self, editor: InlineEditor) -> bool {
        if self.refuse("inline edit") {
            return false;
        }
        if let InlineEditor::Node(id) = editor
            && !self.store.contains_node(id)
        {
            return false;
        }
        self.editors.insert(editor);
        self.store.set_editing(true);
        true
    }

    pub fn close_editor(&mut self, editor: InlineEditor) {
        self.editors.remove(&editor);
        self.store.set_editing(!self.editors.is_empty());
    }

    pub fn close_all_editors(&mut self) {
        self.editors.clear();
        self.store.set_editing(false);
    }

    pub fn is_editor_open(&self, editor: InlineEditor) -> bool {
        self.editors.contains(&editor)
    }

    // ─── Lock mode ───────────────────────────────────────────────────────

    pub fn set_locked(&mut self, locked: bool) {
        if locked && !self.locked() {
            self.end_gesture();
            self.close_all_editors();
            self.store.disable_drag_all();
            self.store.set_connecting(false);
        }
        self.store.set_locked(locked);
    }

    /// Flip lock mode. Returns the new state.
    pub fn toggle_locked(&mut self) -> bool {
        let next = !self.locked();
        self.set_locked(next);
        next
    }

    pub fn policy(&self) -> InteractionPolicy {
        let ui = self.store.ui();
        let unlocked = !ui.locked;
        let pan_on_drag = if ui.editing {
            PanBinding::Disabled
        } else if ui.locked {
            PanBinding::Primary
        } else {
            PanBinding::Buttons(smallvec![1, 2])
        };
        InteractionPolicy {
            nodes_draggable: unlocked,
            nodes_connectable: unlocked,
            elements_selectable: unlocked,
            edges_focusable: unlocked,
            selection_on_drag: unlocked && !ui.editing,
            pan_on_drag,
            multi_selection_key: "Shift",
            min_zoom: self.min_zoom(),
        }
    }

    // ─── Rendering boundary ──────────────────────────────────────────────

    pub fn node_view(&self, id: NodeId) -> Option<NodeView> {
        let node = self.store.node(id)?;
        let ui = self.store.ui();
        Some(NodeView {
            id,
            kind: node.kind(),
            position: node.position,
            size: node.effective_size(),
            selected: node.selected,
            payload: node.payload.clone(),
            show_outline: node.payload.show_outline().unwrap_or(ui.show_outline),
            censored_placeholder: ui.locked && node.payload.censored(),
        })
    }

    pub fn node_views(&self) -> Vec<NodeView> {
        self.store
            .nodes()
            .iter()
            .filter_map(|n| self.node_view(n.id))
            .collect()
    }

    /// Normalized frame source for an iframe node.
    pub fn embed_for(&self, id: NodeId) -> Option<Embed> {
        match &self.store.node(id)?.payload {
            Payload::Iframe(data) => Some(self.normalizer.normalize(&data.url)),
            _ => None,
        }
    }

    pub fn set_embed_state(&mut self, id: NodeId, state: EmbedLoadState) {
        self.embed_states.insert(id, state);
    }

    /// Drop load states of nodes that no longer exist.
    fn forget_dead_embeds(&mut self) {
        let store = &self.store;
        self.embed_states.retain(|id, _| store.contains_node(*id));
    }

    /// Fallback affordance for an iframe the target site refused to frame.
    pub fn embed_fallback(&self, id: NodeId) -> Option<EmbedFallback> {
        let Payload::Iframe(data) = &self.store.node(id)?.payload else {
            return None;
        };
        let state = self.embed_states.get(&id).copied().unwrap_or_default();
        fallback_for(&data.url, state)
    }

    // ─── Viewport ────────────────────────────────────────────────────────

    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.viewport = viewport;
    }

    pub fn view(&self) -> ViewTransform {
        self.view
    }

    /// Host reports a pan/zoom. The description panel hides while moving.
    pub fn set_view(&mut self, view: ViewTransform) {
        if view != self.view {
            self.store.set_show_desc(false);
        }
        self.view = view;
    }

    pub fn fit_view(&mut self) -> ViewTransform {
        self.view = viewport::fit_view(self.store.nodes(), self.viewport);
        self.store.set_show_desc(true);
        self.view
    }

    pub fn min_zoom(&self) -> f32 {
        viewport::min_zoom(self.store.nodes(), self.viewport)
    }

    // ─── Keyboard & history ──────────────────────────────────────────────

    /// Resolve and run a keyboard shortcut. Suppressed while focus is in a
    /// text field. Returns the action that ran.
    pub fn handle_key(
        &mut self,
        key: &str,
        modifiers: Modifiers,
        focus: FocusTarget,
    ) -> Option<ShortcutAction> {
        if focus == FocusTarget::TextInput {
            return None;
        }
        let action = ShortcutMap::resolve(key, modifiers)?;
        match action {
            ShortcutAction::Undo => {
                self.undo();
            }
            ShortcutAction::Redo => {
                self.redo();
            }
            ShortcutAction::Copy => {
                self.copy();
            }
            ShortcutAction::Paste => {
                self.paste();
            }
            ShortcutAction::Delete => {
                self.delete_selection();
            }
            ShortcutAction::Deselect => {
                if !self.locked() {
                    self.store.select_all(false);
                }
            }
        }
        Some(action)
    }

    pub fn undo(&mut self) -> bool {
        if self.refuse("undo") {
            return false;
        }
        self.end_gesture();
        let undone = self.history.undo(&mut self.store);
        self.forget_dead_embeds();
        undone
    }

    pub fn redo(&mut self) -> bool {
        if self.refuse("redo") {
            return false;
        }
        self.end_gesture();
        let redone = self.history.redo(&mut self.store);
        self.forget_dead_embeds();
        redone
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::records::MemoryRecordStore;
    use pretty_assertions::assert_eq;

    fn editor() -> BoardEditor {
        BoardEditor::new(
            Box::new(MemoryRecordStore::new()),
            Rc::new(ManualClock::new(5_000)),
            EditorConfig::default(),
        )
    }

    #[test]
    fn policy_follows_lock_and_editing() {
        let mut ed = editor();
        let p = ed.policy();
        assert!(p.selection_on_drag);
        assert_eq!(p.pan_on_drag, PanBinding::Buttons(smallvec![1, 2]));
        assert_eq!(p.min_zoom, 0.1);

        ed.open_editor(InlineEditor::Title);
        let p = ed.policy();
        assert!(!p.selection_on_drag);
        assert_eq!(p.pan_on_drag, PanBinding::Disabled);

        ed.set_locked(true);
        let p = ed.policy();
        assert!(!p.nodes_draggable && !p.nodes_connectable);
        assert!(!p.elements_selectable && !p.edges_focusable);
        assert_eq!(p.pan_on_drag, PanBinding::Primary);
    }

    #[test]
    fn toolbar_creation_centers_on_viewport() {
        let mut ed = editor();
        ed.set_viewport(Viewport {
            width: 1000.0,
            height: 800.0,
        });
        let id = ed.create_node(NodeKind::Markdown).unwrap();
        assert_eq!(id.as_str(), "md_5000");
        let node = ed.store().node(id).unwrap();
        assert_eq!(node.position, Point::new(350.0, 340.0));
        assert!(!node.draggable);
        assert_eq!(node.payload, Payload::markdown("# New note"));
    }

    #[test]
    fn censor_placeholder_only_when_locked() {
        let mut ed = editor();
        let id = ed.create_node(NodeKind::Image).unwrap();
        ed.patch_node(
            id,
            &NodePatch::payload(PayloadPatch {
                censored: Some(true),
                ..Default::default()
            }),
        );
        assert!(!ed.node_view(id).unwrap().censored_placeholder);
        ed.set_locked(true);
        assert!(ed.node_view(id).unwrap().censored_placeholder);
    }

    #[test]
    fn outline_override_falls_back_to_global() {
        let mut ed = editor();
        let id = ed.create_node(NodeKind::Iframe).unwrap();
        assert!(ed.node_view(id).unwrap().show_outline);
        ed.store_mut().set_show_outline(false);
        assert!(!ed.node_view(id).unwrap().show_outline);
        ed.patch_node(
            id,
            &NodePatch::payload(PayloadPatch {
                show_outline: Some(true),
                ..Default::default()
            }),
        );
        assert!(ed.node_view(id).unwrap().show_outline);
    }

    #[test]
    fn embed_fallback_needs_blocked_state() {
        let mut ed = editor();
        let id = ed.create_node(NodeKind::Iframe).unwrap();
        ed.patch_node(
            id,
            &NodePatch::payload(PayloadPatch {
                url: Some("https://example.com/x".into()),
                ..Default::default()
            }),
        );
        assert_eq!(
            ed.embed_for(id),
            Some(Embed::Embeddable("https://example.com/x".into()))
        );
        assert_eq!(ed.embed_fallback(id), None);
        ed.set_embed_state(id, EmbedLoadState::Blocked);
        assert_eq!(ed.embed_fallback(id).unwrap().domain, "example.com");
    }

    #[test]
    fn embed_state_dies_with_its_node() {
        let mut ed = editor();
        let id = ed.create_node(NodeKind::Iframe).unwrap();
        ed.patch_node(
            id,
            &NodePatch::payload(PayloadPatch {
                url: Some("https://blocked.test/".into()),
                ..Default::default()
            }),
        );
        ed.set_embed_state(id, EmbedLoadState::Blocked);
        ed.store_mut().patch_node(id, &NodePatch::selected(true));
        assert!(ed.delete_selection());
        assert!(ed.embed_states.is_empty());

        // The restored node starts over as unknown.
        assert!(ed.undo());
        assert!(ed.store().contains_node(id));
        assert_eq!(ed.embed_fallback(id), None);
    }

    #[test]
    fn view_move_hides_description_and_fit_shows_it() {
        let mut ed = editor();
        ed.set_view(ViewTransform {
            x: 10.0,
            y: 0.0,
            zoom: 1.0,
        });
        assert!(!ed.store().ui().show_desc);
        ed.fit_view();
        assert!(ed.store().ui().show_desc);
    }
}
