//! WASM bridge for the board: exposes the Rust interaction engine to a
//! browser host.
//!
//! Compiled via `wasm-pack build --target web`. The host owns rendering and
//! durable storage: it passes a `load(key) -> string | null` and a
//! `save(key, json)` callback, calls `tick()` from a timer, and reads node,
//! edge and policy state back as JSON strings.

mod host;

use board_core::document::BoardRecord;
use board_core::id::{EdgeId, NodeId};
use board_core::model::{Connection, DescSize, Link, LinkPatch, NodePatch, Point};
use board_core::viewport::{ViewTransform, Viewport};
use board_editor::input::{DropData, DroppedFile, FocusTarget, Hit, InputEvent, Modifiers};
use board_editor::{BoardEditor, Clock, EditorConfig, RecordStore, StorageError};
use std::rc::Rc;
use wasm_bindgen::prelude::*;

// ─── Host collaborators ──────────────────────────────────────────────────

struct JsClock;

impl Clock for JsClock {
    fn now_ms(&self) -> u64 {
        js_sys::Date::now() as u64
    }
}

/// Record store backed by host callbacks (IndexedDB, localStorage, ...).
struct HostRecordStore {
    load: js_sys::Function,
    save: js_sys::Function,
}

impl RecordStore for HostRecordStore {
    fn get(&self, key: &str) -> Result<Option<BoardRecord>, StorageError> {
        let value = self
            .load
            .call1(&JsValue::NULL, &JsValue::from_str(key))
            .map_err(|e| StorageError::Host(format!("{e:?}")))?;
        match value.as_string() {
            Some(text) => Ok(Some(serde_json::from_str(&text)?)),
            None => Ok(None),
        }
    }

    fn put(&mut self, key: &str, record: &BoardRecord) -> Result<(), StorageError> {
        let text = serde_json::to_string(record)?;
        self.save
            .call2(&JsValue::NULL, &JsValue::from_str(key), &JsValue::from_str(&text))
            .map_err(|e| StorageError::Host(format!("{e:?}")))?;
        Ok(())
    }
}

fn js_err(e: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&e.to_string())
}

fn to_json<T: serde::Serialize>(value: &T, fallback: &str) -> String {
    serde_json::to_string(value).unwrap_or_else(|_| fallback.to_string())
}

fn modifiers(shift: bool, ctrl: bool, alt: bool, meta: bool) -> Modifiers {
    Modifiers {
        shift,
        ctrl,
        alt,
        meta,
    }
}

// ─── Canvas controller ───────────────────────────────────────────────────

/// The main WASM-facing board controller. All interaction from the host
/// goes through this struct.
#[wasm_bindgen]
pub struct BoardCanvas {
    editor: BoardEditor,
}

#[wasm_bindgen]
impl BoardCanvas {
    /// Create a controller. `config_json` may be empty for defaults.
    #[wasm_bindgen(constructor)]
    pub fn new(
        width: f32,
        height: f32,
        config_json: &str,
        load: js_sys::Function,
        save: js_sys::Function,
    ) -> Result<BoardCanvas, JsValue> {
        console_error_panic_hook_setup();
        let _ = console_log::init_with_level(log::Level::Debug);

        let config: EditorConfig = if config_json.trim().is_empty() {
            EditorConfig::default()
        } else {
            serde_json::from_str(config_json).map_err(js_err)?
        };
        let mut editor =
            BoardEditor::new(Box::new(HostRecordStore { load, save }), Rc::new(JsClock), config);
        editor.set_viewport(Viewport { width, height });
        Ok(Self { editor })
    }

    // ─── Persistence ─────────────────────────────────────────────────────

    /// Load the stored board. Returns `false` when none was stored.
    pub fn load(&mut self) -> Result<bool, JsValue> {
        self.editor.load().map_err(js_err)
    }

    /// Advance autosave timers. Returns `true` if a write happened.
    pub fn tick(&mut self) -> bool {
        self.editor.tick().is_some()
    }

    pub fn save_now(&mut self) -> Result<(), JsValue> {
        self.editor.save_now().map_err(js_err)
    }

    /// Call from `beforeunload`.
    pub fn unload(&mut self) {
        self.editor.unload();
    }

    /// Returns `{"filename": ..., "contents": ...}`.
    pub fn export_json(&self) -> Result<String, JsValue> {
        let file = self.editor.export().map_err(js_err)?;
        Ok(serde_json::json!({
            "filename": file.filename,
            "contents": file.contents,
        })
        .to_string())
    }

    pub fn import_json(&mut self, text: &str) -> Result<(), JsValue> {
        self.editor.import_json(text).map_err(js_err)
    }

    // ─── State out ───────────────────────────────────────────────────────

    /// Render-ready node views as a JSON array.
    pub fn nodes_json(&self) -> String {
        to_json(&self.editor.node_views(), "[]")
    }

    pub fn edges_json(&self) -> String {
        to_json(&self.editor.store().edges(), "[]")
    }

    pub fn meta_json(&self) -> String {
        to_json(self.editor.store().meta(), "{}")
    }

    pub fn ui_json(&self) -> String {
        let ui = self.editor.store().ui();
        serde_json::json!({
            "locked": ui.locked,
            "showOutline": ui.show_outline,
            "isEditing": ui.editing,
            "showDesc": ui.show_desc,
            "isConnecting": ui.connecting,
            "canUndo": self.editor.history().can_undo(),
            "canRedo": self.editor.history().can_redo(),
        })
        .to_string()
    }

    pub fn policy_json(&self) -> String {
        to_json(&self.editor.policy(), "{}")
    }

    pub fn min_zoom(&self) -> f32 {
        self.editor.min_zoom()
    }

    // ─── Viewport ────────────────────────────────────────────────────────

    pub fn resize(&mut self, width: f32, height: f32) {
        self.editor.set_viewport(Viewport { width, height });
    }

    pub fn set_view(&mut self, x: f32, y: f32, zoom: f32) {
        self.editor.set_view(ViewTransform { x, y, zoom });
    }

    /// Returns the fitted transform as `{x, y, zoom}`.
    pub fn fit_view(&mut self) -> String {
        to_json(&self.editor.fit_view(), "{}")
    }

    // ─── Pointer & keys ──────────────────────────────────────────────────

    /// `hit_json` is a hit-test result, e.g. `{"kind":"moveHandle","id":"md_1","side":"left"}`.
    #[allow(clippy::too_many_arguments)]
    pub fn pointer_down(
        &mut self,
        x: f32,
        y: f32,
        hit_json: &str,
        shift: bool,
        ctrl: bool,
        alt: bool,
        meta: bool,
    ) -> Result<(), JsValue> {
        let hit: Hit = serde_json::from_str(hit_json).map_err(js_err)?;
        let event = InputEvent::PointerDown {
            x,
            y,
            modifiers: modifiers(shift, ctrl, alt, meta),
        };
        self.editor.handle_pointer(&event, hit);
        Ok(())
    }

    pub fn pointer_move(&mut self, x: f32, y: f32, shift: bool) {
        let event = InputEvent::PointerMove {
            x,
            y,
            modifiers: modifiers(shift, false, false, false),
        };
        self.editor.handle_pointer(&event, Hit::Canvas);
    }

    pub fn pointer_up(&mut self, x: f32, y: f32) {
        self.editor
            .handle_pointer(&InputEvent::PointerUp { x, y }, Hit::Canvas);
    }

    pub fn pointer_cancel(&mut self) {
        self.editor
            .handle_pointer(&InputEvent::PointerCancel, Hit::Canvas);
    }

    /// Returns the action name that ran, or an empty string.
    pub fn handle_key(
        &mut self,
        key: &str,
        ctrl: bool,
        shift: bool,
        alt: bool,
        meta: bool,
        in_text_input: bool,
    ) -> String {
        let focus = if in_text_input {
            FocusTarget::TextInput
        } else {
            FocusTarget::Canvas
        };
        self.editor
            .handle_key(key, modifiers(shift, ctrl, alt, meta), focus)
            .map(host::action_name)
            .unwrap_or_default()
            .to_string()
    }

    /// Apply host-reported node changes (JSON array).
    pub fn nodes_change(&mut self, json: &str) -> Result<(), JsValue> {
        let changes = host::parse_node_changes(json).map_err(js_err)?;
        self.editor.on_nodes_change(changes);
        Ok(())
    }

    /// Apply host-reported edge changes (JSON array).
    pub fn edges_change(&mut self, json: &str) -> Result<(), JsValue> {
        let changes = host::parse_edge_changes(json).map_err(js_err)?;
        self.editor.on_edges_change(changes);
        Ok(())
    }

    /// Renderer write-back: merge a JSON `NodePatch` into a node.
    pub fn patch_node(&mut self, id: &str, patch_json: &str) -> Result<bool, JsValue> {
        let patch: NodePatch = serde_json::from_str(patch_json).map_err(js_err)?;
        Ok(self.editor.patch_node(NodeId::intern(id), &patch))
    }

    // ─── Edges ───────────────────────────────────────────────────────────

    pub fn set_connecting(&mut self, connecting: bool) {
        self.editor.set_connecting(connecting);
    }

    /// Returns the new edge id, or `undefined` when refused.
    pub fn connect(
        &mut self,
        source: &str,
        target: &str,
        source_handle: Option<String>,
        target_handle: Option<String>,
    ) -> Option<String> {
        let (Some(source_handle), Some(target_handle)) = (
            host::parse_handle(source_handle.as_deref()),
            host::parse_handle(target_handle.as_deref()),
        ) else {
            log::debug!("connect refused: unknown handle {source_handle:?} -> {target_handle:?}");
            return None;
        };
        let conn = Connection {
            source: NodeId::intern(source),
            target: NodeId::intern(target),
            source_handle,
            target_handle,
        };
        self.editor.connect(conn).map(|id| id.to_string())
    }

    /// `direction` is one of `forward`, `backward`, `both`, `none`.
    pub fn set_edge_direction(&mut self, id: &str, direction: &str) -> bool {
        match host::parse_direction(direction) {
            Some(dir) => self.editor.set_edge_direction(EdgeId::intern(id), dir),
            None => false,
        }
    }

    pub fn delete_edge(&mut self, id: &str) -> bool {
        self.editor.delete_edge(EdgeId::intern(id))
    }

    // ─── Creation & clipboard ────────────────────────────────────────────

    pub fn create_node(&mut self, kind: &str) -> Option<String> {
        let kind = host::parse_kind(kind)?;
        self.editor.create_node(kind).map(|id| id.to_string())
    }

    /// Drop of a single file at a viewport point.
    pub fn drop_file(
        &mut self,
        x: f32,
        y: f32,
        name: String,
        mime: String,
        bytes: Vec<u8>,
    ) -> Option<String> {
        let data = DropData {
            files: vec![DroppedFile { name, mime, bytes }],
            ..Default::default()
        };
        self.editor
            .drop_data(Point::new(x, y), &data)
            .map(|id| id.to_string())
    }

    /// Drop of `text/uri-list` and/or `text/plain` data at a viewport point.
    pub fn drop_text(
        &mut self,
        x: f32,
        y: f32,
        uri_list: Option<String>,
        text: Option<String>,
    ) -> Option<String> {
        let data = DropData {
            files: Vec::new(),
            uri_list,
            text,
        };
        self.editor
            .drop_data(Point::new(x, y), &data)
            .map(|id| id.to_string())
    }

    pub fn copy(&mut self) -> usize {
        self.editor.copy()
    }

    /// Returns the pasted ids as a JSON array.
    pub fn paste(&mut self) -> String {
        to_json(&self.editor.paste(), "[]")
    }

    pub fn delete_selection(&mut self) -> bool {
        self.editor.delete_selection()
    }

    pub fn undo(&mut self) -> bool {
        self.editor.undo()
    }

    pub fn redo(&mut self) -> bool {
        self.editor.redo()
    }

    // ─── Modes & editors ─────────────────────────────────────────────────

    pub fn toggle_locked(&mut self) -> bool {
        self.editor.toggle_locked()
    }

    pub fn toggle_outline(&mut self) -> bool {
        self.editor.store_mut().toggle_show_outline()
    }

    pub fn open_editor(&mut self, target: &str, node_id: Option<String>) -> bool {
        match host::parse_editor(target, node_id.as_deref()) {
            Some(editor) => self.editor.open_editor(editor),
            None => false,
        }
    }

    pub fn close_editor(&mut self, target: &str, node_id: Option<String>) {
        if let Some(editor) = host::parse_editor(target, node_id.as_deref()) {
            self.editor.close_editor(editor);
        }
    }

    // ─── Metadata ────────────────────────────────────────────────────────

    pub fn set_title(&mut self, title: &str) -> bool {
        self.editor.store_mut().set_title(title)
    }

    pub fn set_description(&mut self, description: &str) -> bool {
        self.editor.store_mut().set_description(description)
    }

    pub fn set_desc_size(&mut self, width: Option<f32>, height: Option<f32>) -> bool {
        self.editor
            .store_mut()
            .set_desc_size(DescSize { width, height })
    }

    pub fn set_footer_text(&mut self, text: &str) -> bool {
        self.editor.store_mut().set_footer_text(text)
    }

    pub fn add_link(&mut self, id: &str, label: &str, url: &str) -> bool {
        self.editor.store_mut().add_link(Link {
            id: id.to_string(),
            label: label.to_string(),
            url: url.to_string(),
        })
    }

    pub fn update_link(&mut self, id: &str, label: Option<String>, url: Option<String>) -> bool {
        self.editor
            .store_mut()
            .update_link(id, &LinkPatch { label, url })
    }

    pub fn remove_link(&mut self, id: &str) -> bool {
        self.editor.store_mut().remove_link(id)
    }

    // ─── Embeds ──────────────────────────────────────────────────────────

    /// `state` is `loaded`, `blocked` or anything else for unknown.
    pub fn set_embed_state(&mut self, id: &str, state: &str) {
        self.editor
            .set_embed_state(NodeId::intern(id), host::parse_embed_state(state));
    }

    /// `{"domain", "openUrl"}` when the frame was blocked, else `null`.
    pub fn embed_fallback(&self, id: &str) -> String {
        match self.editor.embed_fallback(NodeId::intern(id)) {
            Some(f) => serde_json::json!({ "domain": f.domain, "openUrl": f.open_url }).to_string(),
            None => "null".to_string(),
        }
    }
}

// ─── Panic hook for WASM debugging ───────────────────────────────────────

fn console_error_panic_hook_setup() {
    #[cfg(target_arch = "wasm32")]
    {
        use std::sync::Once;
        static SET_HOOK: Once = Once::new();
        SET_HOOK.call_once(|| {
            std::panic::set_hook(Box::new(|info| {
                let msg = format!("board panic: {info}");
                web_sys::console::error_1(&msg.into());
            }));
        });
    }
}
