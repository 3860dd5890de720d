//! Input abstraction layer.
//!
//! Normalizes pointer, modifier and drag-and-drop events from the host into
//! plain values the controller and tools consume. Pointer coordinates are in
//! canvas space; the host projects them before handing them over.

use board_core::id::NodeId;
use serde::{Deserialize, Serialize};

/// Keyboard modifier state at the time of an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
    pub meta: bool,
}

impl Modifiers {
    pub const NONE: Modifiers = Modifiers {
        shift: false,
        ctrl: false,
        alt: false,
        meta: false,
    };

    /// The platform command key: Ctrl or Meta (⌘).
    pub fn command(&self) -> bool {
        self.ctrl || self.meta
    }
}

/// Peripheral hotspot on a node edge used to start a move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Top,
    Bottom,
    Left,
    Right,
}

/// Resize grip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Corner {
    Nw,
    Ne,
    Sw,
    Se,
}

impl Corner {
    /// The grip moves the left edge.
    pub fn west(self) -> bool {
        matches!(self, Corner::Nw | Corner::Sw)
    }

    /// The grip moves the top edge.
    pub fn north(self) -> bool {
        matches!(self, Corner::Nw | Corner::Ne)
    }
}

/// What the pointer landed on, resolved by the host's hit test.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Hit {
    Canvas,
    Body { id: NodeId },
    MoveHandle { id: NodeId, side: Side },
    ResizeCorner { id: NodeId, corner: Corner },
}

/// A normalized pointer event.
#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    PointerDown { x: f32, y: f32, modifiers: Modifiers },
    PointerMove { x: f32, y: f32, modifiers: Modifiers },
    PointerUp { x: f32, y: f32 },
    /// The host lost the pointer (capture lost, window blur).
    PointerCancel,
}

/// Where keyboard focus sits when a key event arrives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FocusTarget {
    #[default]
    Canvas,
    /// A text input or text area; board shortcuts stand down.
    TextInput,
}

/// A file carried by a drop.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DroppedFile {
    pub name: String,
    pub mime: String,
    pub bytes: Vec<u8>,
}

impl DroppedFile {
    pub fn is_media(&self) -> bool {
        self.mime.starts_with("image/") || self.mime.starts_with("video/")
    }
}

/// The transfer data of a drop event.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DropData {
    pub files: Vec<DroppedFile>,
    /// `text/uri-list` payload.
    pub uri_list: Option<String>,
    /// `text/plain` payload.
    pub text: Option<String>,
}

impl DropData {
    /// First URI of the `text/uri-list` (comments skipped), else plain text.
    pub fn uri(&self) -> Option<&str> {
        let from_list = self.uri_list.as_deref().and_then(|list| {
            list.lines()
                .map(str::trim)
                .find(|l| !l.is_empty() && !l.starts_with('#'))
        });
        from_list.or_else(|| {
            self.text
                .as_deref()
                .map(str::trim)
                .filter(|t| !t.is_empty())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uri_list_skips_comments() {
        let d = DropData {
            uri_list: Some("# dragged from browser\r\nhttps://a.test/x.png\r\nhttps://b.test".into()),
            text: Some("ignored".into()),
            ..Default::default()
        };
        assert_eq!(d.uri(), Some("https://a.test/x.png"));
    }

    #[test]
    fn falls_back_to_plain_text() {
        let d = DropData {
            uri_list: Some("# only a comment".into()),
            text: Some("  https://c.test/y.gif ".into()),
            ..Default::default()
        };
        assert_eq!(d.uri(), Some("https://c.test/y.gif"));
        assert_eq!(DropData::default().uri(), None);
    }

    #[test]
    fn command_is_ctrl_or_meta() {
        let mut m = Modifiers::NONE;
        assert!(!m.command());
        m.meta = true;
        assert!(m.command());
    }
}
