//! Gesture tools for direct manipulation.
//!
//! A tool is created when a gesture starts (pointer down on a grip, hotspot
//! or empty canvas) and translates the following pointer events into
//! [`GraphMutation`]s until pointer up or cancel ends
//! the gesture. Tools never touch the store; the controller applies what they
//! return.
//!
//! | Gesture | Start | Move | End |
//! |---------|-------|------|-----|
//! | Handle drag | elevate `draggable` | translate by delta | disable drag on all nodes |
//! | Resize | - | clamp, round, pin opposite corner | - |
//! | Marquee | - | track rectangle | select intersecting nodes |

use crate::input::{Corner, InputEvent};
use board_core::id::NodeId;
use board_core::model::*;

/// A change a tool asks the controller to apply.
#[derive(Debug, Clone, PartialEq)]
pub enum GraphMutation {
    Patch { id: NodeId, patch: NodePatch },
    /// Release the gesture-scoped drag permission on every node.
    DisableDragAll,
    /// Select nodes intersecting `rect`; keep the current selection when
    /// `additive`.
    SelectRect { rect: Rect, additive: bool },
}

/// Trait for tools that handle pointer input and produce mutations.
pub trait Tool {
    /// Handle an input event, returning zero or more mutations.
    fn handle(&mut self, event: &InputEvent) -> Vec<GraphMutation>;

    /// Mutations that release anything the gesture holds. Called when a
    /// gesture is cut short by lock, a new gesture, or teardown.
    fn abort(&mut self) -> Vec<GraphMutation>;
}

// ─── Handle drag ─────────────────────────────────────────────────────────

/// Move a node by one of its peripheral hotspots. Drag permission is
/// granted for this node only and revoked for all nodes at the end.
pub struct HandleDragTool {
    id: NodeId,
    origin: Point,
    pointer_start: Point,
    finished: bool,
}

impl HandleDragTool {
    /// Start the gesture. Returns the tool and the elevation mutation.
    pub fn start(id: NodeId, node_position: Point, pointer: Point) -> (Self, Vec<GraphMutation>) {
        let tool = Self {
            id,
            origin: node_position,
            pointer_start: pointer,
            finished: false,
        };
        let elevate = GraphMutation::Patch {
            id,
            patch: NodePatch::draggable(true),
        };
        (tool, vec![elevate])
    }
}

impl Tool for HandleDragTool {
    fn handle(&mut self, event: &InputEvent) -> Vec<GraphMutation> {
        if self.finished {
            return vec![];
        }
        match event {
            InputEvent::PointerMove { x, y, .. } => {
                let position = self
                    .origin
                    .offset(x - self.pointer_start.x, y - self.pointer_start.y);
                vec![GraphMutation::Patch {
                    id: self.id,
                    patch: NodePatch::position(position),
                }]
            }
            InputEvent::PointerUp { .. } | InputEvent::PointerCancel => self.abort(),
            _ => vec![],
        }
    }

    fn abort(&mut self) -> Vec<GraphMutation> {
        if self.finished {
            return vec![];
        }
        self.finished = true;
        vec![GraphMutation::DisableDragAll]
    }
}

// ─── Resize ──────────────────────────────────────────────────────────────

/// New origin and size for a corner resize by `(dx, dy)`. Dimensions clamp
/// to `min` and round to whole units; the opposite corner stays fixed.
pub fn resize_bounds(
    start_pos: Point,
    start_size: Size,
    corner: Corner,
    dx: f32,
    dy: f32,
    min: Size,
) -> (Point, Size) {
    let raw_w = if corner.west() {
        start_size.width - dx
    } else {
        start_size.width + dx
    };
    let raw_h = if corner.north() {
        start_size.height - dy
    } else {
        start_size.height + dy
    };
    let width = raw_w.round().max(min.width);
    let height = raw_h.round().max(min.height);

    let x = if corner.west() {
        (start_pos.x + start_size.width - width).round()
    } else {
        start_pos.x.round()
    };
    let y = if corner.north() {
        (start_pos.y + start_size.height - height).round()
    } else {
        start_pos.y.round()
    };
    (Point::new(x, y), Size::new(width, height))
}

pub struct ResizeTool {
    id: NodeId,
    corner: Corner,
    start_pos: Point,
    start_size: Size,
    min: Size,
    pointer_start: Point,
    finished: bool,
}

impl ResizeTool {
    pub fn start(node: &Node, corner: Corner, pointer: Point) -> Self {
        Self {
            id: node.id,
            corner,
            start_pos: node.position,
            start_size: node.effective_size(),
            min: node.kind().min_size(),
            pointer_start: pointer,
            finished: false,
        }
    }
}

impl Tool for ResizeTool {
    fn handle(&mut self, event: &InputEvent) -> Vec<GraphMutation> {
        if self.finished {
            return vec![];
        }
        match event {
            InputEvent::PointerMove { x, y, .. } => {
                let (position, size) = resize_bounds(
                    self.start_pos,
                    self.start_size,
                    self.corner,
                    x - self.pointer_start.x,
                    y - self.pointer_start.y,
                    self.min,
                );
                vec![GraphMutation::Patch {
                    id: self.id,
                    patch: NodePatch::bounds(position, size),
                }]
            }
            InputEvent::PointerUp { .. } | InputEvent::PointerCancel => self.abort(),
            _ => vec![],
        }
    }

    fn abort(&mut self) -> Vec<GraphMutation> {
        self.finished = true;
        vec![]
    }
}

// ─── Marquee ─────────────────────────────────────────────────────────────

/// Rubber-band selection over empty canvas.
pub struct MarqueeTool {
    start: Point,
    additive: bool,
    /// Current rectangle, normalized. Exposed for the host to draw.
    pub rect: Rect,
    finished: bool,
}

impl MarqueeTool {
    pub fn start(pointer: Point, additive: bool) -> Self {
        Self {
            start: pointer,
            additive,
            rect: Rect::from_corners(pointer, pointer),
            finished: false,
        }
    }
}

impl Tool for MarqueeTool {
    fn handle(&mut self, event: &InputEvent) -> Vec<GraphMutation> {
        if self.finished {
            return vec![];
        }
        match event {
            InputEvent::PointerMove { x, y, .. } => {
                self.rect = Rect::from_corners(self.start, Point::new(*x, *y));
                vec![]
            }
            InputEvent::PointerUp { x, y } => {
                self.finished = true;
                self.rect = Rect::from_corners(self.start, Point::new(*x, *y));
                // A plain click on empty canvas still clears the selection.
                vec![GraphMutation::SelectRect {
                    rect: self.rect,
                    additive: self.additive,
                }]
            }
            InputEvent::PointerCancel => self.abort(),
            _ => vec![],
        }
    }

    fn abort(&mut self) -> Vec<GraphMutation> {
        self.finished = true;
        vec![]
    }
}
