//! Viewport geometry: screen ↔ canvas projection and the zoom-out floor.

use crate::model::{Node, Point, Rect};
use serde::{Deserialize, Serialize};

/// Zoom floor for an empty board.
pub const EMPTY_MIN_ZOOM: f32 = 0.1;
/// Canvas units added on each side of the content box when fitting.
pub const FIT_PADDING: f32 = 100.0;
/// Extra zoom-out headroom beyond an exact fit.
pub const MIN_ZOOM_HEADROOM: f32 = 0.7;
pub const MAX_ZOOM: f32 = 2.0;

/// Visible surface size in screen pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            width: 800.0,
            height: 600.0,
        }
    }
}

/// Pan offset (screen pixels) and zoom of the canvas.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ViewTransform {
    pub x: f32,
    pub y: f32,
    pub zoom: f32,
}

impl Default for ViewTransform {
    fn default() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            zoom: 1.0,
        }
    }
}

impl ViewTransform {
    /// Screen point → canvas point.
    pub fn project(&self, screen: Point) -> Point {
        let zoom = if self.zoom > 0.0 { self.zoom } else { 1.0 };
        Point::new((screen.x - self.x) / zoom, (screen.y - self.y) / zoom)
    }

    /// Canvas point → screen point.
    pub fn unproject(&self, canvas: Point) -> Point {
        Point::new(canvas.x * self.zoom + self.x, canvas.y * self.zoom + self.y)
    }

    /// Canvas coordinate under the middle of the viewport.
    pub fn center(&self, viewport: Viewport) -> Point {
        self.project(Point::new(viewport.width / 2.0, viewport.height / 2.0))
    }
}

/// Bounding box over every node's effective size, `None` for an empty board.
pub fn content_bounds(nodes: &[Node]) -> Option<Rect> {
    nodes
        .iter()
        .map(Node::bounds)
        .reduce(|acc, r| acc.union(&r))
}

fn padded_fit(bounds: &Rect, viewport: Viewport) -> f32 {
    let zx = viewport.width / (bounds.width + 2.0 * FIT_PADDING);
    let zy = viewport.height / (bounds.height + 2.0 * FIT_PADDING);
    zx.min(zy).min(1.0)
}

/// How far the user may zoom out: enough to see all content with headroom.
pub fn min_zoom(nodes: &[Node], viewport: Viewport) -> f32 {
    match content_bounds(nodes) {
        None => EMPTY_MIN_ZOOM,
        Some(b) => padded_fit(&b, viewport) * MIN_ZOOM_HEADROOM,
    }
}

/// Transform that centers all content in the viewport.
pub fn fit_view(nodes: &[Node], viewport: Viewport) -> ViewTransform {
    let Some(b) = content_bounds(nodes) else {
        return ViewTransform::default();
    };
    let zoom = padded_fit(&b, viewport).clamp(min_zoom(nodes, viewport), MAX_ZOOM);
    let cx = b.x + b.width / 2.0;
    let cy = b.y + b.height / 2.0;
    ViewTransform {
        x: viewport.width / 2.0 - cx * zoom,
        y: viewport.height / 2.0 - cy * zoom,
        zoom,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::id::NodeId;
    use crate::model::{Payload, Size};

    fn node(id: &str, x: f32, y: f32, size: Option<Size>) -> Node {
        let mut n = Node::new(NodeId::intern(id), Point::new(x, y), Payload::markdown(""));
        n.size = size;
        n
    }

    #[test]
    fn empty_board_floor() {
        assert_eq!(min_zoom(&[], Viewport::default()), EMPTY_MIN_ZOOM);
    }

    #[test]
    fn min_zoom_uses_padded_bounds() {
        // Content 1800×400 → padded 2000×600; 1000/2000 = 0.5, 800/600 > 1.
        let nodes = vec![
            node("vp_a", 0.0, 0.0, Some(Size::new(300.0, 400.0))),
            node("vp_b", 1500.0, 0.0, Some(Size::new(300.0, 100.0))),
        ];
        let z = min_zoom(
            &nodes,
            Viewport {
                width: 1000.0,
                height: 800.0,
            },
        );
        assert!((z - 0.35).abs() < 1e-6);
    }

    #[test]
    fn small_content_caps_at_one() {
        let nodes = vec![node("vp_small", 0.0, 0.0, None)];
        let z = min_zoom(&nodes, Viewport::default());
        assert!((z - MIN_ZOOM_HEADROOM).abs() < 1e-6);
    }

    #[test]
    fn project_inverts_pan_and_zoom() {
        let t = ViewTransform {
            x: 100.0,
            y: 50.0,
            zoom: 2.0,
        };
        let p = t.project(Point::new(300.0, 250.0));
        assert_eq!(p, Point::new(100.0, 100.0));
        assert_eq!(t.unproject(p), Point::new(300.0, 250.0));
    }

    #[test]
    fn fit_centers_content() {
        let nodes = vec![node("vp_fit", 0.0, 0.0, Some(Size::new(200.0, 200.0)))];
        let vp = Viewport::default();
        let t = fit_view(&nodes, vp);
        let c = t.center(vp);
        assert!((c.x - 100.0).abs() < 1e-3);
        assert!((c.y - 100.0).abs() < 1e-3);
    }
}
