//! Connector geometry
//!
//! Pure calculations over node rectangles: anchor resolution, connector endpoints,
//! anchor inference for click-to-connect, hit testing and board bounds. Nothing here
//! fails; a connector with a missing endpoint resolves to [`FALLBACK_SEGMENT`].

use serde::Serialize;

use crate::model::{Anchor, Connector, Node, NodeLookup};

/// A point in board (page) space
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Axis-aligned rectangle with top-left origin
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
}

impl Rect {
    pub const fn new(x: f64, y: f64, w: f64, h: f64) -> Self {
        Self { x, y, w, h }
    }

    /// Bounding box of a node, with default dimensions substituted
    pub fn of_node(node: &Node) -> Self {
        let (w, h) = node.size();
        Self::new(node.x, node.y, w, h)
    }

    pub fn center(&self) -> Point {
        Point::new(self.x + self.w / 2.0, self.y + self.h / 2.0)
    }

    /// Absolute position of a named anchor on this rectangle
    pub fn anchor_point(&self, anchor: Anchor) -> Point {
        match anchor {
            Anchor::Top => Point::new(self.x + self.w / 2.0, self.y),
            Anchor::Right => Point::new(self.x + self.w, self.y + self.h / 2.0),
            Anchor::Bottom => Point::new(self.x + self.w / 2.0, self.y + self.h),
            Anchor::Left => Point::new(self.x, self.y + self.h / 2.0),
            Anchor::Center => self.center(),
        }
    }

    /// Inclusive containment test
    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.x && p.x <= self.x + self.w && p.y >= self.y && p.y <= self.y + self.h
    }

    /// Smallest rectangle covering both
    pub fn union(&self, other: &Rect) -> Rect {
        let min_x = self.x.min(other.x);
        let min_y = self.y.min(other.y);
        let max_x = (self.x + self.w).max(other.x + other.w);
        let max_y = (self.y + self.h).max(other.y + other.h);
        Rect::new(min_x, min_y, max_x - min_x, max_y - min_y)
    }
}

/// Straight segment from a connector's start to its end
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Segment {
    pub start: Point,
    pub end: Point,
}

/// Segment drawn for a connector whose endpoints cannot be resolved
pub const FALLBACK_SEGMENT: Segment = Segment {
    start: Point::new(0.0, 0.0),
    end: Point::new(100.0, 0.0),
};

impl Segment {
    pub const fn new(start: Point, end: Point) -> Self {
        Self { start, end }
    }

    pub fn midpoint(&self) -> Point {
        Point::new(
            (self.start.x + self.end.x) / 2.0,
            (self.start.y + self.end.y) / 2.0,
        )
    }

    pub fn length(&self) -> f64 {
        (self.end.x - self.start.x).hypot(self.end.y - self.start.y)
    }

    /// Translate into the local space of a shape whose origin is `origin`
    pub fn relative_to(&self, origin: Point) -> Segment {
        Segment::new(
            Point::new(self.start.x - origin.x, self.start.y - origin.y),
            Point::new(self.end.x - origin.x, self.end.y - origin.y),
        )
    }

    /// Shortest distance from `p` to the segment; degenerate segments act as a point
    pub fn distance_to(&self, p: Point) -> f64 {
        let dx = self.end.x - self.start.x;
        let dy = self.end.y - self.start.y;
        let len_sq = dx * dx + dy * dy;
        if len_sq == 0.0 {
            return (p.x - self.start.x).hypot(p.y - self.start.y);
        }
        let t = (((p.x - self.start.x) * dx + (p.y - self.start.y) * dy) / len_sq).clamp(0.0, 1.0);
        let closest = Point::new(self.start.x + t * dx, self.start.y + t * dy);
        (p.x - closest.x).hypot(p.y - closest.y)
    }
}

/// Resolve a connector to absolute start/end points.
///
/// The start is the `from_anchor` point on `from_id`, the end the `to_anchor` point on
/// `to_id`. If either node is missing the fixed fallback segment is returned.
///
/// # Example
///
/// ```
/// use lifecanvas::geometry::{resolve_connector, Point};
/// use lifecanvas::model::{Anchor, Connector, Node, NodeProps, TextProps};
///
/// let nodes = vec![
///     Node::new("a", 0.0, 0.0, 200.0, 100.0, NodeProps::Text(TextProps::default())),
///     Node::new("b", 400.0, 0.0, 200.0, 100.0, NodeProps::Text(TextProps::default())),
/// ];
/// let conn = Connector::new("c", "a", "b", Anchor::Right, Anchor::Left);
///
/// let segment = resolve_connector(&conn, &nodes);
/// assert_eq!(segment.start, Point::new(200.0, 50.0));
/// assert_eq!(segment.end, Point::new(400.0, 50.0));
/// ```
pub fn resolve_connector<L: NodeLookup + ?Sized>(connector: &Connector, nodes: &L) -> Segment {
    match (nodes.node(&connector.from_id), nodes.node(&connector.to_id)) {
        (Some(from), Some(to)) => Segment::new(
            Rect::of_node(from).anchor_point(connector.from_anchor),
            Rect::of_node(to).anchor_point(connector.to_anchor),
        ),
        _ => FALLBACK_SEGMENT,
    }
}

/// Resolve a connector into its own local space (relative to its declared origin).
///
/// The fallback segment is already local and is returned untranslated.
pub fn resolve_connector_local<L: NodeLookup + ?Sized>(
    connector: &Connector,
    nodes: &L,
) -> Segment {
    let resolves =
        nodes.node(&connector.from_id).is_some() && nodes.node(&connector.to_id).is_some();
    if !resolves {
        return FALLBACK_SEGMENT;
    }
    resolve_connector(connector, nodes).relative_to(Point::new(connector.x, connector.y))
}

/// Pick anchors for a connector created by clicking `source` then `target`.
///
/// The dominant axis of the center-to-center displacement decides between a horizontal
/// (right/left) and a vertical (bottom/top) connection. Ties go vertical.
pub fn infer_anchors(source: &Rect, target: &Rect) -> (Anchor, Anchor) {
    let from = source.center();
    let to = target.center();
    let dx = to.x - from.x;
    let dy = to.y - from.y;

    let from_anchor = if dx.abs() > dy.abs() {
        if dx > 0.0 { Anchor::Right } else { Anchor::Left }
    } else if dy > 0.0 {
        Anchor::Bottom
    } else {
        Anchor::Top
    };
    (from_anchor, from_anchor.opposite())
}

/// Topmost node under `p` (later nodes are drawn above earlier ones)
pub fn node_at(nodes: &[Node], p: Point) -> Option<&Node> {
    nodes.iter().rev().find(|n| Rect::of_node(n).contains(p))
}

/// Union of all node rectangles, or `None` for an empty board
pub fn bounds(nodes: &[Node]) -> Option<Rect> {
    nodes
        .iter()
        .map(Rect::of_node)
        .reduce(|acc, r| acc.union(&r))
}
