//! Link anchoring geometry.
//!
//! Links between topic nodes are drawn from the boundary of one node's box to
//! the boundary of the other, not from center to center. [`edge_point`] finds
//! where the ray between two centers leaves an axis-aligned box.

use serde::{Deserialize, Serialize};

/// Width of a rendered topic node.
pub const NODE_WIDTH: f64 = 120.0;
/// Height of a rendered topic node.
pub const NODE_HEIGHT: f64 = 60.0;

/// Centers closer than this on both axes are treated as coincident.
pub const COINCIDENT_EPSILON: f64 = 1e-3;

/// A 2D point in layout coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const ORIGIN: Point = Point { x: 0.0, y: 0.0 };

    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

/// Returns the point where the ray from `from` toward `to` exits the
/// `box_width` x `box_height` rectangle centered at `from`.
///
/// Coincident centers return `from` unchanged, as does any non-finite input.
/// The box size is taken by magnitude. The result is clamped to the rectangle
/// so near-diagonal slopes cannot overshoot a corner.
pub fn edge_point(from: Point, to: Point, box_width: f64, box_height: f64) -> Point {
    if !from.is_finite() || !to.is_finite() || !box_width.is_finite() || !box_height.is_finite()
    {
        return from;
    }

    let dx = to.x - from.x;
    let dy = to.y - from.y;

    if dx.abs() < COINCIDENT_EPSILON && dy.abs() < COINCIDENT_EPSILON {
        return from;
    }

    let half_width = box_width.abs() / 2.0;
    let half_height = box_height.abs() / 2.0;

    let (x, y) = if dx.abs() > dy.abs() {
        // More horizontal: left or right edge, offset along the slope.
        (
            from.x + half_width.copysign(dx),
            from.y + dy * (half_width / dx.abs()),
        )
    } else {
        // More vertical: top or bottom edge.
        (
            from.x + dx * (half_height / dy.abs()),
            from.y + half_height.copysign(dy),
        )
    };

    Point {
        x: x.clamp(from.x - half_width, from.x + half_width),
        y: y.clamp(from.y - half_height, from.y + half_height),
    }
}

/// Both anchor points of a link, each computed from its own endpoint.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinkAnchors {
    pub source: Point,
    pub target: Point,
}

/// Anchors a link between two node centers using the fixed node box.
pub fn link_anchors(source: Point, target: Point) -> LinkAnchors {
    LinkAnchors {
        source: edge_point(source, target, NODE_WIDTH, NODE_HEIGHT),
        target: edge_point(target, source, NODE_WIDTH, NODE_HEIGHT),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;

    fn assert_close(actual: Point, expected: Point) {
        assert!(
            (actual.x - expected.x).abs() < EPS && (actual.y - expected.y).abs() < EPS,
            "expected {expected:?}, got {actual:?}"
        );
    }

    fn on_boundary(center: Point, p: Point, w: f64, h: f64) -> bool {
        let inside = (p.x - center.x).abs() <= w / 2.0 + EPS && (p.y - center.y).abs() <= h / 2.0 + EPS;
        let on_vertical_edge = ((p.x - center.x).abs() - w / 2.0).abs() < EPS;
        let on_horizontal_edge = ((p.y - center.y).abs() - h / 2.0).abs() < EPS;
        inside && (on_vertical_edge || on_horizontal_edge)
    }

    #[test]
    fn test_coincident_centers_return_from() {
        let p = Point::new(10.0, 20.0);
        let q = Point::new(10.0005, 19.9995);
        assert_eq!(edge_point(p, q, NODE_WIDTH, NODE_HEIGHT), p);
    }

    #[test]
    fn test_horizontal_line_hits_side_edges() {
        let from = Point::new(0.0, 0.0);
        let right = edge_point(from, Point::new(300.0, 0.0), 120.0, 60.0);
        assert_close(right, Point::new(60.0, 0.0));

        let left = edge_point(from, Point::new(-300.0, 0.0), 120.0, 60.0);
        assert_close(left, Point::new(-60.0, 0.0));
    }

    #[test]
    fn test_vertical_line_hits_top_and_bottom() {
        let from = Point::new(5.0, 5.0);
        let down = edge_point(from, Point::new(5.0, 500.0), 120.0, 60.0);
        assert_close(down, Point::new(5.0, 35.0));

        let up = edge_point(from, Point::new(5.0, -500.0), 120.0, 60.0);
        assert_close(up, Point::new(5.0, -25.0));
    }

    #[test]
    fn test_sloped_line_uses_slope_for_offset() {
        let from = Point::new(0.0, 0.0);
        // More horizontal: right edge, vertical offset = slope * half width.
        let p = edge_point(from, Point::new(200.0, 20.0), 120.0, 60.0);
        assert_close(p, Point::new(60.0, 6.0));
    }

    #[test]
    fn test_near_diagonal_is_clamped_to_corner() {
        let from = Point::new(0.0, 0.0);
        // Slightly more horizontal, but the box is wider than tall, so the
        // raw intersection would overshoot the bottom edge.
        let p = edge_point(from, Point::new(100.0, 90.0), 120.0, 60.0);
        assert_close(p, Point::new(60.0, 30.0));
    }

    #[test]
    fn test_anchors_lie_on_both_boundaries() {
        let cases = [
            (Point::new(0.0, 0.0), Point::new(250.0, 40.0)),
            (Point::new(-80.0, 300.0), Point::new(10.0, -20.0)),
            (Point::new(12.5, 7.5), Point::new(13.0, 190.0)),
            (Point::new(0.0, 0.0), Point::new(-100.0, -100.0)),
        ];

        for (p, q) in cases {
            let anchors = link_anchors(p, q);
            assert!(on_boundary(p, anchors.source, NODE_WIDTH, NODE_HEIGHT), "{p:?} -> {q:?}");
            assert!(on_boundary(q, anchors.target, NODE_WIDTH, NODE_HEIGHT), "{q:?} -> {p:?}");
        }
    }

    #[test]
    fn test_non_finite_positions_return_from() {
        let from = Point::new(0.0, 0.0);
        assert_eq!(edge_point(from, Point::new(f64::NAN, 10.0), 120.0, 60.0), from);
        assert_eq!(edge_point(from, Point::new(f64::INFINITY, 0.0), 120.0, 60.0), from);

        let broken = Point::new(f64::NAN, f64::NAN);
        let anchors = link_anchors(broken, Point::new(200.0, 0.0));
        assert!(anchors.source.x.is_nan());
        assert_eq!(anchors.target, Point::new(200.0, 0.0));
    }

    #[test]
    fn test_degenerate_box_sizes_do_not_panic() {
        let from = Point::new(0.0, 0.0);
        let to = Point::new(300.0, 0.0);

        assert_close(edge_point(from, to, -120.0, -60.0), Point::new(60.0, 0.0));
        assert_eq!(edge_point(from, to, f64::NAN, 60.0), from);
        assert_close(edge_point(from, to, 0.0, 0.0), from);
    }
}
