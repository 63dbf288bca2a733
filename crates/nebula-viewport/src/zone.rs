//! Polygon tests for zone outlines.

use glam::Vec2;

/// Even-odd containment test. Outlines with fewer than three points contain nothing.
pub fn inside_polygon(outline: &[Vec2], point: Vec2) -> bool {
    if outline.len() < 3 {
        return false;
    }
    let mut inside = false;
    let mut j = outline.len() - 1;
    for i in 0..outline.len() {
        let a = outline[i];
        let b = outline[j];
        if (a.y > point.y) != (b.y > point.y) {
            let x_cross = (b.x - a.x) * (point.y - a.y) / (b.y - a.y) + a.x;
            if point.x < x_cross {
                inside = !inside;
            }
        }
        j = i;
    }
    inside
}

/// Shortest distance from `point` to the closed outline's edges.
///
/// An empty outline has no edges; the distance is reported as 0.
pub fn distance_to_edge(outline: &[Vec2], point: Vec2) -> f32 {
    match outline {
        [] => 0.0,
        [only] => only.distance(point),
        _ => {
            let mut best = f32::INFINITY;
            let mut previous = outline[outline.len() - 1];
            for &current in outline {
                best = best.min(distance_to_segment(previous, current, point));
                previous = current;
            }
            best
        }
    }
}

fn distance_to_segment(a: Vec2, b: Vec2, point: Vec2) -> f32 {
    let ab = b - a;
    let len_sq = ab.length_squared();
    if len_sq <= f32::EPSILON {
        return a.distance(point);
    }
    let t = ((point - a).dot(ab) / len_sq).clamp(0.0, 1.0);
    (a + ab * t).distance(point)
}
