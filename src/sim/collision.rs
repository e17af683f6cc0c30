//! Narrow-phase collision detection
//!
//! Separating-axis test between two convex shapes: project both onto every
//! candidate axle, and if any pair of intervals is disjoint the shapes don't
//! touch. Otherwise the axle with the smallest overlap gives the contact
//! normal and penetration depth.

use glam::DVec2;

use crate::geometry::{Axle, ConvexHull, Point, Vector};
use crate::shape::{Circle, CollisionShape};

/// Result of an overlapping pair
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Contact {
    /// Unit normal pointing from the first shape toward the second
    pub normal: Vector,
    /// Penetration depth along `normal` (0 when just touching)
    pub depth: f64,
    /// Approximate contact point (midpoint of the deepest features)
    pub point: Point,
}

/// Test two shapes for overlap.
///
/// Returns `None` when the shapes are separated or either one is degenerate.
/// Touching shapes report a contact with zero depth.
pub fn detect(a: &CollisionShape, b: &CollisionShape) -> Option<Contact> {
    if !a.is_valid() || !b.is_valid() {
        log::debug!(
            "Narrow phase: skipping degenerate {} vs {}",
            a.kind().as_str(),
            b.kind().as_str()
        );
        return None;
    }

    let axles = candidate_axles(a, b);
    let (depth, normal) = separating_axis_test(a, b, &axles)?;

    let deepest_a = support(a, normal);
    let deepest_b = support(b, -normal);

    Some(Contact {
        normal,
        depth,
        point: (deepest_a + deepest_b) * 0.5,
    })
}

/// Candidate separating axles, first shape's axles first
pub fn candidate_axles(a: &CollisionShape, b: &CollisionShape) -> Vec<Axle> {
    match (a, b) {
        (CollisionShape::Circle(ca), CollisionShape::Circle(cb)) => {
            let axle = Axle::through(ca.center(), cb.center());
            // Concentric circles: any direction separates equally badly
            vec![if axle.is_degenerate() { Axle::new(DVec2::X) } else { axle }]
        }
        (CollisionShape::Circle(c), CollisionShape::Hull(h)) => {
            let mut axles = vec![circle_feature_axle(c, h)];
            axles.extend(h.edge_normals());
            axles
        }
        (CollisionShape::Hull(h), CollisionShape::Circle(c)) => {
            let mut axles = h.edge_normals();
            axles.push(circle_feature_axle(c, h));
            axles
        }
        (CollisionShape::Hull(ha), CollisionShape::Hull(hb)) => {
            let mut axles = ha.edge_normals();
            axles.extend(hb.edge_normals());
            axles
        }
    }
}

/// Axle from the circle center to the hull's nearest vertex
fn circle_feature_axle(circle: &Circle, hull: &ConvexHull) -> Axle {
    match hull.closest_vertex(circle.center()) {
        Some(v) => Axle::through(circle.center(), v),
        None => Axle::new(DVec2::ZERO),
    }
}

/// Run SAT over `axles`.
///
/// Returns `(depth, normal)` with the normal oriented from `a` to `b`, or
/// `None` on the first separating axle. Ties keep the earliest axle.
pub fn separating_axis_test(
    a: &CollisionShape,
    b: &CollisionShape,
    axles: &[Axle],
) -> Option<(f64, Vector)> {
    let mut best: Option<(f64, Vector)> = None;

    for axle in axles.iter().filter(|axle| !axle.is_degenerate()) {
        let pa = a.project(axle);
        let pb = b.project(axle);

        // Early exit: found a separating axle
        let depth = pa.penetration(&pb)?;

        if best.is_none_or(|(best_depth, _)| depth < best_depth) {
            let u = axle.direction();
            // Push direction: b sits on whichever side needs less travel
            let forward = pa.max - pb.min;
            let backward = pb.max - pa.min;
            let normal = if forward < backward {
                u
            } else if backward < forward {
                -u
            } else if u.dot(b.center() - a.center()) < 0.0 {
                -u
            } else {
                u
            };
            best = Some((depth, normal));
        }
    }

    best
}

/// Deepest point of `shape` along `direction`
fn support(shape: &CollisionShape, direction: Vector) -> Point {
    match shape {
        CollisionShape::Circle(c) => c.center() + direction.normalize_or_zero() * c.radius(),
        CollisionShape::Hull(h) => h.support(direction).unwrap_or_else(|| h.center()),
    }
}
