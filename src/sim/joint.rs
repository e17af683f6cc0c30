//! Joints (positional constraints)
//!
//! Joints run after integration each step. Each one projects positions back
//! onto the constraint and removes the velocity component that would break it.

use serde::{Deserialize, Serialize};

use super::body::{Body, BodyId};
use super::resolver::inverse_masses;
use crate::geometry::{Point, Vector};
use crate::is_fuzzy_zero;

/// Stable joint identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct JointId(pub u32);

/// A constraint between bodies (or a body and the world)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Joint {
    /// Hold a body's center at a fixed world point (it may still spin)
    Pin { body: BodyId, anchor: Point },
    /// Keep two bodies' centers a fixed distance apart
    Distance { a: BodyId, b: BodyId, length: f64 },
}

impl Joint {
    /// Pin `body` where it currently is
    pub fn pin_in_place(body: &Body) -> Self {
        Joint::Pin {
            body: body.id(),
            anchor: body.position(),
        }
    }

    /// Distance joint using the bodies' current separation
    pub fn rod_between(a: &Body, b: &Body) -> Self {
        Joint::Distance {
            a: a.id(),
            b: b.id(),
            length: a.position().distance(b.position()),
        }
    }

    /// True if the joint constrains `id`
    pub fn references(&self, id: BodyId) -> bool {
        match *self {
            Joint::Pin { body, .. } => body == id,
            Joint::Distance { a, b, .. } => a == id || b == id,
        }
    }
}

/// Snap a body onto its pin anchor and cancel its linear velocity
pub fn solve_pin(body: &mut Body, anchor: Point) {
    if body.is_static() {
        return;
    }
    body.set_position(anchor);
    body.velocity = Vector::ZERO;
}

/// Restore the rest length between two bodies, split by inverse mass
pub fn solve_distance(a: &mut Body, b: &mut Body, length: f64) {
    if !length.is_finite() {
        return;
    }
    let Some((inv_a, inv_b, inv_sum)) = inverse_masses(a, b) else {
        return;
    };

    let delta = b.position() - a.position();
    let dist = delta.length();
    if is_fuzzy_zero(dist) {
        log::debug!("Distance joint {:?}-{:?}: coincident centers", a.id, b.id);
        return;
    }
    let n = delta / dist;

    // Position
    let error = dist - length;
    let correction = n * (error / inv_sum);
    a.move_by(correction * inv_a);
    b.move_by(-correction * inv_b);

    // Velocity along the rod
    let vn = (b.velocity - a.velocity).dot(n);
    let impulse = n * (vn / inv_sum);
    a.velocity += impulse * inv_a;
    b.velocity -= impulse * inv_b;
}
