//! Contact resolution
//!
//! Impulses change velocities so that colliding bodies separate according to
//! their restitution. Positional correction then pushes overlapping bodies
//! apart without touching velocity.

use super::body::Body;
use super::collision::Contact;
use crate::geometry::Vector;
use crate::settings::{FrictionPolicy, RestitutionPolicy, WorldSettings};

/// Resolver tuning, taken from [`WorldSettings`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResolverParams {
    pub restitution: RestitutionPolicy,
    pub friction: FrictionPolicy,
    pub bounce_threshold: f64,
    pub correction_percent: f64,
    pub correction_slop: f64,
}

impl From<&WorldSettings> for ResolverParams {
    fn from(settings: &WorldSettings) -> Self {
        Self {
            restitution: settings.restitution,
            friction: settings.friction,
            bounce_threshold: settings.bounce_threshold,
            correction_percent: settings.correction_percent,
            correction_slop: settings.correction_slop,
        }
    }
}

impl Default for ResolverParams {
    fn default() -> Self {
        Self::from(&WorldSettings::default())
    }
}

/// `(inv_a, inv_b, inv_a + inv_b)`, or `None` when the pair can't move or the
/// sum overflows
pub(crate) fn inverse_masses(a: &Body, b: &Body) -> Option<(f64, f64, f64)> {
    let inv_a = a.inverse_mass();
    let inv_b = b.inverse_mass();
    let inv_sum = inv_a + inv_b;
    if inv_sum <= 0.0 {
        return None;
    }
    if !inv_sum.is_finite() {
        log::debug!("Resolver: inverse mass overflow for {:?}/{:?}", a.id, b.id);
        return None;
    }
    Some((inv_a, inv_b, inv_sum))
}

/// Apply the collision impulse (plus friction) for one contact.
///
/// `contact.normal` points from `a` to `b`. Returns the normal impulse
/// magnitude, or `None` when nothing was applied: separating bodies, two
/// immovable bodies, or a non-finite result.
pub fn apply_impulse(
    a: &mut Body,
    b: &mut Body,
    contact: &Contact,
    params: &ResolverParams,
) -> Option<f64> {
    let (inv_a, inv_b, inv_sum) = inverse_masses(a, b)?;

    let n = contact.normal;
    let relative = b.velocity - a.velocity;
    let vn = relative.dot(n);

    // Already separating
    if vn >= 0.0 {
        return None;
    }

    let e = if -vn < params.bounce_threshold {
        0.0
    } else {
        params.restitution.combine(a.restitution, b.restitution)
    };

    let j = -(1.0 + e) * vn / inv_sum;
    if !j.is_finite() {
        log::debug!("Resolver: non-finite impulse for {:?}/{:?}", a.id, b.id);
        return None;
    }

    let impulse = n * j;
    a.velocity -= impulse * inv_a;
    b.velocity += impulse * inv_b;

    apply_friction(a, b, n, j, params);

    Some(j)
}

/// Coulomb friction along the contact tangent, clamped to `μ·j`
fn apply_friction(a: &mut Body, b: &mut Body, n: Vector, j: f64, params: &ResolverParams) {
    let Some((inv_a, inv_b, inv_sum)) = inverse_masses(a, b) else {
        return;
    };

    let relative = b.velocity - a.velocity;
    let tangent = (relative - n * relative.dot(n)).normalize_or_zero();
    if tangent == Vector::ZERO {
        return;
    }

    let mu = params.friction.combine(a.friction, b.friction);
    let jt = (-relative.dot(tangent) / inv_sum).clamp(-mu * j, mu * j);
    if !jt.is_finite() {
        return;
    }

    let impulse = tangent * jt;
    a.velocity -= impulse * inv_a;
    b.velocity += impulse * inv_b;
}

/// Push overlapping bodies apart along the contact normal.
///
/// Only the penetration beyond the slop is corrected, and only a fraction of
/// it per step. Velocities are left alone. Returns the total correction distance.
pub fn correct_positions(
    a: &mut Body,
    b: &mut Body,
    contact: &Contact,
    params: &ResolverParams,
) -> f64 {
    let Some((inv_a, inv_b, inv_sum)) = inverse_masses(a, b) else {
        return 0.0;
    };

    let excess = (contact.depth - params.correction_slop).max(0.0);
    if excess == 0.0 || !excess.is_finite() {
        return 0.0;
    }

    let correction = contact.normal * (excess / inv_sum * params.correction_percent);
    a.move_by(-correction * inv_a);
    b.move_by(correction * inv_b);

    excess * params.correction_percent
}
