//! Line-list generation for bodies and contacts
//!
//! Every function returns vertex pairs: each consecutive pair is one segment.

use glam::DVec2;

use super::vertex::{Vertex, colors};
use crate::sim::{Body, ContactManifold, World};

/// Half-length of a contact cross marker
const MARKER_SIZE: f64 = 0.25;
/// Length of the drawn contact normal
const NORMAL_LENGTH: f64 = 1.0;

/// Default color for a body
pub fn body_color(body: &Body) -> [f32; 4] {
    if body.ghost {
        colors::GHOST_BODY
    } else if body.is_static() {
        colors::STATIC_BODY
    } else {
        colors::DYNAMIC_BODY
    }
}

/// Outline of the body's hull (circles are tessellated)
pub fn body_outline(body: &Body, color: [f32; 4]) -> Vec<Vertex> {
    let hull = body.shape().to_hull();
    let mut vertices = Vec::with_capacity(hull.len() * 2);

    for (from, to) in hull.edges() {
        vertices.push(Vertex::at(from, color));
        vertices.push(Vertex::at(to, color));
    }

    vertices
}

/// Outlines of every body, in id order
pub fn world_outlines(world: &World) -> Vec<Vertex> {
    world
        .bodies()
        .iter()
        .flat_map(|body| body_outline(body, body_color(body)))
        .collect()
}

/// A cross at each contact point plus a stroke along its normal
pub fn contact_markers(contacts: &[ContactManifold]) -> Vec<Vertex> {
    let mut vertices = Vec::with_capacity(contacts.len() * 6);

    for m in contacts {
        let p = m.contact.point;
        let dx = DVec2::new(MARKER_SIZE, 0.0);
        let dy = DVec2::new(0.0, MARKER_SIZE);

        vertices.push(Vertex::at(p - dx, colors::CONTACT_POINT));
        vertices.push(Vertex::at(p + dx, colors::CONTACT_POINT));
        vertices.push(Vertex::at(p - dy, colors::CONTACT_POINT));
        vertices.push(Vertex::at(p + dy, colors::CONTACT_POINT));

        vertices.push(Vertex::at(p, colors::CONTACT_NORMAL));
        vertices.push(Vertex::at(
            p + m.contact.normal * NORMAL_LENGTH,
            colors::CONTACT_NORMAL,
        ));
    }

    vertices
}
