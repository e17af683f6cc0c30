//! Geometry primitives
//!
//! Pure value types used by the collision code. All math is `f64`:
//! - `Point`/`Vector`: 2D coordinates (aliases of `glam::DVec2`)
//! - `Axle`: normalized projection direction
//! - `Cutter1D`: projected interval on an axle
//! - `ConvexHull`: CCW convex polygon
//! - `Aabb`: axis-aligned bounds for the broad phase

pub mod aabb;
pub mod axle;
pub mod hull;

pub use aabb::Aabb;
pub use axle::{Axle, Cutter1D, unit};
pub use hull::ConvexHull;

use glam::DVec2;
use thiserror::Error;

/// A position in world space
pub type Point = DVec2;
/// A displacement or direction in world space
pub type Vector = DVec2;

/// Errors raised while building geometry
#[derive(Debug, Error, Clone, PartialEq)]
pub enum GeometryError {
    #[error("convex hull needs at least 3 non-collinear vertices, got {0}")]
    TooFewVertices(usize),

    #[error("geometry contains non-finite coordinates")]
    NonFinite,
}

/// Dot product used for projections
#[inline]
pub fn scalar(a: Vector, b: Vector) -> f64 {
    a.dot(b)
}

/// 2D cross product (z component of the 3D cross)
#[inline]
pub fn cross(a: Vector, b: Vector) -> f64 {
    a.x * b.y - a.y * b.x
}
