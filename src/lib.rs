//! p2d - deterministic 2D rigid-body physics core
//!
//! Core modules:
//! - `geometry`: Value types (points, axles, 1D cutters, convex hulls, boxes)
//! - `shape`: Collision shapes (circle, convex hull) and circle tessellation
//! - `sim`: Bodies, broad-phase grid, narrow-phase SAT, resolver, world stepper
//! - `renderer`: Debug-draw vertices for an external renderer
//! - `settings`: Data-driven world parameters

pub mod geometry;
pub mod renderer;
pub mod settings;
pub mod shape;
pub mod sim;

pub use geometry::{Aabb, Axle, ConvexHull, Cutter1D, GeometryError, Point, Vector};
pub use settings::{FrictionPolicy, RestitutionPolicy, SettingsError, WorldSettings};
pub use shape::{Circle, CircleToHullTransformer, CollisionShape, ShapeKind};
pub use sim::{
    Body, BodyId, CollisionEvent, CollisionGroup, CollisionListener, Contact, ContactManifold, Joint,
    JointId, Mass, World,
};

use glam::DVec2;

/// Simulation configuration constants
pub mod consts {
    /// Fixed simulation timestep (120 Hz)
    pub const SIM_DT: f64 = 1.0 / 120.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;
    /// Largest `dt` a single step accepts before clamping
    pub const MAX_DT: f64 = 1.0 / 30.0;

    /// Absolute tolerance for treating a delta as zero
    pub const FUZZY_ZERO: f64 = 1e-9;

    /// Positional correction bias (fraction of penetration removed per step)
    pub const CORRECTION_PERCENT: f64 = 0.2;
    /// Penetration allowed before positional correction kicks in
    pub const CORRECTION_SLOP: f64 = 0.01;
    /// Relative normal speed below which contacts don't bounce
    pub const BOUNCE_THRESHOLD: f64 = 0.5;

    /// Default circle tessellation (vertices per hull)
    pub const HULL_SIDES: usize = 32;
    /// Broad-phase cell size used when there is nothing to derive one from
    pub const DEFAULT_CELL_SIZE: f64 = 64.0;

    /// Default body material
    pub const DEFAULT_RESTITUTION: f64 = 0.5;
    pub const DEFAULT_FRICTION: f64 = 0.3;
}

/// True when `value` is within [`consts::FUZZY_ZERO`] of zero
#[inline]
pub fn is_fuzzy_zero(value: f64) -> bool {
    value.abs() < consts::FUZZY_ZERO
}

/// Rotate a vector counter-clockwise by `angle` radians
#[inline]
pub fn rotate_vector(v: DVec2, angle: f64) -> DVec2 {
    let (sin, cos) = angle.sin_cos();
    DVec2::new(v.x * cos - v.y * sin, v.x * sin + v.y * cos)
}

/// Rotate `point` around `pivot` by `angle` radians
#[inline]
pub fn rotate_around(point: DVec2, pivot: DVec2, angle: f64) -> DVec2 {
    pivot + rotate_vector(point - pivot, angle)
}

/// Convert polar (r, theta) to cartesian (x, y)
#[inline]
pub fn polar_to_cartesian(r: f64, theta: f64) -> DVec2 {
    DVec2::new(r * theta.cos(), r * theta.sin())
}
