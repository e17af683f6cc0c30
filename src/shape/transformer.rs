//! Circle tessellation
//!
//! Hull-based algorithms need circles as polygons. One transformer is shared
//! by every circle in a world (and a process-wide default exists for circles
//! that were never attached to one). The direction table is computed once at
//! construction and only read afterwards.

use std::sync::{Arc, OnceLock};

use glam::DVec2;

use super::Circle;
use crate::consts::HULL_SIDES;
use crate::geometry::ConvexHull;

static SHARED: OnceLock<Arc<CircleToHullTransformer>> = OnceLock::new();

/// Converts circles into regular N-gon approximations
#[derive(Debug, Clone, PartialEq)]
pub struct CircleToHullTransformer {
    /// Unit directions of the N-gon vertices, counter-clockwise from +X
    directions: Vec<DVec2>,
}

impl CircleToHullTransformer {
    /// Transformer producing `sides` vertices per hull (at least 3)
    pub fn new(sides: usize) -> Self {
        let sides = sides.max(3);
        let step = std::f64::consts::TAU / sides as f64;
        let directions = (0..sides)
            .map(|i| {
                let (sin, cos) = (i as f64 * step).sin_cos();
                DVec2::new(cos, sin)
            })
            .collect();
        Self { directions }
    }

    /// Process-wide default transformer, created on first use
    pub fn shared() -> Arc<Self> {
        SHARED
            .get_or_init(|| {
                log::debug!("Creating shared circle tessellator ({HULL_SIDES} sides)");
                Arc::new(Self::new(HULL_SIDES))
            })
            .clone()
    }

    #[inline]
    pub fn sides(&self) -> usize {
        self.directions.len()
    }

    /// Largest radial gap between the circle and its inscribed N-gon
    pub fn max_error(&self, radius: f64) -> f64 {
        radius * (1.0 - (std::f64::consts::PI / self.sides() as f64).cos())
    }

    /// Tessellate a circle into an inscribed regular polygon
    pub fn to_hull(&self, circle: &Circle) -> ConvexHull {
        let center = circle.center();
        let radius = circle.radius();
        ConvexHull::new(
            self.directions
                .iter()
                .map(|d| center + *d * radius)
                .collect(),
        )
    }
}

impl Default for CircleToHullTransformer {
    fn default() -> Self {
        Self::new(HULL_SIDES)
    }
}
