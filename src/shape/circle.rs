//! Circle collision shape

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::CircleToHullTransformer;
use crate::geometry::{Aabb, Axle, ConvexHull, Cutter1D, Point, Vector, unit};

/// A circle. Rotation is a no-op.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Circle {
    center: Point,
    radius: f64,
    /// Shared tessellator; falls back to the process-wide default when unset
    #[serde(skip)]
    transformer: Option<Arc<CircleToHullTransformer>>,
}

impl Circle {
    pub fn new(center: Point, radius: f64) -> Self {
        Self {
            center,
            radius,
            transformer: None,
        }
    }

    #[inline]
    pub fn center(&self) -> Point {
        self.center
    }

    #[inline]
    pub fn radius(&self) -> f64 {
        self.radius
    }

    pub fn set_radius(&mut self, radius: f64) {
        self.radius = radius;
    }

    /// Positive, finite radius and a finite center
    pub fn is_valid(&self) -> bool {
        self.center.is_finite() && self.radius.is_finite() && self.radius > 0.0
    }

    pub fn attach_transformer(&mut self, transformer: Arc<CircleToHullTransformer>) {
        self.transformer = Some(transformer);
    }

    pub fn transformer(&self) -> Option<&Arc<CircleToHullTransformer>> {
        self.transformer.as_ref()
    }

    pub fn move_by(&mut self, d: Vector) {
        self.center += d;
    }

    /// Circles are rotationally symmetric
    pub fn rotate(&mut self, _angle: f64) {}

    /// Project `center ± radius` onto the axle
    pub fn project(&self, axle: &Axle) -> Cutter1D {
        let u = unit(axle);
        let left = self.center - u * self.radius;
        let right = self.center + u * self.radius;
        Cutter1D::new(left.dot(u), right.dot(u))
    }

    /// Polygon approximation via the attached (or shared) transformer
    pub fn to_hull(&self) -> ConvexHull {
        match &self.transformer {
            Some(t) => t.to_hull(self),
            None => CircleToHullTransformer::shared().to_hull(self),
        }
    }

    pub fn aabb(&self) -> Aabb {
        Aabb::from_center(self.center, Vector::splat(self.radius.abs()))
    }
}

impl PartialEq for Circle {
    fn eq(&self, other: &Self) -> bool {
        self.center == other.center && self.radius == other.radius
    }
}
