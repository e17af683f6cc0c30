//! Collision shapes
//!
//! A closed set of shape kinds dispatched by `match`:
//! - `Circle`: center + radius
//! - `Hull`: convex polygon
//!
//! Every kind can be cloned, moved, rotated, projected onto an axle and
//! converted to a convex hull.

pub mod circle;
pub mod transformer;

pub use circle::Circle;
pub use transformer::CircleToHullTransformer;

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::geometry::{Aabb, Axle, ConvexHull, Cutter1D, Point, Vector};

/// Stable tag for each shape kind, used in serialized data
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ShapeKind {
    Circle,
    Hull,
}

impl ShapeKind {
    /// Numeric type index (stable across versions)
    pub fn type_index(self) -> u32 {
        match self {
            ShapeKind::Circle => 1,
            ShapeKind::Hull => 2,
        }
    }

    pub fn from_type_index(index: u32) -> Option<Self> {
        match index {
            1 => Some(ShapeKind::Circle),
            2 => Some(ShapeKind::Hull),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ShapeKind::Circle => "circle",
            ShapeKind::Hull => "hull",
        }
    }
}

/// A body's collision geometry, in world space
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CollisionShape {
    Circle(Circle),
    Hull(ConvexHull),
}

impl CollisionShape {
    pub fn circle(center: Point, radius: f64) -> Self {
        CollisionShape::Circle(Circle::new(center, radius))
    }

    pub fn rectangle(center: Point, half_extents: Vector) -> Self {
        CollisionShape::Hull(ConvexHull::rectangle(center, half_extents))
    }

    pub fn kind(&self) -> ShapeKind {
        match self {
            CollisionShape::Circle(_) => ShapeKind::Circle,
            CollisionShape::Hull(_) => ShapeKind::Hull,
        }
    }

    /// Memory footprint of the concrete variant
    pub fn size_of_type(&self) -> usize {
        match self {
            CollisionShape::Circle(_) => std::mem::size_of::<Circle>(),
            CollisionShape::Hull(_) => std::mem::size_of::<ConvexHull>(),
        }
    }

    /// Translate by `d`
    pub fn move_by(&mut self, d: Vector) {
        match self {
            CollisionShape::Circle(c) => c.move_by(d),
            CollisionShape::Hull(h) => h.translate(d),
        }
    }

    /// Rotate counter-clockwise around the shape's center (radians)
    pub fn rotate(&mut self, angle: f64) {
        match self {
            CollisionShape::Circle(c) => c.rotate(angle),
            CollisionShape::Hull(h) => h.rotate(angle),
        }
    }

    pub fn project(&self, axle: &Axle) -> Cutter1D {
        match self {
            CollisionShape::Circle(c) => c.project(axle),
            CollisionShape::Hull(h) => h.project(axle),
        }
    }

    pub fn to_hull(&self) -> ConvexHull {
        match self {
            CollisionShape::Circle(c) => c.to_hull(),
            CollisionShape::Hull(h) => h.clone(),
        }
    }

    pub fn center(&self) -> Point {
        match self {
            CollisionShape::Circle(c) => c.center(),
            CollisionShape::Hull(h) => h.center(),
        }
    }

    pub fn aabb(&self) -> Aabb {
        match self {
            CollisionShape::Circle(c) => c.aabb(),
            CollisionShape::Hull(h) => h.aabb(),
        }
    }

    /// False for degenerate geometry (zero radius, fewer than 3 vertices, ...)
    pub fn is_valid(&self) -> bool {
        match self {
            CollisionShape::Circle(c) => c.is_valid(),
            CollisionShape::Hull(h) => h.is_valid(),
        }
    }

    /// Share a tessellator with this shape (no-op for hulls)
    pub fn attach_transformer(&mut self, transformer: Arc<CircleToHullTransformer>) {
        if let CollisionShape::Circle(c) = self {
            c.attach_transformer(transformer);
        }
    }
}

impl From<Circle> for CollisionShape {
    fn from(c: Circle) -> Self {
        CollisionShape::Circle(c)
    }
}

impl From<ConvexHull> for CollisionShape {
    fn from(h: ConvexHull) -> Self {
        CollisionShape::Hull(h)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_index_round_trip() {
        for kind in [ShapeKind::Circle, ShapeKind::Hull] {
            assert_eq!(ShapeKind::from_type_index(kind.type_index()), Some(kind));
        }
        assert_eq!(ShapeKind::from_type_index(0), None);
    }

    #[test]
    fn test_clone_is_independent() {
        let original = CollisionShape::rectangle(Point::ZERO, Vector::new(1.0, 2.0));
        let mut copy = original.clone();
        copy.move_by(Vector::new(10.0, 0.0));
        copy.rotate(0.5);
        assert_eq!(original.center(), Point::ZERO);
        assert_eq!(
            original.aabb(),
            Aabb::new(Point::new(-1.0, -2.0), Point::new(1.0, 2.0))
        );
    }

    #[test]
    fn test_clone_shares_transformer() {
        let t = Arc::new(CircleToHullTransformer::new(8));
        let mut shape = CollisionShape::circle(Point::ZERO, 1.0);
        shape.attach_transformer(t.clone());
        let copy = shape.clone();
        match copy {
            CollisionShape::Circle(c) => {
                assert!(Arc::ptr_eq(c.transformer().unwrap(), &t));
            }
            CollisionShape::Hull(_) => panic!("expected circle"),
        }
    }

    #[test]
    fn test_size_of_type() {
        let c = CollisionShape::circle(Point::ZERO, 1.0);
        let h = CollisionShape::rectangle(Point::ZERO, Vector::ONE);
        assert_eq!(c.size_of_type(), std::mem::size_of::<Circle>());
        assert_eq!(h.size_of_type(), std::mem::size_of::<ConvexHull>());
    }

    #[test]
    fn test_serde_tagged_by_kind() {
        let shape = CollisionShape::circle(Point::new(1.0, 2.0), 3.0);
        let json = serde_json::to_string(&shape).unwrap();
        assert!(json.contains("\"kind\":\"circle\""));
        let back: CollisionShape = serde_json::from_str(&json).unwrap();
        assert_eq!(back, shape);
    }
}
