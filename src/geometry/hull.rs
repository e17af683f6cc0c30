//! Convex hulls
//!
//! Vertices are always stored counter-clockwise, so edge `i -> i+1` has its
//! outward normal on the right-hand side: `(e.y, -e.x)`.

use serde::{Deserialize, Serialize};

use super::{Aabb, Axle, Cutter1D, GeometryError, Point, Vector, cross, unit};
use crate::{polar_to_cartesian, rotate_around};

/// A convex polygon with counter-clockwise winding
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ConvexHull {
    vertices: Vec<Point>,
}

impl ConvexHull {
    /// Wrap vertices that already form a convex polygon.
    ///
    /// Convexity is trusted; winding is normalized to counter-clockwise.
    pub fn new(mut vertices: Vec<Point>) -> Self {
        if signed_area(&vertices) < 0.0 {
            vertices.reverse();
        }
        Self { vertices }
    }

    /// Build the convex hull of an arbitrary point set (monotone chain).
    ///
    /// Interior, duplicate and collinear points are dropped.
    pub fn from_points(points: &[Point]) -> Result<Self, GeometryError> {
        if points.iter().any(|p| !p.is_finite()) {
            return Err(GeometryError::NonFinite);
        }

        let mut sorted = points.to_vec();
        sorted.sort_by(|a, b| a.x.total_cmp(&b.x).then(a.y.total_cmp(&b.y)));
        sorted.dedup();

        if sorted.len() < 3 {
            return Err(GeometryError::TooFewVertices(sorted.len()));
        }

        let mut hull: Vec<Point> = Vec::with_capacity(sorted.len() * 2);

        // Lower chain
        for &p in &sorted {
            while hull.len() >= 2 && turn(hull[hull.len() - 2], hull[hull.len() - 1], p) <= 0.0 {
                hull.pop();
            }
            hull.push(p);
        }

        // Upper chain
        let lower_len = hull.len() + 1;
        for &p in sorted.iter().rev().skip(1) {
            while hull.len() >= lower_len
                && turn(hull[hull.len() - 2], hull[hull.len() - 1], p) <= 0.0
            {
                hull.pop();
            }
            hull.push(p);
        }
        // Last point repeats the first
        hull.pop();

        if hull.len() < 3 {
            return Err(GeometryError::TooFewVertices(hull.len()));
        }

        Ok(Self { vertices: hull })
    }

    /// Axis-aligned rectangle
    pub fn rectangle(center: Point, half_extents: Vector) -> Self {
        let (hx, hy) = (half_extents.x.abs(), half_extents.y.abs());
        Self::new(vec![
            center + Vector::new(-hx, -hy),
            center + Vector::new(hx, -hy),
            center + Vector::new(hx, hy),
            center + Vector::new(-hx, hy),
        ])
    }

    /// Regular polygon inscribed in a circle
    pub fn regular(center: Point, radius: f64, sides: usize) -> Self {
        let sides = sides.max(3);
        let step = std::f64::consts::TAU / sides as f64;
        let vertices = (0..sides)
            .map(|i| center + polar_to_cartesian(radius, i as f64 * step))
            .collect();
        Self { vertices }
    }

    #[inline]
    pub fn vertices(&self) -> &[Point] {
        &self.vertices
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    /// At least 3 vertices, finite, and an area that isn't negligible next
    /// to the hull's own size
    pub fn is_valid(&self) -> bool {
        if self.vertices.len() < 3 || !self.vertices.iter().all(|v| v.is_finite()) {
            return false;
        }
        let extent = self.aabb().extent().max_element();
        let area = self.area();
        area.is_finite() && area > crate::consts::FUZZY_ZERO * extent * extent
    }

    /// Iterate edges as `(start, end)` pairs, wrapping around
    pub fn edges(&self) -> impl Iterator<Item = (Point, Point)> + '_ {
        let n = self.vertices.len();
        (0..n).map(move |i| (self.vertices[i], self.vertices[(i + 1) % n]))
    }

    /// Outward unit normals, one per edge in vertex order
    pub fn edge_normals(&self) -> Vec<Axle> {
        self.edges()
            .map(|(a, b)| {
                let e = b - a;
                Axle::new(Vector::new(e.y, -e.x))
            })
            .collect()
    }

    /// Project every vertex onto the axle and keep the extremes
    pub fn project(&self, axle: &Axle) -> Cutter1D {
        let u = unit(axle);
        let Some(first) = self.vertices.first() else {
            return Cutter1D::new(0.0, 0.0);
        };
        let start = first.dot(u);
        let (min, max) = self
            .vertices
            .iter()
            .skip(1)
            .map(|v| v.dot(u))
            .fold((start, start), |(min, max), d| (min.min(d), max.max(d)));
        Cutter1D { min, max }
    }

    /// Vertex furthest along `direction`
    pub fn support(&self, direction: Vector) -> Option<Point> {
        self.vertices
            .iter()
            .copied()
            .max_by(|a, b| a.dot(direction).total_cmp(&b.dot(direction)))
    }

    /// Vertex nearest to `point`
    pub fn closest_vertex(&self, point: Point) -> Option<Point> {
        self.vertices.iter().copied().min_by(|a, b| {
            a.distance_squared(point)
                .total_cmp(&b.distance_squared(point))
        })
    }

    /// Vertex centroid
    pub fn center(&self) -> Point {
        if self.vertices.is_empty() {
            return Point::ZERO;
        }
        let sum: Point = self.vertices.iter().copied().sum();
        sum / self.vertices.len() as f64
    }

    /// Unsigned polygon area
    pub fn area(&self) -> f64 {
        signed_area(&self.vertices).abs()
    }

    pub fn aabb(&self) -> Aabb {
        Aabb::from_points(&self.vertices).unwrap_or(Aabb::new(Point::ZERO, Point::ZERO))
    }

    pub fn translate(&mut self, d: Vector) {
        for v in &mut self.vertices {
            *v += d;
        }
    }

    /// Rotate counter-clockwise around the vertex centroid
    pub fn rotate(&mut self, angle: f64) {
        let pivot = self.center();
        for v in &mut self.vertices {
            *v = rotate_around(*v, pivot, angle);
        }
    }
}

/// Shoelace area, positive for counter-clockwise polygons
fn signed_area(vertices: &[Point]) -> f64 {
    let n = vertices.len();
    if n < 3 {
        return 0.0;
    }
    let twice: f64 = (0..n)
        .map(|i| cross(vertices[i], vertices[(i + 1) % n]))
        .sum();
    twice * 0.5
}

/// Positive when `a -> b -> c` turns left
#[inline]
fn turn(a: Point, b: Point, c: Point) -> f64 {
    cross(b - a, c - a)
}
