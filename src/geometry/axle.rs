//! Projection axles and 1D intervals
//!
//! Separating-axis tests project both shapes onto an axle and compare the
//! resulting intervals. An axle whose input had zero length is degenerate:
//! its direction is the zero vector and callers must skip it.

use glam::DVec2;
use serde::{Deserialize, Serialize};

use super::{Point, Vector};
use crate::is_fuzzy_zero;

/// A projection direction, normalized on construction
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Axle {
    direction: Vector,
}

impl Axle {
    /// Axle along `direction`. A zero-length direction yields a degenerate axle.
    pub fn new(direction: Vector) -> Self {
        let len = direction.length();
        let direction = if !len.is_finite() || is_fuzzy_zero(len) {
            DVec2::ZERO
        } else {
            direction / len
        };
        Self { direction }
    }

    /// Axle pointing from `from` to `to`
    pub fn through(from: Point, to: Point) -> Self {
        Self::new(to - from)
    }

    /// Normalized direction (zero for degenerate axles)
    #[inline]
    pub fn direction(&self) -> Vector {
        self.direction
    }

    /// True when the axle has no usable direction
    #[inline]
    pub fn is_degenerate(&self) -> bool {
        self.direction == DVec2::ZERO
    }

    /// Perpendicular axle (rotated 90° counter-clockwise)
    pub fn normal(&self) -> Self {
        Self {
            direction: self.direction.perp(),
        }
    }

    /// Same axle, opposite direction
    pub fn reversed(&self) -> Self {
        Self {
            direction: -self.direction,
        }
    }
}

/// Unit direction of an axle. Returns the zero vector for degenerate axles.
#[inline]
pub fn unit(axle: &Axle) -> Vector {
    axle.direction
}

/// Closed interval `[min, max]` on a projection axle
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Cutter1D {
    pub min: f64,
    pub max: f64,
}

impl Cutter1D {
    /// Build an interval, swapping the endpoints if needed
    pub fn new(a: f64, b: f64) -> Self {
        if a > b {
            Self { min: b, max: a }
        } else {
            Self { min: a, max: b }
        }
    }

    #[inline]
    pub fn length(&self) -> f64 {
        self.max - self.min
    }

    /// Inclusive overlap test: touching intervals overlap
    #[inline]
    pub fn overlaps(&self, other: &Cutter1D) -> bool {
        self.max >= other.min && other.max >= self.min
    }

    /// Shortest distance one interval must move to stop overlapping the other.
    ///
    /// `None` when the intervals are disjoint, `Some(0.0)` when they touch.
    pub fn penetration(&self, other: &Cutter1D) -> Option<f64> {
        if !self.overlaps(other) {
            return None;
        }
        Some((self.max - other.min).min(other.max - self.min))
    }

    /// Smallest interval containing both
    pub fn merge(&self, other: &Cutter1D) -> Cutter1D {
        Cutter1D {
            min: self.min.min(other.min),
            max: self.max.max(other.max),
        }
    }
}
