//! Rigid bodies
//!
//! A body owns exactly one collision shape. Its position is the shape's
//! center; moving the body moves the shape.

use glam::DVec2;
use serde::{Deserialize, Serialize};

use crate::consts::{DEFAULT_FRICTION, DEFAULT_RESTITUTION};
use crate::geometry::{Aabb, Point, Vector};
use crate::shape::CollisionShape;

/// Stable body identifier, allocated by the world in increasing order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BodyId(pub u32);

/// Collision group tag for group-filtered handlers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub struct CollisionGroup(pub u16);

/// Body mass
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Mass {
    Finite(f64),
    /// Immovable (static) body
    Infinite,
}

impl Mass {
    /// `1/mass`; zero for infinite, non-positive or non-finite masses, and
    /// for masses so small the reciprocal overflows
    pub fn inverse(self) -> f64 {
        match self {
            Mass::Finite(m) if m.is_finite() && m > 0.0 => {
                let inv = 1.0 / m;
                if inv.is_finite() { inv } else { 0.0 }
            }
            _ => 0.0,
        }
    }
}

/// A rigid body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Body {
    /// Assigned by `World::add_body`
    pub(crate) id: BodyId,
    pub(crate) velocity: Vector,
    pub(crate) angle: f64,
    pub(crate) angular_velocity: f64,
    pub(crate) mass: Mass,
    pub restitution: f64,
    pub friction: f64,
    /// Force accumulated for the next step, cleared after integration
    #[serde(skip)]
    pub(crate) force: Vector,
    pub(crate) shape: CollisionShape,
    pub group: CollisionGroup,
    /// Ghost bodies report contacts but are never pushed
    pub ghost: bool,
    /// Free slot for game logic
    #[serde(default)]
    pub user_tag: u64,
}

impl Body {
    fn with_mass(shape: CollisionShape, mass: Mass) -> Self {
        Self {
            id: BodyId(0),
            velocity: DVec2::ZERO,
            angle: 0.0,
            angular_velocity: 0.0,
            mass,
            restitution: DEFAULT_RESTITUTION,
            friction: DEFAULT_FRICTION,
            force: DVec2::ZERO,
            shape,
            group: CollisionGroup::default(),
            ghost: false,
            user_tag: 0,
        }
    }

    /// A body that moves and responds to collisions
    pub fn dynamic(shape: impl Into<CollisionShape>, mass: f64) -> Self {
        Self::with_mass(shape.into(), Mass::Finite(mass))
    }

    /// An immovable body (infinite mass)
    pub fn fixed(shape: impl Into<CollisionShape>) -> Self {
        Self::with_mass(shape.into(), Mass::Infinite)
    }

    pub fn with_velocity(mut self, velocity: Vector) -> Self {
        self.velocity = velocity;
        self
    }

    pub fn with_angular_velocity(mut self, omega: f64) -> Self {
        self.angular_velocity = omega;
        self
    }

    pub fn with_restitution(mut self, restitution: f64) -> Self {
        self.restitution = restitution;
        self
    }

    pub fn with_friction(mut self, friction: f64) -> Self {
        self.friction = friction;
        self
    }

    pub fn with_group(mut self, group: CollisionGroup) -> Self {
        self.group = group;
        self
    }

    pub fn as_ghost(mut self) -> Self {
        self.ghost = true;
        self
    }

    #[inline]
    pub fn id(&self) -> BodyId {
        self.id
    }

    #[inline]
    pub fn position(&self) -> Point {
        self.shape.center()
    }

    #[inline]
    pub fn velocity(&self) -> Vector {
        self.velocity
    }

    #[inline]
    pub fn angle(&self) -> f64 {
        self.angle
    }

    #[inline]
    pub fn angular_velocity(&self) -> f64 {
        self.angular_velocity
    }

    #[inline]
    pub fn shape(&self) -> &CollisionShape {
        &self.shape
    }

    #[inline]
    pub fn mass(&self) -> Mass {
        self.mass
    }

    #[inline]
    pub fn inverse_mass(&self) -> f64 {
        self.mass.inverse()
    }

    /// Zero inverse mass: never displaced by contacts
    #[inline]
    pub fn is_static(&self) -> bool {
        self.inverse_mass() == 0.0
    }

    pub fn aabb(&self) -> Aabb {
        self.shape.aabb()
    }

    /// Kinetic energy (`½mv²`), zero for static bodies
    pub fn kinetic_energy(&self) -> f64 {
        match self.mass {
            Mass::Finite(m) if !self.is_static() => 0.5 * m * self.velocity.length_squared(),
            _ => 0.0,
        }
    }

    /// Teleport the body's center to `position`
    pub fn set_position(&mut self, position: Point) {
        let delta = position - self.shape.center();
        self.shape.move_by(delta);
    }

    pub fn move_by(&mut self, d: Vector) {
        self.shape.move_by(d);
    }

    pub fn set_velocity(&mut self, velocity: Vector) {
        self.velocity = velocity;
    }

    pub fn set_angular_velocity(&mut self, omega: f64) {
        self.angular_velocity = omega;
    }

    pub fn set_mass(&mut self, mass: Mass) {
        self.mass = mass;
    }

    /// Rotate the body (and its shape) by `angle` radians
    pub fn rotate_by(&mut self, angle: f64) {
        self.angle += angle;
        self.shape.rotate(angle);
    }

    /// Instant velocity change `impulse / mass`
    pub fn apply_impulse(&mut self, impulse: Vector) {
        self.velocity += impulse * self.inverse_mass();
    }

    /// Accumulate a force for the next step
    pub fn apply_force(&mut self, force: Vector) {
        self.force += force;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ball() -> Body {
        Body::dynamic(CollisionShape::circle(Point::new(1.0, 1.0), 0.5), 2.0)
    }

    #[test]
    fn test_inverse_mass() {
        assert_eq!(Mass::Finite(4.0).inverse(), 0.25);
        assert_eq!(Mass::Infinite.inverse(), 0.0);
        assert_eq!(Mass::Finite(0.0).inverse(), 0.0);
        assert_eq!(Mass::Finite(-1.0).inverse(), 0.0);
        assert_eq!(Mass::Finite(f64::NAN).inverse(), 0.0);
        // Subnormal: 1/m overflows
        assert_eq!(Mass::Finite(1e-320).inverse(), 0.0);
        assert!(Mass::Finite(1e-300).inverse() > 1e299);
    }

    #[test]
    fn test_set_position_moves_shape() {
        let mut body = ball();
        body.set_position(Point::new(5.0, -2.0));
        assert_eq!(body.position(), Point::new(5.0, -2.0));
        assert_eq!(body.shape().center(), Point::new(5.0, -2.0));
    }

    #[test]
    fn test_apply_impulse_respects_mass() {
        let mut body = ball();
        body.apply_impulse(Vector::new(4.0, 0.0));
        assert_eq!(body.velocity(), Vector::new(2.0, 0.0));

        let mut wall = Body::fixed(CollisionShape::rectangle(Point::ZERO, Vector::ONE));
        wall.apply_impulse(Vector::new(100.0, 0.0));
        assert_eq!(wall.velocity(), Vector::ZERO);
        assert!(wall.is_static());
    }

    #[test]
    fn test_kinetic_energy() {
        let body = ball().with_velocity(Vector::new(3.0, 4.0));
        assert!((body.kinetic_energy() - 25.0).abs() < 1e-12);
    }

    #[test]
    fn test_clone_then_mutate_leaves_original() {
        let original = Body::dynamic(CollisionShape::rectangle(Point::ZERO, Vector::ONE), 1.0);
        let mut copy = original.clone();
        copy.move_by(Vector::new(3.0, 3.0));
        copy.rotate_by(0.7);
        assert_eq!(original.position(), Point::ZERO);
        assert_eq!(original.angle(), 0.0);
        assert_eq!(original.shape(), &CollisionShape::rectangle(Point::ZERO, Vector::ONE));
    }
}
