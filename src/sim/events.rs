//! Collision events
//!
//! Listeners are notified once per confirmed contact per step, after the
//! narrow phase and before impulses are applied.

use super::body::{BodyId, CollisionGroup};
use crate::geometry::{Point, Vector};

/// A confirmed contact between two bodies
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CollisionEvent {
    pub body_a: BodyId,
    pub body_b: BodyId,
    /// Unit normal from `body_a` toward `body_b`
    pub normal: Vector,
    pub depth: f64,
    pub point: Point,
}

impl CollisionEvent {
    /// Same contact seen from the other body
    pub fn swapped(&self) -> Self {
        Self {
            body_a: self.body_b,
            body_b: self.body_a,
            normal: -self.normal,
            ..*self
        }
    }
}

/// Receives collision notifications
pub trait CollisionListener {
    fn on_collision(&mut self, event: &CollisionEvent);
}

impl<F> CollisionListener for F
where
    F: FnMut(&CollisionEvent),
{
    fn on_collision(&mut self, event: &CollisionEvent) {
        self(event)
    }
}

/// Listener that only fires for one pair of groups
pub(crate) struct GroupHandler {
    pub first: CollisionGroup,
    pub second: CollisionGroup,
    pub listener: Box<dyn CollisionListener>,
}

impl GroupHandler {
    /// Deliver the event if the groups match, reordered so `body_a` is in `first`
    pub fn dispatch(&mut self, event: &CollisionEvent, groups: (CollisionGroup, CollisionGroup)) {
        if groups == (self.first, self.second) {
            self.listener.on_collision(event);
        } else if groups == (self.second, self.first) {
            self.listener.on_collision(&event.swapped());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn event() -> CollisionEvent {
        CollisionEvent {
            body_a: BodyId(1),
            body_b: BodyId(2),
            normal: Vector::X,
            depth: 0.5,
            point: Point::ZERO,
        }
    }

    #[test]
    fn test_swapped_flips_normal() {
        let s = event().swapped();
        assert_eq!(s.body_a, BodyId(2));
        assert_eq!(s.normal, -Vector::X);
        assert_eq!(s.depth, 0.5);
    }

    #[test]
    fn test_group_handler_reorders() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = seen.clone();
        let mut handler = GroupHandler {
            first: CollisionGroup(7),
            second: CollisionGroup(3),
            listener: Box::new(move |e: &CollisionEvent| sink.borrow_mut().push(e.body_a)),
        };

        handler.dispatch(&event(), (CollisionGroup(3), CollisionGroup(7)));
        handler.dispatch(&event(), (CollisionGroup(7), CollisionGroup(3)));
        handler.dispatch(&event(), (CollisionGroup(1), CollisionGroup(3)));

        assert_eq!(*seen.borrow(), vec![BodyId(2), BodyId(1)]);
    }
}
