//! World stepper
//!
//! Owns every body and runs the fixed phase order each step:
//! 1. Broad phase (grid rebuild, candidate pairs)
//! 2. Narrow phase (SAT, sorted contacts)
//! 3. Events
//! 4. Resolve (impulses, then positional correction)
//! 5. Integrate
//! 6. Joints
//!
//! Bodies are stored sorted by id and every loop walks them in that order,
//! so identical inputs give identical results.

use std::collections::BTreeMap;
use std::sync::Arc;

use super::body::{Body, BodyId, CollisionGroup};
use super::collision::{Contact, detect};
use super::events::{CollisionEvent, CollisionListener, GroupHandler};
use super::grid::Grid;
use super::joint::{Joint, JointId, solve_distance, solve_pin};
use super::resolver::{ResolverParams, apply_impulse, correct_positions};
use crate::geometry::{Aabb, Vector};
use crate::settings::{SettingsError, WorldSettings};
use crate::shape::CircleToHullTransformer;

/// A confirmed contact between two bodies (`a < b`)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContactManifold {
    pub a: BodyId,
    pub b: BodyId,
    pub contact: Contact,
}

pub struct World {
    settings: WorldSettings,
    params: ResolverParams,
    transformer: Arc<CircleToHullTransformer>,
    /// Sorted by id (ids only ever grow)
    bodies: Vec<Body>,
    grid: Grid,
    joints: BTreeMap<JointId, Joint>,
    next_body: u32,
    next_joint: u32,
    accumulator: f64,
    steps: u64,
    contacts: Vec<ContactManifold>,
    listeners: Vec<Box<dyn CollisionListener>>,
    group_handlers: Vec<GroupHandler>,
}

impl Default for World {
    fn default() -> Self {
        Self::new(WorldSettings::default())
    }
}

impl World {
    /// Create a world. Invalid settings are replaced by the defaults.
    pub fn new(settings: WorldSettings) -> Self {
        match Self::try_new(settings) {
            Ok(world) => world,
            Err(e) => {
                log::warn!("{e}; falling back to default world settings");
                let settings = WorldSettings::default();
                let transformer = Arc::new(CircleToHullTransformer::new(settings.hull_sides));
                Self::with_transformer(settings, transformer)
            }
        }
    }

    /// Create a world, rejecting invalid settings
    pub fn try_new(settings: WorldSettings) -> Result<Self, SettingsError> {
        settings.validate()?;
        let transformer = Arc::new(CircleToHullTransformer::new(settings.hull_sides));
        Ok(Self::with_transformer(settings, transformer))
    }

    /// Create a world whose circles share `transformer`
    pub fn with_transformer(
        settings: WorldSettings,
        transformer: Arc<CircleToHullTransformer>,
    ) -> Self {
        log::info!(
            "World created: gravity={:?} dt={} restitution={} hull_sides={}",
            settings.gravity,
            settings.fixed_dt,
            settings.restitution.as_str(),
            transformer.sides()
        );
        let grid = Grid::new(settings.cell_size.unwrap_or(crate::consts::DEFAULT_CELL_SIZE));
        Self {
            params: ResolverParams::from(&settings),
            settings,
            transformer,
            bodies: Vec::new(),
            grid,
            joints: BTreeMap::new(),
            next_body: 0,
            next_joint: 0,
            accumulator: 0.0,
            steps: 0,
            contacts: Vec::new(),
            listeners: Vec::new(),
            group_handlers: Vec::new(),
        }
    }

    pub fn settings(&self) -> &WorldSettings {
        &self.settings
    }

    pub fn transformer(&self) -> &Arc<CircleToHullTransformer> {
        &self.transformer
    }

    // ---- Bodies ----

    /// Add a body and return its new id
    pub fn add_body(&mut self, mut body: Body) -> BodyId {
        let id = BodyId(self.next_body);
        self.next_body += 1;

        body.id = id;
        body.shape.attach_transformer(self.transformer.clone());
        self.grid.insert(id, &body.aabb());
        self.bodies.push(body);
        id
    }

    /// Remove a body along with any joint that references it
    pub fn remove_body(&mut self, id: BodyId) -> Option<Body> {
        let index = index_of(&self.bodies, id)?;
        self.grid.remove(id);
        self.joints.retain(|_, joint| !joint.references(id));
        self.contacts.retain(|m| m.a != id && m.b != id);
        Some(self.bodies.remove(index))
    }

    pub fn body(&self, id: BodyId) -> Option<&Body> {
        index_of(&self.bodies, id).map(|i| &self.bodies[i])
    }

    pub fn body_mut(&mut self, id: BodyId) -> Option<&mut Body> {
        index_of(&self.bodies, id).map(|i| &mut self.bodies[i])
    }

    /// All bodies, ascending by id
    pub fn bodies(&self) -> &[Body] {
        &self.bodies
    }

    pub fn len(&self) -> usize {
        self.bodies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bodies.is_empty()
    }

    /// Bodies whose bounds overlapped `region` as of the last step (or insertion)
    pub fn query_region(&self, region: &Aabb) -> Vec<BodyId> {
        self.grid.query(region)
    }

    /// Contacts confirmed during the last step, sorted by `(a, b)`
    pub fn contacts(&self) -> &[ContactManifold] {
        &self.contacts
    }

    /// Total kinetic energy of all bodies
    pub fn kinetic_energy(&self) -> f64 {
        self.bodies.iter().map(Body::kinetic_energy).sum()
    }

    /// Number of `step` calls that did work
    pub fn step_count(&self) -> u64 {
        self.steps
    }

    // ---- Joints ----

    pub fn add_joint(&mut self, joint: Joint) -> JointId {
        let id = JointId(self.next_joint);
        self.next_joint += 1;
        self.joints.insert(id, joint);
        id
    }

    pub fn remove_joint(&mut self, id: JointId) -> Option<Joint> {
        self.joints.remove(&id)
    }

    pub fn joints(&self) -> impl Iterator<Item = (JointId, &Joint)> {
        self.joints.iter().map(|(&id, joint)| (id, joint))
    }

    // ---- Events ----

    /// Notify `listener` of every contact
    pub fn add_listener(&mut self, listener: Box<dyn CollisionListener>) {
        self.listeners.push(listener);
    }

    /// Notify `handler` of contacts between `first` and `second` group bodies.
    ///
    /// Events are reordered so `body_a` belongs to `first`.
    pub fn add_group_handler(
        &mut self,
        first: CollisionGroup,
        second: CollisionGroup,
        handler: Box<dyn CollisionListener>,
    ) {
        self.group_handlers.push(GroupHandler {
            first,
            second,
            listener: handler,
        });
    }

    // ---- Stepping ----

    /// Advance the simulation by `dt` seconds
    pub fn step(&mut self, dt: f64) {
        if !dt.is_finite() || dt <= 0.0 {
            log::warn!("Ignoring step with invalid dt {dt}");
            return;
        }
        let dt = if dt > self.settings.max_dt {
            log::warn!("Step dt {dt} clamped to {}", self.settings.max_dt);
            self.settings.max_dt
        } else {
            dt
        };

        self.broad_phase();
        self.narrow_phase();
        self.dispatch_events();
        self.resolve();
        self.integrate(dt);
        self.solve_joints();
        self.steps += 1;
    }

    /// Run as many fixed steps as `frame_dt` covers, up to `max_substeps`.
    ///
    /// Backlog beyond the cap is dropped. Returns the number of steps run.
    pub fn advance(&mut self, frame_dt: f64) -> u32 {
        if !frame_dt.is_finite() || frame_dt < 0.0 {
            log::warn!("Ignoring advance with invalid frame dt {frame_dt}");
            return 0;
        }

        let fixed_dt = self.settings.fixed_dt;
        self.accumulator += frame_dt;

        let mut steps = 0;
        while self.accumulator >= fixed_dt && steps < self.settings.max_substeps {
            self.step(fixed_dt);
            self.accumulator -= fixed_dt;
            steps += 1;
        }

        if self.accumulator >= fixed_dt {
            log::debug!(
                "Dropping {:.4}s of simulation backlog after {steps} substeps",
                self.accumulator
            );
            self.accumulator %= fixed_dt;
        }

        steps
    }

    /// Leftover fraction of a fixed step, for render interpolation
    pub fn interpolation_alpha(&self) -> f64 {
        (self.accumulator / self.settings.fixed_dt).clamp(0.0, 1.0)
    }

    fn broad_phase(&mut self) {
        let aabbs: Vec<(BodyId, Aabb)> = self.bodies.iter().map(|b| (b.id, b.aabb())).collect();
        let cell_size = self
            .settings
            .cell_size
            .unwrap_or_else(|| Grid::derive_cell_size(aabbs.iter().map(|(_, aabb)| aabb)));
        self.grid.set_cell_size(cell_size);
        self.grid.rebuild(aabbs);
    }

    fn narrow_phase(&mut self) {
        let mut contacts = Vec::new();

        for (a, b) in self.grid.candidate_pairs() {
            let (Some(ia), Some(ib)) = (index_of(&self.bodies, a), index_of(&self.bodies, b)) else {
                log::debug!("Narrow phase: stale pair {}-{}", a.0, b.0);
                continue;
            };
            let (body_a, body_b) = (&self.bodies[ia], &self.bodies[ib]);
            if body_a.is_static() && body_b.is_static() {
                continue;
            }
            if let Some(contact) = detect(&body_a.shape, &body_b.shape) {
                contacts.push(ContactManifold { a, b, contact });
            }
        }

        contacts.sort_by_key(|m| (m.a, m.b));
        self.contacts = contacts;
    }

    fn dispatch_events(&mut self) {
        if self.listeners.is_empty() && self.group_handlers.is_empty() {
            return;
        }

        let events: Vec<(CollisionEvent, (CollisionGroup, CollisionGroup))> = self
            .contacts
            .iter()
            .filter_map(|m| {
                let a = &self.bodies[index_of(&self.bodies, m.a)?];
                let b = &self.bodies[index_of(&self.bodies, m.b)?];
                let event = CollisionEvent {
                    body_a: m.a,
                    body_b: m.b,
                    normal: m.contact.normal,
                    depth: m.contact.depth,
                    point: m.contact.point,
                };
                Some((event, (a.group, b.group)))
            })
            .collect();

        for (event, groups) in &events {
            for listener in &mut self.listeners {
                listener.on_collision(event);
            }
            for handler in &mut self.group_handlers {
                handler.dispatch(event, *groups);
            }
        }
    }

    fn resolve(&mut self) {
        for m in &self.contacts {
            if let Some((a, b)) = contact_pair(&mut self.bodies, m) {
                apply_impulse(a, b, &m.contact, &self.params);
            }
        }
        for m in &self.contacts {
            if let Some((a, b)) = contact_pair(&mut self.bodies, m) {
                correct_positions(a, b, &m.contact, &self.params);
            }
        }
    }

    fn integrate(&mut self, dt: f64) {
        let gravity = self.settings.gravity;
        for body in &mut self.bodies {
            if !body.is_static() {
                let acceleration = gravity + body.force * body.inverse_mass();
                let velocity = body.velocity + acceleration * dt;
                if velocity.is_finite() {
                    body.velocity = velocity;
                } else {
                    log::debug!("Integrate: dropping non-finite acceleration on body {}", body.id.0);
                }
                body.shape.move_by(body.velocity * dt);
                if body.angular_velocity != 0.0 {
                    body.rotate_by(body.angular_velocity * dt);
                }
            }
            body.force = Vector::ZERO;
        }
    }

    fn solve_joints(&mut self) {
        for (id, joint) in &self.joints {
            match *joint {
                Joint::Pin { body, anchor } => match index_of(&self.bodies, body) {
                    Some(i) => solve_pin(&mut self.bodies[i], anchor),
                    None => log::debug!("Joint {}: missing body {}", id.0, body.0),
                },
                Joint::Distance { a, b, length } => {
                    let (Some(ia), Some(ib)) = (index_of(&self.bodies, a), index_of(&self.bodies, b))
                    else {
                        log::debug!("Joint {}: missing body {} or {}", id.0, a.0, b.0);
                        continue;
                    };
                    if ia == ib {
                        continue;
                    }
                    if ia < ib {
                        let (a, b) = pair_mut(&mut self.bodies, ia, ib);
                        solve_distance(a, b, length);
                    } else {
                        let (b, a) = pair_mut(&mut self.bodies, ib, ia);
                        solve_distance(a, b, length);
                    }
                }
            }
        }
    }
}

#[inline]
fn index_of(bodies: &[Body], id: BodyId) -> Option<usize> {
    bodies.binary_search_by_key(&id, |b| b.id).ok()
}

/// Two distinct bodies, `i < j`
fn pair_mut(bodies: &mut [Body], i: usize, j: usize) -> (&mut Body, &mut Body) {
    debug_assert!(i < j);
    let (left, right) = bodies.split_at_mut(j);
    (&mut left[i], &mut right[0])
}

/// Mutable bodies for a contact, or `None` if either is missing or a ghost
fn contact_pair<'a>(
    bodies: &'a mut [Body],
    m: &ContactManifold,
) -> Option<(&'a mut Body, &'a mut Body)> {
    let ia = index_of(bodies, m.a)?;
    let ib = index_of(bodies, m.b)?;
    if bodies[ia].ghost || bodies[ib].ghost {
        return None;
    }
    Some(pair_mut(bodies, ia, ib))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Point;
    use crate::shape::CollisionShape;
    use glam::DVec2;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn zero_g() -> World {
        World::new(WorldSettings::with_gravity(DVec2::ZERO))
    }

    fn ball(x: f64, y: f64, r: f64) -> Body {
        Body::dynamic(CollisionShape::circle(Point::new(x, y), r), 1.0)
    }

    #[test]
    fn test_ids_are_monotonic() {
        let mut world = zero_g();
        let a = world.add_body(ball(0.0, 0.0, 1.0));
        let b = world.add_body(ball(5.0, 0.0, 1.0));
        world.remove_body(a);
        let c = world.add_body(ball(9.0, 0.0, 1.0));
        assert!(a < b && b < c);
        assert_eq!(world.len(), 2);
        assert!(world.body(a).is_none());
        assert_eq!(world.bodies()[0].id(), b);
    }

    #[test]
    fn test_add_body_attaches_world_transformer() {
        let mut world = zero_g();
        let id = world.add_body(ball(0.0, 0.0, 1.0));
        let CollisionShape::Circle(c) = world.body(id).unwrap().shape() else {
            panic!("expected circle");
        };
        assert!(Arc::ptr_eq(c.transformer().unwrap(), world.transformer()));
    }

    #[test]
    fn test_remove_body_drops_joints() {
        let mut world = zero_g();
        let a = world.add_body(ball(0.0, 0.0, 1.0));
        let b = world.add_body(ball(5.0, 0.0, 1.0));
        world.add_joint(Joint::Distance { a, b, length: 5.0 });
        world.add_joint(Joint::Pin {
            body: a,
            anchor: Point::ZERO,
        });
        assert!(world.remove_body(b).is_some());
        assert_eq!(world.joints().count(), 1);
        assert!(world.remove_body(b).is_none());
    }

    #[test]
    fn test_invalid_dt_is_noop() {
        let mut world = World::default();
        let id = world.add_body(ball(0.0, 0.0, 1.0));
        world.step(0.0);
        world.step(-1.0);
        world.step(f64::NAN);
        assert_eq!(world.step_count(), 0);
        assert_eq!(world.body(id).unwrap().position(), Point::ZERO);
    }

    #[test]
    fn test_large_dt_is_clamped() {
        let mut world = World::new(WorldSettings::with_gravity(DVec2::new(0.0, -10.0)));
        let id = world.add_body(ball(0.0, 0.0, 1.0));
        world.step(10.0);
        let max_dt = world.settings().max_dt;
        assert!((world.body(id).unwrap().velocity().y + 10.0 * max_dt).abs() < 1e-12);
    }

    #[test]
    fn test_gravity_integration() {
        let mut world = World::new(WorldSettings::with_gravity(DVec2::new(0.0, -10.0)));
        let id = world.add_body(ball(0.0, 0.0, 1.0));
        let wall = world.add_body(Body::fixed(CollisionShape::circle(Point::new(50.0, 0.0), 1.0)));
        world.step(0.02);
        let body = world.body(id).unwrap();
        assert!((body.velocity().y + 0.2).abs() < 1e-12);
        assert!((body.position().y + 0.004).abs() < 1e-12);
        assert_eq!(world.body(wall).unwrap().position(), Point::new(50.0, 0.0));
    }

    #[test]
    fn test_forces_cleared_after_step() {
        let mut world = zero_g();
        let id = world.add_body(ball(0.0, 0.0, 1.0));
        world.body_mut(id).unwrap().apply_force(Vector::new(2.0, 0.0));
        world.step(0.01);
        world.step(0.01);
        assert!((world.body(id).unwrap().velocity().x - 0.02).abs() < 1e-12);
    }

    #[test]
    fn test_elastic_head_on_swap() {
        let mut world = zero_g();
        let a = world.add_body(
            ball(0.0, 0.0, 5.0)
                .with_velocity(Vector::new(10.0, 0.0))
                .with_restitution(1.0)
                .with_friction(0.0),
        );
        let b = world.add_body(
            ball(8.0, 0.0, 5.0)
                .with_velocity(Vector::new(-10.0, 0.0))
                .with_restitution(1.0)
                .with_friction(0.0),
        );
        world.step(crate::consts::SIM_DT);
        assert_eq!(world.contacts().len(), 1);
        assert!((world.body(a).unwrap().velocity().x + 10.0).abs() < 1e-6);
        assert!((world.body(b).unwrap().velocity().x - 10.0).abs() < 1e-6);
    }

    #[test]
    fn test_static_pairs_skipped() {
        let mut world = zero_g();
        world.add_body(Body::fixed(CollisionShape::circle(Point::ZERO, 2.0)));
        world.add_body(Body::fixed(CollisionShape::circle(Point::X, 2.0)));
        world.step(0.01);
        assert!(world.contacts().is_empty());
    }

    #[test]
    fn test_contacts_sorted() {
        let mut world = zero_g();
        for i in 0..6 {
            world.add_body(ball(i as f64 * 1.5, 0.0, 1.0));
        }
        world.step(0.001);
        let contacts = world.contacts();
        assert_eq!(contacts.len(), 5);
        assert!(contacts.windows(2).all(|w| (w[0].a, w[0].b) < (w[1].a, w[1].b)));
        assert!(contacts.iter().all(|m| m.a < m.b));
    }

    #[test]
    fn test_ghost_reports_but_is_not_pushed() {
        let mut world = zero_g();
        let events = Rc::new(RefCell::new(0));
        let sink = events.clone();
        world.add_listener(Box::new(move |_: &CollisionEvent| *sink.borrow_mut() += 1));

        world.add_body(Body::fixed(CollisionShape::rectangle(
            Point::new(0.0, -1.0),
            Vector::new(10.0, 1.0),
        )));
        let ghost = world.add_body(
            ball(0.0, 0.5, 1.0)
                .with_velocity(Vector::new(0.0, -1.0))
                .as_ghost(),
        );
        world.step(0.01);

        assert_eq!(*events.borrow(), 1);
        let body = world.body(ghost).unwrap();
        assert_eq!(body.velocity(), Vector::new(0.0, -1.0));
        assert!((body.position().y - 0.49).abs() < 1e-12);
    }

    #[test]
    fn test_group_handler_filters_and_orders() {
        let mut world = zero_g();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = seen.clone();
        world.add_group_handler(
            CollisionGroup(2),
            CollisionGroup(1),
            Box::new(move |e: &CollisionEvent| sink.borrow_mut().push((e.body_a, e.body_b))),
        );

        let a = world.add_body(ball(0.0, 0.0, 1.0).with_group(CollisionGroup(1)));
        let b = world.add_body(ball(1.5, 0.0, 1.0).with_group(CollisionGroup(2)));
        world.add_body(ball(50.0, 0.0, 1.0).with_group(CollisionGroup(2)));
        world.add_body(ball(51.5, 0.0, 1.0).with_group(CollisionGroup(2)));
        world.step(0.001);

        assert_eq!(*seen.borrow(), vec![(b, a)]);
    }

    #[test]
    fn test_pin_holds_under_gravity() {
        let mut world = World::new(WorldSettings::with_gravity(DVec2::new(0.0, -9.8)));
        let id = world.add_body(ball(3.0, 4.0, 1.0));
        let joint = Joint::pin_in_place(world.body(id).unwrap());
        world.add_joint(joint);
        for _ in 0..100 {
            world.step(crate::consts::SIM_DT);
        }
        let body = world.body(id).unwrap();
        assert!((body.position() - Point::new(3.0, 4.0)).length() < 1e-9);
    }

    #[test]
    fn test_advance_caps_substeps() {
        let mut world = zero_g();
        let max = world.settings().max_substeps;
        assert_eq!(world.advance(10.0), max);
        assert!(world.interpolation_alpha() < 1.0);
        assert_eq!(world.advance(0.0), 0);
        assert_eq!(world.advance(f64::INFINITY), 0);
    }

    #[test]
    fn test_advance_accumulates() {
        let mut world = zero_g();
        let dt = world.settings().fixed_dt;
        assert_eq!(world.advance(dt * 0.5), 0);
        assert!((world.interpolation_alpha() - 0.5).abs() < 1e-9);
        assert_eq!(world.advance(dt * 0.75), 1);
        assert!((world.interpolation_alpha() - 0.25).abs() < 1e-9);
    }

    #[test]
    fn test_query_region() {
        let mut world = zero_g();
        let a = world.add_body(ball(0.0, 0.0, 1.0));
        world.add_body(ball(100.0, 0.0, 1.0));
        let found = world.query_region(&Aabb::new(Point::splat(-2.0), Point::splat(2.0)));
        assert_eq!(found, vec![a]);
    }
}
