//! The rigid-body world the vehicles drive around in, backed by rapier.
//!
//! Bodies are addressed by [BodyId] so the rest of the crate never touches rapier handles.
//! Contacts are reported once, on the step in which two bodies start touching.

use crate::math::{Point2d, Vector2d};
use crossbeam::channel::{Receiver, Sender};
use log::trace;
use rapier2d_f64::prelude::*;
use slotmap::{new_key_type, Key, KeyData, SlotMap};

/// The coefficient of restitution of every box. Pairs combine theirs by multiplication.
const ELASTICITY: f64 = 0.5;

new_key_type! {
    /// Unique ID of a body in a [PhysicsWorld].
    pub struct BodyId;
}

/// A rectangular body to be added to a [PhysicsWorld].
#[derive(Clone, Copy, Debug)]
pub struct BoxBody {
    /// The position of the centre of mass.
    pub position: Point2d,
    /// The rotation in radians.
    pub angle: f64,
    /// The extent along the body's local x axis.
    pub length: f64,
    /// The extent along the body's local y axis.
    pub width: f64,
    pub mass: f64,
}

/// The state of a body after the last step.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BodyState {
    pub position: Point2d,
    /// The rotation in radians.
    pub angle: f64,
    pub velocity: Vector2d,
    /// The angular velocity in rad/s.
    pub angular_velocity: f64,
}

/// Two bodies which started touching during a step.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Contact {
    pub a: BodyId,
    pub b: BodyId,
}

/// Forwards rapier's collision events to a channel.
struct CollisionEventHandler {
    sender: Sender<CollisionEvent>,
}

impl EventHandler for CollisionEventHandler {
    fn handle_collision_event(
        &self,
        _bodies: &RigidBodySet,
        _colliders: &ColliderSet,
        event: CollisionEvent,
        _contact_pair: Option<&ContactPair>,
    ) {
        let _ = self.sender.send(event);
    }

    fn handle_contact_force_event(
        &self,
        _dt: f64,
        _bodies: &RigidBodySet,
        _colliders: &ColliderSet,
        _contact_pair: &ContactPair,
        _total_force_magnitude: f64,
    ) {
    }
}

/// A world of rigid boxes on a plane with no gravity.
pub struct PhysicsWorld {
    /// Maps IDs to rapier's handles. Each rapier body stores its ID in `user_data`.
    handles: SlotMap<BodyId, RigidBodyHandle>,
    /// The fraction of velocity a body keeps after one second.
    damping: f64,
    bodies: RigidBodySet,
    colliders: ColliderSet,
    impulse_joints: ImpulseJointSet,
    multibody_joints: MultibodyJointSet,
    integration_parameters: IntegrationParameters,
    physics_pipeline: PhysicsPipeline,
    island_manager: IslandManager,
    broad_phase: BroadPhase,
    narrow_phase: NarrowPhase,
    ccd_solver: CCDSolver,
    event_handler: CollisionEventHandler,
    event_recv: Receiver<CollisionEvent>,
}

impl Default for PhysicsWorld {
    fn default() -> Self {
        Self::new(1.0)
    }
}

impl std::fmt::Debug for PhysicsWorld {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PhysicsWorld")
            .field("bodies", &self.handles.len())
            .field("damping", &self.damping)
            .finish()
    }
}

/// Converts a damping factor (velocity kept after one second) into rapier's damping
/// coefficient, which scales velocity by `1 / (1 + dt * c)` each step.
fn damping_coefficient(damping: f64) -> f64 {
    -damping.ln()
}

fn to_vector(v: Vector2d) -> Vector<Real> {
    vector![v.x, v.y]
}

impl PhysicsWorld {
    /// Creates an empty world.
    ///
    /// # Parameters
    /// * `damping` - The fraction of velocity a body keeps after one second, in `(0, 1]`
    pub fn new(damping: f64) -> Self {
        let (sender, event_recv) = crossbeam::channel::unbounded();
        Self {
            handles: SlotMap::with_key(),
            damping,
            bodies: RigidBodySet::new(),
            colliders: ColliderSet::new(),
            impulse_joints: ImpulseJointSet::new(),
            multibody_joints: MultibodyJointSet::new(),
            integration_parameters: IntegrationParameters::default(),
            physics_pipeline: PhysicsPipeline::new(),
            island_manager: IslandManager::new(),
            broad_phase: BroadPhase::new(),
            narrow_phase: NarrowPhase::new(),
            ccd_solver: CCDSolver::new(),
            event_handler: CollisionEventHandler { sender },
            event_recv,
        }
    }

    /// Adds a box to the world.
    pub fn add_body(&mut self, desc: BoxBody) -> BodyId {
        let damping = damping_coefficient(self.damping);
        let Self {
            handles,
            bodies,
            colliders,
            ..
        } = self;

        handles.insert_with_key(|id| {
            let rigid_body = RigidBodyBuilder::dynamic()
                .translation(vector![desc.position.x, desc.position.y])
                .rotation(desc.angle)
                .linear_damping(damping)
                .angular_damping(damping)
                .can_sleep(false)
                .user_data(id.data().as_ffi() as u128)
                .build();
            let handle = bodies.insert(rigid_body);
            let collider = ColliderBuilder::cuboid(0.5 * desc.length, 0.5 * desc.width)
                .density(desc.mass / (desc.length * desc.width))
                .restitution(ELASTICITY)
                .restitution_combine_rule(CoefficientCombineRule::Multiply)
                .active_events(ActiveEvents::COLLISION_EVENTS)
                .build();
            colliders.insert_with_parent(collider, handle, bodies);
            handle
        })
    }

    /// Removes a body from the world. Returns `false` if there was no such body.
    pub fn remove_body(&mut self, id: BodyId) -> bool {
        let Some(handle) = self.handles.remove(id) else {
            return false;
        };
        self.bodies.remove(
            handle,
            &mut self.island_manager,
            &mut self.colliders,
            &mut self.impulse_joints,
            &mut self.multibody_joints,
            /*remove_attached_colliders=*/ true,
        );
        true
    }

    /// Removes every body.
    pub fn clear(&mut self) {
        *self = Self::new(self.damping);
    }

    /// Gets the state of a body.
    pub fn body(&self, id: BodyId) -> Option<BodyState> {
        let body = self.bodies.get(*self.handles.get(id)?)?;
        let position = body.translation();
        let velocity = body.linvel();
        Some(BodyState {
            position: Point2d::new(position.x, position.y),
            angle: body.rotation().angle(),
            velocity: Vector2d::new(velocity.x, velocity.y),
            angular_velocity: body.angvel(),
        })
    }

    /// The number of bodies in the world.
    pub fn len(&self) -> usize {
        self.handles.len()
    }

    /// Whether the world has no bodies.
    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }

    fn rigid_body_mut(&mut self, id: BodyId) -> Option<&mut RigidBody> {
        let handle = *self.handles.get(id)?;
        self.bodies.get_mut(handle)
    }

    /// Applies a force, given in the body's local frame, at its centre of mass.
    /// The force only lasts for the next step.
    pub fn apply_local_force(&mut self, id: BodyId, force: Vector2d) {
        if let Some(body) = self.rigid_body_mut(id) {
            let force = body.rotation().transform_vector(&to_vector(force));
            body.add_force(force, true);
        }
    }

    /// Sets the linear velocity of a body.
    pub fn set_velocity(&mut self, id: BodyId, velocity: Vector2d) {
        if let Some(body) = self.rigid_body_mut(id) {
            body.set_linvel(to_vector(velocity), true);
        }
    }

    /// Sets the angular velocity of a body.
    pub fn set_angular_velocity(&mut self, id: BodyId, angular_velocity: f64) {
        if let Some(body) = self.rigid_body_mut(id) {
            body.set_angvel(angular_velocity, true);
        }
    }

    /// Advances the world by `dt` seconds and returns the pairs of bodies that started touching.
    pub fn step(&mut self, dt: f64) -> Vec<Contact> {
        self.integration_parameters.dt = dt;
        let gravity = vector![0.0, 0.0];
        let physics_hooks = ();
        self.physics_pipeline.step(
            &gravity,
            &self.integration_parameters,
            &mut self.island_manager,
            &mut self.broad_phase,
            &mut self.narrow_phase,
            &mut self.bodies,
            &mut self.colliders,
            &mut self.impulse_joints,
            &mut self.multibody_joints,
            &mut self.ccd_solver,
            None,
            &physics_hooks,
            &self.event_handler,
        );
        for (_, body) in self.bodies.iter_mut() {
            body.reset_forces(false);
        }

        let mut contacts = vec![];
        while let Ok(event) = self.event_recv.try_recv() {
            if let CollisionEvent::Started(h1, h2, _flags) = event {
                if let (Some(a), Some(b)) = (self.body_of(h1), self.body_of(h2)) {
                    trace!("contact {:?} <-> {:?}", a, b);
                    contacts.push(Contact { a, b });
                }
            }
        }
        contacts
    }

    /// Finds the ID of the body a collider is attached to.
    fn body_of(&self, collider: ColliderHandle) -> Option<BodyId> {
        let parent = self.colliders.get(collider)?.parent()?;
        let body = self.bodies.get(parent)?;
        let id = BodyId::from(KeyData::from_ffi(body.user_data as u64));
        self.handles.contains_key(id).then_some(id)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use assert_approx_eq::assert_approx_eq;

    fn car(x: f64, y: f64) -> BoxBody {
        BoxBody {
            position: Point2d::new(x, y),
            angle: 0.0,
            length: 50.0,
            width: 30.0,
            mass: 0.1,
        }
    }

    #[test]
    fn force_accelerates_along_heading() {
        let mut world = PhysicsWorld::new(1.0);
        let id = world.add_body(BoxBody {
            angle: std::f64::consts::FRAC_PI_2,
            mass: 2.0,
            ..car(0.0, 0.0)
        });
        world.apply_local_force(id, Vector2d::new(4.0, 0.0));
        world.step(0.5);

        let body = world.body(id).unwrap();
        assert_approx_eq!(body.velocity.x, 0.0);
        assert_approx_eq!(body.velocity.y, 1.0);
        assert_approx_eq!(body.position.y, 0.5);

        // Forces only last for one step
        world.step(0.5);
        assert_approx_eq!(world.body(id).unwrap().velocity.y, 1.0);
    }

    #[test]
    fn damping_decays_velocity() {
        let mut world = PhysicsWorld::new(0.5);
        let id = world.add_body(car(0.0, 0.0));
        world.set_velocity(id, Vector2d::new(8.0, 0.0));
        for _ in 0..60 {
            world.step(1.0 / 60.0);
        }
        // About half the velocity is left after one second
        assert_approx_eq!(world.body(id).unwrap().velocity.x, 4.0, 0.1);
    }

    #[test]
    fn contact_is_reported_once() {
        let mut world = PhysicsWorld::new(1.0);
        let a = world.add_body(car(0.0, 0.0));
        let b = world.add_body(car(40.0, 0.0));

        let contacts = world.step(1.0 / 60.0);
        assert_eq!(contacts.len(), 1);
        let Contact { a: ca, b: cb } = contacts[0];
        assert!((ca, cb) == (a, b) || (ca, cb) == (b, a));

        let (pa, pb) = (world.body(a).unwrap().position, world.body(b).unwrap().position);
        assert!(pb.x - pa.x > 40.0);

        // The pair are already in contact, so the next step reports nothing new
        assert!(world.step(1.0 / 60.0).is_empty());
    }

    #[test]
    fn glancing_bump_spins_both_cars() {
        let mut world = PhysicsWorld::new(1.0);
        let a = world.add_body(car(0.0, 0.0));
        let b = world.add_body(car(45.0, 25.0));
        world.set_velocity(a, Vector2d::new(100.0, 0.0));

        let contacts = world.step(1.0 / 60.0);
        assert_eq!(contacts.len(), 1);
        assert!(world.body(a).unwrap().angular_velocity != 0.0);
        assert!(world.body(b).unwrap().angular_velocity != 0.0);
    }

    #[test]
    fn distant_boxes_do_not_touch() {
        let mut world = PhysicsWorld::new(1.0);
        world.add_body(car(0.0, 0.0));
        world.add_body(car(0.0, 31.0));
        assert!(world.step(1.0 / 60.0).is_empty());
    }

    #[test]
    fn removed_bodies_are_gone() {
        let mut world = PhysicsWorld::default();
        let a = world.add_body(car(0.0, 0.0));
        let b = world.add_body(car(40.0, 0.0));
        assert_eq!(world.len(), 2);
        assert!(world.remove_body(a));
        assert!(!world.remove_body(a));
        assert!(world.body(a).is_none());
        assert!(world.body(b).is_some());

        // The remaining body has nothing to touch
        assert!(world.step(1.0 / 60.0).is_empty());

        world.clear();
        assert!(world.is_empty());
        assert!(world.body(b).is_none());
    }
}
