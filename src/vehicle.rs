pub use self::hitbox::Hitbox;
use crate::config::VehicleAttributes;
use crate::math::{rot90, rotate, unit_from_degrees, wrap_degrees, Point2d, Vector2d};
use crate::physics::{BodyId, BodyState, PhysicsWorld};
use crate::render::{Canvas, Rgba};
use crate::{Arena, Control, Error, Observation, Sensor, SensorContext, VehicleId};
use cgmath::prelude::*;

mod hitbox;

/// The position and heading of a vehicle.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Pose {
    /// The centre of the vehicle.
    pub position: Point2d,
    /// The heading in degrees. Positive headings turn clockwise on screen,
    /// the reverse of the physics body's angle.
    pub heading: f64,
}

impl Pose {
    /// Creates a pose, wrapping the heading into `[0, 360)`.
    pub fn new(position: Point2d, heading: f64) -> Self {
        Self {
            position,
            heading: wrap_degrees(heading),
        }
    }

    /// Reads the pose of a physics body.
    pub fn from_body(body: &BodyState) -> Self {
        Self::new(body.position, -body.angle.to_degrees())
    }

    /// The angle of the matching physics body, in radians.
    pub fn body_angle(&self) -> f64 {
        -self.heading.to_radians()
    }

    /// A unit vector pointing out of the front of the vehicle.
    pub fn forward(&self) -> Vector2d {
        unit_from_degrees(-self.heading)
    }

    /// The vectors from the vehicle's centre to the middle of its front edge
    /// and to the middle of its right edge.
    pub fn offsets(&self, half_len: f64, half_wid: f64) -> (Vector2d, Vector2d) {
        let forward = self.forward();
        (forward * half_len, rot90(forward) * half_wid)
    }
}

/// A bumper car.
#[derive(Debug)]
pub struct Vehicle {
    /// The vehicle's ID
    pub(crate) id: VehicleId,
    /// The vehicle's physics body, until it is eliminated.
    body: Option<BodyId>,
    /// Half the vehicle's width.
    half_wid: f64,
    /// Half the vehicle's length.
    half_len: f64,
    /// The vehicle's attributes.
    attributes: VehicleAttributes,
    /// The pose as of the last physics step.
    pose: Pose,
    /// The world space velocity as of the last physics step.
    velocity: Vector2d,
    /// The angular velocity in rad/s as of the last physics step.
    angular_velocity: f64,
    /// How the vehicle senses the world.
    sensor: Box<dyn Sensor>,
    /// The colour used to draw the vehicle.
    color: Rgba,
    /// Whether the vehicle is still in the arena.
    alive: bool,
    /// The last vehicle this one bumped into.
    last_collided_with: Option<VehicleId>,
    /// Score earned since the last reward was handed out.
    extra_score: f64,
}

impl Vehicle {
    /// Creates a new vehicle.
    pub(crate) fn new(
        id: VehicleId,
        body: BodyId,
        pose: Pose,
        attributes: &VehicleAttributes,
        sensor: Box<dyn Sensor>,
        color: Rgba,
    ) -> Self {
        Self {
            id,
            body: Some(body),
            half_wid: 0.5 * attributes.width,
            half_len: 0.5 * attributes.length,
            attributes: *attributes,
            pose,
            velocity: Vector2d::zero(),
            angular_velocity: 0.0,
            sensor,
            color,
            alive: true,
            last_collided_with: None,
            extra_score: 0.0,
        }
    }

    /// Gets the vehicle's ID.
    pub fn id(&self) -> VehicleId {
        self.id
    }

    /// The vehicle's physics body, if it is still in the world.
    pub fn body(&self) -> Option<BodyId> {
        self.body
    }

    /// The vehicle's width.
    pub fn width(&self) -> f64 {
        2.0 * self.half_wid
    }

    /// The vehicle's length.
    pub fn length(&self) -> f64 {
        2.0 * self.half_len
    }

    pub fn attributes(&self) -> &VehicleAttributes {
        &self.attributes
    }

    pub fn pose(&self) -> &Pose {
        &self.pose
    }

    /// The world space velocity.
    pub fn velocity(&self) -> Vector2d {
        self.velocity
    }

    /// The velocity in the vehicle's own frame, where +x points out of the front.
    pub fn relative_velocity(&self) -> Vector2d {
        rotate(self.velocity, -self.pose.body_angle())
    }

    /// The angular velocity in rad/s.
    pub fn angular_velocity(&self) -> f64 {
        self.angular_velocity
    }

    /// The vehicle's hitbox at its current pose.
    pub fn hitbox(&self) -> Hitbox {
        Hitbox::new(&self.pose, self.half_len, self.half_wid)
    }

    pub fn sensor(&self) -> &dyn Sensor {
        self.sensor.as_ref()
    }

    pub fn is_alive(&self) -> bool {
        self.alive
    }

    /// The last vehicle this one bumped into.
    pub fn last_collided_with(&self) -> Option<VehicleId> {
        self.last_collided_with
    }

    /// Score earned since the last reward was handed out.
    pub fn extra_score(&self) -> f64 {
        self.extra_score
    }

    pub(crate) fn set_last_collided_with(&mut self, other: VehicleId) {
        self.last_collided_with = Some(other);
    }

    pub(crate) fn add_score(&mut self, score: f64) {
        self.extra_score += score;
    }

    /// Takes the score earned since the last call.
    pub(crate) fn take_extra_score(&mut self) -> f64 {
        std::mem::take(&mut self.extra_score)
    }

    /// Detaches the vehicle from its physics body.
    pub(crate) fn take_body(&mut self) -> Option<BodyId> {
        self.body.take()
    }

    /// Applies steering and throttle to the vehicle's body. Does nothing once eliminated.
    pub(crate) fn apply_control(&self, control: Control, world: &mut PhysicsWorld) {
        if !self.alive {
            return;
        }
        let Some(body_id) = self.body else { return };
        let Some(body) = world.body(body_id) else { return };

        let max = self.attributes.max_angular_velocity;
        let angular_velocity = (body.angular_velocity
            + control.steering * self.attributes.steering_speed)
            .clamp(-max, max);
        world.set_angular_velocity(body_id, angular_velocity);

        let force = control.acceleration * self.attributes.acceleration * self.attributes.mass;
        world.apply_local_force(body_id, Vector2d::new(force, 0.0));
    }

    /// Copies the pose and velocities from the vehicle's physics body.
    pub(crate) fn sync(&mut self, world: &PhysicsWorld) {
        if let Some(body) = self.body.and_then(|id| world.body(id)) {
            self.pose = Pose::from_body(&body);
            self.velocity = body.velocity;
            self.angular_velocity = body.angular_velocity;
        }
    }

    /// Eliminates the vehicle if it has left the arena, charging it `died_score`.
    /// Returns `true` iff the vehicle was eliminated by this call.
    pub(crate) fn update_alive_status(&mut self, arena: &Arena, died_score: f64) -> bool {
        if !self.alive || arena.contains(self.pose.position) {
            return false;
        }
        self.add_score(died_score);
        self.alive = false;
        true
    }

    /// Repositions the vehicle's sensor and appends its readings to `out`.
    pub(crate) fn sense(&mut self, ctx: &SensorContext, out: &mut Observation) -> Result<(), Error> {
        self.sensor
            .sense(&self.pose, self.half_len, self.half_wid, ctx, out)
    }

    /// Draws the vehicle's outline, and its sensor while it is alive.
    pub(crate) fn draw(&self, canvas: &mut dyn Canvas) -> Result<(), Error> {
        let color = if self.alive {
            self.color
        } else {
            self.color.with_alpha(64)
        };
        canvas.draw_polygon(&self.hitbox().corners(), color);
        if self.alive {
            self.sensor.draw(canvas)?;
        }
        Ok(())
    }
}
