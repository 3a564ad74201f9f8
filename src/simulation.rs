use crate::math::{unit_from_degrees, Point2d};
use crate::observation::assemble;
use crate::physics::{BodyId, BoxBody, Contact, PhysicsWorld};
use crate::render::{Canvas, Rgba};
use crate::{
    Action, Arena, Error, Hitbox, Observation, ObservationSpace, Pose, Sensor, SensorContext,
    SimulationConfig, Vehicle, VehicleId, VehicleSet, VisionFan,
};
use itertools::Itertools;
use log::{debug, info};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use slotmap::SecondaryMap;

/// A bumper car battle royale.
pub struct Simulation {
    /// The configuration.
    config: SimulationConfig,
    /// The shrinking arena.
    arena: Arena,
    /// The physics world the vehicles' bodies live in.
    world: PhysicsWorld,
    /// The vehicles, alive or not.
    vehicles: VehicleSet,
    /// Vehicle IDs in the order they were added, which is the order of every per-vehicle output.
    order: Vec<VehicleId>,
    /// Maps physics bodies back to the vehicles that own them.
    bodies: SecondaryMap<BodyId, VehicleId>,
    /// The observations from the last reset or step.
    observations: Vec<Observation>,
    /// Source of randomness for spawn placement.
    rng: StdRng,
    /// The current frame of simulation.
    frame: usize,
    /// Whether the episode has ended and the win has been paid.
    finished: bool,
}

/// The outcome of a [Simulation::step].
#[derive(Clone, Debug)]
pub struct StepResult {
    /// One observation per vehicle.
    pub observations: Vec<Observation>,
    /// One reward per vehicle.
    pub rewards: Vec<f64>,
    /// Whether each vehicle is still in the arena.
    pub alive: Vec<bool>,
    /// Whether fewer than two vehicles remain.
    pub done: bool,
}

impl Simulation {
    /// Creates a new simulation with no vehicles. Call [Simulation::reset] to spawn them.
    pub fn new(config: SimulationConfig) -> Result<Self, Error> {
        config.validate()?;
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Ok(Self {
            arena: Arena::new(config.arena_centre, config.start_radius, config.shrink_speed),
            world: PhysicsWorld::new(config.damping),
            vehicles: VehicleSet::with_key(),
            order: vec![],
            bodies: SecondaryMap::new(),
            observations: vec![],
            rng,
            frame: 0,
            finished: false,
            config,
        })
    }

    /// Starts a new episode with `n_agents` randomly placed vehicles,
    /// returning their first observations.
    pub fn reset(&mut self) -> Result<&[Observation], Error> {
        self.clear();
        for _ in 0..self.config.n_agents {
            let heading = self.rng.gen_range(0.0..360.0);
            let distance = self.rng.gen_range(0.0..self.config.start_radius);
            let bearing = self.rng.gen_range(0.0..360.0);
            let position = self.arena.centre() + unit_from_degrees(bearing) * distance;
            self.add_vehicle(Pose::new(position, heading));
        }
        info!(
            "reset: {} vehicles, arena radius {}",
            self.order.len(),
            self.arena.radius()
        );
        self.observe()
    }

    /// Removes every vehicle and restores the arena.
    pub fn clear(&mut self) {
        self.arena.reset();
        self.world.clear();
        self.vehicles.clear();
        self.order.clear();
        self.bodies.clear();
        self.observations.clear();
        self.frame = 0;
        self.finished = false;
    }

    /// Adds a vehicle with a vision fan at the given pose.
    pub fn add_vehicle(&mut self, pose: Pose) -> VehicleId {
        let attributes = &self.config.vehicle;
        let sensor = VisionFan::new(
            &pose,
            0.5 * attributes.length,
            0.5 * attributes.width,
            &self.config.vision,
        );
        self.add_vehicle_with_sensor(pose, Box::new(sensor))
    }

    /// Adds a vehicle with a custom sensor at the given pose.
    pub fn add_vehicle_with_sensor(&mut self, pose: Pose, sensor: Box<dyn Sensor>) -> VehicleId {
        let attributes = self.config.vehicle;
        let body_id = self.world.add_body(BoxBody {
            position: pose.position,
            angle: pose.body_angle(),
            length: attributes.length,
            width: attributes.width,
            mass: attributes.mass,
        });
        let color = Rgba::PALETTE[self.order.len() % Rgba::PALETTE.len()];
        let vehicle_id = self.vehicles.insert_with_key(|id| {
            let mut vehicle = Vehicle::new(id, body_id, pose, &attributes, sensor, color);
            vehicle.sync(&self.world);
            vehicle
        });
        self.bodies.insert(body_id, vehicle_id);
        self.order.push(vehicle_id);
        vehicle_id
    }

    /// Advances the simulation by one frame.
    ///
    /// # Parameters
    /// * `actions` - One action per vehicle, in the order the vehicles were added
    pub fn step(&mut self, actions: &[Action]) -> Result<StepResult, Error> {
        if actions.len() != self.order.len() {
            return Err(Error::ActionCount {
                expected: self.order.len(),
                actual: actions.len(),
            });
        }

        self.apply_controls(actions);
        self.integrate();
        self.update_alive_status();
        self.arena.shrink(self.config.dt());
        self.observe()?;

        let alive = self.alive();
        let done = alive.iter().filter(|alive| **alive).count() < 2;
        let rewards = self.take_rewards(done);
        self.frame += 1;

        Ok(StepResult {
            observations: self.observations.clone(),
            rewards,
            alive,
            done,
        })
    }

    /// Recomputes every vehicle's observation against the current world.
    pub fn observe(&mut self) -> Result<&[Observation], Error> {
        let hitboxes = self
            .vehicles
            .iter()
            .filter(|(_, vehicle)| vehicle.is_alive())
            .map(|(id, vehicle)| (id, vehicle.hitbox()))
            .collect_vec();

        let mut observations = Vec::with_capacity(self.order.len());
        for vehicle_id in &self.order {
            let enemies = hitboxes
                .iter()
                .filter(|(id, _)| id != vehicle_id)
                .map(|(_, hitbox)| *hitbox)
                .collect::<Vec<Hitbox>>();
            let ctx = SensorContext {
                arena: &self.arena,
                enemies: &enemies,
            };
            let vehicle = &mut self.vehicles[*vehicle_id];
            observations.push(assemble(vehicle, &ctx, self.config.normalize_observations)?);
        }

        self.observations = observations;
        Ok(&self.observations)
    }

    /// Draws the arena, the vehicles, and the vision of every live vehicle.
    /// Call after [Simulation::reset], [Simulation::step] or [Simulation::observe].
    pub fn render(&self, canvas: &mut dyn Canvas) -> Result<(), Error> {
        canvas.draw_circle(
            self.arena.centre(),
            self.arena.radius().max(0.0),
            Rgba::WHITE,
            false,
        );
        self.iter_vehicles()
            .try_for_each(|vehicle| vehicle.draw(canvas))
    }

    /// Gets the current simulation frame index.
    pub fn frame(&self) -> usize {
        self.frame
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub fn arena(&self) -> &Arena {
        &self.arena
    }

    /// Gets a mutable reference to the arena.
    pub fn arena_mut(&mut self) -> &mut Arena {
        &mut self.arena
    }

    pub fn world(&self) -> &PhysicsWorld {
        &self.world
    }

    /// The observations from the last reset, step or observe.
    pub fn observations(&self) -> &[Observation] {
        &self.observations
    }

    /// Whether each vehicle is still in the arena.
    pub fn alive(&self) -> Vec<bool> {
        self.iter_vehicles().map(Vehicle::is_alive).collect()
    }

    /// The number of discrete actions available to each vehicle.
    pub fn action_count(&self) -> usize {
        Action::COUNT as usize
    }

    /// The observation space of the vehicles' default vision fan.
    pub fn observation_space(&self) -> ObservationSpace {
        let attributes = &self.config.vehicle;
        let fan = VisionFan::new(
            &Pose::new(Point2d::new(0.0, 0.0), 0.0),
            0.5 * attributes.length,
            0.5 * attributes.width,
            &self.config.vision,
        );
        ObservationSpace::new(attributes, &fan, self.config.normalize_observations)
    }

    /// Returns an iterator over the vehicles, in the order they were added.
    pub fn iter_vehicles(&self) -> impl Iterator<Item = &Vehicle> {
        self.order.iter().map(|id| &self.vehicles[*id])
    }

    /// Gets a reference to the vehicle with the given ID.
    pub fn get_vehicle(&self, vehicle_id: VehicleId) -> &Vehicle {
        &self.vehicles[vehicle_id]
    }

    /// Applies each vehicle's action to its body.
    fn apply_controls(&mut self, actions: &[Action]) {
        for (vehicle_id, action) in self.order.iter().zip(actions) {
            self.vehicles[*vehicle_id].apply_control(action.control(), &mut self.world);
        }
    }

    /// Steps the physics world, records who bumped into whom,
    /// and copies the new poses to the vehicles.
    fn integrate(&mut self) {
        let contacts = self.world.step(self.config.dt());
        for contact in contacts {
            self.handle_contact(contact);
        }
        for vehicle in self.vehicles.values_mut() {
            vehicle.sync(&self.world);
        }
    }

    /// Records that two vehicles bumped into each other.
    fn handle_contact(&mut self, contact: Contact) {
        let ids = (self.bodies.get(contact.a), self.bodies.get(contact.b));
        if let (Some(&a), Some(&b)) = ids {
            if let Some([vehicle_a, vehicle_b]) = self.vehicles.get_disjoint_mut([a, b]) {
                vehicle_a.set_last_collided_with(b);
                vehicle_b.set_last_collided_with(a);
            }
        }
    }

    /// Eliminates vehicles which have left the arena, removing their bodies
    /// from the world and crediting whoever last bumped them.
    fn update_alive_status(&mut self) {
        let died_score = self.config.scores.died;
        let mut kills = vec![];

        for vehicle_id in &self.order {
            let vehicle = &mut self.vehicles[*vehicle_id];
            if !vehicle.update_alive_status(&self.arena, died_score) {
                continue;
            }
            if let Some(body_id) = vehicle.take_body() {
                self.world.remove_body(body_id);
                self.bodies.remove(body_id);
            }
            debug!("vehicle {:?} left the arena", vehicle_id);
            if let Some(killer) = vehicle.last_collided_with() {
                kills.push((*vehicle_id, killer));
            }
        }

        for (victim, killer) in kills {
            if let Some(vehicle) = self.vehicles.get_mut(killer) {
                vehicle.add_score(self.config.scores.kill);
                debug!("vehicle {:?} knocked out {:?}", killer, victim);
            }
        }
    }

    /// Hands out each vehicle's reward for the frame.
    /// The survivors are paid the win only on the step the episode ends.
    fn take_rewards(&mut self, done: bool) -> Vec<f64> {
        let scores = self.config.scores;
        let win = done && !self.finished;
        if win {
            self.finished = true;
            info!("episode finished after {} frames", self.frame + 1);
        }
        self.order
            .iter()
            .map(|vehicle_id| {
                let vehicle = &mut self.vehicles[*vehicle_id];
                let mut reward = vehicle.take_extra_score();
                if vehicle.is_alive() {
                    reward += scores.alive;
                    if win {
                        reward += scores.win;
                    }
                }
                reward
            })
            .collect()
    }
}
