use crate::math::Point2d;
use crate::Error;

/// The configuration of a [Simulation](crate::Simulation).
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SimulationConfig {
    /// The number of vehicles spawned on reset.
    pub n_agents: usize,
    /// The fixed centre of the arena.
    pub arena_centre: Point2d,
    /// The radius of the arena at the start of an episode.
    pub start_radius: f64,
    /// The rate at which the arena shrinks, in units/s.
    pub shrink_speed: f64,
    /// The number of simulation steps per second.
    pub fps: f64,
    /// The fraction of velocity a body keeps after one second, in `(0, 1]`.
    pub damping: f64,
    /// Seed for spawn placement. Uses entropy when `None`.
    pub seed: Option<u64>,
    /// Whether to scale velocities in observations into `[-1, 1]`.
    pub normalize_observations: bool,
    /// The attributes shared by every vehicle.
    pub vehicle: VehicleAttributes,
    /// The vision ray settings.
    pub vision: VisionConfig,
    /// The reward table.
    pub scores: ScoreTable,
}

/// The attributes of a vehicle.
#[derive(Clone, Copy, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct VehicleAttributes {
    /// The vehicle length, front to rear.
    pub length: f64,
    /// The vehicle width, side to side.
    pub width: f64,
    /// The speed used to normalize observed velocities.
    pub top_speed: f64,
    /// The change in angular velocity per unit of steering input.
    pub steering_speed: f64,
    /// The forward acceleration at full throttle.
    pub acceleration: f64,
    /// The mass of the vehicle's body.
    pub mass: f64,
    /// The angular velocity is clamped to `[-max, max]`, in rad/s.
    pub max_angular_velocity: f64,
}

/// Settings for vision rays.
#[derive(Clone, Copy, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct VisionConfig {
    /// The length of every ray.
    pub ray_length: f64,
    /// Whether to divide collision distances by `ray_length + 1`.
    pub normalize_distances: bool,
}

/// Rewards handed out during an episode.
#[derive(Clone, Copy, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ScoreTable {
    /// Given to the last vehicle to bump a vehicle that then leaves the arena.
    pub kill: f64,
    /// Given to the sole survivor.
    pub win: f64,
    /// Given to a vehicle when it leaves the arena.
    pub died: f64,
    /// Given to every live vehicle on every step.
    pub alive: f64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            n_agents: 6,
            arena_centre: Point2d::new(500.0, 500.0),
            start_radius: 400.0,
            shrink_speed: 6.0,
            fps: 60.0,
            damping: 0.7,
            seed: None,
            normalize_observations: true,
            vehicle: Default::default(),
            vision: Default::default(),
            scores: Default::default(),
        }
    }
}

impl Default for VehicleAttributes {
    fn default() -> Self {
        Self {
            length: 50.0,
            width: 30.0,
            top_speed: 10.0,
            steering_speed: 0.1,
            acceleration: 100.0,
            mass: 0.1,
            max_angular_velocity: 2.0,
        }
    }
}

impl Default for VisionConfig {
    fn default() -> Self {
        Self {
            ray_length: 400.0,
            normalize_distances: true,
        }
    }
}

impl Default for ScoreTable {
    fn default() -> Self {
        Self {
            kill: 0.5,
            win: 1.0,
            died: -1.0,
            alive: 0.05,
        }
    }
}

/// Fails with `msg` unless `value` is finite and strictly positive.
fn positive(value: f64, msg: &'static str) -> Result<(), Error> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(Error::InvalidConfig(msg))
    }
}

impl SimulationConfig {
    /// Checks that the configuration can drive a simulation.
    pub fn validate(&self) -> Result<(), Error> {
        if self.n_agents == 0 {
            return Err(Error::InvalidConfig("n_agents must be at least 1"));
        }
        positive(self.fps, "fps must be positive")?;
        positive(self.start_radius, "start_radius must be positive")?;
        if !(self.shrink_speed.is_finite() && self.shrink_speed >= 0.0) {
            return Err(Error::InvalidConfig("shrink_speed must not be negative"));
        }
        if !(self.damping > 0.0 && self.damping <= 1.0) {
            return Err(Error::InvalidConfig("damping must be in (0, 1]"));
        }
        self.vehicle.validate()?;
        self.vision.validate()
    }

    /// The length of one simulation step in seconds.
    pub fn dt(&self) -> f64 {
        1.0 / self.fps
    }
}

impl VehicleAttributes {
    /// Checks that the vehicle has a usable body.
    pub fn validate(&self) -> Result<(), Error> {
        positive(self.length, "vehicle length must be positive")?;
        positive(self.width, "vehicle width must be positive")?;
        positive(self.mass, "vehicle mass must be positive")?;
        positive(self.top_speed, "vehicle top_speed must be positive")?;
        positive(
            self.max_angular_velocity,
            "vehicle max_angular_velocity must be positive",
        )
    }
}

impl VisionConfig {
    /// Checks that rays have a usable length.
    pub fn validate(&self) -> Result<(), Error> {
        positive(self.ray_length, "ray_length must be positive")
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert_eq!(SimulationConfig::default().validate(), Ok(()));
    }

    #[test]
    fn zero_ray_length_fails_fast() {
        let mut config = SimulationConfig::default();
        config.vision.ray_length = 0.0;
        assert_eq!(
            config.validate(),
            Err(Error::InvalidConfig("ray_length must be positive"))
        );
    }

    #[test]
    fn rejects_bad_values() {
        let cases: [fn(&mut SimulationConfig); 7] = [
            |c| c.n_agents = 0,
            |c| c.damping = 0.0,
            |c| c.fps = 0.0,
            |c| c.shrink_speed = -1.0,
            |c| c.damping = 1.5,
            |c| c.vehicle.width = f64::NAN,
            |c| c.vehicle.max_angular_velocity = 0.0,
        ];
        for case in cases {
            let mut config = SimulationConfig::default();
            case(&mut config);
            assert!(matches!(config.validate(), Err(Error::InvalidConfig(_))));
        }
    }
}
