//! Assembly of the fixed-length observation vectors handed to learning agents.

use crate::vision::FAN_SIZE;
use crate::{Error, Sensor, SensorContext, Vehicle, VehicleAttributes};
use smallvec::SmallVec;
use std::ops::Deref;

/// The length of an observation from a vehicle with a [VisionFan](crate::VisionFan):
/// angular velocity, two relative velocity components, then an enemy and a boundary
/// distance for every ray.
pub const OBSERVATION_SIZE: usize = 3 + 2 * FAN_SIZE;

/// A vehicle's observation of the world.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Observation(SmallVec<[f64; OBSERVATION_SIZE]>);

/// The bounds of every entry of an observation.
#[derive(Clone, Debug, PartialEq)]
pub struct ObservationSpace {
    pub low: Vec<f64>,
    pub high: Vec<f64>,
}

impl Observation {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn push(&mut self, value: f64) {
        self.0.push(value);
    }

    pub fn to_vec(&self) -> Vec<f64> {
        self.0.to_vec()
    }
}

impl Deref for Observation {
    type Target = [f64];

    fn deref(&self) -> &[f64] {
        &self.0
    }
}

impl Extend<f64> for Observation {
    fn extend<I: IntoIterator<Item = f64>>(&mut self, iter: I) {
        self.0.extend(iter)
    }
}

impl ObservationSpace {
    /// The observation space of a vehicle.
    ///
    /// # Parameters
    /// * `vehicle` - The vehicle, whose sensor determines the tail of the space
    /// * `normalize` - Whether velocities are normalized
    pub fn for_vehicle(vehicle: &Vehicle, normalize: bool) -> Self {
        Self::new(vehicle.attributes(), vehicle.sensor(), normalize)
    }

    /// The observation space of a vehicle with the given attributes and sensor.
    pub fn new(attributes: &VehicleAttributes, sensor: &dyn Sensor, normalize: bool) -> Self {
        let (low, high) = if normalize {
            ([-1.0; 3], [1.0; 3])
        } else {
            let max = attributes.max_angular_velocity;
            (
                [-max, f64::NEG_INFINITY, f64::NEG_INFINITY],
                [max, f64::INFINITY, f64::INFINITY],
            )
        };

        let (sensor_low, sensor_high) = sensor.bounds();
        let len = sensor.readings_len();
        Self {
            low: low.into_iter().chain(std::iter::repeat(sensor_low).take(len)).collect(),
            high: high.into_iter().chain(std::iter::repeat(sensor_high).take(len)).collect(),
        }
    }

    /// The number of entries in an observation.
    pub fn shape(&self) -> usize {
        self.low.len()
    }

    /// Whether an observation has the right length and lies within bounds.
    pub fn contains(&self, observation: &[f64]) -> bool {
        observation.len() == self.shape()
            && observation
                .iter()
                .zip(self.low.iter().zip(&self.high))
                .all(|(x, (low, high))| low <= x && x <= high)
    }
}

/// Assembles a vehicle's observation.
///
/// The vehicle's sensor is moved to the vehicle's current pose before it reads the world.
/// With `normalize`, the angular velocity is divided by the vehicle's maximum angular
/// velocity, and the relative velocity by its top speed, both clamped to `[-1, 1]`.
pub fn assemble(
    vehicle: &mut Vehicle,
    ctx: &SensorContext,
    normalize: bool,
) -> Result<Observation, Error> {
    let mut angular_velocity = vehicle.angular_velocity();
    let mut rel_vel = vehicle.relative_velocity();
    if normalize {
        let attributes = vehicle.attributes();
        angular_velocity = (angular_velocity / attributes.max_angular_velocity).clamp(-1.0, 1.0);
        rel_vel /= attributes.top_speed;
        rel_vel.x = rel_vel.x.clamp(-1.0, 1.0);
        rel_vel.y = rel_vel.y.clamp(-1.0, 1.0);
    }

    let mut obs = Observation::new();
    obs.extend([angular_velocity, rel_vel.x, rel_vel.y]);
    vehicle.sense(ctx, &mut obs)?;
    Ok(obs)
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::math::Point2d;
    use crate::physics::BodyId;
    use crate::render::{Canvas, Rgba};
    use crate::{Arena, Pose, VehicleId, VisionConfig, VisionFan};

    /// Reports a fixed pair of readings.
    #[derive(Debug)]
    struct Constant;

    impl Sensor for Constant {
        fn readings_len(&self) -> usize {
            2
        }

        fn bounds(&self) -> (f64, f64) {
            (-5.0, 5.0)
        }

        fn sense(
            &mut self,
            _pose: &Pose,
            _half_len: f64,
            _half_wid: f64,
            _ctx: &SensorContext,
            out: &mut Observation,
        ) -> Result<(), Error> {
            out.push(4.0);
            out.push(-4.0);
            Ok(())
        }

        fn draw(&self, _canvas: &mut dyn Canvas) -> Result<(), Error> {
            Ok(())
        }
    }

    fn vehicle(sensor: Box<dyn Sensor>) -> Vehicle {
        let pose = Pose::new(Point2d::new(500.0, 500.0), 0.0);
        Vehicle::new(
            VehicleId::default(),
            BodyId::default(),
            pose,
            &VehicleAttributes::default(),
            sensor,
            Rgba::WHITE,
        )
    }

    #[test]
    fn vision_fan_observation() {
        let pose = Pose::new(Point2d::new(500.0, 500.0), 0.0);
        let fan = VisionFan::new(&pose, 25.0, 15.0, &VisionConfig::default());
        let mut vehicle = vehicle(Box::new(fan));
        let arena = Arena::new(Point2d::new(500.0, 500.0), 400.0, 6.0);
        let ctx = SensorContext {
            arena: &arena,
            enemies: &[],
        };

        let obs = assemble(&mut vehicle, &ctx, true).unwrap();
        assert_eq!(obs.len(), OBSERVATION_SIZE);
        assert_eq!(&obs[..3], &[0.0, 0.0, 0.0]);
        // No enemies, so every enemy distance is the sentinel
        assert!(obs[3..].iter().step_by(2).all(|d| *d == 1.0));

        let space = ObservationSpace::for_vehicle(&vehicle, true);
        assert!(space.contains(&obs));
    }

    #[test]
    fn custom_sensor_observation() {
        let mut vehicle = vehicle(Box::new(Constant));
        let arena = Arena::new(Point2d::new(0.0, 0.0), 10.0, 0.0);
        let ctx = SensorContext {
            arena: &arena,
            enemies: &[],
        };

        let obs = assemble(&mut vehicle, &ctx, false).unwrap();
        assert_eq!(obs.to_vec(), vec![0.0, 0.0, 0.0, 4.0, -4.0]);

        let space = ObservationSpace::for_vehicle(&vehicle, false);
        assert_eq!(space.shape(), 5);
        assert_eq!(space.low[3..], [-5.0, -5.0]);
        assert!(space.contains(&obs));
        assert!(!space.contains(&[0.0; 4]));
    }
}
