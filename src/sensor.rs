use crate::render::Canvas;
use crate::{Arena, Error, Hitbox, Observation, Pose};
use std::fmt::Debug;

/// What a vehicle's sensor can see.
#[derive(Clone, Copy, Debug)]
pub struct SensorContext<'a> {
    /// The arena.
    pub arena: &'a Arena,
    /// The hitboxes of every other live vehicle.
    pub enemies: &'a [Hitbox],
}

/// A strategy for turning the world into a vehicle's sensor readings.
pub trait Sensor: Debug {
    /// The number of readings appended by [Sensor::sense].
    fn readings_len(&self) -> usize;

    /// The lower and upper bounds of every reading.
    fn bounds(&self) -> (f64, f64);

    /// Moves the sensor to the vehicle's pose and appends its readings to `out`.
    ///
    /// # Parameters
    /// * `pose` - The vehicle's current pose
    /// * `half_len` - Half the vehicle's length
    /// * `half_wid` - Half the vehicle's width
    /// * `ctx` - The world as the vehicle sees it
    /// * `out` - The observation being assembled
    fn sense(
        &mut self,
        pose: &Pose,
        half_len: f64,
        half_wid: f64,
        ctx: &SensorContext,
        out: &mut Observation,
    ) -> Result<(), Error>;

    /// Draws what the sensor saw on its last call to [Sensor::sense].
    fn draw(&self, canvas: &mut dyn Canvas) -> Result<(), Error>;
}
