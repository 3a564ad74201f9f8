//! A bumper car battle royale, built as a multi-agent reinforcement learning environment.
//!
//! Vehicles drive around a circular arena that shrinks every tick. Each vehicle senses
//! the world through a fan of vision rays, which are intersected against the arena
//! boundary and the hitboxes of the other vehicles to produce a fixed-length observation.

pub use cgmath;
pub use action::{Action, Control};
pub use arena::Arena;
pub use config::{ScoreTable, SimulationConfig, VehicleAttributes, VisionConfig};
pub use error::Error;
pub use observation::{assemble, Observation, ObservationSpace, OBSERVATION_SIZE};
pub use render::{Canvas, FrameRecorder, Rgba};
pub use sensor::{Sensor, SensorContext};
pub use simulation::{Simulation, StepResult};
use slotmap::{new_key_type, SlotMap};
pub use slotmap::{Key, KeyData};
pub use vehicle::{Hitbox, Pose, Vehicle};
pub use vision::{RayHit, VisionFan, VisionRay, FAN_SIZE};

mod action;
mod arena;
mod config;
mod error;
pub mod math;
mod observation;
pub mod physics;
mod render;
mod sensor;
mod simulation;
mod vehicle;
mod vision;

new_key_type! {
    /// Unique ID of a [Vehicle].
    pub struct VehicleId;
}

type VehicleSet = SlotMap<VehicleId, Vehicle>;
