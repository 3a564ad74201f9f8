//! Vision rays, which let a vehicle sense the arena boundary and other vehicles.

pub use fan::{VisionFan, FAN_SIZE};
pub use ray::{RayHit, VisionRay};

mod fan;
mod ray;
