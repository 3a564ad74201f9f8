use thiserror::Error;

/// Errors raised by the simulation.
///
/// Geometric misses are not errors; they are reported with a sentinel distance.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum Error {
    /// A configuration value failed validation.
    #[error("invalid configuration: {0}")]
    InvalidConfig(&'static str),
    /// The number of actions passed to a step did not match the number of vehicles.
    #[error("expected {expected} actions, got {actual}")]
    ActionCount { expected: usize, actual: usize },
    /// A discrete action index was out of range.
    #[error("action {0} is out of range")]
    InvalidAction(u8),
    /// A vision ray was drawn before its collisions were calculated.
    #[error("collisions must be calculated before drawing a vision ray")]
    CollisionsNotComputed,
}
