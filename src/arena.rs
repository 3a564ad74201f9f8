use crate::math::Point2d;
use cgmath::prelude::*;

/// The circular play area, which shrinks over the course of an episode.
#[derive(Clone, Copy, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Arena {
    /// The fixed centre of the arena.
    centre: Point2d,
    /// The radius at the start of an episode.
    start_radius: f64,
    /// The current radius. Not floored, so it can become negative.
    radius: f64,
    /// The shrink rate in units/s.
    shrink_speed: f64,
}

impl Arena {
    /// Creates a new arena at its starting radius.
    pub fn new(centre: Point2d, start_radius: f64, shrink_speed: f64) -> Self {
        Self {
            centre,
            start_radius,
            radius: start_radius,
            shrink_speed,
        }
    }

    /// The centre of the arena.
    pub fn centre(&self) -> Point2d {
        self.centre
    }

    /// The current radius of the arena.
    pub fn radius(&self) -> f64 {
        self.radius
    }

    /// Overrides the current radius.
    pub fn set_radius(&mut self, radius: f64) {
        self.radius = radius;
    }

    /// Restores the starting radius.
    pub fn reset(&mut self) {
        self.radius = self.start_radius;
    }

    /// Shrinks the arena by one step of `dt` seconds.
    pub fn shrink(&mut self, dt: f64) {
        self.radius -= self.shrink_speed * dt;
    }

    /// Whether a point lies strictly inside the arena.
    pub fn contains(&self, point: Point2d) -> bool {
        point.distance(self.centre) < self.radius
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use assert_approx_eq::assert_approx_eq;

    #[test]
    fn shrinks_without_floor() {
        let mut arena = Arena::new(Point2d::new(0.0, 0.0), 1.0, 6.0);
        for _ in 0..60 {
            arena.shrink(1.0 / 60.0);
        }
        assert_approx_eq!(arena.radius(), -5.0);
        assert!(!arena.contains(Point2d::new(0.0, 0.0)));

        arena.reset();
        assert_approx_eq!(arena.radius(), 1.0);
    }

    #[test]
    fn boundary_is_outside() {
        let arena = Arena::new(Point2d::new(10.0, 10.0), 5.0, 0.0);
        assert!(arena.contains(Point2d::new(14.9, 10.0)));
        assert!(!arena.contains(Point2d::new(15.0, 10.0)));
    }
}
