use super::Pose;
use crate::math::{project_local, LineSegment2d, Point2d, Vector2d};
use cgmath::prelude::*;

/// The oriented rectangle a vehicle occupies, derived from its pose.
#[derive(Clone, Copy, Debug)]
pub struct Hitbox {
    /// The centre of the vehicle.
    centre: Point2d,
    /// Vector from the centre to the middle of the front edge.
    front: Vector2d,
    /// Vector from the centre to the middle of the right edge.
    side: Vector2d,
}

impl Hitbox {
    /// Computes the hitbox of a vehicle with the given pose and half extents.
    pub fn new(pose: &Pose, half_len: f64, half_wid: f64) -> Self {
        let (front, side) = pose.offsets(half_len, half_wid);
        Self {
            centre: pose.position,
            front,
            side,
        }
    }

    /// The four edges of the hitbox in clockwise order: front, right, rear and left.
    pub fn edges(&self) -> [LineSegment2d; 4] {
        let (c, f, s) = (self.centre, self.front, self.side);
        [
            LineSegment2d::from_ends(c + f + s, c + f - s),
            LineSegment2d::from_ends(c + f + s, c + s - f),
            LineSegment2d::from_ends(c + s - f, c - f - s),
            LineSegment2d::from_ends(c + f - s, c - s - f),
        ]
    }

    /// The four corners of the hitbox, walking around its outline.
    pub fn corners(&self) -> [Point2d; 4] {
        let (c, f, s) = (self.centre, self.front, self.side);
        [c + f + s, c + f - s, c - f - s, c - f + s]
    }

    /// Whether a point lies inside or on the hitbox.
    pub fn contains(&self, point: Point2d) -> bool {
        let (half_len, half_wid) = (self.front.magnitude(), self.side.magnitude());
        let local = project_local(
            point,
            self.centre,
            self.front / half_len,
            self.side / half_wid,
        );
        local.x.abs() <= half_len && local.y.abs() <= half_wid
    }

    pub fn centre(&self) -> Point2d {
        self.centre
    }
}
