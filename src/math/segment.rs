use super::{intersect_segments, Point2d, Vector2d};
use cgmath::prelude::*;

/// A line segment between two points.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LineSegment2d {
    pub start: Point2d,
    pub end: Point2d,
}

impl LineSegment2d {
    /// Creates a line segment from its end points.
    pub const fn from_ends(start: Point2d, end: Point2d) -> Self {
        Self { start, end }
    }

    /// The vector from the start to the end of the segment.
    pub fn direction(&self) -> Vector2d {
        self.end - self.start
    }

    /// The length of the segment.
    pub fn length(&self) -> f64 {
        self.direction().magnitude()
    }

    /// The point where this segment crosses `other`, if they cross at all.
    pub fn intersect(&self, other: &LineSegment2d) -> Option<Point2d> {
        intersect_segments(self.start, self.end, other.start, other.end)
    }
}
