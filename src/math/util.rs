use super::{Point2d, Vector2d};
use cgmath::prelude::*;
use cgmath::{Basis2, Deg, Rad};

/// Projects a point onto a local coordinate system.
///
/// # Parameters
/// * `point` - The point to project
/// * `origin` - The origin of the coordinate system
/// * `x_axis` - The basis vector pointing in the positive x-axis.
/// * `y_axis` - The basis vector pointing in the positive y-axis.
pub fn project_local(
    point: Point2d,
    origin: Point2d,
    x_axis: Vector2d,
    y_axis: Vector2d,
) -> Point2d {
    let point = point - origin;
    Point2d::new(point.dot(x_axis), point.dot(y_axis))
}

/// Rotates a vector 90 degrees clockwise (in screen space, where y points down).
pub fn rot90(vec: Vector2d) -> Vector2d {
    Vector2d::new(-vec.y, vec.x)
}

/// A unit vector pointing along the given angle, in degrees.
pub fn unit_from_degrees(angle: f64) -> Vector2d {
    let (sin, cos) = Deg(angle).sin_cos();
    Vector2d::new(cos, sin)
}

/// Rotates a vector by the given angle, in radians.
pub fn rotate(vec: Vector2d, angle: f64) -> Vector2d {
    Basis2::from_angle(Rad(angle)).rotate_vector(vec)
}

/// The Euclidean distance between two points.
pub fn distance(a: Point2d, b: Point2d) -> f64 {
    a.distance(b)
}

/// Wraps an angle in degrees into the interval `[0, 360)`.
pub fn wrap_degrees(angle: f64) -> f64 {
    let wrapped = angle.rem_euclid(360.0);
    // `rem_euclid` can round up to exactly 360 for tiny negative inputs
    if wrapped >= 360.0 {
        0.0
    } else {
        wrapped
    }
}
