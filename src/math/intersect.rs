//! Intersection tests between segments, lines and circles.

use super::Point2d;
use cgmath::prelude::*;

/// Finds the point where the segment `p1 -> p2` crosses the segment `p3 -> p4`.
///
/// Returns `None` if the segments are parallel, or if the point where their
/// lines cross lies outside either segment.
pub fn intersect_segments(p1: Point2d, p2: Point2d, p3: Point2d, p4: Point2d) -> Option<Point2d> {
    let den = (p4.x - p3.x) * (p1.y - p2.y) - (p1.x - p2.x) * (p4.y - p3.y);
    if den == 0.0 {
        return None;
    }

    let t1 = ((p3.y - p4.y) * (p1.x - p3.x) + (p4.x - p3.x) * (p1.y - p3.y)) / den;
    let t2 = ((p1.y - p2.y) * (p1.x - p3.x) + (p2.x - p1.x) * (p1.y - p3.y)) / den;

    let unit = 0.0..=1.0;
    if unit.contains(&t1) && unit.contains(&t2) {
        Some(p1 + t1 * (p2 - p1))
    } else {
        None
    }
}

/// Finds the points where the infinite line through `a` and `b` crosses a circle.
///
/// The points are ordered along the line's direction, from `a` towards `b`.
/// A tangent line yields the same point twice. Returns `None` if the line misses
/// the circle, if `a` and `b` coincide, or if the radius is negative.
pub fn intersect_line_circle(
    a: Point2d,
    b: Point2d,
    centre: Point2d,
    radius: f64,
) -> Option<(Point2d, Point2d)> {
    if radius < 0.0 {
        return None;
    }

    let dir = b - a;
    let rel = a - centre;
    let qa = dir.magnitude2();
    if qa == 0.0 {
        return None;
    }
    let qb = 2.0 * rel.dot(dir);
    let qc = rel.magnitude2() - radius * radius;

    let disc = qb * qb - 4.0 * qa * qc;
    if disc < 0.0 {
        return None;
    }

    let root = disc.sqrt();
    let t1 = (-qb - root) / (2.0 * qa);
    let t2 = (-qb + root) / (2.0 * qa);
    Some((a + t1 * dir, a + t2 * dir))
}

#[cfg(test)]
mod test {
    use super::*;
    use assert_approx_eq::assert_approx_eq;
    use cgmath::prelude::*;
    use rand::{Rng, SeedableRng};

    fn pt(x: f64, y: f64) -> Point2d {
        Point2d::new(x, y)
    }

    #[test]
    fn crossing_segments() {
        let p = intersect_segments(pt(0.0, 0.0), pt(10.0, 10.0), pt(0.0, 10.0), pt(10.0, 0.0)).unwrap();
        assert_approx_eq!(p.x, 5.0);
        assert_approx_eq!(p.y, 5.0);
    }

    #[test]
    fn parallel_segments() {
        let p = intersect_segments(pt(0.0, 0.0), pt(10.0, 0.0), pt(0.0, 1.0), pt(10.0, 1.0));
        assert!(p.is_none());

        // Collinear segments are parallel too
        let p = intersect_segments(pt(0.0, 0.0), pt(10.0, 0.0), pt(5.0, 0.0), pt(15.0, 0.0));
        assert!(p.is_none());
    }

    #[test]
    fn segments_that_fall_short() {
        // The lines cross at (20, 0), beyond the end of the first segment
        let p = intersect_segments(pt(0.0, 0.0), pt(10.0, 0.0), pt(20.0, -5.0), pt(20.0, 5.0));
        assert!(p.is_none());
    }

    #[test]
    fn touching_end_points() {
        let p = intersect_segments(pt(0.0, 0.0), pt(10.0, 0.0), pt(10.0, -5.0), pt(10.0, 5.0)).unwrap();
        assert_approx_eq!(p.x, 10.0);
        assert_approx_eq!(p.y, 0.0);
    }

    #[test]
    fn segment_intersection_is_symmetric() {
        let mut rng = rand::rngs::StdRng::from_seed(*b"Bumper cars are fun for everyone");
        for _ in 0..500 {
            let ps: Vec<Point2d> = (0..4)
                .map(|_| pt(rng.gen_range(-100.0..100.0), rng.gen_range(-100.0..100.0)))
                .collect();
            let ab = intersect_segments(ps[0], ps[1], ps[2], ps[3]);
            let ba = intersect_segments(ps[2], ps[3], ps[0], ps[1]);
            match (ab, ba) {
                (Some(ab), Some(ba)) => {
                    assert_approx_eq!(ab.x, ba.x, 1e-6);
                    assert_approx_eq!(ab.y, ba.y, 1e-6);
                }
                (None, None) => {}
                // Only a crossing right on an end point may be classified differently
                (Some(p), None) | (None, Some(p)) => {
                    let near_end = ps.iter().any(|q| q.distance(p) < 1e-6);
                    assert!(near_end, "asymmetric result at {:?}", p);
                }
            }
        }
    }

    #[test]
    fn line_through_circle() {
        let (a, b) = intersect_line_circle(pt(0.0, 0.0), pt(1.0, 0.0), pt(0.0, 0.0), 100.0).unwrap();
        assert_approx_eq!(a.x, -100.0);
        assert_approx_eq!(a.y, 0.0);
        assert_approx_eq!(b.x, 100.0);
        assert_approx_eq!(b.y, 0.0);
    }

    #[test]
    fn line_missing_circle() {
        let hit = intersect_line_circle(pt(0.0, 50.0), pt(1.0, 50.0), pt(0.0, 0.0), 10.0);
        assert!(hit.is_none());
    }

    #[test]
    fn tangent_line() {
        let (a, b) = intersect_line_circle(pt(-5.0, 10.0), pt(5.0, 10.0), pt(0.0, 0.0), 10.0).unwrap();
        assert_approx_eq!(a.x, 0.0);
        assert_approx_eq!(b.x, 0.0);
        assert_approx_eq!(a.y, 10.0);
    }

    #[test]
    fn degenerate_inputs() {
        assert!(intersect_line_circle(pt(1.0, 1.0), pt(1.0, 1.0), pt(0.0, 0.0), 10.0).is_none());
        assert!(intersect_line_circle(pt(0.0, 0.0), pt(1.0, 0.0), pt(0.0, 0.0), -1.0).is_none());
    }

    #[test]
    fn circle_points_lie_on_circle() {
        let mut rng = rand::rngs::StdRng::from_seed(*b"Bumper cars are fun for everyone");
        let centre = pt(500.0, 500.0);
        for _ in 0..500 {
            let a = pt(rng.gen_range(0.0..1000.0), rng.gen_range(0.0..1000.0));
            let b = pt(rng.gen_range(0.0..1000.0), rng.gen_range(0.0..1000.0));
            let radius = rng.gen_range(0.0..400.0);
            if let Some((p, q)) = intersect_line_circle(a, b, centre, radius) {
                assert_approx_eq!(p.distance(centre), radius, 1e-6);
                assert_approx_eq!(q.distance(centre), radius, 1e-6);
            }
        }
    }
}
