use super::VisionRay;
use crate::config::VisionConfig;
use crate::math::{Point2d, Vector2d};
use crate::render::Canvas;
use crate::{Error, Observation, Pose, Sensor, SensorContext};
use crate::{Arena, Hitbox};

/// The number of rays in a fan.
pub const FAN_SIZE: usize = 10;

/// Where a ray is anchored on the vehicle and which way it points.
struct RaySlot {
    /// Multiple of the front offset added to the anchor.
    front: f64,
    /// Multiple of the side offset added to the anchor.
    side: f64,
    /// The ray's angle relative to the vehicle, in degrees.
    angle: f64,
}

/// The layout of the fan. The order fixes each ray's slot in the observation.
const FAN_LAYOUT: [RaySlot; FAN_SIZE] = [
    RaySlot { front: 1.0, side: 0.0, angle: 0.0 },
    RaySlot { front: -1.0, side: 0.0, angle: 180.0 },
    RaySlot { front: 1.0, side: 1.0, angle: 45.0 },
    RaySlot { front: 1.0, side: -1.0, angle: -45.0 },
    RaySlot { front: 1.0, side: 1.0, angle: 90.0 },
    RaySlot { front: 1.0, side: -1.0, angle: -90.0 },
    RaySlot { front: 1.0, side: 1.0, angle: 10.0 },
    RaySlot { front: 1.0, side: -1.0, angle: -10.0 },
    RaySlot { front: -1.0, side: 1.0, angle: 135.0 },
    RaySlot { front: -1.0, side: -1.0, angle: -135.0 },
];

impl RaySlot {
    /// The world space start point and absolute angle of the ray.
    fn place(&self, pose: &Pose, front: Vector2d, side: Vector2d) -> (Point2d, f64) {
        let start = pose.position + front * self.front + side * self.side;
        (start, -pose.heading + self.angle)
    }
}

/// A fixed fan of vision rays around a vehicle.
#[derive(Clone, Debug)]
pub struct VisionFan {
    rays: [VisionRay; FAN_SIZE],
    config: VisionConfig,
}

impl VisionFan {
    /// Creates a fan for a vehicle with the given pose and half extents.
    pub fn new(pose: &Pose, half_len: f64, half_wid: f64, config: &VisionConfig) -> Self {
        let (front, side) = pose.offsets(half_len, half_wid);
        let rays = FAN_LAYOUT.map(|slot| {
            let (start, angle) = slot.place(pose, front, side);
            VisionRay::new(start, angle, config)
        });
        Self {
            rays,
            config: *config,
        }
    }

    /// Moves every ray to follow the vehicle's new pose.
    pub fn reposition(&mut self, pose: &Pose, half_len: f64, half_wid: f64) {
        let (front, side) = pose.offsets(half_len, half_wid);
        for (ray, slot) in self.rays.iter_mut().zip(&FAN_LAYOUT) {
            let (start, angle) = slot.place(pose, front, side);
            ray.update_with_offset(start, angle);
        }
    }

    /// Calculates the enemy and boundary distances of every ray, in fan order.
    pub fn calculate(&mut self, arena: &Arena, enemies: &[Hitbox]) -> [(f64, f64); FAN_SIZE] {
        let mut distances = [(0.0, 0.0); FAN_SIZE];
        for (out, ray) in distances.iter_mut().zip(&mut self.rays) {
            *out = ray.calculate_collisions(arena, enemies);
        }
        distances
    }

    /// The rays in fan order.
    pub fn rays(&self) -> &[VisionRay; FAN_SIZE] {
        &self.rays
    }

    /// Draws every ray.
    pub fn draw(&self, canvas: &mut dyn Canvas) -> Result<(), Error> {
        self.rays.iter().try_for_each(|ray| ray.draw(canvas))
    }
}

impl Sensor for VisionFan {
    fn readings_len(&self) -> usize {
        2 * FAN_SIZE
    }

    fn bounds(&self) -> (f64, f64) {
        if self.config.normalize_distances {
            (0.0, 1.0)
        } else {
            (0.0, self.config.ray_length + 1.0)
        }
    }

    fn sense(
        &mut self,
        pose: &Pose,
        half_len: f64,
        half_wid: f64,
        ctx: &SensorContext,
        out: &mut Observation,
    ) -> Result<(), Error> {
        self.reposition(pose, half_len, half_wid);
        let distances = self.calculate(ctx.arena, ctx.enemies);
        out.extend(distances.iter().flat_map(|&(enemy, boundary)| [enemy, boundary]));
        Ok(())
    }

    fn draw(&self, canvas: &mut dyn Canvas) -> Result<(), Error> {
        VisionFan::draw(self, canvas)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use assert_approx_eq::assert_approx_eq;
    use cgmath::prelude::*;

    const HALF_LEN: f64 = 25.0;
    const HALF_WID: f64 = 15.0;

    fn config() -> VisionConfig {
        VisionConfig {
            ray_length: 400.0,
            normalize_distances: false,
        }
    }

    #[test]
    fn front_and_rear_rays_are_mirrored() {
        let pose = Pose::new(Point2d::new(500.0, 500.0), 37.0);
        let fan = VisionFan::new(&pose, HALF_LEN, HALF_WID, &config());
        let [front, rear, ..] = fan.rays();

        let mid = front.end().midpoint(rear.end());
        assert_approx_eq!(mid.x, 500.0);
        assert_approx_eq!(mid.y, 500.0);
        let mid = front.start().midpoint(rear.start());
        assert_approx_eq!(mid.x, 500.0);
        assert_approx_eq!(mid.y, 500.0);
    }

    #[test]
    fn ray_angles_follow_heading() {
        let pose = Pose::new(Point2d::new(0.0, 0.0), 30.0);
        let fan = VisionFan::new(&pose, HALF_LEN, HALF_WID, &config());
        let angles = fan.rays().iter().map(|ray| ray.angle()).collect::<Vec<_>>();
        assert_eq!(
            angles,
            [-30.0, 150.0, 15.0, -75.0, 60.0, -120.0, -20.0, -40.0, 105.0, -165.0]
        );
    }

    #[test]
    fn anchors_at_heading_zero() {
        let pose = Pose::new(Point2d::new(0.0, 0.0), 0.0);
        let fan = VisionFan::new(&pose, HALF_LEN, HALF_WID, &config());
        let starts = fan.rays().iter().map(|ray| ray.start()).collect::<Vec<_>>();
        let expected = [
            (25.0, 0.0),
            (-25.0, 0.0),
            (25.0, 15.0),
            (25.0, -15.0),
            (25.0, 15.0),
            (25.0, -15.0),
            (25.0, 15.0),
            (25.0, -15.0),
            (-25.0, 15.0),
            (-25.0, -15.0),
        ];
        for (start, (x, y)) in starts.iter().zip(expected) {
            assert_approx_eq!(start.x, x);
            assert_approx_eq!(start.y, y);
        }
    }

    #[test]
    fn reposition_matches_fresh_fan() {
        let config = config();
        let mut fan = VisionFan::new(&Pose::new(Point2d::new(0.0, 0.0), 0.0), HALF_LEN, HALF_WID, &config);
        let pose = Pose::new(Point2d::new(120.0, -40.0), 211.0);
        fan.reposition(&pose, HALF_LEN, HALF_WID);
        let fresh = VisionFan::new(&pose, HALF_LEN, HALF_WID, &config);
        for (a, b) in fan.rays().iter().zip(fresh.rays()) {
            assert_eq!(a.segment(), b.segment());
        }

        // Repositioning to the same pose changes nothing
        let before = fan.rays().clone().map(|ray| *ray.segment());
        fan.reposition(&pose, HALF_LEN, HALF_WID);
        for (ray, segment) in fan.rays().iter().zip(before) {
            assert_eq!(*ray.segment(), segment);
        }
    }

    #[test]
    fn sees_enemy_ahead() {
        let pose = Pose::new(Point2d::new(0.0, 0.0), 0.0);
        let mut fan = VisionFan::new(&pose, HALF_LEN, HALF_WID, &config());
        let enemy = Hitbox::new(&Pose::new(Point2d::new(200.0, 0.0), 90.0), HALF_LEN, HALF_WID);
        let arena = Arena::new(Point2d::new(0.0, 0.0), 300.0, 0.0);
        let distances = fan.calculate(&arena, &[enemy]);

        // The enemy is turned sideways, so its near side is 15 units from its centre
        assert_approx_eq!(distances[0].0, 200.0 - 15.0 - 25.0);
        assert_approx_eq!(distances[0].1, 300.0 - 25.0);
        // The rear ray sees nothing but the boundary
        assert_approx_eq!(distances[1].0, 401.0);
        assert_approx_eq!(distances[1].1, 300.0 - 25.0);
    }
}
