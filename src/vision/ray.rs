use crate::config::VisionConfig;
use crate::math::{distance, intersect_line_circle, unit_from_degrees, LineSegment2d, Point2d};
use crate::render::{Canvas, Rgba};
use crate::{Arena, Error, Hitbox};
use cgmath::prelude::*;

/// The radius of the markers drawn at collision points.
const MARKER_RADIUS: f64 = 5.0;

/// The nearest collision found along a ray.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RayHit {
    /// The distance from the start of the ray, or the sentinel `length + 1` on a miss.
    pub distance: f64,
    /// The collision point, if there is one within range.
    pub point: Option<Point2d>,
}

impl RayHit {
    /// A miss for a ray of the given length.
    pub fn miss(length: f64) -> Self {
        Self {
            distance: length + 1.0,
            point: None,
        }
    }

    /// Whether something was hit.
    pub fn is_hit(&self) -> bool {
        self.point.is_some()
    }
}

/// The collisions found by the last call to [VisionRay::calculate_collisions].
#[derive(Clone, Copy, Debug)]
struct Collisions {
    enemy: RayHit,
    boundary: RayHit,
}

/// A single vision ray cast from a vehicle.
#[derive(Clone, Debug)]
pub struct VisionRay {
    /// The absolute heading of the ray in degrees.
    angle: f64,
    /// The length of the ray.
    length: f64,
    /// The ray as a segment from its start to its end point.
    segment: LineSegment2d,
    /// Whether distances are divided by `length + 1`.
    normalize: bool,
    /// The colour the ray is drawn in.
    color: Rgba,
    /// The collisions at the ray's current position.
    collisions: Option<Collisions>,
}

impl VisionRay {
    /// Creates a ray from `start` pointing along `angle`, in degrees.
    pub fn new(start: Point2d, angle: f64, config: &VisionConfig) -> Self {
        let length = config.ray_length;
        Self {
            angle,
            length,
            segment: Self::cast(start, angle, length),
            normalize: config.normalize_distances,
            color: Rgba::WHITE.with_alpha(96),
            collisions: None,
        }
    }

    fn cast(start: Point2d, angle: f64, length: f64) -> LineSegment2d {
        LineSegment2d::from_ends(start, start + unit_from_degrees(angle) * length)
    }

    /// Moves the ray to a new start point and heading, discarding its old collisions.
    pub fn update_with_offset(&mut self, start: Point2d, angle: f64) {
        self.angle = angle;
        self.segment = Self::cast(start, angle, self.length);
        self.collisions = None;
    }

    pub fn start(&self) -> Point2d {
        self.segment.start
    }

    pub fn end(&self) -> Point2d {
        self.segment.end
    }

    /// The absolute heading of the ray in degrees.
    pub fn angle(&self) -> f64 {
        self.angle
    }

    pub fn length(&self) -> f64 {
        self.length
    }

    pub fn segment(&self) -> &LineSegment2d {
        &self.segment
    }

    /// Whether collision distances are normalized.
    pub fn is_normalized(&self) -> bool {
        self.normalize
    }

    /// The enemy collision from the last [VisionRay::calculate_collisions].
    pub fn enemy_hit(&self) -> Option<RayHit> {
        self.collisions.map(|c| c.enemy)
    }

    /// The boundary collision from the last [VisionRay::calculate_collisions].
    pub fn boundary_hit(&self) -> Option<RayHit> {
        self.collisions.map(|c| c.boundary)
    }

    /// Finds the nearest point where the ray crosses an edge of any of the hitboxes.
    /// With no hitboxes, or nothing in range, the ray misses.
    pub fn nearest_enemy_collision(&self, enemies: &[Hitbox]) -> RayHit {
        enemies
            .iter()
            .flat_map(|hitbox| hitbox.edges())
            .map(|edge| match self.segment.intersect(&edge) {
                Some(point) => RayHit {
                    distance: distance(self.start(), point),
                    point: Some(point),
                },
                None => RayHit::miss(self.length),
            })
            .fold(RayHit::miss(self.length), |nearest, hit| {
                if hit.distance < nearest.distance {
                    hit
                } else {
                    nearest
                }
            })
    }

    /// Finds where the ray meets the arena boundary.
    ///
    /// Of the points where the ray's line crosses the boundary, the nearest one that is
    /// not behind the start of the ray is chosen. A ray starting on the boundary sees it
    /// at distance zero. Points further away than the ray's length are misses.
    pub fn nearest_boundary_collision(&self, arena: &Arena) -> RayHit {
        let start = self.start();
        let points = match intersect_line_circle(start, self.end(), arena.centre(), arena.radius()) {
            Some((a, b)) => [a, b],
            None => return RayHit::miss(self.length),
        };

        let direction = self.segment.direction();
        points
            .into_iter()
            .filter(|point| direction.dot(*point - start) >= 0.0)
            .map(|point| (distance(start, point), point))
            .min_by(|a, b| a.0.total_cmp(&b.0))
            .filter(|(dist, _)| *dist <= self.length)
            .map_or(RayHit::miss(self.length), |(distance, point)| RayHit {
                distance,
                point: Some(point),
            })
    }

    /// Computes and stores the nearest enemy and boundary collisions.
    ///
    /// Returns the enemy and boundary distances, divided by `length + 1`
    /// when the ray is normalized.
    pub fn calculate_collisions(&mut self, arena: &Arena, enemies: &[Hitbox]) -> (f64, f64) {
        let mut enemy = self.nearest_enemy_collision(enemies);
        let mut boundary = self.nearest_boundary_collision(arena);
        if self.normalize {
            let scale = self.length + 1.0;
            enemy.distance /= scale;
            boundary.distance /= scale;
        }
        self.collisions = Some(Collisions { enemy, boundary });
        (enemy.distance, boundary.distance)
    }

    /// Draws the ray and marks any collisions within range.
    pub fn draw(&self, canvas: &mut dyn Canvas) -> Result<(), Error> {
        let collisions = self.collisions.ok_or(Error::CollisionsNotComputed)?;
        canvas.draw_line(self.start(), self.end(), self.color);

        let max_distance = if self.normalize { 1.0 } else { self.length };
        let markers = [
            (collisions.enemy, Rgba::RED),
            (collisions.boundary, Rgba::PURPLE),
        ];
        for (hit, color) in markers {
            if let Some(point) = hit.point.filter(|_| hit.distance <= max_distance) {
                canvas.draw_circle(point, MARKER_RADIUS, color, true);
            }
        }
        Ok(())
    }
}
