//! What a vehicle can see. The trainer only relies on [Sensing]; [RaySensor] is
//! the fan of distance rays the brains are trained with.

use crate::{
    config::SensorConfig,
    geometry::{lerp, segment_intersection, Intersection, Point, Segment},
    vehicle::Vehicle,
};

/// The nearest hit along one ray, `offset` being the fraction of the ray's length
pub type Reading = Intersection;

/// Where a sensor sits and which way it faces
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Pose {
    pub x: f64,
    pub y: f64,
    pub angle: f64,
}

pub trait Sensing: Sync {
    /// Readings per call, which is also the brain's input width
    fn ray_count(&self) -> usize;

    /// One reading per ray, `None` where a ray hits nothing
    fn sense(&self, pose: Pose, borders: &[Segment], obstacles: &[Vehicle]) -> Vec<Option<Reading>>;
}

/// Rays fanned symmetrically around the heading, each reporting its nearest hit
/// among the road borders and the obstacle hulls
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RaySensor {
    ray_count: usize,
    ray_length: f64,
    ray_spread: f64,
}

impl RaySensor {
    pub fn new(ray_count: usize, ray_length: f64, ray_spread: f64) -> Self {
        Self {
            ray_count,
            ray_length,
            ray_spread,
        }
    }

    fn ray_angle(&self, idx: usize, heading: f64) -> f64 {
        let t = if self.ray_count == 1 {
            0.5
        } else {
            idx as f64 / (self.ray_count - 1) as f64
        };
        lerp(self.ray_spread / 2., -self.ray_spread / 2., t) + heading
    }

    /// Endpoints of every ray cast from `pose`
    pub fn rays(&self, pose: Pose) -> Vec<Segment> {
        let start = Point::new(pose.x, pose.y);
        (0..self.ray_count)
            .map(|idx| {
                let angle = self.ray_angle(idx, pose.angle);
                Segment(
                    start,
                    Point::new(
                        pose.x - angle.sin() * self.ray_length,
                        pose.y - angle.cos() * self.ray_length,
                    ),
                )
            })
            .collect()
    }

    fn cast(ray: Segment, borders: &[Segment], obstacles: &[Vehicle]) -> Option<Reading> {
        let border_hits = borders
            .iter()
            .filter_map(|b| segment_intersection(ray.0, ray.1, b.0, b.1));
        let hull_hits = obstacles.iter().flat_map(|v| {
            let hull = v.polygon();
            (0..hull.len()).filter_map(move |i| {
                segment_intersection(ray.0, ray.1, hull[i], hull[(i + 1) % hull.len()])
            })
        });

        border_hits
            .chain(hull_hits)
            .min_by(|l, r| l.offset.total_cmp(&r.offset))
    }
}

impl Default for RaySensor {
    fn default() -> Self {
        SensorConfig::default().into()
    }
}

impl From<SensorConfig> for RaySensor {
    fn from(c: SensorConfig) -> Self {
        Self::new(c.ray_count, c.ray_length, c.ray_spread)
    }
}

impl Sensing for RaySensor {
    #[inline]
    fn ray_count(&self) -> usize {
        self.ray_count
    }

    fn sense(&self, pose: Pose, borders: &[Segment], obstacles: &[Vehicle]) -> Vec<Option<Reading>> {
        self.rays(pose)
            .into_iter()
            .map(|ray| Self::cast(ray, borders, obstacles))
            .collect()
    }
}

/// Sees nothing, ever
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Blind {
    ray_count: usize,
}

impl Blind {
    pub fn new(ray_count: usize) -> Self {
        Self { ray_count }
    }
}

impl Default for Blind {
    fn default() -> Self {
        Self::new(SensorConfig::default().ray_count)
    }
}

impl Sensing for Blind {
    #[inline]
    fn ray_count(&self) -> usize {
        self.ray_count
    }

    fn sense(&self, _: Pose, _: &[Segment], _: &[Vehicle]) -> Vec<Option<Reading>> {
        vec![None; self.ray_count]
    }
}
