//! Fixed polyline lane followed by every hostile.

use glam::Vec2;

use crate::ConfigError;

/// Polyline path running from the spawn point to the exit.
///
/// Hostiles are located on the lane by their progress, the distance travelled
/// from the first waypoint. The corridor is the band of `half_width` around
/// every segment and is reserved for hostiles.
#[derive(Clone, Debug, PartialEq)]
pub struct Lane {
    waypoints: Vec<Vec2>,
    cumulative: Vec<f32>,
    length: f32,
    half_width: f32,
}

impl Lane {
    /// Builds a lane from ordered waypoints and the corridor half width.
    pub fn new(waypoints: Vec<Vec2>, half_width: f32) -> Result<Self, ConfigError> {
        if waypoints.len() < 2 {
            return Err(ConfigError::TooFewWaypoints {
                count: waypoints.len(),
            });
        }

        if !(half_width >= 0.0) {
            return Err(ConfigError::InvalidLaneWidth { half_width });
        }

        let mut cumulative = Vec::with_capacity(waypoints.len());
        let mut length = 0.0;
        cumulative.push(length);
        for pair in waypoints.windows(2) {
            length += pair[0].distance(pair[1]);
            cumulative.push(length);
        }

        if !(length > 0.0) {
            return Err(ConfigError::DegenerateLane);
        }

        Ok(Self {
            waypoints,
            cumulative,
            length,
            half_width,
        })
    }

    /// Total lane length measured along its segments.
    #[must_use]
    pub const fn length(&self) -> f32 {
        self.length
    }

    /// Half width of the corridor reserved around the lane.
    #[must_use]
    pub const fn half_width(&self) -> f32 {
        self.half_width
    }

    /// Waypoints defining the lane, from spawn to exit.
    #[must_use]
    pub fn waypoints(&self) -> &[Vec2] {
        &self.waypoints
    }

    /// Position reached after travelling `progress` units along the lane.
    ///
    /// Progress is clamped to the lane, so negative values map onto the spawn
    /// point and values past the end map onto the exit.
    #[must_use]
    pub fn position_at(&self, progress: f32) -> Vec2 {
        let last = self.waypoints.len() - 1;
        if progress <= 0.0 {
            return self.waypoints[0];
        }
        if progress >= self.length {
            return self.waypoints[last];
        }

        let segment = self
            .cumulative
            .partition_point(|travelled| *travelled <= progress)
            .saturating_sub(1)
            .min(last - 1);
        let start = self.waypoints[segment];
        let end = self.waypoints[segment + 1];
        let segment_length = self.cumulative[segment + 1] - self.cumulative[segment];
        if segment_length <= 0.0 {
            return start;
        }

        let t = (progress - self.cumulative[segment]) / segment_length;
        start.lerp(end, t)
    }

    /// Shortest distance from `point` to any lane segment.
    #[must_use]
    pub fn distance_to(&self, point: Vec2) -> f32 {
        self.waypoints
            .windows(2)
            .map(|pair| distance_to_segment(point, pair[0], pair[1]))
            .fold(f32::INFINITY, f32::min)
    }

    /// Reports whether `point` lies inside the lane corridor.
    #[must_use]
    pub fn corridor_contains(&self, point: Vec2) -> bool {
        self.distance_to(point) <= self.half_width
    }
}

fn distance_to_segment(point: Vec2, start: Vec2, end: Vec2) -> f32 {
    let segment = end - start;
    let length_sq = segment.length_squared();
    if length_sq <= f32::EPSILON {
        return point.distance(start);
    }

    let t = ((point - start).dot(segment) / length_sq).clamp(0.0, 1.0);
    point.distance(start + segment * t)
}
