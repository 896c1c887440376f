//! Tunable session parameters.

use glam::Vec2;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::lane::Lane;

/// Parameters governing a single play session.
///
/// Every field falls back to its default when omitted from a serialized
/// configuration, so partial TOML documents are valid.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// Seed mixed into every wave schedule.
    pub seed: u64,
    /// Simulated time represented by one tick, in the unit hostile and
    /// projectile speeds are expressed in.
    pub tick_length: f32,
    /// Currency available after a restart.
    pub starting_currency: u32,
    /// Lives available after a restart.
    pub starting_lives: u32,
    /// Distance at which a projectile resolves against its target.
    pub hit_radius: f32,
    /// Bonus per wave number credited when a wave is cleared.
    pub wave_clear_bonus: u32,
    /// Lane distance separating consecutive hostile entries.
    pub spawn_gap: f32,
    /// Minimum distance between two placed defenses.
    pub defense_spacing: f32,
    /// Playable field bounds.
    pub field: FieldConfig,
    /// Lane geometry.
    pub lane: LaneConfig,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            seed: 0x6e0d_ef3a_5c1b_2947,
            tick_length: 1.0,
            starting_currency: 150,
            starting_lives: 20,
            hit_radius: 10.0,
            wave_clear_bonus: 20,
            spawn_gap: 40.0,
            defense_spacing: 30.0,
            field: FieldConfig::default(),
            lane: LaneConfig::default(),
        }
    }
}

impl SimConfig {
    /// Checks that the configuration describes a playable session.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.tick_length > 0.0) {
            return Err(ConfigError::InvalidTickLength {
                tick_length: self.tick_length,
            });
        }
        if !(self.hit_radius > 0.0) {
            return Err(ConfigError::InvalidHitRadius {
                hit_radius: self.hit_radius,
            });
        }
        if !(self.spawn_gap >= 0.0) {
            return Err(ConfigError::InvalidSpawnGap {
                spawn_gap: self.spawn_gap,
            });
        }
        if !(self.field.width > 0.0 && self.field.height > 0.0) {
            return Err(ConfigError::InvalidField {
                width: self.field.width,
                height: self.field.height,
            });
        }
        let _lane = self.build_lane()?;
        Ok(())
    }

    /// Builds the lane described by [`SimConfig::lane`].
    pub fn build_lane(&self) -> Result<Lane, ConfigError> {
        Lane::new(self.lane.waypoints.clone(), self.lane.half_width)
    }
}

/// Rectangular bounds of the playable field, anchored at the origin.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldConfig {
    /// Width of the field.
    pub width: f32,
    /// Height of the field.
    pub height: f32,
}

impl FieldConfig {
    /// Reports whether the point lies inside the field.
    #[must_use]
    pub fn contains(&self, point: Vec2) -> bool {
        point.x >= 0.0 && point.y >= 0.0 && point.x <= self.width && point.y <= self.height
    }
}

impl Default for FieldConfig {
    fn default() -> Self {
        Self {
            width: 800.0,
            height: 450.0,
        }
    }
}

/// Serializable lane description.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LaneConfig {
    /// Ordered waypoints from spawn to exit.
    pub waypoints: Vec<Vec2>,
    /// Half width of the corridor where defenses may not be placed.
    pub half_width: f32,
}

impl Default for LaneConfig {
    fn default() -> Self {
        Self {
            waypoints: vec![
                Vec2::new(0.0, 80.0),
                Vec2::new(260.0, 80.0),
                Vec2::new(260.0, 340.0),
                Vec2::new(540.0, 340.0),
                Vec2::new(540.0, 120.0),
                Vec2::new(800.0, 120.0),
            ],
            half_width: 25.0,
        }
    }
}

/// Reasons a configuration cannot drive a session.
#[derive(Clone, Copy, Debug, PartialEq, Error)]
pub enum ConfigError {
    /// Ticks must represent a positive amount of time.
    #[error("tick length must be positive, got {tick_length}")]
    InvalidTickLength {
        /// Rejected value.
        tick_length: f32,
    },
    /// Projectiles need a positive hit radius to ever resolve.
    #[error("hit radius must be positive, got {hit_radius}")]
    InvalidHitRadius {
        /// Rejected value.
        hit_radius: f32,
    },
    /// Spawn stagger cannot be negative.
    #[error("spawn gap must not be negative, got {spawn_gap}")]
    InvalidSpawnGap {
        /// Rejected value.
        spawn_gap: f32,
    },
    /// Field must have a positive area.
    #[error("field must have positive dimensions, got {width}x{height}")]
    InvalidField {
        /// Rejected width.
        width: f32,
        /// Rejected height.
        height: f32,
    },
    /// A lane needs a start and an exit.
    #[error("lane needs at least two waypoints, got {count}")]
    TooFewWaypoints {
        /// Number of waypoints supplied.
        count: usize,
    },
    /// Corridor width cannot be negative.
    #[error("lane half width must not be negative, got {half_width}")]
    InvalidLaneWidth {
        /// Rejected value.
        half_width: f32,
    },
    /// All waypoints coincide.
    #[error("lane has zero length")]
    DegenerateLane,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_configuration_is_valid() {
        assert_eq!(SimConfig::default().validate(), Ok(()));
    }

    #[test]
    fn partial_toml_falls_back_to_defaults() {
        let config: SimConfig = toml::from_str(
            r#"
            starting_currency = 400
            hit_radius = 6.5

            [lane]
            waypoints = [[0.0, 10.0], [300.0, 10.0]]
            "#,
        )
        .expect("parse config");

        assert_eq!(config.starting_currency, 400);
        assert!((config.hit_radius - 6.5).abs() < f32::EPSILON);
        assert_eq!(config.starting_lives, 20);
        assert_eq!(config.lane.waypoints.len(), 2);
        assert!((config.lane.half_width - 25.0).abs() < f32::EPSILON);
        assert_eq!(config.validate(), Ok(()));
    }

    #[test]
    fn rejects_non_positive_tick_length() {
        let config = SimConfig {
            tick_length: 0.0,
            ..SimConfig::default()
        };
        assert_eq!(
            config.validate(),
            Err(ConfigError::InvalidTickLength { tick_length: 0.0 })
        );
    }

    #[test]
    fn rejects_zero_hit_radius() {
        let config = SimConfig {
            hit_radius: 0.0,
            ..SimConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidHitRadius { .. })
        ));
    }

    #[test]
    fn field_contains_edges() {
        let field = FieldConfig::default();
        assert!(field.contains(Vec2::new(0.0, 0.0)));
        assert!(field.contains(Vec2::new(800.0, 450.0)));
        assert!(!field.contains(Vec2::new(-1.0, 10.0)));
        assert!(!field.contains(Vec2::new(10.0, 451.0)));
    }
}
