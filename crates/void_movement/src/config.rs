//! Movement system configuration

use crate::error::{MovementError, Result};
use serde::{Deserialize, Serialize};

/// Tuning values for the movement blocks
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MovementConfig {
    /// Maximum angle between desired and actual body direction that
    /// still counts as aligned
    pub turn_alignment_angle_degrees: f32,

    /// Continuous aligned time needed before a turn is done
    pub turn_alignment_time: f32,

    /// Time after which a turn gives up and proceeds anyway
    pub turn_timeout: f32,

    /// A path point closer than this (in the XY plane) is not worth
    /// turning towards
    pub minimum_turn_offset: f32,

    /// Time without progress after which an agent counts as stuck
    pub stuck_time: f32,

    /// Distance the agent has to gain towards the path end to count
    /// as progress
    pub stuck_progress_threshold: f32,

    /// Time the follow target may stay unreachable before giving up
    pub unreachable_target_timeout: f32,

    /// Distance to a path ending in cover below which cover locations
    /// are kept up to date
    pub cover_update_distance: f32,

    /// Distance to a smart object entry at which its use is attempted
    pub smart_object_trigger_distance: f32,

    /// Waiting time for a busy smart object after which a warning is logged
    pub smart_object_wait_warning_time: f32,
}

impl Default for MovementConfig {
    fn default() -> Self {
        Self {
            turn_alignment_angle_degrees: 17.0,
            turn_alignment_time: 0.2,
            turn_timeout: 8.0,
            minimum_turn_offset: 0.2,
            stuck_time: 3.0,
            stuck_progress_threshold: 0.05,
            unreachable_target_timeout: 3.0,
            cover_update_distance: 3.0,
            smart_object_trigger_distance: 0.5,
            smart_object_wait_warning_time: 5.0,
        }
    }
}

impl MovementConfig {
    /// Parse a configuration from JSON, missing fields take their defaults
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Check that every value is usable
    pub fn validate(&self) -> Result<()> {
        let positive = [
            ("turn_timeout", self.turn_timeout),
            ("stuck_time", self.stuck_time),
            ("unreachable_target_timeout", self.unreachable_target_timeout),
        ];
        for (name, value) in positive {
            if !value.is_finite() || value <= 0.0 {
                return Err(MovementError::InvalidConfig(format!(
                    "{} must be positive, got {}",
                    name, value
                )));
            }
        }

        let non_negative = [
            ("turn_alignment_time", self.turn_alignment_time),
            ("minimum_turn_offset", self.minimum_turn_offset),
            ("stuck_progress_threshold", self.stuck_progress_threshold),
            ("cover_update_distance", self.cover_update_distance),
            ("smart_object_trigger_distance", self.smart_object_trigger_distance),
            ("smart_object_wait_warning_time", self.smart_object_wait_warning_time),
        ];
        for (name, value) in non_negative {
            if !value.is_finite() || value < 0.0 {
                return Err(MovementError::InvalidConfig(format!(
                    "{} must not be negative, got {}",
                    name, value
                )));
            }
        }

        if !(0.0..180.0).contains(&self.turn_alignment_angle_degrees) {
            return Err(MovementError::InvalidConfig(format!(
                "turn_alignment_angle_degrees must be in [0, 180), got {}",
                self.turn_alignment_angle_degrees
            )));
        }

        Ok(())
    }

    /// Cosine of the turn alignment angle, for dot product comparisons
    pub fn turn_alignment_cosine(&self) -> f32 {
        self.turn_alignment_angle_degrees.to_radians().cos()
    }

    /// Set the turn timeout
    pub fn with_turn_timeout(mut self, timeout: f32) -> Self {
        self.turn_timeout = timeout;
        self
    }

    /// Set the stuck detection time
    pub fn with_stuck_time(mut self, stuck_time: f32) -> Self {
        self.stuck_time = stuck_time;
        self
    }
}
