//! Ground movement configuration for the base walk/fall modes

use serde::{Deserialize, Serialize};

/// Movement configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MovementConfig {
    /// Walking speed in units per second
    pub walk_speed: f32,
    /// Ground acceleration (how fast you reach max speed)
    pub ground_acceleration: f32,
    /// Ground deceleration (how fast you stop)
    pub ground_deceleration: f32,
    /// Air acceleration (reduced control in air)
    pub air_acceleration: f32,
    /// Air deceleration
    pub air_deceleration: f32,
    /// Gravity multiplier (1.0 = world gravity)
    pub gravity_scale: f32,
    /// Turn rate towards the movement direction in radians per second
    pub rotation_rate: f32,
    /// Grace period after losing ground contact before the character counts
    /// as falling
    pub coyote_time: f32,
}

impl Default for MovementConfig {
    fn default() -> Self {
        Self {
            walk_speed: 500.0,
            ground_acceleration: 2048.0,
            ground_deceleration: 2048.0,
            air_acceleration: 400.0,
            air_deceleration: 200.0,
            gravity_scale: 1.0,
            rotation_rate: 8.0,
            coyote_time: 0.15,
        }
    }
}

impl MovementConfig {
    /// Get the current acceleration based on grounded state
    pub fn acceleration(&self, grounded: bool) -> f32 {
        if grounded {
            self.ground_acceleration
        } else {
            self.air_acceleration
        }
    }

    /// Whether a character off the ground for `time_since_grounded` seconds
    /// is falling
    pub fn is_falling(&self, time_since_grounded: f32) -> bool {
        time_since_grounded > self.coyote_time
    }

    /// Get the current deceleration based on grounded state
    pub fn deceleration(&self, grounded: bool) -> f32 {
        if grounded {
            self.ground_deceleration
        } else {
            self.air_deceleration
        }
    }
}
