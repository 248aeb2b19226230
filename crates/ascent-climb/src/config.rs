//! Climbing configuration
//!
//! Distances are world units (centimetres with the default physics setup),
//! speeds are units per second.

use ascent_physics::CollisionChannels;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::montage::TransitionMontages;

/// Surface probe shape and channel configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProbeConfig {
    /// Radius of the capsule swept ahead of the character
    pub capsule_radius: f32,
    /// Half-height of the swept capsule, caps included
    pub capsule_half_height: f32,
    /// Channels that count as climbable surfaces
    pub climbable_channels: CollisionChannels,
    /// How far ahead of the character the surface sweep starts
    pub forward_offset: f32,
    /// Record debug shapes for every probe
    pub show_debug_shapes: bool,
    /// Keep recorded debug shapes instead of clearing them every tick
    pub persistent_debug_shapes: bool,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            capsule_radius: 50.0,
            capsule_half_height: 72.0,
            climbable_channels: CollisionChannels::CLIMBABLE,
            forward_offset: 30.0,
            show_debug_shapes: false,
            persistent_debug_shapes: false,
        }
    }
}

/// Floor detection while descending a wall
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FloorConfig {
    /// Distance below the character where the floor sweep starts
    pub probe_offset: f32,
    /// Length of the downward floor sweep
    pub probe_length: f32,
    /// Local downward speed above which a floor hit ends the climb
    pub descent_speed: f32,
}

impl Default for FloorConfig {
    fn default() -> Self {
        Self {
            probe_offset: 50.0,
            probe_length: 1.0,
            descent_speed: 10.0,
        }
    }
}

/// Ledge detection at the top of a wall
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LedgeConfig {
    /// Forward length of the eye-level ledge trace
    pub eye_trace_distance: f32,
    /// Extra height above the eyes for the ledge trace
    pub eye_trace_offset: f32,
    /// Length of the downward trace looking for a walkable top
    pub down_trace_distance: f32,
    /// Local upward speed above which a ledge triggers the climb-to-top exit
    pub ascent_speed: f32,
}

impl Default for LedgeConfig {
    fn default() -> Self {
        Self {
            eye_trace_distance: 100.0,
            eye_trace_offset: 50.0,
            down_trace_distance: 100.0,
            ascent_speed: 10.0,
        }
    }
}

/// Climbing down over a ledge from the floor above it
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClimbDownConfig {
    /// Forward offset of the trace confirming a walkable floor ahead
    pub walkable_surface_offset: f32,
    /// Length of the walkable floor trace
    pub walkable_trace_distance: f32,
    /// Further forward offset of the trace looking past the edge
    pub ledge_offset: f32,
    /// Length of the trace past the edge; a miss means a drop
    pub ledge_trace_distance: f32,
}

impl Default for ClimbDownConfig {
    fn default() -> Self {
        Self {
            walkable_surface_offset: 100.0,
            walkable_trace_distance: 100.0,
            ledge_offset: 50.0,
            ledge_trace_distance: 300.0,
        }
    }
}

/// Climbing configuration for one character
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClimbConfig {
    /// Surface probe settings
    pub probe: ProbeConfig,
    /// Maximum climbing speed
    pub max_climb_speed: f32,
    /// Maximum climbing acceleration
    pub max_climb_acceleration: f32,
    /// Braking deceleration while climbing without input
    pub max_break_climb_deceleration: f32,
    /// Rate at which the character turns to face the wall
    pub rotation_interp_speed: f32,
    /// Surfaces within this many degrees of world up end the climb
    pub stop_angle_degrees: f32,
    /// Eye-level trace distance confirming a wall before climbing starts
    pub start_eye_trace_distance: f32,
    /// Capsule half-height while climbing
    pub climbing_half_height: f32,
    /// Capsule half-height restored after climbing
    pub standing_half_height: f32,
    /// Floor detection
    pub floor: FloorConfig,
    /// Ledge detection
    pub ledge: LedgeConfig,
    /// Climb-down entry
    pub climb_down: ClimbDownConfig,
    /// Transition montage handles
    pub montages: TransitionMontages,
}

impl Default for ClimbConfig {
    fn default() -> Self {
        Self {
            probe: ProbeConfig::default(),
            max_climb_speed: 100.0,
            max_climb_acceleration: 300.0,
            max_break_climb_deceleration: 400.0,
            rotation_interp_speed: 5.0,
            stop_angle_degrees: 60.0,
            start_eye_trace_distance: 100.0,
            climbing_half_height: 48.0,
            standing_half_height: 96.0,
            floor: FloorConfig::default(),
            ledge: LedgeConfig::default(),
            climb_down: ClimbDownConfig::default(),
            montages: TransitionMontages::default(),
        }
    }
}

impl ClimbConfig {
    /// Parse a config from TOML and validate it
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    /// Check that every value describes a usable climb setup
    pub fn validate(&self) -> Result<(), ConfigError> {
        let positive = [
            ("probe.capsule_radius", self.probe.capsule_radius),
            ("max_climb_speed", self.max_climb_speed),
            ("max_climb_acceleration", self.max_climb_acceleration),
            ("start_eye_trace_distance", self.start_eye_trace_distance),
            ("climbing_half_height", self.climbing_half_height),
            ("floor.probe_length", self.floor.probe_length),
            ("ledge.eye_trace_distance", self.ledge.eye_trace_distance),
            ("ledge.down_trace_distance", self.ledge.down_trace_distance),
            ("climb_down.walkable_trace_distance", self.climb_down.walkable_trace_distance),
            ("climb_down.ledge_trace_distance", self.climb_down.ledge_trace_distance),
        ];
        for (field, value) in positive {
            if value <= 0.0 || !value.is_finite() {
                return Err(ConfigError::NonPositive { field, value });
            }
        }

        if self.probe.capsule_half_height < self.probe.capsule_radius {
            return Err(ConfigError::ProbeCapsule {
                radius: self.probe.capsule_radius,
                half_height: self.probe.capsule_half_height,
            });
        }

        if self.climbing_half_height >= self.standing_half_height {
            return Err(ConfigError::HalfHeightOrder {
                climbing: self.climbing_half_height,
                standing: self.standing_half_height,
            });
        }

        if !(0.0..=180.0).contains(&self.stop_angle_degrees) {
            return Err(ConfigError::StopAngle(self.stop_angle_degrees));
        }

        Ok(())
    }
}
