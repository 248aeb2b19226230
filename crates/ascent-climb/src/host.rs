//! The movement host contract the climb controller is written against

use ascent_core::{math, Quat, Vec3};
use ascent_physics::{CollisionChannels, MoveHit, SurfaceHit};
use serde::{Deserialize, Serialize};

/// Shortest tick the host will integrate
pub const MIN_TICK_TIME: f32 = 1e-6;

/// Custom locomotion modes layered on the host's base modes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CustomMode {
    Climb,
}

/// Locomotion mode owned by the movement host
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum MovementMode {
    #[default]
    Walking,
    Falling,
    Custom(CustomMode),
}

impl MovementMode {
    pub const CLIMB: Self = Self::Custom(CustomMode::Climb);

    pub fn is_climbing(self) -> bool {
        self == Self::CLIMB
    }

    pub fn is_falling(self) -> bool {
        self == Self::Falling
    }
}

/// Animation-driven velocity in effect for the current tick
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum RootMotion {
    #[default]
    None,
    /// Velocity extracted from a playing animation
    Animation(Vec3),
    /// Velocity forced by an external root-motion source
    Override(Vec3),
}

impl RootMotion {
    pub fn is_active(self) -> bool {
        !matches!(self, Self::None)
    }

    pub fn velocity(self) -> Option<Vec3> {
        match self {
            Self::None => None,
            Self::Animation(velocity) | Self::Override(velocity) => Some(velocity),
        }
    }
}

/// Character movement system hosting the climb mode.
///
/// Supplies the capsule, its transform and velocity, the base walk/fall
/// integration, sweep/slide primitives and world queries. Directions follow
/// the `ascent_core::Transform` conventions.
pub trait MovementHost {
    /// First blocking surface on `channels` between `start` and `end`
    fn line_trace(&self, start: Vec3, end: Vec3, channels: CollisionChannels) -> SurfaceHit;

    /// Every surface on `channels` a capsule touches moving from `start` to `end`
    fn sweep_capsule(
        &self,
        start: Vec3,
        end: Vec3,
        radius: f32,
        half_height: f32,
        channels: CollisionChannels,
    ) -> Vec<SurfaceHit>;

    /// Capsule centre
    fn location(&self) -> Vec3;

    fn rotation(&self) -> Quat;

    fn set_rotation(&mut self, rotation: Quat);

    fn forward(&self) -> Vec3 {
        self.rotation() * -Vec3::Z
    }

    fn up(&self) -> Vec3 {
        self.rotation() * Vec3::Y
    }

    fn velocity(&self) -> Vec3;

    fn set_velocity(&mut self, velocity: Vec3);

    fn stop_movement_immediately(&mut self) {
        self.set_velocity(Vec3::ZERO);
    }

    /// Eye height above the capsule centre
    fn eye_height(&self) -> f32;

    fn capsule_half_height(&self) -> f32;

    fn set_capsule_half_height(&mut self, half_height: f32);

    /// Turn the character towards its movement direction in base modes
    fn set_orient_rotation_to_movement(&mut self, enabled: bool);

    fn movement_mode(&self) -> MovementMode;

    /// Switch modes; returns false if the host refuses
    fn set_movement_mode(&mut self, mode: MovementMode) -> bool;

    /// Sweep the capsule along `delta` with `rotation`, stopping at the first
    /// blocking surface
    fn safe_move(&mut self, delta: Vec3, rotation: Quat) -> MoveHit;

    /// React to a blocked move before sliding
    fn handle_impact(&mut self, _hit: &MoveHit, _dt: f32, _delta: Vec3) {}

    /// Slide the `remaining` fraction of `delta` along `normal`, returning
    /// the fraction applied
    fn slide_along_surface(&mut self, delta: Vec3, remaining: f32, normal: Vec3) -> f32;

    fn root_motion(&self) -> RootMotion;

    fn min_tick_time(&self) -> f32 {
        MIN_TICK_TIME
    }

    /// Max speed of the current base mode
    fn max_speed(&self) -> f32;

    /// Max acceleration of the current base mode
    fn max_acceleration(&self) -> f32;

    /// Integrate a base (non-custom) mode for one tick, returning the mode
    /// the host wants to switch to
    fn tick_base_mode(&mut self, mode: MovementMode, dt: f32) -> Option<MovementMode>;

    /// Acceleration/deceleration velocity solver.
    ///
    /// Accelerates along `acceleration` up to `max_speed`; with no input it
    /// brakes towards rest at `braking_deceleration`.
    fn calc_velocity(
        &self,
        velocity: Vec3,
        acceleration: Vec3,
        max_speed: f32,
        braking_deceleration: f32,
        dt: f32,
    ) -> Vec3 {
        if acceleration.length_squared() <= 1e-8 {
            return math::move_towards(velocity, Vec3::ZERO, braking_deceleration * dt);
        }

        (velocity + acceleration * dt).clamp_length_max(max_speed)
    }
}
