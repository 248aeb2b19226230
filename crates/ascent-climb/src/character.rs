//! A climbing character: body, controller and montage player driven
//! together at a fixed timestep

use ascent_core::{Vec2, Vec3};
use ascent_physics::{CharacterBody, CharacterBodyConfig, PhysicsWorld};

use crate::animator::{MontageLibrary, MontagePlayer};
use crate::config::ClimbConfig;
use crate::controller::ClimbController;
use crate::host::RootMotion;
use crate::movement::MovementConfig;
use crate::physics_host::{LocomotionState, PhysicsMovementHost};

/// Character handling input, movement, climbing and physics
pub struct ClimbingCharacter {
    /// Capsule body in the physics world
    pub body: CharacterBody,
    /// Ground movement configuration
    pub movement: MovementConfig,
    /// Climb mode and transitions
    pub controller: ClimbController,
    /// Transition montages
    pub animator: MontagePlayer,
    state: LocomotionState,
}

impl ClimbingCharacter {
    pub fn new(climb: ClimbConfig, movement: MovementConfig) -> Self {
        let body = CharacterBody::with_config(CharacterBodyConfig {
            half_height: climb.standing_half_height,
            ..Default::default()
        });

        Self {
            body,
            movement,
            controller: ClimbController::new(climb),
            animator: MontagePlayer::new(MontageLibrary::default()),
            state: LocomotionState::default(),
        }
    }

    pub fn with_library(mut self, library: MontageLibrary) -> Self {
        self.animator = MontagePlayer::new(library);
        self
    }

    /// Spawn the character with its capsule centre at `position`
    pub fn spawn(&mut self, physics: &mut PhysicsWorld, position: Vec3) {
        self.body.spawn(physics, position);
        self.body.velocity = Vec3::ZERO;
        self.state = LocomotionState::default();
    }

    /// Get the character's current position (capsule centre)
    pub fn position(&self) -> Vec3 {
        self.body.transform.position
    }

    pub fn state(&self) -> &LocomotionState {
        &self.state
    }

    pub fn is_climbing(&self) -> bool {
        self.state.mode.is_climbing()
    }

    /// Movement input, x right and y forward relative to `heading_yaw`.
    ///
    /// While climbing the same input moves along the wall, y up.
    pub fn set_move_input(&mut self, input: Vec2, heading_yaw: f32) {
        let input = input.clamp_length_max(1.0);
        let (sin_yaw, cos_yaw) = heading_yaw.sin_cos();
        let local = Vec3::new(input.x, 0.0, -input.y);

        self.state.move_input = Vec3::new(
            local.x * cos_yaw + local.z * sin_yaw,
            0.0,
            -local.x * sin_yaw + local.z * cos_yaw,
        );
        self.controller.set_climb_input(input);
    }

    /// Attempt to start climbing, or let go of the wall
    pub fn request_climb_toggle(&mut self, physics: &mut PhysicsWorld, attempting: bool) -> bool {
        let mut host =
            PhysicsMovementHost::new(physics, &mut self.body, &mut self.state, &self.movement);
        self.controller
            .request_climb_toggle(&mut host, &mut self.animator, attempting)
    }

    /// Update the character (fixed timestep)
    pub fn fixed_update(&mut self, physics: &mut PhysicsWorld, dt: f32) {
        self.animator.tick(dt);

        self.state.root_motion = match self
            .animator
            .root_motion_velocity(self.body.transform.rotation)
        {
            Some(velocity) => RootMotion::Animation(velocity),
            None => RootMotion::None,
        };

        let mut host =
            PhysicsMovementHost::new(physics, &mut self.body, &mut self.state, &self.movement);
        self.controller.tick(&mut host, &mut self.animator, dt);
    }
}

impl Default for ClimbingCharacter {
    fn default() -> Self {
        Self::new(ClimbConfig::default(), MovementConfig::default())
    }
}
