//! Movement host backed by the rapier collision world

use ascent_core::{math, Quat, Vec3};
use ascent_physics::{CharacterBody, CollisionChannels, MoveHit, PhysicsWorld, SurfaceHit};

use crate::host::{MovementHost, MovementMode, RootMotion};
use crate::movement::MovementConfig;

/// Locomotion state the host keeps between ticks
#[derive(Debug, Clone)]
pub struct LocomotionState {
    pub mode: MovementMode,
    /// Turn towards the movement direction while walking or falling
    pub orient_rotation_to_movement: bool,
    pub root_motion: RootMotion,
    /// World-space movement input, at most unit length
    pub move_input: Vec3,
    /// Seconds since the body last touched walkable ground
    pub time_since_grounded: f32,
}

impl Default for LocomotionState {
    fn default() -> Self {
        Self {
            mode: MovementMode::Walking,
            orient_rotation_to_movement: true,
            root_motion: RootMotion::None,
            move_input: Vec3::ZERO,
            time_since_grounded: 0.0,
        }
    }
}

/// Borrows the world and one character body for the duration of a tick
pub struct PhysicsMovementHost<'w> {
    pub physics: &'w mut PhysicsWorld,
    pub body: &'w mut CharacterBody,
    pub state: &'w mut LocomotionState,
    pub movement: &'w MovementConfig,
}

impl<'w> PhysicsMovementHost<'w> {
    pub fn new(
        physics: &'w mut PhysicsWorld,
        body: &'w mut CharacterBody,
        state: &'w mut LocomotionState,
        movement: &'w MovementConfig,
    ) -> Self {
        Self {
            physics,
            body,
            state,
            movement,
        }
    }

    /// Walk and fall, the way the ground controller always has
    fn integrate_ground(&mut self, dt: f32) {
        let grounded = self.body.is_grounded();
        let velocity = self.body.velocity;
        let input = self.state.move_input.clamp_length_max(1.0);

        let horizontal = Vec3::new(velocity.x, 0.0, velocity.z);
        let horizontal = if input.length_squared() > 0.0 {
            let target = Vec3::new(input.x, 0.0, input.z) * self.movement.walk_speed;
            math::move_towards(horizontal, target, self.movement.acceleration(grounded) * dt)
        } else {
            math::move_towards(horizontal, Vec3::ZERO, self.movement.deceleration(grounded) * dt)
        };

        // Applied while grounded too; a resting body keeps pressing down
        let gravity = self.physics.config.gravity.y * self.movement.gravity_scale;
        let vertical = velocity.y + gravity * dt;

        let total = Vec3::new(horizontal.x, vertical, horizontal.z);
        self.body.move_character(self.physics, total * dt, dt);

        let landed = self.body.is_grounded() && vertical < 0.0;
        let vertical = if landed { 0.0 } else { vertical };
        self.body.velocity = Vec3::new(horizontal.x, vertical, horizontal.z);

        if self.body.is_grounded() {
            self.state.time_since_grounded = 0.0;
        } else {
            self.state.time_since_grounded += dt;
        }

        if self.state.orient_rotation_to_movement && horizontal.length_squared() > 1.0 {
            if let Some(target) = math::rotation_from_forward(horizontal) {
                let current = self.body.transform.rotation;
                self.body.transform.rotation =
                    math::quat_interp_to(current, target, dt, self.movement.rotation_rate);
            }
        }
    }
}

impl MovementHost for PhysicsMovementHost<'_> {
    fn line_trace(&self, start: Vec3, end: Vec3, channels: CollisionChannels) -> SurfaceHit {
        self.physics
            .line_trace(start, end, channels, self.body.collider_handle)
    }

    fn sweep_capsule(
        &self,
        start: Vec3,
        end: Vec3,
        radius: f32,
        half_height: f32,
        channels: CollisionChannels,
    ) -> Vec<SurfaceHit> {
        self.physics.sweep_capsule(
            start,
            end,
            radius,
            half_height,
            channels,
            self.body.collider_handle,
        )
    }

    fn location(&self) -> Vec3 {
        self.body.transform.position
    }

    fn rotation(&self) -> Quat {
        self.body.transform.rotation
    }

    fn set_rotation(&mut self, rotation: Quat) {
        self.body.transform.rotation = rotation;
    }

    fn velocity(&self) -> Vec3 {
        self.body.velocity
    }

    fn set_velocity(&mut self, velocity: Vec3) {
        self.body.set_velocity(velocity);
    }

    fn eye_height(&self) -> f32 {
        self.body.config.eye_height
    }

    fn capsule_half_height(&self) -> f32 {
        self.body.half_height()
    }

    /// Growing lifts the capsule so its bottom stays where it was
    fn set_capsule_half_height(&mut self, half_height: f32) {
        let growth = half_height - self.body.half_height();
        self.body.set_half_height(self.physics, half_height);

        if growth > 0.0 {
            let rotation = self.body.transform.rotation;
            self.body.sweep_move(self.physics, Vec3::Y * growth, rotation);
            self.body.grounded = false;
        }
    }

    fn set_orient_rotation_to_movement(&mut self, enabled: bool) {
        self.state.orient_rotation_to_movement = enabled;
    }

    fn movement_mode(&self) -> MovementMode {
        self.state.mode
    }

    fn set_movement_mode(&mut self, mode: MovementMode) -> bool {
        self.state.mode = mode;
        true
    }

    fn safe_move(&mut self, delta: Vec3, rotation: Quat) -> MoveHit {
        self.body.sweep_move(self.physics, delta, rotation)
    }

    fn slide_along_surface(&mut self, delta: Vec3, remaining: f32, normal: Vec3) -> f32 {
        self.body
            .slide_along_surface(self.physics, delta, remaining, normal)
    }

    fn root_motion(&self) -> RootMotion {
        self.state.root_motion
    }

    fn max_speed(&self) -> f32 {
        self.movement.walk_speed
    }

    fn max_acceleration(&self) -> f32 {
        self.movement.acceleration(self.body.is_grounded())
    }

    fn tick_base_mode(&mut self, mode: MovementMode, dt: f32) -> Option<MovementMode> {
        if dt < self.min_tick_time() {
            return None;
        }

        if let Some(velocity) = self.state.root_motion.velocity() {
            self.body.velocity = velocity;
            let rotation = self.body.transform.rotation;
            let delta = velocity * dt;
            let hit = self.body.sweep_move(self.physics, delta, rotation);
            if hit.blocking {
                self.body
                    .slide_along_surface(self.physics, delta, 1.0 - hit.time, hit.normal);
            }
            return None;
        }

        self.integrate_ground(dt);

        // Walking survives brief contact loss; falling needs real ground
        let walking = self.body.is_grounded()
            || (mode == MovementMode::Walking
                && !self.movement.is_falling(self.state.time_since_grounded));
        let next = if walking {
            MovementMode::Walking
        } else {
            MovementMode::Falling
        };
        (next != mode).then_some(next)
    }
}
