//! Capsule character body moved by sweeps and rapier's kinematic character
//! controller

use ascent_core::{Quat, Transform, Vec3};
use rapier3d::control::{CharacterAutostep, CharacterLength, KinematicCharacterController};
use rapier3d::parry::shape::Capsule;
use rapier3d::prelude::*;
use tracing::trace;

use crate::{CollisionChannels, PhysicsWorld};

/// Character body configuration
#[derive(Debug, Clone)]
pub struct CharacterBodyConfig {
    /// Capsule radius (default: 42)
    pub radius: f32,
    /// Capsule half-height including the caps (default: 96)
    pub half_height: f32,
    /// Eye height above the capsule centre (default: 64)
    pub eye_height: f32,
    /// Maximum slope angle in degrees (default: 45)
    pub max_slope_angle: f32,
    /// Step height for climbing stairs (default: 45)
    pub step_height: f32,
    /// Skin width kept between the capsule and blocking geometry (default: 1)
    pub skin_width: f32,
    /// Whether to snap to ground when walking down slopes
    pub snap_to_ground: bool,
    /// Maximum ground snap distance
    pub ground_snap_distance: f32,
}

impl Default for CharacterBodyConfig {
    fn default() -> Self {
        Self {
            radius: 42.0,
            half_height: 96.0,
            eye_height: 64.0,
            max_slope_angle: 45.0,
            step_height: 45.0,
            skin_width: 1.0,
            snap_to_ground: true,
            ground_snap_distance: 20.0,
        }
    }
}

/// Result of sweeping the body along a displacement
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MoveHit {
    /// Fraction of the displacement applied before the hit (1.0 = no hit)
    pub time: f32,
    /// Contact point on the blocking surface
    pub point: Vec3,
    /// Outward normal of the blocking surface
    pub normal: Vec3,
    /// Whether something stopped the sweep
    pub blocking: bool,
}

impl MoveHit {
    /// A sweep that travelled its full displacement
    pub const NONE: Self = Self {
        time: 1.0,
        point: Vec3::ZERO,
        normal: Vec3::ZERO,
        blocking: false,
    };
}

/// Capsule body for a character, positioned at the capsule centre
pub struct CharacterBody {
    /// Configuration
    pub config: CharacterBodyConfig,
    /// Capsule centre and orientation
    pub transform: Transform,
    /// Current velocity
    pub velocity: Vec3,
    /// Whether the character is on the ground
    pub grounded: bool,
    /// The collider handle for this character
    pub collider_handle: Option<ColliderHandle>,
    /// Current capsule half-height (changes while climbing)
    half_height: f32,
    /// Rapier's kinematic character controller
    controller: KinematicCharacterController,
}

impl CharacterBody {
    /// Create a new character body with default config
    pub fn new() -> Self {
        Self::with_config(CharacterBodyConfig::default())
    }

    /// Create a new character body with custom config
    pub fn with_config(config: CharacterBodyConfig) -> Self {
        let mut controller = KinematicCharacterController::default();
        controller.up = Vector::y_axis();
        controller.max_slope_climb_angle = config.max_slope_angle.to_radians();
        controller.min_slope_slide_angle = config.max_slope_angle.to_radians();
        controller.autostep = Some(CharacterAutostep {
            max_height: CharacterLength::Absolute(config.step_height),
            min_width: CharacterLength::Relative(0.5),
            include_dynamic_bodies: true,
        });
        controller.snap_to_ground = if config.snap_to_ground {
            Some(CharacterLength::Absolute(config.ground_snap_distance))
        } else {
            None
        };
        controller.offset = CharacterLength::Absolute(config.skin_width);

        Self {
            half_height: config.half_height,
            config,
            transform: Transform::default(),
            velocity: Vec3::ZERO,
            grounded: false,
            collider_handle: None,
            controller,
        }
    }

    /// Spawn the character in the physics world with its capsule centre at
    /// `position`
    pub fn spawn(&mut self, physics: &mut PhysicsWorld, position: Vec3) -> ColliderHandle {
        self.transform.position = position;

        let collider = ColliderBuilder::capsule_y(self.segment_half_height(), self.config.radius)
            .translation(vector![position.x, position.y, position.z])
            .collision_groups(CollisionChannels::CHARACTER.membership())
            .friction(0.0) // Smooth sliding against walls
            .restitution(0.0)
            .build();

        let handle = physics.add_static_collider(collider);
        self.collider_handle = Some(handle);
        physics.update_query_pipeline();
        handle
    }

    /// Current capsule half-height
    pub fn half_height(&self) -> f32 {
        self.half_height
    }

    /// Resize the capsule, keeping its centre in place
    pub fn set_half_height(&mut self, physics: &mut PhysicsWorld, half_height: f32) {
        self.half_height = half_height.max(self.config.radius);

        if let Some(handle) = self.collider_handle {
            let segment = self.segment_half_height();
            if let Some(collider) = physics.get_collider_mut(handle) {
                collider.set_shape(SharedShape::capsule_y(segment, self.config.radius));
            }
            physics.update_query_pipeline();
        }
    }

    fn segment_half_height(&self) -> f32 {
        (self.half_height - self.config.radius).max(0.01)
    }

    fn capsule(&self) -> Capsule {
        Capsule::new_y(self.segment_half_height(), self.config.radius)
    }

    /// Move the character along the ground with step/slope handling
    pub fn move_character(
        &mut self,
        physics: &mut PhysicsWorld,
        desired_translation: Vec3,
        dt: f32,
    ) {
        let Some(collider_handle) = self.collider_handle else {
            return;
        };

        let Some(collider) = physics.collider_set.get(collider_handle) else {
            return;
        };

        let shape = collider.shape();
        let position = self.transform.position;
        let current_pos = Isometry::translation(position.x, position.y, position.z);

        // Compute the corrected movement
        let movement = self.controller.move_shape(
            dt,
            &physics.rigid_body_set,
            &physics.collider_set,
            &physics.query_pipeline,
            shape,
            &current_pos,
            vector![desired_translation.x, desired_translation.y, desired_translation.z],
            QueryFilter::default().exclude_collider(collider_handle),
            |_| {},
        );

        self.grounded = movement.grounded;

        let effective_translation = movement.translation;
        self.transform.position += Vec3::new(
            effective_translation.x,
            effective_translation.y,
            effective_translation.z,
        );
        self.sync_collider(physics);
    }

    /// Sweep the capsule along `delta`, stopping at the first blocking
    /// surface, and adopt `rotation`
    pub fn sweep_move(
        &mut self,
        physics: &mut PhysicsWorld,
        delta: Vec3,
        rotation: Quat,
    ) -> MoveHit {
        self.transform.rotation = rotation;

        if delta.length_squared() <= 1e-8 {
            return MoveHit::NONE;
        }

        let hit = physics.cast_shape_first(
            &self.capsule(),
            self.transform.position,
            delta,
            self.collider_handle,
        );

        let result = match hit {
            Some((time, point, normal)) => {
                trace!(time, ?normal, "Character sweep blocked");
                // Stop short of the contact by the skin width
                let travel = delta.length() * time;
                let kept = (travel - self.config.skin_width).max(0.0);
                self.transform.position += delta.normalize() * kept;
                MoveHit {
                    time,
                    point,
                    normal,
                    blocking: true,
                }
            }
            None => {
                self.transform.position += delta;
                MoveHit::NONE
            }
        };

        self.sync_collider(physics);
        result
    }

    /// Slide the part of `delta` left after a blocked sweep along the
    /// blocking surface, returning the fraction of the slide applied
    pub fn slide_along_surface(
        &mut self,
        physics: &mut PhysicsWorld,
        delta: Vec3,
        remaining: f32,
        normal: Vec3,
    ) -> f32 {
        let leftover = delta * remaining.clamp(0.0, 1.0);
        let slide = leftover - normal * leftover.dot(normal);

        if slide.length_squared() <= 1e-8 {
            return 0.0;
        }

        let rotation = self.transform.rotation;
        self.sweep_move(physics, slide, rotation).time
    }

    /// Set the character's position directly (teleport)
    pub fn set_position(&mut self, physics: &mut PhysicsWorld, position: Vec3) {
        self.transform.position = position;
        self.sync_collider(physics);
    }

    fn sync_collider(&self, physics: &mut PhysicsWorld) {
        let Some(handle) = self.collider_handle else {
            return;
        };

        let position = self.transform.position;
        if let Some(collider) = physics.collider_set.get_mut(handle) {
            collider.set_translation(vector![position.x, position.y, position.z]);
        }
        physics.update_query_pipeline();
    }

    /// Check if standing on ground
    pub fn is_grounded(&self) -> bool {
        self.grounded
    }

    /// Set the character's velocity directly
    pub fn set_velocity(&mut self, velocity: Vec3) {
        self.velocity = velocity;
    }
}

impl Default for CharacterBody {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn world_with_wall() -> PhysicsWorld {
        let mut world = PhysicsWorld::new();
        // Wall face at z = -200
        world.create_static_box(
            Vec3::new(500.0, 500.0, 50.0),
            Vec3::new(0.0, 500.0, -250.0),
            CollisionChannels::CLIMBABLE,
        );
        world.update_query_pipeline();
        world
    }

    #[test]
    fn test_character_body_config() {
        let config = CharacterBodyConfig::default();
        assert_eq!(config.half_height, 96.0);
        assert_eq!(config.radius, 42.0);
        assert_eq!(config.max_slope_angle, 45.0);
    }

    #[test]
    fn test_set_half_height_resizes_capsule() {
        let mut world = PhysicsWorld::new();
        let mut body = CharacterBody::new();
        let handle = body.spawn(&mut world, Vec3::new(0.0, 96.0, 0.0));

        body.set_half_height(&mut world, 48.0);
        assert_eq!(body.half_height(), 48.0);

        let capsule = world
            .collider_set
            .get(handle)
            .and_then(|c| c.shape().as_capsule())
            .expect("capsule collider");
        assert!((capsule.half_height() - 6.0).abs() < 1e-4);
    }

    #[test]
    fn test_sweep_move_stops_at_wall() {
        let mut world = world_with_wall();
        let mut body = CharacterBody::new();
        body.spawn(&mut world, Vec3::new(0.0, 150.0, 0.0));

        let hit = body.sweep_move(&mut world, Vec3::new(0.0, 0.0, -400.0), Quat::IDENTITY);
        assert!(hit.blocking);
        assert!(hit.time < 0.5);
        assert!(hit.normal.z > 0.9);
        // Capsule surface stops at the wall, centre one radius away
        assert!(body.transform.position.z > -200.0 + body.config.radius - 2.0);
    }

    #[test]
    fn test_sweep_move_in_open_space() {
        let mut world = world_with_wall();
        let mut body = CharacterBody::new();
        body.spawn(&mut world, Vec3::new(0.0, 150.0, 0.0));

        let hit = body.sweep_move(&mut world, Vec3::new(50.0, 0.0, 0.0), Quat::IDENTITY);
        assert_eq!(hit, MoveHit::NONE);
        assert!((body.transform.position.x - 50.0).abs() < 1e-4);
    }

    #[test]
    fn test_slide_along_surface_keeps_tangential_motion() {
        let mut world = world_with_wall();
        let mut body = CharacterBody::new();
        body.spawn(&mut world, Vec3::new(0.0, 150.0, -140.0));

        let delta = Vec3::new(40.0, 0.0, -40.0);
        let hit = body.sweep_move(&mut world, delta, Quat::IDENTITY);
        assert!(hit.blocking);

        let x_before = body.transform.position.x;
        body.slide_along_surface(&mut world, delta, 1.0 - hit.time, hit.normal);
        assert!(body.transform.position.x > x_before);
    }
}
