//! Ascent Physics - Collision world and character body using rapier3d
//!
//! Provides the static collision world, the channel-filtered surface queries
//! used by climbing probes, and the capsule body that the movement host
//! sweeps through the world.

mod character;
mod query;

pub use character::{CharacterBody, CharacterBodyConfig, MoveHit};
pub use query::{CollisionChannels, SurfaceHit};

use glam::Vec3;
use nalgebra::Unit;
use rapier3d::prelude::*;

/// Physics world configuration
///
/// Distances are in world units (centimetres by default).
#[derive(Debug, Clone)]
pub struct PhysicsConfig {
    /// Gravity vector (default: -980 on Y axis)
    pub gravity: Vec3,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            gravity: Vec3::new(0.0, -980.0, 0.0),
        }
    }
}

/// Static collision world the character moves through.
///
/// Nothing here is simulated; characters are moved kinematically and the
/// world only answers queries.
pub struct PhysicsWorld {
    /// Configuration
    pub config: PhysicsConfig,

    /// Rigid body storage
    pub rigid_body_set: RigidBodySet,
    /// Collider storage
    pub collider_set: ColliderSet,

    /// Query pipeline for raycasts and shape casts
    query_pipeline: QueryPipeline,
}

impl PhysicsWorld {
    /// Create a new physics world with default configuration
    pub fn new() -> Self {
        Self::with_config(PhysicsConfig::default())
    }

    /// Create a new physics world with custom configuration
    pub fn with_config(config: PhysicsConfig) -> Self {
        Self {
            config,
            rigid_body_set: RigidBodySet::new(),
            collider_set: ColliderSet::new(),
            query_pipeline: QueryPipeline::new(),
        }
    }

    /// Refresh the query acceleration structure after colliders moved or
    /// were added
    pub fn update_query_pipeline(&mut self) {
        self.query_pipeline.update(&self.collider_set);
    }

    /// Add a static collider (ground, walls, etc.)
    pub fn add_static_collider(&mut self, collider: Collider) -> ColliderHandle {
        self.collider_set.insert(collider)
    }

    /// Get a mutable collider by handle
    pub fn get_collider_mut(&mut self, handle: ColliderHandle) -> Option<&mut Collider> {
        self.collider_set.get_mut(handle)
    }

    /// Cast a ray and get detailed hit information
    pub fn raycast_detailed(
        &self,
        origin: Vec3,
        direction: Vec3,
        max_distance: f32,
        filter: QueryFilter,
    ) -> Option<RaycastHit> {
        let ray = Ray::new(
            point![origin.x, origin.y, origin.z],
            vector![direction.x, direction.y, direction.z],
        );

        self.query_pipeline
            .cast_ray_and_get_normal(
                &self.rigid_body_set,
                &self.collider_set,
                &ray,
                max_distance,
                true,
                filter,
            )
            .map(|(handle, intersection)| RaycastHit {
                collider: handle,
                distance: intersection.time_of_impact,
                point: origin + direction * intersection.time_of_impact,
                normal: Vec3::new(
                    intersection.normal.x,
                    intersection.normal.y,
                    intersection.normal.z,
                ),
            })
    }

    /// Create a ground plane collider
    pub fn create_ground(&mut self, y: f32, channels: CollisionChannels) -> ColliderHandle {
        let normal = Unit::new_normalize(vector![0.0, 1.0, 0.0]);
        let ground = ColliderBuilder::halfspace(normal)
            .translation(vector![0.0, y, 0.0])
            .collision_groups(channels.membership())
            .friction(0.7)
            .restitution(0.0)
            .build();
        self.add_static_collider(ground)
    }

    /// Create a static box collider on the given channels
    pub fn create_static_box(
        &mut self,
        half_extents: Vec3,
        position: Vec3,
        channels: CollisionChannels,
    ) -> ColliderHandle {
        let collider = ColliderBuilder::cuboid(half_extents.x, half_extents.y, half_extents.z)
            .translation(vector![position.x, position.y, position.z])
            .collision_groups(channels.membership())
            .friction(0.7)
            .build();
        self.add_static_collider(collider)
    }
}

impl Default for PhysicsWorld {
    fn default() -> Self {
        Self::new()
    }
}

/// Detailed raycast hit information
#[derive(Debug, Clone)]
pub struct RaycastHit {
    /// The collider that was hit
    pub collider: ColliderHandle,
    /// Distance along the ray to the hit point, in units of the ray direction
    pub distance: f32,
    /// World-space hit point
    pub point: Vec3,
    /// Surface normal at hit point
    pub normal: Vec3,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_physics_world_creation() {
        let world = PhysicsWorld::new();
        assert_eq!(world.config.gravity, Vec3::new(0.0, -980.0, 0.0));
    }

    #[test]
    fn test_ground_creation() {
        let mut world = PhysicsWorld::new();
        let ground = world.create_ground(0.0, CollisionChannels::WORLD_STATIC);
        assert!(world.get_collider_mut(ground).is_some());
        assert_eq!(world.collider_set.len(), 1);
    }

    #[test]
    fn test_raycast_detailed() {
        let mut world = PhysicsWorld::new();
        world.create_ground(0.0, CollisionChannels::WORLD_STATIC);
        world.update_query_pipeline();

        let hit = world
            .raycast_detailed(
                Vec3::new(0.0, 10.0, 0.0),
                Vec3::new(0.0, -1.0, 0.0),
                100.0,
                QueryFilter::default(),
            )
            .expect("ground below");
        assert!((hit.distance - 10.0).abs() < 1e-3);
        assert!((hit.normal - Vec3::Y).length() < 1e-3);
    }

    #[test]
    fn test_raycast_respects_query_groups() {
        let mut world = PhysicsWorld::new();
        world.create_ground(0.0, CollisionChannels::WORLD_STATIC);
        world.update_query_pipeline();

        let filter = QueryFilter::new().groups(CollisionChannels::CLIMBABLE.query_groups());
        let hit = world.raycast_detailed(Vec3::new(0.0, 10.0, 0.0), -Vec3::Y, 100.0, filter);
        assert!(hit.is_none());
    }
}
