//! Channel-filtered surface queries against the collision world

use std::ops::BitOr;

use glam::Vec3;
use rapier3d::parry::query::ShapeCastOptions;
use rapier3d::parry::shape::Capsule;
use rapier3d::prelude::*;
use serde::{Deserialize, Serialize};

use crate::PhysicsWorld;

/// Upper bound on surfaces reported by one capsule sweep
const MAX_SWEEP_HITS: usize = 16;

/// Bit set of collision channels a collider belongs to, or a query accepts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CollisionChannels(pub u32);

impl CollisionChannels {
    pub const NONE: Self = Self(0);
    pub const WORLD_STATIC: Self = Self(1 << 0);
    pub const CLIMBABLE: Self = Self(1 << 1);
    pub const CHARACTER: Self = Self(1 << 2);
    pub const ALL: Self = Self(u32::MAX);

    fn group(self) -> Group {
        Group::from_bits_truncate(self.0)
    }

    /// Interaction groups for a collider living on these channels
    pub fn membership(self) -> InteractionGroups {
        InteractionGroups::new(self.group(), Group::ALL)
    }

    /// Interaction groups for a query that only accepts these channels
    pub fn query_groups(self) -> InteractionGroups {
        InteractionGroups::new(Group::ALL, self.group())
    }
}

impl Default for CollisionChannels {
    fn default() -> Self {
        Self::CLIMBABLE
    }
}

impl BitOr for CollisionChannels {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

/// One surface reported by a line trace or a capsule sweep
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfaceHit {
    /// World-space contact point (the trace end on a miss)
    pub impact_point: Vec3,
    /// Outward surface normal at the contact (zero on a miss)
    pub impact_normal: Vec3,
    /// Whether the query was stopped by this surface
    pub blocking: bool,
    /// Where the query started
    pub trace_start: Vec3,
    /// Where the query would have ended without a hit
    pub trace_end: Vec3,
    /// Fraction of the trace travelled before the hit (1.0 on a miss)
    pub time: f32,
    /// The collider that was hit
    pub collider: Option<ColliderHandle>,
}

impl SurfaceHit {
    /// A trace that found nothing
    pub fn miss(trace_start: Vec3, trace_end: Vec3) -> Self {
        Self {
            impact_point: trace_end,
            impact_normal: Vec3::ZERO,
            blocking: false,
            trace_start,
            trace_end,
            time: 1.0,
            collider: None,
        }
    }
}

impl PhysicsWorld {
    /// Trace a line from `start` to `end` and report the first blocking
    /// surface on `channels`
    pub fn line_trace(
        &self,
        start: Vec3,
        end: Vec3,
        channels: CollisionChannels,
        exclude: Option<ColliderHandle>,
    ) -> SurfaceHit {
        let delta = end - start;
        if delta.length_squared() <= f32::EPSILON {
            return SurfaceHit::miss(start, end);
        }

        let mut filter = QueryFilter::default().groups(channels.query_groups());
        if let Some(handle) = exclude {
            filter = filter.exclude_collider(handle);
        }

        // A direction of `end - start` makes the time of impact a fraction
        self.raycast_detailed(start, delta, 1.0, filter)
            .map(|hit| SurfaceHit {
                impact_point: hit.point,
                impact_normal: hit.normal,
                blocking: true,
                trace_start: start,
                trace_end: end,
                time: hit.distance,
                collider: Some(hit.collider),
            })
            .unwrap_or_else(|| SurfaceHit::miss(start, end))
    }

    /// Sweep a Y-aligned capsule from `start` to `end` and report every
    /// surface on `channels` it touches, including ones it already overlaps
    /// at `start`.
    ///
    /// `half_height` includes the hemispherical caps. Hits are ordered by
    /// time of impact.
    pub fn sweep_capsule(
        &self,
        start: Vec3,
        end: Vec3,
        radius: f32,
        half_height: f32,
        channels: CollisionChannels,
        exclude: Option<ColliderHandle>,
    ) -> Vec<SurfaceHit> {
        let delta = end - start;
        let shape = Capsule::new_y((half_height - radius).max(0.0), radius);
        let shape_pos = Isometry::translation(start.x, start.y, start.z);
        let shape_vel = vector![delta.x, delta.y, delta.z];

        let mut options = ShapeCastOptions::with_max_time_of_impact(1.0);
        options.stop_at_penetration = true;
        options.compute_impact_geometry_on_penetration = true;

        let mut excluded: Vec<ColliderHandle> = exclude.into_iter().collect();
        let mut hits = Vec::new();

        while hits.len() < MAX_SWEEP_HITS {
            let not_seen = |handle: ColliderHandle, _: &Collider| !excluded.contains(&handle);
            let filter = QueryFilter::default()
                .groups(channels.query_groups())
                .predicate(&not_seen);

            let Some((handle, hit)) = self.query_pipeline.cast_shape(
                &self.rigid_body_set,
                &self.collider_set,
                &shape_pos,
                &shape_vel,
                &shape,
                options,
                filter,
            ) else {
                break;
            };

            hits.push(SurfaceHit {
                impact_point: Vec3::new(hit.witness1.x, hit.witness1.y, hit.witness1.z),
                impact_normal: Vec3::new(hit.normal1.x, hit.normal1.y, hit.normal1.z),
                blocking: true,
                trace_start: start,
                trace_end: end,
                time: hit.time_of_impact,
                collider: Some(handle),
            });
            excluded.push(handle);
        }

        hits.sort_by(|a, b| a.time.total_cmp(&b.time));
        hits
    }

    /// Sweep an arbitrary shape along `delta` and return the first blocking
    /// contact as `(time, point, normal)`, ignoring surfaces the shape
    /// starts inside of and moves away from
    pub(crate) fn cast_shape_first(
        &self,
        shape: &dyn Shape,
        start: Vec3,
        delta: Vec3,
        exclude: Option<ColliderHandle>,
    ) -> Option<(f32, Vec3, Vec3)> {
        let shape_pos = Isometry::translation(start.x, start.y, start.z);
        let shape_vel = vector![delta.x, delta.y, delta.z];

        let mut options = ShapeCastOptions::with_max_time_of_impact(1.0);
        options.stop_at_penetration = false;

        let mut filter = QueryFilter::default().exclude_sensors();
        if let Some(handle) = exclude {
            filter = filter.exclude_collider(handle);
        }

        self.query_pipeline
            .cast_shape(
                &self.rigid_body_set,
                &self.collider_set,
                &shape_pos,
                &shape_vel,
                shape,
                options,
                filter,
            )
            .map(|(_, hit)| {
                (
                    hit.time_of_impact,
                    Vec3::new(hit.witness1.x, hit.witness1.y, hit.witness1.z),
                    Vec3::new(hit.normal1.x, hit.normal1.y, hit.normal1.z),
                )
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wall_world() -> PhysicsWorld {
        let mut world = PhysicsWorld::new();
        // Wall face at z = -100, facing +Z
        world.create_static_box(
            Vec3::new(200.0, 300.0, 50.0),
            Vec3::new(0.0, 300.0, -150.0),
            CollisionChannels::CLIMBABLE,
        );
        // Non-climbable pillar behind the character
        world.create_static_box(
            Vec3::splat(20.0),
            Vec3::new(0.0, 100.0, 200.0),
            CollisionChannels::WORLD_STATIC,
        );
        world.update_query_pipeline();
        world
    }

    #[test]
    fn test_channel_groups() {
        let both = CollisionChannels::CLIMBABLE | CollisionChannels::WORLD_STATIC;
        assert_eq!(both.0, 0b11);
        assert_eq!(CollisionChannels::default(), CollisionChannels::CLIMBABLE);

        let query = CollisionChannels::CLIMBABLE.query_groups();
        assert!(both.membership().test(query));
        assert!(!CollisionChannels::CHARACTER.membership().test(query));
    }

    #[test]
    fn test_line_trace_hits_climbable_wall() {
        let world = wall_world();
        let start = Vec3::new(0.0, 100.0, 0.0);
        let end = Vec3::new(0.0, 100.0, -200.0);

        let hit = world.line_trace(start, end, CollisionChannels::CLIMBABLE, None);
        assert!(hit.blocking);
        assert!((hit.time - 0.5).abs() < 1e-3);
        assert!((hit.impact_point.z + 100.0).abs() < 1e-2);
        assert!((hit.impact_normal - Vec3::Z).length() < 1e-3);
        assert_eq!(hit.trace_start, start);
        assert_eq!(hit.trace_end, end);
    }

    #[test]
    fn test_line_trace_ignores_other_channels() {
        let world = wall_world();
        let hit = world.line_trace(
            Vec3::new(0.0, 100.0, 0.0),
            Vec3::new(0.0, 100.0, 400.0),
            CollisionChannels::CLIMBABLE,
            None,
        );
        assert!(!hit.blocking);
        assert_eq!(hit.impact_normal, Vec3::ZERO);
    }

    #[test]
    fn test_line_trace_zero_length_is_a_miss() {
        let world = wall_world();
        let point = Vec3::new(0.0, 100.0, 0.0);
        let hit = world.line_trace(point, point, CollisionChannels::ALL, None);
        assert!(!hit.blocking);
    }

    #[test]
    fn test_sweep_capsule_reports_wall_ahead() {
        let world = wall_world();
        let hits = world.sweep_capsule(
            Vec3::new(0.0, 150.0, 0.0),
            Vec3::new(0.0, 150.0, -200.0),
            30.0,
            60.0,
            CollisionChannels::CLIMBABLE,
            None,
        );
        assert_eq!(hits.len(), 1);
        assert!(hits[0].blocking);
        assert!(hits[0].impact_normal.z > 0.9);
    }

    #[test]
    fn test_sweep_capsule_misses_in_open_space() {
        let world = wall_world();
        let hits = world.sweep_capsule(
            Vec3::new(0.0, 150.0, 0.0),
            Vec3::new(0.0, 150.0, 10.0),
            30.0,
            60.0,
            CollisionChannels::CLIMBABLE,
            None,
        );
        assert!(hits.is_empty());
    }
}
