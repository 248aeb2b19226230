//! Per-tick summary of the surfaces the climber is holding on to

use ascent_core::{math, Vec3};
use ascent_physics::SurfaceHit;

/// Float slack on the stop-angle comparison, in degrees
const ANGLE_EPSILON: f32 = 1e-3;

/// Surfaces traced ahead of a climbing character and their average.
///
/// Rebuilt every tick while climbing and zeroed when the climb ends. A zero
/// `average_normal` means there is no climbable surface.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClimbSession {
    traced_surfaces: Vec<SurfaceHit>,
    average_location: Vec3,
    average_normal: Vec3,
}

impl ClimbSession {
    pub fn from_hits(hits: Vec<SurfaceHit>) -> Self {
        let mut session = Self::default();
        session.refresh(hits);
        session
    }

    /// Replace the traced surfaces and recompute the averages
    pub fn refresh(&mut self, hits: Vec<SurfaceHit>) {
        self.traced_surfaces = hits;
        self.average_location = Vec3::ZERO;
        self.average_normal = Vec3::ZERO;

        if self.traced_surfaces.is_empty() {
            return;
        }

        let mut normal_sum = Vec3::ZERO;
        for hit in &self.traced_surfaces {
            self.average_location += hit.impact_point;
            normal_sum += hit.impact_normal;
        }

        self.average_location /= self.traced_surfaces.len() as f32;
        self.average_normal = normal_sum.normalize_or_zero();
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }

    pub fn traced_surfaces(&self) -> &[SurfaceHit] {
        &self.traced_surfaces
    }

    pub fn is_empty(&self) -> bool {
        self.traced_surfaces.is_empty()
    }

    pub fn average_location(&self) -> Vec3 {
        self.average_location
    }

    pub fn average_normal(&self) -> Vec3 {
        self.average_normal
    }

    /// Whether there is a usable surface to climb
    pub fn has_surface(&self) -> bool {
        !self.is_empty() && self.average_normal != Vec3::ZERO
    }

    /// Angle between the averaged normal and world up, in degrees
    pub fn surface_angle_degrees(&self) -> f32 {
        math::angle_between_degrees(self.average_normal, Vec3::Y)
    }

    /// Whether the climb should end: no surface, or a surface within
    /// `stop_angle` degrees of world up
    pub fn should_stop_climbing(&self, stop_angle: f32) -> bool {
        if !self.has_surface() {
            return true;
        }

        self.surface_angle_degrees() <= stop_angle + ANGLE_EPSILON
    }
}
