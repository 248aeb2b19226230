//! Surface probes cast ahead of and below the climber

use ascent_core::Vec3;
use ascent_physics::SurfaceHit;
use tracing::trace;

use crate::config::ProbeConfig;
use crate::debug::{DebugDraw, DebugTrace};
use crate::host::MovementHost;

/// Casts line and capsule queries through the movement host against the
/// climbable channels, recording debug shapes when enabled
#[derive(Debug)]
pub struct SurfaceProber {
    config: ProbeConfig,
    debug: DebugDraw,
}

impl SurfaceProber {
    pub fn new(config: ProbeConfig) -> Self {
        let mode = DebugTrace::from_flags(config.show_debug_shapes, config.persistent_debug_shapes);
        Self {
            config,
            debug: DebugDraw::new(mode),
        }
    }

    pub fn config(&self) -> &ProbeConfig {
        &self.config
    }

    pub fn debug(&self) -> &DebugDraw {
        &self.debug
    }

    pub fn debug_mut(&mut self) -> &mut DebugDraw {
        &mut self.debug
    }

    /// Capsule sweep starting just ahead of `origin` and reaching one more
    /// unit along `forward`
    pub fn surfaces_ahead<H: MovementHost + ?Sized>(
        &mut self,
        host: &H,
        origin: Vec3,
        forward: Vec3,
    ) -> Vec<SurfaceHit> {
        let start = origin + forward * self.config.forward_offset;
        let end = start + forward;
        self.capsule(host, start, end)
    }

    /// Multi-hit capsule sweep with the probe capsule
    pub fn capsule<H: MovementHost + ?Sized>(
        &mut self,
        host: &H,
        start: Vec3,
        end: Vec3,
    ) -> Vec<SurfaceHit> {
        let hits = host.sweep_capsule(
            start,
            end,
            self.config.capsule_radius,
            self.config.capsule_half_height,
            self.config.climbable_channels,
        );
        trace!(?start, ?end, hits = hits.len(), "Capsule probe");

        self.debug.record_capsule(
            start,
            end,
            self.config.capsule_radius,
            self.config.capsule_half_height,
            &hits,
        );
        hits
    }

    /// Single line trace, first blocking hit only
    pub fn line<H: MovementHost + ?Sized>(
        &mut self,
        host: &H,
        start: Vec3,
        end: Vec3,
    ) -> SurfaceHit {
        let hit = host.line_trace(start, end, self.config.climbable_channels);
        trace!(?start, ?end, blocking = hit.blocking, "Line probe");

        self.debug.record_line(&hit);
        hit
    }

    /// Line trace forward from eye height, raised by `vertical_offset`
    pub fn eye_level_ahead<H: MovementHost + ?Sized>(
        &mut self,
        host: &H,
        distance: f32,
        vertical_offset: f32,
    ) -> SurfaceHit {
        let start = host.location() + host.up() * (host.eye_height() + vertical_offset);
        let end = start + host.forward() * distance;
        self.line(host, start, end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{blocking_hit, TestBox, TestHost};

    fn host_facing_wall() -> TestHost {
        let mut host = TestHost::default();
        host.boxes.push(TestBox::new(
            Vec3::new(-500.0, 0.0, -300.0),
            Vec3::new(500.0, 400.0, -80.0),
        ));
        host.wall_hits = vec![blocking_hit(Vec3::new(0.0, 96.0, -80.0), Vec3::Z)];
        host
    }

    #[test]
    fn test_surfaces_ahead_starts_in_front_of_origin() {
        let host = host_facing_wall();
        let mut prober = SurfaceProber::new(ProbeConfig::default());

        let hits = prober.surfaces_ahead(&host, host.location(), host.forward());
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].trace_start, Vec3::new(0.0, 96.0, -30.0));
        assert_eq!(hits[0].trace_end, Vec3::new(0.0, 96.0, -31.0));
    }

    #[test]
    fn test_surfaces_ahead_is_idempotent() {
        let host = host_facing_wall();
        let mut prober = SurfaceProber::new(ProbeConfig::default());

        let first = prober.surfaces_ahead(&host, host.location(), host.forward());
        let second = prober.surfaces_ahead(&host, host.location(), host.forward());
        assert_eq!(first, second);
    }

    #[test]
    fn test_surfaces_ahead_empty_without_wall() {
        let host = TestHost::default();
        let mut prober = SurfaceProber::new(ProbeConfig::default());
        assert!(prober
            .surfaces_ahead(&host, host.location(), host.forward())
            .is_empty());
    }

    #[test]
    fn test_eye_level_ahead_uses_eye_height_and_offset() {
        let host = host_facing_wall();
        let mut prober = SurfaceProber::new(ProbeConfig::default());

        let hit = prober.eye_level_ahead(&host, 100.0, 50.0);
        assert!(hit.blocking);
        assert_eq!(hit.trace_start, Vec3::new(0.0, 96.0 + 64.0 + 50.0, 0.0));
        assert!((hit.impact_point.z + 80.0).abs() < 1e-4);
        assert_eq!(hit.impact_normal, Vec3::Z);
    }

    #[test]
    fn test_eye_level_ahead_misses_short_of_wall() {
        let host = host_facing_wall();
        let mut prober = SurfaceProber::new(ProbeConfig::default());
        assert!(!prober.eye_level_ahead(&host, 50.0, 0.0).blocking);
    }

    #[test]
    fn test_probes_record_debug_shapes_when_enabled() {
        let host = host_facing_wall();
        let mut prober = SurfaceProber::new(ProbeConfig {
            show_debug_shapes: true,
            ..Default::default()
        });

        prober.eye_level_ahead(&host, 100.0, 0.0);
        prober.surfaces_ahead(&host, host.location(), host.forward());
        assert_eq!(prober.debug().shapes().len(), 2);
    }
}
