//! Locomotion mode handlers: the climb mode and the host's base walk/fall

use ascent_core::{math, Quat, Vec2, Vec3};
use tracing::{debug, trace};

use crate::config::ClimbConfig;
use crate::host::{MovementHost, MovementMode};
use crate::montage::TransitionKind;
use crate::probe::SurfaceProber;
use crate::session::ClimbSession;

/// What a mode tick asks the controller to do next
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TickOutcome {
    pub next_mode: Option<MovementMode>,
    pub transition: Option<TransitionKind>,
}

impl TickOutcome {
    pub const NONE: Self = Self {
        next_mode: None,
        transition: None,
    };

    pub fn switch_to(mode: MovementMode) -> Self {
        Self {
            next_mode: Some(mode),
            transition: None,
        }
    }

    pub fn transition(kind: TransitionKind) -> Self {
        Self {
            next_mode: None,
            transition: Some(kind),
        }
    }
}

/// Per-mode hooks the controller dispatches to
pub trait ModeHandler {
    fn on_enter<H: MovementHost + ?Sized>(&mut self, _host: &mut H) {}

    fn on_tick<H: MovementHost + ?Sized>(&mut self, host: &mut H, dt: f32) -> TickOutcome;

    fn on_exit<H: MovementHost + ?Sized>(&mut self, _host: &mut H) {}

    fn max_speed<H: MovementHost + ?Sized>(&self, host: &H) -> f32;

    fn max_acceleration<H: MovementHost + ?Sized>(&self, host: &H) -> f32;
}

/// Walking and falling, integrated by the host
#[derive(Debug, Default)]
pub struct BaseMode;

impl ModeHandler for BaseMode {
    fn on_tick<H: MovementHost + ?Sized>(&mut self, host: &mut H, dt: f32) -> TickOutcome {
        let mode = host.movement_mode();
        match host.tick_base_mode(mode, dt) {
            Some(next) if next != mode => TickOutcome::switch_to(next),
            _ => TickOutcome::NONE,
        }
    }

    fn max_speed<H: MovementHost + ?Sized>(&self, host: &H) -> f32 {
        host.max_speed()
    }

    fn max_acceleration<H: MovementHost + ?Sized>(&self, host: &H) -> f32 {
        host.max_acceleration()
    }
}

/// The custom climb mode: surface tracking, wall-plane integration and
/// termination checks
#[derive(Debug)]
pub struct ClimbMode {
    config: ClimbConfig,
    prober: SurfaceProber,
    session: ClimbSession,
    input: Vec2,
}

impl ClimbMode {
    pub fn new(config: ClimbConfig) -> Self {
        Self {
            prober: SurfaceProber::new(config.probe.clone()),
            config,
            session: ClimbSession::default(),
            input: Vec2::ZERO,
        }
    }

    pub fn config(&self) -> &ClimbConfig {
        &self.config
    }

    pub fn session(&self) -> &ClimbSession {
        &self.session
    }

    pub fn prober(&self) -> &SurfaceProber {
        &self.prober
    }

    pub fn prober_mut(&mut self) -> &mut SurfaceProber {
        &mut self.prober
    }

    pub fn input(&self) -> Vec2 {
        self.input
    }

    /// Climb input, x to the right and y up the wall
    pub fn set_input(&mut self, input: Vec2) {
        self.input = input;
    }

    /// Probe ahead of the character and rebuild the session from the hits
    pub fn refresh_surfaces<H: MovementHost + ?Sized>(&mut self, host: &H) -> bool {
        let hits = self
            .prober
            .surfaces_ahead(host, host.location(), host.forward());
        self.session.refresh(hits);
        !self.session.is_empty()
    }

    /// Whether a climbable wall is in front of the character
    pub fn can_start_climbing<H: MovementHost + ?Sized>(&mut self, host: &H) -> bool {
        if host.movement_mode().is_falling() {
            return false;
        }

        if !self.refresh_surfaces(host) {
            return false;
        }

        self.prober
            .eye_level_ahead(host, self.config.start_eye_trace_distance, 0.0)
            .blocking
    }

    /// Whether the character stands at an edge it can climb down over
    pub fn can_climb_down_ledge<H: MovementHost + ?Sized>(&mut self, host: &H) -> bool {
        if host.movement_mode().is_falling() {
            return false;
        }

        let settings = &self.config.climb_down;
        let location = host.location();
        let forward = host.forward();
        let down = -host.up();

        let walkable_start = location + forward * settings.walkable_surface_offset;
        let walkable_end = walkable_start + down * settings.walkable_trace_distance;
        let walkable = self.prober.line(host, walkable_start, walkable_end);

        let ledge_start = walkable.trace_start + forward * settings.ledge_offset;
        let ledge_end = ledge_start + down * settings.ledge_trace_distance;
        let ledge = self.prober.line(host, ledge_start, ledge_end);

        walkable.blocking && !ledge.blocking
    }

    /// Whether the surfaces held are too shallow (or missing) to climb
    pub fn should_stop_climbing(&self) -> bool {
        self.session
            .should_stop_climbing(self.config.stop_angle_degrees)
    }

    /// Whether a flat floor is right below a descending climber
    pub fn has_reached_floor<H: MovementHost + ?Sized>(&mut self, host: &H) -> bool {
        let down = -host.up();
        let start = host.location() + down * self.config.floor.probe_offset;
        let end = start + down * self.config.floor.probe_length;

        let descending = climb_local_velocity(host).y < -self.config.floor.descent_speed;
        let hits = self.prober.capsule(host, start, end);

        hits.iter()
            .any(|hit| math::is_parallel(-hit.impact_normal, Vec3::Y) && descending)
    }

    /// Whether an ascending climber's head has cleared the top of the wall
    pub fn has_reached_ledge<H: MovementHost + ?Sized>(&mut self, host: &H) -> bool {
        let ledge = &self.config.ledge;
        let eye = self
            .prober
            .eye_level_ahead(host, ledge.eye_trace_distance, ledge.eye_trace_offset);
        if eye.blocking {
            return false;
        }

        let walkable_start = eye.trace_end;
        let walkable_end = walkable_start + -host.up() * ledge.down_trace_distance;
        let walkable = self.prober.line(host, walkable_start, walkable_end);

        walkable.blocking && climb_local_velocity(host).y > ledge.ascent_speed
    }

    /// Input acceleration on the plane of the wall
    pub fn climb_acceleration(&self) -> Vec3 {
        let normal = self.session.average_normal();
        let input = self.input.clamp_length_max(1.0);
        if normal == Vec3::ZERO || input == Vec2::ZERO {
            return Vec3::ZERO;
        }

        let wall_up = (Vec3::Y - normal * Vec3::Y.dot(normal)).normalize_or_zero();
        let wall_right = (-normal).cross(wall_up);
        let direction = (wall_right * input.x + wall_up * input.y).clamp_length_max(1.0);

        trace!(?direction, "Climb input");
        direction * self.config.max_climb_acceleration
    }

    /// Rotation for this tick's move, turning to face the wall
    fn climb_rotation<H: MovementHost + ?Sized>(&self, host: &H, dt: f32) -> Quat {
        let current = host.rotation();
        if host.root_motion().is_active() {
            return current;
        }

        match math::rotation_from_forward(-self.session.average_normal()) {
            Some(target) => {
                math::quat_interp_to(current, target, dt, self.config.rotation_interp_speed)
            }
            None => current,
        }
    }

    /// Pull the character onto the averaged surface along its normal
    fn snap_to_surface<H: MovementHost + ?Sized>(&self, host: &mut H, dt: f32) {
        let forward = host.forward();
        let to_surface = self.session.average_location() - host.location();
        let projected = to_surface.project_onto(forward);

        let snap = -self.session.average_normal() * projected.length();
        let rotation = host.rotation();
        host.safe_move(snap * dt * self.config.max_climb_speed, rotation);
    }

    /// Reset everything a finished climb leaves behind
    pub fn clear(&mut self) {
        self.session.clear();
        self.input = Vec2::ZERO;
    }
}

impl ModeHandler for ClimbMode {
    fn on_enter<H: MovementHost + ?Sized>(&mut self, host: &mut H) {
        host.set_orient_rotation_to_movement(false);
        host.set_capsule_half_height(self.config.climbing_half_height);
    }

    fn on_tick<H: MovementHost + ?Sized>(&mut self, host: &mut H, dt: f32) -> TickOutcome {
        if dt < host.min_tick_time() {
            return TickOutcome::NONE;
        }

        self.refresh_surfaces(host);

        if self.should_stop_climbing() {
            debug!(
                surfaces = self.session.traced_surfaces().len(),
                angle = self.session.surface_angle_degrees(),
                "Climbable surface lost"
            );
            return TickOutcome::switch_to(MovementMode::Falling);
        }

        if self.has_reached_floor(host) {
            debug!("Floor reached while climbing");
            return TickOutcome::switch_to(MovementMode::Falling);
        }

        let root_motion = host.root_motion();
        if !root_motion.is_active() {
            let acceleration = self.climb_acceleration();
            let velocity = host.calc_velocity(
                host.velocity(),
                acceleration,
                self.config.max_climb_speed,
                self.config.max_break_climb_deceleration,
                dt,
            );
            host.set_velocity(velocity);
        }

        if let Some(velocity) = root_motion.velocity() {
            host.set_velocity(velocity);
        }

        let old_location = host.location();
        let delta = host.velocity() * dt;
        let rotation = self.climb_rotation(host, dt);

        let hit = host.safe_move(delta, rotation);
        if hit.blocking && hit.time < 1.0 {
            host.handle_impact(&hit, dt, delta);
            host.slide_along_surface(delta, 1.0 - hit.time, hit.normal);
        }

        if !root_motion.is_active() {
            host.set_velocity((host.location() - old_location) / dt);
        }

        self.snap_to_surface(host, dt);

        if self.has_reached_ledge(host) {
            debug!("Ledge reached while climbing");
            return TickOutcome::transition(TransitionKind::ClimbToTop);
        }

        TickOutcome::NONE
    }

    fn on_exit<H: MovementHost + ?Sized>(&mut self, host: &mut H) {
        host.set_orient_rotation_to_movement(true);
        host.set_capsule_half_height(self.config.standing_half_height);

        let upright = math::yaw_only(host.rotation());
        host.set_rotation(upright);
        host.stop_movement_immediately();

        self.clear();
    }

    fn max_speed<H: MovementHost + ?Sized>(&self, _host: &H) -> f32 {
        self.config.max_climb_speed
    }

    fn max_acceleration<H: MovementHost + ?Sized>(&self, _host: &H) -> f32 {
        self.config.max_climb_acceleration
    }
}

/// Velocity in the character's own frame; y is up the wall while climbing
pub fn climb_local_velocity<H: MovementHost + ?Sized>(host: &H) -> Vec3 {
    host.rotation().inverse() * host.velocity()
}
