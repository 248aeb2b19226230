//! Climb controller: entry checks, mode dispatch and montage-gated
//! transitions

use ascent_core::{Vec2, Vec3};
use tracing::{debug, info, warn};

use crate::config::ClimbConfig;
use crate::debug::DebugShape;
use crate::host::{MovementHost, MovementMode};
use crate::mode::{climb_local_velocity, BaseMode, ClimbMode, ModeHandler, TickOutcome};
use crate::montage::{AnimationHost, MontageEnded, TransitionKind, TransitionSlot};
use crate::session::ClimbSession;

/// Adds the climb mode to a movement host's walk/fall state machine
#[derive(Debug)]
pub struct ClimbController {
    climb: ClimbMode,
    base: BaseMode,
    slot: TransitionSlot,
}

impl ClimbController {
    pub fn new(config: ClimbConfig) -> Self {
        Self {
            climb: ClimbMode::new(config),
            base: BaseMode,
            slot: TransitionSlot::new(),
        }
    }

    pub fn config(&self) -> &ClimbConfig {
        self.climb.config()
    }

    /// Advance one fixed step: consume montage ends, tick the current mode
    /// and apply whatever it asks for
    pub fn tick<H, A>(&mut self, host: &mut H, animator: &mut A, dt: f32)
    where
        H: MovementHost + ?Sized,
        A: AnimationHost + ?Sized,
    {
        self.climb.prober_mut().debug_mut().begin_frame();

        while let Some(ended) = animator.poll_ended() {
            self.handle_transition_ended(host, &ended);
        }

        let outcome = if host.movement_mode().is_climbing() {
            self.climb.on_tick(host, dt)
        } else {
            self.base.on_tick(host, dt)
        };

        self.apply(host, animator, outcome);
    }

    fn apply<H, A>(&mut self, host: &mut H, animator: &mut A, outcome: TickOutcome)
    where
        H: MovementHost + ?Sized,
        A: AnimationHost + ?Sized,
    {
        if let Some(mode) = outcome.next_mode {
            self.set_movement_mode(host, mode);
        }

        if let Some(kind) = outcome.transition {
            self.slot
                .request(kind, &self.climb.config().montages, animator);
        }
    }

    /// Attempt to start climbing, or stop if `attempting` is false.
    ///
    /// A wall ahead wins over an edge to climb down. Returns whether a
    /// transition was started or the climb was stopped.
    pub fn request_climb_toggle<H, A>(
        &mut self,
        host: &mut H,
        animator: &mut A,
        attempting: bool,
    ) -> bool
    where
        H: MovementHost + ?Sized,
        A: AnimationHost + ?Sized,
    {
        if !attempting {
            return self.stop_climbing(host);
        }

        if host.movement_mode().is_climbing() {
            return false;
        }

        let kind = if self.climb.can_start_climbing(host) {
            TransitionKind::IdleToClimb
        } else if self.climb.can_climb_down_ledge(host) {
            TransitionKind::ClimbDownLedge
        } else {
            debug!("Nothing to climb");
            return false;
        };

        self.slot
            .request(kind, &self.climb.config().montages, animator)
    }

    /// Whether a climbable wall is in front of the character
    pub fn can_start_climbing<H: MovementHost + ?Sized>(&mut self, host: &H) -> bool {
        self.climb.can_start_climbing(host)
    }

    /// Whether the character stands at an edge it can climb down over
    pub fn can_climb_down_ledge<H: MovementHost + ?Sized>(&mut self, host: &H) -> bool {
        self.climb.can_climb_down_ledge(host)
    }

    /// Leave the climb: Falling when climbing, otherwise Walking
    pub fn stop_climbing<H: MovementHost + ?Sized>(&mut self, host: &mut H) -> bool {
        let mode = if host.movement_mode().is_climbing() {
            MovementMode::Falling
        } else {
            MovementMode::Walking
        };
        self.set_movement_mode(host, mode)
    }

    /// Finish the transition a montage belonged to
    pub fn handle_transition_ended<H: MovementHost + ?Sized>(
        &mut self,
        host: &mut H,
        ended: &MontageEnded,
    ) {
        let Some(kind) = self.slot.complete(ended) else {
            return;
        };

        debug!(?kind, interrupted = ended.interrupted, "Transition montage ended");

        match kind {
            TransitionKind::IdleToClimb | TransitionKind::ClimbDownLedge => {
                self.set_movement_mode(host, MovementMode::CLIMB);
                host.stop_movement_immediately();
            }
            TransitionKind::ClimbToTop => {
                self.set_movement_mode(host, MovementMode::Walking);
            }
        }
    }

    /// Switch the host's mode and run the enter/exit hooks.
    ///
    /// Returns false if the host refused the change.
    pub fn set_movement_mode<H: MovementHost + ?Sized>(
        &mut self,
        host: &mut H,
        mode: MovementMode,
    ) -> bool {
        let previous = host.movement_mode();
        if previous == mode {
            return true;
        }

        if !host.set_movement_mode(mode) {
            warn!(?previous, requested = ?mode, "Movement host refused mode change");
            return false;
        }

        self.on_movement_mode_changed(host, previous);
        true
    }

    /// The one place capsule size and orientation flags change
    fn on_movement_mode_changed<H: MovementHost + ?Sized>(
        &mut self,
        host: &mut H,
        previous: MovementMode,
    ) {
        let current = host.movement_mode();

        if current.is_climbing() {
            info!(?previous, "Started climbing");
            self.climb.on_enter(host);
        }

        if previous.is_climbing() && !current.is_climbing() {
            info!(?current, "Stopped climbing");
            self.climb.on_exit(host);
        }
    }

    pub fn is_climbing<H: MovementHost + ?Sized>(&self, host: &H) -> bool {
        host.movement_mode().is_climbing()
    }

    /// Velocity in the character's frame, for animation blending
    pub fn climb_velocity<H: MovementHost + ?Sized>(&self, host: &H) -> Vec3 {
        climb_local_velocity(host)
    }

    pub fn climbable_surface_normal(&self) -> Vec3 {
        self.climb.session().average_normal()
    }

    pub fn session(&self) -> &ClimbSession {
        self.climb.session()
    }

    pub fn pending_transition(&self) -> Option<TransitionKind> {
        self.slot.pending()
    }

    pub fn debug_shapes(&self) -> &[DebugShape] {
        self.climb.prober().debug().shapes()
    }

    pub fn set_climb_input(&mut self, input: Vec2) {
        self.climb.set_input(input);
    }

    pub fn max_speed<H: MovementHost + ?Sized>(&self, host: &H) -> f32 {
        if host.movement_mode().is_climbing() {
            self.climb.max_speed(host)
        } else {
            self.base.max_speed(host)
        }
    }

    pub fn max_acceleration<H: MovementHost + ?Sized>(&self, host: &H) -> f32 {
        if host.movement_mode().is_climbing() {
            self.climb.max_acceleration(host)
        } else {
            self.base.max_acceleration(host)
        }
    }
}

impl Default for ClimbController {
    fn default() -> Self {
        Self::new(ClimbConfig::default())
    }
}
