//! Transition montages and the single in-flight transition slot

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::debug;

/// Name of an animation montage known to the animation host
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MontageId(pub String);

impl MontageId {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MontageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Notification that a montage stopped playing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MontageEnded {
    pub montage: MontageId,
    /// True when the animation system cut the montage short
    pub interrupted: bool,
}

/// Plays transition montages and reports when they end
pub trait AnimationHost {
    /// Start a montage; returns false if it is unknown or one is already playing
    fn play(&mut self, montage: &MontageId) -> bool;

    /// Whether any montage is currently playing
    fn is_any_montage_playing(&self) -> bool;

    /// Next montage end (natural or interrupted) not yet consumed
    fn poll_ended(&mut self) -> Option<MontageEnded>;
}

/// The transitions that gate entering and leaving the climb
///
/// Reaching the floor has no transition; it exits the climb directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransitionKind {
    /// Grab a wall from standing
    IdleToClimb,
    /// Step over an edge and grab the wall below it
    ClimbDownLedge,
    /// Pull up over the top of the wall
    ClimbToTop,
}

impl TransitionKind {
    pub const ALL: [TransitionKind; 3] = [
        TransitionKind::IdleToClimb,
        TransitionKind::ClimbDownLedge,
        TransitionKind::ClimbToTop,
    ];
}

/// Montage handle for each transition; `None` disables that transition
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TransitionMontages {
    pub idle_to_climb: Option<MontageId>,
    pub climb_down_ledge: Option<MontageId>,
    pub climb_to_top: Option<MontageId>,
}

impl Default for TransitionMontages {
    fn default() -> Self {
        Self {
            idle_to_climb: Some(MontageId::new("idle_to_climb")),
            climb_down_ledge: Some(MontageId::new("climb_down_ledge")),
            climb_to_top: Some(MontageId::new("climb_to_top")),
        }
    }
}

impl TransitionMontages {
    /// Montage configured for a transition
    pub fn get(&self, kind: TransitionKind) -> Option<&MontageId> {
        match kind {
            TransitionKind::IdleToClimb => self.idle_to_climb.as_ref(),
            TransitionKind::ClimbDownLedge => self.climb_down_ledge.as_ref(),
            TransitionKind::ClimbToTop => self.climb_to_top.as_ref(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct PendingTransition {
    kind: TransitionKind,
    montage: MontageId,
}

/// At most one transition in flight between request and end notification
#[derive(Debug, Default)]
pub struct TransitionSlot {
    pending: Option<PendingTransition>,
}

impl TransitionSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Transition currently waiting for its montage to end
    pub fn pending(&self) -> Option<TransitionKind> {
        self.pending.as_ref().map(|p| p.kind)
    }

    pub fn is_in_flight(&self) -> bool {
        self.pending.is_some()
    }

    /// Ask the animation host to play the montage for `kind`.
    ///
    /// Dropped when a transition is already in flight, when any montage is
    /// playing, when no montage is configured, or when the host refuses.
    pub fn request<A: AnimationHost + ?Sized>(
        &mut self,
        kind: TransitionKind,
        montages: &TransitionMontages,
        animator: &mut A,
    ) -> bool {
        if let Some(pending) = &self.pending {
            debug!(?kind, pending = ?pending.kind, "Transition dropped, another is in flight");
            return false;
        }

        let Some(montage) = montages.get(kind) else {
            debug!(?kind, "Transition dropped, no montage configured");
            return false;
        };

        if animator.is_any_montage_playing() {
            debug!(?kind, "Transition dropped, a montage is already playing");
            return false;
        }

        if !animator.play(montage) {
            debug!(?kind, %montage, "Animation host refused transition montage");
            return false;
        }

        debug!(?kind, %montage, "Transition montage started");
        self.pending = Some(PendingTransition {
            kind,
            montage: montage.clone(),
        });
        true
    }

    /// Resolve a montage end into the pending transition it finishes.
    ///
    /// Ends of any other montage, including one that shares a transition's
    /// name while nothing is pending, leave the slot untouched.
    pub fn complete(&mut self, ended: &MontageEnded) -> Option<TransitionKind> {
        match &self.pending {
            Some(pending) if pending.montage == ended.montage => {
                let kind = pending.kind;
                self.pending = None;
                Some(kind)
            }
            _ => None,
        }
    }
}
