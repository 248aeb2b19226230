//! Ascent Climb - Climbing locomotion mode for a capsule character
//!
//! Provides the climb controller and everything it runs on:
//! - Surface probes and the per-tick climb session
//! - The climb mode tick with ledge, floor and angle termination
//! - Montage-gated transitions into and out of the climb
//! - A rapier-backed movement host and a timer-driven montage player

pub mod animator;
pub mod character;
pub mod config;
pub mod controller;
pub mod debug;
pub mod error;
pub mod host;
pub mod mode;
pub mod montage;
pub mod movement;
pub mod physics_host;
pub mod probe;
pub mod session;

#[cfg(test)]
mod testing;

pub use animator::{MontageClip, MontageLibrary, MontagePlayer, RootMotionSegment};
pub use character::ClimbingCharacter;
pub use config::{ClimbConfig, ClimbDownConfig, FloorConfig, LedgeConfig, ProbeConfig};
pub use controller::ClimbController;
pub use debug::{DebugDraw, DebugShape, DebugShapeKind, DebugTrace};
pub use error::ConfigError;
pub use host::{CustomMode, MovementHost, MovementMode, RootMotion};
pub use mode::{BaseMode, ClimbMode, ModeHandler, TickOutcome};
pub use montage::{
    AnimationHost, MontageEnded, MontageId, TransitionKind, TransitionMontages, TransitionSlot,
};
pub use movement::MovementConfig;
pub use physics_host::{LocomotionState, PhysicsMovementHost};
pub use probe::SurfaceProber;
pub use session::ClimbSession;
