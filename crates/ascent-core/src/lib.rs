//! Ascent Core - Core types and utilities for the Ascent climbing system
//!
//! This crate provides the foundational types used throughout the workspace:
//! - Mathematical primitives (re-exported from glam) and orientation helpers
//! - Transform with the local axis conventions used by every other crate
//! - Fixed-timestep game time
//! - Debug colors

pub mod math;
pub mod time;
pub mod types;

pub use glam::{Quat, Vec2, Vec3};
pub use time::{GameTime, TimeConfig};
pub use types::{Color, Transform};
