//! Ascent - Headless climbing sandbox
//!
//! Builds a small rapier scene (ground and one climbable wall), then drives a
//! character through walking up to the wall, grabbing it, climbing and
//! pulling up over the top, logging each phase.

mod settings;

use anyhow::{Context, Result};
use ascent_climb::{ClimbingCharacter, MovementMode};
use ascent_core::{GameTime, Vec2, Vec3};
use ascent_physics::{CollisionChannels, PhysicsWorld};
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use settings::GameSettings;

/// Wall face position along -Z
const WALL_FACE_Z: f32 = -300.0;
/// Wall height
const WALL_HEIGHT: f32 = 300.0;
/// Give up on the scenario after this many seconds
const SCENARIO_TIMEOUT: f64 = 30.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Approach,
    Grab,
    Climb,
    Done,
}

fn build_scene() -> PhysicsWorld {
    let channels = CollisionChannels::WORLD_STATIC | CollisionChannels::CLIMBABLE;
    let mut physics = PhysicsWorld::new();
    physics.create_ground(0.0, channels);
    physics.create_static_box(
        Vec3::new(500.0, WALL_HEIGHT * 0.5, 300.0),
        Vec3::new(0.0, WALL_HEIGHT * 0.5, WALL_FACE_Z - 300.0),
        channels,
    );
    physics.update_query_pipeline();
    physics
}

fn main() -> Result<()> {
    // Initialize logging
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber).context("Failed to set subscriber")?;

    info!("Starting Ascent climbing sandbox...");

    let settings = GameSettings::load();
    if std::env::args().any(|arg| arg == "--write-settings") {
        settings.save().context("Failed to save settings")?;
    }

    let mut physics = build_scene();
    let mut character = ClimbingCharacter::new(settings.climb.clone(), settings.movement.clone())
        .with_library(settings.montages.clone());
    character.spawn(&mut physics, Vec3::new(0.0, character.body.config.half_height + 1.0, 0.0));

    let mut game_time = GameTime::new(settings.time.clone());
    let frame_delta = game_time.config.fixed_timestep;
    let mut phase = Phase::Approach;

    while phase != Phase::Done {
        if game_time.total_time > SCENARIO_TIMEOUT {
            warn!(?phase, position = ?character.position(), "Scenario timed out");
            anyhow::bail!("climbing scenario did not finish in {SCENARIO_TIMEOUT} seconds");
        }

        game_time.update(frame_delta);

        for _ in 0..game_time.fixed_steps() {
            character.fixed_update(&mut physics, game_time.config.fixed_timestep);
        }

        phase = match phase {
            Phase::Approach => {
                character.set_move_input(Vec2::new(0.0, 1.0), 0.0);
                let reach = WALL_FACE_Z + character.body.config.radius + 30.0;
                if character.position().z <= reach {
                    character.set_move_input(Vec2::ZERO, 0.0);
                    if character.request_climb_toggle(&mut physics, true) {
                        info!(position = ?character.position(), "Reached the wall, grabbing on");
                        Phase::Grab
                    } else {
                        Phase::Approach
                    }
                } else {
                    Phase::Approach
                }
            }
            Phase::Grab => {
                if character.is_climbing() {
                    info!("Climbing");
                    character.set_move_input(Vec2::new(0.0, 1.0), 0.0);
                    Phase::Climb
                } else {
                    Phase::Grab
                }
            }
            Phase::Climb => {
                let position = character.position();
                let on_top = character.state().mode == MovementMode::Walking
                    && character.body.is_grounded()
                    && character.controller.pending_transition().is_none()
                    && position.z < WALL_FACE_Z
                    && position.y > WALL_HEIGHT + character.body.half_height() * 0.5;
                if on_top {
                    character.set_move_input(Vec2::ZERO, 0.0);
                    info!(?position, "Pulled up over the top");
                    Phase::Done
                } else {
                    Phase::Climb
                }
            }
            Phase::Done => Phase::Done,
        };
    }

    info!(
        seconds = game_time.total_time,
        frames = game_time.frame_count,
        "Scenario finished"
    );
    Ok(())
}
