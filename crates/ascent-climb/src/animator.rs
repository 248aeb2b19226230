//! Timer-driven montage player

use std::collections::{HashMap, VecDeque};

use ascent_core::{Quat, Vec3};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::montage::{AnimationHost, MontageEnded, MontageId};

/// Root-motion velocity held from the previous segment's end until `until`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RootMotionSegment {
    /// Seconds into the clip at which this segment ends
    pub until: f32,
    /// Velocity in the character's frame (x right, y up, -z forward)
    pub velocity: Vec3,
}

/// Length and root motion of one montage
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MontageClip {
    /// Playback length in seconds
    pub duration: f32,
    /// Root-motion segments in playback order; empty for in-place clips
    #[serde(default)]
    pub root_motion: Vec<RootMotionSegment>,
}

impl MontageClip {
    /// A clip that plays in place
    pub fn new(duration: f32) -> Self {
        Self {
            duration,
            root_motion: Vec::new(),
        }
    }

    /// Append a segment moving at `velocity` until `until` seconds in
    pub fn then_move(mut self, until: f32, velocity: Vec3) -> Self {
        self.root_motion.push(RootMotionSegment { until, velocity });
        self
    }

    /// Local root-motion velocity `elapsed` seconds into the clip
    pub fn root_motion_at(&self, elapsed: f32) -> Option<Vec3> {
        self.root_motion
            .iter()
            .find(|segment| elapsed < segment.until)
            .map(|segment| segment.velocity)
    }
}

/// Montages the player knows how to play
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MontageLibrary {
    clips: HashMap<MontageId, MontageClip>,
}

impl MontageLibrary {
    pub fn empty() -> Self {
        Self {
            clips: HashMap::new(),
        }
    }

    pub fn insert(&mut self, id: MontageId, clip: MontageClip) {
        self.clips.insert(id, clip);
    }

    pub fn get(&self, id: &MontageId) -> Option<&MontageClip> {
        self.clips.get(id)
    }
}

impl Default for MontageLibrary {
    /// The three climb transitions. Climbing down walks off the edge while
    /// dropping; pulling up rises clear of the lip before moving onto it.
    fn default() -> Self {
        let mut library = Self::empty();
        library.insert(MontageId::new("idle_to_climb"), MontageClip::new(0.5));
        library.insert(
            MontageId::new("climb_down_ledge"),
            MontageClip::new(1.0).then_move(1.0, Vec3::new(0.0, -160.0, -120.0)),
        );
        library.insert(
            MontageId::new("climb_to_top"),
            MontageClip::new(1.2)
                .then_move(0.6, Vec3::new(0.0, 320.0, 0.0))
                .then_move(1.2, Vec3::new(0.0, 0.0, -240.0)),
        );
        library
    }
}

#[derive(Debug, Clone)]
struct ActiveMontage {
    id: MontageId,
    clip: MontageClip,
    elapsed: f32,
}

/// Plays one montage at a time and queues end notifications
#[derive(Debug, Default)]
pub struct MontagePlayer {
    library: MontageLibrary,
    active: Option<ActiveMontage>,
    ended: VecDeque<MontageEnded>,
}

impl MontagePlayer {
    pub fn new(library: MontageLibrary) -> Self {
        Self {
            library,
            active: None,
            ended: VecDeque::new(),
        }
    }

    /// Advance the active montage, ending it once its duration has passed
    pub fn tick(&mut self, dt: f32) {
        let finished = match &mut self.active {
            Some(active) => {
                active.elapsed += dt;
                active.elapsed >= active.clip.duration
            }
            None => false,
        };

        if finished {
            self.end(false);
        }
    }

    /// Cut the active montage short
    pub fn interrupt(&mut self) {
        self.end(true);
    }

    fn end(&mut self, interrupted: bool) {
        if let Some(active) = self.active.take() {
            debug!(montage = %active.id, interrupted, "Montage ended");
            self.ended.push_back(MontageEnded {
                montage: active.id,
                interrupted,
            });
        }
    }

    /// World-space root-motion velocity of the active montage
    pub fn root_motion_velocity(&self, rotation: Quat) -> Option<Vec3> {
        let active = self.active.as_ref()?;
        active
            .clip
            .root_motion_at(active.elapsed)
            .map(|velocity| rotation * velocity)
    }
}

impl AnimationHost for MontagePlayer {
    fn play(&mut self, montage: &MontageId) -> bool {
        if self.active.is_some() {
            return false;
        }

        let Some(clip) = self.library.get(montage) else {
            warn!(%montage, "Unknown montage");
            return false;
        };

        self.active = Some(ActiveMontage {
            id: montage.clone(),
            clip: clip.clone(),
            elapsed: 0.0,
        });
        true
    }

    fn is_any_montage_playing(&self) -> bool {
        self.active.is_some()
    }

    fn poll_ended(&mut self) -> Option<MontageEnded> {
        self.ended.pop_front()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_montage_ends_after_duration() {
        let mut player = MontagePlayer::new(MontageLibrary::default());
        let id = MontageId::new("idle_to_climb");

        assert!(player.play(&id));
        assert!(player.is_any_montage_playing());
        assert!(!player.play(&MontageId::new("climb_to_top")));

        player.tick(0.3);
        assert_eq!(player.poll_ended(), None);

        player.tick(0.3);
        assert!(!player.is_any_montage_playing());
        assert_eq!(
            player.poll_ended(),
            Some(MontageEnded {
                montage: id,
                interrupted: false
            })
        );
        assert_eq!(player.poll_ended(), None);
    }

    #[test]
    fn test_interrupt_reports_interrupted() {
        let mut player = MontagePlayer::new(MontageLibrary::default());
        player.play(&MontageId::new("climb_to_top"));
        player.interrupt();

        let ended = player.poll_ended().unwrap();
        assert!(ended.interrupted);
        assert!(!player.is_any_montage_playing());
    }

    #[test]
    fn test_unknown_montage_is_refused() {
        let mut player = MontagePlayer::new(MontageLibrary::empty());
        assert!(!player.play(&MontageId::new("idle_to_climb")));
        assert!(!player.is_any_montage_playing());
    }

    #[test]
    fn test_root_motion_is_rotated_into_world() {
        let mut player = MontagePlayer::new(MontageLibrary::default());
        assert_eq!(player.root_motion_velocity(Quat::IDENTITY), None);

        player.play(&MontageId::new("climb_down_ledge"));
        let facing_east = Quat::from_rotation_y(-std::f32::consts::FRAC_PI_2);
        let velocity = player.root_motion_velocity(facing_east).unwrap();
        assert!((velocity - Vec3::new(120.0, -160.0, 0.0)).length() < 1e-3);
    }

    #[test]
    fn test_climb_to_top_rises_before_moving_forward() {
        let mut player = MontagePlayer::new(MontageLibrary::default());
        player.play(&MontageId::new("climb_to_top"));

        let rising = player.root_motion_velocity(Quat::IDENTITY).unwrap();
        assert_eq!(rising, Vec3::new(0.0, 320.0, 0.0));

        player.tick(0.7);
        let forward = player.root_motion_velocity(Quat::IDENTITY).unwrap();
        assert_eq!(forward, Vec3::new(0.0, 0.0, -240.0));
    }

    #[test]
    fn test_in_place_clip_has_no_root_motion() {
        let mut player = MontagePlayer::new(MontageLibrary::default());
        player.play(&MontageId::new("idle_to_climb"));
        assert!(player.is_any_montage_playing());
        assert_eq!(player.root_motion_velocity(Quat::IDENTITY), None);
    }
}
