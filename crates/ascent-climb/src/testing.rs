//! Scripted movement and animation hosts for unit tests

use std::collections::VecDeque;

use ascent_core::{Quat, Transform, Vec3};
use ascent_physics::{CollisionChannels, MoveHit, SurfaceHit};

use crate::host::{MovementHost, MovementMode, RootMotion};
use crate::montage::{AnimationHost, MontageEnded, MontageId};

/// A blocking hit at `point` facing `normal`
pub fn blocking_hit(point: Vec3, normal: Vec3) -> SurfaceHit {
    SurfaceHit {
        impact_point: point,
        impact_normal: normal,
        blocking: true,
        trace_start: point,
        trace_end: point,
        time: 0.0,
        collider: None,
    }
}

/// Axis-aligned box answering line traces
#[derive(Debug, Clone, Copy)]
pub struct TestBox {
    pub min: Vec3,
    pub max: Vec3,
}

impl TestBox {
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    /// Slab test; returns the entry time along `start..end` and the face normal
    fn ray(&self, start: Vec3, end: Vec3) -> Option<(f32, Vec3)> {
        let dir = end - start;
        let mut t_enter = 0.0_f32;
        let mut t_exit = 1.0_f32;
        let mut normal = -dir.normalize_or_zero();

        for axis in 0..3 {
            let (s, d, lo, hi) = (start[axis], dir[axis], self.min[axis], self.max[axis]);
            if d.abs() < 1e-8 {
                if s < lo || s > hi {
                    return None;
                }
                continue;
            }

            let (mut t0, mut t1) = ((lo - s) / d, (hi - s) / d);
            let mut face = Vec3::ZERO;
            face[axis] = -d.signum();
            if t0 > t1 {
                std::mem::swap(&mut t0, &mut t1);
            }

            if t0 > t_enter {
                t_enter = t0;
                normal = face;
            }
            t_exit = t_exit.min(t1);
            if t_enter > t_exit {
                return None;
            }
        }

        Some((t_enter, normal))
    }
}

/// Movement host over a handful of boxes and canned sweep results.
///
/// Capsule sweeps heading downward return `floor_hits`, every other sweep
/// returns `wall_hits`; both get the sweep's start and end stamped on.
/// `safe_move` treats the character as a sphere of `radius` against the
/// boxes unless `block_next_move` scripts the result.
#[derive(Debug)]
pub struct TestHost {
    pub transform: Transform,
    pub velocity: Vec3,
    pub mode: MovementMode,
    pub half_height: f32,
    pub eye_height: f32,
    pub radius: f32,
    pub orient_rotation_to_movement: bool,
    pub boxes: Vec<TestBox>,
    pub wall_hits: Vec<SurfaceHit>,
    pub floor_hits: Vec<SurfaceHit>,
    pub root_motion: RootMotion,
    pub deny_mode_changes: bool,
    pub block_next_move: Option<MoveHit>,
    pub base_result: Option<MovementMode>,
    pub moves: Vec<Vec3>,
    pub impacts: usize,
    pub slides: usize,
    pub base_ticks: usize,
}

impl Default for TestHost {
    fn default() -> Self {
        Self {
            transform: Transform::from_position(Vec3::new(0.0, 96.0, 0.0)),
            velocity: Vec3::ZERO,
            mode: MovementMode::Walking,
            half_height: 96.0,
            eye_height: 64.0,
            radius: 42.0,
            orient_rotation_to_movement: true,
            boxes: Vec::new(),
            wall_hits: Vec::new(),
            floor_hits: Vec::new(),
            root_motion: RootMotion::None,
            deny_mode_changes: false,
            block_next_move: None,
            base_result: None,
            moves: Vec::new(),
            impacts: 0,
            slides: 0,
            base_ticks: 0,
        }
    }
}

impl TestHost {
    /// Character at the origin facing a wall whose face is at z = -80,
    /// 400 units tall
    pub fn facing_wall() -> Self {
        let mut host = Self::default();
        host.boxes.push(TestBox::new(
            Vec3::new(-500.0, 0.0, -300.0),
            Vec3::new(500.0, 400.0, -80.0),
        ));
        host.wall_hits = vec![
            blocking_hit(Vec3::new(0.0, 60.0, -80.0), Vec3::Z),
            blocking_hit(Vec3::new(0.0, 132.0, -80.0), Vec3::Z),
        ];
        host
    }

    fn closest_box_hit(&self, start: Vec3, end: Vec3) -> Option<(f32, Vec3)> {
        self.boxes
            .iter()
            .filter_map(|b| b.ray(start, end))
            .min_by(|a, b| a.0.total_cmp(&b.0))
    }

    fn stamp(hits: &[SurfaceHit], start: Vec3, end: Vec3) -> Vec<SurfaceHit> {
        hits.iter()
            .map(|hit| SurfaceHit {
                trace_start: start,
                trace_end: end,
                ..*hit
            })
            .collect()
    }
}

impl MovementHost for TestHost {
    fn line_trace(&self, start: Vec3, end: Vec3, _channels: CollisionChannels) -> SurfaceHit {
        match self.closest_box_hit(start, end) {
            Some((time, normal)) => SurfaceHit {
                impact_point: start.lerp(end, time),
                impact_normal: normal,
                blocking: true,
                trace_start: start,
                trace_end: end,
                time,
                collider: None,
            },
            None => SurfaceHit::miss(start, end),
        }
    }

    fn sweep_capsule(
        &self,
        start: Vec3,
        end: Vec3,
        _radius: f32,
        _half_height: f32,
        _channels: CollisionChannels,
    ) -> Vec<SurfaceHit> {
        let dir = (end - start).normalize_or_zero();
        if dir.y < -0.5 {
            Self::stamp(&self.floor_hits, start, end)
        } else {
            Self::stamp(&self.wall_hits, start, end)
        }
    }

    fn location(&self) -> Vec3 {
        self.transform.position
    }

    fn rotation(&self) -> Quat {
        self.transform.rotation
    }

    fn set_rotation(&mut self, rotation: Quat) {
        self.transform.rotation = rotation;
    }

    fn velocity(&self) -> Vec3 {
        self.velocity
    }

    fn set_velocity(&mut self, velocity: Vec3) {
        self.velocity = velocity;
    }

    fn eye_height(&self) -> f32 {
        self.eye_height
    }

    fn capsule_half_height(&self) -> f32 {
        self.half_height
    }

    fn set_capsule_half_height(&mut self, half_height: f32) {
        self.half_height = half_height;
    }

    fn set_orient_rotation_to_movement(&mut self, enabled: bool) {
        self.orient_rotation_to_movement = enabled;
    }

    fn movement_mode(&self) -> MovementMode {
        self.mode
    }

    fn set_movement_mode(&mut self, mode: MovementMode) -> bool {
        if self.deny_mode_changes {
            return false;
        }
        self.mode = mode;
        true
    }

    fn safe_move(&mut self, delta: Vec3, rotation: Quat) -> MoveHit {
        self.transform.rotation = rotation;
        self.moves.push(delta);

        if let Some(hit) = self.block_next_move.take() {
            self.transform.position += delta * hit.time;
            return hit;
        }

        let length = delta.length();
        if length <= 1e-6 {
            return MoveHit::NONE;
        }

        let start = self.transform.position;
        let dir = delta / length;
        let reach = start + dir * (length + self.radius);
        match self.closest_box_hit(start, reach) {
            Some((time, normal)) => {
                let travel = ((length + self.radius) * time - self.radius).max(0.0);
                self.transform.position += dir * travel;
                MoveHit {
                    time: travel / length,
                    point: start.lerp(reach, time),
                    normal,
                    blocking: true,
                }
            }
            None => {
                self.transform.position += delta;
                MoveHit::NONE
            }
        }
    }

    fn handle_impact(&mut self, _hit: &MoveHit, _dt: f32, _delta: Vec3) {
        self.impacts += 1;
    }

    fn slide_along_surface(&mut self, delta: Vec3, remaining: f32, normal: Vec3) -> f32 {
        self.slides += 1;
        let leftover = delta * remaining;
        self.transform.position += leftover - normal * leftover.dot(normal);
        1.0
    }

    fn root_motion(&self) -> RootMotion {
        self.root_motion
    }

    fn max_speed(&self) -> f32 {
        600.0
    }

    fn max_acceleration(&self) -> f32 {
        2048.0
    }

    fn tick_base_mode(&mut self, _mode: MovementMode, _dt: f32) -> Option<MovementMode> {
        self.base_ticks += 1;
        self.base_result
    }
}

/// Animation host that plays montages until told to finish them
#[derive(Debug, Default)]
pub struct TestAnimator {
    pub played: Vec<MontageId>,
    pub playing: Option<MontageId>,
    pub ended: VecDeque<MontageEnded>,
    pub refuse: bool,
}

impl TestAnimator {
    /// End the playing montage and hand back its notification
    pub fn finish(&mut self, interrupted: bool) -> Option<MontageEnded> {
        let montage = self.playing.take()?;
        Some(MontageEnded {
            montage,
            interrupted,
        })
    }

    /// End the playing montage and queue its notification for polling
    pub fn finish_queued(&mut self, interrupted: bool) {
        if let Some(ended) = self.finish(interrupted) {
            self.ended.push_back(ended);
        }
    }
}

impl AnimationHost for TestAnimator {
    fn play(&mut self, montage: &MontageId) -> bool {
        if self.refuse || self.playing.is_some() {
            return false;
        }
        self.played.push(montage.clone());
        self.playing = Some(montage.clone());
        true
    }

    fn is_any_montage_playing(&self) -> bool {
        self.playing.is_some()
    }

    fn poll_ended(&mut self) -> Option<MontageEnded> {
        self.ended.pop_front()
    }
}
