//! Fixed-step simulation clock
//!
//! Frame deltas are clamped, scaled and banked; the movement tick then runs
//! once per whole fixed step in the bank.

use serde::{Deserialize, Serialize};

/// Clock settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TimeConfig {
    /// Simulated seconds per real second
    pub time_scale: f32,
    /// Length of one movement tick in seconds
    pub fixed_timestep: f32,
    /// Frame deltas above this are clamped
    pub max_delta_time: f32,
    /// Steps beyond this in one frame are dropped from the bank
    pub max_steps_per_frame: u32,
}

impl Default for TimeConfig {
    fn default() -> Self {
        Self {
            time_scale: 1.0,
            fixed_timestep: 1.0 / 60.0,
            max_delta_time: 0.25,
            max_steps_per_frame: 8,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct GameTime {
    pub config: TimeConfig,
    /// Simulated seconds since start
    pub total_time: f64,
    /// Scaled, clamped delta of the last frame
    pub delta_time: f32,
    pub frame_count: u64,
    /// Fixed steps handed out so far
    pub step_count: u64,
    banked: f32,
}

impl GameTime {
    pub fn new(config: TimeConfig) -> Self {
        Self {
            config,
            ..Default::default()
        }
    }

    /// Advance by one frame of `raw_delta` real seconds
    pub fn update(&mut self, raw_delta: f32) {
        let clamped = raw_delta.clamp(0.0, self.config.max_delta_time);

        self.delta_time = clamped * self.config.time_scale;
        self.total_time += f64::from(self.delta_time);
        self.banked += self.delta_time;
        self.frame_count += 1;
    }

    /// Take every whole fixed step out of the bank
    pub fn fixed_steps(&mut self) -> u32 {
        let step = self.config.fixed_timestep;
        if step <= 0.0 {
            return 0;
        }

        let whole = (self.banked / step).floor();
        self.banked -= whole * step;

        let steps = (whole as u32).min(self.config.max_steps_per_frame);
        self.step_count += u64::from(steps);
        steps
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_update_counts_frames() {
        let mut time = GameTime::default();
        time.update(0.016);

        assert!(time.delta_time > 0.0);
        assert_eq!(time.frame_count, 1);
    }

    #[test]
    fn test_time_scale_slows_the_clock() {
        let mut time = GameTime::new(TimeConfig {
            time_scale: 0.5,
            ..Default::default()
        });
        time.update(0.1);

        assert!((time.delta_time - 0.05).abs() < 1e-6);
        assert!((time.total_time - 0.05).abs() < 1e-6);
    }

    #[test]
    fn test_fixed_steps_empty_the_bank() {
        let mut time = GameTime::new(TimeConfig {
            fixed_timestep: 0.01,
            ..Default::default()
        });
        time.update(0.035);

        assert_eq!(time.fixed_steps(), 3);
        assert_eq!(time.fixed_steps(), 0);
        assert_eq!(time.step_count, 3);
    }

    #[test]
    fn test_steps_per_frame_are_capped() {
        let mut time = GameTime::new(TimeConfig {
            fixed_timestep: 0.01,
            max_steps_per_frame: 4,
            ..Default::default()
        });
        time.update(0.2);

        assert_eq!(time.fixed_steps(), 4);
        assert_eq!(time.fixed_steps(), 0);
    }

    #[test]
    fn test_large_delta_is_clamped() {
        let mut time = GameTime::default();
        time.update(10.0);
        assert_eq!(time.delta_time, time.config.max_delta_time);
    }
}
