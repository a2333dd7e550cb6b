//! Trauma-driven camera shake.
//!
//! Trauma is a scalar in `[0, 1]`. Events raise it, time decays it linearly,
//! and while it is positive three decorrelated Perlin channels produce an
//! offset scaled by `trauma ^ exponent`. When trauma reaches zero the offset is
//! exactly zero, so the camera settles on its base pose with no residual drift.

use bevy::prelude::*;
use fastnoise_lite::{FastNoiseLite, NoiseType};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::camera_rig::{CameraRig, ShakeOffset};

/// Trauma at or below this is treated as fully decayed.
const TRAUMA_EPSILON: f64 = 1e-6;

/// Residue below this fraction of one tick's decay is rounding, not trauma.
const STEP_SNAP_FRACTION: f64 = 1e-3;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShakeConfig {
    /// World units at full intensity, per axis.
    pub max_offset: Vec2,
    pub max_rotation_deg: f32,
    /// Noise samples per second.
    pub frequency: f32,
    /// Trauma lost per second.
    pub decay: f32,
    /// Intensity = trauma ^ exponent.
    pub exponent: f32,
    /// How long a one-shot's custom decay rate stays in effect.
    pub one_shot_window_secs: f32,
    pub noise_seed: u64,
}

impl Default for ShakeConfig {
    fn default() -> Self {
        Self {
            max_offset: Vec2::new(0.25, 0.25),
            max_rotation_deg: 3.0,
            frequency: 25.0,
            decay: 1.5,
            exponent: 2.0,
            one_shot_window_secs: 0.25,
            noise_seed: 42,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct DecayOverride {
    rate: f32,
    remaining: f32,
}

#[derive(Resource)]
pub struct TraumaShaker {
    config: ShakeConfig,
    /// Kept in f64 so `1 / decay` seconds of ticks lands on zero at any frame rate.
    trauma: f64,
    base_decay: f32,
    overrides: Vec<DecayOverride>,
    noise_time: f32,
    channel_offsets: [f32; 3],
    noise: FastNoiseLite,
    offset: ShakeOffset,
}

impl Default for TraumaShaker {
    fn default() -> Self {
        Self::from_config(&ShakeConfig::default())
    }
}

impl TraumaShaker {
    pub fn from_config(config: &ShakeConfig) -> Self {
        let mut rng = ChaCha8Rng::seed_from_u64(config.noise_seed);
        let base: f32 = rng.gen::<f32>() * 1000.0;

        let mut noise = FastNoiseLite::with_seed(config.noise_seed as i32);
        noise.set_noise_type(Some(NoiseType::Perlin));
        noise.set_frequency(Some(1.0));

        Self {
            config: config.clone(),
            trauma: 0.0,
            base_decay: config.decay.max(0.0),
            overrides: Vec::new(),
            noise_time: 0.0,
            channel_offsets: [base, base + 111.1, base + 222.2],
            noise,
            offset: ShakeOffset::ZERO,
        }
    }

    pub fn trauma(&self) -> f32 {
        self.trauma as f32
    }

    pub fn offset(&self) -> ShakeOffset {
        self.offset
    }

    pub fn base_decay_rate(&self) -> f32 {
        self.base_decay
    }

    /// Decay rate currently in effect: the newest live override, else the base.
    pub fn effective_decay_rate(&self) -> f32 {
        self.overrides
            .last()
            .map(|o| o.rate)
            .unwrap_or(self.base_decay)
    }

    pub fn add_trauma(&mut self, amount: f32) {
        self.trauma = (self.trauma + f64::from(amount.max(0.0))).clamp(0.0, 1.0);
    }

    pub fn set_decay_rate(&mut self, rate: f32) {
        self.base_decay = rate.max(0.0);
    }

    /// Add trauma, optionally decaying at `custom_decay` for a short window.
    /// Overlapping windows do not disturb the base rate; the newest one wins
    /// until it expires.
    pub fn shake_one_shot(&mut self, intensity: f32, custom_decay: Option<f32>) {
        if let Some(rate) = custom_decay {
            self.overrides.push(DecayOverride {
                rate: rate.max(0.0),
                remaining: self.config.one_shot_window_secs.max(0.0),
            });
        }
        self.add_trauma(intensity);
    }

    /// Noise channel `channel` at the current noise time, mapped to `[-1, 1]`.
    fn sample(&self, channel: usize) -> f32 {
        let raw = self
            .noise
            .get_noise_2d(self.noise_time, self.channel_offsets[channel]);
        let normalized = ((raw + 1.0) * 0.5).clamp(0.0, 1.0);
        normalized * 2.0 - 1.0
    }

    pub fn tick(&mut self, dt: f32) -> ShakeOffset {
        let dt = dt.max(0.0);

        for o in &mut self.overrides {
            o.remaining -= dt;
        }
        self.overrides.retain(|o| o.remaining > 0.0);

        if self.trauma <= 0.0 {
            self.offset = ShakeOffset::ZERO;
            return self.offset;
        }

        self.noise_time += dt * self.config.frequency;
        let intensity = (self.trauma as f32).powf(self.config.exponent);
        self.offset = ShakeOffset {
            translation: Vec2::new(
                self.sample(0) * self.config.max_offset.x * intensity,
                self.sample(1) * self.config.max_offset.y * intensity,
            ),
            rotation_z: (self.sample(2) * self.config.max_rotation_deg * intensity).to_radians(),
        };

        let step = f64::from(self.effective_decay_rate()) * f64::from(dt);
        self.trauma = (self.trauma - step).max(0.0);
        if self.trauma <= TRAUMA_EPSILON.max(step * STEP_SNAP_FRACTION) {
            self.trauma = 0.0;
            self.offset = ShakeOffset::ZERO;
        }
        self.offset
    }
}

pub fn apply_trauma_shake(
    time: Res<Time>,
    mut shaker: ResMut<TraumaShaker>,
    mut rig: ResMut<CameraRig>,
) {
    if rig.is_disabled() {
        return;
    }
    rig.shake = shaker.tick(time.delta_secs());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_trauma_clamps() {
        let mut shaker = TraumaShaker::default();
        shaker.add_trauma(0.7);
        shaker.add_trauma(0.7);
        assert_eq!(shaker.trauma(), 1.0);
        shaker.add_trauma(-5.0);
        assert_eq!(shaker.trauma(), 1.0);
    }

    #[test]
    fn test_trauma_reaches_exact_zero_with_zero_offset() {
        let mut shaker = TraumaShaker::default();
        shaker.add_trauma(1.0);
        let mut saw_offset = false;
        for _ in 0..200 {
            let o = shaker.tick(1.0 / 60.0);
            if o != ShakeOffset::ZERO {
                saw_offset = true;
            }
        }
        assert!(saw_offset);
        assert_eq!(shaker.trauma(), 0.0);
        assert_eq!(shaker.offset(), ShakeOffset::ZERO);
    }

    #[test]
    fn test_full_trauma_settles_after_one_over_decay_at_any_frame_rate() {
        for ticks in [1u32, 7, 30, 60, 144, 240, 1000] {
            let mut shaker = TraumaShaker::default();
            shaker.add_trauma(1.0);
            let dt = (1.0 / shaker.base_decay_rate()) / ticks as f32;
            let mut last = ShakeOffset::ZERO;
            for _ in 0..ticks {
                last = shaker.tick(dt);
            }
            assert_eq!(shaker.trauma(), 0.0, "{ticks} ticks");
            assert_eq!(last, ShakeOffset::ZERO, "{ticks} ticks");
            assert_eq!(shaker.offset(), ShakeOffset::ZERO, "{ticks} ticks");
        }
    }

    #[test]
    fn test_trauma_still_live_one_tick_early() {
        let mut shaker = TraumaShaker::default();
        shaker.add_trauma(1.0);
        let dt = (1.0 / shaker.base_decay_rate()) / 144.0;
        for _ in 0..143 {
            shaker.tick(dt);
        }
        assert!(shaker.trauma() > 0.0);
    }

    #[test]
    fn test_offset_bounded_by_config() {
        let config = ShakeConfig::default();
        let mut shaker = TraumaShaker::from_config(&config);
        shaker.add_trauma(1.0);
        for _ in 0..30 {
            let o = shaker.tick(1.0 / 60.0);
            assert!(o.translation.x.abs() <= config.max_offset.x + 1e-6);
            assert!(o.translation.y.abs() <= config.max_offset.y + 1e-6);
            assert!(o.rotation_z.abs() <= config.max_rotation_deg.to_radians() + 1e-6);
        }
    }

    #[test]
    fn test_no_trauma_is_still() {
        let mut shaker = TraumaShaker::default();
        for _ in 0..10 {
            assert_eq!(shaker.tick(0.1), ShakeOffset::ZERO);
        }
    }

    #[test]
    fn test_linear_decay() {
        let mut shaker = TraumaShaker::default();
        shaker.add_trauma(1.0);
        shaker.tick(0.2);
        assert!((shaker.trauma() - 0.7).abs() < 1e-5);
    }

    #[test]
    fn test_one_shot_override_expires_to_base() {
        let mut shaker = TraumaShaker::default();
        shaker.shake_one_shot(0.5, Some(0.1));
        assert_eq!(shaker.effective_decay_rate(), 0.1);
        shaker.tick(0.3);
        assert_eq!(shaker.effective_decay_rate(), 1.5);
    }

    #[test]
    fn test_overlapping_one_shots_keep_base_rate() {
        let mut shaker = TraumaShaker::default();
        shaker.shake_one_shot(0.2, Some(0.5));
        shaker.tick(0.1);
        shaker.shake_one_shot(0.2, Some(4.0));
        assert_eq!(shaker.effective_decay_rate(), 4.0);
        for _ in 0..10 {
            shaker.tick(0.1);
        }
        assert_eq!(shaker.base_decay_rate(), 1.5);
        assert_eq!(shaker.effective_decay_rate(), 1.5);
    }

    #[test]
    fn test_set_decay_rate_changes_base() {
        let mut shaker = TraumaShaker::default();
        shaker.set_decay_rate(0.5);
        shaker.add_trauma(1.0);
        shaker.tick(1.0);
        assert!((shaker.trauma() - 0.5).abs() < 1e-5);
    }

    #[test]
    fn test_same_seed_same_motion() {
        let mut a = TraumaShaker::default();
        let mut b = TraumaShaker::default();
        a.add_trauma(0.8);
        b.add_trauma(0.8);
        for _ in 0..5 {
            assert_eq!(a.tick(0.016), b.tick(0.016));
        }
    }
}
