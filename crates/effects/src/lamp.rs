//! Local light sources that flicker or pulse on their own.
//!
//! A [`Lamp`] only produces an intensity; the rendering crate decides how that
//! shows (glow sprite alpha in the demo). Randomness comes from a per-lamp
//! `ChaCha8Rng`, so a lamp built with the same seed always flickers the same
//! way.

use std::f32::consts::TAU;

use bevy::prelude::*;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Floor for pulse frequency after jitter, in Hz.
const MIN_PULSE_FREQUENCY: f32 = 1e-4;

/// Floor for the flicker interval so a zero setting cannot spin.
const MIN_FLICKER_INTERVAL: f32 = 1e-3;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LampMode {
    /// Constant at the base intensity.
    Steady,
    /// Jump to a random intensity in `[min, max]` every `interval` seconds.
    Flicker { min: f32, max: f32, interval: f32 },
    /// Sine wave around the base intensity.
    Pulse(PulseSettings),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PulseSettings {
    pub amplitude: f32,
    /// Cycles per second.
    pub frequency: f32,
    /// Radians.
    pub phase: f32,
    /// Amplitude varies by up to this much either way.
    pub amplitude_jitter: f32,
    /// Frequency varies by up to this much either way.
    pub frequency_jitter: f32,
    /// Seconds between jitter draws; 0 draws once.
    pub jitter_reseed_secs: f32,
}

impl Default for PulseSettings {
    fn default() -> Self {
        Self {
            amplitude: 0.2,
            frequency: 0.5,
            phase: 0.0,
            amplitude_jitter: 0.0,
            frequency_jitter: 0.0,
            jitter_reseed_secs: 0.0,
        }
    }
}

#[derive(Component, Debug, Clone)]
pub struct Lamp {
    pub base_intensity: f32,
    mode: LampMode,
    intensity: f32,
    /// Current flicker draw.
    level: f32,
    elapsed: f32,
    /// Time until the next flicker draw or jitter reseed.
    countdown: f32,
    amplitude_jitter: f32,
    frequency_jitter: f32,
    rng: ChaCha8Rng,
}

impl Lamp {
    pub fn new(base_intensity: f32, mode: LampMode, seed: u64) -> Self {
        let mut lamp = Self {
            base_intensity,
            mode,
            intensity: base_intensity.max(0.0),
            level: base_intensity,
            elapsed: 0.0,
            countdown: 0.0,
            amplitude_jitter: 0.0,
            frequency_jitter: 0.0,
            rng: ChaCha8Rng::seed_from_u64(seed),
        };
        lamp.redraw();
        lamp.intensity = lamp.sample();
        lamp
    }

    pub fn steady(intensity: f32) -> Self {
        Self::new(intensity, LampMode::Steady, 0)
    }

    pub fn flicker(min: f32, max: f32, interval: f32, seed: u64) -> Self {
        Self::new(max, LampMode::Flicker { min, max, interval }, seed)
    }

    pub fn pulse(base_intensity: f32, settings: PulseSettings, seed: u64) -> Self {
        Self::new(base_intensity, LampMode::Pulse(settings), seed)
    }

    pub fn mode(&self) -> LampMode {
        self.mode
    }

    pub fn intensity(&self) -> f32 {
        self.intensity
    }

    pub fn tick(&mut self, dt: f32) {
        let dt = dt.max(0.0);
        self.elapsed += dt;
        self.countdown -= dt;
        if self.countdown <= 0.0 {
            self.redraw();
        }
        self.intensity = self.sample();
    }

    /// Draw fresh randomness for the current mode and restart the countdown.
    fn redraw(&mut self) {
        match self.mode {
            LampMode::Steady => self.countdown = f32::INFINITY,
            LampMode::Flicker { min, max, interval } => {
                let (lo, hi) = if min <= max { (min, max) } else { (max, min) };
                self.level = lo + (hi - lo) * self.rng.gen::<f32>();
                self.countdown = interval.max(MIN_FLICKER_INTERVAL);
            }
            LampMode::Pulse(pulse) => {
                self.amplitude_jitter = symmetric(&mut self.rng, pulse.amplitude_jitter);
                self.frequency_jitter = symmetric(&mut self.rng, pulse.frequency_jitter);
                self.countdown = if pulse.jitter_reseed_secs > 0.0 {
                    pulse.jitter_reseed_secs
                } else {
                    f32::INFINITY
                };
            }
        }
    }

    fn sample(&self) -> f32 {
        let value = match self.mode {
            LampMode::Steady => self.base_intensity,
            LampMode::Flicker { .. } => self.level,
            LampMode::Pulse(pulse) => {
                let amplitude = pulse.amplitude + self.amplitude_jitter;
                let frequency = (pulse.frequency + self.frequency_jitter).max(MIN_PULSE_FREQUENCY);
                self.base_intensity + (self.elapsed * frequency * TAU + pulse.phase).sin() * amplitude
            }
        };
        value.max(0.0)
    }
}

/// Uniform in `[-range, range]`; 0 when `range` is not positive.
fn symmetric(rng: &mut ChaCha8Rng, range: f32) -> f32 {
    if range <= 0.0 {
        return 0.0;
    }
    (rng.gen::<f32>() * 2.0 - 1.0) * range
}

pub fn tick_lamps(time: Res<Time>, mut lamps: Query<&mut Lamp>) {
    let dt = time.delta_secs();
    for mut lamp in &mut lamps {
        lamp.tick(dt);
    }
}
