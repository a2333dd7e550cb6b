//! Normalized time-of-day clock with an optional "stop at night" lock.
//!
//! The clock owns `time01` in `[0, 1]`. When `stop_at_night` is enabled and time
//! crosses `night_lock_time01` from below, it snaps exactly onto the threshold,
//! enters the locked state and emits a single [`NightReached`] event. Further lock
//! evaluations while locked never emit again; only [`PhaseClock::unlock`] starts a
//! new lock episode.
//!
//! The clock state persists across sessions via the `Saveable` trait.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::Saveable;

/// Lower bound for `seconds_per_full_day` so the advance rate stays finite.
const MIN_SECONDS_PER_DAY: f32 = 1e-4;

/// Advancing to within this of the night threshold counts as reaching it.
const LOCK_EPSILON: f64 = 1e-6;

// =============================================================================
// Configuration
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClockConfig {
    /// Starting normalized time.
    pub start_time01: f32,
    /// Advance automatically every tick.
    pub auto_advance: bool,
    /// Real seconds for a full 0..1 day at `time_scale = 1`.
    pub seconds_per_full_day: f32,
    /// Progression multiplier (2 = twice as fast).
    pub time_scale: f32,
    /// Lock once `night_lock_time01` is reached instead of running to 1.0.
    pub stop_at_night: bool,
    /// Where to lock. 0.75 is the start of the Night phase.
    pub night_lock_time01: f32,
}

impl Default for ClockConfig {
    fn default() -> Self {
        Self {
            start_time01: 0.0,
            auto_advance: true,
            seconds_per_full_day: 300.0,
            time_scale: 1.0,
            stop_at_night: true,
            night_lock_time01: 0.75,
        }
    }
}

// =============================================================================
// Event
// =============================================================================

/// Fired once per lock episode when the clock first locks at night.
#[derive(Event, Debug, Clone, Copy, PartialEq)]
pub struct NightReached {
    pub time01: f32,
}

// =============================================================================
// Resource
// =============================================================================

#[derive(Resource, Debug, Clone)]
pub struct PhaseClock {
    /// Accumulated in f64 so many small frame deltas sum to the same time as
    /// one large one.
    time01: f64,
    auto_advance: bool,
    seconds_per_full_day: f32,
    time_scale: f32,
    stop_at_night: bool,
    night_lock_time01: f32,
    locked: bool,
    night_notified: bool,
}

impl Default for PhaseClock {
    fn default() -> Self {
        Self::from_config(&ClockConfig::default())
    }
}

impl PhaseClock {
    pub fn from_config(config: &ClockConfig) -> Self {
        let mut clock = Self {
            time01: f64::from(config.start_time01.clamp(0.0, 1.0)),
            auto_advance: config.auto_advance,
            seconds_per_full_day: config.seconds_per_full_day,
            time_scale: config.time_scale,
            stop_at_night: config.stop_at_night,
            night_lock_time01: config.night_lock_time01.clamp(0.0, 1.0),
            locked: false,
            night_notified: false,
        };
        // A clock configured to start past the threshold begins locked, but
        // construction is not a crossing so nothing is announced.
        if clock.stop_at_night && clock.time01 >= clock.lock01() {
            clock.time01 = clock.lock01();
            clock.locked = true;
            clock.night_notified = true;
        }
        clock
    }

    pub fn time01(&self) -> f32 {
        self.time01 as f32
    }

    pub fn is_locked(&self) -> bool {
        self.locked
    }

    pub fn auto_advance(&self) -> bool {
        self.auto_advance
    }

    pub fn time_scale(&self) -> f32 {
        self.time_scale
    }

    pub fn stop_at_night(&self) -> bool {
        self.stop_at_night
    }

    pub fn night_lock_time01(&self) -> f32 {
        self.night_lock_time01
    }

    /// Time expressed in hours on a 24h dial.
    pub fn hours(&self) -> f32 {
        self.time01() * 24.0
    }

    /// Advance by one tick of real time.
    ///
    /// Returns `Some(NightReached)` on the tick the clock locks at night.
    pub fn advance(&mut self, delta_seconds: f32) -> Option<NightReached> {
        if !self.auto_advance || self.locked {
            return self.evaluate_lock();
        }

        let rate = f64::from(self.time_scale)
            / f64::from(self.seconds_per_full_day.max(MIN_SECONDS_PER_DAY));
        let before = self.time01;
        self.time01 = (self.time01 + f64::from(delta_seconds.max(0.0)) * rate).clamp(0.0, 1.0);

        let lock = self.lock01();
        if self.stop_at_night && before < lock && self.time01 >= lock - LOCK_EPSILON {
            self.time01 = lock;
            return self.lock_internal();
        }
        None
    }

    /// Set normalized time.
    ///
    /// Clamps to `[0, 1]`; unless `force_past_lock` is set, also clamps to the
    /// night threshold when `stop_at_night` is on.
    pub fn set_time(&mut self, time01: f32, force_past_lock: bool) -> Option<NightReached> {
        let mut clamped = time01.clamp(0.0, 1.0);
        if self.stop_at_night && !force_past_lock {
            clamped = clamped.min(self.night_lock_time01);
        }
        self.time01 = f64::from(clamped);

        if !self.stop_at_night {
            self.locked = false;
            self.night_notified = false;
            return None;
        }
        if self.time01 >= self.lock01() {
            return self.lock_internal();
        }
        self.locked = false;
        None
    }

    pub fn add_time(&mut self, delta01: f32, force_past_lock: bool) -> Option<NightReached> {
        self.set_time(self.time01() + delta01, force_past_lock)
    }

    /// Set time from a 24h dial (`hours / 24`).
    pub fn set_hours(&mut self, hours: f32, force_past_lock: bool) -> Option<NightReached> {
        self.set_time(hours / 24.0, force_past_lock)
    }

    /// Jump to the night threshold and lock immediately.
    pub fn lock_now(&mut self) -> Option<NightReached> {
        self.time01 = self.lock01();
        self.lock_internal()
    }

    /// Leave the locked state and re-arm the night notification.
    pub fn unlock(&mut self) {
        self.locked = false;
        self.night_notified = false;
    }

    pub fn set_auto_advance(&mut self, enabled: bool) {
        self.auto_advance = enabled;
    }

    pub fn set_time_scale(&mut self, scale: f32) {
        self.time_scale = scale.max(0.0);
    }

    /// Keep the lock state consistent with the current time without moving it.
    fn evaluate_lock(&mut self) -> Option<NightReached> {
        if !self.stop_at_night {
            self.locked = false;
            self.night_notified = false;
            return None;
        }
        if self.locked {
            return None;
        }
        if self.time01 >= self.lock01() {
            self.time01 = self.lock01();
            return self.lock_internal();
        }
        None
    }

    fn lock01(&self) -> f64 {
        f64::from(self.night_lock_time01)
    }

    fn lock_internal(&mut self) -> Option<NightReached> {
        self.locked = true;
        if self.night_notified {
            return None;
        }
        self.night_notified = true;
        Some(NightReached {
            time01: self.time01(),
        })
    }
}

// =============================================================================
// Saveable
// =============================================================================

#[derive(bitcode::Encode, bitcode::Decode)]
struct ClockSnapshot {
    time01: f64,
    auto_advance: bool,
    time_scale: f32,
    locked: bool,
    night_notified: bool,
}

impl Saveable for PhaseClock {
    const SAVE_KEY: &'static str = "phase_clock";

    fn save_to_bytes(&self) -> Option<Vec<u8>> {
        Some(bitcode::encode(&ClockSnapshot {
            time01: self.time01,
            auto_advance: self.auto_advance,
            time_scale: self.time_scale,
            locked: self.locked,
            night_notified: self.night_notified,
        }))
    }

    /// Restores the dynamic state onto `current`, which still carries this
    /// run's configuration (day length, lock threshold).
    fn load_from_bytes(current: &Self, bytes: &[u8]) -> Self {
        let mut clock = current.clone();
        match bitcode::decode::<ClockSnapshot>(bytes) {
            Ok(snapshot) => {
                clock.time01 = snapshot.time01.clamp(0.0, 1.0);
                clock.auto_advance = snapshot.auto_advance;
                clock.time_scale = snapshot.time_scale;
                clock.locked = snapshot.locked;
                clock.night_notified = snapshot.night_notified;
            }
            Err(e) => {
                warn!(
                    "Saveable {}: failed to decode {} bytes, keeping current clock: {}",
                    Self::SAVE_KEY,
                    bytes.len(),
                    e
                );
            }
        }
        clock
    }
}

// =============================================================================
// Systems
// =============================================================================

pub fn advance_phase_clock(
    time: Res<Time>,
    mut clock: ResMut<PhaseClock>,
    mut night: EventWriter<NightReached>,
) {
    if let Some(event) = clock.advance(time.delta_secs()) {
        info!("Phase clock locked at night (time01 = {:.3})", event.time01);
        night.send(event);
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn scenario_clock() -> PhaseClock {
        PhaseClock::from_config(&ClockConfig {
            start_time01: 0.0,
            auto_advance: true,
            seconds_per_full_day: 300.0,
            time_scale: 1.0,
            stop_at_night: true,
            night_lock_time01: 0.75,
        })
    }

    #[test]
    fn test_locks_exactly_at_threshold_in_one_large_step() {
        let mut clock = scenario_clock();
        let event = clock.advance(1000.0);
        assert_eq!(event.map(|e| e.time01), Some(0.75));
        assert_eq!(clock.time01(), 0.75);
        assert!(clock.is_locked());
    }

    #[test]
    fn test_exactly_225_seconds_reaches_lock() {
        let mut clock = scenario_clock();
        assert!(clock.advance(225.0).is_some());
        assert_eq!(clock.time01(), 0.75);
        assert!(clock.advance(10.0).is_none());
    }

    fn frames_until_night(clock: &mut PhaseClock, fps: u32, frames: u32) -> u32 {
        let dt = 1.0 / fps as f32;
        (0..frames).filter(|_| clock.advance(dt).is_some()).count() as u32
    }

    #[test]
    fn test_225_seconds_of_60hz_frames_locks_on_the_last_frame() {
        let mut clock = scenario_clock();
        assert_eq!(frames_until_night(&mut clock, 60, 225 * 60 - 1), 0);
        assert!(!clock.is_locked());
        assert_eq!(frames_until_night(&mut clock, 60, 1), 1);
        assert!(clock.is_locked());
        assert_eq!(clock.time01(), 0.75);
    }

    #[test]
    fn test_225_seconds_fires_night_once_at_common_frame_rates() {
        for fps in [30, 60, 144, 240] {
            let mut clock = scenario_clock();
            assert_eq!(frames_until_night(&mut clock, fps, 225 * fps), 1, "{fps} Hz");
            assert!(clock.is_locked(), "{fps} Hz");
            assert_eq!(clock.time01(), 0.75, "{fps} Hz");
            // Ticking on past the threshold stays silent.
            assert_eq!(frames_until_night(&mut clock, fps, 10 * fps), 0, "{fps} Hz");
            assert_eq!(clock.time01(), 0.75, "{fps} Hz");
        }
    }

    #[test]
    fn test_advance_rate() {
        let mut clock = scenario_clock();
        clock.advance(30.0);
        assert!((clock.time01() - 0.1).abs() < 1e-6);

        clock.set_time_scale(2.0);
        clock.advance(30.0);
        assert!((clock.time01() - 0.3).abs() < 1e-6);
    }

    #[test]
    fn test_no_advance_when_auto_advance_off() {
        let mut clock = scenario_clock();
        clock.set_auto_advance(false);
        clock.advance(100.0);
        assert_eq!(clock.time01(), 0.0);
    }

    #[test]
    fn test_runs_to_end_without_stop_at_night() {
        let mut clock = PhaseClock::from_config(&ClockConfig {
            stop_at_night: false,
            ..Default::default()
        });
        assert!(clock.advance(10_000.0).is_none());
        assert_eq!(clock.time01(), 1.0);
        assert!(!clock.is_locked());
    }

    #[test]
    fn test_set_time_clamps_to_lock_unless_forced() {
        let mut clock = scenario_clock();
        let event = clock.set_time(0.9, false);
        assert!(event.is_some());
        assert_eq!(clock.time01(), 0.75);

        let mut clock = scenario_clock();
        clock.set_time(0.9, true);
        assert!((clock.time01() - 0.9).abs() < f32::EPSILON);
        assert!(clock.is_locked());
    }

    #[test]
    fn test_set_time_clamps_to_unit_range() {
        let mut clock = PhaseClock::from_config(&ClockConfig {
            stop_at_night: false,
            ..Default::default()
        });
        clock.set_time(4.0, false);
        assert_eq!(clock.time01(), 1.0);
        clock.set_time(-1.0, false);
        assert_eq!(clock.time01(), 0.0);
    }

    #[test]
    fn test_lock_is_idempotent() {
        let mut clock = scenario_clock();
        assert!(clock.lock_now().is_some());
        assert!(clock.lock_now().is_none());
        assert!(clock.set_time(0.8, false).is_none());
        assert!(clock.advance(5.0).is_none());
        assert!(clock.is_locked());
    }

    #[test]
    fn test_unlock_rearms_notification() {
        let mut clock = scenario_clock();
        assert!(clock.lock_now().is_some());
        clock.unlock();
        assert!(!clock.is_locked());
        clock.set_time(0.5, false);
        assert!(clock.advance(1000.0).is_some());
    }

    #[test]
    fn test_moving_back_without_unlock_does_not_refire() {
        let mut clock = scenario_clock();
        assert!(clock.lock_now().is_some());
        clock.set_time(0.5, false);
        assert!(!clock.is_locked());
        assert!(clock.advance(1000.0).is_none());
        assert!(clock.is_locked());
    }

    #[test]
    fn test_set_hours_maps_24h_dial() {
        let mut clock = scenario_clock();
        clock.set_hours(12.0, false);
        assert!((clock.time01() - 0.5).abs() < f32::EPSILON);
        assert!((clock.hours() - 12.0).abs() < 1e-5);
    }

    #[test]
    fn test_start_past_threshold_begins_locked_silently() {
        let mut clock = PhaseClock::from_config(&ClockConfig {
            start_time01: 0.9,
            ..Default::default()
        });
        assert!(clock.is_locked());
        assert_eq!(clock.time01(), 0.75);
        assert!(clock.advance(1.0).is_none());
    }

    #[test]
    fn test_saveable_roundtrip() {
        let mut clock = scenario_clock();
        clock.set_time(0.4, false);
        clock.set_time_scale(3.0);
        let bytes = clock.save_to_bytes().unwrap();

        let fresh = scenario_clock();
        let loaded = PhaseClock::load_from_bytes(&fresh, &bytes);
        assert!((loaded.time01() - 0.4).abs() < f32::EPSILON);
        assert!((loaded.time_scale() - 3.0).abs() < f32::EPSILON);
        assert!(!loaded.is_locked());
    }

    #[test]
    fn test_saveable_garbage_keeps_current() {
        let mut clock = scenario_clock();
        clock.set_time(0.3, false);
        let loaded = PhaseClock::load_from_bytes(&clock, &[1, 2, 3]);
        assert!((loaded.time01() - 0.3).abs() < f32::EPSILON);
    }
}
