//! Day phases and the crossfade blend between them.
//!
//! The normalized day `[0, 1]` is split into four equal segments:
//!
//! ```text
//! 0.00 Morning | 0.25 Afternoon | 0.50 Evening | 0.75 Night | 1.00
//! ```
//!
//! Near the end of each segment the visuals cross-fade toward the next phase.
//! The fade window is `crossfade_fraction * 0.25` long and shaped by smoothstep.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::phase_clock::PhaseClock;

/// Number of phases in one day.
pub const PHASE_COUNT: usize = 4;

/// Length of one phase segment in normalized time.
pub const SEGMENT_LEN: f32 = 0.25;

#[derive(
    Debug,
    Default,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    bitcode::Encode,
    bitcode::Decode,
)]
pub enum Phase {
    #[default]
    Morning,
    Afternoon,
    Evening,
    Night,
}

impl Phase {
    pub const ALL: [Phase; PHASE_COUNT] =
        [Phase::Morning, Phase::Afternoon, Phase::Evening, Phase::Night];

    pub fn index(self) -> usize {
        match self {
            Phase::Morning => 0,
            Phase::Afternoon => 1,
            Phase::Evening => 2,
            Phase::Night => 3,
        }
    }

    /// Phase for a segment index. Out-of-range indices clamp to `Night`.
    pub fn from_index(index: usize) -> Self {
        match index {
            0 => Phase::Morning,
            1 => Phase::Afternoon,
            2 => Phase::Evening,
            _ => Phase::Night,
        }
    }

    /// The phase that follows this one; `Night` wraps to `Morning`.
    pub fn next(self) -> Self {
        Phase::from_index((self.index() + 1) % PHASE_COUNT)
    }

    pub fn name(self) -> &'static str {
        match self {
            Phase::Morning => "Morning",
            Phase::Afternoon => "Afternoon",
            Phase::Evening => "Evening",
            Phase::Night => "Night",
        }
    }
}

/// One value per phase.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PhaseTable<T> {
    pub morning: T,
    pub afternoon: T,
    pub evening: T,
    pub night: T,
}

impl<T> PhaseTable<T> {
    pub fn get(&self, phase: Phase) -> &T {
        match phase {
            Phase::Morning => &self.morning,
            Phase::Afternoon => &self.afternoon,
            Phase::Evening => &self.evening,
            Phase::Night => &self.night,
        }
    }
}

impl<T: Default> Default for PhaseTable<T> {
    fn default() -> Self {
        Self {
            morning: T::default(),
            afternoon: T::default(),
            evening: T::default(),
            night: T::default(),
        }
    }
}

/// Blend state for one tick: which two phases are visible and how much of each.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PhaseBlend {
    pub current: Phase,
    pub next: Phase,
    pub current_weight: f32,
    pub next_weight: f32,
}

impl Default for PhaseBlend {
    fn default() -> Self {
        blend_phases(0.0, 0.0)
    }
}

impl PhaseBlend {
    /// Weight of an arbitrary phase in this blend (0 for phases not involved).
    pub fn weight_of(&self, phase: Phase) -> f32 {
        if phase == self.current {
            self.current_weight
        } else if phase == self.next {
            self.next_weight
        } else {
            0.0
        }
    }

    /// Weighted sum of a per-phase scalar.
    pub fn mix(&self, table: &PhaseTable<f32>) -> f32 {
        table.get(self.current) * self.current_weight + table.get(self.next) * self.next_weight
    }

    /// Weighted sum of a per-phase color, channel by channel (alpha included).
    pub fn mix_color(&self, table: &PhaseTable<Srgba>) -> Srgba {
        let a = *table.get(self.current);
        let b = *table.get(self.next);
        let (wa, wb) = (self.current_weight, self.next_weight);
        Srgba::new(
            a.red * wa + b.red * wb,
            a.green * wa + b.green * wb,
            a.blue * wa + b.blue * wb,
            a.alpha * wa + b.alpha * wb,
        )
    }
}

/// Cubic smoothstep on `[0, 1]`: `x²(3 - 2x)`.
#[inline]
pub fn smoothstep01(x: f32) -> f32 {
    x * x * (3.0 - 2.0 * x)
}

/// Compute the phase blend for a normalized time and crossfade fraction.
///
/// Both inputs are clamped to `[0, 1]`. A fraction of 0 disables fading
/// entirely (hard cuts at segment boundaries).
pub fn blend_phases(time01: f32, crossfade_fraction: f32) -> PhaseBlend {
    let time = time01.clamp(0.0, 1.0);
    let curr = ((time / SEGMENT_LEN).floor() as i32).clamp(0, PHASE_COUNT as i32 - 1) as usize;
    let current = Phase::from_index(curr);
    let next = current.next();

    let seg_end = (curr + 1) as f32 * SEGMENT_LEN;
    let fade_len = crossfade_fraction.clamp(0.0, 1.0) * SEGMENT_LEN;

    let mut b = 0.0;
    if fade_len > 0.0 && time >= seg_end - fade_len {
        let x = ((time - (seg_end - fade_len)) / fade_len).clamp(0.0, 1.0);
        b = smoothstep01(x).clamp(0.0, 1.0);
    }

    PhaseBlend {
        current,
        next,
        current_weight: 1.0 - b,
        next_weight: b,
    }
}

/// The blend computed this tick. Transient; recomputed every frame.
#[derive(Resource, Debug, Clone, Copy, Default)]
pub struct CurrentPhaseBlend(pub PhaseBlend);

/// Portion of each phase segment, at its end, spent fading into the next.
#[derive(Resource, Debug, Clone, Copy, PartialEq)]
pub struct CrossfadeFraction(pub f32);

impl Default for CrossfadeFraction {
    fn default() -> Self {
        Self(0.25)
    }
}

pub fn update_phase_blend(
    clock: Res<PhaseClock>,
    fraction: Res<CrossfadeFraction>,
    mut blend: ResMut<CurrentPhaseBlend>,
) {
    blend.0 = blend_phases(clock.time01(), fraction.0);
}
