//! Per-phase background layers cross-faded by alpha.
//!
//! Each backdrop element belongs to one phase. Its output alpha is that phase's
//! weight in the current blend, set absolutely rather than multiplied into the
//! base alpha, so a layer authored fully transparent still fades in.

use bevy::prelude::*;

use crate::phase::{CurrentPhaseBlend, Phase};

#[derive(Component, Debug, Clone)]
pub struct PhaseBackdrop {
    pub phase: Phase,
    base: Srgba,
    output: Srgba,
}

impl PhaseBackdrop {
    pub fn new(phase: Phase, base: impl Into<Srgba>) -> Self {
        let base = base.into();
        Self {
            phase,
            base,
            output: Srgba { alpha: 0.0, ..base },
        }
    }

    pub fn output(&self) -> Srgba {
        self.output
    }

    pub fn set_weight(&mut self, weight: f32) {
        self.output = Srgba {
            alpha: weight.clamp(0.0, 1.0),
            ..self.base
        };
    }
}

pub fn apply_phase_backdrops(
    blend: Res<CurrentPhaseBlend>,
    mut backdrops: Query<&mut PhaseBackdrop>,
) {
    for mut backdrop in &mut backdrops {
        let weight = blend.0.weight_of(backdrop.phase);
        backdrop.set_weight(weight);
    }
}
