//! Scene-wide 2D light driven by the day phase.
//!
//! Each phase has a [`LightLook`] (color + intensity). The output light is the
//! weighted mix of the current and next looks, either on the shared phase blend
//! or on a blend computed with its own crossfade fraction.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::phase::{blend_phases, CurrentPhaseBlend, PhaseBlend, PhaseTable};
use crate::phase_clock::PhaseClock;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LightLook {
    pub color: Srgba,
    pub intensity: f32,
}

impl Default for LightLook {
    fn default() -> Self {
        Self {
            color: Srgba::WHITE,
            intensity: 1.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LightConfig {
    pub drive_light: bool,
    /// Use the shared phase blend; otherwise blend with `light_crossfade_fraction`.
    pub follow_phase_crossfade: bool,
    pub light_crossfade_fraction: f32,
    pub looks: PhaseTable<LightLook>,
}

impl Default for LightConfig {
    fn default() -> Self {
        Self {
            drive_light: true,
            follow_phase_crossfade: true,
            light_crossfade_fraction: 0.25,
            looks: PhaseTable {
                morning: LightLook {
                    color: Srgba::new(1.0, 0.95, 0.85, 1.0),
                    intensity: 1.0,
                },
                afternoon: LightLook {
                    color: Srgba::WHITE,
                    intensity: 1.1,
                },
                evening: LightLook {
                    color: Srgba::new(1.0, 0.75, 0.55, 1.0),
                    intensity: 0.75,
                },
                night: LightLook {
                    color: Srgba::new(0.55, 0.65, 1.0, 1.0),
                    intensity: 0.35,
                },
            },
        }
    }
}

/// Output of the light stage, consumed by the renderer.
#[derive(Resource, Debug, Clone, Copy, PartialEq)]
pub struct GlobalLight2d {
    pub color: Srgba,
    pub intensity: f32,
}

impl Default for GlobalLight2d {
    fn default() -> Self {
        Self {
            color: Srgba::WHITE,
            intensity: 1.0,
        }
    }
}

/// Settings resource wrapping [`LightConfig`].
#[derive(Resource, Debug, Clone, Default)]
pub struct LightSettings(pub LightConfig);

/// Mix two looks under `blend`.
pub fn blend_light(looks: &PhaseTable<LightLook>, blend: &PhaseBlend) -> GlobalLight2d {
    let a = looks.get(blend.current);
    let b = looks.get(blend.next);
    let (wa, wb) = (blend.current_weight, blend.next_weight);
    GlobalLight2d {
        color: Srgba::new(
            a.color.red * wa + b.color.red * wb,
            a.color.green * wa + b.color.green * wb,
            a.color.blue * wa + b.color.blue * wb,
            a.color.alpha * wa + b.color.alpha * wb,
        ),
        intensity: a.intensity * wa + b.intensity * wb,
    }
}

pub fn apply_global_light(
    settings: Res<LightSettings>,
    clock: Res<PhaseClock>,
    blend: Res<CurrentPhaseBlend>,
    mut light: ResMut<GlobalLight2d>,
) {
    let config = &settings.0;
    if !config.drive_light {
        return;
    }
    let own_blend;
    let blend = if config.follow_phase_crossfade {
        &blend.0
    } else {
        own_blend = blend_phases(clock.time01(), config.light_crossfade_fraction);
        &own_blend
    };
    *light = blend_light(&config.looks, blend);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pure_phase_look() {
        let config = LightConfig::default();
        let light = blend_light(&config.looks, &blend_phases(0.1, 0.25));
        assert_eq!(light.intensity, 1.0);
        assert_eq!(light.color, Srgba::new(1.0, 0.95, 0.85, 1.0));
    }

    #[test]
    fn test_midway_blend_intensity() {
        let config = LightConfig::default();
        // Evening -> Night with f = 1 at the segment midpoint: 50/50.
        let light = blend_light(&config.looks, &blend_phases(0.625, 1.0));
        assert!((light.intensity - (0.75 + 0.35) / 2.0).abs() < 1e-5);
    }
}
