//! Scene effect configuration, loaded from JSON.
//!
//! Every field has a default, so a config file only needs the values it
//! changes. `SceneFxConfig::validate` rejects values no effect can run with;
//! everything else is clamped by the effects themselves.

use std::path::Path;

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::camera_tween::TweenSettings;
use crate::error::SceneFxError;
use crate::light::LightConfig;
use crate::phase_clock::ClockConfig;
use crate::pixel_zoom::PixelPerfectSettings;
use crate::tint::TintGroup;
use crate::trauma::ShakeConfig;

#[derive(Resource, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneFxConfig {
    pub clock: ClockConfig,
    pub crossfade_fraction: f32,
    pub light: LightConfig,
    pub shake: ShakeConfig,
    pub tween: TweenSettings,
    /// `None` renders at free orthographic sizes.
    pub pixel_perfect: Option<PixelPerfectSettings>,
    pub tint_groups: Vec<TintGroup>,
}

impl Default for SceneFxConfig {
    fn default() -> Self {
        Self {
            clock: ClockConfig::default(),
            crossfade_fraction: 0.25,
            light: LightConfig::default(),
            shake: ShakeConfig::default(),
            tween: TweenSettings::default(),
            pixel_perfect: None,
            tint_groups: vec![TintGroup::named("world")],
        }
    }
}

impl SceneFxConfig {
    pub fn from_json(json: &str) -> Result<Self, SceneFxError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, SceneFxError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Load `path`, falling back to defaults when the file is missing or bad.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        match Self::load(path) {
            Ok(config) => {
                info!("Loaded scene config from {}", path.display());
                config
            }
            Err(SceneFxError::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => {
                info!("No scene config at {}, using defaults", path.display());
                Self::default()
            }
            Err(e) => {
                warn!("Ignoring scene config {}: {e}", path.display());
                Self::default()
            }
        }
    }

    pub fn validate(&self) -> Result<(), SceneFxError> {
        let finite = [
            ("clock.start_time01", self.clock.start_time01),
            ("clock.seconds_per_full_day", self.clock.seconds_per_full_day),
            ("clock.time_scale", self.clock.time_scale),
            ("clock.night_lock_time01", self.clock.night_lock_time01),
            ("crossfade_fraction", self.crossfade_fraction),
            ("shake.frequency", self.shake.frequency),
            ("shake.decay", self.shake.decay),
            ("shake.exponent", self.shake.exponent),
            ("tween.fit_margin", self.tween.fit_margin),
        ];
        for (name, value) in finite {
            if !value.is_finite() {
                return Err(SceneFxError::Config(format!("{name} must be finite")));
            }
        }

        if self.clock.seconds_per_full_day <= 0.0 {
            return Err(SceneFxError::Config(
                "clock.seconds_per_full_day must be positive".into(),
            ));
        }
        if !(0.0..=1.0).contains(&self.clock.night_lock_time01) {
            return Err(SceneFxError::Config(
                "clock.night_lock_time01 must be within [0, 1]".into(),
            ));
        }
        if !(0.0..=1.0).contains(&self.crossfade_fraction) {
            return Err(SceneFxError::Config(
                "crossfade_fraction must be within [0, 1]".into(),
            ));
        }
        if self.shake.exponent <= 0.0 {
            return Err(SceneFxError::Config("shake.exponent must be positive".into()));
        }
        if let Some(pixel) = self.pixel_perfect {
            if pixel.ref_resolution_y == 0 || pixel.pixels_per_unit == 0 {
                return Err(SceneFxError::Config(
                    "pixel_perfect resolution and pixels_per_unit must be non-zero".into(),
                ));
            }
        }

        let mut names: Vec<&str> = self.tint_groups.iter().map(|g| g.name.as_str()).collect();
        names.sort_unstable();
        if let Some(pair) = names.windows(2).find(|w| w[0] == w[1]) {
            return Err(SceneFxError::Config(format!(
                "tint group '{}' is defined twice",
                pair[0]
            )));
        }
        Ok(())
    }
}
