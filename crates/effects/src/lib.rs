pub mod backdrop;
pub mod camera_rig;
pub mod camera_tween;
pub mod commands;
pub mod config;
pub mod control_handles;
pub mod error;
pub mod lamp;
pub mod light;
pub mod parallax;
pub mod persistence;
pub mod phase;
pub mod phase_clock;
pub mod pixel_zoom;
pub mod scene_fx_sets;
pub mod tint;
pub mod trauma;
pub mod weather;

#[cfg(test)]
pub mod test_harness;

pub use persistence::{decode_or_warn, Saveable, SaveableAppExt, SaveableRegistry};
pub use scene_fx_sets::SceneFxSet;

use bevy::prelude::*;

use camera_rig::CameraRig;
use camera_tween::CameraTweener;
use commands::SceneCommand;
use config::SceneFxConfig;
use light::{GlobalLight2d, LightSettings};
use phase::{CrossfadeFraction, CurrentPhaseBlend};
use phase_clock::{NightReached, PhaseClock};
use pixel_zoom::PixelPerfect;
use tint::TintGroups;
use trauma::TraumaShaker;
use weather::WeatherDirector;

/// Day/night pipeline, camera effects and weather for a 2D scene.
///
/// Reads an optional [`SceneFxConfig`] resource at build time; insert it
/// before adding the plugin to override the defaults.
pub struct EffectsPlugin;

impl Plugin for EffectsPlugin {
    fn build(&self, app: &mut App) {
        let config = app
            .world()
            .get_resource::<SceneFxConfig>()
            .cloned()
            .unwrap_or_default();

        let mut groups = TintGroups::default();
        for group in &config.tint_groups {
            groups.register(group.clone());
        }

        app.insert_resource(PhaseClock::from_config(&config.clock))
            .insert_resource(CrossfadeFraction(config.crossfade_fraction))
            .insert_resource(LightSettings(config.light.clone()))
            .insert_resource(TraumaShaker::from_config(&config.shake))
            .insert_resource(CameraTweener::new(config.tween.clone()))
            .insert_resource(PixelPerfect {
                settings: config.pixel_perfect,
                suspended: false,
            })
            .insert_resource(groups)
            .init_resource::<CurrentPhaseBlend>()
            .init_resource::<GlobalLight2d>()
            .init_resource::<CameraRig>()
            .init_resource::<WeatherDirector>()
            .add_event::<SceneCommand>()
            .add_event::<NightReached>()
            .register_saveable::<PhaseClock>()
            .register_saveable::<WeatherDirector>();

        app.configure_sets(
            Update,
            (
                SceneFxSet::Commands,
                SceneFxSet::Clock,
                SceneFxSet::Blend,
                SceneFxSet::Apply,
                SceneFxSet::Camera,
                SceneFxSet::Compose,
            )
                .chain(),
        );

        app.add_systems(PostStartup, camera_rig::bind_scene_camera)
            .add_systems(
                Update,
                (
                    (
                        weather::register_weather_effects,
                        weather::restore_weather,
                        commands::apply_weather_commands,
                    )
                        .chain(),
                    commands::apply_clock_commands,
                    commands::apply_shake_commands,
                    camera_tween::begin_camera_tweens,
                )
                    .in_set(SceneFxSet::Commands),
            )
            .add_systems(
                Update,
                phase_clock::advance_phase_clock.in_set(SceneFxSet::Clock),
            )
            .add_systems(
                Update,
                phase::update_phase_blend.in_set(SceneFxSet::Blend),
            )
            .add_systems(
                Update,
                (
                    tint::apply_tint_groups,
                    backdrop::apply_phase_backdrops,
                    light::apply_global_light,
                    weather::tick_weather_fades,
                    lamp::tick_lamps,
                    parallax::tick_scroll_loops,
                )
                    .in_set(SceneFxSet::Apply),
            )
            .add_systems(
                Update,
                (
                    camera_rig::follow_camera_target,
                    camera_tween::advance_camera_tween,
                    trauma::apply_trauma_shake,
                    (
                        parallax::update_parallax_layers,
                        parallax::update_follower_parallax,
                    ),
                )
                    .chain()
                    .in_set(SceneFxSet::Camera),
            );
    }
}
