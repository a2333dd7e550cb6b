use bevy::prelude::*;

use effects::SceneFxSet;

pub mod camera_sync;
pub mod layer_sync;
pub mod scene_light;
pub mod sprite_colors;

use scene_light::SkyBase;

/// Presents effect output: sprite colors, camera pose and the clear color.
pub struct RenderingPlugin;

impl Plugin for RenderingPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<SkyBase>()
            .add_systems(
                Update,
                camera_sync::report_viewport_aspect.before(SceneFxSet::Commands),
            )
            .add_systems(
                Update,
                (
                    sprite_colors::sync_tinted_sprites,
                    sprite_colors::sync_backdrop_sprites,
                    sprite_colors::sync_weather_sprites,
                    sprite_colors::sync_lamp_glows,
                    layer_sync::sync_parallax_layers,
                    layer_sync::sync_follower_layers,
                    layer_sync::sync_scroll_loops,
                    camera_sync::apply_camera_rig,
                    scene_light::apply_clear_color,
                )
                    .in_set(SceneFxSet::Compose),
            );
    }
}
