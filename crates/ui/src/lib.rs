use bevy::prelude::*;
use bevy_egui::EguiPlugin;

pub mod scene_panel;

pub struct UiPlugin;

impl Plugin for UiPlugin {
    fn build(&self, app: &mut App) {
        app.add_plugins(EguiPlugin)
            .init_resource::<scene_panel::ScenePanelState>()
            .add_systems(
                Update,
                (
                    scene_panel::scene_panel_keybind,
                    scene_panel::scene_panel_ui,
                )
                    .chain()
                    .before(effects::SceneFxSet::Commands),
            );
    }
}
