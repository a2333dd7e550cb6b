use std::path::PathBuf;

use bevy::prelude::*;
use bevy::render::view::screenshot::{save_to_disk, Screenshot};
use bevy::window::PresentMode;
use bevy::winit::{UpdateMode, WinitSettings};

use effects::commands::SceneCommand;
use effects::config::SceneFxConfig;
use effects::SceneFxSet;

mod demo_scene;
mod movement;
mod scene_input;
mod snapshot_io;

const DEFAULT_CONFIG: &str = "assets/scene_fx.json";
const DEFAULT_SNAPSHOT: &str = "dusk_scene.bin";

fn main() {
    let config_path = std::env::var("DUSK_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG.into());
    let snapshot_path =
        PathBuf::from(std::env::var("DUSK_SNAPSHOT").unwrap_or_else(|_| DEFAULT_SNAPSHOT.into()));

    let mut app = App::new();

    app.add_plugins(DefaultPlugins.set(WindowPlugin {
        primary_window: Some(Window {
            title: "Dusk".to_string(),
            resolution: (1280.0, 720.0).into(),
            present_mode: PresentMode::AutoVsync,
            ..default()
        }),
        ..default()
    }))
    .insert_resource(WinitSettings {
        focused_mode: UpdateMode::Continuous,
        unfocused_mode: UpdateMode::reactive_low_power(std::time::Duration::from_millis(100)),
    })
    // Config must be in place before EffectsPlugin builds its resources.
    .insert_resource(SceneFxConfig::load_or_default(&config_path))
    .add_plugins((
        effects::EffectsPlugin,
        rendering::RenderingPlugin,
        ui::UiPlugin,
    ))
    .add_systems(Startup, demo_scene::spawn_demo_scene)
    .add_systems(
        Update,
        (
            scene_input::scene_hotkeys.before(SceneFxSet::Commands),
            movement::move_player.before(SceneFxSet::Camera),
        ),
    );

    // Screenshot mode: captures one frame per phase and exits
    if std::env::var("DUSK_SCREENSHOTS").is_ok() {
        app.insert_resource(ScreenshotQueue {
            frame: 0,
            current: 0,
            presets: vec![
                ShotPreset { name: "01_morning", time01: 0.10 },
                ShotPreset { name: "02_afternoon", time01: 0.35 },
                ShotPreset { name: "03_evening", time01: 0.60 },
                ShotPreset { name: "04_night", time01: 0.85 },
            ],
        });
        app.add_systems(Update, drive_screenshots.before(SceneFxSet::Commands));
    } else {
        app.add_plugins(snapshot_io::SnapshotIoPlugin {
            path: snapshot_path.clone(),
        });
        snapshot_io::load_startup_snapshot(app.world_mut(), &snapshot_path);
    }

    app.run();
}

#[derive(Resource)]
struct ScreenshotQueue {
    frame: u32,
    current: usize,
    presets: Vec<ShotPreset>,
}

struct ShotPreset {
    name: &'static str,
    time01: f32,
}

fn drive_screenshots(
    mut commands: Commands,
    mut queue: ResMut<ScreenshotQueue>,
    mut scene: EventWriter<SceneCommand>,
    mut exit: EventWriter<AppExit>,
) {
    queue.frame += 1;

    // Let the window settle before the first capture
    if queue.frame < 60 {
        return;
    }

    let idx = queue.current;
    if idx >= queue.presets.len() {
        if queue.frame > 60 + queue.presets.len() as u32 * 12 + 20 {
            exit.send(AppExit::Success);
        }
        return;
    }

    let step = (queue.frame - 60) % 12;
    if step == 0 {
        if idx == 0 {
            scene.send(SceneCommand::SetAutoAdvance(false));
        }
        scene.send(SceneCommand::SetTime {
            time01: queue.presets[idx].time01,
            force_past_lock: true,
        });
    } else if step == 6 {
        let path = format!("/tmp/dusk_{}.png", queue.presets[idx].name);
        commands
            .spawn(Screenshot::primary_window())
            .observe(save_to_disk(path));
        queue.current += 1;
    }
}
