//! Keyboard shortcuts that drive scene effects through `SceneCommand`s.
//!
//! | Key            | Command                                   |
//! |----------------|-------------------------------------------|
//! | Space          | add trauma                                |
//! | Shift+Space    | one-shot shake with a fast decay          |
//! | 1 / 2 / 3      | camera shot to anchor (ortho/pixel/pan)   |
//! | T              | skip an hour                              |
//! | L / U          | lock at night / unlock                    |
//! | P              | toggle auto-advance                       |
//! | R / F / C      | rain / fog / clear weather                |

use bevy::prelude::*;

use effects::camera_tween::{OrthoZoom, TweenRequest, TweenTiming, ZoomMethod};
use effects::commands::SceneCommand;
use effects::phase_clock::PhaseClock;

use crate::demo_scene::ShotAnchor;

const HOUR01: f32 = 1.0 / 24.0;

/// Commands for keys that need no world lookup.
pub fn hotkey_command(key: KeyCode, shift: bool, auto_advance: bool) -> Option<SceneCommand> {
    let cmd = match key {
        KeyCode::Space if shift => SceneCommand::ShakeOneShot {
            intensity: 0.7,
            custom_decay: Some(4.0),
        },
        KeyCode::Space => SceneCommand::AddTrauma(0.35),
        KeyCode::KeyT => SceneCommand::AddTime {
            delta01: HOUR01,
            force_past_lock: shift,
        },
        KeyCode::KeyL => SceneCommand::LockAtNight,
        KeyCode::KeyU => SceneCommand::Unlock,
        KeyCode::KeyP => SceneCommand::SetAutoAdvance(!auto_advance),
        KeyCode::KeyR => SceneCommand::ToggleWeather("rain".into()),
        KeyCode::KeyF => SceneCommand::ToggleWeather("fog".into()),
        KeyCode::KeyC => SceneCommand::ToggleWeather(String::new()),
        _ => return None,
    };
    Some(cmd)
}

/// Shot for anchor `n`: 1 fits with ortho zoom, 2 steps pixel zoom, 3 pans.
pub fn shot_command(n: u8, anchor: Entity) -> SceneCommand {
    let timing = TweenTiming {
        move_secs: 1.2,
        hold_secs: 1.5,
        return_secs: 1.0,
    };
    match n {
        1 => SceneCommand::BeginTween(TweenRequest {
            anchor: Some(anchor),
            timing,
            zoom: ZoomMethod::Ortho(OrthoZoom {
                extra_ortho: 0.5,
                ..Default::default()
            }),
        }),
        2 => SceneCommand::BeginTween(TweenRequest {
            anchor: Some(anchor),
            timing,
            zoom: ZoomMethod::PixelZoom { target_zoom: 1 },
        }),
        _ => SceneCommand::BeginPanOnly {
            anchor: Some(anchor),
            timing,
        },
    }
}

fn anchor_key(n: u8) -> KeyCode {
    match n {
        1 => KeyCode::Digit1,
        2 => KeyCode::Digit2,
        _ => KeyCode::Digit3,
    }
}

pub fn scene_hotkeys(
    keys: Res<ButtonInput<KeyCode>>,
    clock: Res<PhaseClock>,
    anchors: Query<(Entity, &ShotAnchor)>,
    mut commands_out: EventWriter<SceneCommand>,
) {
    let shift = keys.any_pressed([KeyCode::ShiftLeft, KeyCode::ShiftRight]);
    for key in keys.get_just_pressed() {
        if let Some(cmd) = hotkey_command(*key, shift, clock.auto_advance()) {
            commands_out.send(cmd);
        }
    }
    for (entity, anchor) in &anchors {
        if keys.just_pressed(anchor_key(anchor.0)) {
            commands_out.send(shot_command(anchor.0, entity));
        }
    }
}
