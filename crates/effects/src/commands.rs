//! Inbound triggers for every effect.
//!
//! Input handlers, UI panels and gameplay code send [`SceneCommand`] events;
//! each effect reads the ones it owns at the start of the tick, before the
//! day/night pipeline and camera run.

use bevy::prelude::*;

use crate::camera_tween::{TweenRequest, TweenTiming};
use crate::phase_clock::{NightReached, PhaseClock};
use crate::trauma::TraumaShaker;
use crate::weather::{toggle_weather, WeatherDirector, WeatherEffect};

#[derive(Event, Debug, Clone, PartialEq)]
pub enum SceneCommand {
    // Camera
    AddTrauma(f32),
    ShakeOneShot {
        intensity: f32,
        custom_decay: Option<f32>,
    },
    BeginTween(TweenRequest),
    BeginPanOnly {
        anchor: Option<Entity>,
        timing: TweenTiming,
    },

    // Clock
    SetTime {
        time01: f32,
        force_past_lock: bool,
    },
    AddTime {
        delta01: f32,
        force_past_lock: bool,
    },
    SetHours {
        hours: f32,
        force_past_lock: bool,
    },
    LockAtNight,
    Unlock,
    SetAutoAdvance(bool),
    SetTimeScale(f32),

    // Weather; an empty id turns the current effect off.
    ToggleWeather(String),
}

pub fn apply_clock_commands(
    mut events: EventReader<SceneCommand>,
    mut clock: ResMut<PhaseClock>,
    mut night: EventWriter<NightReached>,
) {
    for event in events.read() {
        let reached = match event {
            SceneCommand::SetTime {
                time01,
                force_past_lock,
            } => clock.set_time(*time01, *force_past_lock),
            SceneCommand::AddTime {
                delta01,
                force_past_lock,
            } => clock.add_time(*delta01, *force_past_lock),
            SceneCommand::SetHours {
                hours,
                force_past_lock,
            } => clock.set_hours(*hours, *force_past_lock),
            SceneCommand::LockAtNight => clock.lock_now(),
            SceneCommand::Unlock => {
                clock.unlock();
                None
            }
            SceneCommand::SetAutoAdvance(enabled) => {
                clock.set_auto_advance(*enabled);
                None
            }
            SceneCommand::SetTimeScale(scale) => {
                clock.set_time_scale(*scale);
                None
            }
            _ => None,
        };
        if let Some(event) = reached {
            info!("Phase clock locked at night (time01 = {:.3})", event.time01);
            night.send(event);
        }
    }
}

pub fn apply_shake_commands(
    mut events: EventReader<SceneCommand>,
    mut shaker: ResMut<TraumaShaker>,
) {
    for event in events.read() {
        match event {
            SceneCommand::AddTrauma(amount) => shaker.add_trauma(*amount),
            SceneCommand::ShakeOneShot {
                intensity,
                custom_decay,
            } => shaker.shake_one_shot(*intensity, *custom_decay),
            _ => {}
        }
    }
}

pub fn apply_weather_commands(
    mut events: EventReader<SceneCommand>,
    mut director: ResMut<WeatherDirector>,
    mut effects: Query<&mut WeatherEffect>,
) {
    for event in events.read() {
        if let SceneCommand::ToggleWeather(id) = event {
            toggle_weather(&mut director, &mut effects, id);
        }
    }
}
