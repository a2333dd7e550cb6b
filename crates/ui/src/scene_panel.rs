//! Scene effects debug panel.
//!
//! Provides an egui window with:
//! - Clock readout and time-of-day slider
//! - Lock/unlock, auto-advance and speed controls
//! - Camera shake triggers
//! - Weather toggles
//! - Keybind (F1) to toggle the panel
//!
//! The panel never mutates effect state directly; every control sends a
//! `SceneCommand`.

use bevy::prelude::*;
use bevy_egui::{egui, EguiContexts};

use effects::camera_rig::CameraRig;
use effects::commands::SceneCommand;
use effects::phase::{CurrentPhaseBlend, PhaseBlend};
use effects::phase_clock::PhaseClock;
use effects::trauma::TraumaShaker;
use effects::weather::WeatherDirector;

const SPEEDS: [f32; 4] = [0.5, 1.0, 2.0, 4.0];

// =============================================================================
// Resources
// =============================================================================

#[derive(Resource)]
pub struct ScenePanelState {
    pub visible: bool,
    /// Slider edits may move the clock beyond the night lock.
    pub force_past_lock: bool,
}

impl Default for ScenePanelState {
    fn default() -> Self {
        Self {
            visible: true,
            force_past_lock: false,
        }
    }
}

// =============================================================================
// Systems
// =============================================================================

pub fn scene_panel_keybind(keys: Res<ButtonInput<KeyCode>>, mut state: ResMut<ScenePanelState>) {
    if keys.just_pressed(KeyCode::F1) {
        state.visible = !state.visible;
    }
}

#[allow(clippy::too_many_arguments)]
pub fn scene_panel_ui(
    mut contexts: EguiContexts,
    mut state: ResMut<ScenePanelState>,
    clock: Res<PhaseClock>,
    blend: Res<CurrentPhaseBlend>,
    shaker: Res<TraumaShaker>,
    rig: Res<CameraRig>,
    weather: Res<WeatherDirector>,
    mut commands_out: EventWriter<SceneCommand>,
) {
    if !state.visible {
        return;
    }

    let mut open = true;
    let mut force = state.force_past_lock;
    egui::Window::new("Scene Effects")
        .open(&mut open)
        .resizable(false)
        .default_width(280.0)
        .show(contexts.ctx_mut(), |ui| {
            ui.spacing_mut().item_spacing.y = 8.0;

            // --- Clock readout ---
            ui.heading(format!(
                "{} ({})",
                clock_label(clock.hours()),
                phase_label(&blend.0)
            ));
            if clock.is_locked() {
                ui.label("Locked at night");
            }

            ui.separator();

            // --- Time of day ---
            let mut time01 = clock.time01();
            let slider = ui.add(egui::Slider::new(&mut time01, 0.0..=1.0).text("time"));
            if slider.changed() {
                commands_out.send(SceneCommand::SetTime {
                    time01,
                    force_past_lock: force,
                });
            }
            ui.checkbox(&mut force, "Allow scrubbing past the night lock");

            ui.horizontal(|ui| {
                if clock.is_locked() {
                    if ui.button("Unlock").clicked() {
                        commands_out.send(SceneCommand::Unlock);
                    }
                } else if ui.button("Lock at night").clicked() {
                    commands_out.send(SceneCommand::LockAtNight);
                }
                let mut auto = clock.auto_advance();
                if ui.checkbox(&mut auto, "Auto-advance").changed() {
                    commands_out.send(SceneCommand::SetAutoAdvance(auto));
                }
            });

            ui.label("Speed:");
            ui.horizontal(|ui| {
                for speed in SPEEDS {
                    let selected = (clock.time_scale() - speed).abs() < f32::EPSILON;
                    if ui
                        .selectable_label(selected, format!("{speed}x"))
                        .clicked()
                    {
                        commands_out.send(SceneCommand::SetTimeScale(speed));
                    }
                }
            });

            ui.separator();

            // --- Camera ---
            if rig.is_disabled() {
                ui.label("Camera effects disabled (no scene camera)");
            } else {
                ui.label(format!("Trauma: {:.2}", shaker.trauma()));
                ui.horizontal(|ui| {
                    if ui.button("Bump").clicked() {
                        commands_out.send(SceneCommand::AddTrauma(0.3));
                    }
                    if ui.button("Quake").clicked() {
                        commands_out.send(SceneCommand::AddTrauma(1.0));
                    }
                    if ui.button("Thud").clicked() {
                        commands_out.send(SceneCommand::ShakeOneShot {
                            intensity: 0.6,
                            custom_decay: Some(4.0),
                        });
                    }
                });
            }

            ui.separator();

            // --- Weather ---
            ui.label("Weather:");
            ui.horizontal_wrapped(|ui| {
                let current = weather.current();
                for id in weather.ids() {
                    if ui.selectable_label(current == Some(id), id).clicked() {
                        commands_out.send(SceneCommand::ToggleWeather(id.to_string()));
                    }
                }
                if ui.selectable_label(current.is_none(), "Clear").clicked() {
                    commands_out.send(SceneCommand::ToggleWeather(String::new()));
                }
            });
        });

    state.force_past_lock = force;
    if !open {
        state.visible = false;
    }
}

/// `HH:MM` on a 24h dial.
fn clock_label(hours: f32) -> String {
    let total_minutes = (hours.clamp(0.0, 24.0) * 60.0).round() as u32;
    let total_minutes = total_minutes.min(24 * 60 - 1);
    format!("{:02}:{:02}", total_minutes / 60, total_minutes % 60)
}

/// Phase name, with the incoming phase while cross-fading.
fn phase_label(blend: &PhaseBlend) -> String {
    if blend.next_weight > 0.0 {
        format!(
            "{} → {} {:.0}%",
            blend.current.name(),
            blend.next.name(),
            blend.next_weight * 100.0
        )
    } else {
        blend.current.name().to_string()
    }
}
