//! Demo scene: a strip of ground, parallax hills and drifting clouds, a few
//! props and lamps, one player, three shot anchors and two weather layers
//! parented to the camera.

use bevy::prelude::*;

use effects::camera_rig::{CameraFollow, SceneCamera};
use effects::camera_tween::TweenFocus;
use effects::backdrop::PhaseBackdrop;
use effects::control_handles::{ControlHandle, ControlKind, PhysicsBody};
use effects::lamp::{Lamp, PulseSettings};
use effects::parallax::{FollowerParallax, ParallaxLayer, ScrollDirection, ScrollLoop};
use effects::phase::Phase;
use effects::tint::{TintGroup, TintGroupId, TintGroups, TintMember};
use effects::weather::WeatherEffect;
use rendering::camera_sync::scene_projection;
use rendering::scene_light::Lit;

use crate::movement::{Player, GROUND_Y};

pub const START_ORTHO: f32 = 4.0;
const CAMERA_OFFSET: Vec3 = Vec3::new(0.0, 1.5, 10.0);
const WEATHER_FADE_SECS: f32 = 1.5;
const PIXELS_PER_UNIT: f32 = 32.0;
const HILL_PARALLAX: Vec2 = Vec2::new(0.5, 0.0);

/// Numbered shot targets; keys 1..=3 tween to them.
#[derive(Component, Debug, Clone, Copy)]
pub struct ShotAnchor(pub u8);

pub fn spawn_demo_scene(mut commands: Commands, mut groups: ResMut<TintGroups>) {
    let world = groups
        .find("world")
        .unwrap_or_else(|| groups.register(TintGroup::named("world")));
    let far = groups.find("far").unwrap_or_else(|| {
        groups.register(TintGroup {
            strength: 0.6,
            ..TintGroup::named("far")
        })
    });

    // Player first so the camera can follow it.
    let player = commands
        .spawn((
            Name::new("Player"),
            Player,
            Sprite::from_color(Srgba::rgb(0.9, 0.3, 0.25), Vec2::new(0.6, 1.0)),
            Transform::from_xyz(0.0, GROUND_Y, 0.0),
            TintMember::new(world, Srgba::rgb(0.9, 0.3, 0.25)),
            Lit,
            PhysicsBody::default(),
            ControlHandle::new(ControlKind::Movement),
            TweenFocus,
        ))
        .id();

    let camera = commands
        .spawn((
            Name::new("Scene Camera"),
            Camera2d,
            scene_projection(START_ORTHO),
            Transform::from_translation(CAMERA_OFFSET),
            SceneCamera {
                ortho_size: START_ORTHO,
            },
            CameraFollow {
                target: player,
                offset: CAMERA_OFFSET,
            },
            ControlHandle::new(ControlKind::Follow),
        ))
        .id();

    spawn_backdrops(&mut commands);
    spawn_ground(&mut commands, world, far);
    spawn_sky_layers(&mut commands, far, player);
    spawn_lamps(&mut commands);
    spawn_anchors(&mut commands);
    spawn_weather(&mut commands, camera);

    info!("Demo scene ready");
}

fn spawn_backdrops(commands: &mut Commands) {
    let skies = [
        (Phase::Morning, Srgba::rgb(0.98, 0.78, 0.62)),
        (Phase::Afternoon, Srgba::rgb(0.55, 0.78, 0.98)),
        (Phase::Evening, Srgba::rgb(0.85, 0.45, 0.40)),
        (Phase::Night, Srgba::rgb(0.06, 0.07, 0.18)),
    ];
    for (i, (phase, color)) in skies.into_iter().enumerate() {
        commands.spawn((
            Name::new(format!("Backdrop {}", phase.name())),
            Sprite::from_color(color, Vec2::new(400.0, 40.0)),
            // Stack in phase order so later phases draw over earlier ones.
            Transform::from_xyz(0.0, 8.0, -20.0 + i as f32 * 0.1),
            PhaseBackdrop::new(phase, color),
        ));
    }
}

fn spawn_ground(commands: &mut Commands, world: TintGroupId, far: TintGroupId) {
    let ground = Srgba::rgb(0.35, 0.55, 0.30);
    commands.spawn((
        Name::new("Ground"),
        Sprite::from_color(ground, Vec2::new(400.0, 6.0)),
        Transform::from_xyz(0.0, GROUND_Y - 3.5, -1.0),
        TintMember::new(world, ground),
        Lit,
    ));

    for i in -6..=6 {
        let hill = Srgba::rgb(0.30, 0.42, 0.50);
        let height = 3.0 + (i as f32 * 1.7).sin().abs() * 4.0;
        let at = Vec2::new(i as f32 * 8.0, GROUND_Y + height * 0.5 - 1.0);
        commands.spawn((
            Sprite::from_color(hill, Vec2::new(7.0, height)),
            Transform::from_translation(at.extend(-5.0)),
            ParallaxLayer::new(at, HILL_PARALLAX).with_pixel_snap(PIXELS_PER_UNIT),
            TintMember::new(far, hill),
            Lit,
        ));
    }

    for x in [-9.0_f32, -4.0, 3.5, 11.0] {
        let trunk = Srgba::rgb(0.45, 0.30, 0.18);
        let leaves = Srgba::rgb(0.20, 0.50, 0.25);
        commands.spawn((
            Sprite::from_color(trunk, Vec2::new(0.35, 1.6)),
            Transform::from_xyz(x, GROUND_Y + 0.3, -0.5),
            TintMember::new(world, trunk),
            Lit,
        ));
        commands.spawn((
            Sprite::from_color(leaves, Vec2::new(1.6, 1.4)),
            Transform::from_xyz(x, GROUND_Y + 1.6, -0.4),
            TintMember::new(world, leaves),
            Lit,
        ));
    }
}

/// A mountain band that leans away from the player and clouds that drift
/// left and wrap.
fn spawn_sky_layers(commands: &mut Commands, far: TintGroupId, player: Entity) {
    let ridge = Srgba::rgb(0.40, 0.45, 0.60);
    commands.spawn((
        Name::new("Ridge"),
        Sprite::from_color(ridge, Vec2::new(300.0, 5.0)),
        Transform::from_xyz(0.0, GROUND_Y + 4.0, -8.0),
        FollowerParallax::new(player, 0.0),
        TintMember::new(far, ridge),
        Lit,
    ));

    let cloud = Srgba::rgb(0.95, 0.95, 0.97);
    for (i, (x, y)) in [(-20.0_f32, 9.0_f32), (-2.0, 11.0), (15.0, 10.0)].into_iter().enumerate() {
        commands.spawn((
            Name::new(format!("Cloud {i}")),
            Sprite::from_color(cloud, Vec2::new(4.0, 1.2)),
            Transform::from_xyz(x, y, -10.0),
            ScrollLoop::new(x, ScrollDirection::Left, 0.6 + i as f32 * 0.2, -40.0, 40.0),
            TintMember::new(far, cloud),
            Lit,
        ));
    }
}

/// Glow sprites whose alpha follows a flickering or pulsing lamp.
fn spawn_lamps(commands: &mut Commands) {
    let glow = Srgba::new(1.0, 0.85, 0.45, 1.0);
    commands.spawn((
        Name::new("Lamp flicker"),
        Sprite::from_color(glow, Vec2::splat(1.2)),
        Transform::from_xyz(-6.5, GROUND_Y + 1.2, -0.3),
        Lamp::flicker(0.45, 0.9, 0.08, 17),
    ));
    commands.spawn((
        Name::new("Lamp pulse"),
        Sprite::from_color(glow, Vec2::splat(1.2)),
        Transform::from_xyz(7.5, GROUND_Y + 1.2, -0.3),
        Lamp::pulse(
            0.6,
            PulseSettings {
                amplitude: 0.25,
                frequency: 0.4,
                amplitude_jitter: 0.05,
                frequency_jitter: 0.1,
                jitter_reseed_secs: 3.0,
                ..Default::default()
            },
            29,
        ),
    ));
}

fn spawn_anchors(commands: &mut Commands) {
    let anchors = [
        (1, Vec2::new(-12.0, 2.0)),
        (2, Vec2::new(14.0, 4.0)),
        (3, Vec2::new(24.0, 1.0)),
    ];
    for (n, at) in anchors {
        let marker = Srgba::rgb(0.95, 0.85, 0.20);
        commands.spawn((
            Name::new(format!("Anchor {n}")),
            ShotAnchor(n),
            Sprite::from_color(marker, Vec2::splat(0.4)),
            Transform::from_translation(at.extend(-0.2)),
        ));
    }
}

fn spawn_weather(commands: &mut Commands, camera: Entity) {
    let layers = [
        ("rain", Srgba::new(0.45, 0.55, 0.75, 1.0)),
        ("fog", Srgba::new(0.85, 0.88, 0.90, 1.0)),
    ];
    commands.entity(camera).with_children(|parent| {
        for (id, color) in layers {
            parent.spawn((
                Name::new(format!("Weather {id}")),
                Sprite::from_color(color, Vec2::new(200.0, 200.0)),
                // In front of everything the camera sees, behind the near plane.
                Transform::from_xyz(0.0, 0.0, -1.0),
                WeatherEffect::new(id, WEATHER_FADE_SECS),
            ));
        }
    });
}
