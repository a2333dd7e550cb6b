//! # TestScene: headless integration test harness for the scene effects
//!
//! Wraps `bevy::app::App` + `EffectsPlugin` with a fixed manual time step so
//! tests can spawn a scene, send commands, tick, and assert on ECS state.

use std::time::Duration;

use bevy::app::App;
use bevy::prelude::*;
use bevy::time::TimeUpdateStrategy;

use crate::camera_rig::{CameraFollow, CameraRig, SceneCamera};
use crate::commands::SceneCommand;
use crate::config::SceneFxConfig;
use crate::control_handles::{ControlHandle, ControlKind, PhysicsBody};
use crate::phase_clock::NightReached;
use crate::EffectsPlugin;

/// Default step: 60 Hz.
pub const FRAME: Duration = Duration::from_micros(16_667);

/// Every NightReached event seen so far, collected by the harness.
#[derive(Resource, Default)]
pub struct NightEventLog(pub Vec<NightReached>);

fn record_night_events(mut events: EventReader<NightReached>, mut log: ResMut<NightEventLog>) {
    log.0.extend(events.read().copied());
}

pub struct TestScene {
    app: App,
    step: Duration,
}

impl TestScene {
    // -----------------------------------------------------------------------
    // Constructors
    // -----------------------------------------------------------------------

    /// An empty scene with default config and no camera.
    pub fn new() -> Self {
        Self::with_config(SceneFxConfig::default())
    }

    pub fn with_config(config: SceneFxConfig) -> Self {
        let mut app = App::new();
        app.add_plugins(MinimalPlugins);
        app.insert_resource(TimeUpdateStrategy::ManualDuration(FRAME));
        // Allow big manual steps; the default clamps virtual deltas at 250 ms.
        app.world_mut()
            .resource_mut::<Time<Virtual>>()
            .set_max_delta(Duration::from_secs(3600));
        app.insert_resource(config);
        app.add_plugins(EffectsPlugin);
        app.init_resource::<NightEventLog>()
            .add_systems(Last, record_night_events);
        Self { app, step: FRAME }
    }

    /// A scene with a camera following a player, ready to tick.
    pub fn with_camera() -> Self {
        let mut scene = Self::new();
        let player = scene.spawn_player(Vec3::new(0.0, 0.0, 0.0));
        scene.spawn_camera(player, 5.0);
        scene
    }

    // -----------------------------------------------------------------------
    // Builders
    // -----------------------------------------------------------------------

    pub fn spawn_player(&mut self, at: Vec3) -> Entity {
        self.app
            .world_mut()
            .spawn((
                Transform::from_translation(at),
                GlobalTransform::from_translation(at),
                ControlHandle::new(ControlKind::Movement),
                PhysicsBody::default(),
                crate::camera_tween::TweenFocus,
            ))
            .id()
    }

    pub fn spawn_camera(&mut self, follow: Entity, ortho_size: f32) -> Entity {
        self.app
            .world_mut()
            .spawn((
                Transform::from_xyz(0.0, 0.0, 10.0),
                GlobalTransform::default(),
                SceneCamera { ortho_size },
                CameraFollow {
                    target: follow,
                    offset: Vec3::new(0.0, 0.0, 10.0),
                },
                ControlHandle::new(ControlKind::Follow),
            ))
            .id()
    }

    /// A static point in the world, usable as a tween anchor.
    pub fn spawn_anchor(&mut self, at: Vec2) -> Entity {
        let at = at.extend(0.0);
        self.app
            .world_mut()
            .spawn((
                Transform::from_translation(at),
                GlobalTransform::from_translation(at),
            ))
            .id()
    }

    pub fn spawn(&mut self, bundle: impl Bundle) -> Entity {
        self.app.world_mut().spawn(bundle).id()
    }

    // -----------------------------------------------------------------------
    // Driving
    // -----------------------------------------------------------------------

    /// Change the step used by subsequent `tick` calls.
    pub fn set_step(&mut self, step: Duration) {
        self.step = step;
        self.app
            .insert_resource(TimeUpdateStrategy::ManualDuration(step));
    }

    /// Run `n` frames. The very first frame of an app has a zero delta.
    pub fn tick(&mut self, n: u32) {
        for _ in 0..n {
            self.app.update();
        }
    }

    /// Run enough frames to cover at least `secs` of scene time.
    pub fn tick_secs(&mut self, secs: f32) {
        let frames = (secs / self.step.as_secs_f32()).ceil() as u32;
        self.tick(frames);
    }

    pub fn send(&mut self, command: SceneCommand) {
        self.app.world_mut().send_event(command);
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    pub fn world_mut(&mut self) -> &mut World {
        self.app.world_mut()
    }

    pub fn resource<T: Resource>(&self) -> &T {
        self.app.world().resource::<T>()
    }

    pub fn resource_mut<T: Resource>(&mut self) -> Mut<'_, T> {
        self.app.world_mut().resource_mut::<T>()
    }

    pub fn get<T: Component>(&self, entity: Entity) -> &T {
        self.app
            .world()
            .get::<T>(entity)
            .unwrap_or_else(|| panic!("entity {entity:?} has no {}", std::any::type_name::<T>()))
    }

    pub fn get_mut<T: Component>(&mut self, entity: Entity) -> Mut<'_, T> {
        self.app
            .world_mut()
            .get_mut::<T>(entity)
            .unwrap_or_else(|| panic!("entity {entity:?} has no component"))
    }

    pub fn rig(&self) -> &CameraRig {
        self.resource::<CameraRig>()
    }

    pub fn night_events(&self) -> &[NightReached] {
        &self.resource::<NightEventLog>().0
    }
}

impl Default for TestScene {
    fn default() -> Self {
        Self::new()
    }
}
