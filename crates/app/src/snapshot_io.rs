//! Quick save / quick load of scene effect state, plus a save on exit.
//!
//! Event detection runs as a light system; the file work happens in one
//! exclusive system at the end of the frame.

use std::path::PathBuf;

use bevy::prelude::*;

use effects::persistence::{load_snapshot_file, save_snapshot_file};

/// Where snapshots are written and read.
#[derive(Resource, Debug, Clone)]
pub struct SnapshotPath(pub PathBuf);

#[derive(Event)]
pub struct SaveSnapshotEvent;

#[derive(Event)]
pub struct LoadSnapshotEvent;

#[derive(Resource, Default, Debug, PartialEq)]
struct PendingSnapshotIo {
    save: bool,
    load: bool,
}

pub struct SnapshotIoPlugin {
    pub path: PathBuf,
}

impl Plugin for SnapshotIoPlugin {
    fn build(&self, app: &mut App) {
        app.insert_resource(SnapshotPath(self.path.clone()))
            .init_resource::<PendingSnapshotIo>()
            .add_event::<SaveSnapshotEvent>()
            .add_event::<LoadSnapshotEvent>()
            .add_systems(Update, snapshot_keybinds)
            .add_systems(
                Last,
                (detect_snapshot_requests, run_snapshot_io).chain(),
            );
    }
}

/// F5 saves, F9 loads.
fn snapshot_keybinds(
    keys: Res<ButtonInput<KeyCode>>,
    mut save: EventWriter<SaveSnapshotEvent>,
    mut load: EventWriter<LoadSnapshotEvent>,
) {
    if keys.just_pressed(KeyCode::F5) {
        save.send(SaveSnapshotEvent);
    }
    if keys.just_pressed(KeyCode::F9) {
        load.send(LoadSnapshotEvent);
    }
}

fn detect_snapshot_requests(
    mut saves: EventReader<SaveSnapshotEvent>,
    mut loads: EventReader<LoadSnapshotEvent>,
    mut exits: EventReader<AppExit>,
    mut pending: ResMut<PendingSnapshotIo>,
) {
    if saves.read().count() > 0 || exits.read().count() > 0 {
        pending.save = true;
    }
    if loads.read().count() > 0 {
        pending.load = true;
    }
}

fn run_snapshot_io(world: &mut World) {
    let pending = std::mem::take(&mut *world.resource_mut::<PendingSnapshotIo>());
    if pending == PendingSnapshotIo::default() {
        return;
    }
    let path = world.resource::<SnapshotPath>().0.clone();

    if pending.load {
        if let Err(e) = load_snapshot_file(world, &path) {
            warn!("Failed to load scene snapshot {}: {e}", path.display());
        }
    }
    if pending.save {
        if let Err(e) = save_snapshot_file(world, &path) {
            error!("Failed to save scene snapshot {}: {e}", path.display());
        }
    }
}

/// Restore a snapshot left by a previous run, if any. Call after plugins are
/// added and before the app runs.
pub fn load_startup_snapshot(world: &mut World, path: &std::path::Path) {
    if !path.exists() {
        return;
    }
    if let Err(e) = load_snapshot_file(world, path) {
        warn!("Ignoring unreadable snapshot {}: {e}", path.display());
    }
}
