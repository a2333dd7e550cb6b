//! Scene snapshot persistence via the extension-map pattern.
//!
//! Each persistent resource implements [`Saveable`] and registers itself with
//! `app.register_saveable::<T>()`. A snapshot is a versioned map from save key
//! to that resource's own bitcode bytes, so adding a persistent resource never
//! touches the snapshot format.

use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::Write;
use std::path::Path;

use bevy::prelude::*;
use bitcode::{Decode, Encode};

use crate::error::SceneFxError;

pub const CURRENT_SNAPSHOT_VERSION: u32 = 1;

// ---------------------------------------------------------------------------
// Saveable trait + registry
// ---------------------------------------------------------------------------

/// A resource that round-trips through the snapshot extension map.
pub trait Saveable: Resource + Default + Send + Sync + 'static {
    /// Stable key for this resource in the extension map.
    const SAVE_KEY: &'static str;

    /// Serialize this resource. `None` skips it (e.g. nothing worth keeping).
    fn save_to_bytes(&self) -> Option<Vec<u8>>;

    /// Rebuild the resource from saved bytes. `current` is the live resource,
    /// so run-time configuration that is not saved can be carried over.
    fn load_from_bytes(current: &Self, bytes: &[u8]) -> Self;
}

/// Decode one snapshot extension. Unreadable bytes leave that resource at its
/// empty state so the rest of the snapshot still loads.
pub fn decode_or_warn<T: bitcode::DecodeOwned + Default>(key: &str, bytes: &[u8]) -> T {
    bitcode::decode(bytes).unwrap_or_else(|e| {
        warn!("Snapshot entry '{key}' is unreadable ({} bytes), using empty state: {e}", bytes.len());
        T::default()
    })
}

pub type SaveFn = Box<dyn Fn(&World) -> Option<Vec<u8>> + Send + Sync>;
pub type LoadFn = Box<dyn Fn(&mut World, &[u8]) + Send + Sync>;

pub struct SaveableEntry {
    pub key: String,
    pub save_fn: SaveFn,
    pub load_fn: LoadFn,
}

#[derive(Resource, Default)]
pub struct SaveableRegistry {
    pub entries: Vec<SaveableEntry>,
}

impl SaveableRegistry {
    /// Register a resource type. A second registration of the same key is
    /// ignored with a warning.
    pub fn register<T: Saveable>(&mut self) {
        let key = T::SAVE_KEY.to_string();
        if self.entries.iter().any(|e| e.key == key) {
            warn!("SaveableRegistry: duplicate key '{key}', ignoring second registration");
            return;
        }
        self.entries.push(SaveableEntry {
            key,
            save_fn: Box::new(|world: &World| {
                world.get_resource::<T>().and_then(|r| r.save_to_bytes())
            }),
            load_fn: Box::new(|world: &mut World, bytes: &[u8]| {
                let value = match world.get_resource::<T>() {
                    Some(current) => T::load_from_bytes(current, bytes),
                    None => T::load_from_bytes(&T::default(), bytes),
                };
                world.insert_resource(value);
            }),
        });
    }

    pub fn save_all(&self, world: &World) -> BTreeMap<String, Vec<u8>> {
        let mut extensions = BTreeMap::new();
        for entry in &self.entries {
            if let Some(bytes) = (entry.save_fn)(world) {
                extensions.insert(entry.key.clone(), bytes);
            }
        }
        extensions
    }

    /// Resources whose key is absent keep their current value.
    pub fn load_all(&self, world: &mut World, extensions: &BTreeMap<String, Vec<u8>>) {
        for entry in &self.entries {
            if let Some(bytes) = extensions.get(&entry.key) {
                (entry.load_fn)(world, bytes);
            }
        }
    }
}

/// One-line saveable registration from a plugin's `build`.
pub trait SaveableAppExt {
    fn register_saveable<T: Saveable>(&mut self) -> &mut Self;
}

impl SaveableAppExt for App {
    fn register_saveable<T: Saveable>(&mut self) -> &mut Self {
        self.init_resource::<SaveableRegistry>();
        self.world_mut()
            .resource_mut::<SaveableRegistry>()
            .register::<T>();
        self
    }
}

// ---------------------------------------------------------------------------
// Snapshot
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Encode, Decode)]
pub struct SceneSnapshot {
    pub version: u32,
    pub extensions: BTreeMap<String, Vec<u8>>,
}

impl SceneSnapshot {
    pub fn encode(&self) -> Vec<u8> {
        bitcode::encode(self)
    }

    pub fn decode(bytes: &[u8]) -> Result<Self, SceneFxError> {
        let snapshot: Self = bitcode::decode(bytes)?;
        if snapshot.version > CURRENT_SNAPSHOT_VERSION {
            return Err(SceneFxError::VersionMismatch {
                expected_max: CURRENT_SNAPSHOT_VERSION,
                found: snapshot.version,
            });
        }
        Ok(snapshot)
    }
}

/// Collect every registered resource into a snapshot.
pub fn capture_snapshot(world: &World) -> SceneSnapshot {
    let extensions = world
        .get_resource::<SaveableRegistry>()
        .map(|registry| registry.save_all(world))
        .unwrap_or_default();
    SceneSnapshot {
        version: CURRENT_SNAPSHOT_VERSION,
        extensions,
    }
}

/// Write a snapshot's entries back into the world.
pub fn restore_snapshot(world: &mut World, snapshot: &SceneSnapshot) {
    if !world.contains_resource::<SaveableRegistry>() {
        warn!("No SaveableRegistry; snapshot ignored");
        return;
    }
    world.resource_scope(|world, registry: Mut<SaveableRegistry>| {
        registry.load_all(world, &snapshot.extensions);
    });
}

/// Write `data` to `{path}.tmp`, sync it, then rename over `path`, so a crash
/// mid-write leaves the previous snapshot intact.
fn atomic_write(path: &Path, data: &[u8]) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    let mut tmp_path = path.as_os_str().to_owned();
    tmp_path.push(".tmp");

    let mut file = File::create(&tmp_path)?;
    file.write_all(data)?;
    file.sync_all()?;
    fs::rename(&tmp_path, path)?;
    Ok(())
}

pub fn save_snapshot_file(world: &World, path: impl AsRef<Path>) -> Result<(), SceneFxError> {
    let path = path.as_ref();
    let snapshot = capture_snapshot(world);
    atomic_write(path, &snapshot.encode())?;
    info!(
        "Saved scene snapshot ({} entries) to {}",
        snapshot.extensions.len(),
        path.display()
    );
    Ok(())
}

pub fn load_snapshot_file(world: &mut World, path: impl AsRef<Path>) -> Result<(), SceneFxError> {
    let path = path.as_ref();
    let bytes = fs::read(path)?;
    let snapshot = SceneSnapshot::decode(&bytes)?;
    restore_snapshot(world, &snapshot);
    info!(
        "Loaded scene snapshot ({} entries) from {}",
        snapshot.extensions.len(),
        path.display()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Resource, Default, Debug, PartialEq)]
    struct TestCounter {
        value: u32,
        label: &'static str,
    }

    impl Saveable for TestCounter {
        const SAVE_KEY: &'static str = "test_counter";

        fn save_to_bytes(&self) -> Option<Vec<u8>> {
            if self.value == 0 {
                None
            } else {
                Some(self.value.to_le_bytes().to_vec())
            }
        }

        fn load_from_bytes(current: &Self, bytes: &[u8]) -> Self {
            let value = u32::from_le_bytes(bytes.try_into().unwrap_or([0; 4]));
            TestCounter {
                value,
                label: current.label,
            }
        }
    }

    fn app_with_counter(value: u32) -> App {
        let mut app = App::new();
        app.insert_resource(TestCounter {
            value,
            label: "live",
        });
        app.register_saveable::<TestCounter>();
        app
    }

    #[test]
    fn test_registry_round_trip_keeps_unsaved_fields() {
        let mut app = app_with_counter(7);
        let snapshot = capture_snapshot(app.world_mut());
        assert!(snapshot.extensions.contains_key("test_counter"));

        app.world_mut().resource_mut::<TestCounter>().value = 1;
        restore_snapshot(app.world_mut(), &snapshot);
        let counter = app.world().resource::<TestCounter>();
        assert_eq!(counter.value, 7);
        assert_eq!(counter.label, "live");
    }

    #[test]
    fn test_default_state_is_skipped() {
        let mut app = app_with_counter(0);
        let snapshot = capture_snapshot(app.world_mut());
        assert!(snapshot.extensions.is_empty());
    }

    #[test]
    fn test_duplicate_registration_ignored() {
        let mut app = app_with_counter(1);
        app.register_saveable::<TestCounter>();
        assert_eq!(app.world().resource::<SaveableRegistry>().entries.len(), 1);
    }

    #[test]
    fn test_snapshot_bytes_round_trip() {
        let mut extensions = BTreeMap::new();
        extensions.insert("a".to_string(), vec![1, 2, 3]);
        let snapshot = SceneSnapshot {
            version: CURRENT_SNAPSHOT_VERSION,
            extensions,
        };
        assert_eq!(SceneSnapshot::decode(&snapshot.encode()).unwrap(), snapshot);
    }

    #[test]
    fn test_newer_version_rejected() {
        let snapshot = SceneSnapshot {
            version: CURRENT_SNAPSHOT_VERSION + 1,
            extensions: BTreeMap::new(),
        };
        let err = SceneSnapshot::decode(&snapshot.encode()).unwrap_err();
        assert!(matches!(err, SceneFxError::VersionMismatch { .. }));
    }

    #[test]
    fn test_garbage_bytes_are_decode_error() {
        let err = SceneSnapshot::decode(&[]).unwrap_err();
        assert!(matches!(err, SceneFxError::Decode(_)));
    }

    #[test]
    fn test_snapshot_file_round_trip() {
        let dir = std::env::temp_dir().join("dusk_snapshot_file_round_trip");
        let _ = fs::remove_dir_all(&dir);
        let path = dir.join("scene.bin");

        let mut app = app_with_counter(42);
        save_snapshot_file(app.world_mut(), &path).unwrap();
        assert!(!dir.join("scene.bin.tmp").exists());

        app.world_mut().resource_mut::<TestCounter>().value = 3;
        load_snapshot_file(app.world_mut(), &path).unwrap();
        assert_eq!(app.world().resource::<TestCounter>().value, 42);
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let mut app = app_with_counter(1);
        let err = load_snapshot_file(app.world_mut(), "/nonexistent/dusk/scene.bin").unwrap_err();
        assert!(matches!(err, SceneFxError::Io(_)));
    }
}
