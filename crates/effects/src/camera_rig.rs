//! Single pose sink for the scene camera.
//!
//! Writers run in a fixed order each tick: follow or tween sets the base pose,
//! the shaker adds its offset on top, and the renderer copies
//! [`CameraRig::compose`] onto the camera.

use bevy::prelude::*;

use crate::control_handles::{ControlHandle, ControlKind};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraPose {
    pub translation: Vec3,
    /// Roll around the view axis, radians.
    pub rotation_z: f32,
    /// Orthographic half-height in world units.
    pub ortho_size: f32,
}

impl Default for CameraPose {
    fn default() -> Self {
        Self {
            translation: Vec3::new(0.0, 0.0, 10.0),
            rotation_z: 0.0,
            ortho_size: 5.0,
        }
    }
}

/// Additive offset produced by the shaker.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ShakeOffset {
    pub translation: Vec2,
    pub rotation_z: f32,
}

impl ShakeOffset {
    pub const ZERO: Self = Self {
        translation: Vec2::ZERO,
        rotation_z: 0.0,
    };
}

/// Marks the camera the rig drives. `ortho_size` seeds the rig at startup.
#[derive(Component, Debug, Clone, Copy)]
pub struct SceneCamera {
    pub ortho_size: f32,
}

/// Keeps the camera at `target + offset` while its follow handle is enabled.
#[derive(Component, Debug, Clone, Copy)]
pub struct CameraFollow {
    pub target: Entity,
    pub offset: Vec3,
}

#[derive(Resource, Debug, Clone)]
pub struct CameraRig {
    pub base: CameraPose,
    pub shake: ShakeOffset,
    /// Viewport width / height, reported by the renderer.
    pub aspect: f32,
    disabled: bool,
}

impl Default for CameraRig {
    fn default() -> Self {
        Self {
            base: CameraPose::default(),
            shake: ShakeOffset::ZERO,
            aspect: 16.0 / 9.0,
            disabled: false,
        }
    }
}

impl CameraRig {
    pub fn compose(&self) -> CameraPose {
        CameraPose {
            translation: self.base.translation + self.shake.translation.extend(0.0),
            rotation_z: self.base.rotation_z + self.shake.rotation_z,
            ortho_size: self.base.ortho_size,
        }
    }

    pub fn is_disabled(&self) -> bool {
        self.disabled
    }

    /// Permanently disable camera effects for this run.
    pub fn disable(&mut self) {
        self.disabled = true;
        self.shake = ShakeOffset::ZERO;
    }
}

/// Seed the rig from the scene camera, or disable it if there is none.
pub fn bind_scene_camera(
    mut rig: ResMut<CameraRig>,
    cameras: Query<(&Transform, &SceneCamera)>,
) {
    match cameras.get_single() {
        Ok((transform, camera)) => {
            rig.base = CameraPose {
                translation: transform.translation,
                rotation_z: transform.rotation.to_euler(EulerRot::XYZ).2,
                ortho_size: camera.ortho_size,
            };
            info!(
                "Camera rig bound at {:?} (ortho size {})",
                rig.base.translation, rig.base.ortho_size
            );
        }
        Err(e) => {
            error!("Camera rig: no usable SceneCamera ({e}); camera effects disabled");
            rig.disable();
        }
    }
}

/// Track the follow target while the camera's follow handle is enabled.
pub fn follow_camera_target(
    mut rig: ResMut<CameraRig>,
    cameras: Query<(&CameraFollow, Option<&ControlHandle>), With<SceneCamera>>,
    targets: Query<&GlobalTransform>,
) {
    if rig.is_disabled() {
        return;
    }
    for (follow, handle) in &cameras {
        let enabled = handle.is_none_or(|h| h.kind != ControlKind::Follow || h.enabled);
        if !enabled {
            continue;
        }
        let Ok(target) = targets.get(follow.target) else {
            continue;
        };
        rig.base.translation = target.translation() + follow.offset;
    }
}
