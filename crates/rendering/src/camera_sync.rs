use bevy::prelude::*;
use bevy::render::camera::ScalingMode;
use bevy::window::PrimaryWindow;

use effects::camera_rig::{CameraPose, CameraRig, SceneCamera};
use effects::pixel_zoom::PixelPerfect;

/// Projection whose `scale` equals the orthographic half-height in world units.
pub fn scene_projection(ortho_size: f32) -> OrthographicProjection {
    OrthographicProjection {
        scaling_mode: ScalingMode::FixedVertical {
            viewport_height: 2.0,
        },
        scale: ortho_size,
        ..OrthographicProjection::default_2d()
    }
}

/// Camera transform for a composed pose.
pub fn pose_transform(pose: &CameraPose) -> Transform {
    Transform {
        translation: pose.translation,
        rotation: Quat::from_rotation_z(pose.rotation_z),
        ..default()
    }
}

/// Write the composed rig pose onto the scene camera.
pub fn apply_camera_rig(
    rig: Res<CameraRig>,
    pixel: Res<PixelPerfect>,
    mut cameras: Query<(&mut Transform, &mut OrthographicProjection), With<SceneCamera>>,
) {
    if rig.is_disabled() {
        return;
    }
    let pose = rig.compose();
    for (mut transform, mut projection) in &mut cameras {
        *transform = pose_transform(&pose);
        let scale = pixel.effective_size(pose.ortho_size);
        if projection.scale != scale {
            projection.scale = scale;
        }
    }
}

/// Feed the window aspect ratio back into the rig for zoom fitting.
pub fn report_viewport_aspect(
    windows: Query<&Window, With<PrimaryWindow>>,
    mut rig: ResMut<CameraRig>,
) {
    let Ok(window) = windows.get_single() else {
        return;
    };
    let (w, h) = (window.width(), window.height());
    if w <= 0.0 || h <= 0.0 {
        return;
    }
    let aspect = w / h;
    if (rig.aspect - aspect).abs() > f32::EPSILON {
        rig.aspect = aspect;
    }
}
