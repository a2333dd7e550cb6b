//! Timed camera pan/zoom shots: move to an anchor, hold, return.
//!
//! ```text
//! Idle --begin--> Move --> Hold --> Return --> Idle
//! ```
//!
//! Only one shot runs at a time; requests that arrive while busy are dropped,
//! never queued. Every stage eases with ease-in-out-quad and is sampled once per
//! tick. Durations are floored at [`MIN_STAGE_SECS`], so a zero-length stage
//! completes in a single step.
//!
//! Finishing a shot restores the captured start pose verbatim; the ECS side
//! also thaws the frozen control handles and resumes pixel-perfect snapping.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::camera_rig::{CameraPose, CameraRig};
use crate::commands::SceneCommand;
use crate::control_handles::{ControlHandle, FreezePolicy, FrozenHandles, PhysicsBody};
use crate::pixel_zoom::{PixelPerfect, PixelPerfectSettings};

pub const MIN_STAGE_SECS: f32 = 1e-4;

// =============================================================================
// Easing
// =============================================================================

/// Quadratic ease-in-out on `[0, 1]`.
#[inline]
pub fn ease_in_out_quad(t: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    if t < 0.5 {
        2.0 * t * t
    } else {
        1.0 - (-2.0 * t + 2.0).powi(2) * 0.5
    }
}

#[inline]
fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// Half-height needed to keep `point` visible from a camera centered on `center`.
pub fn fit_ortho_size(center: Vec2, point: Vec2, margin: f32, aspect: f32) -> f32 {
    let dx = (point.x - center.x).abs() + margin;
    let dy = (point.y - center.y).abs() + margin;
    dy.max(dx / aspect.max(1e-4))
}

// =============================================================================
// Requests
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OrthoZoom {
    pub fit_scale: f32,
    /// World units added after fitting.
    pub extra_ortho: f32,
    /// Absolute target size; wins over everything else when set.
    pub absolute_target_ortho: Option<f32>,
    /// Absolute integer pixel zoom; wins over the fitted size when set.
    pub absolute_pixel_zoom: Option<u32>,
}

impl Default for OrthoZoom {
    fn default() -> Self {
        Self {
            fit_scale: 1.0,
            extra_ortho: 0.0,
            absolute_target_ortho: None,
            absolute_pixel_zoom: None,
        }
    }
}

impl OrthoZoom {
    /// Target orthographic size. Never smaller than `start`.
    pub fn target_size(
        &self,
        start: f32,
        fit: f32,
        pixel: Option<&PixelPerfectSettings>,
    ) -> f32 {
        if let Some(absolute) = self.absolute_target_ortho.filter(|v| *v > 0.0) {
            return start.max(absolute);
        }
        if let (Some(zoom), Some(pixel)) = (self.absolute_pixel_zoom.filter(|z| *z > 0), pixel) {
            return start.max(pixel.ortho_for_zoom(zoom));
        }
        start.max(fit * self.fit_scale.max(0.01)) + self.extra_ortho.max(0.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ZoomMethod {
    /// Pan only; the orthographic size is left alone.
    PanOnly,
    /// Animate a free orthographic size.
    Ortho(OrthoZoom),
    /// Step through integer pixel-perfect zoom levels.
    PixelZoom { target_zoom: u32 },
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TweenTiming {
    pub move_secs: f32,
    pub hold_secs: f32,
    pub return_secs: f32,
}

impl Default for TweenTiming {
    fn default() -> Self {
        Self {
            move_secs: 1.0,
            hold_secs: 1.0,
            return_secs: 1.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TweenRequest {
    /// Entity whose position the camera centers on.
    pub anchor: Option<Entity>,
    pub timing: TweenTiming,
    pub zoom: ZoomMethod,
}

/// Everything `begin` needs to know about the world at the moment of the request.
#[derive(Debug, Clone, Copy)]
pub struct TweenContext {
    pub start: CameraPose,
    pub destination: Option<Vec2>,
    /// Point to keep in frame (usually the player).
    pub tracked_point: Option<Vec2>,
    pub aspect: f32,
    pub pixel_perfect: Option<PixelPerfectSettings>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TweenRejection {
    /// A shot is already running.
    Busy,
    /// No destination could be resolved.
    MissingDestination,
}

impl fmt::Display for TweenRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TweenRejection::Busy => write!(f, "a camera shot is already running"),
            TweenRejection::MissingDestination => write!(f, "camera shot has no destination"),
        }
    }
}

impl std::error::Error for TweenRejection {}

// =============================================================================
// Settings
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TweenSettings {
    /// Padding around the tracked point when fitting.
    pub fit_margin: f32,
    /// Snap to the nearest integer zoom once a shot finishes.
    pub snap_after: bool,
    /// Turn pixel-perfect snapping off while an ortho shot animates.
    pub suspend_pixel_perfect_during_ortho: bool,
    pub freeze: FreezePolicy,
}

impl Default for TweenSettings {
    fn default() -> Self {
        Self {
            fit_margin: 0.5,
            snap_after: true,
            suspend_pixel_perfect_during_ortho: true,
            freeze: FreezePolicy::default(),
        }
    }
}

// =============================================================================
// State machine
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TweenStage {
    Move,
    Hold,
    Return,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum ZoomPlan {
    Fixed,
    Ortho {
        target: f32,
    },
    Pixel {
        start_zoom: u32,
        end_zoom: u32,
        settings: PixelPerfectSettings,
    },
}

#[derive(Debug, Clone)]
struct ActiveTween {
    stage: TweenStage,
    elapsed: f32,
    timing: TweenTiming,
    start: CameraPose,
    target: Vec3,
    zoom: ZoomPlan,
    frozen: FrozenHandles,
}

impl ActiveTween {
    fn stage_duration(&self) -> f32 {
        let secs = match self.stage {
            TweenStage::Move => self.timing.move_secs,
            TweenStage::Hold => self.timing.hold_secs,
            TweenStage::Return => self.timing.return_secs,
        };
        secs.max(MIN_STAGE_SECS)
    }

    /// Orthographic size at eased progress `e` from start (0) to target (1).
    fn size_at(&self, e: f32) -> f32 {
        match self.zoom {
            ZoomPlan::Fixed => self.start.ortho_size,
            ZoomPlan::Ortho { target } => lerp(self.start.ortho_size, target, e),
            ZoomPlan::Pixel {
                start_zoom,
                end_zoom,
                settings,
            } => {
                let z = lerp(start_zoom as f32, end_zoom as f32, e).round().max(1.0) as u32;
                settings.ortho_for_zoom(z)
            }
        }
    }

    fn sample(&self, u: f32) -> CameraPose {
        let e = ease_in_out_quad(u);
        let (translation, size) = match self.stage {
            TweenStage::Move => (self.start.translation.lerp(self.target, e), self.size_at(e)),
            TweenStage::Hold => (self.target, self.size_at(1.0)),
            TweenStage::Return => (
                self.target.lerp(self.start.translation, e),
                self.size_at(1.0 - e),
            ),
        };
        CameraPose {
            translation,
            rotation_z: self.start.rotation_z,
            ortho_size: size,
        }
    }
}

/// Result of advancing the tweener by one tick.
#[derive(Debug)]
pub enum TweenStep {
    Idle,
    Active(CameraPose),
    /// The shot ended this tick; carries the restored pose and what to thaw.
    Finished {
        pose: CameraPose,
        frozen: FrozenHandles,
    },
}

#[derive(Resource, Debug, Clone, Default)]
pub struct CameraTweener {
    pub settings: TweenSettings,
    active: Option<ActiveTween>,
}

impl CameraTweener {
    pub fn new(settings: TweenSettings) -> Self {
        Self {
            settings,
            active: None,
        }
    }

    pub fn is_running(&self) -> bool {
        self.active.is_some()
    }

    pub fn stage(&self) -> Option<TweenStage> {
        self.active.as_ref().map(|a| a.stage)
    }

    /// Check a request without starting it. Returns the resolved destination.
    pub fn validate(&self, ctx: &TweenContext) -> Result<Vec2, TweenRejection> {
        if self.active.is_some() {
            return Err(TweenRejection::Busy);
        }
        ctx.destination.ok_or(TweenRejection::MissingDestination)
    }

    /// Start a shot. Nothing changes when the request is rejected.
    ///
    /// Returns whether the shot animates a free ortho size, in which case the
    /// caller suspends pixel-perfect snapping.
    pub fn begin(
        &mut self,
        request: &TweenRequest,
        ctx: &TweenContext,
        frozen: FrozenHandles,
    ) -> Result<bool, TweenRejection> {
        let destination = self.validate(ctx)?;

        let start = ctx.start;
        let target = destination.extend(start.translation.z);
        let fit = match ctx.tracked_point {
            Some(point) => fit_ortho_size(destination, point, self.settings.fit_margin, ctx.aspect),
            None => start.ortho_size,
        };

        let zoom = match (request.zoom, ctx.pixel_perfect) {
            (ZoomMethod::PanOnly, _) => ZoomPlan::Fixed,
            (ZoomMethod::Ortho(ortho), pixel) => ZoomPlan::Ortho {
                target: ortho.target_size(start.ortho_size, fit, pixel.as_ref()),
            },
            (ZoomMethod::PixelZoom { target_zoom }, Some(settings)) => ZoomPlan::Pixel {
                start_zoom: settings.zoom_for_ortho(start.ortho_size),
                end_zoom: target_zoom.max(1),
                settings,
            },
            (ZoomMethod::PixelZoom { .. }, None) => {
                warn!("Pixel zoom requested without pixel-perfect settings; falling back to ortho zoom");
                ZoomPlan::Ortho {
                    target: OrthoZoom::default().target_size(start.ortho_size, fit, None),
                }
            }
        };

        let free_ortho = matches!(zoom, ZoomPlan::Ortho { .. });
        self.active = Some(ActiveTween {
            stage: TweenStage::Move,
            elapsed: 0.0,
            timing: request.timing,
            start,
            target,
            zoom,
            frozen,
        });
        Ok(free_ortho)
    }

    /// Advance the running shot by `dt` seconds.
    pub fn tick(&mut self, dt: f32) -> TweenStep {
        let Some(active) = self.active.as_mut() else {
            return TweenStep::Idle;
        };

        active.elapsed += dt.max(0.0);
        let duration = active.stage_duration();
        let u = (active.elapsed / duration).clamp(0.0, 1.0);
        let pose = active.sample(u);

        if active.elapsed < duration {
            return TweenStep::Active(pose);
        }

        match active.stage {
            TweenStage::Move => {
                active.stage = TweenStage::Hold;
                active.elapsed = 0.0;
                TweenStep::Active(pose)
            }
            TweenStage::Hold => {
                active.stage = TweenStage::Return;
                active.elapsed = 0.0;
                TweenStep::Active(pose)
            }
            TweenStage::Return => {
                let finished = self.active.take().map(|a| (a.start, a.frozen));
                match finished {
                    Some((start, frozen)) => TweenStep::Finished {
                        pose: start,
                        frozen,
                    },
                    None => TweenStep::Idle,
                }
            }
        }
    }
}

// =============================================================================
// Systems
// =============================================================================

/// Marks the entity a shot keeps in frame when fitting its zoom.
#[derive(Component, Debug, Clone, Copy, Default)]
pub struct TweenFocus;

/// Start shots requested through [`SceneCommand`]. Handles are only frozen
/// once the request is known to be accepted.
#[allow(clippy::too_many_arguments)]
pub fn begin_camera_tweens(
    mut events: EventReader<SceneCommand>,
    mut tweener: ResMut<CameraTweener>,
    rig: Res<CameraRig>,
    mut pixel: ResMut<PixelPerfect>,
    anchors: Query<&GlobalTransform>,
    focus: Query<&GlobalTransform, With<TweenFocus>>,
    mut handles: Query<(Entity, &mut ControlHandle)>,
    mut bodies: Query<(Entity, &mut PhysicsBody)>,
) {
    for event in events.read() {
        let request = match event {
            SceneCommand::BeginTween(request) => *request,
            SceneCommand::BeginPanOnly { anchor, timing } => TweenRequest {
                anchor: *anchor,
                timing: *timing,
                zoom: ZoomMethod::PanOnly,
            },
            _ => continue,
        };
        if rig.is_disabled() {
            debug!("Camera shot ignored: camera rig is disabled");
            continue;
        }

        let ctx = TweenContext {
            start: rig.base,
            destination: request
                .anchor
                .and_then(|e| anchors.get(e).ok())
                .map(|t| t.translation().truncate()),
            tracked_point: focus.iter().next().map(|t| t.translation().truncate()),
            aspect: rig.aspect,
            pixel_perfect: pixel.settings,
        };
        if let Err(rejection) = tweener.validate(&ctx) {
            debug!("Camera shot rejected: {rejection}");
            continue;
        }

        let policy = tweener.settings.freeze;
        let mut frozen = FrozenHandles::default();
        for (entity, mut handle) in &mut handles {
            frozen.freeze_handle(entity, &mut handle);
        }
        for (entity, mut body) in &mut bodies {
            frozen.freeze_body(entity, &mut body, &policy);
        }

        match tweener.begin(&request, &ctx, frozen) {
            Ok(free_ortho) => {
                if free_ortho && tweener.settings.suspend_pixel_perfect_during_ortho {
                    pixel.suspended = true;
                }
                debug!("Camera shot started toward {:?}", ctx.destination);
            }
            Err(rejection) => debug!("Camera shot rejected: {rejection}"),
        }
    }
}

pub fn advance_camera_tween(
    time: Res<Time>,
    mut tweener: ResMut<CameraTweener>,
    mut rig: ResMut<CameraRig>,
    mut pixel: ResMut<PixelPerfect>,
    mut handles: Query<(Entity, &mut ControlHandle)>,
    mut bodies: Query<(Entity, &mut PhysicsBody)>,
) {
    if rig.is_disabled() {
        return;
    }
    match tweener.tick(time.delta_secs()) {
        TweenStep::Idle => {}
        TweenStep::Active(pose) => rig.base = pose,
        TweenStep::Finished { pose, frozen } => {
            rig.base = pose;
            for (entity, mut handle) in &mut handles {
                frozen.thaw_handle(entity, &mut handle);
            }
            for (entity, mut body) in &mut bodies {
                frozen.thaw_body(entity, &mut body);
            }
            pixel.suspended = false;
            if tweener.settings.snap_after {
                if let Some(settings) = pixel.settings {
                    rig.base.ortho_size = settings.snap(rig.base.ortho_size);
                }
            }
            debug!("Camera shot finished at {:?}", rig.base.translation);
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
