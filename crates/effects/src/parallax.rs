//! Background layers that move relative to the camera or a tracked entity.
//!
//! Three kinds of motion, each owning the position it wants to show; the
//! rendering crate copies those onto `Transform`s:
//!
//! - [`ParallaxLayer`]: follows camera movement scaled per axis. A factor of
//!   0 stays fixed in the world, 1 moves with the camera.
//! - [`FollowerParallax`]: slides opposite a target's horizontal travel,
//!   clamped and smoothed.
//! - [`ScrollLoop`]: drifts at a constant speed and wraps back to a restart
//!   position (clouds, distant traffic).
//!
//! Camera-relative layers read the unshaken base pose so trauma shake does
//! not leak into the background.

use bevy::prelude::*;

use crate::camera_rig::CameraRig;

/// Smoothing speed at or above which follower offsets snap with no lag.
const INSTANT_SMOOTHING: f32 = 1e3;

/// Round to the nearest whole screen pixel at `pixels_per_unit`.
pub fn snap_to_pixels(value: Vec2, pixels_per_unit: f32) -> Vec2 {
    if pixels_per_unit <= 0.0 {
        return value;
    }
    (value * pixels_per_unit).round() / pixels_per_unit
}

/// `1 - exp(-speed * dt)`: fraction of the remaining gap closed this frame.
#[inline]
fn exp_lerp_factor(speed: f32, dt: f32) -> f32 {
    1.0 - (-speed * dt).exp()
}

// =============================================================================
// Camera-relative parallax
// =============================================================================

#[derive(Component, Debug, Clone)]
pub struct ParallaxLayer {
    /// Per-axis share of camera movement. Set `y` to 0 for horizontal-only.
    pub factor: Vec2,
    /// Snap output to whole pixels when set.
    pub pixels_per_unit: Option<f32>,
    origin: Vec2,
    camera_origin: Option<Vec2>,
    position: Vec2,
}

impl ParallaxLayer {
    pub fn new(origin: Vec2, factor: Vec2) -> Self {
        Self {
            factor,
            pixels_per_unit: None,
            origin,
            camera_origin: None,
            position: origin,
        }
    }

    pub fn with_pixel_snap(mut self, pixels_per_unit: f32) -> Self {
        self.pixels_per_unit = Some(pixels_per_unit);
        self
    }

    /// Where the layer should be drawn this frame.
    pub fn position(&self) -> Vec2 {
        self.position
    }

    /// Recompute from the camera position. The first call records the camera
    /// origin, so the layer starts exactly where it was placed.
    pub fn update(&mut self, camera: Vec2) {
        let camera_origin = *self.camera_origin.get_or_insert(camera);
        let position = self.origin + (camera - camera_origin) * self.factor;
        self.position = match self.pixels_per_unit {
            Some(ppu) => snap_to_pixels(position, ppu),
            None => position,
        };
    }

    /// Re-anchor at the current camera position, e.g. after a teleport.
    pub fn reset_origin(&mut self) {
        self.camera_origin = None;
    }
}

// =============================================================================
// Target-relative parallax
// =============================================================================

#[derive(Component, Debug, Clone)]
pub struct FollowerParallax {
    pub target: Entity,
    /// World units of layer offset per unit of target travel.
    pub responsiveness: f32,
    /// Largest offset either way, in world units.
    pub max_offset: f32,
    /// Exponential smoothing speed; higher is snappier.
    pub smoothing_speed: f32,
    base_x: f32,
    target_start_x: Option<f32>,
    offset: f32,
}

impl FollowerParallax {
    pub fn new(target: Entity, base_x: f32) -> Self {
        Self {
            target,
            responsiveness: 0.05,
            max_offset: 0.5,
            smoothing_speed: 8.0,
            base_x,
            target_start_x: None,
            offset: 0.0,
        }
    }

    pub fn x(&self) -> f32 {
        self.base_x + self.offset
    }

    pub fn offset(&self) -> f32 {
        self.offset
    }

    /// The offset this layer is easing toward for a target at `target_x`.
    fn desired_offset(&self, target_x: f32, start_x: f32) -> f32 {
        let limit = self.max_offset.abs();
        (-(target_x - start_x) * self.responsiveness).clamp(-limit, limit)
    }

    pub fn update(&mut self, target_x: f32, dt: f32) {
        let start_x = *self.target_start_x.get_or_insert(target_x);
        let desired = self.desired_offset(target_x, start_x);
        if self.smoothing_speed >= INSTANT_SMOOTHING {
            self.offset = desired;
            return;
        }
        let t = exp_lerp_factor(self.smoothing_speed.max(0.0), dt.max(0.0));
        self.offset += (desired - self.offset) * t;
    }
}

// =============================================================================
// Scrolling loop
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScrollDirection {
    #[default]
    Left,
    Right,
}

impl ScrollDirection {
    fn sign(self) -> f32 {
        match self {
            ScrollDirection::Left => -1.0,
            ScrollDirection::Right => 1.0,
        }
    }
}

#[derive(Component, Debug, Clone)]
pub struct ScrollLoop {
    pub direction: ScrollDirection,
    speed: f32,
    /// Passing this x wraps the layer back to `restart_x`.
    pub end_x: f32,
    pub restart_x: f32,
    x: f32,
}

impl ScrollLoop {
    pub fn new(start_x: f32, direction: ScrollDirection, speed: f32, end_x: f32, restart_x: f32) -> Self {
        Self {
            direction,
            speed: speed.max(0.0),
            end_x,
            restart_x,
            x: start_x,
        }
    }

    pub fn x(&self) -> f32 {
        self.x
    }

    pub fn speed(&self) -> f32 {
        self.speed
    }

    /// Negative speeds are clamped to 0; use `direction` to reverse.
    pub fn set_speed(&mut self, speed: f32) {
        self.speed = speed.max(0.0);
    }

    pub fn tick(&mut self, dt: f32) {
        self.x += self.direction.sign() * self.speed * dt.max(0.0);
        let passed = match self.direction {
            ScrollDirection::Left => self.x <= self.end_x,
            ScrollDirection::Right => self.x >= self.end_x,
        };
        if passed {
            self.x = self.restart_x;
        }
    }
}

// =============================================================================
// Systems
// =============================================================================

pub fn update_parallax_layers(rig: Res<CameraRig>, mut layers: Query<&mut ParallaxLayer>) {
    if rig.is_disabled() {
        return;
    }
    let camera = rig.base.translation.truncate();
    for mut layer in &mut layers {
        layer.update(camera);
    }
}

pub fn update_follower_parallax(
    time: Res<Time>,
    targets: Query<&GlobalTransform>,
    mut layers: Query<&mut FollowerParallax>,
) {
    let dt = time.delta_secs();
    for mut layer in &mut layers {
        // A despawned target leaves the layer where it is.
        let Ok(target) = targets.get(layer.target) else {
            continue;
        };
        layer.update(target.translation().x, dt);
    }
}

pub fn tick_scroll_loops(time: Res<Time>, mut loops: Query<&mut ScrollLoop>) {
    let dt = time.delta_secs();
    for mut scroll in &mut loops {
        scroll.tick(dt);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layer_starts_where_placed() {
        let mut layer = ParallaxLayer::new(Vec2::new(3.0, 1.0), Vec2::new(0.5, 0.5));
        layer.update(Vec2::new(40.0, 7.0));
        assert_eq!(layer.position(), Vec2::new(3.0, 1.0));
    }

    #[test]
    fn test_factor_scales_camera_delta_per_axis() {
        let mut layer = ParallaxLayer::new(Vec2::ZERO, Vec2::new(0.5, 0.0));
        layer.update(Vec2::ZERO);
        layer.update(Vec2::new(10.0, 4.0));
        assert_eq!(layer.position(), Vec2::new(5.0, 0.0));
    }

    #[test]
    fn test_factor_one_moves_with_camera() {
        let mut layer = ParallaxLayer::new(Vec2::new(1.0, 2.0), Vec2::ONE);
        layer.update(Vec2::new(-2.0, 0.0));
        layer.update(Vec2::new(3.0, 1.5));
        assert_eq!(layer.position(), Vec2::new(6.0, 3.5));
    }

    #[test]
    fn test_pixel_snap_rounds_to_whole_pixels() {
        let mut layer = ParallaxLayer::new(Vec2::ZERO, Vec2::splat(0.3)).with_pixel_snap(16.0);
        layer.update(Vec2::ZERO);
        layer.update(Vec2::new(1.0, 0.0));
        // 0.3 * 16 = 4.8 px rounds to 5 px.
        assert_eq!(layer.position(), Vec2::new(5.0 / 16.0, 0.0));
    }

    #[test]
    fn test_reset_origin_reanchors() {
        let mut layer = ParallaxLayer::new(Vec2::ZERO, Vec2::splat(0.5));
        layer.update(Vec2::ZERO);
        layer.update(Vec2::new(100.0, 0.0));
        layer.reset_origin();
        layer.update(Vec2::new(100.0, 0.0));
        assert_eq!(layer.position(), Vec2::ZERO);
    }

    #[test]
    fn test_follower_offset_opposes_travel_and_clamps() {
        let mut layer = FollowerParallax::new(Entity::from_raw(1), 2.0);
        layer.smoothing_speed = INSTANT_SMOOTHING;
        layer.update(10.0, 0.016);
        assert_eq!(layer.x(), 2.0);

        layer.update(14.0, 0.016);
        assert!((layer.offset() + 0.2).abs() < 1e-6);

        layer.update(1000.0, 0.016);
        assert_eq!(layer.offset(), -0.5);
        layer.update(-1000.0, 0.016);
        assert_eq!(layer.offset(), 0.5);
    }

    #[test]
    fn test_follower_smoothing_converges() {
        let mut layer = FollowerParallax::new(Entity::from_raw(1), 0.0);
        layer.update(0.0, 0.016);
        layer.update(4.0, 1.0 / 60.0);
        let first = layer.offset();
        assert!(first < 0.0 && first > -0.2, "offset {first}");
        for _ in 0..300 {
            layer.update(4.0, 1.0 / 60.0);
        }
        assert!((layer.offset() + 0.2).abs() < 1e-4);
    }

    #[test]
    fn test_scroll_left_wraps_to_restart() {
        let mut scroll = ScrollLoop::new(0.0, ScrollDirection::Left, 2.0, -3.0, 5.0);
        scroll.tick(1.0);
        assert_eq!(scroll.x(), -2.0);
        scroll.tick(0.5);
        assert_eq!(scroll.x(), 5.0);
    }

    #[test]
    fn test_scroll_right_wraps_to_restart() {
        let mut scroll = ScrollLoop::new(0.0, ScrollDirection::Right, 1.0, 2.0, -4.0);
        scroll.tick(1.5);
        assert_eq!(scroll.x(), 1.5);
        scroll.tick(0.5);
        assert_eq!(scroll.x(), -4.0);
    }

    #[test]
    fn test_scroll_speed_never_negative() {
        let mut scroll = ScrollLoop::new(0.0, ScrollDirection::Right, -3.0, 10.0, 0.0);
        assert_eq!(scroll.speed(), 0.0);
        scroll.tick(1.0);
        assert_eq!(scroll.x(), 0.0);
        scroll.set_speed(-1.0);
        assert_eq!(scroll.speed(), 0.0);
    }
}
