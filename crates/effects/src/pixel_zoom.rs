//! Conversions between orthographic size and integer pixel-perfect zoom.
//!
//! For a reference vertical resolution `R` and `P` pixels per world unit, an
//! integer zoom `z` renders each source pixel as a `z × z` block when the
//! orthographic half-height is `R / (2 · P · z)`.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

const MIN_ORTHO: f32 = 1e-4;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PixelPerfectSettings {
    pub ref_resolution_y: u32,
    pub pixels_per_unit: u32,
}

impl Default for PixelPerfectSettings {
    fn default() -> Self {
        Self {
            ref_resolution_y: 360,
            pixels_per_unit: 32,
        }
    }
}

impl PixelPerfectSettings {
    /// Orthographic size for an integer zoom (zoom floored at 1).
    pub fn ortho_for_zoom(&self, zoom: u32) -> f32 {
        let res_y = self.ref_resolution_y.max(1) as f32;
        let ppu = self.pixels_per_unit.max(1) as f32;
        res_y / (2.0 * ppu * zoom.max(1) as f32)
    }

    /// Nearest integer zoom for an orthographic size (at least 1).
    pub fn zoom_for_ortho(&self, ortho_size: f32) -> u32 {
        let res_y = self.ref_resolution_y.max(1) as f32;
        let ppu = self.pixels_per_unit.max(1) as f32;
        let z = res_y / (2.0 * ppu * ortho_size.max(MIN_ORTHO));
        (z.round() as u32).max(1)
    }

    /// Snap an orthographic size onto the nearest integer-zoom size.
    pub fn snap(&self, ortho_size: f32) -> f32 {
        self.ortho_for_zoom(self.zoom_for_ortho(ortho_size))
    }
}

/// Pixel-perfect camera state. `None` settings means the camera renders at
/// arbitrary orthographic sizes.
#[derive(Resource, Debug, Clone, Default)]
pub struct PixelPerfect {
    pub settings: Option<PixelPerfectSettings>,
    /// Temporarily off while an ortho tween animates free sizes.
    pub suspended: bool,
}

impl PixelPerfect {
    pub fn is_active(&self) -> bool {
        self.settings.is_some() && !self.suspended
    }

    /// Size the camera should actually render at.
    pub fn effective_size(&self, ortho_size: f32) -> f32 {
        match self.settings {
            Some(settings) if !self.suspended => settings.snap(ortho_size),
            _ => ortho_size,
        }
    }
}
