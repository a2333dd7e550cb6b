use bevy::prelude::*;

use effects::light::GlobalLight2d;

/// Sprites carrying this are modulated by the scene-wide light.
#[derive(Component, Debug, Clone, Copy, Default)]
pub struct Lit;

/// Background color the scene light is applied to.
#[derive(Resource, Debug, Clone, Copy)]
pub struct SkyBase(pub Srgba);

impl Default for SkyBase {
    fn default() -> Self {
        Self(Srgba::new(0.55, 0.75, 0.95, 1.0))
    }
}

/// RGB multiplier for a light: color scaled by intensity, alpha 1.
pub fn light_multiplier(light: &GlobalLight2d) -> Srgba {
    let i = light.intensity.max(0.0);
    Srgba::new(
        light.color.red * i,
        light.color.green * i,
        light.color.blue * i,
        1.0,
    )
}

/// Multiply `base` by `light` per channel, clamped to displayable range.
pub fn modulate(base: Srgba, light: Srgba) -> Srgba {
    Srgba::new(
        (base.red * light.red).clamp(0.0, 1.0),
        (base.green * light.green).clamp(0.0, 1.0),
        (base.blue * light.blue).clamp(0.0, 1.0),
        base.alpha,
    )
}

pub fn apply_clear_color(
    light: Res<GlobalLight2d>,
    sky: Res<SkyBase>,
    mut clear: ResMut<ClearColor>,
) {
    if !light.is_changed() && !sky.is_changed() {
        return;
    }
    clear.0 = modulate(sky.0, light_multiplier(&light)).into();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_multiplier_scales_by_intensity() {
        let light = GlobalLight2d {
            color: Srgba::new(1.0, 0.5, 0.25, 1.0),
            intensity: 0.5,
        };
        assert_eq!(light_multiplier(&light), Srgba::new(0.5, 0.25, 0.125, 1.0));
    }

    #[test]
    fn test_modulate_clamps_and_keeps_alpha() {
        let out = modulate(
            Srgba::new(0.8, 0.5, 0.1, 0.3),
            Srgba::new(2.0, 1.0, 0.5, 1.0),
        );
        assert_eq!(out, Srgba::new(1.0, 0.5, 0.05, 0.3));
    }
}
