//! Copies per-element effect output onto `Sprite::color`.
//!
//! The effects crate never touches sprites. Each element's effect component
//! owns the color it should show; these systems only transfer it, folding in
//! the scene light for [`Lit`] sprites.

use bevy::prelude::*;

use effects::backdrop::PhaseBackdrop;
use effects::lamp::Lamp;
use effects::light::GlobalLight2d;
use effects::tint::TintMember;
use effects::weather::WeatherEffect;

use crate::scene_light::{light_multiplier, modulate, Lit};

pub fn sync_tinted_sprites(
    light: Res<GlobalLight2d>,
    mut sprites: Query<(&TintMember, &mut Sprite, Has<Lit>)>,
) {
    let multiplier = light_multiplier(&light);
    for (member, mut sprite, lit) in &mut sprites {
        let color = if lit {
            modulate(member.tinted(), multiplier)
        } else {
            member.tinted()
        };
        sprite.color = color.into();
    }
}

pub fn sync_backdrop_sprites(mut sprites: Query<(&PhaseBackdrop, &mut Sprite)>) {
    for (backdrop, mut sprite) in &mut sprites {
        sprite.color = backdrop.output().into();
    }
}

/// Lamp glows keep their authored RGB; alpha follows the lamp intensity.
pub fn sync_lamp_glows(mut sprites: Query<(&Lamp, &mut Sprite)>) {
    for (lamp, mut sprite) in &mut sprites {
        let mut color = sprite.color.to_srgba();
        color.alpha = lamp.intensity().clamp(0.0, 1.0);
        sprite.color = color.into();
    }
}

/// Weather layers keep their authored RGB; only alpha follows the fade.
pub fn sync_weather_sprites(mut sprites: Query<(&WeatherEffect, &mut Sprite)>) {
    for (effect, mut sprite) in &mut sprites {
        let mut color = sprite.color.to_srgba();
        if color.alpha == effect.alpha() {
            continue;
        }
        color.alpha = effect.alpha();
        sprite.color = color.into();
    }
}
