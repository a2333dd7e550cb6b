//! Copies background layer positions onto `Transform`s. Depth is left alone.

use bevy::prelude::*;

use effects::parallax::{FollowerParallax, ParallaxLayer, ScrollLoop};

pub fn sync_parallax_layers(mut layers: Query<(&ParallaxLayer, &mut Transform)>) {
    for (layer, mut transform) in &mut layers {
        let at = layer.position();
        transform.translation.x = at.x;
        transform.translation.y = at.y;
    }
}

pub fn sync_follower_layers(mut layers: Query<(&FollowerParallax, &mut Transform)>) {
    for (layer, mut transform) in &mut layers {
        transform.translation.x = layer.x();
    }
}

pub fn sync_scroll_loops(mut loops: Query<(&ScrollLoop, &mut Transform)>) {
    for (scroll, mut transform) in &mut loops {
        transform.translation.x = scroll.x();
    }
}
