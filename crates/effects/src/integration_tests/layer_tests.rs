//! Parallax layers, scroll loops and lamps on a live scene.

use bevy::prelude::*;

use crate::camera_rig::ShakeOffset;
use crate::commands::SceneCommand;
use crate::lamp::Lamp;
use crate::parallax::{FollowerParallax, ParallaxLayer, ScrollDirection, ScrollLoop};
use crate::test_harness::TestScene;

fn followed_scene() -> (TestScene, Entity) {
    let mut scene = TestScene::new();
    let player = scene.spawn_player(Vec3::ZERO);
    scene.spawn_camera(player, 5.0);
    scene.tick(1);
    (scene, player)
}

fn move_player(scene: &mut TestScene, player: Entity, x: f32) {
    *scene.get_mut::<GlobalTransform>(player) =
        GlobalTransform::from_translation(Vec3::new(x, 0.0, 0.0));
}

#[test]
fn test_parallax_layer_tracks_camera_base() {
    let (mut scene, player) = followed_scene();
    let far = scene.spawn(ParallaxLayer::new(Vec2::new(0.0, 3.0), Vec2::new(0.75, 0.0)));
    let near = scene.spawn(ParallaxLayer::new(Vec2::ZERO, Vec2::new(0.25, 0.0)));
    scene.tick(1);

    move_player(&mut scene, player, 8.0);
    scene.tick(1);
    assert_eq!(scene.get::<ParallaxLayer>(far).position(), Vec2::new(6.0, 3.0));
    assert_eq!(scene.get::<ParallaxLayer>(near).position(), Vec2::new(2.0, 0.0));
}

#[test]
fn test_shake_does_not_move_parallax_layers() {
    let (mut scene, _) = followed_scene();
    let layer = scene.spawn(ParallaxLayer::new(Vec2::ZERO, Vec2::splat(0.5)));
    scene.tick(1);

    scene.send(SceneCommand::AddTrauma(1.0));
    scene.tick(3);
    assert_ne!(scene.rig().shake, ShakeOffset::ZERO);
    assert_eq!(scene.get::<ParallaxLayer>(layer).position(), Vec2::ZERO);
}

#[test]
fn test_follower_layer_slides_against_player() {
    let (mut scene, player) = followed_scene();
    let mut follower = FollowerParallax::new(player, 1.0);
    follower.responsiveness = 0.1;
    follower.max_offset = 0.3;
    let layer = scene.spawn(follower);
    scene.tick(1);

    move_player(&mut scene, player, 2.0);
    scene.tick_secs(2.0);
    let x = scene.get::<FollowerParallax>(layer).x();
    assert!((x - 0.8).abs() < 1e-3, "x {x}");

    move_player(&mut scene, player, 50.0);
    scene.tick_secs(2.0);
    let x = scene.get::<FollowerParallax>(layer).x();
    assert!((x - 0.7).abs() < 1e-3, "x {x}");
}

#[test]
fn test_scroll_loop_wraps_in_scene() {
    let mut scene = TestScene::new();
    let clouds = scene.spawn(ScrollLoop::new(0.0, ScrollDirection::Left, 2.0, -1.0, 6.0));
    scene.tick(1);

    scene.tick_secs(0.25);
    let x = scene.get::<ScrollLoop>(clouds).x();
    assert!(x < 0.0 && x > -1.0, "x {x}");

    scene.tick_secs(0.5);
    let x = scene.get::<ScrollLoop>(clouds).x();
    assert!(x > 5.0 && x <= 6.0, "x {x}");
}

#[test]
fn test_flickering_lamp_changes_over_time() {
    let mut scene = TestScene::new();
    let lamp = scene.spawn(Lamp::flicker(0.2, 0.9, 0.1, 5));
    scene.tick(1);

    let mut seen = Vec::new();
    for _ in 0..60 {
        scene.tick(1);
        let intensity = scene.get::<Lamp>(lamp).intensity();
        assert!((0.2..=0.9).contains(&intensity), "intensity {intensity}");
        seen.push(intensity);
    }
    seen.dedup();
    assert!(seen.len() > 3);
}
