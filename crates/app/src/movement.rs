//! Minimal kinematic character: walk, jump, fall to a flat ground line.
//!
//! Honors the freeze state camera shots put on the player: a disabled
//! movement handle ignores input, a hard-frozen body does not move at all.

use bevy::prelude::*;

use effects::control_handles::{ControlHandle, PhysicsBody};

pub const GROUND_Y: f32 = 0.0;
const WALK_SPEED: f32 = 4.0;
const JUMP_SPEED: f32 = 7.0;
const GRAVITY: f32 = -20.0;

#[derive(Component, Debug, Default)]
pub struct Player;

/// Horizontal intent in `[-1, 1]` and whether jump was pressed this frame.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct MoveIntent {
    pub horizontal: f32,
    pub jump: bool,
}

/// Advance one body by `dt`. Returns the new position.
pub fn step_body(body: &mut PhysicsBody, position: Vec2, intent: MoveIntent, dt: f32) -> Vec2 {
    if !body.simulated || body.constraints_frozen {
        return position;
    }
    let grounded = position.y <= GROUND_Y + 1e-4;

    body.velocity.x = intent.horizontal.clamp(-1.0, 1.0) * WALK_SPEED;
    if intent.jump && grounded {
        body.velocity.y = JUMP_SPEED;
    }
    body.velocity.y += GRAVITY * body.gravity_scale * dt;
    body.velocity *= 1.0 / (1.0 + body.linear_damping * dt);

    let mut next = position + body.velocity * dt;
    if next.y < GROUND_Y {
        next.y = GROUND_Y;
        body.velocity.y = 0.0;
    }
    next
}

pub fn move_player(
    time: Res<Time>,
    keys: Res<ButtonInput<KeyCode>>,
    mut players: Query<(&mut Transform, &mut PhysicsBody, &ControlHandle), With<Player>>,
) {
    let dt = time.delta_secs();
    for (mut transform, mut body, handle) in &mut players {
        let intent = if handle.enabled {
            read_intent(&keys)
        } else {
            MoveIntent::default()
        };
        let next = step_body(&mut body, transform.translation.truncate(), intent, dt);
        transform.translation = next.extend(transform.translation.z);
    }
}

fn read_intent(keys: &ButtonInput<KeyCode>) -> MoveIntent {
    let mut horizontal = 0.0;
    if keys.any_pressed([KeyCode::KeyA, KeyCode::ArrowLeft]) {
        horizontal -= 1.0;
    }
    if keys.any_pressed([KeyCode::KeyD, KeyCode::ArrowRight]) {
        horizontal += 1.0;
    }
    MoveIntent {
        horizontal,
        jump: keys.any_just_pressed([KeyCode::KeyW, KeyCode::ArrowUp]),
    }
}
