//! Handles that camera effects freeze while they own the camera.
//!
//! A freeze captures the exact prior state of every handle and a thaw writes
//! those captured values back verbatim, so a handle that was already disabled
//! before the effect stays disabled afterwards.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ControlKind {
    /// Camera follow behaviour.
    Follow,
    /// Character movement controller.
    Movement,
    /// Player input reader.
    Input,
}

/// An on/off switch on some behaviour that must pause during camera shots.
#[derive(Component, Debug, Clone, Copy, PartialEq)]
pub struct ControlHandle {
    pub kind: ControlKind,
    pub enabled: bool,
}

impl ControlHandle {
    pub fn new(kind: ControlKind) -> Self {
        Self {
            kind,
            enabled: true,
        }
    }
}

/// Minimal kinematic body state that a freeze can hold still.
#[derive(Component, Debug, Clone, Copy, PartialEq)]
pub struct PhysicsBody {
    pub velocity: Vec2,
    pub angular_velocity: f32,
    /// All motion constrained (hard freeze).
    pub constraints_frozen: bool,
    pub gravity_scale: f32,
    pub linear_damping: f32,
    pub simulated: bool,
}

impl Default for PhysicsBody {
    fn default() -> Self {
        Self {
            velocity: Vec2::ZERO,
            angular_velocity: 0.0,
            constraints_frozen: false,
            gravity_scale: 1.0,
            linear_damping: 0.0,
            simulated: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FreezePolicy {
    pub zero_angular_velocity: bool,
    /// Constrain all motion. When off, gravity and damping are adjusted instead.
    pub hard_freeze: bool,
    pub zero_gravity_when_soft: bool,
    pub soft_freeze_damping: f32,
}

impl Default for FreezePolicy {
    fn default() -> Self {
        Self {
            zero_angular_velocity: true,
            hard_freeze: true,
            zero_gravity_when_soft: true,
            soft_freeze_damping: 10.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct BodySnapshot {
    constraints_frozen: bool,
    gravity_scale: f32,
    linear_damping: f32,
    simulated: bool,
}

/// Prior states captured by a freeze, keyed by entity.
#[derive(Debug, Clone, Default)]
pub struct FrozenHandles {
    handles: Vec<(Entity, bool)>,
    bodies: Vec<(Entity, BodySnapshot)>,
}

impl FrozenHandles {
    pub fn is_empty(&self) -> bool {
        self.handles.is_empty() && self.bodies.is_empty()
    }

    /// Disable a handle, remembering whether it was enabled.
    pub fn freeze_handle(&mut self, entity: Entity, handle: &mut ControlHandle) {
        self.handles.push((entity, handle.enabled));
        handle.enabled = false;
    }

    /// Stop a body and hold it according to `policy`.
    pub fn freeze_body(&mut self, entity: Entity, body: &mut PhysicsBody, policy: &FreezePolicy) {
        self.bodies.push((
            entity,
            BodySnapshot {
                constraints_frozen: body.constraints_frozen,
                gravity_scale: body.gravity_scale,
                linear_damping: body.linear_damping,
                simulated: body.simulated,
            },
        ));

        body.velocity = Vec2::ZERO;
        if policy.zero_angular_velocity {
            body.angular_velocity = 0.0;
        }
        if policy.hard_freeze {
            body.constraints_frozen = true;
        } else {
            if policy.zero_gravity_when_soft {
                body.gravity_scale = 0.0;
            }
            body.linear_damping = body.linear_damping.max(policy.soft_freeze_damping);
        }
    }

    /// Prior enabled state captured for `entity`, if it was frozen.
    pub fn prior_handle_state(&self, entity: Entity) -> Option<bool> {
        self.handles
            .iter()
            .find(|(e, _)| *e == entity)
            .map(|(_, enabled)| *enabled)
    }

    pub fn thaw_handle(&self, entity: Entity, handle: &mut ControlHandle) {
        if let Some(enabled) = self.prior_handle_state(entity) {
            handle.enabled = enabled;
        }
    }

    pub fn thaw_body(&self, entity: Entity, body: &mut PhysicsBody) {
        if let Some((_, snapshot)) = self.bodies.iter().find(|(e, _)| *e == entity) {
            body.constraints_frozen = snapshot.constraints_frozen;
            body.gravity_scale = snapshot.gravity_scale;
            body.linear_damping = snapshot.linear_damping;
            body.simulated = snapshot.simulated;
        }
    }
}
