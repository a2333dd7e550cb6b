//! Per-frame ordering of the scene effects via `SystemSet` phases.
//!
//! ```text
//! Commands  →  Clock  →  Blend  →  Apply  →  Camera  →  Compose
//! ```
//!
//! * **Commands** – drain `SceneCommand` events into the clock, shaker,
//!   weather director and tweener.
//! * **Clock** – advance the phase clock.
//! * **Blend** – recompute the shared phase blend.
//! * **Apply** – tints, backdrops, global light, weather fades, lamps and
//!   scroll loops. None of these read each other.
//! * **Camera** – follow, then tween, then shake. Each writes the camera rig.
//!   Parallax layers read the finished base pose last.
//! * **Compose** – rendering copies effect output onto sprites and the camera.

use bevy::prelude::*;

/// Ordered phases for scene effect systems in the `Update` schedule.
#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub enum SceneFxSet {
    Commands,
    Clock,
    Blend,
    Apply,
    Camera,
    Compose,
}
