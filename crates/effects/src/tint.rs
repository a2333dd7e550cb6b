//! Phase-blended color multipliers for groups of scene elements.
//!
//! Every element in a group carries a [`TintMember`] holding the color it had
//! when it joined. That original is the only base ever multiplied; the previous
//! frame's tinted output is never read back, so repeated application cannot
//! drift or compound.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::phase::{CurrentPhaseBlend, PhaseBlend, PhaseTable};

/// Default per-phase multipliers: warm morning, neutral afternoon, amber
/// evening, cool dark night.
pub fn default_tint_palette() -> PhaseTable<Srgba> {
    PhaseTable {
        morning: Srgba::new(1.0, 0.97, 0.92, 1.0),
        afternoon: Srgba::WHITE,
        evening: Srgba::new(1.0, 0.82, 0.65, 1.0),
        night: Srgba::new(0.35, 0.40, 0.55, 1.0),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TintGroup {
    pub name: String,
    pub tints: PhaseTable<Srgba>,
    /// 0 = no tinting, 1 = full phase tint.
    pub strength: f32,
}

impl Default for TintGroup {
    fn default() -> Self {
        Self {
            name: String::new(),
            tints: default_tint_palette(),
            strength: 1.0,
        }
    }
}

impl TintGroup {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// RGB multiplier for this group under `blend`. Alpha is always 1.
    pub fn multiplier(&self, blend: &PhaseBlend) -> Srgba {
        let blended = blend.mix_color(&self.tints);
        let s = self.strength.clamp(0.0, 1.0);
        Srgba::new(
            1.0 + (blended.red - 1.0) * s,
            1.0 + (blended.green - 1.0) * s,
            1.0 + (blended.blue - 1.0) * s,
            1.0,
        )
    }
}

/// Component-wise RGB product; the base alpha is preserved.
#[inline]
pub fn apply_multiplier(base: Srgba, multiplier: Srgba) -> Srgba {
    Srgba::new(
        base.red * multiplier.red,
        base.green * multiplier.green,
        base.blue * multiplier.blue,
        base.alpha,
    )
}

/// Index of a group inside [`TintGroups`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TintGroupId(pub usize);

/// All registered tint groups.
#[derive(Resource, Debug, Default, Clone)]
pub struct TintGroups {
    groups: Vec<TintGroup>,
}

impl TintGroups {
    pub fn register(&mut self, group: TintGroup) -> TintGroupId {
        if self.find(&group.name).is_some() {
            warn!(
                "TintGroups: a group named '{}' already exists; registering a second one",
                group.name
            );
        }
        self.groups.push(group);
        TintGroupId(self.groups.len() - 1)
    }

    pub fn get(&self, id: TintGroupId) -> Option<&TintGroup> {
        self.groups.get(id.0)
    }

    pub fn get_mut(&mut self, id: TintGroupId) -> Option<&mut TintGroup> {
        self.groups.get_mut(id.0)
    }

    pub fn find(&self, name: &str) -> Option<TintGroupId> {
        self.groups
            .iter()
            .position(|g| g.name == name)
            .map(TintGroupId)
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (TintGroupId, &TintGroup)> {
        self.groups
            .iter()
            .enumerate()
            .map(|(i, g)| (TintGroupId(i), g))
    }
}

/// Membership of one element in a tint group.
#[derive(Component, Debug, Clone)]
pub struct TintMember {
    pub group: TintGroupId,
    original: Srgba,
    tinted: Srgba,
}

impl TintMember {
    /// Capture `original` as the permanent multiplication base.
    pub fn new(group: TintGroupId, original: impl Into<Srgba>) -> Self {
        let original = original.into();
        Self {
            group,
            original,
            tinted: original,
        }
    }

    pub fn original(&self) -> Srgba {
        self.original
    }

    /// Color produced by the last application.
    pub fn tinted(&self) -> Srgba {
        self.tinted
    }

    pub fn apply(&mut self, multiplier: Srgba) {
        self.tinted = apply_multiplier(self.original, multiplier);
    }
}

/// Multipliers for every group, computed once per tick.
pub fn group_multipliers(groups: &TintGroups, blend: &PhaseBlend) -> Vec<Srgba> {
    groups.groups.iter().map(|g| g.multiplier(blend)).collect()
}

/// Recompute every member's tinted color from its original.
pub fn apply_tint_groups(
    blend: Res<CurrentPhaseBlend>,
    groups: Res<TintGroups>,
    mut members: Query<&mut TintMember>,
) {
    let multipliers = group_multipliers(&groups, &blend.0);
    for mut member in &mut members {
        // Members of a group that no longer exists keep their last output.
        let Some(multiplier) = multipliers.get(member.group.0) else {
            continue;
        };
        member.apply(*multiplier);
    }
}
