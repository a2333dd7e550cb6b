//! Named weather layers (rain, fog, snow...) cross-faded by alpha.
//!
//! At most one effect is active. Effects register themselves with the
//! [`WeatherDirector`] when spawned and start hidden, and drop out of the
//! registry when despawned so the id can be claimed again.

use std::collections::HashMap;

use bevy::prelude::*;

use crate::Saveable;

const MIN_FADE_SECS: f32 = 0.01;

#[derive(Debug, Clone, Copy, PartialEq)]
struct WeatherFade {
    from: f32,
    to: f32,
    elapsed: f32,
}

#[derive(Component, Debug, Clone)]
pub struct WeatherEffect {
    pub id: String,
    fade_secs: f32,
    alpha: f32,
    fade: Option<WeatherFade>,
}

impl WeatherEffect {
    pub fn new(id: impl Into<String>, fade_secs: f32) -> Self {
        Self {
            id: id.into(),
            fade_secs: fade_secs.max(MIN_FADE_SECS),
            alpha: 0.0,
            fade: None,
        }
    }

    pub fn alpha(&self) -> f32 {
        self.alpha
    }

    pub fn is_fading(&self) -> bool {
        self.fade.is_some()
    }

    pub fn fade_in(&mut self) {
        self.fade_to(1.0);
    }

    pub fn fade_out(&mut self) {
        self.fade_to(0.0);
    }

    fn fade_to(&mut self, to: f32) {
        self.fade = Some(WeatherFade {
            from: self.alpha,
            to,
            elapsed: 0.0,
        });
    }

    pub fn set_visible_instant(&mut self, visible: bool) {
        self.fade = None;
        self.alpha = if visible { 1.0 } else { 0.0 };
    }

    pub fn tick(&mut self, dt: f32) {
        let Some(fade) = self.fade.as_mut() else {
            return;
        };
        fade.elapsed += dt.max(0.0);
        let t = (fade.elapsed / self.fade_secs).clamp(0.0, 1.0);
        self.alpha = fade.from + (fade.to - fade.from) * t;
        if t >= 1.0 {
            self.alpha = fade.to;
            self.fade = None;
        }
    }
}

/// Toggle requests resolved into per-effect actions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WeatherChange {
    Off(String),
    Swap { from: Option<String>, to: String },
    Unchanged,
}

#[derive(Resource, Debug, Default)]
pub struct WeatherDirector {
    current: Option<String>,
    registry: HashMap<String, Entity>,
    /// Set by a snapshot load; cleared once every registered effect shows
    /// exactly the restored state.
    restore_pending: bool,
}

impl WeatherDirector {
    pub fn current(&self) -> Option<&str> {
        self.current.as_deref()
    }

    pub fn is_registered(&self, id: &str) -> bool {
        self.registry.contains_key(id)
    }

    pub fn entity(&self, id: &str) -> Option<Entity> {
        self.registry.get(id).copied()
    }

    /// Registered ids in sorted order.
    pub fn ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.registry.keys().map(String::as_str).collect();
        ids.sort_unstable();
        ids
    }

    /// Returns false when `id` is already taken.
    pub fn register(&mut self, id: &str, entity: Entity) -> bool {
        if self.registry.contains_key(id) {
            warn!("Weather effect '{id}' registered twice; keeping the first");
            return false;
        }
        self.registry.insert(id.to_string(), entity);
        true
    }

    /// Forget whichever id `entity` was registered under. Clears the active id
    /// when it pointed at that entity.
    pub fn unregister(&mut self, entity: Entity) -> Option<String> {
        let id = self
            .registry
            .iter()
            .find(|(_, registered)| **registered == entity)
            .map(|(id, _)| id.clone())?;
        self.registry.remove(&id);
        if self.current.as_deref() == Some(id.as_str()) {
            self.current = None;
        }
        Some(id)
    }

    /// Decide what a toggle of `id` does and update the active id.
    ///
    /// An empty id turns the current effect off. Toggling the active id turns
    /// it off. Any other known id replaces the current one.
    pub fn toggle(&mut self, id: &str) -> WeatherChange {
        self.restore_pending = false;
        if id.is_empty() {
            return match self.current.take() {
                Some(current) => WeatherChange::Off(current),
                None => WeatherChange::Unchanged,
            };
        }
        if !self.registry.contains_key(id) {
            warn!("Unknown weather effect '{id}'");
            return WeatherChange::Unchanged;
        }
        if self.current.as_deref() == Some(id) {
            self.current = None;
            return WeatherChange::Off(id.to_string());
        }
        let from = self.current.replace(id.to_string());
        WeatherChange::Swap {
            from,
            to: id.to_string(),
        }
    }

    /// Registered effects with whether each should be visible after a load.
    ///
    /// Returns `None` while nothing is pending. While the restored id has not
    /// registered yet, the others are still listed as hidden and the restore
    /// stays pending.
    fn take_restore(&mut self) -> Option<Vec<(Entity, bool)>> {
        if !self.restore_pending {
            return None;
        }
        let targets = self
            .registry
            .iter()
            .map(|(id, entity)| (*entity, self.current.as_deref() == Some(id.as_str())))
            .collect();
        self.restore_pending = match self.current.as_deref() {
            Some(id) => !self.registry.contains_key(id),
            None => false,
        };
        Some(targets)
    }
}

// =============================================================================
// Saveable
// =============================================================================

#[derive(bitcode::Encode, bitcode::Decode, Default)]
struct WeatherSnapshot {
    active: Option<String>,
}

impl Saveable for WeatherDirector {
    const SAVE_KEY: &'static str = "weather";

    /// Clear weather is saved too, so loading it hides whatever is showing.
    fn save_to_bytes(&self) -> Option<Vec<u8>> {
        Some(bitcode::encode(&WeatherSnapshot {
            active: self.current.clone(),
        }))
    }

    fn load_from_bytes(current: &Self, bytes: &[u8]) -> Self {
        let snapshot: WeatherSnapshot = crate::decode_or_warn(Self::SAVE_KEY, bytes);
        Self {
            current: snapshot.active,
            registry: current.registry.clone(),
            restore_pending: true,
        }
    }
}

// =============================================================================
// Systems
// =============================================================================

pub fn register_weather_effects(
    mut director: ResMut<WeatherDirector>,
    mut removed: RemovedComponents<WeatherEffect>,
    mut added: Query<(Entity, &mut WeatherEffect), Added<WeatherEffect>>,
) {
    // Removals first so a respawn in the same frame can take the id back.
    for entity in removed.read() {
        if let Some(id) = director.unregister(entity) {
            debug!("Weather effect '{id}' unregistered");
        }
    }
    for (entity, mut effect) in &mut added {
        effect.set_visible_instant(false);
        director.register(&effect.id, entity);
    }
}

/// Snap every registered effect to the loaded state without fading: the
/// restored id fully visible, all others hidden.
pub fn restore_weather(
    mut director: ResMut<WeatherDirector>,
    mut effects: Query<&mut WeatherEffect>,
) {
    let Some(targets) = director.take_restore() else {
        return;
    };
    for (entity, visible) in targets {
        if let Ok(mut effect) = effects.get_mut(entity) {
            effect.set_visible_instant(visible);
        }
    }
    info!("Weather restored to {:?}", director.current());
}

/// Apply a toggle to the effect components.
pub fn toggle_weather(
    director: &mut WeatherDirector,
    effects: &mut Query<&mut WeatherEffect>,
    id: &str,
) {
    let (fade_out, fade_in) = match director.toggle(id) {
        WeatherChange::Off(off) => (Some(off), None),
        WeatherChange::Swap { from, to } => (from, Some(to)),
        WeatherChange::Unchanged => return,
    };
    if let Some(entity) = fade_out.and_then(|id| director.entity(&id)) {
        if let Ok(mut effect) = effects.get_mut(entity) {
            effect.fade_out();
        }
    }
    if let Some(entity) = fade_in.and_then(|id| director.entity(&id)) {
        if let Ok(mut effect) = effects.get_mut(entity) {
            effect.fade_in();
        }
    }
    debug!("Weather now {:?}", director.current());
}

pub fn tick_weather_fades(time: Res<Time>, mut effects: Query<&mut WeatherEffect>) {
    let dt = time.delta_secs();
    for mut effect in &mut effects {
        if effect.is_fading() {
            effect.tick(dt);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn director_with(ids: &[&str]) -> WeatherDirector {
        let mut director = WeatherDirector::default();
        for (i, id) in ids.iter().enumerate() {
            director.register(id, Entity::from_raw(i as u32 + 1));
        }
        director
    }

    #[test]
    fn test_fade_is_linear_and_lands_exactly() {
        let mut effect = WeatherEffect::new("rain", 2.0);
        effect.fade_in();
        effect.tick(0.5);
        assert!((effect.alpha() - 0.25).abs() < 1e-6);
        effect.tick(5.0);
        assert_eq!(effect.alpha(), 1.0);
        assert!(!effect.is_fading());
    }

    #[test]
    fn test_fade_out_starts_from_current_alpha() {
        let mut effect = WeatherEffect::new("fog", 1.0);
        effect.fade_in();
        effect.tick(0.5);
        effect.fade_out();
        effect.tick(0.5);
        assert!((effect.alpha() - 0.25).abs() < 1e-6);
    }

    #[test]
    fn test_fade_secs_floor() {
        let mut effect = WeatherEffect::new("snow", 0.0);
        effect.fade_in();
        effect.tick(0.01);
        assert_eq!(effect.alpha(), 1.0);
    }

    #[test]
    fn test_toggle_semantics() {
        let mut director = director_with(&["rain", "fog"]);
        assert_eq!(
            director.toggle("rain"),
            WeatherChange::Swap {
                from: None,
                to: "rain".into()
            }
        );
        assert_eq!(
            director.toggle("fog"),
            WeatherChange::Swap {
                from: Some("rain".into()),
                to: "fog".into()
            }
        );
        assert_eq!(director.toggle("fog"), WeatherChange::Off("fog".into()));
        assert_eq!(director.current(), None);
    }

    #[test]
    fn test_empty_id_turns_current_off() {
        let mut director = director_with(&["rain"]);
        director.toggle("rain");
        assert_eq!(director.toggle(""), WeatherChange::Off("rain".into()));
        assert_eq!(director.toggle(""), WeatherChange::Unchanged);
    }

    #[test]
    fn test_unknown_id_is_ignored() {
        let mut director = director_with(&["rain"]);
        director.toggle("rain");
        assert_eq!(director.toggle("hail"), WeatherChange::Unchanged);
        assert_eq!(director.current(), Some("rain"));
    }

    #[test]
    fn test_duplicate_registration_keeps_first() {
        let mut director = WeatherDirector::default();
        assert!(director.register("rain", Entity::from_raw(1)));
        assert!(!director.register("rain", Entity::from_raw(2)));
        assert_eq!(director.entity("rain"), Some(Entity::from_raw(1)));
    }

    #[test]
    fn test_clear_weather_loads_as_clear() {
        let director = director_with(&["rain"]);
        let bytes = director.save_to_bytes().unwrap();

        let mut active = director_with(&["rain"]);
        active.toggle("rain");
        let mut loaded = WeatherDirector::load_from_bytes(&active, &bytes);
        assert_eq!(loaded.current(), None);
        assert_eq!(
            loaded.take_restore(),
            Some(vec![(Entity::from_raw(1), false)])
        );
    }

    #[test]
    fn test_load_keeps_registry_and_queues_restore() {
        let mut director = director_with(&["rain", "fog"]);
        director.toggle("rain");
        let bytes = director.save_to_bytes().unwrap();

        let fresh = director_with(&["rain", "fog"]);
        let mut loaded = WeatherDirector::load_from_bytes(&fresh, &bytes);
        assert_eq!(loaded.current(), Some("rain"));
        let mut targets = loaded.take_restore().unwrap();
        targets.sort_by_key(|(entity, _)| entity.index());
        assert_eq!(
            targets,
            vec![(Entity::from_raw(1), true), (Entity::from_raw(2), false)]
        );
        assert_eq!(loaded.take_restore(), None);
    }

    #[test]
    fn test_restore_waits_for_unregistered_target() {
        let mut saved = director_with(&["rain", "fog"]);
        saved.toggle("fog");
        let bytes = saved.save_to_bytes().unwrap();

        let mut loaded = WeatherDirector::load_from_bytes(&director_with(&["rain"]), &bytes);
        assert_eq!(
            loaded.take_restore(),
            Some(vec![(Entity::from_raw(1), false)])
        );
        loaded.register("fog", Entity::from_raw(9));
        let targets = loaded.take_restore().unwrap();
        assert!(targets.contains(&(Entity::from_raw(9), true)));
        assert_eq!(loaded.take_restore(), None);
    }

    #[test]
    fn test_unregister_frees_id_and_clears_active() {
        let mut director = director_with(&["rain", "fog"]);
        director.toggle("rain");
        assert_eq!(director.unregister(Entity::from_raw(1)).as_deref(), Some("rain"));
        assert!(!director.is_registered("rain"));
        assert_eq!(director.current(), None);
        assert_eq!(director.unregister(Entity::from_raw(1)), None);
        assert!(director.register("rain", Entity::from_raw(5)));
        assert_eq!(director.entity("rain"), Some(Entity::from_raw(5)));
    }
}
