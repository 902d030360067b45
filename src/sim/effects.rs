//! Timed effects (buffs)
//!
//! An effect present in the table is applied. Activating an active effect
//! refreshes its duration without re-applying; expiry reverts the stat it
//! touched exactly once.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::entities::Player;

/// Timed effect kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum EffectKind {
    Invincible,
    Speed,
    FireRate,
    ScoreMultiplier,
    SlowMotion,
    Explosive,
    /// Two extra angled rounds per volley
    Spread,
    /// Recorded only, no stat change
    Health,
    /// Recorded only, no stat change
    Bomb,
}

impl EffectKind {
    pub fn name(&self) -> &'static str {
        match self {
            EffectKind::Invincible => "invincible",
            EffectKind::Speed => "speed",
            EffectKind::FireRate => "fireRate",
            EffectKind::ScoreMultiplier => "multiplier",
            EffectKind::SlowMotion => "slowMotion",
            EffectKind::Explosive => "explosive",
            EffectKind::Spread => "spread",
            EffectKind::Health => "health",
            EffectKind::Bomb => "bomb",
        }
    }
}

/// Effect durations (seconds)
pub const INVINCIBLE_DURATION: f32 = 8.0;
pub const SPEED_DURATION: f32 = 10.0;
pub const FIRE_RATE_DURATION: f32 = 10.0;
pub const MULTIPLIER_DURATION: f32 = 15.0;
pub const SLOW_MOTION_DURATION: f32 = 8.0;
pub const EXPLOSIVE_DURATION: f32 = 10.0;
pub const SPREAD_DURATION: f32 = 10.0;
pub const HEALTH_TAG_DURATION: f32 = 1.0;

/// Effect strengths
pub const SPEED_BOOST: f32 = 1.5;
pub const FIRE_RATE_BOOST: f32 = 0.5;
pub const SCORE_MULTIPLIER: u64 = 2;
pub const SLOW_MOTION_SCALE: f32 = 0.5;

/// Match-wide stat modifiers driven by effects
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Modifiers {
    pub score_multiplier: u64,
    /// Scales gameplay dt (slow motion)
    pub time_scale: f32,
    /// Scales the fire cooldown
    pub fire_rate_multiplier: f32,
    pub explosive_rounds: bool,
    pub spread_shots: bool,
}

impl Default for Modifiers {
    fn default() -> Self {
        Self {
            score_multiplier: 1,
            time_scale: 1.0,
            fire_rate_multiplier: 1.0,
            explosive_rounds: false,
            spread_shots: false,
        }
    }
}

/// Active effect table, name to remaining seconds
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Effects {
    active: BTreeMap<EffectKind, f32>,
}

impl Effects {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start or refresh an effect
    pub fn activate(
        &mut self,
        kind: EffectKind,
        duration: f32,
        player: &mut Player,
        mods: &mut Modifiers,
    ) {
        if duration.is_nan() || duration <= 0.0 {
            log::warn!("ignoring {} effect with duration {duration}", kind.name());
            return;
        }
        if self.active.insert(kind, duration).is_none() {
            apply(kind, player, mods);
        }
        if kind == EffectKind::Invincible {
            player.invincible_time = duration;
        }
    }

    /// Count down every effect; returns the kinds that expired this tick
    pub fn tick(&mut self, dt: f32, player: &mut Player, mods: &mut Modifiers) -> Vec<EffectKind> {
        let mut expired = Vec::new();
        for (kind, remaining) in self.active.iter_mut() {
            *remaining -= dt;
            if *remaining <= 0.0 {
                expired.push(*kind);
            }
        }
        for kind in &expired {
            self.deactivate(*kind, player, mods);
        }
        if let Some(remaining) = self.active.get(&EffectKind::Invincible) {
            player.invincible_time = *remaining;
        }
        expired
    }

    /// End an effect early. Returns false if it was not active.
    pub fn deactivate(&mut self, kind: EffectKind, player: &mut Player, mods: &mut Modifiers) -> bool {
        if self.active.remove(&kind).is_some() {
            revert(kind, player, mods);
            true
        } else {
            false
        }
    }

    /// End every effect, reverting each
    pub fn clear(&mut self, player: &mut Player, mods: &mut Modifiers) {
        let kinds: Vec<EffectKind> = self.active.keys().copied().collect();
        for kind in kinds {
            self.deactivate(kind, player, mods);
        }
    }

    pub fn is_active(&self, kind: EffectKind) -> bool {
        self.active.contains_key(&kind)
    }

    /// Seconds left, 0 when inactive
    pub fn remaining(&self, kind: EffectKind) -> f32 {
        self.active.get(&kind).copied().unwrap_or(0.0)
    }

    /// Owned copy of the table for observers
    pub fn snapshot(&self) -> BTreeMap<EffectKind, f32> {
        self.active.clone()
    }

    pub fn len(&self) -> usize {
        self.active.len()
    }

    pub fn is_empty(&self) -> bool {
        self.active.is_empty()
    }
}

fn apply(kind: EffectKind, player: &mut Player, mods: &mut Modifiers) {
    match kind {
        EffectKind::Invincible => player.invincible = true,
        EffectKind::Speed => player.speed = player.base_speed * SPEED_BOOST,
        EffectKind::FireRate => mods.fire_rate_multiplier = FIRE_RATE_BOOST,
        EffectKind::ScoreMultiplier => mods.score_multiplier = SCORE_MULTIPLIER,
        EffectKind::SlowMotion => mods.time_scale = SLOW_MOTION_SCALE,
        EffectKind::Explosive => mods.explosive_rounds = true,
        EffectKind::Spread => mods.spread_shots = true,
        EffectKind::Health | EffectKind::Bomb => {}
    }
}

fn revert(kind: EffectKind, player: &mut Player, mods: &mut Modifiers) {
    match kind {
        EffectKind::Invincible => {
            player.invincible = false;
            player.invincible_time = 0.0;
        }
        EffectKind::Speed => player.speed = player.base_speed,
        EffectKind::FireRate => mods.fire_rate_multiplier = 1.0,
        EffectKind::ScoreMultiplier => mods.score_multiplier = 1,
        EffectKind::SlowMotion => mods.time_scale = 1.0,
        EffectKind::Explosive => mods.explosive_rounds = false,
        EffectKind::Spread => mods.spread_shots = false,
        EffectKind::Health | EffectKind::Bomb => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::entities::ShipVariant;
    use glam::Vec2;

    fn setup() -> (Effects, Player, Modifiers) {
        (
            Effects::new(),
            Player::new(Vec2::new(400.0, 520.0), ShipVariant::Blaster),
            Modifiers::default(),
        )
    }

    #[test]
    fn test_speed_refresh_then_expire_restores_base() {
        let (mut effects, mut player, mut mods) = setup();
        let base = player.speed;

        effects.activate(EffectKind::Speed, SPEED_DURATION, &mut player, &mut mods);
        assert_eq!(player.speed, base * SPEED_BOOST);

        effects.tick(4.0, &mut player, &mut mods);
        // Refreshing must not compound the boost
        effects.activate(EffectKind::Speed, SPEED_DURATION, &mut player, &mut mods);
        effects.activate(EffectKind::Speed, SPEED_DURATION, &mut player, &mut mods);
        assert_eq!(player.speed, base * SPEED_BOOST);
        assert_eq!(effects.remaining(EffectKind::Speed), SPEED_DURATION);

        let expired = effects.tick(SPEED_DURATION, &mut player, &mut mods);
        assert_eq!(expired, vec![EffectKind::Speed]);
        assert_eq!(player.speed, base);
        assert!(!effects.is_active(EffectKind::Speed));
    }

    #[test]
    fn test_expiry_reported_once() {
        let (mut effects, mut player, mut mods) = setup();
        effects.activate(EffectKind::ScoreMultiplier, 1.0, &mut player, &mut mods);
        assert_eq!(mods.score_multiplier, 2);
        assert_eq!(effects.tick(1.5, &mut player, &mut mods).len(), 1);
        assert!(effects.tick(1.5, &mut player, &mut mods).is_empty());
        assert_eq!(mods.score_multiplier, 1);
    }

    #[test]
    fn test_deactivate_idempotent() {
        let (mut effects, mut player, mut mods) = setup();
        effects.activate(EffectKind::SlowMotion, 8.0, &mut player, &mut mods);
        assert_eq!(mods.time_scale, SLOW_MOTION_SCALE);
        assert!(effects.deactivate(EffectKind::SlowMotion, &mut player, &mut mods));
        assert!(!effects.deactivate(EffectKind::SlowMotion, &mut player, &mut mods));
        assert_eq!(mods.time_scale, 1.0);
    }

    #[test]
    fn test_invincible_time_mirrors_effect() {
        let (mut effects, mut player, mut mods) = setup();
        effects.activate(EffectKind::Invincible, 2.0, &mut player, &mut mods);
        assert!(player.invincible);
        effects.tick(0.5, &mut player, &mut mods);
        assert!((player.invincible_time - 1.5).abs() < 1e-5);
        effects.tick(2.0, &mut player, &mut mods);
        assert!(!player.invincible);
        assert_eq!(player.invincible_time, 0.0);
    }

    #[test]
    fn test_zero_duration_ignored() {
        let (mut effects, mut player, mut mods) = setup();
        effects.activate(EffectKind::FireRate, 0.0, &mut player, &mut mods);
        assert!(effects.is_empty());
        assert_eq!(mods.fire_rate_multiplier, 1.0);
    }

    #[test]
    fn test_clear_reverts_all() {
        let (mut effects, mut player, mut mods) = setup();
        effects.activate(EffectKind::Explosive, 5.0, &mut player, &mut mods);
        effects.activate(EffectKind::FireRate, 5.0, &mut player, &mut mods);
        effects.activate(EffectKind::Spread, 5.0, &mut player, &mut mods);
        assert!(mods.spread_shots);
        effects.activate(EffectKind::Bomb, 1.0, &mut player, &mut mods);
        effects.clear(&mut player, &mut mods);
        assert!(effects.is_empty());
        assert_eq!(mods, Modifiers::default());
    }
}
