//! UI sync notifications
//!
//! One method per kind of change. `Game` calls them only when the value
//! actually changed since the last frame. Every method has a no-op default
//! so a UI only implements what it shows.

use std::collections::BTreeMap;

use crate::sim::{EffectKind, MatchPhase};

pub trait GameObserver {
    fn score_changed(&mut self, _score: u64) {}
    fn level_changed(&mut self, _level: u32) {}
    fn lives_changed(&mut self, _lives: u32) {}
    fn weapon_level_changed(&mut self, _level: u32) {}
    fn shield_changed(&mut self, _charges: u32) {}
    fn bombs_changed(&mut self, _bombs: u32) {}
    fn combo_changed(&mut self, _combo: u32) {}
    /// (current, max), or (0, 0) when no boss is present
    fn boss_health_changed(&mut self, _current: f32, _max: f32) {}
    /// Owned copy of the active effects, name to whole seconds remaining
    fn effects_changed(&mut self, _effects: BTreeMap<EffectKind, f32>) {}
    fn phase_changed(&mut self, _phase: MatchPhase) {}
    fn game_over(&mut self, _score: u64, _level: u32) {}
}

/// Ignores every notification
#[derive(Debug, Default)]
pub struct NullObserver;

impl GameObserver for NullObserver {}

/// Logs every notification at debug level (info for game over)
#[derive(Debug, Default)]
pub struct LogObserver;

impl GameObserver for LogObserver {
    fn score_changed(&mut self, score: u64) {
        log::debug!("score {score}");
    }

    fn level_changed(&mut self, level: u32) {
        log::debug!("level {level}");
    }

    fn lives_changed(&mut self, lives: u32) {
        log::debug!("lives {lives}");
    }

    fn weapon_level_changed(&mut self, level: u32) {
        log::debug!("weapon level {level}");
    }

    fn shield_changed(&mut self, charges: u32) {
        log::debug!("shield {charges}");
    }

    fn bombs_changed(&mut self, bombs: u32) {
        log::debug!("bombs {bombs}");
    }

    fn boss_health_changed(&mut self, current: f32, max: f32) {
        log::debug!("boss health {current:.0}/{max:.0}");
    }

    fn effects_changed(&mut self, effects: BTreeMap<EffectKind, f32>) {
        let names: Vec<String> = effects
            .iter()
            .map(|(kind, secs)| format!("{} {secs:.0}s", kind.name()))
            .collect();
        log::debug!("effects [{}]", names.join(", "));
    }

    fn phase_changed(&mut self, phase: MatchPhase) {
        log::debug!("phase {phase:?}");
    }

    fn game_over(&mut self, score: u64, level: u32) {
        log::info!("final score {score} on level {level}");
    }
}
