//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Caller-supplied dt, clamped per tick
//! - Seeded RNG only
//! - Stable iteration order (insertion order)
//! - No rendering, audio or platform dependencies

pub mod boss;
pub mod collision;
pub mod effects;
pub mod entities;
pub mod formation;
pub mod patterns;
pub mod state;
pub mod tick;
pub mod timers;

pub use boss::{Boss, BossState};
pub use collision::{Rect, circles_overlap, point_in_circle};
pub use effects::{EffectKind, Effects, Modifiers};
pub use entities::{
    Enemy, Particle, Player, Powerup, PowerupKind, Projectile, ProjectileKind, ShipVariant,
    Starfield,
};
pub use formation::{Behavior, EnemySpec, FormationKind};
pub use patterns::AttackPattern;
pub use state::{GameEvent, GameState, HudSnapshot, MatchPhase, Transition};
pub use tick::{
    TickInput, collect_powerup, next_level, restart_level, skip_to_boss, start_match, tick,
    use_bomb,
};
pub use timers::{TimerId, Timers};
