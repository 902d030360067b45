//! Game state and core simulation types
//!
//! Everything a tick reads or writes lives in `GameState`. The renderer and
//! observers only ever see it through shared references or owned snapshots.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, VecDeque};

use super::boss::Boss;
use super::effects::{EffectKind, Effects, Modifiers};
use super::entities::{
    Enemy, Particle, ParticleShape, Player, PowerupKind, Powerup, Projectile, ShipVariant,
    Starfield,
};
use super::formation::EnemySpec;
use super::timers::{TimerId, Timers};
use crate::consts::*;

/// Match-level state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MatchPhase {
    /// No match running
    Idle,
    /// Level banner before the wave spawns
    WaveIntro,
    /// Wave enemies spawning and fighting
    WaveActive,
    /// Wave beaten, waiting to advance
    WaveClear,
    /// Boss warning before it spawns
    BossIntro,
    BossActive,
    /// Boss beaten, waiting to advance
    BossClear,
    GameOver,
}

impl MatchPhase {
    /// Phases where the player fights and bombs work
    pub fn is_combat(&self) -> bool {
        matches!(self, MatchPhase::WaveActive | MatchPhase::BossActive)
    }

    /// Phases where the world advances
    pub fn is_running(&self) -> bool {
        !matches!(self, MatchPhase::Idle | MatchPhase::GameOver)
    }
}

/// Deferred transitions driven by `Timers`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Transition {
    StartWave,
    SpawnBoss,
    AdvanceLevel,
}

/// Things that happened during a tick, for audio and UI
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    MatchStarted { ship: ShipVariant },
    LevelStarted { level: u32, boss: bool },
    ShotFired { ship: ShipVariant },
    EnemyKilled { pos: Vec2, points: u64 },
    PlayerHit { lives: u32 },
    ShieldBlock,
    PowerupCollected { kind: PowerupKind },
    EffectExpired { kind: EffectKind },
    BossWarning { name: String },
    BossSpawned { name: String },
    BossArrived,
    BossCharging,
    BossPhaseChanged { phase: u32 },
    BossCritical,
    BossDefeated { name: String, points: u64 },
    WaveCleared { level: u32 },
    BombUsed,
    GameOver { score: u64, level: u32 },
}

/// Owned HUD values handed to observers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HudSnapshot {
    pub score: u64,
    pub level: u32,
    pub lives: u32,
    pub weapon_level: u32,
    pub shield: u32,
    pub bombs: u32,
    pub combo: u32,
    /// (current, max), or (0, 0) without a boss
    pub boss_health: (f32, f32),
    pub boss_name: Option<String>,
    pub effects: BTreeMap<EffectKind, f32>,
    pub phase: MatchPhase,
}

/// Complete simulation state
#[derive(Debug, Clone)]
pub struct GameState {
    /// Match seed for reproducibility
    pub seed: u64,
    pub rng: Pcg32,
    pub width: f32,
    pub height: f32,
    pub phase: MatchPhase,
    /// Current level, 1-based
    pub level: u32,
    pub score: u64,
    pub lives: u32,
    pub starting_lives: u32,
    pub shield: u32,
    pub bombs: u32,
    /// Consecutive kills
    pub combo: u32,
    /// Seconds until the combo resets
    pub combo_timer: f32,
    pub ship: ShipVariant,
    pub player: Player,
    pub enemies: Vec<Enemy>,
    /// Formation slots not yet spawned this wave
    pub spawn_queue: VecDeque<EnemySpec>,
    pub spawn_timer: f32,
    pub boss: Option<Boss>,
    pub bosses_defeated: u32,
    pub player_projectiles: Vec<Projectile>,
    pub enemy_projectiles: Vec<Projectile>,
    pub powerups: Vec<Powerup>,
    /// Visual particles (not gameplay-affecting)
    pub particles: Vec<Particle>,
    pub starfield: Starfield,
    pub effects: Effects,
    pub modifiers: Modifiers,
    pub timers: Timers<Transition>,
    /// The phase transition waiting in `timers`, at most one at a time
    pub pending_transition: Option<TimerId>,
    /// Screen shake intensity, 0..=1
    pub screen_shake: f32,
    /// Full-screen flash opacity, 0..=1
    pub flash_alpha: f32,
    pub flash_color: u32,
    /// Events raised since the last drain
    pub events: Vec<GameEvent>,
    pub max_particles: usize,
    /// Largest dt a tick will accept
    pub max_frame_dt: f32,
    pub shake_enabled: bool,
    pub flash_enabled: bool,
    /// Simulated seconds since the match started
    pub time: f32,
}

impl GameState {
    /// Create an idle state on the default playfield
    pub fn new(seed: u64) -> Self {
        Self::with_playfield(seed, PLAYFIELD_WIDTH, PLAYFIELD_HEIGHT)
    }

    /// Create an idle state on a custom playfield (clamped to the minimum size)
    pub fn with_playfield(seed: u64, width: f32, height: f32) -> Self {
        let width = width.max(MIN_PLAYFIELD_WIDTH);
        let height = height.max(MIN_PLAYFIELD_HEIGHT);
        let mut rng = Pcg32::seed_from_u64(seed);
        let starfield = Starfield::new(&mut rng, width, height, 120);
        Self {
            seed,
            rng,
            width,
            height,
            phase: MatchPhase::Idle,
            level: 1,
            score: 0,
            lives: STARTING_LIVES,
            starting_lives: STARTING_LIVES,
            shield: 0,
            bombs: STARTING_BOMBS,
            combo: 0,
            combo_timer: 0.0,
            ship: ShipVariant::default(),
            player: Player::new(Player::spawn_point(width, height), ShipVariant::default()),
            enemies: Vec::new(),
            spawn_queue: VecDeque::new(),
            spawn_timer: 0.0,
            boss: None,
            bosses_defeated: 0,
            player_projectiles: Vec::new(),
            enemy_projectiles: Vec::new(),
            powerups: Vec::new(),
            particles: Vec::new(),
            starfield,
            effects: Effects::new(),
            modifiers: Modifiers::default(),
            timers: Timers::new(),
            pending_transition: None,
            screen_shake: 0.0,
            flash_alpha: 0.0,
            flash_color: 0xffffff,
            events: Vec::new(),
            max_particles: MAX_PARTICLES,
            max_frame_dt: MAX_FRAME_DT,
            shake_enabled: true,
            flash_enabled: true,
            time: 0.0,
        }
    }

    /// Every third level is a boss fight
    pub fn is_boss_level(level: u32) -> bool {
        level > 0 && level % BOSS_LEVEL_INTERVAL == 0
    }

    pub fn push_event(&mut self, event: GameEvent) {
        self.events.push(event);
    }

    /// Take the events raised since the last call
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// Raise screen shake, capped at 1
    pub fn add_shake(&mut self, amount: f32) {
        if self.shake_enabled {
            self.screen_shake = (self.screen_shake + amount).min(1.0);
        }
    }

    /// Start a full-screen flash
    pub fn flash(&mut self, color: u32, alpha: f32) {
        if self.flash_enabled {
            self.flash_color = color;
            self.flash_alpha = self.flash_alpha.max(alpha.clamp(0.0, 1.0));
        }
    }

    /// Score a kill with the current combo and multiplier, then extend the combo
    pub fn award_kill(&mut self, points: u64) -> u64 {
        let awarded = points * (self.combo as u64 + 1) * self.modifiers.score_multiplier;
        self.score += awarded;
        self.combo += 1;
        self.combo_timer = COMBO_TIMEOUT;
        awarded
    }

    pub fn push_particle(&mut self, particle: Particle) {
        if self.max_particles == 0 {
            return;
        }
        if self.particles.len() >= self.max_particles {
            // Oldest particles go first
            self.particles.remove(0);
        }
        self.particles.push(particle);
    }

    /// Radial particle burst
    pub fn emit_burst(&mut self, pos: Vec2, count: usize, speed: (f32, f32), colors: &[u32], life: f32) {
        if colors.is_empty() {
            return;
        }
        for _ in 0..count.min(self.max_particles) {
            let angle = self.rng.random::<f32>() * std::f32::consts::TAU;
            let s = speed.0 + self.rng.random::<f32>() * (speed.1 - speed.0).max(0.0);
            let color = colors[self.rng.random_range(0..colors.len())];
            let mut particle = Particle::new(pos, crate::polar_velocity(angle, s), color, life);
            particle.friction = 0.3;
            particle.shape = if self.rng.random_bool(0.3) {
                ParticleShape::Feather
            } else {
                ParticleShape::Spark
            };
            self.push_particle(particle);
        }
    }

    /// Drop a random power-up at `pos`
    pub fn drop_powerup(&mut self, pos: Vec2) {
        let kind = PowerupKind::roll(&mut self.rng);
        self.powerups.push(Powerup::new(pos, kind));
    }

    /// Current HUD values
    pub fn hud(&self) -> HudSnapshot {
        let (boss_health, boss_name) = match &self.boss {
            Some(boss) => ((boss.health, boss.max_health), Some(boss.name().to_string())),
            None => ((0.0, 0.0), None),
        };
        HudSnapshot {
            score: self.score,
            level: self.level,
            lives: self.lives,
            weapon_level: self.player.weapon_level,
            shield: self.shield,
            bombs: self.bombs,
            combo: self.combo,
            boss_health,
            boss_name,
            effects: self.effects.snapshot(),
            phase: self.phase,
        }
    }

    /// Activate an effect against this state's player and modifiers
    pub fn activate_effect(&mut self, kind: EffectKind, duration: f32) {
        self.effects
            .activate(kind, duration, &mut self.player, &mut self.modifiers);
    }

    /// Schedule the next phase transition, replacing a pending one
    pub fn schedule_transition(&mut self, delay: f32, transition: Transition) -> TimerId {
        self.cancel_transition();
        let id = self.timers.schedule(delay, transition);
        self.pending_transition = Some(id);
        id
    }

    /// Cancel the pending transition. False when nothing was waiting.
    pub fn cancel_transition(&mut self) -> bool {
        match self.pending_transition.take() {
            Some(id) => self.timers.cancel(id),
            None => false,
        }
    }

    /// Seconds until the pending transition fires
    pub fn transition_remaining(&self) -> Option<f32> {
        self.pending_transition
            .and_then(|id| self.timers.remaining(id))
    }

    /// Remove every transient entity (used by level restarts)
    pub fn clear_field(&mut self) {
        self.enemies.clear();
        self.spawn_queue.clear();
        self.spawn_timer = 0.0;
        self.boss = None;
        self.player_projectiles.clear();
        self.enemy_projectiles.clear();
        self.powerups.clear();
        self.particles.clear();
        self.cancel_transition();
    }
}
