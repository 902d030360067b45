//! Cluck Shooter - a vertical arcade shooter
//!
//! Core modules:
//! - `sim`: Simulation (entities, formations, bosses, buffs, collisions)
//! - `game`: Frame driver and command surface wrapped around the simulation
//! - `observer`: UI sync notifications
//! - `platform`: Input-intent providers
//! - `audio`: Audio port
//! - `renderer`: Read-only render view and a text renderer
//! - `highscores`: Leaderboard collaborator
//! - `settings`: User settings and frame tuning

pub mod audio;
pub mod game;
pub mod highscores;
pub mod observer;
pub mod platform;
pub mod renderer;
pub mod settings;
pub mod sim;

pub use game::Game;
pub use highscores::{Leaderboard, LeaderboardEntry, LeaderboardError};
pub use settings::{QualityPreset, Settings};

use glam::Vec2;

/// Game configuration constants
pub mod consts {
    /// Default playfield dimensions
    pub const PLAYFIELD_WIDTH: f32 = 800.0;
    pub const PLAYFIELD_HEIGHT: f32 = 600.0;
    /// Smallest playfield the formation bounds can fit into
    pub const MIN_PLAYFIELD_WIDTH: f32 = 100.0;
    pub const MIN_PLAYFIELD_HEIGHT: f32 = 320.0;

    /// Largest frame delta accepted by a tick (seconds)
    pub const MAX_FRAME_DT: f32 = 0.1;

    /// Player defaults
    pub const PLAYER_SPEED: f32 = 300.0;
    pub const PLAYER_RADIUS: f32 = 12.0;
    /// Distance kept from the playfield edge
    pub const PLAYER_MARGIN: f32 = 20.0;
    pub const STARTING_LIVES: u32 = 3;
    pub const MAX_LIVES: u32 = 5;
    pub const WEAPON_LEVEL_CAP: u32 = 5;
    pub const MAX_SHIELD_CHARGES: u32 = 5;
    pub const STARTING_BOMBS: u32 = 1;
    pub const MAX_BOMBS: u32 = 3;
    /// Invincibility window after taking a hit
    pub const HIT_INVINCIBILITY: f32 = 2.0;

    /// Shield charges orbit the player at this radius
    pub const SHIELD_ORBIT_RADIUS: f32 = 30.0;
    pub const SHIELD_BLOCK_RADIUS: f32 = 10.0;
    /// Orbit angular speed (radians per second)
    pub const SHIELD_SPIN: f32 = 3.0;

    /// Player weapons
    pub const PLAYER_BULLET_SPEED: f32 = 480.0;
    pub const LASER_BOLT_SPEED: f32 = 720.0;
    pub const EXPLOSION_RADIUS: f32 = 50.0;
    /// Extra damage an explosive round deals to a boss
    pub const EXPLOSIVE_BOSS_BONUS: f32 = 2.0;

    /// Enemy projectiles
    pub const EGG_RADIUS: f32 = 8.0;
    pub const ENEMY_SHOT_SPEED: f32 = 240.0;
    pub const HOMING_STRENGTH: f32 = 200.0;
    pub const HOMING_MAX_SPEED: f32 = 300.0;

    /// Scoring
    pub const COMBO_TIMEOUT: f32 = 2.0;
    pub const POWERUP_DROP_CHANCE: f64 = 0.15;
    pub const POWERUP_PICKUP_SCORE: u64 = 50;
    pub const BOSS_KILL_SCORE: u64 = 5000;

    /// Power-ups
    pub const POWERUP_RADIUS: f32 = 15.0;
    pub const POWERUP_FALL_SPEED: f32 = 80.0;
    pub const POWERUP_ATTRACT_RADIUS: f32 = 120.0;
    pub const POWERUP_ATTRACT_SPEED: f32 = 260.0;

    /// Wave pacing
    pub const ENEMY_SPAWN_INTERVAL: f32 = 0.2;
    pub const WAVE_INTRO_DELAY: f32 = 1.5;
    pub const WAVE_CLEAR_DELAY: f32 = 2.0;
    pub const BOSS_WARNING_DELAY: f32 = 2.0;
    pub const BOSS_CLEAR_DELAY: f32 = 3.0;
    /// Every Nth level is a boss level
    pub const BOSS_LEVEL_INTERVAL: u32 = 3;

    /// Bomb
    pub const BOMB_BOSS_DAMAGE: f32 = 50.0;
    pub const BOMB_EFFECT_TIME: f32 = 1.0;

    /// Screen feedback
    pub const SHAKE_DECAY_PER_FRAME: f32 = 0.9;
    pub const FLASH_DECAY_RATE: f32 = 2.0;

    /// Particle cap when no quality preset is supplied
    pub const MAX_PARTICLES: usize = 500;
}

/// Unit vector for an angle in radians
#[inline]
pub fn from_angle(theta: f32) -> Vec2 {
    Vec2::new(theta.cos(), theta.sin())
}

/// Velocity of magnitude `speed` heading along `theta`
#[inline]
pub fn polar_velocity(theta: f32, speed: f32) -> Vec2 {
    from_angle(theta) * speed
}

/// Move `current` toward `target` by at most `max_step`
#[inline]
pub fn step_toward(current: Vec2, target: Vec2, max_step: f32) -> Vec2 {
    let delta = target - current;
    let dist = delta.length();
    if dist <= max_step || dist < f32::EPSILON {
        target
    } else {
        current + delta / dist * max_step
    }
}
