//! Per-tick simulation update
//!
//! Order within a tick: clamp dt, scale by slow motion, move the player,
//! advance every entity and cull, run wave/boss progression, resolve
//! collisions, count down effects and the combo, decay screen feedback.
//! Match commands (start, restart, skip, bomb) live here too.

use glam::Vec2;
use rand::Rng;
use std::f32::consts::FRAC_PI_2;

use super::boss::{BOSS_NAMES, Boss, BossEnv, BossSignal};
use super::collision::{Rect, circles_overlap, point_in_circle};
use super::effects::{self, EffectKind};
use super::entities::{Enemy, Player, PowerupKind, Projectile, ShipVariant};
use super::formation;
use super::state::{GameEvent, GameState, MatchPhase, Transition};
use crate::consts::*;
use crate::polar_velocity;

/// Particle palettes
const EXPLOSION_COLORS: [u32; 3] = [0xff8800, 0xffaa00, 0xff4400];
const PHASE_COLORS: [u32; 3] = [0xff0000, 0xff9900, 0xffff00];
const BOSS_DEATH_COLORS: [u32; 4] = [0xff0000, 0xff8800, 0xffff00, 0xffffff];
const SHIELD_COLOR: u32 = 0x00ffff;
const HIT_COLOR: u32 = 0xff0000;
/// Angle of the extra rounds from the spread power-up
const SPREAD_ANGLE: f32 = std::f32::consts::FRAC_PI_6;

/// Input for a single tick
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    pub left: bool,
    pub right: bool,
    pub up: bool,
    pub down: bool,
    pub shooting: bool,
    /// Pointer/touch target; overrides the direction keys
    pub pointer: Option<Vec2>,
    /// Demo mode - AI flies the ship
    pub autopilot: bool,
}

impl TickInput {
    /// Direction keys as an axis vector (y grows downward)
    pub fn axis(&self) -> Vec2 {
        let x = self.right as i32 - self.left as i32;
        let y = self.down as i32 - self.up as i32;
        Vec2::new(x as f32, y as f32)
    }
}

/// Advance the match by `dt` seconds of wall time
pub fn tick(state: &mut GameState, input: &TickInput, dt: f32) {
    if !dt.is_finite() || dt <= 0.0 {
        return;
    }
    let dt = dt.min(state.max_frame_dt);

    if !state.phase.is_running() {
        // Background keeps drifting behind menus
        state.starfield.update(dt, state.height);
        update_particles(state, dt);
        decay_feedback(state, dt);
        return;
    }

    state.time += dt;
    let game_dt = dt * state.modifiers.time_scale;

    let input = if input.autopilot {
        autopilot(state)
    } else {
        input.clone()
    };

    update_player(state, &input, game_dt);
    state.starfield.update(game_dt, state.height);
    update_enemies(state, game_dt);
    update_boss(state, game_dt);
    update_projectiles(state, game_dt);
    update_powerups(state, game_dt);
    update_particles(state, game_dt);

    update_progression(state, dt, game_dt);

    resolve_collisions(state);

    update_effects(state, dt);
    decay_feedback(state, dt);
}

fn update_player(state: &mut GameState, input: &TickInput, dt: f32) {
    let (width, height) = (state.width, state.height);
    state
        .player
        .steer(input.axis(), input.pointer, dt, width, height);
    state.player.shield_angle = (state.player.shield_angle + SHIELD_SPIN * dt) % std::f32::consts::TAU;
    state.player.shooting = input.shooting;

    state.player.fire_timer = (state.player.fire_timer - dt).max(0.0);
    if input.shooting && state.player.fire_timer <= 0.0 && state.phase.is_combat() {
        fire(state);
        state.player.fire_timer = state
            .player
            .fire_cooldown(state.modifiers.fire_rate_multiplier);
    }
}

/// Fire the current ship's weapon
fn fire(state: &mut GameState) {
    let level = state.player.weapon_level;
    let muzzle = state.player.pos - Vec2::new(0.0, 20.0);
    let explosive = state.modifiers.explosive_rounds;
    let mut shots = Vec::new();

    match state.ship {
        ShipVariant::Blaster => {
            // One extra barrel per level, fanned out
            let n = level as f32;
            for i in 0..level {
                let offset = i as f32 - (n - 1.0) / 2.0;
                let angle = -FRAC_PI_2 + offset * 0.12;
                shots.push(Projectile::bullet(
                    muzzle + Vec2::new(offset * 8.0, 0.0),
                    polar_velocity(angle, PLAYER_BULLET_SPEED),
                    4.0 + level as f32 * 0.5,
                ));
            }
        }
        ShipVariant::Bomber => {
            let mut round = Projectile::bullet(
                muzzle,
                Vec2::new(0.0, -PLAYER_BULLET_SPEED * 0.8),
                6.0 + level as f32 * 1.5,
            );
            round.explosive = true;
            shots.push(round);
        }
        ShipVariant::Laser => {
            let bolts = level.div_ceil(2);
            for i in 0..bolts {
                let offset = i as f32 - (bolts as f32 - 1.0) / 2.0;
                shots.push(Projectile::laser(muzzle + Vec2::new(offset * 10.0, 0.0)));
            }
        }
    }

    if state.modifiers.spread_shots {
        if let Some(template) = shots.first().cloned() {
            for side in [-1.0, 1.0] {
                let speed = template.vel.length();
                let mut extra = template.clone();
                extra.pos = muzzle;
                extra.vel = Vec2::from_angle(side * SPREAD_ANGLE).rotate(Vec2::new(0.0, -speed));
                shots.push(extra);
            }
        }
    }
    for shot in &mut shots {
        shot.explosive |= explosive;
    }
    state.player_projectiles.extend(shots);
    let ship = state.ship;
    state.push_event(GameEvent::ShotFired { ship });
}

/// Seconds between eggs for an enemy on this level
fn enemy_shot_interval<R: Rng + ?Sized>(level: u32, rng: &mut R) -> f32 {
    (6.0 - level as f32 * 0.3).max(2.0) + rng.random::<f32>() * 3.0
}

fn update_enemies(state: &mut GameState, dt: f32) {
    let level = state.level;
    let height = state.height;
    let mut eggs = Vec::new();
    for enemy in &mut state.enemies {
        enemy.update(dt);
        if enemy.pos.y > 0.0 && enemy.pos.y < height {
            enemy.shoot_timer -= dt;
            if enemy.shoot_timer <= 0.0 {
                eggs.push(Projectile::egg(
                    enemy.pos + Vec2::new(0.0, enemy.radius),
                    Vec2::new(0.0, ENEMY_SHOT_SPEED * 0.75),
                ));
                enemy.shoot_timer = enemy_shot_interval(level, &mut state.rng);
            }
        }
    }
    state.enemy_projectiles.extend(eggs);

    // Enemies leaving the playfield are gone without scoring
    let bounds = Rect::new(-100.0, -200.0, state.width + 200.0, state.height + 250.0);
    state.enemies.retain(|e| bounds.contains(e.pos));
}

fn update_boss(state: &mut GameState, dt: f32) {
    let env = BossEnv {
        player: state.player.pos,
        width: state.width,
        height: state.height,
    };
    let Some(boss) = state.boss.as_mut() else {
        return;
    };
    let out = boss.update(dt, &env, &mut state.rng);
    let pos = boss.pos;
    state.enemy_projectiles.extend(out.shots);

    for signal in out.signals {
        match signal {
            BossSignal::Arrived => {
                state.add_shake(0.5);
                state.push_event(GameEvent::BossArrived);
            }
            BossSignal::PhaseChanged(phase) => {
                state.flash(0xff0000, 0.3);
                state.add_shake(0.4);
                state.emit_burst(pos, 50, (100.0, 400.0), &PHASE_COLORS, 0.8);
                state.push_event(GameEvent::BossPhaseChanged { phase });
            }
            BossSignal::Charging(_) => state.push_event(GameEvent::BossCharging),
            BossSignal::Attack(pattern) => log::debug!("boss fires {}", pattern.name()),
        }
    }
}

fn update_projectiles(state: &mut GameState, dt: f32) {
    let target = state.player.pos;
    let bounds = Rect::new(-20.0, -20.0, state.width + 40.0, state.height + 40.0);
    for p in state
        .player_projectiles
        .iter_mut()
        .chain(state.enemy_projectiles.iter_mut())
    {
        p.update(dt, target);
    }
    state
        .player_projectiles
        .retain(|p| !p.dead && bounds.contains(p.pos));
    state
        .enemy_projectiles
        .retain(|p| !p.dead && bounds.contains(p.pos));
}

fn update_powerups(state: &mut GameState, dt: f32) {
    let player = state.player.pos;
    let floor = state.height + 20.0;
    for powerup in &mut state.powerups {
        powerup.update(dt, player);
    }
    state.powerups.retain(|p| p.pos.y < floor);
}

fn update_particles(state: &mut GameState, dt: f32) {
    for particle in &mut state.particles {
        particle.update(dt);
    }
    state.particles.retain(|p| p.is_alive());
}

fn update_progression(state: &mut GameState, dt: f32, game_dt: f32) {
    if state.phase == MatchPhase::WaveActive {
        state.spawn_timer -= game_dt;
        while state.spawn_timer <= 0.0 {
            let Some(spec) = state.spawn_queue.pop_front() else {
                break;
            };
            let first_shot = enemy_shot_interval(state.level, &mut state.rng);
            state.enemies.push(Enemy::from_spec(&spec, first_shot));
            state.spawn_timer += ENEMY_SPAWN_INTERVAL;
        }

        if state.spawn_queue.is_empty() && state.enemies.is_empty() {
            let level = state.level;
            log::info!("wave {level} cleared");
            state.phase = MatchPhase::WaveClear;
            state.push_event(GameEvent::WaveCleared { level });
            state.schedule_transition(WAVE_CLEAR_DELAY, Transition::AdvanceLevel);
        }
    }

    let due = state.timers.advance(dt);
    if state.transition_remaining().is_none() {
        state.pending_transition = None;
    }
    for action in due {
        match action {
            Transition::StartWave => start_wave(state),
            Transition::SpawnBoss => spawn_boss(state),
            Transition::AdvanceLevel => {
                state.level += 1;
                begin_level(state);
            }
        }
    }
}

fn resolve_collisions(state: &mut GameState) {
    player_shots_vs_targets(state);
    settle_boss(state);
    enemy_shots_vs_player(state);
    enemies_vs_player(state);
    powerups_vs_player(state);
}

/// Each player shot resolves at most one hit: enemies first, then the boss
fn player_shots_vs_targets(state: &mut GameState) {
    let mut shots = std::mem::take(&mut state.player_projectiles);
    for shot in shots.iter_mut().filter(|s| !s.dead) {
        let hit = state
            .enemies
            .iter()
            .position(|e| e.is_alive() && circles_overlap(shot.pos, shot.radius, e.pos, e.radius));

        if let Some(index) = hit {
            shot.dead = true;
            state.enemies[index].health -= shot.damage as i32;
            if shot.explosive {
                let impact = shot.pos;
                for (i, other) in state.enemies.iter_mut().enumerate() {
                    if i != index && other.is_alive() && point_in_circle(other.pos, impact, EXPLOSION_RADIUS) {
                        other.health -= 1;
                    }
                }
                state.emit_burst(impact, 20, (60.0, 300.0), &EXPLOSION_COLORS, 0.6);
            }
            reap_enemies(state);
            continue;
        }

        let Some(boss) = state.boss.as_mut() else {
            continue;
        };
        if !boss.is_active() || !circles_overlap(shot.pos, shot.radius, boss.pos, boss.radius) {
            continue;
        }
        shot.dead = true;
        let critical = boss.weak_point_hit(shot.pos, shot.radius);
        let mut damage = shot.damage as f32;
        if shot.explosive {
            damage += EXPLOSIVE_BOSS_BONUS;
        }
        boss.take_damage(damage, critical);
        if critical {
            state.add_shake(0.3);
            state.flash(0xffff00, 0.25);
            state.emit_burst(shot.pos, 12, (80.0, 260.0), &[0xffff00, 0xffffff], 0.5);
            state.push_event(GameEvent::BossCritical);
        } else {
            state.add_shake(0.1);
            state.flash(0xffffff, 0.05);
            state.emit_burst(shot.pos, 5, (40.0, 160.0), &[0xffffff], 0.35);
        }
    }
    shots.retain(|s| !s.dead);
    state.player_projectiles = shots;
}

/// Remove dead enemies in order, scoring each
fn reap_enemies(state: &mut GameState) {
    let mut i = 0;
    while i < state.enemies.len() {
        if state.enemies[i].is_alive() {
            i += 1;
            continue;
        }
        let enemy = state.enemies.remove(i);
        kill_enemy(state, &enemy);
    }
}

fn kill_enemy(state: &mut GameState, enemy: &Enemy) {
    let points = state.award_kill(enemy.points());
    state.emit_burst(enemy.pos, 10, (60.0, 240.0), &EXPLOSION_COLORS, 0.5);
    if state.rng.random_bool(POWERUP_DROP_CHANCE) {
        state.drop_powerup(enemy.pos);
    }
    state.push_event(GameEvent::EnemyKilled {
        pos: enemy.pos,
        points,
    });
}

/// Threshold drops and the one-time defeat payout
fn settle_boss(state: &mut GameState) {
    let Some(boss) = state.boss.as_mut() else {
        return;
    };
    let drops = boss.take_threshold_drops();
    let pos = boss.pos;
    let defeated = boss.defeat();
    let name = boss.name().to_string();

    for _ in 0..drops {
        let jitter = (state.rng.random::<f32>() - 0.5) * 80.0;
        state.drop_powerup(pos + Vec2::new(jitter, 50.0));
    }
    if !defeated {
        return;
    }

    state.boss = None;
    state.bosses_defeated += 1;
    let points = BOSS_KILL_SCORE * state.modifiers.score_multiplier;
    state.score += points;
    state.add_shake(1.0);
    state.flash(0xffffff, 0.6);
    state.emit_burst(pos, 100, (60.0, 600.0), &BOSS_DEATH_COLORS, 1.0);
    for _ in 0..3 {
        let jitter = (state.rng.random::<f32>() - 0.5) * 80.0;
        state.drop_powerup(pos + Vec2::new(jitter, 0.0));
    }
    log::info!("{name} defeated on level {}", state.level);
    state.push_event(GameEvent::BossDefeated { name, points });
    state.phase = MatchPhase::BossClear;
    state.schedule_transition(BOSS_CLEAR_DELAY, Transition::AdvanceLevel);
}

fn enemy_shots_vs_player(state: &mut GameState) {
    let mut shots = std::mem::take(&mut state.enemy_projectiles);
    for shot in shots.iter_mut() {
        if !state.phase.is_running() {
            break;
        }
        if state.player.invincible {
            continue;
        }
        let touches_player = circles_overlap(shot.pos, shot.radius, state.player.pos, PLAYER_RADIUS);
        if state.shield > 0 {
            let touches_orb = state
                .player
                .shield_orbs(state.shield)
                .any(|orb| circles_overlap(shot.pos, shot.radius, orb, SHIELD_BLOCK_RADIUS));
            if touches_orb || touches_player {
                shot.dead = true;
                state.shield -= 1;
                state.emit_burst(shot.pos, 5, (30.0, 120.0), &[SHIELD_COLOR], 0.3);
                state.push_event(GameEvent::ShieldBlock);
                continue;
            }
        }
        if touches_player {
            shot.dead = true;
            hit_player(state);
        }
    }
    shots.retain(|s| !s.dead);
    state.enemy_projectiles = shots;
}

/// Body contact destroys the enemy and hurts the player on the same tick
fn enemies_vs_player(state: &mut GameState) {
    if !state.phase.is_running() {
        return;
    }
    let player = state.player.pos;
    let mut contacts = 0;
    for enemy in &mut state.enemies {
        if enemy.is_alive() && circles_overlap(enemy.pos, enemy.radius, player, PLAYER_RADIUS) {
            enemy.health = 0;
            contacts += 1;
        }
    }
    if contacts == 0 {
        return;
    }
    reap_enemies(state);
    hit_player(state);
}

fn powerups_vs_player(state: &mut GameState) {
    if !state.phase.is_running() {
        return;
    }
    let player = state.player.pos;
    let mut collected = Vec::new();
    state.powerups.retain(|p| {
        if circles_overlap(p.pos, p.radius, player, PLAYER_RADIUS) {
            collected.push((p.kind, p.pos));
            false
        } else {
            true
        }
    });
    for (kind, pos) in collected {
        collect_powerup(state, kind);
        state.emit_burst(pos, 15, (40.0, 200.0), &[kind.color()], 0.4);
    }
}

/// Apply a power-up's effect and the flat pickup bonus
pub fn collect_powerup(state: &mut GameState, kind: PowerupKind) {
    state.score += POWERUP_PICKUP_SCORE;
    match kind {
        PowerupKind::Weapon => state.player.raise_weapon(),
        PowerupKind::Shield => state.shield = (state.shield + 1).min(MAX_SHIELD_CHARGES),
        PowerupKind::Health => {
            state.lives = (state.lives + 1).min(MAX_LIVES);
            state.activate_effect(EffectKind::Health, effects::HEALTH_TAG_DURATION);
        }
        PowerupKind::Invincible => state.activate_effect(EffectKind::Invincible, effects::INVINCIBLE_DURATION),
        PowerupKind::Speed => state.activate_effect(EffectKind::Speed, effects::SPEED_DURATION),
        PowerupKind::FireRate => state.activate_effect(EffectKind::FireRate, effects::FIRE_RATE_DURATION),
        PowerupKind::Multiplier => {
            state.activate_effect(EffectKind::ScoreMultiplier, effects::MULTIPLIER_DURATION)
        }
        PowerupKind::SlowMotion => {
            state.activate_effect(EffectKind::SlowMotion, effects::SLOW_MOTION_DURATION)
        }
        PowerupKind::Bomb => state.bombs = (state.bombs + 1).min(MAX_BOMBS),
        PowerupKind::Explosive => state.activate_effect(EffectKind::Explosive, effects::EXPLOSIVE_DURATION),
        PowerupKind::Spread => state.activate_effect(EffectKind::Spread, effects::SPREAD_DURATION),
    }
    state.push_event(GameEvent::PowerupCollected { kind });
}

/// Take one hit unless invincible
fn hit_player(state: &mut GameState) {
    if state.player.invincible || !state.phase.is_running() {
        return;
    }
    state.lives = state.lives.saturating_sub(1);
    state.player.lower_weapon();
    state.combo = 0;
    state.combo_timer = 0.0;
    state.activate_effect(EffectKind::Invincible, HIT_INVINCIBILITY);
    state.add_shake(0.75);
    state.flash(HIT_COLOR, 0.3);
    let pos = state.player.pos;
    state.emit_burst(pos, 20, (60.0, 300.0), &[HIT_COLOR], 0.6);
    let lives = state.lives;
    state.push_event(GameEvent::PlayerHit { lives });

    if lives == 0 {
        game_over(state);
    }
}

fn game_over(state: &mut GameState) {
    log::info!("game over: score {} on level {}", state.score, state.level);
    state.phase = MatchPhase::GameOver;
    state.cancel_transition();
    state.spawn_queue.clear();
    let (score, level) = (state.score, state.level);
    state.push_event(GameEvent::GameOver { score, level });
}

fn update_effects(state: &mut GameState, dt: f32) {
    let expired = state
        .effects
        .tick(dt, &mut state.player, &mut state.modifiers);
    for kind in expired {
        state.push_event(GameEvent::EffectExpired { kind });
    }

    if state.combo > 0 {
        state.combo_timer -= dt;
        if state.combo_timer <= 0.0 {
            state.combo = 0;
            state.combo_timer = 0.0;
        }
    }
}

fn decay_feedback(state: &mut GameState, dt: f32) {
    // Per-frame decay expressed at 60 Hz so it holds at any frame rate
    state.screen_shake *= SHAKE_DECAY_PER_FRAME.powf(dt * 60.0);
    if state.screen_shake < 0.01 {
        state.screen_shake = 0.0;
    }
    state.flash_alpha = (state.flash_alpha - FLASH_DECAY_RATE * dt).max(0.0);
}

/// Start a new match on level 1
pub fn start_match(state: &mut GameState, ship: ShipVariant) {
    state.clear_field();
    state
        .effects
        .clear(&mut state.player, &mut state.modifiers);
    state.ship = ship;
    state.player = Player::new(Player::spawn_point(state.width, state.height), ship);
    state.level = 1;
    state.score = 0;
    state.lives = state.starting_lives.clamp(1, MAX_LIVES);
    state.shield = 0;
    state.bombs = STARTING_BOMBS;
    state.combo = 0;
    state.combo_timer = 0.0;
    state.bosses_defeated = 0;
    state.time = 0.0;
    state.screen_shake = 0.0;
    state.flash_alpha = 0.0;
    log::info!("match started with {} (seed {})", ship.as_str(), state.seed);
    state.push_event(GameEvent::MatchStarted { ship });
    begin_level(state);
}

/// Enter the intro for the current level
pub fn begin_level(state: &mut GameState) {
    let level = state.level;
    let boss = GameState::is_boss_level(level);
    log::info!("level {level} starting{}", if boss { " (boss)" } else { "" });
    state.push_event(GameEvent::LevelStarted { level, boss });

    if boss {
        state.phase = MatchPhase::BossIntro;
        let kind = Boss::kind_for_level(level) as usize;
        let name = BOSS_NAMES[kind % BOSS_NAMES.len()].to_string();
        state.flash(0xff0000, 0.2);
        state.push_event(GameEvent::BossWarning { name });
        state.schedule_transition(BOSS_WARNING_DELAY, Transition::SpawnBoss);
    } else {
        state.phase = MatchPhase::WaveIntro;
        state.schedule_transition(WAVE_INTRO_DELAY, Transition::StartWave);
    }
}

fn start_wave(state: &mut GameState) {
    let specs = formation::generate(state.width, state.level, &mut state.rng);
    log::debug!("wave {} with {} enemies", state.level, specs.len());
    state.spawn_queue = specs.into();
    state.spawn_timer = 0.0;
    state.phase = MatchPhase::WaveActive;
}

fn spawn_boss(state: &mut GameState) {
    let kind = Boss::kind_for_level(state.level);
    let boss = Boss::new(kind, state.level, state.width);
    let name = boss.name().to_string();
    log::info!("{name} spawned with {} health", boss.max_health);
    state.boss = Some(boss);
    state.phase = MatchPhase::BossActive;
    state.add_shake(0.5);

    // Red warning sparks across the field
    for _ in 0..50 {
        let pos = Vec2::new(
            state.rng.random::<f32>() * state.width,
            state.rng.random::<f32>() * state.height,
        );
        let vel = Vec2::new(
            (state.rng.random::<f32>() - 0.5) * 240.0,
            (state.rng.random::<f32>() - 0.5) * 240.0,
        );
        state.push_particle(super::entities::Particle::new(pos, vel, 0xff0000, 0.5));
    }
    state.push_event(GameEvent::BossSpawned { name });
}

/// Restart the current level from its intro, keeping score and lives
pub fn restart_level(state: &mut GameState) {
    if !state.phase.is_running() {
        return;
    }
    state.clear_field();
    state.player.pos = Player::spawn_point(state.width, state.height);
    begin_level(state);
}

/// Jump to the next boss level
pub fn skip_to_boss(state: &mut GameState) {
    if !state.phase.is_running() {
        return;
    }
    state.level = state.level / BOSS_LEVEL_INTERVAL * BOSS_LEVEL_INTERVAL + BOSS_LEVEL_INTERVAL;
    restart_level(state);
}

/// Abandon the current level and start the next one
pub fn next_level(state: &mut GameState) {
    if !state.phase.is_running() {
        return;
    }
    state.clear_field();
    state.level += 1;
    begin_level(state);
}

/// Detonate a bomb. Returns false when none could be used.
pub fn use_bomb(state: &mut GameState) -> bool {
    if !state.phase.is_combat() || state.bombs == 0 {
        return false;
    }
    state.bombs -= 1;
    state.enemy_projectiles.clear();
    for enemy in &mut state.enemies {
        enemy.health = 0;
    }
    reap_enemies(state);
    if let Some(boss) = state.boss.as_mut() {
        if boss.is_active() {
            boss.take_damage(BOMB_BOSS_DAMAGE, false);
        }
    }
    settle_boss(state);
    state.flash(0xffffff, 1.0);
    state.add_shake(1.0);
    state.activate_effect(EffectKind::Bomb, BOMB_EFFECT_TIME);
    state.push_event(GameEvent::BombUsed);
    true
}

/// Demo AI: dodge, collect, line up under targets, always fire
fn autopilot(state: &GameState) -> TickInput {
    let player = state.player.pos;
    let home_y = Player::spawn_point(state.width, state.height).y;

    let threat = state
        .enemy_projectiles
        .iter()
        .filter(|p| p.pos.y < player.y + 10.0 && (p.pos.x - player.x).abs() < 40.0)
        .filter(|p| player.y - p.pos.y < 140.0)
        .min_by(|a, b| a.pos.distance_squared(player).total_cmp(&b.pos.distance_squared(player)));

    let target = if let Some(shot) = threat {
        let side = if shot.pos.x <= player.x { 1.0 } else { -1.0 };
        Vec2::new(player.x + side * 80.0, home_y)
    } else if let Some(powerup) = state
        .powerups
        .iter()
        .filter(|p| p.pos.distance(player) < 220.0)
        .min_by(|a, b| a.pos.distance_squared(player).total_cmp(&b.pos.distance_squared(player)))
    {
        powerup.pos
    } else if let Some(boss) = &state.boss {
        Vec2::new(boss.pos.x, home_y)
    } else if let Some(enemy) = state
        .enemies
        .iter()
        .min_by(|a, b| (a.pos.x - player.x).abs().total_cmp(&(b.pos.x - player.x).abs()))
    {
        Vec2::new(enemy.pos.x, home_y)
    } else {
        Vec2::new(state.width / 2.0, home_y)
    };

    TickInput {
        shooting: true,
        pointer: Some(target),
        ..Default::default()
    }
}
