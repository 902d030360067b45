//! Boss entity and its attack state machine
//!
//! `Entering` → `Active` → `Defeated`. While active the boss escalates through
//! phases derived from lost health (never backwards), steers toward a
//! phase-selected movement target, telegraphs each attack with a charge, and
//! drains the staggered shots of its current pattern from `update`.

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::entities::Projectile;
use super::patterns::{self, AttackPattern, PatternContext, ScheduledShot};

pub const BOSS_NAMES: [&str; 4] = [
    "COLONEL CLUCKSWORTH",
    "GENERAL PECKERSON",
    "ADMIRAL FEATHERBEAK",
    "SUPREME ROOSTER",
];

pub const BOSS_MAX_PHASES: u32 = 4;
pub const BOSS_RADIUS: f32 = 60.0;
/// Descent speed while entering (pixels/sec)
pub const BOSS_ENTRY_SPEED: f32 = 150.0;
pub const BOSS_ANCHOR_Y: f32 = 150.0;
pub const BOSS_BASE_SPEED: f32 = 120.0;
pub const BOSS_SPEED_PER_PHASE: f32 = 40.0;
/// Keeps the boss this far from the side and top edges
pub const BOSS_EDGE_MARGIN: f32 = 80.0;

pub const BASE_ATTACK_INTERVAL: f32 = 1.5;
pub const ATTACK_INTERVAL_STEP: f32 = 0.2;
pub const MIN_ATTACK_INTERVAL: f32 = 0.5;
/// Telegraph before each attack (seconds)
pub const CHARGE_TIME: f32 = 0.8;
const FIRST_ATTACK_DELAY: f32 = 1.0;

/// Expected weak-point activations per second while dormant
pub const WEAK_POINT_RATE: f32 = 0.18;
pub const WEAK_POINT_DURATION: f32 = 3.0;
/// Sits on the lower hull, facing the player's guns
pub const WEAK_POINT_OFFSET: Vec2 = Vec2::new(0.0, BOSS_RADIUS * 0.8);
pub const WEAK_POINT_RADIUS: f32 = 18.0;
pub const WEAK_POINT_MULTIPLIER: f32 = 3.0;

/// Health fractions that guarantee a power-up drop
pub const DROP_THRESHOLDS: [f32; 3] = [0.75, 0.5, 0.25];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BossState {
    Entering,
    Active,
    Defeated,
}

/// Temporary bonus-damage hit zone
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WeakPoint {
    pub offset: Vec2,
    pub radius: f32,
    pub remaining: f32,
}

/// Something the tick should react to
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum BossSignal {
    /// Reached the anchor and started fighting
    Arrived,
    PhaseChanged(u32),
    Charging(AttackPattern),
    Attack(AttackPattern),
}

/// Output of one boss update
#[derive(Debug, Default)]
pub struct BossUpdate {
    pub shots: Vec<Projectile>,
    pub signals: Vec<BossSignal>,
}

/// World facts the boss reads each update
#[derive(Debug, Clone, Copy)]
pub struct BossEnv {
    pub player: Vec2,
    pub width: f32,
    pub height: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Boss {
    pub pos: Vec2,
    /// Movement setpoint
    pub target: Vec2,
    /// Selects the name and pattern offset
    pub kind: u32,
    pub max_health: f32,
    pub health: f32,
    pub radius: f32,
    pub state: BossState,
    pub phase: u32,
    pub max_phases: u32,
    pub movement_pattern: u32,
    pub movement_time: f32,
    /// Rated speed; the boss never moves faster
    pub speed: f32,
    pub attack_timer: f32,
    pub attack_interval: f32,
    /// Next library entry to fire
    pub attack_index: usize,
    /// Seconds left on the telegraph and the pattern it will fire
    pub charge: Option<(f32, AttackPattern)>,
    pub weak_point: Option<WeakPoint>,
    /// Spin used to rotate spiral patterns
    pub rotation: f32,
    /// Seconds of hit flash left
    pub flash_timer: f32,
    /// Staggered shots still waiting to fire
    pub pending: Vec<ScheduledShot>,
    drops_given: usize,
}

impl Boss {
    /// Boss type for a level, cycling through the roster
    pub fn kind_for_level(level: u32) -> u32 {
        (level.max(1) - 1) / 3 % BOSS_NAMES.len() as u32
    }

    /// Health pool grows with boss type and level
    pub fn max_health_for(kind: u32, level: u32) -> f32 {
        500.0 + kind as f32 * 100.0 + (level.saturating_sub(2) / 2) as f32 * 300.0
    }

    /// Phase for a health fraction, clamped to `0..max_phases`
    pub fn phase_for(health: f32, max_health: f32, max_phases: u32) -> u32 {
        if max_phases == 0 {
            log::warn!("boss has no phases, using phase 0");
            return 0;
        }
        if max_health <= 0.0 || !max_health.is_finite() {
            log::warn!("boss max health {max_health} is invalid, using phase 0");
            return 0;
        }
        let raw = health / max_health;
        if !(0.0..=1.0).contains(&raw) {
            log::warn!("boss health {health} outside 0..={max_health}, clamping");
        }
        let fraction = if raw.is_nan() { 1.0 } else { raw.clamp(0.0, 1.0) };
        let phase = ((1.0 - fraction) * max_phases as f32).floor() as u32;
        phase.min(max_phases - 1)
    }

    /// New boss just above the playfield
    pub fn new(kind: u32, level: u32, width: f32) -> Self {
        let max_health = Self::max_health_for(kind, level);
        let spawn = Vec2::new(width / 2.0, -BOSS_RADIUS);
        Self {
            pos: spawn,
            target: Vec2::new(spawn.x, BOSS_ANCHOR_Y),
            kind,
            max_health,
            health: max_health,
            radius: BOSS_RADIUS,
            state: BossState::Entering,
            phase: 0,
            max_phases: BOSS_MAX_PHASES,
            movement_pattern: 0,
            movement_time: 0.0,
            speed: BOSS_BASE_SPEED,
            attack_timer: FIRST_ATTACK_DELAY,
            attack_interval: BASE_ATTACK_INTERVAL,
            attack_index: kind as usize * 3,
            charge: None,
            weak_point: None,
            rotation: 0.0,
            flash_timer: 0.0,
            pending: Vec::new(),
            drops_given: 0,
        }
    }

    pub fn name(&self) -> &'static str {
        BOSS_NAMES[self.kind as usize % BOSS_NAMES.len()]
    }

    pub fn health_fraction(&self) -> f32 {
        if self.max_health > 0.0 {
            (self.health / self.max_health).clamp(0.0, 1.0)
        } else {
            0.0
        }
    }

    pub fn is_active(&self) -> bool {
        self.state == BossState::Active
    }

    pub fn update<R: Rng + ?Sized>(&mut self, dt: f32, env: &BossEnv, rng: &mut R) -> BossUpdate {
        let mut out = BossUpdate::default();
        if self.flash_timer > 0.0 {
            self.flash_timer = (self.flash_timer - dt).max(0.0);
        }
        self.rotation += dt * 0.5;

        match self.state {
            BossState::Defeated => return out,
            BossState::Entering => {
                let anchor = anchor_y(env.height);
                self.pos.y += BOSS_ENTRY_SPEED * dt;
                if self.pos.y >= anchor {
                    self.pos.y = anchor;
                    self.state = BossState::Active;
                    out.signals.push(BossSignal::Arrived);
                }
                return out;
            }
            BossState::Active => {}
        }

        let phase = Self::phase_for(self.health, self.max_health, self.max_phases);
        if phase > self.phase {
            self.enter_phase(phase);
            out.signals.push(BossSignal::PhaseChanged(phase));
        }

        self.steer(dt, env);

        // Attack cadence: countdown, then telegraph, then fire
        self.attack_timer -= dt;
        if self.attack_timer <= 0.0 {
            self.attack_interval = attack_interval_for(self.phase);
            self.attack_timer = self.attack_interval;
            if self.charge.is_none() {
                let pattern = AttackPattern::from_index(self.attack_index);
                self.attack_index = (self.attack_index + 1) % AttackPattern::ALL.len();
                self.charge = Some((CHARGE_TIME, pattern));
                out.signals.push(BossSignal::Charging(pattern));
            }
        }
        if let Some((remaining, pattern)) = self.charge {
            let remaining = remaining - dt;
            if remaining <= 0.0 {
                self.charge = None;
                let ctx = PatternContext {
                    phase: self.phase,
                    rotation: self.rotation,
                    playfield_width: env.width,
                };
                self.pending.extend(patterns::schedule(pattern, &ctx, rng));
                out.signals.push(BossSignal::Attack(pattern));
            } else {
                self.charge = Some((remaining, pattern));
            }
        }

        self.update_weak_point(dt, rng);
        self.emit_due_shots(dt, env.player, &mut out.shots);
        out
    }

    fn enter_phase(&mut self, phase: u32) {
        self.phase = phase;
        self.movement_pattern = (self.movement_pattern + 1) % 4;
        self.movement_time = 0.0;
        self.speed = BOSS_BASE_SPEED + phase as f32 * BOSS_SPEED_PER_PHASE;
        self.attack_interval = attack_interval_for(phase);
        self.attack_timer = self.attack_timer.min(self.attack_interval);
        log::debug!("{} entered phase {}", self.name(), phase);
    }

    fn steer(&mut self, dt: f32, env: &BossEnv) {
        self.movement_time += dt;
        let t = self.movement_time;
        let cx = env.width / 2.0;
        self.target = match self.movement_pattern % 4 {
            // Sinusoidal sweep
            0 => Vec2::new(cx + (t * 1.5).sin() * 200.0, BOSS_ANCHOR_Y),
            // Figure-eight
            1 => Vec2::new(cx + t.sin() * 250.0, BOSS_ANCHOR_Y + (t * 2.0).sin() * 80.0),
            // Orbit
            2 => Vec2::new(cx + t.cos() * 200.0, 200.0 + t.sin() * 100.0),
            // Dive at the player two seconds out of five
            _ => {
                if (t.floor() as u32) % 5 < 2 {
                    Vec2::new(env.player.x, 300.0)
                } else {
                    Vec2::new(self.target.x, BOSS_ANCHOR_Y)
                }
            }
        };

        let delta = self.target - self.pos;
        if delta.length() > 5.0 {
            self.pos = crate::step_toward(self.pos, self.target, self.speed * dt);
        }

        let max_x = (env.width - BOSS_EDGE_MARGIN).max(BOSS_EDGE_MARGIN);
        let max_y = (env.height * 0.5).max(BOSS_EDGE_MARGIN);
        self.pos.x = self.pos.x.clamp(BOSS_EDGE_MARGIN, max_x);
        self.pos.y = self.pos.y.clamp(BOSS_EDGE_MARGIN, max_y);
    }

    fn update_weak_point<R: Rng + ?Sized>(&mut self, dt: f32, rng: &mut R) {
        match &mut self.weak_point {
            Some(wp) => {
                wp.remaining -= dt;
                if wp.remaining <= 0.0 {
                    self.weak_point = None;
                }
            }
            None => {
                let chance = (WEAK_POINT_RATE * dt).clamp(0.0, 1.0) as f64;
                if rng.random_bool(chance) {
                    self.open_weak_point();
                }
            }
        }
    }

    /// Expose the weak point for its full window
    pub fn open_weak_point(&mut self) {
        self.weak_point = Some(WeakPoint {
            offset: WEAK_POINT_OFFSET,
            radius: WEAK_POINT_RADIUS,
            remaining: WEAK_POINT_DURATION,
        });
    }

    fn emit_due_shots(&mut self, dt: f32, player: Vec2, shots: &mut Vec<Projectile>) {
        if self.pending.is_empty() {
            return;
        }
        let pos = self.pos;
        self.pending.retain_mut(|shot| {
            shot.delay -= dt;
            if shot.delay > 0.0 {
                return true;
            }
            let origin = patterns::resolve_origin(shot.origin, pos);
            let vel = patterns::resolve_velocity(shot.aim, origin, player);
            shots.push(if shot.homing {
                Projectile::homing_egg(origin, vel)
            } else {
                Projectile::egg(origin, vel)
            });
            false
        });
    }

    /// True when a shot of `radius` at `p` touches an open weak point
    pub fn weak_point_hit(&self, p: Vec2, radius: f32) -> bool {
        self.weak_point.is_some_and(|wp| {
            super::collision::circles_overlap(p, radius, self.pos + wp.offset, wp.radius)
        })
    }

    /// Apply damage, tripled on a critical; returns the damage dealt
    pub fn take_damage(&mut self, amount: f32, critical: bool) -> f32 {
        if self.state == BossState::Defeated {
            return 0.0;
        }
        let dealt = if critical {
            amount * WEAK_POINT_MULTIPLIER
        } else {
            amount
        };
        self.health = (self.health - dealt).max(0.0);
        self.flash_timer = 0.1;
        dealt
    }

    /// Threshold drops earned since the last call
    pub fn take_threshold_drops(&mut self) -> usize {
        let fraction = self.health_fraction();
        let mut earned = 0;
        while self.drops_given < DROP_THRESHOLDS.len() && fraction <= DROP_THRESHOLDS[self.drops_given] {
            self.drops_given += 1;
            earned += 1;
        }
        earned
    }

    /// Mark defeated once health is gone. True exactly once per boss.
    pub fn defeat(&mut self) -> bool {
        if self.state == BossState::Defeated || self.health > 0.0 {
            return false;
        }
        self.state = BossState::Defeated;
        self.pending.clear();
        self.charge = None;
        self.weak_point = None;
        true
    }
}

fn attack_interval_for(phase: u32) -> f32 {
    (BASE_ATTACK_INTERVAL - phase as f32 * ATTACK_INTERVAL_STEP).max(MIN_ATTACK_INTERVAL)
}

fn anchor_y(height: f32) -> f32 {
    BOSS_ANCHOR_Y.min(height * 0.5).max(BOSS_EDGE_MARGIN)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn env() -> BossEnv {
        BossEnv {
            player: Vec2::new(400.0, 520.0),
            width: 800.0,
            height: 600.0,
        }
    }

    fn active_boss() -> Boss {
        let mut boss = Boss::new(0, 3, 800.0);
        boss.pos.y = BOSS_ANCHOR_Y;
        boss.state = BossState::Active;
        boss
    }

    #[test]
    fn test_phase_thresholds() {
        assert_eq!(Boss::phase_for(100.0, 100.0, 4), 0);
        assert_eq!(Boss::phase_for(76.0, 100.0, 4), 0);
        assert_eq!(Boss::phase_for(74.0, 100.0, 4), 1);
        assert_eq!(Boss::phase_for(26.0, 100.0, 4), 2);
        assert_eq!(Boss::phase_for(24.0, 100.0, 4), 3);
        assert_eq!(Boss::phase_for(0.0, 100.0, 4), 3);
        assert_eq!(Boss::phase_for(50.0, 0.0, 4), 0);
        assert_eq!(Boss::phase_for(0.0, 100.0, 0), 0);
        // Out-of-range health is clamped, never indexes past the table
        assert_eq!(Boss::phase_for(150.0, 100.0, 4), 0);
        assert_eq!(Boss::phase_for(-5.0, 100.0, 4), 3);
        assert_eq!(Boss::phase_for(f32::NAN, 100.0, 4), 0);
    }

    #[test]
    fn test_health_scaling() {
        assert_eq!(Boss::max_health_for(0, 3), 500.0);
        assert_eq!(Boss::max_health_for(1, 6), 1200.0);
        assert_eq!(Boss::kind_for_level(3), 0);
        assert_eq!(Boss::kind_for_level(6), 1);
        assert_eq!(Boss::kind_for_level(15), 0);
        assert_eq!(Boss::new(3, 12, 800.0).name(), "SUPREME ROOSTER");
    }

    #[test]
    fn test_entering_then_active() {
        let mut rng = Pcg32::seed_from_u64(1);
        let mut boss = Boss::new(0, 3, 800.0);
        let mut arrived = false;
        for _ in 0..300 {
            let out = boss.update(1.0 / 60.0, &env(), &mut rng);
            if out.signals.contains(&BossSignal::Arrived) {
                assert!(!arrived);
                arrived = true;
            }
        }
        assert!(arrived);
        assert_eq!(boss.state, BossState::Active);
    }

    #[test]
    fn test_phase_change_fires_once() {
        let mut rng = Pcg32::seed_from_u64(4);
        let mut boss = active_boss();
        boss.take_damage(boss.max_health * 0.3, false);
        let first = boss.update(1.0 / 60.0, &env(), &mut rng);
        assert!(first.signals.contains(&BossSignal::PhaseChanged(1)));
        assert_eq!(boss.speed, 160.0);
        let second = boss.update(1.0 / 60.0, &env(), &mut rng);
        assert!(!second.signals.iter().any(|s| matches!(s, BossSignal::PhaseChanged(_))));
    }

    #[test]
    fn test_charge_precedes_attack_and_stays_in_band() {
        let mut rng = Pcg32::seed_from_u64(8);
        let mut boss = active_boss();
        let mut charged_at = None;
        let mut fired_at = None;
        let mut shots = 0;
        for i in 0..600 {
            let out = boss.update(1.0 / 60.0, &env(), &mut rng);
            for signal in &out.signals {
                match signal {
                    BossSignal::Charging(_) if charged_at.is_none() => charged_at = Some(i),
                    BossSignal::Attack(_) if fired_at.is_none() => fired_at = Some(i),
                    _ => {}
                }
            }
            shots += out.shots.len();
            assert!(boss.pos.y >= BOSS_EDGE_MARGIN && boss.pos.y <= 300.0);
            assert!(boss.pos.x >= BOSS_EDGE_MARGIN && boss.pos.x <= 720.0);
        }
        let (charged, fired) = (charged_at.unwrap(), fired_at.unwrap());
        assert!(fired > charged);
        assert!(shots > 0);
    }

    #[test]
    fn test_weak_point_triples_damage() {
        let mut boss = active_boss();
        assert!(!boss.weak_point_hit(boss.pos + WEAK_POINT_OFFSET, 4.0));
        boss.open_weak_point();
        assert!(boss.weak_point_hit(boss.pos + WEAK_POINT_OFFSET, 4.0));
        // Where a shot from below first touches the hull
        assert!(boss.weak_point_hit(boss.pos + Vec2::new(0.0, BOSS_RADIUS + 4.0), 4.0));
        assert!(!boss.weak_point_hit(boss.pos + Vec2::new(0.0, -30.0), 4.0));
        assert!(!boss.weak_point_hit(boss.pos + Vec2::new(40.0, BOSS_RADIUS), 4.0));
        let before = boss.health;
        assert_eq!(boss.take_damage(10.0, true), 30.0);
        assert_eq!(boss.health, before - 30.0);
    }

    #[test]
    fn test_threshold_drops_once_each() {
        let mut boss = active_boss();
        boss.take_damage(boss.max_health * 0.3, false);
        assert_eq!(boss.take_threshold_drops(), 1);
        assert_eq!(boss.take_threshold_drops(), 0);
        boss.take_damage(boss.max_health * 0.5, false);
        assert_eq!(boss.take_threshold_drops(), 2);
    }

    #[test]
    fn test_defeat_once() {
        let mut boss = active_boss();
        assert!(!boss.defeat());
        boss.take_damage(boss.max_health * 2.0, false);
        assert_eq!(boss.health, 0.0);
        assert!(boss.defeat());
        assert!(!boss.defeat());
        assert_eq!(boss.take_damage(10.0, false), 0.0);
    }

    proptest! {
        #[test]
        fn prop_phase_monotonic(seed in any::<u64>(), hits in prop::collection::vec(0.0f32..120.0, 1..40)) {
            let mut rng = Pcg32::seed_from_u64(seed);
            let mut boss = active_boss();
            let mut last = boss.phase;
            for hit in hits {
                boss.take_damage(hit, false);
                boss.update(1.0 / 60.0, &env(), &mut rng);
                prop_assert!(boss.phase >= last);
                prop_assert!(boss.phase < boss.max_phases);
                last = boss.phase;
            }
        }
    }
}
