//! Entity models: player ship, enemies, projectiles, power-ups, particles
//!
//! Each entity owns its own kinematics. Rendering only reads these structs.

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::formation::{Behavior, EnemySpec};
use crate::consts::*;
use crate::step_toward;

/// Player ship variants, chosen at match start
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ShipVariant {
    /// Spread shot that widens with weapon level
    #[default]
    Blaster,
    /// Single explosive round that grows with weapon level
    Bomber,
    /// Fast two-damage bolts
    Laser,
}

impl ShipVariant {
    pub fn as_str(&self) -> &'static str {
        match self {
            ShipVariant::Blaster => "blaster",
            ShipVariant::Bomber => "bomber",
            ShipVariant::Laser => "laser",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "blaster" | "bullet" => Some(ShipVariant::Blaster),
            "bomber" | "explosive" => Some(ShipVariant::Bomber),
            "laser" => Some(ShipVariant::Laser),
            _ => None,
        }
    }
}

/// The player's ship
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    pub pos: Vec2,
    pub variant: ShipVariant,
    /// Unmodified movement speed (pixels/sec)
    pub base_speed: f32,
    /// Current movement speed, base times any active speed buff
    pub speed: f32,
    /// Weapon level in `1..=WEAPON_LEVEL_CAP`
    pub weapon_level: u32,
    /// Fire button held this tick
    pub shooting: bool,
    pub invincible: bool,
    /// Seconds of invincibility left (mirrors the effect timer)
    pub invincible_time: f32,
    /// Seconds until the next shot may fire
    pub fire_timer: f32,
    /// Orbit angle of the shield charges
    pub shield_angle: f32,
}

impl Player {
    pub fn new(pos: Vec2, variant: ShipVariant) -> Self {
        Self {
            pos,
            variant,
            base_speed: PLAYER_SPEED,
            speed: PLAYER_SPEED,
            weapon_level: 1,
            shooting: false,
            invincible: false,
            invincible_time: 0.0,
            fire_timer: 0.0,
            shield_angle: 0.0,
        }
    }

    /// Spawn point for a playfield of the given size
    pub fn spawn_point(width: f32, height: f32) -> Vec2 {
        Vec2::new(width / 2.0, height - 80.0)
    }

    /// Seconds between shots for the current weapon level
    pub fn fire_cooldown(&self, fire_rate_multiplier: f32) -> f32 {
        (0.2 - self.weapon_level as f32 * 0.02).max(0.1) * fire_rate_multiplier
    }

    pub fn raise_weapon(&mut self) {
        self.weapon_level = (self.weapon_level + 1).clamp(1, WEAPON_LEVEL_CAP);
    }

    /// Drop one weapon level, never below 1
    pub fn lower_weapon(&mut self) {
        self.weapon_level = self.weapon_level.saturating_sub(1).clamp(1, WEAPON_LEVEL_CAP);
    }

    /// Move from a direction axis (each component in -1..=1) or toward a pointer
    pub fn steer(&mut self, axis: Vec2, pointer: Option<Vec2>, dt: f32, width: f32, height: f32) {
        let step = self.speed * dt;
        if let Some(target) = pointer {
            // Pointer-follow: glide toward the pointer, ignore tiny offsets
            if self.pos.distance(target) > 5.0 {
                self.pos = step_toward(self.pos, target, step);
            }
        } else if axis != Vec2::ZERO {
            // Diagonal input must not move faster than straight input
            self.pos += axis.normalize_or_zero() * step;
        }
        self.pos.x = self.pos.x.clamp(PLAYER_MARGIN, (width - PLAYER_MARGIN).max(PLAYER_MARGIN));
        self.pos.y = self.pos.y.clamp(PLAYER_MARGIN, (height - PLAYER_MARGIN).max(PLAYER_MARGIN));
    }

    /// World positions of the orbiting shield charges
    pub fn shield_orbs(&self, charges: u32) -> impl Iterator<Item = Vec2> + '_ {
        let n = charges.min(MAX_SHIELD_CHARGES);
        (0..n).map(move |i| {
            let angle = self.shield_angle + (i as f32 / MAX_SHIELD_CHARGES as f32) * std::f32::consts::TAU;
            self.pos + crate::from_angle(angle) * SHIELD_ORBIT_RADIUS
        })
    }
}

/// A formation enemy
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Enemy {
    pub pos: Vec2,
    /// Formation slot the behavior oscillates around
    pub home: Vec2,
    /// Size/health/points tier, 0..=2
    pub tier: u8,
    pub health: i32,
    pub radius: f32,
    pub behavior: Behavior,
    /// Drift velocity (pixels/sec)
    pub drift: Vec2,
    /// Behavior clock (seconds)
    pub behavior_time: f32,
    /// Seconds until this enemy fires
    pub shoot_timer: f32,
}

/// Body colors by tier
pub const ENEMY_COLORS: [u32; 3] = [0xff6b35, 0xff8c42, 0xffa600];

impl Enemy {
    pub fn from_spec(spec: &EnemySpec, shoot_timer: f32) -> Self {
        let tier = spec.tier.min(2);
        Self {
            pos: spec.pos,
            home: spec.pos,
            tier,
            health: tier as i32 + 1,
            radius: 15.0 + tier as f32 * 5.0,
            behavior: spec.behavior,
            drift: spec.drift,
            behavior_time: spec.phase_offset,
            shoot_timer,
        }
    }

    /// Base score for destroying this enemy
    pub fn points(&self) -> u64 {
        100 + 50 * self.tier as u64
    }

    pub fn color(&self) -> u32 {
        ENEMY_COLORS[(self.tier as usize).min(2)]
    }

    pub fn is_alive(&self) -> bool {
        self.health > 0
    }

    pub fn update(&mut self, dt: f32) {
        self.behavior_time += dt;
        let t = self.behavior_time;
        match self.behavior {
            Behavior::Static => {
                self.pos += self.drift * dt;
            }
            Behavior::Wave => {
                self.pos.x = self.home.x + (t * 2.0).sin() * 80.0;
                self.pos.y += self.drift.y * dt;
            }
            Behavior::Circle => {
                self.pos.x = self.home.x + t.cos() * 60.0;
                self.pos.y = self.home.y + t.sin() * 36.0;
            }
            Behavior::Dive => {
                // One second diving out of every three
                if t % 3.0 < 1.0 {
                    self.pos.y += 125.0 * dt;
                } else {
                    // Creep back up toward the formation slot
                    self.pos.y += 18.75 * dt;
                    if self.pos.y > self.home.y {
                        self.pos.y -= 31.25 * dt;
                    }
                }
                self.pos.x += self.drift.x * dt;
            }
            Behavior::Zigzag => {
                self.pos.x += (t * 3.0).sin() * 180.0 * dt;
                self.pos.y += self.drift.y * dt;
            }
        }
    }
}

/// Projectile shapes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProjectileKind {
    Bullet,
    Laser,
    Egg,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Projectile {
    pub pos: Vec2,
    pub vel: Vec2,
    pub kind: ProjectileKind,
    pub damage: u32,
    pub radius: f32,
    pub explosive: bool,
    pub homing: bool,
    pub homing_strength: f32,
    /// Marked for removal at the end of the tick
    pub dead: bool,
}

impl Projectile {
    pub fn bullet(pos: Vec2, vel: Vec2, radius: f32) -> Self {
        Self {
            pos,
            vel,
            kind: ProjectileKind::Bullet,
            damage: 1,
            radius,
            explosive: false,
            homing: false,
            homing_strength: 0.0,
            dead: false,
        }
    }

    pub fn laser(pos: Vec2) -> Self {
        Self {
            kind: ProjectileKind::Laser,
            damage: 2,
            ..Self::bullet(pos, Vec2::new(0.0, -LASER_BOLT_SPEED), 6.0)
        }
    }

    pub fn egg(pos: Vec2, vel: Vec2) -> Self {
        Self {
            pos,
            vel,
            kind: ProjectileKind::Egg,
            damage: 1,
            radius: EGG_RADIUS,
            explosive: false,
            homing: false,
            homing_strength: 0.0,
            dead: false,
        }
    }

    pub fn homing_egg(pos: Vec2, vel: Vec2) -> Self {
        Self {
            homing: true,
            homing_strength: HOMING_STRENGTH,
            ..Self::egg(pos, vel)
        }
    }

    pub fn update(&mut self, dt: f32, target: Vec2) {
        if self.homing {
            let to_target = (target - self.pos).normalize_or_zero();
            self.vel += to_target * self.homing_strength * dt;
            self.vel = self.vel.clamp_length_max(HOMING_MAX_SPEED);
        }
        self.pos += self.vel * dt;
    }
}

/// Power-up types
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum PowerupKind {
    Weapon,
    Shield,
    Health,
    Invincible,
    Speed,
    FireRate,
    Multiplier,
    SlowMotion,
    Bomb,
    Explosive,
    Spread,
}

/// Drop weights; weapon upgrades are three times as likely as anything else
const DROP_TABLE: [(PowerupKind, u32); 11] = [
    (PowerupKind::Weapon, 3),
    (PowerupKind::Shield, 1),
    (PowerupKind::Health, 1),
    (PowerupKind::Invincible, 1),
    (PowerupKind::Speed, 1),
    (PowerupKind::FireRate, 1),
    (PowerupKind::Multiplier, 1),
    (PowerupKind::SlowMotion, 1),
    (PowerupKind::Bomb, 1),
    (PowerupKind::Explosive, 1),
    (PowerupKind::Spread, 1),
];

impl PowerupKind {
    /// Weighted random pick from the drop table
    pub fn roll<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let total: u32 = DROP_TABLE.iter().map(|(_, w)| w).sum();
        let mut pick = rng.random_range(0..total);
        for (kind, weight) in DROP_TABLE {
            if pick < weight {
                return kind;
            }
            pick -= weight;
        }
        PowerupKind::Weapon
    }

    pub fn label(&self) -> &'static str {
        match self {
            PowerupKind::Weapon => "W",
            PowerupKind::Shield => "SH",
            PowerupKind::Health => "HP",
            PowerupKind::Invincible => "INV",
            PowerupKind::Speed => "SPD",
            PowerupKind::FireRate => "F",
            PowerupKind::Multiplier => "MUL",
            PowerupKind::SlowMotion => "SLO",
            PowerupKind::Bomb => "B",
            PowerupKind::Explosive => "EX",
            PowerupKind::Spread => "S",
        }
    }

    pub fn color(&self) -> u32 {
        match self {
            PowerupKind::Weapon => 0xff0000,
            PowerupKind::Shield => 0x00ffff,
            PowerupKind::Health => 0x00ff00,
            PowerupKind::Invincible => 0xffff00,
            PowerupKind::Speed => 0x88ffff,
            PowerupKind::FireRate => 0xff4400,
            PowerupKind::Multiplier => 0xffaa00,
            PowerupKind::SlowMotion => 0x8800ff,
            PowerupKind::Bomb => 0xff00ff,
            PowerupKind::Explosive => 0xff8800,
            PowerupKind::Spread => 0xffee00,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Powerup {
    pub pos: Vec2,
    pub vel: Vec2,
    pub kind: PowerupKind,
    pub radius: f32,
}

impl Powerup {
    pub fn new(pos: Vec2, kind: PowerupKind) -> Self {
        Self {
            pos,
            vel: Vec2::new(0.0, POWERUP_FALL_SPEED),
            kind,
            radius: POWERUP_RADIUS,
        }
    }

    /// Fall, or drift toward the player once inside the attraction radius
    pub fn update(&mut self, dt: f32, player: Vec2) {
        let to_player = player - self.pos;
        let dist = to_player.length();
        let desired = if dist < POWERUP_ATTRACT_RADIUS && dist > f32::EPSILON {
            // Pull gets stronger the closer it is
            let pull = 1.0 - dist / POWERUP_ATTRACT_RADIUS;
            to_player / dist * POWERUP_ATTRACT_SPEED * (0.5 + pull)
        } else {
            Vec2::new(0.0, POWERUP_FALL_SPEED)
        };
        self.vel = self.vel.lerp(desired, (dt * 6.0).min(1.0));
        self.pos += self.vel * dt;
    }
}

/// Particle render shapes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ParticleShape {
    #[default]
    Circle,
    Spark,
    Square,
    Feather,
}

/// A cosmetic particle
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Particle {
    pub pos: Vec2,
    pub vel: Vec2,
    pub color: u32,
    /// Seconds left
    pub life: f32,
    pub max_life: f32,
    pub size: f32,
    /// Downward acceleration (pixels/sec²)
    pub gravity: f32,
    /// Fraction of velocity kept per second
    pub friction: f32,
    pub shape: ParticleShape,
}

impl Particle {
    pub fn new(pos: Vec2, vel: Vec2, color: u32, life: f32) -> Self {
        Self {
            pos,
            vel,
            color,
            life,
            max_life: life.max(f32::EPSILON),
            size: 3.0,
            gravity: 60.0,
            friction: 1.0,
            shape: ParticleShape::Circle,
        }
    }

    /// Opacity derived from remaining life
    pub fn alpha(&self) -> f32 {
        (self.life / self.max_life).clamp(0.0, 1.0)
    }

    pub fn is_alive(&self) -> bool {
        self.life > 0.0
    }

    pub fn update(&mut self, dt: f32) {
        self.vel.y += self.gravity * dt;
        if self.friction < 1.0 {
            self.vel *= self.friction.powf(dt);
        }
        self.pos += self.vel * dt;
        self.life -= dt;
    }
}

/// A background star
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Star {
    pub pos: Vec2,
    pub speed: f32,
    pub size: f32,
}

/// Scrolling starfield behind the action
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Starfield {
    pub stars: Vec<Star>,
}

impl Starfield {
    pub fn new<R: Rng + ?Sized>(rng: &mut R, width: f32, height: f32, count: usize) -> Self {
        let stars = (0..count)
            .map(|_| {
                let depth: f32 = rng.random();
                Star {
                    pos: Vec2::new(rng.random::<f32>() * width, rng.random::<f32>() * height),
                    speed: 20.0 + depth * 100.0,
                    size: 0.5 + depth * 2.0,
                }
            })
            .collect();
        Self { stars }
    }

    pub fn update(&mut self, dt: f32, height: f32) {
        for star in &mut self.stars {
            star.pos.y += star.speed * dt;
            if star.pos.y > height {
                star.pos.y -= height;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    #[test]
    fn test_weapon_level_clamped() {
        let mut player = Player::new(Vec2::new(400.0, 500.0), ShipVariant::Blaster);
        player.lower_weapon();
        assert_eq!(player.weapon_level, 1);
        for _ in 0..10 {
            player.raise_weapon();
        }
        assert_eq!(player.weapon_level, WEAPON_LEVEL_CAP);
        player.lower_weapon();
        assert_eq!(player.weapon_level, WEAPON_LEVEL_CAP - 1);
    }

    #[test]
    fn test_fire_cooldown_scales() {
        let mut player = Player::new(Vec2::ZERO, ShipVariant::Blaster);
        assert!((player.fire_cooldown(1.0) - 0.18).abs() < 1e-5);
        player.weapon_level = 5;
        assert!((player.fire_cooldown(1.0) - 0.1).abs() < 1e-5);
        assert!((player.fire_cooldown(0.5) - 0.05).abs() < 1e-5);
    }

    #[test]
    fn test_diagonal_movement_normalized() {
        let mut straight = Player::new(Vec2::new(400.0, 300.0), ShipVariant::Blaster);
        let mut diagonal = straight.clone();
        straight.steer(Vec2::new(1.0, 0.0), None, 0.1, 800.0, 600.0);
        diagonal.steer(Vec2::new(1.0, 1.0), None, 0.1, 800.0, 600.0);
        let d_straight = straight.pos.distance(Vec2::new(400.0, 300.0));
        let d_diag = diagonal.pos.distance(Vec2::new(400.0, 300.0));
        assert!((d_straight - d_diag).abs() < 1e-3);
    }

    #[test]
    fn test_steer_clamped_to_bounds() {
        let mut player = Player::new(Vec2::new(25.0, 300.0), ShipVariant::Blaster);
        player.steer(Vec2::new(-1.0, 0.0), None, 1.0, 800.0, 600.0);
        assert_eq!(player.pos.x, PLAYER_MARGIN);
    }

    #[test]
    fn test_enemy_tier_stats() {
        let spec = EnemySpec {
            pos: Vec2::new(100.0, 100.0),
            tier: 2,
            behavior: Behavior::Static,
            drift: Vec2::ZERO,
            phase_offset: 0.0,
        };
        let enemy = Enemy::from_spec(&spec, 3.0);
        assert_eq!(enemy.health, 3);
        assert_eq!(enemy.points(), 200);
        assert_eq!(enemy.radius, 25.0);
    }

    #[test]
    fn test_homing_speed_capped() {
        let mut egg = Projectile::homing_egg(Vec2::ZERO, Vec2::new(290.0, 0.0));
        for _ in 0..60 {
            egg.update(1.0 / 60.0, Vec2::new(0.0, 500.0));
        }
        assert!(egg.vel.length() <= HOMING_MAX_SPEED + 1e-3);
        // Turned toward the target
        assert!(egg.vel.y > 0.0);
    }

    #[test]
    fn test_powerup_roll_covers_table() {
        let mut rng = Pcg32::seed_from_u64(7);
        let mut weapons = 0;
        for _ in 0..1200 {
            if PowerupKind::roll(&mut rng) == PowerupKind::Weapon {
                weapons += 1;
            }
        }
        // 3 of 13 weight units
        assert!(weapons > 200 && weapons < 400, "weapons = {weapons}");
    }

    #[test]
    fn test_powerup_attracted_to_player() {
        let mut powerup = Powerup::new(Vec2::new(100.0, 100.0), PowerupKind::Bomb);
        let player = Vec2::new(160.0, 100.0);
        for _ in 0..30 {
            powerup.update(1.0 / 60.0, player);
        }
        assert!(powerup.pos.x > 100.0);
    }

    #[test]
    fn test_particle_alpha_fades() {
        let mut p = Particle::new(Vec2::ZERO, Vec2::ZERO, 0xffffff, 1.0);
        assert_eq!(p.alpha(), 1.0);
        p.update(0.5);
        assert!((p.alpha() - 0.5).abs() < 1e-4);
        p.update(0.6);
        assert!(!p.is_alive());
        assert_eq!(p.alpha(), 0.0);
    }
}
