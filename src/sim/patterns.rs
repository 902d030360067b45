//! Boss attack pattern library
//!
//! Each pattern expands into a schedule of shots with delays relative to the
//! moment it fires. The boss drains the schedule from its own update, so a
//! staggered volley never blocks the tick and freezes with it when paused.

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::f32::consts::{FRAC_PI_2, FRAC_PI_4, PI, TAU};

use crate::polar_velocity;

/// Longest span a single pattern may schedule over (seconds)
pub const MAX_PATTERN_SPAN: f32 = 5.0;

/// Highest phase the patterns scale with
pub const MAX_PATTERN_PHASE: u32 = 3;

/// Where a shot spawns, resolved when it is emitted
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Origin {
    /// Boss center plus an offset
    Boss(Vec2),
    /// Given x at the boss's current height
    Column(f32),
    /// Fixed playfield point
    Point(Vec2),
}

/// How a shot's velocity is chosen
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Aim {
    Fixed(Vec2),
    /// Toward the player's position at emission time, rotated by `angle_offset`
    AtPlayer { angle_offset: f32, speed: f32 },
}

/// One pending shot of a pattern
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScheduledShot {
    /// Seconds until emission
    pub delay: f32,
    pub origin: Origin,
    pub aim: Aim,
    pub homing: bool,
}

impl ScheduledShot {
    fn radial(delay: f32, angle: f32, speed: f32) -> Self {
        Self::fixed(delay, Origin::Boss(Vec2::ZERO), polar_velocity(angle, speed))
    }

    fn fixed(delay: f32, origin: Origin, vel: Vec2) -> Self {
        Self {
            delay,
            origin,
            aim: Aim::Fixed(vel),
            homing: false,
        }
    }

    fn aimed(delay: f32, angle_offset: f32, speed: f32) -> Self {
        Self {
            delay,
            origin: Origin::Boss(Vec2::ZERO),
            aim: Aim::AtPlayer { angle_offset, speed },
            homing: false,
        }
    }
}

/// The attack library, in firing order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AttackPattern {
    SpiralStorm,
    ShotgunBlast,
    VerticalColumns,
    CircleBarrage,
    WaveFormation,
    AimedShots,
    RotatingCannon,
    RainChaos,
    CrossPattern,
    HomingEggs,
    DoubleHelix,
    MachineGun,
    LaserSweep,
    BurstFire,
    MeteorShower,
    SpiralLaser,
    DiamondPattern,
    ChaosStorm,
}

impl AttackPattern {
    pub const ALL: [AttackPattern; 18] = [
        AttackPattern::SpiralStorm,
        AttackPattern::ShotgunBlast,
        AttackPattern::VerticalColumns,
        AttackPattern::CircleBarrage,
        AttackPattern::WaveFormation,
        AttackPattern::AimedShots,
        AttackPattern::RotatingCannon,
        AttackPattern::RainChaos,
        AttackPattern::CrossPattern,
        AttackPattern::HomingEggs,
        AttackPattern::DoubleHelix,
        AttackPattern::MachineGun,
        AttackPattern::LaserSweep,
        AttackPattern::BurstFire,
        AttackPattern::MeteorShower,
        AttackPattern::SpiralLaser,
        AttackPattern::DiamondPattern,
        AttackPattern::ChaosStorm,
    ];

    /// Pattern for any index; wraps instead of going out of range
    pub fn from_index(index: usize) -> Self {
        Self::ALL[index % Self::ALL.len()]
    }

    pub fn name(&self) -> &'static str {
        match self {
            AttackPattern::SpiralStorm => "spiral storm",
            AttackPattern::ShotgunBlast => "shotgun blast",
            AttackPattern::VerticalColumns => "vertical columns",
            AttackPattern::CircleBarrage => "circle barrage",
            AttackPattern::WaveFormation => "wave formation",
            AttackPattern::AimedShots => "aimed shots",
            AttackPattern::RotatingCannon => "rotating cannon",
            AttackPattern::RainChaos => "rain chaos",
            AttackPattern::CrossPattern => "cross pattern",
            AttackPattern::HomingEggs => "homing eggs",
            AttackPattern::DoubleHelix => "double helix",
            AttackPattern::MachineGun => "machine gun",
            AttackPattern::LaserSweep => "laser sweep",
            AttackPattern::BurstFire => "burst fire",
            AttackPattern::MeteorShower => "meteor shower",
            AttackPattern::SpiralLaser => "spiral laser",
            AttackPattern::DiamondPattern => "diamond pattern",
            AttackPattern::ChaosStorm => "chaos storm",
        }
    }
}

/// Boss-side inputs a pattern is parameterized by
#[derive(Debug, Clone, Copy)]
pub struct PatternContext {
    pub phase: u32,
    /// Slowly turning boss angle, used to rotate spirals
    pub rotation: f32,
    pub playfield_width: f32,
}

/// Expand a pattern into its shot schedule
pub fn schedule<R: Rng + ?Sized>(
    pattern: AttackPattern,
    ctx: &PatternContext,
    rng: &mut R,
) -> Vec<ScheduledShot> {
    let phase = ctx.phase.min(MAX_PATTERN_PHASE);
    let width = ctx.playfield_width;
    let mut shots = Vec::new();

    match pattern {
        AttackPattern::SpiralStorm => {
            let count = 8 + phase * 2;
            for i in 0..count {
                let angle = i as f32 / count as f32 * TAU + ctx.rotation;
                shots.push(ScheduledShot::radial(i as f32 * 0.06, angle, 160.0));
            }
        }
        AttackPattern::ShotgunBlast => {
            let count = 10 + phase * 2;
            let spread = FRAC_PI_2;
            for i in 0..count {
                let angle = -spread / 2.0 + i as f32 / count as f32 * spread + FRAC_PI_2;
                let speed = 250.0 + rng.random::<f32>() * 80.0;
                shots.push(ScheduledShot::radial(0.0, angle, speed));
            }
        }
        AttackPattern::VerticalColumns => {
            let columns = 5 + phase;
            for i in 0..columns {
                let x = width / (columns + 1) as f32 * (i + 1) as f32;
                for j in 0..3 {
                    shots.push(ScheduledShot::fixed(
                        j as f32 * 0.3,
                        Origin::Column(x),
                        Vec2::new(0.0, 200.0),
                    ));
                }
            }
        }
        AttackPattern::CircleBarrage => {
            let count = 12 + phase * 3;
            for i in 0..count {
                shots.push(ScheduledShot::radial(0.0, i as f32 / count as f32 * TAU, 180.0));
            }
        }
        AttackPattern::WaveFormation => {
            let count = 15;
            for i in 0..count {
                let offset = (i as f32 / count as f32 * TAU).sin() * 200.0;
                shots.push(ScheduledShot::fixed(
                    i as f32 * 0.1,
                    Origin::Boss(Vec2::new(offset, 0.0)),
                    Vec2::new(0.0, 200.0),
                ));
            }
        }
        AttackPattern::AimedShots => {
            for i in 0..4 + phase {
                shots.push(ScheduledShot::aimed(i as f32 * 0.3, 0.0, 280.0));
            }
        }
        AttackPattern::RotatingCannon => {
            let count = 20 + phase * 5;
            for i in 0..count {
                let angle = i as f32 / count as f32 * PI * 4.0;
                shots.push(ScheduledShot::radial(i as f32 * 0.05, angle, 200.0));
            }
        }
        AttackPattern::RainChaos => {
            let count = 12 + phase * 3;
            for i in 0..count {
                let x = rng.random::<f32>() * width;
                let vel = Vec2::new((rng.random::<f32>() - 0.5) * 80.0, 140.0 + rng.random::<f32>() * 80.0);
                shots.push(ScheduledShot::fixed(i as f32 * 0.08, Origin::Column(x), vel));
            }
        }
        AttackPattern::CrossPattern => {
            // Four cardinal plus four diagonal directions
            for i in 0..8 {
                shots.push(ScheduledShot::radial(0.0, i as f32 * FRAC_PI_4, 200.0));
            }
        }
        AttackPattern::HomingEggs => {
            for i in 0..3 + phase {
                let angle = rng.random::<f32>() * TAU;
                shots.push(ScheduledShot {
                    homing: true,
                    ..ScheduledShot::radial(i as f32 * 0.5, angle, 150.0)
                });
            }
        }
        AttackPattern::DoubleHelix => {
            let count = 30;
            for i in 0..count {
                let a1 = i as f32 / count as f32 * PI * 4.0;
                for a in [a1, a1 + PI] {
                    let vel = Vec2::new(a.cos() * 180.0 + (a * 3.0).cos() * 50.0, a.sin() * 180.0);
                    shots.push(ScheduledShot::fixed(i as f32 * 0.05, Origin::Boss(Vec2::ZERO), vel));
                }
            }
        }
        AttackPattern::MachineGun => {
            let count = 25 + phase * 8;
            for i in 0..count {
                let jitter = (rng.random::<f32>() - 0.5) * 0.3;
                shots.push(ScheduledShot::aimed(i as f32 * 0.04, jitter, 320.0));
            }
        }
        AttackPattern::LaserSweep => {
            let sweeps = 1 + phase;
            for sweep in 0..sweeps {
                let start = if sweep % 2 == 0 { 0.0 } else { PI };
                for i in 0..20 {
                    let angle = start + i as f32 / 20.0 * PI;
                    let t = sweep as f32 * 1.2 + i as f32 * 0.03;
                    // Each beam step is a doubled shot
                    shots.push(ScheduledShot::radial(t, angle, 220.0));
                    shots.push(ScheduledShot::radial(t + 0.06, angle, 220.0));
                }
            }
        }
        AttackPattern::BurstFire => {
            for burst in 0..4 + phase {
                for i in 0..5 {
                    shots.push(ScheduledShot::aimed(burst as f32 * 0.5, (i as f32 - 2.0) * 0.2, 280.0));
                }
            }
        }
        AttackPattern::MeteorShower => {
            let count = 15 + phase * 5;
            for i in 0..count {
                let x = rng.random::<f32>() * width;
                let speed = 180.0 + rng.random::<f32>() * 100.0;
                let angle = FRAC_PI_2 + (rng.random::<f32>() - 0.5) * 0.3;
                shots.push(ScheduledShot::fixed(
                    i as f32 * 0.06,
                    Origin::Point(Vec2::new(x, 0.0)),
                    polar_velocity(angle, speed),
                ));
            }
        }
        AttackPattern::SpiralLaser => {
            let rotations = 2 + phase;
            let count = 30 * rotations;
            for i in 0..count {
                let angle = i as f32 / count as f32 * TAU * rotations as f32;
                shots.push(ScheduledShot::radial(i as f32 * 0.03, angle, 200.0));
            }
        }
        AttackPattern::DiamondPattern => {
            for layer in 0..3 + phase {
                let speed = 180.0 + layer as f32 * 40.0;
                for i in 0..8 {
                    let angle = i as f32 / 8.0 * TAU + FRAC_PI_4;
                    shots.push(ScheduledShot::radial(layer as f32 * 0.2, angle, speed));
                }
            }
        }
        AttackPattern::ChaosStorm => {
            for wave in 0..3 + phase {
                let t = wave as f32 * 0.7;
                for i in 0..8 {
                    shots.push(ScheduledShot::radial(t, i as f32 / 8.0 * TAU, 180.0));
                }
                for i in 0..3 {
                    shots.push(ScheduledShot::aimed(t + 0.25, (i as f32 - 1.0) * 0.25, 260.0));
                }
            }
        }
    }

    for shot in &mut shots {
        shot.delay = shot.delay.clamp(0.0, MAX_PATTERN_SPAN);
    }
    shots
}

/// Velocity for a shot leaving `from` given the player's position
pub fn resolve_velocity(aim: Aim, from: Vec2, player: Vec2) -> Vec2 {
    match aim {
        Aim::Fixed(vel) => vel,
        Aim::AtPlayer { angle_offset, speed } => {
            let to_player = player - from;
            let base = if to_player.length_squared() > f32::EPSILON {
                to_player.y.atan2(to_player.x)
            } else {
                FRAC_PI_2
            };
            polar_velocity(base + angle_offset, speed)
        }
    }
}

/// Spawn point for a shot given the boss position
pub fn resolve_origin(origin: Origin, boss: Vec2) -> Vec2 {
    match origin {
        Origin::Boss(offset) => boss + offset,
        Origin::Column(x) => Vec2::new(x, boss.y),
        Origin::Point(p) => p,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn ctx(phase: u32) -> PatternContext {
        PatternContext {
            phase,
            rotation: 0.0,
            playfield_width: 800.0,
        }
    }

    #[test]
    fn test_every_pattern_emits_within_span() {
        let mut rng = Pcg32::seed_from_u64(5);
        for phase in 0..=MAX_PATTERN_PHASE {
            for pattern in AttackPattern::ALL {
                let shots = schedule(pattern, &ctx(phase), &mut rng);
                assert!(!shots.is_empty(), "{} emitted nothing", pattern.name());
                assert!(shots.iter().all(|s| s.delay >= 0.0 && s.delay <= MAX_PATTERN_SPAN));
            }
        }
    }

    #[test]
    fn test_higher_phase_fires_more() {
        let mut rng = Pcg32::seed_from_u64(9);
        for pattern in [
            AttackPattern::SpiralStorm,
            AttackPattern::CircleBarrage,
            AttackPattern::MachineGun,
            AttackPattern::SpiralLaser,
        ] {
            let low = schedule(pattern, &ctx(0), &mut rng).len();
            let high = schedule(pattern, &ctx(3), &mut rng).len();
            assert!(high > low, "{}: {low} vs {high}", pattern.name());
        }
    }

    #[test]
    fn test_phase_beyond_table_is_clamped() {
        let mut rng = Pcg32::seed_from_u64(2);
        let capped = schedule(AttackPattern::CircleBarrage, &ctx(3), &mut rng).len();
        let wild = schedule(AttackPattern::CircleBarrage, &ctx(40), &mut rng).len();
        assert_eq!(capped, wild);
    }

    #[test]
    fn test_from_index_wraps() {
        assert_eq!(AttackPattern::from_index(0), AttackPattern::SpiralStorm);
        assert_eq!(AttackPattern::from_index(17), AttackPattern::ChaosStorm);
        assert_eq!(AttackPattern::from_index(18), AttackPattern::SpiralStorm);
    }

    #[test]
    fn test_aimed_shot_points_at_player() {
        let vel = resolve_velocity(
            Aim::AtPlayer {
                angle_offset: 0.0,
                speed: 100.0,
            },
            Vec2::new(100.0, 100.0),
            Vec2::new(100.0, 400.0),
        );
        assert!(vel.x.abs() < 1e-3);
        assert!((vel.y - 100.0).abs() < 1e-3);
    }

    #[test]
    fn test_cross_pattern_eight_directions() {
        let mut rng = Pcg32::seed_from_u64(0);
        let shots = schedule(AttackPattern::CrossPattern, &ctx(0), &mut rng);
        assert_eq!(shots.len(), 8);
        assert!(shots.iter().all(|s| s.delay == 0.0));
    }
}
