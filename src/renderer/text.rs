//! Character-grid renderer for terminals and logs

use glam::Vec2;

use super::{RenderView, Renderer};
use crate::sim::{MatchPhase, ProjectileKind};

/// Draws the playfield as a fixed grid of characters with a HUD line on top
#[derive(Debug, Clone)]
pub struct TextRenderer {
    cols: usize,
    rows: usize,
}

impl Default for TextRenderer {
    fn default() -> Self {
        Self::new(64, 24)
    }
}

impl TextRenderer {
    pub fn new(cols: usize, rows: usize) -> Self {
        Self {
            cols: cols.max(8),
            rows: rows.max(4),
        }
    }

    fn cell(&self, pos: Vec2, size: Vec2) -> Option<(usize, usize)> {
        if pos.x < 0.0 || pos.y < 0.0 || pos.x >= size.x || pos.y >= size.y {
            return None;
        }
        let col = (pos.x / size.x * self.cols as f32) as usize;
        let row = (pos.y / size.y * self.rows as f32) as usize;
        Some((col.min(self.cols - 1), row.min(self.rows - 1)))
    }
}

impl Renderer for TextRenderer {
    type Output = String;

    fn render(&mut self, view: &RenderView<'_>) -> String {
        let size = view.size();
        let offset = view.shake_offset();
        let mut grid = vec![vec![' '; self.cols]; self.rows];
        let mut plot = |pos: Vec2, ch: char| {
            if let Some((c, r)) = self.cell(pos + offset, size) {
                grid[r][c] = ch;
            }
        };

        // Back to front
        if let Some(starfield) = view.starfield() {
            for star in &starfield.stars {
                plot(star.pos, '.');
            }
        }
        for particle in view.particles() {
            plot(particle.pos, '*');
        }
        for powerup in view.powerups() {
            plot(powerup.pos, powerup.kind.label().chars().next().unwrap_or('?'));
        }
        for shot in view.enemy_projectiles() {
            plot(shot.pos, if shot.homing { '@' } else { 'o' });
        }
        for shot in view.player_projectiles() {
            plot(shot.pos, match shot.kind {
                ProjectileKind::Laser => '!',
                _ if shot.explosive => ':',
                _ => '|',
            });
        }
        for enemy in view.enemies() {
            plot(enemy.pos, match enemy.tier {
                0 => 'v',
                1 => 'V',
                _ => 'W',
            });
        }
        if let Some(boss) = view.boss() {
            // Telegraph: the hull lights up while charging
            let hull = if boss.charge.is_some() { '#' } else { 'B' };
            for dx in [-1.0, 0.0, 1.0] {
                plot(boss.pos + Vec2::new(dx * boss.radius * 0.6, 0.0), hull);
            }
        }
        if let Some((pos, _)) = view.weak_point() {
            plot(pos, 'X');
        }
        for orb in view.shield_orbs() {
            plot(orb, '+');
        }
        if view.phase() != MatchPhase::GameOver {
            plot(view.player().pos, 'A');
        }

        let mut out = format!(
            "L{} SCORE {} LIVES {} x{}",
            view.level(),
            view.score(),
            view.lives(),
            view.combo()
        );
        if let Some(boss) = view.boss() {
            out.push_str(&format!(" | {} {:.0}%", boss.name(), boss.health_fraction() * 100.0));
        }
        if let Some(seconds) = view.countdown() {
            let banner = match view.phase() {
                MatchPhase::BossIntro => "WARNING",
                MatchPhase::WaveIntro => "GET READY",
                _ => "NEXT",
            };
            out.push_str(&format!(" | {banner} {seconds:.1}s"));
        }
        out.push('\n');
        for row in grid {
            out.extend(row);
            out.push('\n');
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::{QualityPreset, Settings};
    use crate::sim::GameState;

    #[test]
    fn test_player_drawn() {
        let state = GameState::new(1);
        let settings = Settings::from_preset(QualityPreset::Low);
        let frame = TextRenderer::new(40, 20).render(&RenderView::new(&state, &settings));
        let lines: Vec<&str> = frame.lines().collect();
        assert_eq!(lines.len(), 21);
        assert!(lines[0].starts_with("L1 SCORE 0"));
        assert_eq!(frame.matches('A').count(), 1);
    }

    #[test]
    fn test_boss_warning_banner() {
        let mut state = GameState::new(1);
        crate::sim::start_match(&mut state, crate::sim::ShipVariant::Blaster);
        crate::sim::skip_to_boss(&mut state);
        let settings = Settings::default();
        let frame = TextRenderer::new(40, 20).render(&RenderView::new(&state, &settings));
        assert!(frame.lines().next().is_some_and(|hud| hud.contains("WARNING")));
    }
}
