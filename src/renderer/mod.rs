//! Rendering module
//!
//! Renderers only ever see a `RenderView`: a shared borrow of the game state
//! plus the display settings. Nothing reachable from it can mutate the
//! simulation.

pub mod text;

pub use text::TextRenderer;

use glam::Vec2;

use crate::settings::Settings;
use crate::sim::boss::WeakPoint;
use crate::sim::{
    Boss, Enemy, GameState, MatchPhase, Particle, Player, Powerup, Projectile, Starfield,
};

/// Largest camera offset at full shake, in playfield units
pub const MAX_SHAKE_OFFSET: f32 = 12.0;

/// Anything that can draw a frame
pub trait Renderer {
    type Output;

    fn render(&mut self, view: &RenderView<'_>) -> Self::Output;
}

/// Convert 0xRRGGBB plus alpha to linear-ish float RGBA
pub fn rgba(color: u32, alpha: f32) -> [f32; 4] {
    [
        ((color >> 16) & 0xff) as f32 / 255.0,
        ((color >> 8) & 0xff) as f32 / 255.0,
        (color & 0xff) as f32 / 255.0,
        alpha.clamp(0.0, 1.0),
    ]
}

/// Read-only snapshot handed to renderers
#[derive(Clone, Copy)]
pub struct RenderView<'a> {
    state: &'a GameState,
    settings: &'a Settings,
}

impl<'a> RenderView<'a> {
    pub fn new(state: &'a GameState, settings: &'a Settings) -> Self {
        Self { state, settings }
    }

    pub fn size(&self) -> Vec2 {
        Vec2::new(self.state.width, self.state.height)
    }

    pub fn phase(&self) -> MatchPhase {
        self.state.phase
    }

    pub fn level(&self) -> u32 {
        self.state.level
    }

    pub fn score(&self) -> u64 {
        self.state.score
    }

    pub fn lives(&self) -> u32 {
        self.state.lives
    }

    pub fn combo(&self) -> u32 {
        self.state.combo
    }

    pub fn player(&self) -> &'a Player {
        &self.state.player
    }

    /// Shield orb positions
    pub fn shield_orbs(&self) -> Vec<Vec2> {
        self.state.player.shield_orbs(self.state.shield).collect()
    }

    pub fn enemies(&self) -> &'a [Enemy] {
        &self.state.enemies
    }

    /// Seconds until the current intro or clear banner ends
    pub fn countdown(&self) -> Option<f32> {
        self.state.transition_remaining()
    }

    pub fn boss(&self) -> Option<&'a Boss> {
        self.state.boss.as_ref()
    }

    /// World position and radius of the open weak point
    pub fn weak_point(&self) -> Option<(Vec2, f32)> {
        let boss = self.state.boss.as_ref()?;
        boss.weak_point
            .map(|wp: WeakPoint| (boss.pos + wp.offset, wp.radius))
    }

    pub fn player_projectiles(&self) -> &'a [Projectile] {
        &self.state.player_projectiles
    }

    pub fn enemy_projectiles(&self) -> &'a [Projectile] {
        &self.state.enemy_projectiles
    }

    pub fn powerups(&self) -> &'a [Powerup] {
        &self.state.powerups
    }

    /// Empty when particles are switched off
    pub fn particles(&self) -> &'a [Particle] {
        if self.settings.particles {
            &self.state.particles
        } else {
            &[]
        }
    }

    /// None at low quality
    pub fn starfield(&self) -> Option<&'a Starfield> {
        self.settings
            .quality
            .starfield_enabled()
            .then_some(&self.state.starfield)
    }

    /// Camera offset for the current shake
    pub fn shake_offset(&self) -> Vec2 {
        let shake = self.state.screen_shake;
        if shake <= 0.0 {
            return Vec2::ZERO;
        }
        let t = self.state.time;
        Vec2::new((t * 50.0).sin(), (t * 43.0).cos()) * shake * MAX_SHAKE_OFFSET
    }

    /// Full-screen flash color, None when fully faded
    pub fn flash(&self) -> Option<[f32; 4]> {
        (self.state.flash_alpha > 0.0).then(|| rgba(self.state.flash_color, self.state.flash_alpha))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rgba() {
        assert_eq!(rgba(0xff0000, 1.0), [1.0, 0.0, 0.0, 1.0]);
        assert_eq!(rgba(0x0000ff, 2.0)[3], 1.0);
    }

    #[test]
    fn test_view_respects_settings() {
        let mut state = GameState::new(1);
        state.push_particle(Particle::new(Vec2::ZERO, Vec2::ZERO, 0xffffff, 1.0));
        let low = Settings {
            particles: false,
            ..Settings::from_preset(crate::settings::QualityPreset::Low)
        };
        let view = RenderView::new(&state, &low);
        assert!(view.particles().is_empty());
        assert!(view.starfield().is_none());

        let settings = Settings::default();
        let view = RenderView::new(&state, &settings);
        assert_eq!(view.particles().len(), 1);
        assert!(view.flash().is_none());
        assert_eq!(view.shake_offset(), Vec2::ZERO);
    }
}
