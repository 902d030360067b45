//! Frame driver and command surface
//!
//! `Game` owns the simulation plus its injected collaborators (observer,
//! audio port, input provider). The host calls `frame(now_ms)` once per
//! animation frame; everything else is a command.

use std::collections::BTreeMap;

use crate::audio::{AudioPort, MusicTrack, NullAudio, SoundEffect};
use crate::observer::{GameObserver, NullObserver};
use crate::platform::{InputProvider, ScriptedInput};
use crate::renderer::RenderView;
use crate::settings::Settings;
use crate::sim::{
    self, EffectKind, GameEvent, GameState, HudSnapshot, ShipVariant, tick,
};

/// A running game instance
pub struct Game {
    state: GameState,
    settings: Settings,
    observer: Box<dyn GameObserver>,
    audio: Box<dyn AudioPort>,
    input: Box<dyn InputProvider>,
    /// Host timestamp of the previous frame; None after start/resume
    last_time: Option<f64>,
    paused: bool,
    destroyed: bool,
    /// HUD values last sent to the observer
    last_hud: Option<HudSnapshot>,
    last_effects: BTreeMap<EffectKind, f32>,
}

impl Game {
    pub fn new(
        seed: u64,
        settings: Settings,
        observer: Box<dyn GameObserver>,
        mut audio: Box<dyn AudioPort>,
        input: Box<dyn InputProvider>,
    ) -> Self {
        let settings = settings.sanitized();
        let mut state =
            GameState::with_playfield(seed, settings.playfield_width, settings.playfield_height);
        state.starting_lives = settings.starting_lives;
        state.lives = settings.starting_lives;
        audio.set_muted(settings.muted);
        audio.play_music(MusicTrack::Menu);

        let mut game = Self {
            state,
            settings,
            observer,
            audio,
            input,
            last_time: None,
            paused: false,
            destroyed: false,
            last_hud: None,
            last_effects: BTreeMap::new(),
        };
        game.apply_settings_to_state();
        game
    }

    /// Game with silent collaborators and no input
    pub fn headless(seed: u64, settings: Settings) -> Self {
        Self::new(
            seed,
            settings,
            Box::new(NullObserver),
            Box::new(NullAudio),
            Box::new(ScriptedInput::default()),
        )
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    /// Read-only view for renderers
    pub fn view(&self) -> RenderView<'_> {
        RenderView::new(&self.state, &self.settings)
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn is_destroyed(&self) -> bool {
        self.destroyed
    }

    /// Replace settings; visual toggles take effect immediately
    pub fn set_settings(&mut self, settings: Settings) {
        self.settings = settings.sanitized();
        self.audio.set_muted(self.settings.muted);
        self.apply_settings_to_state();
    }

    fn apply_settings_to_state(&mut self) {
        self.state.max_particles = self.settings.max_particles();
        self.state.max_frame_dt = self.settings.max_frame_dt;
        self.state.shake_enabled = self.settings.effective_screen_shake();
        self.state.flash_enabled = self.settings.effective_screen_flash();
        let cap = self.state.max_particles;
        if self.state.particles.len() > cap {
            let excess = self.state.particles.len() - cap;
            self.state.particles.drain(..excess);
        }
    }

    /// Start a new match (Blaster when no ship is given)
    pub fn start(&mut self, ship: Option<ShipVariant>) {
        if self.destroyed {
            return;
        }
        sim::start_match(&mut self.state, ship.unwrap_or_default());
        self.paused = false;
        self.last_time = None;
        self.audio.play_music(MusicTrack::Stage);
        self.flush();
    }

    /// Advance from a host timestamp in milliseconds
    pub fn frame(&mut self, now_ms: f64) {
        if self.destroyed || self.paused {
            return;
        }
        let dt = match self.last_time {
            Some(prev) if now_ms > prev => ((now_ms - prev) / 1000.0) as f32,
            _ => 0.0,
        };
        self.last_time = Some(now_ms);
        if dt > 0.0 {
            self.update(dt);
        }
    }

    /// Advance by `dt` seconds, reading input from the provider
    pub fn update(&mut self, dt: f32) {
        if self.destroyed || self.paused {
            return;
        }
        let input = self.input.intent();
        tick(&mut self.state, &input, dt);
        self.flush();
    }

    /// Stop advancing; nothing in the simulation moves until `resume`
    pub fn pause(&mut self) {
        if !self.destroyed && !self.paused {
            log::info!("paused");
            self.paused = true;
        }
    }

    /// Continue; the next frame only rebases the clock
    pub fn resume(&mut self) {
        if self.destroyed || !self.paused {
            return;
        }
        log::info!("resumed");
        self.paused = false;
        self.last_time = None;
    }

    /// Tear down: detach input and cancel pending transitions
    pub fn destroy(&mut self) {
        if self.destroyed {
            return;
        }
        self.input.dispose();
        if self.state.cancel_transition() {
            log::debug!("cancelled pending transition");
        }
        self.destroyed = true;
        log::info!("game destroyed");
    }

    pub fn restart_level(&mut self) {
        if self.destroyed {
            return;
        }
        sim::restart_level(&mut self.state);
        self.flush();
    }

    pub fn skip_to_boss(&mut self) {
        if self.destroyed {
            return;
        }
        sim::skip_to_boss(&mut self.state);
        self.flush();
    }

    pub fn next_level(&mut self) {
        if self.destroyed {
            return;
        }
        sim::next_level(&mut self.state);
        self.flush();
    }

    /// Detonate a bomb; false when none was available or nothing to hit
    pub fn use_bomb(&mut self) -> bool {
        if self.destroyed || self.paused {
            return false;
        }
        let used = sim::use_bomb(&mut self.state);
        self.flush();
        used
    }

    pub fn set_muted(&mut self, muted: bool) {
        self.settings.muted = muted;
        self.audio.set_muted(muted);
    }

    /// Route events to audio and push HUD changes to the observer
    fn flush(&mut self) {
        for event in self.state.drain_events() {
            self.dispatch(&event);
        }
        self.notify();
    }

    fn dispatch(&mut self, event: &GameEvent) {
        match event {
            GameEvent::ShotFired { ship } => self.audio.play(match ship {
                ShipVariant::Laser => SoundEffect::Laser,
                _ => SoundEffect::Shoot,
            }),
            GameEvent::EnemyKilled { .. } => self.audio.play(SoundEffect::Explosion),
            GameEvent::PlayerHit { .. } => self.audio.play(SoundEffect::PlayerHit),
            GameEvent::ShieldBlock => self.audio.play(SoundEffect::ShieldBlock),
            GameEvent::PowerupCollected { .. } => self.audio.play(SoundEffect::Powerup),
            GameEvent::BossWarning { .. } => self.audio.play(SoundEffect::BossWarning),
            GameEvent::BossSpawned { .. } => self.audio.play_music(MusicTrack::Boss),
            GameEvent::BossCharging => self.audio.play(SoundEffect::BossCharge),
            GameEvent::BossPhaseChanged { .. } => self.audio.play(SoundEffect::BossPhase),
            GameEvent::BossCritical => self.audio.play(SoundEffect::Critical),
            GameEvent::BossDefeated { .. } => {
                self.audio.play(SoundEffect::BossDefeated);
                self.audio.play_music(MusicTrack::Stage);
            }
            GameEvent::WaveCleared { .. } => self.audio.play(SoundEffect::WaveClear),
            GameEvent::BombUsed => self.audio.play(SoundEffect::Bomb),
            GameEvent::LevelStarted { boss: false, .. } => self.audio.play_music(MusicTrack::Stage),
            GameEvent::GameOver { score, level } => {
                self.audio.play(SoundEffect::GameOver);
                self.audio.play_music(MusicTrack::GameOver);
                self.observer.game_over(*score, *level);
            }
            _ => {}
        }
    }

    fn notify(&mut self) {
        let hud = self.state.hud();
        let prev = self.last_hud.take();
        let changed = |f: fn(&HudSnapshot) -> u64| prev.as_ref().is_none_or(|p| f(p) != f(&hud));

        if changed(|h| h.score) {
            self.observer.score_changed(hud.score);
        }
        if changed(|h| h.level as u64) {
            self.observer.level_changed(hud.level);
        }
        if changed(|h| h.lives as u64) {
            self.observer.lives_changed(hud.lives);
        }
        if changed(|h| h.weapon_level as u64) {
            self.observer.weapon_level_changed(hud.weapon_level);
        }
        if changed(|h| h.shield as u64) {
            self.observer.shield_changed(hud.shield);
        }
        if changed(|h| h.bombs as u64) {
            self.observer.bombs_changed(hud.bombs);
        }
        if changed(|h| h.combo as u64) {
            self.observer.combo_changed(hud.combo);
        }
        if prev.as_ref().is_none_or(|p| p.boss_health != hud.boss_health) {
            self.observer
                .boss_health_changed(hud.boss_health.0, hud.boss_health.1);
        }
        if prev.as_ref().is_none_or(|p| p.phase != hud.phase) {
            self.observer.phase_changed(hud.phase);
        }

        // Whole seconds keep the effect list from firing every frame
        let effects: BTreeMap<EffectKind, f32> = hud
            .effects
            .iter()
            .map(|(kind, secs)| (*kind, secs.ceil()))
            .collect();
        if prev.is_none() || effects != self.last_effects {
            self.observer.effects_changed(effects.clone());
            self.last_effects = effects;
        }

        self.last_hud = Some(hud);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::MatchPhase;

    #[test]
    fn test_first_frame_only_rebases() {
        let mut game = Game::headless(1, Settings::default());
        game.start(None);
        game.frame(1000.0);
        assert_eq!(game.state().time, 0.0);
        game.frame(1016.0);
        assert!((game.state().time - 0.016).abs() < 1e-5);
    }

    #[test]
    fn test_large_gap_clamped() {
        let mut game = Game::headless(1, Settings::default());
        game.start(None);
        game.frame(0.5);
        game.frame(60_000.0);
        assert!((game.state().time - 0.1).abs() < 1e-5);
    }

    #[test]
    fn test_settings_flow_into_state() {
        let settings = Settings {
            reduced_motion: true,
            starting_lives: 5,
            ..Settings::from_preset(crate::settings::QualityPreset::Low)
        };
        let mut game = Game::headless(1, settings);
        assert_eq!(game.state().max_particles, 100);
        assert!(!game.state().shake_enabled);
        game.start(Some(ShipVariant::Bomber));
        assert_eq!(game.state().lives, 5);
        assert_eq!(game.state().ship, ShipVariant::Bomber);
        assert_eq!(game.state().phase, MatchPhase::WaveIntro);
    }

    #[test]
    fn test_destroy_stops_everything() {
        let mut game = Game::headless(1, Settings::default());
        game.start(None);
        game.destroy();
        assert!(game.state().timers.is_empty());
        assert!(game.state().pending_transition.is_none());
        game.update(0.05);
        assert_eq!(game.state().time, 0.0);
        game.start(None);
        assert!(game.is_destroyed());
    }
}
