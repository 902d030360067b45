//! Audio port
//!
//! The game never owns a global sound system. The composition root injects
//! an `AudioPort`, and `Game` maps simulation events onto it.

use serde::{Deserialize, Serialize};

use crate::settings::Settings;

/// Sound effect types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SoundEffect {
    /// Player fires
    Shoot,
    /// Player fires a laser bolt
    Laser,
    /// Enemy destroyed
    Explosion,
    /// Player loses a life
    PlayerHit,
    /// Shield charge absorbs a shot
    ShieldBlock,
    /// Power-up collected
    Powerup,
    /// Boss warning siren
    BossWarning,
    /// Boss charging an attack
    BossCharge,
    /// Boss enters a new phase
    BossPhase,
    /// Weak point critical hit
    Critical,
    /// Boss destroyed
    BossDefeated,
    /// Wave cleared
    WaveClear,
    /// Bomb detonated
    Bomb,
    /// Game over
    GameOver,
}

impl SoundEffect {
    pub fn name(&self) -> &'static str {
        match self {
            SoundEffect::Shoot => "shoot",
            SoundEffect::Laser => "laser",
            SoundEffect::Explosion => "explosion",
            SoundEffect::PlayerHit => "player_hit",
            SoundEffect::ShieldBlock => "shield_block",
            SoundEffect::Powerup => "powerup",
            SoundEffect::BossWarning => "boss_warning",
            SoundEffect::BossCharge => "boss_charge",
            SoundEffect::BossPhase => "boss_phase",
            SoundEffect::Critical => "critical",
            SoundEffect::BossDefeated => "boss_defeated",
            SoundEffect::WaveClear => "wave_clear",
            SoundEffect::Bomb => "bomb",
            SoundEffect::GameOver => "game_over",
        }
    }
}

/// Background music tracks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MusicTrack {
    Menu,
    Stage,
    Boss,
    GameOver,
}

impl MusicTrack {
    pub fn name(&self) -> &'static str {
        match self {
            MusicTrack::Menu => "menu",
            MusicTrack::Stage => "stage",
            MusicTrack::Boss => "boss",
            MusicTrack::GameOver => "game_over",
        }
    }
}

/// Injected sound output
pub trait AudioPort {
    fn play(&mut self, effect: SoundEffect);
    fn play_music(&mut self, track: MusicTrack);
    fn set_muted(&mut self, muted: bool);
}

/// Silent port for tests and headless runs that don't care
#[derive(Debug, Default)]
pub struct NullAudio;

impl AudioPort for NullAudio {
    fn play(&mut self, _effect: SoundEffect) {}
    fn play_music(&mut self, _track: MusicTrack) {}
    fn set_muted(&mut self, _muted: bool) {}
}

/// Volume-aware port that writes cues to the log
#[derive(Debug)]
pub struct LogAudio {
    settings: Settings,
    current_music: Option<MusicTrack>,
}

impl Default for LogAudio {
    fn default() -> Self {
        Self::from_settings(&Settings::default())
    }
}

impl LogAudio {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            settings: settings.clone().sanitized(),
            current_music: None,
        }
    }

    /// Effect volume after master and mute
    fn effective_volume(&self) -> f32 {
        self.settings.effective_sfx_volume()
    }

    pub fn current_music(&self) -> Option<MusicTrack> {
        self.current_music
    }
}

impl AudioPort for LogAudio {
    fn play(&mut self, effect: SoundEffect) {
        let vol = self.effective_volume();
        if vol <= 0.0 {
            return;
        }
        log::debug!("sfx {} at {vol:.2}", effect.name());
    }

    fn play_music(&mut self, track: MusicTrack) {
        // Restarting the same track is a no-op
        if self.current_music == Some(track) {
            return;
        }
        self.current_music = Some(track);
        let vol = self.settings.effective_music_volume();
        if vol > 0.0 {
            log::debug!("music {} at {vol:.2}", track.name());
        }
    }

    fn set_muted(&mut self, muted: bool) {
        self.settings.muted = muted;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_muted_volume_is_zero() {
        let mut audio = LogAudio::default();
        assert!((audio.effective_volume() - 0.8).abs() < 1e-6);
        audio.set_muted(true);
        assert_eq!(audio.effective_volume(), 0.0);
    }

    #[test]
    fn test_volumes_clamped_from_settings() {
        let settings = Settings {
            master_volume: 2.0,
            sfx_volume: 0.5,
            ..Settings::default()
        };
        assert_eq!(LogAudio::from_settings(&settings).effective_volume(), 0.5);
    }

    #[test]
    fn test_music_tracked() {
        let mut audio = LogAudio::default();
        audio.play_music(MusicTrack::Boss);
        audio.play_music(MusicTrack::Boss);
        assert_eq!(audio.current_music(), Some(MusicTrack::Boss));
    }
}
