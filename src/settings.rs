//! Game settings and preferences
//!
//! Stored as JSON next to the leaderboard. A missing or broken file never
//! stops the game: `load` logs and falls back to defaults.

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

use crate::consts::{
    MAX_FRAME_DT, MAX_LIVES, MIN_PLAYFIELD_HEIGHT, MIN_PLAYFIELD_WIDTH, PLAYFIELD_HEIGHT,
    PLAYFIELD_WIDTH, STARTING_LIVES,
};

/// Accepted range for the per-tick dt clamp
const FRAME_DT_RANGE: (f32, f32) = (0.001, 0.25);

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("settings io: {0}")]
    Io(#[from] std::io::Error),
    #[error("settings json: {0}")]
    Json(#[from] serde_json::Error),
}

/// Quality preset levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum QualityPreset {
    Low,
    #[default]
    Medium,
    High,
}

impl QualityPreset {
    pub fn as_str(&self) -> &'static str {
        match self {
            QualityPreset::Low => "Low",
            QualityPreset::Medium => "Medium",
            QualityPreset::High => "High",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "low" => Some(QualityPreset::Low),
            "medium" | "med" => Some(QualityPreset::Medium),
            "high" => Some(QualityPreset::High),
            _ => None,
        }
    }

    /// Maximum particles for this preset
    pub fn max_particles(&self) -> usize {
        match self {
            QualityPreset::Low => 100,
            QualityPreset::Medium => 500,
            QualityPreset::High => 2000,
        }
    }

    /// Whether the starfield is drawn
    pub fn starfield_enabled(&self) -> bool {
        !matches!(self, QualityPreset::Low)
    }
}

/// Game settings/preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Graphics quality preset
    pub quality: QualityPreset,

    // === Visual Effects ===
    /// Particle effects (explosions, feathers, sparks)
    pub particles: bool,
    /// Screen shake on hits and explosions
    pub screen_shake: bool,
    /// Full-screen flash on hits, phase changes and bombs
    pub screen_flash: bool,

    // === Audio ===
    /// Master volume (0.0 - 1.0)
    pub master_volume: f32,
    /// Sound effects volume (0.0 - 1.0)
    pub sfx_volume: f32,
    /// Music volume (0.0 - 1.0)
    pub music_volume: f32,
    pub muted: bool,

    // === Accessibility ===
    /// Reduced motion (no shake, no flashes)
    pub reduced_motion: bool,

    // === Simulation ===
    /// Largest dt a single tick accepts (seconds)
    pub max_frame_dt: f32,
    pub playfield_width: f32,
    pub playfield_height: f32,
    pub starting_lives: u32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            quality: QualityPreset::Medium,

            particles: true,
            screen_shake: true,
            screen_flash: true,

            master_volume: 0.8,
            sfx_volume: 1.0,
            music_volume: 0.7,
            muted: false,

            reduced_motion: false,

            max_frame_dt: MAX_FRAME_DT,
            playfield_width: PLAYFIELD_WIDTH,
            playfield_height: PLAYFIELD_HEIGHT,
            starting_lives: STARTING_LIVES,
        }
    }
}

impl Settings {
    /// Create settings from a quality preset
    pub fn from_preset(preset: QualityPreset) -> Self {
        Self {
            quality: preset,
            ..Self::default()
        }
    }

    /// Effective screen shake (respects reduced_motion)
    pub fn effective_screen_shake(&self) -> bool {
        self.screen_shake && !self.reduced_motion
    }

    /// Effective screen flash (respects reduced_motion)
    pub fn effective_screen_flash(&self) -> bool {
        self.screen_flash && !self.reduced_motion
    }

    /// Effective particle count cap
    pub fn max_particles(&self) -> usize {
        if !self.particles {
            0
        } else {
            self.quality.max_particles()
        }
    }

    /// Effect volume after master and mute
    pub fn effective_sfx_volume(&self) -> f32 {
        if self.muted {
            0.0
        } else {
            (self.master_volume * self.sfx_volume).clamp(0.0, 1.0)
        }
    }

    /// Music volume after master and mute
    pub fn effective_music_volume(&self) -> f32 {
        if self.muted {
            0.0
        } else {
            (self.master_volume * self.music_volume).clamp(0.0, 1.0)
        }
    }

    /// Pull every numeric field back into its valid range
    pub fn sanitized(mut self) -> Self {
        let defaults = Self::default();
        if !self.max_frame_dt.is_finite() {
            log::warn!("max_frame_dt {} is not finite, using default", self.max_frame_dt);
            self.max_frame_dt = defaults.max_frame_dt;
        }
        self.max_frame_dt = self.max_frame_dt.clamp(FRAME_DT_RANGE.0, FRAME_DT_RANGE.1);

        if !self.playfield_width.is_finite() {
            self.playfield_width = defaults.playfield_width;
        }
        if !self.playfield_height.is_finite() {
            self.playfield_height = defaults.playfield_height;
        }
        self.playfield_width = self.playfield_width.max(MIN_PLAYFIELD_WIDTH);
        self.playfield_height = self.playfield_height.max(MIN_PLAYFIELD_HEIGHT);

        self.starting_lives = self.starting_lives.clamp(1, MAX_LIVES);
        for volume in [&mut self.master_volume, &mut self.sfx_volume, &mut self.music_volume] {
            *volume = if volume.is_finite() { (*volume).clamp(0.0, 1.0) } else { 1.0 };
        }
        self
    }

    /// Load settings from a JSON file, falling back to defaults on any error
    pub fn load(path: &Path) -> Self {
        match Self::try_load(path) {
            Ok(settings) => {
                log::info!("Loaded settings from {}", path.display());
                settings
            }
            Err(err) => {
                log::info!("Using default settings ({err})");
                Self::default()
            }
        }
    }

    /// Load settings, surfacing the failure
    pub fn try_load(path: &Path) -> Result<Self, SettingsError> {
        let json = std::fs::read_to_string(path)?;
        let settings: Settings = serde_json::from_str(&json)?;
        Ok(settings.sanitized())
    }

    /// Save settings as pretty JSON
    pub fn save(&self, path: &Path) -> Result<(), SettingsError> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        log::info!("Settings saved to {}", path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preset_particle_caps() {
        assert_eq!(Settings::from_preset(QualityPreset::Low).max_particles(), 100);
        assert_eq!(Settings::from_preset(QualityPreset::Medium).max_particles(), 500);
        assert_eq!(Settings::from_preset(QualityPreset::High).max_particles(), 2000);

        let settings = Settings {
            particles: false,
            ..Settings::default()
        };
        assert_eq!(settings.max_particles(), 0);
    }

    #[test]
    fn test_preset_names() {
        assert_eq!(QualityPreset::parse("HIGH"), Some(QualityPreset::High));
        assert_eq!(QualityPreset::parse("med"), Some(QualityPreset::Medium));
        assert_eq!(QualityPreset::parse("ultra"), None);
        assert_eq!(QualityPreset::Low.as_str(), "Low");
    }

    #[test]
    fn test_reduced_motion_overrides() {
        let settings = Settings {
            reduced_motion: true,
            ..Settings::default()
        };
        assert!(!settings.effective_screen_shake());
        assert!(!settings.effective_screen_flash());
    }

    #[test]
    fn test_sanitized_clamps() {
        let settings = Settings {
            max_frame_dt: 10.0,
            playfield_width: 5.0,
            playfield_height: f32::NAN,
            starting_lives: 0,
            master_volume: 3.0,
            ..Settings::default()
        }
        .sanitized();
        assert_eq!(settings.max_frame_dt, 0.25);
        assert_eq!(settings.playfield_width, MIN_PLAYFIELD_WIDTH);
        assert_eq!(settings.playfield_height, PLAYFIELD_HEIGHT);
        assert_eq!(settings.starting_lives, 1);
        assert_eq!(settings.master_volume, 1.0);
    }

    #[test]
    fn test_muted_volume() {
        let settings = Settings {
            muted: true,
            ..Settings::default()
        };
        assert_eq!(settings.effective_sfx_volume(), 0.0);
        assert_eq!(settings.effective_music_volume(), 0.0);
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let settings: Settings = serde_json::from_str(r#"{"quality":"High","muted":true}"#).unwrap();
        assert_eq!(settings.quality, QualityPreset::High);
        assert!(settings.muted);
        assert_eq!(settings.playfield_width, PLAYFIELD_WIDTH);
    }

    #[test]
    fn test_save_then_load() {
        let path = std::env::temp_dir().join(format!("cluck-settings-{}.json", std::process::id()));
        let settings = Settings::from_preset(QualityPreset::Low);
        settings.save(&path).unwrap();
        assert_eq!(Settings::load(&path), settings);
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let settings = Settings::load(Path::new("/definitely/not/here.json"));
        assert_eq!(settings, Settings::default());
    }
}
