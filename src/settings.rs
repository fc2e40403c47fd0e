//! Runtime settings
//!
//! Read once at startup from the JSON file named by `ARCADE_SETTINGS`.
//! Every field has a default, so partial files are fine.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::SettingsError;
use crate::sim::state::GameKind;
use crate::tictactoe::{Difficulty, Opponent};

/// Environment variable naming the settings file
pub const SETTINGS_ENV: &str = "ARCADE_SETTINGS";

/// Quality preset levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum QualityPreset {
    Low,
    #[default]
    Medium,
    High,
}

impl QualityPreset {
    /// Maximum particles for this preset
    pub fn max_particles(&self) -> usize {
        match self {
            QualityPreset::Low => 100,
            QualityPreset::Medium => 500,
            QualityPreset::High => 2000,
        }
    }
}

/// Which game the binary runs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GameChoice {
    #[default]
    Platformer,
    Dodge,
    Asteroids,
    Snake,
    TicTacToe,
}

impl GameChoice {
    /// The arcade session kind, `None` for tic-tac-toe
    pub fn arcade_kind(self) -> Option<GameKind> {
        match self {
            GameChoice::Platformer => Some(GameKind::Platformer),
            GameChoice::Dodge => Some(GameKind::Dodge),
            GameChoice::Asteroids => Some(GameKind::Asteroids),
            GameChoice::Snake => Some(GameKind::Snake),
            GameChoice::TicTacToe => None,
        }
    }

    pub fn name(self) -> &'static str {
        self.arcade_kind().map_or("tic-tac-toe", GameKind::name)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Particle budget preset
    pub quality: QualityPreset,
    /// Particle effects on/off
    pub particles: bool,

    // === Audio ===
    /// Master volume (0.0 - 1.0)
    pub master_volume: f32,
    /// Sound effects volume (0.0 - 1.0)
    pub sfx_volume: f32,
    pub muted: bool,
    /// Directory holding the `.wav` sound bank
    pub asset_dir: PathBuf,

    // === Run ===
    pub game: GameChoice,
    pub seed: u64,
    /// Computer strength for tic-tac-toe
    pub difficulty: Difficulty,
    /// Tic-tac-toe with two humans instead of the computer
    pub two_player: bool,
    /// Sleep to each tick boundary; off runs as fast as possible
    pub pacing: bool,
    /// Stop after this many ticks (0 runs until quit)
    pub demo_ticks: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            quality: QualityPreset::Medium,
            particles: true,

            master_volume: 0.8,
            sfx_volume: 1.0,
            muted: false,
            asset_dir: PathBuf::from("assets/sounds"),

            game: GameChoice::Platformer,
            seed: 0x5eed,
            difficulty: Difficulty::Easy,
            two_player: false,
            pacing: true,
            demo_ticks: 600,
        }
    }
}

impl Settings {
    /// Effective particle count cap
    pub fn max_particles(&self) -> usize {
        if !self.particles {
            0
        } else {
            self.quality.max_particles()
        }
    }

    pub fn opponent(&self) -> Opponent {
        if self.two_player {
            Opponent::Human
        } else {
            Opponent::Computer(self.difficulty)
        }
    }

    pub fn from_json(json: &str) -> Result<Self, SettingsError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, SettingsError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| SettingsError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&json)
    }

    /// Settings from `ARCADE_SETTINGS`, defaults when unset or unreadable
    pub fn load() -> Self {
        let Some(path) = std::env::var_os(SETTINGS_ENV) else {
            log::info!("Using default settings");
            return Self::default();
        };
        match Self::from_file(&path) {
            Ok(settings) => {
                log::info!("Loaded settings from {}", Path::new(&path).display());
                settings
            }
            Err(err) => {
                log::warn!("{}; using default settings", err);
                Self::default()
            }
        }
    }
}
