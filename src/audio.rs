//! Sound bank collaborator
//!
//! Resolves one `.wav` file per effect from an asset directory. Playback is
//! outside the core: `play` only records the request, so a missing bank
//! degrades to silence instead of failing the game.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::error::AssetError;
use crate::sim::state::GameEvent;
use crate::tictactoe::{BoardEvent, Verdict};

/// Sound effect types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SoundEffect {
    /// Player leaves the ground
    Jump,
    /// Player lands after a jump
    Land,
    /// Goal reached
    Win,
    /// Next level started
    LevelUp,
    /// Projectile fired
    Shoot,
    /// Target destroyed or player hit
    Explosion,
    /// Consumable eaten
    Eat,
    GameOver,
    /// Board placement
    Click,
}

impl SoundEffect {
    pub const ALL: [SoundEffect; 9] = [
        SoundEffect::Jump,
        SoundEffect::Land,
        SoundEffect::Win,
        SoundEffect::LevelUp,
        SoundEffect::Shoot,
        SoundEffect::Explosion,
        SoundEffect::Eat,
        SoundEffect::GameOver,
        SoundEffect::Click,
    ];

    pub fn file_name(self) -> &'static str {
        match self {
            SoundEffect::Jump => "jump.wav",
            SoundEffect::Land => "land.wav",
            SoundEffect::Win => "win.wav",
            SoundEffect::LevelUp => "level_up.wav",
            SoundEffect::Shoot => "shoot.wav",
            SoundEffect::Explosion => "explosion.wav",
            SoundEffect::Eat => "eat.wav",
            SoundEffect::GameOver => "game_over.wav",
            SoundEffect::Click => "click.wav",
        }
    }

    /// Effect to play for a simulation event, if any
    pub fn for_event(event: &GameEvent) -> Option<Self> {
        match event {
            GameEvent::Jumped { .. } => Some(SoundEffect::Jump),
            GameEvent::Landed { .. } => Some(SoundEffect::Land),
            GameEvent::HazardHit { .. } | GameEvent::TargetDestroyed { .. } => {
                Some(SoundEffect::Explosion)
            }
            GameEvent::GoalReached | GameEvent::LevelComplete { .. } => Some(SoundEffect::Win),
            GameEvent::ProjectileFired { .. } => Some(SoundEffect::Shoot),
            GameEvent::Consumed { .. } => Some(SoundEffect::Eat),
            GameEvent::LevelStarted { level } if *level > 1 => Some(SoundEffect::LevelUp),
            GameEvent::GameOver { .. } => Some(SoundEffect::GameOver),
            GameEvent::LevelStarted { .. } | GameEvent::Restarted => None,
        }
    }

    /// Effect to play for a tic-tac-toe event
    pub fn for_board_event(event: &BoardEvent) -> Self {
        match event {
            BoardEvent::Placed { .. } => SoundEffect::Click,
            BoardEvent::Finished(Verdict::Win(_)) => SoundEffect::Win,
            BoardEvent::Finished(Verdict::Draw) => SoundEffect::GameOver,
        }
    }
}

/// Loaded sound files plus volume state
#[derive(Debug, Clone)]
pub struct SoundBank {
    sounds: HashMap<SoundEffect, PathBuf>,
    master_volume: f32,
    sfx_volume: f32,
    muted: bool,
    played: u64,
}

impl Default for SoundBank {
    fn default() -> Self {
        Self::silent()
    }
}

impl SoundBank {
    /// Bank with no sounds; every `play` is a no-op
    pub fn silent() -> Self {
        Self {
            sounds: HashMap::new(),
            master_volume: 0.8,
            sfx_volume: 1.0,
            muted: false,
            played: 0,
        }
    }

    /// Resolve `<name>.wav` for every effect under `dir`
    pub fn load(dir: impl AsRef<Path>) -> Result<Self, AssetError> {
        let dir = dir.as_ref();
        if !dir.is_dir() {
            return Err(AssetError::MissingDirectory(dir.to_path_buf()));
        }
        // Surface permission problems on the directory itself
        std::fs::read_dir(dir).map_err(|source| AssetError::Io {
            path: dir.to_path_buf(),
            source,
        })?;

        let mut bank = Self::silent();
        for effect in SoundEffect::ALL {
            let path = dir.join(effect.file_name());
            if path.is_file() {
                bank.sounds.insert(effect, path);
            } else {
                log::warn!("missing sound {:?} at {}", effect, path.display());
            }
        }
        log::info!(
            "loaded {} of {} sounds from {}",
            bank.sounds.len(),
            SoundEffect::ALL.len(),
            dir.display()
        );
        Ok(bank)
    }

    /// Load or fall back to silence with a warning
    pub fn load_or_silent(dir: impl AsRef<Path>) -> Self {
        match Self::load(dir) {
            Ok(bank) => bank,
            Err(err) => {
                log::warn!("audio disabled: {}", err);
                Self::silent()
            }
        }
    }

    pub fn is_silent(&self) -> bool {
        self.sounds.is_empty()
    }

    pub fn contains(&self, effect: SoundEffect) -> bool {
        self.sounds.contains_key(&effect)
    }

    /// Set master volume (0.0 - 1.0)
    pub fn set_master_volume(&mut self, vol: f32) {
        self.master_volume = vol.clamp(0.0, 1.0);
    }

    /// Set SFX volume (0.0 - 1.0)
    pub fn set_sfx_volume(&mut self, vol: f32) {
        self.sfx_volume = vol.clamp(0.0, 1.0);
    }

    pub fn set_muted(&mut self, muted: bool) {
        self.muted = muted;
    }

    pub fn effective_volume(&self) -> f32 {
        if self.muted {
            0.0
        } else {
            self.master_volume * self.sfx_volume
        }
    }

    /// Number of sounds actually started
    pub fn played(&self) -> u64 {
        self.played
    }

    /// Request playback; returns whether a sound was started
    pub fn play(&mut self, effect: SoundEffect) -> bool {
        let vol = self.effective_volume();
        if vol <= 0.0 {
            return false;
        }
        let Some(path) = self.sounds.get(&effect) else {
            return false;
        };
        log::debug!("play {} at volume {:.2}", path.display(), vol);
        self.played += 1;
        true
    }
}
