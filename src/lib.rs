//! Arcade Engine - deterministic frame-update core for small arcade games
//!
//! Core modules:
//! - `sim`: Deterministic simulation (entities, collisions, timers, lifecycle, tick)
//! - `games`: Scene builders and per-tick rules for each arcade game
//! - `tictactoe`: Board game session with a delayed computer opponent
//! - `driver`: Fixed-rate frame loop and the input/presentation boundary
//! - `audio`: Sound bank collaborator with a silent fallback
//! - `settings`: Runtime settings

pub mod audio;
pub mod driver;
pub mod error;
pub mod games;
pub mod settings;
pub mod sim;
pub mod tictactoe;

pub use error::{AssetError, EntityError, MoveError, SettingsError};
pub use settings::{GameChoice, QualityPreset, Settings};

use glam::Vec2;

/// Engine-wide constants
pub mod consts {
    /// Fixed simulation rate (updates per second)
    pub const TICK_RATE: u32 = 60;
    /// Simulation step in ticks. Velocities are pixels/tick, so one update is `1.0`.
    pub const TICK_DT: f32 = 1.0;

    /// Downward acceleration for gravity-affected players (pixels/tick²)
    pub const GRAVITY: f32 = 0.8;
    /// Downward acceleration for sparkle particles
    pub const PARTICLE_GRAVITY: f32 = 0.1;

    /// Damage immunity after a hazard hit (1.5s)
    pub const INVINCIBILITY_TICKS: u32 = 90;
    /// Knockback applied on a hazard hit (x is mirrored away from the hazard)
    pub const KNOCKBACK_X: f32 = 8.0;
    pub const KNOCKBACK_Y: f32 = -10.0;
    /// Maximum penetration below a surface that still counts as landing on it
    pub const LAND_TOLERANCE: f32 = 10.0;

    /// Light pulse duration after a jump
    pub const LIGHT_DURATION: u32 = 20;
    /// Reveal window, slightly longer than the pulse that triggers it
    pub const REVEAL_DURATION: u32 = LIGHT_DURATION + 10;
    /// Radius of the light pulse
    pub const LIGHT_RADIUS: f32 = 250.0;

    /// Default particle cap when no settings are supplied
    pub const MAX_PARTICLES: usize = 500;
}

/// Convert a wall-clock duration in milliseconds to whole ticks (rounded, at least 1)
#[inline]
pub fn ms_to_ticks(ms: u32) -> u32 {
    ((ms * consts::TICK_RATE + 500) / 1000).max(1)
}

/// Unit vector for an angle in radians (screen space, y down)
#[inline]
pub fn direction_from_angle(angle: f32) -> Vec2 {
    Vec2::new(angle.cos(), angle.sin())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ms_to_ticks() {
        assert_eq!(ms_to_ticks(1000), 60);
        assert_eq!(ms_to_ticks(320), 19);
        assert_eq!(ms_to_ticks(150), 9);
        assert_eq!(ms_to_ticks(2000), 120);
        assert_eq!(ms_to_ticks(0), 1);
    }

    #[test]
    fn test_direction_from_angle() {
        let d = direction_from_angle(std::f32::consts::FRAC_PI_2);
        assert!(d.x.abs() < 1e-6);
        assert!((d.y - 1.0).abs() < 1e-6);
    }
}
