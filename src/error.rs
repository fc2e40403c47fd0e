//! Error types
//!
//! None of these are gameplay failures: losing a life or the whole game is a
//! phase change, not an error. These cover construction and collaborator I/O.

use std::path::PathBuf;

use thiserror::Error;

/// Rejected entity construction
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EntityError {
    #[error("entity size must be positive and finite (got {width} x {height})")]
    InvalidSize { width: f32, height: f32 },
    #[error("entity radius must be positive and finite (got {0})")]
    InvalidRadius(f32),
    #[error("entity position must be finite (got {x}, {y})")]
    InvalidPosition { x: f32, y: f32 },
    #[error("entity velocity must be finite (got {x}, {y})")]
    InvalidVelocity { x: f32, y: f32 },
}

/// Sound bank loading failure
#[derive(Debug, Error)]
pub enum AssetError {
    #[error("asset directory not found: {0}")]
    MissingDirectory(PathBuf),
    #[error("failed to read asset directory {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Settings file failure
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("failed to read settings file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed settings file: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Rejected tic-tac-toe move
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum MoveError {
    #[error("cell ({row}, {col}) is off the board")]
    OutOfRange { row: usize, col: usize },
    #[error("cell ({row}, {col}) is already taken")]
    Occupied { row: usize, col: usize },
    #[error("the computer is still thinking")]
    NotYourTurn,
    #[error("the game is over")]
    GameOver,
}
