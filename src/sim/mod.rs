//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only
//! - Stable iteration order (by entity ID)
//! - No rendering, audio or platform dependencies

pub mod collision;
pub mod entity;
pub mod lifecycle;
pub mod state;
pub mod tick;
pub mod timer;

pub use collision::{Aabb, HurtPolicy, Outcome, Response, ResponseTable, detect};
pub use entity::{Category, EdgePolicy, Entity, EntityBuilder, EntityId, Shape};
pub use lifecycle::{Bounds, integrate, retire, step};
pub use state::{BurstStyle, FrameView, GameEvent, GameKind, GamePhase, PhaseRules, Session};
pub use tick::{InputSnapshot, tick};
pub use timer::Countdown;
