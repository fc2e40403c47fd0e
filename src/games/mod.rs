//! Per-game rules on top of the shared simulation
//!
//! Each game provides a scene builder and a few hooks the tick calls at fixed
//! points: input, spawners, outcome bookkeeping, level-clear check and
//! on-expire effects. Dispatch is by [`GameKind`], never by probing entities.

pub mod asteroids;
pub mod dodge;
pub mod platformer;
pub mod snake;

use crate::sim::collision::{HurtPolicy, Outcome, Response, ResponseTable};
use crate::sim::entity::{Category, Entity};
use crate::sim::lifecycle::Bounds;
use crate::sim::state::{GameKind, Session};
use crate::sim::tick::InputSnapshot;

pub use asteroids::AsteroidsState;
pub use dodge::DodgeState;
pub use platformer::PlatformerState;
pub use snake::SnakeState;

/// Game-specific bookkeeping carried by the session
#[derive(Debug, Clone, PartialEq)]
pub enum ModeState {
    Platformer(PlatformerState),
    Dodge(DodgeState),
    Asteroids(AsteroidsState),
    Snake(SnakeState),
}

impl ModeState {
    pub fn for_kind(kind: GameKind) -> Self {
        match kind {
            GameKind::Platformer => ModeState::Platformer(PlatformerState::default()),
            GameKind::Dodge => ModeState::Dodge(DodgeState::default()),
            GameKind::Asteroids => ModeState::Asteroids(AsteroidsState::default()),
            GameKind::Snake => ModeState::Snake(SnakeState::default()),
        }
    }
}

pub fn bounds(kind: GameKind) -> Bounds {
    match kind {
        GameKind::Platformer => platformer::BOUNDS,
        GameKind::Dodge => dodge::BOUNDS,
        GameKind::Asteroids => asteroids::BOUNDS,
        GameKind::Snake => snake::BOUNDS,
    }
}

/// The standard response table with each game's overrides
pub fn responses(kind: GameKind) -> ResponseTable {
    let table = ResponseTable::standard();
    match kind {
        GameKind::Platformer => table,
        GameKind::Dodge => table.with(
            Category::Player,
            Category::Hazard,
            Response::Hurt(HurtPolicy::absorb(0)),
        ),
        GameKind::Asteroids => table.with(
            Category::Player,
            Category::Hazard,
            Response::Hurt(HurtPolicy::absorb(asteroids::SHIP_HIT_BURST)),
        ),
        GameKind::Snake => table.with(
            Category::Player,
            Category::Hazard,
            Response::Hurt(HurtPolicy::damage()),
        ),
    }
}

pub fn starting_lives(kind: GameKind) -> u32 {
    match kind {
        GameKind::Platformer => platformer::STARTING_LIVES,
        GameKind::Dodge => 1,
        GameKind::Asteroids => asteroids::STARTING_LIVES,
        GameKind::Snake => 1,
    }
}

pub fn following_level(kind: GameKind, level: u32) -> u32 {
    match kind {
        GameKind::Platformer if level >= platformer::MAX_LEVEL => 1,
        _ => level + 1,
    }
}

/// Populate the session's entity list for its current level
pub fn build_scene(session: &mut Session) {
    match session.kind {
        GameKind::Platformer => platformer::build_scene(session),
        GameKind::Dodge => dodge::build_scene(session),
        GameKind::Asteroids => asteroids::build_scene(session),
        GameKind::Snake => snake::build_scene(session),
    }
    log::debug!(
        "{} level {} built with {} entities",
        session.kind.name(),
        session.level,
        session.entities.len()
    );
}

pub fn apply_input(session: &mut Session, input: &InputSnapshot) {
    match session.kind {
        GameKind::Platformer => platformer::apply_input(session, input),
        GameKind::Dodge => dodge::apply_input(session, input),
        GameKind::Asteroids => asteroids::apply_input(session, input),
        GameKind::Snake => snake::apply_input(session, input),
    }
}

pub fn run_spawners(session: &mut Session) {
    match session.kind {
        GameKind::Platformer => {}
        GameKind::Dodge => dodge::run_spawners(session),
        GameKind::Asteroids => asteroids::run_spawners(session),
        GameKind::Snake => snake::run_spawners(session),
    }
}

pub fn apply_outcome(session: &mut Session, outcome: &Outcome) {
    match session.kind {
        GameKind::Platformer => platformer::apply_outcome(session),
        GameKind::Dodge => {}
        GameKind::Asteroids => asteroids::apply_outcome(session, outcome),
        GameKind::Snake => snake::apply_outcome(session, outcome),
    }
}

/// Level complete by quota rather than by reaching a goal
pub fn level_cleared(session: &Session) -> bool {
    match &session.mode {
        ModeState::Asteroids(state) => state.destroyed >= state.quota,
        _ => false,
    }
}

pub fn on_expire(session: &mut Session, expired: Vec<Entity>) {
    if expired.is_empty() {
        return;
    }
    match session.kind {
        GameKind::Platformer | GameKind::Dodge => {}
        GameKind::Asteroids => asteroids::on_expire(session, expired),
        GameKind::Snake => snake::on_expire(session, expired),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_platformer_levels_loop() {
        assert_eq!(following_level(GameKind::Platformer, 7), 8);
        assert_eq!(following_level(GameKind::Platformer, 8), 1);
        assert_eq!(following_level(GameKind::Asteroids, 8), 9);
    }

    #[test]
    fn test_per_game_hazard_policy() {
        let hurt = |kind| match responses(kind).lookup(Category::Player, Category::Hazard) {
            Some(Response::Hurt(policy)) => policy,
            other => panic!("unexpected response {:?}", other),
        };
        assert!(hurt(GameKind::Platformer).arm_invincibility);
        assert!(hurt(GameKind::Dodge).destroy_hazard);
        assert_eq!(hurt(GameKind::Asteroids).burst, asteroids::SHIP_HIT_BURST);
        assert_eq!(hurt(GameKind::Snake), HurtPolicy::damage());
    }
}
