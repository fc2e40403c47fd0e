//! Falling-star dodge game
//!
//! Stars fall in groups of three at a shrinking interval. One hit ends the
//! run; the score is the number of whole seconds survived.

use rand::Rng;

use super::ModeState;
use crate::consts::TICK_RATE;
use crate::sim::entity::{Category, EdgePolicy, EntityBuilder};
use crate::sim::lifecycle::Bounds;
use crate::sim::state::Session;
use crate::sim::tick::InputSnapshot;
use crate::sim::timer::Countdown;

pub const BOUNDS: Bounds = Bounds::sized(1000.0, 800.0);
pub const PLAYER_WIDTH: f32 = 40.0;
pub const PLAYER_HEIGHT: f32 = 60.0;
pub const PLAYER_SPEED: f32 = 5.0;
pub const STAR_WIDTH: f32 = 10.0;
pub const STAR_HEIGHT: f32 = 20.0;
pub const STAR_SPEED: f32 = 3.0;
pub const STARS_PER_WAVE: u32 = 3;

/// 2s initial spawn interval, 50ms faster each wave, never below 200ms
const INITIAL_INTERVAL: u32 = 120;
const INTERVAL_STEP: u32 = 3;
const MIN_INTERVAL: u32 = 12;

#[derive(Debug, Clone, PartialEq)]
pub struct DodgeState {
    pub spawn_timer: Countdown,
    pub interval: u32,
    pub waves: u32,
    pub survived_ticks: u64,
}

impl Default for DodgeState {
    fn default() -> Self {
        Self {
            spawn_timer: Countdown::armed(INITIAL_INTERVAL),
            interval: INITIAL_INTERVAL,
            waves: 0,
            survived_ticks: 0,
        }
    }
}

fn state(session: &mut Session) -> Option<&mut DodgeState> {
    match &mut session.mode {
        ModeState::Dodge(state) => Some(state),
        _ => None,
    }
}

pub fn build_scene(session: &mut Session) {
    let y = session.bounds.max.y - PLAYER_HEIGHT;
    session.spawn(
        EntityBuilder::rect(Category::Player, 200.0, y, PLAYER_WIDTH, PLAYER_HEIGHT)
            .gravity(0.0)
            .edges(EdgePolicy::ClampX),
    );
}

pub fn apply_input(session: &mut Session, input: &InputSnapshot) {
    if let Some(player) = session.player_mut() {
        player.vel.x = match (input.left, input.right) {
            (true, false) => -PLAYER_SPEED,
            (false, true) => PLAYER_SPEED,
            _ => 0.0,
        };
    }
}

pub fn run_spawners(session: &mut Session) {
    let Some(state) = state(session) else {
        return;
    };
    state.survived_ticks += 1;
    let seconds = state.survived_ticks / u64::from(TICK_RATE);
    let due = state.spawn_timer.tick();
    if due {
        state.waves += 1;
        state.interval = state
            .interval
            .saturating_sub(INTERVAL_STEP)
            .max(MIN_INTERVAL);
        let interval = state.interval;
        state.spawn_timer.arm_for(interval);
    }
    session.score = seconds;

    if !due {
        return;
    }
    let max_x = (session.bounds.max.x - STAR_WIDTH) as i32;
    for _ in 0..STARS_PER_WAVE {
        let x = session.rng().random_range(0..=max_x) as f32;
        session.spawn(
            EntityBuilder::rect(Category::Hazard, x, -STAR_HEIGHT, STAR_WIDTH, STAR_HEIGHT)
                .velocity(0.0, STAR_SPEED)
                .cull_margin(0.0),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::state::{GameKind, GamePhase};
    use crate::sim::tick::tick;

    fn idle() -> InputSnapshot {
        InputSnapshot::default()
    }

    fn dodge_state(session: &Session) -> &DodgeState {
        match &session.mode {
            ModeState::Dodge(state) => state,
            other => panic!("unexpected mode {:?}", other),
        }
    }

    #[test]
    fn test_first_wave_after_two_seconds() {
        let mut session = Session::new(GameKind::Dodge, 8);
        // Keep the player out of the way of the stars
        session.entities.clear();
        for _ in 0..119 {
            tick(&mut session, &idle());
        }
        assert_eq!(session.count(Category::Hazard), 0);
        tick(&mut session, &idle());
        assert_eq!(session.count(Category::Hazard), 3);
        assert_eq!(dodge_state(&session).interval, 117);
        assert_eq!(session.score, 2);
    }

    #[test]
    fn test_interval_never_below_floor() {
        let mut state = DodgeState::default();
        for _ in 0..100 {
            state.interval = state
                .interval
                .saturating_sub(INTERVAL_STEP)
                .max(MIN_INTERVAL);
        }
        assert_eq!(state.interval, MIN_INTERVAL);
    }

    #[test]
    fn test_stars_are_culled_below_the_arena() {
        let mut session = Session::new(GameKind::Dodge, 8);
        session.entities.clear();
        session.spawn(
            EntityBuilder::rect(Category::Hazard, 500.0, 795.0, STAR_WIDTH, STAR_HEIGHT)
                .velocity(0.0, STAR_SPEED)
                .cull_margin(0.0),
        );
        tick(&mut session, &idle());
        assert_eq!(session.count(Category::Hazard), 1);
        tick(&mut session, &idle());
        assert_eq!(session.count(Category::Hazard), 0);
    }

    #[test]
    fn test_player_moves_and_stays_inside() {
        let mut session = Session::new(GameKind::Dodge, 8);
        let right = InputSnapshot {
            right: true,
            ..Default::default()
        };
        tick(&mut session, &right);
        assert_eq!(session.player().map(|p| p.pos.x), Some(205.0));
        for _ in 0..400 {
            tick(&mut session, &right);
            if session.phase != GamePhase::Playing {
                break;
            }
        }
        let player = session.player().expect("player present");
        assert!(player.aabb().max.x <= BOUNDS.max.x);
        assert_eq!(player.pos.y, BOUNDS.max.y - PLAYER_HEIGHT, "no gravity");
    }

    #[test]
    fn test_hit_removes_star_and_ends_run() {
        let mut session = Session::new(GameKind::Dodge, 8);
        session.spawn(
            EntityBuilder::rect(Category::Hazard, 210.0, 735.0, STAR_WIDTH, STAR_HEIGHT)
                .velocity(0.0, STAR_SPEED),
        );
        tick(&mut session, &idle());
        assert_eq!(session.phase, GamePhase::GameOver);
        assert_eq!(session.count(Category::Hazard), 0);
    }
}
