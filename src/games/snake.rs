//! Grid snake
//!
//! The head is the player entity; body segments are hazards kept in id order
//! from the neck to the tail. Movement is tile by tile on a step countdown
//! that shortens as the score grows, and the board wraps at every edge.

use glam::{IVec2, Vec2};
use rand::Rng;

use super::ModeState;
use crate::ms_to_ticks;
use crate::sim::collision::Outcome;
use crate::sim::entity::{Category, Entity, EntityBuilder};
use crate::sim::lifecycle::Bounds;
use crate::sim::state::Session;
use crate::sim::tick::InputSnapshot;
use crate::sim::timer::Countdown;

pub const COLS: i32 = 25;
pub const ROWS: i32 = 25;
pub const TILE: f32 = 25.0;
pub const BOUNDS: Bounds = Bounds::sized(COLS as f32 * TILE, ROWS as f32 * TILE);

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SnakeState {
    /// Unit direction in tiles; zero until the first turn
    pub heading: IVec2,
    /// Direction of the most recent step, zero before the first
    pub last_step: IVec2,
    /// Segments still to be added at the tail
    pub pending_growth: u32,
    pub step_timer: Countdown,
}

fn state(session: &mut Session) -> Option<&mut SnakeState> {
    match &mut session.mode {
        ModeState::Snake(state) => Some(state),
        _ => None,
    }
}

/// Milliseconds between steps: faster with score, never under 50ms
pub fn step_interval_ms(score: u64) -> u32 {
    let bonus = score.min(10) as u32 * 5;
    150u32.saturating_sub(bonus).max(50)
}

pub fn step_interval_ticks(score: u64) -> u32 {
    ms_to_ticks(step_interval_ms(score))
}

fn tile_pos(tile: IVec2) -> Vec2 {
    tile.as_vec2() * TILE
}

fn tile_of(entity: &Entity) -> IVec2 {
    (entity.pos / TILE).round().as_ivec2()
}

fn segment(category: Category, tile: IVec2) -> EntityBuilder {
    let pos = tile_pos(tile);
    EntityBuilder::rect(category, pos.x, pos.y, TILE, TILE).gravity(0.0)
}

pub fn build_scene(session: &mut Session) {
    if let Some(state) = state(session) {
        *state = SnakeState::default();
    }
    session.spawn(segment(Category::Player, IVec2::new(COLS / 2, ROWS / 2)));
    spawn_food(session);
}

/// Place food on a uniformly random unoccupied tile
pub fn spawn_food(session: &mut Session) {
    let occupied: Vec<IVec2> = session
        .entities
        .iter()
        .filter(|e| e.category.is_gameplay())
        .map(tile_of)
        .collect();
    let free: Vec<IVec2> = (0..ROWS)
        .flat_map(|y| (0..COLS).map(move |x| IVec2::new(x, y)))
        .filter(|t| !occupied.contains(t))
        .collect();
    if free.is_empty() {
        log::info!("board full, no room for food");
        return;
    }
    let pick = session.rng().random_range(0..free.len());
    session.spawn(segment(Category::Consumable, free[pick]));
}

/// Arrow keys turn the head; reversing onto the neck is ignored.
///
/// The reverse is taken from the last step actually made, so two quick
/// turns between steps cannot fold the head back onto itself.
pub fn apply_input(session: &mut Session, input: &InputSnapshot) {
    let Some(state) = state(session) else {
        return;
    };
    let back = -state.last_step;
    let turn = [
        (input.up, IVec2::NEG_Y),
        (input.down, IVec2::Y),
        (input.left, IVec2::NEG_X),
        (input.right, IVec2::X),
    ]
    .into_iter()
    .find(|&(held, dir)| held && dir != back);
    if let Some((_, dir)) = turn {
        state.heading = dir;
    }
}

pub fn run_spawners(session: &mut Session) {
    let score = session.score;
    let Some(state) = state(session) else {
        return;
    };
    if state.heading == IVec2::ZERO {
        return;
    }
    let due = state.step_timer.tick() || !state.step_timer.is_active();
    if !due {
        return;
    }
    state.step_timer.arm_for(step_interval_ticks(score));
    step(session);
}

/// Move the head one tile and pull every segment into its predecessor's place
pub fn step(session: &mut Session) {
    let Some(state) = state(session) else {
        return;
    };
    let heading = state.heading;
    state.last_step = heading;
    let grow = state.pending_growth > 0;
    if grow {
        state.pending_growth -= 1;
    }

    let mut trail = None;
    let mut next = None;
    for entity in session.entities.iter_mut() {
        match entity.category {
            Category::Player => {
                let old = tile_of(entity);
                let moved = IVec2::new(
                    (old.x + heading.x).rem_euclid(COLS),
                    (old.y + heading.y).rem_euclid(ROWS),
                );
                set_tile(entity, moved);
                next = Some(old);
                trail = Some(old);
            }
            Category::Hazard => {
                if let Some(target) = next {
                    let old = tile_of(entity);
                    set_tile(entity, target);
                    next = Some(old);
                    trail = Some(old);
                }
            }
            _ => {}
        }
    }

    if let (true, Some(tail)) = (grow, trail) {
        session.spawn(segment(Category::Hazard, tail));
    }
}

fn set_tile(entity: &mut Entity, tile: IVec2) {
    entity.pos = tile_pos(tile);
    entity.prev_pos = entity.pos;
}

pub fn apply_outcome(session: &mut Session, outcome: &Outcome) {
    if let Some(state) = state(session) {
        state.pending_growth += outcome.growth;
    }
}

/// Eaten food is replaced elsewhere
pub fn on_expire(session: &mut Session, expired: Vec<Entity>) {
    let eaten = expired
        .iter()
        .filter(|e| e.category == Category::Consumable)
        .count();
    for _ in 0..eaten {
        spawn_food(session);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::collision::resolve_all;
    use crate::sim::state::{GameKind, GamePhase};
    use crate::sim::tick::tick;

    fn snake_state(session: &Session) -> &SnakeState {
        match &session.mode {
            ModeState::Snake(state) => state,
            other => panic!("unexpected mode {:?}", other),
        }
    }

    fn head(session: &Session) -> IVec2 {
        tile_of(session.player().expect("head present"))
    }

    fn body(session: &Session) -> Vec<IVec2> {
        session
            .entities
            .iter()
            .filter(|e| e.category == Category::Hazard)
            .map(tile_of)
            .collect()
    }

    fn without_food(seed: u64) -> Session {
        let mut session = Session::new(GameKind::Snake, seed);
        session
            .entities
            .retain(|e| e.category != Category::Consumable);
        session
    }

    fn turn(session: &mut Session, dir: IVec2) {
        if let Some(state) = state(session) {
            state.heading = dir;
        }
    }

    #[test]
    fn test_step_interval() {
        assert_eq!(step_interval_ms(0), 150);
        assert_eq!(step_interval_ms(4), 130);
        assert_eq!(step_interval_ms(10), 100);
        assert_eq!(step_interval_ms(50), 100);
        assert_eq!(step_interval_ticks(0), 9);
        assert_eq!(step_interval_ticks(10), 6);
    }

    #[test]
    fn test_scene_has_head_and_food() {
        let session = Session::new(GameKind::Snake, 5);
        assert_eq!(head(&session), IVec2::new(12, 12));
        assert_eq!(session.count(Category::Consumable), 1);
        let food = session
            .entities
            .iter()
            .find(|e| e.category == Category::Consumable)
            .expect("food present");
        assert_ne!(tile_of(food), IVec2::new(12, 12));
    }

    #[test]
    fn test_stationary_until_first_turn() {
        let mut session = without_food(5);
        for _ in 0..30 {
            tick(&mut session, &InputSnapshot::default());
        }
        assert_eq!(head(&session), IVec2::new(12, 12));
    }

    #[test]
    fn test_moves_one_tile_per_interval() {
        let mut session = without_food(5);
        let right = InputSnapshot {
            right: true,
            ..Default::default()
        };
        tick(&mut session, &right);
        assert_eq!(head(&session), IVec2::new(13, 12));
        for _ in 0..8 {
            tick(&mut session, &InputSnapshot::default());
        }
        assert_eq!(head(&session), IVec2::new(13, 12));
        tick(&mut session, &InputSnapshot::default());
        assert_eq!(head(&session), IVec2::new(14, 12));
    }

    #[test]
    fn test_reverse_turn_ignored() {
        let mut session = without_food(5);
        turn(&mut session, IVec2::X);
        step(&mut session);
        let left = InputSnapshot {
            left: true,
            ..Default::default()
        };
        apply_input(&mut session, &left);
        assert_eq!(snake_state(&session).heading, IVec2::X);

        let up = InputSnapshot {
            up: true,
            ..Default::default()
        };
        apply_input(&mut session, &up);
        assert_eq!(snake_state(&session).heading, IVec2::NEG_Y);
    }

    #[test]
    fn test_two_turns_between_steps_cannot_reverse() {
        let mut session = without_food(5);
        turn(&mut session, IVec2::X);
        step(&mut session);
        let start = head(&session);

        let up = InputSnapshot {
            up: true,
            ..Default::default()
        };
        let left = InputSnapshot {
            left: true,
            ..Default::default()
        };
        apply_input(&mut session, &up);
        apply_input(&mut session, &left);
        assert_eq!(snake_state(&session).heading, IVec2::NEG_Y);

        step(&mut session);
        assert_eq!(head(&session), start + IVec2::NEG_Y);
        apply_input(&mut session, &left);
        assert_eq!(snake_state(&session).heading, IVec2::NEG_X);
    }

    #[test]
    fn test_wraps_at_edges() {
        let mut session = without_food(5);
        turn(&mut session, IVec2::NEG_X);
        for _ in 0..13 {
            step(&mut session);
        }
        assert_eq!(head(&session), IVec2::new(COLS - 1, 12));
    }

    #[test]
    fn test_eating_grows_and_respawns_food() {
        let mut session = without_food(5);
        session.spawn(segment(Category::Consumable, IVec2::new(13, 12)));
        let right = InputSnapshot {
            right: true,
            ..Default::default()
        };
        tick(&mut session, &right);
        assert_eq!(session.score, 1);
        assert_eq!(snake_state(&session).pending_growth, 1);
        assert_eq!(session.count(Category::Consumable), 1, "replacement food");

        step(&mut session);
        assert_eq!(head(&session), IVec2::new(14, 12));
        assert_eq!(body(&session), vec![IVec2::new(13, 12)]);
        assert_eq!(snake_state(&session).pending_growth, 0);
    }

    #[test]
    fn test_body_follows_head() {
        let mut session = without_food(5);
        turn(&mut session, IVec2::X);
        if let Some(state) = state(&mut session) {
            state.pending_growth = 2;
        }
        step(&mut session);
        step(&mut session);
        turn(&mut session, IVec2::Y);
        step(&mut session);
        assert_eq!(head(&session), IVec2::new(14, 13));
        assert_eq!(body(&session), vec![IVec2::new(14, 12), IVec2::new(13, 12)]);
    }

    #[test]
    fn test_running_into_body_ends_game() {
        let mut session = without_food(5);
        if let Some(state) = state(&mut session) {
            state.pending_growth = 4;
        }
        for dir in [IVec2::X, IVec2::X, IVec2::Y, IVec2::NEG_X] {
            turn(&mut session, dir);
            step(&mut session);
            let outcome = resolve_all(&mut session.entities, &session.responses);
            assert_eq!(outcome.lives_lost, 0);
        }
        turn(&mut session, IVec2::NEG_Y);
        step(&mut session);
        let outcome = resolve_all(&mut session.entities, &session.responses);
        assert_eq!(outcome.lives_lost, 1);
    }

    #[test]
    fn test_collision_through_tick_is_game_over() {
        let mut session = without_food(5);
        if let Some(state) = state(&mut session) {
            state.pending_growth = 4;
        }
        for dir in [IVec2::X, IVec2::X, IVec2::Y, IVec2::NEG_X] {
            turn(&mut session, dir);
            step(&mut session);
        }
        let up = InputSnapshot {
            up: true,
            ..Default::default()
        };
        tick(&mut session, &up);
        assert_eq!(session.phase, GamePhase::GameOver);
        assert_eq!(session.lives, 0);
    }
}
