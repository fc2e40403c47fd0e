//! Fixed timestep simulation tick
//!
//! Core game loop that advances a session deterministically. Within a
//! playing tick the order is fixed: timers, input, spawners, integration,
//! collision stages, outcome, reveal pass, phase checks, retirement.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::collision::{self, Outcome};
use super::entity::{Category, Entity};
use super::lifecycle;
use super::state::{GameEvent, GamePhase, Session};
use super::timer;
use crate::consts::{LIGHT_RADIUS, TICK_DT};
use crate::games;

/// Input commands for a single tick (deterministic)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InputSnapshot {
    pub left: bool,
    pub right: bool,
    pub up: bool,
    pub down: bool,
    /// Jump pressed this tick
    pub jump: bool,
    /// Pointer position in world coordinates
    pub pointer: Option<Vec2>,
    pub pointer_pressed: bool,
    pub pointer_released: bool,
    pub restart: bool,
    /// Advance past a completed level
    pub next: bool,
    /// Ends the driver loop; the session ignores it
    pub quit: bool,
}

/// Advance the session by one fixed timestep
pub fn tick(session: &mut Session, input: &InputSnapshot) {
    session.time_ticks += 1;

    // Restart input replays the level where allowed; otherwise it ends a game over
    if input.restart {
        if session.rules().mid_play_restart {
            session.retry_level();
            return;
        }
        if session.phase == GamePhase::GameOver {
            session.restart();
            return;
        }
    }

    match session.phase {
        GamePhase::Playing => play(session, input),
        GamePhase::LevelComplete if input.next && session.rules().next_input => {
            animate_particles(session);
            session.next_level();
        }
        _ => {
            animate_particles(session);
            if session.phase_timer.tick() {
                session.advance_phase();
            }
        }
    }
}

fn play(session: &mut Session, input: &InputSnapshot) {
    lifecycle::tick_timers(&mut session.entities);
    games::apply_input(session, input);
    games::run_spawners(session);

    lifecycle::integrate(&mut session.entities, TICK_DT, &session.bounds);
    let outcome = collision::resolve_all(&mut session.entities, &session.responses);
    apply_outcome(session, &outcome);
    reveal_pass(&mut session.entities);

    if session.lives == 0 {
        session.emit(GameEvent::GameOver {
            score: session.score,
        });
        session.enter_phase(GamePhase::GameOver);
    } else if outcome.goal_reached || games::level_cleared(session) {
        session.emit(GameEvent::LevelComplete {
            level: session.level,
        });
        session.enter_phase(GamePhase::LevelComplete);
    }

    let expired = lifecycle::retire(&mut session.entities, &session.bounds);
    games::on_expire(session, expired);
    session.normalize_order();
}

fn apply_outcome(session: &mut Session, outcome: &Outcome) {
    session.lives = session.lives.saturating_sub(outcome.lives_lost);
    session.score += outcome.score;

    let style = session.kind.burst_style();
    for &(at, count) in &outcome.bursts {
        session.burst(at, count, style);
    }
    for event in &outcome.events {
        session.emit(event.clone());
    }
    games::apply_outcome(session, outcome);
}

/// Arm the reveal window of every revealable entity inside an active light pulse
pub fn reveal_pass(entities: &mut [Entity]) {
    let sources: Vec<Vec2> = entities
        .iter()
        .filter(|e| e.category == Category::Player && e.pulse.is_active())
        .map(Entity::center)
        .collect();
    if sources.is_empty() {
        return;
    }

    for entity in entities.iter_mut().filter(|e| e.reveal.max() > 0) {
        let c = entity.center();
        if sources.iter().any(|s| s.distance(c) < LIGHT_RADIUS) {
            entity.reveal.arm();
        }
    }
}

/// Outside of play only decorative particles keep moving
fn animate_particles(session: &mut Session) {
    for particle in session
        .entities
        .iter_mut()
        .filter(|e| e.category == Category::DecorativeParticle)
    {
        timer::tick(particle);
        particle.advance(TICK_DT);
    }
    let bounds = session.bounds;
    session
        .entities
        .retain(|e| e.category != Category::DecorativeParticle || !e.is_expired(&bounds));
}
