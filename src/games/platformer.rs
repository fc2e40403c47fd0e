//! Light-reveal platformer
//!
//! Scenery is dark until the player's jump emits a light pulse; anything
//! within the pulse radius stays revealed for a short window. Five hand-made
//! levels, then three generated ones, then back to the first.

use glam::Vec2;
use rand::Rng;

use super::ModeState;
use crate::consts::{INVINCIBILITY_TICKS, LIGHT_DURATION, REVEAL_DURATION};
use crate::sim::entity::{Category, EdgePolicy, EntityBuilder};
use crate::sim::lifecycle::Bounds;
use crate::sim::state::{BurstStyle, GameEvent, Session};
use crate::sim::tick::InputSnapshot;

pub const BOUNDS: Bounds = Bounds::sized(1000.0, 700.0);
pub const PLAYER_START: Vec2 = Vec2::new(100.0, 300.0);
pub const PLAYER_SIZE: Vec2 = Vec2::new(30.0, 40.0);
pub const PLAYER_SPEED: f32 = 7.0;
pub const JUMP_STRENGTH: f32 = -16.0;
pub const STARTING_LIVES: u32 = 3;
pub const MAX_LEVEL: u32 = 8;

/// Falling this far below the arena costs a life
const FALL_LIMIT: f32 = 100.0;
const LEDGE_HEIGHT: f32 = 20.0;
const LEDGE_PATROL: (f32, f32) = (100.0, 1.0);
const DANGER_PATROL: (f32, f32) = (150.0, 2.0);
const JUMP_SPARKLES: u32 = 20;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlatformerState {
    pub jumps: u32,
}

#[derive(Debug, Clone, Copy)]
struct Ledge {
    x: f32,
    y: f32,
    width: f32,
    moving: bool,
}

#[derive(Debug, Clone, Copy)]
struct Danger {
    x: f32,
    y: f32,
    width: f32,
    height: f32,
    moving: bool,
}

const fn ledge(x: f32, y: f32, width: f32, moving: bool) -> Ledge {
    Ledge { x, y, width, moving }
}

const fn danger(x: f32, y: f32, width: f32, moving: bool) -> Danger {
    Danger {
        x,
        y,
        width,
        height: 20.0,
        moving,
    }
}

const LEVEL_1: [Ledge; 10] = [
    ledge(200.0, 550.0, 150.0, false),
    ledge(450.0, 500.0, 100.0, false),
    ledge(650.0, 450.0, 120.0, false),
    ledge(350.0, 400.0, 100.0, false),
    ledge(150.0, 350.0, 120.0, false),
    ledge(500.0, 300.0, 150.0, false),
    ledge(250.0, 250.0, 100.0, false),
    ledge(600.0, 200.0, 120.0, false),
    ledge(400.0, 150.0, 100.0, false),
    ledge(150.0, 100.0, 150.0, false),
];

const LEVEL_2: [Ledge; 9] = [
    ledge(200.0, 550.0, 150.0, false),
    ledge(450.0, 500.0, 100.0, true),
    ledge(650.0, 450.0, 120.0, false),
    ledge(350.0, 400.0, 100.0, true),
    ledge(150.0, 350.0, 120.0, false),
    ledge(500.0, 300.0, 150.0, false),
    ledge(250.0, 250.0, 100.0, true),
    ledge(600.0, 200.0, 120.0, false),
    ledge(400.0, 150.0, 100.0, false),
];

const LEVEL_3: [Ledge; 7] = [
    ledge(200.0, 550.0, 150.0, false),
    ledge(450.0, 500.0, 100.0, true),
    ledge(650.0, 450.0, 120.0, false),
    ledge(150.0, 350.0, 120.0, false),
    ledge(500.0, 300.0, 150.0, true),
    ledge(250.0, 250.0, 100.0, false),
    ledge(600.0, 200.0, 120.0, false),
];
const LEVEL_3_DANGERS: [Danger; 2] = [
    danger(350.0, 400.0, 100.0, false),
    danger(400.0, 150.0, 100.0, true),
];

const LEVEL_4: [Ledge; 7] = [
    ledge(200.0, 550.0, 100.0, true),
    ledge(450.0, 500.0, 100.0, false),
    ledge(700.0, 450.0, 100.0, true),
    ledge(150.0, 350.0, 100.0, false),
    ledge(400.0, 300.0, 100.0, true),
    ledge(650.0, 250.0, 100.0, false),
    ledge(300.0, 200.0, 100.0, true),
];
const LEVEL_4_DANGERS: [Danger; 3] = [
    danger(350.0, 400.0, 100.0, true),
    danger(500.0, 350.0, 100.0, false),
    danger(200.0, 150.0, 100.0, true),
];

const LEVEL_5: [Ledge; 9] = [
    ledge(200.0, 550.0, 80.0, true),
    ledge(450.0, 500.0, 80.0, false),
    ledge(700.0, 450.0, 80.0, true),
    ledge(150.0, 400.0, 80.0, false),
    ledge(400.0, 350.0, 80.0, true),
    ledge(650.0, 300.0, 80.0, false),
    ledge(300.0, 250.0, 80.0, true),
    ledge(550.0, 200.0, 80.0, false),
    ledge(200.0, 150.0, 80.0, true),
];
const LEVEL_5_DANGERS: [Danger; 5] = [
    danger(350.0, 450.0, 80.0, true),
    danger(500.0, 400.0, 80.0, false),
    danger(250.0, 350.0, 80.0, true),
    danger(600.0, 250.0, 80.0, false),
    danger(350.0, 200.0, 80.0, true),
];

fn fixed_layout(level: u32) -> Option<(&'static [Ledge], &'static [Danger])> {
    match level {
        1 => Some((&LEVEL_1, &[])),
        2 => Some((&LEVEL_2, &[])),
        3 => Some((&LEVEL_3, &LEVEL_3_DANGERS)),
        4 => Some((&LEVEL_4, &LEVEL_4_DANGERS)),
        5 => Some((&LEVEL_5, &LEVEL_5_DANGERS)),
        _ => None,
    }
}

/// A staircase of ledges with occasional dangers in the gaps
fn generated_layout(session: &mut Session) -> (Vec<Ledge>, Vec<Danger>) {
    let level = session.level as f32;
    let count = 10 + session.level;
    let rng = session.rng();
    let width = (120.0 - level * 5.0).max(60.0);
    let rise = (80.0 - level * 3.0).max(40.0);
    let moving_chance = (0.3 + (level - 5.0) * 0.1).clamp(0.0, 1.0) as f64;
    let danger_chance = (0.2 + (level - 5.0) * 0.05).clamp(0.0, 1.0) as f64;

    let mut ledges = Vec::new();
    let mut dangers = Vec::new();
    let mut prev_x = 100.0_f32;
    let mut y = 550.0_f32;

    for _ in 0..count {
        let gap = rng.random_range(80..=150) as f32;
        // Keep the staircase inside the arena
        let span = BOUNDS.width() - 100.0 - width;
        let x = 50.0 + (prev_x + gap - 50.0).rem_euclid(span);
        ledges.push(ledge(x, y, width, rng.random_bool(moving_chance)));

        if rng.random_bool(danger_chance) {
            let danger_width = rng.random_range(60..=120) as f32;
            let slack = gap - danger_width - 10.0;
            if slack >= 10.0 {
                let offset = rng.random_range(10.0..=slack);
                dangers.push(Danger {
                    x: (prev_x + width + offset).min(BOUNDS.width() - danger_width),
                    y: y + 5.0,
                    width: danger_width,
                    height: 15.0,
                    moving: rng.random_bool(0.3),
                });
            }
        }

        prev_x = x;
        y = 100.0 + (y - rise - 100.0).rem_euclid(450.0);
    }
    (ledges, dangers)
}

pub fn build_scene(session: &mut Session) {
    // Each level starts with a fresh player
    session.lives = STARTING_LIVES;

    let bounds = session.bounds;
    session.spawn(
        EntityBuilder::rect(
            Category::StaticObstacle,
            0.0,
            bounds.max.y - 50.0,
            bounds.width(),
            LEDGE_HEIGHT,
        )
        .revealable(REVEAL_DURATION),
    );
    session.spawn(
        EntityBuilder::rect(
            Category::StaticObstacle,
            PLAYER_START.x - 50.0,
            PLAYER_START.y + PLAYER_SIZE.y,
            100.0,
            LEDGE_HEIGHT,
        )
        .revealable(REVEAL_DURATION),
    );

    let (ledges, dangers) = match fixed_layout(session.level) {
        Some((ledges, dangers)) => (ledges.to_vec(), dangers.to_vec()),
        None => generated_layout(session),
    };

    for l in ledges {
        let builder = if l.moving {
            EntityBuilder::rect(Category::MovingObstacle, l.x, l.y, l.width, LEDGE_HEIGHT)
                .patrol(LEDGE_PATROL.0, LEDGE_PATROL.1)
        } else {
            EntityBuilder::rect(Category::StaticObstacle, l.x, l.y, l.width, LEDGE_HEIGHT)
        };
        session.spawn(builder.revealable(REVEAL_DURATION));
    }
    for d in dangers {
        let mut builder = EntityBuilder::rect(Category::Hazard, d.x, d.y, d.width, d.height)
            .revealable(REVEAL_DURATION);
        if d.moving {
            builder = builder.patrol(DANGER_PATROL.0, DANGER_PATROL.1);
        }
        session.spawn(builder);
    }

    let goal_x = session.rng().random_range(700..=900) as f32;
    let goal_y = session.rng().random_range(40..=120) as f32;
    session.spawn(
        EntityBuilder::rect(Category::Goal, goal_x, goal_y, 40.0, 60.0).revealable(REVEAL_DURATION),
    );

    session.spawn(player());
}

fn player() -> EntityBuilder {
    EntityBuilder::rect(
        Category::Player,
        PLAYER_START.x,
        PLAYER_START.y,
        PLAYER_SIZE.x,
        PLAYER_SIZE.y,
    )
    .edges(EdgePolicy::ClampX)
    .invincibility(INVINCIBILITY_TICKS)
    .light_pulse(LIGHT_DURATION)
}

/// Held keys set horizontal speed; jump only from the ground
pub fn apply_input(session: &mut Session, input: &InputSnapshot) {
    let Some(player) = session.player_mut() else {
        return;
    };

    player.vel.x = 0.0;
    if input.left {
        player.vel.x = -PLAYER_SPEED;
        player.facing_right = false;
    }
    if input.right {
        player.vel.x = PLAYER_SPEED;
        player.facing_right = true;
    }

    if !(input.jump && player.on_ground) {
        return;
    }
    player.vel.y = JUMP_STRENGTH;
    player.on_ground = false;
    player.jumping = true;
    player.pulse.arm();
    let (id, center) = (player.id, player.center());

    if let ModeState::Platformer(state) = &mut session.mode {
        state.jumps += 1;
    }
    session.emit(GameEvent::Jumped { id });
    session.burst(center, JUMP_SPARKLES, BurstStyle::Sparkle);
}

/// Falling off the bottom costs a life and respawns at the start
pub fn apply_outcome(session: &mut Session) {
    let limit = session.bounds.max.y + FALL_LIMIT;
    let Some(player) = session.player_mut() else {
        return;
    };
    if player.pos.y <= limit {
        return;
    }

    player.pos = PLAYER_START;
    player.prev_pos = PLAYER_START;
    player.vel = Vec2::ZERO;
    player.jumping = false;
    player.invincibility.arm();
    session.lives = session.lives.saturating_sub(1);
    log::debug!("player fell; {} lives left", session.lives);
}
