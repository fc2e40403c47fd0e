//! Slingshot asteroids
//!
//! The ship sits at the centre. Pressing, dragging and releasing the pointer
//! fires a bouncing projectile toward the pointer with drag-scaled speed.
//! Asteroids wrap around the screen and split in two when shot.

use glam::Vec2;
use rand::Rng;

use super::ModeState;
use crate::sim::entity::{Category, EdgePolicy, Entity, EntityBuilder};
use crate::sim::lifecycle::Bounds;
use crate::sim::state::{BurstStyle, GameEvent, Session};
use crate::sim::tick::InputSnapshot;

pub const BOUNDS: Bounds = Bounds::sized(1000.0, 700.0);
pub const SHIP_RADIUS: f32 = 30.0;
pub const PROJECTILE_RADIUS: f32 = 10.0;
pub const PROJECTILE_LIFETIME: u32 = 120;
pub const MAX_POWER: f32 = 200.0;
pub const STARTING_LIVES: u32 = 3;
pub const SHIP_HIT_BURST: u32 = 30;
const LARGEST_TIER: u8 = 3;
const AIM_JITTER: f32 = 100.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Drag {
    pub start: Vec2,
    pub end: Vec2,
}

impl Drag {
    /// Launch power: drag length, capped
    pub fn power(&self) -> f32 {
        self.start.distance(self.end).min(MAX_POWER)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AsteroidsState {
    /// Pointer drag in progress
    pub drag: Option<Drag>,
    pub destroyed: u32,
    pub quota: u32,
}

impl Default for AsteroidsState {
    fn default() -> Self {
        Self {
            drag: None,
            destroyed: 0,
            quota: quota(1),
        }
    }
}

/// Asteroids to destroy before the level is complete
pub fn quota(level: u32) -> u32 {
    if level <= 1 { 5 } else { 5 + 2 * level }
}

pub fn radius_for_tier(tier: u8) -> f32 {
    f32::from(tier) * 15.0 + 10.0
}

fn state(session: &mut Session) -> Option<&mut AsteroidsState> {
    match &mut session.mode {
        ModeState::Asteroids(state) => Some(state),
        _ => None,
    }
}

fn asteroid(x: f32, y: f32, tier: u8, vel: Vec2) -> EntityBuilder {
    EntityBuilder::circle(Category::Hazard, x, y, radius_for_tier(tier))
        .tier(tier)
        .velocity(vel.x, vel.y)
        .edges(EdgePolicy::Wrap)
}

pub fn build_scene(session: &mut Session) {
    let level = session.level;
    if let Some(state) = state(session) {
        state.drag = None;
        state.destroyed = 0;
        state.quota = quota(level);
    }

    let center = session.bounds.center();
    session.spawn(
        EntityBuilder::circle(Category::Player, center.x, center.y, SHIP_RADIUS).gravity(0.0),
    );
    spawn_wave(session, 3 + level);
}

/// Largest-tier asteroids entering from a random edge, aimed near the centre
pub fn spawn_wave(session: &mut Session, count: u32) {
    let bounds = session.bounds;
    let radius = radius_for_tier(LARGEST_TIER);

    for _ in 0..count {
        let rng = session.rng();
        let pos = match rng.random_range(0..4) {
            0 => Vec2::new(rng.random_range(0.0..=bounds.max.x), bounds.min.y - radius),
            1 => Vec2::new(bounds.max.x + radius, rng.random_range(0.0..=bounds.max.y)),
            2 => Vec2::new(rng.random_range(0.0..=bounds.max.x), bounds.max.y + radius),
            _ => Vec2::new(bounds.min.x - radius, rng.random_range(0.0..=bounds.max.y)),
        };
        let jitter = Vec2::new(
            rng.random_range(-AIM_JITTER..=AIM_JITTER),
            rng.random_range(-AIM_JITTER..=AIM_JITTER),
        );
        let heading = (bounds.center() + jitter - pos).normalize_or_zero();
        let speed = rng.random_range(1.0..=3.0) / f32::from(LARGEST_TIER);
        session.spawn(asteroid(pos.x, pos.y, LARGEST_TIER, heading * speed));
    }
}

/// Press starts a drag, movement extends it, release fires
pub fn apply_input(session: &mut Session, input: &InputSnapshot) {
    let Some(state) = state(session) else {
        return;
    };

    if let Some(pointer) = input.pointer {
        match state.drag.as_mut() {
            Some(drag) => drag.end = pointer,
            None if input.pointer_pressed => {
                state.drag = Some(Drag {
                    start: pointer,
                    end: pointer,
                })
            }
            None => {}
        }
    }

    if !input.pointer_released {
        return;
    }
    if let Some(drag) = state.drag.take() {
        fire(session, drag);
    }
}

fn fire(session: &mut Session, drag: Drag) {
    let Some(ship) = session.player() else {
        return;
    };
    let origin = ship.center();
    let aim = (drag.end - origin).try_normalize().unwrap_or(Vec2::X);
    let vel = aim * (drag.power() * 0.1 + 5.0);

    let id = session.spawn(
        EntityBuilder::circle(Category::Projectile, origin.x, origin.y, PROJECTILE_RADIUS)
            .velocity(vel.x, vel.y)
            .edges(EdgePolicy::Bounce)
            .lifetime(PROJECTILE_LIFETIME)
            .cull_margin(0.0),
    );
    if let Some(id) = id {
        session.emit(GameEvent::ProjectileFired { id });
    }
}

/// A fresh wave when the field has been cleared before the quota
pub fn run_spawners(session: &mut Session) {
    if session.count(Category::Hazard) == 0 {
        log::debug!("asteroid field empty, spawning a new wave");
        spawn_wave(session, 3 + session.level);
    }
}

pub fn apply_outcome(session: &mut Session, outcome: &crate::sim::collision::Outcome) {
    if let Some(state) = state(session) {
        state.destroyed += outcome.targets_destroyed;
    }
}

/// Shot-down asteroids burst and split; ones that rammed the ship just vanish
pub fn on_expire(session: &mut Session, expired: Vec<Entity>) {
    for rock in expired
        .into_iter()
        .filter(|e| e.category == Category::Hazard && e.health <= 0)
    {
        let at = rock.center();
        session.burst(at, u32::from(rock.tier) * 10, BurstStyle::Explosion);
        if rock.tier <= 1 {
            continue;
        }

        let tier = rock.tier - 1;
        let base = session.rng().random_range(0.0..std::f32::consts::TAU);
        for i in 0..2 {
            let heading = crate::direction_from_angle(base + i as f32 * std::f32::consts::PI);
            let speed = session.rng().random_range(1.0..=3.0) / f32::from(tier);
            session.spawn(asteroid(at.x, at.y, tier, heading * speed));
        }
    }
}
