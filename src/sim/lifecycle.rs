//! Entity lifecycle: integration, edge handling and single-pass retirement
//!
//! Expired entities are partitioned out in one pass and handed back to the
//! owner, which runs their on-expire effects (splitting, bursts, replacement
//! food) before dropping them.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::collision::Aabb;
use super::entity::Entity;
use super::timer;

/// Rectangular world extent
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub min: Vec2,
    pub max: Vec2,
}

impl Bounds {
    pub const fn new(min_x: f32, min_y: f32, max_x: f32, max_y: f32) -> Self {
        Self {
            min: Vec2::new(min_x, min_y),
            max: Vec2::new(max_x, max_y),
        }
    }

    /// Arena of the given size anchored at the origin
    pub const fn sized(width: f32, height: f32) -> Self {
        Self::new(0.0, 0.0, width, height)
    }

    #[inline]
    pub fn width(&self) -> f32 {
        self.max.x - self.min.x
    }

    #[inline]
    pub fn height(&self) -> f32 {
        self.max.y - self.min.y
    }

    #[inline]
    pub fn center(&self) -> Vec2 {
        (self.min + self.max) * 0.5
    }

    /// True when `aabb` lies entirely beyond some edge by more than `margin`
    pub fn is_outside(&self, aabb: &Aabb, margin: f32) -> bool {
        aabb.max.x < self.min.x - margin
            || aabb.min.x > self.max.x + margin
            || aabb.max.y < self.min.y - margin
            || aabb.min.y > self.max.y + margin
    }
}

/// Advance every entity by one tick and apply its edge policy
pub fn integrate(entities: &mut [Entity], dt: f32, bounds: &Bounds) {
    for entity in entities.iter_mut() {
        entity.advance(dt);
        entity.apply_edges(bounds);
    }
}

/// Tick every entity's countdowns
pub fn tick_timers(entities: &mut [Entity]) {
    for entity in entities.iter_mut() {
        timer::tick(entity);
    }
}

/// Remove expired entities in a single pass, preserving survivor order.
/// Returns the expired set.
pub fn retire(entities: &mut Vec<Entity>, bounds: &Bounds) -> Vec<Entity> {
    let (expired, survivors): (Vec<Entity>, Vec<Entity>) = std::mem::take(entities)
        .into_iter()
        .partition(|e| e.is_expired(bounds));
    *entities = survivors;
    if !expired.is_empty() {
        log::trace!("retired {} entities", expired.len());
    }
    expired
}

/// One full lifecycle step: timers, integration, then retirement
pub fn step(entities: &mut Vec<Entity>, dt: f32, bounds: &Bounds) -> Vec<Entity> {
    tick_timers(entities);
    integrate(entities, dt, bounds);
    retire(entities, bounds)
}
