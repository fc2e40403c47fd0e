//! Collision detection and table-driven response
//!
//! Detection uses strict inequalities everywhere: boxes that only share an
//! edge, or circles that only touch, do not collide. Resting contact still
//! works because gravity pushes a grounded player into the surface each tick.
//!
//! Responses are looked up per category pair in a [`ResponseTable`] and are
//! resolved in fixed stages (terrain, hazards, projectiles, pickups) so one
//! stage can never invalidate the result of an earlier one.

use std::collections::HashMap;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::entity::{Category, Entity, Shape};
use super::state::GameEvent;
use crate::consts::{KNOCKBACK_X, KNOCKBACK_Y, LAND_TOLERANCE};

/// Axis-aligned bounding box
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Aabb {
    pub min: Vec2,
    pub max: Vec2,
}

impl Aabb {
    pub const fn new(min: Vec2, max: Vec2) -> Self {
        Self { min, max }
    }

    /// Strict overlap: touching edges do not count
    #[inline]
    pub fn overlaps(&self, other: &Aabb) -> bool {
        self.min.x < other.max.x
            && self.max.x > other.min.x
            && self.min.y < other.max.y
            && self.max.y > other.min.y
    }

    /// Closest point inside the box to `p`
    #[inline]
    pub fn closest_point(&self, p: Vec2) -> Vec2 {
        p.clamp(self.min, self.max)
    }
}

/// Shape-aware intersection test between two entities
pub fn detect(a: &Entity, b: &Entity) -> bool {
    match (a.shape, b.shape) {
        (Shape::Rect { .. }, Shape::Rect { .. }) => a.aabb().overlaps(&b.aabb()),
        (Shape::Circle { radius: ra }, Shape::Circle { radius: rb }) => {
            let combined = ra + rb;
            a.pos.distance_squared(b.pos) < combined * combined
        }
        (Shape::Circle { radius }, Shape::Rect { .. }) => circle_rect(a.pos, radius, &b.aabb()),
        (Shape::Rect { .. }, Shape::Circle { radius }) => circle_rect(b.pos, radius, &a.aabb()),
    }
}

fn circle_rect(center: Vec2, radius: f32, rect: &Aabb) -> bool {
    let closest = rect.closest_point(center);
    center.distance_squared(closest) < radius * radius
}

/// How a player reacts to touching a hazard
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HurtPolicy {
    /// Velocity applied on hit; x points away from the hazard centre
    pub knockback: Option<Vec2>,
    /// Start the player's invincibility window
    pub arm_invincibility: bool,
    /// Remove the hazard that landed the hit
    pub destroy_hazard: bool,
    /// Particles to burst at the player
    pub burst: u32,
}

impl HurtPolicy {
    /// Platformer danger zones: knock back and grant invincibility
    pub const fn knockback() -> Self {
        Self {
            knockback: Some(Vec2::new(KNOCKBACK_X, KNOCKBACK_Y)),
            arm_invincibility: true,
            destroy_hazard: false,
            burst: 0,
        }
    }

    /// The hazard is consumed by the hit
    pub const fn absorb(burst: u32) -> Self {
        Self {
            knockback: None,
            arm_invincibility: false,
            destroy_hazard: true,
            burst,
        }
    }

    /// Plain damage, nothing else
    pub const fn damage() -> Self {
        Self {
            knockback: None,
            arm_invincibility: false,
            destroy_hazard: false,
            burst: 0,
        }
    }
}

/// Response to a detected collision between two categories
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Response {
    /// Stop downward motion and stand on the obstacle's top
    Land,
    /// Land and carry along the obstacle's per-tick displacement
    Ride,
    /// Lose a life unless invincible
    Hurt(HurtPolicy),
    /// Level complete
    ReachGoal,
    /// Destroy the projectile, damage the target, score per target tier
    Shatter { score_per_tier: u64 },
    /// Destroy the consumable, grow and score
    Consume { score: u64, growth: u32 },
}

/// Category-pair response lookup
#[derive(Debug, Clone, Default)]
pub struct ResponseTable {
    entries: HashMap<(Category, Category), Response>,
}

impl ResponseTable {
    /// Empty table (nothing responds)
    pub fn new() -> Self {
        Self::default()
    }

    /// The shared policy every game starts from
    pub fn standard() -> Self {
        let shatter = Response::Shatter {
            score_per_tier: 100,
        };
        Self::new()
            .with(Category::Player, Category::StaticObstacle, Response::Land)
            .with(Category::Player, Category::MovingObstacle, Response::Ride)
            .with(
                Category::Player,
                Category::Hazard,
                Response::Hurt(HurtPolicy::knockback()),
            )
            .with(Category::Player, Category::Goal, Response::ReachGoal)
            .with(Category::Projectile, Category::Hazard, shatter)
            .with(Category::Projectile, Category::StaticObstacle, shatter)
            .with(Category::Projectile, Category::MovingObstacle, shatter)
            .with(
                Category::Consumable,
                Category::Player,
                Response::Consume {
                    score: 1,
                    growth: 1,
                },
            )
    }

    /// Insert or replace an entry
    pub fn with(mut self, a: Category, b: Category, response: Response) -> Self {
        self.entries.insert((a, b), response);
        self
    }

    pub fn remove(mut self, a: Category, b: Category) -> Self {
        self.entries.remove(&(a, b));
        self
    }

    pub fn lookup(&self, a: Category, b: Category) -> Option<Response> {
        self.entries.get(&(a, b)).copied()
    }
}

/// Accumulated effects of one tick's collision resolution
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Outcome {
    pub lives_lost: u32,
    pub score: u64,
    pub growth: u32,
    pub goal_reached: bool,
    pub targets_destroyed: u32,
    /// Particle bursts to spawn: (position, count)
    pub bursts: Vec<(Vec2, u32)>,
    pub events: Vec<GameEvent>,
}

/// Borrow two distinct entities mutably
fn pair_mut(entities: &mut [Entity], i: usize, j: usize) -> (&mut Entity, &mut Entity) {
    debug_assert_ne!(i, j);
    if i < j {
        let (lo, hi) = entities.split_at_mut(j);
        (&mut lo[i], &mut hi[0])
    } else {
        let (lo, hi) = entities.split_at_mut(i);
        (&mut hi[0], &mut lo[j])
    }
}

fn indices_of(entities: &[Entity], category: Category) -> Vec<usize> {
    entities
        .iter()
        .enumerate()
        .filter(|(_, e)| e.category == category && !e.destroyed)
        .map(|(i, _)| i)
        .collect()
}

/// Player vs terrain: land on (and ride) obstacles
pub fn resolve_terrain(entities: &mut [Entity], table: &ResponseTable, outcome: &mut Outcome) {
    for p in indices_of(entities, Category::Player) {
        entities[p].on_ground = false;
        let mut carry: Option<Vec2> = None;

        for o in 0..entities.len() {
            if o == p {
                continue;
            }
            let response = match table.lookup(Category::Player, entities[o].category) {
                Some(r @ (Response::Land | Response::Ride)) => r,
                _ => continue,
            };
            let (player, obstacle) = pair_mut(entities, p, o);
            if obstacle.destroyed || player.vel.y <= 0.0 || !detect(player, obstacle) {
                continue;
            }
            let top = obstacle.aabb().min.y;
            let bottom = player.aabb().max.y;
            // Deep contacts only count when the surface was crossed this tick
            let prev_bottom = bottom - player.displacement().y;
            if bottom - top > LAND_TOLERANCE && prev_bottom > top {
                continue;
            }

            player.set_bottom(top);
            player.vel.y = 0.0;
            player.on_ground = true;
            if player.jumping {
                player.jumping = false;
                outcome.events.push(GameEvent::Landed { id: player.id });
                let feet = Vec2::new(player.center().x, top);
                outcome.bursts.push((feet, 10));
            }
            if response == Response::Ride {
                carry = Some(obstacle.displacement());
            }
        }

        if let Some(dx) = carry {
            entities[p].pos.x += dx.x;
        }
    }
}

/// Player vs hazards, then player vs goal
pub fn resolve_hazards(entities: &mut [Entity], table: &ResponseTable, outcome: &mut Outcome) {
    for p in indices_of(entities, Category::Player) {
        for h in 0..entities.len() {
            if h == p {
                continue;
            }
            let Some(Response::Hurt(policy)) = table.lookup(Category::Player, entities[h].category)
            else {
                continue;
            };
            let (player, hazard) = pair_mut(entities, p, h);
            if hazard.destroyed || player.is_invincible() || !detect(player, hazard) {
                continue;
            }

            outcome.lives_lost += 1;
            if let Some(knockback) = policy.knockback {
                let away = if player.center().x < hazard.center().x {
                    -1.0
                } else {
                    1.0
                };
                player.vel = Vec2::new(knockback.x * away, knockback.y);
                player.on_ground = false;
            }
            if policy.arm_invincibility {
                player.invincibility.arm();
            }
            if policy.destroy_hazard {
                hazard.destroyed = true;
            }
            if policy.burst > 0 {
                outcome.bursts.push((player.center(), policy.burst));
            }
            outcome.events.push(GameEvent::HazardHit {
                player: player.id,
                hazard: hazard.id,
            });

            if player.is_invincible() {
                break;
            }
        }

        for g in 0..entities.len() {
            if g == p || table.lookup(Category::Player, entities[g].category) != Some(Response::ReachGoal) {
                continue;
            }
            if detect(&entities[p], &entities[g]) {
                outcome.goal_reached = true;
                outcome.events.push(GameEvent::GoalReached);
                break;
            }
        }
    }
}

/// Projectiles vs targets: one target per projectile per tick
pub fn resolve_projectiles(entities: &mut [Entity], table: &ResponseTable, outcome: &mut Outcome) {
    for s in indices_of(entities, Category::Projectile) {
        for t in 0..entities.len() {
            if t == s {
                continue;
            }
            let Some(Response::Shatter { score_per_tier }) =
                table.lookup(Category::Projectile, entities[t].category)
            else {
                continue;
            };
            let (shot, target) = pair_mut(entities, s, t);
            if target.destroyed || target.health <= 0 || !detect(shot, target) {
                continue;
            }

            shot.destroyed = true;
            target.health -= 1;
            if target.health <= 0 {
                outcome.score += score_per_tier * u64::from(target.tier.max(1));
                outcome.targets_destroyed += 1;
                outcome.events.push(GameEvent::TargetDestroyed {
                    id: target.id,
                    tier: target.tier,
                });
            }
            break;
        }
    }
}

/// Consumables vs whoever may eat them
pub fn resolve_pickups(entities: &mut [Entity], table: &ResponseTable, outcome: &mut Outcome) {
    for c in indices_of(entities, Category::Consumable) {
        for e in 0..entities.len() {
            if e == c {
                continue;
            }
            let Some(Response::Consume { score, growth }) =
                table.lookup(Category::Consumable, entities[e].category)
            else {
                continue;
            };
            let (food, eater) = pair_mut(entities, c, e);
            if eater.destroyed || !detect(food, eater) {
                continue;
            }

            food.destroyed = true;
            outcome.score += score;
            outcome.growth += growth;
            outcome.events.push(GameEvent::Consumed {
                id: food.id,
                by: eater.id,
            });
            break;
        }
    }
}

/// Run every stage in the fixed order: terrain, hazards, projectiles, pickups
pub fn resolve_all(entities: &mut [Entity], table: &ResponseTable) -> Outcome {
    let mut outcome = Outcome::default();
    resolve_terrain(entities, table, &mut outcome);
    resolve_hazards(entities, table, &mut outcome);
    resolve_projectiles(entities, table, &mut outcome);
    resolve_pickups(entities, table, &mut outcome);
    log::trace!("collision outcome: {:?}", outcome);
    outcome
}
