//! Entities and their construction
//!
//! Every simulated object (player, platform, danger, asteroid, projectile,
//! star, food, snake segment, particle) is an [`Entity`] tagged with a
//! [`Category`] fixed at construction. Behaviour that differs between
//! categories is looked up from the tag, never probed at runtime.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::collision::Aabb;
use super::lifecycle::Bounds;
use super::timer::Countdown;
use crate::consts::{GRAVITY, PARTICLE_GRAVITY};
use crate::error::EntityError;

/// Stable entity identifier, allocated in increasing order by the session
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EntityId(pub u32);

/// Physics and collision-response category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    Player,
    StaticObstacle,
    MovingObstacle,
    Hazard,
    Consumable,
    Projectile,
    Goal,
    DecorativeParticle,
}

impl Category {
    /// Uniform downward acceleration applied by default
    pub fn default_gravity(self) -> f32 {
        match self {
            Category::Player => GRAVITY,
            Category::DecorativeParticle => PARTICLE_GRAVITY,
            _ => 0.0,
        }
    }

    /// Whether this category takes part in gameplay (particles are visual only)
    pub fn is_gameplay(self) -> bool {
        self != Category::DecorativeParticle
    }
}

/// Collision shape. Rectangles are anchored at their top-left corner,
/// circles at their centre.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Shape {
    Rect { size: Vec2 },
    Circle { radius: f32 },
}

/// Horizontal back-and-forth motion around the spawn position
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Patrol {
    pub origin_x: f32,
    pub range: f32,
}

/// What happens when an entity reaches the edge of the world
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum EdgePolicy {
    /// Free to leave (may be culled or fall off)
    #[default]
    None,
    /// Kept within the horizontal extent
    ClampX,
    /// Reappears on the opposite side once fully off-screen
    Wrap,
    /// Velocity component reflected at the walls
    Bounce,
}

/// A simulated object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    pub id: EntityId,
    pub category: Category,
    pub pos: Vec2,
    /// Position before the last `advance` (for inherited displacement)
    pub prev_pos: Vec2,
    pub vel: Vec2,
    pub shape: Shape,
    pub gravity: f32,
    pub patrol: Option<Patrol>,
    pub edges: EdgePolicy,
    /// Retire once fully outside the world by more than this margin
    pub cull_margin: Option<f32>,
    pub health: i32,
    /// Split generation (asteroid size); children get `tier - 1`
    pub tier: u8,
    /// Explicit removal request, honoured at the end of the tick
    pub destroyed: bool,
    pub on_ground: bool,
    pub jumping: bool,
    pub facing_right: bool,
    pub reveal: Countdown,
    pub invincibility: Countdown,
    /// Light pulse emitted by a jumping player
    pub pulse: Countdown,
    pub lifetime: Option<Countdown>,
}

impl Entity {
    /// Axis-aligned bounding box
    pub fn aabb(&self) -> Aabb {
        match self.shape {
            Shape::Rect { size } => Aabb::new(self.pos, self.pos + size),
            Shape::Circle { radius } => {
                let r = Vec2::splat(radius);
                Aabb::new(self.pos - r, self.pos + r)
            }
        }
    }

    pub fn center(&self) -> Vec2 {
        match self.shape {
            Shape::Rect { size } => self.pos + size * 0.5,
            Shape::Circle { .. } => self.pos,
        }
    }

    /// Full extent (diameter for circles)
    pub fn size(&self) -> Vec2 {
        match self.shape {
            Shape::Rect { size } => size,
            Shape::Circle { radius } => Vec2::splat(radius * 2.0),
        }
    }

    /// Movement during the last `advance`
    #[inline]
    pub fn displacement(&self) -> Vec2 {
        self.pos - self.prev_pos
    }

    /// Place the entity so its bottom edge sits at `y`
    pub fn set_bottom(&mut self, y: f32) {
        self.pos.y = match self.shape {
            Shape::Rect { size } => y - size.y,
            Shape::Circle { radius } => y - radius,
        };
    }

    /// Move so the centre lands on `center`
    pub fn set_center(&mut self, center: Vec2) {
        self.pos += center - self.center();
    }

    #[inline]
    pub fn revealed(&self) -> bool {
        self.reveal.is_active()
    }

    #[inline]
    pub fn is_invincible(&self) -> bool {
        self.invincibility.is_active()
    }

    pub fn lifetime_exhausted(&self) -> bool {
        self.lifetime.is_some_and(|l| !l.is_active())
    }

    /// Integrate one step: gravity into velocity, velocity into position,
    /// then patrol reversal.
    pub fn advance(&mut self, dt: f32) {
        self.prev_pos = self.pos;
        self.vel.y += self.gravity * dt;
        self.pos += self.vel * dt;

        if let Some(patrol) = self.patrol {
            if self.vel.x > 0.0 && self.pos.x >= patrol.origin_x + patrol.range {
                self.vel.x = -self.vel.x;
            } else if self.vel.x < 0.0 && self.pos.x <= patrol.origin_x - patrol.range {
                self.vel.x = -self.vel.x;
            }
        }
    }

    /// Apply the edge policy against the world bounds
    pub fn apply_edges(&mut self, bounds: &Bounds) {
        match self.edges {
            EdgePolicy::None => {}
            EdgePolicy::ClampX => {
                let aabb = self.aabb();
                if aabb.min.x < bounds.min.x {
                    self.pos.x += bounds.min.x - aabb.min.x;
                } else if aabb.max.x > bounds.max.x {
                    self.pos.x -= aabb.max.x - bounds.max.x;
                }
            }
            EdgePolicy::Wrap => {
                let half = self.size() * 0.5;
                let mut c = self.center();
                if c.x < bounds.min.x - half.x {
                    c.x = bounds.max.x + half.x;
                } else if c.x > bounds.max.x + half.x {
                    c.x = bounds.min.x - half.x;
                }
                if c.y < bounds.min.y - half.y {
                    c.y = bounds.max.y + half.y;
                } else if c.y > bounds.max.y + half.y {
                    c.y = bounds.min.y - half.y;
                }
                self.set_center(c);
            }
            EdgePolicy::Bounce => {
                let aabb = self.aabb();
                if (aabb.min.x < bounds.min.x && self.vel.x < 0.0)
                    || (aabb.max.x > bounds.max.x && self.vel.x > 0.0)
                {
                    self.vel.x = -self.vel.x;
                }
                if (aabb.min.y < bounds.min.y && self.vel.y < 0.0)
                    || (aabb.max.y > bounds.max.y && self.vel.y > 0.0)
                {
                    self.vel.y = -self.vel.y;
                }
            }
        }
    }

    /// Removal condition: destroyed, out of health, lifetime spent, or culled off-screen
    pub fn is_expired(&self, bounds: &Bounds) -> bool {
        self.destroyed
            || self.health <= 0
            || self.lifetime_exhausted()
            || self
                .cull_margin
                .is_some_and(|margin| bounds.is_outside(&self.aabb(), margin))
    }
}

/// Validating constructor for [`Entity`]
#[derive(Debug, Clone)]
pub struct EntityBuilder {
    category: Category,
    pos: Vec2,
    vel: Vec2,
    shape: Shape,
    gravity: Option<f32>,
    patrol_range: Option<f32>,
    edges: EdgePolicy,
    cull_margin: Option<f32>,
    health: i32,
    tier: u8,
    reveal: u32,
    invincibility: u32,
    pulse: u32,
    lifetime: Option<u32>,
}

impl EntityBuilder {
    fn with_shape(category: Category, pos: Vec2, shape: Shape) -> Self {
        Self {
            category,
            pos,
            vel: Vec2::ZERO,
            shape,
            gravity: None,
            patrol_range: None,
            edges: EdgePolicy::None,
            cull_margin: None,
            health: 1,
            tier: 0,
            reveal: 0,
            invincibility: 0,
            pulse: 0,
            lifetime: None,
        }
    }

    /// Rectangle with its top-left corner at (x, y)
    pub fn rect(category: Category, x: f32, y: f32, width: f32, height: f32) -> Self {
        Self::with_shape(
            category,
            Vec2::new(x, y),
            Shape::Rect {
                size: Vec2::new(width, height),
            },
        )
    }

    /// Circle centred at (x, y)
    pub fn circle(category: Category, x: f32, y: f32, radius: f32) -> Self {
        Self::with_shape(category, Vec2::new(x, y), Shape::Circle { radius })
    }

    pub fn velocity(mut self, vx: f32, vy: f32) -> Self {
        self.vel = Vec2::new(vx, vy);
        self
    }

    /// Override the category's default gravity
    pub fn gravity(mut self, gravity: f32) -> Self {
        self.gravity = Some(gravity);
        self
    }

    /// Patrol ±`range` around the spawn x at `speed` pixels/tick, starting rightwards
    pub fn patrol(mut self, range: f32, speed: f32) -> Self {
        self.patrol_range = Some(range);
        self.vel.x = speed;
        self
    }

    pub fn edges(mut self, edges: EdgePolicy) -> Self {
        self.edges = edges;
        self
    }

    pub fn cull_margin(mut self, margin: f32) -> Self {
        self.cull_margin = Some(margin);
        self
    }

    pub fn health(mut self, health: i32) -> Self {
        self.health = health;
        self
    }

    pub fn tier(mut self, tier: u8) -> Self {
        self.tier = tier;
        self
    }

    /// Reveal window length when lit by a light pulse
    pub fn revealable(mut self, ticks: u32) -> Self {
        self.reveal = ticks;
        self
    }

    pub fn invincibility(mut self, ticks: u32) -> Self {
        self.invincibility = ticks;
        self
    }

    pub fn light_pulse(mut self, ticks: u32) -> Self {
        self.pulse = ticks;
        self
    }

    /// Retire after `ticks` updates
    pub fn lifetime(mut self, ticks: u32) -> Self {
        self.lifetime = Some(ticks);
        self
    }

    pub fn build(self, id: EntityId) -> Result<Entity, EntityError> {
        if !self.pos.is_finite() {
            return Err(EntityError::InvalidPosition {
                x: self.pos.x,
                y: self.pos.y,
            });
        }
        if !self.vel.is_finite() {
            return Err(EntityError::InvalidVelocity {
                x: self.vel.x,
                y: self.vel.y,
            });
        }
        match self.shape {
            Shape::Rect { size } => {
                if !(size.is_finite() && size.x > 0.0 && size.y > 0.0) {
                    return Err(EntityError::InvalidSize {
                        width: size.x,
                        height: size.y,
                    });
                }
            }
            Shape::Circle { radius } => {
                if !(radius.is_finite() && radius > 0.0) {
                    return Err(EntityError::InvalidRadius(radius));
                }
            }
        }

        Ok(Entity {
            id,
            category: self.category,
            pos: self.pos,
            prev_pos: self.pos,
            vel: self.vel,
            shape: self.shape,
            gravity: self
                .gravity
                .unwrap_or_else(|| self.category.default_gravity()),
            patrol: self.patrol_range.map(|range| Patrol {
                origin_x: self.pos.x,
                range,
            }),
            edges: self.edges,
            cull_margin: self.cull_margin,
            health: self.health,
            tier: self.tier,
            destroyed: false,
            on_ground: false,
            jumping: false,
            facing_right: true,
            reveal: Countdown::new(self.reveal),
            invincibility: Countdown::new(self.invincibility),
            pulse: Countdown::new(self.pulse),
            lifetime: self.lifetime.map(Countdown::armed),
        })
    }
}
