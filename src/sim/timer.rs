//! Timed-state tracking
//!
//! Transient states (reveal window, invincibility, light pulse, particle
//! lifetime, AI thinking delay) are driven by tick countdowns. The state flag
//! is *derived* from the countdown, so it clears in the same call that
//! decrements the countdown to zero.

use serde::{Deserialize, Serialize};

use super::entity::Entity;

/// A countdown in simulation ticks with a configured maximum
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Countdown {
    remaining: u32,
    max: u32,
}

impl Countdown {
    /// Idle countdown that arms to `max`
    pub const fn new(max: u32) -> Self {
        Self { remaining: 0, max }
    }

    /// Countdown already running from `max`
    pub const fn armed(max: u32) -> Self {
        Self { remaining: max, max }
    }

    /// (Re)start from the configured maximum. Never accumulates.
    pub fn arm(&mut self) {
        self.remaining = self.max;
    }

    /// Change the maximum and restart from it
    pub fn arm_for(&mut self, max: u32) {
        self.max = max;
        self.remaining = max;
    }

    /// Stop without waiting for expiry
    pub fn clear(&mut self) {
        self.remaining = 0;
    }

    /// Decrement by one tick. Returns true only on the call that reaches zero.
    pub fn tick(&mut self) -> bool {
        if self.remaining == 0 {
            return false;
        }
        self.remaining -= 1;
        self.remaining == 0
    }

    #[inline]
    pub fn is_active(&self) -> bool {
        self.remaining > 0
    }

    #[inline]
    pub fn remaining(&self) -> u32 {
        self.remaining
    }

    #[inline]
    pub fn max(&self) -> u32 {
        self.max
    }
}

/// Advance every countdown an entity carries by exactly one tick
pub fn tick(entity: &mut Entity) {
    entity.reveal.tick();
    entity.invincibility.tick();
    entity.pulse.tick();
    if let Some(lifetime) = entity.lifetime.as_mut() {
        lifetime.tick();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::entity::{Category, EntityBuilder, EntityId};
    use proptest::prelude::*;

    #[test]
    fn test_countdown_expires_on_zero() {
        let mut c = Countdown::armed(2);
        assert!(c.is_active());
        assert!(!c.tick());
        assert!(c.is_active());
        assert!(c.tick());
        assert!(!c.is_active());
        // Idle countdowns stay idle
        assert!(!c.tick());
        assert_eq!(c.remaining(), 0);
    }

    #[test]
    fn test_rearm_resets_instead_of_accumulating() {
        let mut c = Countdown::new(30);
        c.arm();
        for _ in 0..10 {
            c.tick();
        }
        assert_eq!(c.remaining(), 20);
        c.arm();
        assert_eq!(c.remaining(), 30);
        c.arm();
        assert_eq!(c.remaining(), 30);
    }

    #[test]
    fn test_flag_clears_in_same_tick() {
        let mut entity = EntityBuilder::rect(Category::StaticObstacle, 0.0, 0.0, 10.0, 10.0)
            .revealable(1)
            .build(EntityId(1))
            .expect("valid entity");
        entity.reveal.arm();
        assert!(entity.revealed());
        tick(&mut entity);
        assert!(!entity.revealed());
    }

    #[test]
    fn test_invincibility_window_length() {
        let mut entity = EntityBuilder::rect(Category::Player, 0.0, 0.0, 30.0, 40.0)
            .invincibility(90)
            .build(EntityId(1))
            .expect("valid entity");
        entity.invincibility.arm();
        for _ in 0..89 {
            tick(&mut entity);
            assert!(entity.is_invincible());
        }
        tick(&mut entity);
        assert!(!entity.is_invincible());
    }

    #[test]
    fn test_lifetime_ticks() {
        let mut entity = EntityBuilder::circle(Category::DecorativeParticle, 0.0, 0.0, 2.0)
            .lifetime(1)
            .build(EntityId(1))
            .expect("valid entity");
        assert!(!entity.lifetime_exhausted());
        tick(&mut entity);
        assert!(entity.lifetime_exhausted());
    }

    proptest! {
        #[test]
        fn prop_arm_never_exceeds_max(max in 1u32..500, ticks in 0u32..1000, rearms in 1usize..5) {
            let mut c = Countdown::new(max);
            for _ in 0..rearms {
                c.arm();
                for _ in 0..ticks {
                    c.tick();
                }
            }
            c.arm();
            prop_assert_eq!(c.remaining(), max);
        }

        #[test]
        fn prop_expiry_after_exactly_max_ticks(max in 1u32..500) {
            let mut c = Countdown::armed(max);
            let mut expired_at = None;
            for i in 1..=max {
                if c.tick() {
                    expired_at = Some(i);
                }
            }
            prop_assert_eq!(expired_at, Some(max));
            prop_assert!(!c.is_active());
        }
    }
}
