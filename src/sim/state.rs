//! Session state and core simulation types
//!
//! A [`Session`] owns everything one running game needs: the entity list,
//! counters, phase, RNG and the collision policy. It is passed explicitly to
//! every update; nothing is process-global.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::collision::ResponseTable;
use super::entity::{Category, Entity, EntityBuilder, EntityId};
use super::lifecycle::Bounds;
use super::timer::Countdown;
use crate::consts::MAX_PARTICLES;
use crate::games::{self, ModeState};

/// Current phase of the frame loop
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Active gameplay
    Playing,
    /// Goal reached / quota met, waiting for a delay or "next"
    LevelComplete,
    /// Short hand-off before the next level starts
    Transition,
    /// Lives exhausted
    GameOver,
}

/// One-shot notifications for the presentation collaborator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    Jumped { id: EntityId },
    Landed { id: EntityId },
    HazardHit { player: EntityId, hazard: EntityId },
    GoalReached,
    ProjectileFired { id: EntityId },
    TargetDestroyed { id: EntityId, tier: u8 },
    Consumed { id: EntityId, by: EntityId },
    LevelComplete { level: u32 },
    LevelStarted { level: u32 },
    GameOver { score: u64 },
    Restarted,
}

/// Which arcade game the session runs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GameKind {
    #[default]
    Platformer,
    Dodge,
    Asteroids,
    Snake,
}

/// Phase transition rules for a game
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PhaseRules {
    /// Ticks spent in LevelComplete before the transition starts
    pub level_complete_delay: Option<u32>,
    /// Ticks spent in Transition before the next level
    pub transition_ticks: u32,
    /// "Next" input skips straight to the next level
    pub next_input: bool,
    /// Ticks spent in GameOver before an automatic restart
    pub game_over_delay: Option<u32>,
    /// Restart input is honoured outside GameOver
    pub mid_play_restart: bool,
}

/// How particle bursts move
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BurstStyle {
    /// Upward spray that falls back under light gravity
    Sparkle,
    /// Radial spray, no gravity
    Explosion,
}

impl GameKind {
    pub fn name(self) -> &'static str {
        match self {
            GameKind::Platformer => "platformer",
            GameKind::Dodge => "dodge",
            GameKind::Asteroids => "asteroids",
            GameKind::Snake => "snake",
        }
    }

    pub fn rules(self) -> PhaseRules {
        match self {
            GameKind::Platformer => PhaseRules {
                level_complete_delay: Some(120),
                transition_ticks: 60,
                next_input: true,
                game_over_delay: Some(180),
                mid_play_restart: true,
            },
            GameKind::Dodge => PhaseRules {
                level_complete_delay: None,
                transition_ticks: 0,
                next_input: false,
                game_over_delay: Some(240),
                mid_play_restart: false,
            },
            GameKind::Asteroids => PhaseRules {
                level_complete_delay: None,
                transition_ticks: 0,
                next_input: true,
                game_over_delay: None,
                mid_play_restart: false,
            },
            GameKind::Snake => PhaseRules {
                level_complete_delay: None,
                transition_ticks: 0,
                next_input: false,
                game_over_delay: None,
                mid_play_restart: false,
            },
        }
    }

    pub fn burst_style(self) -> BurstStyle {
        match self {
            GameKind::Platformer => BurstStyle::Sparkle,
            _ => BurstStyle::Explosion,
        }
    }
}

/// Read-only per-tick snapshot for the presentation collaborator
#[derive(Debug, Clone, Copy)]
pub struct FrameView<'a> {
    pub kind: GameKind,
    pub phase: GamePhase,
    pub level: u32,
    pub lives: u32,
    pub score: u64,
    pub time_ticks: u64,
    pub bounds: Bounds,
    pub entities: &'a [Entity],
    pub mode: &'a ModeState,
}

/// Complete session state (deterministic for a given seed and input sequence)
#[derive(Debug, Clone)]
pub struct Session {
    /// Run seed for reproducibility
    pub seed: u64,
    pub kind: GameKind,
    pub phase: GamePhase,
    /// Delay for the current non-playing phase
    pub phase_timer: Countdown,
    /// Delays and input rules for phase changes, from `GameKind::rules`
    pub phase_rules: PhaseRules,
    pub level: u32,
    pub lives: u32,
    pub score: u64,
    /// Simulation tick counter
    pub time_ticks: u64,
    pub bounds: Bounds,
    /// Live entities, ascending by id
    pub entities: Vec<Entity>,
    pub responses: ResponseTable,
    /// Per-game bookkeeping
    pub mode: ModeState,
    /// Decorative particle cap
    pub max_particles: usize,
    events: Vec<GameEvent>,
    rng: Pcg32,
    next_id: u32,
}

impl Session {
    /// Create a session for `kind` and build its first level
    pub fn new(kind: GameKind, seed: u64) -> Self {
        let mut session = Self {
            seed,
            kind,
            phase: GamePhase::Playing,
            phase_timer: Countdown::default(),
            phase_rules: kind.rules(),
            level: 1,
            lives: 0,
            score: 0,
            time_ticks: 0,
            bounds: games::bounds(kind),
            entities: Vec::new(),
            responses: games::responses(kind),
            mode: ModeState::for_kind(kind),
            max_particles: MAX_PARTICLES,
            events: Vec::new(),
            rng: Pcg32::seed_from_u64(seed),
            next_id: 1,
        };
        session.lives = games::starting_lives(kind);
        games::build_scene(&mut session);
        session.emit(GameEvent::LevelStarted { level: 1 });
        log::info!("{} session started (seed {})", kind.name(), seed);
        session
    }

    pub fn with_particle_cap(mut self, cap: usize) -> Self {
        self.max_particles = cap;
        self
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> EntityId {
        let id = EntityId(self.next_id);
        self.next_id += 1;
        id
    }

    /// Validate and add an entity. Invalid spawns are logged and skipped.
    pub fn spawn(&mut self, builder: EntityBuilder) -> Option<EntityId> {
        let id = self.next_entity_id();
        match builder.build(id) {
            Ok(entity) => {
                self.entities.push(entity);
                Some(id)
            }
            Err(err) => {
                log::warn!("skipping invalid spawn: {}", err);
                None
            }
        }
    }

    /// Session RNG; every stochastic spawn draws from here
    pub fn rng(&mut self) -> &mut Pcg32 {
        &mut self.rng
    }

    pub fn emit(&mut self, event: GameEvent) {
        log::debug!("event: {:?}", event);
        self.events.push(event);
    }

    /// Drain the events emitted since the last call
    pub fn take_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn view(&self) -> FrameView<'_> {
        FrameView {
            kind: self.kind,
            phase: self.phase,
            level: self.level,
            lives: self.lives,
            score: self.score,
            time_ticks: self.time_ticks,
            bounds: self.bounds,
            entities: &self.entities,
            mode: &self.mode,
        }
    }

    pub fn rules(&self) -> PhaseRules {
        self.phase_rules
    }

    /// Switch phase and arm its delay. A zero delay moves on at once.
    pub fn enter_phase(&mut self, phase: GamePhase) {
        let rules = self.rules();
        let delay = match phase {
            GamePhase::Playing => None,
            GamePhase::LevelComplete => rules.level_complete_delay,
            GamePhase::Transition => Some(rules.transition_ticks),
            GamePhase::GameOver => rules.game_over_delay,
        };
        match delay {
            Some(ticks) => self.phase_timer.arm_for(ticks),
            None => self.phase_timer.clear(),
        }
        log::info!("{} phase: {:?} -> {:?}", self.kind.name(), self.phase, phase);
        self.phase = phase;
        if delay == Some(0) {
            self.advance_phase();
        }
    }

    /// Leave the current phase once its delay is over
    pub fn advance_phase(&mut self) {
        match self.phase {
            GamePhase::Playing => {}
            GamePhase::LevelComplete => self.enter_phase(GamePhase::Transition),
            GamePhase::Transition => self.next_level(),
            GamePhase::GameOver => self.restart(),
        }
    }

    /// Reset to level 1 with fresh counters
    pub fn restart(&mut self) {
        self.level = 1;
        self.score = 0;
        self.lives = games::starting_lives(self.kind);
        self.mode = ModeState::for_kind(self.kind);
        self.emit(GameEvent::Restarted);
        self.load_level();
    }

    /// Replay the current level with fresh counters
    pub fn retry_level(&mut self) {
        self.score = 0;
        self.lives = games::starting_lives(self.kind);
        self.mode = ModeState::for_kind(self.kind);
        self.emit(GameEvent::Restarted);
        self.load_level();
    }

    /// Advance to the following level (platformer loops after its last one)
    pub fn next_level(&mut self) {
        self.level = games::following_level(self.kind, self.level);
        self.load_level();
    }

    fn load_level(&mut self) {
        self.entities.clear();
        games::build_scene(self);
        self.enter_phase(GamePhase::Playing);
        self.emit(GameEvent::LevelStarted { level: self.level });
    }

    /// Spawn up to `count` decorative particles at `at`, respecting the cap
    pub fn burst(&mut self, at: Vec2, count: u32, style: BurstStyle) {
        let live = self.count(Category::DecorativeParticle);
        let room = self.max_particles.saturating_sub(live);
        let count = (count as usize).min(room);

        for _ in 0..count {
            let size = self.rng.random_range(2..=5) as f32;
            let lifetime = match style {
                BurstStyle::Sparkle => self.rng.random_range(20..=40),
                BurstStyle::Explosion => self.rng.random_range(10..=30),
            };
            let builder = EntityBuilder::circle(Category::DecorativeParticle, at.x, at.y, size)
                .lifetime(lifetime);
            let builder = match style {
                BurstStyle::Sparkle => {
                    let vx = self.rng.random_range(-2.0..2.0);
                    let vy = self.rng.random_range(-3.0..0.0);
                    builder.velocity(vx, vy)
                }
                BurstStyle::Explosion => {
                    let angle = self.rng.random_range(0.0..std::f32::consts::TAU);
                    let speed = self.rng.random_range(1.0..5.0);
                    let dir = crate::direction_from_angle(angle) * speed;
                    builder.velocity(dir.x, dir.y).gravity(0.0)
                }
            };
            self.spawn(builder);
        }
    }

    pub fn count(&self, category: Category) -> usize {
        self.entities
            .iter()
            .filter(|e| e.category == category)
            .count()
    }

    /// The first player entity, if any
    pub fn player(&self) -> Option<&Entity> {
        self.entities.iter().find(|e| e.category == Category::Player)
    }

    pub fn player_mut(&mut self) -> Option<&mut Entity> {
        self.entities
            .iter_mut()
            .find(|e| e.category == Category::Player)
    }

    pub fn entity(&self, id: EntityId) -> Option<&Entity> {
        self.entities.iter().find(|e| e.id == id)
    }

    /// Ensure entities are sorted by ID for deterministic iteration
    pub fn normalize_order(&mut self) {
        self.entities.sort_by_key(|e| e.id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_increase() {
        let mut session = Session::new(GameKind::Dodge, 1);
        let a = session.next_entity_id();
        let b = session.next_entity_id();
        assert!(b > a);
    }

    #[test]
    fn test_invalid_spawn_is_skipped() {
        let mut session = Session::new(GameKind::Dodge, 1);
        let before = session.entities.len();
        let id = session.spawn(EntityBuilder::rect(Category::Hazard, 0.0, 0.0, -1.0, 5.0));
        assert!(id.is_none());
        assert_eq!(session.entities.len(), before);
    }

    #[test]
    fn test_burst_respects_particle_cap() {
        let mut session = Session::new(GameKind::Asteroids, 7).with_particle_cap(25);
        session.burst(Vec2::new(500.0, 350.0), 20, BurstStyle::Explosion);
        session.burst(Vec2::new(500.0, 350.0), 20, BurstStyle::Explosion);
        assert_eq!(session.count(Category::DecorativeParticle), 25);
    }

    #[test]
    fn test_phase_delays() {
        let mut session = Session::new(GameKind::Platformer, 3);
        session.enter_phase(GamePhase::GameOver);
        assert_eq!(session.phase_timer.remaining(), 180);
        session.enter_phase(GamePhase::LevelComplete);
        assert_eq!(session.phase_timer.remaining(), 120);

        let mut session = Session::new(GameKind::Snake, 3);
        session.enter_phase(GamePhase::GameOver);
        assert!(!session.phase_timer.is_active());
    }

    #[test]
    fn test_restart_resets_counters() {
        let mut session = Session::new(GameKind::Asteroids, 11);
        session.score = 900;
        session.lives = 0;
        session.level = 4;
        session.enter_phase(GamePhase::GameOver);
        session.take_events();

        session.restart();
        assert_eq!(session.phase, GamePhase::Playing);
        assert_eq!(session.level, 1);
        assert_eq!(session.score, 0);
        assert_eq!(session.lives, 3);
        assert_eq!(
            session.take_events(),
            vec![GameEvent::Restarted, GameEvent::LevelStarted { level: 1 }]
        );
    }

    #[test]
    fn test_retry_keeps_level() {
        let mut session = Session::new(GameKind::Platformer, 11);
        session.level = 3;
        session.score = 40;
        session.lives = 1;
        session.take_events();

        session.retry_level();
        assert_eq!(session.phase, GamePhase::Playing);
        assert_eq!(session.level, 3);
        assert_eq!(session.score, 0);
        assert_eq!(session.lives, games::starting_lives(GameKind::Platformer));
        assert_eq!(
            session.take_events(),
            vec![GameEvent::Restarted, GameEvent::LevelStarted { level: 3 }]
        );
    }

    #[test]
    fn test_zero_delays_move_on_at_once() {
        let mut session = Session::new(GameKind::Platformer, 8);
        session.phase_rules.transition_ticks = 0;
        session.enter_phase(GamePhase::Transition);
        assert_eq!(session.phase, GamePhase::Playing);
        assert_eq!(session.level, 2);

        session.phase_rules.level_complete_delay = Some(0);
        session.enter_phase(GamePhase::LevelComplete);
        assert_eq!(session.phase, GamePhase::Playing);
        assert_eq!(session.level, 3);

        session.phase_rules.game_over_delay = Some(0);
        session.enter_phase(GamePhase::GameOver);
        assert_eq!(session.phase, GamePhase::Playing);
        assert_eq!(session.level, 1);
    }

    #[test]
    fn test_same_seed_same_scene() {
        let a = Session::new(GameKind::Platformer, 42);
        let b = Session::new(GameKind::Platformer, 42);
        assert_eq!(a.entities, b.entities);
    }
}
