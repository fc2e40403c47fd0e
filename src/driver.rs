//! Fixed-rate frame loop
//!
//! One iteration per tick: poll input, advance the simulation, present the
//! frame, then sleep to the next tick boundary. A late frame moves the
//! schedule forward instead of running extra ticks to catch up.

use std::time::{Duration, Instant};

use glam::Vec2;

use crate::audio::{SoundBank, SoundEffect};
use crate::consts::TICK_RATE;
use crate::sim::state::{FrameView, GameEvent, GameKind, Session};
use crate::sim::tick::{InputSnapshot, tick};
use crate::tictactoe::{BoardEvent, BoardLayout, BoardView, Opponent, TicTacToe};

/// Anything the driver can step once per tick
pub trait Simulation {
    type Event;
    type View<'a>
    where
        Self: 'a;

    fn advance(&mut self, input: &InputSnapshot);
    /// Events raised since the last call, oldest first
    fn take_events(&mut self) -> Vec<Self::Event>;
    fn view(&self) -> Self::View<'_>;
}

impl Simulation for Session {
    type Event = GameEvent;
    type View<'a> = FrameView<'a>;

    fn advance(&mut self, input: &InputSnapshot) {
        tick(self, input);
    }

    fn take_events(&mut self) -> Vec<GameEvent> {
        Session::take_events(self)
    }

    fn view(&self) -> FrameView<'_> {
        Session::view(self)
    }
}

impl Simulation for TicTacToe {
    type Event = BoardEvent;
    type View<'a> = BoardView<'a>;

    fn advance(&mut self, input: &InputSnapshot) {
        self.handle_input(input);
    }

    fn take_events(&mut self) -> Vec<BoardEvent> {
        TicTacToe::take_events(self)
    }

    fn view(&self) -> BoardView<'_> {
        TicTacToe::view(self)
    }
}

/// Supplies the input sampled at the start of each tick
pub trait InputSource {
    fn poll(&mut self, tick: u64) -> InputSnapshot;
}

/// Receives the read-only frame and the tick's one-shot events
pub trait Presenter<S: Simulation> {
    fn present(&mut self, view: &S::View<'_>, events: &[S::Event]);
}

/// How a run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    pub ticks: u64,
    pub quit: bool,
    /// Ticks that finished after their deadline
    pub late_frames: u64,
}

#[derive(Debug, Clone)]
pub struct FrameDriver {
    tick_duration: Duration,
    pacing: bool,
    max_ticks: Option<u64>,
}

impl Default for FrameDriver {
    fn default() -> Self {
        Self {
            tick_duration: Duration::from_secs(1) / TICK_RATE,
            pacing: true,
            max_ticks: None,
        }
    }
}

impl FrameDriver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sleep to each tick boundary (off for tests and benchmarks)
    pub fn with_pacing(mut self, pacing: bool) -> Self {
        self.pacing = pacing;
        self
    }

    /// Stop after `ticks` updates; zero means no limit
    pub fn with_max_ticks(mut self, ticks: u64) -> Self {
        self.max_ticks = (ticks > 0).then_some(ticks);
        self
    }

    pub fn run<S: Simulation>(
        &self,
        sim: &mut S,
        input: &mut impl InputSource,
        presenter: &mut impl Presenter<S>,
    ) -> RunSummary {
        let mut summary = RunSummary {
            ticks: 0,
            quit: false,
            late_frames: 0,
        };
        let mut deadline = Instant::now() + self.tick_duration;

        loop {
            if self.max_ticks.is_some_and(|max| summary.ticks >= max) {
                break;
            }

            let snapshot = input.poll(summary.ticks);
            if snapshot.quit {
                log::info!("quit requested after {} ticks", summary.ticks);
                summary.quit = true;
                break;
            }

            sim.advance(&snapshot);
            let events = sim.take_events();
            presenter.present(&sim.view(), &events);
            summary.ticks += 1;

            if self.pacing {
                let now = Instant::now();
                if now < deadline {
                    std::thread::sleep(deadline - now);
                    deadline += self.tick_duration;
                } else {
                    summary.late_frames += 1;
                    log::trace!("tick {} ran late by {:?}", summary.ticks, now - deadline);
                    deadline = now + self.tick_duration;
                }
            }
        }

        summary
    }
}

/// Plays back a fixed list of snapshots, then idles
#[derive(Debug, Clone, Default)]
pub struct ScriptedInput {
    frames: Vec<InputSnapshot>,
}

impl ScriptedInput {
    pub fn new(frames: Vec<InputSnapshot>) -> Self {
        Self { frames }
    }
}

impl InputSource for ScriptedInput {
    fn poll(&mut self, tick: u64) -> InputSnapshot {
        usize::try_from(tick)
            .ok()
            .and_then(|i| self.frames.get(i))
            .cloned()
            .unwrap_or_default()
    }
}

/// Hands-off input that keeps each game busy for a headless demo
#[derive(Debug, Clone, Copy)]
pub struct DemoInput {
    kind: GameKind,
    arena_center: Vec2,
}

impl DemoInput {
    pub fn new(kind: GameKind, arena_center: Vec2) -> Self {
        Self { kind, arena_center }
    }
}

impl InputSource for DemoInput {
    fn poll(&mut self, tick: u64) -> InputSnapshot {
        let mut input = InputSnapshot::default();
        match self.kind {
            GameKind::Platformer => {
                input.right = true;
                input.jump = tick % 45 == 0;
                input.next = true;
            }
            GameKind::Dodge => {
                let leg = (tick / 90) % 2;
                input.left = leg == 0;
                input.right = leg == 1;
            }
            GameKind::Asteroids => {
                // Press, drag back from a rotating aim point, release
                let angle = (tick / 40) as f32 * 0.7;
                let aim = self.arena_center + crate::direction_from_angle(angle) * 200.0;
                match tick % 40 {
                    0 => {
                        input.pointer = Some(aim);
                        input.pointer_pressed = true;
                    }
                    1..=9 => input.pointer = Some(aim),
                    10 => {
                        input.pointer = Some(aim + (aim - self.arena_center) * 0.5);
                        input.pointer_released = true;
                    }
                    _ => {}
                }
                input.next = true;
                input.restart = true;
            }
            GameKind::Snake => {
                match (tick / 20) % 4 {
                    0 => input.right = true,
                    1 => input.down = true,
                    2 => input.left = true,
                    _ => input.up = true,
                }
                // Ignored until game over
                input.restart = true;
            }
        }
        input
    }
}

/// Visit order for the board demo; occupied cells are skipped by the game
const DEMO_CELLS: [(usize, usize); 9] = [
    (1, 1),
    (0, 0),
    (2, 2),
    (0, 2),
    (2, 0),
    (0, 1),
    (1, 0),
    (1, 2),
    (2, 1),
];

/// Hands-off tic-tac-toe input: a click every half second, restart between games
#[derive(Debug, Clone, Copy)]
pub struct BoardDemoInput {
    layout: BoardLayout,
}

impl BoardDemoInput {
    pub fn new(layout: BoardLayout) -> Self {
        Self { layout }
    }
}

impl InputSource for BoardDemoInput {
    fn poll(&mut self, tick: u64) -> InputSnapshot {
        let mut input = InputSnapshot::default();
        match tick % 30 {
            0 => {
                let (row, col) = DEMO_CELLS[(tick / 30 % 9) as usize];
                input.pointer = Some(self.layout.cell_center(row, col));
                input.pointer_pressed = true;
            }
            15 => input.restart = true,
            _ => {}
        }
        input
    }
}

/// Presenter that logs milestones and routes events to the sound bank
#[derive(Debug, Default)]
pub struct LogPresenter {
    sounds: SoundBank,
    frames: u64,
    events: u64,
}

impl LogPresenter {
    pub fn new(sounds: SoundBank) -> Self {
        Self {
            sounds,
            frames: 0,
            events: 0,
        }
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn events(&self) -> u64 {
        self.events
    }

    pub fn sounds(&self) -> &SoundBank {
        &self.sounds
    }
}

impl Presenter<Session> for LogPresenter {
    fn present(&mut self, view: &FrameView<'_>, events: &[GameEvent]) {
        self.frames += 1;
        self.events += events.len() as u64;

        for event in events {
            match event {
                GameEvent::LevelStarted { .. }
                | GameEvent::LevelComplete { .. }
                | GameEvent::GameOver { .. }
                | GameEvent::Restarted => log::info!(
                    "{} {:?} (score {}, lives {})",
                    view.kind.name(),
                    event,
                    view.score,
                    view.lives
                ),
                _ => log::debug!("{:?}", event),
            }
            if let Some(effect) = SoundEffect::for_event(event) {
                self.sounds.play(effect);
            }
        }

        if view.time_ticks % u64::from(TICK_RATE) == 0 {
            log::debug!(
                "t={}s phase={:?} level={} score={} lives={} entities={}",
                view.time_ticks / u64::from(TICK_RATE),
                view.phase,
                view.level,
                view.score,
                view.lives,
                view.entities.len()
            );
        }
    }
}

impl Presenter<TicTacToe> for LogPresenter {
    fn present(&mut self, view: &BoardView<'_>, events: &[BoardEvent]) {
        self.frames += 1;
        self.events += events.len() as u64;

        for event in events {
            match event {
                BoardEvent::Finished(verdict) => log::info!(
                    "tic-tac-toe {:?} after {} ticks{}",
                    verdict,
                    view.time_ticks,
                    if view.opponent == Opponent::Human {
                        " (two players)"
                    } else {
                        ""
                    }
                ),
                BoardEvent::Placed { .. } => log::debug!("{:?}", event),
            }
            self.sounds.play(SoundEffect::for_board_event(event));
        }
    }
}
