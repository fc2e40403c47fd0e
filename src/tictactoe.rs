//! Tic-tac-toe with a delayed computer opponent
//!
//! X always moves first. In single-player mode the computer plays O and
//! commits its move after a short thinking delay; clicks during the delay
//! are rejected.

use glam::Vec2;
use rand::seq::IndexedRandom;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use crate::error::MoveError;
use crate::ms_to_ticks;
use crate::sim::tick::InputSnapshot;
use crate::sim::timer::Countdown;

/// Computer "thinking" time before it moves
pub const THINKING_MS: u32 = 320;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Mark {
    X,
    O,
}

impl Mark {
    pub fn other(self) -> Self {
        match self {
            Mark::X => Mark::O,
            Mark::O => Mark::X,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Verdict {
    Win(Mark),
    Draw,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    /// Random empty cell
    #[default]
    Easy,
    /// Win if possible, else block, else random
    Medium,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Opponent {
    Computer(Difficulty),
    Human,
}

const LINES: [[(usize, usize); 3]; 8] = [
    [(0, 0), (0, 1), (0, 2)],
    [(1, 0), (1, 1), (1, 2)],
    [(2, 0), (2, 1), (2, 2)],
    [(0, 0), (1, 0), (2, 0)],
    [(0, 1), (1, 1), (2, 1)],
    [(0, 2), (1, 2), (2, 2)],
    [(0, 0), (1, 1), (2, 2)],
    [(0, 2), (1, 1), (2, 0)],
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Board {
    cells: [[Option<Mark>; 3]; 3],
}

impl Board {
    pub fn get(&self, row: usize, col: usize) -> Option<Mark> {
        self.cells.get(row).and_then(|r| r.get(col)).copied().flatten()
    }

    pub fn place(&mut self, row: usize, col: usize, mark: Mark) -> Result<(), MoveError> {
        let cell = self
            .cells
            .get_mut(row)
            .and_then(|r| r.get_mut(col))
            .ok_or(MoveError::OutOfRange { row, col })?;
        if cell.is_some() {
            return Err(MoveError::Occupied { row, col });
        }
        *cell = Some(mark);
        Ok(())
    }

    pub fn empty_cells(&self) -> Vec<(usize, usize)> {
        (0..3)
            .flat_map(|r| (0..3).map(move |c| (r, c)))
            .filter(|&(r, c)| self.cells[r][c].is_none())
            .collect()
    }

    pub fn winner(&self) -> Option<Mark> {
        LINES.iter().find_map(|line| {
            let [a, b, c] = line.map(|(r, c)| self.cells[r][c]);
            match (a, b, c) {
                (Some(a), Some(b), Some(c)) if a == b && b == c => Some(a),
                _ => None,
            }
        })
    }

    /// Winner, draw on a full board, or `None` while play continues
    pub fn verdict(&self) -> Option<Verdict> {
        if let Some(mark) = self.winner() {
            Some(Verdict::Win(mark))
        } else if self.empty_cells().is_empty() {
            Some(Verdict::Draw)
        } else {
            None
        }
    }

    /// A cell that completes a line for `mark`, if any
    fn completing_move(&self, mark: Mark) -> Option<(usize, usize)> {
        self.empty_cells().into_iter().find(|&(r, c)| {
            let mut trial = *self;
            trial.cells[r][c] = Some(mark);
            trial.winner() == Some(mark)
        })
    }
}

/// Screen placement of the board for pointer hit-testing
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoardLayout {
    pub origin: Vec2,
    pub cell_size: f32,
}

impl Default for BoardLayout {
    /// 450 px board centred in a 900x650 window, nudged down for the title
    fn default() -> Self {
        Self {
            origin: Vec2::new(225.0, 120.0),
            cell_size: 150.0,
        }
    }
}

impl BoardLayout {
    pub fn cell_at(&self, point: Vec2) -> Option<(usize, usize)> {
        let rel = (point - self.origin) / self.cell_size;
        if rel.x < 0.0 || rel.y < 0.0 || rel.x >= 3.0 || rel.y >= 3.0 {
            return None;
        }
        Some((rel.y as usize, rel.x as usize))
    }

    pub fn cell_center(&self, row: usize, col: usize) -> Vec2 {
        self.origin + (Vec2::new(col as f32, row as f32) + 0.5) * self.cell_size
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoardEvent {
    Placed { mark: Mark, row: usize, col: usize },
    Finished(Verdict),
}

/// Read-only snapshot handed to a presenter
#[derive(Debug, Clone, Copy)]
pub struct BoardView<'a> {
    pub board: &'a Board,
    pub current: Mark,
    pub opponent: Opponent,
    pub verdict: Option<Verdict>,
    /// Computer move pending
    pub thinking: bool,
    pub time_ticks: u64,
}

#[derive(Debug, Clone)]
pub struct TicTacToe {
    pub board: Board,
    pub current: Mark,
    pub opponent: Opponent,
    pub verdict: Option<Verdict>,
    pub thinking: Countdown,
    pub layout: BoardLayout,
    pub time_ticks: u64,
    events: Vec<BoardEvent>,
    rng: Pcg32,
}

impl TicTacToe {
    pub fn new(opponent: Opponent, seed: u64) -> Self {
        Self {
            board: Board::default(),
            current: Mark::X,
            opponent,
            verdict: None,
            thinking: Countdown::new(ms_to_ticks(THINKING_MS)),
            layout: BoardLayout::default(),
            time_ticks: 0,
            events: Vec::new(),
            rng: Pcg32::seed_from_u64(seed),
        }
    }

    pub fn is_over(&self) -> bool {
        self.verdict.is_some()
    }

    fn computer_turn(&self) -> bool {
        matches!(self.opponent, Opponent::Computer(_)) && self.current == Mark::O
    }

    /// A human click on a cell
    pub fn click(&mut self, row: usize, col: usize) -> Result<(), MoveError> {
        if self.is_over() {
            return Err(MoveError::GameOver);
        }
        if self.computer_turn() {
            return Err(MoveError::NotYourTurn);
        }
        self.commit(row, col)
    }

    fn commit(&mut self, row: usize, col: usize) -> Result<(), MoveError> {
        self.board.place(row, col, self.current)?;
        self.events.push(BoardEvent::Placed {
            mark: self.current,
            row,
            col,
        });

        if let Some(verdict) = self.board.verdict() {
            log::info!("tic-tac-toe finished: {:?}", verdict);
            self.verdict = Some(verdict);
            self.events.push(BoardEvent::Finished(verdict));
            return Ok(());
        }

        self.current = self.current.other();
        if self.computer_turn() {
            self.thinking.arm();
        }
        Ok(())
    }

    /// Advance one tick; commits the computer move when thinking ends
    pub fn tick(&mut self) {
        if !self.thinking.tick() || self.is_over() {
            return;
        }
        let Opponent::Computer(difficulty) = self.opponent else {
            return;
        };
        if let Some((row, col)) = self.choose(difficulty) {
            if let Err(err) = self.commit(row, col) {
                log::warn!("computer move rejected: {}", err);
            }
        }
    }

    /// One frame: tick the thinking delay, then route pointer and restart input
    pub fn handle_input(&mut self, input: &InputSnapshot) {
        self.time_ticks += 1;
        self.tick();

        if input.restart && self.is_over() {
            self.play_again();
        } else if input.pointer_pressed {
            if let Some((row, col)) = input.pointer.and_then(|p| self.layout.cell_at(p)) {
                if let Err(err) = self.click(row, col) {
                    log::debug!("click ignored: {}", err);
                }
            }
        }
    }

    pub fn view(&self) -> BoardView<'_> {
        BoardView {
            board: &self.board,
            current: self.current,
            opponent: self.opponent,
            verdict: self.verdict,
            thinking: self.thinking.is_active(),
            time_ticks: self.time_ticks,
        }
    }

    fn choose(&mut self, difficulty: Difficulty) -> Option<(usize, usize)> {
        let me = self.current;
        if difficulty == Difficulty::Medium {
            if let Some(cell) = self
                .board
                .completing_move(me)
                .or_else(|| self.board.completing_move(me.other()))
            {
                return Some(cell);
            }
        }
        self.board.empty_cells().choose(&mut self.rng).copied()
    }

    pub fn play_again(&mut self) {
        self.board = Board::default();
        self.current = Mark::X;
        self.verdict = None;
        self.thinking.clear();
    }

    pub fn take_events(&mut self) -> Vec<BoardEvent> {
        std::mem::take(&mut self.events)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn board(rows: [&str; 3]) -> Board {
        let mut b = Board::default();
        for (r, row) in rows.iter().enumerate() {
            for (c, ch) in row.chars().enumerate() {
                let mark = match ch {
                    'X' => Mark::X,
                    'O' => Mark::O,
                    _ => continue,
                };
                b.place(r, c, mark).expect("valid placement");
            }
        }
        b
    }

    #[test]
    fn test_winner_rows_columns_diagonals() {
        assert_eq!(board(["XXX", "OO.", "..."]).winner(), Some(Mark::X));
        assert_eq!(board(["OX.", "OX.", "O.X"]).winner(), Some(Mark::O));
        assert_eq!(board(["X.O", ".XO", "..X"]).winner(), Some(Mark::X));
        assert_eq!(board(["X.O", ".OX", "O.X"]).winner(), Some(Mark::O));
        assert_eq!(board(["XO.", "...", "..."]).winner(), None);
    }

    #[test]
    fn test_draw() {
        let b = board(["XOX", "XOO", "OXX"]);
        assert_eq!(b.verdict(), Some(Verdict::Draw));
    }

    #[test]
    fn test_place_rejects_occupied_and_out_of_range() {
        let mut b = board(["X..", "...", "..."]);
        assert_eq!(b.place(0, 0, Mark::O), Err(MoveError::Occupied { row: 0, col: 0 }));
        assert_eq!(b.place(3, 0, Mark::O), Err(MoveError::OutOfRange { row: 3, col: 0 }));
    }

    #[test]
    fn test_computer_waits_for_thinking_delay() {
        let mut game = TicTacToe::new(Opponent::Computer(Difficulty::Easy), 1);
        game.click(1, 1).expect("human move");
        assert_eq!(game.current, Mark::O);
        assert_eq!(game.click(0, 0), Err(MoveError::NotYourTurn));

        let delay = ms_to_ticks(THINKING_MS);
        assert_eq!(delay, 19);
        for _ in 0..delay - 1 {
            game.tick();
            assert_eq!(game.board.empty_cells().len(), 8);
        }
        game.tick();
        assert_eq!(game.board.empty_cells().len(), 7);
        assert_eq!(game.current, Mark::X);
    }

    #[test]
    fn test_medium_takes_win_then_blocks() {
        let mut game = TicTacToe::new(Opponent::Computer(Difficulty::Medium), 3);
        game.board = board(["OO.", "XX.", "X.."]);
        game.current = Mark::O;
        assert_eq!(game.choose(Difficulty::Medium), Some((0, 2)));

        game.board = board(["O..", "XX.", "..."]);
        assert_eq!(game.choose(Difficulty::Medium), Some((1, 2)));
    }

    #[test]
    fn test_two_player_game_to_win() {
        let mut game = TicTacToe::new(Opponent::Human, 0);
        for (r, c) in [(0, 0), (1, 0), (0, 1), (1, 1), (0, 2)] {
            game.click(r, c).expect("legal move");
        }
        assert_eq!(game.verdict, Some(Verdict::Win(Mark::X)));
        assert_eq!(game.click(2, 2), Err(MoveError::GameOver));
        assert_eq!(
            game.take_events().last(),
            Some(&BoardEvent::Finished(Verdict::Win(Mark::X)))
        );

        game.play_again();
        assert!(!game.is_over());
        assert_eq!(game.board.empty_cells().len(), 9);
    }

    #[test]
    fn test_pointer_routing() {
        let layout = BoardLayout {
            origin: Vec2::new(100.0, 100.0),
            cell_size: 150.0,
        };
        assert_eq!(layout.cell_at(Vec2::new(120.0, 400.0)), Some((2, 0)));
        assert_eq!(layout.cell_at(Vec2::new(99.0, 120.0)), None);
        assert_eq!(layout.cell_at(Vec2::new(550.0, 120.0)), None);

        let mut game = TicTacToe::new(Opponent::Human, 0);
        game.layout = layout;
        game.handle_input(&click_at(&layout, 1, 1));
        assert_eq!(game.board.get(1, 1), Some(Mark::X));
    }

    fn click_at(layout: &BoardLayout, row: usize, col: usize) -> InputSnapshot {
        InputSnapshot {
            pointer: Some(layout.cell_center(row, col)),
            pointer_pressed: true,
            ..Default::default()
        }
    }

    #[test]
    fn test_thinking_delay_through_frame_input() {
        let mut game = TicTacToe::new(Opponent::Computer(Difficulty::Medium), 9);
        let layout = game.layout;
        game.handle_input(&click_at(&layout, 0, 0));
        assert!(game.view().thinking);

        let mut frames = 0;
        while game.board.empty_cells().len() == 8 {
            game.handle_input(&InputSnapshot::default());
            frames += 1;
            assert!(frames <= 100, "computer never moved");
        }
        assert_eq!(frames, ms_to_ticks(THINKING_MS));
        assert_eq!(game.current, Mark::X);
        assert!(!game.view().thinking);
    }

    #[test]
    fn test_restart_input_only_after_game_over() {
        let mut game = TicTacToe::new(Opponent::Human, 0);
        let layout = game.layout;
        let restart = InputSnapshot {
            restart: true,
            ..Default::default()
        };
        game.handle_input(&click_at(&layout, 2, 2));
        game.handle_input(&restart);
        assert_eq!(game.board.get(2, 2), Some(Mark::X));

        for (r, c) in [(0, 0), (2, 1), (1, 1), (2, 0)] {
            game.handle_input(&click_at(&layout, r, c));
        }
        assert_eq!(game.verdict, Some(Verdict::Win(Mark::X)));
        game.handle_input(&restart);
        assert!(!game.is_over());
        assert_eq!(game.board.empty_cells().len(), 9);
    }
}
