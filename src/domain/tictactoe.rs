//! Tic-Tac-Toe rules and exact-search AI.
//!
//! Cells are indexed 0..9, row-major. The AI runs plain minimax over every
//! remaining move (no pruning, no depth limit): the whole tree is at most 9!
//! leaves, which is small enough to search on every turn.

pub const CELLS: usize = 9;

const LINES: [[usize; 3]; 8] = [
    [0, 1, 2], [3, 4, 5], [6, 7, 8], // rows
    [0, 3, 6], [1, 4, 7], [2, 5, 8], // columns
    [0, 4, 8], [2, 4, 6],            // diagonals
];

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum Mark {
    X,
    O,
}

impl Mark {
    pub fn other(self) -> Mark {
        match self {
            Mark::X => Mark::O,
            Mark::O => Mark::X,
        }
    }

    pub fn symbol(self) -> char {
        match self {
            Mark::X => 'X',
            Mark::O => 'O',
        }
    }
}

pub type Board = [Option<Mark>; CELLS];

pub fn winner(board: &Board) -> Option<Mark> {
    LINES.iter().find_map(|&[a, b, c]| match board[a] {
        Some(m) if board[b] == Some(m) && board[c] == Some(m) => Some(m),
        _ => None,
    })
}

/// Empty cells in index order.
pub fn available_moves(board: &Board) -> Vec<usize> {
    (0..CELLS).filter(|&i| board[i].is_none()).collect()
}

pub fn is_full(board: &Board) -> bool {
    board.iter().all(|c| c.is_some())
}

/// Value of `board` from `ai`'s point of view: +1 win, -1 loss, 0 draw.
/// `maximizing` is true when it is `ai`'s turn to move.
pub fn minimax(board: &Board, ai: Mark, maximizing: bool) -> i8 {
    match winner(board) {
        Some(m) if m == ai => return 1,
        Some(_) => return -1,
        None => {}
    }
    let moves = available_moves(board);
    if moves.is_empty() {
        return 0;
    }

    let mover = if maximizing { ai } else { ai.other() };
    let scores = moves.into_iter().map(|cell| {
        let mut next = *board;
        next[cell] = Some(mover);
        minimax(&next, ai, !maximizing)
    });

    if maximizing {
        scores.max().unwrap_or(0)
    } else {
        scores.min().unwrap_or(0)
    }
}

/// Optimal move for `ai`. Ties go to the lowest cell index.
pub fn best_move(board: &Board, ai: Mark) -> Option<usize> {
    let mut best: Option<(usize, i8)> = None;
    for cell in available_moves(board) {
        let mut next = *board;
        next[cell] = Some(ai);
        let score = minimax(&next, ai, false);
        if best.map_or(true, |(_, s)| score > s) {
            best = Some((cell, score));
        }
    }
    best.map(|(cell, _)| cell)
}

// ══════════════════════════════════════════════════════════════
// Match state
// ══════════════════════════════════════════════════════════════

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Mode {
    TwoPlayer,
    VsAi,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Outcome {
    Win(Mark),
    Draw,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub struct Tally {
    pub x: u32,
    pub o: u32,
    pub draws: u32,
}

/// The human always plays X and moves first; in `VsAi` mode the AI plays O.
pub struct Match {
    pub board: Board,
    pub turn: Mark,
    pub mode: Mode,
    pub outcome: Option<Outcome>,
    pub tally: Tally,
    pub cursor: usize,
    think_ms: u64,
    ai_wait_ms: Option<u64>,
}

impl Match {
    pub fn new(mode: Mode, think_ms: u64) -> Self {
        Match {
            board: [None; CELLS],
            turn: Mark::X,
            mode,
            outcome: None,
            tally: Tally::default(),
            cursor: 4,
            think_ms,
            ai_wait_ms: None,
        }
    }

    pub fn ai_thinking(&self) -> bool {
        self.ai_wait_ms.is_some()
    }

    /// Human move. Ignored on occupied cells, after the round ended,
    /// or while the AI is to move.
    pub fn play(&mut self, cell: usize) -> Option<Outcome> {
        if cell >= CELLS || self.board[cell].is_some() || self.outcome.is_some() {
            return None;
        }
        if self.mode == Mode::VsAi && (self.turn == Mark::O || self.ai_thinking()) {
            return None;
        }
        let outcome = self.place(cell);
        if outcome.is_none() && self.mode == Mode::VsAi && self.turn == Mark::O {
            self.ai_wait_ms = Some(self.think_ms);
        }
        outcome
    }

    /// Count down the AI's think delay and move when it elapses.
    pub fn tick(&mut self, dt_ms: u64) -> Option<Outcome> {
        let remaining = self.ai_wait_ms?;
        if remaining > dt_ms {
            self.ai_wait_ms = Some(remaining - dt_ms);
            return None;
        }
        self.ai_wait_ms = None;
        let cell = best_move(&self.board, Mark::O)?;
        self.place(cell)
    }

    fn place(&mut self, cell: usize) -> Option<Outcome> {
        self.board[cell] = Some(self.turn);
        if let Some(m) = winner(&self.board) {
            match m {
                Mark::X => self.tally.x += 1,
                Mark::O => self.tally.o += 1,
            }
            self.outcome = Some(Outcome::Win(m));
        } else if is_full(&self.board) {
            self.tally.draws += 1;
            self.outcome = Some(Outcome::Draw);
        } else {
            self.turn = self.turn.other();
        }
        self.outcome
    }

    pub fn move_cursor(&mut self, dx: i32, dy: i32) {
        let col = (self.cursor % 3) as i32 + dx;
        let row = (self.cursor / 3) as i32 + dy;
        self.cursor = (row.clamp(0, 2) * 3 + col.clamp(0, 2)) as usize;
    }

    pub fn reset_round(&mut self) {
        self.board = [None; CELLS];
        self.turn = Mark::X;
        self.outcome = None;
        self.ai_wait_ms = None;
    }

    pub fn reset_scores(&mut self) {
        self.tally = Tally::default();
        self.reset_round();
    }

    pub fn toggle_mode(&mut self) {
        self.mode = match self.mode {
            Mode::TwoPlayer => Mode::VsAi,
            Mode::VsAi => Mode::TwoPlayer,
        };
        self.reset_round();
    }
}

// ══════════════════════════════════════════════════════════════
// Unit tests
// ══════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn board_from(s: &str) -> Board {
        let mut b = [None; CELLS];
        for (i, ch) in s.chars().filter(|c| !c.is_whitespace()).enumerate() {
            b[i] = match ch {
                'X' => Some(Mark::X),
                'O' => Some(Mark::O),
                _ => None,
            };
        }
        b
    }

    /// Play every possible opponent line against the AI; it must never lose.
    fn ai_never_loses(board: &mut Board, to_move: Mark, ai: Mark) {
        if let Some(w) = winner(board) {
            assert_ne!(w, ai.other(), "AI lost on {board:?}");
            return;
        }
        if is_full(board) {
            return;
        }
        if to_move == ai {
            let cell = best_move(board, ai).expect("non-full board has a move");
            board[cell] = Some(ai);
            ai_never_loses(board, ai.other(), ai);
            board[cell] = None;
        } else {
            for cell in available_moves(board) {
                board[cell] = Some(to_move);
                ai_never_loses(board, ai, ai);
                board[cell] = None;
            }
        }
    }

    /// From a position `ai` has won by minimax, `best_move` must win against every reply.
    fn converts_win(board: &mut Board, to_move: Mark, ai: Mark) {
        if let Some(w) = winner(board) {
            assert_eq!(w, ai, "forced win slipped on {board:?}");
            return;
        }
        assert!(!is_full(board), "forced win drawn on {board:?}");
        if to_move == ai {
            let cell = best_move(board, ai).expect("non-full board has a move");
            board[cell] = Some(ai);
            converts_win(board, ai.other(), ai);
            board[cell] = None;
        } else {
            for cell in available_moves(board) {
                board[cell] = Some(to_move);
                converts_win(board, ai, ai);
                board[cell] = None;
            }
        }
    }

    /// Visit each reachable position once; check every won one converts.
    fn each_winning_position(board: &mut Board, to_move: Mark, seen: &mut HashSet<Board>) {
        if !seen.insert(*board) || winner(board).is_some() || is_full(board) {
            return;
        }
        if minimax(board, to_move, true) == 1 {
            converts_win(board, to_move, to_move);
        }
        for cell in available_moves(board) {
            board[cell] = Some(to_move);
            each_winning_position(board, to_move.other(), seen);
            board[cell] = None;
        }
    }

    #[test]
    fn detects_rows_columns_diagonals() {
        assert_eq!(winner(&board_from("XXX ... ...")), Some(Mark::X));
        assert_eq!(winner(&board_from("O.. O.. O..")), Some(Mark::O));
        assert_eq!(winner(&board_from("..X .X. X..")), Some(Mark::X));
        assert_eq!(winner(&board_from("XOX XOO OXX")), None);
    }

    #[test]
    fn terminal_values() {
        assert_eq!(minimax(&board_from("OOO XX. X.."), Mark::O, true), 1);
        assert_eq!(minimax(&board_from("XXX OO. O.."), Mark::O, true), -1);
        assert_eq!(minimax(&board_from("XOX XOO OXX"), Mark::O, true), 0);
    }

    #[test]
    fn takes_immediate_win() {
        // O to move; O can win at 2 (top row) or block at 8. Winning is preferred.
        let b = board_from("OO. XX. X..");
        assert_eq!(best_move(&b, Mark::O), Some(2));
    }

    #[test]
    fn blocks_opponent_threat() {
        let b = board_from("XX. .O. ...");
        assert_eq!(best_move(&b, Mark::O), Some(2));
    }

    #[test]
    fn converts_every_winning_position() {
        let mut seen = HashSet::new();
        let mut b = [None; CELLS];
        each_winning_position(&mut b, Mark::X, &mut seen);
        assert!(seen.len() > 5000);
    }

    #[test]
    fn first_best_move_wins_ties() {
        // Empty board: every move draws with perfect play, so cell 0 is chosen.
        assert_eq!(best_move(&[None; CELLS], Mark::O), Some(0));
    }

    #[test]
    fn full_board_has_no_move() {
        assert_eq!(best_move(&board_from("XOX XOO OXX"), Mark::O), None);
    }

    #[test]
    fn ai_never_loses_as_second_player() {
        let mut b = [None; CELLS];
        ai_never_loses(&mut b, Mark::X, Mark::O);
    }

    #[test]
    fn ai_never_loses_as_first_player() {
        let mut b = [None; CELLS];
        ai_never_loses(&mut b, Mark::X, Mark::X);
    }

    // ── Match ──

    #[test]
    fn two_player_alternates_and_scores() {
        let mut m = Match::new(Mode::TwoPlayer, 0);
        for cell in [0, 3, 1, 4] {
            assert_eq!(m.play(cell), None);
        }
        assert_eq!(m.play(2), Some(Outcome::Win(Mark::X)));
        assert_eq!(m.tally.x, 1);
        // Moves after the end are ignored.
        assert_eq!(m.play(8), None);
        assert!(m.board[8].is_none());
    }

    #[test]
    fn occupied_cell_is_ignored() {
        let mut m = Match::new(Mode::TwoPlayer, 0);
        m.play(4);
        m.play(4);
        assert_eq!(m.turn, Mark::O);
        assert_eq!(m.board[4], Some(Mark::X));
    }

    #[test]
    fn ai_answers_after_think_delay() {
        let mut m = Match::new(Mode::VsAi, 500);
        m.play(0);
        assert!(m.ai_thinking());
        assert_eq!(m.play(1), None, "human cannot move while AI thinks");
        m.tick(400);
        assert_eq!(available_moves(&m.board).len(), 8);
        m.tick(100);
        assert!(!m.ai_thinking());
        assert_eq!(available_moves(&m.board).len(), 7);
        assert_eq!(m.turn, Mark::X);
    }

    #[test]
    fn draw_counts_and_reset_keeps_tally() {
        let mut m = Match::new(Mode::TwoPlayer, 0);
        // X O X / X O O / O X X
        for cell in [0, 1, 2, 4, 3, 5, 7, 6, 8] {
            m.play(cell);
        }
        assert_eq!(m.outcome, Some(Outcome::Draw));
        assert_eq!(m.tally.draws, 1);
        m.reset_round();
        assert!(m.outcome.is_none());
        assert_eq!(m.tally.draws, 1);
        m.reset_scores();
        assert_eq!(m.tally, Tally::default());
    }

    #[test]
    fn cursor_clamps_to_grid() {
        let mut m = Match::new(Mode::TwoPlayer, 0);
        m.move_cursor(-5, -5);
        assert_eq!(m.cursor, 0);
        m.move_cursor(1, 2);
        assert_eq!(m.cursor, 7);
    }
}
