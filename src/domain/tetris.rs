//! Tetris board and piece engine.
//!
//! The board is a fixed 10x20 grid of occupied/empty cells. Pieces are small
//! boolean matrices positioned by their top-left corner. Everything here is
//! pure: randomness is injected, time is passed in as elapsed milliseconds.
//!
//! Rules:
//!   - A placement is valid iff every occupied piece cell lands on an
//!     in-bounds, empty board cell. Rows above the top edge are allowed.
//!   - Locking merges the piece into the board, then full rows are removed
//!     and empty rows are prepended.
//!   - Score += lines × 100 × level; level = lines / 10 + 1.
//!   - Fall interval shrinks by 100ms per level, floored at 100ms.

use rand::Rng;

pub const BOARD_WIDTH: usize = 10;
pub const BOARD_HEIGHT: usize = 20;

const BASE_DROP_MS: u64 = 1000;
const MIN_DROP_MS: u64 = 100;
const DROP_STEP_MS: u64 = 100;
const LINES_PER_LEVEL: u32 = 10;
const POINTS_PER_LINE: u32 = 100;

pub type Row = [bool; BOARD_WIDTH];
pub type Board = [Row; BOARD_HEIGHT];

pub fn empty_board() -> Board {
    [[false; BOARD_WIDTH]; BOARD_HEIGHT]
}

// ── Tetrominoes ──

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Kind {
    I,
    O,
    T,
    S,
    Z,
    J,
    L,
}

impl Kind {
    pub const ALL: [Kind; 7] = [Kind::I, Kind::O, Kind::T, Kind::S, Kind::Z, Kind::J, Kind::L];

    pub fn random(rng: &mut impl Rng) -> Kind {
        Kind::ALL[rng.random_range(0..Kind::ALL.len())]
    }

    /// Spawn orientation, rows top to bottom.
    pub fn shape(self) -> Shape {
        let rows: &[&[u8]] = match self {
            Kind::I => &[&[1, 1, 1, 1]],
            Kind::O => &[&[1, 1], &[1, 1]],
            Kind::T => &[&[0, 1, 0], &[1, 1, 1]],
            Kind::S => &[&[0, 1, 1], &[1, 1, 0]],
            Kind::Z => &[&[1, 1, 0], &[0, 1, 1]],
            Kind::J => &[&[1, 0, 0], &[1, 1, 1]],
            Kind::L => &[&[0, 0, 1], &[1, 1, 1]],
        };
        Shape {
            cells: rows.iter().map(|r| r.iter().map(|&c| c == 1).collect()).collect(),
        }
    }

    pub fn name(self) -> char {
        match self {
            Kind::I => 'I',
            Kind::O => 'O',
            Kind::T => 'T',
            Kind::S => 'S',
            Kind::Z => 'Z',
            Kind::J => 'J',
            Kind::L => 'L',
        }
    }
}

/// A rectangular boolean matrix. Always at least 1x1.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Shape {
    cells: Vec<Vec<bool>>,
}

impl Shape {
    pub fn width(&self) -> usize {
        self.cells[0].len()
    }

    #[cfg(test)]
    fn rows(&self) -> &[Vec<bool>] {
        &self.cells
    }

    /// Clockwise rotation: transpose, then reverse each row.
    /// Row `i` of the result is column `i` read bottom to top.
    pub fn rotated(&self) -> Shape {
        let cells = (0..self.width())
            .map(|col| self.cells.iter().rev().map(|row| row[col]).collect())
            .collect();
        Shape { cells }
    }

    /// Occupied cells as (col, row) offsets.
    pub fn occupied(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.cells.iter().enumerate().flat_map(|(y, row)| {
            row.iter().enumerate().filter(|(_, c)| **c).map(move |(x, _)| (x, y))
        })
    }
}

#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Piece {
    pub kind: Kind,
    pub shape: Shape,
    pub x: i32,
    pub y: i32,
}

impl Piece {
    /// Top row, horizontally centered.
    pub fn spawn(kind: Kind) -> Piece {
        let shape = kind.shape();
        let x = (BOARD_WIDTH / 2) as i32 - (shape.width() / 2) as i32;
        Piece { kind, shape, x, y: 0 }
    }

    pub fn shifted(&self, dx: i32, dy: i32) -> Piece {
        Piece { x: self.x + dx, y: self.y + dy, ..self.clone() }
    }

    pub fn rotated(&self) -> Piece {
        Piece { shape: self.shape.rotated(), ..self.clone() }
    }

    /// Absolute board coordinates of every occupied cell (may be negative).
    pub fn cells(&self) -> impl Iterator<Item = (i32, i32)> + '_ {
        self.shape.occupied().map(move |(cx, cy)| (self.x + cx as i32, self.y + cy as i32))
    }
}

// ── Board rules ──

pub fn is_valid(board: &Board, piece: &Piece) -> bool {
    piece.cells().all(|(x, y)| {
        if x < 0 || x >= BOARD_WIDTH as i32 || y >= BOARD_HEIGHT as i32 {
            return false;
        }
        y < 0 || !board[y as usize][x as usize]
    })
}

/// Merge the piece into the board. Cells above the top edge are dropped.
pub fn lock(board: &mut Board, piece: &Piece) {
    for (x, y) in piece.cells() {
        if y >= 0 && x >= 0 && (x as usize) < BOARD_WIDTH && (y as usize) < BOARD_HEIGHT {
            board[y as usize][x as usize] = true;
        }
    }
}

/// Remove every full row, keeping the order of the rest, and refill from the top.
/// Returns the number of rows removed.
pub fn clear_lines(board: &mut Board) -> u32 {
    let kept: Vec<Row> = board.iter().filter(|row| row.iter().any(|c| !c)).copied().collect();
    let cleared = BOARD_HEIGHT - kept.len();
    let mut next = empty_board();
    next[cleared..].copy_from_slice(&kept);
    *board = next;
    cleared as u32
}

#[cfg(test)]
fn filled_cells(board: &Board) -> usize {
    board.iter().map(|row| row.iter().filter(|c| **c).count()).sum()
}

pub fn level_for(lines: u32) -> u32 {
    lines / LINES_PER_LEVEL + 1
}

pub fn drop_interval_ms(level: u32) -> u64 {
    let speedup = u64::from(level.saturating_sub(1)) * DROP_STEP_MS;
    BASE_DROP_MS.saturating_sub(speedup).max(MIN_DROP_MS)
}

pub fn line_score(lines: u32, level: u32) -> u32 {
    lines * POINTS_PER_LINE * level
}

// ══════════════════════════════════════════════════════════════
// Game state machine
// ══════════════════════════════════════════════════════════════

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Move {
    Left,
    Right,
    Down,
    Rotate,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Status {
    Ready,
    Playing,
    Paused,
    Over,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum StepResult {
    /// Input ignored (not playing, or the move is blocked).
    Ignored,
    Moved,
    Rotated,
    Locked { lines: u32 },
    /// The piece locked and the next one could not spawn.
    GameOver { score: u32 },
}

pub struct Tetris {
    pub board: Board,
    pub current: Option<Piece>,
    pub next: Kind,
    pub score: u32,
    pub level: u32,
    pub lines: u32,
    pub status: Status,
    fall_acc_ms: u64,
}

impl Tetris {
    pub fn new(rng: &mut impl Rng) -> Self {
        Tetris {
            board: empty_board(),
            current: None,
            next: Kind::random(rng),
            score: 0,
            level: 1,
            lines: 0,
            status: Status::Ready,
            fall_acc_ms: 0,
        }
    }

    pub fn start(&mut self, rng: &mut impl Rng) {
        if self.status != Status::Ready {
            return;
        }
        self.current = Some(Piece::spawn(Kind::random(rng)));
        self.next = Kind::random(rng);
        self.status = Status::Playing;
        self.fall_acc_ms = 0;
    }

    pub fn toggle_pause(&mut self) {
        self.status = match self.status {
            Status::Playing => Status::Paused,
            Status::Paused => Status::Playing,
            other => other,
        };
    }

    pub fn drop_interval_ms(&self) -> u64 {
        drop_interval_ms(self.level)
    }

    /// Apply one player input.
    pub fn apply(&mut self, mv: Move, rng: &mut impl Rng) -> StepResult {
        if self.status != Status::Playing {
            return StepResult::Ignored;
        }
        let current = match &self.current {
            Some(p) => p,
            None => return StepResult::Ignored,
        };
        let candidate = match mv {
            Move::Left => current.shifted(-1, 0),
            Move::Right => current.shifted(1, 0),
            Move::Down => current.shifted(0, 1),
            Move::Rotate => current.rotated(),
        };

        if is_valid(&self.board, &candidate) {
            self.current = Some(candidate);
            return match mv {
                Move::Rotate => StepResult::Rotated,
                _ => StepResult::Moved,
            };
        }
        if mv == Move::Down {
            return self.lock_and_spawn(rng);
        }
        StepResult::Ignored
    }

    /// Advance gravity by `dt_ms`. Returns the result of the last gravity step, if any.
    pub fn tick(&mut self, dt_ms: u64, rng: &mut impl Rng) -> Option<StepResult> {
        if self.status != Status::Playing {
            return None;
        }
        self.fall_acc_ms += dt_ms;
        let mut last = None;
        while self.status == Status::Playing && self.fall_acc_ms >= self.drop_interval_ms() {
            self.fall_acc_ms -= self.drop_interval_ms();
            let result = self.apply(Move::Down, rng);
            let stop = matches!(result, StepResult::Locked { .. } | StepResult::GameOver { .. });
            last = Some(result);
            if stop {
                // A fresh piece always starts a full interval.
                self.fall_acc_ms = 0;
                break;
            }
        }
        last
    }

    fn lock_and_spawn(&mut self, rng: &mut impl Rng) -> StepResult {
        let piece = match self.current.take() {
            Some(p) => p,
            None => return StepResult::Ignored,
        };
        lock(&mut self.board, &piece);
        let cleared = clear_lines(&mut self.board);

        self.score += line_score(cleared, self.level);
        self.lines += cleared;
        self.level = level_for(self.lines);

        let spawned = Piece::spawn(self.next);
        self.next = Kind::random(rng);
        if is_valid(&self.board, &spawned) {
            self.current = Some(spawned);
            StepResult::Locked { lines: cleared }
        } else {
            self.status = Status::Over;
            StepResult::GameOver { score: self.score }
        }
    }

    /// Board with the falling piece drawn in, for rendering.
    pub fn composed(&self) -> Board {
        let mut view = self.board;
        if let Some(piece) = &self.current {
            lock(&mut view, piece);
        }
        view
    }
}

// ══════════════════════════════════════════════════════════════
// Unit tests
// ══════════════════════════════════════════════════════════════
