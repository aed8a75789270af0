/// Presentation layer: double-buffered, diff-based terminal renderer.
///
/// How it works:
///   1. Build the next frame into `front` buffer (array of Cell)
///   2. Compare each cell with `back` buffer (previous frame)
///   3. Only emit terminal commands for cells that changed
///   4. All commands are batched with `queue!`, flushed once at the end
///   5. Swap front/back
///
/// Layout (all screens):
///   row 0      header: title + screen name
///   row 2..    screen body
///   h-2        key hints (when enabled in settings)
///   h-1        status message bar

use std::io::{self, BufWriter, Write};

use crossterm::{
    cursor::{self, MoveTo},
    execute, queue,
    style::{Color, Print, ResetColor, SetBackgroundColor, SetForegroundColor},
    terminal::{self, Clear, ClearType},
};

use crate::domain::bridge::{self, Bridge, Plank, PLANKS, POSITIONS};
use crate::domain::crossroad::{self, CrossRoad};
use crate::domain::hideseek::{self, HideSeek, SPOTS};
use crate::domain::memory::{self, Memory, COLUMNS};
use crate::domain::quiz::{self, Quiz, QUESTIONS};
use crate::domain::reaction::{self, Reaction};
use crate::domain::rps::{Choice, Rps, Verdict, ROUNDS};
use crate::domain::snake::{self, Pos, Snake};
use crate::domain::tetris::{self, Tetris, BOARD_HEIGHT, BOARD_WIDTH};
use crate::domain::tictactoe::{self, Match, Mode, Outcome};
use crate::domain::GameId;
use crate::sim::storage::{KeyScheme, Theme};
use crate::sim::world::{MenuItem, Screen, Session, SettingRow, WorldState, MENU, SETTING_ROWS};

// ── Cell: the unit of the back-buffer ──

#[derive(Clone, Copy, PartialEq, Eq)]
struct Cell {
    ch: char,
    fg: Color,
    bg: Color,
}

impl Cell {
    /// Sentinel cell used to invalidate the back buffer.
    /// Different from any real cell, so every position will be diff'd.
    const INVALID: Cell = Cell { ch: '\u{0}', fg: Color::Magenta, bg: Color::Magenta };
}

// ── Palette: one per theme ──

#[derive(Clone, Copy)]
struct Palette {
    bg: Color,
    fg: Color,
    dim: Color,
    accent: Color,
    hi: Color,
    good: Color,
    bad: Color,
    bar_fg: Color,
    bar_bg: Color,
    panel: Color,
}

impl Palette {
    fn for_theme(theme: Theme) -> Palette {
        match theme {
            Theme::Dark => Palette {
                bg: Color::Rgb { r: 22, g: 22, b: 35 },
                fg: Color::White,
                dim: Color::DarkGrey,
                accent: Color::Rgb { r: 255, g: 200, b: 50 },
                hi: Color::Rgb { r: 80, g: 255, b: 80 },
                good: Color::Rgb { r: 80, g: 220, b: 120 },
                bad: Color::Rgb { r: 255, g: 70, b: 70 },
                bar_fg: Color::Black,
                bar_bg: Color::Rgb { r: 200, g: 180, b: 50 },
                panel: Color::Rgb { r: 40, g: 40, b: 60 },
            },
            Theme::Light => Palette {
                bg: Color::Rgb { r: 238, g: 236, b: 226 },
                fg: Color::Rgb { r: 30, g: 30, b: 40 },
                dim: Color::Rgb { r: 130, g: 130, b: 130 },
                accent: Color::Rgb { r: 170, g: 90, b: 0 },
                hi: Color::Rgb { r: 0, g: 120, b: 40 },
                good: Color::Rgb { r: 0, g: 140, b: 60 },
                bad: Color::Rgb { r: 200, g: 30, b: 30 },
                bar_fg: Color::White,
                bar_bg: Color::Rgb { r: 60, g: 60, b: 110 },
                panel: Color::Rgb { r: 215, g: 212, b: 200 },
            },
        }
    }
}

// ── FrameBuffer: a 2D grid of Cells ──

struct FrameBuffer {
    width: usize,
    height: usize,
    cells: Vec<Cell>,
    blank: Cell,
}

impl FrameBuffer {
    fn new(w: usize, h: usize) -> Self {
        let blank = Cell { ch: ' ', fg: Color::White, bg: Color::Black };
        FrameBuffer { width: w, height: h, cells: vec![blank; w * h], blank }
    }

    fn resize(&mut self, w: usize, h: usize) {
        if self.width != w || self.height != h {
            self.width = w;
            self.height = h;
            self.cells = vec![self.blank; w * h];
        }
    }

    fn clear(&mut self, blank: Cell) {
        self.blank = blank;
        self.cells.fill(blank);
    }

    fn set(&mut self, x: usize, y: usize, cell: Cell) {
        if x < self.width && y < self.height {
            self.cells[y * self.width + x] = cell;
        }
    }

    fn get(&self, x: usize, y: usize) -> Cell {
        if x < self.width && y < self.height {
            self.cells[y * self.width + x]
        } else {
            self.blank
        }
    }

    /// Write a string at (x, y). Each char occupies 1 column; clipped at the edge.
    fn put_str(&mut self, x: usize, y: usize, s: &str, fg: Color, bg: Color) {
        for (i, ch) in s.chars().enumerate() {
            if x + i >= self.width {
                break;
            }
            self.set(x + i, y, Cell { ch, fg, bg });
        }
    }

    fn fill_row(&mut self, y: usize, bg: Color) {
        for x in 0..self.width {
            self.set(x, y, Cell { ch: ' ', fg: bg, bg });
        }
    }
}

// ── Renderer ──

/// Terminal columns per board cell, so grids look square.
const CELL_W: usize = 2;

const HEADER_ROW: usize = 0;
const BODY_ROW: usize = 2;
const LEFT: usize = 4;

pub struct Renderer {
    writer: BufWriter<io::Stdout>,
    front: FrameBuffer,
    back: FrameBuffer,
    term_w: usize,
    term_h: usize,
    last_view: Option<(Screen, Option<GameId>, Theme)>,
    pal: Palette,
}

impl Renderer {
    pub fn new() -> Self {
        Renderer {
            writer: BufWriter::with_capacity(16384, io::stdout()),
            front: FrameBuffer::new(0, 0),
            back: FrameBuffer::new(0, 0),
            term_w: 0,
            term_h: 0,
            last_view: None,
            pal: Palette::for_theme(Theme::Dark),
        }
    }

    pub fn init(&mut self) -> io::Result<()> {
        terminal::enable_raw_mode()?;
        execute!(
            self.writer,
            terminal::EnterAlternateScreen,
            cursor::Hide,
            SetBackgroundColor(self.pal.bg),
            Clear(ClearType::All)
        )?;

        let (tw, th) = terminal::size().unwrap_or((80, 24));
        self.term_w = tw as usize;
        self.term_h = th as usize;
        self.front.resize(self.term_w, self.term_h);
        self.back.resize(self.term_w, self.term_h);
        // Force full repaint on first frame.
        self.back.cells.fill(Cell::INVALID);

        Ok(())
    }

    pub fn cleanup(&mut self) -> io::Result<()> {
        execute!(self.writer, ResetColor, cursor::Show, terminal::LeaveAlternateScreen)?;
        terminal::disable_raw_mode()
    }

    pub fn render(&mut self, world: &WorldState) -> io::Result<()> {
        self.pal = Palette::for_theme(world.settings().theme);

        let (tw, th) = terminal::size().unwrap_or((80, 24));
        let view = (world.screen, world.active_game(), world.settings().theme);
        let resized = tw as usize != self.term_w || th as usize != self.term_h;
        if resized {
            self.term_w = tw as usize;
            self.term_h = th as usize;
            self.front.resize(self.term_w, self.term_h);
            self.back.resize(self.term_w, self.term_h);
        }
        // Screen or theme change → clear for a clean transition.
        if resized || self.last_view != Some(view) {
            self.back.cells.fill(Cell::INVALID);
            queue!(self.writer, SetBackgroundColor(self.pal.bg), Clear(ClearType::All))?;
            self.last_view = Some(view);
        }

        self.front.clear(Cell { ch: ' ', fg: self.pal.fg, bg: self.pal.bg });
        self.compose_header(world);

        match world.screen {
            Screen::Launcher => self.compose_launcher(world),
            Screen::Game => self.compose_game(world),
            Screen::Profile => self.compose_profile(world),
            Screen::Leaderboard => self.compose_leaderboard(world),
            Screen::Settings => self.compose_settings(world),
        }

        if world.settings().show_hints {
            let hints = hints_for(world);
            let row = self.front.height.saturating_sub(2);
            self.text(1, row, &hints, self.pal.dim);
        }
        self.compose_message_bar(world);

        if world.confirm_exit {
            self.compose_confirm_overlay();
        }

        self.flush_diff()?;
        std::mem::swap(&mut self.front, &mut self.back);
        Ok(())
    }

    // ── Diff flush: only write changed cells ──

    fn flush_diff(&mut self) -> io::Result<()> {
        let mut last_fg = self.pal.fg;
        let mut last_bg = self.pal.bg;
        let mut need_move = true;
        let mut last_x: usize = 0;
        let mut last_y: usize = 0;

        // Explicit base colors at start of frame; ResetColor would fall back
        // to the terminal's own default and leave seams.
        queue!(self.writer, SetForegroundColor(last_fg), SetBackgroundColor(last_bg))?;

        for y in 0..self.front.height {
            for x in 0..self.front.width {
                let cell = self.front.get(x, y);
                if cell == self.back.get(x, y) {
                    need_move = true;
                    continue;
                }

                if need_move || x != last_x + 1 || y != last_y {
                    queue!(self.writer, MoveTo(x as u16, y as u16))?;
                    need_move = false;
                }
                if cell.fg != last_fg {
                    queue!(self.writer, SetForegroundColor(cell.fg))?;
                    last_fg = cell.fg;
                }
                if cell.bg != last_bg {
                    queue!(self.writer, SetBackgroundColor(cell.bg))?;
                    last_bg = cell.bg;
                }
                queue!(self.writer, Print(cell.ch))?;
                last_x = x;
                last_y = y;
            }
        }

        self.writer.flush()
    }

    // ── Small drawing helpers ──

    fn text(&mut self, x: usize, y: usize, s: &str, fg: Color) {
        let bg = self.pal.bg;
        self.front.put_str(x, y, s, fg, bg);
    }

    fn text_on(&mut self, x: usize, y: usize, s: &str, fg: Color, bg: Color) {
        self.front.put_str(x, y, s, fg, bg);
    }

    /// Board cell at grid (gx, gy) relative to (x0, y0), two columns wide.
    fn block(&mut self, x0: usize, y0: usize, gx: usize, gy: usize, s: &str, fg: Color, bg: Color) {
        self.front.put_str(x0 + gx * CELL_W, y0 + gy, s, fg, bg);
    }

    fn frame(&mut self, x: usize, y: usize, inner_w: usize, inner_h: usize) {
        let c = self.pal.dim;
        let horiz: String = "─".repeat(inner_w);
        self.text(x, y, &format!("┌{horiz}┐"), c);
        for row in 0..inner_h {
            self.text(x, y + 1 + row, "│", c);
            self.text(x + inner_w + 1, y + 1 + row, "│", c);
        }
        self.text(x, y + inner_h + 1, &format!("└{horiz}┘"), c);
    }

    fn selector(&mut self, x: usize, y: usize, label: &str, selected: bool) {
        if selected {
            let (fg, bg) = (self.pal.bg, self.pal.hi);
            self.text_on(x, y, &format!(" ▸ {label} "), fg, bg);
        } else {
            self.text(x, y, &format!("   {label} "), self.pal.fg);
        }
    }

    // ── Frame chrome ──

    fn compose_header(&mut self, w: &WorldState) {
        let title = match w.screen {
            Screen::Launcher => "Launcher".to_string(),
            Screen::Game => w.active_game().map_or("", GameId::title).to_string(),
            Screen::Profile => "Profile".to_string(),
            Screen::Leaderboard => "Leaderboard".to_string(),
            Screen::Settings => "Settings".to_string(),
        };
        let panel = self.pal.panel;
        self.front.fill_row(HEADER_ROW, panel);
        let head = format!(" ◈ POCKET ARCADE  │  {title}");
        self.text_on(0, HEADER_ROW, &head, self.pal.accent, panel);
        let who = format!("{} ", w.records.profile.username);
        let x = self.front.width.saturating_sub(who.chars().count());
        self.text_on(x, HEADER_ROW, &who, self.pal.fg, panel);
    }

    fn compose_message_bar(&mut self, w: &WorldState) {
        if w.message.is_empty() {
            return;
        }
        let row = self.front.height.saturating_sub(1);
        let (fg, bg) = (self.pal.bar_fg, self.pal.bar_bg);
        self.front.fill_row(row, bg);
        self.text_on(0, row, &format!(" ◈ {} ", w.message), fg, bg);
    }

    fn compose_confirm_overlay(&mut self) {
        let box_w = 34;
        let box_h = 5;
        let x0 = self.front.width.saturating_sub(box_w) / 2;
        let y0 = self.front.height.saturating_sub(box_h) / 2;
        let panel = self.pal.panel;
        for y in y0..y0 + box_h {
            for x in x0..x0 + box_w {
                self.front.set(x, y, Cell { ch: ' ', fg: panel, bg: panel });
            }
        }
        self.text_on(x0 + 3, y0 + 1, "Leave this game?", self.pal.accent, panel);
        self.text_on(x0 + 3, y0 + 3, "Y / Enter: leave   N / Esc: stay", self.pal.fg, panel);
    }

    // ── Launcher ──

    fn compose_launcher(&mut self, w: &WorldState) {
        let logo = [
            r" ___         _       _       _                    _     ",
            r"| _ \___  __| |_____| |_    /_\  _ _ __ __ _ __| |___ ",
            r"|  _/ _ \/ _| / / -_)  _|  / _ \| '_/ _/ _` / _` / -_)",
            r"|_| \___/\__|_\_\___|\__| /_/ \_\_| \__\__,_\__,_\___|",
        ];
        for (i, line) in logo.iter().enumerate() {
            self.text(LEFT, BODY_ROW + i, line, self.pal.accent);
        }

        let base = BODY_ROW + logo.len() + 2;
        for (i, item) in MENU.iter().enumerate() {
            let selected = i == w.menu_cursor;
            let (label, note) = match item {
                MenuItem::Game(g) => (
                    g.title().to_string(),
                    best_value(w, *g).map_or(String::new(), |b| format!("best {b}")),
                ),
                MenuItem::Profile => ("Profile".to_string(), String::new()),
                MenuItem::Leaderboard => ("Leaderboard".to_string(), String::new()),
                MenuItem::Settings => ("Settings".to_string(), String::new()),
                MenuItem::Quit => ("Quit".to_string(), String::new()),
            };
            // Separate the games from the rest of the menu.
            let row = base + i + usize::from(!matches!(item, MenuItem::Game(_)));
            self.selector(LEFT, row, &format!("{label:<22}"), selected);
            self.text(LEFT + 28, row, &note, self.pal.dim);
        }

        if let Some(MenuItem::Game(g)) = MENU.get(w.menu_cursor) {
            let row = base + MENU.len() + 2;
            self.text(LEFT, row, g.blurb(), self.pal.fg);
        }
    }

    // ── Games ──

    fn compose_game(&mut self, w: &WorldState) {
        let Some(session) = &w.session else { return };
        match session {
            Session::Snake(g) => self.compose_snake(w, g),
            Session::Tetris(g) => self.compose_tetris(w, g),
            Session::TicTacToe(g) => self.compose_tictactoe(g),
            Session::Memory(g) => self.compose_memory(w, g),
            Session::Rps(g) => self.compose_rps(w, g),
            Session::Quiz(g) => self.compose_quiz(w, g),
            Session::Reaction(g) => self.compose_reaction(g),
            Session::RopeBridge(g) => self.compose_bridge(g),
            Session::HideSeek(g) => self.compose_hideseek(w, g),
            Session::CrossRoad(g) => self.compose_crossroad(g),
        }
    }

    fn compose_snake(&mut self, w: &WorldState, g: &Snake) {
        let n = snake::GRID as usize;
        let (x0, y0) = (LEFT, BODY_ROW);
        self.frame(x0, y0, n * CELL_W, n);
        let (gx, gy) = (x0 + 1, y0 + 1);

        let food = g.food;
        self.block(gx, gy, food.x as usize, food.y as usize, "●", self.pal.bad, self.pal.bg);
        for (i, &Pos { x, y }) in g.body.iter().enumerate() {
            let fg = if i == 0 { self.pal.hi } else { self.pal.good };
            self.block(gx, gy, x as usize, y as usize, "██", fg, self.pal.bg);
        }

        let side = x0 + n * CELL_W + 5;
        self.text(side, y0 + 1, &format!("Score   {}", g.score), self.pal.fg);
        self.text(side, y0 + 2, &format!("Length  {}", g.body.len()), self.pal.fg);
        self.text(side, y0 + 3, &format!("Best    {}", best_or_dash(w, GameId::Snake)), self.pal.dim);
        let (status, color) = match g.status {
            snake::Status::Ready => ("SPACE to start", self.pal.accent),
            snake::Status::Playing => ("", self.pal.fg),
            snake::Status::Paused => ("PAUSED", self.pal.accent),
            snake::Status::Over => ("GAME OVER  (R to restart)", self.pal.bad),
        };
        self.text(side, y0 + 5, status, color);
    }

    fn compose_tetris(&mut self, w: &WorldState, g: &Tetris) {
        let (x0, y0) = (LEFT, BODY_ROW);
        self.frame(x0, y0, BOARD_WIDTH * CELL_W, BOARD_HEIGHT);
        let view = g.composed();
        for (y, row) in view.iter().enumerate() {
            for (x, &filled) in row.iter().enumerate() {
                let (s, fg) = if filled { ("[]", self.pal.accent) } else { (" .", self.pal.dim) };
                self.block(x0 + 1, y0 + 1, x, y, s, fg, self.pal.bg);
            }
        }

        let side = x0 + BOARD_WIDTH * CELL_W + 5;
        self.text(side, y0 + 1, &format!("Score  {}", g.score), self.pal.fg);
        self.text(side, y0 + 2, &format!("Level  {}", g.level), self.pal.fg);
        self.text(side, y0 + 3, &format!("Lines  {}", g.lines), self.pal.fg);
        self.text(side, y0 + 4, &format!("Best   {}", best_or_dash(w, GameId::Tetris)), self.pal.dim);

        self.text(side, y0 + 6, &format!("Next ({})", g.next.name()), self.pal.dim);
        for (rx, ry) in g.next.shape().occupied() {
            self.block(side, y0 + 7, rx, ry, "[]", self.pal.accent, self.pal.bg);
        }

        let (status, color) = match g.status {
            tetris::Status::Ready => ("ENTER to start", self.pal.accent),
            tetris::Status::Playing => ("", self.pal.fg),
            tetris::Status::Paused => ("PAUSED", self.pal.accent),
            tetris::Status::Over => ("GAME OVER  (Enter: again)", self.pal.bad),
        };
        self.text(side, y0 + 11, status, color);
    }

    fn compose_tictactoe(&mut self, g: &Match) {
        let (x0, y0) = (LEFT + 2, BODY_ROW + 1);
        for row in 0..3 {
            for col in 0..3 {
                let cell = row * 3 + col;
                let mark = g.board[cell].map_or(' ', tictactoe::Mark::symbol);
                let fg = match g.board[cell] {
                    Some(tictactoe::Mark::X) => self.pal.hi,
                    Some(tictactoe::Mark::O) => self.pal.bad,
                    None => self.pal.dim,
                };
                let label = if g.board[cell].is_none() { char::from(b'1' + cell as u8) } else { mark };
                let x = x0 + col * 6;
                let y = y0 + row * 2;
                if cell == g.cursor && g.outcome.is_none() {
                    let (cfg, cbg) = (self.pal.bg, self.pal.accent);
                    self.text_on(x, y, &format!("  {label}  "), cfg, cbg);
                } else {
                    self.text(x, y, &format!("  {label}  "), fg);
                }
                if col < 2 {
                    self.text(x + 5, y, "│", self.pal.dim);
                }
            }
            if row < 2 {
                self.text(x0, y0 + row * 2 + 1, "─────┼─────┼─────", self.pal.dim);
            }
        }

        let side = x0 + 24;
        let mode = match g.mode {
            Mode::VsAi => "You (X) vs Computer (O)",
            Mode::TwoPlayer => "Two players",
        };
        self.text(side, y0, mode, self.pal.fg);
        self.text(side, y0 + 2, &format!("X wins  {}", g.tally.x), self.pal.hi);
        self.text(side, y0 + 3, &format!("O wins  {}", g.tally.o), self.pal.bad);
        self.text(side, y0 + 4, &format!("Draws   {}", g.tally.draws), self.pal.dim);

        let (status, color) = match g.outcome {
            Some(Outcome::Win(m)) => (format!("{} wins!  (Enter: next round)", m.symbol()), self.pal.accent),
            Some(Outcome::Draw) => ("Draw.  (Enter: next round)".to_string(), self.pal.accent),
            None if g.ai_thinking() => ("Computer is thinking...".to_string(), self.pal.dim),
            None => (format!("{} to move", g.turn.symbol()), self.pal.fg),
        };
        self.text(x0, y0 + 7, &status, color);
    }

    fn compose_memory(&mut self, w: &WorldState, g: &Memory) {
        let (x0, y0) = (LEFT + 2, BODY_ROW + 1);
        for (i, card) in g.cards.iter().enumerate() {
            let x = x0 + (i % COLUMNS) * 6;
            let y = y0 + (i / COLUMNS) * 2;
            let (face, fg) = if card.matched {
                (card.symbol, self.pal.good)
            } else if card.face_up {
                (card.symbol, self.pal.accent)
            } else {
                ('?', self.pal.dim)
            };
            let label = format!("[ {face} ]");
            if i == g.cursor && !g.won {
                let (cfg, cbg) = (self.pal.bg, self.pal.hi);
                self.text_on(x, y, &label, cfg, cbg);
            } else {
                self.text(x, y, &label, fg);
            }
        }

        let side = x0 + COLUMNS * 6 + 4;
        self.text(side, y0, &format!("Moves  {}", g.moves), self.pal.fg);
        self.text(side, y0 + 1, &format!("Pairs  {}/{}", g.matches, memory::SYMBOLS.len()), self.pal.fg);
        self.text(side, y0 + 2, &format!("Time   {}s", g.seconds()), self.pal.fg);
        self.text(side, y0 + 3, &format!("Best   {}", best_or_dash(w, GameId::Memory)), self.pal.dim);
        if g.won {
            let msg = format!("All pairs found!  Rating: {}", memory::rating(g.moves));
            self.text(x0, y0 + 9, &msg, self.pal.accent);
            self.text(x0, y0 + 10, "Enter: play again", self.pal.dim);
        }
    }

    fn compose_rps(&mut self, w: &WorldState, g: &Rps) {
        let (x0, y0) = (LEFT, BODY_ROW + 1);
        self.text(x0, y0, &format!("Round {}/{}", g.round, ROUNDS), self.pal.fg);
        let score = format!(
            "You {}   Computer {}   Draws {}",
            g.score.player, g.score.computer, g.score.draws
        );
        self.text(x0, y0 + 1, &score, self.pal.fg);

        for (i, choice) in Choice::ALL.iter().enumerate() {
            let label = format!("{} {}", i + 1, choice.name());
            self.selector(x0 + i * 16, y0 + 3, &label, i == w.pick_cursor && !g.over);
        }

        if g.revealing() {
            self.text(x0, y0 + 5, "Computer is choosing...", self.pal.dim);
        } else if let Some(round) = g.last {
            let (verdict, color) = match round.verdict {
                Verdict::Win => ("You win the round!", self.pal.good),
                Verdict::Lose => ("Computer wins the round.", self.pal.bad),
                Verdict::Draw => ("Draw.", self.pal.accent),
            };
            let line = format!("{} vs {}  →  {verdict}", round.player.name(), round.computer.name());
            self.text(x0, y0 + 5, &line, color);
        }

        if g.over {
            let (msg, color) = match g.match_verdict() {
                Verdict::Win => ("You won the match!", self.pal.good),
                Verdict::Lose => ("The computer won the match.", self.pal.bad),
                Verdict::Draw => ("The match is a draw.", self.pal.accent),
            };
            self.text(x0, y0 + 7, msg, color);
            self.text(x0, y0 + 8, "Enter: new match", self.pal.dim);
        }
    }

    fn compose_quiz(&mut self, w: &WorldState, g: &Quiz) {
        let (x0, y0) = (LEFT, BODY_ROW + 1);
        match g.phase {
            quiz::Phase::Idle => {
                let intro = format!("{} questions, {} seconds each.", QUESTIONS.len(), w.timing.quiz_seconds);
                self.text(x0, y0, &intro, self.pal.fg);
                self.text(x0, y0 + 2, "Press Enter to begin.", self.pal.accent);
            }
            quiz::Phase::Complete => {
                let msg = format!("Quiz complete! You scored {}/{}.", g.score, QUESTIONS.len());
                self.text(x0, y0, &msg, self.pal.accent);
                self.text(x0, y0 + 2, "Enter: try again", self.pal.dim);
            }
            quiz::Phase::Asking { .. } | quiz::Phase::Reveal { .. } => {
                let q = g.question();
                let header = format!("Question {}/{}   Score {}", g.index + 1, QUESTIONS.len(), g.score);
                self.text(x0, y0, &header, self.pal.dim);
                self.text(x0, y0 + 2, q.prompt, self.pal.fg);
                let reveal = match g.phase {
                    quiz::Phase::Reveal { selected, .. } => Some(selected),
                    _ => None,
                };
                for (i, option) in q.options.iter().enumerate() {
                    let label = format!("{} {}", i + 1, option);
                    let row = y0 + 4 + i;
                    match reveal {
                        Some(_) if i == q.answer => self.text(x0, row, &format!(" ✓ {label}"), self.pal.good),
                        Some(Some(sel)) if sel == i => self.text(x0, row, &format!(" ✗ {label}"), self.pal.bad),
                        Some(_) => self.text(x0, row, &format!("   {label}"), self.pal.dim),
                        None => self.selector(x0, row, &label, i == w.pick_cursor),
                    }
                }
                let status = match g.phase {
                    quiz::Phase::Reveal { selected: None, .. } => "Time's up!".to_string(),
                    quiz::Phase::Reveal { selected: Some(s), .. } if s == q.answer => "Correct!".to_string(),
                    quiz::Phase::Reveal { .. } => "Wrong answer.".to_string(),
                    _ => format!("{}s left", g.seconds_left()),
                };
                self.text(x0, y0 + 9, &status, self.pal.accent);
            }
        }
    }

    fn compose_reaction(&mut self, g: &Reaction) {
        let (x0, y0) = (LEFT, BODY_ROW + 1);
        let (msg, bg) = match g.state {
            reaction::State::Waiting => ("Press Enter to start".to_string(), self.pal.panel),
            reaction::State::Ready { .. } => ("Wait for green...".to_string(), self.pal.bad),
            reaction::State::Go { .. } => ("PRESS NOW!".to_string(), self.pal.good),
            reaction::State::Result { ms } => (
                format!("{ms} ms  ·  {}  (Enter: again)", reaction::rating(ms)),
                self.pal.panel,
            ),
            reaction::State::TooEarly => ("Too early! Enter to retry".to_string(), self.pal.panel),
        };
        let box_w = 44;
        for y in y0..y0 + 5 {
            for x in x0..x0 + box_w {
                self.front.set(x, y, Cell { ch: ' ', fg: bg, bg });
            }
        }
        let fg = self.pal.fg;
        self.text_on(x0 + 3, y0 + 2, &msg, fg, bg);

        let best = g.best_ms.map_or("-".to_string(), |b| format!("{b} ms"));
        let avg = g.average_ms().map_or("-".to_string(), |a| format!("{a} ms"));
        self.text(x0, y0 + 7, &format!("Attempts {}   Average {avg}   Best {best}", g.attempts), self.pal.fg);
        let history: Vec<String> = g.history.iter().map(|t| t.to_string()).collect();
        if !history.is_empty() {
            self.text(x0, y0 + 8, &format!("Recent: {}", history.join(", ")), self.pal.dim);
        }
        if let reaction::State::Result { ms } = g.state {
            self.text(x0, y0 + 9, &format!("Score {}", reaction::score_for(ms)), self.pal.accent);
        }
    }

    fn compose_bridge(&mut self, g: &Bridge) {
        let (x0, y0) = (LEFT, BODY_ROW + 1);
        self.text(x0, y0, &format!("Crossings {}   Steps taken {}", g.score, g.attempts), self.pal.fg);
        for plank in 0..PLANKS {
            let row = y0 + 2 + plank * 2;
            let marker = if g.state == bridge::State::Crossing && plank == g.current { "▶" } else { " " };
            self.text(x0, row, &format!("{marker} Plank {}", plank + 1), self.pal.fg);
            for pos in 1..=POSITIONS {
                let answer = g.revealed(plank);
                let (s, fg) = match (g.planks[plank], answer) {
                    (_, Some(a)) if a == pos => ("▓▓", self.pal.good),
                    (Plank::Safe, None) => ("══", self.pal.good),
                    (Plank::Broken, _) => ("╳╳", self.pal.bad),
                    _ => ("░░", self.pal.dim),
                };
                self.block(x0 + 12, row, usize::from(pos - 1) * 2, 0, s, fg, self.pal.bg);
            }
        }
        let status = match g.state {
            bridge::State::Waiting => "Enter to step onto the bridge. Keys 1-5 pick a position.",
            bridge::State::Crossing => "Which position is safe? (1-5)",
            bridge::State::Crossed => "You made it across!  (Enter: cross again)",
            bridge::State::Fell => "The plank gave way!  (Enter: try again)",
        };
        self.text(x0, y0 + 3 + PLANKS * 2, status, self.pal.accent);
    }

    fn compose_hideseek(&mut self, w: &WorldState, g: &HideSeek) {
        let (x0, y0) = (LEFT, BODY_ROW + 1);
        let header = format!("Times hidden {}   Rounds {}", g.score, g.games_played);
        self.text(x0, y0, &header, self.pal.fg);
        let chosen = match g.state {
            hideseek::State::Hiding { spot, .. } | hideseek::State::Result { spot, .. } => Some(spot),
            hideseek::State::Waiting => None,
        };
        for (i, spot) in SPOTS.iter().enumerate() {
            let label = format!("{} {:<16} {:>3}% safe", i + 1, spot.name, spot.safety);
            let row = y0 + 2 + i;
            if g.state == hideseek::State::Waiting {
                self.selector(x0, row, &label, i == w.pick_cursor);
            } else {
                let fg = if chosen == Some(i) { self.pal.accent } else { self.pal.dim };
                self.text(x0, row, &format!("   {label}"), fg);
            }
        }
        let row = y0 + 3 + SPOTS.len();
        match g.state {
            hideseek::State::Waiting => self.text(x0, row, "Pick a hiding spot.", self.pal.accent),
            hideseek::State::Hiding { progress, .. } => {
                let filled = ((progress.clamp(0.0, 100.0) / 100.0) * 30.0) as usize;
                let bar = format!("Seeker [{}{}] {:>3.0}%", "█".repeat(filled), " ".repeat(30 - filled), progress);
                self.text(x0, row, &bar, self.pal.bad);
            }
            hideseek::State::Result { found: true, .. } => {
                self.text(x0, row, "Found you!  (Enter: play again)", self.pal.bad);
            }
            hideseek::State::Result { found: false, .. } => {
                self.text(x0, row, "The seeker gave up. You win!  (Enter: play again)", self.pal.good);
            }
        }
    }

    fn compose_crossroad(&mut self, g: &CrossRoad) {
        let n = crossroad::GRID as usize;
        let (x0, y0) = (LEFT, BODY_ROW);
        self.frame(x0, y0, n * CELL_W, n);
        let (gx, gy) = (x0 + 1, y0 + 1);
        for y in 0..n {
            let (s, fg) = if y == 0 {
                ("▒▒", self.pal.good)
            } else if y % 2 == 1 && y <= 7 {
                ("- ", self.pal.dim)
            } else {
                ("  ", self.pal.dim)
            };
            for x in 0..n {
                self.block(gx, gy, x, y, s, fg, self.pal.bg);
            }
        }
        for car in &g.cars {
            let x = car.x.round();
            if (0.0..n as f32).contains(&x) {
                let glyph = if car.speed > 0.0 { "▶▶" } else { "◀◀" };
                self.block(gx, gy, x as usize, car.y as usize, glyph, self.pal.bad, self.pal.bg);
            }
        }
        let (px, py) = g.player;
        let player_fg = if g.state == crossroad::State::Crashed { self.pal.bad } else { self.pal.hi };
        self.block(gx, gy, px as usize, py as usize, "@@", player_fg, self.pal.bg);

        let side = x0 + n * CELL_W + 5;
        self.text(side, y0 + 1, &format!("Score  {}", g.score), self.pal.fg);
        self.text(side, y0 + 2, &format!("Level  {}", g.level), self.pal.fg);
        let status = match g.state {
            crossroad::State::Waiting => "Enter to start",
            crossroad::State::Playing => "",
            crossroad::State::Crashed => "SPLAT!  (Enter: again)",
            crossroad::State::Won => "Made it!  (Enter: again)",
        };
        self.text(side, y0 + 4, status, self.pal.accent);
    }

    // ── Profile / leaderboard / settings ──

    fn compose_profile(&mut self, w: &WorldState) {
        let p = &w.records.profile;
        let (x0, y0) = (LEFT, BODY_ROW);
        match &w.name_edit {
            Some(buf) => {
                let (fg, bg) = (self.pal.bg, self.pal.accent);
                self.text(x0, y0, "Username ", self.pal.dim);
                let caret = if (w.anim_tick / 8) % 2 == 0 { '_' } else { ' ' };
                self.text_on(x0 + 9, y0, &format!("{buf}{caret}"), fg, bg);
            }
            None => self.text(x0, y0, &format!("Username {}", p.username), self.pal.fg),
        }
        self.text(x0, y0 + 1, &format!("Joined   {}", p.join_date.format("%Y-%m-%d")), self.pal.fg);
        self.text(x0, y0 + 2, &format!("Played   {}", p.games_played), self.pal.fg);
        self.text(x0, y0 + 3, &format!("Total    {}", p.total_score), self.pal.accent);

        self.text(x0, y0 + 5, &format!("{:<22}{:>10}{:>12}", "Game", "Best", "Best time"), self.pal.dim);
        for (i, game) in GameId::ALL.iter().enumerate() {
            let score = p.best_score(*game).map_or("-".to_string(), |s| s.to_string());
            let time = p
                .best_time(*game)
                .map_or("-".to_string(), |t| format!("{t}{}", game.time_unit()));
            let line = format!("{:<22}{:>10}{:>12}", game.title(), score, time);
            self.text(x0, y0 + 6 + i, &line, self.pal.fg);
        }
    }

    fn compose_leaderboard(&mut self, w: &WorldState) {
        let (x0, y0) = (LEFT, BODY_ROW);
        let filter = w.board_filter.map_or("All games", GameId::title);
        self.text(x0, y0, &format!("◀  {filter}  ▶"), self.pal.accent);
        self.text(x0, y0 + 2, &format!("{:>4}  {:<17}{:<22}{:>8}  {}", "#", "Player", "Game", "Score", "Date"), self.pal.dim);

        let rows = self.front.height.saturating_sub(y0 + 6).max(1);
        let mut any = false;
        for (i, e) in w.records.leaderboard.filtered(w.board_filter).take(rows).enumerate() {
            any = true;
            let line = format!(
                "{:>4}  {:<17}{:<22}{:>8}  {}",
                i + 1,
                e.player_name,
                e.game.title(),
                e.score,
                e.date.format("%Y-%m-%d")
            );
            let fg = if i < 3 { self.pal.accent } else { self.pal.fg };
            self.text(x0, y0 + 3 + i, &line, fg);
        }
        if !any {
            self.text(x0, y0 + 3, "No scores yet. Go play something!", self.pal.dim);
        }
    }

    fn compose_settings(&mut self, w: &WorldState) {
        let s = w.settings();
        let (x0, y0) = (LEFT, BODY_ROW);
        for (i, row) in SETTING_ROWS.iter().enumerate() {
            let (name, value) = match row {
                SettingRow::Theme => ("Theme", match s.theme {
                    Theme::Dark => "dark",
                    Theme::Light => "light",
                }),
                SettingRow::ShowHints => ("Show key hints", on_off(s.show_hints)),
                SettingRow::ConfirmExit => ("Confirm leaving a game", on_off(s.confirm_exit)),
                SettingRow::AutoSave => ("Record scores", on_off(s.auto_save)),
                SettingRow::KeyScheme => ("Hint keys", match s.key_scheme {
                    KeyScheme::Wasd => "WASD",
                    KeyScheme::Arrows => "arrows",
                }),
            };
            self.selector(x0, y0 + i, &format!("{name:<26}{value:>8}"), i == w.settings_cursor);
        }
        let data = format!("Data: {}", w.records.storage.dir().display());
        self.text(x0, y0 + SETTING_ROWS.len() + 2, &data, self.pal.dim);
    }
}

fn on_off(v: bool) -> &'static str {
    if v { "on" } else { "off" }
}

/// Personal best for a game: the time record for timed games, else the score.
fn best_value(w: &WorldState, game: GameId) -> Option<String> {
    let p = &w.records.profile;
    let time = game
        .records_time()
        .then(|| p.best_time(game))
        .flatten()
        .map(|t| format!("{t}{}", game.time_unit()));
    time.or_else(|| p.best_score(game).map(|s| s.to_string()))
}

fn best_or_dash(w: &WorldState, game: GameId) -> String {
    best_value(w, game).unwrap_or_else(|| "-".to_string())
}

/// Footer key hints for the current screen, in the user's preferred key scheme.
fn hints_for(w: &WorldState) -> String {
    let arrows = match w.settings().key_scheme {
        KeyScheme::Wasd => "WASD",
        KeyScheme::Arrows => "←↑↓→",
    };
    match w.screen {
        Screen::Launcher => format!("{arrows} choose   Enter open   Q quit"),
        Screen::Profile if w.name_edit.is_some() => "type a name   Enter save   Esc cancel".to_string(),
        Screen::Profile => "E edit name   Esc back".to_string(),
        Screen::Leaderboard => format!("{arrows} filter by game   Esc back"),
        Screen::Settings => "↑↓ choose   Enter toggle   S save   D defaults   Esc back".to_string(),
        Screen::Game => {
            let keys = match w.active_game() {
                Some(GameId::Snake) => format!("{arrows} steer   Space start/pause"),
                Some(GameId::Tetris) => format!("{arrows} move   ↑/Enter rotate   ↓ drop   P pause"),
                Some(GameId::TicTacToe) => format!("{arrows}/1-9 pick   Enter place   M mode   0 clear scores"),
                Some(GameId::Memory) => format!("{arrows} move   Enter flip"),
                Some(GameId::Rps) => format!("{arrows}/1-3 choose   Enter throw"),
                Some(GameId::Quiz) => format!("{arrows}/1-4 choose   Enter answer"),
                Some(GameId::Reaction) => "Enter / Space press".to_string(),
                Some(GameId::RopeBridge) => "1-5 step   Enter start".to_string(),
                Some(GameId::HideSeek) => format!("{arrows}/1-8 choose   Enter hide"),
                Some(GameId::CrossRoad) => format!("{arrows} hop   Enter start"),
                None => String::new(),
            };
            format!("{keys}   R restart   Esc back")
        }
    }
}
