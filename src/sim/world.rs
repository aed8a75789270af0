/// WorldState: everything the shell needs between frames.
///
/// ## Screens
///
///   Launcher ──Enter──> Game ──Esc──> Launcher
///       │                 (confirm overlay when `confirm_exit` is on)
///       ├──> Profile      (username editing)
///       ├──> Leaderboard  (left/right cycles the game filter)
///       └──> Settings     (S saves, D restores defaults)
///
/// At most one game session is alive; leaving a game drops it.

use rand::rngs::StdRng;

use crate::config::TimingConfig;
use crate::domain::bridge::Bridge;
use crate::domain::crossroad::CrossRoad;
use crate::domain::hideseek::HideSeek;
use crate::domain::memory::Memory;
use crate::domain::quiz::Quiz;
use crate::domain::reaction::Reaction;
use crate::domain::rps::Rps;
use crate::domain::snake::Snake;
use crate::domain::tetris::Tetris;
use crate::domain::tictactoe::{Match, Mode};
use crate::domain::GameId;
use crate::sim::storage::{KeyScheme, Records, Settings, Theme};

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Screen {
    Launcher,
    Game,
    Profile,
    Leaderboard,
    Settings,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum MenuItem {
    Game(GameId),
    Profile,
    Leaderboard,
    Settings,
    Quit,
}

pub const MENU: [MenuItem; 14] = [
    MenuItem::Game(GameId::Snake),
    MenuItem::Game(GameId::Tetris),
    MenuItem::Game(GameId::TicTacToe),
    MenuItem::Game(GameId::Memory),
    MenuItem::Game(GameId::Rps),
    MenuItem::Game(GameId::Quiz),
    MenuItem::Game(GameId::Reaction),
    MenuItem::Game(GameId::RopeBridge),
    MenuItem::Game(GameId::HideSeek),
    MenuItem::Game(GameId::CrossRoad),
    MenuItem::Profile,
    MenuItem::Leaderboard,
    MenuItem::Settings,
    MenuItem::Quit,
];

/// Rows of the settings screen, in display order.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum SettingRow {
    Theme,
    ShowHints,
    ConfirmExit,
    AutoSave,
    KeyScheme,
}

pub const SETTING_ROWS: [SettingRow; 5] = [
    SettingRow::Theme,
    SettingRow::ShowHints,
    SettingRow::ConfirmExit,
    SettingRow::AutoSave,
    SettingRow::KeyScheme,
];

pub const MAX_NAME_LEN: usize = 16;

/// The running game, one variant per title.
pub enum Session {
    Snake(Snake),
    Tetris(Tetris),
    TicTacToe(Match),
    Memory(Memory),
    Rps(Rps),
    Quiz(Quiz),
    Reaction(Reaction),
    RopeBridge(Bridge),
    HideSeek(HideSeek),
    CrossRoad(CrossRoad),
}

impl Session {
    pub fn new(game: GameId, timing: &TimingConfig, records: &Records, rng: &mut StdRng) -> Session {
        match game {
            GameId::Snake => Session::Snake(Snake::new(timing.snake_step_ms)),
            GameId::Tetris => Session::Tetris(Tetris::new(rng)),
            GameId::TicTacToe => Session::TicTacToe(Match::new(Mode::VsAi, timing.ai_think_ms)),
            GameId::Memory => Session::Memory(Memory::new(timing.card_reveal_ms, rng)),
            GameId::Rps => Session::Rps(Rps::new(timing.rps_reveal_ms)),
            GameId::Quiz => Session::Quiz(Quiz::new(timing.quiz_seconds)),
            GameId::Reaction => {
                Session::Reaction(Reaction::new(records.profile.best_time(GameId::Reaction)))
            }
            GameId::RopeBridge => Session::RopeBridge(Bridge::new(rng)),
            GameId::HideSeek => Session::HideSeek(HideSeek::new()),
            GameId::CrossRoad => Session::CrossRoad(CrossRoad::new(rng)),
        }
    }

    pub fn id(&self) -> GameId {
        match self {
            Session::Snake(_) => GameId::Snake,
            Session::Tetris(_) => GameId::Tetris,
            Session::TicTacToe(_) => GameId::TicTacToe,
            Session::Memory(_) => GameId::Memory,
            Session::Rps(_) => GameId::Rps,
            Session::Quiz(_) => GameId::Quiz,
            Session::Reaction(_) => GameId::Reaction,
            Session::RopeBridge(_) => GameId::RopeBridge,
            Session::HideSeek(_) => GameId::HideSeek,
            Session::CrossRoad(_) => GameId::CrossRoad,
        }
    }
}

pub struct WorldState {
    // ── Meta ──
    pub screen: Screen,
    pub session: Option<Session>,
    pub records: Records,
    pub timing: TimingConfig,
    pub rng: StdRng,

    // ── Launcher ──
    pub menu_cursor: usize,

    // ── In-game ──
    /// Highlighted option for list-style games (RPS, quiz, hide & seek).
    pub pick_cursor: usize,
    /// Exit confirmation overlay is showing.
    pub confirm_exit: bool,

    // ── Leaderboard / settings / profile ──
    pub board_filter: Option<GameId>,
    pub settings_cursor: usize,
    /// Username being typed; `None` when not editing.
    pub name_edit: Option<String>,

    // ── UI ──
    pub message: String,
    pub message_timer: u32,
    pub anim_tick: u32,
}

impl WorldState {
    pub fn new(records: Records, timing: TimingConfig, rng: StdRng) -> Self {
        WorldState {
            screen: Screen::Launcher,
            session: None,
            records,
            timing,
            rng,
            menu_cursor: 0,
            pick_cursor: 0,
            confirm_exit: false,
            board_filter: None,
            settings_cursor: 0,
            name_edit: None,
            message: String::new(),
            message_timer: 0,
            anim_tick: 0,
        }
    }

    pub fn set_message(&mut self, msg: &str, duration: u32) {
        self.message = msg.to_string();
        self.message_timer = duration;
    }

    /// Status line using the configured duration.
    pub fn notify(&mut self, msg: &str) {
        let ticks = self.timing.message_ticks;
        self.set_message(msg, ticks);
    }

    pub fn tick_message(&mut self) {
        if self.message_timer > 0 {
            self.message_timer -= 1;
            if self.message_timer == 0 {
                self.message.clear();
            }
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.records.settings
    }

    pub fn active_game(&self) -> Option<GameId> {
        self.session.as_ref().map(Session::id)
    }

    // ── Navigation ──

    pub fn start_game(&mut self, game: GameId) {
        self.session = Some(Session::new(game, &self.timing, &self.records, &mut self.rng));
        self.pick_cursor = 0;
        self.confirm_exit = false;
        self.screen = Screen::Game;
    }

    /// Fresh session of the current game; session scores are lost.
    pub fn restart(&mut self) {
        if let Some(game) = self.active_game() {
            self.start_game(game);
        }
    }

    pub fn leave_game(&mut self) {
        self.session = None;
        self.confirm_exit = false;
        self.screen = Screen::Launcher;
    }

    pub fn open(&mut self, screen: Screen) {
        self.screen = screen;
        self.name_edit = None;
        self.settings_cursor = 0;
    }

    pub fn move_menu(&mut self, delta: i32) {
        self.menu_cursor = wrap(self.menu_cursor, delta, MENU.len());
    }

    /// Cycle the leaderboard filter: all → each game → all.
    pub fn cycle_filter(&mut self, delta: i32) {
        let pos = match self.board_filter {
            None => 0,
            Some(g) => GameId::ALL.iter().position(|&x| x == g).map_or(0, |i| i + 1),
        };
        let next = wrap(pos, delta, GameId::ALL.len() + 1);
        self.board_filter = if next == 0 { None } else { Some(GameId::ALL[next - 1]) };
    }

    // ── Settings ──

    pub fn move_settings(&mut self, delta: i32) {
        self.settings_cursor = wrap(self.settings_cursor, delta, SETTING_ROWS.len());
    }

    pub fn toggle_setting(&mut self) {
        let s = &mut self.records.settings;
        match SETTING_ROWS[self.settings_cursor.min(SETTING_ROWS.len() - 1)] {
            SettingRow::Theme => {
                s.theme = match s.theme {
                    Theme::Dark => Theme::Light,
                    Theme::Light => Theme::Dark,
                }
            }
            SettingRow::ShowHints => s.show_hints = !s.show_hints,
            SettingRow::ConfirmExit => s.confirm_exit = !s.confirm_exit,
            SettingRow::AutoSave => s.auto_save = !s.auto_save,
            SettingRow::KeyScheme => {
                s.key_scheme = match s.key_scheme {
                    KeyScheme::Wasd => KeyScheme::Arrows,
                    KeyScheme::Arrows => KeyScheme::Wasd,
                }
            }
        }
    }

    pub fn restore_default_settings(&mut self) {
        self.records.settings = Settings::default();
    }

    // ── Profile ──

    pub fn begin_name_edit(&mut self) {
        self.name_edit = Some(self.records.profile.username.clone());
    }

    pub fn push_name_char(&mut self, c: char) {
        if let Some(name) = &mut self.name_edit {
            if !c.is_control() && name.chars().count() < MAX_NAME_LEN {
                name.push(c);
            }
        }
    }

    pub fn pop_name_char(&mut self) {
        if let Some(name) = &mut self.name_edit {
            name.pop();
        }
    }

    /// Take the edited name if it is usable. Blank names are discarded.
    pub fn finish_name_edit(&mut self) -> Option<String> {
        let name = self.name_edit.take()?;
        let trimmed = name.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    }
}

fn wrap(pos: usize, delta: i32, len: usize) -> usize {
    let len = len as i32;
    ((pos as i32 + delta) % len + len) as usize % len as usize
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GameConfig;
    use crate::sim::storage::Storage;
    use rand::SeedableRng;

    fn world(dir: &std::path::Path) -> WorldState {
        let records = Records::load(Storage::new(dir));
        WorldState::new(records, GameConfig::default().timing, StdRng::seed_from_u64(1))
    }

    #[test]
    fn menu_wraps_both_ways() {
        let dir = tempfile::tempdir().unwrap();
        let mut w = world(dir.path());
        w.move_menu(-1);
        assert_eq!(MENU[w.menu_cursor], MenuItem::Quit);
        w.move_menu(1);
        assert_eq!(w.menu_cursor, 0);
    }

    #[test]
    fn filter_cycles_through_every_game_and_back() {
        let dir = tempfile::tempdir().unwrap();
        let mut w = world(dir.path());
        w.cycle_filter(1);
        assert_eq!(w.board_filter, Some(GameId::Snake));
        for _ in 0..GameId::ALL.len() {
            w.cycle_filter(1);
        }
        assert_eq!(w.board_filter, None);
        w.cycle_filter(-1);
        assert_eq!(w.board_filter, Some(GameId::CrossRoad));
    }

    #[test]
    fn start_restart_leave() {
        let dir = tempfile::tempdir().unwrap();
        let mut w = world(dir.path());
        w.start_game(GameId::Quiz);
        assert_eq!(w.screen, Screen::Game);
        assert_eq!(w.active_game(), Some(GameId::Quiz));
        w.restart();
        assert_eq!(w.active_game(), Some(GameId::Quiz));
        w.leave_game();
        assert_eq!(w.screen, Screen::Launcher);
        assert!(w.session.is_none());
    }

    #[test]
    fn toggles_and_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let mut w = world(dir.path());
        w.move_settings(3);
        w.toggle_setting();
        assert!(!w.settings().auto_save);
        w.move_settings(1);
        w.toggle_setting();
        assert_eq!(w.settings().key_scheme, KeyScheme::Wasd);
        w.restore_default_settings();
        assert_eq!(*w.settings(), Settings::default());
    }

    #[test]
    fn name_edit_limits_and_trims() {
        let dir = tempfile::tempdir().unwrap();
        let mut w = world(dir.path());
        w.begin_name_edit();
        for _ in 0..6 {
            w.pop_name_char();
        }
        for c in "  a very long name indeed".chars() {
            w.push_name_char(c);
        }
        assert_eq!(w.name_edit.as_ref().map(|n| n.chars().count()), Some(MAX_NAME_LEN));
        assert_eq!(w.finish_name_edit().as_deref(), Some("a very long na"));

        w.begin_name_edit();
        w.name_edit = Some("   ".into());
        assert_eq!(w.finish_name_edit(), None);
    }
}
