/// Entry point and shell loop.

mod config;
mod domain;
mod sim;
mod ui;

use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::Utc;
use crossterm::event::KeyCode;
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{error, info, warn};

use config::GameConfig;
use sim::step::{self, Command};
use sim::storage::{self, Records, Storage};
use sim::world::{MenuItem, Screen, WorldState, MENU};
use ui::gamepad::{GamepadState, PadDir};
use ui::input::InputState;
use ui::renderer::Renderer;

const FRAME_SLEEP: Duration = Duration::from_millis(5);
const LOG_FILE: &str = "arcade.log";

fn main() {
    let (config, config_err) = GameConfig::load();
    let data_dir = storage::data_dir(config.data_dir.as_deref());
    init_logging(&data_dir, &config.log_filter);
    if let Some(e) = config_err {
        warn!(error = %e, "config ignored, using defaults");
    }
    info!(dir = %data_dir.display(), "starting pocket arcade");

    let records = Records::load(Storage::new(&data_dir));
    let mut world = WorldState::new(records, config.timing.clone(), StdRng::from_os_rng());

    let mut renderer = Renderer::new();

    if let Err(e) = renderer.init() {
        eprintln!("Terminal init failed: {e}");
        return;
    }

    let result = game_loop(&mut world, &mut renderer, &config);

    if let Err(e) = renderer.cleanup() {
        eprintln!("Terminal cleanup failed: {e}");
    }

    if let Err(e) = result {
        error!(error = %e, "shell loop failed");
        eprintln!("Game error: {e}");
    }

    info!("bye");
    println!();
    println!("Thanks for playing Pocket Arcade, {}!", world.records.profile.username);
    println!("Total score: {}", world.records.profile.total_score);
}

/// Log to a file in the data directory; the terminal belongs to the renderer.
/// `RUST_LOG` wins over the configured filter.
fn init_logging(dir: &Path, filter: &str) {
    let Ok(file) = std::fs::File::create(dir.join(LOG_FILE)) else { return };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .or_else(|_| tracing_subscriber::EnvFilter::try_new(filter))
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(Arc::new(file))
        .with_ansi(false)
        .try_init();
}

fn game_loop(
    world: &mut WorldState,
    renderer: &mut Renderer,
    config: &GameConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut kb = InputState::new();
    let mut gp = GamepadState::new();
    gp.load_button_config(&config.gamepad);
    let mut last_tick = Instant::now();
    let tick_rate = Duration::from_millis(config.timing.tick_rate_ms);

    loop {
        kb.drain_events();
        gp.update();

        if kb.ctrl_c_pressed() {
            break;
        }

        let was_playing = world.screen == Screen::Game;
        if handle_meta(world, &kb, &gp) {
            break;
        }

        let now = Instant::now();
        let mut events = Vec::new();
        // Input that moved between screens this frame is not replayed into a game.
        if was_playing && world.screen == Screen::Game && !world.confirm_exit {
            for cmd in detect_commands(&kb, &gp) {
                events.extend(step::command(world, cmd, now));
            }
        }

        let elapsed = last_tick.elapsed();
        if elapsed >= tick_rate {
            let dt_ms = u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX);
            events.extend(step::tick(world, dt_ms, now));
            world.tick_message();
            world.anim_tick = world.anim_tick.wrapping_add(1);
            last_tick = Instant::now();
        }

        if !events.is_empty() {
            step::apply(world, &events, Utc::now());
        }

        renderer.render(world)?;
        std::thread::sleep(FRAME_SLEEP);
    }

    Ok(())
}

// ── Key Constants ──

const KEYS_LEFT: &[KeyCode] = &[KeyCode::Left, KeyCode::Char('a'), KeyCode::Char('A')];
const KEYS_RIGHT: &[KeyCode] = &[KeyCode::Right, KeyCode::Char('d'), KeyCode::Char('D')];
const KEYS_UP: &[KeyCode] = &[KeyCode::Up, KeyCode::Char('w'), KeyCode::Char('W')];
const KEYS_DOWN: &[KeyCode] = &[KeyCode::Down, KeyCode::Char('s'), KeyCode::Char('S')];
const KEYS_CONFIRM: &[KeyCode] = &[KeyCode::Enter, KeyCode::Char(' ')];
const KEYS_PAUSE: &[KeyCode] = &[KeyCode::Char('p'), KeyCode::Char('P')];
const KEYS_ALT: &[KeyCode] = &[KeyCode::Char('m'), KeyCode::Char('M')];
const KEYS_RESTART: &[KeyCode] = &[KeyCode::Char('r'), KeyCode::Char('R')];
const KEYS_QUIT: &[KeyCode] = &[KeyCode::Char('q'), KeyCode::Char('Q')];
const KEYS_YES: &[KeyCode] = &[KeyCode::Char('y'), KeyCode::Char('Y'), KeyCode::Enter];
const KEYS_NO: &[KeyCode] = &[KeyCode::Char('n'), KeyCode::Char('N'), KeyCode::Esc];
const KEYS_EDIT: &[KeyCode] = &[KeyCode::Char('e'), KeyCode::Char('E'), KeyCode::Enter];
const KEYS_SAVE: &[KeyCode] = &[KeyCode::Char('s'), KeyCode::Char('S')];
const KEYS_DEFAULTS: &[KeyCode] = &[KeyCode::Char('d'), KeyCode::Char('D')];

/// Decode this frame's game input, in a fixed order.
fn detect_commands(kb: &InputState, gp: &GamepadState) -> Vec<Command> {
    let pad = gp.dir_pressed();
    let mut cmds = Vec::with_capacity(4);
    if kb.any_pressed(KEYS_UP) || pad == Some(PadDir::Up) {
        cmds.push(Command::Up);
    }
    if kb.any_pressed(KEYS_DOWN) || pad == Some(PadDir::Down) {
        cmds.push(Command::Down);
    }
    if kb.any_pressed(KEYS_LEFT) || pad == Some(PadDir::Left) {
        cmds.push(Command::Left);
    }
    if kb.any_pressed(KEYS_RIGHT) || pad == Some(PadDir::Right) {
        cmds.push(Command::Right);
    }
    if let Some(d) = kb.digit() {
        cmds.push(Command::Digit(d));
    }
    if kb.any_pressed(KEYS_CONFIRM) || gp.confirm_pressed() {
        cmds.push(Command::Confirm);
    }
    if kb.any_pressed(KEYS_PAUSE) || gp.pause_pressed() {
        cmds.push(Command::Pause);
    }
    if kb.any_pressed(KEYS_ALT) || gp.action_pressed() {
        cmds.push(Command::Alt);
    }
    cmds
}

/// Vertical navigation for list screens: -1, 0 or +1.
fn nav_delta(kb: &InputState, gp: &GamepadState, up: &[KeyCode], down: &[KeyCode]) -> i32 {
    let pad = gp.dir_pressed();
    if kb.any_pressed(up) || pad == Some(PadDir::Up) {
        -1
    } else if kb.any_pressed(down) || pad == Some(PadDir::Down) {
        1
    } else {
        0
    }
}

/// Screen-level keys. Returns true when the player asked to quit.
fn handle_meta(world: &mut WorldState, kb: &InputState, gp: &GamepadState) -> bool {
    let confirm = kb.any_pressed(KEYS_CONFIRM) || gp.confirm_pressed();
    let esc = kb.any_pressed(&[KeyCode::Esc]) || gp.cancel_pressed();

    match world.screen {
        // ── Launcher ──
        Screen::Launcher => {
            let delta = nav_delta(kb, gp, KEYS_UP, KEYS_DOWN);
            if delta != 0 {
                world.move_menu(delta);
            } else if confirm {
                match MENU[world.menu_cursor.min(MENU.len() - 1)] {
                    MenuItem::Game(game) => {
                        info!(game = game.key(), "game started");
                        world.start_game(game);
                    }
                    MenuItem::Profile => world.open(Screen::Profile),
                    MenuItem::Leaderboard => world.open(Screen::Leaderboard),
                    MenuItem::Settings => world.open(Screen::Settings),
                    MenuItem::Quit => return true,
                }
            } else if kb.any_pressed(KEYS_QUIT) || esc {
                return true;
            }
        }

        // ── In a game ──
        Screen::Game => {
            if world.confirm_exit {
                if kb.any_pressed(KEYS_YES) || gp.confirm_pressed() {
                    world.leave_game();
                } else if kb.any_pressed(KEYS_NO) || gp.cancel_pressed() {
                    world.confirm_exit = false;
                }
                return false;
            }
            if esc {
                if world.settings().confirm_exit {
                    world.confirm_exit = true;
                } else {
                    world.leave_game();
                }
            } else if kb.any_pressed(KEYS_RESTART) || gp.restart_pressed() {
                world.restart();
                world.notify("Restarted");
            }
        }

        // ── Profile ──
        Screen::Profile => {
            if world.name_edit.is_some() {
                if kb.was_pressed(KeyCode::Esc) || gp.cancel_pressed() {
                    world.name_edit = None;
                } else if kb.was_pressed(KeyCode::Enter) || gp.confirm_pressed() {
                    save_name(world);
                } else if kb.was_pressed(KeyCode::Backspace) {
                    world.pop_name_char();
                } else {
                    for c in kb.typed_chars() {
                        world.push_name_char(c);
                    }
                }
            } else if kb.any_pressed(KEYS_EDIT) || gp.confirm_pressed() {
                world.begin_name_edit();
            } else if esc {
                world.open(Screen::Launcher);
            }
        }

        // ── Leaderboard ──
        Screen::Leaderboard => {
            let pad = gp.dir_pressed();
            if kb.any_pressed(KEYS_LEFT) || pad == Some(PadDir::Left) {
                world.cycle_filter(-1);
            } else if kb.any_pressed(KEYS_RIGHT) || pad == Some(PadDir::Right) {
                world.cycle_filter(1);
            } else if esc {
                world.open(Screen::Launcher);
            }
        }

        // ── Settings ──
        Screen::Settings => {
            // S and D are taken by save/defaults, so only arrows navigate.
            let delta = nav_delta(kb, gp, &[KeyCode::Up], &[KeyCode::Down]);
            if delta != 0 {
                world.move_settings(delta);
            } else if confirm {
                world.toggle_setting();
            } else if kb.any_pressed(KEYS_SAVE) {
                match world.records.save_settings() {
                    Ok(()) => {
                        info!("settings saved");
                        world.notify("Settings saved");
                    }
                    Err(e) => {
                        error!(error = %e, "could not save settings");
                        world.notify("Save failed!");
                    }
                }
            } else if kb.any_pressed(KEYS_DEFAULTS) {
                world.restore_default_settings();
                world.notify("Defaults restored (S to save)");
            } else if esc {
                world.open(Screen::Launcher);
            }
        }
    }

    false
}

fn save_name(world: &mut WorldState) {
    let Some(name) = world.finish_name_edit() else {
        world.notify("Name unchanged");
        return;
    };
    match world.records.rename(&name) {
        Ok(()) => {
            info!(username = %name, "username changed");
            world.notify("Name saved");
        }
        Err(e) => {
            error!(error = %e, "could not save profile");
            world.notify("Save failed!");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use ui::gamepad::Btn;

    fn profile_world(dir: &Path) -> WorldState {
        let records = Records::load(Storage::new(dir));
        let mut world = WorldState::new(records, GameConfig::default().timing, StdRng::seed_from_u64(1));
        world.open(Screen::Profile);
        world
    }

    #[test]
    fn pad_confirm_commits_name_edit() {
        let dir = tempfile::tempdir().unwrap();
        let mut world = profile_world(dir.path());
        let kb = InputState::new();
        let mut gp = GamepadState::new();

        gp.press(Btn::A);
        assert!(!handle_meta(&mut world, &kb, &gp));
        assert!(world.name_edit.is_some());

        world.name_edit = Some("Ada".into());
        let mut gp = GamepadState::new();
        gp.press(Btn::A);
        handle_meta(&mut world, &kb, &gp);
        assert_eq!(world.name_edit, None);
        assert_eq!(world.records.profile.username, "Ada");
        let reloaded = Records::load(Storage::new(dir.path()));
        assert_eq!(reloaded.profile.username, "Ada");
    }

    #[test]
    fn pad_cancel_drops_name_edit() {
        let dir = tempfile::tempdir().unwrap();
        let mut world = profile_world(dir.path());
        let before = world.records.profile.username.clone();
        let kb = InputState::new();
        let mut gp = GamepadState::new();

        world.name_edit = Some("Bob".into());
        gp.press(Btn::B);
        handle_meta(&mut world, &kb, &gp);
        assert_eq!(world.name_edit, None);
        assert_eq!(world.records.profile.username, before);
        assert_eq!(world.screen, Screen::Profile);
    }

    #[test]
    fn enter_commits_and_typing_edits() {
        let dir = tempfile::tempdir().unwrap();
        let mut world = profile_world(dir.path());
        let gp = GamepadState::new();

        world.name_edit = Some(String::new());
        let mut kb = InputState::new();
        kb.press(KeyCode::Char('J'));
        kb.press(KeyCode::Char('o'));
        handle_meta(&mut world, &kb, &gp);
        assert_eq!(world.name_edit.as_deref(), Some("Jo"));

        let mut kb = InputState::new();
        kb.press(KeyCode::Enter);
        handle_meta(&mut world, &kb, &gp);
        assert_eq!(world.records.profile.username, "Jo");
    }
}
