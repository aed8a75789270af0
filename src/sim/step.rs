/// Advancing the active game: player commands, timer ticks, and applying
/// the resulting events to the player's records.
///
/// Per frame the shell calls, in order:
///   1. `command` for each logical input decoded this frame
///   2. `tick` once per elapsed tick interval
///   3. `apply` with everything both returned
///
/// Only `apply` touches storage; the first two are pure state changes.

use std::time::Instant;

use chrono::{DateTime, Utc};
use tracing::{debug, error, info};

use crate::domain::bridge::{self, Bridge};
use crate::domain::crossroad::{self, CrossRoad};
use crate::domain::hideseek::{self, HideSeek, SPOTS};
use crate::domain::memory::{Memory, Reveal};
use crate::domain::quiz::{self, Quiz};
use crate::domain::reaction::{Press, Reaction};
use crate::domain::rps::{Choice, Rps};
use crate::domain::snake::{self, Dir, Snake};
use crate::domain::tetris::{self, Move, StepResult, Tetris};
use crate::domain::tictactoe::{Mark, Match, Mode, Outcome};
use crate::domain::GameId;
use crate::sim::storage::Recorded;
use super::event::GameEvent;
use super::world::{Session, WorldState};

/// Logical input, already decoded from keyboard or gamepad.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Command {
    Up,
    Down,
    Left,
    Right,
    /// Enter / Space / gamepad A.
    Confirm,
    /// P / gamepad Start.
    Pause,
    /// M / gamepad X: secondary action (tic-tac-toe mode switch).
    Alt,
    /// Number keys 0-9.
    Digit(u8),
}

// ══════════════════════════════════════════════════════════════
// Commands
// ══════════════════════════════════════════════════════════════

pub fn command(world: &mut WorldState, cmd: Command, now: Instant) -> Vec<GameEvent> {
    let mut events = Vec::new();
    let WorldState { session, rng, pick_cursor, timing, .. } = world;
    let Some(session) = session.as_mut() else { return events };

    match session {
        Session::Snake(g) => snake_command(g, cmd),
        Session::Tetris(g) => tetris_command(g, cmd, rng, &mut events),
        Session::TicTacToe(g) => tictactoe_command(g, cmd, &mut events),
        Session::Memory(g) => memory_command(g, cmd, rng, timing.card_reveal_ms),
        Session::Rps(g) => rps_command(g, cmd, pick_cursor, rng, timing.rps_reveal_ms),
        Session::Quiz(g) => quiz_command(g, cmd, pick_cursor),
        Session::Reaction(g) => reaction_command(g, cmd, now, rng, &mut events),
        Session::RopeBridge(g) => bridge_command(g, cmd, rng, &mut events),
        Session::HideSeek(g) => hideseek_command(g, cmd, pick_cursor),
        Session::CrossRoad(g) => crossroad_command(g, cmd, rng, &mut events),
    }
    events
}

fn snake_command(g: &mut Snake, cmd: Command) {
    match cmd {
        Command::Up => g.turn(Dir::Up),
        Command::Down => g.turn(Dir::Down),
        Command::Left => g.turn(Dir::Left),
        Command::Right => g.turn(Dir::Right),
        Command::Confirm | Command::Pause => g.toggle(),
        _ => {}
    }
}

fn tetris_command(g: &mut Tetris, cmd: Command, rng: &mut impl rand::Rng, events: &mut Vec<GameEvent>) {
    let result = match cmd {
        Command::Confirm if g.status == tetris::Status::Ready => {
            g.start(rng);
            return;
        }
        Command::Confirm if g.status == tetris::Status::Over => {
            *g = Tetris::new(rng);
            g.start(rng);
            return;
        }
        Command::Pause => {
            g.toggle_pause();
            return;
        }
        Command::Left => g.apply(Move::Left, rng),
        Command::Right => g.apply(Move::Right, rng),
        Command::Down => g.apply(Move::Down, rng),
        Command::Up | Command::Confirm => g.apply(Move::Rotate, rng),
        _ => return,
    };
    tetris_result(g, result, events);
}

fn tetris_result(g: &Tetris, result: StepResult, events: &mut Vec<GameEvent>) {
    match result {
        StepResult::Locked { lines } if lines > 0 => {
            events.push(GameEvent::LinesCleared { lines, level: g.level });
        }
        StepResult::GameOver { score } => {
            events.push(GameEvent::Finished { game: GameId::Tetris, score: Some(score), time: None });
        }
        _ => {}
    }
}

fn tictactoe_command(g: &mut Match, cmd: Command, events: &mut Vec<GameEvent>) {
    if cmd == Command::Digit(0) {
        g.reset_scores();
        return;
    }
    if g.outcome.is_some() {
        if cmd == Command::Confirm {
            g.reset_round();
        }
        return;
    }
    let outcome = match cmd {
        Command::Up => { g.move_cursor(0, -1); None }
        Command::Down => { g.move_cursor(0, 1); None }
        Command::Left => { g.move_cursor(-1, 0); None }
        Command::Right => { g.move_cursor(1, 0); None }
        Command::Confirm => g.play(g.cursor),
        Command::Digit(d @ 1..=9) => {
            g.cursor = usize::from(d - 1);
            g.play(g.cursor)
        }
        Command::Alt => { g.toggle_mode(); None }
        _ => None,
    };
    if let Some(outcome) = outcome {
        tictactoe_outcome(g, outcome, events);
    }
}

fn tictactoe_outcome(g: &Match, outcome: Outcome, events: &mut Vec<GameEvent>) {
    let winner = match outcome {
        Outcome::Win(m) => Some(m.symbol()),
        Outcome::Draw => None,
    };
    events.push(GameEvent::RoundOver { winner });
    // Only a human win over the AI is a recordable result.
    if g.mode == Mode::VsAi && outcome == Outcome::Win(Mark::X) {
        events.push(GameEvent::Finished { game: GameId::TicTacToe, score: Some(g.tally.x), time: None });
    }
}

fn memory_command(g: &mut Memory, cmd: Command, rng: &mut impl rand::Rng, reveal_ms: u64) {
    match cmd {
        Command::Up => g.move_cursor(0, -1),
        Command::Down => g.move_cursor(0, 1),
        Command::Left => g.move_cursor(-1, 0),
        Command::Right => g.move_cursor(1, 0),
        Command::Confirm if g.won => *g = Memory::new(reveal_ms, rng),
        Command::Confirm => {
            g.flip(g.cursor);
        }
        _ => {}
    }
}

fn rps_command(g: &mut Rps, cmd: Command, cursor: &mut usize, rng: &mut impl rand::Rng, reveal_ms: u64) {
    let n = Choice::ALL.len();
    match cmd {
        Command::Left | Command::Up => *cursor = (*cursor + n - 1) % n,
        Command::Right | Command::Down => *cursor = (*cursor + 1) % n,
        Command::Confirm if g.over => *g = Rps::new(reveal_ms),
        Command::Confirm => {
            g.pick(Choice::ALL[(*cursor).min(n - 1)], rng);
        }
        Command::Digit(d @ 1..=3) => {
            *cursor = usize::from(d - 1);
            g.pick(Choice::ALL[*cursor], rng);
        }
        _ => {}
    }
}

fn quiz_command(g: &mut Quiz, cmd: Command, cursor: &mut usize) {
    match g.phase {
        quiz::Phase::Idle | quiz::Phase::Complete => {
            if cmd == Command::Confirm {
                *cursor = 0;
                g.start();
            }
        }
        quiz::Phase::Asking { .. } => match cmd {
            Command::Up => *cursor = cursor.saturating_sub(1),
            Command::Down => *cursor = (*cursor + 1).min(3),
            Command::Confirm => g.answer(*cursor),
            Command::Digit(d @ 1..=4) => g.answer(usize::from(d - 1)),
            _ => {}
        },
        quiz::Phase::Reveal { .. } => {}
    }
}

fn reaction_command(
    g: &mut Reaction,
    cmd: Command,
    now: Instant,
    rng: &mut impl rand::Rng,
    events: &mut Vec<GameEvent>,
) {
    if !matches!(cmd, Command::Confirm | Command::Alt) {
        return;
    }
    match g.press(now, rng) {
        Press::TooEarly => events.push(GameEvent::FalseStart),
        Press::Measured { ms, score } => events.push(GameEvent::Finished {
            game: GameId::Reaction,
            score: Some(score),
            time: Some(ms),
        }),
        Press::Started => {}
    }
}

fn bridge_command(g: &mut Bridge, cmd: Command, rng: &mut impl rand::Rng, events: &mut Vec<GameEvent>) {
    match (g.state, cmd) {
        (bridge::State::Crossing, Command::Digit(d)) => match g.step(d) {
            bridge::Step::Crossed { score } => events.push(GameEvent::Finished {
                game: GameId::RopeBridge,
                score: Some(score),
                time: None,
            }),
            bridge::Step::Fell => events.push(GameEvent::Lost { game: GameId::RopeBridge }),
            bridge::Step::Safe | bridge::Step::Ignored => {}
        },
        (bridge::State::Crossing, _) => {}
        (_, Command::Confirm) => g.start(rng),
        _ => {}
    }
}

fn hideseek_command(g: &mut HideSeek, cmd: Command, cursor: &mut usize) {
    let n = SPOTS.len();
    match g.state {
        hideseek::State::Hiding { .. } => {}
        hideseek::State::Result { .. } => {
            if cmd == Command::Confirm {
                g.reset();
            }
        }
        hideseek::State::Waiting => match cmd {
            Command::Up | Command::Left => *cursor = (*cursor + n - 1) % n,
            Command::Down | Command::Right => *cursor = (*cursor + 1) % n,
            Command::Confirm => {
                g.hide(*cursor);
            }
            Command::Digit(d @ 1..=8) => {
                *cursor = usize::from(d - 1);
                g.hide(*cursor);
            }
            _ => {}
        },
    }
}

fn crossroad_command(g: &mut CrossRoad, cmd: Command, rng: &mut impl rand::Rng, events: &mut Vec<GameEvent>) {
    if g.state != crossroad::State::Playing {
        if cmd == Command::Confirm {
            g.start(rng);
        }
        return;
    }
    let (dx, dy) = match cmd {
        Command::Up => (0, -1),
        Command::Down => (0, 1),
        Command::Left => (-1, 0),
        Command::Right => (1, 0),
        _ => return,
    };
    if let Some(e) = g.step(dx, dy) {
        crossroad_event(e, events);
    }
}

fn crossroad_event(e: crossroad::Event, events: &mut Vec<GameEvent>) {
    match e {
        crossroad::Event::Crossed { score } => events.push(GameEvent::Finished {
            game: GameId::CrossRoad,
            score: Some(score),
            time: None,
        }),
        crossroad::Event::Hit { .. } => events.push(GameEvent::Lost { game: GameId::CrossRoad }),
    }
}

// ══════════════════════════════════════════════════════════════
// Timers
// ══════════════════════════════════════════════════════════════

/// Advance the active game's timers by `dt_ms`. The exit overlay freezes play.
pub fn tick(world: &mut WorldState, dt_ms: u64, now: Instant) -> Vec<GameEvent> {
    let mut events = Vec::new();
    if world.confirm_exit {
        return events;
    }
    let WorldState { session, rng, .. } = world;
    let Some(session) = session.as_mut() else { return events };

    match session {
        Session::Snake(g) => match g.tick(dt_ms, rng) {
            Some(snake::Step::Ate) => events.push(GameEvent::FoodEaten { length: g.body.len() }),
            Some(snake::Step::Crashed { score }) => events.push(GameEvent::Finished {
                game: GameId::Snake,
                score: Some(score),
                time: None,
            }),
            Some(snake::Step::Moved) | None => {}
        },
        Session::Tetris(g) => {
            if let Some(result) = g.tick(dt_ms, rng) {
                tetris_result(g, result, &mut events);
            }
        }
        Session::TicTacToe(g) => {
            if let Some(outcome) = g.tick(dt_ms) {
                tictactoe_outcome(g, outcome, &mut events);
            }
        }
        Session::Memory(g) => match g.tick(dt_ms) {
            Some(Reveal::Matched) => events.push(GameEvent::PairMatched { pairs: g.matches }),
            Some(Reveal::Won { seconds, .. }) => events.push(GameEvent::Finished {
                game: GameId::Memory,
                score: None,
                time: Some(seconds),
            }),
            Some(Reveal::Mismatched) | None => {}
        },
        Session::Rps(g) => {
            if g.tick(dt_ms).is_some() && g.over {
                events.push(GameEvent::Finished {
                    game: GameId::Rps,
                    score: Some(g.score.player),
                    time: None,
                });
            }
        }
        Session::Quiz(g) => {
            if let Some(score) = g.tick(dt_ms) {
                events.push(GameEvent::Finished { game: GameId::Quiz, score: Some(score), time: None });
            }
        }
        Session::Reaction(g) => g.tick(now),
        Session::RopeBridge(_) => {}
        Session::HideSeek(g) => match g.tick(dt_ms, rng) {
            Some(hideseek::Outcome::Hidden { score }) => events.push(GameEvent::Finished {
                game: GameId::HideSeek,
                score: Some(score),
                time: None,
            }),
            Some(hideseek::Outcome::Found) => events.push(GameEvent::Lost { game: GameId::HideSeek }),
            None => {}
        },
        Session::CrossRoad(g) => {
            if let Some(e) = g.tick(dt_ms) {
                crossroad_event(e, &mut events);
            }
        }
    }
    events
}

// ══════════════════════════════════════════════════════════════
// Applying events
// ══════════════════════════════════════════════════════════════

/// Record results and surface them on the status line.
pub fn apply(world: &mut WorldState, events: &[GameEvent], now: DateTime<Utc>) {
    for event in events {
        match event {
            GameEvent::Finished { game, score, time } => record(world, *game, *score, *time, now),
            GameEvent::LinesCleared { lines, level } => {
                debug!(lines, level, "lines cleared");
                let msg = match lines {
                    4 => "TETRIS!".to_string(),
                    n => format!("{n} line{}!", if *n == 1 { "" } else { "s" }),
                };
                world.notify(&msg);
            }
            GameEvent::FoodEaten { length } => debug!(length, "snake ate"),
            GameEvent::PairMatched { pairs } => {
                debug!(pairs, "pair matched");
                world.notify("Match!");
            }
            GameEvent::RoundOver { winner } => {
                debug!(?winner, "tic-tac-toe round over");
            }
            GameEvent::FalseStart => world.notify("Too early! Wait for green."),
            GameEvent::Lost { game } => debug!(game = game.key(), "run lost"),
        }
    }
}

fn record(world: &mut WorldState, game: GameId, score: Option<u32>, time: Option<u32>, now: DateTime<Utc>) {
    info!(game = game.key(), ?score, ?time, "game finished");
    match world.records.record_result(game, score, time, now) {
        Ok(Recorded::Saved { new_best: true }) => world.notify("New personal best!"),
        Ok(Recorded::Saved { new_best: false }) => {}
        Ok(Recorded::Skipped) => debug!(game = game.key(), "auto-save off, result not recorded"),
        Err(e) => {
            error!(game = game.key(), error = %e, "could not record result");
            world.notify("Save failed!");
        }
    }
}
