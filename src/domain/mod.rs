//! Pure game rules. Nothing here touches the terminal, the clock or the disk;
//! randomness and elapsed time are passed in by the caller.

pub mod bridge;
pub mod crossroad;
pub mod hideseek;
pub mod memory;
pub mod quiz;
pub mod reaction;
pub mod rps;
pub mod snake;
pub mod tetris;
pub mod tictactoe;

use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GameId {
    Snake,
    Tetris,
    TicTacToe,
    Memory,
    Rps,
    Quiz,
    Reaction,
    RopeBridge,
    HideSeek,
    CrossRoad,
}

impl GameId {
    /// Launcher order.
    pub const ALL: [GameId; 10] = [
        GameId::Snake,
        GameId::Tetris,
        GameId::TicTacToe,
        GameId::Memory,
        GameId::Rps,
        GameId::Quiz,
        GameId::Reaction,
        GameId::RopeBridge,
        GameId::HideSeek,
        GameId::CrossRoad,
    ];

    /// Storage key, identical to the serde name.
    pub fn key(self) -> &'static str {
        match self {
            GameId::Snake => "snake",
            GameId::Tetris => "tetris",
            GameId::TicTacToe => "tictactoe",
            GameId::Memory => "memory",
            GameId::Rps => "rps",
            GameId::Quiz => "quiz",
            GameId::Reaction => "reaction",
            GameId::RopeBridge => "ropebridge",
            GameId::HideSeek => "hideseek",
            GameId::CrossRoad => "crossroad",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            GameId::Snake => "Snake",
            GameId::Tetris => "Tetris",
            GameId::TicTacToe => "Tic-Tac-Toe",
            GameId::Memory => "Memory Match",
            GameId::Rps => "Rock Paper Scissors",
            GameId::Quiz => "Quiz",
            GameId::Reaction => "Reaction Test",
            GameId::RopeBridge => "Rope Bridge",
            GameId::HideSeek => "Hide & Seek",
            GameId::CrossRoad => "Cross the Road",
        }
    }

    pub fn blurb(self) -> &'static str {
        match self {
            GameId::Snake => "Eat, grow, don't bite yourself",
            GameId::Tetris => "Stack blocks, clear lines",
            GameId::TicTacToe => "Beat a perfect opponent (if you can)",
            GameId::Memory => "Find all eight pairs",
            GameId::Rps => "Best of five",
            GameId::Quiz => "Eight questions, thirty seconds each",
            GameId::Reaction => "Press when the screen turns green",
            GameId::RopeBridge => "Guess the safe planks",
            GameId::HideSeek => "Pick a spot and stay quiet",
            GameId::CrossRoad => "Dodge the traffic",
        }
    }

    /// Games whose record is a time (lower is better) rather than a score.
    pub fn records_time(self) -> bool {
        matches!(self, GameId::Memory | GameId::Reaction)
    }

    pub fn time_unit(self) -> &'static str {
        match self {
            GameId::Reaction => "ms",
            _ => "s",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_match_serde_names() {
        for g in GameId::ALL {
            let json = serde_json::to_string(&g).unwrap();
            assert_eq!(json, format!("\"{}\"", g.key()));
        }
    }
}
