/// Events emitted while a game advances.
/// The shell consumes these to record results, show messages and log.

use crate::domain::GameId;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GameEvent {
    /// A result worth recording. `time` is a lower-is-better record.
    Finished { game: GameId, score: Option<u32>, time: Option<u32> },
    LinesCleared { lines: u32, level: u32 },
    FoodEaten { length: usize },
    PairMatched { pairs: usize },
    /// Tic-tac-toe round over; `None` winner is a draw.
    RoundOver { winner: Option<char> },
    FalseStart,
    /// Run ended without a recordable result (fell, found, crashed).
    Lost { game: GameId },
}
