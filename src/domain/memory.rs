//! Memory: find the 8 pairs among 16 face-down cards.

use rand::seq::SliceRandom;
use rand::Rng;

pub const SYMBOLS: [char; 8] = ['♠', '♥', '♦', '♣', '★', '☀', '☂', '♪'];
pub const CARD_COUNT: usize = SYMBOLS.len() * 2;
pub const COLUMNS: usize = 4;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Card {
    pub symbol: char,
    pub face_up: bool,
    pub matched: bool,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Reveal {
    Matched,
    Mismatched,
    /// Last pair found; whole seconds taken.
    Won { seconds: u32, moves: u32 },
}

pub struct Memory {
    pub cards: Vec<Card>,
    pub cursor: usize,
    pub moves: u32,
    pub matches: usize,
    pub won: bool,
    /// Indices of cards currently turned up and not yet resolved.
    open: Vec<usize>,
    elapsed_ms: u64,
    reveal_ms: u64,
    reveal_wait: Option<u64>,
}

impl Memory {
    pub fn new(reveal_ms: u64, rng: &mut impl Rng) -> Self {
        let mut symbols: Vec<char> = SYMBOLS.iter().chain(SYMBOLS.iter()).copied().collect();
        symbols.shuffle(rng);
        Memory {
            cards: symbols
                .into_iter()
                .map(|symbol| Card { symbol, face_up: false, matched: false })
                .collect(),
            cursor: 0,
            moves: 0,
            matches: 0,
            won: false,
            open: Vec::with_capacity(2),
            elapsed_ms: 0,
            reveal_ms,
            reveal_wait: None,
        }
    }

    pub fn seconds(&self) -> u32 {
        (self.elapsed_ms / 1000) as u32
    }

    /// Turn a card face up. Returns false when the flip is not allowed.
    pub fn flip(&mut self, idx: usize) -> bool {
        if self.won || idx >= self.cards.len() || self.open.len() >= 2 {
            return false;
        }
        let card = &mut self.cards[idx];
        if card.face_up || card.matched {
            return false;
        }
        card.face_up = true;
        self.open.push(idx);
        if self.open.len() == 2 {
            self.moves += 1;
            self.reveal_wait = Some(self.reveal_ms);
        }
        true
    }

    pub fn tick(&mut self, dt_ms: u64) -> Option<Reveal> {
        if self.won {
            return None;
        }
        self.elapsed_ms += dt_ms;

        let remaining = self.reveal_wait?;
        if remaining > dt_ms {
            self.reveal_wait = Some(remaining - dt_ms);
            return None;
        }
        self.reveal_wait = None;
        Some(self.resolve())
    }

    fn resolve(&mut self) -> Reveal {
        let (a, b) = (self.open[0], self.open[1]);
        self.open.clear();
        if self.cards[a].symbol == self.cards[b].symbol {
            self.cards[a].matched = true;
            self.cards[b].matched = true;
            self.matches += 1;
            if self.matches == SYMBOLS.len() {
                self.won = true;
                return Reveal::Won { seconds: self.seconds(), moves: self.moves };
            }
            Reveal::Matched
        } else {
            self.cards[a].face_up = false;
            self.cards[b].face_up = false;
            Reveal::Mismatched
        }
    }

    pub fn move_cursor(&mut self, dx: i32, dy: i32) {
        let rows = (CARD_COUNT / COLUMNS) as i32;
        let col = ((self.cursor % COLUMNS) as i32 + dx).clamp(0, COLUMNS as i32 - 1);
        let row = ((self.cursor / COLUMNS) as i32 + dy).clamp(0, rows - 1);
        self.cursor = (row * COLUMNS as i32 + col) as usize;
    }
}

pub fn rating(moves: u32) -> &'static str {
    match moves {
        0..=12 => "Expert",
        13..=16 => "Good",
        17..=20 => "Average",
        _ => "Beginner",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn game() -> Memory {
        Memory::new(1000, &mut StdRng::seed_from_u64(11))
    }

    fn pair_of(m: &Memory, symbol: char) -> (usize, usize) {
        let idx: Vec<usize> = (0..CARD_COUNT).filter(|&i| m.cards[i].symbol == symbol).collect();
        (idx[0], idx[1])
    }

    fn mismatch(m: &Memory) -> (usize, usize) {
        let first = m.cards[0].symbol;
        let other = (1..CARD_COUNT).find(|&i| m.cards[i].symbol != first).unwrap();
        (0, other)
    }

    #[test]
    fn deck_holds_each_symbol_twice() {
        let m = game();
        assert_eq!(m.cards.len(), CARD_COUNT);
        for s in SYMBOLS {
            assert_eq!(m.cards.iter().filter(|c| c.symbol == s).count(), 2);
        }
    }

    #[test]
    fn matching_pair_stays_up() {
        let mut m = game();
        let (a, b) = pair_of(&m, SYMBOLS[0]);
        assert!(m.flip(a));
        assert!(m.flip(b));
        assert_eq!(m.moves, 1);
        assert_eq!(m.tick(999), None);
        assert_eq!(m.tick(1), Some(Reveal::Matched));
        assert!(m.cards[a].matched && m.cards[b].matched);
    }

    #[test]
    fn mismatch_turns_back() {
        let mut m = game();
        let (a, b) = mismatch(&m);
        m.flip(a);
        m.flip(b);
        assert_eq!(m.tick(1000), Some(Reveal::Mismatched));
        assert!(!m.cards[a].face_up && !m.cards[b].face_up);
    }

    #[test]
    fn third_flip_and_repeat_flip_rejected() {
        let mut m = game();
        let (a, b) = mismatch(&m);
        assert!(m.flip(a));
        assert!(!m.flip(a));
        assert!(m.flip(b));
        let third = (0..CARD_COUNT).find(|&i| i != a && i != b).unwrap();
        assert!(!m.flip(third));
    }

    #[test]
    fn clearing_all_pairs_wins_with_time() {
        let mut m = game();
        for s in SYMBOLS {
            let (a, b) = pair_of(&m, s);
            m.flip(a);
            m.flip(b);
            let r = m.tick(2000);
            if s == SYMBOLS[7] {
                assert_eq!(r, Some(Reveal::Won { seconds: 16, moves: 8 }));
            }
        }
        assert!(m.won);
        assert!(!m.flip(0));
    }

    #[test]
    fn ratings() {
        assert_eq!(rating(8), "Expert");
        assert_eq!(rating(16), "Good");
        assert_eq!(rating(19), "Average");
        assert_eq!(rating(30), "Beginner");
    }
}
