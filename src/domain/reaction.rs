//! Reaction test.
//!
//!   Waiting --start--> Ready --(2..6s)--> Go --press--> Result
//!                        \--press--> TooEarly
//!
//! Times are measured against `Instant`s supplied by the caller so the
//! measurement does not depend on the simulation tick.

use std::collections::VecDeque;
use std::time::{Duration, Instant};

use rand::Rng;

const MIN_DELAY_MS: u64 = 2000;
const MAX_DELAY_MS: u64 = 6000;
const HISTORY: usize = 10;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum State {
    Waiting,
    Ready { go_at: Instant },
    Go { since: Instant },
    Result { ms: u32 },
    TooEarly,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Press {
    Started,
    TooEarly,
    Measured { ms: u32, score: u32 },
}

pub struct Reaction {
    pub state: State,
    pub history: VecDeque<u32>,
    pub attempts: u32,
    pub best_ms: Option<u32>,
}

impl Reaction {
    pub fn new(best_ms: Option<u32>) -> Self {
        Reaction {
            state: State::Waiting,
            history: VecDeque::with_capacity(HISTORY),
            attempts: 0,
            best_ms,
        }
    }

    pub fn start(&mut self, now: Instant, rng: &mut impl Rng) {
        let delay = rng.random_range(MIN_DELAY_MS..MAX_DELAY_MS);
        self.state = State::Ready { go_at: now + Duration::from_millis(delay) };
    }

    pub fn tick(&mut self, now: Instant) {
        if let State::Ready { go_at } = self.state {
            if now >= go_at {
                self.state = State::Go { since: go_at };
            }
        }
    }

    /// The single action key. Starts a run from the idle states, measures
    /// during `Go`, and flags a false start during `Ready`.
    pub fn press(&mut self, now: Instant, rng: &mut impl Rng) -> Press {
        self.tick(now);
        match self.state {
            State::Waiting | State::Result { .. } | State::TooEarly => {
                self.start(now, rng);
                Press::Started
            }
            State::Ready { .. } => {
                self.state = State::TooEarly;
                Press::TooEarly
            }
            State::Go { since } => {
                let ms = now.saturating_duration_since(since).as_millis().min(u128::from(u32::MAX)) as u32;
                self.record(ms);
                self.state = State::Result { ms };
                Press::Measured { ms, score: score_for(ms) }
            }
        }
    }

    fn record(&mut self, ms: u32) {
        self.attempts += 1;
        if self.history.len() == HISTORY {
            self.history.pop_front();
        }
        self.history.push_back(ms);
        if self.best_ms.map_or(true, |b| ms < b) {
            self.best_ms = Some(ms);
        }
    }

    pub fn average_ms(&self) -> Option<u32> {
        if self.history.is_empty() {
            return None;
        }
        let sum: u64 = self.history.iter().map(|&t| u64::from(t)).sum();
        Some((sum / self.history.len() as u64) as u32)
    }
}

/// Faster is better: 1000 points minus the reaction time, floored at zero.
pub fn score_for(ms: u32) -> u32 {
    1000u32.saturating_sub(ms)
}

pub fn rating(ms: u32) -> &'static str {
    match ms {
        0..=199 => "Superhuman!",
        200..=249 => "Excellent!",
        250..=299 => "Very Good!",
        300..=399 => "Good!",
        400..=499 => "Average",
        _ => "Keep Practicing!",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn go_at(r: &Reaction) -> Instant {
        match r.state {
            State::Ready { go_at } => go_at,
            other => panic!("expected Ready, got {other:?}"),
        }
    }

    #[test]
    fn delay_is_between_two_and_six_seconds() {
        let mut rng = StdRng::seed_from_u64(1);
        let now = Instant::now();
        for _ in 0..50 {
            let mut r = Reaction::new(None);
            r.start(now, &mut rng);
            let d = go_at(&r) - now;
            assert!(d >= Duration::from_millis(2000) && d < Duration::from_millis(6000));
        }
    }

    #[test]
    fn early_press_is_a_false_start() {
        let mut rng = StdRng::seed_from_u64(2);
        let now = Instant::now();
        let mut r = Reaction::new(None);
        assert_eq!(r.press(now, &mut rng), Press::Started);
        assert_eq!(r.press(now + Duration::from_millis(500), &mut rng), Press::TooEarly);
        assert_eq!(r.attempts, 0);
    }

    #[test]
    fn press_after_a_result_or_false_start_starts_again() {
        let mut rng = StdRng::seed_from_u64(5);
        let now = Instant::now();
        let mut r = Reaction::new(None);
        r.press(now, &mut rng);
        r.press(now, &mut rng);
        assert_eq!(r.state, State::TooEarly);
        assert_eq!(r.press(now, &mut rng), Press::Started);

        let go = go_at(&r);
        r.press(go + Duration::from_millis(300), &mut rng);
        assert!(matches!(r.state, State::Result { ms: 300 }));
        assert_eq!(r.press(go + Duration::from_millis(900), &mut rng), Press::Started);
        assert!(matches!(r.state, State::Ready { .. }));
    }

    #[test]
    fn measures_from_signal() {
        let mut rng = StdRng::seed_from_u64(3);
        let now = Instant::now();
        let mut r = Reaction::new(Some(300));
        r.press(now, &mut rng);
        let go = go_at(&r);
        r.tick(go);
        assert!(matches!(r.state, State::Go { .. }));
        let res = r.press(go + Duration::from_millis(240), &mut rng);
        assert_eq!(res, Press::Measured { ms: 240, score: 760 });
        assert_eq!(r.best_ms, Some(240));
        assert_eq!(r.average_ms(), Some(240));
    }

    #[test]
    fn history_keeps_last_ten() {
        let mut r = Reaction::new(None);
        for ms in 100..115 {
            r.record(ms);
        }
        assert_eq!(r.history.len(), 10);
        assert_eq!(r.history.front(), Some(&105));
        assert_eq!(r.best_ms, Some(100));
        assert_eq!(r.attempts, 15);
    }

    #[test]
    fn scoring_and_rating() {
        assert_eq!(score_for(1500), 0);
        assert_eq!(score_for(180), 820);
        assert_eq!(rating(180), "Superhuman!");
        assert_eq!(rating(450), "Average");
        assert_eq!(rating(900), "Keep Practicing!");
    }
}
