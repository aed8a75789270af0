//! Rope bridge: guess the safe position (1-5) on each of five planks.

use rand::Rng;

pub const PLANKS: usize = 5;
pub const POSITIONS: u8 = 5;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Plank {
    Unknown,
    Safe,
    Broken,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum State {
    Waiting,
    Crossing,
    Crossed,
    Fell,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Step {
    Ignored,
    Safe,
    /// Reached the far side; carries the new session score.
    Crossed { score: u32 },
    Fell,
}

pub struct Bridge {
    pub planks: [Plank; PLANKS],
    pub current: usize,
    pub state: State,
    pub score: u32,
    pub attempts: u32,
    pattern: [u8; PLANKS],
}

impl Bridge {
    pub fn new(rng: &mut impl Rng) -> Self {
        Bridge {
            planks: [Plank::Unknown; PLANKS],
            current: 0,
            state: State::Waiting,
            score: 0,
            attempts: 0,
            pattern: random_pattern(rng),
        }
    }

    /// Begin a fresh crossing with a new hidden pattern. Session score is kept.
    pub fn start(&mut self, rng: &mut impl Rng) {
        self.pattern = random_pattern(rng);
        self.planks = [Plank::Unknown; PLANKS];
        self.current = 0;
        self.state = State::Crossing;
    }

    pub fn step(&mut self, position: u8) -> Step {
        if self.state != State::Crossing || !(1..=POSITIONS).contains(&position) {
            return Step::Ignored;
        }
        self.attempts += 1;
        if position != self.pattern[self.current] {
            self.planks[self.current] = Plank::Broken;
            self.state = State::Fell;
            return Step::Fell;
        }
        self.planks[self.current] = Plank::Safe;
        if self.current + 1 == PLANKS {
            self.state = State::Crossed;
            self.score += 1;
            return Step::Crossed { score: self.score };
        }
        self.current += 1;
        Step::Safe
    }

    /// Revealed answer for a plank once the crossing has ended.
    pub fn revealed(&self, plank: usize) -> Option<u8> {
        match self.state {
            State::Crossed | State::Fell => self.pattern.get(plank).copied(),
            _ => None,
        }
    }
}

fn random_pattern(rng: &mut impl Rng) -> [u8; PLANKS] {
    std::array::from_fn(|_| rng.random_range(1..=POSITIONS))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn crossing() -> Bridge {
        let mut rng = StdRng::seed_from_u64(9);
        let mut b = Bridge::new(&mut rng);
        b.start(&mut rng);
        b.pattern = [1, 2, 3, 4, 5];
        b
    }

    #[test]
    fn out_of_range_is_ignored() {
        let mut b = crossing();
        assert_eq!(b.step(0), Step::Ignored);
        assert_eq!(b.step(6), Step::Ignored);
        assert_eq!(b.attempts, 0);
    }

    #[test]
    fn full_crossing_scores() {
        let mut b = crossing();
        for p in 1..=4 {
            assert_eq!(b.step(p), Step::Safe);
        }
        assert_eq!(b.step(5), Step::Crossed { score: 1 });
        assert_eq!(b.planks, [Plank::Safe; PLANKS]);
        assert_eq!(b.step(1), Step::Ignored);
    }

    #[test]
    fn wrong_plank_breaks() {
        let mut b = crossing();
        b.step(1);
        assert_eq!(b.step(5), Step::Fell);
        assert_eq!(b.planks[1], Plank::Broken);
        assert_eq!(b.state, State::Fell);
        assert_eq!(b.revealed(1), Some(2));
        assert_eq!(b.score, 0);
    }

    #[test]
    fn pattern_stays_in_range() {
        let mut rng = StdRng::seed_from_u64(10);
        for _ in 0..100 {
            assert!(random_pattern(&mut rng).iter().all(|p| (1..=5).contains(p)));
        }
    }
}
