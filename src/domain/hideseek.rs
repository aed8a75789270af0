//! Hide and seek: pick a spot, wait for the seeker's sweep, hope it's safe.

use rand::Rng;

pub struct Spot {
    pub name: &'static str,
    /// Percent chance of staying hidden.
    pub safety: u32,
}

pub const SPOTS: [Spot; 8] = [
    Spot { name: "In the Closet", safety: 70 },
    Spot { name: "Under the Bed", safety: 60 },
    Spot { name: "Behind Curtains", safety: 50 },
    Spot { name: "Kitchen Cabinet", safety: 80 },
    Spot { name: "In the Attic", safety: 90 },
    Spot { name: "In the Basement", safety: 85 },
    Spot { name: "Behind a Tree", safety: 45 },
    Spot { name: "In the Car", safety: 75 },
];

const SEARCH_STEP_MS: u64 = 300;

#[derive(Clone, Copy, PartialEq, Debug)]
pub enum State {
    Waiting,
    Hiding { spot: usize, progress: f32 },
    Result { spot: usize, found: bool },
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Outcome {
    Found,
    /// Stayed hidden; carries the new session score.
    Hidden { score: u32 },
}

pub struct HideSeek {
    pub state: State,
    pub score: u32,
    pub games_played: u32,
    acc_ms: u64,
}

impl HideSeek {
    pub fn new() -> Self {
        HideSeek { state: State::Waiting, score: 0, games_played: 0, acc_ms: 0 }
    }

    pub fn hide(&mut self, spot: usize) -> bool {
        if matches!(self.state, State::Hiding { .. }) || spot >= SPOTS.len() {
            return false;
        }
        self.state = State::Hiding { spot, progress: 0.0 };
        self.acc_ms = 0;
        true
    }

    /// The seeker advances 5-20% every 300ms; at 100% the search resolves.
    pub fn tick(&mut self, dt_ms: u64, rng: &mut impl Rng) -> Option<Outcome> {
        let State::Hiding { spot, mut progress } = self.state else {
            return None;
        };
        self.acc_ms += dt_ms;
        while self.acc_ms >= SEARCH_STEP_MS {
            self.acc_ms -= SEARCH_STEP_MS;
            progress += rng.random_range(5.0..20.0);
            if progress >= 100.0 {
                return Some(self.resolve(spot, rng));
            }
        }
        self.state = State::Hiding { spot, progress };
        None
    }

    fn resolve(&mut self, spot: usize, rng: &mut impl Rng) -> Outcome {
        let found_chance = 100 - SPOTS[spot].safety;
        let found = rng.random_range(0..100) < found_chance;
        self.state = State::Result { spot, found };
        self.games_played += 1;
        if found {
            Outcome::Found
        } else {
            self.score += 1;
            Outcome::Hidden { score: self.score }
        }
    }

    pub fn reset(&mut self) {
        if !matches!(self.state, State::Hiding { .. }) {
            self.state = State::Waiting;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn search_resolves_within_twenty_steps() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut g = HideSeek::new();
        assert!(g.hide(4));
        let mut outcome = None;
        for _ in 0..20 {
            outcome = g.tick(SEARCH_STEP_MS, &mut rng);
            if outcome.is_some() {
                break;
            }
        }
        assert!(outcome.is_some());
        assert_eq!(g.games_played, 1);
        assert!(matches!(g.state, State::Result { spot: 4, .. }));
    }

    #[test]
    fn cannot_rehide_mid_search() {
        let mut g = HideSeek::new();
        assert!(g.hide(0));
        assert!(!g.hide(1));
        assert!(!HideSeek::new().hide(SPOTS.len()));
    }

    #[test]
    fn safer_spots_hide_more_often() {
        let mut rng = StdRng::seed_from_u64(2);
        let mut hidden = [0u32; 2];
        for (slot, spot) in [(0, 4), (1, 6)] {
            for _ in 0..400 {
                let mut g = HideSeek::new();
                g.hide(spot);
                if let Some(Outcome::Hidden { .. }) = g.tick(10_000, &mut rng) {
                    hidden[slot] += 1;
                }
            }
        }
        // Attic (90%) against tree (45%).
        assert!(hidden[0] > hidden[1]);
    }
}
