//! Rock-Paper-Scissors, best of five against a random opponent.

use rand::Rng;

pub const ROUNDS: u32 = 5;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Choice {
    Rock,
    Paper,
    Scissors,
}

impl Choice {
    pub const ALL: [Choice; 3] = [Choice::Rock, Choice::Paper, Choice::Scissors];

    pub fn beats(self) -> Choice {
        match self {
            Choice::Rock => Choice::Scissors,
            Choice::Paper => Choice::Rock,
            Choice::Scissors => Choice::Paper,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Choice::Rock => "Rock",
            Choice::Paper => "Paper",
            Choice::Scissors => "Scissors",
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Verdict {
    Win,
    Lose,
    Draw,
}

pub fn judge(player: Choice, computer: Choice) -> Verdict {
    if player == computer {
        Verdict::Draw
    } else if player.beats() == computer {
        Verdict::Win
    } else {
        Verdict::Lose
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub struct Score {
    pub player: u32,
    pub computer: u32,
    pub draws: u32,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Round {
    pub player: Choice,
    pub computer: Choice,
    pub verdict: Verdict,
}

pub struct Rps {
    /// 1-based number of the round being played.
    pub round: u32,
    pub score: Score,
    pub last: Option<Round>,
    pub over: bool,
    reveal_ms: u64,
    /// Chosen round waiting for its reveal.
    pending: Option<(Round, u64)>,
}

impl Rps {
    pub fn new(reveal_ms: u64) -> Self {
        Rps {
            round: 1,
            score: Score::default(),
            last: None,
            over: false,
            reveal_ms,
            pending: None,
        }
    }

    pub fn revealing(&self) -> bool {
        self.pending.is_some()
    }

    /// Lock in the player's choice. Ignored during a reveal or after the match.
    pub fn pick(&mut self, player: Choice, rng: &mut impl Rng) -> bool {
        if self.over || self.revealing() {
            return false;
        }
        let computer = Choice::ALL[rng.random_range(0..Choice::ALL.len())];
        let round = Round { player, computer, verdict: judge(player, computer) };
        self.pending = Some((round, self.reveal_ms));
        true
    }

    pub fn tick(&mut self, dt_ms: u64) -> Option<Round> {
        let (round, remaining) = self.pending?;
        if remaining > dt_ms {
            self.pending = Some((round, remaining - dt_ms));
            return None;
        }
        self.pending = None;
        match round.verdict {
            Verdict::Win => self.score.player += 1,
            Verdict::Lose => self.score.computer += 1,
            Verdict::Draw => self.score.draws += 1,
        }
        self.last = Some(round);
        if self.round >= ROUNDS {
            self.over = true;
        } else {
            self.round += 1;
        }
        Some(round)
    }

    /// Overall match result from the player's side.
    pub fn match_verdict(&self) -> Verdict {
        judge_counts(self.score.player, self.score.computer)
    }
}

fn judge_counts(player: u32, computer: u32) -> Verdict {
    match player.cmp(&computer) {
        std::cmp::Ordering::Greater => Verdict::Win,
        std::cmp::Ordering::Less => Verdict::Lose,
        std::cmp::Ordering::Equal => Verdict::Draw,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn rules_table() {
        assert_eq!(judge(Choice::Rock, Choice::Scissors), Verdict::Win);
        assert_eq!(judge(Choice::Paper, Choice::Rock), Verdict::Win);
        assert_eq!(judge(Choice::Scissors, Choice::Paper), Verdict::Win);
        assert_eq!(judge(Choice::Rock, Choice::Paper), Verdict::Lose);
        assert_eq!(judge(Choice::Paper, Choice::Paper), Verdict::Draw);
    }

    #[test]
    fn pick_is_locked_during_reveal() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut g = Rps::new(1000);
        assert!(g.pick(Choice::Rock, &mut rng));
        assert!(!g.pick(Choice::Paper, &mut rng));
        assert_eq!(g.tick(500), None);
        let round = g.tick(500).expect("revealed");
        assert_eq!(round.player, Choice::Rock);
        assert_eq!(g.round, 2);
    }

    #[test]
    fn match_ends_after_five_rounds() {
        let mut rng = StdRng::seed_from_u64(2);
        let mut g = Rps::new(0);
        for _ in 0..ROUNDS {
            assert!(g.pick(Choice::Scissors, &mut rng));
            assert!(g.tick(0).is_some());
        }
        assert!(g.over);
        assert_eq!(g.round, ROUNDS);
        assert_eq!(g.score.player + g.score.computer + g.score.draws, ROUNDS);
        assert!(!g.pick(Choice::Rock, &mut rng));
    }

    #[test]
    fn match_verdict_compares_wins() {
        let mut g = Rps::new(0);
        g.score = Score { player: 2, computer: 1, draws: 2 };
        assert_eq!(g.match_verdict(), Verdict::Win);
        g.score = Score { player: 1, computer: 1, draws: 3 };
        assert_eq!(g.match_verdict(), Verdict::Draw);
    }
}
