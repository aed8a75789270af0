//! General-knowledge quiz: eight questions, 30 seconds each.

pub struct Question {
    pub prompt: &'static str,
    pub options: [&'static str; 4],
    /// Index into `options`.
    pub answer: usize,
}

pub const QUESTIONS: [Question; 8] = [
    Question {
        prompt: "What is the capital of France?",
        options: ["London", "Berlin", "Paris", "Madrid"],
        answer: 2,
    },
    Question {
        prompt: "Which planet is known as the Red Planet?",
        options: ["Venus", "Mars", "Jupiter", "Saturn"],
        answer: 1,
    },
    Question {
        prompt: "What is the largest mammal in the world?",
        options: ["African Elephant", "Blue Whale", "Giraffe", "Hippopotamus"],
        answer: 1,
    },
    Question {
        prompt: "In which year did World War II end?",
        options: ["1944", "1945", "1946", "1947"],
        answer: 1,
    },
    Question {
        prompt: "What is the smallest country in the world?",
        options: ["Monaco", "San Marino", "Vatican City", "Luxembourg"],
        answer: 2,
    },
    Question {
        prompt: "Which element has the chemical symbol 'O'?",
        options: ["Gold", "Oxygen", "Silver", "Iron"],
        answer: 1,
    },
    Question {
        prompt: "Who painted the Mona Lisa?",
        options: ["Vincent van Gogh", "Pablo Picasso", "Leonardo da Vinci", "Michelangelo"],
        answer: 2,
    },
    Question {
        prompt: "What is the longest river in the world?",
        options: ["Amazon River", "Nile River", "Mississippi River", "Yangtze River"],
        answer: 1,
    },
];

const REVEAL_MS: u64 = 2000;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Phase {
    Idle,
    Asking { remaining_ms: u64 },
    /// Result of the current question is shown. `selected` is None on timeout.
    Reveal { selected: Option<usize>, remaining_ms: u64 },
    Complete,
}

pub struct Quiz {
    pub index: usize,
    pub score: u32,
    pub phase: Phase,
    question_ms: u64,
}

impl Quiz {
    pub fn new(question_secs: u64) -> Self {
        Quiz { index: 0, score: 0, phase: Phase::Idle, question_ms: question_secs * 1000 }
    }

    pub fn question(&self) -> &'static Question {
        &QUESTIONS[self.index.min(QUESTIONS.len() - 1)]
    }

    pub fn start(&mut self) {
        self.index = 0;
        self.score = 0;
        self.phase = Phase::Asking { remaining_ms: self.question_ms };
    }

    pub fn seconds_left(&self) -> u64 {
        match self.phase {
            Phase::Asking { remaining_ms } => remaining_ms.div_ceil(1000),
            _ => 0,
        }
    }

    pub fn answer(&mut self, option: usize) {
        if !matches!(self.phase, Phase::Asking { .. }) || option >= 4 {
            return;
        }
        if option == self.question().answer {
            self.score += 1;
        }
        self.phase = Phase::Reveal { selected: Some(option), remaining_ms: REVEAL_MS };
    }

    /// Returns the final score once the last question has been revealed.
    pub fn tick(&mut self, dt_ms: u64) -> Option<u32> {
        match self.phase {
            Phase::Asking { remaining_ms } => {
                self.phase = if remaining_ms > dt_ms {
                    Phase::Asking { remaining_ms: remaining_ms - dt_ms }
                } else {
                    Phase::Reveal { selected: None, remaining_ms: REVEAL_MS }
                };
                None
            }
            Phase::Reveal { selected, remaining_ms } => {
                if remaining_ms > dt_ms {
                    self.phase = Phase::Reveal { selected, remaining_ms: remaining_ms - dt_ms };
                    return None;
                }
                if self.index + 1 < QUESTIONS.len() {
                    self.index += 1;
                    self.phase = Phase::Asking { remaining_ms: self.question_ms };
                    None
                } else {
                    self.phase = Phase::Complete;
                    Some(self.score)
                }
            }
            Phase::Idle | Phase::Complete => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn correct_answer_scores() {
        let mut q = Quiz::new(30);
        q.start();
        q.answer(2);
        assert_eq!(q.score, 1);
        assert!(matches!(q.phase, Phase::Reveal { selected: Some(2), .. }));
        // Second answer during reveal is ignored.
        q.answer(2);
        assert_eq!(q.score, 1);
    }

    #[test]
    fn timeout_reveals_without_score() {
        let mut q = Quiz::new(30);
        q.start();
        assert_eq!(q.seconds_left(), 30);
        q.tick(29_500);
        assert_eq!(q.seconds_left(), 1);
        q.tick(500);
        assert_eq!(q.phase, Phase::Reveal { selected: None, remaining_ms: REVEAL_MS });
        q.tick(REVEAL_MS);
        assert_eq!(q.index, 1);
        assert_eq!(q.score, 0);
    }

    #[test]
    fn perfect_run_reports_final_score() {
        let mut q = Quiz::new(30);
        q.start();
        let mut result = None;
        for i in 0..QUESTIONS.len() {
            q.answer(QUESTIONS[i].answer);
            result = q.tick(REVEAL_MS);
        }
        assert_eq!(result, Some(8));
        assert_eq!(q.phase, Phase::Complete);
    }
}
