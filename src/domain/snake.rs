//! Snake on a 20x20 grid.
//!
//! The head advances one cell per step. Leaving the grid or running into the
//! body ends the game. Food adds 10 points and grows the snake by one.

use std::collections::VecDeque;

use rand::Rng;

pub const GRID: i32 = 20;
const FOOD_POINTS: u32 = 10;
pub const START: Pos = Pos { x: 10, y: 10 };
const FIRST_FOOD: Pos = Pos { x: 5, y: 5 };

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Pos {
    pub x: i32,
    pub y: i32,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Dir {
    Up,
    Down,
    Left,
    Right,
}

impl Dir {
    fn delta(self) -> (i32, i32) {
        match self {
            Dir::Up => (0, -1),
            Dir::Down => (0, 1),
            Dir::Left => (-1, 0),
            Dir::Right => (1, 0),
        }
    }

    fn opposite(self) -> Dir {
        match self {
            Dir::Up => Dir::Down,
            Dir::Down => Dir::Up,
            Dir::Left => Dir::Right,
            Dir::Right => Dir::Left,
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Status {
    Ready,
    Playing,
    Paused,
    Over,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Step {
    Moved,
    Ate,
    Crashed { score: u32 },
}

pub struct Snake {
    /// Head first.
    pub body: VecDeque<Pos>,
    pub food: Pos,
    pub score: u32,
    pub status: Status,
    dir: Dir,
    /// Direction of the last executed step; turns are checked against it.
    moved_dir: Dir,
    step_ms: u64,
    acc_ms: u64,
}

impl Snake {
    pub fn new(step_ms: u64) -> Self {
        Snake {
            body: VecDeque::from([START]),
            food: FIRST_FOOD,
            score: 0,
            status: Status::Ready,
            dir: Dir::Right,
            moved_dir: Dir::Right,
            step_ms: step_ms.max(1),
            acc_ms: 0,
        }
    }

    pub fn head(&self) -> Pos {
        self.body[0]
    }

    pub fn occupies(&self, p: Pos) -> bool {
        self.body.contains(&p)
    }

    /// Space bar: start, pause, resume.
    pub fn toggle(&mut self) {
        self.status = match self.status {
            Status::Ready | Status::Paused => Status::Playing,
            Status::Playing => Status::Paused,
            Status::Over => Status::Over,
        };
    }

    /// Reversing onto the neck is ignored.
    pub fn turn(&mut self, dir: Dir) {
        if dir != self.moved_dir.opposite() {
            self.dir = dir;
        }
    }

    pub fn tick(&mut self, dt_ms: u64, rng: &mut impl Rng) -> Option<Step> {
        if self.status != Status::Playing {
            return None;
        }
        self.acc_ms += dt_ms;
        let mut last = None;
        while self.acc_ms >= self.step_ms && self.status == Status::Playing {
            self.acc_ms -= self.step_ms;
            last = Some(self.step(rng));
        }
        last
    }

    pub fn step(&mut self, rng: &mut impl Rng) -> Step {
        let (dx, dy) = self.dir.delta();
        let head = self.head();
        let next = Pos { x: head.x + dx, y: head.y + dy };
        self.moved_dir = self.dir;

        let off_grid = next.x < 0 || next.x >= GRID || next.y < 0 || next.y >= GRID;
        if off_grid || self.occupies(next) {
            self.status = Status::Over;
            return Step::Crashed { score: self.score };
        }

        self.body.push_front(next);
        if next == self.food {
            self.score += FOOD_POINTS;
            self.food = self.place_food(rng);
            Step::Ate
        } else {
            self.body.pop_back();
            Step::Moved
        }
    }

    /// Random free cell. A snake filling the grid leaves the food where it is.
    fn place_food(&self, rng: &mut impl Rng) -> Pos {
        let free: Vec<Pos> = (0..GRID)
            .flat_map(|y| (0..GRID).map(move |x| Pos { x, y }))
            .filter(|p| !self.occupies(*p))
            .collect();
        if free.is_empty() {
            return self.food;
        }
        free[rng.random_range(0..free.len())]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn running() -> Snake {
        let mut s = Snake::new(150);
        s.toggle();
        s
    }

    #[test]
    fn moves_one_cell_per_interval() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut s = running();
        assert_eq!(s.tick(149, &mut rng), None);
        assert_eq!(s.tick(1, &mut rng), Some(Step::Moved));
        assert_eq!(s.head(), Pos { x: 11, y: 10 });
        assert_eq!(s.body.len(), 1);
    }

    #[test]
    fn eating_grows_and_scores() {
        let mut rng = StdRng::seed_from_u64(2);
        let mut s = running();
        s.food = Pos { x: 11, y: 10 };
        assert_eq!(s.step(&mut rng), Step::Ate);
        assert_eq!(s.score, 10);
        assert_eq!(s.body.len(), 2);
        assert!(!s.occupies(s.food));
    }

    #[test]
    fn wall_ends_game() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut s = running();
        let mut last = Step::Moved;
        for _ in 0..20 {
            last = s.step(&mut rng);
            if last != Step::Moved {
                break;
            }
        }
        assert_eq!(last, Step::Crashed { score: 0 });
        assert_eq!(s.status, Status::Over);
    }

    #[test]
    fn reversal_is_ignored() {
        let mut rng = StdRng::seed_from_u64(4);
        let mut s = running();
        s.turn(Dir::Left);
        s.step(&mut rng);
        assert_eq!(s.head(), Pos { x: 11, y: 10 });
    }

    #[test]
    fn quick_double_turn_cannot_reverse() {
        let mut rng = StdRng::seed_from_u64(5);
        let mut s = running();
        s.body = VecDeque::from([Pos { x: 10, y: 10 }, Pos { x: 9, y: 10 }, Pos { x: 8, y: 10 }]);
        s.food = Pos { x: 0, y: 0 };
        // Up then Left within one step: Left is checked against the last
        // executed direction (Right) and rejected.
        s.turn(Dir::Up);
        s.turn(Dir::Left);
        assert_eq!(s.step(&mut rng), Step::Moved);
        assert_eq!(s.head(), Pos { x: 10, y: 9 });
    }

    #[test]
    fn self_collision_ends_game() {
        let mut rng = StdRng::seed_from_u64(6);
        let mut s = running();
        s.food = Pos { x: 0, y: 0 };
        s.body = VecDeque::from([
            Pos { x: 5, y: 5 },
            Pos { x: 6, y: 5 },
            Pos { x: 6, y: 6 },
            Pos { x: 5, y: 6 },
            Pos { x: 4, y: 6 },
        ]);
        s.moved_dir = Dir::Left;
        s.dir = Dir::Left;
        s.turn(Dir::Down);
        assert!(matches!(s.step(&mut rng), Step::Crashed { .. }));
    }

    #[test]
    fn pause_freezes_movement() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut s = running();
        s.toggle();
        assert_eq!(s.status, Status::Paused);
        assert_eq!(s.tick(10_000, &mut rng), None);
        assert_eq!(s.head(), START);
    }
}
