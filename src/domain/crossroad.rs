//! Cross the road: dodge wrapping traffic lanes to reach the top row.

use rand::Rng;

pub const GRID: i32 = 10;
pub const START: (i32, i32) = (5, 9);
/// Distance below which the player and a car overlap, on both axes.
const HIT_RADIUS: f32 = 0.8;
/// Cells advanced per frame for each unit of lane speed.
const FRAME_FACTOR: f32 = 0.02;
const FRAME_MS: u64 = 16;
const WRAP_MIN: f32 = -1.0;
const WRAP_MAX: f32 = 11.0;
const CARS_PER_LANE: usize = 2;

#[derive(Clone, Copy, PartialEq, Debug)]
pub struct Car {
    pub x: f32,
    pub y: i32,
    pub speed: f32,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum State {
    Waiting,
    Playing,
    Crashed,
    /// Reached row 0; the run is over until the next start.
    Won,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Event {
    /// Reached row 0; carries the new session score.
    Crossed { score: u32 },
    Hit { score: u32 },
}

pub struct CrossRoad {
    pub player: (i32, i32),
    pub cars: Vec<Car>,
    pub state: State,
    /// Session score, kept across runs.
    pub score: u32,
    /// Multiplier for crossing points. Traffic never speeds up.
    pub level: u32,
    acc_ms: u64,
}

impl CrossRoad {
    pub fn new(rng: &mut impl Rng) -> Self {
        CrossRoad {
            player: START,
            cars: spawn_traffic(rng),
            state: State::Waiting,
            score: 0,
            level: 1,
            acc_ms: 0,
        }
    }

    /// Begin a fresh run with new traffic. The session score is kept.
    pub fn start(&mut self, rng: &mut impl Rng) {
        self.player = START;
        self.cars = spawn_traffic(rng);
        self.state = State::Playing;
        self.acc_ms = 0;
    }

    pub fn step(&mut self, dx: i32, dy: i32) -> Option<Event> {
        if self.state != State::Playing {
            return None;
        }
        let x = (self.player.0 + dx).clamp(0, GRID - 1);
        let y = (self.player.1 + dy).clamp(0, GRID - 1);
        self.player = (x, y);
        if self.collides() {
            return Some(self.crash());
        }
        if y == 0 {
            self.score += self.level * 10;
            self.state = State::Won;
            return Some(Event::Crossed { score: self.score });
        }
        None
    }

    /// Traffic advances once per 16ms frame regardless of the caller's tick.
    pub fn tick(&mut self, dt_ms: u64) -> Option<Event> {
        if self.state != State::Playing {
            return None;
        }
        self.acc_ms += dt_ms;
        while self.acc_ms >= FRAME_MS {
            self.acc_ms -= FRAME_MS;
            for car in &mut self.cars {
                car.x += car.speed * FRAME_FACTOR;
                if car.x > WRAP_MAX {
                    car.x = WRAP_MIN;
                } else if car.x < WRAP_MIN {
                    car.x = WRAP_MAX;
                }
            }
            if self.collides() {
                return Some(self.crash());
            }
        }
        None
    }

    fn collides(&self) -> bool {
        let (px, py) = (self.player.0 as f32, self.player.1 as f32);
        self.cars
            .iter()
            .any(|c| (c.x - px).abs() < HIT_RADIUS && (c.y as f32 - py).abs() < HIT_RADIUS)
    }

    fn crash(&mut self) -> Event {
        self.state = State::Crashed;
        Event::Hit { score: self.score }
    }
}

/// Two cars on each odd row 1..=7.
fn spawn_traffic(rng: &mut impl Rng) -> Vec<Car> {
    let mut cars = Vec::with_capacity(4 * CARS_PER_LANE);
    for y in (1..=7).step_by(2) {
        for _ in 0..CARS_PER_LANE {
            let magnitude = rng.random_range(0.5..1.0);
            let speed = if rng.random_bool(0.5) { magnitude } else { -magnitude };
            cars.push(Car { x: rng.random_range(0.0..GRID as f32), y, speed });
        }
    }
    cars
}
