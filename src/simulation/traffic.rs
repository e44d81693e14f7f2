//! Random hall-call traffic for headless runs

use rand::rngs::StdRng;
use rand::Rng;
use rand::SeedableRng;

use super::types::{Direction, Floor};

/// Produces hall calls at random floors
///
/// Each tick a call is made with probability `call_probability`. The top floor
/// only calls down and the ground floor only calls up.
pub struct HallCallGenerator {
    num_floors: u32,
    call_probability: f64,
    /// Optional seeded RNG for reproducible runs
    rng: Option<StdRng>,
}

impl HallCallGenerator {
    /// `call_probability` is clamped to `0..=1`; NaN means no calls.
    pub fn new(num_floors: u32, call_probability: f64) -> Self {
        let call_probability = if call_probability.is_nan() {
            0.0
        } else {
            call_probability.clamp(0.0, 1.0)
        };
        Self {
            num_floors,
            call_probability,
            rng: None,
        }
    }

    /// Same as [`new`](Self::new) but reproducible
    pub fn with_seed(num_floors: u32, call_probability: f64, seed: u64) -> Self {
        Self {
            rng: Some(StdRng::seed_from_u64(seed)),
            ..Self::new(num_floors, call_probability)
        }
    }

    /// The call for this tick, if any
    pub fn next_call(&mut self) -> Option<(Floor, Direction)> {
        if self.num_floors < 2 {
            return None;
        }
        if !self.random_bool(self.call_probability) {
            return None;
        }

        let floor = self.random_floor();
        let direction = if floor == 0 {
            Direction::Up
        } else if floor + 1 == self.num_floors {
            Direction::Down
        } else if self.random_bool(0.5) {
            Direction::Up
        } else {
            Direction::Down
        };
        Some((floor, direction))
    }

    fn random_bool(&mut self, p: f64) -> bool {
        match &mut self.rng {
            Some(rng) => rng.random_bool(p),
            None => rand::rng().random_bool(p),
        }
    }

    fn random_floor(&mut self) -> Floor {
        let range = 0..self.num_floors;
        match &mut self.rng {
            Some(rng) => rng.random_range(range),
            None => rand::rng().random_range(range),
        }
    }
}
