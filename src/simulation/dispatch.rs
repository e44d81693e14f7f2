//! Hall call dispatching
//!
//! A [`DispatchStrategy`] picks which car should answer a hall call.
//! [`ClosestCarStrategy`] prefers the nearest car that can take the call
//! without turning around.

use ordered_float::OrderedFloat;

use super::car::ElevatorCar;
use super::state::CarState;
use super::types::{Direction, Floor, IDLE_CAR_PENALTY};

/// Chooses a car for a hall call
pub trait DispatchStrategy {
    /// Index into `cars` of the car that should serve a call at `floor` going
    /// `direction`, or `None` when no car can take it right now.
    fn find_best_car(&self, cars: &[ElevatorCar], floor: Floor, direction: Direction)
        -> Option<usize>;
}

/// Assigns each hall call to the cheapest suitable car
///
/// Idle cars cost their distance plus [`IDLE_CAR_PENALTY`]. Cars already
/// travelling in the call's direction cost their plain distance, but only
/// when the floor is still ahead of them and on the way. Everything else is
/// unsuitable. Ties go to the car listed first.
#[derive(Debug, Clone, Copy, Default)]
pub struct ClosestCarStrategy;

impl ClosestCarStrategy {
    pub fn new() -> Self {
        Self
    }

    /// Cost of sending `car` to the call, or `None` if it can't take it
    pub fn evaluate(
        &self,
        car: &ElevatorCar,
        floor: Floor,
        direction: Direction,
    ) -> Option<OrderedFloat<f64>> {
        let current = car.current_floor();
        let distance = f64::from(current.abs_diff(floor));

        if car.state() == CarState::Idle {
            return Some(OrderedFloat(distance + IDLE_CAR_PENALTY));
        }

        if car.state() == CarState::Maintenance || car.direction() != direction {
            return None;
        }

        let on_the_way = match direction {
            Direction::Up => {
                let queue = car.up_requests();
                current <= floor
                    && (queue.contains(floor)
                        || (queue.is_empty() && current <= floor)
                        || queue.max().is_some_and(|furthest| floor <= furthest))
            }
            Direction::Down => {
                let queue = car.down_requests();
                current >= floor
                    && (queue.contains(floor)
                        || (queue.is_empty() && current >= floor)
                        || queue.min().is_some_and(|furthest| floor >= furthest))
            }
            Direction::Stop => false,
        };

        on_the_way.then_some(OrderedFloat(distance))
    }
}

impl DispatchStrategy for ClosestCarStrategy {
    fn find_best_car(
        &self,
        cars: &[ElevatorCar],
        floor: Floor,
        direction: Direction,
    ) -> Option<usize> {
        let mut best: Option<(usize, OrderedFloat<f64>)> = None;

        for (index, car) in cars.iter().enumerate() {
            let Some(cost) = self.evaluate(car, floor, direction) else {
                continue;
            };
            // Strict comparison keeps the first car on a tie
            if best.map_or(true, |(_, best_cost)| cost < best_cost) {
                best = Some((index, cost));
            }
        }

        best.map(|(index, _)| index)
    }
}
