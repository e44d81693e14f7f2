//! Per-car scheduling state machine
//!
//! A car is always in one of four [`CarState`]s. The state never touches the
//! car directly: given a read-only [`CarView`] it returns the list of
//! [`Command`]s the car should apply, in order. The car applies them and hands
//! the same list back to its caller, which keeps every transition auditable.
//!
//! Scheduling rules:
//! - A moving car serves its same-direction queue strictly in order and moves
//!   at most one floor per step.
//! - Requests ahead of a moving car join the current sweep; requests behind it
//!   are dropped and have to come back through the dispatcher.
//! - When a sweep empties, the car turns around if the opposite queue has work
//!   and goes idle otherwise.

use std::fmt;
use std::str::FromStr;

use super::error::ReconstructionError;
use super::request_queue::RequestQueue;
use super::types::{Direction, Floor};

/// Scheduling state of a car
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CarState {
    Idle,
    MovingUp,
    MovingDown,
    Maintenance,
}

/// A primitive change to apply to a car
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    SetDirection(Direction),
    SetState(CarState),
    IncrementFloor,
    DecrementFloor,
    AddUpRequest(Floor),
    AddDownRequest(Floor),
    RemoveUpRequest(Floor),
    RemoveDownRequest(Floor),
    /// Open the door at the current floor and report the floor as served
    OpenDoorAndNotify,
}

/// What a state may look at when deciding
#[derive(Debug, Clone, Copy)]
pub struct CarView<'a> {
    pub current_floor: Floor,
    pub up_requests: &'a RequestQueue,
    pub down_requests: &'a RequestQueue,
}

impl CarView<'_> {
    /// (queue for `direction`, queue for the opposite direction)
    fn queues(&self, direction: Direction) -> (&RequestQueue, &RequestQueue) {
        match direction {
            Direction::Down => (self.down_requests, self.up_requests),
            Direction::Up | Direction::Stop => (self.up_requests, self.down_requests),
        }
    }
}

impl CarState {
    /// Tag used when persisting the state
    pub fn tag(&self) -> &'static str {
        match self {
            CarState::Idle => "Idle",
            CarState::MovingUp => "MovingUp",
            CarState::MovingDown => "MovingDown",
            CarState::Maintenance => "Maintenance",
        }
    }

    /// Commands for one movement step. Only called while the door is closed.
    pub fn on_step(self, car: &CarView<'_>) -> Vec<Command> {
        match self {
            CarState::Idle => idle_step(car),
            CarState::MovingUp => sweep_step(Direction::Up, car),
            CarState::MovingDown => sweep_step(Direction::Down, car),
            CarState::Maintenance => Vec::new(),
        }
    }

    /// Commands for a new request to stop at `floor`
    pub fn on_request(self, car: &CarView<'_>, floor: Floor) -> Vec<Command> {
        match self {
            CarState::Idle => idle_request(car, floor),
            CarState::MovingUp => sweep_request(Direction::Up, car, floor),
            CarState::MovingDown => sweep_request(Direction::Down, car, floor),
            CarState::Maintenance => Vec::new(),
        }
    }
}

impl fmt::Display for CarState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

impl FromStr for CarState {
    type Err = ReconstructionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Idle" => Ok(CarState::Idle),
            "MovingUp" => Ok(CarState::MovingUp),
            "MovingDown" => Ok(CarState::MovingDown),
            "Maintenance" => Ok(CarState::Maintenance),
            other => Err(ReconstructionError::UnknownState(other.to_string())),
        }
    }
}

fn moving(direction: Direction) -> CarState {
    match direction {
        Direction::Up => CarState::MovingUp,
        Direction::Down => CarState::MovingDown,
        Direction::Stop => CarState::Idle,
    }
}

fn opposite(direction: Direction) -> Direction {
    match direction {
        Direction::Up => Direction::Down,
        Direction::Down => Direction::Up,
        Direction::Stop => Direction::Stop,
    }
}

fn idle_step(car: &CarView<'_>) -> Vec<Command> {
    if !car.up_requests.is_empty() {
        vec![
            Command::SetDirection(Direction::Up),
            Command::SetState(CarState::MovingUp),
        ]
    } else if !car.down_requests.is_empty() {
        vec![
            Command::SetDirection(Direction::Down),
            Command::SetState(CarState::MovingDown),
        ]
    } else {
        Vec::new()
    }
}

fn idle_request(car: &CarView<'_>, floor: Floor) -> Vec<Command> {
    if floor > car.current_floor {
        vec![Command::AddUpRequest(floor)]
    } else if floor < car.current_floor {
        vec![Command::AddDownRequest(floor)]
    } else {
        vec![Command::OpenDoorAndNotify]
    }
}

fn sweep_step(direction: Direction, car: &CarView<'_>) -> Vec<Command> {
    let (ahead, behind) = car.queues(direction);

    // Stale state: nothing left in this sweep
    let Some(destination) = ahead.peek_next() else {
        return vec![
            Command::SetState(CarState::Idle),
            Command::SetDirection(Direction::Stop),
        ];
    };

    let mut commands = Vec::new();
    let mut floor = car.current_floor;

    match direction {
        Direction::Up if floor < destination => {
            commands.push(Command::IncrementFloor);
            floor += 1;
        }
        Direction::Down if floor > destination => {
            commands.push(Command::DecrementFloor);
            floor -= 1;
        }
        _ => {}
    }

    if floor == destination {
        commands.push(match direction {
            Direction::Down => Command::RemoveDownRequest(destination),
            _ => Command::RemoveUpRequest(destination),
        });
        commands.push(Command::OpenDoorAndNotify);

        if ahead.len() == 1 {
            if behind.is_empty() {
                commands.push(Command::SetState(CarState::Idle));
                commands.push(Command::SetDirection(Direction::Stop));
            } else {
                let reverse = opposite(direction);
                commands.push(Command::SetDirection(reverse));
                commands.push(Command::SetState(moving(reverse)));
            }
        }
    }

    commands
}

fn sweep_request(direction: Direction, car: &CarView<'_>, floor: Floor) -> Vec<Command> {
    let current = car.current_floor;
    if floor == current {
        return vec![Command::OpenDoorAndNotify];
    }
    match direction {
        Direction::Up if floor > current => vec![Command::AddUpRequest(floor)],
        Direction::Down if floor < current => vec![Command::AddDownRequest(floor)],
        // Behind the car on this sweep
        _ => Vec::new(),
    }
}
