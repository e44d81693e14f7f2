//! Elevator car
//!
//! Composes the door, the two per-direction request queues and the scheduling
//! state. All changes to a car go through [`Command`]s produced by its
//! [`CarState`], except the explicit maintenance switches.

use std::rc::Rc;
use std::time::Duration;

use log::{debug, info, warn};

use super::clock::Clock;
use super::door::DoorController;
use super::error::ReconstructionError;
use super::events::{CarEvent, EventSender};
use super::request_queue::RequestQueue;
use super::state::{CarState, CarView, Command};
use super::types::{CarId, Direction, DoorState, Floor};

/// Plain-data picture of a car, used to persist and rebuild it
#[derive(Debug, Clone, PartialEq)]
pub struct CarSnapshot {
    pub id: CarId,
    pub current_floor: Floor,
    pub direction: Direction,
    pub state: CarState,
    pub door_state: DoorState,
    /// Clock time the door was opened; required when the door is open
    pub door_opened_at: Option<Duration>,
    /// Pending up stops, in service order
    pub up_requests: Vec<Floor>,
    /// Pending down stops, in service order
    pub down_requests: Vec<Floor>,
}

impl CarSnapshot {
    /// An idle car with a closed door and nothing queued
    pub fn idle_at(id: CarId, current_floor: Floor) -> Self {
        Self {
            id,
            current_floor,
            direction: Direction::Stop,
            state: CarState::Idle,
            door_state: DoorState::Closed,
            door_opened_at: None,
            up_requests: Vec::new(),
            down_requests: Vec::new(),
        }
    }
}

/// A single elevator car
pub struct ElevatorCar {
    id: CarId,
    num_floors: u32,
    current_floor: Floor,
    direction: Direction,
    door: DoorController,
    up_requests: RequestQueue,
    down_requests: RequestQueue,
    state: CarState,
    door_open_duration: Duration,
    clock: Rc<dyn Clock>,
    events: EventSender,
}

impl ElevatorCar {
    /// A new car, idle at the ground floor with its door closed
    pub fn new(
        id: CarId,
        num_floors: u32,
        door_open_duration: Duration,
        clock: Rc<dyn Clock>,
        events: EventSender,
    ) -> Self {
        Self {
            id,
            num_floors,
            current_floor: 0,
            direction: Direction::Stop,
            door: DoorController::new(),
            up_requests: RequestQueue::up(),
            down_requests: RequestQueue::down(),
            state: CarState::Idle,
            door_open_duration,
            clock,
            events,
        }
    }

    /// Rebuild a car from a snapshot
    ///
    /// Floors outside the building and an open door without an opening time
    /// are rejected rather than patched up.
    pub fn restore(
        snapshot: &CarSnapshot,
        num_floors: u32,
        door_open_duration: Duration,
        clock: Rc<dyn Clock>,
        events: EventSender,
    ) -> Result<Self, ReconstructionError> {
        let in_range = |floor: Floor| {
            if floor < num_floors {
                Ok(floor)
            } else {
                Err(ReconstructionError::FloorOutOfRange { floor, num_floors })
            }
        };

        let mut car = Self::new(snapshot.id, num_floors, door_open_duration, clock, events);
        car.current_floor = in_range(snapshot.current_floor)?;
        car.direction = snapshot.direction;
        car.state = snapshot.state;

        if snapshot.door_state == DoorState::Open {
            let opened_at = snapshot
                .door_opened_at
                .ok_or(ReconstructionError::MissingDoorTimestamp { car: snapshot.id })?;
            car.door.open(opened_at);
        }

        for &floor in &snapshot.up_requests {
            car.up_requests.add(in_range(floor)?);
        }
        for &floor in &snapshot.down_requests {
            car.down_requests.add(in_range(floor)?);
        }

        Ok(car)
    }

    pub fn snapshot(&self) -> CarSnapshot {
        CarSnapshot {
            id: self.id,
            current_floor: self.current_floor,
            direction: self.direction,
            state: self.state,
            door_state: self.door.state(),
            door_opened_at: self.door.opened_at(),
            up_requests: self.up_requests.floors(),
            down_requests: self.down_requests.floors(),
        }
    }

    pub fn id(&self) -> CarId {
        self.id
    }

    pub fn num_floors(&self) -> u32 {
        self.num_floors
    }

    pub fn current_floor(&self) -> Floor {
        self.current_floor
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn state(&self) -> CarState {
        self.state
    }

    pub fn is_idle(&self) -> bool {
        self.state == CarState::Idle
    }

    pub fn door(&self) -> &DoorController {
        &self.door
    }

    pub fn door_state(&self) -> DoorState {
        self.door.state()
    }

    pub fn door_open_duration(&self) -> Duration {
        self.door_open_duration
    }

    pub fn up_requests(&self) -> &RequestQueue {
        &self.up_requests
    }

    pub fn down_requests(&self) -> &RequestQueue {
        &self.down_requests
    }

    /// Ask the car to stop at `floor`
    ///
    /// The floor is assumed to be inside the building; the system checks that
    /// before routing a request here. Returns the commands that were applied.
    pub fn register_request(&mut self, floor: Floor) -> Vec<Command> {
        let commands = self.state.on_request(&self.view(), floor);
        if commands.is_empty() && self.state != CarState::Maintenance {
            debug!(
                "{} dropped request for floor {} (at {}, {})",
                self.id, floor, self.current_floor, self.state
            );
        }
        self.apply(&commands);
        commands
    }

    /// Advance the car by one step
    ///
    /// An open door that has been open long enough is closed first. Only a
    /// closed door lets the state machine run, so a car can close its door and
    /// move in the same step. Returns the state-machine commands applied.
    pub fn step(&mut self) -> Vec<Command> {
        let now = self.clock.now();
        if self.door.should_auto_close(now, self.door_open_duration) {
            debug!("{} closing door at floor {}", self.id, self.current_floor);
            self.door.close();
        }

        if self.door.is_open() {
            return Vec::new();
        }

        let commands = self.state.on_step(&self.view());
        self.apply(&commands);
        commands
    }

    /// Take the car out of service. Pending requests are kept.
    pub fn enter_maintenance(&mut self) {
        info!("{} entering maintenance at floor {}", self.id, self.current_floor);
        self.state = CarState::Maintenance;
        self.direction = Direction::Stop;
    }

    /// Put the car back in service as idle. Pending requests are kept.
    pub fn exit_maintenance(&mut self) {
        info!("{} leaving maintenance at floor {}", self.id, self.current_floor);
        self.state = CarState::Idle;
        self.direction = Direction::Stop;
    }

    fn view(&self) -> CarView<'_> {
        CarView {
            current_floor: self.current_floor,
            up_requests: &self.up_requests,
            down_requests: &self.down_requests,
        }
    }

    fn apply(&mut self, commands: &[Command]) {
        for command in commands {
            debug!("{} applying {:?}", self.id, command);
            match *command {
                Command::SetDirection(direction) => self.direction = direction,
                Command::SetState(state) => self.state = state,
                Command::IncrementFloor => {
                    if self.current_floor + 1 < self.num_floors {
                        self.current_floor += 1;
                    }
                }
                Command::DecrementFloor => {
                    self.current_floor = self.current_floor.saturating_sub(1);
                }
                Command::AddUpRequest(floor) => self.up_requests.add(floor),
                Command::AddDownRequest(floor) => self.down_requests.add(floor),
                Command::RemoveUpRequest(floor) => self.up_requests.remove(floor),
                Command::RemoveDownRequest(floor) => self.down_requests.remove(floor),
                Command::OpenDoorAndNotify => self.open_door_and_notify(),
            }
        }
    }

    fn open_door_and_notify(&mut self) {
        self.door.open(self.clock.now());
        info!("{} arrived at floor {}, door open", self.id, self.current_floor);

        let event = CarEvent::RequestFulfilled {
            car: self.id,
            floor: self.current_floor,
        };
        if self.events.send(event).is_err() {
            warn!("{} has no event listener, dropped {:?}", self.id, event);
        }
    }
}
