//! Elevator system that ties everything together
//!
//! Owns every car and the building-wide hall-call queues. One [`tick`] is:
//! dispatch pending hall calls, step every car in id order, then drain the
//! cars' events and drop the hall calls they served.
//!
//! [`tick`]: ElevatorSystem::tick

use std::fmt::Write as _;
use std::rc::Rc;
use std::sync::mpsc;
use std::time::Duration;

use log::{debug, info, warn};

use super::car::ElevatorCar;
use super::clock::Clock;
use super::config::SystemConfig;
use super::dispatch::{ClosestCarStrategy, DispatchStrategy};
use super::error::{ReconstructionError, SystemError, SystemResult};
use super::events::{CarEvent, EventReceiver, EventSender, SystemObserver};
use super::request_queue::RequestQueue;
use super::state::{CarState, Command};
use super::store::{split_requests, CarRecord, RequestRecord, StateStore};
use super::types::{CarId, Direction, DoorState, Floor};

/// What happened during one tick
#[derive(Debug, Clone, PartialEq)]
pub struct TickReport {
    pub tick: u64,
    /// Stops served this tick, in the order the cars reported them
    pub fulfilled: Vec<CarEvent>,
}

/// The main elevator bank
pub struct ElevatorSystem {
    config: SystemConfig,

    /// All cars, indexed by `CarId.0`
    cars: Vec<ElevatorCar>,

    /// Pending hall calls going up
    up_requests: RequestQueue,

    /// Pending hall calls going down
    down_requests: RequestQueue,

    strategy: Box<dyn DispatchStrategy>,

    /// Receiving end of the channel every car reports into
    events: EventReceiver,

    observers: Vec<Box<dyn SystemObserver>>,

    /// Number of completed ticks
    tick: u64,
}

impl ElevatorSystem {
    /// A new system using [`ClosestCarStrategy`], every car idle at the ground floor
    pub fn new(config: SystemConfig, clock: Rc<dyn Clock>) -> SystemResult<Self> {
        Self::with_strategy(config, clock, Box::new(ClosestCarStrategy::new()))
    }

    pub fn with_strategy(
        config: SystemConfig,
        clock: Rc<dyn Clock>,
        strategy: Box<dyn DispatchStrategy>,
    ) -> SystemResult<Self> {
        config.validate()?;
        let (sender, receiver) = mpsc::channel();

        let cars = (0..config.num_cars)
            .map(|index| new_car(&config, CarId(index), &clock, &sender))
            .collect();

        Ok(Self::assemble(config, cars, strategy, receiver))
    }

    /// Rebuild a system from `store`
    ///
    /// Cars with no stored record start fresh. A stored configuration that
    /// doesn't match `config`, or any record that can't be parsed, is an error.
    pub fn restore(
        config: SystemConfig,
        store: &dyn StateStore,
        clock: Rc<dyn Clock>,
        strategy: Box<dyn DispatchStrategy>,
    ) -> SystemResult<Self> {
        config.validate()?;

        if let Some((stored_floors, stored_cars)) = store.load_system_config()? {
            if stored_floors != config.num_floors || stored_cars != config.num_cars {
                return Err(ReconstructionError::ConfigMismatch {
                    stored_floors,
                    stored_cars,
                    floors: config.num_floors,
                    cars: config.num_cars,
                }
                .into());
            }
        }

        let (sender, receiver) = mpsc::channel();
        let mut cars = Vec::with_capacity(config.num_cars);
        for index in 0..config.num_cars {
            let id = CarId(index);
            let car = match store.load_car(id)? {
                Some(record) => {
                    let requests = store.load_car_requests(id)?;
                    let snapshot = record.to_snapshot(&requests)?;
                    ElevatorCar::restore(
                        &snapshot,
                        config.num_floors,
                        config.door_open_duration,
                        Rc::clone(&clock),
                        sender.clone(),
                    )?
                }
                None => new_car(&config, id, &clock, &sender),
            };
            cars.push(car);
        }

        let mut system = Self::assemble(config, cars, strategy, receiver);

        let (up, down) = split_requests(&store.load_system_requests()?)?;
        for floor in up {
            system.check_floor_restored(floor)?;
            system.up_requests.add(floor);
        }
        for floor in down {
            system.check_floor_restored(floor)?;
            system.down_requests.add(floor);
        }

        info!(
            "Restored {} cars, hall calls up {:?} down {:?}",
            system.cars.len(),
            system.up_requests.floors(),
            system.down_requests.floors()
        );
        Ok(system)
    }

    fn assemble(
        config: SystemConfig,
        cars: Vec<ElevatorCar>,
        strategy: Box<dyn DispatchStrategy>,
        events: EventReceiver,
    ) -> Self {
        Self {
            config,
            cars,
            up_requests: RequestQueue::up(),
            down_requests: RequestQueue::down(),
            strategy,
            events,
            observers: Vec::new(),
            tick: 0,
        }
    }

    /// Write the configuration, every car and every hall call to `store`
    pub fn save(&self, store: &mut dyn StateStore) -> SystemResult<()> {
        store.save_system_config(self.config.num_floors, self.config.num_cars)?;
        for car in &self.cars {
            let snapshot = car.snapshot();
            store.save_car(&CarRecord::from_snapshot(&snapshot))?;
            store.save_car_requests(car.id(), &CarRecord::requests_of(&snapshot))?;
        }
        store.save_system_requests(&self.hall_call_records())?;
        store.commit()?;
        Ok(())
    }

    pub fn add_observer(&mut self, observer: Box<dyn SystemObserver>) {
        self.observers.push(observer);
    }

    pub fn config(&self) -> &SystemConfig {
        &self.config
    }

    pub fn cars(&self) -> &[ElevatorCar] {
        &self.cars
    }

    pub fn car(&self, id: CarId) -> SystemResult<&ElevatorCar> {
        self.cars.get(id.0).ok_or(SystemError::UnknownCar(id))
    }

    pub fn up_requests(&self) -> &RequestQueue {
        &self.up_requests
    }

    pub fn down_requests(&self) -> &RequestQueue {
        &self.down_requests
    }

    /// Number of completed ticks
    pub fn tick_count(&self) -> u64 {
        self.tick
    }

    /// Earliest clock time a restored system can resume from
    ///
    /// Door opening times are stored as readings of the previous run's clock.
    /// A fresh clock must start no earlier than the latest of them, or those
    /// doors would stay open until the new clock caught up.
    pub fn resume_time(&self) -> Duration {
        self.cars
            .iter()
            .filter_map(|car| car.door().opened_at())
            .max()
            .unwrap_or(Duration::ZERO)
    }

    /// Register a hall call. Repeating a pending call changes nothing.
    pub fn call_elevator(&mut self, floor: Floor, direction: Direction) -> SystemResult<()> {
        self.check_floor(floor)?;
        match direction {
            Direction::Up => self.up_requests.add(floor),
            Direction::Down => self.down_requests.add(floor),
            Direction::Stop => return Err(SystemError::InvalidHallDirection),
        }
        debug!("Hall call at floor {} going {}", floor, direction);
        Ok(())
    }

    /// Press a floor button inside `car`
    ///
    /// Returns the commands the car applied; an empty list means the car
    /// ignored the request (behind it on this sweep, or in maintenance).
    pub fn request_floor(&mut self, car: CarId, floor: Floor) -> SystemResult<Vec<Command>> {
        self.check_floor(floor)?;
        let car = self.car_mut(car)?;
        Ok(car.register_request(floor))
    }

    pub fn enter_maintenance(&mut self, car: CarId) -> SystemResult<()> {
        self.car_mut(car)?.enter_maintenance();
        Ok(())
    }

    pub fn exit_maintenance(&mut self, car: CarId) -> SystemResult<()> {
        self.car_mut(car)?.exit_maintenance();
        Ok(())
    }

    /// Offer every pending hall call to the strategy, up calls first
    ///
    /// Calls stay queued until a car reports them served, so a call no car
    /// can take now is simply offered again next time.
    pub fn dispatch(&mut self) {
        let num_cars = self.cars.len();
        for (direction, floors) in [
            (Direction::Up, self.up_requests.floors()),
            (Direction::Down, self.down_requests.floors()),
        ] {
            for floor in floors {
                match self.strategy.find_best_car(&self.cars, floor, direction) {
                    Some(index) => match self.cars.get_mut(index) {
                        Some(car) => {
                            debug!("Assigning hall call {} {} to {}", floor, direction, car.id());
                            car.register_request(floor);
                        }
                        None => warn!(
                            "Strategy picked car index {} of {} for hall call {} {}, skipping",
                            index, num_cars, floor, direction
                        ),
                    },
                    None => debug!("No car available for hall call {} {}", floor, direction),
                }
            }
        }
    }

    /// Run one full cycle: dispatch, step every car, then apply served stops
    pub fn tick(&mut self) -> TickReport {
        let tick = self.tick + 1;
        for observer in &mut self.observers {
            observer.on_tick_start(tick);
        }

        self.dispatch();

        for car in &mut self.cars {
            car.step();
        }

        let fulfilled = self.drain_events();

        for observer in &mut self.observers {
            observer.on_tick_end(tick);
        }
        self.tick = tick;

        TickReport { tick, fulfilled }
    }

    /// Apply every event the cars have reported so far
    ///
    /// A served floor is dropped from both hall queues since the event does
    /// not say which call it answered.
    pub fn drain_events(&mut self) -> Vec<CarEvent> {
        let mut drained = Vec::new();
        while let Ok(event) = self.events.try_recv() {
            let CarEvent::RequestFulfilled { car, floor } = event;
            self.up_requests.remove(floor);
            self.down_requests.remove(floor);
            for observer in &mut self.observers {
                observer.on_request_fulfilled(car, floor);
            }
            drained.push(event);
        }
        drained
    }

    /// One status line per car plus the pending hall calls
    pub fn summary(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "=== Elevator System Summary (tick {}) ===", self.tick);
        for car in &self.cars {
            let _ = writeln!(
                out,
                "  {}: floor {}, {}, {}, door {}, up {:?}, down {:?}",
                car.id(),
                car.current_floor(),
                car.direction(),
                car.state(),
                car.door_state(),
                car.up_requests().floors(),
                car.down_requests().floors()
            );
        }
        let _ = writeln!(
            out,
            "  Hall calls: up {:?}, down {:?}",
            self.up_requests.floors(),
            self.down_requests.floors()
        );
        out
    }

    /// Text picture of the shafts, top floor first
    pub fn render(&self) -> String {
        let mut out = String::new();
        out.push_str("Legend: [^]=Car going up, [v]=Car going down, [-]=Idle, <x>=Door open, [M]=Maintenance\n");

        for floor in (0..self.config.num_floors).rev() {
            let _ = write!(out, "{:>3} |", floor);
            for car in &self.cars {
                if car.current_floor() != floor {
                    out.push_str(" . ");
                    continue;
                }
                let symbol = if car.state() == CarState::Maintenance {
                    'M'
                } else {
                    car.direction().arrow()
                };
                let (left, right) = match car.door_state() {
                    DoorState::Open => ('<', '>'),
                    DoorState::Closed => ('[', ']'),
                };
                let _ = write!(out, "{left}{symbol}{right}");
            }
            out.push_str("| ");
            out.push(if self.up_requests.contains(floor) { '^' } else { ' ' });
            out.push(if self.down_requests.contains(floor) { 'v' } else { ' ' });
            out.push('\n');
        }
        out
    }

    fn hall_call_records(&self) -> Vec<RequestRecord> {
        self.up_requests
            .floors()
            .into_iter()
            .map(|floor| RequestRecord::new(floor, Direction::Up))
            .chain(
                self.down_requests
                    .floors()
                    .into_iter()
                    .map(|floor| RequestRecord::new(floor, Direction::Down)),
            )
            .collect()
    }

    fn car_mut(&mut self, id: CarId) -> SystemResult<&mut ElevatorCar> {
        self.cars.get_mut(id.0).ok_or(SystemError::UnknownCar(id))
    }

    fn check_floor(&self, floor: Floor) -> SystemResult<()> {
        if floor < self.config.num_floors {
            Ok(())
        } else {
            Err(SystemError::FloorOutOfRange {
                floor,
                num_floors: self.config.num_floors,
            })
        }
    }

    fn check_floor_restored(&self, floor: Floor) -> Result<(), ReconstructionError> {
        if floor < self.config.num_floors {
            Ok(())
        } else {
            Err(ReconstructionError::FloorOutOfRange {
                floor,
                num_floors: self.config.num_floors,
            })
        }
    }
}

fn new_car(
    config: &SystemConfig,
    id: CarId,
    clock: &Rc<dyn Clock>,
    sender: &EventSender,
) -> ElevatorCar {
    ElevatorCar::new(
        id,
        config.num_floors,
        config.door_open_duration,
        Rc::clone(clock),
        sender.clone(),
    )
}
