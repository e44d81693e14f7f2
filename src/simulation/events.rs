//! Car events and system observers
//!
//! Cars push [`CarEvent`]s into an mpsc channel handed to them at
//! construction. The system drains the channel once every car has stepped and
//! forwards each event to its [`SystemObserver`]s.

use std::cell::RefCell;
use std::rc::Rc;
use std::sync::mpsc::{Receiver, Sender};

use super::types::{CarId, Floor};

/// Something a car reports to the system
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CarEvent {
    /// The car stopped at `floor` with its door open
    RequestFulfilled { car: CarId, floor: Floor },
}

pub type EventSender = Sender<CarEvent>;
pub type EventReceiver = Receiver<CarEvent>;

/// Callbacks invoked by [`ElevatorSystem::tick`][super::system::ElevatorSystem::tick].
///
/// All methods have default no-op implementations so implementors only need to
/// override what they care about.
pub trait SystemObserver {
    /// Called at the very start of each tick, before dispatch.
    fn on_tick_start(&mut self, _tick: u64) {}

    /// Called once per served stop, after every car has stepped.
    fn on_request_fulfilled(&mut self, _car: CarId, _floor: Floor) {}

    /// Called at the end of each tick.
    fn on_tick_end(&mut self, _tick: u64) {}
}

/// Shared observers, so the caller can still read them after handing a clone
/// to the system.
impl<T: SystemObserver> SystemObserver for Rc<RefCell<T>> {
    fn on_tick_start(&mut self, tick: u64) {
        self.borrow_mut().on_tick_start(tick);
    }

    fn on_request_fulfilled(&mut self, car: CarId, floor: Floor) {
        self.borrow_mut().on_request_fulfilled(car, floor);
    }

    fn on_tick_end(&mut self, tick: u64) {
        self.borrow_mut().on_tick_end(tick);
    }
}

/// Records every served stop and counts ticks
#[derive(Debug, Clone, Default)]
pub struct StopLog {
    pub stops: Vec<(u64, CarId, Floor)>,
    pub ticks: u64,
    current_tick: u64,
}

impl StopLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stops served by `car`
    pub fn stops_for(&self, car: CarId) -> usize {
        self.stops.iter().filter(|(_, c, _)| *c == car).count()
    }
}

impl SystemObserver for StopLog {
    fn on_tick_start(&mut self, tick: u64) {
        self.current_tick = tick;
    }

    fn on_request_fulfilled(&mut self, car: CarId, floor: Floor) {
        self.stops.push((self.current_tick, car, floor));
    }

    fn on_tick_end(&mut self, _tick: u64) {
        self.ticks += 1;
    }
}
