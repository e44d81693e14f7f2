//! Elevator bank simulation
//!
//! Cars step one floor per tick and the system hands hall calls to them.
//! Nothing here sleeps or spawns threads; the caller drives [`ElevatorSystem::tick`]
//! and supplies the clock.

mod car;
mod clock;
mod config;
mod dispatch;
mod door;
mod error;
mod events;
mod request_queue;
#[cfg(feature = "sqlite")]
mod sqlite_store;
mod state;
mod store;
mod system;
mod traffic;
mod types;

pub use car::{CarSnapshot, ElevatorCar};
pub use clock::{Clock, ManualClock, MonotonicClock};
pub use config::SystemConfig;
pub use dispatch::{ClosestCarStrategy, DispatchStrategy};
pub use door::DoorController;
pub use error::{ReconstructionError, StoreError, SystemError, SystemResult};
pub use events::{CarEvent, EventReceiver, EventSender, StopLog, SystemObserver};
pub use request_queue::RequestQueue;
#[cfg(feature = "sqlite")]
pub use sqlite_store::SqliteStore;
pub use state::{CarState, CarView, Command};
pub use store::{split_requests, CarRecord, MemoryStore, RequestRecord, StateStore};
pub use system::{ElevatorSystem, TickReport};
pub use traffic::HallCallGenerator;
pub use types::{CarId, Direction, DoorState, Floor, DEFAULT_DOOR_OPEN_SECS, IDLE_CAR_PENALTY};
