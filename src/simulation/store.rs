//! Persistence collaborator
//!
//! The simulation does not own its storage. A [`StateStore`] keeps plain
//! records keyed by car id or by the system as a whole; the system turns them
//! back into cars and hall queues, and refuses records it can't make sense of.
//!
//! Records hold tags as strings, the way they sit in storage. Parsing happens
//! on the way back in so that a corrupt tag surfaces as a
//! [`ReconstructionError`] instead of a default.

use std::collections::HashMap;
use std::time::Duration;

use super::car::CarSnapshot;
use super::error::{ReconstructionError, StoreError};
use super::types::{CarId, Direction, DoorState, Floor};

/// Persisted state of one car
#[derive(Debug, Clone, PartialEq)]
pub struct CarRecord {
    pub car_id: usize,
    pub current_floor: Floor,
    pub direction: String,
    pub state: String,
    pub door_state: String,
    /// Seconds on the system clock when the door opened
    pub door_opened_at: Option<f64>,
}

/// A persisted pending request
#[derive(Debug, Clone, PartialEq)]
pub struct RequestRecord {
    pub floor: Floor,
    pub direction: String,
}

impl RequestRecord {
    pub fn new(floor: Floor, direction: Direction) -> Self {
        Self {
            floor,
            direction: direction.tag().to_string(),
        }
    }

    /// Parsed direction; only `UP` and `DOWN` make sense for a pending request
    pub fn direction(&self) -> Result<Direction, ReconstructionError> {
        match self.direction.parse::<Direction>()? {
            Direction::Stop => Err(ReconstructionError::InvalidRequestDirection {
                floor: self.floor,
                direction: self.direction.clone(),
            }),
            direction => Ok(direction),
        }
    }
}

impl CarRecord {
    pub fn from_snapshot(snapshot: &CarSnapshot) -> Self {
        Self {
            car_id: snapshot.id.0,
            current_floor: snapshot.current_floor,
            direction: snapshot.direction.tag().to_string(),
            state: snapshot.state.tag().to_string(),
            door_state: snapshot.door_state.tag().to_string(),
            door_opened_at: snapshot.door_opened_at.map(|t| t.as_secs_f64()),
        }
    }

    /// Pending requests of `snapshot`, up queue first, each in service order
    pub fn requests_of(snapshot: &CarSnapshot) -> Vec<RequestRecord> {
        snapshot
            .up_requests
            .iter()
            .map(|&floor| RequestRecord::new(floor, Direction::Up))
            .chain(
                snapshot
                    .down_requests
                    .iter()
                    .map(|&floor| RequestRecord::new(floor, Direction::Down)),
            )
            .collect()
    }

    /// Rebuild a snapshot from this record and its pending requests
    pub fn to_snapshot(
        &self,
        requests: &[RequestRecord],
    ) -> Result<CarSnapshot, ReconstructionError> {
        let (up_requests, down_requests) = split_requests(requests)?;
        let door_state: DoorState = self.door_state.parse()?;
        let door_opened_at = match (door_state, self.door_opened_at) {
            (DoorState::Open, Some(value)) => {
                let opened_at = Duration::try_from_secs_f64(value).map_err(|_| {
                    ReconstructionError::InvalidDoorTimestamp {
                        car: CarId(self.car_id),
                        value,
                    }
                })?;
                Some(opened_at)
            }
            _ => None,
        };

        Ok(CarSnapshot {
            id: CarId(self.car_id),
            current_floor: self.current_floor,
            direction: self.direction.parse()?,
            state: self.state.parse()?,
            door_state,
            door_opened_at,
            up_requests,
            down_requests,
        })
    }
}

/// Split persisted requests into (up floors, down floors)
pub fn split_requests(
    requests: &[RequestRecord],
) -> Result<(Vec<Floor>, Vec<Floor>), ReconstructionError> {
    let mut up = Vec::new();
    let mut down = Vec::new();
    for request in requests {
        match request.direction()? {
            Direction::Up => up.push(request.floor),
            _ => down.push(request.floor),
        }
    }
    Ok((up, down))
}

/// Key-value storage for system and car state
pub trait StateStore {
    fn save_system_config(&mut self, num_floors: u32, num_cars: usize) -> Result<(), StoreError>;

    fn load_system_config(&self) -> Result<Option<(u32, usize)>, StoreError>;

    fn save_car(&mut self, record: &CarRecord) -> Result<(), StoreError>;

    fn load_car(&self, car: CarId) -> Result<Option<CarRecord>, StoreError>;

    /// Replace all pending requests stored for `car`
    fn save_car_requests(&mut self, car: CarId, requests: &[RequestRecord])
        -> Result<(), StoreError>;

    fn load_car_requests(&self, car: CarId) -> Result<Vec<RequestRecord>, StoreError>;

    /// Replace all stored hall calls
    fn save_system_requests(&mut self, requests: &[RequestRecord]) -> Result<(), StoreError>;

    fn load_system_requests(&self) -> Result<Vec<RequestRecord>, StoreError>;

    /// Make everything saved so far durable
    fn commit(&mut self) -> Result<(), StoreError> {
        Ok(())
    }

    /// Drop everything
    fn clear(&mut self) -> Result<(), StoreError>;
}

/// A [`StateStore`] that lives in memory, for tests and one-off runs
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    config: Option<(u32, usize)>,
    cars: HashMap<CarId, CarRecord>,
    car_requests: HashMap<CarId, Vec<RequestRecord>>,
    system_requests: Vec<RequestRecord>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl StateStore for MemoryStore {
    fn save_system_config(&mut self, num_floors: u32, num_cars: usize) -> Result<(), StoreError> {
        self.config = Some((num_floors, num_cars));
        Ok(())
    }

    fn load_system_config(&self) -> Result<Option<(u32, usize)>, StoreError> {
        Ok(self.config)
    }

    fn save_car(&mut self, record: &CarRecord) -> Result<(), StoreError> {
        self.cars.insert(CarId(record.car_id), record.clone());
        Ok(())
    }

    fn load_car(&self, car: CarId) -> Result<Option<CarRecord>, StoreError> {
        Ok(self.cars.get(&car).cloned())
    }

    fn save_car_requests(
        &mut self,
        car: CarId,
        requests: &[RequestRecord],
    ) -> Result<(), StoreError> {
        self.car_requests.insert(car, requests.to_vec());
        Ok(())
    }

    fn load_car_requests(&self, car: CarId) -> Result<Vec<RequestRecord>, StoreError> {
        Ok(self.car_requests.get(&car).cloned().unwrap_or_default())
    }

    fn save_system_requests(&mut self, requests: &[RequestRecord]) -> Result<(), StoreError> {
        self.system_requests = requests.to_vec();
        Ok(())
    }

    fn load_system_requests(&self) -> Result<Vec<RequestRecord>, StoreError> {
        Ok(self.system_requests.clone())
    }

    fn clear(&mut self) -> Result<(), StoreError> {
        *self = Self::default();
        Ok(())
    }
}
