//! Error types for the elevator simulation.

use thiserror::Error;

use super::types::{CarId, Floor};

/// Errors raised while rebuilding cars and hall calls from persisted state.
#[derive(Debug, Error)]
pub enum ReconstructionError {
    #[error("unknown elevator state: {0}")]
    UnknownState(String),

    #[error("unknown direction: {0}")]
    UnknownDirection(String),

    #[error("unknown door state: {0}")]
    UnknownDoorState(String),

    #[error("{car} has an open door but no recorded opening time")]
    MissingDoorTimestamp { car: CarId },

    #[error("{car} has an unusable door opening time: {value}")]
    InvalidDoorTimestamp { car: CarId, value: f64 },

    #[error("persisted floor {floor} is outside 0..{num_floors}")]
    FloorOutOfRange { floor: Floor, num_floors: u32 },

    #[error("persisted request for floor {floor} has direction {direction}")]
    InvalidRequestDirection { floor: Floor, direction: String },

    #[error("stored configuration ({stored_floors} floors, {stored_cars} cars) does not match requested ({floors} floors, {cars} cars)")]
    ConfigMismatch {
        stored_floors: u32,
        stored_cars: usize,
        floors: u32,
        cars: usize,
    },
}

/// Errors raised by a [`StateStore`][super::store::StateStore] backend.
#[derive(Debug, Error)]
pub enum StoreError {
    #[cfg(feature = "sqlite")]
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("store backend error: {0}")]
    Backend(String),
}

/// Errors returned by the [`ElevatorSystem`][super::system::ElevatorSystem] API.
#[derive(Debug, Error)]
pub enum SystemError {
    #[error("floor {floor} is outside 0..{num_floors}")]
    FloorOutOfRange { floor: Floor, num_floors: u32 },

    #[error("hall calls must go up or down")]
    InvalidHallDirection,

    #[error("no such car: {0}")]
    UnknownCar(CarId),

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("reconstruction failed: {0}")]
    Reconstruction(#[from] ReconstructionError),

    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

pub type SystemResult<T> = Result<T, SystemError>;
