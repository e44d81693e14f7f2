//! Core types for the elevator simulation
//!
//! Plain value types shared by the cars, the dispatcher and the store.

use std::fmt;
use std::str::FromStr;

use super::error::ReconstructionError;

/// A floor number, `0` is the ground floor
pub type Floor = u32;

/// A wrapper type for car IDs
///
/// The wrapped value is also the car's index in the system's car list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CarId(pub usize);

impl fmt::Display for CarId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "car {}", self.0)
    }
}

/// Direction of travel, or of a hall call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Up,
    Down,
    Stop,
}

impl Direction {
    /// Tag used when persisting the direction
    pub fn tag(&self) -> &'static str {
        match self {
            Direction::Up => "UP",
            Direction::Down => "DOWN",
            Direction::Stop => "STOP",
        }
    }

    /// Single character used by the shaft diagram
    pub fn arrow(&self) -> char {
        match self {
            Direction::Up => '^',
            Direction::Down => 'v',
            Direction::Stop => '-',
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

impl FromStr for Direction {
    type Err = ReconstructionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "UP" => Ok(Direction::Up),
            "DOWN" => Ok(Direction::Down),
            "STOP" => Ok(Direction::Stop),
            other => Err(ReconstructionError::UnknownDirection(other.to_string())),
        }
    }
}

/// State of a car door
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DoorState {
    Open,
    Closed,
}

impl DoorState {
    /// Tag used when persisting the door state
    pub fn tag(&self) -> &'static str {
        match self {
            DoorState::Open => "OPEN",
            DoorState::Closed => "CLOSED",
        }
    }
}

impl fmt::Display for DoorState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

impl FromStr for DoorState {
    type Err = ReconstructionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "OPEN" => Ok(DoorState::Open),
            "CLOSED" => Ok(DoorState::Closed),
            other => Err(ReconstructionError::UnknownDoorState(other.to_string())),
        }
    }
}

/// Default time a door stays open before it may auto-close, in seconds
pub const DEFAULT_DOOR_OPEN_SECS: f64 = 2.0;

/// Extra cost applied to idle cars so a car already passing by wins a tie
pub const IDLE_CAR_PENALTY: f64 = 0.1;
