//! Building configuration

use std::time::Duration;

use super::error::{SystemError, SystemResult};
use super::types::DEFAULT_DOOR_OPEN_SECS;

/// Fixed shape of the building, set once at construction
#[derive(Debug, Clone, PartialEq)]
pub struct SystemConfig {
    pub num_floors: u32,
    pub num_cars: usize,
    /// How long a door stays open before it may auto-close
    pub door_open_duration: Duration,
}

impl SystemConfig {
    pub fn new(num_floors: u32, num_cars: usize) -> Self {
        Self {
            num_floors,
            num_cars,
            door_open_duration: Duration::from_secs_f64(DEFAULT_DOOR_OPEN_SECS),
        }
    }

    pub fn with_door_open_duration(mut self, duration: Duration) -> Self {
        self.door_open_duration = duration;
        self
    }

    pub fn validate(&self) -> SystemResult<()> {
        if self.num_floors == 0 {
            return Err(SystemError::Config("a building needs at least one floor".into()));
        }
        if self.num_cars == 0 {
            return Err(SystemError::Config("a building needs at least one car".into()));
        }
        Ok(())
    }
}
