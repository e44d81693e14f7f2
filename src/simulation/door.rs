//! Car door with a timed auto-close
//!
//! The door only records when it was opened. Deciding when to close is left
//! to the car, which samples its clock once per step.

use std::time::Duration;

use super::types::DoorState;

/// Door of a single car
#[derive(Debug, Clone)]
pub struct DoorController {
    state: DoorState,
    /// Set iff `state == DoorState::Open`
    opened_at: Option<Duration>,
}

impl Default for DoorController {
    fn default() -> Self {
        Self::new()
    }
}

impl DoorController {
    pub fn new() -> Self {
        Self {
            state: DoorState::Closed,
            opened_at: None,
        }
    }

    /// Open the door at `now`. Opening an open door restarts its timer.
    pub fn open(&mut self, now: Duration) {
        self.state = DoorState::Open;
        self.opened_at = Some(now);
    }

    pub fn close(&mut self) {
        self.state = DoorState::Closed;
        self.opened_at = None;
    }

    pub fn state(&self) -> DoorState {
        self.state
    }

    pub fn is_open(&self) -> bool {
        self.state == DoorState::Open
    }

    pub fn opened_at(&self) -> Option<Duration> {
        self.opened_at
    }

    /// True once the door has been open for strictly longer than `duration`
    pub fn should_auto_close(&self, now: Duration, duration: Duration) -> bool {
        match (self.state, self.opened_at) {
            (DoorState::Open, Some(opened_at)) => now.saturating_sub(opened_at) > duration,
            _ => false,
        }
    }
}
