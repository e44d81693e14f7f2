//! Ordered pending-floor queues
//!
//! One queue per travel direction. Up queues hand out floors lowest first,
//! down queues highest first.

use sorted_vec::SortedVec;

use super::types::{Direction, Floor};

/// A set of pending floors kept in dispatch order
#[derive(Debug, Clone)]
pub struct RequestQueue {
    /// Always ascending; `descending` only changes which end is the head
    floors: SortedVec<Floor>,
    descending: bool,
}

impl RequestQueue {
    /// Queue served lowest floor first
    pub fn up() -> Self {
        Self {
            floors: SortedVec::new(),
            descending: false,
        }
    }

    /// Queue served highest floor first
    pub fn down() -> Self {
        Self {
            floors: SortedVec::new(),
            descending: true,
        }
    }

    /// Queue for the given sweep direction. `Stop` has no order and yields an up queue.
    pub fn for_direction(direction: Direction) -> Self {
        match direction {
            Direction::Down => Self::down(),
            Direction::Up | Direction::Stop => Self::up(),
        }
    }

    pub fn direction(&self) -> Direction {
        if self.descending {
            Direction::Down
        } else {
            Direction::Up
        }
    }

    /// Add a floor; a floor already queued is left alone
    pub fn add(&mut self, floor: Floor) {
        if self.floors.binary_search(&floor).is_err() {
            self.floors.insert(floor);
        }
    }

    /// Remove a floor; removing an absent floor does nothing
    pub fn remove(&mut self, floor: Floor) {
        self.floors.remove_item(&floor);
    }

    /// The nearest pending floor in travel direction
    pub fn peek_next(&self) -> Option<Floor> {
        if self.descending {
            self.floors.last().copied()
        } else {
            self.floors.first().copied()
        }
    }

    pub fn contains(&self, floor: Floor) -> bool {
        self.floors.binary_search(&floor).is_ok()
    }

    pub fn max(&self) -> Option<Floor> {
        self.floors.last().copied()
    }

    pub fn min(&self) -> Option<Floor> {
        self.floors.first().copied()
    }

    pub fn len(&self) -> usize {
        self.floors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.floors.is_empty()
    }

    pub fn clear(&mut self) {
        self.floors.clear();
    }

    /// Pending floors in the order they will be served
    pub fn floors(&self) -> Vec<Floor> {
        if self.descending {
            self.floors.iter().rev().copied().collect()
        } else {
            self.floors.iter().copied().collect()
        }
    }
}
