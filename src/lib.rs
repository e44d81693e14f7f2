//! Elevator Simulation Library
//!
//! A deterministic multi-car elevator bank simulation that can be driven
//! headless from the command line or embedded in tests.

pub mod simulation;
