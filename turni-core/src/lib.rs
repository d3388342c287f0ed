//! Core types for the turni shift calendar.
//!
//! This crate is shared by the `turni` CLI and `turni-server`:
//! - `shift` for the eight-day rotation
//! - `assignment` and `store` for who works which role on which day
//! - `stats` for monthly/annual tallies and rankings
//! - `whatsapp` for operator notifications

pub mod access;
pub mod assignment;
pub mod backup;
pub mod config;
pub mod error;
pub mod lock;
pub mod month;
pub mod roster;
pub mod shift;
pub mod stats;
pub mod store;
pub mod turni;
pub mod whatsapp;

pub use assignment::{AssignmentChange, Assignments, DayAssignments};
pub use error::{TurniError, TurniResult};
pub use shift::{ShiftInfo, ShiftKind};
