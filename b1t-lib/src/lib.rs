//! Matrix scanning and indicator drivers for the b1t keyboard.
//!
//! The left half of the matrix sits on the controller's own pins, the right
//! half behind an MCP23018 I/O expander on I2C. [`board::Board`] owns both
//! sides and is driven by the firmware's polling loop.
#![cfg_attr(not(test), no_std)]

pub mod board;
pub mod command;
pub mod expander;
pub mod indicator;
pub mod link;
pub mod local;
pub mod matrix;
pub mod rate;

#[cfg(test)]
pub(crate) mod fake;

pub use board::Board;
pub use command::{Command, CommandReader};
pub use indicator::{LayerState, LedState, NoUserHooks, UserHooks};
pub use link::{BusFault, LinkStatus};
pub use matrix::{MatrixSnapshot, RowIndex, RowWord};
