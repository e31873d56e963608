//! Warehouse simulation: wires every agent onto one bus and exposes an
//! operator console over it.

pub mod console;
pub mod warehouse;

pub use console::{Command, Console, ConsoleError, Flow};
pub use warehouse::Warehouse;
