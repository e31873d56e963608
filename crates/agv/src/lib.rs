//! Automated guided vehicle (AGV) module.

pub mod controller;
pub mod picker;

pub use controller::{AGV_ERROR_TITLE, AgvController};
pub use picker::{PickFailure, Picker, SimulatedPicker};
