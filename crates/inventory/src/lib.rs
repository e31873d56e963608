//! Inventory domain module.
//!
//! The tracker owns item quantities; the RFID sensor feeds it movements.

pub mod item;
pub mod query;
pub mod rfid;
pub mod tracker;

pub use item::{Item, UNKNOWN};
pub use query::StockQuery;
pub use rfid::RfidSensor;
pub use tracker::{InventoryTracker, LOW_STOCK_TITLE};
