//! Order domain module.
//!
//! Orders are approved or rejected exactly once, synchronously, by the
//! [`OrderProcessor`] that owns them.

mod gate;
pub mod order;
pub mod processor;

pub use order::{Order, OrderOutcome, OrderStatus, RejectionReason};
pub use processor::OrderProcessor;
pub use warehouse_events::OrderLine;
