//! Warehouse events and the in-process bus that dispatches them.

pub mod bus;
pub mod event;
pub mod handler;

pub use bus::{BusError, EventBus, Subscription};
pub use event::{
    AlertRaised, AlertResolved, EventKind, ItemAdded, ItemRemoved, OrderApproved,
    OrderCreated, OrderLine, WarehouseEvent,
};
pub use handler::{EventHandler, HandlerResult};
