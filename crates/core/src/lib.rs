//! `warehouse-core`: domain foundation building blocks.
//!
//! This crate contains **pure domain** primitives shared by every warehouse
//! agent (no event plumbing, no IO).

pub mod config;
pub mod entity;
pub mod error;
pub mod id;

pub use config::{LOW_STOCK_THRESHOLD, WarehouseConfig};
pub use entity::Entity;
pub use error::{DomainError, DomainResult};
pub use id::{ItemId, OrderId};
