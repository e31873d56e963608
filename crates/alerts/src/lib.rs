//! Alerting module.

pub mod alert;
pub mod system;

pub use alert::Alert;
pub use system::AlertSystem;
