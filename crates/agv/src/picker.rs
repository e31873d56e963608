use thiserror::Error;

use warehouse_core::OrderId;
use warehouse_events::OrderLine;

/// The robot could not complete a pick.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("pick failed: {0}")]
pub struct PickFailure(pub String);

/// Physical pick-and-transport step performed for an approved order.
pub trait Picker: Send + Sync {
    fn pick(&self, order_id: &OrderId, items: &[OrderLine]) -> Result<(), PickFailure>;
}

/// Stand-in for a real AGV fleet: every pick succeeds.
#[derive(Debug, Default, Clone, Copy)]
pub struct SimulatedPicker;

impl Picker for SimulatedPicker {
    fn pick(&self, order_id: &OrderId, items: &[OrderLine]) -> Result<(), PickFailure> {
        let units = items
            .iter()
            .fold(0i64, |total, line| total.saturating_add(line.quantity));
        tracing::info!(%order_id, lines = items.len(), units, "items picked; transporting to shipping area");
        Ok(())
    }
}
