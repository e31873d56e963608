//! Simulated RFID gate.
//!
//! Translates physical stock movements into inventory events. Holds no state of
//! its own and listens to nothing.

use std::sync::Arc;

use warehouse_core::ItemId;
use warehouse_events::{BusError, EventBus, ItemAdded, ItemRemoved};

#[derive(Debug, Clone)]
pub struct RfidSensor {
    bus: Arc<EventBus>,
}

impl RfidSensor {
    pub fn new(bus: Arc<EventBus>) -> Self {
        Self { bus }
    }

    /// Stock passed the inbound gate: emits `ITEM_ADDED`.
    pub fn simulate_item_arrival(
        &self,
        item_id: ItemId,
        quantity: i64,
        name: Option<&str>,
        location: Option<&str>,
    ) -> Result<(), BusError> {
        tracing::debug!(%item_id, quantity, "rfid arrival");
        self.bus.emit(ItemAdded {
            item_id,
            quantity,
            name: name.map(str::to_string),
            location: location.map(str::to_string),
        })
    }

    /// Stock passed the outbound gate: emits `ITEM_REMOVED`.
    pub fn simulate_item_departure(&self, item_id: ItemId, quantity: i64) -> Result<(), BusError> {
        tracing::debug!(%item_id, quantity, "rfid departure");
        self.bus.emit(ItemRemoved { item_id, quantity })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use warehouse_events::WarehouseEvent;

    #[test]
    fn arrival_and_departure_emit_inventory_events() {
        let bus = Arc::new(EventBus::new());
        let sub = bus.subscribe();
        let sensor = RfidSensor::new(Arc::clone(&bus));

        sensor
            .simulate_item_arrival("W1".into(), 5, Some("Widget"), None)
            .unwrap();
        sensor.simulate_item_departure("W1".into(), 2).unwrap();

        assert_eq!(
            sub.drain(),
            vec![
                WarehouseEvent::ItemAdded(ItemAdded {
                    item_id: "W1".into(),
                    quantity: 5,
                    name: Some("Widget".into()),
                    location: None,
                }),
                WarehouseEvent::ItemRemoved(ItemRemoved {
                    item_id: "W1".into(),
                    quantity: 2,
                }),
            ]
        );
    }
}
