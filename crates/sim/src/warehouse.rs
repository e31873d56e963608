//! Wires the agents onto one bus.
//!
//! Construction order is dispatch order: inventory tracker, order processor,
//! AGV controller, RFID sensor, alert system.

use std::sync::Arc;

use warehouse_agv::{AgvController, Picker, SimulatedPicker};
use warehouse_alerts::AlertSystem;
use warehouse_core::{OrderId, WarehouseConfig};
use warehouse_events::{BusError, EventBus, OrderCreated, OrderLine, Subscription, WarehouseEvent};
use warehouse_inventory::{InventoryTracker, RfidSensor};
use warehouse_orders::{OrderOutcome, OrderProcessor};

#[derive(Debug)]
pub struct Warehouse {
    bus: Arc<EventBus>,
    inventory: Arc<InventoryTracker>,
    orders: Arc<OrderProcessor>,
    rfid: RfidSensor,
    alerts: Arc<AlertSystem>,
}

impl Warehouse {
    /// A warehouse whose AGVs always succeed.
    pub fn new(config: WarehouseConfig) -> Result<Self, BusError> {
        Self::with_picker(config, Arc::new(SimulatedPicker))
    }

    pub fn with_picker(config: WarehouseConfig, picker: Arc<dyn Picker>) -> Result<Self, BusError> {
        let bus = Arc::new(EventBus::new());

        let inventory = InventoryTracker::new(&bus, config)?;
        let orders = OrderProcessor::new(&bus, inventory.clone())?;
        // Held alive by its bus registration; nothing queries it.
        AgvController::new(&bus, picker)?;
        let rfid = RfidSensor::new(Arc::clone(&bus));
        let alerts = AlertSystem::new(&bus)?;

        tracing::debug!(?bus, "warehouse wired");

        Ok(Self {
            bus,
            inventory,
            orders,
            rfid,
            alerts,
        })
    }

    pub fn bus(&self) -> &Arc<EventBus> {
        &self.bus
    }

    pub fn inventory(&self) -> &InventoryTracker {
        &self.inventory
    }

    pub fn orders(&self) -> &OrderProcessor {
        &self.orders
    }

    pub fn rfid(&self) -> &RfidSensor {
        &self.rfid
    }

    pub fn alerts(&self) -> &AlertSystem {
        &self.alerts
    }

    pub fn emit(&self, event: impl Into<WarehouseEvent>) -> Result<(), BusError> {
        self.bus.emit(event)
    }

    pub fn subscribe(&self) -> Subscription<WarehouseEvent> {
        self.bus.subscribe()
    }

    /// Emit `ORDER_CREATED` and report how the processor decided it.
    ///
    /// Returns `None` only if no processor recorded the order.
    pub fn place_order(
        &self,
        order_id: OrderId,
        items: Vec<OrderLine>,
    ) -> Result<Option<OrderOutcome>, BusError> {
        self.bus.emit(OrderCreated {
            order_id: order_id.clone(),
            items,
        })?;
        Ok(self.orders.get_order(&order_id).and_then(|order| order.outcome()))
    }
}
