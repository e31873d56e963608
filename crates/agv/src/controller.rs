//! AGV controller agent.
//!
//! Dispatches a pick for every `ORDER_APPROVED` and raises an "AGV Error"
//! alert when the pick fails. Keeps no state between orders.

use std::sync::Arc;

use warehouse_events::{
    BusError, EventBus, EventHandler, EventKind, HandlerResult, OrderApproved, WarehouseEvent,
};

use crate::{Picker, SimulatedPicker};

pub const AGV_ERROR_TITLE: &str = "AGV Error";

pub struct AgvController {
    picker: Arc<dyn Picker>,
}

impl core::fmt::Debug for AgvController {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("AgvController").finish_non_exhaustive()
    }
}

impl AgvController {
    /// Create a controller driving `picker` and register it on `bus`.
    pub fn new(bus: &EventBus, picker: Arc<dyn Picker>) -> Result<Arc<Self>, BusError> {
        let controller = Arc::new(Self { picker });
        bus.register(
            EventKind::OrderApproved,
            Arc::clone(&controller) as Arc<dyn EventHandler>,
        )?;
        Ok(controller)
    }

    /// Controller backed by the always-successful [`SimulatedPicker`].
    pub fn simulated(bus: &EventBus) -> Result<Arc<Self>, BusError> {
        Self::new(bus, Arc::new(SimulatedPicker))
    }

    fn on_order_approved(&self, bus: &EventBus, event: &OrderApproved) -> HandlerResult {
        tracing::info!(order_id = %event.order_id, "starting pick");

        if let Err(failure) = self.picker.pick(&event.order_id, &event.items) {
            tracing::warn!(order_id = %event.order_id, error = %failure, "agv pick failed");
            bus.emit(WarehouseEvent::alert(
                AGV_ERROR_TITLE,
                format!("AGV failed to pick order {}.", event.order_id),
            ))?;
        }
        Ok(())
    }
}

impl EventHandler for AgvController {
    fn handle(&self, bus: &EventBus, event: &WarehouseEvent) -> HandlerResult {
        match event {
            WarehouseEvent::OrderApproved(e) => self.on_order_approved(bus, e),
            _ => Ok(()),
        }
    }

    fn name(&self) -> &str {
        "agv_controller"
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;
    use crate::PickFailure;
    use warehouse_core::OrderId;
    use warehouse_events::{AlertRaised, OrderLine};

    #[derive(Default)]
    struct ScriptedPicker {
        fail: bool,
        picked: Mutex<Vec<OrderId>>,
    }

    impl Picker for ScriptedPicker {
        fn pick(&self, order_id: &OrderId, _items: &[OrderLine]) -> Result<(), PickFailure> {
            self.picked.lock().unwrap().push(order_id.clone());
            if self.fail {
                Err(PickFailure("gripper jammed".into()))
            } else {
                Ok(())
            }
        }
    }

    fn approved(order: &str) -> OrderApproved {
        OrderApproved {
            order_id: order.into(),
            items: vec![OrderLine::new("W1", 4)],
        }
    }

    #[test]
    fn successful_pick_raises_nothing() {
        let bus = EventBus::new();
        let picker = Arc::new(ScriptedPicker::default());
        AgvController::new(&bus, picker.clone()).unwrap();
        let sub = bus.subscribe();

        bus.emit(approved("O1")).unwrap();

        assert_eq!(*picker.picked.lock().unwrap(), vec![OrderId::from("O1")]);
        assert_eq!(sub.drain().len(), 1);
    }

    #[test]
    fn failed_pick_raises_agv_error_alert() {
        let bus = EventBus::new();
        let picker = Arc::new(ScriptedPicker {
            fail: true,
            ..ScriptedPicker::default()
        });
        AgvController::new(&bus, picker).unwrap();
        let sub = bus.subscribe();

        bus.emit(approved("O9")).unwrap();

        let alerts: Vec<AlertRaised> = sub
            .drain()
            .into_iter()
            .filter_map(|e| match e {
                WarehouseEvent::AlertRaised(a) => Some(a),
                _ => None,
            })
            .collect();
        assert_eq!(
            alerts,
            vec![AlertRaised {
                title: AGV_ERROR_TITLE.into(),
                message: "AGV failed to pick order O9.".into(),
            }]
        );
    }

    #[test]
    fn simulated_controller_always_succeeds() {
        let bus = EventBus::new();
        AgvController::simulated(&bus).unwrap();
        let sub = bus.subscribe();
        bus.emit(approved("O1")).unwrap();
        assert_eq!(sub.drain().len(), 1);
    }
}
