//! Alert system agent.
//!
//! Keeps the list of active alerts in raise order. `ALERT_RAISED` appends
//! (duplicates included); `ALERT_RESOLVED` drops every alert with that exact
//! title.

use std::sync::{Arc, RwLock};

use chrono::Utc;

use warehouse_core::DomainError;
use warehouse_events::{
    AlertRaised, BusError, EventBus, EventHandler, EventKind, HandlerResult, WarehouseEvent,
};

use crate::Alert;

#[derive(Debug, Default)]
pub struct AlertSystem {
    alerts: RwLock<Vec<Alert>>,
}

impl AlertSystem {
    /// Create the alert system and register it on `bus`.
    pub fn new(bus: &EventBus) -> Result<Arc<Self>, BusError> {
        let system = Arc::new(Self::default());
        for kind in [EventKind::AlertRaised, EventKind::AlertResolved] {
            bus.register(kind, Arc::clone(&system) as Arc<dyn EventHandler>)?;
        }
        Ok(system)
    }

    /// Active alerts, oldest first.
    pub fn get_active_alerts(&self) -> Vec<Alert> {
        self.alerts
            .read()
            .map(|alerts| alerts.clone())
            .unwrap_or_default()
    }

    fn on_alert_raised(&self, event: &AlertRaised) -> HandlerResult {
        self.alerts
            .write()
            .map_err(|_| poisoned(EventKind::AlertRaised))?
            .push(Alert::new(&event.title, &event.message, Utc::now()));
        tracing::warn!(title = %event.title, message = %event.message, "alert raised");
        Ok(())
    }

    fn on_alert_resolved(&self, title: &str) -> HandlerResult {
        let removed = {
            let mut alerts = self
                .alerts
                .write()
                .map_err(|_| poisoned(EventKind::AlertResolved))?;
            let before = alerts.len();
            alerts.retain(|alert| alert.title != title);
            before - alerts.len()
        };
        tracing::info!(%title, removed, "alert resolved");
        Ok(())
    }
}

fn poisoned(kind: EventKind) -> BusError {
    BusError::handler(kind, DomainError::poisoned("alert list"))
}

impl EventHandler for AlertSystem {
    fn handle(&self, _bus: &EventBus, event: &WarehouseEvent) -> HandlerResult {
        match event {
            WarehouseEvent::AlertRaised(e) => self.on_alert_raised(e),
            WarehouseEvent::AlertResolved(e) => self.on_alert_resolved(&e.title),
            _ => Ok(()),
        }
    }

    fn name(&self) -> &str {
        "alert_system"
    }
}
