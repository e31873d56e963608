//! Inventory tracker agent.
//!
//! Owns the item table. Reacts to `ITEM_ADDED`, `ITEM_REMOVED` and
//! `INVENTORY_CHECK`, and raises "Low Stock" alerts when an item falls below
//! the configured threshold.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use warehouse_core::{DomainError, ItemId, WarehouseConfig};
use warehouse_events::{
    BusError, EventBus, EventHandler, EventKind, HandlerResult, ItemAdded, ItemRemoved,
    WarehouseEvent,
};

use crate::{Item, StockQuery};

pub const LOW_STOCK_TITLE: &str = "Low Stock";

/// Items in first-seen order.
#[derive(Debug, Default)]
struct ItemTable {
    order: Vec<ItemId>,
    items: HashMap<ItemId, Item>,
}

impl ItemTable {
    fn in_order(&self) -> impl Iterator<Item = &Item> {
        self.order.iter().filter_map(|id| self.items.get(id))
    }
}

#[derive(Debug)]
pub struct InventoryTracker {
    table: RwLock<ItemTable>,
    config: WarehouseConfig,
}

impl InventoryTracker {
    /// Create the tracker and register it on `bus`.
    pub fn new(bus: &EventBus, config: WarehouseConfig) -> Result<Arc<Self>, BusError> {
        let tracker = Arc::new(Self::detached(config));
        for kind in [EventKind::ItemAdded, EventKind::ItemRemoved, EventKind::InventoryCheck] {
            bus.register(kind, Arc::clone(&tracker) as Arc<dyn EventHandler>)?;
        }
        Ok(tracker)
    }

    /// A tracker that is not wired to any bus.
    pub fn detached(config: WarehouseConfig) -> Self {
        Self {
            table: RwLock::new(ItemTable::default()),
            config,
        }
    }

    pub fn low_stock_threshold(&self) -> i64 {
        self.config.low_stock_threshold
    }

    /// All tracked items, in the order they were first seen.
    pub fn get_all_items(&self) -> Vec<Item> {
        match self.table.read() {
            Ok(table) => table.in_order().cloned().collect(),
            Err(_) => vec![],
        }
    }

    pub fn get_item(&self, item_id: &ItemId) -> Option<Item> {
        let table = self.table.read().ok()?;
        table.items.get(item_id).cloned()
    }

    fn on_item_added(&self, event: &ItemAdded) -> HandlerResult {
        let total = {
            let mut table = self.write(EventKind::ItemAdded)?;
            let table = &mut *table;
            let item = table.items.entry(event.item_id.clone()).or_insert_with(|| {
                table.order.push(event.item_id.clone());
                Item::new(
                    event.item_id.clone(),
                    event.name.as_deref(),
                    event.location.as_deref(),
                )
            });
            item.receive(event.quantity);
            item.quantity()
        };

        tracing::info!(item_id = %event.item_id, added = event.quantity, total, "stock added");
        Ok(())
    }

    fn on_item_removed(&self, bus: &EventBus, event: &ItemRemoved) -> HandlerResult {
        let remaining = {
            let mut table = self.write(EventKind::ItemRemoved)?;
            table
                .items
                .get_mut(&event.item_id)
                .map(|item| item.release(event.quantity))
        };

        let Some(remaining) = remaining else {
            tracing::warn!(item_id = %event.item_id, "cannot remove stock from unknown item; ignoring");
            return Ok(());
        };

        tracing::info!(item_id = %event.item_id, removed = event.quantity, remaining, "stock removed");

        if remaining < self.config.low_stock_threshold {
            bus.emit(WarehouseEvent::alert(
                LOW_STOCK_TITLE,
                format!("Item {} is running low: {remaining} in stock.", event.item_id),
            ))?;
        }
        Ok(())
    }

    fn on_inventory_check(&self, bus: &EventBus) -> HandlerResult {
        let threshold = self.config.low_stock_threshold;
        let low: Vec<(ItemId, i64)> = {
            let table = self
                .table
                .read()
                .map_err(|_| poisoned(EventKind::InventoryCheck))?;
            table
                .in_order()
                .filter(|item| item.quantity() < threshold)
                .map(|item| (item.item_id().clone(), item.quantity()))
                .collect()
        };

        tracing::info!(low_stock = low.len(), "inventory check");
        for (item_id, quantity) in low {
            bus.emit(WarehouseEvent::alert(
                LOW_STOCK_TITLE,
                format!("Item {item_id} has low stock: {quantity}."),
            ))?;
        }
        Ok(())
    }

    fn write(&self, kind: EventKind) -> Result<std::sync::RwLockWriteGuard<'_, ItemTable>, BusError> {
        self.table.write().map_err(|_| poisoned(kind))
    }
}

fn poisoned(kind: EventKind) -> BusError {
    BusError::handler(kind, DomainError::poisoned("inventory"))
}

impl EventHandler for InventoryTracker {
    fn handle(&self, bus: &EventBus, event: &WarehouseEvent) -> HandlerResult {
        match event {
            WarehouseEvent::ItemAdded(e) => self.on_item_added(e),
            WarehouseEvent::ItemRemoved(e) => self.on_item_removed(bus, e),
            WarehouseEvent::InventoryCheck => self.on_inventory_check(bus),
            _ => Ok(()),
        }
    }

    fn name(&self) -> &str {
        "inventory_tracker"
    }
}

impl StockQuery for InventoryTracker {
    fn get_item(&self, item_id: &ItemId) -> Option<Item> {
        InventoryTracker::get_item(self, item_id)
    }
}
