//! Order processor agent.
//!
//! On `ORDER_CREATED` the processor records the order, checks every line
//! against current stock and either rejects the order untouched or deducts
//! each line (one `ITEM_REMOVED` per line, in line order), approves it and
//! emits `ORDER_APPROVED`.
//!
//! The check and the deductions run inside one fulfilment critical section so
//! orders submitted from different threads cannot both pass the check against
//! the same stock.

use std::collections::HashMap;
use std::sync::{Arc, RwLock, RwLockWriteGuard};

use warehouse_core::{DomainError, DomainResult, OrderId};
use warehouse_events::{
    BusError, EventBus, EventHandler, EventKind, HandlerResult, ItemRemoved, OrderApproved,
    OrderLine, WarehouseEvent,
};
use warehouse_inventory::StockQuery;

use crate::gate::FulfilmentGate;
use crate::{Order, OrderOutcome, RejectionReason};

/// Orders in first-submitted order. Re-submitting an id replaces the order in place.
#[derive(Debug, Default)]
struct OrderBook {
    order: Vec<OrderId>,
    orders: HashMap<OrderId, Order>,
}

impl OrderBook {
    fn insert(&mut self, order: Order) {
        let id = order.order_id().clone();
        if self.orders.insert(id.clone(), order).is_none() {
            self.order.push(id);
        }
    }
}

pub struct OrderProcessor {
    book: RwLock<OrderBook>,
    stock: Arc<dyn StockQuery>,
    gate: FulfilmentGate,
}

impl core::fmt::Debug for OrderProcessor {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("OrderProcessor")
            .field("book", &self.book)
            .finish_non_exhaustive()
    }
}

impl OrderProcessor {
    /// Create the processor and register it on `bus`.
    pub fn new(bus: &EventBus, stock: Arc<dyn StockQuery>) -> Result<Arc<Self>, BusError> {
        let processor = Arc::new(Self::detached(stock));
        bus.register(
            EventKind::OrderCreated,
            Arc::clone(&processor) as Arc<dyn EventHandler>,
        )?;
        Ok(processor)
    }

    /// A processor that is not wired to any bus.
    pub fn detached(stock: Arc<dyn StockQuery>) -> Self {
        Self {
            book: RwLock::new(OrderBook::default()),
            stock,
            gate: FulfilmentGate::default(),
        }
    }

    /// Record `order_id`, run the fulfilment check and emit the resulting events.
    ///
    /// Insufficient stock is an ordinary outcome (`Rejected`), not an error.
    pub fn submit(
        &self,
        bus: &EventBus,
        order_id: OrderId,
        lines: Vec<OrderLine>,
    ) -> Result<OrderOutcome, BusError> {
        let fail = |e: DomainError| BusError::handler(EventKind::OrderCreated, e);

        let gate = self.gate.enter().map_err(fail)?;

        self.book_mut().map_err(fail)?.insert(Order::new(order_id.clone(), lines.clone()));
        tracing::info!(%order_id, lines = lines.len(), "order received");

        if let Some(reason) = self.shortfall(&lines) {
            self.decide(&order_id, |order| order.reject(reason.clone()))
                .map_err(fail)?;
            tracing::info!(%order_id, %reason, "order rejected");
            return Ok(OrderOutcome::Rejected { reason });
        }

        for line in &lines {
            bus.emit(ItemRemoved {
                item_id: line.item_id.clone(),
                quantity: line.quantity,
            })?;
        }
        self.decide(&order_id, Order::approve).map_err(fail)?;
        drop(gate);

        tracing::info!(%order_id, "order approved");
        bus.emit(OrderApproved {
            order_id,
            items: lines,
        })?;
        Ok(OrderOutcome::Approved)
    }

    /// All orders, in the order they were first submitted.
    pub fn get_all_orders(&self) -> Vec<Order> {
        match self.book.read() {
            Ok(book) => book
                .order
                .iter()
                .filter_map(|id| book.orders.get(id))
                .cloned()
                .collect(),
            Err(_) => vec![],
        }
    }

    pub fn get_order(&self, order_id: &OrderId) -> Option<Order> {
        let book = self.book.read().ok()?;
        book.orders.get(order_id).cloned()
    }

    /// The first line that cannot be covered. Later lines are not looked at.
    fn shortfall(&self, lines: &[OrderLine]) -> Option<RejectionReason> {
        lines.iter().find_map(|line| {
            let available = match self.stock.get_item(&line.item_id) {
                Some(item) if item.quantity() >= line.quantity => return None,
                Some(item) => item.quantity(),
                None => 0,
            };
            Some(RejectionReason::InsufficientStock {
                item_id: line.item_id.clone(),
                requested: line.quantity,
                available,
            })
        })
    }

    fn decide(
        &self,
        order_id: &OrderId,
        transition: impl FnOnce(&mut Order) -> DomainResult<()>,
    ) -> DomainResult<()> {
        let mut book = self.book_mut()?;
        let order = book
            .orders
            .get_mut(order_id)
            .ok_or_else(|| DomainError::not_found(format!("order {order_id}")))?;
        transition(order)
    }

    fn book_mut(&self) -> DomainResult<RwLockWriteGuard<'_, OrderBook>> {
        self.book.write().map_err(|_| DomainError::poisoned("order book"))
    }
}

impl EventHandler for OrderProcessor {
    fn handle(&self, bus: &EventBus, event: &WarehouseEvent) -> HandlerResult {
        match event {
            WarehouseEvent::OrderCreated(e) => self
                .submit(bus, e.order_id.clone(), e.items.clone())
                .map(|_| ()),
            _ => Ok(()),
        }
    }

    fn name(&self) -> &str {
        "order_processor"
    }
}
