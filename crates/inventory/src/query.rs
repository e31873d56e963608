use std::sync::Arc;

use warehouse_core::ItemId;

use crate::Item;

/// Read-only stock lookup handed to components that must check availability
/// without going through the bus (the order processor's fulfilment check).
pub trait StockQuery: Send + Sync {
    fn get_item(&self, item_id: &ItemId) -> Option<Item>;

    /// Units on hand; an unknown item counts as zero.
    fn available(&self, item_id: &ItemId) -> i64 {
        self.get_item(item_id).map_or(0, |item| item.quantity())
    }
}

impl<S> StockQuery for Arc<S>
where
    S: StockQuery + ?Sized,
{
    fn get_item(&self, item_id: &ItemId) -> Option<Item> {
        (**self).get_item(item_id)
    }

    fn available(&self, item_id: &ItemId) -> i64 {
        (**self).available(item_id)
    }
}
