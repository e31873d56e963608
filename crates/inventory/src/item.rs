use serde::{Deserialize, Serialize};

use warehouse_core::{Entity, ItemId};

/// Placeholder used for a name or location the first sighting did not provide.
pub const UNKNOWN: &str = "Unknown";

/// A single kind of product held in the warehouse.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    item_id: ItemId,
    name: String,
    quantity: i64,
    location: String,
}

impl Item {
    /// A freshly sighted item with no stock yet.
    ///
    /// A missing or empty name/location falls back to [`UNKNOWN`]; anything
    /// else, whitespace included, is kept as given.
    pub fn new(item_id: ItemId, name: Option<&str>, location: Option<&str>) -> Self {
        Self {
            item_id,
            name: or_unknown(name),
            quantity: 0,
            location: or_unknown(location),
        }
    }

    pub fn item_id(&self) -> &ItemId {
        &self.item_id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn quantity(&self) -> i64 {
        self.quantity
    }

    pub fn location(&self) -> &str {
        &self.location
    }

    /// Add stock, saturating at `i64::MAX`. The sign is not checked.
    pub(crate) fn receive(&mut self, quantity: i64) {
        self.quantity = self.quantity.saturating_add(quantity);
    }

    /// Take stock out, clamping at zero. Returns the remaining quantity.
    pub(crate) fn release(&mut self, quantity: i64) -> i64 {
        self.quantity = self.quantity.saturating_sub(quantity).max(0);
        self.quantity
    }
}

impl Entity for Item {
    type Id = ItemId;

    fn id(&self) -> &Self::Id {
        &self.item_id
    }
}

fn or_unknown(value: Option<&str>) -> String {
    match value {
        Some(v) if !v.is_empty() => v.to_string(),
        _ => UNKNOWN.to_string(),
    }
}
