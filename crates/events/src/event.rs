//! Warehouse event vocabulary.
//!
//! Every event the agents exchange is a variant of [`WarehouseEvent`] with a
//! typed payload, so a handler can never ask for a field the emitter did not
//! provide. [`EventKind`] is the payload-less tag used as the registry key and
//! carries the stable wire name of each event (`ITEM_ADDED`, ...).

use core::str::FromStr;

use serde::{Deserialize, Serialize};

use warehouse_core::{DomainError, ItemId, OrderId};

/// Registry key: which kind of event a handler subscribes to.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventKind {
    ItemAdded,
    ItemRemoved,
    InventoryCheck,
    OrderCreated,
    OrderApproved,
    AlertRaised,
    AlertResolved,
}

impl EventKind {
    pub const ALL: [EventKind; 7] = [
        EventKind::ItemAdded,
        EventKind::ItemRemoved,
        EventKind::InventoryCheck,
        EventKind::OrderCreated,
        EventKind::OrderApproved,
        EventKind::AlertRaised,
        EventKind::AlertResolved,
    ];

    pub fn name(self) -> &'static str {
        match self {
            EventKind::ItemAdded => "ITEM_ADDED",
            EventKind::ItemRemoved => "ITEM_REMOVED",
            EventKind::InventoryCheck => "INVENTORY_CHECK",
            EventKind::OrderCreated => "ORDER_CREATED",
            EventKind::OrderApproved => "ORDER_APPROVED",
            EventKind::AlertRaised => "ALERT_RAISED",
            EventKind::AlertResolved => "ALERT_RESOLVED",
        }
    }
}

impl core::fmt::Display for EventKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for EventKind {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        EventKind::ALL
            .into_iter()
            .find(|kind| kind.name() == wanted)
            .ok_or_else(|| DomainError::validation(format!("unknown event name: {wanted:?}")))
    }
}

/// One requested line of an order: which item and how many.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderLine {
    pub item_id: ItemId,
    pub quantity: i64,
}

impl OrderLine {
    pub fn new(item_id: impl Into<ItemId>, quantity: i64) -> Self {
        Self {
            item_id: item_id.into(),
            quantity,
        }
    }
}

/// Event: ItemAdded. Name and location only matter when the item is new.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemAdded {
    pub item_id: ItemId,
    pub quantity: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
}

/// Event: ItemRemoved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemRemoved {
    pub item_id: ItemId,
    pub quantity: i64,
}

/// Event: OrderCreated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderCreated {
    pub order_id: OrderId,
    pub items: Vec<OrderLine>,
}

/// Event: OrderApproved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderApproved {
    pub order_id: OrderId,
    pub items: Vec<OrderLine>,
}

/// Event: AlertRaised.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlertRaised {
    pub title: String,
    pub message: String,
}

/// Event: AlertResolved. Resolution matches on the exact title.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlertResolved {
    pub title: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WarehouseEvent {
    ItemAdded(ItemAdded),
    ItemRemoved(ItemRemoved),
    InventoryCheck,
    OrderCreated(OrderCreated),
    OrderApproved(OrderApproved),
    AlertRaised(AlertRaised),
    AlertResolved(AlertResolved),
}

impl WarehouseEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            WarehouseEvent::ItemAdded(_) => EventKind::ItemAdded,
            WarehouseEvent::ItemRemoved(_) => EventKind::ItemRemoved,
            WarehouseEvent::InventoryCheck => EventKind::InventoryCheck,
            WarehouseEvent::OrderCreated(_) => EventKind::OrderCreated,
            WarehouseEvent::OrderApproved(_) => EventKind::OrderApproved,
            WarehouseEvent::AlertRaised(_) => EventKind::AlertRaised,
            WarehouseEvent::AlertResolved(_) => EventKind::AlertResolved,
        }
    }

    /// Build the event for a payload-less kind (only `INVENTORY_CHECK`).
    pub fn without_payload(kind: EventKind) -> Result<Self, DomainError> {
        match kind {
            EventKind::InventoryCheck => Ok(WarehouseEvent::InventoryCheck),
            other => Err(DomainError::validation(format!("{other} requires a payload"))),
        }
    }

    pub fn alert(title: impl Into<String>, message: impl Into<String>) -> Self {
        WarehouseEvent::AlertRaised(AlertRaised {
            title: title.into(),
            message: message.into(),
        })
    }
}

macro_rules! impl_from_payload {
    ($($payload:ident),* $(,)?) => {
        $(
            impl From<$payload> for WarehouseEvent {
                fn from(value: $payload) -> Self {
                    WarehouseEvent::$payload(value)
                }
            }
        )*
    };
}

impl_from_payload!(
    ItemAdded,
    ItemRemoved,
    OrderCreated,
    OrderApproved,
    AlertRaised,
    AlertResolved,
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_names_round_trip_through_from_str() {
        for kind in EventKind::ALL {
            assert_eq!(kind.name().parse::<EventKind>().unwrap(), kind);
        }
    }

    #[test]
    fn unknown_event_name_is_a_validation_error() {
        let err = "ITEM_TELEPORTED".parse::<EventKind>().unwrap_err();
        assert!(matches!(err, DomainError::Validation(msg) if msg.contains("ITEM_TELEPORTED")));
    }

    #[test]
    fn only_inventory_check_can_be_built_without_payload() {
        assert_eq!(
            WarehouseEvent::without_payload(EventKind::InventoryCheck).unwrap(),
            WarehouseEvent::InventoryCheck
        );
        assert!(WarehouseEvent::without_payload(EventKind::ItemAdded).is_err());
    }

    #[test]
    fn serializes_with_event_name_tag() {
        let event: WarehouseEvent = ItemRemoved {
            item_id: "W1".into(),
            quantity: 2,
        }
        .into();
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["event"], "ITEM_REMOVED");
        assert_eq!(json["item_id"], "W1");
    }
}
