use serde::{Deserialize, Serialize};

use warehouse_core::{DomainError, DomainResult, Entity, ItemId, OrderId};
use warehouse_events::OrderLine;

/// Order status lifecycle: `Pending` moves once to `Approved` or `Rejected`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    Pending,
    Approved,
    Rejected,
}

impl core::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(match self {
            OrderStatus::Pending => "PENDING",
            OrderStatus::Approved => "APPROVED",
            OrderStatus::Rejected => "REJECTED",
        })
    }
}

/// Why the fulfilment check turned an order down.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RejectionReason {
    /// The first line whose request exceeded what was on hand.
    InsufficientStock {
        item_id: ItemId,
        requested: i64,
        available: i64,
    },
}

impl core::fmt::Display for RejectionReason {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            RejectionReason::InsufficientStock {
                item_id,
                requested,
                available,
            } => write!(
                f,
                "not enough stock for {item_id}: requested {requested}, available {available}"
            ),
        }
    }
}

/// Result of submitting an order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum OrderOutcome {
    Approved,
    Rejected { reason: RejectionReason },
}

impl OrderOutcome {
    pub fn is_approved(&self) -> bool {
        matches!(self, OrderOutcome::Approved)
    }
}

/// A customer order as seen by the order processor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    order_id: OrderId,
    lines: Vec<OrderLine>,
    status: OrderStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    rejection: Option<RejectionReason>,
}

impl Order {
    pub fn new(order_id: OrderId, lines: Vec<OrderLine>) -> Self {
        Self {
            order_id,
            lines,
            status: OrderStatus::Pending,
            rejection: None,
        }
    }

    pub fn order_id(&self) -> &OrderId {
        &self.order_id
    }

    pub fn lines(&self) -> &[OrderLine] {
        &self.lines
    }

    pub fn status(&self) -> OrderStatus {
        self.status
    }

    /// How the order was decided; `None` while it is still pending.
    pub fn outcome(&self) -> Option<OrderOutcome> {
        match (self.status, &self.rejection) {
            (OrderStatus::Pending, _) => None,
            (OrderStatus::Approved, _) => Some(OrderOutcome::Approved),
            (OrderStatus::Rejected, Some(reason)) => Some(OrderOutcome::Rejected {
                reason: reason.clone(),
            }),
            (OrderStatus::Rejected, None) => None,
        }
    }

    /// `"W1 x4, W2 x1"`, the one-line summary shown in order listings.
    pub fn summary(&self) -> String {
        self.lines
            .iter()
            .map(|line| format!("{} x{}", line.item_id, line.quantity))
            .collect::<Vec<_>>()
            .join(", ")
    }

    pub(crate) fn approve(&mut self) -> DomainResult<()> {
        self.decide(OrderStatus::Approved)
    }

    pub(crate) fn reject(&mut self, reason: RejectionReason) -> DomainResult<()> {
        self.decide(OrderStatus::Rejected)?;
        self.rejection = Some(reason);
        Ok(())
    }

    fn decide(&mut self, status: OrderStatus) -> DomainResult<()> {
        if self.status != OrderStatus::Pending {
            return Err(DomainError::invariant(format!(
                "order {} is already {}",
                self.order_id, self.status
            )));
        }
        self.status = status;
        Ok(())
    }
}

impl Entity for Order {
    type Id = OrderId;

    fn id(&self) -> &Self::Id {
        &self.order_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn order() -> Order {
        Order::new(
            "O1".into(),
            vec![OrderLine::new("W1", 4), OrderLine::new("W2", 1)],
        )
    }

    #[test]
    fn new_order_is_pending() {
        let order = order();
        assert_eq!(order.status(), OrderStatus::Pending);
        assert_eq!(order.outcome(), None);
        assert_eq!(order.summary(), "W1 x4, W2 x1");
    }

    #[test]
    fn decided_order_cannot_be_decided_again() {
        let mut order = order();
        order.approve().unwrap();
        let err = order
            .reject(RejectionReason::InsufficientStock {
                item_id: "W1".into(),
                requested: 1,
                available: 0,
            })
            .unwrap_err();
        match err {
            DomainError::InvariantViolation(msg) if msg.contains("already APPROVED") => {}
            _ => panic!("Expected InvariantViolation for re-deciding an order"),
        }
        assert_eq!(order.status(), OrderStatus::Approved);
        assert_eq!(order.outcome(), Some(OrderOutcome::Approved));
    }

    #[test]
    fn rejection_reason_reads_like_a_sentence() {
        let reason = RejectionReason::InsufficientStock {
            item_id: "W2".into(),
            requested: 3,
            available: 0,
        };
        assert_eq!(
            reason.to_string(),
            "not enough stock for W2: requested 3, available 0"
        );
    }
}
