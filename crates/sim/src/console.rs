//! Line-oriented operator console.
//!
//! Validates operator input (ids present, quantities numeric, matching list
//! lengths) before anything reaches the bus, then drives the warehouse the
//! same way a desktop front-end would.

use std::io::Write;

use serde::Serialize;
use thiserror::Error;

use warehouse_core::{DomainError, Entity, ItemId, OrderId};
use warehouse_events::{BusError, EventKind, OrderLine, Subscription, WarehouseEvent};
use warehouse_orders::OrderOutcome;

use crate::Warehouse;

pub const HELP: &str = "\
commands:
  add <item_id> <qty> [name] [location]   stock arrives through the RFID gate
  remove <item_id> <qty>                  stock leaves through the RFID gate
  order <order_id> <id,id,..> <qty,qty,..> create an order
  check                                   run an inventory check
  resolve <title>[: message]              resolve every alert with that title
  emit <EVENT_NAME>                       emit a payload-less event (INVENTORY_CHECK)
  items | orders | alerts                 list current state
  help | quit";

#[derive(Debug, Error)]
pub enum ConsoleError {
    /// The operator typed something invalid; nothing was emitted.
    #[error(transparent)]
    Input(#[from] DomainError),

    #[error(transparent)]
    Bus(#[from] BusError),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

/// One parsed operator command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Add {
        item_id: ItemId,
        quantity: i64,
        name: Option<String>,
        location: Option<String>,
    },
    Remove {
        item_id: ItemId,
        quantity: i64,
    },
    Order {
        order_id: OrderId,
        lines: Vec<OrderLine>,
    },
    Check,
    Resolve {
        title: String,
    },
    Emit(WarehouseEvent),
    Items,
    Orders,
    Alerts,
    Help,
    Quit,
}

impl Command {
    pub fn parse(line: &str) -> Result<Self, DomainError> {
        let line = line.trim();
        let (verb, rest) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
        let args: Vec<&str> = rest.split_whitespace().collect();

        match verb.to_ascii_lowercase().as_str() {
            "add" => {
                let [item_id, quantity, extra @ ..] = args.as_slice() else {
                    return Err(usage("add <item_id> <qty> [name] [location]"));
                };
                if extra.len() > 2 {
                    return Err(usage("add <item_id> <qty> [name] [location]"));
                }
                Ok(Command::Add {
                    item_id: ItemId::parse(*item_id)?,
                    quantity: parse_quantity(quantity)?,
                    name: extra.first().map(|s| s.to_string()),
                    location: extra.get(1).map(|s| s.to_string()),
                })
            }
            "remove" => {
                let [item_id, quantity] = args.as_slice() else {
                    return Err(usage("remove <item_id> <qty>"));
                };
                Ok(Command::Remove {
                    item_id: ItemId::parse(*item_id)?,
                    quantity: parse_quantity(quantity)?,
                })
            }
            "order" => {
                let [order_id, item_ids, quantities] = args.as_slice() else {
                    return Err(usage("order <order_id> <id,id,..> <qty,qty,..>"));
                };
                Ok(Command::Order {
                    order_id: OrderId::parse(*order_id)?,
                    lines: parse_lines(item_ids, quantities)?,
                })
            }
            "check" => Ok(Command::Check),
            "resolve" => Ok(Command::Resolve {
                title: alert_title(rest)?,
            }),
            "emit" => {
                let [name] = args.as_slice() else {
                    return Err(usage("emit <EVENT_NAME>"));
                };
                let kind: EventKind = name.parse()?;
                Ok(Command::Emit(WarehouseEvent::without_payload(kind)?))
            }
            "items" => Ok(Command::Items),
            "orders" => Ok(Command::Orders),
            "alerts" => Ok(Command::Alerts),
            "help" | "?" => Ok(Command::Help),
            "quit" | "exit" => Ok(Command::Quit),
            "" => Err(DomainError::validation("empty command")),
            other => Err(DomainError::validation(format!(
                "unknown command {other:?}; type `help`"
            ))),
        }
    }
}

fn usage(form: &str) -> DomainError {
    DomainError::validation(format!("usage: {form}"))
}

/// Quantities are non-negative whole numbers.
pub fn parse_quantity(raw: &str) -> Result<i64, DomainError> {
    let raw = raw.trim();
    if raw.is_empty() || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return Err(DomainError::validation(format!(
            "quantity must be a number, got {raw:?}"
        )));
    }
    raw.parse()
        .map_err(|_| DomainError::validation(format!("quantity {raw} is too large")))
}

/// Zip comma-separated item ids and quantities into order lines.
pub fn parse_lines(item_ids: &str, quantities: &str) -> Result<Vec<OrderLine>, DomainError> {
    let ids: Vec<&str> = item_ids.split(',').map(str::trim).collect();
    let quantities: Vec<&str> = quantities.split(',').map(str::trim).collect();

    if ids.len() != quantities.len() {
        return Err(DomainError::validation(
            "item ids and quantities must match in length",
        ));
    }

    ids.into_iter()
        .zip(quantities)
        .map(|(id, qty)| {
            Ok(OrderLine {
                item_id: ItemId::parse(id)?,
                quantity: parse_quantity(qty)?,
            })
        })
        .collect()
}

/// The title part of an alert line: everything before the first `:`.
pub fn alert_title(line: &str) -> Result<String, DomainError> {
    let title = line.split(':').next().unwrap_or_default().trim();
    if title.is_empty() {
        return Err(DomainError::validation("alert title cannot be empty"));
    }
    Ok(title.to_string())
}

/// Whether the console should keep reading input.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

/// Runs commands against a [`Warehouse`] and echoes the resulting activity.
pub struct Console<'a> {
    warehouse: &'a Warehouse,
    activity: Subscription<WarehouseEvent>,
}

impl<'a> Console<'a> {
    pub fn new(warehouse: &'a Warehouse) -> Self {
        Self {
            warehouse,
            activity: warehouse.subscribe(),
        }
    }

    /// Parse and execute one input line.
    pub fn run_line(&self, line: &str, out: &mut impl Write) -> Result<Flow, ConsoleError> {
        let command = Command::parse(line)?;
        self.execute(command, out)
    }

    pub fn execute(&self, command: Command, out: &mut impl Write) -> Result<Flow, ConsoleError> {
        let wh = self.warehouse;
        match command {
            Command::Add {
                item_id,
                quantity,
                name,
                location,
            } => {
                wh.rfid().simulate_item_arrival(
                    item_id,
                    quantity,
                    name.as_deref(),
                    location.as_deref(),
                )?;
            }
            Command::Remove { item_id, quantity } => {
                wh.rfid().simulate_item_departure(item_id, quantity)?;
            }
            Command::Order { order_id, lines } => {
                let outcome = wh.place_order(order_id.clone(), lines)?;
                self.echo_activity(out)?;
                match outcome {
                    Some(OrderOutcome::Approved) => writeln!(out, "order {order_id} APPROVED")?,
                    Some(OrderOutcome::Rejected { reason }) => {
                        writeln!(out, "order {order_id} REJECTED: {reason}")?
                    }
                    None => writeln!(out, "order {order_id} was not processed")?,
                }
                return Ok(Flow::Continue);
            }
            Command::Check => wh.emit(WarehouseEvent::InventoryCheck)?,
            Command::Resolve { title } => {
                wh.emit(warehouse_events::AlertResolved { title })?;
            }
            Command::Emit(event) => wh.emit(event)?,
            Command::Items => write_records(out, &wh.inventory().get_all_items())?,
            Command::Orders => write_records(out, &wh.orders().get_all_orders())?,
            Command::Alerts => {
                for alert in wh.alerts().get_active_alerts() {
                    writeln!(out, "{alert}")?;
                }
            }
            Command::Help => writeln!(out, "{HELP}")?,
            Command::Quit => return Ok(Flow::Quit),
        }

        self.echo_activity(out)?;
        Ok(Flow::Continue)
    }

    fn echo_activity(&self, out: &mut impl Write) -> Result<(), ConsoleError> {
        for event in self.activity.drain() {
            writeln!(out, "> {}", serde_json::to_string(&event)?)?;
        }
        Ok(())
    }
}

/// One `<id>\t<json>` line per record.
fn write_records<E>(out: &mut impl Write, records: &[E]) -> Result<(), ConsoleError>
where
    E: Entity + Serialize,
    E::Id: core::fmt::Display,
{
    for record in records {
        writeln!(out, "{}\t{}", record.id(), serde_json::to_string(record)?)?;
    }
    Ok(())
}
