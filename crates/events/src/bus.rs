//! Synchronous in-process event bus.
//!
//! The bus maps each [`EventKind`] to an ordered list of handlers. `emit`
//! invokes them one after another on the caller's thread, passing the bus so a
//! handler can emit follow-up events. Dispatch is **depth-first**: every event
//! a handler emits is fully processed (including its own cascade) before the
//! next handler of the outer event starts.
//!
//! ## Semantics
//!
//! - **Registration order is dispatch order.** Agents register while they are
//!   constructed, so construction order decides who reacts first.
//! - **No deduplication.** Registering the same handler twice makes it fire twice.
//! - **Append-only registry.** There is no unregister.
//! - **No queue.** Nothing is deferred; `emit` returns once the whole cascade ran.
//! - **No cycle detection.** A handler that emits its own kind recurses.
//! - **Fail fast.** The first handler error aborts the remaining handlers of that
//!   event and is returned from every enclosing `emit`.
//!
//! Observers that only want to *see* events (activity logs, tests) can
//! [`subscribe`](EventBus::subscribe) instead of registering a handler.

use std::cell::RefCell;
use std::collections::HashMap;
use std::sync::mpsc::{self, Receiver};
use std::sync::{Arc, Mutex, RwLock};

use thiserror::Error;

use warehouse_core::DomainError;

use crate::{EventHandler, EventKind, WarehouseEvent};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BusError {
    /// The handler registry lock was poisoned by a panicking thread.
    #[error("event bus registry lock poisoned")]
    Poisoned,

    /// A handler failed while processing `event`.
    #[error("handler for {event} failed: {source}")]
    Handler {
        event: EventKind,
        #[source]
        source: DomainError,
    },
}

impl BusError {
    pub fn handler(event: EventKind, source: DomainError) -> Self {
        Self::Handler { event, source }
    }
}

/// Per-thread dispatch state: how deep the current cascade is and which error
/// has already been logged on its way up.
#[derive(Default)]
struct Dispatch {
    depth: usize,
    reported: Option<BusError>,
}

thread_local! {
    static DISPATCH: RefCell<Dispatch> = RefCell::new(Dispatch::default());
}

/// Marks one `emit` frame on the current thread. The outermost frame clears
/// the reported error when it ends.
struct DispatchFrame;

impl DispatchFrame {
    fn enter() -> Self {
        DISPATCH.with(|d| d.borrow_mut().depth += 1);
        DispatchFrame
    }

    /// True the first time `err` is seen in this cascade. Enclosing frames
    /// that merely propagate the same error get `false`.
    fn first_report(&self, err: &BusError) -> bool {
        DISPATCH.with(|d| {
            let mut d = d.borrow_mut();
            if d.reported.as_ref() == Some(err) {
                return false;
            }
            d.reported = Some(err.clone());
            true
        })
    }
}

impl Drop for DispatchFrame {
    fn drop(&mut self) {
        DISPATCH.with(|d| {
            let mut d = d.borrow_mut();
            d.depth = d.depth.saturating_sub(1);
            if d.depth == 0 {
                d.reported = None;
            }
        });
    }
}

/// A passive view of everything the bus dispatches.
///
/// Events arrive in dispatch order: an event is delivered before any event its
/// handlers emit.
#[derive(Debug)]
pub struct Subscription<M> {
    receiver: Receiver<M>,
}

impl<M> Subscription<M> {
    pub fn new(receiver: Receiver<M>) -> Self {
        Self { receiver }
    }

    /// Everything delivered so far, without blocking.
    pub fn drain(&self) -> Vec<M> {
        self.receiver.try_iter().collect()
    }
}

type Registry = HashMap<EventKind, Vec<Arc<dyn EventHandler>>>;

#[derive(Default)]
pub struct EventBus {
    handlers: RwLock<Registry>,
    subscribers: Mutex<Vec<mpsc::Sender<WarehouseEvent>>>,
}

impl core::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let registered: Vec<(EventKind, usize)> = self
            .handlers
            .read()
            .map(|registry| {
                let mut counts: Vec<_> = registry.iter().map(|(k, v)| (*k, v.len())).collect();
                counts.sort();
                counts
            })
            .unwrap_or_default();
        f.debug_struct("EventBus").field("handlers", &registered).finish()
    }
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `handler` to the dispatch list of `kind`.
    pub fn register(&self, kind: EventKind, handler: Arc<dyn EventHandler>) -> Result<(), BusError> {
        let mut registry = self.handlers.write().map_err(|_| BusError::Poisoned)?;
        tracing::debug!(event = %kind, handler = handler.name(), "registering handler");
        registry.entry(kind).or_default().push(handler);
        Ok(())
    }

    /// Number of handlers currently registered for `kind`.
    pub fn handler_count(&self, kind: EventKind) -> usize {
        self.handlers
            .read()
            .map(|registry| registry.get(&kind).map_or(0, Vec::len))
            .unwrap_or(0)
    }

    /// Receive a copy of every event dispatched from now on.
    pub fn subscribe(&self) -> Subscription<WarehouseEvent> {
        let (tx, rx) = mpsc::channel();

        // A poisoned subscriber list still hands out a subscription;
        // it just never receives anything.
        if let Ok(mut subs) = self.subscribers.lock() {
            subs.push(tx);
        }

        Subscription::new(rx)
    }

    /// Dispatch `event` to every handler registered for its kind, depth-first.
    ///
    /// Emitting a kind with no handlers is a no-op.
    pub fn emit(&self, event: impl Into<WarehouseEvent>) -> Result<(), BusError> {
        let event = event.into();
        let kind = event.kind();
        let frame = DispatchFrame::enter();

        // Snapshot so no registry lock is held while handlers (and their nested emits) run.
        let handlers = {
            let registry = self.handlers.read().map_err(|_| {
                if frame.first_report(&BusError::Poisoned) {
                    tracing::error!(event = %kind, "event bus registry lock poisoned");
                }
                BusError::Poisoned
            })?;
            registry.get(&kind).cloned().unwrap_or_default()
        };

        self.notify_subscribers(&event);

        tracing::debug!(event = %kind, handlers = handlers.len(), "dispatching event");
        for handler in handlers {
            if let Err(err) = handler.handle(self, &event) {
                if frame.first_report(&err) {
                    tracing::error!(event = %kind, handler = handler.name(), error = %err, "handler failed");
                }
                return Err(err);
            }
        }

        Ok(())
    }

    fn notify_subscribers(&self, event: &WarehouseEvent) {
        if let Ok(mut subs) = self.subscribers.lock() {
            // Drop any dead subscribers while publishing.
            subs.retain(|tx| tx.send(event.clone()).is_ok());
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use crate::{AlertRaised, HandlerResult, ItemRemoved};

    fn removal(item: &str, quantity: i64) -> ItemRemoved {
        ItemRemoved {
            item_id: item.into(),
            quantity,
        }
    }

    fn recorder(log: &Arc<Mutex<Vec<String>>>, label: &'static str) -> Arc<dyn EventHandler> {
        let log = Arc::clone(log);
        Arc::new(move |_: &EventBus, event: &WarehouseEvent| -> HandlerResult {
            log.lock().unwrap().push(format!("{label}:{}", event.kind()));
            Ok(())
        })
    }

    #[test]
    fn emit_without_handlers_is_a_no_op() {
        let bus = EventBus::new();
        assert!(bus.emit(WarehouseEvent::InventoryCheck).is_ok());
        assert_eq!(bus.handler_count(EventKind::InventoryCheck), 0);
    }

    #[test]
    fn handlers_run_in_registration_order() {
        let bus = EventBus::new();
        let log = Arc::new(Mutex::new(Vec::new()));
        bus.register(EventKind::ItemRemoved, recorder(&log, "h1")).unwrap();
        bus.register(EventKind::ItemRemoved, recorder(&log, "h2")).unwrap();

        bus.emit(removal("W1", 1)).unwrap();

        assert_eq!(*log.lock().unwrap(), vec!["h1:ITEM_REMOVED", "h2:ITEM_REMOVED"]);
    }

    #[test]
    fn nested_emits_complete_before_the_next_handler_starts() {
        let bus = EventBus::new();
        let log = Arc::new(Mutex::new(Vec::new()));

        let h1_log = Arc::clone(&log);
        bus.register(
            EventKind::ItemRemoved,
            Arc::new(move |bus: &EventBus, _: &WarehouseEvent| -> HandlerResult {
                h1_log.lock().unwrap().push("h1:start".to_string());
                bus.emit(WarehouseEvent::alert("Low Stock", "nested"))?;
                h1_log.lock().unwrap().push("h1:end".to_string());
                Ok(())
            }),
        )
        .unwrap();
        bus.register(EventKind::ItemRemoved, recorder(&log, "h2")).unwrap();
        bus.register(EventKind::AlertRaised, recorder(&log, "alert")).unwrap();

        bus.emit(removal("W1", 1)).unwrap();

        assert_eq!(
            *log.lock().unwrap(),
            vec!["h1:start", "alert:ALERT_RAISED", "h1:end", "h2:ITEM_REMOVED"]
        );
    }

    #[test]
    fn registering_twice_fires_twice() {
        let bus = EventBus::new();
        let hits = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&hits);
        let handler: Arc<dyn EventHandler> = Arc::new(move |_: &EventBus, _: &WarehouseEvent| -> HandlerResult {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(())
        });
        bus.register(EventKind::InventoryCheck, Arc::clone(&handler)).unwrap();
        bus.register(EventKind::InventoryCheck, handler).unwrap();

        bus.emit(WarehouseEvent::InventoryCheck).unwrap();

        assert_eq!(hits.load(Ordering::SeqCst), 2);
        assert_eq!(bus.handler_count(EventKind::InventoryCheck), 2);
    }

    #[test]
    fn failing_handler_aborts_remaining_handlers_and_propagates() {
        let bus = EventBus::new();
        let log = Arc::new(Mutex::new(Vec::new()));
        bus.register(
            EventKind::AlertRaised,
            Arc::new(|_: &EventBus, _: &WarehouseEvent| -> HandlerResult {
                Err(BusError::handler(EventKind::AlertRaised, DomainError::invariant("boom")))
            }),
        )
        .unwrap();
        bus.register(EventKind::AlertRaised, recorder(&log, "after")).unwrap();

        // The failure surfaces through the outer ITEM_REMOVED emit as well.
        bus.register(
            EventKind::ItemRemoved,
            Arc::new(|bus: &EventBus, _: &WarehouseEvent| bus.emit(WarehouseEvent::alert("x", "y"))),
        )
        .unwrap();

        let err = bus.emit(removal("W1", 1)).unwrap_err();
        assert_eq!(
            err,
            BusError::handler(EventKind::AlertRaised, DomainError::invariant("boom"))
        );
        assert!(log.lock().unwrap().is_empty());
    }

    #[derive(Clone, Default)]
    struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

    impl std::io::Write for CapturedLogs {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    impl CapturedLogs {
        fn count(&self, needle: &str) -> usize {
            String::from_utf8_lossy(&self.0.lock().unwrap()).matches(needle).count()
        }
    }

    fn with_captured_logs(f: impl FnOnce()) -> CapturedLogs {
        let logs = CapturedLogs::default();
        let writer = logs.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_ansi(false)
            .with_writer(move || writer.clone())
            .finish();
        tracing::subscriber::with_default(subscriber, f);
        logs
    }

    #[test]
    fn nested_failure_of_the_same_kind_is_logged_once() {
        let bus = EventBus::new();
        // Removing 2 cascades into removing 1, which fails.
        bus.register(
            EventKind::ItemRemoved,
            Arc::new(|bus: &EventBus, event: &WarehouseEvent| -> HandlerResult {
                match event {
                    WarehouseEvent::ItemRemoved(e) if e.quantity > 1 => {
                        bus.emit(removal("W1", e.quantity - 1))
                    }
                    _ => Err(BusError::handler(
                        EventKind::ItemRemoved,
                        DomainError::invariant("boom"),
                    )),
                }
            }),
        )
        .unwrap();

        let logs = with_captured_logs(|| {
            assert!(bus.emit(removal("W1", 3)).is_err());
        });
        assert_eq!(logs.count("handler failed"), 1);

        // A fresh cascade reports the same failure again.
        let logs = with_captured_logs(|| {
            assert!(bus.emit(removal("W1", 2)).is_err());
            assert!(bus.emit(removal("W1", 1)).is_err());
        });
        assert_eq!(logs.count("handler failed"), 2);
    }

    #[test]
    fn subscription_sees_events_in_depth_first_order() {
        let bus = EventBus::new();
        bus.register(
            EventKind::ItemRemoved,
            Arc::new(|bus: &EventBus, _: &WarehouseEvent| -> HandlerResult {
                bus.emit(AlertRaised {
                    title: "Low Stock".into(),
                    message: "W1".into(),
                })
            }),
        )
        .unwrap();
        let sub = bus.subscribe();

        bus.emit(removal("W1", 1)).unwrap();
        bus.emit(WarehouseEvent::InventoryCheck).unwrap();

        let kinds: Vec<EventKind> = sub.drain().iter().map(WarehouseEvent::kind).collect();
        assert_eq!(
            kinds,
            vec![EventKind::ItemRemoved, EventKind::AlertRaised, EventKind::InventoryCheck]
        );
    }

    #[test]
    fn dropped_subscription_does_not_break_emit() {
        let bus = EventBus::new();
        drop(bus.subscribe());
        assert!(bus.emit(WarehouseEvent::InventoryCheck).is_ok());
    }
}
