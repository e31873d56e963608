use crate::{BusError, EventBus, WarehouseEvent};

/// Outcome of a single handler invocation.
pub type HandlerResult = Result<(), BusError>;

/// Reacts to events dispatched by an [`EventBus`].
///
/// The bus passes itself to the handler so it can emit follow-up events; those
/// nested emits run to completion before the bus moves on to the next handler
/// (depth-first cascade).
///
/// A handler receives every event of the kinds it was registered for and should
/// ignore variants it does not care about. Returning an error aborts the
/// remaining handlers of the current event and propagates out of every
/// enclosing `emit`.
///
/// Implementations must not emit while holding a lock on their own state: a
/// cascade may call back into the same component.
pub trait EventHandler: Send + Sync {
    fn handle(&self, bus: &EventBus, event: &WarehouseEvent) -> HandlerResult;

    /// Name used in dispatch logs.
    fn name(&self) -> &str {
        core::any::type_name::<Self>()
    }
}

impl<F> EventHandler for F
where
    F: Fn(&EventBus, &WarehouseEvent) -> HandlerResult + Send + Sync,
{
    fn handle(&self, bus: &EventBus, event: &WarehouseEvent) -> HandlerResult {
        self(bus, event)
    }

    fn name(&self) -> &str {
        "closure"
    }
}
