//! Fulfilment critical section.
//!
//! Serialises the check-then-deduct sequence of order fulfilment across
//! threads. Re-entry from the thread that already holds the gate is allowed,
//! since a deduction cascade may itself submit an order on the same thread.

use std::sync::{Condvar, Mutex};
use std::thread::{self, ThreadId};

use warehouse_core::{DomainError, DomainResult};

#[derive(Debug, Default)]
struct GateState {
    owner: Option<ThreadId>,
    depth: usize,
}

#[derive(Debug, Default)]
pub(crate) struct FulfilmentGate {
    state: Mutex<GateState>,
    wake: Condvar,
}

impl FulfilmentGate {
    /// Block until the calling thread owns the gate.
    pub(crate) fn enter(&self) -> DomainResult<GateGuard<'_>> {
        let me = thread::current().id();
        let mut state = self
            .state
            .lock()
            .map_err(|_| DomainError::poisoned("fulfilment gate"))?;

        while state.owner.is_some_and(|owner| owner != me) {
            state = self
                .wake
                .wait(state)
                .map_err(|_| DomainError::poisoned("fulfilment gate"))?;
        }

        state.owner = Some(me);
        state.depth += 1;
        Ok(GateGuard { gate: self })
    }
}

pub(crate) struct GateGuard<'a> {
    gate: &'a FulfilmentGate,
}

impl Drop for GateGuard<'_> {
    fn drop(&mut self) {
        if let Ok(mut state) = self.gate.state.lock() {
            state.depth = state.depth.saturating_sub(1);
            if state.depth == 0 {
                state.owner = None;
                self.gate.wake.notify_one();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::time::Duration;

    use super::*;

    #[test]
    fn same_thread_may_reenter() {
        let gate = FulfilmentGate::default();
        let outer = gate.enter().unwrap();
        let inner = gate.enter().unwrap();
        drop(inner);
        drop(outer);
        assert!(gate.enter().is_ok());
    }

    #[test]
    fn other_threads_wait_until_released() {
        let gate = Arc::new(FulfilmentGate::default());
        let entered = Arc::new(AtomicBool::new(false));

        let guard = gate.enter().unwrap();
        let handle = {
            let gate = Arc::clone(&gate);
            let entered = Arc::clone(&entered);
            thread::spawn(move || {
                let _guard = gate.enter().unwrap();
                entered.store(true, Ordering::SeqCst);
            })
        };

        thread::sleep(Duration::from_millis(50));
        assert!(!entered.load(Ordering::SeqCst));

        drop(guard);
        handle.join().unwrap();
        assert!(entered.load(Ordering::SeqCst));
    }
}
