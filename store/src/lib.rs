//! Shared resource inventory for the Smart Factory Control System.
//!
//! `ResourceStore` is the only piece of mutable state touched by more than
//! one subsystem: every recipe reserves its inputs from it and releases its
//! outputs into it, concurrently, from however many resource agents are
//! currently executing a task.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::sleep;

/// Backoff between failed reservation attempts. The design assumes coarse
/// simulation time dominated by recipe work-sleeps, so polling at this
/// granularity costs nothing observable.
const RESERVE_POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Shared, thread-safe inventory of named resource counts.
///
/// Cloning a `ResourceStore` is cheap and shares the same underlying
/// inventory and shutdown flag: it is itself a handle around `Arc`s, meant
/// to be cloned by value into every spawned task that touches it.
#[derive(Clone)]
pub struct ResourceStore {
    resources: Arc<Mutex<HashMap<String, u64>>>,
    stop_access: Arc<AtomicBool>,
}

impl ResourceStore {
    /// Build a store pre-populated with the given resource counts.
    ///
    /// The scenario driver is responsible for listing every resource name
    /// that will ever be reserved or released; reserving/releasing an
    /// unlisted name is a programmer error (§7), not a runtime condition.
    pub fn new(initial: HashMap<String, u64>) -> Self {
        Self {
            resources: Arc::new(Mutex::new(initial)),
            stop_access: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Reserve `amount` units of `resource_name`, blocking (via polling
    /// backoff) until enough stock exists.
    ///
    /// Returns `false` only if `shutdown()` was signalled while waiting;
    /// it never returns `false` because of insufficient stock — callers
    /// that need to observe shortage without blocking must treat a `false`
    /// return as "the system is tearing down", not "try something else".
    pub async fn reserve(&self, resource_name: &str, amount: u64) -> bool {
        loop {
            {
                let mut guard = self.resources.lock().await;
                let count = guard
                    .get_mut(resource_name)
                    .unwrap_or_else(|| panic!("unknown resource name: {resource_name}"));
                if *count >= amount {
                    *count -= amount;
                    return true;
                }
            }

            if self.stop_access.load(Ordering::SeqCst) {
                tracing::debug!(resource_name, amount, "reserve aborted by shutdown");
                return false;
            }

            sleep(RESERVE_POLL_INTERVAL).await;
        }
    }

    /// Release `amount` units of `resource_name` back to the store.
    ///
    /// Never fails, never blocks; the result is observable to any reserver
    /// waiting on the same resource the next time it polls.
    pub async fn release(&self, resource_name: &str, amount: u64) {
        let mut guard = self.resources.lock().await;
        let count = guard
            .get_mut(resource_name)
            .unwrap_or_else(|| panic!("unknown resource name: {resource_name}"));
        *count += amount;
    }

    /// Snapshot test used internally by `reserve`'s polling loop.
    ///
    /// Not a race-free pre-check: the count may change between this call
    /// returning and a subsequent `reserve` — `reserve` is the only path
    /// that observes-and-decrements atomically.
    pub async fn available(&self, resource_name: &str, amount: u64) -> bool {
        let guard = self.resources.lock().await;
        let count = guard
            .get(resource_name)
            .unwrap_or_else(|| panic!("unknown resource name: {resource_name}"));
        *count >= amount
    }

    /// Read the current count of `resource_name`. Used by tests and the
    /// scenario driver to check goal conditions; not part of the core
    /// reservation protocol.
    pub async fn count(&self, resource_name: &str) -> u64 {
        let guard = self.resources.lock().await;
        *guard
            .get(resource_name)
            .unwrap_or_else(|| panic!("unknown resource name: {resource_name}"))
    }

    /// Idempotently signal shutdown: unblocks any reserver waiting for
    /// resources that will now never arrive.
    pub fn shutdown(&self) {
        self.stop_access.store(true, Ordering::SeqCst);
    }

    /// Whether `shutdown()` has been called.
    pub fn is_shutdown(&self) -> bool {
        self.stop_access.load(Ordering::SeqCst)
    }
}
