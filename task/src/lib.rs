//! Manufacturing tasks: capability-tagged work items whose `execute`
//! reserves inputs, simulates the work, and releases outputs against a
//! [`ResourceStore`].
//!
//! Each recipe below follows the same shape: reserve inputs left-to-right,
//! compensating (releasing already-reserved inputs) the moment a later
//! reservation fails. Under normal operation `reserve` always eventually
//! succeeds — it only returns `false` once the store has been shut down —
//! so the compensation paths exist for the shutdown case, not for routine
//! shortage.

use std::time::Duration;

use async_trait::async_trait;
use store::ResourceStore;

/// A single-shot unit of manufacturing work.
///
/// `name` is the capability tag a [`agent::ResourceAgent`] matches against
/// its accepted task set; `nominal_time` is used for reporting/accounting
/// only and has no bearing on scheduling decisions.
#[async_trait]
pub trait Task: Send + Sync {
    /// Capability tag this task requires, e.g. `"IGW_Task"`.
    fn name(&self) -> &'static str;

    /// Nominal duration of the simulated work, for accounting.
    fn nominal_time(&self) -> Duration;

    /// Reserve inputs, simulate work, release outputs.
    ///
    /// Returns `true` if the recipe ran to completion and produced its
    /// output, `false` if it was abandoned (compensated back to the store)
    /// because a reservation failed under shutdown.
    async fn execute(&self, store: &ResourceStore) -> bool;
}

/// Assemble one `iron_gear_wheel` from two `iron_plate`.
pub struct AssembleIronGearWheel;

#[async_trait]
impl Task for AssembleIronGearWheel {
    fn name(&self) -> &'static str {
        "IGW_Task"
    }

    fn nominal_time(&self) -> Duration {
        Duration::from_millis(500)
    }

    async fn execute(&self, store: &ResourceStore) -> bool {
        if !store.reserve("iron_plate", 2).await {
            return false;
        }

        tokio::time::sleep(self.nominal_time()).await;
        store.release("iron_gear_wheel", 1).await;
        true
    }
}

/// Assemble two `copper_cable` from one `copper_plate`.
pub struct AssembleCopperCable;

#[async_trait]
impl Task for AssembleCopperCable {
    fn name(&self) -> &'static str {
        "CC_Task"
    }

    fn nominal_time(&self) -> Duration {
        Duration::from_millis(500)
    }

    async fn execute(&self, store: &ResourceStore) -> bool {
        if !store.reserve("copper_plate", 1).await {
            return false;
        }

        tokio::time::sleep(self.nominal_time()).await;
        store.release("copper_cable", 2).await;
        true
    }
}

/// Assemble one `electronic_circuit` from one `iron_plate` and three
/// `copper_cable`.
pub struct AssembleElectronicCircuit;

#[async_trait]
impl Task for AssembleElectronicCircuit {
    fn name(&self) -> &'static str {
        "EC_Task"
    }

    fn nominal_time(&self) -> Duration {
        Duration::from_millis(500)
    }

    async fn execute(&self, store: &ResourceStore) -> bool {
        if !store.reserve("iron_plate", 1).await {
            return false;
        }

        if !store.reserve("copper_cable", 3).await {
            tracing::debug!(task = self.name(), "compensating iron_plate after shutdown");
            store.release("iron_plate", 1).await;
            return false;
        }

        tokio::time::sleep(self.nominal_time()).await;
        store.release("electronic_circuit", 1).await;
        true
    }
}

/// Assemble one `advanced_circuit` from two `plastic_bar`, four
/// `copper_cable`, and two `electronic_circuit`.
pub struct AssembleAdvancedCircuit;

#[async_trait]
impl Task for AssembleAdvancedCircuit {
    fn name(&self) -> &'static str {
        "AC_Task"
    }

    fn nominal_time(&self) -> Duration {
        Duration::from_millis(6000)
    }

    async fn execute(&self, store: &ResourceStore) -> bool {
        if !store.reserve("plastic_bar", 2).await {
            return false;
        }

        if !store.reserve("copper_cable", 4).await {
            tracing::debug!(task = self.name(), "compensating plastic_bar after shutdown");
            store.release("plastic_bar", 2).await;
            return false;
        }

        if !store.reserve("electronic_circuit", 2).await {
            tracing::debug!(
                task = self.name(),
                "compensating plastic_bar and copper_cable after shutdown"
            );
            store.release("plastic_bar", 2).await;
            store.release("copper_cable", 4).await;
            return false;
        }

        tokio::time::sleep(self.nominal_time()).await;
        store.release("advanced_circuit", 1).await;
        true
    }
}
