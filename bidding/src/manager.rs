//! The bidding manager: admits tasks, collects capable-and-idle candidate
//! agents, and awards each task to exactly one of them.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Mutex;

use agent::{ResourceAgent, TaskSink};
use store::ResourceStore;
use task::Task;

use crate::task_agent::TaskAgent;

/// Backoff between full candidate rescans when nothing is currently both
/// idle and capable.
const CANDIDATE_POLL_INTERVAL: Duration = Duration::from_millis(1);

/// Members and their parallel availability flags, guarded together so the
/// true→false toggle always happens under the same lock that observed the
/// flag true — the race the design flags explicitly rules out.
struct ManagerState {
    members: Vec<Arc<ResourceAgent>>,
    availability: Vec<bool>,
}

/// Admits tasks and awards each one to a single idle, capability-matching
/// member resource agent.
pub struct BiddingManager {
    store: ResourceStore,
    state: Mutex<ManagerState>,
}

impl BiddingManager {
    pub fn new(store: ResourceStore) -> Arc<Self> {
        Arc::new(Self {
            store,
            state: Mutex::new(ManagerState {
                members: Vec::new(),
                availability: Vec::new(),
            }),
        })
    }

    /// The store this manager's members execute against. Exposed mainly
    /// for scenario wiring; the manager itself never reserves or releases.
    pub fn store(&self) -> &ResourceStore {
        &self.store
    }

    /// Register a resource agent as a member. Assigns it a dense, stable
    /// index and marks it available.
    pub async fn add_resource(&self, resource: Arc<ResourceAgent>) {
        let mut state = self.state.lock().await;
        let idx = state.members.len();
        resource.set_index(idx);
        state.members.push(resource);
        state.availability.push(true);
    }

    /// Number of registered members.
    pub async fn member_count(&self) -> usize {
        self.state.lock().await.members.len()
    }

    /// Schedule `task`, blocking until it has been awarded to some member.
    /// Does not wait for that member to finish executing it.
    ///
    /// Loops forever if no registered member ever accepts `task.name()` —
    /// that is a misconfiguration, not a runtime error, per the design.
    pub async fn schedule_task(&self, task: Arc<dyn Task>) {
        let candidates = self.collect_candidates(task.name()).await;

        tracing::debug!(
            task = task.name(),
            candidates = candidates.len(),
            "negotiating award"
        );

        let t_agent = TaskAgent::new(Arc::clone(&task), candidates);
        let released = t_agent.award().await;
        self.release_candidates(&released).await;
    }

    async fn collect_candidates(&self, task_name: &str) -> Vec<Arc<ResourceAgent>> {
        loop {
            let candidates = {
                let mut state = self.state.lock().await;
                let ManagerState { members, availability } = &mut *state;

                let mut found = Vec::new();
                for (i, member) in members.iter().enumerate() {
                    if availability[i] && member.accepts(task_name) {
                        availability[i] = false;
                        found.push(Arc::clone(member));
                    }
                }
                found
            };

            if !candidates.is_empty() {
                return candidates;
            }

            tokio::time::sleep(CANDIDATE_POLL_INTERVAL).await;
        }
    }

    /// Mark every candidate (winner included) available again. The winner
    /// is free to be selected for the next negotiation immediately, even
    /// though it still has the just-awarded task queued — bids reflect
    /// queue length, not instantaneous busyness, which is what spreads
    /// load across members instead of starving a single-capability agent.
    async fn release_candidates(&self, candidates: &[Arc<ResourceAgent>]) {
        let mut state = self.state.lock().await;
        for candidate in candidates {
            state.availability[candidate.index()] = true;
        }
    }
}

#[async_trait]
impl TaskSink for BiddingManager {
    async fn schedule_task(&self, task: Arc<dyn Task>) {
        BiddingManager::schedule_task(self, task).await
    }
}
