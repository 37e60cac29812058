//! The ephemeral object that carries one scheduling call from candidate
//! snapshot through negotiation to award.

use std::sync::Arc;

use agent::ResourceAgent;
use task::Task;

use crate::negotiation::NegotiationAgent;

/// Owns a task and the snapshot of candidates collected for it. Built and
/// dropped within a single `BiddingManager::schedule_task` call.
pub struct TaskAgent {
    task: Arc<dyn Task>,
    candidates: Vec<Arc<ResourceAgent>>,
}

impl TaskAgent {
    pub fn new(task: Arc<dyn Task>, candidates: Vec<Arc<ResourceAgent>>) -> Self {
        Self { task, candidates }
    }

    /// Run the negotiation and award the task to the winner.
    ///
    /// Returns the full candidate list so the caller can mark every one of
    /// them (winner included) available again.
    pub async fn award(self) -> Vec<Arc<ResourceAgent>> {
        let winner = NegotiationAgent::best_candidate(&self.candidates)
            .await
            .expect("candidate set is non-empty by construction");

        winner.enqueue(self.task).await;
        self.candidates
    }
}
