//! Negotiation: picking the single best bid-candidate for a task.

use std::sync::Arc;

use agent::ResourceAgent;

/// Ephemeral object that scores a fixed candidate list and picks a winner.
/// Constructed and discarded within a single `TaskAgent` award.
pub struct NegotiationAgent;

impl NegotiationAgent {
    /// `bid = 1 / (1 + queue_length)` — higher is better, an idle agent
    /// (queue length 0) always bids 1.0.
    fn generate_bid(queue_len: usize) -> f64 {
        1.0 / (1.0 + queue_len as f64)
    }

    /// Pick the candidate with the highest bid. Ties go to the first
    /// candidate encountered, because the comparison is a strict `>`
    /// against a running `max_bid` seeded at `0.0` — an agent with any
    /// queue length still bids `> 0.0`, so the first candidate scanned
    /// always sets the initial bar.
    pub async fn best_candidate(candidates: &[Arc<ResourceAgent>]) -> Option<Arc<ResourceAgent>> {
        let mut best: Option<Arc<ResourceAgent>> = None;
        let mut max_bid = 0.0_f64;

        for candidate in candidates {
            let bid = Self::generate_bid(candidate.queue_len().await);
            if bid > max_bid {
                max_bid = bid;
                best = Some(Arc::clone(candidate));
            }
        }

        best
    }
}
