//! Resource agents: the workers that actually run (or delegate) tasks.
//!
//! A plain [`ResourceAgent`] owns a FIFO queue and a background worker that
//! executes tasks against a [`ResourceStore`] serially. A *recursive*
//! resource agent is not a separate type — per the on-dequeue action below
//! it is the same [`ResourceAgent`] configured to forward each dequeued task
//! to a child [`TaskSink`] (a holonic sub-[`bidding::BiddingManager`])
//! instead of executing it locally. This keeps the worker loop a single
//! implementation instead of a class hierarchy, and avoids a dependency
//! cycle back onto the crate that owns `BiddingManager`.

use std::collections::{HashSet, VecDeque};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Mutex;

use store::ResourceStore;
use task::Task;

/// Backoff while a worker's queue is empty.
const IDLE_POLL_INTERVAL: Duration = Duration::from_millis(1);

/// What a [`ResourceAgent`] does with a task once it reaches the head of
/// its queue.
enum OnDequeue {
    /// Execute the task directly against the shared store.
    Execute(ResourceStore),
    /// Hand the task to a child scheduler and move on — the agent is "busy"
    /// only for the scheduling call, not for the task's execution.
    Delegate(Arc<dyn TaskSink>),
}

/// Anything that can accept a task and award it to one of its own
/// resource agents. Implemented by `bidding::BiddingManager`; kept as a
/// trait here so a recursive agent can hold a handle to its child manager
/// without this crate depending on the `bidding` crate.
#[async_trait]
pub trait TaskSink: Send + Sync {
    /// Schedule `task` on the sink. Returns once the task has been
    /// awarded to some member, not once it has finished executing.
    async fn schedule_task(&self, task: Arc<dyn Task>);
}

/// A worker that owns a FIFO queue of awarded tasks and executes (or
/// delegates) them serially, one at a time, in award order.
pub struct ResourceAgent {
    index: AtomicUsize,
    capabilities: HashSet<&'static str>,
    queue: Arc<Mutex<VecDeque<Arc<dyn Task>>>>,
    run: Arc<AtomicBool>,
    action: OnDequeue,
}

impl ResourceAgent {
    /// Build an agent that executes awarded tasks directly against `store`.
    pub fn new_executing(
        capabilities: impl IntoIterator<Item = &'static str>,
        store: ResourceStore,
    ) -> Arc<Self> {
        Arc::new(Self::with_action(capabilities, OnDequeue::Execute(store)))
    }

    /// Build an agent that forwards awarded tasks to `child` instead of
    /// running them itself.
    pub fn new_delegating(
        capabilities: impl IntoIterator<Item = &'static str>,
        child: Arc<dyn TaskSink>,
    ) -> Arc<Self> {
        Arc::new(Self::with_action(capabilities, OnDequeue::Delegate(child)))
    }

    fn with_action(capabilities: impl IntoIterator<Item = &'static str>, action: OnDequeue) -> Self {
        Self {
            index: AtomicUsize::new(usize::MAX),
            capabilities: capabilities.into_iter().collect(),
            queue: Arc::new(Mutex::new(VecDeque::new())),
            run: Arc::new(AtomicBool::new(true)),
            action,
        }
    }

    /// Index assigned by the owning `BiddingManager` when this agent is
    /// registered. `usize::MAX` until then.
    pub fn index(&self) -> usize {
        self.index.load(Ordering::SeqCst)
    }

    /// Set by `BiddingManager::add_resource`; not meant to be called by
    /// scenario code.
    pub fn set_index(&self, idx: usize) {
        self.index.store(idx, Ordering::SeqCst);
    }

    /// Whether this agent accepts tasks with the given capability tag.
    pub fn accepts(&self, task_name: &str) -> bool {
        self.capabilities.contains(task_name)
    }

    /// Current queue length, used by the bidding negotiation's load-inverse
    /// heuristic. Not a capacity limit — the queue is unbounded.
    pub async fn queue_len(&self) -> usize {
        self.queue.lock().await.len()
    }

    /// Append `task` to the tail of the queue. No capability check here:
    /// the bidding manager is responsible for only awarding compatible
    /// tasks in the first place.
    pub async fn enqueue(&self, task: Arc<dyn Task>) {
        self.queue.lock().await.push_back(task);
    }

    /// Launch the background worker. Callers are expected to start each
    /// agent exactly once; calling it twice would race two workers over
    /// the same queue.
    pub fn start(self: &Arc<Self>) {
        let agent = Arc::clone(self);
        tokio::spawn(async move { agent.run_loop().await });
    }

    /// Signal the worker to stop after its current task (if any) finishes.
    /// Queued-but-not-started tasks are abandoned. Idempotent.
    pub fn stop(&self) {
        self.run.store(false, Ordering::SeqCst);
    }

    async fn run_loop(self: Arc<Self>) {
        while self.run.load(Ordering::SeqCst) {
            let next = self.queue.lock().await.pop_front();
            match next {
                Some(task) => self.perform(task).await,
                None => tokio::time::sleep(IDLE_POLL_INTERVAL).await,
            }
        }
    }

    async fn perform(&self, task: Arc<dyn Task>) {
        match &self.action {
            OnDequeue::Execute(store) => {
                tracing::debug!(task = task.name(), agent = self.index(), "executing task");
                task.execute(store).await;
            }
            OnDequeue::Delegate(child) => {
                tracing::debug!(task = task.name(), agent = self.index(), "delegating task");
                child.schedule_task(task).await;
            }
        }
    }
}

/// Named constructor for a resource agent whose action is delegation to a
/// child `TaskSink` rather than local execution. There is no separate type
/// — see the module docs.
pub struct RecursiveResourceAgent;

impl RecursiveResourceAgent {
    pub fn new(
        capabilities: impl IntoIterator<Item = &'static str>,
        child: Arc<dyn TaskSink>,
    ) -> Arc<ResourceAgent> {
        ResourceAgent::new_delegating(capabilities, child)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::atomic::AtomicUsize as StdAtomicUsize;

    fn store_with(pairs: &[(&str, u64)]) -> ResourceStore {
        let map = pairs.iter().map(|(k, v)| (k.to_string(), *v)).collect::<HashMap<_, _>>();
        ResourceStore::new(map)
    }

    struct CountingSink {
        calls: Arc<StdAtomicUsize>,
    }

    #[async_trait]
    impl TaskSink for CountingSink {
        async fn schedule_task(&self, _task: Arc<dyn Task>) {
            self.calls.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn executes_tasks_in_enqueue_order() {
        let store = store_with(&[
            ("iron_plate", 100),
            ("iron_gear_wheel", 0),
            ("copper_plate", 100),
            ("copper_cable", 0),
        ]);
        let agent = ResourceAgent::new_executing(["IGW_Task", "CC_Task"], store.clone());
        agent.start();

        agent.enqueue(Arc::new(task::AssembleIronGearWheel)).await;
        agent.enqueue(Arc::new(task::AssembleCopperCable)).await;

        tokio::time::advance(Duration::from_millis(1200)).await;
        tokio::task::yield_now().await;

        assert_eq!(store.count("iron_gear_wheel").await, 1);
        assert_eq!(store.count("copper_cable").await, 2);
        agent.stop();
    }

    #[tokio::test(start_paused = true)]
    async fn delegating_agent_forwards_without_executing() {
        let calls = Arc::new(StdAtomicUsize::new(0));
        let sink = Arc::new(CountingSink { calls: calls.clone() });
        let agent = ResourceAgent::new_delegating(["CC_Task"], sink);
        agent.start();

        agent.enqueue(Arc::new(task::AssembleCopperCable)).await;
        tokio::time::advance(Duration::from_millis(10)).await;
        tokio::task::yield_now().await;

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        agent.stop();
    }

    #[tokio::test]
    async fn accepts_reflects_capability_set() {
        let store = store_with(&[]);
        let agent = ResourceAgent::new_executing(["IGW_Task"], store);
        assert!(agent.accepts("IGW_Task"));
        assert!(!agent.accepts("AC_Task"));
    }
}
