use std::future::Future;
use std::sync::Arc;

use tokio::sync::{mpsc, Mutex};
use tracing::{info, warn};

use crate::types::OrchestrationJob;

/// Bounded worker pool executing orchestration jobs.
///
/// The triggering request must return immediately, so submission never
/// waits: `dispatch` queues the job and returns. The fixed pool bounds
/// concurrent in-flight orchestrations; when the queue is full the job is
/// shed (the decoupled-execution contract carries no delivery guarantee).
/// Once a job is picked up it runs to completion; there is no cancellation.
pub struct Dispatcher {
    tx: mpsc::Sender<OrchestrationJob>,
}

impl Dispatcher {
    /// Spawn `workers` workers draining a queue of capacity `queue_cap`.
    pub fn spawn<F, Fut>(handler: F, workers: usize, queue_cap: usize) -> Self
    where
        F: Fn(OrchestrationJob) -> Fut + Send + Sync + Clone + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let (tx, rx) = mpsc::channel::<OrchestrationJob>(queue_cap.max(1));
        let rx = Arc::new(Mutex::new(rx));

        for worker in 0..workers.max(1) {
            let rx = rx.clone();
            let handler = handler.clone();
            tokio::spawn(async move {
                loop {
                    // Hold the lock only while receiving so idle workers
                    // don't starve each other.
                    let job = { rx.lock().await.recv().await };
                    match job {
                        Some(job) => handler(job).await,
                        None => break,
                    }
                }
                info!(worker, "Dispatcher worker stopped");
            });
        }

        Self { tx }
    }

    /// Queue a job without waiting for it to run. Returns false when the
    /// job was shed because the queue is full.
    pub fn dispatch(&self, job: OrchestrationJob) -> bool {
        match self.tx.try_send(job) {
            Ok(()) => true,
            Err(mpsc::error::TrySendError::Full(job)) => {
                warn!(
                    channel_url = %job.channel_url,
                    "Orchestration queue full; shedding request"
                );
                false
            }
            Err(mpsc::error::TrySendError::Closed(_)) => {
                warn!("Orchestration queue closed; dropping request");
                false
            }
        }
    }
}
