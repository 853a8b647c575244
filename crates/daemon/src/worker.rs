// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Queue poll loop.
//!
//! Each tick sends a heartbeat for the jobs in flight, then claims jobs until
//! `max_concurrent` are running. Every claimed job is reported back to the
//! queue, including jobs cancelled by shutdown.

use std::sync::Arc;
use std::time::Duration;

use ivm_core::Index;
use tokio::task::JoinSet;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::handler::Handler;
use crate::queue::QueueClient;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkerOptions {
    pub poll_interval: Duration,
    pub max_concurrent: usize,
}

impl Default for WorkerOptions {
    fn default() -> Self {
        Self { poll_interval: Duration::from_secs(1), max_concurrent: 1 }
    }
}

pub struct Worker {
    handler: Arc<Handler>,
    queue: Arc<dyn QueueClient>,
    options: WorkerOptions,
}

impl Worker {
    pub fn new(
        handler: Arc<Handler>,
        queue: Arc<dyn QueueClient>,
        options: WorkerOptions,
    ) -> Self {
        Self { handler, queue, options }
    }

    /// Poll until `cancel` fires, then cancel and drain in-flight jobs.
    pub async fn run(&self, cancel: CancellationToken) {
        let mut ticker = tokio::time::interval(self.options.poll_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut jobs = JoinSet::new();
        info!(
            backend = self.handler.backend_name(),
            max_concurrent = self.options.max_concurrent,
            "worker started"
        );

        loop {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => break,
                Some(joined) = jobs.join_next(), if !jobs.is_empty() => {
                    if let Err(e) = joined {
                        warn!(error = %e, "index task failed");
                    }
                }
                _ = ticker.tick() => {
                    self.heartbeat().await;
                    self.claim(&cancel, &mut jobs).await;
                }
            }
        }

        info!(in_flight = jobs.len(), "worker stopping");
        while let Some(joined) = jobs.join_next().await {
            if let Err(e) = joined {
                warn!(error = %e, "index task failed");
            }
        }
    }

    async fn heartbeat(&self) {
        let ids = self.handler.manager().ids();
        if ids.is_empty() {
            return;
        }
        if let Err(e) = self.queue.heartbeat(&ids).await {
            warn!(error = %e, "heartbeat failed");
        }
    }

    /// Claim jobs until the concurrency limit is reached or the queue is empty.
    async fn claim(&self, cancel: &CancellationToken, jobs: &mut JoinSet<()>) {
        while jobs.len() < self.options.max_concurrent {
            match self.queue.dequeue().await {
                Ok(Some(index)) => self.spawn(cancel.child_token(), index, jobs),
                Ok(None) => break,
                Err(e) => {
                    warn!(error = %e, "dequeue failed");
                    break;
                }
            }
        }
    }

    fn spawn(&self, cancel: CancellationToken, index: Index, jobs: &mut JoinSet<()>) {
        debug!(index_id = index.id, "claimed index");
        let handler = Arc::clone(&self.handler);
        let queue = Arc::clone(&self.queue);
        jobs.spawn(async move {
            let error = handler.handle(&cancel, &index).await.err().map(|e| e.to_string());
            if let Err(e) = queue.complete(index.id, error).await {
                warn!(index_id = index.id, error = %e, "failed to report index outcome");
            }
        });
    }
}

#[cfg(test)]
#[path = "worker_tests.rs"]
mod tests;
