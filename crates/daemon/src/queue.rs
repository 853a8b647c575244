// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Upstream job queue.

use async_trait::async_trait;
use ivm_core::Index;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueueError {
    #[error("queue request failed: {0}")]
    Request(String),
}

/// Source of index jobs and sink for their outcomes.
#[async_trait]
pub trait QueueClient: Send + Sync {
    /// Claim the next job, if any is waiting.
    async fn dequeue(&self) -> Result<Option<Index>, QueueError>;

    /// Report a claimed job as finished; `error` is `None` on success.
    async fn complete(&self, id: i64, error: Option<String>) -> Result<(), QueueError>;

    /// Tell the queue these jobs are still being worked on.
    async fn heartbeat(&self, ids: &[i64]) -> Result<(), QueueError>;
}

#[cfg(any(test, feature = "test-support"))]
#[cfg_attr(coverage_nightly, coverage(off))]
mod fake {
    use super::{QueueClient, QueueError};
    use async_trait::async_trait;
    use ivm_core::Index;
    use parking_lot::Mutex;
    use std::collections::VecDeque;
    use std::sync::Arc;

    #[derive(Default)]
    struct FakeQueueState {
        pending: VecDeque<Index>,
        completions: Vec<(i64, Option<String>)>,
        heartbeats: Vec<Vec<i64>>,
        dequeue_errors: usize,
    }

    /// In-memory queue recording completions and heartbeats.
    #[derive(Clone, Default)]
    pub struct FakeQueueClient {
        inner: Arc<Mutex<FakeQueueState>>,
    }

    impl FakeQueueClient {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn push(&self, index: Index) {
            self.inner.lock().pending.push_back(index);
        }

        /// Fail the next `n` dequeue calls.
        pub fn fail_dequeues(&self, n: usize) {
            self.inner.lock().dequeue_errors = n;
        }

        pub fn pending(&self) -> usize {
            self.inner.lock().pending.len()
        }

        pub fn completions(&self) -> Vec<(i64, Option<String>)> {
            self.inner.lock().completions.clone()
        }

        pub fn heartbeats(&self) -> Vec<Vec<i64>> {
            self.inner.lock().heartbeats.clone()
        }
    }

    #[async_trait]
    impl QueueClient for FakeQueueClient {
        async fn dequeue(&self) -> Result<Option<Index>, QueueError> {
            let mut state = self.inner.lock();
            if state.dequeue_errors > 0 {
                state.dequeue_errors -= 1;
                return Err(QueueError::Request("queue unavailable".to_string()));
            }
            Ok(state.pending.pop_front())
        }

        async fn complete(&self, id: i64, error: Option<String>) -> Result<(), QueueError> {
            self.inner.lock().completions.push((id, error));
            Ok(())
        }

        async fn heartbeat(&self, ids: &[i64]) -> Result<(), QueueError> {
            self.inner.lock().heartbeats.push(ids.to_vec());
            Ok(())
        }
    }
}

#[cfg(any(test, feature = "test-support"))]
pub use fake::FakeQueueClient;
