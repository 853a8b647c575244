// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Tracks the ids of jobs currently being handled.
//!
//! The worker reports these ids in heartbeats so the queue does not hand the
//! same job to another indexer while it is still running here.

use std::collections::BTreeMap;
use std::sync::Arc;

use parking_lot::Mutex;

/// In-flight job ids, shared between the handler and the worker.
///
/// Each id carries a count so a job delivered twice stays tracked until both
/// runs finish.
#[derive(Debug, Clone, Default)]
pub struct IndexManager {
    ids: Arc<Mutex<BTreeMap<i64, usize>>>,
}

impl IndexManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns false if `id` was already tracked.
    pub fn add(&self, id: i64) -> bool {
        let mut ids = self.ids.lock();
        let count = ids.entry(id).or_insert(0);
        *count += 1;
        *count == 1
    }

    /// Release one hold on `id`; it stays tracked while others remain.
    /// Returns false if `id` was not tracked.
    pub fn remove(&self, id: i64) -> bool {
        let mut ids = self.ids.lock();
        let Some(count) = ids.get_mut(&id) else {
            return false;
        };
        *count -= 1;
        if *count == 0 {
            ids.remove(&id);
        }
        true
    }

    /// Tracked ids in ascending order.
    pub fn ids(&self) -> Vec<i64> {
        self.ids.lock().keys().copied().collect()
    }

    pub fn len(&self) -> usize {
        self.ids.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.lock().is_empty()
    }

    /// Track `id` until the returned guard is dropped.
    pub fn track(&self, id: i64) -> IndexGuard {
        self.add(id);
        IndexGuard { manager: self.clone(), id }
    }
}

/// Removes its id from the manager on drop.
#[derive(Debug)]
pub struct IndexGuard {
    manager: IndexManager,
    id: i64,
}

impl IndexGuard {
    pub fn id(&self) -> i64 {
        self.id
    }
}

impl Drop for IndexGuard {
    fn drop(&mut self) {
        self.manager.remove(self.id);
    }
}

#[cfg(test)]
#[path = "manager_tests.rs"]
mod tests;
