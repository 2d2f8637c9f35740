// SPDX-FileCopyrightText: 2026 Ciro Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Per-session serialization of sandbox executions.
//!
//! Executions within one session run one at a time because they share the
//! sandbox's interpreter state and scratch directory. Different sessions run
//! concurrently. Idle entries are removed once nobody holds their lock.

use std::future::Future;
use std::sync::Arc;

use ciro_core::SessionId;
use dashmap::DashMap;
use tokio::sync::Mutex;
use tracing::debug;

/// Registry of one async mutex per active session.
#[derive(Debug, Default)]
pub struct SessionLocks {
    locks: DashMap<String, Arc<Mutex<()>>>,
}

impl SessionLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `work` while holding the lock for `session_id`.
    ///
    /// The entry is released even when the returned future is dropped early.
    pub async fn run_exclusive<F, T>(&self, session_id: &SessionId, work: F) -> T
    where
        F: Future<Output = T>,
    {
        let entry = SessionEntry {
            locks: &self.locks,
            key: session_id.as_str(),
            lock: self.locks.entry(session_id.to_string()).or_default().clone(),
        };

        let _guard = entry.lock.lock().await;
        debug!(session_id = %session_id, "session lock acquired");
        work.await
    }

    /// Number of sessions with a live lock entry.
    pub fn active_sessions(&self) -> usize {
        self.locks.len()
    }
}

/// A borrowed lock entry, pruned from the registry when dropped.
struct SessionEntry<'a> {
    locks: &'a DashMap<String, Arc<Mutex<()>>>,
    key: &'a str,
    lock: Arc<Mutex<()>>,
}

impl Drop for SessionEntry<'_> {
    fn drop(&mut self) {
        // The map's copy plus ours means no other request is queued.
        self.locks
            .remove_if(self.key, |_, lock| Arc::strong_count(lock) == 2);
    }
}
