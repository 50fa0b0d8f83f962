//! Per-connection watch registry.
//!
//! Each `watch_slots` command spawns a forwarding task; the registry owns
//! the task handles and aborts them on `unwatch` or when the connection
//! ends.

use std::collections::HashMap;

use tokio::task::JoinHandle;

/// Manages the slot watches of a single WebSocket connection.
#[derive(Debug, Default)]
pub struct SubscriptionManager {
    watches: HashMap<String, JoinHandle<()>>,
}

impl SubscriptionManager {
    /// Creates a new empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers the forwarding task of a new watch.
    pub fn insert(&mut self, watch_id: String, task: JoinHandle<()>) {
        if let Some(previous) = self.watches.insert(watch_id, task) {
            previous.abort();
        }
    }

    /// Stops a watch. Returns `false` if the id is unknown.
    pub fn remove(&mut self, watch_id: &str) -> bool {
        match self.watches.remove(watch_id) {
            Some(task) => {
                task.abort();
                true
            }
            None => false,
        }
    }

    /// Returns the number of active watches.
    #[must_use]
    pub fn count(&self) -> usize {
        self.watches.len()
    }
}

impl Drop for SubscriptionManager {
    fn drop(&mut self) {
        for (_, task) in self.watches.drain() {
            task.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn idle_task() -> JoinHandle<()> {
        tokio::spawn(std::future::pending())
    }

    async fn finished(handle: &tokio::task::AbortHandle) -> bool {
        for _ in 0..50 {
            if handle.is_finished() {
                return true;
            }
            tokio::task::yield_now().await;
        }
        handle.is_finished()
    }

    #[tokio::test]
    async fn insert_and_remove() {
        let mut mgr = SubscriptionManager::new();
        mgr.insert("w1".to_string(), idle_task());
        assert_eq!(mgr.count(), 1);

        assert!(mgr.remove("w1"));
        assert!(!mgr.remove("w1"));
        assert_eq!(mgr.count(), 0);
    }

    #[tokio::test]
    async fn remove_aborts_the_task() {
        let mut mgr = SubscriptionManager::new();
        let task = idle_task();
        let abort = task.abort_handle();
        mgr.insert("w1".to_string(), task);

        mgr.remove("w1");
        assert!(finished(&abort).await);
    }

    #[tokio::test]
    async fn drop_aborts_every_task() {
        let mut mgr = SubscriptionManager::new();
        let first = idle_task();
        let second = idle_task();
        let handles = [first.abort_handle(), second.abort_handle()];
        mgr.insert("w1".to_string(), first);
        mgr.insert("w2".to_string(), second);

        drop(mgr);
        for handle in &handles {
            assert!(finished(handle).await);
        }
    }
}
