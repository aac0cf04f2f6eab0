//! Pending-call table
//!
//! Every request written to the daemon has an entry here until its response
//! arrives, the transport closes, or the write itself fails. The reader task
//! completes entries by id; callers await the oneshot receiver handed out at
//! registration.
//!
//! The table and its closed flag sit behind one lock. Once the transport has
//! closed, [`RequestManager::register`] refuses new entries, so a call can
//! never be left waiting on a connection nobody is reading.
//!
//! Ids come from an atomic counter starting at 1 and are never reused for
//! the life of the manager.

use clnwire_core::{Error, Result, RpcResponse};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::{oneshot, Mutex};

/// A call waiting for its response
pub struct PendingCall {
    /// Command the call was made for
    pub method: String,
    /// Channel to deliver the outcome
    pub tx: oneshot::Sender<Result<RpcResponse>>,
    /// When the call was registered
    pub started: Instant,
}

/// What happened to a response handed to [`RequestManager::complete`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Completion {
    /// The waiting caller received it
    Delivered { method: String },
    /// The call was registered but its caller had stopped waiting
    /// (deadline expired or future dropped)
    Abandoned { method: String, age: Duration },
    /// No call is registered under the id
    Unmatched,
}

#[derive(Default)]
struct PendingTable {
    calls: HashMap<u64, PendingCall>,
    closed: bool,
}

/// Shared table of in-flight calls
#[derive(Clone)]
pub struct RequestManager {
    table: Arc<Mutex<PendingTable>>,
    counter: Arc<AtomicU64>,
}

impl RequestManager {
    pub fn new() -> Self {
        Self {
            table: Arc::new(Mutex::new(PendingTable::default())),
            counter: Arc::new(AtomicU64::new(1)),
        }
    }

    /// Allocate the next request id
    pub fn next_id(&self) -> u64 {
        self.counter.fetch_add(1, Ordering::Relaxed)
    }

    /// Register a pending call under `id`
    ///
    /// Fails with [`Error::TransportClosed`] once the table has been closed.
    pub async fn register(
        &self,
        id: u64,
        method: impl Into<String>,
    ) -> Result<oneshot::Receiver<Result<RpcResponse>>> {
        let (tx, rx) = oneshot::channel();
        let mut table = self.table.lock().await;
        if table.closed {
            return Err(Error::TransportClosed);
        }
        table.calls.insert(
            id,
            PendingCall {
                method: method.into(),
                tx,
                started: Instant::now(),
            },
        );
        Ok(rx)
    }

    /// Deliver `response` to the call registered under `id`, removing it
    pub async fn complete(&self, id: u64, response: RpcResponse) -> Completion {
        let Some(pending) = self.table.lock().await.calls.remove(&id) else {
            return Completion::Unmatched;
        };
        match pending.tx.send(Ok(response)) {
            Ok(()) => Completion::Delivered {
                method: pending.method,
            },
            Err(_) => Completion::Abandoned {
                method: pending.method,
                age: pending.started.elapsed(),
            },
        }
    }

    /// Fail the call registered under `id`
    ///
    /// Used when the call's line could not be written in full.
    pub async fn fail(&self, id: u64, error: Error) -> bool {
        match self.table.lock().await.calls.remove(&id) {
            Some(pending) => {
                let _ = pending.tx.send(Err(error));
                true
            }
            None => false,
        }
    }

    /// Drop the entry for `id` without delivering anything
    pub async fn remove(&self, id: u64) -> bool {
        self.table.lock().await.calls.remove(&id).is_some()
    }

    /// Fail every pending call and refuse new registrations
    ///
    /// Returns how many calls were failed.
    pub async fn fail_all(&self, error: Error) -> usize {
        let mut table = self.table.lock().await;
        table.closed = true;
        let count = table.calls.len();
        for (_, pending) in table.calls.drain() {
            let _ = pending.tx.send(Err(error.clone()));
        }
        count
    }

    pub async fn pending_count(&self) -> usize {
        self.table.lock().await.calls.len()
    }

    pub async fn is_closed(&self) -> bool {
        self.table.lock().await.closed
    }
}

impl Default for RequestManager {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_ids_start_at_one_and_increase() {
        let manager = RequestManager::new();
        assert_eq!(manager.next_id(), 1);
        assert_eq!(manager.next_id(), 2);

        let shared = manager.clone();
        assert_eq!(shared.next_id(), 3);
    }

    #[tokio::test]
    async fn test_register_and_complete() {
        let manager = RequestManager::new();

        let rx = manager.register(1, "invoice").await.unwrap();
        assert_eq!(manager.pending_count().await, 1);

        let completion = manager.complete(1, RpcResponse::success(1, json!(42))).await;
        assert_eq!(
            completion,
            Completion::Delivered {
                method: "invoice".to_string()
            }
        );
        assert_eq!(manager.pending_count().await, 0);

        let response = rx.await.unwrap().unwrap();
        assert_eq!(response.result, Some(json!(42)));
    }

    #[tokio::test]
    async fn test_complete_unknown_id() {
        let manager = RequestManager::new();
        let _rx = manager.register(1, "invoice").await.unwrap();

        assert_eq!(
            manager.complete(2, RpcResponse::success(2, json!(null))).await,
            Completion::Unmatched
        );
        assert_eq!(manager.pending_count().await, 1);
    }

    #[tokio::test]
    async fn test_complete_after_receiver_dropped() {
        let manager = RequestManager::new();
        let rx = manager.register(1, "txprepare").await.unwrap();
        drop(rx);

        let completion = manager.complete(1, RpcResponse::success(1, json!({}))).await;
        assert!(matches!(completion, Completion::Abandoned { ref method, .. } if method == "txprepare"));
        assert_eq!(manager.pending_count().await, 0);
    }

    #[tokio::test]
    async fn test_fail_request() {
        let manager = RequestManager::new();
        let rx = manager.register(1, "fundchannel").await.unwrap();

        assert!(manager.fail(1, Error::TransportClosed).await);
        assert!(!manager.fail(1, Error::TransportClosed).await);
        assert!(matches!(rx.await.unwrap(), Err(Error::TransportClosed)));
    }

    #[tokio::test]
    async fn test_remove_drops_sender() {
        let manager = RequestManager::new();
        let rx = manager.register(1, "setchannel").await.unwrap();

        assert!(manager.remove(1).await);
        assert!(rx.await.is_err());
    }

    #[tokio::test]
    async fn test_fail_all_closes_table() {
        let manager = RequestManager::new();

        let rx1 = manager.register(1, "invoice").await.unwrap();
        let rx2 = manager.register(2, "checkmessage").await.unwrap();
        assert_eq!(manager.pending_count().await, 2);

        assert_eq!(manager.fail_all(Error::TransportClosed).await, 2);

        assert_eq!(manager.pending_count().await, 0);
        assert!(manager.is_closed().await);
        assert!(matches!(rx1.await.unwrap(), Err(Error::TransportClosed)));
        assert!(matches!(rx2.await.unwrap(), Err(Error::TransportClosed)));

        assert!(matches!(
            manager.register(3, "invoice").await,
            Err(Error::TransportClosed)
        ));
    }
}
