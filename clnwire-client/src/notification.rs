//! Routing of daemon notifications
//!
//! Besides responses, the daemon may push id-less notifications over the
//! same stream: `message` carries log-style text about a running command and
//! `progress` reports how far a long command has got. Both are only sent
//! once the connection has asked for them with `notifications`.
//!
//! Handlers are registered per notification method. A notification with no
//! handler is dropped after a debug log.
//!
//! # Examples
//!
//! ```rust
//! use clnwire_client::NotificationHandler;
//! use clnwire_core::Notification;
//!
//! # async fn example() {
//! let handler = NotificationHandler::new();
//! handler
//!     .register("progress", |notification: Notification| async move {
//!         println!("progress: {:?}", notification.params);
//!     })
//!     .await;
//! assert!(handler.has_handler("progress").await);
//! # }
//! ```

use clnwire_core::Notification;
use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Notification method for free-form messages about a running command
pub const MESSAGE: &str = "message";
/// Notification method for progress of a running command
pub const PROGRESS: &str = "progress";

/// Type for notification handler functions
pub type NotificationFn =
    Arc<dyn Fn(Notification) -> Pin<Box<dyn Future<Output = ()> + Send>> + Send + Sync>;

/// Registry of notification handlers, keyed by method
#[derive(Clone)]
pub struct NotificationHandler {
    handlers: Arc<Mutex<HashMap<String, NotificationFn>>>,
}

impl NotificationHandler {
    pub fn new() -> Self {
        Self {
            handlers: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Register a handler for a notification method, replacing any earlier one
    pub async fn register<F, Fut>(&self, method: impl Into<String>, handler: F)
    where
        F: Fn(Notification) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let handler: NotificationFn = Arc::new(move |notification| Box::pin(handler(notification)));
        self.handlers.lock().await.insert(method.into(), handler);
    }

    /// Run the handler for `notification`, if one is registered
    ///
    /// Returns whether a handler ran.
    pub async fn handle(&self, notification: Notification) -> bool {
        let handler = self.handlers.lock().await.get(&notification.method).cloned();

        match handler {
            Some(handler) => {
                handler(notification).await;
                true
            }
            None => {
                tracing::debug!(method = %notification.method, "no handler for notification");
                false
            }
        }
    }

    pub async fn has_handler(&self, method: &str) -> bool {
        self.handlers.lock().await.contains_key(method)
    }

    pub async fn unregister(&self, method: &str) -> bool {
        self.handlers.lock().await.remove(method).is_some()
    }

    /// Methods with a registered handler
    pub async fn methods(&self) -> Vec<String> {
        self.handlers.lock().await.keys().cloned().collect()
    }
}

impl Default for NotificationHandler {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::atomic::{AtomicU64, Ordering};

    #[tokio::test]
    async fn test_notification_handler() {
        let handler = NotificationHandler::new();
        let seen = Arc::new(AtomicU64::new(0));
        let seen_clone = Arc::clone(&seen);

        handler
            .register(PROGRESS, move |notification| {
                let seen = Arc::clone(&seen_clone);
                async move {
                    let num = notification.params.and_then(|p| p["num"].as_u64()).unwrap_or(0);
                    seen.store(num, Ordering::SeqCst);
                }
            })
            .await;

        assert!(handler.has_handler(PROGRESS).await);

        let notification = Notification::new(PROGRESS, Some(json!({"num": 3, "total": 10})));
        assert!(handler.handle(notification).await);
        assert_eq!(seen.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_unhandled_notification() {
        let handler = NotificationHandler::new();
        assert!(!handler.handle(Notification::new(MESSAGE, None)).await);
    }

    #[tokio::test]
    async fn test_unregister() {
        let handler = NotificationHandler::new();

        handler.register(MESSAGE, |_| async {}).await;
        assert!(handler.has_handler(MESSAGE).await);

        assert!(handler.unregister(MESSAGE).await);
        assert!(!handler.has_handler(MESSAGE).await);
        assert!(!handler.unregister(MESSAGE).await);
    }

    #[tokio::test]
    async fn test_multiple_handlers() {
        let handler = NotificationHandler::new();

        handler.register(MESSAGE, |_| async {}).await;
        handler.register(PROGRESS, |_| async {}).await;

        let mut methods = handler.methods().await;
        methods.sort();
        assert_eq!(methods, [MESSAGE, PROGRESS]);
    }
}
