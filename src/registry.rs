use std::collections::HashMap;

use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use crate::errors::ConsumerError;

/// Capability to stop one polling loop.
///
/// The production handle wraps a [`CancellationToken`] and cannot fail;
/// the trait seam exists so shutdown-failure isolation can be exercised.
pub trait Cancel: Send + Sync {
    fn cancel(&self) -> Result<(), ConsumerError>;
}

/// [`Cancel`] backed by a cooperative cancellation token.
pub struct TokenHandle(pub CancellationToken);

impl Cancel for TokenHandle {
    fn cancel(&self) -> Result<(), ConsumerError> {
        self.0.cancel();
        Ok(())
    }
}

/// Tracks the active subscription for each queue URL.
///
/// The registry enforces the central invariant of the consumer manager:
/// at most one polling loop exists per queue URL. All access goes through
/// one mutex, so a concurrent check-and-insert for the same URL cannot
/// start a second loop, and shutdown iteration cannot race an insert.
#[derive(Default)]
pub struct SubscriptionRegistry {
    subscriptions: Mutex<HashMap<String, Box<dyn Cancel>>>,
}

impl SubscriptionRegistry {
    pub fn new() -> Self {
        SubscriptionRegistry {
            subscriptions: Mutex::new(HashMap::new()),
        }
    }

    /// Ensures a subscription exists for a queue URL.
    ///
    /// If the URL is already subscribed this is a no-op and the factory is
    /// never invoked. Otherwise the factory is called under the registry
    /// lock to start the loop, and its cancellation handle is recorded.
    ///
    /// Returns whether a new subscription was created.
    pub async fn ensure_subscribed<F>(&self, queue_url: &str, loop_factory: F) -> bool
    where
        F: FnOnce() -> Box<dyn Cancel>,
    {
        let mut subscriptions = self.subscriptions.lock().await;

        if subscriptions.contains_key(queue_url) {
            info!(queue_url = %queue_url, "subscription already exists for {}", queue_url);
            return false;
        }

        info!(queue_url = %queue_url, "creating subscription for {}", queue_url);
        subscriptions.insert(queue_url.to_string(), loop_factory());
        true
    }

    /// Cancels every registered subscription.
    ///
    /// A failure cancelling one subscription is logged and does not prevent
    /// cancelling the rest. Entries are left in place; this runs while the
    /// process is terminating.
    pub async fn cancel_all(&self) {
        let subscriptions = self.subscriptions.lock().await;

        for (queue_url, handle) in subscriptions.iter() {
            info!(queue_url = %queue_url, "canceling subscription for {}", queue_url);
            match handle.cancel() {
                Ok(()) => {
                    info!(queue_url = %queue_url, "subscription successfully canceled for {}", queue_url)
                }
                Err(e) => {
                    error!(queue_url = %queue_url, error = %e, "subscription failed to cancel for {}", queue_url)
                }
            }
        }
    }

    /// Number of registered subscriptions.
    pub async fn len(&self) -> usize {
        self.subscriptions.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.subscriptions.lock().await.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct RecordingHandle {
        cancelled: Arc<AtomicUsize>,
        fail: bool,
    }

    impl Cancel for RecordingHandle {
        fn cancel(&self) -> Result<(), ConsumerError> {
            self.cancelled.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(ConsumerError::Cancel {
                    queue_url: "test".to_string(),
                    message: "simulated cancel failure".to_string(),
                });
            }
            Ok(())
        }
    }

    fn handle(cancelled: Arc<AtomicUsize>, fail: bool) -> Box<dyn Cancel> {
        Box::new(RecordingHandle { cancelled, fail })
    }

    #[tokio::test]
    async fn ensure_subscribed_is_idempotent() {
        let registry = SubscriptionRegistry::new();
        let factory_calls = Arc::new(AtomicUsize::new(0));

        for _ in 0..5 {
            let calls = factory_calls.clone();
            registry
                .ensure_subscribed("queue-a", || {
                    calls.fetch_add(1, Ordering::SeqCst);
                    handle(Arc::new(AtomicUsize::new(0)), false)
                })
                .await;
        }

        assert_eq!(factory_calls.load(Ordering::SeqCst), 1);
        assert_eq!(registry.len().await, 1);
    }

    #[tokio::test]
    async fn concurrent_subscriptions_produce_one_handle() {
        let registry = Arc::new(SubscriptionRegistry::new());
        let factory_calls = Arc::new(AtomicUsize::new(0));

        let mut tasks = Vec::new();
        for _ in 0..16 {
            let registry = registry.clone();
            let calls = factory_calls.clone();
            tasks.push(tokio::spawn(async move {
                registry
                    .ensure_subscribed("queue-a", || {
                        calls.fetch_add(1, Ordering::SeqCst);
                        handle(Arc::new(AtomicUsize::new(0)), false)
                    })
                    .await
            }));
        }

        let mut created = 0;
        for task in tasks {
            if task.await.unwrap() {
                created += 1;
            }
        }

        assert_eq!(created, 1);
        assert_eq!(factory_calls.load(Ordering::SeqCst), 1);
        assert_eq!(registry.len().await, 1);
    }

    #[tokio::test]
    async fn cancel_all_isolates_failures() {
        let registry = SubscriptionRegistry::new();
        let cancelled_a = Arc::new(AtomicUsize::new(0));
        let cancelled_b = Arc::new(AtomicUsize::new(0));
        let cancelled_c = Arc::new(AtomicUsize::new(0));

        for (url, counter, fail) in [
            ("queue-a", &cancelled_a, false),
            ("queue-b", &cancelled_b, true),
            ("queue-c", &cancelled_c, false),
        ] {
            let counter = counter.clone();
            registry
                .ensure_subscribed(url, move || handle(counter, fail))
                .await;
        }

        registry.cancel_all().await;

        assert_eq!(cancelled_a.load(Ordering::SeqCst), 1);
        assert_eq!(cancelled_b.load(Ordering::SeqCst), 1);
        assert_eq!(cancelled_c.load(Ordering::SeqCst), 1);
    }
}
