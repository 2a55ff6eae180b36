use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::oneshot;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::client::QueueClient;
use crate::config::ConsumerConfig;
use crate::dispatch::DispatchTable;
use crate::errors::ConsumerError;
use crate::poller;
use crate::registry::{SubscriptionRegistry, TokenHandle};

/// Owns the consumer lifecycle: queue discovery, subscription and shutdown.
///
/// On discovery it lists the queues visible to the client, applies the
/// admission filter from the configuration, and ensures one polling loop
/// per admitted queue. Discovery is idempotent; calling it again never
/// duplicates a loop. On shutdown it cancels every loop exactly once.
pub struct ConsumerManager {
    client: Arc<dyn QueueClient>,
    config: ConsumerConfig,
    dispatch: Arc<DispatchTable>,
    registry: Arc<SubscriptionRegistry>,
    shut_down: AtomicBool,
}

impl ConsumerManager {
    pub fn new(client: Arc<dyn QueueClient>, config: ConsumerConfig, dispatch: DispatchTable) -> Self {
        ConsumerManager {
            client,
            config,
            dispatch: Arc::new(dispatch),
            registry: Arc::new(SubscriptionRegistry::new()),
            shut_down: AtomicBool::new(false),
        }
    }

    /// Lists all queue URLs and ensures each admitted one has a polling loop.
    ///
    /// Returns the full discovered list, including queues the admission
    /// filter rejected.
    pub async fn discover(&self) -> Result<Vec<String>, ConsumerError> {
        let urls = self.client.list_queues().await?;

        for url in &urls {
            if !self.config.admits(url) {
                info!(queue_url = %url, "subscription ignored for : {}", url);
                continue;
            }

            self.registry
                .ensure_subscribed(url, || {
                    let token = CancellationToken::new();
                    tokio::spawn(poller::run(
                        self.client.clone(),
                        url.clone(),
                        self.config.clone(),
                        self.dispatch.clone(),
                        token.clone(),
                    ));
                    Box::new(TokenHandle(token))
                })
                .await;
        }

        Ok(urls)
    }

    /// Cancels every polling loop. Safe to call more than once; only the
    /// first call does anything.
    pub async fn shutdown(&self) {
        if self.shut_down.swap(true, Ordering::SeqCst) {
            warn!("shutdown already performed, ignoring");
            return;
        }

        let subscriptions = self.registry.len().await;
        info!(subscriptions, "shutting down consumer manager");
        self.registry.cancel_all().await;
        info!("consumer manager shut down");
    }

    /// Waits for a teardown signal, then shuts down.
    ///
    /// A dropped sender counts as a signal, so the manager still tears
    /// down if the signalling side goes away.
    pub async fn shutdown_on(&self, signal: oneshot::Receiver<()>) {
        let _ = signal.await;
        self.shutdown().await;
    }

    /// Number of active subscriptions.
    pub async fn subscription_count(&self) -> usize {
        self.registry.len().await
    }
}
