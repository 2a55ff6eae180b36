use thiserror::Error;

/// Error types for the SQS consumer manager.
///
/// Each variant corresponds to one failure mode of the polling pipeline.
/// None of these abort the process: a receive failure terminates a single
/// queue's loop, everything else is recovered locally.
#[derive(Debug, Error)]
pub enum ConsumerError {
    /// The long-poll receive call failed (transport/connectivity fault).
    ///
    /// This terminates the polling loop for the affected queue; other
    /// queues keep polling.
    #[error("failed to receive messages from {queue_url}: {message}")]
    Receive { queue_url: String, message: String },

    /// A message body could not be decoded into an envelope.
    ///
    /// The message is left undeleted so the visibility timeout redelivers it.
    #[error("failed to decode message body: {0}")]
    Decode(#[from] serde_json::Error),

    /// Deleting (acknowledging) a processed message failed.
    ///
    /// Not retried within the current iteration; the message is redelivered
    /// after its visibility timeout and processed again.
    #[error("failed to delete message from {queue_url}: {message}")]
    Delete { queue_url: String, message: String },

    /// Cancelling a subscription during shutdown failed.
    ///
    /// Isolated per subscription; remaining subscriptions are still cancelled.
    #[error("failed to cancel subscription for {queue_url}: {message}")]
    Cancel { queue_url: String, message: String },

    /// A registered handler reported a failure for a dispatched envelope.
    #[error("handler error: {0}")]
    Handler(String),
}
