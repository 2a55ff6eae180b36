use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, trace, warn};

use crate::client::{QueueClient, RawMessage};
use crate::config::ConsumerConfig;
use crate::dispatch::DispatchTable;
use crate::envelope::Envelope;

/// What happened to a single message on its way through the pipeline.
///
/// An explicit result per item, so callers and tests can assert on
/// outcomes instead of inspecting log output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageOutcome {
    /// Decoded, dispatched and deleted.
    Processed,

    /// The body failed to decode; the message was left undeleted for
    /// redelivery after its visibility timeout.
    DecodeFailed,

    /// A handler rejected the envelope; the message was left undeleted.
    HandlerFailed,

    /// Dispatch succeeded but the delete call failed; the message will be
    /// redelivered and processed again.
    DeleteFailed,
}

/// Runs the consumption loop for one queue until cancelled.
///
/// Each iteration long-polls one batch, pushes every message through
/// decode, dispatch and delete, then repeats. Cancellation is cooperative:
/// it is checked before each receive, so a receive already in flight
/// finishes first (its wait bound caps shutdown latency). A receive error
/// terminates the loop for this queue only.
pub async fn run(
    client: Arc<dyn QueueClient>,
    queue_url: String,
    config: ConsumerConfig,
    dispatch: Arc<DispatchTable>,
    cancel_token: CancellationToken,
) {
    loop {
        if cancel_token.is_cancelled() {
            info!(queue_url = %queue_url, "queue {} polling stopped", queue_url);
            return;
        }

        debug!(queue_url = %queue_url, "fetching messages for queue : {}", queue_url);

        let messages = match client.receive(&queue_url, &config).await {
            Ok(messages) => messages,
            Err(e) => {
                error!(queue_url = %queue_url, error = %e, "queue {} error", queue_url);
                return;
            }
        };

        debug!(
            queue_url = %queue_url,
            count = messages.len(),
            "received messages for queue : {} : {}",
            queue_url,
            messages.len()
        );

        for message in messages {
            let outcome =
                process_message(client.as_ref(), &queue_url, &dispatch, &message).await;
            trace!(queue_url = %queue_url, outcome = ?outcome, "queue {} message processed", queue_url);
        }
    }
}

/// Pushes one message through decode, dispatch and delete.
pub(crate) async fn process_message(
    client: &dyn QueueClient,
    queue_url: &str,
    dispatch: &DispatchTable,
    message: &RawMessage,
) -> MessageOutcome {
    let Some(body) = message.body.as_deref() else {
        warn!(queue_url = %queue_url, "received a message with no body");
        return MessageOutcome::DecodeFailed;
    };

    let envelope = match Envelope::decode(body) {
        Ok(envelope) => envelope,
        Err(e) => {
            // Left undeleted; the visibility timeout will redeliver it.
            warn!(queue_url = %queue_url, error = %e, "error parsing message : {}", body);
            return MessageOutcome::DecodeFailed;
        }
    };

    if let Err(e) = dispatch.dispatch(&envelope).await {
        warn!(queue_url = %queue_url, error = %e, "error handling message : {}", body);
        return MessageOutcome::HandlerFailed;
    }

    let Some(receipt_handle) = message.receipt_handle.as_deref() else {
        warn!(queue_url = %queue_url, "received a message with no receipt handle");
        return MessageOutcome::DeleteFailed;
    };

    if let Err(e) = client.delete(queue_url, receipt_handle).await {
        warn!(queue_url = %queue_url, error = %e, "error deleting message");
        return MessageOutcome::DeleteFailed;
    }

    MessageOutcome::Processed
}
