use std::collections::HashMap;

use async_trait::async_trait;
use tracing::{debug, info};

use crate::envelope::{DETAIL_TYPE_CHIME_MEDIA_PIPELINE_STATE_CHANGE, Envelope};
use crate::errors::ConsumerError;

/// Handler for one recognized detail-type.
#[async_trait]
pub trait Handler: Send + Sync {
    async fn handle(&self, envelope: &Envelope) -> Result<(), ConsumerError>;
}

/// Routes decoded envelopes to handlers by their detail-type.
///
/// New detail-types are supported by registering a handler, not by editing
/// the polling loop. Envelopes with no registered handler still flow
/// through the pipeline (and get deleted); they are simply logged.
#[derive(Default)]
pub struct DispatchTable {
    handlers: HashMap<String, Box<dyn Handler>>,
}

impl DispatchTable {
    pub fn new() -> Self {
        DispatchTable {
            handlers: HashMap::new(),
        }
    }

    /// A table with the media pipeline state change handler pre-registered.
    pub fn with_defaults() -> Self {
        let mut table = DispatchTable::new();
        table.register(
            DETAIL_TYPE_CHIME_MEDIA_PIPELINE_STATE_CHANGE,
            MediaPipelineStateChangeHandler,
        );
        table
    }

    /// Registers a handler for a detail-type, replacing any previous one.
    pub fn register<H>(&mut self, detail_type: &str, handler: H)
    where
        H: Handler + 'static,
    {
        self.handlers
            .insert(detail_type.to_string(), Box::new(handler));
    }

    /// Dispatches an envelope to the handler registered for its detail-type.
    ///
    /// Every envelope is logged at debug level regardless of whether a
    /// handler is registered for it.
    pub async fn dispatch(&self, envelope: &Envelope) -> Result<(), ConsumerError> {
        debug!(detail_type = %envelope.detail_type, "message : {:?}", envelope);

        if let Some(handler) = self.handlers.get(&envelope.detail_type) {
            handler.handle(envelope).await?;
        }

        Ok(())
    }
}

/// Logs the pipeline identifier carried by media pipeline state change events.
pub struct MediaPipelineStateChangeHandler;

#[async_trait]
impl Handler for MediaPipelineStateChangeHandler {
    async fn handle(&self, envelope: &Envelope) -> Result<(), ConsumerError> {
        if let Some(pipeline_id) = envelope.media_pipeline_id() {
            info!(media_pipeline_id = %pipeline_id, "pipeline : {}", pipeline_id);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingHandler {
        calls: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl Handler for CountingHandler {
        async fn handle(&self, _envelope: &Envelope) -> Result<(), ConsumerError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    fn envelope(detail_type: &str) -> Envelope {
        Envelope {
            detail_type: detail_type.to_string(),
            detail: serde_json::Value::Null,
        }
    }

    #[tokio::test]
    async fn routes_to_registered_handler() {
        let calls = Arc::new(AtomicUsize::new(0));
        let mut table = DispatchTable::new();
        table.register(
            "Chime Media Pipeline State Change",
            CountingHandler {
                calls: calls.clone(),
            },
        );

        table
            .dispatch(&envelope("Chime Media Pipeline State Change"))
            .await
            .unwrap();

        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn unrecognized_detail_type_passes_through() {
        let calls = Arc::new(AtomicUsize::new(0));
        let mut table = DispatchTable::new();
        table.register(
            "Chime Media Pipeline State Change",
            CountingHandler {
                calls: calls.clone(),
            },
        );

        table
            .dispatch(&envelope("Some Other Event"))
            .await
            .unwrap();

        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }
}
