use async_trait::async_trait;
use aws_config::Region;
use aws_sdk_sqs::config::SharedCredentialsProvider;

use crate::config::ConsumerConfig;
use crate::errors::ConsumerError;

/// A single received message, reduced to the two fields the pipeline needs.
///
/// Produced by a receive call and discarded after decode and delete.
#[derive(Debug, Clone)]
pub struct RawMessage {
    /// The message payload as delivered by the transport.
    pub body: Option<String>,

    /// One-time token identifying this delivery, required to delete the message.
    pub receipt_handle: Option<String>,
}

impl From<aws_sdk_sqs::types::Message> for RawMessage {
    fn from(message: aws_sdk_sqs::types::Message) -> Self {
        RawMessage {
            body: message.body,
            receipt_handle: message.receipt_handle,
        }
    }
}

/// The narrow queue-transport contract the consumer manager depends on.
///
/// The production implementation wraps the AWS SQS client; tests substitute
/// in-memory implementations to drive the polling pipeline without a live
/// queue.
#[async_trait]
pub trait QueueClient: Send + Sync {
    /// Lists the URLs of all queues visible to this client.
    async fn list_queues(&self) -> Result<Vec<String>, ConsumerError>;

    /// Long-polls one batch of messages from a queue.
    ///
    /// Blocks up to `config.wait_time_seconds`; an empty batch after the
    /// wait elapses is a normal result, not an error.
    async fn receive(
        &self,
        queue_url: &str,
        config: &ConsumerConfig,
    ) -> Result<Vec<RawMessage>, ConsumerError>;

    /// Deletes (acknowledges) a received message by its receipt handle.
    async fn delete(&self, queue_url: &str, receipt_handle: &str) -> Result<(), ConsumerError>;
}

/// [`QueueClient`] backed by the AWS SQS SDK.
#[derive(Clone)]
pub struct SqsQueueClient {
    client: aws_sdk_sqs::Client,
}

impl SqsQueueClient {
    pub fn new(client: aws_sdk_sqs::Client) -> Self {
        SqsQueueClient { client }
    }

    /// Creates a client using credentials and configuration from the environment.
    ///
    /// Loads AWS configuration from environment variables such as
    /// `AWS_ACCESS_KEY_ID`, `AWS_SECRET_ACCESS_KEY`, `AWS_REGION` and
    /// `AWS_PROFILE`.
    pub async fn from_env() -> Self {
        let config = aws_config::load_from_env().await;
        SqsQueueClient::new(aws_sdk_sqs::Client::new(&config))
    }

    /// Creates a client with explicitly provided credentials and region.
    ///
    /// Useful for applications that manage credentials dynamically or need
    /// different credentials than those in the environment.
    pub fn with_credentials(access_key_id: &str, secret_access_key: &str, region: &str) -> Self {
        let credentials = aws_sdk_sqs::config::Credentials::new(
            access_key_id,
            secret_access_key,
            None,
            None,
            "aws",
        );

        let shared_credentials = SharedCredentialsProvider::new(credentials);

        let config = aws_sdk_sqs::config::Builder::new()
            .region(Region::new(region.to_string()))
            .credentials_provider(shared_credentials)
            .build();

        SqsQueueClient::new(aws_sdk_sqs::Client::from_conf(config))
    }
}

#[async_trait]
impl QueueClient for SqsQueueClient {
    async fn list_queues(&self) -> Result<Vec<String>, ConsumerError> {
        let mut urls = Vec::new();
        let mut next_token = None;

        // list_queues is paginated; follow the token until exhausted.
        loop {
            let output = self
                .client
                .list_queues()
                .set_next_token(next_token)
                .send()
                .await
                .map_err(|e| ConsumerError::Receive {
                    queue_url: String::new(),
                    message: e.to_string(),
                })?;

            urls.extend(output.queue_urls.unwrap_or_default());

            next_token = output.next_token;
            if next_token.is_none() {
                break;
            }
        }

        Ok(urls)
    }

    async fn receive(
        &self,
        queue_url: &str,
        config: &ConsumerConfig,
    ) -> Result<Vec<RawMessage>, ConsumerError> {
        let output = self
            .client
            .receive_message()
            .queue_url(queue_url)
            .max_number_of_messages(config.max_number_of_messages)
            .wait_time_seconds(config.wait_time_seconds)
            .visibility_timeout(config.visibility_timeout_seconds)
            .send()
            .await
            .map_err(|e| ConsumerError::Receive {
                queue_url: queue_url.to_string(),
                message: e.to_string(),
            })?;

        Ok(output
            .messages
            .unwrap_or_default()
            .into_iter()
            .map(RawMessage::from)
            .collect())
    }

    async fn delete(&self, queue_url: &str, receipt_handle: &str) -> Result<(), ConsumerError> {
        self.client
            .delete_message()
            .queue_url(queue_url)
            .receipt_handle(receipt_handle)
            .send()
            .await
            .map_err(|e| ConsumerError::Delete {
                queue_url: queue_url.to_string(),
                message: e.to_string(),
            })?;

        Ok(())
    }
}
