use std::collections::HashSet;
use std::env;

/// Configuration for the SQS consumer manager.
///
/// This struct defines the long-poll parameters used by every polling loop
/// and the admission allow-set applied at queue discovery time.
///
/// # Fields
/// - `max_number_of_messages`: The maximum number of messages to receive in a single request.
/// - `wait_time_seconds`: The wait time for long polling, in seconds.
/// - `visibility_timeout_seconds`: How long a received message stays hidden from other consumers.
/// - `allowed_queues`: Queue URLs eligible for subscription; `None` admits every discovered queue.
#[derive(Debug, Clone)]
pub struct ConsumerConfig {
    /// The maximum number of messages to receive in a single request.
    pub max_number_of_messages: i32,

    /// The wait time for long polling, in seconds.
    pub wait_time_seconds: i32,

    /// How long a received message stays hidden from other consumers, in seconds.
    pub visibility_timeout_seconds: i32,

    /// Queue URLs eligible for subscription. `None` admits every discovered queue.
    pub allowed_queues: Option<HashSet<String>>,
}

impl Default for ConsumerConfig {
    fn default() -> Self {
        ConsumerConfig {
            max_number_of_messages: 10,
            wait_time_seconds: 10,
            visibility_timeout_seconds: 10,
            allowed_queues: None,
        }
    }
}

impl ConsumerConfig {
    /// Builds a configuration from environment variables, falling back to
    /// defaults for any variable that is unset or unparsable.
    ///
    /// Recognized variables:
    /// - `SQS_CONSUMER_MAX_MESSAGES`
    /// - `SQS_CONSUMER_WAIT_TIME_SECONDS`
    /// - `SQS_CONSUMER_VISIBILITY_TIMEOUT_SECONDS`
    /// - `SQS_CONSUMER_ALLOWED_QUEUES` (comma-separated queue URLs; unset admits all)
    pub fn from_env() -> Self {
        let defaults = ConsumerConfig::default();

        ConsumerConfig {
            max_number_of_messages: env_i32(
                "SQS_CONSUMER_MAX_MESSAGES",
                defaults.max_number_of_messages,
            ),
            wait_time_seconds: env_i32(
                "SQS_CONSUMER_WAIT_TIME_SECONDS",
                defaults.wait_time_seconds,
            ),
            visibility_timeout_seconds: env_i32(
                "SQS_CONSUMER_VISIBILITY_TIMEOUT_SECONDS",
                defaults.visibility_timeout_seconds,
            ),
            allowed_queues: env::var("SQS_CONSUMER_ALLOWED_QUEUES").ok().map(|raw| {
                raw.split(',')
                    .map(str::trim)
                    .filter(|url| !url.is_empty())
                    .map(str::to_string)
                    .collect()
            }),
        }
    }

    /// Returns whether a discovered queue URL passes the admission filter.
    ///
    /// This is a scoping control for which queues get consumption loops,
    /// not a security boundary.
    pub fn admits(&self, queue_url: &str) -> bool {
        match &self.allowed_queues {
            Some(allowed) => allowed.contains(queue_url),
            None => true,
        }
    }
}

fn env_i32(key: &str, default: i32) -> i32 {
    env::var(key)
        .ok()
        .and_then(|raw| raw.parse().ok())
        .unwrap_or(default)
}
