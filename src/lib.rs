//! # AWS SQS Consumer Manager
//!
//! An asynchronous consumer manager that maintains exactly one continuous
//! long-poll consumption loop per SQS queue, decodes each message into a
//! typed envelope, dispatches on its detail-type, and deletes successfully
//! processed messages.
//!
//! ## Features
//!
//! - One tokio task per subscribed queue, long polling with configurable
//!   batch size, wait time and visibility timeout
//! - Idempotent queue discovery: repeated discovery never duplicates a loop
//! - Detail-type dispatch table extensible with custom handlers
//! - Per-message error isolation: decode failures leave the message for
//!   redelivery, delete failures rely on the visibility timeout
//! - Cooperative shutdown that cancels every loop without interrupting an
//!   in-flight receive
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use sqs_consumer_manager::{
//!     client::SqsQueueClient, config::ConsumerConfig, dispatch::DispatchTable,
//!     manager::ConsumerManager,
//! };
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = Arc::new(SqsQueueClient::from_env().await);
//!     let manager = ConsumerManager::new(
//!         client,
//!         ConsumerConfig::from_env(),
//!         DispatchTable::with_defaults(),
//!     );
//!
//!     // Start one polling loop per discovered (and admitted) queue.
//!     let queues = manager.discover().await?;
//!     println!("consuming from {} queues", queues.len());
//!
//!     tokio::signal::ctrl_c().await?;
//!     manager.shutdown().await;
//!
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod config;
pub mod dispatch;
pub mod envelope;
pub mod errors;
pub mod manager;
pub mod poller;
pub mod registry;

pub use client::{QueueClient, RawMessage, SqsQueueClient};
pub use config::ConsumerConfig;
pub use dispatch::{DispatchTable, Handler};
pub use envelope::Envelope;
pub use errors::ConsumerError;
pub use manager::ConsumerManager;
pub use poller::MessageOutcome;
pub use registry::SubscriptionRegistry;
