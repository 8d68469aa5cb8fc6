//! A one-shot Kafka producer and a gracefully stoppable polling consumer,
//! built on [rdkafka].
//!
//! All protocol work (batching, retries, partition assignment, offset
//! commits) is left to librdkafka. This crate adds:
//!
//! - [`producer::send_one`], which sends a single record and flushes it
//!   before releasing the producer;
//! - [`consumer::ConsumerRunnable`], a subscribe/poll/print loop meant to run
//!   on its own thread, stopped through an [`shutdown::InterruptToken`];
//! - [`gate::CompletionGate`], released once the consumer connection is
//!   closed;
//! - [`shutdown::ShutdownCoordinator`], which turns a termination signal into
//!   an interrupt and waits for the gate.
//!
//! ```no_run
//! use std::thread;
//!
//! use kafka_demo::config::ConsumerSettings;
//! use kafka_demo::consumer::ConsumerRunnable;
//! use kafka_demo::gate::CompletionGate;
//! use kafka_demo::shutdown::{termination_signal, InterruptToken, ShutdownCoordinator};
//!
//! # async fn example() -> kafka_demo::error::DemoResult<()> {
//! let interrupt = InterruptToken::new();
//! let gate = CompletionGate::new();
//! let runnable =
//!     ConsumerRunnable::connect(&ConsumerSettings::default(), interrupt.clone(), gate.clone())?;
//! let worker = thread::spawn(move || runnable.run(|record| println!("{}", record)));
//!
//! ShutdownCoordinator::new(interrupt, gate)
//!     .run(termination_signal())
//!     .await?;
//! # let _ = worker.join();
//! # Ok(())
//! # }
//! ```
//!
//! [rdkafka]: https://docs.rs/rdkafka

pub mod config;
pub mod consumer;
pub mod error;
pub mod gate;
pub mod log;
pub mod producer;
pub mod record;
pub mod shutdown;

pub use crate::config::{ConsumerSettings, OffsetReset, ProducerSettings};
pub use crate::consumer::{ConsumerRunnable, ConsumerState, PollOutcome, RecordSource};
pub use crate::error::{DemoError, DemoResult};
pub use crate::gate::CompletionGate;
pub use crate::producer::{send_one, Delivery};
pub use crate::record::Record;
pub use crate::shutdown::{termination_signal, InterruptToken, ShutdownCoordinator};

// Re-export rdkafka version helper for the binaries.
pub use rdkafka::util::get_rdkafka_version;
