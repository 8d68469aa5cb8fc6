//! The polling consumer loop.
//!
//! A [`ConsumerRunnable`] owns one consumer connection and drives it through
//! the states listed in [`ConsumerState`]. It is meant to run on a dedicated
//! thread: [`ConsumerRunnable::run`] blocks, polling the subscribed topic with
//! a short timeout and handing every record to a sink, until the
//! [`InterruptToken`] it was built with is tripped. It then closes the
//! connection and releases its [`CompletionGate`].
//!
//! Only the interrupt is treated as an expected way out of the loop. Consumer
//! errors librdkafka recovers from on its own (an unknown topic, a broker
//! going away) are logged and polling continues. A fatal client error ends
//! `run` with an error, after the connection has been closed and the gate
//! released, so that nobody waits on the gate forever.

use std::time::Duration;

use rdkafka::client::ClientContext;
use rdkafka::config::ClientConfig;
use rdkafka::consumer::{BaseConsumer, Consumer, ConsumerContext, Rebalance};
use rdkafka::error::{KafkaError, KafkaResult};
use rdkafka::TopicPartitionList;
use tokio::sync::watch;

use crate::config::ConsumerSettings;
use crate::error::{DemoError, DemoResult};
use crate::gate::CompletionGate;
use crate::log::{debug, error, info, warn};
use crate::record::Record;
use crate::shutdown::InterruptToken;

/// Lifecycle of a [`ConsumerRunnable`].
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum ConsumerState {
    /// Connection built, no subscription yet.
    Created,
    /// Subscribed to the topic, not polled yet.
    Subscribed,
    /// Waiting for the next batch.
    Polling,
    /// Handing a batch to the sink.
    Printing,
    /// Interrupt observed, closing.
    ShuttingDown,
    /// Connection released. Terminal.
    Closed,
}

/// Result of a single poll.
#[derive(Debug, Eq, PartialEq)]
pub enum PollOutcome {
    /// At least one record, in the order the client delivered them.
    Data(Vec<Record>),
    /// Nothing arrived within the poll timeout.
    Timeout,
    /// The loop was interrupted; no more data will be returned.
    Canceled,
}

/// Anything the consumer loop can read records from.
///
/// Dropping the source releases the underlying connection.
pub trait RecordSource {
    /// Subscribes to a single topic.
    fn subscribe_to(&self, topic: &str) -> KafkaResult<()>;

    /// Waits up to `timeout` for a first record, then appends it to `batch`
    /// together with the records already buffered, up to `max_records`.
    ///
    /// Records appended before an error stay in `batch`. Nothing appended
    /// and no error means the timeout elapsed.
    fn poll_batch(
        &self,
        timeout: Duration,
        max_records: usize,
        batch: &mut Vec<Record>,
    ) -> KafkaResult<()>;
}

impl<C: ConsumerContext + 'static> RecordSource for BaseConsumer<C> {
    fn subscribe_to(&self, topic: &str) -> KafkaResult<()> {
        Consumer::subscribe(self, &[topic])
    }

    fn poll_batch(
        &self,
        timeout: Duration,
        max_records: usize,
        batch: &mut Vec<Record>,
    ) -> KafkaResult<()> {
        let mut timeout = timeout;
        let mut polled = 0;
        while polled < max_records {
            match self.poll(timeout) {
                None => break,
                Some(Ok(message)) => batch.push(Record::from_message(&message)),
                Some(Err(e)) => return Err(e),
            }
            polled += 1;
            timeout = Duration::ZERO;
        }
        Ok(())
    }
}

/// Consumer context that logs group rebalances and offset commits.
pub struct LoggingContext;

impl ClientContext for LoggingContext {}

impl ConsumerContext for LoggingContext {
    fn pre_rebalance(&self, _: &BaseConsumer<Self>, rebalance: &Rebalance) {
        info!("Pre rebalance {:?}", rebalance);
    }

    fn post_rebalance(&self, _: &BaseConsumer<Self>, rebalance: &Rebalance) {
        info!("Post rebalance {:?}", rebalance);
    }

    fn commit_callback(&self, result: KafkaResult<()>, _offsets: &TopicPartitionList) {
        match result {
            Ok(_) => debug!("Offsets committed successfully"),
            Err(e) => warn!("Error while committing offsets: {}", e),
        };
    }
}

/// The consumer used by the binary.
pub type LoggingConsumer = BaseConsumer<LoggingContext>;

/// Creates an unsubscribed consumer connection from the settings.
pub fn create_consumer(config: &ClientConfig) -> DemoResult<LoggingConsumer> {
    config
        .create_with_context::<_, LoggingConsumer>(LoggingContext)
        .map_err(DemoError::from)
}

/// Subscribe, poll, print; until interrupted.
pub struct ConsumerRunnable<S: RecordSource = LoggingConsumer> {
    source: Option<S>,
    topic: String,
    poll_timeout: Duration,
    max_batch: usize,
    interrupt: InterruptToken,
    gate: CompletionGate,
    state: watch::Sender<ConsumerState>,
    delivered: u64,
    // Fatal error seen after part of a batch was read; reported on the next
    // poll, once that batch has been printed.
    pending_error: Option<KafkaError>,
}

impl ConsumerRunnable<LoggingConsumer> {
    /// Validates the settings and opens the consumer connection.
    pub fn connect(
        settings: &ConsumerSettings,
        interrupt: InterruptToken,
        gate: CompletionGate,
    ) -> DemoResult<ConsumerRunnable<LoggingConsumer>> {
        settings.validate()?;
        let consumer = create_consumer(&settings.client_config())?;
        Ok(ConsumerRunnable::with_source(consumer, settings, interrupt, gate))
    }
}

impl<S: RecordSource> ConsumerRunnable<S> {
    /// Wraps an already open source.
    pub fn with_source(
        source: S,
        settings: &ConsumerSettings,
        interrupt: InterruptToken,
        gate: CompletionGate,
    ) -> ConsumerRunnable<S> {
        let (state, _) = watch::channel(ConsumerState::Created);
        ConsumerRunnable {
            source: Some(source),
            topic: settings.topic.clone(),
            poll_timeout: settings.poll_timeout,
            max_batch: settings.max_batch.max(1),
            interrupt,
            gate,
            state,
            delivered: 0,
            pending_error: None,
        }
    }

    pub fn state(&self) -> ConsumerState {
        *self.state.borrow()
    }

    /// Returns a receiver that observes every state change, including the
    /// ones made after the runnable moved to its thread.
    pub fn state_watch(&self) -> watch::Receiver<ConsumerState> {
        self.state.subscribe()
    }

    pub fn interrupt_token(&self) -> &InterruptToken {
        &self.interrupt
    }

    pub fn completion_gate(&self) -> &CompletionGate {
        &self.gate
    }

    /// Number of records handed to the sink so far.
    pub fn delivered(&self) -> u64 {
        self.delivered
    }

    fn set_state(&self, state: ConsumerState) {
        let previous = self.state.send_replace(state);
        if previous != state {
            debug!("Consumer state {:?} -> {:?}", previous, state);
        }
    }

    /// Registers interest in the configured topic.
    pub fn subscribe(&mut self) -> DemoResult<()> {
        let source = self.source.as_ref().ok_or(DemoError::Closed)?;
        source.subscribe_to(&self.topic)?;
        info!("Subscribed to topic {}", self.topic);
        self.set_state(ConsumerState::Subscribed);
        Ok(())
    }

    /// Polls once.
    ///
    /// An interrupt requested before the call, or while the previous batch
    /// was being printed, is reported as [`PollOutcome::Canceled`]. Fails with
    /// [`DemoError::Closed`] once the connection is closed.
    ///
    /// Non-fatal consumer errors are logged and do not fail the poll. A fatal
    /// error fails it, unless records were read first: those are returned and
    /// the error is reported by the next call.
    pub fn poll(&mut self) -> DemoResult<PollOutcome> {
        let source = self.source.as_ref().ok_or(DemoError::Closed)?;
        if self.interrupt.is_interrupted() {
            self.set_state(ConsumerState::ShuttingDown);
            return Ok(PollOutcome::Canceled);
        }
        if let Some(e) = self.pending_error.take() {
            return Err(DemoError::Kafka(e));
        }
        self.set_state(ConsumerState::Polling);
        let mut batch = Vec::new();
        match source.poll_batch(self.poll_timeout, self.max_batch, &mut batch) {
            Ok(()) => {}
            Err(e) if !e.is_fatal() => warn!("Kafka error: {}", e),
            Err(e) if batch.is_empty() => return Err(DemoError::Kafka(e)),
            Err(e) => self.pending_error = Some(e),
        }
        if batch.is_empty() {
            Ok(PollOutcome::Timeout)
        } else {
            Ok(PollOutcome::Data(batch))
        }
    }

    /// Releases the connection and the completion gate.
    ///
    /// Returns `true` if this call closed the connection; closing again is a
    /// no-op and never releases the gate a second time.
    pub fn close(&mut self) -> bool {
        match self.source.take() {
            Some(source) => {
                self.set_state(ConsumerState::ShuttingDown);
                drop(source);
                self.set_state(ConsumerState::Closed);
                self.gate.count_down();
                info!("Consumer closed after {} records", self.delivered);
                true
            }
            None => false,
        }
    }

    /// Runs the loop to completion, handing every record to `sink`.
    ///
    /// Returns the number of records delivered once the loop was interrupted.
    /// The connection is closed and the gate released on every exit path.
    pub fn run<F>(mut self, mut sink: F) -> DemoResult<u64>
    where
        F: FnMut(&Record),
    {
        let res = self.run_loop(&mut sink);
        if let Err(ref e) = res {
            error!("Consumer loop failed: {}", e);
        }
        self.close();
        res.map(|_| self.delivered)
    }

    fn run_loop<F>(&mut self, sink: &mut F) -> DemoResult<()>
    where
        F: FnMut(&Record),
    {
        if self.state() == ConsumerState::Created {
            self.subscribe()?;
        }
        loop {
            match self.poll()? {
                PollOutcome::Data(batch) => {
                    self.set_state(ConsumerState::Printing);
                    for record in &batch {
                        sink(record);
                        self.delivered += 1;
                    }
                }
                PollOutcome::Timeout => {}
                PollOutcome::Canceled => {
                    info!("Received shutdown signal");
                    return Ok(());
                }
            }
        }
    }
}

impl<S: RecordSource> Drop for ConsumerRunnable<S> {
    fn drop(&mut self) {
        // Dropping an unclosed runnable still releases the waiters.
        self.close();
    }
}
