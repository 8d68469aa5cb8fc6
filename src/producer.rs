//! One-shot producer.
//!
//! [`send_one`] builds a producer, enqueues a single record, flushes it and
//! releases the producer. The delivery report is collected by the producer
//! context while the flush polls the client, so the caller learns where the
//! record landed or why it did not.

use std::sync::Mutex;

use rdkafka::client::ClientContext;
use rdkafka::error::{KafkaError, KafkaResult, RDKafkaErrorCode};
use rdkafka::message::Message;
use rdkafka::producer::{BaseProducer, BaseRecord, DeliveryResult, Producer, ProducerContext};

use crate::config::ProducerSettings;
use crate::error::{DemoError, DemoResult};
use crate::log::{debug, info, warn};

/// Where the broker stored the record.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Delivery {
    pub topic: String,
    pub partition: i32,
    pub offset: i64,
}

/// Producer context that keeps the last delivery report.
#[derive(Default)]
pub struct ReportingContext {
    report: Mutex<Option<KafkaResult<Delivery>>>,
}

impl ReportingContext {
    fn take_report(&self) -> Option<KafkaResult<Delivery>> {
        match self.report.lock() {
            Ok(mut guard) => guard.take(),
            Err(poisoned) => poisoned.into_inner().take(),
        }
    }
}

impl ClientContext for ReportingContext {}

impl ProducerContext for ReportingContext {
    type DeliveryOpaque = ();

    fn delivery(&self, delivery_result: &DeliveryResult<'_>, _: Self::DeliveryOpaque) {
        let report = match delivery_result {
            Ok(message) => {
                info!(
                    "Delivered to {} [{}] at offset {}",
                    message.topic(),
                    message.partition(),
                    message.offset()
                );
                Ok(Delivery {
                    topic: message.topic().to_string(),
                    partition: message.partition(),
                    offset: message.offset(),
                })
            }
            Err((e, message)) => {
                warn!("Delivery to {} failed: {}", message.topic(), e);
                Err(e.clone())
            }
        };
        match self.report.lock() {
            Ok(mut guard) => *guard = Some(report),
            Err(poisoned) => *poisoned.into_inner() = Some(report),
        }
    }
}

pub type ReportingProducer = BaseProducer<ReportingContext>;

/// Sends `settings.message` to `settings.topic` and waits for the broker's
/// acknowledgement, bounded by `settings.flush_timeout`.
///
/// The record has no key. Nothing is retried here beyond what librdkafka
/// does internally.
pub fn send_one(settings: &ProducerSettings) -> DemoResult<Delivery> {
    settings.validate()?;

    let producer: ReportingProducer = settings
        .client_config()
        .create_with_context(ReportingContext::default())?;

    let record: BaseRecord<'_, (), str> =
        BaseRecord::to(&settings.topic).payload(settings.message.as_str());
    producer.send(record).map_err(|(e, _)| DemoError::Kafka(e))?;
    debug!("Record enqueued for {}", settings.topic);

    // Release only after the record left the local queue.
    producer.flush(settings.flush_timeout)?;

    match producer.context().take_report() {
        Some(Ok(delivery)) => Ok(delivery),
        Some(Err(e)) => Err(DemoError::Delivery(e)),
        None => Err(DemoError::Delivery(KafkaError::MessageProduction(
            RDKafkaErrorCode::MessageTimedOut,
        ))),
    }
}
