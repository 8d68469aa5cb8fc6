//! Error manipulations.

use std::{error, fmt, io};

use rdkafka::error::KafkaError;

/// Result type used throughout the crate.
pub type DemoResult<T> = Result<T, DemoError>;

/// Represents all possible errors of the producer and consumer programs.
///
/// Errors raised by librdkafka are carried unchanged; check the wrapped
/// [`KafkaError`] for details.
pub enum DemoError {
    /// Invalid settings, detected before any connection is made.
    Config(String),
    /// The client library reported an error.
    Kafka(KafkaError),
    /// The broker rejected or never acknowledged the record.
    Delivery(KafkaError),
    /// The connection was already closed.
    Closed,
    /// Installing or waiting on a process signal handler failed.
    Signal(io::Error),
    /// A worker thread could not be spawned or panicked.
    Thread(String),
}

impl fmt::Debug for DemoError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            DemoError::Config(ref err) => write!(f, "DemoError (Config error: {})", err),
            DemoError::Kafka(ref err) => write!(f, "DemoError ({:?})", err),
            DemoError::Delivery(ref err) => write!(f, "DemoError (Delivery error: {:?})", err),
            DemoError::Closed => write!(f, "DemoError (Connection closed)"),
            DemoError::Signal(ref err) => write!(f, "DemoError (Signal error: {:?})", err),
            DemoError::Thread(ref err) => write!(f, "DemoError (Thread error: {})", err),
        }
    }
}

impl fmt::Display for DemoError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            DemoError::Config(ref err) => write!(f, "Config error: {}", err),
            DemoError::Kafka(ref err) => write!(f, "Kafka error: {}", err),
            DemoError::Delivery(ref err) => write!(f, "Delivery error: {}", err),
            DemoError::Closed => write!(f, "Connection closed"),
            DemoError::Signal(ref err) => write!(f, "Signal error: {}", err),
            DemoError::Thread(ref err) => write!(f, "Thread error: {}", err),
        }
    }
}

impl error::Error for DemoError {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match self {
            DemoError::Kafka(err) | DemoError::Delivery(err) => Some(err),
            DemoError::Signal(err) => Some(err),
            _ => None,
        }
    }
}

impl From<KafkaError> for DemoError {
    fn from(err: KafkaError) -> DemoError {
        DemoError::Kafka(err)
    }
}

impl DemoError {
    /// Returns if the error comes from invalid settings.
    pub fn is_config(&self) -> bool {
        matches!(self, DemoError::Config(_))
    }

    /// Returns the [`KafkaError`] underlying this error, if any.
    pub fn kafka_error(&self) -> Option<&KafkaError> {
        match self {
            DemoError::Kafka(err) | DemoError::Delivery(err) => Some(err),
            _ => None,
        }
    }
}
