//! Settings for the producer and the consumer.
//!
//! Both programs talk to librdkafka through a flat string-to-string property
//! map ([`ClientConfig`]). The typed settings below hold the handful of
//! properties this crate cares about, validate them, and render the property
//! map; anything else can be passed through as an override.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use rdkafka::config::ClientConfig;

use crate::error::{DemoError, DemoResult};

// librdkafka configuration keys.
pub const BOOTSTRAP_SERVERS: &str = "bootstrap.servers";
pub const GROUP_ID: &str = "group.id";
pub const AUTO_OFFSET_RESET: &str = "auto.offset.reset";
pub const ENABLE_PARTITION_EOF: &str = "enable.partition.eof";
pub const SESSION_TIMEOUT_MS: &str = "session.timeout.ms";
pub const MESSAGE_TIMEOUT_MS: &str = "message.timeout.ms";

pub const DEFAULT_BROKERS: &str = "127.0.0.1:9092";
pub const DEFAULT_TOPIC: &str = "mt-topic";
pub const DEFAULT_MESSAGE: &str = "hello world";
pub const DEFAULT_GROUP_ID: &str = "my-first-app";
pub const DEFAULT_POLL_TIMEOUT: Duration = Duration::from_millis(100);
pub const DEFAULT_MAX_BATCH: usize = 500;
pub const DEFAULT_FLUSH_TIMEOUT: Duration = Duration::from_secs(10);

const SESSION_TIMEOUT: &str = "6000";
const MESSAGE_TIMEOUT: &str = "5000";

/// Where a consumer group without a committed offset starts reading.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub enum OffsetReset {
    /// Start from the oldest record still retained.
    #[default]
    Earliest,
    /// Only read records produced after the subscription.
    Latest,
}

impl OffsetReset {
    /// Returns the librdkafka property value.
    pub fn as_str(&self) -> &'static str {
        match self {
            OffsetReset::Earliest => "earliest",
            OffsetReset::Latest => "latest",
        }
    }
}

impl fmt::Display for OffsetReset {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OffsetReset {
    type Err = DemoError;

    fn from_str(s: &str) -> DemoResult<OffsetReset> {
        match s.to_ascii_lowercase().as_str() {
            "earliest" => Ok(OffsetReset::Earliest),
            "latest" => Ok(OffsetReset::Latest),
            other => Err(DemoError::Config(format!(
                "unknown offset reset policy '{}', expected 'earliest' or 'latest'",
                other
            ))),
        }
    }
}

/// Parses a `key=value` pass-through property.
pub fn parse_override(s: &str) -> DemoResult<(String, String)> {
    match s.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() => {
            Ok((key.trim().to_string(), value.trim().to_string()))
        }
        _ => Err(DemoError::Config(format!(
            "invalid property '{}', expected key=value",
            s
        ))),
    }
}

fn require_non_empty(what: &str, value: &str) -> DemoResult<()> {
    if value.trim().is_empty() {
        Err(DemoError::Config(format!("{} must not be empty", what)))
    } else {
        Ok(())
    }
}

fn apply_overrides(config: &mut ClientConfig, overrides: &[(String, String)]) {
    for (key, value) in overrides {
        config.set(key, value);
    }
}

/// Settings of the one-shot producer.
#[derive(Clone, Debug)]
pub struct ProducerSettings {
    pub brokers: String,
    pub topic: String,
    pub message: String,
    /// Upper bound for the flush performed before the producer is released.
    pub flush_timeout: Duration,
    pub overrides: Vec<(String, String)>,
}

impl Default for ProducerSettings {
    fn default() -> ProducerSettings {
        ProducerSettings {
            brokers: DEFAULT_BROKERS.to_string(),
            topic: DEFAULT_TOPIC.to_string(),
            message: DEFAULT_MESSAGE.to_string(),
            flush_timeout: DEFAULT_FLUSH_TIMEOUT,
            overrides: Vec::new(),
        }
    }
}

impl ProducerSettings {
    /// Checks the settings without touching the network.
    pub fn validate(&self) -> DemoResult<()> {
        require_non_empty("broker address", &self.brokers)?;
        require_non_empty("topic", &self.topic)?;
        require_non_empty("message", &self.message)
    }

    /// Renders the librdkafka property map.
    pub fn client_config(&self) -> ClientConfig {
        let mut config = ClientConfig::new();
        config
            .set(BOOTSTRAP_SERVERS, &self.brokers)
            .set(MESSAGE_TIMEOUT_MS, MESSAGE_TIMEOUT);
        apply_overrides(&mut config, &self.overrides);
        config
    }
}

/// Settings of the polling consumer.
#[derive(Clone, Debug)]
pub struct ConsumerSettings {
    pub brokers: String,
    pub group_id: String,
    pub topic: String,
    pub offset_reset: OffsetReset,
    /// How long a single poll waits for the first record of a batch.
    pub poll_timeout: Duration,
    /// Upper bound on the records returned by one poll.
    pub max_batch: usize,
    pub overrides: Vec<(String, String)>,
}

impl Default for ConsumerSettings {
    fn default() -> ConsumerSettings {
        ConsumerSettings {
            brokers: DEFAULT_BROKERS.to_string(),
            group_id: DEFAULT_GROUP_ID.to_string(),
            topic: DEFAULT_TOPIC.to_string(),
            offset_reset: OffsetReset::default(),
            poll_timeout: DEFAULT_POLL_TIMEOUT,
            max_batch: DEFAULT_MAX_BATCH,
            overrides: Vec::new(),
        }
    }
}

impl ConsumerSettings {
    /// Checks the settings without touching the network.
    pub fn validate(&self) -> DemoResult<()> {
        require_non_empty("broker address", &self.brokers)?;
        require_non_empty("group id", &self.group_id)?;
        require_non_empty("topic", &self.topic)?;
        if self.max_batch == 0 {
            return Err(DemoError::Config("max batch must be at least 1".into()));
        }
        Ok(())
    }

    /// Renders the librdkafka property map.
    pub fn client_config(&self) -> ClientConfig {
        let mut config = ClientConfig::new();
        config
            .set(BOOTSTRAP_SERVERS, &self.brokers)
            .set(GROUP_ID, &self.group_id)
            .set(AUTO_OFFSET_RESET, self.offset_reset.as_str())
            .set(ENABLE_PARTITION_EOF, "false")
            .set(SESSION_TIMEOUT_MS, SESSION_TIMEOUT);
        apply_overrides(&mut config, &self.overrides);
        config
    }
}
