//! Sends one record and exits.

use std::process;
use std::time::Duration;

use clap::Parser;

use kafka_demo::config::{self, parse_override, ProducerSettings};
use kafka_demo::get_rdkafka_version;
use kafka_demo::log::{error, info, setup_logger};
use kafka_demo::producer::send_one;

/// One-shot command line producer.
#[derive(Parser)]
#[command(version, about = "Sends a single message to a Kafka topic")]
struct Args {
    /// Broker list in kafka format
    #[arg(short, long, default_value = config::DEFAULT_BROKERS)]
    brokers: String,
    /// Destination topic
    #[arg(short, long, default_value = config::DEFAULT_TOPIC)]
    topic: String,
    /// Message body
    #[arg(short, long, default_value = config::DEFAULT_MESSAGE)]
    message: String,
    /// Maximum time to wait for the broker acknowledgement, in milliseconds
    #[arg(long, default_value_t = 10_000)]
    flush_timeout_ms: u64,
    /// Extra librdkafka property, repeatable (example: 'acks=all')
    #[arg(short = 'X', value_name = "KEY=VALUE", value_parser = parse_property)]
    property: Vec<(String, String)>,
    /// Configure the logging format (example: 'rdkafka=trace')
    #[arg(long)]
    log_conf: Option<String>,
}

fn parse_property(s: &str) -> Result<(String, String), String> {
    parse_override(s).map_err(|e| e.to_string())
}

fn main() {
    let args = Args::parse();
    setup_logger(true, args.log_conf.as_deref());

    let (version_n, version_s) = get_rdkafka_version();
    info!("rd_kafka_version: 0x{:08x}, {}", version_n, version_s);

    let settings = ProducerSettings {
        brokers: args.brokers,
        topic: args.topic,
        message: args.message,
        flush_timeout: Duration::from_millis(args.flush_timeout_ms),
        overrides: args.property,
    };

    match send_one(&settings) {
        Ok(delivery) => info!(
            "Message sent to {} [{}] at offset {}",
            delivery.topic, delivery.partition, delivery.offset
        ),
        Err(e) => {
            error!("Error sending message: {}", e);
            process::exit(1);
        }
    }
}
