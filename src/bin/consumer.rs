//! Prints every record of a topic until Ctrl-C or SIGTERM.

use std::process;
use std::thread;
use std::time::Duration;

use clap::Parser;

use kafka_demo::config::{self, parse_override, ConsumerSettings, OffsetReset};
use kafka_demo::consumer::ConsumerRunnable;
use kafka_demo::error::{DemoError, DemoResult};
use kafka_demo::gate::CompletionGate;
use kafka_demo::get_rdkafka_version;
use kafka_demo::log::{error, info, setup_logger};
use kafka_demo::shutdown::{termination_signal, InterruptToken, ShutdownCoordinator};

/// Threaded command line consumer.
#[derive(Parser)]
#[command(version, about = "Prints the records of a Kafka topic until interrupted")]
struct Args {
    /// Broker list in kafka format
    #[arg(short, long, default_value = config::DEFAULT_BROKERS)]
    brokers: String,
    /// Consumer group id
    #[arg(short, long, default_value = config::DEFAULT_GROUP_ID)]
    group_id: String,
    /// Topic to subscribe to
    #[arg(short, long, default_value = config::DEFAULT_TOPIC)]
    topic: String,
    /// Where to start without a committed offset: earliest or latest
    #[arg(long, default_value = "earliest", value_parser = parse_offset_reset)]
    offset_reset: OffsetReset,
    /// Poll timeout in milliseconds
    #[arg(long, default_value_t = 100)]
    poll_timeout_ms: u64,
    /// Maximum number of records returned by one poll
    #[arg(long, default_value_t = config::DEFAULT_MAX_BATCH)]
    max_batch: usize,
    /// Extra librdkafka property, repeatable (example: 'client.id=demo')
    #[arg(short = 'X', value_name = "KEY=VALUE", value_parser = parse_property)]
    property: Vec<(String, String)>,
    /// Configure the logging format (example: 'rdkafka=trace')
    #[arg(long)]
    log_conf: Option<String>,
}

fn parse_offset_reset(s: &str) -> Result<OffsetReset, String> {
    s.parse().map_err(|e: DemoError| e.to_string())
}

fn parse_property(s: &str) -> Result<(String, String), String> {
    parse_override(s).map_err(|e| e.to_string())
}

async fn consume(settings: ConsumerSettings) -> DemoResult<u64> {
    let interrupt = InterruptToken::new();
    let gate = CompletionGate::new();
    let runnable = ConsumerRunnable::connect(&settings, interrupt.clone(), gate.clone())?;

    let worker = thread::Builder::new()
        .name("consumer".into())
        .spawn(move || runnable.run(|record| println!("{}", record)))
        .map_err(|e| DemoError::Thread(e.to_string()))?;

    let coordinator = ShutdownCoordinator::new(interrupt, gate.clone());
    tokio::spawn(async move {
        if let Err(e) = coordinator.run(termination_signal()).await {
            error!("Shutdown coordinator failed: {}", e);
        }
    });

    gate.wait().await;
    info!("Application is closing");

    worker
        .join()
        .map_err(|_| DemoError::Thread("consumer thread panicked".into()))?
}

#[tokio::main]
async fn main() {
    let args = Args::parse();
    setup_logger(true, args.log_conf.as_deref());

    let (version_n, version_s) = get_rdkafka_version();
    info!("rd_kafka_version: 0x{:08x}, {}", version_n, version_s);

    let settings = ConsumerSettings {
        brokers: args.brokers,
        group_id: args.group_id,
        topic: args.topic,
        offset_reset: args.offset_reset,
        poll_timeout: Duration::from_millis(args.poll_timeout_ms),
        max_batch: args.max_batch,
        overrides: args.property,
    };

    match consume(settings).await {
        Ok(count) => info!("Consumed {} records", count),
        Err(e) => {
            error!("Consumer failed: {}", e);
            process::exit(1);
        }
    }
}
