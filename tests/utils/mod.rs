#![allow(dead_code)]

pub mod logging;
pub mod mock;
pub mod rand;

use std::thread;
use std::time::Duration;

use anyhow::Context;
use tokio::sync::{mpsc, watch};

use kafka_demo::config::{ConsumerSettings, ProducerSettings};
use kafka_demo::consumer::{ConsumerRunnable, ConsumerState};
use kafka_demo::error::DemoResult;
use kafka_demo::gate::CompletionGate;
use kafka_demo::record::Record;
use kafka_demo::shutdown::InterruptToken;

use crate::utils::rand::rand_test_group;

/// A consumer runnable moved to its own thread, with every handle a test
/// needs to observe and stop it.
pub struct RunningConsumer {
    pub interrupt: InterruptToken,
    pub gate: CompletionGate,
    pub state: watch::Receiver<ConsumerState>,
    pub records: mpsc::UnboundedReceiver<Record>,
    pub worker: thread::JoinHandle<DemoResult<u64>>,
}

impl RunningConsumer {
    /// Waits until the loop has subscribed and issued its first poll.
    pub async fn wait_until_polling(&mut self) -> anyhow::Result<()> {
        tokio::time::timeout(
            Duration::from_secs(10),
            self.state
                .wait_for(|s| !matches!(s, ConsumerState::Created | ConsumerState::Subscribed)),
        )
        .await
        .context("consumer never started polling")?
        .context("consumer state channel closed")?;
        Ok(())
    }

    /// Waits for the next printed record.
    pub async fn next_record(&mut self, timeout: Duration) -> Option<Record> {
        tokio::time::timeout(timeout, self.records.recv())
            .await
            .ok()
            .flatten()
    }

    /// Interrupts the loop and waits for the gate and the thread.
    pub async fn stop(self) -> anyhow::Result<u64> {
        self.interrupt.interrupt();
        tokio::time::timeout(Duration::from_secs(10), self.gate.wait())
            .await
            .context("completion gate not released")?;
        self.join()
    }

    pub fn join(self) -> anyhow::Result<u64> {
        let res = self
            .worker
            .join()
            .map_err(|_| anyhow::anyhow!("consumer thread panicked"))?;
        Ok(res?)
    }
}

pub fn consumer_settings(bootstrap_servers: &str, topic: &str) -> ConsumerSettings {
    ConsumerSettings {
        brokers: bootstrap_servers.to_string(),
        group_id: rand_test_group(),
        topic: topic.to_string(),
        ..ConsumerSettings::default()
    }
}

pub fn producer_settings(bootstrap_servers: &str, topic: &str, message: &str) -> ProducerSettings {
    ProducerSettings {
        brokers: bootstrap_servers.to_string(),
        topic: topic.to_string(),
        message: message.to_string(),
        ..ProducerSettings::default()
    }
}

/// Connects a consumer and starts its loop on a dedicated thread. Every
/// record it prints is forwarded to `RunningConsumer::records`.
pub fn spawn_consumer(settings: &ConsumerSettings) -> anyhow::Result<RunningConsumer> {
    let interrupt = InterruptToken::new();
    let gate = CompletionGate::new();
    let runnable = ConsumerRunnable::connect(settings, interrupt.clone(), gate.clone())
        .context("failed to create consumer")?;
    let state = runnable.state_watch();

    let (sender, records) = mpsc::unbounded_channel();
    let worker = thread::Builder::new()
        .name("consumer".into())
        .spawn(move || {
            runnable.run(|record| {
                let _ = sender.send(record.clone());
            })
        })
        .context("failed to spawn consumer thread")?;

    Ok(RunningConsumer {
        interrupt,
        gate,
        state,
        records,
        worker,
    })
}
