//! Graceful shutdown of the consumer.
//!
//! The consumer loop receives an [`InterruptToken`] when it is built and
//! checks it at every poll boundary. The [`ShutdownCoordinator`] trips the
//! token when the process is asked to terminate and then waits for the
//! consumer to release its [`CompletionGate`].

use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::error::{DemoError, DemoResult};
use crate::gate::CompletionGate;
use crate::log::info;

/// Cooperative cancellation flag shared between the consumer loop and
/// whoever wants to stop it.
#[derive(Clone, Debug, Default)]
pub struct InterruptToken {
    interrupted: Arc<AtomicBool>,
}

impl InterruptToken {
    pub fn new() -> InterruptToken {
        InterruptToken::default()
    }

    /// Requests the consumer loop to stop. Calling it again has no effect.
    ///
    /// Returns `true` if this call set the flag.
    pub fn interrupt(&self) -> bool {
        !self.interrupted.swap(true, Ordering::SeqCst)
    }

    pub fn is_interrupted(&self) -> bool {
        self.interrupted.load(Ordering::SeqCst)
    }
}

/// Stops the consumer when the process is asked to terminate.
pub struct ShutdownCoordinator {
    interrupt: InterruptToken,
    gate: CompletionGate,
}

impl ShutdownCoordinator {
    pub fn new(interrupt: InterruptToken, gate: CompletionGate) -> ShutdownCoordinator {
        ShutdownCoordinator { interrupt, gate }
    }

    /// Waits for `signal`, interrupts the consumer once and blocks until the
    /// completion gate is released.
    ///
    /// There is no timeout on the final wait: a consumer that never reaches a
    /// poll boundary keeps the coordinator blocked.
    pub async fn run<F>(self, signal: F) -> DemoResult<()>
    where
        F: Future<Output = DemoResult<()>>,
    {
        signal.await?;
        info!("Caught shutdown hook");
        self.interrupt.interrupt();
        self.gate.wait().await;
        Ok(())
    }
}

/// Resolves when the process receives Ctrl-C, or SIGTERM on Unix.
pub async fn termination_signal() -> DemoResult<()> {
    let ctrl_c = async { tokio::signal::ctrl_c().await.map_err(DemoError::Signal) };

    tokio::select! {
        res = ctrl_c => res,
        res = terminate() => res,
    }
}

#[cfg(unix)]
async fn terminate() -> DemoResult<()> {
    use tokio::signal::unix::{signal, SignalKind};

    signal(SignalKind::terminate())
        .map_err(DemoError::Signal)?
        .recv()
        .await;
    Ok(())
}

#[cfg(not(unix))]
async fn terminate() -> DemoResult<()> {
    std::future::pending().await
}
