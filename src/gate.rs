//! Single-fire completion signal.
//!
//! The consumer thread releases the gate once its connection is closed; the
//! main flow and the shutdown coordinator wait for it. A gate is released at
//! most once and never reset.

use std::sync::{Arc, Mutex};

use futures_channel::oneshot;
use futures_util::future::{FutureExt, Shared};

struct Inner {
    sender: Mutex<Option<oneshot::Sender<()>>>,
    receiver: Shared<oneshot::Receiver<()>>,
}

/// A countdown gate with a count of one.
///
/// Clones share the same gate.
#[derive(Clone)]
pub struct CompletionGate {
    inner: Arc<Inner>,
}

impl CompletionGate {
    /// Creates a gate that has not been released yet.
    pub fn new() -> CompletionGate {
        let (sender, receiver) = oneshot::channel();
        CompletionGate {
            inner: Arc::new(Inner {
                sender: Mutex::new(Some(sender)),
                receiver: receiver.shared(),
            }),
        }
    }

    /// Releases the gate.
    ///
    /// Returns `true` for the call that actually released it, `false` for
    /// every later call.
    pub fn count_down(&self) -> bool {
        let sender = match self.inner.sender.lock() {
            Ok(mut guard) => guard.take(),
            Err(poisoned) => poisoned.into_inner().take(),
        };
        match sender {
            Some(sender) => {
                // The gate itself holds a receiver, so the send cannot fail.
                let _ = sender.send(());
                true
            }
            None => false,
        }
    }

    /// Returns the remaining count: `1` before release, `0` after.
    pub fn count(&self) -> usize {
        if self.is_released() {
            0
        } else {
            1
        }
    }

    /// Returns whether [`count_down`](CompletionGate::count_down) has been called.
    pub fn is_released(&self) -> bool {
        match self.inner.sender.lock() {
            Ok(guard) => guard.is_none(),
            Err(poisoned) => poisoned.into_inner().is_none(),
        }
    }

    /// Waits until the gate is released. Any number of tasks may wait.
    pub async fn wait(&self) {
        // The sender lives in `inner` next to the receiver, so it is either
        // used or still alive: the receiver never observes cancellation.
        let _ = self.inner.receiver.clone().await;
    }
}

impl Default for CompletionGate {
    fn default() -> CompletionGate {
        CompletionGate::new()
    }
}

#[cfg(test)]
mod tests {
    use std::thread;
    use std::time::Duration;

    use tokio::time::timeout;

    use super::*;

    #[test]
    fn test_count_down_only_once() {
        let gate = CompletionGate::new();
        assert_eq!(gate.count(), 1);
        assert!(!gate.is_released());

        assert!(gate.count_down());
        assert_eq!(gate.count(), 0);
        assert!(!gate.count_down());
        assert!(!gate.clone().count_down());
        assert_eq!(gate.count(), 0);
    }

    #[tokio::test]
    async fn test_wait_after_release_returns_immediately() {
        let gate = CompletionGate::new();
        gate.count_down();
        timeout(Duration::from_millis(100), gate.wait())
            .await
            .expect("wait did not return");
    }

    #[tokio::test]
    async fn test_all_waiters_are_released_from_another_thread() {
        let gate = CompletionGate::new();
        let first = tokio::spawn({
            let gate = gate.clone();
            async move { gate.wait().await }
        });
        let second = tokio::spawn({
            let gate = gate.clone();
            async move { gate.wait().await }
        });

        assert!(timeout(Duration::from_millis(50), gate.wait()).await.is_err());

        let releaser = gate.clone();
        thread::spawn(move || {
            thread::sleep(Duration::from_millis(20));
            releaser.count_down();
        });

        for waiter in [first, second] {
            timeout(Duration::from_secs(5), waiter)
                .await
                .expect("waiter not released")
                .expect("waiter panicked");
        }
    }
}
