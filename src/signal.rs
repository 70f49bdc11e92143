//! One-shot completion signal
//!
//! The server's main task parks on a [`CompletionWaiter`] while the accept loop
//! holds the matching [`CompletionSignal`]. The signal moves from pending to
//! signaled once; a second attempt is reported as
//! [`HandoffError::AlreadySignaled`] instead of panicking.

use crate::error::{HandoffError, Result};
use std::sync::Mutex;
use tokio::sync::oneshot;
use tracing::debug;

/// Sending half, shared with whoever services the request
#[derive(Debug)]
pub struct CompletionSignal<T> {
    sender: Mutex<Option<oneshot::Sender<T>>>,
}

/// Receiving half, owned by the main task
#[derive(Debug)]
pub struct CompletionWaiter<T> {
    receiver: oneshot::Receiver<T>,
}

/// Create a pending signal and its waiter
pub fn completion_pair<T>() -> (CompletionSignal<T>, CompletionWaiter<T>) {
    let (tx, rx) = oneshot::channel();
    (
        CompletionSignal {
            sender: Mutex::new(Some(tx)),
        },
        CompletionWaiter { receiver: rx },
    )
}

impl<T> CompletionSignal<T> {
    /// Move pending -> signaled, handing `value` to the waiter
    pub fn signal(&self, value: T) -> Result<()> {
        let sender = self
            .sender
            .lock()
            .map_err(|e| HandoffError::Other(format!("Completion lock poisoned: {}", e)))?
            .take()
            .ok_or(HandoffError::AlreadySignaled)?;

        // The transition happened even if nobody is left to observe it
        if sender.send(value).is_err() {
            debug!("Completion signaled after the waiter was dropped");
        }
        Ok(())
    }

    /// Whether the signal has already fired
    pub fn is_signaled(&self) -> bool {
        match self.sender.lock() {
            Ok(guard) => guard.is_none(),
            Err(_) => true,
        }
    }
}

impl<T> CompletionWaiter<T> {
    /// Park until the signal fires
    pub async fn wait(self) -> Result<T> {
        self.receiver.await.map_err(|_| {
            HandoffError::Other("Completion signal dropped without firing".to_string())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_signal_delivers_value() {
        let (signal, waiter) = completion_pair();
        assert!(!signal.is_signaled());

        signal.signal(7u32).unwrap();
        assert!(signal.is_signaled());
        assert_eq!(waiter.wait().await.unwrap(), 7);
    }

    #[tokio::test]
    async fn test_double_signal_is_an_error() {
        let (signal, _waiter) = completion_pair();
        signal.signal(()).unwrap();

        let second = signal.signal(());
        assert!(matches!(second, Err(HandoffError::AlreadySignaled)));
    }

    #[tokio::test]
    async fn test_signal_without_waiter_still_transitions() {
        let (signal, waiter) = completion_pair::<()>();
        drop(waiter);

        signal.signal(()).unwrap();
        assert!(signal.is_signaled());
    }

    #[tokio::test]
    async fn test_waiter_errors_when_signal_dropped() {
        let (signal, waiter) = completion_pair::<()>();
        drop(signal);
        assert!(waiter.wait().await.is_err());
    }

    #[tokio::test]
    async fn test_waiter_stays_pending() {
        let (_signal, waiter) = completion_pair::<()>();
        let waited = tokio::time::timeout(Duration::from_millis(50), waiter.wait()).await;
        assert!(waited.is_err());
    }
}
