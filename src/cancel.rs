//! Interrupt handling.
//!
//! A [`CancellationController`] listens for SIGINT and SIGTERM in a
//! background task and flips a shared [`CancelToken`]. Commands check the
//! token between lifecycle stages and race it against the blocking storage
//! call, so an interrupt ends the command without waiting for the backend.

use std::future::Future;
use std::sync::Arc;

use tokio::signal;
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::error::{Error, Result};
use crate::logging::{debug, warn};

/// Shared cancellation flag.
#[derive(Debug, Clone)]
pub struct CancelToken {
    tx: Arc<watch::Sender<bool>>,
}

impl Default for CancelToken {
    fn default() -> Self {
        Self::new()
    }
}

impl CancelToken {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(false);
        Self { tx: Arc::new(tx) }
    }

    /// Mark the token cancelled and wake every waiter. Idempotent.
    pub fn cancel(&self) {
        self.tx.send_replace(true);
    }

    pub fn is_cancelled(&self) -> bool {
        *self.tx.borrow()
    }

    /// `Err(Error::Interrupted)` once the token is cancelled.
    pub fn check(&self) -> Result<()> {
        if self.is_cancelled() {
            Err(Error::Interrupted)
        } else {
            Ok(())
        }
    }

    /// Resolves once the token is cancelled.
    pub async fn cancelled(&self) {
        let mut rx = self.tx.subscribe();
        // The sender lives in `self`, so the channel cannot close while we wait.
        let _ = rx.wait_for(|cancelled| *cancelled).await;
    }
}

/// Bridges OS interrupt signals to a [`CancelToken`].
///
/// Dropping the controller stops listening.
pub struct CancellationController {
    token: CancelToken,
    listener: Option<JoinHandle<()>>,
}

impl CancellationController {
    /// Start listening for SIGINT and SIGTERM. Must be called inside a tokio runtime.
    pub fn listen() -> Self {
        Self::listen_with(CancelToken::new())
    }

    /// Like [`listen`](Self::listen), but cancels an existing token.
    pub fn listen_with(token: CancelToken) -> Self {
        let task_token = token.clone();
        let listener = tokio::spawn(async move {
            let name = interrupt_signal().await;
            debug!(signal = name, "interrupt received, cancelling");
            task_token.cancel();
        });

        Self {
            token,
            listener: Some(listener),
        }
    }

    /// A controller that never observes signals; the token only trips when
    /// cancelled by hand.
    pub fn detached(token: CancelToken) -> Self {
        Self {
            token,
            listener: None,
        }
    }

    pub fn token(&self) -> &CancelToken {
        &self.token
    }

    /// Run `f` unless already cancelled, giving up if cancellation wins the race.
    pub async fn race<F, T>(&self, f: F) -> Result<T>
    where
        F: Future<Output = Result<T>>,
    {
        self.token.check()?;
        tokio::select! {
            biased;
            _ = self.token.cancelled() => Err(Error::Interrupted),
            out = f => out,
        }
    }

    /// Run a blocking closure on the blocking pool, raced against cancellation.
    ///
    /// An interrupted closure keeps running on its thread until it returns;
    /// its result is discarded.
    pub async fn run_blocking<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce() -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        self.token.check()?;
        let handle = tokio::task::spawn_blocking(f);
        self.race(async move {
            handle
                .await
                .map_err(|e| Error::Runtime(e.to_string()))?
        })
        .await
    }
}

impl Drop for CancellationController {
    fn drop(&mut self) {
        if let Some(listener) = self.listener.take() {
            listener.abort();
        }
    }
}

async fn interrupt_signal() -> &'static str {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!(error = %e, "cannot listen for SIGINT");
            std::future::pending::<()>().await;
        }
        "SIGINT"
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "cannot listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
        "SIGTERM"
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<&'static str>();

    tokio::select! {
        name = ctrl_c => name,
        name = terminate => name,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_token_cancel() {
        let token = CancelToken::new();
        assert!(!token.is_cancelled());
        assert!(token.check().is_ok());

        let clone = token.clone();
        clone.cancel();
        clone.cancel();

        assert!(token.is_cancelled());
        assert!(matches!(token.check(), Err(Error::Interrupted)));
    }

    #[tokio::test]
    async fn test_cancelled_wakes_waiter() {
        let token = CancelToken::new();
        let waiter = {
            let token = token.clone();
            tokio::spawn(async move { token.cancelled().await })
        };

        token.cancel();
        let joined = tokio::time::timeout(Duration::from_secs(5), waiter).await;
        assert!(matches!(joined, Ok(Ok(()))));
    }

    #[tokio::test]
    async fn test_run_blocking_returns_value() -> anyhow::Result<()> {
        let controller = CancellationController::detached(CancelToken::new());
        let value = controller.run_blocking(|| Ok(41 + 1)).await?;
        assert_eq!(value, 42);
        Ok(())
    }

    #[tokio::test]
    async fn test_run_blocking_panic_is_runtime_error() {
        let controller = CancellationController::detached(CancelToken::new());
        let result: Result<()> = controller
            .run_blocking(|| panic!("storage call blew up"))
            .await;
        assert!(matches!(result, Err(Error::Runtime(_))));
    }

    #[tokio::test]
    async fn test_run_blocking_skips_work_when_cancelled() {
        let token = CancelToken::new();
        token.cancel();
        let controller = CancellationController::detached(token);

        let ran = Arc::new(std::sync::atomic::AtomicBool::new(false));
        let flag = ran.clone();
        let result = controller
            .run_blocking(move || {
                flag.store(true, std::sync::atomic::Ordering::SeqCst);
                Ok(())
            })
            .await;

        assert!(matches!(result, Err(Error::Interrupted)));
        assert!(!ran.load(std::sync::atomic::Ordering::SeqCst));
    }

    #[tokio::test]
    async fn test_cancel_interrupts_slow_work() {
        let controller = CancellationController::detached(CancelToken::new());
        let token = controller.token().clone();

        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            token.cancel();
        });

        let result = controller
            .race(async {
                tokio::time::sleep(Duration::from_secs(30)).await;
                Ok(())
            })
            .await;
        assert!(matches!(result, Err(Error::Interrupted)));
    }

    #[tokio::test]
    async fn test_listener_starts_and_stops() {
        let controller = CancellationController::listen();
        assert!(!controller.token().is_cancelled());
        drop(controller);
    }
}
