// src/utils/abort.rs

//! Request cancellation.
//!
//! An [`AbortController`] hands out [`AbortSignal`]s that fetch operations
//! race against their network future. Aborting is sticky: once set, every
//! current and future signal reports aborted.

use std::future::Future;

use tokio::sync::watch;

/// Owner side of a cancellation pair.
#[derive(Debug)]
pub struct AbortController {
    tx: watch::Sender<bool>,
}

impl Default for AbortController {
    fn default() -> Self {
        Self::new()
    }
}

impl AbortController {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(false);
        Self { tx }
    }

    /// A signal observing this controller.
    pub fn signal(&self) -> AbortSignal {
        AbortSignal {
            rx: self.tx.subscribe(),
        }
    }

    pub fn abort(&self) {
        self.tx.send_replace(true);
    }

    pub fn is_aborted(&self) -> bool {
        *self.tx.borrow()
    }
}

/// Observer side of a cancellation pair.
#[derive(Debug, Clone)]
pub struct AbortSignal {
    rx: watch::Receiver<bool>,
}

impl AbortSignal {
    pub fn is_aborted(&self) -> bool {
        *self.rx.borrow()
    }

    /// Resolves once the controller aborts. Never resolves if the controller
    /// is dropped without aborting.
    pub async fn aborted(&self) {
        let mut rx = self.rx.clone();
        loop {
            if *rx.borrow_and_update() {
                return;
            }
            if rx.changed().await.is_err() {
                std::future::pending::<()>().await;
            }
        }
    }
}

/// Run `fut` unless `signal` aborts first. Returns `None` when aborted.
pub async fn abortable<F: Future>(signal: Option<&AbortSignal>, fut: F) -> Option<F::Output> {
    match signal {
        None => Some(fut.await),
        Some(signal) if signal.is_aborted() => None,
        Some(signal) => {
            tokio::select! {
                biased;
                _ = signal.aborted() => None,
                out = fut => Some(out),
            }
        }
    }
}
