//! User-visible notifications ("toasts").

use std::collections::VecDeque;
use std::sync::Mutex;

use serde::Serialize;

/// Toast severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Success,
    Warning,
    Error,
}

/// A message meant for the person using the storefront.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notification {
    pub severity: Severity,
    pub message: String,
}

impl Notification {
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            message: message.into(),
        }
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Success,
            message: message.into(),
        }
    }
}

/// Sink for notifications.
pub trait Notifier: Send + Sync {
    fn notify(&self, notification: Notification);
}

/// Writes notifications to the log.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, notification: Notification) {
        match notification.severity {
            Severity::Error => log::error!("{}", notification.message),
            Severity::Warning => log::warn!("{}", notification.message),
            Severity::Info | Severity::Success => log::info!("{}", notification.message),
        }
    }
}

/// Buffers notifications until a renderer drains them.
#[derive(Debug, Default)]
pub struct ToastQueue {
    pending: Mutex<VecDeque<Notification>>,
}

impl ToastQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take every queued notification, oldest first.
    pub fn drain(&self) -> Vec<Notification> {
        match self.pending.lock() {
            Ok(mut pending) => pending.drain(..).collect(),
            Err(poisoned) => poisoned.into_inner().drain(..).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.pending.lock().map(|p| p.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Notifier for ToastQueue {
    fn notify(&self, notification: Notification) {
        log::debug!("toast: {:?} {}", notification.severity, notification.message);
        match self.pending.lock() {
            Ok(mut pending) => pending.push_back(notification),
            Err(poisoned) => poisoned.into_inner().push_back(notification),
        }
    }
}
