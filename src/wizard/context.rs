//! Wizard context: the API handle and the notification channel, built once
//! at startup and handed to the controller.

use std::sync::Arc;

use serde::Serialize;
use tokio::sync::broadcast;

use crate::client::OnboardingApi;

/// Default broadcast channel capacity.
const DEFAULT_TOAST_CAPACITY: usize = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ToastLevel {
    Success,
    Error,
}

/// A transient user-facing notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Toast {
    pub level: ToastLevel,
    pub message: String,
}

impl std::fmt::Display for Toast {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let marker = match self.level {
            ToastLevel::Success => "✅",
            ToastLevel::Error => "❌",
        };
        write!(f, "{marker} {}", self.message)
    }
}

/// Fan-out of toasts to whoever renders them.
#[derive(Clone)]
pub struct Notifier {
    tx: broadcast::Sender<Toast>,
}

impl Default for Notifier {
    fn default() -> Self {
        Self::new()
    }
}

impl Notifier {
    pub fn new() -> Self {
        let (tx, _rx) = broadcast::channel(DEFAULT_TOAST_CAPACITY);
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Toast> {
        self.tx.subscribe()
    }

    pub fn notify(&self, level: ToastLevel, message: impl Into<String>) {
        // Ok if nobody is listening
        let _ = self.tx.send(Toast {
            level,
            message: message.into(),
        });
    }

    pub fn success(&self, message: impl Into<String>) {
        self.notify(ToastLevel::Success, message);
    }

    pub fn error(&self, message: impl Into<String>) {
        self.notify(ToastLevel::Error, message);
    }
}

/// Everything the wizard needs from the outside world.
#[derive(Clone)]
pub struct WizardContext {
    pub api: Arc<dyn OnboardingApi>,
    pub notifier: Notifier,
}

impl WizardContext {
    pub fn new(api: Arc<dyn OnboardingApi>) -> Self {
        Self {
            api,
            notifier: Notifier::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn subscribers_receive_toasts_in_order() {
        let notifier = Notifier::new();
        let mut rx = notifier.subscribe();

        notifier.success("Draft saved.");
        notifier.error("HTTP 500");

        let first = rx.recv().await.unwrap();
        assert_eq!(first.level, ToastLevel::Success);
        assert_eq!(first.message, "Draft saved.");
        let second = rx.recv().await.unwrap();
        assert_eq!(second.level, ToastLevel::Error);
    }

    #[test]
    fn notify_without_subscribers_does_not_panic() {
        Notifier::new().success("nobody home");
    }

    #[test]
    fn toast_display_has_marker() {
        let toast = Toast {
            level: ToastLevel::Error,
            message: "boom".to_string(),
        };
        assert_eq!(toast.to_string(), "❌ boom");
    }
}
