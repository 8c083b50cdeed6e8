//! User-facing feedback: toasts and confirmation prompts.

use std::sync::Mutex;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{error, info};

/// Severity of a toast.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToastLevel {
    Info,
    Success,
    Error,
}

/// A transient message shown to the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Toast {
    pub level: ToastLevel,
    pub message: String,
}

impl Toast {
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            level: ToastLevel::Info,
            message: message.into(),
        }
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: ToastLevel::Success,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: ToastLevel::Error,
            message: message.into(),
        }
    }
}

/// Receives toasts raised by the library controllers.
pub trait Notifier: Send + Sync + std::fmt::Debug {
    fn notify(&self, toast: Toast);
}

/// Asks the user a yes/no question before destructive operations.
#[async_trait]
pub trait Confirm: Send + Sync + std::fmt::Debug {
    async fn confirm(&self, prompt: &str) -> bool;
}

/// Notifier that writes toasts to the log.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, toast: Toast) {
        match toast.level {
            ToastLevel::Error => error!(message = %toast.message, "toast"),
            _ => info!(level = ?toast.level, message = %toast.message, "toast"),
        }
    }
}

/// Notifier that keeps every toast in memory.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    toasts: Mutex<Vec<Toast>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every toast raised so far, oldest first.
    pub fn toasts(&self) -> Vec<Toast> {
        self.toasts.lock().map(|t| t.clone()).unwrap_or_default()
    }

    /// Messages of every toast raised so far.
    pub fn messages(&self) -> Vec<String> {
        self.toasts().into_iter().map(|t| t.message).collect()
    }

    /// The most recent toast, if any.
    pub fn last(&self) -> Option<Toast> {
        self.toasts().pop()
    }

    pub fn clear(&self) {
        if let Ok(mut toasts) = self.toasts.lock() {
            toasts.clear();
        }
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, toast: Toast) {
        if let Ok(mut toasts) = self.toasts.lock() {
            toasts.push(toast);
        }
    }
}

/// Confirmation that always gives the same answer and remembers the prompts.
#[derive(Debug)]
pub struct AutoConfirm {
    answer: bool,
    prompts: Mutex<Vec<String>>,
}

impl AutoConfirm {
    pub fn new(answer: bool) -> Self {
        Self {
            answer,
            prompts: Mutex::new(Vec::new()),
        }
    }

    /// Accept every prompt.
    pub fn yes() -> Self {
        Self::new(true)
    }

    /// Decline every prompt.
    pub fn no() -> Self {
        Self::new(false)
    }

    /// Prompts asked so far.
    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().map(|p| p.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl Confirm for AutoConfirm {
    async fn confirm(&self, prompt: &str) -> bool {
        if let Ok(mut prompts) = self.prompts.lock() {
            prompts.push(prompt.to_string());
        }
        self.answer
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recording_notifier_keeps_order() {
        let notifier = RecordingNotifier::new();
        notifier.notify(Toast::info("first"));
        notifier.notify(Toast::error("second"));

        assert_eq!(notifier.messages(), vec!["first", "second"]);
        assert_eq!(notifier.last().map(|t| t.level), Some(ToastLevel::Error));

        notifier.clear();
        assert!(notifier.toasts().is_empty());
    }

    #[tokio::test]
    async fn test_auto_confirm_records_prompts() {
        let confirm = AutoConfirm::no();
        assert!(!confirm.confirm("Delete \"a.png\"?").await);
        assert_eq!(confirm.prompts(), vec!["Delete \"a.png\"?"]);
    }
}
