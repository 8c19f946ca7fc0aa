//! Toast Notifications
//!
//! Transient success/error/warning/info messages. Toasts sit in a bounded
//! stack (newest first) and expire after a fixed duration; expired entries
//! are pruned whenever the stack is read.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;
use tokio::time::Instant;

/// Toast category; each has a fixed colour
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ToastKind {
    Success,
    Error,
    Warning,
    Info,
}

impl ToastKind {
    /// Background colour of the banner
    pub fn color(&self) -> &'static str {
        match self {
            ToastKind::Success => "#000000",
            ToastKind::Error => "#ff4444",
            ToastKind::Warning => "#ff8800",
            ToastKind::Info => "#0099cc",
        }
    }

    pub fn icon(&self) -> &'static str {
        match self {
            ToastKind::Success => "✓",
            ToastKind::Error => "✕",
            ToastKind::Warning => "⚠",
            ToastKind::Info => "ℹ",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ToastKind::Success => "success",
            ToastKind::Error => "error",
            ToastKind::Warning => "warning",
            ToastKind::Info => "info",
        }
    }
}

/// A single notification
#[derive(Debug, Clone, PartialEq)]
pub struct Toast {
    pub id: u64,
    pub kind: ToastKind,
    pub message: String,
    pub expires_at: Instant,
}

/// Display policy for the stack
#[derive(Debug, Clone, Copy)]
pub struct ToastConfig {
    /// How long each toast stays visible
    pub duration: Duration,
    /// Maximum toasts shown at once; older ones are dropped
    pub max_visible: usize,
}

impl Default for ToastConfig {
    fn default() -> Self {
        Self {
            duration: Duration::from_millis(3000),
            max_visible: 5,
        }
    }
}

#[derive(Debug)]
struct Inner {
    next_id: u64,
    stack: VecDeque<Toast>,
}

/// Fire-and-forget notification sink shared by the dashboard
#[derive(Debug)]
pub struct NotificationCenter {
    config: ToastConfig,
    inner: Mutex<Inner>,
}

impl NotificationCenter {
    pub fn new(config: ToastConfig) -> Self {
        Self {
            config,
            inner: Mutex::new(Inner {
                next_id: 1,
                stack: VecDeque::new(),
            }),
        }
    }

    /// Show a toast; returns its id
    pub fn push(&self, kind: ToastKind, message: impl Into<String>) -> u64 {
        let message = message.into();
        match kind {
            ToastKind::Error => tracing::warn!(kind = kind.as_str(), "{}", message),
            _ => tracing::info!(kind = kind.as_str(), "{}", message),
        }

        let mut inner = self.lock();
        let id = inner.next_id;
        inner.next_id += 1;
        inner.stack.push_front(Toast {
            id,
            kind,
            message,
            expires_at: Instant::now() + self.config.duration,
        });
        let max = self.config.max_visible.max(1);
        inner.stack.truncate(max);
        id
    }

    pub fn success(&self, message: impl Into<String>) -> u64 {
        self.push(ToastKind::Success, message)
    }

    pub fn error(&self, message: impl Into<String>) -> u64 {
        self.push(ToastKind::Error, message)
    }

    pub fn warning(&self, message: impl Into<String>) -> u64 {
        self.push(ToastKind::Warning, message)
    }

    pub fn info(&self, message: impl Into<String>) -> u64 {
        self.push(ToastKind::Info, message)
    }

    /// Visible toasts, newest first
    pub fn active(&self) -> Vec<Toast> {
        let now = Instant::now();
        let mut inner = self.lock();
        inner.stack.retain(|t| t.expires_at > now);
        inner.stack.iter().cloned().collect()
    }

    /// Most recent visible toast
    pub fn latest(&self) -> Option<Toast> {
        self.active().into_iter().next()
    }

    /// Close a toast early
    pub fn dismiss(&self, id: u64) {
        self.lock().stack.retain(|t| t.id != id);
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        // A poisoned lock only means a panic mid-push; the stack is still usable
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl Default for NotificationCenter {
    fn default() -> Self {
        Self::new(ToastConfig::default())
    }
}
