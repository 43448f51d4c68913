//! Sinks that receive error-log entries as they are recorded

use std::fmt::Debug;

use super::error_log::ErrorEntry;

/// Trait for forwarding logged errors
///
/// Allows the error log to feed external reporting without depending on a
/// specific backend.
pub trait ErrorSink: Send + Sync + Debug {
    /// Receive a newly recorded entry
    fn record(&self, entry: &ErrorEntry);
}

/// Emits each entry as a `tracing` error event
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl ErrorSink for TracingSink {
    fn record(&self, entry: &ErrorEntry) {
        match &entry.details {
            Some(details) => tracing::error!(
                context = %entry.context,
                details = %details,
                "{}",
                entry.message
            ),
            None => tracing::error!(context = %entry.context, "{}", entry.message),
        }
    }
}

/// No-op sink for tests or when forwarding is disabled
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpSink;

impl ErrorSink for NoOpSink {
    fn record(&self, _entry: &ErrorEntry) {}
}
