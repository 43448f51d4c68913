//! In-process error log
//!
//! Every recoverable failure in the session lifecycle (token decryption,
//! refresh, exchange, callback handling, restore) is recorded here with a
//! context label. The UI reads [`ErrorLog::last_error`] to surface problems;
//! entries are also forwarded to the configured [`ErrorSink`].

use std::fmt::Display;
use std::future::Future;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::sink::{ErrorSink, TracingSink};
use crate::time::{Clock, SystemClock};

/// A single recorded error
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorEntry {
    pub message: String,
    pub context: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
    pub timestamp: DateTime<Utc>,
}

/// Shared, thread-safe error log
pub struct ErrorLog {
    entries: Mutex<Vec<ErrorEntry>>,
    sink: Arc<dyn ErrorSink>,
    clock: Arc<dyn Clock>,
}

impl std::fmt::Debug for ErrorLog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ErrorLog")
            .field("entries", &self.entries.lock().len())
            .field("sink", &self.sink)
            .finish_non_exhaustive()
    }
}

impl Default for ErrorLog {
    fn default() -> Self {
        Self::new()
    }
}

impl ErrorLog {
    /// Error log with the system clock that forwards to `tracing`
    pub fn new() -> Self {
        Self::with_parts(Arc::new(TracingSink), Arc::new(SystemClock))
    }

    pub fn with_parts(sink: Arc<dyn ErrorSink>, clock: Arc<dyn Clock>) -> Self {
        Self { entries: Mutex::new(Vec::new()), sink, clock }
    }

    /// Record an error under `context`
    pub fn log_error(&self, error: impl Display, context: &str) {
        self.push(error.to_string(), context, None);
    }

    /// Record an error with structured details
    pub fn log_error_with_details(&self, error: impl Display, context: &str, details: Value) {
        self.push(error.to_string(), context, Some(details));
    }

    /// Snapshot of all entries, oldest first
    pub fn errors(&self) -> Vec<ErrorEntry> {
        self.entries.lock().clone()
    }

    pub fn last_error(&self) -> Option<ErrorEntry> {
        self.entries.lock().last().cloned()
    }

    /// Entries recorded under `context`
    pub fn errors_for(&self, context: &str) -> Vec<ErrorEntry> {
        self.entries.lock().iter().filter(|e| e.context == context).cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    pub fn clear(&self) {
        self.entries.lock().clear();
    }

    /// Await `operation`; on error record it under `context` and return
    /// `fallback` instead.
    pub async fn capture<T, E, F>(&self, context: &str, operation: F, fallback: T) -> T
    where
        F: Future<Output = Result<T, E>>,
        E: Display,
    {
        match operation.await {
            Ok(value) => value,
            Err(err) => {
                self.log_error(err, context);
                fallback
            }
        }
    }

    fn push(&self, message: String, context: &str, details: Option<Value>) {
        let entry = ErrorEntry {
            message,
            context: context.to_string(),
            details,
            timestamp: self.clock.utc_now(),
        };
        self.sink.record(&entry);
        self.entries.lock().push(entry);
    }
}
