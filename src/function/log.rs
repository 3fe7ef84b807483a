//! Per-invocation log side channel.

use std::sync::{Mutex, MutexGuard, PoisonError};

/// Destination for the diagnostic lines a function writes while handling
/// an invocation.
pub trait LogSink: Send + Sync {
    /// Write one line.
    fn log(&self, message: &str);
}

/// Forwards every line to `tracing` at info level.
#[derive(Debug, Clone, Default)]
pub struct TracingSink {
    function_name: String,
}

impl TracingSink {
    /// Create a sink that tags events with the given function name.
    pub fn new(function_name: impl Into<String>) -> Self {
        Self {
            function_name: function_name.into(),
        }
    }
}

impl LogSink for TracingSink {
    fn log(&self, message: &str) {
        tracing::info!(function = %self.function_name, "{}", message);
    }
}

/// Keeps every line in memory.
#[derive(Debug, Default)]
pub struct MemorySink {
    messages: Mutex<Vec<String>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the recorded lines, oldest first.
    pub fn messages(&self) -> Vec<String> {
        self.lock().clone()
    }

    /// Number of recorded lines.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    // A panic while holding the lock cannot leave the Vec half-written.
    fn lock(&self) -> MutexGuard<'_, Vec<String>> {
        self.messages.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl LogSink for MemorySink {
    fn log(&self, message: &str) {
        self.lock().push(message.to_string());
    }
}
