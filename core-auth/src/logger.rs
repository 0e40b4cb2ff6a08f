//! Per-coordinator logger.
//!
//! Every line is emitted as a `tracing` event under the `core_auth::session`
//! target with a `tag` field naming the flow. When the host passes a
//! [`LoggerSink`] at initialization the line is mirrored there as well.

use bridge_traits::log::{LogEntry, LogLevel, LoggerSink};
use core_runtime::logging::forward_to_sink;
use std::fmt;
use std::sync::Arc;
use tracing::{error, info, warn};

const TARGET: &str = "core_auth::session";

#[derive(Clone, Default)]
pub struct SessionLogger {
    sink: Option<Arc<dyn LoggerSink>>,
}

impl SessionLogger {
    pub fn new(sink: Option<Arc<dyn LoggerSink>>) -> Self {
        Self { sink }
    }

    /// Logger that only emits `tracing` events.
    pub const fn tracing_only() -> Self {
        Self { sink: None }
    }

    pub fn has_sink(&self) -> bool {
        self.sink.is_some()
    }

    pub fn info(&self, tag: &str, message: &str) {
        info!(target: TARGET, tag, "{}", message);
        self.mirror(LogLevel::Info, tag, message);
    }

    pub fn warn(&self, tag: &str, message: &str) {
        warn!(target: TARGET, tag, "{}", message);
        self.mirror(LogLevel::Warn, tag, message);
    }

    pub fn error(&self, tag: &str, message: &str) {
        error!(target: TARGET, tag, "{}", message);
        self.mirror(LogLevel::Error, tag, message);
    }

    fn mirror(&self, level: LogLevel, tag: &str, message: &str) {
        let Some(sink) = &self.sink else {
            return;
        };
        if level < sink.min_level() {
            return;
        }

        forward_to_sink(sink, LogEntry::new(level, TARGET, message).with_tag(tag));
    }
}

impl fmt::Debug for SessionLogger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionLogger")
            .field("sink", &self.sink.as_ref().map(|_| "LoggerSink { ... }"))
            .finish()
    }
}
