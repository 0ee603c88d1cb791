use std::collections::VecDeque;
use std::sync::Arc;

use parking_lot::Mutex;
use serde::Serialize;
use tracing::field::{Field, Visit};
use tracing::{Level, Subscriber};
use tracing_subscriber::layer::{Context, Layer};

const RING_CAPACITY: usize = 100;

#[derive(Debug, Clone, Serialize)]
pub struct LogEntry {
    pub timestamp: String,
    pub level: String,
    pub target: String,
    pub message: String,
}

/// Bounded FIFO ring of recent log lines, fed by a `tracing_subscriber::Layer`
/// so `GET /logs` has something to serve without re-deriving state from the
/// formatter output.
#[derive(Debug, Clone)]
pub struct LogRing {
    inner: Arc<Mutex<VecDeque<LogEntry>>>,
}

impl Default for LogRing {
    fn default() -> Self {
        Self {
            inner: Arc::new(Mutex::new(VecDeque::with_capacity(RING_CAPACITY))),
        }
    }
}

impl LogRing {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, entry: LogEntry) {
        let mut guard = self.inner.lock();
        if guard.len() >= RING_CAPACITY {
            guard.pop_front();
        }
        guard.push_back(entry);
    }

    pub fn snapshot(&self) -> Vec<LogEntry> {
        self.inner.lock().iter().cloned().collect()
    }

    pub fn clear(&self) {
        self.inner.lock().clear();
    }
}

struct MessageVisitor {
    message: String,
}

impl Visit for MessageVisitor {
    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        if field.name() == "message" {
            self.message = format!("{value:?}");
        }
    }
}

impl<S> Layer<S> for LogRing
where
    S: Subscriber,
{
    fn on_event(&self, event: &tracing::Event<'_>, _ctx: Context<'_, S>) {
        let mut visitor = MessageVisitor {
            message: String::new(),
        };
        event.record(&mut visitor);

        self.push(LogEntry {
            timestamp: crate::time::now_rfc3339(),
            level: level_label(*event.metadata().level()),
            target: event.metadata().target().to_string(),
            message: visitor.message,
        });
    }
}

fn level_label(level: Level) -> String {
    level.as_str().to_lowercase()
}
