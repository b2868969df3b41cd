//! Tracing setup plus an in-memory history of recent log events.
//!
//! # Design
//! Console output goes through the usual `tracing-subscriber` fmt layer.
//! Alongside it, [`RingBufferLayer`] copies every event that passes the
//! filter into a [`LogBuffer`]: a bounded queue that drops its oldest entry
//! once full. The buffer is a handle returned to the caller, so tests and
//! embedders can inspect or export it directly. The handle fed by the global
//! subscriber is remembered, and later `init_tracing` calls hand it back.

use std::collections::VecDeque;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;
use serde_json::{Map, Value};
use tracing::field::{Field, Visit};
use tracing::{Event, Subscriber};
use tracing_subscriber::layer::{Context, Layer};
use tracing_subscriber::prelude::*;
use tracing_subscriber::util::TryInitError;
use tracing_subscriber::{fmt as tracing_fmt, EnvFilter};

use crate::config::{ClientConfig, LogFormat};

const DEFAULT_FILTER: &str = "info,todo_client=debug";

/// Buffer fed by the global subscriber, once one has been installed here.
static INSTALLED: Mutex<Option<LogBuffer>> = Mutex::new(None);

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct LogEntry {
    pub timestamp: DateTime<Utc>,
    pub level: String,
    pub target: String,
    pub message: String,
    #[serde(skip_serializing_if = "Map::is_empty")]
    pub metadata: Map<String, Value>,
}

impl LogEntry {
    fn to_text(&self) -> String {
        format!(
            "{} [{}] {}",
            self.timestamp.to_rfc3339_opts(SecondsFormat::Millis, true),
            self.level,
            self.message
        )
    }
}

/// Shared, bounded history of log entries. Clones share the same storage.
#[derive(Debug, Clone)]
pub struct LogBuffer {
    entries: Arc<Mutex<VecDeque<LogEntry>>>,
    capacity: usize,
}

impl LogBuffer {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: Arc::new(Mutex::new(VecDeque::with_capacity(capacity))),
            capacity,
        }
    }

    fn lock(&self) -> MutexGuard<'_, VecDeque<LogEntry>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn push(&self, entry: LogEntry) {
        let mut entries = self.lock();
        while entries.len() >= self.capacity {
            entries.pop_front();
        }
        entries.push_back(entry);
    }

    /// Oldest first.
    pub fn entries(&self) -> Vec<LogEntry> {
        self.lock().iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    pub fn export(&self, format: LogFormat) -> String {
        let entries = self.entries();
        if entries.is_empty() {
            return "No logs found".to_string();
        }
        match format {
            LogFormat::Json => serde_json::to_string_pretty(&entries)
                .unwrap_or_else(|e| format!("Error exporting logs: {e}")),
            LogFormat::Text => entries
                .iter()
                .map(LogEntry::to_text)
                .collect::<Vec<_>>()
                .join("\n"),
        }
    }

    pub fn layer(&self) -> RingBufferLayer {
        RingBufferLayer {
            buffer: self.clone(),
        }
    }
}

/// `tracing` layer that records events into a [`LogBuffer`].
#[derive(Debug, Clone)]
pub struct RingBufferLayer {
    buffer: LogBuffer,
}

impl<S: Subscriber> Layer<S> for RingBufferLayer {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let mut visitor = FieldVisitor::default();
        event.record(&mut visitor);
        let meta = event.metadata();
        self.buffer.push(LogEntry {
            timestamp: Utc::now(),
            level: meta.level().as_str().to_ascii_lowercase(),
            target: meta.target().to_string(),
            message: visitor.message.unwrap_or_default(),
            metadata: visitor.fields,
        });
    }
}

#[derive(Default)]
struct FieldVisitor {
    message: Option<String>,
    fields: Map<String, Value>,
}

impl FieldVisitor {
    fn insert(&mut self, field: &Field, value: Value) {
        if field.name() == "message" {
            self.message = Some(match value {
                Value::String(s) => s,
                other => other.to_string(),
            });
        } else {
            self.fields.insert(field.name().to_string(), value);
        }
    }
}

impl Visit for FieldVisitor {
    fn record_str(&mut self, field: &Field, value: &str) {
        self.insert(field, Value::from(value));
    }

    fn record_i64(&mut self, field: &Field, value: i64) {
        self.insert(field, Value::from(value));
    }

    fn record_u64(&mut self, field: &Field, value: u64) {
        self.insert(field, Value::from(value));
    }

    fn record_bool(&mut self, field: &Field, value: bool) {
        self.insert(field, Value::from(value));
    }

    fn record_f64(&mut self, field: &Field, value: f64) {
        let number = serde_json::Number::from_f64(value).map_or(Value::Null, Value::Number);
        self.insert(field, number);
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        self.insert(field, Value::String(format!("{value:?}")));
    }
}

/// Install the global subscriber and return the history buffer it feeds.
///
/// Filter precedence: `config.log_filter`, then `RUST_LOG`, then
/// `info,todo_client=debug`. Console lines are JSON or compact text per
/// `config.log_format`.
///
/// Calling this again returns the buffer installed by the first call and
/// ignores `config`. Fails if some other subscriber already owns the global
/// slot, since the returned buffer would never receive an event.
pub fn init_tracing(config: &ClientConfig) -> Result<LogBuffer, TryInitError> {
    let mut installed = INSTALLED.lock().unwrap_or_else(PoisonError::into_inner);
    if let Some(buffer) = installed.as_ref() {
        return Ok(buffer.clone());
    }

    let buffer = LogBuffer::new(config.log_retention);
    let filter = config
        .log_filter
        .as_deref()
        .and_then(|value| EnvFilter::try_new(value).ok())
        .or_else(|| EnvFilter::try_from_default_env().ok())
        .unwrap_or_else(|| EnvFilter::new(DEFAULT_FILTER));

    let (json, text) = match config.log_format {
        LogFormat::Json => (Some(tracing_fmt::layer().json().with_target(true)), None),
        LogFormat::Text => (None, Some(tracing_fmt::layer().with_target(true).compact())),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(json)
        .with(text)
        .with(buffer.layer())
        .try_init()?;

    *installed = Some(buffer.clone());
    Ok(buffer)
}
