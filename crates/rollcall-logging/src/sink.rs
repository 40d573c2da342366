use std::sync::Arc;

use chrono::Utc;
use parking_lot::Mutex;
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::field::{Field, Visit};
use tracing::span;
use tracing_subscriber::Layer;
use tracing_subscriber::layer::Context;

const LOGS_SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS logs (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    timestamp TEXT NOT NULL,
    level TEXT NOT NULL,
    target TEXT NOT NULL,
    message TEXT NOT NULL,
    fields TEXT,
    chat_id TEXT
);
CREATE INDEX IF NOT EXISTS idx_logs_level ON logs(level);
CREATE INDEX IF NOT EXISTS idx_logs_chat ON logs(chat_id);
CREATE INDEX IF NOT EXISTS idx_logs_timestamp ON logs(timestamp);
";

const DEFAULT_QUERY_LIMIT: u32 = 100;

/// A log record persisted to `SQLite`.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LogRecord {
    /// Row ID.
    pub id: i64,
    /// RFC 3339 timestamp.
    pub timestamp: String,
    /// Upper-case level (`WARN`, `ERROR`).
    pub level: String,
    /// Event target (module path).
    pub target: String,
    /// Formatted message.
    pub message: String,
    /// Remaining structured fields as a JSON object.
    pub fields: Option<String>,
    /// Conversation the event relates to.
    pub chat_id: Option<String>,
}

/// Query parameters for searching persisted logs.
#[derive(Clone, Debug, Default)]
pub struct LogQuery {
    /// Exact level match.
    pub level: Option<String>,
    /// Substring of the target.
    pub target: Option<String>,
    /// Conversation ID.
    pub chat_id: Option<String>,
    /// Inclusive lower bound on the timestamp.
    pub since: Option<String>,
    /// Maximum rows (default 100).
    pub limit: Option<u32>,
}

/// `SQLite` sink that persists warn+ logs.
pub struct SqliteLogSink {
    conn: Mutex<Connection>,
}

impl SqliteLogSink {
    /// Wrap a connection, creating the `logs` table if needed.
    pub fn new(conn: Connection) -> Result<Self, rusqlite::Error> {
        conn.execute_batch(LOGS_SCHEMA)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn insert(&self, record: &LogInsert) {
        let conn = self.conn.lock();
        let _ = conn.execute(
            "INSERT INTO logs (timestamp, level, target, message, fields, chat_id)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            rusqlite::params![
                record.timestamp,
                record.level,
                record.target,
                record.message,
                record.fields,
                record.chat_id,
            ],
        );
    }

    /// Records matching every set filter, most recent first.
    pub fn query(&self, q: &LogQuery) -> Result<Vec<LogRecord>, rusqlite::Error> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare_cached(
            "SELECT id, timestamp, level, target, message, fields, chat_id FROM logs
             WHERE (?1 IS NULL OR level = ?1)
               AND (?2 IS NULL OR target LIKE '%' || ?2 || '%')
               AND (?3 IS NULL OR chat_id = ?3)
               AND (?4 IS NULL OR timestamp >= ?4)
             ORDER BY id DESC
             LIMIT ?5",
        )?;
        let rows = stmt.query_map(
            rusqlite::params![
                q.level,
                q.target,
                q.chat_id,
                q.since,
                q.limit.unwrap_or(DEFAULT_QUERY_LIMIT),
            ],
            |row| {
                Ok(LogRecord {
                    id: row.get(0)?,
                    timestamp: row.get(1)?,
                    level: row.get(2)?,
                    target: row.get(3)?,
                    message: row.get(4)?,
                    fields: row.get(5)?,
                    chat_id: row.get(6)?,
                })
            },
        )?;
        rows.collect()
    }

    /// Total persisted records.
    pub fn count(&self) -> Result<i64, rusqlite::Error> {
        let conn = self.conn.lock();
        conn.query_row("SELECT COUNT(*) FROM logs", [], |row| row.get(0))
    }
}

struct LogInsert {
    timestamp: String,
    level: String,
    target: String,
    message: String,
    fields: Option<String>,
    chat_id: Option<String>,
}

/// `tracing` layer that writes warn+ events to a [`SqliteLogSink`].
pub struct SqliteLogLayer {
    sink: Arc<SqliteLogSink>,
}

impl SqliteLogLayer {
    /// Create a layer writing into `sink`.
    pub fn new(sink: Arc<SqliteLogSink>) -> Self {
        Self { sink }
    }
}

#[derive(Default)]
struct FieldVisitor {
    message: Option<String>,
    fields: Map<String, Value>,
    chat_id: Option<String>,
}

impl FieldVisitor {
    fn put(&mut self, field: &Field, value: Value) {
        match field.name() {
            "message" => self.message = Some(plain_text(value)),
            "chat_id" => self.chat_id = Some(plain_text(value).trim_matches('"').to_string()),
            name => {
                let _ = self.fields.insert(name.to_string(), value);
            }
        }
    }
}

fn plain_text(value: Value) -> String {
    match value {
        Value::String(s) => s,
        other => other.to_string(),
    }
}

impl Visit for FieldVisitor {
    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        self.put(field, Value::String(format!("{value:?}")));
    }

    fn record_str(&mut self, field: &Field, value: &str) {
        self.put(field, Value::from(value));
    }

    fn record_i64(&mut self, field: &Field, value: i64) {
        self.put(field, Value::from(value));
    }

    fn record_u64(&mut self, field: &Field, value: u64) {
        self.put(field, Value::from(value));
    }

    fn record_bool(&mut self, field: &Field, value: bool) {
        self.put(field, Value::from(value));
    }
}

/// Stored on spans to propagate `chat_id` to child events.
struct SpanChat(String);

impl<S> Layer<S> for SqliteLogLayer
where
    S: tracing::Subscriber + for<'a> tracing_subscriber::registry::LookupSpan<'a>,
{
    fn on_event(&self, event: &tracing::Event<'_>, ctx: Context<'_, S>) {
        let level = *event.metadata().level();
        if level > tracing::Level::WARN {
            return;
        }

        let mut visitor = FieldVisitor::default();
        event.record(&mut visitor);

        let chat_id = visitor.chat_id.take().or_else(|| {
            ctx.event_scope(event)?
                .find_map(|span| span.extensions().get::<SpanChat>().map(|c| c.0.clone()))
        });
        let fields = (!visitor.fields.is_empty())
            .then(|| serde_json::to_string(&visitor.fields).ok())
            .flatten();

        self.sink.insert(&LogInsert {
            timestamp: Utc::now().to_rfc3339(),
            level: level.as_str().to_string(),
            target: event.metadata().target().to_string(),
            message: visitor.message.unwrap_or_default(),
            fields,
            chat_id,
        });
    }

    fn on_new_span(&self, attrs: &span::Attributes<'_>, id: &span::Id, ctx: Context<'_, S>) {
        let mut visitor = FieldVisitor::default();
        attrs.record(&mut visitor);

        if let Some(chat_id) = visitor.chat_id {
            if let Some(span) = ctx.span(id) {
                span.extensions_mut().insert(SpanChat(chat_id));
            }
        }
    }
}
