//! # rollcall-logging
//!
//! Structured logging with `tracing`.
//!
//! - [`init_subscriber`] sets up a compact stderr subscriber.
//! - [`init_subscriber_with_sqlite`] additionally persists warn+ events into a
//!   `logs` table through [`SqliteLogLayer`], so consistency warnings and
//!   failed deliveries survive restarts and can be queried with
//!   [`SqliteLogSink::query`].
//!
//! Context is propagated through span fields: a `chat_id` field on any
//! enclosing span is attached to persisted records.

#![deny(unsafe_code)]

mod sink;

pub use sink::{LogQuery, LogRecord, SqliteLogLayer, SqliteLogSink};

use std::sync::Arc;

use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Initialize the global tracing subscriber with stderr output only.
///
/// `level` is the default filter directive; `RUST_LOG` takes precedence.
/// Subsequent calls are no-ops.
pub fn init_subscriber(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .compact();

    let _ = subscriber.try_init();
}

/// Initialize the global tracing subscriber with stderr output and `SQLite`
/// persistence of warn+ events.
///
/// Returns the sink for querying persisted records.
pub fn init_subscriber_with_sqlite(
    level: &str,
    conn: rusqlite::Connection,
) -> Result<Arc<SqliteLogSink>, rusqlite::Error> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_writer(std::io::stderr)
        .compact();

    let sink = Arc::new(SqliteLogSink::new(conn)?);

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .with(SqliteLogLayer::new(Arc::clone(&sink)))
        .try_init();

    Ok(sink)
}
