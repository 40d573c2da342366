//! Tracked conversation repository (`tracked_conversations` table).

use rollcall_core::ConversationId;
use rusqlite::{Connection, params};

use crate::errors::{Result, StoreError};

/// Tracked conversation repository.
pub struct TrackedRepo;

impl TrackedRepo {
    /// Record a conversation as tracked. Returns `false` if it already was.
    pub fn track(conn: &Connection, id: ConversationId) -> Result<bool> {
        let changed = conn.execute(
            "INSERT OR IGNORE INTO tracked_conversations (chat_id) VALUES (?1)",
            params![id.to_string()],
        )?;
        Ok(changed > 0)
    }

    /// Delete the tracked record. Returns whether a row was removed.
    pub fn untrack(conn: &Connection, id: ConversationId) -> Result<bool> {
        let changed = conn.execute(
            "DELETE FROM tracked_conversations WHERE chat_id = ?1",
            params![id.to_string()],
        )?;
        Ok(changed > 0)
    }

    /// All tracked conversations, in insertion order.
    pub fn list(conn: &Connection) -> Result<Vec<ConversationId>> {
        let mut stmt = conn.prepare("SELECT chat_id FROM tracked_conversations ORDER BY id")?;
        let raw = stmt
            .query_map([], |row| row.get::<_, String>(0))?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        raw.into_iter()
            .map(|s| s.parse().map_err(|_| StoreError::InvalidIdentifier(s)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::migrations::run_migrations;
    use assert_matches::assert_matches;

    fn setup() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        run_migrations(&conn).unwrap();
        conn
    }

    #[test]
    fn track_is_insert_or_noop() {
        let conn = setup();
        let id = ConversationId::new(-100_555);
        assert!(TrackedRepo::track(&conn, id).unwrap());
        assert!(!TrackedRepo::track(&conn, id).unwrap());
        assert_eq!(TrackedRepo::list(&conn).unwrap(), vec![id]);
    }

    #[test]
    fn untrack_reports_presence() {
        let conn = setup();
        let id = ConversationId::new(-7);
        assert!(!TrackedRepo::untrack(&conn, id).unwrap());
        let _ = TrackedRepo::track(&conn, id).unwrap();
        assert_eq!(TrackedRepo::list(&conn).unwrap(), vec![id]);
        assert!(TrackedRepo::untrack(&conn, id).unwrap());
        assert!(TrackedRepo::list(&conn).unwrap().is_empty());
    }

    #[test]
    fn stores_decimal_string_form() {
        let conn = setup();
        let _ = TrackedRepo::track(&conn, ConversationId::new(-100_123)).unwrap();
        let raw: String = conn
            .query_row("SELECT chat_id FROM tracked_conversations", [], |row| {
                row.get(0)
            })
            .unwrap();
        assert_eq!(raw, "-100123");
    }

    #[test]
    fn list_preserves_insertion_order() {
        let conn = setup();
        for raw in [-3, -1, -2] {
            let _ = TrackedRepo::track(&conn, ConversationId::new(raw)).unwrap();
        }
        let ids: Vec<i64> = TrackedRepo::list(&conn)
            .unwrap()
            .into_iter()
            .map(ConversationId::get)
            .collect();
        assert_eq!(ids, vec![-3, -1, -2]);
    }

    #[test]
    fn corrupt_row_is_invalid_identifier() {
        let conn = setup();
        let _ = conn
            .execute(
                "INSERT INTO tracked_conversations (chat_id) VALUES ('oops')",
                [],
            )
            .unwrap();
        assert_matches!(
            TrackedRepo::list(&conn),
            Err(StoreError::InvalidIdentifier(s)) if s == "oops"
        );
    }
}
