//! Roster repository (`usernames` table).

use rollcall_core::ConversationId;
use rusqlite::{Connection, params};

use crate::errors::Result;

/// Roster repository.
pub struct RosterRepo;

impl RosterRepo {
    /// Add a member handle. Returns `false` if the entry already existed.
    pub fn add(conn: &Connection, id: ConversationId, handle: &str) -> Result<bool> {
        let changed = conn.execute(
            "INSERT INTO usernames (chat_id, username)
             SELECT ?1, ?2
             WHERE NOT EXISTS (
                 SELECT 1 FROM usernames WHERE chat_id = ?1 AND username = ?2
             )",
            params![id.to_string(), handle],
        )?;
        Ok(changed > 0)
    }

    /// Remove a member handle. Returns whether any row was removed.
    pub fn remove(conn: &Connection, id: ConversationId, handle: &str) -> Result<bool> {
        let changed = conn.execute(
            "DELETE FROM usernames WHERE chat_id = ?1 AND username = ?2",
            params![id.to_string(), handle],
        )?;
        Ok(changed > 0)
    }

    /// Distinct member handles of a conversation, sorted.
    pub fn members_of(conn: &Connection, id: ConversationId) -> Result<Vec<String>> {
        let mut stmt = conn.prepare(
            "SELECT DISTINCT username FROM usernames WHERE chat_id = ?1 ORDER BY username",
        )?;
        let rows = stmt
            .query_map(params![id.to_string()], |row| row.get(0))?
            .collect::<std::result::Result<Vec<String>, _>>()?;
        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::migrations::run_migrations;

    fn setup() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        run_migrations(&conn).unwrap();
        conn
    }

    #[test]
    fn add_is_insert_or_noop() {
        let conn = setup();
        let id = ConversationId::new(-1);
        assert!(RosterRepo::add(&conn, id, "alice").unwrap());
        assert!(!RosterRepo::add(&conn, id, "alice").unwrap());
        assert_eq!(RosterRepo::members_of(&conn, id).unwrap(), vec!["alice"]);
    }

    #[test]
    fn rosters_are_scoped_per_conversation() {
        let conn = setup();
        let a = ConversationId::new(-1);
        let b = ConversationId::new(-2);
        let _ = RosterRepo::add(&conn, a, "alice").unwrap();
        let _ = RosterRepo::add(&conn, b, "bob").unwrap();
        assert_eq!(RosterRepo::members_of(&conn, a).unwrap(), vec!["alice"]);
        assert_eq!(RosterRepo::members_of(&conn, b).unwrap(), vec!["bob"]);
    }

    #[test]
    fn remove_missing_is_noop() {
        let conn = setup();
        let id = ConversationId::new(-1);
        assert!(!RosterRepo::remove(&conn, id, "ghost").unwrap());
        let _ = RosterRepo::add(&conn, id, "alice").unwrap();
        assert!(RosterRepo::remove(&conn, id, "alice").unwrap());
        assert!(RosterRepo::members_of(&conn, id).unwrap().is_empty());
    }

    #[test]
    fn members_are_distinct_and_sorted() {
        let conn = setup();
        let id = ConversationId::new(-1);
        // Legacy databases may hold duplicate rows.
        for name in ["carol", "alice", "alice"] {
            let _ = conn
                .execute(
                    "INSERT INTO usernames (chat_id, username) VALUES (?1, ?2)",
                    params![id.to_string(), name],
                )
                .unwrap();
        }
        assert_eq!(
            RosterRepo::members_of(&conn, id).unwrap(),
            vec!["alice", "carol"]
        );
    }
}
