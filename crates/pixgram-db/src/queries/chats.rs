use rusqlite::{OptionalExtension, Row, params};

use super::new_id;
use crate::models::{ChatRow, Media, MemberRow, MessageRow};
use crate::{Database, DbError, Result};

// JOIN users to fetch author_username in a single query
const MESSAGE_SELECT: &str = "SELECT m.id, m.chat_id, u.username, m.text, m.image, m.video,
            m.created_at
     FROM messages m
     JOIN users u ON u.id = m.author_id";

impl Database {
    // -- Chats --

    /// Creates a chat with the given participant set. Duplicate ids collapse.
    pub fn create_chat(&self, member_ids: &[String]) -> Result<ChatRow> {
        if member_ids.is_empty() {
            return Err(DbError::Invalid("a chat needs at least one member".into()));
        }
        let id = new_id();
        self.with_conn_mut(|conn| {
            let tx = conn.transaction()?;
            tx.execute("INSERT INTO chats (id) VALUES (?1)", [&id])?;
            for member in member_ids {
                tx.execute(
                    "INSERT OR IGNORE INTO chat_members (chat_id, user_id) VALUES (?1, ?2)",
                    params![id, member],
                )?;
            }
            let row = query_chat(&tx, &id)?.ok_or(DbError::NotFound("chat"))?;
            tx.commit()?;
            Ok(row)
        })
    }

    pub fn get_chat(&self, id: &str) -> Result<Option<ChatRow>> {
        self.with_conn(|conn| query_chat(conn, id))
    }

    pub fn list_chats_for_user(&self, user_id: &str) -> Result<Vec<ChatRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT c.id, c.created_at
                 FROM chats c
                 JOIN chat_members m ON m.chat_id = c.id
                 WHERE m.user_id = ?1
                 ORDER BY c.created_at DESC, c.rowid DESC",
            )?;
            let rows = stmt
                .query_map([user_id], |row| {
                    Ok(ChatRow {
                        id: row.get(0)?,
                        created_at: row.get(1)?,
                    })
                })?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    pub fn chat_members(&self, chat_id: &str) -> Result<Vec<MemberRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT u.username
                 FROM chat_members m
                 JOIN users u ON u.id = m.user_id
                 WHERE m.chat_id = ?1
                 ORDER BY u.username",
            )?;
            let rows = stmt
                .query_map([chat_id], |row| {
                    Ok(MemberRow {
                        username: row.get(0)?,
                    })
                })?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    pub fn is_chat_member(&self, chat_id: &str, user_id: &str) -> Result<bool> {
        self.with_conn(|conn| {
            let found = conn
                .query_row(
                    "SELECT 1 FROM chat_members WHERE chat_id = ?1 AND user_id = ?2",
                    params![chat_id, user_id],
                    |_| Ok(()),
                )
                .optional()?;
            Ok(found.is_some())
        })
    }

    // -- Messages --

    pub fn insert_message(
        &self,
        chat_id: &str,
        author_id: &str,
        text: &str,
        media: &Media,
    ) -> Result<MessageRow> {
        if text.trim().is_empty() {
            return Err(DbError::Invalid("message text may not be blank".into()));
        }
        let id = new_id();
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO messages (id, chat_id, author_id, text, image, video)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![id, chat_id, author_id, text, media.image, media.video],
            )?;
            let sql = format!("{MESSAGE_SELECT} WHERE m.id = ?1");
            let row = conn.query_row(&sql, [&id], message_from_row).optional()?;
            row.ok_or(DbError::NotFound("message"))
        })
    }

    /// Newest first. `before` is the id of the oldest message on the previous
    /// page. Paging walks `(created_at, rowid)`, so messages sharing a
    /// timestamp are neither skipped nor repeated.
    pub fn list_messages(
        &self,
        chat_id: &str,
        limit: u32,
        before: Option<&str>,
    ) -> Result<Vec<MessageRow>> {
        self.with_conn(|conn| {
            let cursor = match before {
                Some(id) => {
                    let position: (String, i64) = conn
                        .query_row(
                            "SELECT created_at, rowid FROM messages
                             WHERE id = ?1 AND chat_id = ?2",
                            params![id, chat_id],
                            |r| Ok((r.get(0)?, r.get(1)?)),
                        )
                        .optional()?
                        .ok_or_else(|| DbError::Invalid("unknown message cursor".into()))?;
                    Some(position)
                }
                None => None,
            };
            let (cursor_at, cursor_rowid) = cursor.unzip();

            let sql = format!(
                "{MESSAGE_SELECT}
                 WHERE m.chat_id = ?1
                   AND (?2 IS NULL OR (m.created_at, m.rowid) < (?2, ?3))
                 ORDER BY m.created_at DESC, m.rowid DESC
                 LIMIT ?4"
            );
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt
                .query_map(
                    params![chat_id, cursor_at, cursor_rowid, limit],
                    message_from_row,
                )?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }
}

fn query_chat(conn: &rusqlite::Connection, id: &str) -> Result<Option<ChatRow>> {
    let row = conn
        .query_row("SELECT id, created_at FROM chats WHERE id = ?1", [id], |row| {
            Ok(ChatRow {
                id: row.get(0)?,
                created_at: row.get(1)?,
            })
        })
        .optional()?;
    Ok(row)
}

fn message_from_row(row: &Row<'_>) -> rusqlite::Result<MessageRow> {
    Ok(MessageRow {
        id: row.get(0)?,
        chat_id: row.get(1)?,
        author_username: row.get(2)?,
        text: row.get(3)?,
        image: row.get(4)?,
        video: row.get(5)?,
        created_at: row.get(6)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::queries::test_support::{db, user};

    #[test]
    fn chat_membership() {
        let db = db();
        let a = user(&db, "ana");
        let b = user(&db, "ben");
        let c = user(&db, "cyd");

        let chat = db.create_chat(&[a.clone(), b.clone(), a.clone()]).unwrap();
        let members: Vec<String> = db
            .chat_members(&chat.id)
            .unwrap()
            .into_iter()
            .map(|m| m.username)
            .collect();
        assert_eq!(members, vec!["ana", "ben"]);
        assert!(db.is_chat_member(&chat.id, &b).unwrap());
        assert!(!db.is_chat_member(&chat.id, &c).unwrap());
        assert_eq!(db.list_chats_for_user(&a).unwrap().len(), 1);
        assert!(db.list_chats_for_user(&c).unwrap().is_empty());
    }

    #[test]
    fn unknown_member_rolls_back_the_chat() {
        let db = db();
        let a = user(&db, "ana");
        let result = db.create_chat(&[a.clone(), "ghost".to_string()]);
        assert!(matches!(result, Err(DbError::Invalid(_))));
        assert!(db.list_chats_for_user(&a).unwrap().is_empty());
    }

    #[test]
    fn messages_are_listed_newest_first() {
        let db = db();
        let a = user(&db, "ana");
        let chat = db.create_chat(&[a.clone()]).unwrap();
        for text in ["one", "two", "three"] {
            db.insert_message(&chat.id, &a, text, &Media::default()).unwrap();
        }
        let texts: Vec<String> = db
            .list_messages(&chat.id, 2, None)
            .unwrap()
            .into_iter()
            .map(|m| m.text)
            .collect();
        assert_eq!(texts, vec!["three", "two"]);
    }

    #[test]
    fn paging_by_cursor_has_no_gaps_or_repeats() {
        let db = db();
        let a = user(&db, "ana");
        let chat = db.create_chat(&[a.clone()]).unwrap();
        for text in ["one", "two", "three", "four", "five"] {
            db.insert_message(&chat.id, &a, text, &Media::default()).unwrap();
        }

        let mut seen = Vec::new();
        let mut before: Option<String> = None;
        loop {
            let page = db.list_messages(&chat.id, 2, before.as_deref()).unwrap();
            let Some(last) = page.last() else { break };
            before = Some(last.id.clone());
            seen.extend(page.into_iter().map(|m| m.text));
        }
        assert_eq!(seen, vec!["five", "four", "three", "two", "one"]);
    }

    #[test]
    fn cursor_from_another_chat_is_rejected() {
        let db = db();
        let a = user(&db, "ana");
        let first = db.create_chat(&[a.clone()]).unwrap();
        let second = db.create_chat(&[a.clone()]).unwrap();
        let msg = db.insert_message(&first.id, &a, "hi", &Media::default()).unwrap();

        assert!(matches!(
            db.list_messages(&second.id, 10, Some(&msg.id)),
            Err(DbError::Invalid(_))
        ));
        assert!(db.list_messages(&first.id, 10, Some(&msg.id)).unwrap().is_empty());
    }

    #[test]
    fn blank_message_is_rejected() {
        let db = db();
        let a = user(&db, "ana");
        let chat = db.create_chat(&[a.clone()]).unwrap();
        assert!(matches!(
            db.insert_message(&chat.id, &a, "  ", &Media::default()),
            Err(DbError::Invalid(_))
        ));
    }
}
