use rusqlite::{OptionalExtension, Row, params};

use super::new_id;
use crate::models::{SaveItemRow, SaveRow};
use crate::{Database, DbError, Result};

const SAVE_ITEM_SELECT: &str = "SELECT i.id, s.user_id, i.post_id, u.username, p.image
     FROM save_items i
     JOIN saves s ON s.id = i.save_id
     JOIN posts p ON p.id = i.post_id
     JOIN users u ON u.id = p.user_id";

impl Database {
    // -- Saved items --

    /// Returns the user's collection, creating it on first access. There is
    /// never more than one per user.
    pub fn get_or_create_save(&self, user_id: &str) -> Result<SaveRow> {
        let id = new_id();
        self.with_conn(|conn| {
            conn.execute(
                "INSERT OR IGNORE INTO saves (id, user_id) VALUES (?1, ?2)",
                params![id, user_id],
            )?;
            conn.query_row(
                "SELECT s.id, u.username
                 FROM saves s
                 JOIN users u ON u.id = s.user_id
                 WHERE s.user_id = ?1",
                [user_id],
                |row| {
                    Ok(SaveRow {
                        id: row.get(0)?,
                        username: row.get(1)?,
                    })
                },
            )
            .optional()?
            .ok_or(DbError::NotFound("save"))
        })
    }

    pub fn add_save_item(&self, save_id: &str, post_id: &str) -> Result<SaveItemRow> {
        let id = new_id();
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO save_items (id, save_id, post_id) VALUES (?1, ?2, ?3)",
                params![id, save_id, post_id],
            )?;
            query_save_item(conn, &id)?.ok_or(DbError::NotFound("save item"))
        })
    }

    pub fn get_save_item(&self, id: &str) -> Result<Option<SaveItemRow>> {
        self.with_conn(|conn| query_save_item(conn, id))
    }

    pub fn list_save_items(&self, save_id: &str) -> Result<Vec<SaveItemRow>> {
        self.with_conn(|conn| {
            let sql =
                format!("{SAVE_ITEM_SELECT} WHERE i.save_id = ?1 ORDER BY i.created_at, i.rowid");
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt
                .query_map([save_id], save_item_from_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    pub fn delete_save_item(&self, id: &str) -> Result<()> {
        self.with_conn(|conn| {
            match conn.execute("DELETE FROM save_items WHERE id = ?1", [id])? {
                0 => Err(DbError::NotFound("save item")),
                _ => Ok(()),
            }
        })
    }
}

fn query_save_item(conn: &rusqlite::Connection, id: &str) -> Result<Option<SaveItemRow>> {
    let sql = format!("{SAVE_ITEM_SELECT} WHERE i.id = ?1");
    Ok(conn.query_row(&sql, [id], save_item_from_row).optional()?)
}

fn save_item_from_row(row: &Row<'_>) -> rusqlite::Result<SaveItemRow> {
    Ok(SaveItemRow {
        id: row.get(0)?,
        owner_id: row.get(1)?,
        post_id: row.get(2)?,
        post_username: row.get(3)?,
        post_image: row.get(4)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::queries::test_support::{db, post, user};

    #[test]
    fn one_collection_per_user() {
        let db = db();
        let a = user(&db, "ana");
        let first = db.get_or_create_save(&a).unwrap();
        let second = db.get_or_create_save(&a).unwrap();
        assert_eq!(first.id, second.id);
        assert_eq!(first.username, "ana");

        let count: i64 = db
            .with_conn(|conn| {
                Ok(conn.query_row("SELECT COUNT(*) FROM saves WHERE user_id = ?1", [&a], |r| {
                    r.get(0)
                })?)
            })
            .unwrap();
        assert_eq!(count, 1);
    }

    #[test]
    fn direct_second_collection_is_a_conflict() {
        let db = db();
        let a = user(&db, "ana");
        db.get_or_create_save(&a).unwrap();
        let result = db.with_conn(|conn| {
            conn.execute("INSERT INTO saves (id, user_id) VALUES ('dup', ?1)", [&a])?;
            Ok(())
        });
        assert!(matches!(result, Err(DbError::Conflict(_))));
    }

    #[test]
    fn same_post_in_several_collections() {
        let db = db();
        let a = user(&db, "ana");
        let b = user(&db, "ben");
        let p = post(&db, &a);

        let save_a = db.get_or_create_save(&a).unwrap();
        let save_b = db.get_or_create_save(&b).unwrap();
        let item_a = db.add_save_item(&save_a.id, &p.id).unwrap();
        db.add_save_item(&save_b.id, &p.id).unwrap();

        assert_eq!(item_a.owner_id, a);
        assert_eq!(item_a.post_id, p.id);
        assert_eq!(item_a.post_username, "ana");
        assert_eq!(item_a.post_image.as_deref(), Some("p.jpg"));
        assert_eq!(db.list_save_items(&save_a.id).unwrap().len(), 1);
        assert_eq!(db.list_save_items(&save_b.id).unwrap().len(), 1);

        db.delete_save_item(&item_a.id).unwrap();
        assert!(db.list_save_items(&save_a.id).unwrap().is_empty());
        assert_eq!(db.list_save_items(&save_b.id).unwrap().len(), 1);
    }
}
