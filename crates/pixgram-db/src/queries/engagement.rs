use rusqlite::{OptionalExtension, Row, params};

use super::new_id;
use crate::models::{CommentLikeRow, CommentRow, PostLikeRow};
use crate::{Database, DbError, Result};

const POST_LIKE_SELECT: &str = "SELECT l.id, l.user_id, u.username, l.is_liked, l.created_at
     FROM post_likes l
     JOIN users u ON u.id = l.user_id";

const COMMENT_SELECT: &str = "SELECT c.id, u.username, c.post_id, c.text, c.parent_id, c.created_at
     FROM comments c
     JOIN users u ON u.id = c.user_id";

const COMMENT_LIKE_SELECT: &str = "SELECT l.id, l.user_id, u.username, l.is_liked, l.created_at
     FROM comment_likes l
     JOIN users u ON u.id = l.user_id";

impl Database {
    // -- Post likes --

    /// Inserts the toggle row for (user, post). A second row for the same
    /// pair is a `Conflict`; flip the existing row with `set_post_like`.
    pub fn create_post_like(
        &self,
        user_id: &str,
        post_id: &str,
        is_liked: bool,
    ) -> Result<PostLikeRow> {
        let id = new_id();
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO post_likes (id, user_id, post_id, is_liked) VALUES (?1, ?2, ?3, ?4)",
                params![id, user_id, post_id, is_liked],
            )
            .map_err(|e| match DbError::from(e) {
                DbError::Conflict(_) => {
                    DbError::Conflict("post is already liked by this user".into())
                }
                other => other,
            })?;
            query_post_like(conn, &id)?.ok_or(DbError::NotFound("post like"))
        })
    }

    pub fn set_post_like(&self, id: &str, is_liked: bool) -> Result<PostLikeRow> {
        self.with_conn(|conn| {
            let changed = conn.execute(
                "UPDATE post_likes SET is_liked = ?2 WHERE id = ?1",
                params![id, is_liked],
            )?;
            if changed == 0 {
                return Err(DbError::NotFound("post like"));
            }
            query_post_like(conn, id)?.ok_or(DbError::NotFound("post like"))
        })
    }

    pub fn get_post_like(&self, id: &str) -> Result<Option<PostLikeRow>> {
        self.with_conn(|conn| query_post_like(conn, id))
    }

    pub fn list_post_likes(&self) -> Result<Vec<PostLikeRow>> {
        self.with_conn(|conn| {
            let sql = format!("{POST_LIKE_SELECT} ORDER BY l.created_at, l.rowid");
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt
                .query_map([], post_like_from_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    pub fn list_post_likes_for_post(&self, post_id: &str) -> Result<Vec<PostLikeRow>> {
        self.with_conn(|conn| {
            let sql =
                format!("{POST_LIKE_SELECT} WHERE l.post_id = ?1 ORDER BY l.created_at, l.rowid");
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt
                .query_map([post_id], post_like_from_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    // -- Comments --

    /// A reply's parent must be a comment on the same post.
    pub fn create_comment(
        &self,
        user_id: &str,
        post_id: &str,
        text: Option<&str>,
        parent_id: Option<&str>,
    ) -> Result<CommentRow> {
        let id = new_id();
        self.with_conn(|conn| {
            if let Some(parent_id) = parent_id {
                let parent_post: Option<String> = conn
                    .query_row("SELECT post_id FROM comments WHERE id = ?1", [parent_id], |r| {
                        r.get(0)
                    })
                    .optional()?;
                match parent_post {
                    Some(p) if p == post_id => {}
                    Some(_) => {
                        return Err(DbError::Invalid(
                            "parent comment belongs to another post".into(),
                        ));
                    }
                    None => return Err(DbError::Invalid("parent comment does not exist".into())),
                }
            }

            conn.execute(
                "INSERT INTO comments (id, user_id, post_id, text, parent_id)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![id, user_id, post_id, text, parent_id],
            )?;
            query_comment(conn, &id)?.ok_or(DbError::NotFound("comment"))
        })
    }

    pub fn get_comment(&self, id: &str) -> Result<Option<CommentRow>> {
        self.with_conn(|conn| query_comment(conn, id))
    }

    pub fn list_comments(&self) -> Result<Vec<CommentRow>> {
        self.with_conn(|conn| {
            let sql = format!("{COMMENT_SELECT} ORDER BY c.created_at, c.rowid");
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt
                .query_map([], comment_from_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    pub fn list_comments_for_post(&self, post_id: &str) -> Result<Vec<CommentRow>> {
        self.with_conn(|conn| {
            let sql =
                format!("{COMMENT_SELECT} WHERE c.post_id = ?1 ORDER BY c.created_at, c.rowid");
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt
                .query_map([post_id], comment_from_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    // -- Comment likes --

    pub fn create_comment_like(
        &self,
        user_id: &str,
        comment_id: &str,
        is_liked: bool,
    ) -> Result<CommentLikeRow> {
        let id = new_id();
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO comment_likes (id, user_id, comment_id, is_liked)
                 VALUES (?1, ?2, ?3, ?4)",
                params![id, user_id, comment_id, is_liked],
            )
            .map_err(|e| match DbError::from(e) {
                DbError::Conflict(_) => {
                    DbError::Conflict("comment is already liked by this user".into())
                }
                other => other,
            })?;
            query_comment_like(conn, &id)?.ok_or(DbError::NotFound("comment like"))
        })
    }

    pub fn set_comment_like(&self, id: &str, is_liked: bool) -> Result<CommentLikeRow> {
        self.with_conn(|conn| {
            let changed = conn.execute(
                "UPDATE comment_likes SET is_liked = ?2 WHERE id = ?1",
                params![id, is_liked],
            )?;
            if changed == 0 {
                return Err(DbError::NotFound("comment like"));
            }
            query_comment_like(conn, id)?.ok_or(DbError::NotFound("comment like"))
        })
    }

    pub fn get_comment_like(&self, id: &str) -> Result<Option<CommentLikeRow>> {
        self.with_conn(|conn| query_comment_like(conn, id))
    }

    pub fn list_comment_likes(&self) -> Result<Vec<CommentLikeRow>> {
        self.with_conn(|conn| {
            let sql = format!("{COMMENT_LIKE_SELECT} ORDER BY l.created_at, l.rowid");
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt
                .query_map([], comment_like_from_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }
}

fn query_post_like(conn: &rusqlite::Connection, id: &str) -> Result<Option<PostLikeRow>> {
    let sql = format!("{POST_LIKE_SELECT} WHERE l.id = ?1");
    Ok(conn.query_row(&sql, [id], post_like_from_row).optional()?)
}

fn query_comment(conn: &rusqlite::Connection, id: &str) -> Result<Option<CommentRow>> {
    let sql = format!("{COMMENT_SELECT} WHERE c.id = ?1");
    Ok(conn.query_row(&sql, [id], comment_from_row).optional()?)
}

fn query_comment_like(conn: &rusqlite::Connection, id: &str) -> Result<Option<CommentLikeRow>> {
    let sql = format!("{COMMENT_LIKE_SELECT} WHERE l.id = ?1");
    Ok(conn.query_row(&sql, [id], comment_like_from_row).optional()?)
}

fn post_like_from_row(row: &Row<'_>) -> rusqlite::Result<PostLikeRow> {
    Ok(PostLikeRow {
        id: row.get(0)?,
        user_id: row.get(1)?,
        username: row.get(2)?,
        is_liked: row.get(3)?,
        created_at: row.get(4)?,
    })
}

fn comment_from_row(row: &Row<'_>) -> rusqlite::Result<CommentRow> {
    Ok(CommentRow {
        id: row.get(0)?,
        username: row.get(1)?,
        post_id: row.get(2)?,
        text: row.get(3)?,
        parent_id: row.get(4)?,
        created_at: row.get(5)?,
    })
}

fn comment_like_from_row(row: &Row<'_>) -> rusqlite::Result<CommentLikeRow> {
    Ok(CommentLikeRow {
        id: row.get(0)?,
        user_id: row.get(1)?,
        username: row.get(2)?,
        is_liked: row.get(3)?,
        created_at: row.get(4)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::queries::test_support::{db, post, user};

    #[test]
    fn second_like_row_is_rejected_and_toggle_updates() {
        let db = db();
        let a = user(&db, "ana");
        let p = post(&db, &a);

        let like = db.create_post_like(&a, &p.id, true).unwrap();
        assert!(like.is_liked);
        assert!(matches!(
            db.create_post_like(&a, &p.id, false),
            Err(DbError::Conflict(_))
        ));

        let toggled = db.set_post_like(&like.id, false).unwrap();
        assert_eq!(toggled.id, like.id);
        assert!(!toggled.is_liked);
        assert_eq!(db.list_post_likes_for_post(&p.id).unwrap().len(), 1);
    }

    #[test]
    fn toggling_missing_like_is_not_found() {
        let db = db();
        assert!(matches!(db.set_post_like("nope", true), Err(DbError::NotFound(_))));
        assert!(matches!(db.set_comment_like("nope", true), Err(DbError::NotFound(_))));
    }

    #[test]
    fn like_on_missing_post_is_invalid() {
        let db = db();
        let a = user(&db, "ana");
        assert!(matches!(
            db.create_post_like(&a, "ghost", true),
            Err(DbError::Invalid(_))
        ));
    }

    #[test]
    fn replies_must_share_the_post() {
        let db = db();
        let a = user(&db, "ana");
        let p1 = post(&db, &a);
        let p2 = post(&db, &a);

        let root = db.create_comment(&a, &p1.id, Some("first"), None).unwrap();
        let reply = db
            .create_comment(&a, &p1.id, Some("reply"), Some(&root.id))
            .unwrap();
        assert_eq!(reply.parent_id.as_deref(), Some(root.id.as_str()));

        // Nested reply to a reply.
        db.create_comment(&a, &p1.id, None, Some(&reply.id)).unwrap();

        assert!(matches!(
            db.create_comment(&a, &p2.id, Some("stray"), Some(&root.id)),
            Err(DbError::Invalid(_))
        ));
        assert!(matches!(
            db.create_comment(&a, &p1.id, Some("orphan"), Some("ghost")),
            Err(DbError::Invalid(_))
        ));
        assert_eq!(db.list_comments_for_post(&p1.id).unwrap().len(), 3);
        assert!(db.list_comments_for_post(&p2.id).unwrap().is_empty());
    }

    #[test]
    fn comment_likes_mirror_post_likes() {
        let db = db();
        let a = user(&db, "ana");
        let b = user(&db, "ben");
        let p = post(&db, &a);
        let c = db.create_comment(&b, &p.id, Some("nice"), None).unwrap();

        let like = db.create_comment_like(&a, &c.id, false).unwrap();
        assert!(matches!(
            db.create_comment_like(&a, &c.id, true),
            Err(DbError::Conflict(_))
        ));
        db.create_comment_like(&b, &c.id, true).unwrap();

        assert!(db.set_comment_like(&like.id, true).unwrap().is_liked);
        assert_eq!(db.list_comment_likes().unwrap().len(), 2);
    }

    #[test]
    fn rows_carry_author_and_target() {
        let db = db();
        let a = user(&db, "ana");
        let b = user(&db, "ben");
        let p = post(&db, &a);

        let c = db.create_comment(&b, &p.id, Some("nice"), None).unwrap();
        assert_eq!(c.username, "ben");
        assert_eq!(c.post_id, p.id);
        assert_eq!(c.text.as_deref(), Some("nice"));
        assert!(c.parent_id.is_none());

        let post_like = db.create_post_like(&b, &p.id, true).unwrap();
        assert_eq!(post_like.user_id, b);
        assert_eq!(post_like.username, "ben");
        assert!(post_like.is_liked);

        let comment_like = db.create_comment_like(&a, &c.id, false).unwrap();
        assert_eq!(comment_like.user_id, a);
        assert_eq!(comment_like.username, "ana");
        assert!(!comment_like.is_liked);
    }
}
