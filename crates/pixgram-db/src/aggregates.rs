//! Derived counts over reverse relations. Every accessor is a single
//! `COUNT(*)` recomputed per call; an entity with no related rows counts 0.

use rusqlite::Connection;

use crate::{Database, Result};

impl Database {
    /// Edges pointing at the user.
    pub fn count_followers(&self, user_id: &str) -> Result<u64> {
        self.with_conn(|conn| {
            count(conn, "SELECT COUNT(*) FROM follows WHERE following_id = ?1", user_id)
        })
    }

    /// Edges leaving the user.
    pub fn count_following(&self, user_id: &str) -> Result<u64> {
        self.with_conn(|conn| {
            count(conn, "SELECT COUNT(*) FROM follows WHERE follower_id = ?1", user_id)
        })
    }

    pub fn count_posts(&self, user_id: &str) -> Result<u64> {
        self.with_conn(|conn| count(conn, "SELECT COUNT(*) FROM posts WHERE user_id = ?1", user_id))
    }

    /// Counts like rows, whatever their flag.
    pub fn count_post_likes(&self, post_id: &str) -> Result<u64> {
        self.with_conn(|conn| {
            count(conn, "SELECT COUNT(*) FROM post_likes WHERE post_id = ?1", post_id)
        })
    }

    pub fn count_comments(&self, post_id: &str) -> Result<u64> {
        self.with_conn(|conn| {
            count(conn, "SELECT COUNT(*) FROM comments WHERE post_id = ?1", post_id)
        })
    }

    pub fn count_comment_likes(&self, comment_id: &str) -> Result<u64> {
        self.with_conn(|conn| {
            count(conn, "SELECT COUNT(*) FROM comment_likes WHERE comment_id = ?1", comment_id)
        })
    }
}

fn count(conn: &Connection, sql: &str, key: &str) -> Result<u64> {
    let n: i64 = conn.query_row(sql, [key], |r| r.get(0))?;
    Ok(n.max(0) as u64)
}

#[cfg(test)]
mod tests {
    use crate::models::Media;
    use crate::queries::test_support::{db, post, user};

    #[test]
    fn counts_are_zero_without_rows() {
        let db = db();
        let a = user(&db, "ana");
        let p = post(&db, &a);
        let c = db.create_comment(&a, &p.id, Some("hi"), None).unwrap();

        assert_eq!(db.count_followers(&a).unwrap(), 0);
        assert_eq!(db.count_following(&a).unwrap(), 0);
        assert_eq!(db.count_post_likes(&p.id).unwrap(), 0);
        assert_eq!(db.count_comment_likes(&c.id).unwrap(), 0);
        // Unknown ids are not an error either.
        assert_eq!(db.count_posts("ghost").unwrap(), 0);
        assert_eq!(db.count_comments("ghost").unwrap(), 0);
    }

    #[test]
    fn counts_match_row_counts() {
        let db = db();
        let a = user(&db, "ana");
        let b = user(&db, "ben");
        let c = user(&db, "cyd");
        db.create_follow(&b, &a).unwrap();
        db.create_follow(&c, &a).unwrap();
        db.create_follow(&a, &c).unwrap();

        assert_eq!(db.count_followers(&a).unwrap(), 2);
        assert_eq!(db.count_following(&a).unwrap(), 1);
        assert_eq!(db.count_followers(&c).unwrap(), 1);
        assert_eq!(db.count_following(&b).unwrap(), 1);

        let p = post(&db, &a);
        db.create_post(&a, &Media::new(None, Some("v.mp4".into())), None)
            .unwrap();
        assert_eq!(db.count_posts(&a).unwrap(), 2);
        assert_eq!(db.count_posts(&b).unwrap(), 0);

        db.create_post_like(&b, &p.id, true).unwrap();
        db.create_post_like(&c, &p.id, false).unwrap();
        assert_eq!(db.count_post_likes(&p.id).unwrap(), 2);

        let comment = db.create_comment(&b, &p.id, Some("wow"), None).unwrap();
        db.create_comment(&c, &p.id, Some("reply"), Some(&comment.id))
            .unwrap();
        assert_eq!(db.count_comments(&p.id).unwrap(), 2);

        db.create_comment_like(&a, &comment.id, true).unwrap();
        assert_eq!(db.count_comment_likes(&comment.id).unwrap(), 1);
    }

    #[test]
    fn deleting_an_edge_updates_counts() {
        let db = db();
        let a = user(&db, "ana");
        let b = user(&db, "ben");
        let edge = db.create_follow(&b, &a).unwrap();
        assert_eq!(db.count_followers(&a).unwrap(), 1);
        db.delete_follow(&edge.id).unwrap();
        assert_eq!(db.count_followers(&a).unwrap(), 0);
    }
}
