use rusqlite::{OptionalExtension, Row, params};

use super::new_id;
use crate::models::{FollowRow, FollowedUserRow};
use crate::{Database, DbError, Result};

/// Exact-match filters for listing follow edges.
#[derive(Debug, Clone, Default)]
pub struct FollowFilter {
    pub follower: Option<String>,
    pub following: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FollowOrdering {
    Follower,
    FollowerDesc,
    Following,
    FollowingDesc,
}

impl FollowOrdering {
    /// Parses `follower`, `following`, or either prefixed with `-`.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "follower" => Some(Self::Follower),
            "-follower" => Some(Self::FollowerDesc),
            "following" => Some(Self::Following),
            "-following" => Some(Self::FollowingDesc),
            _ => None,
        }
    }

    fn sql(self) -> &'static str {
        match self {
            Self::Follower => "follower_id ASC",
            Self::FollowerDesc => "follower_id DESC",
            Self::Following => "following_id ASC",
            Self::FollowingDesc => "following_id DESC",
        }
    }
}

impl Database {
    // -- Follows --

    /// Inserts a directed edge. A second edge for the same pair is a
    /// `Conflict`. Self-follows are accepted.
    pub fn create_follow(&self, follower_id: &str, following_id: &str) -> Result<FollowRow> {
        let id = new_id();
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO follows (id, follower_id, following_id) VALUES (?1, ?2, ?3)",
                params![id, follower_id, following_id],
            )
            .map_err(|e| match DbError::from(e) {
                DbError::Conflict(_) => DbError::Conflict("already following this user".into()),
                other => other,
            })?;
            query_follow(conn, &id)?.ok_or(DbError::NotFound("follow"))
        })
    }

    pub fn get_follow(&self, id: &str) -> Result<Option<FollowRow>> {
        self.with_conn(|conn| query_follow(conn, id))
    }

    pub fn list_follows(
        &self,
        filter: &FollowFilter,
        ordering: Option<FollowOrdering>,
    ) -> Result<Vec<FollowRow>> {
        let order = ordering.map_or("created_at ASC", FollowOrdering::sql);
        let sql = format!(
            "SELECT id, follower_id, following_id, created_at FROM follows
             WHERE (?1 IS NULL OR follower_id = ?1)
               AND (?2 IS NULL OR following_id = ?2)
             ORDER BY {order}, rowid"
        );
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt
                .query_map(params![filter.follower, filter.following], follow_from_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    /// Identities with an edge pointing at `user_id`.
    pub fn list_followers(&self, user_id: &str) -> Result<Vec<FollowedUserRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT u.id, u.username, u.image, f.created_at
                 FROM follows f
                 JOIN users u ON u.id = f.follower_id
                 WHERE f.following_id = ?1
                 ORDER BY f.created_at, f.rowid",
            )?;
            let rows = stmt
                .query_map([user_id], followed_user_from_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    /// Identities `user_id` has an edge towards.
    pub fn list_following(&self, user_id: &str) -> Result<Vec<FollowedUserRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT u.id, u.username, u.image, f.created_at
                 FROM follows f
                 JOIN users u ON u.id = f.following_id
                 WHERE f.follower_id = ?1
                 ORDER BY f.created_at, f.rowid",
            )?;
            let rows = stmt
                .query_map([user_id], followed_user_from_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    pub fn delete_follow(&self, id: &str) -> Result<()> {
        self.with_conn(|conn| {
            match conn.execute("DELETE FROM follows WHERE id = ?1", [id])? {
                0 => Err(DbError::NotFound("follow")),
                _ => Ok(()),
            }
        })
    }
}

fn query_follow(conn: &rusqlite::Connection, id: &str) -> Result<Option<FollowRow>> {
    let row = conn
        .query_row(
            "SELECT id, follower_id, following_id, created_at FROM follows WHERE id = ?1",
            [id],
            follow_from_row,
        )
        .optional()?;
    Ok(row)
}

fn follow_from_row(row: &Row<'_>) -> rusqlite::Result<FollowRow> {
    Ok(FollowRow {
        id: row.get(0)?,
        follower_id: row.get(1)?,
        following_id: row.get(2)?,
        created_at: row.get(3)?,
    })
}

fn followed_user_from_row(row: &Row<'_>) -> rusqlite::Result<FollowedUserRow> {
    Ok(FollowedUserRow {
        user_id: row.get(0)?,
        username: row.get(1)?,
        image: row.get(2)?,
        followed_at: row.get(3)?,
    })
}
