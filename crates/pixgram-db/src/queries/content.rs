use rusqlite::{OptionalExtension, Row, params};

use super::new_id;
use crate::models::{Media, PostRow, StoryRow};
use crate::{Database, DbError, Result};

const POST_SELECT: &str = "SELECT p.id, p.user_id, u.username, p.image, p.video, p.description,
            p.created_at
     FROM posts p
     JOIN users u ON u.id = p.user_id";

const STORY_SELECT: &str = "SELECT s.id, u.username, s.image, s.video, s.created_at
     FROM stories s
     JOIN users u ON u.id = s.user_id";

/// Exact-match filters for the post listing.
#[derive(Debug, Clone, Default)]
pub struct PostFilter {
    pub user: Option<String>,
    pub description: Option<String>,
}

impl Database {
    // -- Posts --

    pub fn create_post(
        &self,
        user_id: &str,
        media: &Media,
        description: Option<&str>,
    ) -> Result<PostRow> {
        media.validate()?;
        let id = new_id();
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO posts (id, user_id, image, video, description)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![id, user_id, media.image, media.video, description],
            )?;
            query_post(conn, &id)?.ok_or(DbError::NotFound("post"))
        })
    }

    pub fn get_post(&self, id: &str) -> Result<Option<PostRow>> {
        self.with_conn(|conn| query_post(conn, id))
    }

    pub fn list_posts(&self, filter: &PostFilter) -> Result<Vec<PostRow>> {
        let sql = format!(
            "{POST_SELECT}
             WHERE (?1 IS NULL OR p.user_id = ?1)
               AND (?2 IS NULL OR p.description = ?2)
             ORDER BY p.created_at DESC, p.rowid DESC"
        );
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt
                .query_map(params![filter.user, filter.description], post_from_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    pub fn list_posts_by_user(&self, user_id: &str) -> Result<Vec<PostRow>> {
        self.list_posts(&PostFilter {
            user: Some(user_id.to_string()),
            description: None,
        })
    }

    // -- Stories --

    pub fn create_story(&self, user_id: &str, media: &Media) -> Result<StoryRow> {
        media.validate()?;
        let id = new_id();
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO stories (id, user_id, image, video) VALUES (?1, ?2, ?3, ?4)",
                params![id, user_id, media.image, media.video],
            )?;
            query_story(conn, &id)?.ok_or(DbError::NotFound("story"))
        })
    }

    pub fn get_story(&self, id: &str) -> Result<Option<StoryRow>> {
        self.with_conn(|conn| query_story(conn, id))
    }

    pub fn list_stories(&self) -> Result<Vec<StoryRow>> {
        self.with_conn(|conn| {
            let sql = format!("{STORY_SELECT} ORDER BY s.created_at DESC, s.rowid DESC");
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt
                .query_map([], story_from_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    pub fn list_stories_by_user(&self, user_id: &str) -> Result<Vec<StoryRow>> {
        self.with_conn(|conn| {
            let sql = format!(
                "{STORY_SELECT} WHERE s.user_id = ?1 ORDER BY s.created_at DESC, s.rowid DESC"
            );
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt
                .query_map([user_id], story_from_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }
}

fn query_post(conn: &rusqlite::Connection, id: &str) -> Result<Option<PostRow>> {
    let sql = format!("{POST_SELECT} WHERE p.id = ?1");
    Ok(conn.query_row(&sql, [id], post_from_row).optional()?)
}

fn query_story(conn: &rusqlite::Connection, id: &str) -> Result<Option<StoryRow>> {
    let sql = format!("{STORY_SELECT} WHERE s.id = ?1");
    Ok(conn.query_row(&sql, [id], story_from_row).optional()?)
}

fn post_from_row(row: &Row<'_>) -> rusqlite::Result<PostRow> {
    Ok(PostRow {
        id: row.get(0)?,
        user_id: row.get(1)?,
        username: row.get(2)?,
        image: row.get(3)?,
        video: row.get(4)?,
        description: row.get(5)?,
        created_at: row.get(6)?,
    })
}

fn story_from_row(row: &Row<'_>) -> rusqlite::Result<StoryRow> {
    Ok(StoryRow {
        id: row.get(0)?,
        username: row.get(1)?,
        image: row.get(2)?,
        video: row.get(3)?,
        created_at: row.get(4)?,
    })
}
