use rusqlite::Connection;
use tracing::info;

use crate::Result;

pub fn run(conn: &Connection) -> Result<()> {
    conn.execute_batch("CREATE TABLE IF NOT EXISTS schema_version (version INTEGER NOT NULL);")?;

    let version: i64 = conn.query_row(
        "SELECT COALESCE(MAX(version), 0) FROM schema_version",
        [],
        |r| r.get(0),
    )?;

    if version < 1 {
        info!("Running migration v1 (initial schema)");
        conn.execute_batch(
            "
            CREATE TABLE users (
                id            TEXT PRIMARY KEY,
                username      TEXT NOT NULL UNIQUE,
                email         TEXT,
                password      TEXT NOT NULL,
                first_name    TEXT NOT NULL DEFAULT '',
                last_name     TEXT NOT NULL DEFAULT '',
                phone_number  TEXT,
                age           INTEGER CHECK (age IS NULL OR age BETWEEN 15 AND 85),
                bio           TEXT,
                image         TEXT,
                website       TEXT,
                created_at    TEXT NOT NULL DEFAULT (datetime('now'))
            );

            CREATE TABLE follows (
                id            TEXT PRIMARY KEY,
                follower_id   TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
                following_id  TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
                created_at    TEXT NOT NULL DEFAULT (datetime('now')),
                UNIQUE(follower_id, following_id)
            );

            CREATE INDEX idx_follows_following ON follows(following_id);

            CREATE TABLE posts (
                id           TEXT PRIMARY KEY,
                user_id      TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
                image        TEXT,
                video        TEXT,
                description  TEXT,
                created_at   TEXT NOT NULL DEFAULT (datetime('now')),
                CHECK (image IS NOT NULL OR video IS NOT NULL)
            );

            CREATE INDEX idx_posts_user ON posts(user_id, created_at);

            CREATE TABLE stories (
                id          TEXT PRIMARY KEY,
                user_id     TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
                image       TEXT,
                video       TEXT,
                created_at  TEXT NOT NULL DEFAULT (datetime('now')),
                CHECK (image IS NOT NULL OR video IS NOT NULL)
            );

            CREATE INDEX idx_stories_user ON stories(user_id, created_at);

            CREATE TABLE post_likes (
                id          TEXT PRIMARY KEY,
                user_id     TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
                post_id     TEXT NOT NULL REFERENCES posts(id) ON DELETE CASCADE,
                is_liked    INTEGER NOT NULL DEFAULT 0,
                created_at  TEXT NOT NULL DEFAULT (datetime('now')),
                UNIQUE(user_id, post_id)
            );

            CREATE INDEX idx_post_likes_post ON post_likes(post_id);

            CREATE TABLE comments (
                id          TEXT PRIMARY KEY,
                user_id     TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
                post_id     TEXT NOT NULL REFERENCES posts(id) ON DELETE CASCADE,
                text        TEXT,
                parent_id   TEXT REFERENCES comments(id) ON DELETE CASCADE,
                created_at  TEXT NOT NULL DEFAULT (datetime('now'))
            );

            CREATE INDEX idx_comments_post ON comments(post_id, created_at);

            CREATE TABLE comment_likes (
                id          TEXT PRIMARY KEY,
                user_id     TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
                comment_id  TEXT NOT NULL REFERENCES comments(id) ON DELETE CASCADE,
                is_liked    INTEGER NOT NULL DEFAULT 0,
                created_at  TEXT NOT NULL DEFAULT (datetime('now')),
                UNIQUE(user_id, comment_id)
            );

            CREATE INDEX idx_comment_likes_comment ON comment_likes(comment_id);

            CREATE TABLE saves (
                id       TEXT PRIMARY KEY,
                user_id  TEXT NOT NULL UNIQUE REFERENCES users(id) ON DELETE CASCADE
            );

            CREATE TABLE save_items (
                id          TEXT PRIMARY KEY,
                save_id     TEXT NOT NULL REFERENCES saves(id) ON DELETE CASCADE,
                post_id     TEXT NOT NULL REFERENCES posts(id) ON DELETE CASCADE,
                created_at  TEXT NOT NULL DEFAULT (datetime('now'))
            );

            CREATE INDEX idx_save_items_save ON save_items(save_id, created_at);

            CREATE TABLE chats (
                id          TEXT PRIMARY KEY,
                created_at  TEXT NOT NULL DEFAULT (datetime('now'))
            );

            CREATE TABLE chat_members (
                chat_id  TEXT NOT NULL REFERENCES chats(id) ON DELETE CASCADE,
                user_id  TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
                PRIMARY KEY (chat_id, user_id)
            );

            CREATE INDEX idx_chat_members_user ON chat_members(user_id);

            CREATE TABLE messages (
                id          TEXT PRIMARY KEY,
                chat_id     TEXT NOT NULL REFERENCES chats(id) ON DELETE CASCADE,
                author_id   TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
                text        TEXT NOT NULL,
                image       TEXT,
                video       TEXT,
                created_at  TEXT NOT NULL DEFAULT (datetime('now'))
            );

            CREATE INDEX idx_messages_chat ON messages(chat_id, created_at);

            CREATE TABLE token_blacklist (
                jti         TEXT PRIMARY KEY,
                expires_at  TEXT NOT NULL
            );

            INSERT INTO schema_version (version) VALUES (1);
            ",
        )?;
    }

    info!("Database migrations complete");
    Ok(())
}
