use chrono::{DateTime, Utc};
use rusqlite::{OptionalExtension, params};
use tracing::info;

use crate::{Database, DbError, Result};

/// Same layout SQLite's `datetime('now')` produces, so expiry compares as text.
const SQLITE_TIMESTAMP: &str = "%Y-%m-%d %H:%M:%S";

impl Database {
    // -- Token blacklist --

    /// Records a revoked token id. Revoking the same id twice is a `Conflict`.
    pub fn revoke_token(&self, jti: &str, expires_at: DateTime<Utc>) -> Result<()> {
        let expires = expires_at.format(SQLITE_TIMESTAMP).to_string();
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO token_blacklist (jti, expires_at) VALUES (?1, ?2)",
                params![jti, expires],
            )
            .map_err(|e| match DbError::from(e) {
                DbError::Conflict(_) => DbError::Conflict("token is already blacklisted".into()),
                other => other,
            })?;
            Ok(())
        })
    }

    pub fn is_token_revoked(&self, jti: &str) -> Result<bool> {
        self.with_conn(|conn| {
            let found = conn
                .query_row("SELECT 1 FROM token_blacklist WHERE jti = ?1", [jti], |_| Ok(()))
                .optional()?;
            Ok(found.is_some())
        })
    }

    /// Drops entries whose tokens have expired on their own.
    pub fn purge_expired_revocations(&self) -> Result<usize> {
        let removed = self.with_conn(|conn| {
            Ok(conn.execute(
                "DELETE FROM token_blacklist WHERE expires_at <= datetime('now')",
                [],
            )?)
        })?;
        if removed > 0 {
            info!(removed, "Purged expired token blacklist entries");
        }
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::queries::test_support::db;
    use chrono::Duration;

    #[test]
    fn revoke_then_check() {
        let db = db();
        assert!(!db.is_token_revoked("jti-1").unwrap());
        db.revoke_token("jti-1", Utc::now() + Duration::hours(1)).unwrap();
        assert!(db.is_token_revoked("jti-1").unwrap());
        assert!(matches!(
            db.revoke_token("jti-1", Utc::now() + Duration::hours(1)),
            Err(DbError::Conflict(_))
        ));
    }

    #[test]
    fn purge_keeps_live_entries() {
        let db = db();
        db.revoke_token("old", Utc::now() - Duration::hours(1)).unwrap();
        db.revoke_token("live", Utc::now() + Duration::hours(1)).unwrap();
        assert_eq!(db.purge_expired_revocations().unwrap(), 1);
        assert!(!db.is_token_revoked("old").unwrap());
        assert!(db.is_token_revoked("live").unwrap());
    }
}
