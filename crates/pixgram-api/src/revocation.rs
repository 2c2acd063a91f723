//! Refresh-token revocation. Handlers only see the `RevocationStore` trait;
//! the server wires in the database-backed store.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use anyhow::{Result, anyhow, bail};
use chrono::{DateTime, Utc};
use tracing::info;

use pixgram_db::Database;

pub trait RevocationStore: Send + Sync {
    /// Blacklists `jti` until `expires_at`. Fails if it is already revoked.
    fn revoke(&self, jti: &str, expires_at: DateTime<Utc>) -> Result<()>;

    fn is_revoked(&self, jti: &str) -> Result<bool>;
}

/// Blacklist persisted in the `token_blacklist` table.
pub struct DbRevocationStore {
    db: Arc<Database>,
}

impl DbRevocationStore {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }
}

impl RevocationStore for DbRevocationStore {
    fn revoke(&self, jti: &str, expires_at: DateTime<Utc>) -> Result<()> {
        self.db.revoke_token(jti, expires_at)?;
        info!(jti = %jti, "Refresh token blacklisted");
        Ok(())
    }

    fn is_revoked(&self, jti: &str) -> Result<bool> {
        Ok(self.db.is_token_revoked(jti)?)
    }
}

/// Process-local blacklist.
#[derive(Default)]
pub struct MemoryRevocationStore {
    revoked: Mutex<HashMap<String, DateTime<Utc>>>,
}

impl RevocationStore for MemoryRevocationStore {
    fn revoke(&self, jti: &str, expires_at: DateTime<Utc>) -> Result<()> {
        let mut revoked = self
            .revoked
            .lock()
            .map_err(|e| anyhow!("Revocation lock poisoned: {}", e))?;
        revoked.retain(|_, exp| *exp > Utc::now());
        if revoked.contains_key(jti) {
            bail!("token is already blacklisted");
        }
        revoked.insert(jti.to_string(), expires_at);
        Ok(())
    }

    fn is_revoked(&self, jti: &str) -> Result<bool> {
        let revoked = self
            .revoked
            .lock()
            .map_err(|e| anyhow!("Revocation lock poisoned: {}", e))?;
        Ok(revoked.contains_key(jti))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn exercise(store: &dyn RevocationStore) {
        let exp = Utc::now() + Duration::hours(1);
        assert!(!store.is_revoked("a").unwrap());
        store.revoke("a", exp).unwrap();
        assert!(store.is_revoked("a").unwrap());
        assert!(store.revoke("a", exp).is_err());
        assert!(!store.is_revoked("b").unwrap());
    }

    #[test]
    fn memory_store() {
        exercise(&MemoryRevocationStore::default());
    }

    #[test]
    fn database_store() {
        let db = Arc::new(Database::open_in_memory().unwrap());
        exercise(&DbRevocationStore::new(db));
    }
}
