use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use chrono::Duration;

/// Placeholder JWT secrets that MUST NOT be used.
const PLACEHOLDER_SECRETS: &[&str] = &[
    "change-me-to-a-random-string",
    "dev-secret-change-me",
];

#[derive(Debug, Clone)]
pub struct Config {
    pub jwt_secret: String,
    pub db_path: PathBuf,
    pub addr: SocketAddr,
    pub access_ttl: Duration,
    pub refresh_ttl: Duration,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from `PIXGRAM_*` variables resolved by `lookup`.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let jwt_secret = lookup("PIXGRAM_JWT_SECRET").unwrap_or_default();
        if jwt_secret.is_empty() || PLACEHOLDER_SECRETS.contains(&jwt_secret.as_str()) {
            bail!("PIXGRAM_JWT_SECRET is unset or still a placeholder");
        }

        let db_path = lookup("PIXGRAM_DB_PATH").unwrap_or_else(|| "pixgram.db".into());
        let host = lookup("PIXGRAM_HOST").unwrap_or_else(|| "0.0.0.0".into());
        let port: u16 = lookup("PIXGRAM_PORT")
            .unwrap_or_else(|| "3000".into())
            .parse()
            .context("PIXGRAM_PORT must be a port number")?;
        let addr: SocketAddr = format!("{}:{}", host, port)
            .parse()
            .context("PIXGRAM_HOST must be an IP address")?;

        let access_minutes: i64 = lookup("PIXGRAM_ACCESS_TTL_MINUTES")
            .unwrap_or_else(|| "60".into())
            .parse()
            .context("PIXGRAM_ACCESS_TTL_MINUTES must be an integer")?;
        let refresh_days: i64 = lookup("PIXGRAM_REFRESH_TTL_DAYS")
            .unwrap_or_else(|| "1".into())
            .parse()
            .context("PIXGRAM_REFRESH_TTL_DAYS must be an integer")?;
        if access_minutes <= 0 || refresh_days <= 0 {
            bail!("token lifetimes must be positive");
        }

        Ok(Self {
            jwt_secret,
            db_path: db_path.into(),
            addr,
            access_ttl: Duration::minutes(access_minutes),
            refresh_ttl: Duration::days(refresh_days),
        })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_apply_when_only_the_secret_is_set() {
        let config = Config::from_lookup(lookup(&[("PIXGRAM_JWT_SECRET", "s3cr3t")])).unwrap();
        assert_eq!(config.db_path, PathBuf::from("pixgram.db"));
        assert_eq!(config.addr, "0.0.0.0:3000".parse::<SocketAddr>().unwrap());
        assert_eq!(config.access_ttl, Duration::minutes(60));
        assert_eq!(config.refresh_ttl, Duration::days(1));
    }

    #[test]
    fn placeholder_secrets_are_refused() {
        assert!(Config::from_lookup(lookup(&[])).is_err());
        assert!(
            Config::from_lookup(lookup(&[("PIXGRAM_JWT_SECRET", "dev-secret-change-me")])).is_err()
        );
    }

    #[test]
    fn overrides_are_parsed() {
        let config = Config::from_lookup(lookup(&[
            ("PIXGRAM_JWT_SECRET", "s3cr3t"),
            ("PIXGRAM_HOST", "127.0.0.1"),
            ("PIXGRAM_PORT", "8080"),
            ("PIXGRAM_ACCESS_TTL_MINUTES", "5"),
            ("PIXGRAM_REFRESH_TTL_DAYS", "7"),
        ]))
        .unwrap();
        assert_eq!(config.addr, "127.0.0.1:8080".parse::<SocketAddr>().unwrap());
        assert_eq!(config.access_ttl, Duration::minutes(5));
        assert_eq!(config.refresh_ttl, Duration::days(7));

        let bad_port = lookup(&[("PIXGRAM_JWT_SECRET", "s3cr3t"), ("PIXGRAM_PORT", "http")]);
        assert!(Config::from_lookup(bad_port).is_err());
    }
}
