use anyhow::{Result, bail};
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use uuid::Uuid;

use pixgram_types::api::{Claims, TokenType};

/// Signing secret and token lifetimes.
#[derive(Debug, Clone)]
pub struct AuthSettings {
    pub jwt_secret: String,
    pub access_ttl: Duration,
    pub refresh_ttl: Duration,
}

impl AuthSettings {
    pub fn new(jwt_secret: impl Into<String>) -> Self {
        Self {
            jwt_secret: jwt_secret.into(),
            access_ttl: Duration::minutes(60),
            refresh_ttl: Duration::days(1),
        }
    }
}

#[derive(Debug, Clone)]
pub struct TokenPair {
    pub access: String,
    pub refresh: String,
}

pub fn issue_pair(settings: &AuthSettings, user_id: Uuid, username: &str) -> Result<TokenPair> {
    Ok(TokenPair {
        access: issue(settings, user_id, username, TokenType::Access)?,
        refresh: issue(settings, user_id, username, TokenType::Refresh)?,
    })
}

pub fn issue(
    settings: &AuthSettings,
    user_id: Uuid,
    username: &str,
    token_type: TokenType,
) -> Result<String> {
    let ttl = match token_type {
        TokenType::Access => settings.access_ttl,
        TokenType::Refresh => settings.refresh_ttl,
    };
    let claims = Claims {
        sub: user_id,
        username: username.to_string(),
        exp: (Utc::now() + ttl).timestamp() as usize,
        jti: Uuid::new_v4(),
        token_type,
    };

    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(settings.jwt_secret.as_bytes()),
    )?;

    Ok(token)
}

/// Verifies signature and expiry, and that the token is of the expected kind.
pub fn verify(secret: &str, token: &str, expected: TokenType) -> Result<Claims> {
    let data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )?;
    if data.claims.token_type != expected {
        bail!("expected {:?} token, got {:?}", expected, data.claims.token_type);
    }
    Ok(data.claims)
}

pub fn expires_at(claims: &Claims) -> DateTime<Utc> {
    DateTime::from_timestamp(claims.exp as i64, 0).unwrap_or_else(Utc::now)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pair_halves_are_not_interchangeable() {
        let settings = AuthSettings::new("test-secret");
        let user = Uuid::new_v4();
        let pair = issue_pair(&settings, user, "ana").unwrap();

        let access = verify("test-secret", &pair.access, TokenType::Access).unwrap();
        assert_eq!(access.sub, user);
        assert!(verify("test-secret", &pair.access, TokenType::Refresh).is_err());
        assert!(verify("test-secret", &pair.refresh, TokenType::Access).is_err());

        let refresh = verify("test-secret", &pair.refresh, TokenType::Refresh).unwrap();
        assert_ne!(refresh.jti, access.jti);
        assert!(refresh.exp > access.exp);
    }

    #[test]
    fn wrong_secret_fails() {
        let settings = AuthSettings::new("one");
        let token = issue(&settings, Uuid::new_v4(), "ana", TokenType::Access).unwrap();
        assert!(verify("two", &token, TokenType::Access).is_err());
    }

    #[test]
    fn expired_token_fails() {
        let mut settings = AuthSettings::new("s");
        settings.access_ttl = Duration::minutes(-10);
        let token = issue(&settings, Uuid::new_v4(), "ana", TokenType::Access).unwrap();
        assert!(verify("s", &token, TokenType::Access).is_err());
    }
}
