use rusqlite::ErrorCode;
use rusqlite::ffi;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, DbError>;

#[derive(Debug, Error)]
pub enum DbError {
    #[error("{0} not found")]
    NotFound(&'static str),

    /// A unique constraint rejected the write.
    #[error("{0}")]
    Conflict(String),

    /// The write violates a data-model rule (check, foreign key, not null).
    #[error("{0}")]
    Invalid(String),

    #[error("database lock poisoned")]
    LockPoisoned,

    #[error(transparent)]
    Sqlite(rusqlite::Error),
}

impl From<rusqlite::Error> for DbError {
    fn from(err: rusqlite::Error) -> Self {
        if let rusqlite::Error::SqliteFailure(code, msg) = &err {
            if code.code == ErrorCode::ConstraintViolation {
                let detail = msg.clone().unwrap_or_else(|| code.to_string());
                return match code.extended_code {
                    ffi::SQLITE_CONSTRAINT_UNIQUE | ffi::SQLITE_CONSTRAINT_PRIMARYKEY => {
                        DbError::Conflict(detail)
                    }
                    ffi::SQLITE_CONSTRAINT_FOREIGNKEY => {
                        DbError::Invalid("referenced object does not exist".into())
                    }
                    _ => DbError::Invalid(detail),
                };
            }
        }
        DbError::Sqlite(err)
    }
}
