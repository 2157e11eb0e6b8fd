use crate::application::repos::RepoError;

pub fn map_sqlx_error(err: sqlx::Error) -> RepoError {
    match err {
        sqlx::Error::RowNotFound => RepoError::NotFound,
        sqlx::Error::Database(db) if db.message().contains("UNIQUE constraint failed") => {
            RepoError::Duplicate {
                // SQLite reports the column list after the colon.
                constraint: db
                    .message()
                    .split(':')
                    .nth(1)
                    .map(str::trim)
                    .unwrap_or("unknown")
                    .to_string(),
            }
        }
        sqlx::Error::Database(db) if db.message().contains("constraint failed") => {
            RepoError::Integrity {
                message: db.message().to_string(),
            }
        }
        other => RepoError::from_persistence(other),
    }
}
