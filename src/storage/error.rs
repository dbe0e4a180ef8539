use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("database query failed: {message}")]
    Query { message: String },

    #[error("database connection failed: {message}")]
    Connection { message: String },
}

impl StorageError {
    pub fn from_sqlx(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_) => {
                StorageError::Connection {
                    message: err.to_string(),
                }
            }
            other => StorageError::Query {
                message: other.to_string(),
            },
        }
    }
}
