use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("{entity} '{key}' not found")]
    NotFound { entity: &'static str, key: String },

    #[error("{entity} '{key}' already exists")]
    Conflict { entity: &'static str, key: String },
}

pub type StoreResult<T> = Result<T, StoreError>;
