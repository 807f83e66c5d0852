use thiserror::Error;
use workflow_storage::StoreError;

#[derive(Debug, Error)]
pub enum SchedulerError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("recurring scheduler store error: {0}")]
    RedisStore(String),

    #[error("invalid schedule: {0}")]
    Validation(String),

    #[error("task '{0}' not found or cancelled")]
    TaskUnavailable(String),

    #[error("schedule '{0}' not found")]
    NotFound(uuid::Uuid),

    #[error("schedule '{0}' is not cancelled and cannot be rescheduled")]
    NotCancelled(uuid::Uuid),
}

impl From<redis::RedisError> for SchedulerError {
    fn from(e: redis::RedisError) -> Self {
        SchedulerError::RedisStore(e.to_string())
    }
}

pub type SchedulerResult<T> = Result<T, SchedulerError>;
