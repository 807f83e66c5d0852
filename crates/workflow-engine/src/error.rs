use thiserror::Error;
use workflow_storage::StoreError;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("workflow has no Start node")]
    NoStartNode,

    #[error("node '{0}' not declared in the workflow's edges")]
    UnknownNode(String),

    #[error("node type '{0}' is not registered")]
    UnknownNodeType(String),

    #[error("no executor registered for kind '{0}'")]
    UnknownExecutor(String),

    #[error("traversal exceeded the configured step limit ({0})")]
    StepLimitExceeded(usize),

    #[error("{0}")]
    Validation(String),
}

pub type EngineResult<T> = Result<T, EngineError>;
