use crate::body::BodyId;

/// Errors produced by the simulation core.
#[derive(Debug, thiserror::Error)]
pub enum SimError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    #[error("division by zero: cannot normalize a zero-length vector")]
    DivisionByZero,
    #[error("invalid state: {0}")]
    StateError(String),
    #[error("step produced a non-finite value for body {id}")]
    NonFinite { id: BodyId },
    #[error("scenario parse error: {0}")]
    Scenario(#[from] serde_yaml::Error),
}

pub type SimResult<T> = Result<T, SimError>;
