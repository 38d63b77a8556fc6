use thiserror::Error;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("payment id is required")]
    MissingPaymentId,

    #[error("validation: {0}")]
    Validation(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("database: {0}")]
    Database(#[from] sqlx::Error),

    #[error("serialization: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("provider: {0}")]
    Provider(String),
}
