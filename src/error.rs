use thiserror::Error;

#[derive(Debug, Error)]
pub enum SqlMiddlewareDbError {
    #[cfg(feature = "http")]
    #[error(transparent)]
    HttpError(#[from] reqwest::Error),

    #[error("ClickHouse responded with status {status}: {message}")]
    ServerError { status: u16, message: String },

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Connection error: {0}")]
    ConnectionError(String),

    #[error("Parameter conversion error: {0}")]
    ParameterError(String),

    /// A bound value has a kind the inline literal rules do not cover.
    #[error("Cannot render a {kind} parameter as a SQL literal")]
    RenderingError { kind: &'static str },

    #[error("SQL execution error: {0}")]
    ExecutionError(String),

    #[error("Unsupported operation: {0}")]
    Unsupported(String),

    #[error("Other database error: {0}")]
    Other(String),
}

impl From<serde_json::Error> for SqlMiddlewareDbError {
    fn from(err: serde_json::Error) -> Self {
        SqlMiddlewareDbError::ExecutionError(format!("malformed ClickHouse JSON: {err}"))
    }
}
