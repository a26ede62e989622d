use thiserror::Error;

/// Errors that can occur while structuring or resolving resolutions.
#[derive(Error, Debug)]
pub enum UsneseniError {
    #[error("file error: {message} (path: {path})")]
    File { message: String, path: String },

    #[error("malformed identifier: '{0}'")]
    MalformedIdentifier(String),

    #[error("config error: {message}")]
    Config { message: String },

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Convenience alias for results using `UsneseniError`.
pub type Result<T> = std::result::Result<T, UsneseniError>;
