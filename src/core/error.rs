use thiserror::Error;

#[derive(Error, Debug)]
pub enum HeartbridgeError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Lexicon error: {0}")]
    Lexicon(String),

    #[error("Estimator error: {0}")]
    Estimator(String),

    #[error("Invalid role: {0}")]
    InvalidRole(String),

    #[error("Invalid post: {0}")]
    InvalidPost(String),

    #[error("Post not found: {0}")]
    NotFound(i64),

    #[error("Configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, HeartbridgeError>;
