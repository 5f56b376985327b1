use thiserror::Error;

#[derive(Debug, Error)]
pub enum ObfuscateError {
    #[error("invalid zone config: {0}")]
    Config(String),
    #[error("malformed document: {0}")]
    Parse(String),
    #[error("failed to write output {path}: {reason}")]
    Write { path: String, reason: String },
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ObfuscateError>;
