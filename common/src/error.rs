use thiserror::Error;

#[derive(Error, Debug)]
pub enum DashcamError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerdeError(#[from] serde_json::Error),

    #[error("Invalid filename: {0}")]
    InvalidFilename(#[from] FilenameError),

    #[error("Footage not found: {0}")]
    FootageNotFound(usize),

    #[error("No playable footage: {0}")]
    NoFootage(String),

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),
}

pub type Result<T> = std::result::Result<T, DashcamError>;

/// 文件名解析错误
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FilenameError {
    #[error("Filename does not start with a YYYY-MM-DD_HH-MM-SS timestamp: {name}")]
    MissingTimestamp { name: String },

    #[error("Timestamp in filename is not a valid date: {name}")]
    InvalidDate { name: String },
}
