use std::io;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

// ============================================================================
// Library Errors
// ============================================================================

#[derive(Error, Debug)]
pub enum LibraryError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Directory not found: {path}")]
    NotFound { path: PathBuf },

    #[error("No valid Tesla dashcam folders or video files found in {path}")]
    InvalidLibrary { path: PathBuf },

    #[error("Failed to walk directory: {0}")]
    Walk(#[from] walkdir::Error),
}

// ============================================================================
// Probe Errors
// ============================================================================

#[derive(Error, Debug)]
pub enum ProbeError {
    #[error("ffprobe not available on this system")]
    NotAvailable,

    #[error("ffprobe command failed: {message}")]
    CommandFailed { message: String },

    #[error("Failed to parse ffprobe output: {reason}")]
    ParseError { reason: String },

    #[error("ffprobe execution timeout after {duration:?}")]
    Timeout { duration: Duration },

    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

// ============================================================================
// Configuration Errors
// ============================================================================

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read { path: PathBuf, source: io::Error },

    #[error("Failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid configuration: {message}")]
    Invalid { message: String },
}
