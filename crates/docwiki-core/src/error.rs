//! Error types for settings handling
//!
//! Conversion itself is infallible; only reading and writing the settings
//! file can fail.

use thiserror::Error;

/// Errors that can occur while loading or saving conversion settings
#[derive(Error, Debug)]
pub enum SettingsError {
    /// Error reading or writing the settings file
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Settings file is not valid TOML or has the wrong shape
    #[error("Invalid settings file: {0}")]
    Parse(#[from] toml::de::Error),

    /// Settings could not be written as TOML
    #[error("Cannot serialize settings: {0}")]
    Serialize(#[from] toml::ser::Error),
}

/// Result type for settings operations
pub type Result<T> = std::result::Result<T, SettingsError>;
