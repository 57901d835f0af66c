use thiserror::Error;

#[derive(Error, Debug)]
pub enum LcsError {
    #[error("Index {index} out of range for length {len}")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Address already in use: {0}")]
    AddressInUse(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serde error: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("Config source error: {0}")]
    ConfigSource(#[from] config::ConfigError),

    #[error("TOML serialization error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),
}

impl LcsError {
    pub(crate) fn index(index: usize, len: usize) -> Self {
        LcsError::IndexOutOfRange { index, len }
    }
}

pub type Result<T> = std::result::Result<T, LcsError>;
