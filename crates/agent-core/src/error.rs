use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AnalyzerError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Config file not found: {}", .0.display())]
    ConfigNotFound(PathBuf),

    #[error("Failed to read session history {}: {source}", .path.display())]
    History {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid config file: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("Config serialization error: {0}")]
    TomlWrite(#[from] toml::ser::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, AnalyzerError>;
