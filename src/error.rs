use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Storage unavailable for '{key}': {source}")]
    StorageUnavailable {
        key: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Stored value is corrupt: {0}")]
    CorruptStoredValue(#[from] serde_json::Error),

    #[error("Stored record '{key}' has unsupported version {version} (expected <= {current})")]
    UnsupportedVersion {
        key: &'static str,
        version: u64,
        current: u32,
    },

    #[error("Failed to parse config: {0}")]
    Config(#[from] toml::de::Error),

    #[error("Failed to serialize config: {0}")]
    ConfigSerialize(#[from] toml::ser::Error),

    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
}
