use thiserror::Error;

#[derive(Debug, Error)]
pub enum GalleryError {
    /// The database could not be opened or its schema could not be created.
    #[error("storage unavailable: {0}")]
    StorageUnavailable(String),

    /// I/O failure reported by the engine after a successful open.
    #[error("storage error: {0}")]
    Storage(#[from] sqlx::Error),

    #[error("not an image or video file: {name} ({mime_type})")]
    InvalidFile { name: String, mime_type: String },

    #[error("month {month} does not belong to season {season}")]
    InvalidTarget { season: String, month: String },

    #[error("unknown {what}: {name}")]
    UnknownName { what: &'static str, name: String },

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("configuration error: {0}")]
    Config(#[from] config::ConfigError),
}

pub type Result<T> = std::result::Result<T, GalleryError>;
