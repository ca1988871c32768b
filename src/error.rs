use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    /// Schema creation or seeding failed. The store must not be used.
    #[error("{0}")]
    Init(String),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Feed error: {0}")]
    Feed(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Config error: {0}")]
    Config(String),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{0}")]
    Validation(String),
}

impl AppError {
    pub fn is_init(&self) -> bool {
        matches!(self, AppError::Init(_))
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
