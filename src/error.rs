use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    Validation(String),

    #[error("A request is already in progress")]
    Busy,

    #[error("{0}")]
    Service(String),

    #[error("Network error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Unexpected response from server: {0}")]
    Decode(String),

    #[error("Could not get your location: {0}")]
    Location(String),

    #[error("Map error: {0}")]
    Render(String),

    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Decode(err.to_string())
    }
}

pub type AppResult<T> = Result<T, AppError>;
