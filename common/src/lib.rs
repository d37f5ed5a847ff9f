use thiserror::Error;

pub mod config;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("MongoDB error: {0}")]
    Mongo(#[from] mongodb::error::Error),

    #[error("BSON conversion error: {0}")]
    Bson(String),

    #[error("Configuration error: {0}")]
    Config(#[from] ::config::ConfigError),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Prefixes backend failures with the action that failed. Input and
    /// not-found errors already speak to the caller and are left as they are.
    pub fn context(self, action: &str) -> Self {
        match self {
            Error::InvalidInput(_) | Error::NotFound(_) => self,
            other => Error::Other(format!("{action}: {other}")),
        }
    }

    /// Message suitable for an API client.
    pub fn client_message(&self) -> String {
        match self {
            Error::InvalidInput(msg) | Error::NotFound(msg) => msg.clone(),
            other => other.to_string(),
        }
    }
}
