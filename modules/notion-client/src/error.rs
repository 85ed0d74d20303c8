use thiserror::Error;

pub type Result<T> = std::result::Result<T, NotionError>;

#[derive(Debug, Error)]
pub enum NotionError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("API error (status {status}, code {code}): {message}")]
    Api {
        status: u16,
        code: String,
        message: String,
    },

    #[error("Parse error: {0}")]
    Parse(String),
}

impl NotionError {
    /// HTTP status for API errors, `None` for transport and decode failures.
    pub fn status(&self) -> Option<u16> {
        match self {
            NotionError::Api { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for NotionError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            NotionError::Parse(err.to_string())
        } else {
            NotionError::Network(err.to_string())
        }
    }
}

impl From<serde_json::Error> for NotionError {
    fn from(err: serde_json::Error) -> Self {
        NotionError::Parse(err.to_string())
    }
}
