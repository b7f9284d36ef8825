use reqwest::StatusCode;
use std::error::Error as StdError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum MaigaError {
    #[error("API request failed: {}", error_chain(.0))]
    HttpClient(#[from] reqwest::Error),
    /// Non-2xx answer; `message` is already rendered for display.
    #[error("{message}")]
    HttpStatus { status: StatusCode, message: String },
    #[error("Failed to parse API response: {body}")]
    Deserialize { body: String },
    #[error("failed to serialize request payload: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("invalid header value: {0}")]
    Header(#[from] reqwest::header::InvalidHeaderValue),
}

impl MaigaError {
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            MaigaError::HttpStatus { status, .. } => Some(*status),
            MaigaError::HttpClient(err) => err.status(),
            _ => None,
        }
    }
}

// reqwest hides the interesting part ("connection refused") in the source chain.
fn error_chain(err: &reqwest::Error) -> String {
    let mut rendered = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        let text = cause.to_string();
        if !rendered.contains(&text) {
            rendered.push_str(": ");
            rendered.push_str(&text);
        }
        source = cause.source();
    }
    rendered
}
