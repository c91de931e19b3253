use crate::models::GenericResponse;
use reqwest::StatusCode;
use std::env::VarError;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Request error: {0}")]
    Request(#[from] reqwest::Error),
    #[error("Mailchimp server error ({status}): {body}")]
    Server { status: StatusCode, body: String },
    #[error("Cannot decode response body: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("Field `{field}` missing from response")]
    MissingField {
        field: &'static str,
        response: GenericResponse,
    },
    #[error("Invalid data center code: {0:?}")]
    InvalidDataCenter(String),
    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),
    #[error("Cannot use {0} as a base URL")]
    InvalidBaseUrl(url::Url),
    #[error("Path {0:?} leaves the base URL")]
    InvalidPath(String),
}

impl Error {
    /// Returns true if the request did not complete within [`crate::client::TIMEOUT`].
    pub fn is_timeout(&self) -> bool {
        matches!(self, Error::Request(e) if e.is_timeout())
    }

    /// Returns true for failures of the request itself: network errors,
    /// timeouts and server-side (5xx) responses.
    pub fn is_transport(&self) -> bool {
        matches!(self, Error::Request(_) | Error::Server { .. })
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Environment variable {0} is not set: {1}")]
    MissingVar(&'static str, #[source] VarError),
}
