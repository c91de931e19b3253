use crate::error::ConfigError;
use serde::Deserialize;
use std::{env, fmt};

pub const CLIENT_ID_VAR: &str = "MAILCHIMP_CLIENT_ID";
pub const CLIENT_SECRET_VAR: &str = "MAILCHIMP_CLIENT_SECRET";
pub const REDIRECT_URI_VAR: &str = "MAILCHIMP_REDIRECT_URI";

/// OAuth2 credentials of the registered Mailchimp app.
///
/// Values are passed through as-is: an empty or wrong value shows up as an
/// error payload from Mailchimp, not as a local error.
#[derive(Clone, Deserialize, PartialEq, Eq)]
pub struct Config {
    pub client_id: String,
    pub client_secret: String,
    pub redirect_uri: String,
}

impl Config {
    pub fn new<S: Into<String>>(client_id: S, client_secret: S, redirect_uri: S) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            redirect_uri: redirect_uri.into(),
        }
    }

    /// Reads the credentials from `MAILCHIMP_CLIENT_ID`, `MAILCHIMP_CLIENT_SECRET`
    /// and `MAILCHIMP_REDIRECT_URI`.
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            client_id: var(CLIENT_ID_VAR)?,
            client_secret: var(CLIENT_SECRET_VAR)?,
            redirect_uri: var(REDIRECT_URI_VAR)?,
        })
    }
}

fn var(name: &'static str) -> Result<String, ConfigError> {
    env::var(name).map_err(|e| ConfigError::MissingVar(name, e))
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .field("redirect_uri", &self.redirect_uri)
            .finish()
    }
}
