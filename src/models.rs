use serde::Deserialize;
use serde_json::{Map, Value};
use std::fmt::Display;

/// A decoded JSON object, as returned by every call of the client.
///
/// Both successful payloads and API-level error payloads (4xx responses)
/// come back in this shape.
pub type GenericResponse = Map<String, Value>;

/// The problem document Mailchimp returns alongside 4xx responses.
#[derive(Debug, Clone, Deserialize, Default, PartialEq)]
pub struct MailchimpError {
    #[serde(default)]
    pub r#type: String,
    pub title: String,
    pub status: u16,
    pub detail: Option<String>,
    pub instance: Option<String>,
}

impl MailchimpError {
    /// Reads an error payload out of a response, if it looks like one.
    ///
    /// Returns `None` for responses without a `title` and a numeric `status`,
    /// which is the case for every successful call.
    pub fn from_response(response: &GenericResponse) -> Option<Self> {
        serde_json::from_value(Value::Object(response.clone())).ok()
    }
}

impl Display for MailchimpError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} ({}): {}",
            self.title,
            self.status,
            self.detail.as_deref().unwrap_or_default()
        )
    }
}
