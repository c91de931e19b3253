use crate::{
    config::Config,
    error::Error,
    host::{DataCenter, Endpoints, Host},
    models::GenericResponse,
};
use reqwest::{header::AUTHORIZATION, Method, RequestBuilder};
use serde::Serialize;
use serde_json::Value;
use std::{fmt, time::Duration};
use tracing::debug;

/// Every request fails with a timeout error if it takes longer than this.
pub const TIMEOUT: Duration = Duration::from_secs(4);

const AUTHORIZE_PATH: &str = "oauth2/authorize";
const TOKEN_PATH: &str = "oauth2/token";
const METADATA_PATH: &str = "oauth2/metadata";

/// A client for the Mailchimp OAuth2 flow and the Mailchimp REST API.
///
/// Calls that reach Mailchimp but get a 4xx answer are not errors: the error
/// payload is decoded and returned like any other response (see
/// [`crate::models::MailchimpError::from_response`]).
#[derive(Clone)]
pub struct Client {
    config: Config,
    endpoints: Endpoints,
    http: reqwest::Client,
    access_token: Option<String>,
}

impl Client {
    /// Initializes a new client talking to the real Mailchimp hosts.
    pub fn new(config: Config) -> Result<Self, Error> {
        Self::with_endpoints(config, Endpoints::default())
    }

    /// Initializes a new client talking to the given hosts.
    pub fn with_endpoints(config: Config, endpoints: Endpoints) -> Result<Self, Error> {
        let http = reqwest::Client::builder().timeout(TIMEOUT).build()?;
        Ok(Self {
            config,
            endpoints,
            http,
            access_token: None,
        })
    }

    /// Returns a copy of this client that authenticates data-center-scoped
    /// calls with `Authorization: OAuth {access_token}`.
    pub fn with_access_token<S: Into<String>>(&self, access_token: S) -> Self {
        Self {
            access_token: Some(access_token.into()),
            ..self.clone()
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn endpoints(&self) -> &Endpoints {
        &self.endpoints
    }

    /// The URL of the Mailchimp consent screen to redirect a user to.
    ///
    /// ## Example
    ///
    /// ```
    /// use mailchimp_oauth::{Client, Config};
    ///
    /// let config = Config::new("my-id", "my-secret", "https://example.com/callback");
    /// let client = Client::new(config).unwrap();
    ///
    /// assert_eq!(
    ///     client.login_url(),
    ///     "https://login.mailchimp.com/oauth2/authorize?client_id=my-id&client_secret=my-secret&response_type=code"
    /// );
    /// ```
    pub fn login_url(&self) -> String {
        self.login_url_with(std::iter::empty::<(&str, &str)>())
    }

    /// Same as [`Client::login_url`], with extra query parameters.
    ///
    /// An extra parameter named like one of the defaults (`client_id`,
    /// `client_secret`, `response_type`) replaces it.
    pub fn login_url_with<I, K, V>(&self, extra: I) -> String
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut query = vec![
            ("client_id".to_string(), self.config.client_id.clone()),
            ("client_secret".to_string(), self.config.client_secret.clone()),
            ("response_type".to_string(), "code".to_string()),
        ];
        for (key, value) in extra {
            let (key, value) = (key.as_ref(), value.as_ref());
            match query.iter_mut().find(|(k, _)| k == key) {
                Some(param) => param.1 = value.to_string(),
                None => query.push((key.to_string(), value.to_string())),
            }
        }

        // Safe to unwrap: `Endpoints::new` only accepts base URLs and the path is constant
        let mut url = self.endpoints.login().join(AUTHORIZE_PATH).unwrap();
        url.query_pairs_mut().extend_pairs(query);
        url.into()
    }

    /// Exchanges an authorization code for an access token and returns the raw
    /// token endpoint response.
    pub async fn request_token(&self, code: &str) -> Result<GenericResponse, Error> {
        let params = [
            ("client_id", self.config.client_id.as_str()),
            ("client_secret", self.config.client_secret.as_str()),
            ("grant_type", "authorization_code"),
            ("redirect_uri", self.config.redirect_uri.as_str()),
            ("code", code),
        ];
        self.post_form(Host::Login, TOKEN_PATH, &params).await
    }

    /// Exchanges an authorization code for an access token.
    ///
    /// If Mailchimp answers without a token (an invalid or expired code, for
    /// instance) the answer is returned inside [`Error::MissingField`].
    pub async fn access_token(&self, code: &str) -> Result<String, Error> {
        let response = self.request_token(code).await?;
        if let Some(token) = response.get("access_token").and_then(Value::as_str) {
            return Ok(token.to_string());
        }
        Err(Error::MissingField {
            field: "access_token",
            response,
        })
    }

    /// Fetches the metadata of the account an access token belongs to (its
    /// data center in `dc`, account name, login details...).
    ///
    /// The token itself is added to the result under `access_token`.
    pub async fn account_details(&self, access_token: &str) -> Result<GenericResponse, Error> {
        let request = self
            .request(Method::GET, Host::Login, METADATA_PATH)?
            .header(AUTHORIZATION, format!("OAuth {access_token}"));
        let mut response = self.send(request).await?;
        response.insert(
            "access_token".to_string(),
            Value::String(access_token.to_string()),
        );
        Ok(response)
    }

    /// Sends a GET to the API of a data center, with `parameters` in the query string.
    ///
    /// ## Example
    ///
    /// ```no_run
    /// use mailchimp_oauth::{Client, Config, DataCenter};
    ///
    /// #[tokio::main]
    /// async fn main() -> Result<(), Box<dyn std::error::Error>> {
    ///     let client = Client::new(Config::from_env()?)?.with_access_token("token");
    ///     let us1 = DataCenter::new("us1")?;
    ///     let lists = client.get("lists", &[("count", 10)], &us1).await?;
    ///     println!("{lists:?}");
    ///     Ok(())
    /// }
    /// ```
    pub async fn get<P: Serialize + ?Sized>(
        &self,
        path: &str,
        parameters: &P,
        data_center: &DataCenter,
    ) -> Result<GenericResponse, Error> {
        let request = self
            .request(Method::GET, Host::Api(data_center), path)?
            .query(parameters);
        self.send(request).await
    }

    /// Sends a form-encoded POST to the API of a data center.
    pub async fn post<P: Serialize + ?Sized>(
        &self,
        path: &str,
        parameters: &P,
        data_center: &DataCenter,
    ) -> Result<GenericResponse, Error> {
        self.post_form(Host::Api(data_center), path, parameters)
            .await
    }

    /// Sends a DELETE to the API of a data center, with `parameters` in the query string.
    pub async fn delete<P: Serialize + ?Sized>(
        &self,
        path: &str,
        parameters: &P,
        data_center: &DataCenter,
    ) -> Result<GenericResponse, Error> {
        let request = self
            .request(Method::DELETE, Host::Api(data_center), path)?
            .query(parameters);
        self.send(request).await
    }

    async fn post_form<P: Serialize + ?Sized>(
        &self,
        host: Host<'_>,
        path: &str,
        parameters: &P,
    ) -> Result<GenericResponse, Error> {
        let request = self.request(Method::POST, host, path)?.form(parameters);
        self.send(request).await
    }

    fn request(&self, method: Method, host: Host<'_>, path: &str) -> Result<RequestBuilder, Error> {
        let url = self.endpoints.url(host, path)?;
        debug!(%method, %url, "Sending Mailchimp request");

        let request = self.http.request(method, url);
        Ok(match (host, &self.access_token) {
            (Host::Api(_), Some(token)) => request.header(AUTHORIZATION, format!("OAuth {token}")),
            _ => request,
        })
    }

    async fn send(&self, request: RequestBuilder) -> Result<GenericResponse, Error> {
        let resp = request.send().await?;
        let status = resp.status();
        let body = resp.bytes().await?;
        debug!(%status, body_len = body.len(), "Received Mailchimp response");

        if status.is_server_error() {
            return Err(Error::Server {
                status,
                body: String::from_utf8_lossy(&body).into_owned(),
            });
        }

        decode(&body)
    }
}

/// Decodes a response body into a JSON object. An empty body (a `204 No
/// Content`, typically) decodes to an empty object.
fn decode(body: &[u8]) -> Result<GenericResponse, Error> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(GenericResponse::new());
    }
    Ok(serde_json::from_slice(body)?)
}

impl fmt::Debug for Client {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Client")
            .field("config", &self.config)
            .field("endpoints", &self.endpoints)
            .field("authenticated", &self.access_token.is_some())
            .finish_non_exhaustive()
    }
}
