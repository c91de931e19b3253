use crate::{error::Error, models::GenericResponse};
use std::{fmt::Display, str::FromStr};
use url::Url;

pub const LOGIN_HOST: &str = "https://login.mailchimp.com/";
const API_DOMAIN: &str = "api.mailchimp.com";
const API_VERSION_PATH: &str = "3.0/";

/// The regional shard hosting a Mailchimp account, e.g. `us1`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DataCenter(String);

impl DataCenter {
    /// Validates a data center code. Codes are non-empty and ASCII alphanumeric,
    /// so they are always safe to use as a host label or a path segment.
    pub fn new<S: Into<String>>(code: S) -> Result<Self, Error> {
        let code = code.into();
        if code.is_empty() || !code.bytes().all(|b| b.is_ascii_alphanumeric()) {
            return Err(Error::InvalidDataCenter(code));
        }
        Ok(Self(code.to_ascii_lowercase()))
    }

    /// Reads the `dc` field of an account details response.
    pub fn from_account_details(details: &GenericResponse) -> Result<Self, Error> {
        match details.get("dc").and_then(|dc| dc.as_str()) {
            Some(dc) => Self::new(dc),
            None => Err(Error::MissingField {
                field: "dc",
                response: details.clone(),
            }),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for DataCenter {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl Display for DataCenter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Which of the two Mailchimp hosts a request goes to.
#[derive(Debug, Clone, Copy)]
pub enum Host<'a> {
    /// `https://login.mailchimp.com/`, home of the OAuth2 endpoints.
    Login,
    /// The REST API of one data center.
    Api(&'a DataCenter),
}

/// Where data-center-scoped calls are sent.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ApiBase {
    /// `https://{dc}.api.mailchimp.com/3.0/`
    #[default]
    Mailchimp,
    /// `{base}{dc}/`, for proxies and local test servers that cannot serve
    /// one subdomain per data center.
    Custom(Url),
}

/// Base URLs of the login host and the API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    login: Url,
    api: ApiBase,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            // Safe to unwrap: LOGIN_HOST is a constant, valid URL.
            login: Url::parse(LOGIN_HOST).unwrap(),
            api: ApiBase::Mailchimp,
        }
    }
}

impl Endpoints {
    /// Both URLs must be able to serve as a base (`http:`/`https:` and the
    /// like, not `mailto:` or `data:`).
    pub fn new(login: Url, api: ApiBase) -> Result<Self, Error> {
        let api = match api {
            ApiBase::Custom(base) => ApiBase::Custom(directory(base)?),
            api => api,
        };
        Ok(Self {
            login: directory(login)?,
            api,
        })
    }

    pub fn login(&self) -> &Url {
        &self.login
    }

    /// Resolves the base URL of a host. Request paths are joined onto it.
    pub fn resolve(&self, host: Host<'_>) -> Result<Url, Error> {
        match (host, &self.api) {
            (Host::Login, _) => Ok(self.login.clone()),
            (Host::Api(dc), ApiBase::Mailchimp) => Ok(Url::parse(&format!(
                "https://{dc}.{API_DOMAIN}/{API_VERSION_PATH}"
            ))?),
            (Host::Api(dc), ApiBase::Custom(base)) => Ok(base.join(&format!("{dc}/"))?),
        }
    }

    /// Resolves `path` against a host. A leading `/` is ignored so that the
    /// API version prefix is kept.
    ///
    /// The result always stays under the host's base URL: absolute URLs and
    /// `..` segments escaping it are rejected with [`Error::InvalidPath`].
    pub fn url(&self, host: Host<'_>, path: &str) -> Result<Url, Error> {
        let base = self.resolve(host)?;
        let url = base.join(path.trim_start_matches('/'))?;
        if url.origin() != base.origin() || !url.path().starts_with(base.path()) {
            return Err(Error::InvalidPath(path.to_string()));
        }
        Ok(url)
    }
}

/// `Url::join` replaces the last segment unless the base ends with `/`.
fn directory(mut url: Url) -> Result<Url, Error> {
    if url.cannot_be_a_base() {
        return Err(Error::InvalidBaseUrl(url));
    }
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}
