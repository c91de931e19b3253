//! A client for the Mailchimp OAuth2 flow and the Mailchimp REST API.
//!
//! ## Example
//!
//! ```no_run
//! use mailchimp_oauth::{Client, Config, DataCenter};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = Client::new(Config::from_env()?)?;
//!
//!     // 1. Send the user to Mailchimp.
//!     println!("Log in at {}", client.login_url());
//!
//!     // 2. Mailchimp redirects back with a code, trade it for a token.
//!     let token = client.access_token("code-from-redirect").await?;
//!
//!     // 3. Find out which data center hosts the account, then call the API.
//!     let details = client.account_details(&token).await?;
//!     let dc = DataCenter::from_account_details(&details)?;
//!     let lists = client
//!         .with_access_token(token)
//!         .get("lists", &[("count", "10")], &dc)
//!         .await?;
//!
//!     println!("{lists:?}");
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod config;
pub mod error;
pub mod host;
pub mod models;

pub use client::Client;
pub use config::Config;
pub use error::{ConfigError, Error};
pub use host::{ApiBase, DataCenter, Endpoints, Host};
pub use models::{GenericResponse, MailchimpError};
