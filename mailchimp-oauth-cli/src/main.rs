use clap::{Args, Parser, Subcommand};
use mailchimp_oauth::{
    ApiBase, Client, Config, DataCenter, Endpoints, Error, GenericResponse, MailchimpError,
};
use tracing_subscriber::EnvFilter;
use url::Url;

#[derive(Debug, Parser, Clone)]
#[command(name = "mailchimp-oauth")]
#[command(about = "A CLI tool to authorize a Mailchimp app and call the Mailchimp API")]
struct Cli {
    #[arg(long, env = "MAILCHIMP_CLIENT_ID")]
    client_id: String,
    #[arg(long, env = "MAILCHIMP_CLIENT_SECRET", hide_env_values = true)]
    client_secret: String,
    #[arg(long, env = "MAILCHIMP_REDIRECT_URI")]
    redirect_uri: String,
    #[arg(long, env = "MAILCHIMP_LOGIN_HOST")]
    login_host: Option<Url>,
    #[arg(long, env = "MAILCHIMP_API_BASE")]
    api_base: Option<Url>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand, Clone)]
enum Commands {
    #[command(about = "Prints the URL of the Mailchimp consent screen")]
    LoginUrl {
        #[arg(short, long = "param", value_parser = parse_param)]
        params: Vec<(String, String)>,
    },
    #[command(about = "Exchanges an authorization code for an access token")]
    Token { code: String },
    #[command(about = "Prints the account an access token belongs to")]
    Account { access_token: String },
    #[command(about = "Sends a GET to the API of a data center")]
    Get(ApiArgs),
    #[command(about = "Sends a form-encoded POST to the API of a data center")]
    Post(ApiArgs),
    #[command(about = "Sends a DELETE to the API of a data center")]
    Delete(ApiArgs),
}

#[derive(Debug, Args, Clone)]
struct ApiArgs {
    data_center: DataCenter,
    path: String,
    #[arg(short, long = "param", value_parser = parse_param)]
    params: Vec<(String, String)>,
    #[arg(short, long, env = "MAILCHIMP_ACCESS_TOKEN", hide_env_values = true)]
    access_token: Option<String>,
}

impl ApiArgs {
    fn client(&self, client: &Client) -> Client {
        match &self.access_token {
            Some(token) => client.with_access_token(token),
            None => client.clone(),
        }
    }
}

fn parse_param(s: &str) -> Result<(String, String), String> {
    s.split_once('=')
        .map(|(key, value)| (key.to_string(), value.to_string()))
        .ok_or_else(|| format!("expected key=value, got `{s}`"))
}

fn endpoints(login_host: Option<Url>, api_base: Option<Url>) -> Result<Endpoints, Error> {
    let defaults = Endpoints::default();
    Endpoints::new(
        login_host.unwrap_or_else(|| defaults.login().clone()),
        api_base.map(ApiBase::Custom).unwrap_or_default(),
    )
}

/// Prints a response as JSON on stdout. Error payloads are reported as a failure.
fn print_response(response: &GenericResponse) -> Result<(), anyhow::Error> {
    println!("{}", serde_json::to_string_pretty(response)?);
    if let Some(err) = MailchimpError::from_response(response) {
        anyhow::bail!("Mailchimp error: {err}");
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = Cli::parse();

    let config = Config::new(args.client_id, args.client_secret, args.redirect_uri);
    let client = Client::with_endpoints(config, endpoints(args.login_host, args.api_base)?)?;

    match args.command {
        Commands::LoginUrl { params } => println!("{}", client.login_url_with(params)),
        Commands::Token { code } => match client.access_token(&code).await {
            Ok(token) => println!("{token}"),
            Err(Error::MissingField { response, .. }) => {
                eprintln!("{}", serde_json::to_string_pretty(&response)?);
                anyhow::bail!("Mailchimp did not return an access token");
            }
            Err(err) => return Err(err.into()),
        },
        Commands::Account { access_token } => {
            print_response(&client.account_details(&access_token).await?)?
        }
        Commands::Get(api) => {
            let response = api
                .client(&client)
                .get(&api.path, &api.params, &api.data_center)
                .await?;
            print_response(&response)?
        }
        Commands::Post(api) => {
            let response = api
                .client(&client)
                .post(&api.path, &api.params, &api.data_center)
                .await?;
            print_response(&response)?
        }
        Commands::Delete(api) => {
            let response = api
                .client(&client)
                .delete(&api.path, &api.params, &api.data_center)
                .await?;
            print_response(&response)?
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_params() {
        assert_eq!(
            parse_param("count=10"),
            Ok(("count".to_string(), "10".to_string()))
        );
        assert_eq!(
            parse_param("fields=a=b"),
            Ok(("fields".to_string(), "a=b".to_string()))
        );
        assert!(parse_param("count").is_err());
    }

    #[test]
    fn parses_api_command() {
        let cli = Cli::try_parse_from([
            "mailchimp-oauth",
            "--client-id",
            "id",
            "--client-secret",
            "secret",
            "--redirect-uri",
            "https://example.com/callback",
            "get",
            "us1",
            "lists",
            "-p",
            "count=10",
            "--access-token",
            "tok",
        ])
        .unwrap();

        match cli.command {
            Commands::Get(api) => {
                assert_eq!(api.data_center.as_str(), "us1");
                assert_eq!(api.path, "lists");
                assert_eq!(api.params, vec![("count".to_string(), "10".to_string())]);
                assert_eq!(api.access_token.as_deref(), Some("tok"));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn rejects_bad_data_center() {
        let result = Cli::try_parse_from([
            "mailchimp-oauth",
            "--client-id",
            "id",
            "--client-secret",
            "secret",
            "--redirect-uri",
            "uri",
            "delete",
            "<dc>",
            "lists/abc",
        ]);

        assert!(result.is_err());
    }

    #[test]
    fn default_endpoints() {
        assert_eq!(endpoints(None, None).unwrap(), Endpoints::default());
    }

    #[test]
    fn rejects_non_base_login_host() {
        let login = Url::parse("mailto:someone@example.com").unwrap();
        assert!(matches!(
            endpoints(Some(login), None),
            Err(Error::InvalidBaseUrl(_))
        ));
    }
}
