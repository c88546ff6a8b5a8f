use crate::tournaments::Tournaments;
use log::{debug, warn};
use reqwest::blocking::Client;
use reqwest::{Method, StatusCode};
use serde::Deserialize;
use std::fmt;
use std::time::Duration;

pub type ApiResult<T> = Result<T, ApiError>;

pub const DEFAULT_BASE_URL: &str = "https://api.challonge.com/v1";
const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Connection settings, supplied once when the root [`Challonge`] is built.
#[derive(Clone, Deserialize)]
pub struct ClientConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    pub username: String,
    pub api_key: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_owned()
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

impl ClientConfig {
    pub fn new(username: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            base_url: default_base_url(),
            username: username.into(),
            api_key: api_key.into(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("base_url", &self.base_url)
            .field("username", &self.username)
            .field("api_key", &"<redacted>")
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

/// HTTP Basic credentials attached to every request.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    username: String,
    api_key: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            api_key: api_key.into(),
        }
    }

    pub fn username(&self) -> &str {
        &self.username
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("api_key", &"<redacted>")
            .finish()
    }
}

#[derive(Debug)]
pub enum ApiError {
    /// Rejected caller input; nothing was sent.
    Argument(String),
    /// The API answered with a status other than 200.
    Http { status: u16, message: Option<String> },
    /// A 200 response did not match the expected entity shape.
    Hydration { entity: &'static str, reason: String },
    Network(reqwest::Error, String),
    Parsing(serde_json::Error, String),
}

impl ApiError {
    /// Caller input errors, raised before any request.
    pub fn is_argument(&self) -> bool {
        matches!(self, ApiError::Argument(_))
    }

    /// The remote side answered, but not with something usable.
    pub fn is_protocol(&self) -> bool {
        matches!(
            self,
            ApiError::Http { .. } | ApiError::Hydration { .. } | ApiError::Parsing(..)
        )
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Http { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::Argument(msg) => write!(f, "Bad argument: {msg}"),
            ApiError::Http {
                status,
                message: Some(message),
            } => write!(f, "Request failed with code: {status} - {message}"),
            ApiError::Http {
                status,
                message: None,
            } => write!(f, "Request failed with code: {status}"),
            ApiError::Hydration { entity, reason } => {
                write!(f, "Unexpected {entity} response: {reason}")
            }
            ApiError::Network(e, url) => write!(f, "Network error for {url}: {e}"),
            ApiError::Parsing(e, url) => write!(f, "Parse error for {url}: {e}"),
        }
    }
}

impl std::error::Error for ApiError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ApiError::Network(e, _) => Some(e),
            ApiError::Parsing(e, _) => Some(e),
            _ => None,
        }
    }
}

#[derive(Deserialize)]
struct ErrorBody {
    errors: Vec<String>,
}

/// First entry of an `{"errors": [...]}` body, if the body has that shape.
fn first_error(body: &str) -> Option<String> {
    serde_json::from_str::<ErrorBody>(body)
        .ok()
        .and_then(|body| body.errors.into_iter().next())
}

/// HTTP client, endpoint and credentials shared by every resource client
/// and entity created from one [`Challonge`].
#[derive(Clone)]
pub(crate) struct Connection {
    client: Client,
    base_url: String,
    credentials: Credentials,
}

impl fmt::Debug for Connection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Connection")
            .field("base_url", &self.base_url)
            .field("credentials", &self.credentials)
            .finish()
    }
}

impl Connection {
    pub(crate) fn new(config: &ClientConfig) -> Self {
        Self {
            client: Client::builder()
                .user_agent(concat!("challonge-api/", env!("CARGO_PKG_VERSION")))
                .timeout(Duration::from_secs(config.timeout_secs))
                .build()
                .unwrap_or_default(),
            base_url: config.base_url.trim_end_matches('/').to_owned(),
            credentials: Credentials::new(&config.username, &config.api_key),
        }
    }

    pub(crate) fn url(&self, path: &str) -> String {
        format!("{}/{path}", self.base_url)
    }

    /// Send one request and return the body of a 200 response.
    ///
    /// Any other status becomes [`ApiError::Http`], carrying `errors[0]` when
    /// the body has it.
    pub(crate) fn send(
        &self,
        method: Method,
        path: &str,
        query: &[(String, String)],
    ) -> ApiResult<String> {
        let url = self.url(path);
        debug!("request {method} {url} {query:?}");

        let response = self
            .client
            .request(method.clone(), &url)
            .basic_auth(&self.credentials.username, Some(&self.credentials.api_key))
            .query(query)
            .send()
            .map_err(|e| ApiError::Network(e, url.clone()))?;

        let status = response.status();
        let body = response
            .text()
            .map_err(|e| ApiError::Network(e, url.clone()))?;
        debug!("response {status} from {method} {url}");

        if status != StatusCode::OK {
            let message = first_error(&body);
            warn!("{method} {url} failed with {status}: {message:?}");
            return Err(ApiError::Http {
                status: status.as_u16(),
                message,
            });
        }

        Ok(body)
    }

    /// Like [`Connection::send`], decoding the body as JSON.
    pub(crate) fn send_json(
        &self,
        method: Method,
        path: &str,
        query: &[(String, String)],
    ) -> ApiResult<serde_json::Value> {
        let body = self.send(method, path, query)?;
        serde_json::from_str(&body).map_err(|e| ApiError::Parsing(e, self.url(path)))
    }
}

/// Root object of the library: one account on one API endpoint.
#[derive(Debug, Clone)]
pub struct Challonge {
    credentials: Credentials,
    tournaments: Tournaments,
}

impl Challonge {
    /// Connect to the public endpoint with `username` and `api_key`.
    pub fn new(username: &str, api_key: &str) -> Self {
        Self::with_config(ClientConfig::new(username, api_key))
    }

    pub fn with_config(config: ClientConfig) -> Self {
        let conn = Connection::new(&config);
        Self {
            credentials: conn.credentials.clone(),
            tournaments: Tournaments::new(conn),
        }
    }

    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    pub fn tournaments(&self) -> &Tournaments {
        &self.tournaments
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_error_reads_errors_array() {
        assert_eq!(
            first_error(r#"{"errors": ["name has already been taken", "url is invalid"]}"#),
            Some("name has already been taken".to_owned())
        );
        assert_eq!(first_error(r#"{"errors": []}"#), None);
        assert_eq!(first_error("<html>Bad Gateway</html>"), None);
    }

    #[test]
    fn http_error_display_includes_server_message() {
        let err = ApiError::Http {
            status: 422,
            message: Some("name has already been taken".into()),
        };
        assert_eq!(
            err.to_string(),
            "Request failed with code: 422 - name has already been taken"
        );
        assert!(err.is_protocol());
        assert!(!err.is_argument());
        assert_eq!(err.status(), Some(422));
    }

    #[test]
    fn base_url_is_injected_and_normalized() {
        let config = ClientConfig::new("user", "key").with_base_url("http://localhost:1234/v1/");
        let conn = Connection::new(&config);
        assert_eq!(
            conn.url("tournaments.json"),
            "http://localhost:1234/v1/tournaments.json"
        );
    }

    #[test]
    fn debug_output_hides_api_key() {
        let config = ClientConfig::new("user", "s3cret");
        assert!(!format!("{config:?}").contains("s3cret"));
        let challonge = Challonge::with_config(config);
        assert!(!format!("{challonge:?}").contains("s3cret"));
        assert_eq!(challonge.credentials().username(), "user");
    }

    #[test]
    fn config_deserializes_with_defaults() {
        let config: ClientConfig =
            serde_json::from_str(r#"{"username": "user", "api_key": "key"}"#).unwrap();
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.timeout_secs, 10);
    }
}
