use std::fmt;
use std::time::Duration;

use crate::ServiceError;

pub const GEMINI_API_KEY: &str = "GEMINI_API_KEY";
pub const X_ACCESS_TOKEN: &str = "X_ACCESS_TOKEN";
pub const REDDIT_CLIENT_ID: &str = "REDDIT_CLIENT_ID";
pub const REDDIT_CLIENT_SECRET: &str = "REDDIT_CLIENT_SECRET";
pub const REDDIT_USERNAME: &str = "REDDIT_USERNAME";
pub const REDDIT_PASSWORD: &str = "REDDIT_PASSWORD";
pub const REDDIT_USER_AGENT: &str = "REDDIT_USER_AGENT";

pub const GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const X_BASE_URL: &str = "https://api.x.com";
pub const REDDIT_AUTH_BASE_URL: &str = "https://www.reddit.com";
pub const REDDIT_API_BASE_URL: &str = "https://oauth.reddit.com";
pub const DEFAULT_MODEL: &str = "gemini-2.0-flash";
pub const DEFAULT_FEED_URL: &str = "https://techcrunch.com/category/artificial-intelligence/feed/";

#[derive(Debug, Clone)]
pub struct HttpSettings {
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
    pub redirect_limit: usize,
    pub max_bytes: u64,
    pub user_agent: String,
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(30),
            redirect_limit: 5,
            max_bytes: 5 * 1024 * 1024,
            user_agent: concat!("postpilot/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

/// Backend credentials, read once at startup. Missing values stay `None`
/// and surface as [`ServiceError::MissingCredential`] when the backend that
/// needs them is called.
#[derive(Clone, Default)]
pub struct Credentials {
    pub gemini_api_key: Option<String>,
    pub x_access_token: Option<String>,
    pub reddit_client_id: Option<String>,
    pub reddit_client_secret: Option<String>,
    pub reddit_username: Option<String>,
    pub reddit_password: Option<String>,
    pub reddit_user_agent: Option<String>,
}

impl Credentials {
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let read = |name: &str| {
            lookup(name)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };
        Self {
            gemini_api_key: read(GEMINI_API_KEY),
            x_access_token: read(X_ACCESS_TOKEN),
            reddit_client_id: read(REDDIT_CLIENT_ID),
            reddit_client_secret: read(REDDIT_CLIENT_SECRET),
            reddit_username: read(REDDIT_USERNAME),
            reddit_password: read(REDDIT_PASSWORD),
            reddit_user_agent: read(REDDIT_USER_AGENT),
        }
    }

    /// Names of the required variables that are not set.
    pub fn missing(&self) -> Vec<&'static str> {
        [
            (GEMINI_API_KEY, &self.gemini_api_key),
            (X_ACCESS_TOKEN, &self.x_access_token),
            (REDDIT_CLIENT_ID, &self.reddit_client_id),
            (REDDIT_CLIENT_SECRET, &self.reddit_client_secret),
            (REDDIT_USERNAME, &self.reddit_username),
            (REDDIT_PASSWORD, &self.reddit_password),
        ]
        .into_iter()
        .filter(|(_, value)| value.is_none())
        .map(|(name, _)| name)
        .collect()
    }
}

pub(crate) fn require<'a>(
    value: &'a Option<String>,
    name: &'static str,
) -> Result<&'a str, ServiceError> {
    value
        .as_deref()
        .ok_or(ServiceError::MissingCredential { name })
}

// Secrets never reach a log line through `{:?}`.
impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = |value: &Option<String>| if value.is_some() { "set" } else { "unset" };
        f.debug_struct("Credentials")
            .field("gemini_api_key", &state(&self.gemini_api_key))
            .field("x_access_token", &state(&self.x_access_token))
            .field("reddit_client_id", &state(&self.reddit_client_id))
            .field("reddit_client_secret", &state(&self.reddit_client_secret))
            .field("reddit_username", &self.reddit_username)
            .field("reddit_password", &state(&self.reddit_password))
            .field("reddit_user_agent", &self.reddit_user_agent)
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct Endpoints {
    pub gemini: String,
    pub x: String,
    pub reddit_auth: String,
    pub reddit_api: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            gemini: GEMINI_BASE_URL.to_string(),
            x: X_BASE_URL.to_string(),
            reddit_auth: REDDIT_AUTH_BASE_URL.to_string(),
            reddit_api: REDDIT_API_BASE_URL.to_string(),
        }
    }
}

/// Everything the backends need, built once and passed by reference to
/// each backend constructor.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub credentials: Credentials,
    pub endpoints: Endpoints,
    pub http: HttpSettings,
    pub model: String,
    pub feed_url: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            credentials: Credentials::default(),
            endpoints: Endpoints::default(),
            http: HttpSettings::default(),
            model: DEFAULT_MODEL.to_string(),
            feed_url: DEFAULT_FEED_URL.to_string(),
        }
    }
}

impl EngineConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        Self {
            credentials: Credentials::from_lookup(lookup),
            ..Self::default()
        }
    }
}
