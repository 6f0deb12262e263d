//! Microsoft Live OAuth module
//!
//! Fixed provider endpoints, typed client options and the collaborator traits
//! used by the callback flow for token exchange and profile retrieval.

pub mod client;
pub mod service;

pub use client::LiveClient;
pub use service::{LiveProvider, OAuthError, ProfileFetcher, TokenExchange};

use serde::{Deserialize, Serialize};

/// Strategy name used in routes, failure redirects and the auth hash
pub const STRATEGY_NAME: &str = "microsoft_live";

/// Scopes requested when none are configured
pub const DEFAULT_SCOPE: &str = "wl.basic,wl.emails";

/// User-info endpoint
pub const USER_DATA_URL: &str = "https://apis.live.net/v5.0/me";

pub const SITE: &str = "https://login.live.com";
pub const AUTHORIZE_PATH: &str = "/oauth20_authorize.srf";
pub const TOKEN_PATH: &str = "/oauth20_token.srf";

/// Session key holding the anti-CSRF state issued by the request phase
pub const STATE_SESSION_KEY: &str = "oauth.state";

/// Provider endpoint configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientOptions {
    pub site: String,
    pub authorize_url: String,
    pub token_url: String,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            site: SITE.to_string(),
            authorize_url: AUTHORIZE_PATH.to_string(),
            token_url: TOKEN_PATH.to_string(),
        }
    }
}

impl ClientOptions {
    /// Absolute authorization endpoint
    #[must_use]
    pub fn authorize_endpoint(&self) -> String {
        join_url(&self.site, &self.authorize_url)
    }

    /// Absolute token endpoint
    #[must_use]
    pub fn token_endpoint(&self) -> String {
        join_url(&self.site, &self.token_url)
    }
}

fn join_url(site: &str, path: &str) -> String {
    if path.starts_with("http://") || path.starts_with("https://") {
        return path.to_string();
    }
    format!(
        "{}/{}",
        site.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

/// Fixed parameters sent to the authorization endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorizeParams {
    pub response_type: String,
    pub scope: String,
}

impl Default for AuthorizeParams {
    fn default() -> Self {
        Self {
            response_type: "code".to_string(),
            scope: DEFAULT_SCOPE.to_string(),
        }
    }
}

/// Everything the strategy and its HTTP client need to talk to the provider
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StrategyOptions {
    pub name: String,
    pub client_id: String,
    pub client_secret: String,
    pub redirect_uri: String,
    pub client_options: ClientOptions,
    pub authorize_params: AuthorizeParams,
    pub request_timeout_seconds: u64,
}

impl StrategyOptions {
    #[must_use]
    pub fn new(client_id: &str, client_secret: &str, redirect_uri: &str) -> Self {
        Self {
            name: STRATEGY_NAME.to_string(),
            client_id: client_id.to_string(),
            client_secret: client_secret.to_string(),
            redirect_uri: redirect_uri.to_string(),
            client_options: ClientOptions::default(),
            authorize_params: AuthorizeParams::default(),
            request_timeout_seconds: 30,
        }
    }
}
