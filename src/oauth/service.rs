//! Collaborator contracts for the Microsoft Live flow
//!
//! The callback flow never performs HTTP itself: token exchange and profile
//! retrieval go through these traits so the flow can be driven by fakes.

use async_trait::async_trait;
use thiserror::Error;

use crate::models::AccessToken;
use crate::profile::RawProfile;

/// OAuth collaborator errors
///
/// These are fatal for the callback evaluation; provider-reported `error`
/// parameters are not errors and travel in the `wl_auth` cookie instead.
#[derive(Debug, Error)]
pub enum OAuthError {
    #[error("Configuration error: {0}")]
    Configuration(String),
    #[error("Network error: {0}")]
    Network(String),
    #[error("Request to provider timed out")]
    Timeout,
    #[error("Token exchange failed: {0}")]
    TokenExchange(String),
    #[error("Invalid response: {0}")]
    InvalidResponse(String),
    #[error("Profile request failed: {0}")]
    Profile(String),
}

impl OAuthError {
    /// Failure message reported to the hosting application
    #[must_use]
    pub fn failure_message(&self) -> &'static str {
        match self {
            OAuthError::Timeout => "timeout",
            OAuthError::Network(_) => "failed_to_connect",
            OAuthError::Configuration(_) => "configuration_error",
            OAuthError::TokenExchange(_) | OAuthError::InvalidResponse(_) | OAuthError::Profile(_) => {
                "invalid_credentials"
            }
        }
    }
}

impl From<reqwest::Error> for OAuthError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            OAuthError::Timeout
        } else if err.is_decode() {
            OAuthError::InvalidResponse(err.to_string())
        } else {
            OAuthError::Network(err.to_string())
        }
    }
}

/// Exchanges an authorization code for an access token
#[async_trait]
pub trait TokenExchange: Send + Sync {
    /// # Errors
    ///
    /// Returns an error if the provider cannot be reached or rejects the code
    async fn exchange(&self, code: &str) -> Result<AccessToken, OAuthError>;
}

/// Fetches the raw user profile for an access token
#[async_trait]
pub trait ProfileFetcher: Send + Sync {
    /// # Errors
    ///
    /// Returns an error if the request fails or the body is not a JSON object
    async fn fetch_profile(&self, access_token: &AccessToken) -> Result<RawProfile, OAuthError>;
}

/// A full provider collaborator
pub trait LiveProvider: TokenExchange + ProfileFetcher {}

impl<T: TokenExchange + ProfileFetcher> LiveProvider for T {}
