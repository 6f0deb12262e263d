// reqwest-backed collaborator for the Microsoft Live endpoints
use async_trait::async_trait;
use std::time::Duration;

use crate::models::AccessToken;
use crate::oauth::service::{OAuthError, ProfileFetcher, TokenExchange};
use crate::oauth::{StrategyOptions, USER_DATA_URL};
use crate::profile::RawProfile;
use crate::utils::logging::LoggingHelper;

/// HTTP client for the token and user-info endpoints
#[derive(Clone)]
pub struct LiveClient {
    options: StrategyOptions,
    user_data_url: String,
    http_client: reqwest::Client,
}

impl LiveClient {
    /// Create a client for the given strategy options
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying HTTP client cannot be built
    pub fn new(options: StrategyOptions) -> Result<Self, OAuthError> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(options.request_timeout_seconds))
            .build()
            .map_err(|e| OAuthError::Configuration(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            options,
            user_data_url: USER_DATA_URL.to_string(),
            http_client,
        })
    }

    /// Point profile requests at another user-info endpoint
    #[must_use]
    pub fn with_user_data_url(mut self, url: &str) -> Self {
        self.user_data_url = url.to_string();
        self
    }

    #[must_use]
    pub fn options(&self) -> &StrategyOptions {
        &self.options
    }
}

#[async_trait]
impl TokenExchange for LiveClient {
    async fn exchange(&self, code: &str) -> Result<AccessToken, OAuthError> {
        let token_url = self.options.client_options.token_endpoint();
        let params = [
            ("client_id", self.options.client_id.as_str()),
            ("client_secret", self.options.client_secret.as_str()),
            ("code", code),
            ("grant_type", "authorization_code"),
            ("redirect_uri", self.options.redirect_uri.as_str()),
        ];

        LoggingHelper::log_token_exchange_start(&self.options.name);
        let response = self
            .http_client
            .post(&token_url)
            .form(&params)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(OAuthError::TokenExchange(format!(
                "token endpoint returned status {status}: {body}"
            )));
        }

        let document: serde_json::Value = serde_json::from_str(&body)
            .map_err(|e| OAuthError::InvalidResponse(format!("Failed to parse token response: {e}")))?;
        let token = AccessToken::from_token_response(&document)?;

        LoggingHelper::log_token_exchange_summary(&self.options.name, &token);
        Ok(token)
    }
}

#[async_trait]
impl ProfileFetcher for LiveClient {
    async fn fetch_profile(&self, access_token: &AccessToken) -> Result<RawProfile, OAuthError> {
        LoggingHelper::log_profile_fetch(&self.user_data_url);
        let response = self
            .http_client
            .get(&self.user_data_url)
            .bearer_auth(&access_token.token)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(OAuthError::Profile(format!(
                "user info endpoint returned status {status}"
            )));
        }

        let document: serde_json::Value = response.json().await?;
        RawProfile::new(document)
    }
}
