//! Microsoft Live sign-in flow
//!
//! The request phase sends the browser to the provider with a fresh state
//! token. The callback phase runs the gate, verifies state, exchanges the
//! code, merges the `wl_auth` cookie and normalizes the profile.

use std::collections::HashMap;

use super::gate::{CallbackGate, FlowOptions};
use crate::models::{AccessToken, AuthHash, CallbackRequest};
use crate::oauth::{LiveProvider, OAuthError, StrategyOptions, STATE_SESSION_KEY};
use crate::profile::CallbackContext;
use crate::session::{merge_wl_auth, WL_AUTH_COOKIE};
use crate::utils::crypto::generate_csrf_token;
use crate::utils::logging::LoggingHelper;

/// Failure message for a state mismatch
pub const CSRF_DETECTED: &str = "csrf_detected";

/// Data produced by a successful callback
#[derive(Debug, Clone)]
pub struct AuthenticatedCallback {
    pub auth: AuthHash,
    pub access_token: AccessToken,
    /// Merged `wl_auth` value for the hosting layer to set as a cookie
    pub wl_auth: String,
    /// Session after the state token was consumed
    pub session: HashMap<String, String>,
}

#[derive(Debug, Clone)]
pub enum CallbackOutcome {
    /// No authorization code; nothing was exchanged or fetched
    Aborted,
    /// The callback was rejected before any token exchange
    Failed {
        message: &'static str,
        session: HashMap<String, String>,
    },
    Authenticated(Box<AuthenticatedCallback>),
}

/// Microsoft Live OAuth2 strategy
pub struct MicrosoftLiveStrategy<C> {
    options: StrategyOptions,
    client: C,
}

impl<C: LiveProvider> MicrosoftLiveStrategy<C> {
    #[must_use]
    pub fn new(options: StrategyOptions, client: C) -> Self {
        Self { options, client }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.options.name
    }

    #[must_use]
    pub fn options(&self) -> &StrategyOptions {
        &self.options
    }

    #[must_use]
    pub fn client(&self) -> &C {
        &self.client
    }

    /// Provider authorization URL for the given state
    ///
    /// # Errors
    ///
    /// Returns an error if the configured authorization endpoint is not a valid URL
    pub fn authorize_url(&self, state: &str) -> Result<String, OAuthError> {
        let endpoint = self.options.client_options.authorize_endpoint();
        let mut url = url::Url::parse(&endpoint).map_err(|e| {
            OAuthError::Configuration(format!("Invalid authorization endpoint {endpoint}: {e}"))
        })?;

        url.query_pairs_mut()
            .append_pair("client_id", &self.options.client_id)
            .append_pair("redirect_uri", &self.options.redirect_uri)
            .append_pair("response_type", &self.options.authorize_params.response_type)
            .append_pair("scope", &self.options.authorize_params.scope)
            .append_pair("state", state);

        Ok(url.to_string())
    }

    /// Start a sign-in: store a new state token and return the provider URL
    ///
    /// # Errors
    ///
    /// Returns an error if the authorization URL cannot be built
    pub fn request_phase(&self, session: &mut HashMap<String, String>) -> Result<String, OAuthError> {
        let state = generate_csrf_token();
        let url = self.authorize_url(&state)?;
        session.insert(STATE_SESSION_KEY.to_string(), state);
        Ok(url)
    }

    /// Evaluate a provider callback
    ///
    /// # Errors
    ///
    /// Returns an error if the token exchange or the profile fetch fails
    pub async fn callback_phase(
        &self,
        request: &CallbackRequest,
    ) -> Result<CallbackOutcome, OAuthError> {
        let decision = CallbackGate::evaluate(&request.params, &request.session);
        LoggingHelper::log_gate_decision(self.name(), &decision);
        let flow_options = FlowOptions::from_decision(&decision);

        let code = match request.param("code") {
            Some(code) if !decision.abort => code,
            _ => {
                LoggingHelper::log_callback_aborted(self.name());
                return Ok(CallbackOutcome::Aborted);
            }
        };

        let mut session = request.session.clone();
        if !flow_options.provider_ignores_state {
            let stored_state = session.remove(STATE_SESSION_KEY);
            if !state_matches(request.param("state"), stored_state.as_deref()) {
                LoggingHelper::log_state_mismatch(self.name());
                return Ok(CallbackOutcome::Failed {
                    message: CSRF_DETECTED,
                    session,
                });
            }
        }

        let access_token = self.client.exchange(code).await?;
        let merged = merge_wl_auth(
            request.cookie(WL_AUTH_COOKIE),
            &access_token,
            &request.params,
        );
        LoggingHelper::log_wl_auth_merged(merged.len(), merged.get("error").is_some());
        let wl_auth = merged.to_string();

        let mut context = CallbackContext::new(self.name(), &access_token, &self.client);
        let auth = context.auth_hash().await?;
        LoggingHelper::log_authenticated(self.name(), auth.uid.as_deref());

        Ok(CallbackOutcome::Authenticated(Box::new(AuthenticatedCallback {
            auth,
            access_token,
            wl_auth,
            session,
        })))
    }
}

fn state_matches(received: Option<&str>, stored: Option<&str>) -> bool {
    match (received, stored) {
        (Some(received), Some(stored)) => !received.is_empty() && received == stored,
        _ => false,
    }
}
