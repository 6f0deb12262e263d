//! Test fixtures providing pre-built test objects

use serde_json::json;
use std::collections::HashMap;

use super::constants::{
    TEST_CLIENT_ID, TEST_CLIENT_SECRET, TEST_REDIRECT_URI, TEST_SESSION_SECRET, TEST_USER_ID,
};
use crate::models::{AccessToken, CallbackRequest};
use crate::oauth::StrategyOptions;
use crate::profile::RawProfile;
use crate::session::SessionStore;
use crate::settings::{LiveAuthSettings, ProviderSettings};

/// Central fixture provider for all test data
pub struct TestFixtures;

impl TestFixtures {
    /// Token shaped like a Live token response
    #[must_use]
    pub fn access_token() -> AccessToken {
        Self::access_token_with("access_token", "auth_token", "wl.emails wl.basic", Some(3600))
    }

    #[must_use]
    pub fn access_token_with(
        token: &str,
        authentication_token: &str,
        scope: &str,
        expires_in: Option<u64>,
    ) -> AccessToken {
        let mut params = HashMap::new();
        params.insert(
            "authentication_token".to_string(),
            authentication_token.to_string(),
        );
        params.insert("scope".to_string(), scope.to_string());
        AccessToken {
            token: token.to_string(),
            params,
            expires_in,
        }
    }

    /// Sample `/v5.0/me` document
    ///
    /// # Panics
    ///
    /// Never; the document is a literal object.
    #[must_use]
    pub fn raw_profile() -> RawProfile {
        RawProfile::new(json!({
            "id": TEST_USER_ID,
            "name": "Roberto Tamburello",
            "first_name": "Roberto",
            "last_name": "Tamburello",
            "link": "https://profile.live.com/",
            "gender": null,
            "emails": {
                "preferred": "preferred@example.com",
                "account": "account@example.com",
                "personal": null,
                "business": null
            },
            "locale": "en_US",
            "updated_time": "2011-12-14T00:00:00+0000"
        }))
        .expect("fixture profile is an object")
    }

    #[must_use]
    pub fn strategy_options() -> StrategyOptions {
        StrategyOptions::new(TEST_CLIENT_ID, TEST_CLIENT_SECRET, TEST_REDIRECT_URI)
    }

    #[must_use]
    pub fn session_store() -> SessionStore {
        SessionStore::new(TEST_SESSION_SECRET, false)
    }

    /// Settings with a configured provider and insecure cookies
    #[must_use]
    pub fn settings() -> LiveAuthSettings {
        let mut settings = LiveAuthSettings::default();
        settings.provider = ProviderSettings {
            client_id: Some(TEST_CLIENT_ID.to_string()),
            client_secret: Some(TEST_CLIENT_SECRET.to_string()),
            client_id_env: None,
            client_secret_env: None,
            ..ProviderSettings::default()
        };
        settings.session.session_secret = TEST_SESSION_SECRET.to_string();
        settings.cookies.secure = false;
        settings
    }

    /// Callback request from `(name, value)` pairs
    #[must_use]
    pub fn callback_request(
        params: &[(&str, &str)],
        cookies: &[(&str, &str)],
        session: &[(&str, &str)],
    ) -> CallbackRequest {
        CallbackRequest {
            params: to_map(params),
            cookies: to_map(cookies),
            session: to_map(session),
        }
    }
}

fn to_map(pairs: &[(&str, &str)]) -> HashMap<String, String> {
    pairs
        .iter()
        .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
        .collect()
}
