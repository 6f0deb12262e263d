//! Fake provider collaborator for isolated tests

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};

use super::fixtures::TestFixtures;
use crate::models::AccessToken;
use crate::oauth::{OAuthError, ProfileFetcher, TokenExchange};
use crate::profile::RawProfile;

/// In-memory stand-in for `LiveClient` that counts its calls
pub struct FakeLiveClient {
    access_token: AccessToken,
    profile: RawProfile,
    fail_exchange: bool,
    fail_profile: bool,
    token_exchanges: AtomicUsize,
    profile_fetches: AtomicUsize,
}

impl Default for FakeLiveClient {
    fn default() -> Self {
        Self::new()
    }
}

impl FakeLiveClient {
    #[must_use]
    pub fn new() -> Self {
        Self {
            access_token: TestFixtures::access_token(),
            profile: TestFixtures::raw_profile(),
            fail_exchange: false,
            fail_profile: false,
            token_exchanges: AtomicUsize::new(0),
            profile_fetches: AtomicUsize::new(0),
        }
    }

    #[must_use]
    pub fn with_access_token(mut self, access_token: AccessToken) -> Self {
        self.access_token = access_token;
        self
    }

    #[must_use]
    pub fn with_profile(mut self, profile: RawProfile) -> Self {
        self.profile = profile;
        self
    }

    /// Make every token exchange fail
    #[must_use]
    pub fn failing_exchange(mut self) -> Self {
        self.fail_exchange = true;
        self
    }

    /// Make every profile fetch fail
    #[must_use]
    pub fn failing_profile(mut self) -> Self {
        self.fail_profile = true;
        self
    }

    #[must_use]
    pub fn token_exchanges(&self) -> usize {
        self.token_exchanges.load(Ordering::SeqCst)
    }

    #[must_use]
    pub fn profile_fetches(&self) -> usize {
        self.profile_fetches.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TokenExchange for FakeLiveClient {
    async fn exchange(&self, _code: &str) -> Result<AccessToken, OAuthError> {
        self.token_exchanges.fetch_add(1, Ordering::SeqCst);
        if self.fail_exchange {
            return Err(OAuthError::TokenExchange(
                "token endpoint returned status 400 Bad Request".to_string(),
            ));
        }
        Ok(self.access_token.clone())
    }
}

#[async_trait]
impl ProfileFetcher for FakeLiveClient {
    async fn fetch_profile(&self, _access_token: &AccessToken) -> Result<RawProfile, OAuthError> {
        self.profile_fetches.fetch_add(1, Ordering::SeqCst);
        if self.fail_profile {
            return Err(OAuthError::Profile(
                "user info endpoint returned status 401 Unauthorized".to_string(),
            ));
        }
        Ok(self.profile.clone())
    }
}
