//! Per-evaluation identity context
//!
//! Holds the access token of one callback evaluation together with a profile
//! slot that is filled on first use. A context must not outlive its request.

use chrono::Utc;
use serde_json::{Map, Value};

use super::{canonical_email, email_list, EmailRecord, RawProfile};
use crate::models::{AccessToken, AuthHash, Credentials};
use crate::oauth::{OAuthError, ProfileFetcher};
use crate::utils::logging::LoggingHelper;

/// Profile cache slot, empty until the first fetch
#[derive(Debug, Default)]
pub struct ProfileSlot {
    raw: Option<RawProfile>,
}

impl ProfileSlot {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn is_filled(&self) -> bool {
        self.raw.is_some()
    }

    /// Cached profile, fetching it on first access
    ///
    /// # Errors
    ///
    /// Returns the fetcher's error; the slot stays empty so a later call retries
    pub async fn get_or_fetch<F>(
        &mut self,
        fetcher: &F,
        access_token: &AccessToken,
    ) -> Result<&RawProfile, OAuthError>
    where
        F: ProfileFetcher + ?Sized,
    {
        let profile = match self.raw.take() {
            Some(profile) => profile,
            None => fetcher.fetch_profile(access_token).await?,
        };
        Ok(self.raw.insert(profile))
    }
}

/// Identity derivations for one authenticated callback
pub struct CallbackContext<'a, F: ProfileFetcher + ?Sized> {
    provider: &'a str,
    access_token: &'a AccessToken,
    fetcher: &'a F,
    profile: ProfileSlot,
}

impl<'a, F: ProfileFetcher + ?Sized> CallbackContext<'a, F> {
    #[must_use]
    pub fn new(provider: &'a str, access_token: &'a AccessToken, fetcher: &'a F) -> Self {
        Self {
            provider,
            access_token,
            fetcher,
            profile: ProfileSlot::new(),
        }
    }

    #[must_use]
    pub fn access_token(&self) -> &AccessToken {
        self.access_token
    }

    /// # Errors
    ///
    /// Returns an error if the profile cannot be fetched
    pub async fn raw_info(&mut self) -> Result<&RawProfile, OAuthError> {
        if !self.profile.is_filled() {
            LoggingHelper::log_profile_cache_miss(self.provider);
        }
        self.profile
            .get_or_fetch(self.fetcher, self.access_token)
            .await
    }

    /// # Errors
    ///
    /// Returns an error if the profile cannot be fetched
    pub async fn uid(&mut self) -> Result<Option<String>, OAuthError> {
        Ok(self.raw_info().await?.id())
    }

    /// # Errors
    ///
    /// Returns an error if the profile cannot be fetched
    pub async fn email(&mut self) -> Result<Option<String>, OAuthError> {
        Ok(canonical_email(self.raw_info().await?))
    }

    /// # Errors
    ///
    /// Returns an error if the profile cannot be fetched
    pub async fn emails(&mut self) -> Result<Vec<EmailRecord>, OAuthError> {
        Ok(email_list(self.raw_info().await?))
    }

    /// Canonical `info` map
    ///
    /// # Errors
    ///
    /// Returns an error if the profile cannot be fetched
    pub async fn info(&mut self) -> Result<Map<String, Value>, OAuthError> {
        let raw = self.raw_info().await?;

        let emails = serde_json::to_value(email_list(raw))
            .map_err(|e| OAuthError::InvalidResponse(format!("Failed to encode emails: {e}")))?;

        let mut info = Map::new();
        info.insert("id".to_string(), raw.field("id"));
        info.insert(
            "email".to_string(),
            canonical_email(raw).map_or(Value::Null, Value::String),
        );
        info.insert("emails".to_string(), emails);
        for key in [
            "name",
            "first_name",
            "last_name",
            "gender",
            "link",
            "locale",
            "updated_time",
        ] {
            info.insert(key.to_string(), raw.field(key));
        }
        Ok(info)
    }

    /// Provider extras: the raw document and the authentication token
    ///
    /// # Errors
    ///
    /// Returns an error if the profile cannot be fetched
    pub async fn extra(&mut self) -> Result<Map<String, Value>, OAuthError> {
        let raw_info = Value::Object(self.raw_info().await?.as_map().clone());
        let authentication_token = self
            .access_token
            .param("authentication_token")
            .unwrap_or_default()
            .to_string();

        let mut extra = Map::new();
        extra.insert("raw_info".to_string(), raw_info);
        extra.insert(
            "authentication_token".to_string(),
            Value::String(authentication_token),
        );
        Ok(extra)
    }

    /// Assemble the full auth hash
    ///
    /// # Errors
    ///
    /// Returns an error if the profile cannot be fetched
    pub async fn auth_hash(&mut self) -> Result<AuthHash, OAuthError> {
        let uid = self.uid().await?;
        let info = self.info().await?;
        let extra = self.extra().await?;

        let expires_at = self
            .access_token
            .expires_at(Utc::now())
            .map(|at| at.timestamp());

        Ok(AuthHash {
            provider: self.provider.to_string(),
            uid,
            info,
            credentials: Credentials {
                token: self.access_token.token.clone(),
                expires: expires_at.is_some(),
                expires_at,
            },
            extra,
        })
    }
}
