use actix_web::cookie::{time::Duration, Cookie, SameSite};
use actix_web::HttpRequest;
use anyhow::Result;
use sha2::{Digest, Sha256};
use std::collections::HashMap;

use crate::utils::crypto::{decrypt_data, encrypt_data};

/// Cookie carrying the encrypted session map
pub const SESSION_COOKIE_NAME: &str = "liveauth_session";

/// Encrypted, cookie-backed session map
///
/// Holds the short-lived values that must survive the round trip to the
/// provider, such as the anti-CSRF state.
#[derive(Clone)]
pub struct SessionStore {
    encryption_key: [u8; 32],
    cookie_secure: bool,
}

impl SessionStore {
    #[must_use]
    pub fn new(session_secret: &str, cookie_secure: bool) -> Self {
        let encryption_key: [u8; 32] = Sha256::digest(session_secret.as_bytes()).into();
        Self {
            encryption_key,
            cookie_secure,
        }
    }

    /// Session map of the request; missing or undecryptable cookies read as empty
    #[must_use]
    pub fn load(&self, req: &HttpRequest) -> HashMap<String, String> {
        let Some(cookie) = req.cookie(SESSION_COOKIE_NAME) else {
            return HashMap::new();
        };
        match decrypt_data::<HashMap<String, String>>(cookie.value(), &self.encryption_key) {
            Ok(session) => session,
            Err(e) => {
                log::debug!("Ignoring unreadable session cookie: {e}");
                HashMap::new()
            }
        }
    }

    /// Session cookie for the given map; an empty map clears the cookie
    ///
    /// # Errors
    ///
    /// Returns an error if encryption fails
    pub fn create_cookie(&self, session: &HashMap<String, String>) -> Result<Cookie<'static>> {
        if session.is_empty() {
            return Ok(self.create_expired_cookie());
        }
        let value = encrypt_data(session, &self.encryption_key)?;
        Ok(Cookie::build(SESSION_COOKIE_NAME, value)
            .http_only(true)
            .secure(self.cookie_secure)
            .same_site(SameSite::Lax)
            .path("/")
            .max_age(Duration::minutes(15))
            .finish())
    }

    #[must_use]
    pub fn create_expired_cookie(&self) -> Cookie<'static> {
        Cookie::build(SESSION_COOKIE_NAME, "")
            .http_only(true)
            .secure(self.cookie_secure)
            .same_site(SameSite::Lax)
            .path("/")
            .max_age(Duration::seconds(-1))
            .finish()
    }
}
