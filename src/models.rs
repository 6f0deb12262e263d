use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::oauth::OAuthError;

#[derive(Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub message: String,
}

/// Inputs available while a callback is evaluated
///
/// Built once by the hosting layer and never mutated by the flow.
#[derive(Debug, Clone, Default)]
pub struct CallbackRequest {
    /// Query and form parameters, form values win on conflict
    pub params: HashMap<String, String>,
    pub cookies: HashMap<String, String>,
    pub session: HashMap<String, String>,
}

impl CallbackRequest {
    #[must_use]
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params.get(name).map(String::as_str)
    }

    #[must_use]
    pub fn cookie(&self, name: &str) -> Option<&str> {
        self.cookies.get(name).map(String::as_str)
    }
}

/// Result of a successful authorization-code exchange
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessToken {
    pub token: String,
    /// Every other field of the token response, stringified
    pub params: HashMap<String, String>,
    pub expires_in: Option<u64>,
}

impl AccessToken {
    /// Build an access token from the token endpoint's JSON body
    ///
    /// # Errors
    ///
    /// Returns an error if the body is not an object or carries no `access_token`
    pub fn from_token_response(body: &serde_json::Value) -> Result<Self, OAuthError> {
        let fields = body.as_object().ok_or_else(|| {
            OAuthError::InvalidResponse("token response is not a JSON object".to_string())
        })?;

        let token = fields
            .get("access_token")
            .and_then(serde_json::Value::as_str)
            .filter(|token| !token.is_empty())
            .ok_or_else(|| {
                OAuthError::InvalidResponse("token response has no access_token".to_string())
            })?
            .to_string();

        let expires_in = fields.get("expires_in").and_then(|value| match value {
            serde_json::Value::Number(n) => n.as_u64(),
            serde_json::Value::String(s) => s.trim().parse().ok(),
            _ => None,
        });

        let params = fields
            .iter()
            .filter(|(key, _)| !matches!(key.as_str(), "access_token" | "expires_in"))
            .map(|(key, value)| (key.clone(), stringify_param(value)))
            .collect();

        Ok(Self {
            token,
            params,
            expires_in,
        })
    }

    #[must_use]
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params.get(name).map(String::as_str)
    }

    /// Absolute expiry computed from `expires_in`
    #[must_use]
    pub fn expires_at(&self, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        self.expires_in
            .and_then(|secs| i64::try_from(secs).ok())
            .map(|secs| now + Duration::seconds(secs))
    }
}

fn stringify_param(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        serde_json::Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// Token details exposed with an authenticated identity
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Credentials {
    pub token: String,
    pub expires: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<i64>,
}

/// Normalized identity handed to the hosting application
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AuthHash {
    pub provider: String,
    pub uid: Option<String>,
    pub info: serde_json::Map<String, serde_json::Value>,
    pub credentials: Credentials,
    pub extra: serde_json::Map<String, serde_json::Value>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_access_token_from_live_response() {
        let body = json!({
            "token_type": "bearer",
            "expires_in": 3600,
            "scope": "wl.basic wl.emails",
            "access_token": "EwAwAq1DBAAUGCCXc8wU",
            "authentication_token": "eyJhbGciOiJIUzI1NiJ9",
            "user_id": "8c8ce076ca27823f"
        });

        let token = AccessToken::from_token_response(&body).unwrap();
        assert_eq!(token.token, "EwAwAq1DBAAUGCCXc8wU");
        assert_eq!(token.expires_in, Some(3600));
        assert_eq!(token.param("scope"), Some("wl.basic wl.emails"));
        assert_eq!(token.param("authentication_token"), Some("eyJhbGciOiJIUzI1NiJ9"));
        assert_eq!(token.param("token_type"), Some("bearer"));
        assert!(token.param("access_token").is_none());
        assert!(token.param("expires_in").is_none());
    }

    #[test]
    fn test_access_token_accepts_string_expiry() {
        let body = json!({ "access_token": "abc", "expires_in": "1800" });
        let token = AccessToken::from_token_response(&body).unwrap();
        assert_eq!(token.expires_in, Some(1800));
    }

    #[test]
    fn test_access_token_requires_token() {
        let body = json!({ "error": "invalid_grant" });
        let err = AccessToken::from_token_response(&body).unwrap_err();
        assert!(matches!(err, OAuthError::InvalidResponse(_)));

        let err = AccessToken::from_token_response(&json!("nope")).unwrap_err();
        assert!(matches!(err, OAuthError::InvalidResponse(_)));
    }

    #[test]
    fn test_expires_at() {
        let now = Utc::now();
        let token = AccessToken {
            token: "t".to_string(),
            params: HashMap::new(),
            expires_in: Some(60),
        };
        assert_eq!(token.expires_at(now), Some(now + Duration::seconds(60)));

        let no_expiry = AccessToken {
            expires_in: None,
            ..token
        };
        assert_eq!(no_expiry.expires_at(now), None);
    }
}
