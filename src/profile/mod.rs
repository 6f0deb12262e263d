//! Profile normalization
//!
//! Turns the provider's user-info document into the canonical identity fields.
//! The document is read-only; missing fields become `None`, never errors.

pub mod context;

pub use context::{CallbackContext, ProfileSlot};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

use crate::oauth::OAuthError;

/// Untyped user-info document, in the provider's own key order
#[derive(Debug, Clone, PartialEq)]
pub struct RawProfile(Map<String, Value>);

impl RawProfile {
    /// Wrap a parsed user-info response
    ///
    /// # Errors
    ///
    /// Returns an error if the document is not a JSON object
    pub fn new(document: Value) -> Result<Self, OAuthError> {
        match document {
            Value::Object(fields) => Ok(Self(fields)),
            other => Err(OAuthError::InvalidResponse(format!(
                "user info is not a JSON object: {other}"
            ))),
        }
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Field value, `Null` when absent
    #[must_use]
    pub fn field(&self, key: &str) -> Value {
        self.0.get(key).cloned().unwrap_or(Value::Null)
    }

    /// Provider id as a string
    #[must_use]
    pub fn id(&self) -> Option<String> {
        match self.0.get("id")? {
            Value::String(id) => Some(id.clone()),
            Value::Null => None,
            other => Some(other.to_string()),
        }
    }

    /// The `emails` object, if the provider sent one
    #[must_use]
    pub fn emails(&self) -> Option<&Map<String, Value>> {
        self.0.get("emails").and_then(Value::as_object)
    }

    #[must_use]
    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }
}

/// Email types reported in the canonical identity, in listing order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmailType {
    Preferred,
    Account,
    Personal,
    Business,
    Other,
}

impl EmailType {
    pub const ALL: [EmailType; 5] = [
        EmailType::Preferred,
        EmailType::Account,
        EmailType::Personal,
        EmailType::Business,
        EmailType::Other,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            EmailType::Preferred => "preferred",
            EmailType::Account => "account",
            EmailType::Personal => "personal",
            EmailType::Business => "business",
            EmailType::Other => "other",
        }
    }
}

impl fmt::Display for EmailType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmailRecord {
    #[serde(rename = "type")]
    pub email_type: EmailType,
    pub value: Option<String>,
}

fn email_value(emails: &Map<String, Value>, key: &str) -> Option<String> {
    emails.get(key).and_then(Value::as_str).map(ToString::to_string)
}

/// One record per known email type, always five, in fixed order
#[must_use]
pub fn email_list(profile: &RawProfile) -> Vec<EmailRecord> {
    let emails = profile.emails();
    EmailType::ALL
        .iter()
        .map(|&email_type| EmailRecord {
            email_type,
            value: emails.and_then(|e| email_value(e, email_type.as_str())),
        })
        .collect()
}

/// Preferred email, or the first non-empty email in provider key order
///
/// The fallback scans whatever keys the provider sent, unlike [`email_list`]
/// which only looks at the five known types.
#[must_use]
pub fn canonical_email(profile: &RawProfile) -> Option<String> {
    let emails = profile.emails()?;

    if let Some(preferred) = email_value(emails, EmailType::Preferred.as_str()) {
        if !preferred.is_empty() {
            return Some(preferred);
        }
    }

    emails
        .values()
        .filter_map(Value::as_str)
        .find(|email| !email.is_empty())
        .map(ToString::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn profile_with_emails(emails: Value) -> RawProfile {
        RawProfile::new(json!({ "id": "8c8ce076ca27823f", "emails": emails })).unwrap()
    }

    #[test]
    fn test_email_list_fills_missing_types() {
        let profile = profile_with_emails(json!({ "preferred": "a@x.com" }));
        let emails = email_list(&profile);

        assert_eq!(emails.len(), 5);
        let types: Vec<&str> = emails.iter().map(|e| e.email_type.as_str()).collect();
        assert_eq!(types, ["preferred", "account", "personal", "business", "other"]);
        assert_eq!(emails[0].value.as_deref(), Some("a@x.com"));
        assert!(emails[1..].iter().all(|e| e.value.is_none()));
    }

    #[test]
    fn test_email_list_gets_all_types() {
        let profile = profile_with_emails(json!({
            "preferred": "preferred@example.com",
            "account": "account@example.com",
            "personal": "personal@example.com",
            "business": "business@example.com",
            "other": "other@example.com"
        }));

        for record in email_list(&profile) {
            assert_eq!(
                record.value,
                Some(format!("{}@example.com", record.email_type))
            );
        }
    }

    #[test]
    fn test_email_list_ignores_unknown_types() {
        let profile = profile_with_emails(json!({ "unknown": "unknown@example.com" }));
        let emails = email_list(&profile);
        assert_eq!(emails.len(), 5);
        assert!(emails.iter().all(|e| e.value.is_none()));
    }

    #[test]
    fn test_email_list_without_emails_object() {
        let profile = RawProfile::new(json!({ "id": "1" })).unwrap();
        assert_eq!(email_list(&profile).len(), 5);
        assert_eq!(canonical_email(&profile), None);
    }

    #[test]
    fn test_email_record_serialization() {
        let record = EmailRecord {
            email_type: EmailType::Business,
            value: None,
        };
        assert_eq!(
            serde_json::to_value(&record).unwrap(),
            json!({ "type": "business", "value": null })
        );
    }

    #[test]
    fn test_canonical_email_prefers_preferred() {
        let profile = profile_with_emails(json!({
            "preferred": "p@x.com",
            "account": "",
            "personal": "",
            "business": "business@example.com",
            "other": "other@example.com"
        }));
        assert_eq!(canonical_email(&profile).as_deref(), Some("p@x.com"));
    }

    #[test]
    fn test_canonical_email_first_non_blank() {
        let profile = profile_with_emails(json!({
            "preferred": "",
            "account": "",
            "personal": "",
            "business": "b@x.com",
            "other": "o@x.com"
        }));
        assert_eq!(canonical_email(&profile).as_deref(), Some("b@x.com"));
    }

    #[test]
    fn test_canonical_email_follows_provider_key_order() {
        let profile = profile_with_emails(json!({
            "other": "o@x.com",
            "preferred": null,
            "business": "b@x.com"
        }));
        assert_eq!(canonical_email(&profile).as_deref(), Some("o@x.com"));
    }

    #[test]
    fn test_canonical_email_all_blank() {
        let profile = profile_with_emails(json!({ "preferred": "", "account": null }));
        assert_eq!(canonical_email(&profile), None);
    }

    #[test]
    fn test_raw_profile_rejects_non_objects() {
        assert!(RawProfile::new(json!(["a"])).is_err());
    }

    #[test]
    fn test_numeric_id() {
        let profile = RawProfile::new(json!({ "id": 42 })).unwrap();
        assert_eq!(profile.id().as_deref(), Some("42"));
    }
}
