//! `wl_auth` cookie handling
//!
//! The cookie is a flat `key=value&key=value` string shared with the provider's
//! browser SDK. Stored cookies from earlier deployments must keep parsing and
//! survive a merge byte-for-byte, so each pair keeps its original wire text.
//! Values are decoded only for lookups.

use actix_web::cookie::{Cookie, SameSite};
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use std::collections::HashMap;
use std::fmt;

use crate::models::AccessToken;

/// Name of the provider session cookie
pub const WL_AUTH_COOKIE: &str = "wl_auth";

/// Error code written when the token response carried an error
pub const TOKEN_ERROR_CODE: &str = "access_denied";

/// Human-readable description paired with [`TOKEN_ERROR_CODE`]
pub const TOKEN_ERROR_DESCRIPTION: &str = "Failed to retrieve user access token";

/// Characters escaped by URI escaping: everything except unreserved and
/// reserved URI characters
const URI_UNSAFE: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')')
    .remove(b';')
    .remove(b'/')
    .remove(b'?')
    .remove(b':')
    .remove(b'@')
    .remove(b'&')
    .remove(b'=')
    .remove(b'+')
    .remove(b'$')
    .remove(b',')
    .remove(b'[')
    .remove(b']');

#[derive(Debug, Clone, PartialEq, Eq)]
struct CookiePair {
    /// Decoded key, used for lookups
    key: String,
    /// Decoded value
    value: String,
    /// Wire text written back on serialization
    raw: String,
}

/// Ordered key/value view of a `wl_auth` cookie
///
/// Displays as its wire form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WlAuthCookie {
    pairs: Vec<CookiePair>,
}

impl WlAuthCookie {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a stored cookie value; an absent cookie yields an empty mapping
    ///
    /// Pairs are separated by `&` or `;`. Keys and values are form-decoded for
    /// lookups. A repeated key keeps its first position and takes the last
    /// value.
    #[must_use]
    pub fn parse(raw: Option<&str>) -> Self {
        let mut cookie = Self::new();
        let Some(raw) = raw else {
            return cookie;
        };

        for piece in raw.split(['&', ';']) {
            let piece = piece.trim_start_matches(' ');
            // a piece holds no '&', so parse() yields at most one pair
            let Some((key, value)) = url::form_urlencoded::parse(piece.as_bytes()).next() else {
                continue;
            };
            if key.is_empty() {
                continue;
            }
            cookie.insert(CookiePair {
                key: key.into_owned(),
                value: value.into_owned(),
                raw: piece.to_string(),
            });
        }
        cookie
    }

    /// Decoded value of a key
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|pair| pair.key == key)
            .map(|pair| pair.value.as_str())
    }

    /// Overwrite a key in place, or append it, with an already encoded value
    pub fn set_encoded(&mut self, key: &str, encoded: &str) {
        let value = url::form_urlencoded::parse(format!("k={encoded}").as_bytes())
            .next()
            .map(|(_, value)| value.into_owned())
            .unwrap_or_default();
        self.insert(CookiePair {
            key: key.to_string(),
            value,
            raw: format!("{key}={encoded}"),
        });
    }

    fn insert(&mut self, pair: CookiePair) {
        if let Some(slot) = self.pairs.iter_mut().find(|p| p.key == pair.key) {
            *slot = pair;
        } else {
            self.pairs.push(pair);
        }
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.pairs.iter().map(|pair| pair.key.as_str())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// Record a freshly exchanged token and any error signal
    ///
    /// Only `access_token`, `authentication_token`, `scope`, `expires_in`,
    /// `error` and `error_description` are touched.
    pub fn apply_access_token(
        &mut self,
        access_token: &AccessToken,
        request_params: &HashMap<String, String>,
    ) {
        self.set_encoded("access_token", &form_escape(&access_token.token));
        self.set_encoded(
            "authentication_token",
            &form_escape(access_token.param("authentication_token").unwrap_or_default()),
        );
        self.set_encoded(
            "scope",
            &uri_escape(access_token.param("scope").unwrap_or_default()),
        );
        self.set_encoded(
            "expires_in",
            &form_escape(
                &access_token
                    .expires_in
                    .map(|secs| secs.to_string())
                    .unwrap_or_default(),
            ),
        );

        if let Some(error) = request_params.get("error") {
            self.set_encoded("error", error);
        } else if access_token.params.contains_key("error") {
            self.set_encoded("error", TOKEN_ERROR_CODE);
            self.set_encoded("error_description", &uri_escape(TOKEN_ERROR_DESCRIPTION));
        }
    }
}

impl fmt::Display for WlAuthCookie {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (index, pair) in self.pairs.iter().enumerate() {
            if index > 0 {
                f.write_str("&")?;
            }
            f.write_str(&pair.raw)?;
        }
        Ok(())
    }
}

/// Merge a token exchange result into the prior `wl_auth` cookie
///
/// Pairs of the prior cookie that are not managed here survive unchanged.
#[must_use]
pub fn merge_wl_auth(
    prior: Option<&str>,
    access_token: &AccessToken,
    request_params: &HashMap<String, String>,
) -> WlAuthCookie {
    let mut cookie = WlAuthCookie::parse(prior);
    cookie.apply_access_token(access_token, request_params);
    cookie
}

/// Wire form of [`merge_wl_auth`]
#[must_use]
pub fn merge_wl_auth_cookie(
    prior: Option<&str>,
    access_token: &AccessToken,
    request_params: &HashMap<String, String>,
) -> String {
    merge_wl_auth(prior, access_token, request_params).to_string()
}

/// Response cookie carrying a merged `wl_auth` value
///
/// Left readable by scripts since the provider's browser SDK consumes it.
#[must_use]
pub fn create_wl_auth_cookie(value: String, secure: bool, domain: Option<&str>) -> Cookie<'static> {
    let mut builder = Cookie::build(WL_AUTH_COOKIE, value)
        .http_only(false)
        .secure(secure)
        .same_site(SameSite::Lax)
        .path("/");
    if let Some(domain) = domain {
        builder = builder.domain(domain.to_string());
    }
    builder.finish()
}

/// `application/x-www-form-urlencoded` escaping (space becomes `+`)
fn form_escape(value: &str) -> String {
    url::form_urlencoded::byte_serialize(value.as_bytes()).collect()
}

/// URI escaping: space becomes `%20`, reserved characters such as `,` stay
fn uri_escape(value: &str) -> String {
    utf8_percent_encode(value, URI_UNSAFE).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::TestFixtures;

    fn no_params() -> HashMap<String, String> {
        HashMap::new()
    }

    #[test]
    fn test_parse_absent_cookie() {
        assert!(WlAuthCookie::parse(None).is_empty());
        assert!(WlAuthCookie::parse(Some("")).is_empty());
    }

    #[test]
    fn test_parse_keeps_order_and_decodes() {
        let cookie = WlAuthCookie::parse(Some("client_id=0000000000000001&status=not%20connected; a+b=c+d"));
        let keys: Vec<&str> = cookie.keys().collect();
        assert_eq!(keys, ["client_id", "status", "a b"]);
        assert_eq!(cookie.get("status"), Some("not connected"));
        assert_eq!(cookie.get("a b"), Some("c d"));
    }

    #[test]
    fn test_parse_edge_cases() {
        let cookie = WlAuthCookie::parse(Some("flag&=orphan&&x=1&x=2&eq=a=b"));
        let keys: Vec<&str> = cookie.keys().collect();
        assert_eq!(keys, ["flag", "x", "eq"]);
        assert_eq!(cookie.get("flag"), Some(""));
        assert_eq!(cookie.get("x"), Some("2"));
        assert_eq!(cookie.get("eq"), Some("a=b"));
    }

    #[test]
    fn test_round_trip_plain_values() {
        let raw = "client_id=0000000000000001&status=connected&expires_in=3600";
        assert_eq!(WlAuthCookie::parse(Some(raw)).to_string(), raw);
    }

    #[test]
    fn test_merge_preserves_unrelated_keys() {
        let token = TestFixtures::access_token_with("T", "A", "s1 s2", Some(3600));
        let merged = merge_wl_auth_cookie(Some("client_id=X&status=Y"), &token, &no_params());

        assert_eq!(
            merged,
            "client_id=X&status=Y&access_token=T&authentication_token=A&scope=s1%20s2&expires_in=3600"
        );
        assert!(!merged.contains("error"));
    }

    #[test]
    fn test_merge_overwrites_managed_keys_in_place() {
        let token = TestFixtures::access_token_with("new", "auth", "wl.basic", Some(60));
        let merged = merge_wl_auth_cookie(
            Some("access_token=old&client_id=X&scope=stale"),
            &token,
            &no_params(),
        );
        assert_eq!(
            merged,
            "access_token=new&client_id=X&scope=wl.basic&authentication_token=auth&expires_in=60"
        );
    }

    #[test]
    fn test_merge_without_prior_cookie_or_optional_params() {
        let mut token = TestFixtures::access_token_with("tok en/+", "", "", None);
        token.params.clear();
        let merged = merge_wl_auth_cookie(None, &token, &no_params());
        assert_eq!(
            merged,
            "access_token=tok+en%2F%2B&authentication_token=&scope=&expires_in="
        );
    }

    #[test]
    fn test_request_error_copied_verbatim() {
        let token = TestFixtures::access_token();
        let mut params = no_params();
        params.insert("error".to_string(), "access_denied_by_user".to_string());

        let cookie = WlAuthCookie::parse(Some(&merge_wl_auth_cookie(None, &token, &params)));
        assert_eq!(cookie.get("error"), Some("access_denied_by_user"));
        assert_eq!(cookie.get("error_description"), None);
    }

    #[test]
    fn test_request_error_wins_over_token_error() {
        let mut token = TestFixtures::access_token();
        token
            .params
            .insert("error".to_string(), "some error".to_string());
        let mut params = no_params();
        params.insert("error".to_string(), "error".to_string());

        let merged = merge_wl_auth_cookie(None, &token, &params);
        assert!(merged.ends_with("&error=error"));
    }

    #[test]
    fn test_token_error_sets_fixed_description() {
        let mut token = TestFixtures::access_token();
        token
            .params
            .insert("error".to_string(), "some error".to_string());

        let merged = merge_wl_auth_cookie(None, &token, &no_params());
        assert!(merged.ends_with(
            "error=access_denied&error_description=Failed%20to%20retrieve%20user%20access%20token"
        ));
    }

    #[test]
    fn test_wl_auth_response_cookie() {
        let cookie = create_wl_auth_cookie("a=b".to_string(), true, Some("example.com"));
        assert_eq!(cookie.name(), "wl_auth");
        assert_eq!(cookie.value(), "a=b");
        assert_eq!(cookie.path(), Some("/"));
        assert_eq!(cookie.domain(), Some("example.com"));
        assert_eq!(cookie.secure(), Some(true));
        assert_eq!(cookie.http_only(), Some(false));
    }

    #[test]
    fn test_merge_keeps_encoded_prior_values_verbatim() {
        let token = TestFixtures::access_token_with("T", "A", "wl.basic", Some(3600));
        let prior = "client_id=X&status=a%26b%3Dc&note=not%20connected&plus=a+b";
        let merged = merge_wl_auth_cookie(Some(prior), &token, &no_params());

        assert!(merged.starts_with(&format!("{prior}&access_token=T&")));
        let reparsed = WlAuthCookie::parse(Some(&merged));
        let keys: Vec<&str> = reparsed.keys().collect();
        assert_eq!(
            keys,
            [
                "client_id",
                "status",
                "note",
                "plus",
                "access_token",
                "authentication_token",
                "scope",
                "expires_in"
            ]
        );
        assert_eq!(reparsed.get("status"), Some("a&b=c"));
        assert_eq!(reparsed.get("note"), Some("not connected"));
    }

    #[test]
    fn test_encoded_prior_value_cannot_forge_managed_keys() {
        let token = TestFixtures::access_token_with("real", "A", "wl.basic", Some(3600));
        let merged = merge_wl_auth_cookie(
            Some("status=x%26access_token%3Devil"),
            &token,
            &no_params(),
        );

        assert_eq!(merged.matches("access_token=").count(), 1);
        let reparsed = WlAuthCookie::parse(Some(&merged));
        assert_eq!(reparsed.get("access_token"), Some("real"));
        assert_eq!(reparsed.get("status"), Some("x&access_token=evil"));
    }

    #[test]
    fn test_scope_keeps_reserved_characters() {
        let token = TestFixtures::access_token_with("T", "A", "wl.basic,wl.emails wl/x:y", Some(60));
        let merged = merge_wl_auth_cookie(None, &token, &no_params());
        assert!(merged.contains("&scope=wl.basic,wl.emails%20wl/x:y&"));
    }

    #[test]
    fn test_merge_returns_structured_cookie() {
        let token = TestFixtures::access_token();
        let cookie = merge_wl_auth(Some("client_id=X"), &token, &no_params());
        assert_eq!(cookie.len(), 5);
        assert_eq!(cookie.get("scope"), Some("wl.emails wl.basic"));
        assert_eq!(cookie.to_string(), merge_wl_auth_cookie(Some("client_id=X"), &token, &no_params()));
    }
}
