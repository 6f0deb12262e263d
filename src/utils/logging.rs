// Centralized logging for the sign-in flow; token values are never logged
use log::{debug, info, warn};

use crate::callback::GateDecision;
use crate::models::AccessToken;

pub struct LoggingHelper;

impl LoggingHelper {
    /// Log the callback gate's decision
    pub fn log_gate_decision(provider: &str, decision: &GateDecision) {
        debug!(
            "{provider} callback gate: abort={}, enforce_state={}",
            decision.abort, decision.enforce_state
        );
    }

    /// Log a callback that arrived without an authorization code
    pub fn log_callback_aborted(provider: &str) {
        info!("Ignoring {provider} callback without authorization code");
    }

    /// Log a state verification failure
    pub fn log_state_mismatch(provider: &str) {
        warn!("⚠️  {provider} callback state does not match session state");
    }

    /// Log token exchange start
    pub fn log_token_exchange_start(provider: &str) {
        info!("🔄 Exchanging authorization code for tokens with {provider}");
    }

    /// Log token exchange summary
    pub fn log_token_exchange_summary(provider: &str, access_token: &AccessToken) {
        info!(
            "🔍 Token exchange summary for {provider}: authentication_token={}, scope={:?}, expires_in={:?}, error={}",
            if access_token.params.contains_key("authentication_token") {
                "present"
            } else {
                "missing"
            },
            access_token.param("scope"),
            access_token.expires_in,
            if access_token.params.contains_key("error") {
                "present"
            } else {
                "none"
            }
        );
    }

    /// Log the merged `wl_auth` cookie shape
    pub fn log_wl_auth_merged(field_count: usize, has_error: bool) {
        debug!("Merged wl_auth cookie: {field_count} fields, error={has_error}");
    }

    /// Log the first profile access of an evaluation
    pub fn log_profile_cache_miss(provider: &str) {
        debug!("Fetching {provider} profile for this callback");
    }

    /// Log profile request
    pub fn log_profile_fetch(url: &str) {
        debug!("GET {url}");
    }

    /// Log a successful sign-in
    pub fn log_authenticated(provider: &str, uid: Option<&str>) {
        info!(
            "Successfully authenticated {provider} user: {}",
            uid.unwrap_or("<unknown>")
        );
    }

    /// Log a failed callback
    pub fn log_callback_failure(provider: &str, message: &str, detail: &str) {
        warn!("❌ {provider} callback failed ({message}): {detail}");
    }

    /// Log provider configuration at startup
    pub fn log_provider_init(provider: &str, configured: bool) {
        if configured {
            info!("✅ {provider} OAuth2 configured");
        } else {
            warn!("❌ {provider} OAuth2 not configured - missing client id or secret");
        }
    }

    /// Log callback request details
    pub fn log_callback_debug(req: &actix_web::HttpRequest, param_names: &[&String]) {
        debug!(
            "OAuth callback received via {} with parameters {param_names:?}",
            req.method()
        );
        debug!(
            "Callback request connection info: {:?}",
            req.connection_info()
        );
    }
}
