use base64::{engine::general_purpose, Engine as _};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::oauth::{
    AuthorizeParams, ClientOptions, OAuthError, StrategyOptions, AUTHORIZE_PATH, DEFAULT_SCOPE,
    SITE, STRATEGY_NAME, TOKEN_PATH,
};

/// Path of the callback endpoint, appended to `redirect_base_url`
pub const CALLBACK_PATH: &str = "/auth/microsoft_live/callback";

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct LiveAuthSettings {
    pub application: ApplicationSettings,
    pub provider: ProviderSettings,
    pub session: SessionSettings,
    pub cookies: CookieSettings,
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApplicationSettings {
    pub host: String,
    pub port: u16,
    pub redirect_base_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderSettings {
    // Direct values (can be overridden by environment variables)
    pub client_id: Option<String>,
    pub client_secret: Option<String>,

    // Environment variable names for overrides
    pub client_id_env: Option<String>,
    pub client_secret_env: Option<String>,

    pub scope: String,
    pub site: String,
    pub authorize_url: String,
    pub token_url: String,
    pub request_timeout_seconds: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct SessionSettings {
    pub session_secret: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CookieSettings {
    pub secure: bool,
    /// Domain attribute of the `wl_auth` cookie
    pub wl_auth_domain: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    pub level: String,
}

impl Default for ApplicationSettings {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            redirect_base_url: "http://localhost:8080".to_string(),
        }
    }
}

impl Default for ProviderSettings {
    fn default() -> Self {
        Self {
            client_id: None,
            client_secret: None,
            client_id_env: Some("LIVE_CLIENT_ID".to_string()),
            client_secret_env: Some("LIVE_CLIENT_SECRET".to_string()),
            scope: DEFAULT_SCOPE.to_string(),
            site: SITE.to_string(),
            authorize_url: AUTHORIZE_PATH.to_string(),
            token_url: TOKEN_PATH.to_string(),
            request_timeout_seconds: 30,
        }
    }
}

impl Default for CookieSettings {
    fn default() -> Self {
        Self {
            secure: true,
            wl_auth_domain: None,
        }
    }
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl LiveAuthSettings {
    /// Load settings from configuration files and environment variables
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Logger initialization fails
    /// - Settings file cannot be read or parsed
    pub fn load() -> Result<Self, Box<dyn std::error::Error>> {
        Self::initialize_environment()?;

        let mut settings = Self::load_base_settings()?;
        Self::apply_env_overrides(&mut settings);

        Ok(settings)
    }

    /// Load `.env` and initialize the logger
    ///
    /// # Errors
    ///
    /// Returns an error if logger initialization fails
    fn initialize_environment() -> Result<(), Box<dyn std::error::Error>> {
        Self::load_env_file();
        env_logger::try_init()?;
        Ok(())
    }

    /// Load base settings from TOML file(s) or use defaults
    ///
    /// Priority (highest to lowest):
    /// 1. Environment variables (applied separately)
    /// 2. Settings.toml in `LIVEAUTH_SECRETS_DIR`
    /// 3. Settings.toml in the current directory
    /// 4. Defaults
    ///
    /// # Errors
    ///
    /// Returns an error if a settings file cannot be read or parsed
    fn load_base_settings() -> Result<Self, Box<dyn std::error::Error>> {
        let mut settings = Self::default();

        let default_config_path = Path::new("Settings.toml");
        if default_config_path.exists() {
            settings = Self::from_toml_file(default_config_path)?;
            println!(
                "✓ Loaded base settings from {}",
                default_config_path.display()
            );
        }

        if let Ok(secrets_dir) = std::env::var("LIVEAUTH_SECRETS_DIR") {
            let secrets_path = Path::new(&secrets_dir).join("Settings.toml");
            if secrets_path.exists() {
                settings = Self::from_toml_file(&secrets_path)?;
                println!("✓ Overriding settings from {}", secrets_path.display());
            } else {
                println!(
                    "ℹ LIVEAUTH_SECRETS_DIR set but no Settings.toml found at: {}",
                    secrets_path.display()
                );
            }
        }

        Ok(settings)
    }

    /// Parse a settings file; missing sections and fields take their defaults
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not valid TOML
    pub fn from_toml_file(path: &Path) -> Result<Self, Box<dyn std::error::Error>> {
        let toml_content = fs::read_to_string(path)?;
        Ok(basic_toml::from_str(&toml_content)?)
    }

    /// Apply environment variable overrides to settings
    pub fn apply_env_overrides(settings: &mut Self) {
        Self::apply_application_env_overrides(&mut settings.application);
        Self::apply_session_env_overrides(&mut settings.session);
        Self::apply_cookie_env_overrides(&mut settings.cookies);
        Self::apply_logging_env_overrides(&mut settings.logging);
    }

    fn apply_application_env_overrides(app_settings: &mut ApplicationSettings) {
        if let Ok(host) = std::env::var("HOST") {
            app_settings.host = host;
        }
        if let Ok(port_str) = std::env::var("PORT") {
            if let Ok(port) = port_str.parse::<u16>() {
                app_settings.port = port;
            }
        }
        if let Ok(redirect_base_url) = std::env::var("REDIRECT_BASE_URL") {
            app_settings.redirect_base_url = redirect_base_url;
        }
    }

    /// Apply environment overrides for session settings
    pub fn apply_session_env_overrides(session_settings: &mut SessionSettings) {
        let env_secret_set = std::env::var("SESSION_SECRET").is_ok_and(|secret| {
            if secret.is_empty() {
                false
            } else {
                session_settings.session_secret = secret;
                true
            }
        });

        if !env_secret_set && session_settings.session_secret.is_empty() {
            session_settings.session_secret = Self::generate_random_session_secret();
            Self::warn_about_generated_secret();
        }
    }

    /// 32 random bytes, base64 encoded
    fn generate_random_session_secret() -> String {
        use rand::RngCore;
        let mut secret = [0u8; 32];
        rand::rng().fill_bytes(&mut secret);
        general_purpose::STANDARD.encode(secret)
    }

    fn warn_about_generated_secret() {
        eprintln!("⚠️  WARNING: Using auto-generated session secret");
        eprintln!("🔒 For production use, set the SESSION_SECRET environment variable");
        eprintln!("   or configure session_secret in Settings.toml");
        eprintln!("💡 Sign-ins in flight are lost on restart unless the secret is configured");
    }

    fn apply_cookie_env_overrides(cookie_settings: &mut CookieSettings) {
        if let Ok(cookie_secure_str) = std::env::var("COOKIE_SECURE") {
            if let Ok(cookie_secure) = cookie_secure_str.parse::<bool>() {
                cookie_settings.secure = cookie_secure;
            }
        }
        if let Ok(domain) = std::env::var("WL_AUTH_COOKIE_DOMAIN") {
            cookie_settings.wl_auth_domain = Some(domain).filter(|d| !d.is_empty());
        }
    }

    fn apply_logging_env_overrides(logging_settings: &mut LoggingSettings) {
        if let Ok(log_level) = std::env::var("RUST_LOG") {
            logging_settings.level = log_level;
        }
    }

    /// Load environment variables from .env file
    fn load_env_file() {
        if let Ok(contents) = fs::read_to_string(".env") {
            for line in contents.lines() {
                if let Some((key, value)) = line.split_once('=') {
                    std::env::set_var(key.trim(), value.trim());
                }
            }
        }
    }

    /// Get the bind address for the server
    #[must_use]
    pub fn get_bind_address(&self) -> String {
        format!("{}:{}", self.application.host, self.application.port)
    }

    /// Absolute callback URL registered with the provider
    #[must_use]
    pub fn get_redirect_uri(&self) -> String {
        format!(
            "{}{CALLBACK_PATH}",
            self.application.redirect_base_url.trim_end_matches('/')
        )
    }

    /// Typed strategy options for the configured provider
    ///
    /// # Errors
    ///
    /// Returns an error if the client id or secret is not configured
    pub fn strategy_options(&self) -> Result<StrategyOptions, OAuthError> {
        let client_id = self.provider.get_client_id().ok_or_else(|| {
            OAuthError::Configuration(format!("Missing client_id for provider {STRATEGY_NAME}"))
        })?;
        let client_secret = self.provider.get_client_secret().ok_or_else(|| {
            OAuthError::Configuration(format!(
                "Missing client_secret for provider {STRATEGY_NAME}"
            ))
        })?;

        let mut options = StrategyOptions::new(&client_id, &client_secret, &self.get_redirect_uri());
        options.client_options = self.provider.client_options();
        options.authorize_params = self.provider.authorize_params();
        options.request_timeout_seconds = self.provider.request_timeout_seconds;
        Ok(options)
    }
}

impl ProviderSettings {
    /// Get the client ID, checking environment variable first, then falling back to direct value
    #[must_use]
    pub fn get_client_id(&self) -> Option<String> {
        Self::env_or_value(self.client_id_env.as_deref(), self.client_id.as_ref())
    }

    /// Get the client secret, checking environment variable first, then falling back to direct value
    #[must_use]
    pub fn get_client_secret(&self) -> Option<String> {
        Self::env_or_value(self.client_secret_env.as_deref(), self.client_secret.as_ref())
    }

    fn env_or_value(env_var: Option<&str>, value: Option<&String>) -> Option<String> {
        if let Some(env_var) = env_var {
            if let Ok(value) = std::env::var(env_var) {
                if !value.is_empty() {
                    return Some(value);
                }
            }
        }
        value.filter(|v| !v.is_empty()).cloned()
    }

    #[must_use]
    pub fn is_configured(&self) -> bool {
        self.get_client_id().is_some() && self.get_client_secret().is_some()
    }

    #[must_use]
    pub fn client_options(&self) -> ClientOptions {
        ClientOptions {
            site: self.site.clone(),
            authorize_url: self.authorize_url.clone(),
            token_url: self.token_url.clone(),
        }
    }

    /// Authorization parameters; an empty scope falls back to the default
    #[must_use]
    pub fn authorize_params(&self) -> AuthorizeParams {
        let scope = if self.scope.trim().is_empty() {
            DEFAULT_SCOPE.to_string()
        } else {
            self.scope.clone()
        };
        AuthorizeParams {
            scope,
            ..AuthorizeParams::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::io::Write;

    fn clean_env_vars() {
        for var in [
            "SESSION_SECRET",
            "LIVEAUTH_SECRETS_DIR",
            "LIVE_CLIENT_ID",
            "LIVE_CLIENT_SECRET",
            "COOKIE_SECURE",
            "WL_AUTH_COOKIE_DOMAIN",
            "REDIRECT_BASE_URL",
            "PORT",
        ] {
            std::env::remove_var(var);
        }
    }

    #[test]
    fn test_provider_defaults() {
        let provider = ProviderSettings::default();
        assert_eq!(provider.scope, "wl.basic,wl.emails");
        assert_eq!(provider.client_options(), ClientOptions::default());
        assert_eq!(provider.authorize_params().response_type, "code");
    }

    #[test]
    fn test_blank_scope_uses_default() {
        let provider = ProviderSettings {
            scope: "  ".to_string(),
            ..Default::default()
        };
        assert_eq!(provider.authorize_params().scope, DEFAULT_SCOPE);
    }

    #[test]
    fn test_redirect_uri() {
        let mut settings = LiveAuthSettings::default();
        settings.application.redirect_base_url = "https://app.example.com/".to_string();
        assert_eq!(
            settings.get_redirect_uri(),
            "https://app.example.com/auth/microsoft_live/callback"
        );
    }

    #[test]
    #[serial]
    fn test_client_credentials_env_override() {
        clean_env_vars();
        let provider = ProviderSettings {
            client_id: Some("file-id".to_string()),
            client_secret: Some("file-secret".to_string()),
            ..Default::default()
        };
        assert_eq!(provider.get_client_id().as_deref(), Some("file-id"));

        std::env::set_var("LIVE_CLIENT_ID", "env-id");
        assert_eq!(provider.get_client_id().as_deref(), Some("env-id"));
        assert_eq!(provider.get_client_secret().as_deref(), Some("file-secret"));
        assert!(provider.is_configured());

        clean_env_vars();
    }

    #[test]
    #[serial]
    fn test_strategy_options_require_credentials() {
        clean_env_vars();
        let settings = LiveAuthSettings::default();
        assert!(matches!(
            settings.strategy_options(),
            Err(OAuthError::Configuration(_))
        ));

        let mut settings = LiveAuthSettings::default();
        settings.provider.client_id = Some("appid".to_string());
        settings.provider.client_secret = Some("secret".to_string());
        let options = settings.strategy_options().unwrap();
        assert_eq!(options.client_id, "appid");
        assert_eq!(options.name, "microsoft_live");
        assert_eq!(
            options.redirect_uri,
            "http://localhost:8080/auth/microsoft_live/callback"
        );
    }

    #[test]
    #[serial]
    fn test_session_secret_env_override() {
        clean_env_vars();
        let mut session_settings = SessionSettings {
            session_secret: "default-secret".to_string(),
        };

        std::env::set_var("SESSION_SECRET", "env-override-secret");
        LiveAuthSettings::apply_session_env_overrides(&mut session_settings);
        assert_eq!(session_settings.session_secret, "env-override-secret");

        clean_env_vars();
    }

    #[test]
    #[serial]
    fn test_session_secret_auto_generation() {
        clean_env_vars();
        let mut first = SessionSettings::default();
        let mut second = SessionSettings::default();

        LiveAuthSettings::apply_session_env_overrides(&mut first);
        LiveAuthSettings::apply_session_env_overrides(&mut second);

        assert!(first.session_secret.len() > 40);
        assert_ne!(first.session_secret, second.session_secret);
    }

    #[test]
    #[serial]
    fn test_cookie_env_overrides() {
        clean_env_vars();
        let mut settings = LiveAuthSettings::default();
        settings.session.session_secret = "kept".to_string();

        std::env::set_var("COOKIE_SECURE", "false");
        std::env::set_var("WL_AUTH_COOKIE_DOMAIN", "example.com");
        std::env::set_var("PORT", "9090");
        LiveAuthSettings::apply_env_overrides(&mut settings);

        assert!(!settings.cookies.secure);
        assert_eq!(settings.cookies.wl_auth_domain.as_deref(), Some("example.com"));
        assert_eq!(settings.application.port, 9090);
        assert_eq!(settings.session.session_secret, "kept");

        clean_env_vars();
    }

    #[test]
    fn test_partial_toml_file_uses_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "[provider]\nclient_id = \"file-id\"\nscope = \"wl.basic\"\n\n[cookies]\nsecure = false"
        )
        .unwrap();

        let settings = LiveAuthSettings::from_toml_file(file.path()).unwrap();
        assert_eq!(settings.provider.client_id.as_deref(), Some("file-id"));
        assert_eq!(settings.provider.scope, "wl.basic");
        assert_eq!(settings.provider.token_url, "/oauth20_token.srf");
        assert!(!settings.cookies.secure);
        assert_eq!(settings.application.port, 8080);
    }

    #[test]
    fn test_invalid_toml_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[provider\nclient_id = ").unwrap();
        assert!(LiveAuthSettings::from_toml_file(file.path()).is_err());
    }
}
