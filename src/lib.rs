#![warn(clippy::pedantic)]
#![warn(clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

/// Version of the liveauth application
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod callback;
pub mod handlers;
pub mod models;
pub mod oauth;
pub mod profile;
pub mod session;
pub mod settings;
pub mod utils;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

/// Re-export commonly used items
pub use callback::{CallbackGate, CallbackOutcome, GateDecision, MicrosoftLiveStrategy};
pub use handlers::{auth_failure, health, live_callback, live_sign_in};
pub use models::{AccessToken, AuthHash, CallbackRequest};
pub use oauth::{LiveClient, OAuthError};
pub use profile::{canonical_email, email_list, EmailRecord, EmailType, RawProfile};
pub use session::{merge_wl_auth_cookie, WlAuthCookie};
pub use settings::LiveAuthSettings;
