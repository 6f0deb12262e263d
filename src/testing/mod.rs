//! Testing utilities for liveauth
//!
//! - [`fixtures`] - pre-built tokens, profiles, requests and settings
//! - [`mock`] - fake provider collaborator counting its calls
//!
//! ```rust,ignore
//! use liveauth::testing::{mock::FakeLiveClient, TestFixtures};
//!
//! let strategy = MicrosoftLiveStrategy::new(
//!     TestFixtures::strategy_options(),
//!     FakeLiveClient::new(),
//! );
//! ```

pub mod fixtures;
pub mod mock;

pub use fixtures::TestFixtures;
pub use mock::FakeLiveClient;

/// Common test constants
pub mod constants {
    /// Client id used by test strategies
    pub const TEST_CLIENT_ID: &str = "appid";

    /// Client secret used by test strategies
    pub const TEST_CLIENT_SECRET: &str = "secret";

    /// Callback URL registered for test strategies
    pub const TEST_REDIRECT_URI: &str = "http://localhost:8080/auth/microsoft_live/callback";

    /// Provider user id of the sample profile
    pub const TEST_USER_ID: &str = "8c8ce076ca27823f";

    /// Session secret for test session stores
    pub const TEST_SESSION_SECRET: &str = "test-session-secret";
}
