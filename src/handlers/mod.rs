// HTTP request handlers for the Microsoft Live sign-in endpoints
pub mod oauth;
pub mod static_files;

pub use oauth::{auth_failure, live_callback, live_sign_in};
pub use static_files::health;
