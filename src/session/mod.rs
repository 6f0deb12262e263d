//! Session and cookie handling
//!
//! - [`cookie`] - `wl_auth` cookie codec and token merge
//! - [`store`] - encrypted session map carried across the provider round trip

pub mod cookie;
pub mod store;

pub use cookie::{
    create_wl_auth_cookie, merge_wl_auth, merge_wl_auth_cookie, WlAuthCookie, TOKEN_ERROR_CODE,
    TOKEN_ERROR_DESCRIPTION, WL_AUTH_COOKIE,
};
pub use store::{SessionStore, SESSION_COOKIE_NAME};
