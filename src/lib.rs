//! # Finance Client
//!
//! `finance-client` talks to the personal finance web API on behalf of a
//! signed-in user. It submits the login form, keeps the issued access token,
//! attaches that token and the CSRF token to every request, and renders
//! fetched records through a pluggable view layer.
//!
//! ## Session Lifecycle
//!
//! - **Unauthenticated:** no Session Token is held; `fetch_user` fails fast.
//! - **Login:** `POST /login` with `{email, password}` returns `{access_token}`,
//!   which is persisted by the `TokenStore` and sent as `Authorization: Bearer`.
//! - **Expiry:** any 401 clears the token (memory and storage) and redirects the
//!   view to login. An explicit logout does the same without a request.
//!
//! ## CSRF
//!
//! Each deployment picks one source of truth for the CSRF token: a meta tag or
//! hidden field in a page, a cookie, or a rotating `X-CSRF-TOKEN` response
//! header. The token is echoed back on every request.

pub mod cli;
pub mod client;

#[allow(clippy::doc_markdown, clippy::needless_raw_string_hashes)]
pub mod built_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}

pub use client::{
    ApiClient, ApiRequest, ClientConfig, ClientError, Credentials, CsrfSource, FileTokenStore,
    FormDescriptor, HttpMethod, MemoryTokenStore, TerminalView, TokenStore, View,
};

pub const GIT_COMMIT_HASH: &str = match built_info::GIT_COMMIT_HASH {
    Some(hash) => hash,
    None => "unknown",
};

pub const APP_USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"),);
