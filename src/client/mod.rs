//! Authenticated request client. Owns the Session Token and the CSRF token,
//! attaches both to every outbound request and invalidates the session when
//! the server answers 401.
//!
//! Flow Overview:
//! - `ApiClient::new` restores the persisted Session Token.
//! - The first `call` loads the CSRF token from the configured source when it
//!   lives in a page (meta tag or hidden field).
//! - Every `call` sends JSON with `Authorization: Bearer <token>` when a token
//!   is held and the CSRF header when a CSRF token is known.
//! - Success rotates the CSRF token from the response header and returns the
//!   parsed JSON body. A 401 clears the token and redirects to login.
//!
//! Higher-level actions (`login`, `fetch_user`, `submit_form`) convert every
//! failure into a view notice. Tokens and passwords must never be logged.

mod auth;
pub mod csrf;
mod error;
mod forms;
pub mod request;
pub mod store;
mod users;
pub mod view;

pub use self::{
    auth::LOGIN_PATH,
    csrf::CsrfSource,
    error::ClientError,
    request::{ApiRequest, FormDescriptor, HttpMethod},
    store::{FileTokenStore, MemoryTokenStore, TokenStore},
    users::USER_PATH,
    view::{TerminalView, View},
};

use reqwest::{StatusCode, cookie::CookieStore, cookie::Jar, header::HeaderMap};
use secrecy::{ExposeSecret, SecretString};
use serde_json::Value;
use std::{fmt, str::FromStr, sync::Arc, time::Duration};
use tracing::{Instrument, debug, info_span, warn};
use url::Url;

/// Default request timeout applied to every call.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);
/// Maximum number of error body characters surfaced to the view.
const MAX_ERROR_CHARS: usize = 200;
const GENERIC_ERROR: &str = "Request failed.";

/// When the cookie jar accompanies a request.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Credentials {
    Include,
    #[default]
    SameOrigin,
    Omit,
}

impl FromStr for Credentials {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_lowercase().as_str() {
            "include" => Ok(Self::Include),
            "same-origin" => Ok(Self::SameOrigin),
            "omit" => Ok(Self::Omit),
            _ => Err("invalid credentials policy, expected include, same-origin or omit".to_string()),
        }
    }
}

impl fmt::Display for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Include => "include",
            Self::SameOrigin => "same-origin",
            Self::Omit => "omit",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub base_url: Url,
    pub csrf_source: CsrfSource,
    pub csrf_header: String,
    pub credentials: Credentials,
    pub timeout: Duration,
}

impl ClientConfig {
    /// # Errors
    /// Returns `Config` if `base_url` is not an absolute http(s) URL.
    pub fn new(base_url: &str) -> Result<Self, ClientError> {
        let parsed = Url::parse(base_url.trim())
            .map_err(|err| ClientError::Config(format!("invalid base URL {base_url:?}: {err}")))?;

        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(ClientError::Config(format!(
                "unsupported base URL scheme: {}",
                parsed.scheme()
            )));
        }

        Ok(Self {
            base_url: parsed,
            csrf_source: CsrfSource::default(),
            csrf_header: csrf::DEFAULT_CSRF_HEADER.to_string(),
            credentials: Credentials::default(),
            timeout: DEFAULT_TIMEOUT,
        })
    }

    #[must_use]
    pub fn with_csrf_source(mut self, source: CsrfSource) -> Self {
        self.csrf_source = source;
        self
    }

    #[must_use]
    pub fn with_csrf_header(mut self, header: impl Into<String>) -> Self {
        self.csrf_header = header.into();
        self
    }

    #[must_use]
    pub fn with_credentials(mut self, credentials: Credentials) -> Self {
        self.credentials = credentials;
        self
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Resolves a call target: absolute http(s) URLs are used as-is, anything
    /// else is a path under the base URL.
    ///
    /// # Errors
    /// Returns `InvalidRequest` for an empty or unparsable target.
    pub fn resolve(&self, target: &str) -> Result<Url, ClientError> {
        let target = target.trim();
        if target.is_empty() {
            return Err(ClientError::InvalidRequest("url is required".to_string()));
        }

        let raw = if target.starts_with("http://") || target.starts_with("https://") {
            target.to_string()
        } else {
            format!(
                "{}/{}",
                self.base_url.as_str().trim_end_matches('/'),
                target.trim_start_matches('/')
            )
        };

        Url::parse(&raw).map_err(|err| ClientError::InvalidRequest(format!("invalid url {raw:?}: {err}")))
    }

    fn sends_cookies(&self, url: &Url) -> bool {
        match self.credentials {
            Credentials::Include => true,
            Credentials::SameOrigin => url.origin() == self.base_url.origin(),
            Credentials::Omit => false,
        }
    }
}

pub struct ApiClient<S, V> {
    config: ClientConfig,
    http: reqwest::Client,
    anonymous: reqwest::Client,
    jar: Arc<Jar>,
    store: S,
    view: V,
    session_token: Option<SecretString>,
    csrf_token: Option<String>,
    csrf_loaded: bool,
}

impl<S: TokenStore, V: View> ApiClient<S, V> {
    /// Builds the HTTP clients and restores the persisted Session Token.
    ///
    /// # Errors
    /// Returns `Config` if the HTTP client cannot be built, or `Storage` if the
    /// persisted token cannot be read.
    pub fn new(config: ClientConfig, store: S, view: V) -> Result<Self, ClientError> {
        let jar = Arc::new(Jar::default());

        let http = reqwest::Client::builder()
            .user_agent(crate::APP_USER_AGENT)
            .timeout(config.timeout)
            .cookie_provider(Arc::clone(&jar))
            .build()
            .map_err(|err| ClientError::Config(format!("failed to build HTTP client: {err}")))?;

        let anonymous = reqwest::Client::builder()
            .user_agent(crate::APP_USER_AGENT)
            .timeout(config.timeout)
            .build()
            .map_err(|err| ClientError::Config(format!("failed to build HTTP client: {err}")))?;

        let session_token = store.load()?;
        debug!(
            authenticated = session_token.is_some(),
            "restored session from token store"
        );

        Ok(Self {
            config,
            http,
            anonymous,
            jar,
            store,
            view,
            session_token,
            csrf_token: None,
            csrf_loaded: false,
        })
    }

    #[must_use]
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    #[must_use]
    pub fn view(&self) -> &V {
        &self.view
    }

    pub fn view_mut(&mut self) -> &mut V {
        &mut self.view
    }

    #[must_use]
    pub fn store(&self) -> &S {
        &self.store
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.session_token.is_some()
    }

    #[must_use]
    pub fn session_token(&self) -> Option<&SecretString> {
        self.session_token.as_ref()
    }

    /// Currently held CSRF token. Cookie-sourced tokens live in the jar and are
    /// not reported here.
    #[must_use]
    pub fn csrf_token(&self) -> Option<&str> {
        self.csrf_token.as_deref()
    }

    /// Performs one request with credential attachment.
    ///
    /// # Errors
    /// - `AuthExpired` on 401, after the session was cleared and the view redirected.
    /// - `RequestFailed` on any other non-success status.
    /// - `Network` when no response arrives.
    /// - `InvalidRequest` for an empty or malformed target.
    /// - `Parse` when a success body is not JSON.
    pub async fn call(&mut self, request: ApiRequest) -> Result<Value, ClientError> {
        let url = self.config.resolve(&request.url)?;

        if !self.csrf_loaded {
            self.bootstrap_csrf().await?;
        }

        let mut builder = self
            .client_for(&url)
            .request(request.method.into(), url.clone());

        if let Some(body) = &request.body {
            builder = builder.json(body);
        }
        if let Some(csrf) = self.csrf_for(&url) {
            builder = builder.header(self.config.csrf_header.as_str(), csrf);
        }
        if let Some(token) = &self.session_token {
            builder = builder.bearer_auth(token.expose_secret());
        }

        let span = info_span!(
            "api.call",
            http.method = %request.method,
            url = %url
        );
        let response = builder.send().instrument(span).await?;

        let status = response.status();
        if !status.is_success() {
            return Err(self.reject(status, response).await);
        }

        if self.config.csrf_source.accepts_rotation() {
            self.rotate_csrf(response.headers());
        }

        let body = response.text().await?;
        parse_body(&body)
    }

    /// Loads the initial CSRF token from the configured page, if the source
    /// lives in one. Runs once per client; later calls are no-ops.
    ///
    /// # Errors
    /// Returns the same errors as `call` when the page cannot be fetched.
    pub async fn bootstrap_csrf(&mut self) -> Result<(), ClientError> {
        if self.csrf_loaded {
            return Ok(());
        }
        let Some(page) = self.config.csrf_source.page().map(str::to_string) else {
            self.csrf_loaded = true;
            return Ok(());
        };

        let url = self.config.resolve(&page)?;
        let mut builder = self.client_for(&url).get(url.clone());
        if let Some(token) = &self.session_token {
            builder = builder.bearer_auth(token.expose_secret());
        }

        let span = info_span!("api.csrf_bootstrap", http.method = "GET", url = %url);
        let response = builder.send().instrument(span).await?;

        let status = response.status();
        if !status.is_success() {
            return Err(self.reject(status, response).await);
        }

        let html = response.text().await?;
        match self.config.csrf_source.extract(&html) {
            Some(token) => {
                debug!("csrf token loaded from {url}");
                self.csrf_token = Some(token);
            }
            None => warn!("no csrf token found on {url}"),
        }
        self.csrf_loaded = true;

        Ok(())
    }

    /// Stores a new Session Token in memory and in the token store.
    fn set_session_token(&mut self, token: SecretString) -> Result<(), ClientError> {
        self.store.save(&token)?;
        self.session_token = Some(token);
        Ok(())
    }

    /// Clears the session unconditionally and sends the view to login.
    fn expire_session(&mut self) {
        self.session_token = None;
        if let Err(err) = self.store.clear() {
            warn!("failed to clear persisted session token: {err}");
        }
        warn!("session expired, redirecting to login");
        self.view.redirect_to_login();
    }

    /// Converts a non-success response into an error, expiring the session on 401.
    async fn reject(&mut self, status: StatusCode, response: reqwest::Response) -> ClientError {
        if status == StatusCode::UNAUTHORIZED {
            self.expire_session();
            return ClientError::AuthExpired;
        }

        let body = response.text().await.unwrap_or_default();
        ClientError::RequestFailed {
            status: status.as_u16(),
            message: error_message(&body),
        }
    }

    fn rotate_csrf(&mut self, headers: &HeaderMap) {
        let rotated = headers
            .get(self.config.csrf_header.as_str())
            .and_then(|value| value.to_str().ok())
            .map(str::trim)
            .filter(|value| !value.is_empty());

        if let Some(token) = rotated {
            debug!("csrf token rotated");
            self.csrf_token = Some(token.to_string());
        }
    }

    fn csrf_for(&self, url: &Url) -> Option<String> {
        match &self.config.csrf_source {
            CsrfSource::Cookie { name } => {
                let header = self.jar.cookies(url)?;
                csrf::cookie_value(header.to_str().ok()?, name)
            }
            _ => self.csrf_token.clone(),
        }
    }

    fn client_for(&self, url: &Url) -> &reqwest::Client {
        if self.config.sends_cookies(url) {
            &self.http
        } else {
            &self.anonymous
        }
    }

    /// Converts an action failure into a view notice. `AuthExpired` has already
    /// redirected and is not reported again.
    fn report_failure(&mut self, err: &ClientError, notice: &str) {
        if matches!(err, ClientError::AuthExpired) {
            return;
        }
        warn!("{notice} {err}");
        self.view.notify_failure(&format!("{notice} ({err})"));
    }
}

/// Parses a success body; an empty body is JSON `null`.
fn parse_body(body: &str) -> Result<Value, ClientError> {
    if body.trim().is_empty() {
        return Ok(Value::Null);
    }
    serde_json::from_str(body)
        .map_err(|err| ClientError::Parse(format!("Failed to decode response: {err}")))
}

/// Extracts a user-facing message from an error body: `msg`, then `error`,
/// then a generic description.
fn error_message(body: &str) -> String {
    let parsed: Option<Value> = serde_json::from_str(body).ok();
    let message = parsed.as_ref().and_then(|json| {
        ["msg", "error"]
            .iter()
            .find_map(|key| json.get(key).and_then(Value::as_str))
            .map(str::trim)
            .filter(|message| !message.is_empty())
    });

    match message {
        Some(message) => message.chars().take(MAX_ERROR_CHARS).collect(),
        None => GENERIC_ERROR.to_string(),
    }
}
