//! Login, logout and page-load session restore. Passwords and access tokens
//! are only ever exposed when building the request body or the bearer header.

use super::{ApiClient, ApiRequest, ClientError, TokenStore, View};
use regex::Regex;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use serde_json::json;
use tracing::{info, instrument};

pub const LOGIN_PATH: &str = "/login";
const LOGIN_FAILED: &str = "Login failed. Please try again.";

#[derive(Deserialize)]
struct LoginResponse {
    access_token: String,
}

pub(crate) fn valid_email(email: &str) -> bool {
    Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").is_ok_and(|re| re.is_match(email))
}

impl<S: TokenStore, V: View> ApiClient<S, V> {
    /// Signs in and stores the returned access token as the Session Token.
    /// On success the view switches to the authenticated view; on any failure
    /// the view shows a failure notice and the client stays unauthenticated.
    ///
    /// # Errors
    /// Returns the failure after it was reported to the view.
    #[instrument(skip(self, password))]
    pub async fn login(&mut self, email: &str, password: &SecretString) -> Result<(), ClientError> {
        let result = match self.try_login(email, password).await {
            Ok(token) => self.set_session_token(token),
            Err(err) => Err(err),
        };

        match &result {
            Ok(()) => {
                info!("signed in");
                self.view.show_authenticated_view();
            }
            // A 401 here means rejected credentials, so it is reported too.
            Err(err) => self.view.notify_failure(&format!("{LOGIN_FAILED} ({err})")),
        }
        result
    }

    async fn try_login(
        &mut self,
        email: &str,
        password: &SecretString,
    ) -> Result<SecretString, ClientError> {
        let email = email.trim();
        if !valid_email(email) {
            return Err(ClientError::InvalidRequest(
                "a valid email address is required".to_string(),
            ));
        }
        if password.expose_secret().is_empty() {
            return Err(ClientError::InvalidRequest("password is required".to_string()));
        }

        let body = json!({
            "email": email,
            "password": password.expose_secret(),
        });
        let response = self.call(ApiRequest::post(LOGIN_PATH, body)).await?;

        let login: LoginResponse = serde_json::from_value(response)
            .map_err(|err| ClientError::Parse(format!("Failed to decode login response: {err}")))?;
        if login.access_token.is_empty() {
            return Err(ClientError::Parse("empty access token".to_string()));
        }

        Ok(SecretString::from(login.access_token))
    }

    /// Forgets the Session Token locally and shows the login form.
    ///
    /// # Errors
    /// Returns `Storage` if the persisted token cannot be removed; the in-memory
    /// token is cleared regardless.
    pub fn logout(&mut self) -> Result<(), ClientError> {
        self.session_token = None;
        let cleared = self.store.clear();
        info!("signed out");
        self.view.show_login_form();
        cleared
    }

    /// Shows the view matching the restored session and reports whether the
    /// client is authenticated.
    pub fn resume(&mut self) -> bool {
        if self.is_authenticated() {
            self.view.show_authenticated_view();
            true
        } else {
            self.view.show_login_form();
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::valid_email;

    #[test]
    fn email_validation() {
        assert!(valid_email("a@b.com"));
        assert!(valid_email("first.last+tag@finance.example"));
        assert!(!valid_email(""));
        assert!(!valid_email("a@b"));
        assert!(!valid_email("a b@c.com"));
        assert!(!valid_email("@b.com"));
    }
}
