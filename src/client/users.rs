use super::{ApiClient, ApiRequest, ClientError, TokenStore, View};
use serde_json::Value;
use tracing::instrument;
use url::form_urlencoded;

pub const USER_PATH: &str = "/get_user";
const FETCH_USER_FAILED: &str = "Failed to fetch user data. Please try again.";

impl<S: TokenStore, V: View> ApiClient<S, V> {
    /// Fetches a user record and hands it to the view. Requires a Session
    /// Token; without one no request is issued.
    ///
    /// # Errors
    /// Returns `Unauthenticated`, `InvalidRequest` or any `call` error, after
    /// it was reported to the view.
    #[instrument(skip(self))]
    pub async fn fetch_user(&mut self, user_id: &str) -> Result<Value, ClientError> {
        let result = self.try_fetch_user(user_id).await;
        match &result {
            Ok(record) => self.view.render_user_data(record),
            Err(err) => self.report_failure(err, FETCH_USER_FAILED),
        }
        result
    }

    async fn try_fetch_user(&mut self, user_id: &str) -> Result<Value, ClientError> {
        if !self.is_authenticated() {
            return Err(ClientError::Unauthenticated);
        }

        let user_id = user_id.trim();
        if user_id.is_empty() {
            return Err(ClientError::InvalidRequest("user id is required".to_string()));
        }

        let query = form_urlencoded::Serializer::new(String::new())
            .append_pair("id", user_id)
            .finish();

        self.call(ApiRequest::get(format!("{USER_PATH}?{query}"))).await
    }
}
