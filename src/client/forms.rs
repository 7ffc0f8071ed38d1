use super::{ApiClient, ClientError, FormDescriptor, TokenStore, View};
use serde_json::Value;
use tracing::instrument;

const SUBMIT_FAILED: &str = "Form submission failed. Please try again.";

impl<S: TokenStore, V: View> ApiClient<S, V> {
    /// Submits a form as JSON and asks the view to refresh on success. There
    /// is no retry or partial submission.
    ///
    /// # Errors
    /// Returns `InvalidRequest` or any `call` error, after it was reported to
    /// the view.
    #[instrument(skip(self, form), fields(action = %form.action))]
    pub async fn submit_form(&mut self, form: &FormDescriptor) -> Result<Value, ClientError> {
        let result = match form.to_request() {
            Ok(request) => self.call(request).await,
            Err(err) => Err(err),
        };

        match &result {
            Ok(_) => self.view.refresh(),
            Err(err) => self.report_failure(err, SUBMIT_FAILED),
        }
        result
    }
}
