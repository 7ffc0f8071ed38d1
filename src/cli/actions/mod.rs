pub mod forms;
pub mod login;
pub mod session;
pub mod user;

// Internal "interpreter" for `Action`.
mod run;

use crate::client::ClientError;
use std::process::ExitCode;

#[derive(Debug)]
pub enum Action {
    Login(login::Args),
    User(user::Args),
    Submit(forms::Args),
    Logout(session::Args),
    Status(session::Args),
}

impl Action {
    /// Execute the action. Client failures have already been shown to the
    /// user by the view and only affect the exit code.
    /// # Errors
    /// Returns an error if the client cannot be set up.
    pub async fn execute(self) -> anyhow::Result<ExitCode> {
        run::execute(self).await
    }
}

fn exit_code<T>(result: &Result<T, ClientError>) -> ExitCode {
    match result {
        Ok(_) => ExitCode::SUCCESS,
        Err(err) => {
            match err.status() {
                Some(status) => tracing::debug!(http.status = status, "action failed: {err}"),
                None => tracing::debug!("action failed: {err}"),
            }
            ExitCode::FAILURE
        }
    }
}
