use crate::cli::actions::{Action, forms, login, session, user};
use anyhow::Result;
use std::process::ExitCode;

/// Execute the provided action.
// Single dispatch point for all CLI actions.
/// # Errors
/// Returns an error if the action fails to set up.
pub async fn execute(action: Action) -> Result<ExitCode> {
    match action {
        Action::Login(args) => login::execute(args).await,
        Action::User(args) => user::execute(args).await,
        Action::Submit(args) => forms::execute(args).await,
        Action::Logout(args) => session::logout(args),
        Action::Status(args) => session::status(args),
    }
}
