use crate::cli::{actions::exit_code, globals::GlobalArgs};
use anyhow::Result;
use secrecy::SecretString;
use std::process::ExitCode;

#[derive(Debug)]
pub struct Args {
    pub globals: GlobalArgs,
    pub email: String,
    pub password: SecretString,
}

/// Execute the login action.
/// # Errors
/// Returns an error if the client cannot be set up.
pub async fn execute(args: Args) -> Result<ExitCode> {
    let mut client = args.globals.connect()?;
    let result = client.login(&args.email, &args.password).await;
    Ok(exit_code(&result))
}
