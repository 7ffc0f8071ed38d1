use crate::cli::{actions::exit_code, globals::GlobalArgs};
use anyhow::Result;
use std::process::ExitCode;

#[derive(Debug)]
pub struct Args {
    pub globals: GlobalArgs,
    pub id: String,
}

/// Execute the user action, printing the record on success.
/// # Errors
/// Returns an error if the client cannot be set up.
pub async fn execute(args: Args) -> Result<ExitCode> {
    let mut client = args.globals.connect()?;
    let result = client.fetch_user(&args.id).await;
    Ok(exit_code(&result))
}
