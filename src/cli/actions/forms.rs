use crate::cli::{actions::exit_code, globals::GlobalArgs};
use crate::client::FormDescriptor;
use anyhow::Result;
use std::process::ExitCode;

#[derive(Debug)]
pub struct Args {
    pub globals: GlobalArgs,
    pub form: FormDescriptor,
}

/// Execute the submit action.
/// # Errors
/// Returns an error if the client cannot be set up.
pub async fn execute(args: Args) -> Result<ExitCode> {
    let mut client = args.globals.connect()?;
    let result = client.submit_form(&args.form).await;
    Ok(exit_code(&result))
}
