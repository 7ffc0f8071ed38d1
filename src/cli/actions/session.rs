use crate::cli::{actions::exit_code, globals::GlobalArgs};
use anyhow::Result;
use std::process::ExitCode;

#[derive(Debug)]
pub struct Args {
    pub globals: GlobalArgs,
}

/// Forget the stored session token.
/// # Errors
/// Returns an error if the client cannot be set up.
pub fn logout(args: Args) -> Result<ExitCode> {
    let mut client = args.globals.connect()?;
    let result = client.logout();
    Ok(exit_code(&result))
}

/// Report whether a session token is stored. Exits non-zero when signed out.
/// # Errors
/// Returns an error if the client cannot be set up.
pub fn status(args: Args) -> Result<ExitCode> {
    let mut client = args.globals.connect()?;
    if client.resume() {
        Ok(ExitCode::SUCCESS)
    } else {
        Ok(ExitCode::FAILURE)
    }
}
