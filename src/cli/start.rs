use crate::cli::{actions::Action, commands, dispatch, telemetry};
use anyhow::Result;

/// Parses the command line, sets up logging and returns the action to run.
///
/// # Errors
///
/// Returns an error if logging cannot be initialized or the arguments do not
/// form a valid action.
pub fn start() -> Result<Action> {
    let matches = commands::new().get_matches();

    // -v is global, so it is read from the subcommand when one is present.
    let scoped = matches.subcommand().map_or(&matches, |(_, sub)| sub);
    let verbosity = scoped
        .get_one::<u8>(commands::logging::ARG_VERBOSITY)
        .copied()
        .unwrap_or(0);

    telemetry::init(commands::logging::level_for(verbosity))?;

    dispatch::handler(&matches)
}
