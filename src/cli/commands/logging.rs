//! `-v/--verbose` and `FINANCE_LOG_LEVEL`. Each `-v` raises the level by one
//! step; the env var takes a level name or its step number.

use clap::{Arg, ArgAction, Command, builder::ValueParser};
use tracing::Level;

pub const ARG_VERBOSITY: &str = "verbosity";

const LOG_LEVEL_ENV: &str = "FINANCE_LOG_LEVEL";

/// Level names indexed by verbosity step. Step 0 keeps the default (errors).
const LEVEL_NAMES: [&str; 5] = ["error", "warn", "info", "debug", "trace"];

fn parse_verbosity(value: &str) -> Result<u8, String> {
    let value = value.trim();
    let step = value.parse::<usize>().ok().or_else(|| {
        LEVEL_NAMES
            .iter()
            .position(|name| name.eq_ignore_ascii_case(value))
    });

    step.filter(|step| *step < LEVEL_NAMES.len())
        .and_then(|step| u8::try_from(step).ok())
        .ok_or_else(|| format!("invalid log level, expected one of {}", LEVEL_NAMES.join(", ")))
}

/// Tracing level for a verbosity step; `None` leaves the default in place.
#[must_use]
pub const fn level_for(verbosity: u8) -> Option<Level> {
    match verbosity {
        0 => None,
        1 => Some(Level::WARN),
        2 => Some(Level::INFO),
        3 => Some(Level::DEBUG),
        _ => Some(Level::TRACE),
    }
}

#[must_use]
pub fn with_args(command: Command) -> Command {
    command.arg(
        Arg::new(ARG_VERBOSITY)
            .short('v')
            .long("verbose")
            .help("Log more: -v warn, -vv info, -vvv debug, -vvvv trace (default: errors only)")
            .env(LOG_LEVEL_ENV)
            .global(true)
            .action(ArgAction::Count)
            .value_parser(ValueParser::from(parse_verbosity)),
    )
}
