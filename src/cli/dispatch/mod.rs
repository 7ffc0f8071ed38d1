//! Maps validated CLI matches to the action for the chosen subcommand.

use crate::cli::actions::{Action, forms, login, session, user};
use crate::cli::commands::{self, client};
use crate::client::FormDescriptor;
use anyhow::{Context, Result, anyhow};
use secrecy::SecretString;

/// Map validated CLI matches to an action.
///
/// # Errors
/// Returns an error if required arguments are missing or inconsistent.
pub fn handler(matches: &clap::ArgMatches) -> Result<Action> {
    let (name, sub_m) = matches
        .subcommand()
        .context("missing command, see --help")?;

    // Global options are propagated into the subcommand matches.
    let globals = client::Options::parse(sub_m)?;

    match name {
        commands::CMD_LOGIN => Ok(Action::Login(login::Args {
            globals,
            email: sub_m
                .get_one::<String>("email")
                .cloned()
                .context("missing required argument: --email")?,
            password: sub_m
                .get_one::<String>("password")
                .cloned()
                .map(SecretString::from)
                .context("missing required argument: --password")?,
        })),
        commands::CMD_USER => Ok(Action::User(user::Args {
            globals,
            id: sub_m
                .get_one::<String>("id")
                .cloned()
                .context("missing required argument: <id>")?,
        })),
        commands::CMD_SUBMIT => {
            let action = sub_m
                .get_one::<String>("action")
                .cloned()
                .context("missing required argument: --action")?;
            let method = sub_m
                .get_one::<String>("method")
                .cloned()
                .unwrap_or_else(|| "POST".to_string());
            let fields = sub_m
                .get_many::<(String, String)>("field")
                .map(|values| values.cloned().collect())
                .unwrap_or_default();

            Ok(Action::Submit(forms::Args {
                globals,
                form: FormDescriptor {
                    action,
                    method,
                    fields,
                },
            }))
        }
        commands::CMD_LOGOUT => Ok(Action::Logout(session::Args { globals })),
        commands::CMD_STATUS => Ok(Action::Status(session::Args { globals })),
        other => Err(anyhow!("unknown command: {other}")),
    }
}
