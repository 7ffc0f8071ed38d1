pub mod client;
pub mod logging;

use crate::client::request::parse_field;
use clap::{
    Arg, ArgAction, ColorChoice, Command,
    builder::styling::{AnsiColor, Effects, Styles},
};

pub const CMD_LOGIN: &str = "login";
pub const CMD_USER: &str = "user";
pub const CMD_SUBMIT: &str = "submit";
pub const CMD_LOGOUT: &str = "logout";
pub const CMD_STATUS: &str = "status";

#[must_use]
pub fn new() -> Command {
    let styles = Styles::styled()
        .header(AnsiColor::Yellow.on_default() | Effects::BOLD)
        .usage(AnsiColor::Green.on_default() | Effects::BOLD)
        .literal(AnsiColor::Blue.on_default() | Effects::BOLD)
        .placeholder(AnsiColor::Green.on_default());

    let long_version: &'static str = Box::leak(
        format!("{} - {}", env!("CARGO_PKG_VERSION"), crate::GIT_COMMIT_HASH).into_boxed_str(),
    );

    let command = Command::new("finance")
        .about("Personal finance API client")
        .version(env!("CARGO_PKG_VERSION"))
        .long_version(long_version)
        .color(ColorChoice::Auto)
        .styles(styles)
        .subcommand_required(true)
        .arg_required_else_help(true)
        .subcommand(login())
        .subcommand(user())
        .subcommand(submit())
        .subcommand(Command::new(CMD_LOGOUT).about("Forget the stored session token"))
        .subcommand(Command::new(CMD_STATUS).about("Show whether a session token is stored"));

    let command = client::with_args(command);
    logging::with_args(command)
}

fn login() -> Command {
    Command::new(CMD_LOGIN)
        .about("Sign in and store the session token")
        .arg(
            Arg::new("email")
                .short('e')
                .long("email")
                .help("Account email address")
                .env("FINANCE_EMAIL")
                .required(true),
        )
        .arg(
            Arg::new("password")
                .long("password")
                .help("Account password")
                .env("FINANCE_PASSWORD")
                .hide_env_values(true)
                .required(true),
        )
}

fn user() -> Command {
    Command::new(CMD_USER).about("Fetch and print a user record").arg(
        Arg::new("id")
            .help("User id")
            .required(true),
    )
}

fn submit() -> Command {
    Command::new(CMD_SUBMIT)
        .about("Submit form fields as JSON to an API endpoint")
        .arg(
            Arg::new("action")
                .short('a')
                .long("action")
                .help("Form target, a path under the base URL or an absolute URL")
                .required(true),
        )
        .arg(
            Arg::new("method")
                .short('m')
                .long("method")
                .help("HTTP method: GET, POST, PUT or DELETE")
                .default_value("POST"),
        )
        .arg(
            Arg::new("field")
                .short('f')
                .long("field")
                .help("Form field as name=value, repeatable")
                .action(ArgAction::Append)
                .value_parser(parse_field),
        )
}
