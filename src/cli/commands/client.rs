//! Connection arguments shared by every subcommand: API location, token
//! storage, CSRF source of truth and cookie policy.

use crate::cli::globals::GlobalArgs;
use crate::client::{
    Credentials, CsrfSource,
    csrf::{
        CsrfSourceKind, DEFAULT_CSRF_COOKIE, DEFAULT_CSRF_FIELD, DEFAULT_CSRF_HEADER,
        DEFAULT_CSRF_PAGE,
    },
};
use anyhow::{Context, Result};
use clap::{Arg, Command};
use std::{path::PathBuf, time::Duration};

pub const ARG_BASE_URL: &str = "base-url";
pub const ARG_TOKEN_FILE: &str = "token-file";
pub const ARG_CSRF_SOURCE: &str = "csrf-source";
pub const ARG_CSRF_PAGE: &str = "csrf-page";
pub const ARG_CSRF_FIELD: &str = "csrf-field";
pub const ARG_CSRF_COOKIE: &str = "csrf-cookie";
pub const ARG_CSRF_HEADER: &str = "csrf-header";
pub const ARG_CREDENTIALS: &str = "credentials";
pub const ARG_TIMEOUT: &str = "timeout";

pub const DEFAULT_TOKEN_FILE: &str = ".finance/token.json";

#[must_use]
pub fn with_args(command: Command) -> Command {
    command
        .arg(
            Arg::new(ARG_BASE_URL)
                .short('b')
                .long(ARG_BASE_URL)
                .help("Base URL of the finance API, example: https://finance.example")
                .env("FINANCE_BASE_URL")
                .global(true),
        )
        .arg(
            Arg::new(ARG_TOKEN_FILE)
                .long(ARG_TOKEN_FILE)
                .help("File holding the session token between runs")
                .env("FINANCE_TOKEN_FILE")
                .default_value(DEFAULT_TOKEN_FILE)
                .global(true)
                .value_parser(clap::value_parser!(PathBuf)),
        )
        .arg(
            Arg::new(ARG_CSRF_SOURCE)
                .long(ARG_CSRF_SOURCE)
                .help("Where the CSRF token comes from: meta, hidden-field, cookie or header")
                .env("FINANCE_CSRF_SOURCE")
                .default_value("meta")
                .global(true)
                .value_parser(clap::value_parser!(CsrfSourceKind)),
        )
        .arg(
            Arg::new(ARG_CSRF_PAGE)
                .long(ARG_CSRF_PAGE)
                .help("Page carrying the CSRF meta tag or hidden field")
                .env("FINANCE_CSRF_PAGE")
                .default_value(DEFAULT_CSRF_PAGE)
                .global(true),
        )
        .arg(
            Arg::new(ARG_CSRF_FIELD)
                .long(ARG_CSRF_FIELD)
                .help("Hidden form field holding the CSRF token")
                .env("FINANCE_CSRF_FIELD")
                .default_value(DEFAULT_CSRF_FIELD)
                .global(true),
        )
        .arg(
            Arg::new(ARG_CSRF_COOKIE)
                .long(ARG_CSRF_COOKIE)
                .help("Cookie holding the CSRF token")
                .env("FINANCE_CSRF_COOKIE")
                .default_value(DEFAULT_CSRF_COOKIE)
                .global(true),
        )
        .arg(
            Arg::new(ARG_CSRF_HEADER)
                .long(ARG_CSRF_HEADER)
                .help("Header used to send and rotate the CSRF token")
                .env("FINANCE_CSRF_HEADER")
                .default_value(DEFAULT_CSRF_HEADER)
                .global(true),
        )
        .arg(
            Arg::new(ARG_CREDENTIALS)
                .long(ARG_CREDENTIALS)
                .help("When cookies are sent: include, same-origin or omit")
                .env("FINANCE_CREDENTIALS")
                .default_value("same-origin")
                .global(true)
                .value_parser(clap::value_parser!(Credentials)),
        )
        .arg(
            Arg::new(ARG_TIMEOUT)
                .long(ARG_TIMEOUT)
                .help("Request timeout in seconds")
                .env("FINANCE_TIMEOUT")
                .default_value("10")
                .global(true)
                .value_parser(clap::value_parser!(u64).range(1..)),
        )
}

/// Connection options parsed from matches.
pub struct Options;

impl Options {
    /// # Errors
    /// Returns an error if `--base-url` is missing.
    pub fn parse(matches: &clap::ArgMatches) -> Result<GlobalArgs> {
        let base_url = matches
            .get_one::<String>(ARG_BASE_URL)
            .cloned()
            .context("missing required argument: --base-url")?;

        let token_file = matches
            .get_one::<PathBuf>(ARG_TOKEN_FILE)
            .cloned()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_TOKEN_FILE));

        let string = |id: &str, default: &str| {
            matches
                .get_one::<String>(id)
                .cloned()
                .unwrap_or_else(|| default.to_string())
        };

        let page = string(ARG_CSRF_PAGE, DEFAULT_CSRF_PAGE);
        let csrf_source = match matches
            .get_one::<CsrfSourceKind>(ARG_CSRF_SOURCE)
            .copied()
            .unwrap_or(CsrfSourceKind::Meta)
        {
            CsrfSourceKind::Meta => CsrfSource::Meta { page },
            CsrfSourceKind::HiddenField => CsrfSource::HiddenField {
                page,
                field: string(ARG_CSRF_FIELD, DEFAULT_CSRF_FIELD),
            },
            CsrfSourceKind::Cookie => CsrfSource::Cookie {
                name: string(ARG_CSRF_COOKIE, DEFAULT_CSRF_COOKIE),
            },
            CsrfSourceKind::Header => CsrfSource::Header,
        };

        let mut globals = GlobalArgs::new(base_url, token_file);
        globals.csrf_source = csrf_source;
        globals.csrf_header = string(ARG_CSRF_HEADER, DEFAULT_CSRF_HEADER);
        globals.credentials = matches
            .get_one::<Credentials>(ARG_CREDENTIALS)
            .copied()
            .unwrap_or_default();
        globals.timeout = Duration::from_secs(matches.get_one::<u64>(ARG_TIMEOUT).copied().unwrap_or(10));

        Ok(globals)
    }
}
