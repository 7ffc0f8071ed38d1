use crate::client::{
    ApiClient, ClientConfig, Credentials, CsrfSource, FileTokenStore, TerminalView,
};
use anyhow::{Context, Result};
use std::{
    io::{Stderr, Stdout},
    path::PathBuf,
    time::Duration,
};

pub type CliClient = ApiClient<FileTokenStore, TerminalView<Stdout, Stderr>>;

/// Connection settings shared by every subcommand.
#[derive(Debug, Clone)]
pub struct GlobalArgs {
    pub base_url: String,
    pub token_file: PathBuf,
    pub csrf_source: CsrfSource,
    pub csrf_header: String,
    pub credentials: Credentials,
    pub timeout: Duration,
}

impl GlobalArgs {
    #[must_use]
    pub fn new(base_url: String, token_file: PathBuf) -> Self {
        Self {
            base_url,
            token_file,
            csrf_source: CsrfSource::default(),
            csrf_header: crate::client::csrf::DEFAULT_CSRF_HEADER.to_string(),
            credentials: Credentials::default(),
            timeout: crate::client::DEFAULT_TIMEOUT,
        }
    }

    /// # Errors
    /// Returns an error if the base URL is invalid.
    pub fn client_config(&self) -> Result<ClientConfig> {
        let config = ClientConfig::new(&self.base_url)
            .with_context(|| format!("invalid --base-url: {}", self.base_url))?
            .with_csrf_source(self.csrf_source.clone())
            .with_csrf_header(self.csrf_header.clone())
            .with_credentials(self.credentials)
            .with_timeout(self.timeout);

        Ok(config)
    }

    /// Builds a client backed by the token file and the terminal.
    ///
    /// # Errors
    /// Returns an error if the configuration is invalid or the token file is unreadable.
    pub fn connect(&self) -> Result<CliClient> {
        let config = self.client_config()?;
        let store = FileTokenStore::new(&self.token_file);

        ApiClient::new(config, store, TerminalView::stdio())
            .with_context(|| format!("failed to open session from {}", self.token_file.display()))
    }
}
