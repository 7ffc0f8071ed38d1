//! View-layer contract consumed by the client. The client never renders
//! anything itself; it signals state changes and results through `View`.

use serde_json::Value;
use std::io::{self, Write};
use tracing::warn;

pub trait View {
    fn show_login_form(&mut self);
    fn show_authenticated_view(&mut self);
    fn render_user_data(&mut self, record: &Value);
    fn notify_failure(&mut self, message: &str);
    fn redirect_to_login(&mut self);
    /// Reload current data after a successful form submission.
    fn refresh(&mut self);
}

/// Renders to a pair of writers: results on `out`, notices on `err`.
pub struct TerminalView<O, E> {
    out: O,
    err: E,
}

impl TerminalView<io::Stdout, io::Stderr> {
    #[must_use]
    pub fn stdio() -> Self {
        Self::new(io::stdout(), io::stderr())
    }
}

impl<O: Write, E: Write> TerminalView<O, E> {
    pub fn new(out: O, err: E) -> Self {
        Self { out, err }
    }

    pub fn into_inner(self) -> (O, E) {
        (self.out, self.err)
    }

    fn notice(&mut self, message: &str) {
        if let Err(err) = writeln!(self.err, "{message}") {
            warn!("failed to write notice: {err}");
        }
    }
}

impl<O: Write, E: Write> View for TerminalView<O, E> {
    fn show_login_form(&mut self) {
        self.notice("Not signed in. Run `finance login` to sign in.");
    }

    fn show_authenticated_view(&mut self) {
        self.notice("Signed in.");
    }

    fn render_user_data(&mut self, record: &Value) {
        let rendered = serde_json::to_string_pretty(record).unwrap_or_else(|_| record.to_string());
        if let Err(err) = writeln!(self.out, "{rendered}") {
            warn!("failed to write user data: {err}");
        }
    }

    fn notify_failure(&mut self, message: &str) {
        self.notice(&format!("error: {message}"));
    }

    fn redirect_to_login(&mut self) {
        self.notice("Session expired. Run `finance login` to sign in again.");
    }

    fn refresh(&mut self) {
        self.notice("Submitted.");
    }
}
