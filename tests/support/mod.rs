#![allow(dead_code)]

use finance_client::{ApiClient, ClientConfig, CsrfSource, MemoryTokenStore, View};
use serde_json::Value;
use std::net::TcpListener;

#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    LoginForm,
    Authenticated,
    UserData(Value),
    Failure(String),
    Redirect,
    Refresh,
}

/// View double that records every signal in order.
#[derive(Debug, Default)]
pub struct RecordingView {
    pub events: Vec<Event>,
}

impl RecordingView {
    pub fn count(&self, event: &Event) -> usize {
        self.events.iter().filter(|seen| *seen == event).count()
    }

    pub fn failures(&self) -> Vec<&str> {
        self.events
            .iter()
            .filter_map(|event| match event {
                Event::Failure(message) => Some(message.as_str()),
                _ => None,
            })
            .collect()
    }
}

impl View for RecordingView {
    fn show_login_form(&mut self) {
        self.events.push(Event::LoginForm);
    }

    fn show_authenticated_view(&mut self) {
        self.events.push(Event::Authenticated);
    }

    fn render_user_data(&mut self, record: &Value) {
        self.events.push(Event::UserData(record.clone()));
    }

    fn notify_failure(&mut self, message: &str) {
        self.events.push(Event::Failure(message.to_string()));
    }

    fn redirect_to_login(&mut self) {
        self.events.push(Event::Redirect);
    }

    fn refresh(&mut self) {
        self.events.push(Event::Refresh);
    }
}

pub type TestClient = ApiClient<MemoryTokenStore, RecordingView>;

pub fn can_bind_localhost() -> bool {
    TcpListener::bind("127.0.0.1:0").is_ok()
}

/// Config that takes the CSRF token only from the rotating header, so no
/// page is fetched before the first call.
pub fn header_config(base_url: &str) -> ClientConfig {
    ClientConfig::new(base_url)
        .expect("valid base url")
        .with_csrf_source(CsrfSource::Header)
}

pub fn client(base_url: &str, store: MemoryTokenStore) -> TestClient {
    ApiClient::new(header_config(base_url), store, RecordingView::default())
        .expect("client builds")
}
