#![allow(clippy::unwrap_used, clippy::expect_used)]

mod support;

use anyhow::Result;
use finance_client::{
    ApiClient, ApiRequest, ClientError, FileTokenStore, FormDescriptor, HttpMethod,
    MemoryTokenStore, TokenStore,
};
use secrecy::{ExposeSecret, SecretString};
use serde_json::{Value, json};
use std::time::Duration;
use support::{Event, RecordingView, can_bind_localhost, client, header_config};
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn password(value: &str) -> SecretString {
    SecretString::from(value.to_string())
}

#[tokio::test]
async fn login_stores_access_token_and_switches_view() -> Result<()> {
    if !can_bind_localhost() {
        eprintln!("Skipping test: cannot bind localhost");
        return Ok(());
    }
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/login"))
        .and(header("content-type", "application/json"))
        .and(body_json(json!({"email": "a@b.com", "password": "x"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"access_token": "T1"})))
        .expect(1)
        .mount(&server)
        .await;

    let mut client = client(&server.uri(), MemoryTokenStore::new());
    client.login("a@b.com", &password("x")).await?;

    assert_eq!(client.session_token().unwrap().expose_secret(), "T1");
    assert_eq!(client.store().load()?.unwrap().expose_secret(), "T1");
    assert_eq!(client.view().events, vec![Event::Authenticated]);
    Ok(())
}

#[tokio::test]
async fn login_failure_notifies_and_stays_unauthenticated() -> Result<()> {
    if !can_bind_localhost() {
        eprintln!("Skipping test: cannot bind localhost");
        return Ok(());
    }
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/login"))
        .respond_with(
            ResponseTemplate::new(400)
                .set_body_json(json!({"error": "username and password are required"})),
        )
        .mount(&server)
        .await;

    let mut client = client(&server.uri(), MemoryTokenStore::new());
    let err = client.login("a@b.com", &password("x")).await.unwrap_err();

    assert!(matches!(
        err,
        ClientError::RequestFailed { status: 400, ref message } if message == "username and password are required"
    ));
    assert!(!client.is_authenticated());
    let failures = client.view().failures();
    assert_eq!(failures.len(), 1);
    assert!(failures[0].starts_with("Login failed. Please try again."));
    Ok(())
}

#[tokio::test]
async fn login_rejected_with_401_redirects_and_notifies() -> Result<()> {
    if !can_bind_localhost() {
        eprintln!("Skipping test: cannot bind localhost");
        return Ok(());
    }
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/login"))
        .respond_with(
            ResponseTemplate::new(401).set_body_json(json!({"error": "Invalid username or password"})),
        )
        .mount(&server)
        .await;

    let mut client = client(&server.uri(), MemoryTokenStore::new());
    let err = client.login("a@b.com", &password("wrong")).await.unwrap_err();

    assert!(matches!(err, ClientError::AuthExpired));
    assert!(!client.is_authenticated());
    assert_eq!(client.view().count(&Event::Redirect), 1);
    assert_eq!(client.view().failures().len(), 1);
    Ok(())
}

#[tokio::test]
async fn login_validates_input_without_network() -> Result<()> {
    if !can_bind_localhost() {
        eprintln!("Skipping test: cannot bind localhost");
        return Ok(());
    }
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let mut client = client(&server.uri(), MemoryTokenStore::new());

    let err = client.login("not-an-email", &password("x")).await.unwrap_err();
    assert!(matches!(err, ClientError::InvalidRequest(_)));

    let err = client.login("a@b.com", &password("")).await.unwrap_err();
    assert!(matches!(err, ClientError::InvalidRequest(_)));

    assert_eq!(client.view().failures().len(), 2);
    Ok(())
}

#[tokio::test]
async fn login_without_access_token_is_a_parse_failure() -> Result<()> {
    if !can_bind_localhost() {
        eprintln!("Skipping test: cannot bind localhost");
        return Ok(());
    }
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true})))
        .mount(&server)
        .await;

    let mut client = client(&server.uri(), MemoryTokenStore::new());
    let err = client.login("a@b.com", &password("x")).await.unwrap_err();

    assert!(matches!(err, ClientError::Parse(_)));
    assert!(!client.is_authenticated());
    assert!(client.store().load()?.is_none());
    Ok(())
}

#[tokio::test]
async fn fetch_user_sends_bearer_token_and_renders_record() -> Result<()> {
    if !can_bind_localhost() {
        eprintln!("Skipping test: cannot bind localhost");
        return Ok(());
    }
    let server = MockServer::start().await;
    let record = json!({"id": 42, "name": "Ada", "email": "ada@finance.example"});
    Mock::given(method("GET"))
        .and(path("/get_user"))
        .and(query_param("id", "42"))
        .and(header("authorization", "Bearer T1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(record.clone()))
        .expect(1)
        .mount(&server)
        .await;

    let mut client = client(&server.uri(), MemoryTokenStore::with_token("T1"));
    let fetched = client.fetch_user(" 42 ").await?;

    assert_eq!(fetched, record);
    assert_eq!(client.view().events, vec![Event::UserData(record)]);
    Ok(())
}

#[tokio::test]
async fn fetch_user_without_token_fails_fast() -> Result<()> {
    if !can_bind_localhost() {
        eprintln!("Skipping test: cannot bind localhost");
        return Ok(());
    }
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(0)
        .mount(&server)
        .await;

    let mut client = client(&server.uri(), MemoryTokenStore::new());
    let err = client.fetch_user("42").await.unwrap_err();

    assert!(matches!(err, ClientError::Unauthenticated));
    let failures = client.view().failures();
    assert_eq!(failures.len(), 1);
    assert!(failures[0].starts_with("Failed to fetch user data."));
    Ok(())
}

#[tokio::test]
async fn fetch_user_rejects_blank_id_without_network() -> Result<()> {
    if !can_bind_localhost() {
        eprintln!("Skipping test: cannot bind localhost");
        return Ok(());
    }
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(0)
        .mount(&server)
        .await;

    let mut client = client(&server.uri(), MemoryTokenStore::with_token("T1"));
    let err = client.fetch_user("  ").await.unwrap_err();

    assert!(matches!(err, ClientError::InvalidRequest(_)));
    assert!(client.is_authenticated());
    let failures = client.view().failures();
    assert_eq!(failures.len(), 1);
    assert!(failures[0].starts_with("Failed to fetch user data."));
    Ok(())
}

#[tokio::test]
async fn fetch_user_encodes_id() -> Result<()> {
    if !can_bind_localhost() {
        eprintln!("Skipping test: cannot bind localhost");
        return Ok(());
    }
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/get_user"))
        .and(query_param("id", "a&b=c"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "a&b=c"})))
        .expect(1)
        .mount(&server)
        .await;

    let mut client = client(&server.uri(), MemoryTokenStore::with_token("T1"));
    client.fetch_user("a&b=c").await?;
    Ok(())
}

#[tokio::test]
async fn unauthorized_response_clears_session_and_redirects_once() -> Result<()> {
    if !can_bind_localhost() {
        eprintln!("Skipping test: cannot bind localhost");
        return Ok(());
    }
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/get_user"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({"msg": "Token has expired"})))
        .expect(1)
        .mount(&server)
        .await;

    let mut client = client(&server.uri(), MemoryTokenStore::with_token("T1"));
    let err = client.fetch_user("42").await.unwrap_err();

    assert!(matches!(err, ClientError::AuthExpired));
    assert!(client.session_token().is_none());
    assert!(client.store().load()?.is_none());
    assert_eq!(client.view().events, vec![Event::Redirect]);

    // Once cleared, further user fetches fail fast without another request.
    let err = client.fetch_user("42").await.unwrap_err();
    assert!(matches!(err, ClientError::Unauthenticated));
    assert_eq!(client.view().count(&Event::Redirect), 1);
    Ok(())
}

#[tokio::test]
async fn unauthorized_submit_redirects_without_failure_notice() -> Result<()> {
    if !can_bind_localhost() {
        eprintln!("Skipping test: cannot bind localhost");
        return Ok(());
    }
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/add_budget"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let mut client = client(&server.uri(), MemoryTokenStore::with_token("T1"));
    let form = FormDescriptor::new("/add_budget", "POST").field("amount", "10");
    let err = client.submit_form(&form).await.unwrap_err();

    assert!(matches!(err, ClientError::AuthExpired));
    assert!(!client.is_authenticated());
    assert_eq!(client.view().events, vec![Event::Redirect]);
    Ok(())
}

#[tokio::test]
async fn error_status_surfaces_server_message() -> Result<()> {
    if !can_bind_localhost() {
        eprintln!("Skipping test: cannot bind localhost");
        return Ok(());
    }
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/get_user"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({"error": "User 42 not found"})))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/reports"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let mut client = client(&server.uri(), MemoryTokenStore::with_token("T1"));

    let err = client.fetch_user("42").await.unwrap_err();
    assert!(matches!(
        err,
        ClientError::RequestFailed { status: 404, ref message } if message == "User 42 not found"
    ));
    assert!(client.is_authenticated());

    let err = client.call(ApiRequest::get("/reports")).await.unwrap_err();
    assert!(matches!(
        err,
        ClientError::RequestFailed { status: 500, ref message } if message == "Request failed."
    ));
    Ok(())
}

#[tokio::test]
async fn submit_form_sends_fields_as_json_and_refreshes() -> Result<()> {
    if !can_bind_localhost() {
        eprintln!("Skipping test: cannot bind localhost");
        return Ok(());
    }
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/update_user"))
        .and(header("content-type", "application/json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"message": "updated"})))
        .expect(1)
        .mount(&server)
        .await;

    let mut client = client(&server.uri(), MemoryTokenStore::with_token("T1"));
    let form = FormDescriptor::new(format!("{}/update_user", server.uri()), "put")
        .field("user_id", "42")
        .field("name", "Ada Lovelace");
    let response = client.submit_form(&form).await?;

    assert_eq!(response["message"], "updated");
    assert_eq!(client.view().events, vec![Event::Refresh]);

    let requests = server.received_requests().await.unwrap();
    let body: Value = requests[0].body_json()?;
    assert_eq!(body, json!({"user_id": "42", "name": "Ada Lovelace"}));
    Ok(())
}

#[tokio::test]
async fn submit_form_rejects_unknown_method() -> Result<()> {
    if !can_bind_localhost() {
        eprintln!("Skipping test: cannot bind localhost");
        return Ok(());
    }
    let server = MockServer::start().await;
    let mut client = client(&server.uri(), MemoryTokenStore::with_token("T1"));
    let form = FormDescriptor::new("/add_budget", "PATCH");

    let err = client.submit_form(&form).await.unwrap_err();
    assert!(matches!(err, ClientError::InvalidRequest(_)));
    assert!(client.view().failures()[0].starts_with("Form submission failed."));
    assert!(server.received_requests().await.unwrap().is_empty());
    Ok(())
}

#[tokio::test]
async fn call_round_trips_json_body_and_handles_empty_response() -> Result<()> {
    if !can_bind_localhost() {
        eprintln!("Skipping test: cannot bind localhost");
        return Ok(());
    }
    let server = MockServer::start().await;
    let payload = json!({
        "name": "groceries",
        "limit": 250.5,
        "tags": ["food", "weekly"],
        "nested": {"rollover": true, "note": null}
    });
    Mock::given(method("DELETE"))
        .and(path("/delete_budget"))
        .and(body_json(payload.clone()))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let mut client = client(&server.uri(), MemoryTokenStore::new());
    let response = client
        .call(ApiRequest::new("/delete_budget", HttpMethod::Delete, Some(payload)))
        .await?;

    assert_eq!(response, Value::Null);
    Ok(())
}

#[tokio::test]
async fn call_without_body_or_token_sends_no_auth_headers() -> Result<()> {
    if !can_bind_localhost() {
        eprintln!("Skipping test: cannot bind localhost");
        return Ok(());
    }
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "ok"})))
        .mount(&server)
        .await;

    let mut client = client(&server.uri(), MemoryTokenStore::new());
    client.call(ApiRequest::get("/")).await?;

    let requests = server.received_requests().await.unwrap();
    let headers = &requests[0].headers;
    assert!(headers.get("authorization").is_none());
    assert!(headers.get("x-csrf-token").is_none());
    assert!(headers.get("content-type").is_none());
    Ok(())
}

#[tokio::test]
async fn empty_url_is_rejected() -> Result<()> {
    if !can_bind_localhost() {
        eprintln!("Skipping test: cannot bind localhost");
        return Ok(());
    }
    let server = MockServer::start().await;
    let mut client = client(&server.uri(), MemoryTokenStore::new());
    let err = client.call(ApiRequest::get("")).await.unwrap_err();
    assert!(matches!(err, ClientError::InvalidRequest(_)));
    Ok(())
}

#[tokio::test]
async fn unreachable_server_is_a_network_error() -> Result<()> {
    if !can_bind_localhost() {
        eprintln!("Skipping test: cannot bind localhost");
        return Ok(());
    }
    let port = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0")?;
        listener.local_addr()?.port()
    };

    let mut client = client(&format!("http://127.0.0.1:{port}"), MemoryTokenStore::with_token("T1"));
    let err = client.fetch_user("42").await.unwrap_err();

    assert!(matches!(err, ClientError::Network(_)));
    assert!(client.is_authenticated());
    assert_eq!(client.view().failures().len(), 1);
    Ok(())
}

#[tokio::test]
async fn slow_response_times_out_as_network_error() -> Result<()> {
    if !can_bind_localhost() {
        eprintln!("Skipping test: cannot bind localhost");
        return Ok(());
    }
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/get_user"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"id": 42}))
                .set_delay(Duration::from_secs(3)),
        )
        .mount(&server)
        .await;

    let config = header_config(&server.uri()).with_timeout(Duration::from_millis(300));
    let mut client = ApiClient::new(
        config,
        MemoryTokenStore::with_token("T1"),
        RecordingView::default(),
    )?;
    let err = client.fetch_user("42").await.unwrap_err();

    assert!(matches!(err, ClientError::Network(_)));
    assert!(client.is_authenticated());
    assert_eq!(client.view().failures().len(), 1);
    assert_eq!(client.view().count(&Event::Redirect), 0);
    Ok(())
}

#[tokio::test]
async fn corrupt_token_file_is_signed_out_and_logout_removes_it() -> Result<()> {
    if !can_bind_localhost() {
        eprintln!("Skipping test: cannot bind localhost");
        return Ok(());
    }
    let server = MockServer::start().await;

    let dir = std::env::temp_dir().join(format!("finance-client-{}", uuid::Uuid::new_v4()));
    let token_file = dir.join("token.json");
    std::fs::create_dir_all(&dir)?;
    std::fs::write(&token_file, "not json")?;

    let mut client = ApiClient::new(
        header_config(&server.uri()),
        FileTokenStore::new(&token_file),
        RecordingView::default(),
    )?;
    assert!(!client.is_authenticated());

    client.logout()?;
    assert!(!token_file.exists());
    assert_eq!(client.view().events, vec![Event::LoginForm]);

    let _ = std::fs::remove_dir_all(dir);
    Ok(())
}

#[tokio::test]
async fn session_survives_restart_until_logout() -> Result<()> {
    if !can_bind_localhost() {
        eprintln!("Skipping test: cannot bind localhost");
        return Ok(());
    }
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"access_token": "T9"})))
        .mount(&server)
        .await;

    let dir = std::env::temp_dir().join(format!("finance-client-{}", uuid::Uuid::new_v4()));
    let token_file = dir.join("token.json");

    let mut first = ApiClient::new(
        header_config(&server.uri()),
        FileTokenStore::new(&token_file),
        RecordingView::default(),
    )?;
    first.login("a@b.com", &password("x")).await?;
    drop(first);

    let mut second = ApiClient::new(
        header_config(&server.uri()),
        FileTokenStore::new(&token_file),
        RecordingView::default(),
    )?;
    assert!(second.resume());
    assert_eq!(second.session_token().unwrap().expose_secret(), "T9");

    second.logout()?;
    assert!(!second.is_authenticated());
    assert!(!token_file.exists());
    assert_eq!(
        second.view().events,
        vec![Event::Authenticated, Event::LoginForm]
    );

    let mut third = ApiClient::new(
        header_config(&server.uri()),
        FileTokenStore::new(&token_file),
        RecordingView::default(),
    )?;
    assert!(!third.resume());

    let _ = std::fs::remove_dir_all(dir);
    Ok(())
}
