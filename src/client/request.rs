//! Request descriptors built per call. A descriptor with a body is always sent
//! as JSON; forms are flattened into a JSON object of string fields.

use crate::client::ClientError;
use serde_json::{Map, Value};
use std::{fmt, str::FromStr};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum HttpMethod {
    #[default]
    Get,
    Post,
    Put,
    Delete,
}

impl HttpMethod {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Delete => "DELETE",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HttpMethod {
    type Err = ClientError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_uppercase().as_str() {
            "GET" => Ok(Self::Get),
            "POST" => Ok(Self::Post),
            "PUT" => Ok(Self::Put),
            "DELETE" => Ok(Self::Delete),
            other => Err(ClientError::InvalidRequest(format!(
                "unsupported method: {other}"
            ))),
        }
    }
}

impl From<HttpMethod> for reqwest::Method {
    fn from(method: HttpMethod) -> Self {
        match method {
            HttpMethod::Get => Self::GET,
            HttpMethod::Post => Self::POST,
            HttpMethod::Put => Self::PUT,
            HttpMethod::Delete => Self::DELETE,
        }
    }
}

/// A single outbound API request.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub url: String,
    pub method: HttpMethod,
    pub body: Option<Value>,
}

impl ApiRequest {
    #[must_use]
    pub fn new(url: impl Into<String>, method: HttpMethod, body: Option<Value>) -> Self {
        Self {
            url: url.into(),
            method,
            body,
        }
    }

    #[must_use]
    pub fn get(url: impl Into<String>) -> Self {
        Self::new(url, HttpMethod::Get, None)
    }

    #[must_use]
    pub fn post(url: impl Into<String>, body: Value) -> Self {
        Self::new(url, HttpMethod::Post, Some(body))
    }
}

/// Form values as supplied by the form layer: target, method and fields in
/// document order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormDescriptor {
    pub action: String,
    pub method: String,
    pub fields: Vec<(String, String)>,
}

impl FormDescriptor {
    #[must_use]
    pub fn new(action: impl Into<String>, method: impl Into<String>) -> Self {
        Self {
            action: action.into(),
            method: method.into(),
            fields: Vec::new(),
        }
    }

    #[must_use]
    pub fn field(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.push((name.into(), value.into()));
        self
    }

    /// Converts the form into a request. Later fields overwrite earlier fields
    /// with the same name.
    ///
    /// # Errors
    /// Returns `InvalidRequest` if the action is blank or the method is unknown.
    pub fn to_request(&self) -> Result<ApiRequest, ClientError> {
        let action = self.action.trim();
        if action.is_empty() {
            return Err(ClientError::InvalidRequest(
                "form action is required".to_string(),
            ));
        }

        let method = if self.method.trim().is_empty() {
            HttpMethod::default()
        } else {
            self.method.parse()?
        };

        let mut body = Map::new();
        for (name, value) in &self.fields {
            body.insert(name.clone(), Value::String(value.clone()));
        }

        Ok(ApiRequest::new(action, method, Some(Value::Object(body))))
    }
}

/// Parses a `name=value` pair as supplied on the command line.
///
/// # Errors
/// Returns an error if the pair has no `=` or an empty name.
pub fn parse_field(raw: &str) -> Result<(String, String), String> {
    let (name, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected name=value, got {raw:?}"))?;
    let name = name.trim();
    if name.is_empty() {
        return Err(format!("field name is empty in {raw:?}"));
    }
    Ok((name.to_string(), value.to_string()))
}
