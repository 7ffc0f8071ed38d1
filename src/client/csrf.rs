//! CSRF token sources. A deployment picks exactly one source of truth: a token
//! embedded in a page (meta tag or hidden form field), a cookie, or a rotating
//! response header.

use regex::Regex;
use std::{fmt, str::FromStr};

pub const DEFAULT_CSRF_HEADER: &str = "X-CSRF-TOKEN";
pub const DEFAULT_CSRF_FIELD: &str = "csrf_token";
pub const DEFAULT_CSRF_COOKIE: &str = "csrf_token";
pub const DEFAULT_CSRF_PAGE: &str = "/";

const META_NAME: &str = "csrf-token";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CsrfSource {
    /// `<meta name="csrf-token" content="...">` on the given page.
    Meta { page: String },
    /// `<input type="hidden" name="<field>" value="...">` on the given page.
    HiddenField { page: String, field: String },
    /// Cookie read from the jar before every request.
    Cookie { name: String },
    /// Rotated response header only.
    Header,
}

impl Default for CsrfSource {
    fn default() -> Self {
        Self::Meta {
            page: DEFAULT_CSRF_PAGE.to_string(),
        }
    }
}

impl CsrfSource {
    /// Page that must be fetched to obtain the initial token, if any.
    #[must_use]
    pub fn page(&self) -> Option<&str> {
        match self {
            Self::Meta { page } | Self::HiddenField { page, .. } => Some(page),
            Self::Cookie { .. } | Self::Header => None,
        }
    }

    /// Whether a rotated token in the response header replaces the held one.
    #[must_use]
    pub fn accepts_rotation(&self) -> bool {
        !matches!(self, Self::Cookie { .. })
    }

    /// Extracts the initial token from a page body.
    #[must_use]
    pub fn extract(&self, html: &str) -> Option<String> {
        match self {
            Self::Meta { .. } => find_tag_attribute(html, "meta", META_NAME, "content"),
            Self::HiddenField { field, .. } => find_tag_attribute(html, "input", field, "value"),
            Self::Cookie { .. } | Self::Header => None,
        }
    }
}

/// Source kind as named on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CsrfSourceKind {
    Meta,
    HiddenField,
    Cookie,
    Header,
}

impl FromStr for CsrfSourceKind {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_lowercase().as_str() {
            "meta" => Ok(Self::Meta),
            "hidden-field" | "hidden" => Ok(Self::HiddenField),
            "cookie" => Ok(Self::Cookie),
            "header" => Ok(Self::Header),
            _ => Err("invalid csrf source, expected meta, hidden-field, cookie or header".to_string()),
        }
    }
}

impl fmt::Display for CsrfSourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Meta => "meta",
            Self::HiddenField => "hidden-field",
            Self::Cookie => "cookie",
            Self::Header => "header",
        };
        f.write_str(name)
    }
}

fn find_tag_attribute(html: &str, tag: &str, name: &str, attribute: &str) -> Option<String> {
    let tags = Regex::new(&format!(r"(?is)<{}\b[^>]*>", regex::escape(tag))).ok()?;

    let value = tags.find_iter(html).find_map(|found| {
        let element = found.as_str();
        let matches_name = attribute_value(element, "name").is_some_and(|value| value == name);
        if matches_name {
            attribute_value(element, attribute)
        } else {
            None
        }
    });
    value
}

fn attribute_value(element: &str, attribute: &str) -> Option<String> {
    let pattern = format!(
        r#"(?i)\s{}\s*=\s*(?:"([^"]*)"|'([^']*)')"#,
        regex::escape(attribute)
    );
    let captures = Regex::new(&pattern).ok()?.captures(element)?;
    captures
        .get(1)
        .or_else(|| captures.get(2))
        .map(|value| decode_entities(value.as_str()))
}

/// Decodes the character references an HTML serializer emits inside
/// attribute values. Unknown references are kept as-is.
fn decode_entities(value: &str) -> String {
    if !value.contains('&') {
        return value.to_string();
    }

    let Ok(references) = Regex::new(r"&(#[xX][0-9a-fA-F]+|#[0-9]+|[a-zA-Z]+);") else {
        return value.to_string();
    };

    references
        .replace_all(value, |captures: &regex::Captures<'_>| {
            let reference = &captures[1];
            let decoded = match reference {
                "amp" => Some('&'),
                "quot" => Some('"'),
                "apos" => Some('\''),
                "lt" => Some('<'),
                "gt" => Some('>'),
                _ => reference
                    .strip_prefix("#x")
                    .or_else(|| reference.strip_prefix("#X"))
                    .and_then(|hex| u32::from_str_radix(hex, 16).ok())
                    .or_else(|| reference.strip_prefix('#').and_then(|dec| dec.parse().ok()))
                    .and_then(char::from_u32),
            };
            decoded.map_or_else(|| captures[0].to_string(), String::from)
        })
        .into_owned()
}

/// Finds a cookie value in a `Cookie` header value (`a=b; c=d`).
#[must_use]
pub fn cookie_value(header: &str, name: &str) -> Option<String> {
    header.split(';').find_map(|pair| {
        let (key, value) = pair.trim().split_once('=')?;
        if key == name && !value.is_empty() {
            Some(value.to_string())
        } else {
            None
        }
    })
}
