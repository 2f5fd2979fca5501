//! HTTP request builder.

use crate::FetchError;
use base64::Engine;
use serde::Serialize;
use std::collections::HashMap;

/// HTTP methods.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Put,
    Patch,
    Delete,
    Head,
    Options,
}

impl Method {
    /// Convert to HTTP method string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Patch => "PATCH",
            Method::Delete => "DELETE",
            Method::Head => "HEAD",
            Method::Options => "OPTIONS",
        }
    }
}

/// A builder for constructing HTTP requests.
#[derive(Debug, Clone)]
pub struct RequestBuilder {
    #[allow(dead_code)] // Used in wasm32 target
    pub(crate) method: Method,
    #[allow(dead_code)] // Used in wasm32 target
    pub(crate) url: String,
    pub(crate) headers: HashMap<String, String>,
    pub(crate) body: Option<Vec<u8>>,
}

impl RequestBuilder {
    /// Create a new request builder.
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            headers: HashMap::new(),
            body: None,
        }
    }

    /// Add a header to the request.
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(key.into(), value.into());
        self
    }

    /// Set the request body as raw bytes.
    pub fn body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Set the request body as JSON and set Content-Type accordingly.
    pub fn json<T: Serialize>(mut self, value: &T) -> Result<Self, FetchError> {
        let json = serde_json::to_vec(value)?;
        self.headers
            .insert("Content-Type".to_string(), "application/json".to_string());
        self.body = Some(json);
        Ok(self)
    }

    /// Add a bearer token authorization header.
    pub fn bearer_auth(self, token: impl AsRef<str>) -> Self {
        self.header("Authorization", format!("Bearer {}", token.as_ref()))
    }

    /// Add a basic authorization header.
    pub fn basic_auth(self, username: impl AsRef<str>, password: Option<&str>) -> Self {
        let credentials = match password {
            Some(pass) => format!("{}:{}", username.as_ref(), pass),
            None => format!("{}:", username.as_ref()),
        };
        let encoded = base64::engine::general_purpose::STANDARD.encode(credentials.as_bytes());
        self.header("Authorization", format!("Basic {}", encoded))
    }

    /// Set the Accept header.
    pub fn accept(self, content_type: impl Into<String>) -> Self {
        self.header("Accept", content_type)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_sets_content_type() {
        #[derive(Serialize)]
        struct Body {
            amount: i64,
        }

        let builder = RequestBuilder::new(Method::Post, "/orders")
            .json(&Body { amount: 269500 })
            .unwrap();
        assert_eq!(
            builder.headers.get("Content-Type").map(String::as_str),
            Some("application/json")
        );
        assert_eq!(builder.body.as_deref(), Some(br#"{"amount":269500}"#.as_ref()));
    }

    #[test]
    fn test_bearer_auth_header() {
        let builder = RequestBuilder::new(Method::Get, "/track").bearer_auth("tok123");
        assert_eq!(
            builder.headers.get("Authorization").map(String::as_str),
            Some("Bearer tok123")
        );
    }

    #[test]
    fn test_basic_auth_encodes_credentials() {
        let builder = RequestBuilder::new(Method::Post, "/orders").basic_auth("key", Some("secret"));
        // "key:secret" in standard base64
        assert_eq!(
            builder.headers.get("Authorization").map(String::as_str),
            Some("Basic a2V5OnNlY3JldA==")
        );
    }

    #[test]
    fn test_basic_auth_without_password() {
        let builder = RequestBuilder::new(Method::Get, "/x").basic_auth("key", None);
        // "key:" in standard base64
        assert_eq!(
            builder.headers.get("Authorization").map(String::as_str),
            Some("Basic a2V5Og==")
        );
    }
}
