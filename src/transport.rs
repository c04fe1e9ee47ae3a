use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::header::{ACCEPT, AUTHORIZATION, HeaderMap, HeaderValue};
use serde_json::Value;
use thiserror::Error;

/// Errors from a single API request
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("failed to build HTTP client: {0}")]
    Client(String),

    #[error("request to {url} failed: {source}")]
    Request {
        url: String,
        source: reqwest::Error,
    },

    #[error("{url} returned HTTP {status}: {message}")]
    Status {
        url: String,
        status: u16,
        message: String,
    },

    #[error("unexpected response from {path}: {source}")]
    Decode {
        path: String,
        source: serde_json::Error,
    },
}

/// Something that can GET a JSON document from the GitHub REST API
pub trait Transport {
    /// `path` is relative to the API root, e.g. `/repos/owner/name`
    fn get(&self, path: &str, query: &[(&str, String)]) -> Result<Value, FetchError>;
}

/// Authenticated blocking HTTP transport
pub struct HttpTransport {
    client: Client,
    base_url: String,
}

impl HttpTransport {
    pub fn new(base_url: &str, token: &str, timeout: Duration) -> Result<Self, FetchError> {
        let mut auth = HeaderValue::from_str(&format!("Bearer {token}"))
            .map_err(|err| FetchError::Client(format!("invalid token: {err}")))?;
        auth.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, auth);
        headers.insert(ACCEPT, HeaderValue::from_static("application/vnd.github+json"));
        headers.insert(
            "X-GitHub-Api-Version",
            HeaderValue::from_static("2022-11-28"),
        );

        let client = Client::builder()
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .default_headers(headers)
            .timeout(timeout)
            .build()
            .map_err(|err| FetchError::Client(err.to_string()))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_owned(),
        })
    }
}

impl Transport for HttpTransport {
    fn get(&self, path: &str, query: &[(&str, String)]) -> Result<Value, FetchError> {
        let url = format!("{}{path}", self.base_url);
        tracing::debug!(%url, ?query, "GET");

        let response = self
            .client
            .get(&url)
            .query(query)
            .send()
            .map_err(|source| FetchError::Request {
                url: url.clone(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(FetchError::Status {
                url,
                status: status.as_u16(),
                message: error_message(&body),
            });
        }

        let body = response.text().map_err(|source| FetchError::Request {
            url: url.clone(),
            source,
        })?;
        parse_body(&url, &body)
    }
}

fn parse_body(url: &str, body: &str) -> Result<Value, FetchError> {
    serde_json::from_str(body).map_err(|source| FetchError::Decode {
        path: url.to_owned(),
        source,
    })
}

/// GitHub error bodies look like `{"message": "...", "documentation_url": "..."}`
fn error_message(body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|value| value.get("message")?.as_str().map(str::to_owned))
        .unwrap_or_else(|| body.trim().to_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_message_prefers_github_message_field() {
        let body = r#"{"message":"Bad credentials","documentation_url":"https://docs.github.com/rest"}"#;
        assert_eq!(error_message(body), "Bad credentials");
    }

    #[test]
    fn error_message_falls_back_to_raw_body() {
        assert_eq!(error_message("  upstream timeout\n"), "upstream timeout");
    }

    #[test]
    fn non_json_success_body_is_a_decode_error() {
        let result = parse_body("https://api.github.com/repos/o/r", "<html>maintenance</html>");
        assert!(matches!(
            result,
            Err(FetchError::Decode { ref path, .. }) if path == "https://api.github.com/repos/o/r"
        ));
    }

    #[test]
    fn json_success_body_parses() {
        let value = parse_body("https://api.github.com/repos/o/r", r#"{"default_branch":"main"}"#)
            .expect("valid JSON should parse");
        assert_eq!(value["default_branch"], "main");
    }

    #[test]
    fn rejects_token_that_is_not_a_header_value() {
        let result = HttpTransport::new("https://api.github.com", "bad\ntoken", Duration::from_secs(1));
        assert!(matches!(result, Err(FetchError::Client(_))));
    }

    #[test]
    fn trailing_slash_is_trimmed_from_base_url() {
        let transport =
            HttpTransport::new("https://ghe.example.com/api/v3/", "t", Duration::from_secs(1))
                .expect("client should build");
        assert_eq!(transport.base_url, "https://ghe.example.com/api/v3");
    }
}
