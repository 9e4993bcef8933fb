mod basic;
mod client;
mod header;

pub use basic::BasicClient;
pub use client::HttpClient;
pub use header::WithHeader;

use bytes::Bytes;
use reqwest::header::{ACCEPT, HeaderValue};
use tracing::debug;

use crate::error::{PipelineError, Result};

/// Issues a single GET and returns the body of a 2xx response.
///
/// Transport errors and non-success statuses both become
/// [`PipelineError::FetchFailure`]. Nothing is retried here.
#[tracing::instrument(skip(client))]
pub async fn fetch_bytes<C: HttpClient + ?Sized>(
    client: &C,
    url: &str,
    accept: &str,
) -> Result<Bytes> {
    let parsed = url
        .parse::<reqwest::Url>()
        .map_err(|e| PipelineError::fetch(url, format!("invalid URL: {e}")))?;
    let mut req = reqwest::Request::new(reqwest::Method::GET, parsed);
    let accept = HeaderValue::from_str(accept)
        .map_err(|e| PipelineError::fetch(url, format!("invalid Accept header: {e}")))?;
    req.headers_mut().insert(ACCEPT, accept);

    let resp = client
        .execute(req)
        .await
        .map_err(|e| PipelineError::fetch(url, e))?;

    let status = resp.status();
    if !status.is_success() {
        let body = resp.text().await.unwrap_or_default();
        return Err(PipelineError::fetch(
            url,
            format!("HTTP {status}: {}", body.chars().take(200).collect::<String>()),
        ));
    }

    let bytes = resp
        .bytes()
        .await
        .map_err(|e| PipelineError::fetch(url, format!("failed to read body: {e}")))?;
    debug!(bytes = bytes.len(), "Feed bytes received");
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex;

    struct Canned {
        status: u16,
        body: &'static str,
        seen_accept: Mutex<Option<String>>,
    }

    #[async_trait]
    impl HttpClient for Canned {
        async fn execute(&self, req: reqwest::Request) -> reqwest::Result<reqwest::Response> {
            let accept = req
                .headers()
                .get(ACCEPT)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string);
            *self.seen_accept.lock().unwrap() = accept;
            let resp = http::Response::builder()
                .status(self.status)
                .body(self.body)
                .unwrap();
            Ok(resp.into())
        }
    }

    fn canned(status: u16, body: &'static str) -> Canned {
        Canned {
            status,
            body,
            seen_accept: Mutex::new(None),
        }
    }

    #[tokio::test]
    async fn test_success_returns_body_and_sends_accept() {
        let client = canned(200, "{\"features\":[]}");
        let bytes = fetch_bytes(&client, "https://example.org/feed", "application/json")
            .await
            .unwrap();

        assert_eq!(&bytes[..], b"{\"features\":[]}");
        assert_eq!(
            client.seen_accept.lock().unwrap().as_deref(),
            Some("application/json")
        );
    }

    #[tokio::test]
    async fn test_non_success_status_is_fetch_failure() {
        let client = canned(503, "unavailable");
        let err = fetch_bytes(&client, "https://example.org/feed", "application/json")
            .await
            .unwrap_err();

        match err {
            PipelineError::FetchFailure { url, reason } => {
                assert_eq!(url, "https://example.org/feed");
                assert!(reason.contains("503"));
            }
            other => panic!("expected FetchFailure, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_invalid_url_is_fetch_failure() {
        let client = canned(200, "");
        let err = fetch_bytes(&client, "not a url", "application/json")
            .await
            .unwrap_err();
        assert!(matches!(err, PipelineError::FetchFailure { .. }));
    }
}
