use async_trait::async_trait;
use reqwest::{Request, Response};

/// The transport seam under [`fetch_bytes`](super::fetch_bytes).
///
/// Wrappers such as [`WithHeader`](super::WithHeader) decorate a request
/// before delegating; tests substitute canned responses.
#[async_trait]
pub trait HttpClient: Send + Sync {
    async fn execute(&self, req: Request) -> reqwest::Result<Response>;
}
