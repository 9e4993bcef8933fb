use crate::fetch::client::HttpClient;
use async_trait::async_trait;
use reqwest::header::{HeaderName, HeaderValue, USER_AGENT};

/// An [`HttpClient`] wrapper that sets a fixed header on every request.
///
/// Used to identify the poller to upstream feeds with a `User-Agent`, which
/// public earthquake APIs ask clients to send.
pub struct WithHeader<C> {
    pub inner: C,
    pub name: HeaderName,
    pub value: HeaderValue,
}

impl<C> WithHeader<C> {
    /// Convenience constructor for `User-Agent: <agent>`.
    pub fn user_agent(inner: C, agent: &str) -> Result<Self, reqwest::header::InvalidHeaderValue> {
        Ok(Self {
            inner,
            name: USER_AGENT,
            value: HeaderValue::from_str(agent)?,
        })
    }
}

#[async_trait]
impl<C: HttpClient> HttpClient for WithHeader<C> {
    async fn execute(&self, mut req: reqwest::Request) -> reqwest::Result<reqwest::Response> {
        req.headers_mut()
            .insert(self.name.clone(), self.value.clone());
        self.inner.execute(req).await
    }
}
