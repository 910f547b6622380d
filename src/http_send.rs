use crate::{Error, HttpSend, Result};
use async_trait::async_trait;
use bytes::Bytes;
use http_body_util::BodyExt;
use reqwest::{Client, Request};

/// HttpSend implementation backed by a [`reqwest::Client`].
///
/// This is the default transport for the story client. Connection reuse and
/// timeouts are whatever the wrapped client is configured with.
#[derive(Debug, Default)]
pub struct ReqwestHttpSend {
    client: Client,
}

impl ReqwestHttpSend {
    /// Create a new ReqwestHttpSend with a reqwest::Client.
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl HttpSend for ReqwestHttpSend {
    async fn http_send(&self, req: http::Request<Bytes>) -> Result<http::Response<Bytes>> {
        let req = Request::try_from(req)
            .map_err(|e| Error::request_invalid("failed to convert request").with_source(e))?;
        let resp: http::Response<_> = self
            .client
            .execute(req)
            .await
            .map_err(|e| Error::transport_failed("request failed").with_source(e))?
            .into();

        let (parts, body) = resp.into_parts();
        let bs = BodyExt::collect(body)
            .await
            .map(|buf| buf.to_bytes())
            .map_err(|e| Error::transport_failed("failed to read response body").with_source(e))?;
        Ok(http::Response::from_parts(parts, bs))
    }
}
