// Copyright 2025 Google LLC
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     https://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use crate::Result;
use crate::error::Error;
use crate::response::RawResponse;
use std::time::Duration;
use url::Url;

/// The transport used to issue polling requests.
///
/// The polling engine only issues `GET` requests, both to query the status of
/// a long-running operation and to retrieve its final result. Applications
/// that already have an HTTP pipeline (with authentication, retries, and
/// logging) should implement this trait on top of that pipeline.
///
/// Implementations must return the response for any HTTP status code. The
/// polling engine interprets non-successful status codes as service errors.
/// Only failures to complete the request at all should be reported as errors.
#[async_trait::async_trait]
pub trait HttpClient: Send + Sync + std::fmt::Debug {
    /// Sends a `GET` request to `url`.
    async fn get(&self, url: &Url) -> Result<RawResponse>;
}

/// An implementation of [HttpClient] based on [reqwest].
///
/// # Example
/// ```
/// # use armlro_gax::http_client::ReqwestClient;
/// use std::time::Duration;
/// let client = ReqwestClient::builder()
///     .with_timeout(Duration::from_secs(30))
///     .build();
/// ```
#[derive(Clone, Debug)]
pub struct ReqwestClient {
    inner: reqwest::Client,
    timeout: Option<Duration>,
}

impl ReqwestClient {
    /// Creates a client with the default configuration.
    pub fn new() -> Self {
        Self::builder().build()
    }

    /// Returns a builder to configure the client.
    pub fn builder() -> ReqwestClientBuilder {
        ReqwestClientBuilder::default()
    }

    fn map_send_error(err: reqwest::Error) -> Error {
        match err {
            e if e.is_timeout() => Error::timeout(e),
            e => Error::io(e),
        }
    }
}

impl Default for ReqwestClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl HttpClient for ReqwestClient {
    async fn get(&self, url: &Url) -> Result<RawResponse> {
        let builder = self.inner.get(url.clone());
        let builder = self.timeout.into_iter().fold(builder, |b, t| b.timeout(t));
        let response = builder.send().await.map_err(Self::map_send_error)?;
        let status = response.status();
        let headers = response.headers().clone();
        let body = response.bytes().await.map_err(Self::map_send_error)?;
        tracing::debug!(%url, %status, "polling request completed");
        Ok(RawResponse::new(http::Method::GET, url.clone())
            .set_status(status)
            .set_headers(headers)
            .set_body(body))
    }
}

/// Configures a [ReqwestClient].
#[derive(Clone, Debug, Default)]
pub struct ReqwestClientBuilder {
    client: Option<reqwest::Client>,
    timeout: Option<Duration>,
}

impl ReqwestClientBuilder {
    /// Uses an existing [reqwest::Client].
    ///
    /// Applications may want to share the connection pool with other parts of
    /// their code, or need to configure proxies and TLS.
    pub fn with_client(mut self, v: reqwest::Client) -> Self {
        self.client = Some(v);
        self
    }

    /// Sets the timeout for each request.
    pub fn with_timeout(mut self, v: Duration) -> Self {
        self.timeout = Some(v);
        self
    }

    pub fn build(self) -> ReqwestClient {
        ReqwestClient {
            inner: self.client.unwrap_or_default(),
            timeout: self.timeout,
        }
    }
}
