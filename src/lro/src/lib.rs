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

//! Types and functions to make long-running operations (LROs) easier to use.
//!
//! Azure Resource Manager style services start long-running operations in
//! response to PUT, PATCH, POST, and DELETE requests. The service responds
//! immediately, with some combination of `Azure-AsyncOperation` and
//! `Location` headers, and a `status` or `properties.provisioningState` field
//! in the body. The application must poll the service until the operation
//! completes, and then fetch the final result.
//!
//! The rules to find the polling URL, and the URL of the final result, depend
//! on the HTTP method and on the headers in each response. A [Poller]
//! implements these rules.
//!
//! # Example
//! ```no_run
//! # use armlro::{Poller, PollerOptions};
//! use gax::http_client::ReqwestClient;
//! use std::sync::Arc;
//! use tokio_util::sync::CancellationToken;
//!
//! #[derive(Debug, Default, serde::Deserialize)]
//! struct Resource {
//!     name: String,
//! }
//!
//! async fn sample(trigger: gax::response::RawResponse) -> gax::Result<Resource> {
//!     let client = Arc::new(ReqwestClient::new());
//!     let mut poller = Poller::<Resource>::new(trigger, client, PollerOptions::default())?;
//!     let cancel = CancellationToken::new();
//!     poller.final_response(&cancel).await
//! }
//! ```

use gax::Result;
use gax::error::Error;
use gax::http_client::HttpClient;
use gax::polling_backoff_policy::{FixedDelay, PollingBackoffPolicy};
use gax::response::RawResponse;
use serde::de::DeserializeOwned;
use std::marker::PhantomData;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use url::Url;

pub mod body;
mod error;
mod options;
pub mod resume_token;
pub mod rules;
mod state;
pub mod tracker;

pub use error::ProtocolError;
pub use options::{DEFAULT_FREQUENCY, FinalStateVia, PollerOptions};
pub use state::{OperationState, PollingMethod, Verb};

use resume_token::ResumeToken;
use tracker::Tracker;

/// The result of polling a long-running operation.
///
/// # Parameters
/// * `R` - the response type. This is the type returned when the LRO completes
///   successfully.
#[derive(Debug)]
pub enum PollingResult<R> {
    /// The operation is still in progress. This includes the raw response.
    InProgress(RawResponse),
    /// The operation completed. This includes the result.
    Completed(Result<R>),
    /// An error trying to poll the LRO.
    ///
    /// These errors do not change the state of the operation. For example,
    /// this may fail because it was not possible to connect to the service.
    /// Such transient errors may disappear in the next polling attempt.
    PollingError(Error),
}

/// Polls a long-running operation until completion.
///
/// The poller wraps the state machine for exactly one operation. It is driven
/// by the caller: each call to [poll][Poller::poll] makes at most one HTTP
/// request. [final_response][Poller::final_response] polls until the
/// operation completes, sleeping between requests.
///
/// # Parameters
/// * `T` - the type of the final result. Operations completing without a body
///   return `T::default()`. If the service does not report where to find the
///   result, the poller decodes the last response from the polling URL, which
///   may be an operation status document. Use a type that ignores unknown
///   fields, or `serde_json::Value`, rather than `()` for such operations.
#[derive(Debug)]
pub struct Poller<T> {
    tracker: Tracker,
    client: Arc<dyn HttpClient>,
    options: PollerOptions,
    final_response: Option<RawResponse>,
    result: PhantomData<fn() -> T>,
}

impl<T> Poller<T> {
    /// Creates a poller from the response that started the operation.
    ///
    /// Responses with an error status code create a poller for a failed
    /// operation. Responses violating the polling protocol, for example, a
    /// `202 Accepted` without polling headers, return an error.
    pub fn new(
        trigger: RawResponse,
        client: Arc<dyn HttpClient>,
        options: PollerOptions,
    ) -> Result<Self> {
        let tracker =
            Tracker::new(&trigger, options.final_state_via()).map_err(Error::protocol)?;
        Ok(Self::from_tracker(tracker, client, options))
    }

    /// Recreates a poller from a [resume token][Poller::resume_token].
    ///
    /// This does not make any requests. The poller continues from the state
    /// captured in the token.
    pub fn from_resume_token(
        token: &str,
        client: Arc<dyn HttpClient>,
        options: PollerOptions,
    ) -> Result<Self> {
        let token = ResumeToken::decode(token)?;
        let tracker = Tracker::from_resume_token(token)?;
        tracing::debug!(
            verb = %tracker.verb(),
            method = %tracker.method(),
            url = %tracker.polling_url(),
            state = %tracker.state(),
            "poller resumed"
        );
        Ok(Self::from_tracker(tracker, client, options))
    }

    fn from_tracker(tracker: Tracker, client: Arc<dyn HttpClient>, options: PollerOptions) -> Self {
        Self {
            tracker,
            client,
            options,
            final_response: None,
            result: PhantomData,
        }
    }

    /// Returns a token to resume polling, possibly in a different process.
    ///
    /// Fails if the poller detected a violation of the polling protocol.
    pub fn resume_token(&self) -> Result<String> {
        self.tracker
            .resume_token()
            .map_err(Error::protocol)?
            .encode()
    }

    /// Returns true once the operation is completed.
    ///
    /// This is also true if the poller detected a violation of the polling
    /// protocol, in that case polling cannot continue.
    pub fn done(&self) -> bool {
        self.tracker.done()
    }

    /// The URL used in the next polling request.
    pub fn polling_url(&self) -> &Url {
        self.tracker.polling_url()
    }

    pub fn polling_method(&self) -> PollingMethod {
        self.tracker.method()
    }

    /// The last state reported by the service.
    pub fn status(&self) -> &OperationState {
        self.tracker.state()
    }

    /// The URL of the final result, if different from the polling URL.
    pub fn final_get_url(&self) -> Option<&Url> {
        self.tracker.final_get_url()
    }

    /// The HTTP method that started the operation.
    pub fn verb(&self) -> Verb {
        self.tracker.verb()
    }

    /// Makes one polling request and returns the raw response.
    ///
    /// Once the operation is completed this makes no requests. It returns the
    /// last response for successful operations, and the error reported by
    /// the service for failed operations.
    ///
    /// Transport errors do not change the state of the operation, the
    /// application may call this function again.
    pub async fn poll(&mut self) -> Result<RawResponse> {
        if self.tracker.done() {
            return self.terminal_response();
        }
        let url = self.tracker.polling_url().clone();
        tracing::debug!(%url, method = %self.tracker.method(), "polling the operation");
        let response = self.client.get(&url).await?;
        self.tracker
            .on_poll_response(response.clone())
            .map_err(Error::protocol)?;
        if self.tracker.has_failed() {
            return Err(self.service_error());
        }
        Ok(response)
    }

    fn terminal_response(&self) -> Result<RawResponse> {
        if let Some(e) = self.tracker.fatal() {
            return Err(Error::protocol(e.clone()));
        }
        if self.tracker.has_failed() {
            return Err(self.service_error());
        }
        let response = self.tracker.last_response().cloned().unwrap_or_else(|| {
            RawResponse::new(http::Method::GET, self.tracker.polling_url().clone())
        });
        Ok(response)
    }

    fn service_error(&self) -> Error {
        let error = self.tracker.service_error().unwrap_or_default();
        tracing::warn!(verb = %self.tracker.verb(), "the operation failed: {error}");
        match self.tracker.last_response() {
            Some(r) => Error::service_with_http_metadata(
                error,
                Some(r.status().as_u16()),
                Some(r.headers().clone()),
            ),
            None => Error::service(error),
        }
    }

    async fn wait_until_done(
        &mut self,
        cancel: &CancellationToken,
        policy: Arc<dyn PollingBackoffPolicy>,
    ) -> Result<()> {
        let loop_start = std::time::Instant::now();
        let deadline = self
            .options
            .polling_duration()
            .map(|d| tokio::time::Instant::now() + d);
        // The response that started the operation counts as the first attempt.
        let mut attempt_count = 1_u32;
        while !self.tracker.done() {
            if cancel.is_cancelled() {
                return Err(Error::cancelled());
            }
            let delay = self
                .tracker
                .retry_after()
                .unwrap_or_else(|| policy.wait_period(loop_start, attempt_count));
            let wake = tokio::time::Instant::now() + delay;
            let (wake, expired) = match deadline {
                Some(d) if d < wake => (d, true),
                _ => (wake, false),
            };
            tokio::select! {
                _ = cancel.cancelled() => return Err(Error::cancelled()),
                _ = tokio::time::sleep_until(wake) => {},
            }
            if expired {
                tracing::warn!(url = %self.tracker.polling_url(), "polling duration exceeded");
                return Err(Error::timeout("the operation did not complete within the polling duration"));
            }
            if cancel.is_cancelled() {
                return Err(Error::cancelled());
            }
            attempt_count = attempt_count.saturating_add(1);
            if let Err(e) = self.poll().await {
                if !self.tracker.done() {
                    return Err(e);
                }
            }
        }
        Ok(())
    }
}

impl<T> Poller<T>
where
    T: DeserializeOwned + Default,
{
    /// Polls until the operation completes and returns the final result.
    ///
    /// The poller waits between requests. It uses the `Retry-After` header if
    /// present, and the configured [PollerOptions] otherwise. Cancelling
    /// `cancel` stops the loop, but not the operation.
    pub async fn final_response(&mut self, cancel: &CancellationToken) -> Result<T> {
        let policy = self.options.backoff_policy();
        self.wait_until_done(cancel, policy).await?;
        self.result().await
    }

    /// Like [final_response][Poller::final_response], using a fixed polling
    /// frequency.
    pub async fn poll_until_done(
        &mut self,
        cancel: &CancellationToken,
        frequency: Duration,
    ) -> Result<T> {
        let policy: Arc<dyn PollingBackoffPolicy> = Arc::new(FixedDelay::new(frequency));
        self.wait_until_done(cancel, policy).await?;
        self.result().await
    }

    /// Converts the poller into a [futures::Stream].
    ///
    /// Each item is the outcome of one polling request, the last item is
    /// always [PollingResult::Completed]. The stream does not wait between
    /// requests, the application controls how often it polls.
    #[cfg(feature = "unstable-stream")]
    pub fn into_stream(self) -> impl futures::Stream<Item = PollingResult<T>> + Unpin {
        use futures::stream::unfold;
        Box::pin(unfold(Some(self), move |state| async move {
            let mut poller = state?;
            if poller.done() {
                let result = poller.result().await;
                return Some((PollingResult::Completed(result), None));
            }
            let polled = poller.poll().await;
            if poller.done() {
                let result = poller.result().await;
                return Some((PollingResult::Completed(result), None));
            }
            match polled {
                Ok(response) => Some((PollingResult::InProgress(response), Some(poller))),
                Err(e) => Some((PollingResult::PollingError(e), Some(poller))),
            }
        }))
    }

    async fn result(&mut self) -> Result<T> {
        if let Some(e) = self.tracker.fatal() {
            return Err(Error::protocol(e.clone()));
        }
        if self.tracker.has_failed() {
            return Err(self.service_error());
        }
        if let Some(response) = &self.final_response {
            return decode(response);
        }
        // Without a final URL the result comes from the polling URL.
        let url = self
            .tracker
            .final_get_url()
            .unwrap_or(self.tracker.polling_url())
            .clone();
        let cached = self
            .tracker
            .last_response()
            .filter(|r| r.url() == &url)
            .cloned();
        let response = match cached {
            Some(r) => r,
            None => self.fetch_final(url).await?,
        };
        decode(&response)
    }

    async fn fetch_final(&mut self, url: Url) -> Result<RawResponse> {
        tracing::debug!(%url, "fetching the final result");
        let response = self.client.get(&url).await?;
        if !tracker::is_polling_code(response.status()) {
            let (status, headers, body) = response.into_parts();
            let error = gax::error::service::ServiceError::from_http_response(status, &body);
            return Err(Error::service_with_http_metadata(
                error,
                Some(status.as_u16()),
                Some(headers),
            ));
        }
        self.final_response = Some(response.clone());
        Ok(response)
    }
}

fn decode<T: DeserializeOwned + Default>(response: &RawResponse) -> Result<T> {
    if response.body().is_empty() || response.status() == http::StatusCode::NO_CONTENT {
        return Ok(T::default());
    }
    serde_json::from_slice::<T>(response.body()).map_err(Error::deser)
}
