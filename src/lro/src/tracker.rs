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

//! The state machine tracking a single long-running operation.
//!
//! The tracker performs no I/O. It is initialized from the response that
//! started the operation, and then consumes the responses to each polling
//! request. The [Poller][crate::Poller] issues the requests.

use crate::ProtocolError;
use crate::body::StatusBody;
use crate::options::FinalStateVia;
use crate::resume_token::ResumeToken;
use crate::rules::VerbRules;
use crate::state::{OperationState, PollingMethod, Verb};
use gax::error::Error;
use gax::error::service::{DEFAULT_MESSAGE, ServiceError};
use gax::response::RawResponse;
use http::StatusCode;
use std::time::Duration;
use url::Url;

pub(crate) const ASYNC_OPERATION: &str = "Azure-AsyncOperation";
pub(crate) const LOCATION: &str = "Location";
const RETRY_AFTER: &str = "Retry-After";

type Outcome<T> = std::result::Result<T, ProtocolError>;

/// Tracks the state of a long-running operation.
#[derive(Clone, Debug, PartialEq)]
pub struct Tracker {
    verb: Verb,
    rules: &'static VerbRules,
    method: PollingMethod,
    polling_url: Url,
    final_get_url: Option<Url>,
    state: OperationState,
    last_body: StatusBody,
    last_error: Option<ServiceError>,
    last_response: Option<RawResponse>,
    fatal: Option<ProtocolError>,
}

impl Tracker {
    /// Initializes the tracker from the response that started the operation.
    ///
    /// Responses with an error status code, or with a failed provisioning
    /// state, create a tracker in the `Failed` state. Violations of the
    /// polling protocol are returned as errors.
    pub fn new(trigger: &RawResponse, final_state_via: Option<FinalStateVia>) -> Outcome<Self> {
        let verb = Verb::try_from(trigger.method())?;
        let status = trigger.status();
        let last_body = StatusBody::parse(trigger.body());
        let provisioning_state = last_body.provisioning_state().map(OperationState::parse);
        let state = match status {
            StatusCode::OK => provisioning_state.unwrap_or(OperationState::Succeeded),
            StatusCode::CREATED => provisioning_state.unwrap_or(OperationState::InProgress),
            StatusCode::ACCEPTED => OperationState::InProgress,
            StatusCode::NO_CONTENT => OperationState::Succeeded,
            _ => OperationState::Failed,
        };
        let mut tracker = Self {
            verb,
            rules: VerbRules::for_verb(verb),
            method: PollingMethod::Unknown,
            polling_url: trigger.url().clone(),
            final_get_url: None,
            state,
            last_body,
            last_error: None,
            last_response: None,
            fatal: None,
        };
        if tracker.state.is_failed() {
            tracker.last_error = Some(ServiceError::from_http_response(status, trigger.body()));
            tracing::warn!(%verb, %status, url = %trigger.url(), "the operation failed to start");
        } else {
            tracker.update_polling_method(trigger, true)?;
            tracker.check_trigger_body(trigger)?;
            if tracker.method == PollingMethod::Unknown {
                // Completed synchronously, without any polling headers.
                tracker.method = PollingMethod::RequestUri;
            }
            if let Some(via) = final_state_via {
                tracker.apply_final_state_via(via, trigger);
            }
        }
        tracker.last_response = Some(trigger.clone());
        tracing::debug!(
            %verb,
            method = %tracker.method,
            url = %tracker.polling_url,
            state = %tracker.state,
            "tracker initialized"
        );
        Ok(tracker)
    }

    /// Reconstructs a tracker from a resume token.
    pub fn from_resume_token(token: ResumeToken) -> gax::Result<Self> {
        let polling_url = Url::parse(&token.polling_uri).map_err(Error::deser)?;
        let final_get_url = match token.result_uri.as_str() {
            "" => None,
            s => Some(Url::parse(s).map_err(Error::deser)?),
        };
        Ok(Self {
            verb: token.verb,
            rules: VerbRules::for_verb(token.verb),
            method: token.polling_method,
            polling_url,
            final_get_url,
            state: OperationState::parse(&token.lro_state),
            last_body: StatusBody::default(),
            last_error: token.error,
            last_response: None,
            fatal: None,
        })
    }

    /// Captures the state needed to resume polling.
    ///
    /// Trackers that detected a protocol violation cannot be resumed.
    pub fn resume_token(&self) -> Outcome<ResumeToken> {
        if let Some(e) = &self.fatal {
            return Err(e.clone());
        }
        Ok(ResumeToken {
            verb: self.verb,
            polling_method: self.method,
            polling_uri: self.polling_url.to_string(),
            lro_state: self.state.to_string(),
            result_uri: self
                .final_get_url
                .as_ref()
                .map(Url::to_string)
                .unwrap_or_default(),
            error: self.last_error.clone(),
        })
    }

    /// Updates the tracker using the response to a polling request.
    ///
    /// Protocol violations are permanent. Once one is detected this function
    /// returns the same error on every call.
    pub fn on_poll_response(&mut self, response: RawResponse) -> Outcome<()> {
        if let Some(e) = &self.fatal {
            return Err(e.clone());
        }
        if self.state.is_terminal() {
            return Ok(());
        }
        let result = self.update(&response);
        self.last_response = Some(response);
        match &result {
            Err(e) => {
                tracing::warn!(verb = %self.verb, method = %self.method, url = %self.polling_url, "protocol error while polling: {e}");
                self.fatal = Some(e.clone());
            }
            Ok(()) if self.state.is_terminal() => {
                tracing::info!(verb = %self.verb, state = %self.state, "the operation completed");
            }
            Ok(()) => {
                tracing::debug!(
                    method = %self.method,
                    url = %self.polling_url,
                    state = %self.state,
                    "the operation is still running"
                );
            }
        }
        result
    }

    fn update(&mut self, response: &RawResponse) -> Outcome<()> {
        let status = response.status();
        if !is_polling_code(status) {
            self.state = OperationState::Failed;
            self.last_error = Some(ServiceError::from_http_response(status, response.body()));
            return Ok(());
        }
        self.last_body = StatusBody::parse(response.body());
        self.last_error = None;
        self.check_for_errors()?;
        self.update_polling_state(status)?;
        if self.state.is_failed() {
            self.last_error = Some(ServiceError::from_http_response(status, response.body()));
            return Ok(());
        }
        if self.state.is_terminal() {
            return Ok(());
        }
        self.update_polling_method(response, false)
    }

    fn check_for_errors(&self) -> Outcome<()> {
        if self.method != PollingMethod::AsyncOperation {
            return Ok(());
        }
        if self.last_body.is_empty() {
            return Err(ProtocolError::EmptyAsyncOperationBody);
        }
        if self.last_body.status().is_none() {
            return Err(ProtocolError::MissingStatus);
        }
        Ok(())
    }

    fn update_polling_state(&mut self, status: StatusCode) -> Outcome<()> {
        if let (PollingMethod::AsyncOperation, Some(s)) = (self.method, self.last_body.status()) {
            self.state = OperationState::parse(s);
            return Ok(());
        }
        if status == StatusCode::ACCEPTED {
            self.state = OperationState::InProgress;
            return Ok(());
        }
        if self.rules.checks_provisioning_state(status) {
            self.state = self
                .last_body
                .provisioning_state()
                .map(OperationState::parse)
                .unwrap_or(OperationState::Succeeded);
            return Ok(());
        }
        Err(ProtocolError::InvalidStatusCode(status.as_u16()))
    }

    fn update_polling_method(&mut self, response: &RawResponse, initial: bool) -> Outcome<()> {
        if initial && self.rules.request_url_is_default {
            self.final_get_url = Some(response.url().clone());
            self.method = PollingMethod::RequestUri;
        }
        match response.status() {
            StatusCode::CREATED => self.update_from_created(response, initial),
            StatusCode::ACCEPTED => self.update_from_accepted(response, initial),
            _ => Ok(()),
        }
    }

    fn update_from_created(&mut self, response: &RawResponse, initial: bool) -> Outcome<()> {
        if !self.rules.created_requires_location {
            if let Some(url) = header_url(response, ASYNC_OPERATION)? {
                self.set_polling(url, PollingMethod::AsyncOperation);
            }
            return Ok(());
        }
        match header_url(response, LOCATION)? {
            Some(url) => {
                self.final_get_url = Some(url.clone());
                self.set_polling(url, PollingMethod::Location);
            }
            None if initial => return Err(ProtocolError::MissingLocation),
            None => {}
        }
        Ok(())
    }

    fn update_from_accepted(&mut self, response: &RawResponse, initial: bool) -> Outcome<()> {
        let async_operation = header_url(response, ASYNC_OPERATION)?;
        if let Some(url) = &async_operation {
            self.set_polling(url.clone(), PollingMethod::AsyncOperation);
        }
        let has_polling_url = async_operation.is_some() || !initial;
        if self.rules.location_is_final {
            // A malformed Location does not matter if there is a polling URL.
            let location = match header_url(response, LOCATION) {
                Ok(v) => v,
                Err(_) if has_polling_url => None,
                Err(e) => return Err(e),
            };
            match location {
                Some(url) => {
                    if async_operation.is_none() {
                        self.set_polling(url.clone(), PollingMethod::Location);
                    }
                    self.final_get_url = Some(url);
                }
                None if !has_polling_url => return Err(ProtocolError::NoPollingUrl),
                None => {}
            }
            return Ok(());
        }
        if async_operation.is_some() {
            return Ok(());
        }
        match header_url(response, LOCATION)? {
            Some(url) => self.set_polling(url, PollingMethod::Location),
            None if initial => return Err(ProtocolError::NoPollingUrl),
            None => {}
        }
        Ok(())
    }

    fn check_trigger_body(&self, trigger: &RawResponse) -> Outcome<()> {
        if !self.rules.body_required_without_headers || !self.last_body.is_empty() {
            return Ok(());
        }
        if header_url(trigger, ASYNC_OPERATION)?.is_none() && header_url(trigger, LOCATION)?.is_none()
        {
            return Err(ProtocolError::MissingBody);
        }
        Ok(())
    }

    fn apply_final_state_via(&mut self, via: FinalStateVia, trigger: &RawResponse) {
        let url = match via {
            FinalStateVia::AzureAsyncOperation => header_url(trigger, ASYNC_OPERATION).ok().flatten(),
            FinalStateVia::Location => header_url(trigger, LOCATION).ok().flatten(),
            FinalStateVia::OriginalUri => Some(trigger.url().clone()),
        };
        if let Some(url) = url {
            tracing::debug!(?via, %url, "final result URL overridden");
            self.final_get_url = Some(url);
        }
    }

    fn set_polling(&mut self, url: Url, method: PollingMethod) {
        if self.polling_url != url || self.method != method {
            tracing::debug!(%method, %url, "polling method updated");
        }
        self.polling_url = url;
        self.method = method;
    }

    /// The operation completed, or polling cannot continue.
    pub fn done(&self) -> bool {
        self.fatal.is_some() || self.state.is_terminal()
    }

    /// The operation reached the `Succeeded` state without protocol errors.
    pub fn has_succeeded(&self) -> bool {
        self.fatal.is_none() && self.state.is_succeeded()
    }

    /// The operation reached the `Failed` or `Canceled` state, or a polling
    /// request returned an error status code.
    pub fn has_failed(&self) -> bool {
        self.state.is_failed()
    }

    /// The HTTP method that started the operation.
    pub fn verb(&self) -> Verb {
        self.verb
    }

    /// The mechanism used to poll the operation.
    pub fn method(&self) -> PollingMethod {
        self.method
    }

    /// The URL for the next polling request.
    pub fn polling_url(&self) -> &Url {
        &self.polling_url
    }

    /// The URL of the final result.
    ///
    /// When `None` the result is read from the polling URL.
    pub fn final_get_url(&self) -> Option<&Url> {
        self.final_get_url.as_ref()
    }

    /// The last state reported by the service.
    pub fn state(&self) -> &OperationState {
        &self.state
    }

    /// The last response received, starting with the response that created
    /// the tracker. Resumed trackers have none until they poll.
    pub fn last_response(&self) -> Option<&RawResponse> {
        self.last_response.as_ref()
    }

    /// The protocol violation that stopped the tracker, if any.
    pub fn fatal(&self) -> Option<&ProtocolError> {
        self.fatal.as_ref()
    }

    /// The error reported by the service for a failed operation.
    ///
    /// Returns `None` unless the operation failed. Trackers resumed without
    /// error details report a synthetic error.
    pub fn service_error(&self) -> Option<ServiceError> {
        if !self.state.is_failed() {
            return None;
        }
        let error = self.last_error.clone().unwrap_or_else(|| {
            ServiceError::default()
                .set_code(self.state.as_str())
                .set_message(DEFAULT_MESSAGE)
        });
        Some(error)
    }

    /// The delay requested by the service in the `Retry-After` header of the
    /// last response.
    ///
    /// Only the delta-seconds form of the header is supported.
    pub fn retry_after(&self) -> Option<Duration> {
        self.last_response
            .as_ref()?
            .header_str(RETRY_AFTER)?
            .trim()
            .parse::<u64>()
            .ok()
            .map(Duration::from_secs)
    }
}

/// The status codes indicating the operation is running, or has completed.
pub(crate) fn is_polling_code(status: StatusCode) -> bool {
    matches!(
        status,
        StatusCode::OK | StatusCode::CREATED | StatusCode::ACCEPTED | StatusCode::NO_CONTENT
    )
}

/// Returns the URL in a polling header.
///
/// Missing and empty headers are not an error. Present headers must contain
/// absolute URLs.
pub(crate) fn header_url(response: &RawResponse, name: &'static str) -> Outcome<Option<Url>> {
    let Some(value) = response.headers().get(name) else {
        return Ok(None);
    };
    let invalid = |url: String, reason: String| ProtocolError::InvalidUrl {
        header: name,
        url,
        reason,
    };
    let value = value
        .to_str()
        .map_err(|e| invalid(format!("{value:?}"), e.to_string()))?;
    if value.is_empty() {
        return Ok(None);
    }
    let url = Url::parse(value).map_err(|e| invalid(value.to_string(), e.to_string()))?;
    if url.cannot_be_a_base() {
        return Err(invalid(value.to_string(), "the URL is not absolute".to_string()));
    }
    Ok(Some(url))
}
