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

use gax::polling_backoff_policy::{FixedDelay, PollingBackoffPolicy, PollingBackoffPolicyArg};
use std::sync::Arc;
use std::time::Duration;

/// The default time between polling attempts.
pub const DEFAULT_FREQUENCY: Duration = Duration::from_secs(30);

/// Where to find the final result of a long-running operation.
///
/// Some services document where the result is available once the operation
/// completes, overriding the rules for each HTTP method. The override only
/// applies if the response that started the operation includes the named URL.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FinalStateVia {
    /// Fetch the result from the URL in the `Azure-AsyncOperation` header.
    AzureAsyncOperation,
    /// Fetch the result from the URL in the `Location` header.
    Location,
    /// Fetch the result from the URL of the original request.
    OriginalUri,
}

/// Configures a [Poller][crate::Poller].
///
/// # Example
/// ```
/// # use armlro::{FinalStateVia, PollerOptions};
/// use std::time::Duration;
/// let options = PollerOptions::default()
///     .with_frequency(Duration::from_secs(5))
///     .with_final_state_via(FinalStateVia::Location)
///     .with_polling_duration(Duration::from_secs(600));
/// ```
#[derive(Clone, Debug, Default)]
pub struct PollerOptions {
    frequency: Option<Duration>,
    backoff_policy: Option<Arc<dyn PollingBackoffPolicy>>,
    final_state_via: Option<FinalStateVia>,
    polling_duration: Option<Duration>,
}

impl PollerOptions {
    /// Sets the time between polling attempts.
    ///
    /// A `Retry-After` header in the service response takes precedence.
    pub fn with_frequency(mut self, v: Duration) -> Self {
        self.frequency = Some(v);
        self
    }

    /// Sets the policy to compute the time between polling attempts.
    ///
    /// This takes precedence over [with_frequency][Self::with_frequency].
    pub fn with_polling_backoff_policy<V: Into<PollingBackoffPolicyArg>>(mut self, v: V) -> Self {
        self.backoff_policy = Some(v.into().into_inner());
        self
    }

    /// Overrides where to find the final result of the operation.
    pub fn with_final_state_via(mut self, v: FinalStateVia) -> Self {
        self.final_state_via = Some(v);
        self
    }

    /// Limits how long the poller waits for the operation to complete.
    ///
    /// Once this time elapses the poller returns a timeout error. The
    /// operation may still complete in the service.
    pub fn with_polling_duration(mut self, v: Duration) -> Self {
        self.polling_duration = Some(v);
        self
    }

    pub fn final_state_via(&self) -> Option<FinalStateVia> {
        self.final_state_via
    }

    pub fn polling_duration(&self) -> Option<Duration> {
        self.polling_duration
    }

    pub(crate) fn backoff_policy(&self) -> Arc<dyn PollingBackoffPolicy> {
        self.backoff_policy.clone().unwrap_or_else(|| {
            Arc::new(FixedDelay::new(
                self.frequency.unwrap_or(DEFAULT_FREQUENCY),
            ))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;

    #[test]
    fn defaults() {
        let options = PollerOptions::default();
        assert_eq!(options.final_state_via(), None);
        assert_eq!(options.polling_duration(), None);
        let policy = options.backoff_policy();
        assert_eq!(policy.wait_period(Instant::now(), 1), DEFAULT_FREQUENCY);
    }

    #[test]
    fn frequency() {
        let options = PollerOptions::default().with_frequency(Duration::from_secs(2));
        let policy = options.backoff_policy();
        assert_eq!(policy.wait_period(Instant::now(), 1), Duration::from_secs(2));
    }

    #[test]
    fn backoff_policy_wins() {
        let options = PollerOptions::default()
            .with_polling_backoff_policy(FixedDelay::new(Duration::from_millis(10)))
            .with_frequency(Duration::from_secs(2));
        let policy = options.backoff_policy();
        assert_eq!(
            policy.wait_period(Instant::now(), 1),
            Duration::from_millis(10)
        );
    }

    #[test]
    fn setters() {
        let options = PollerOptions::default()
            .with_final_state_via(FinalStateVia::OriginalUri)
            .with_polling_duration(Duration::from_secs(60));
        assert_eq!(options.final_state_via(), Some(FinalStateVia::OriginalUri));
        assert_eq!(options.polling_duration(), Some(Duration::from_secs(60)));
    }
}
