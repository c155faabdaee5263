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

//! Defines the trait for polling backoff policies and a common implementation.
//!
//! The poller can automatically poll long-running operations (LROs) until
//! completion. When doing so it waits between polling attempts to avoid
//! overloading the service.
//!
//! Services may include a `Retry-After` header in their responses. The poller
//! always honors that header, the policies here are only consulted when the
//! header is missing.
//!
//! These policies should not be confused with retry backoff policies. Polling
//! backoff policies should not use jitter, the service has already accepted
//! the request and there is no thundering herd to avoid.
//!
//! # Example
//! ```
//! # use armlro_gax::polling_backoff_policy::*;
//! use std::time::{Duration, Instant};
//! let policy = FixedDelay::new(Duration::from_secs(10));
//! assert_eq!(policy.wait_period(Instant::now(), 3), Duration::from_secs(10));
//! ```

use std::sync::Arc;
use std::time::{Duration, Instant};

/// Defines the trait implemented by all polling backoff strategies.
pub trait PollingBackoffPolicy: Send + Sync + std::fmt::Debug {
    /// Returns the delay before the next polling attempt.
    ///
    /// # Parameters
    /// * `loop_start` - when the polling loop started.
    /// * `attempt_count` - the number of poll queries. This method is always
    ///   called after the first attempt.
    fn wait_period(&self, loop_start: Instant, attempt_count: u32) -> Duration;
}

/// Waits for the same amount of time between each polling attempt.
#[derive(Clone, Debug, PartialEq)]
pub struct FixedDelay {
    delay: Duration,
}

impl FixedDelay {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }
}

impl Default for FixedDelay {
    /// Polls every 30 seconds.
    fn default() -> Self {
        Self::new(Duration::from_secs(30))
    }
}

impl PollingBackoffPolicy for FixedDelay {
    fn wait_period(&self, _loop_start: Instant, _attempt_count: u32) -> Duration {
        self.delay
    }
}

/// A helper type to use [PollingBackoffPolicy] in poller options.
#[derive(Clone, Debug)]
pub struct PollingBackoffPolicyArg(pub(crate) Arc<dyn PollingBackoffPolicy>);

impl PollingBackoffPolicyArg {
    /// Returns the wrapped policy.
    pub fn into_inner(self) -> Arc<dyn PollingBackoffPolicy> {
        self.0
    }
}

impl<T: PollingBackoffPolicy + 'static> std::convert::From<T> for PollingBackoffPolicyArg {
    fn from(value: T) -> Self {
        Self(Arc::new(value))
    }
}

impl std::convert::From<Arc<dyn PollingBackoffPolicy>> for PollingBackoffPolicyArg {
    fn from(value: Arc<dyn PollingBackoffPolicy>) -> Self {
        Self(value)
    }
}
