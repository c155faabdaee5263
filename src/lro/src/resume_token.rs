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

//! Resume tokens capture the state of a poller so it can be reconstructed
//! later, possibly in a different process.
//!
//! The token is a JSON object with a fixed schema:
//!
//! | Field           | Contents                                                  |
//! |-----------------|-----------------------------------------------------------|
//! | `method`        | The HTTP method that started the operation, e.g. `PUT`.   |
//! | `pollingMethod` | `AsyncOperation`, `Location`, `RequestURI`, or empty.     |
//! | `pollingURI`    | The URL of the next polling request.                      |
//! | `lroState`      | The last state reported by the service.                   |
//! | `resultURI`     | The URL of the final result, may be empty.                |
//! | `error`         | Optional, the error reported by the service.              |
//!
//! This schema is independent of the internal representation of the poller.
//! Changes to the poller must keep accepting tokens in this format.

use crate::state::{PollingMethod, Verb};
use gax::Result;
use gax::error::Error;
use gax::error::service::ServiceError;
use serde::{Deserialize, Serialize};

/// A snapshot of the poller state.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ResumeToken {
    #[serde(rename = "method")]
    pub verb: Verb,
    #[serde(rename = "pollingMethod")]
    pub polling_method: PollingMethod,
    #[serde(rename = "pollingURI")]
    pub polling_uri: String,
    #[serde(rename = "lroState")]
    pub lro_state: String,
    #[serde(rename = "resultURI")]
    pub result_uri: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<ServiceError>,
}

impl ResumeToken {
    /// Serializes the token.
    pub fn encode(&self) -> Result<String> {
        serde_json::to_string(self).map_err(Error::ser)
    }

    /// Parses a token created by [encode][ResumeToken::encode].
    pub fn decode(token: &str) -> Result<Self> {
        serde_json::from_str(token).map_err(Error::deser)
    }
}
