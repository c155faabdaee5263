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

use crate::ProtocolError;
use serde::{Deserialize, Serialize};

/// The state of a long-running operation as reported by the service.
///
/// Services report the state as a free-form string. The poller recognizes a
/// small set of values, comparing them case-insensitively. Any other value is
/// preserved verbatim and treated as "still running".
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum OperationState {
    InProgress,
    Succeeded,
    Failed,
    Canceled,
    /// A service-specific, non-terminal state, such as `Creating` or `Updating`.
    Other(String),
}

impl OperationState {
    const IN_PROGRESS: &'static str = "InProgress";
    const SUCCEEDED: &'static str = "Succeeded";
    const FAILED: &'static str = "Failed";
    const CANCELED: &'static str = "Canceled";

    /// Parses a state reported by the service.
    ///
    /// # Example
    /// ```
    /// # use armlro::OperationState;
    /// assert_eq!(OperationState::parse("succeeded"), OperationState::Succeeded);
    /// assert_eq!(
    ///     OperationState::parse("Creating"),
    ///     OperationState::Other("Creating".into())
    /// );
    /// ```
    pub fn parse(value: &str) -> Self {
        [
            (Self::IN_PROGRESS, Self::InProgress),
            (Self::SUCCEEDED, Self::Succeeded),
            (Self::FAILED, Self::Failed),
            (Self::CANCELED, Self::Canceled),
        ]
        .into_iter()
        .find(|(name, _)| name.eq_ignore_ascii_case(value))
        .map(|(_, state)| state)
        .unwrap_or_else(|| Self::Other(value.to_string()))
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::InProgress => Self::IN_PROGRESS,
            Self::Succeeded => Self::SUCCEEDED,
            Self::Failed => Self::FAILED,
            Self::Canceled => Self::CANCELED,
            Self::Other(s) => s.as_str(),
        }
    }

    /// The operation completed, successfully or not.
    pub fn is_terminal(&self) -> bool {
        self.is_succeeded() || self.is_failed()
    }

    pub fn is_succeeded(&self) -> bool {
        match self {
            Self::Succeeded => true,
            Self::InProgress | Self::Failed | Self::Canceled | Self::Other(_) => false,
        }
    }

    /// The operation failed or was canceled.
    pub fn is_failed(&self) -> bool {
        match self {
            Self::Failed | Self::Canceled => true,
            Self::InProgress | Self::Succeeded | Self::Other(_) => false,
        }
    }
}

impl From<String> for OperationState {
    fn from(value: String) -> Self {
        Self::parse(&value)
    }
}

impl From<OperationState> for String {
    fn from(value: OperationState) -> Self {
        match value {
            OperationState::Other(s) => s,
            s => s.as_str().to_string(),
        }
    }
}

impl std::fmt::Display for OperationState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The mechanism used to poll a long-running operation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum PollingMethod {
    /// Poll the URL in the `Azure-AsyncOperation` header, its body has a
    /// `status` field.
    AsyncOperation,
    /// Poll the URL in the `Location` header.
    Location,
    /// Poll the URL of the original request.
    #[serde(rename = "RequestURI")]
    RequestUri,
    /// The method has not been determined yet.
    #[default]
    #[serde(rename = "")]
    Unknown,
}

impl std::fmt::Display for PollingMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::AsyncOperation => "AsyncOperation",
            Self::Location => "Location",
            Self::RequestUri => "RequestURI",
            Self::Unknown => "",
        };
        f.write_str(name)
    }
}

/// The HTTP methods that can start a long-running operation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Verb {
    Delete,
    Patch,
    Post,
    Put,
}

impl Verb {
    pub fn as_method(&self) -> http::Method {
        match self {
            Self::Delete => http::Method::DELETE,
            Self::Patch => http::Method::PATCH,
            Self::Post => http::Method::POST,
            Self::Put => http::Method::PUT,
        }
    }
}

impl TryFrom<&http::Method> for Verb {
    type Error = ProtocolError;

    fn try_from(value: &http::Method) -> Result<Self, Self::Error> {
        match *value {
            http::Method::DELETE => Ok(Self::Delete),
            http::Method::PATCH => Ok(Self::Patch),
            http::Method::POST => Ok(Self::Post),
            http::Method::PUT => Ok(Self::Put),
            _ => Err(ProtocolError::UnsupportedMethod(value.to_string())),
        }
    }
}

impl std::fmt::Display for Verb {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_method().as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case("InProgress", OperationState::InProgress; "in progress")]
    #[test_case("inprogress", OperationState::InProgress; "in progress lowercase")]
    #[test_case("Succeeded", OperationState::Succeeded; "succeeded")]
    #[test_case("SUCCEEDED", OperationState::Succeeded; "succeeded uppercase")]
    #[test_case("failed", OperationState::Failed; "failed lowercase")]
    #[test_case("Canceled", OperationState::Canceled; "canceled")]
    #[test_case("canceled", OperationState::Canceled; "canceled lowercase")]
    #[test_case("Creating", OperationState::Other("Creating".into()); "service specific")]
    #[test_case("Cancelled", OperationState::Other("Cancelled".into()); "british spelling")]
    #[test_case("", OperationState::Other(String::new()); "empty")]
    fn parse(input: &str, want: OperationState) {
        assert_eq!(OperationState::parse(input), want);
    }

    #[test_case("Succeeded"; "succeeded")]
    #[test_case("succeeded"; "succeeded lowercase")]
    #[test_case("Failed"; "failed")]
    #[test_case("FAILED"; "failed uppercase")]
    #[test_case("Canceled"; "canceled")]
    #[test_case("canceled"; "canceled lowercase")]
    #[test_case("InProgress"; "in progress")]
    #[test_case("Accepted"; "accepted")]
    #[test_case("Deleting"; "deleting")]
    #[test_case(""; "empty")]
    fn terminal_identity(input: &str) {
        let state = OperationState::parse(input);
        assert_eq!(
            state.is_terminal(),
            state.is_succeeded() || state.is_failed(),
            "{state:?}"
        );
        assert!(!(state.is_succeeded() && state.is_failed()), "{state:?}");
        let recognized = ["succeeded", "failed", "canceled"]
            .iter()
            .any(|s| s.eq_ignore_ascii_case(input));
        assert_eq!(state.is_terminal(), recognized, "{state:?}");
    }

    #[test]
    fn state_serde() -> anyhow::Result<()> {
        let got = serde_json::to_value(OperationState::Canceled)?;
        assert_eq!(got, serde_json::json!("Canceled"));
        let got = serde_json::to_value(OperationState::Other("Updating".into()))?;
        assert_eq!(got, serde_json::json!("Updating"));
        let got = serde_json::from_value::<OperationState>(serde_json::json!("succeeded"))?;
        assert_eq!(got, OperationState::Succeeded);
        Ok(())
    }

    #[test_case(PollingMethod::AsyncOperation, "AsyncOperation")]
    #[test_case(PollingMethod::Location, "Location")]
    #[test_case(PollingMethod::RequestUri, "RequestURI")]
    #[test_case(PollingMethod::Unknown, "")]
    fn polling_method_serde(input: PollingMethod, want: &str) -> anyhow::Result<()> {
        let got = serde_json::to_value(input)?;
        assert_eq!(got, serde_json::json!(want));
        assert_eq!(input.to_string(), want);
        let got = serde_json::from_value::<PollingMethod>(serde_json::json!(want))?;
        assert_eq!(got, input);
        Ok(())
    }

    #[test_case(http::Method::DELETE, Verb::Delete)]
    #[test_case(http::Method::PATCH, Verb::Patch)]
    #[test_case(http::Method::POST, Verb::Post)]
    #[test_case(http::Method::PUT, Verb::Put)]
    fn verb_from_method(input: http::Method, want: Verb) -> anyhow::Result<()> {
        let got = Verb::try_from(&input)?;
        assert_eq!(got, want);
        assert_eq!(got.as_method(), input);
        assert_eq!(got.to_string(), input.as_str());
        assert_eq!(serde_json::to_value(got)?, serde_json::json!(input.as_str()));
        Ok(())
    }

    #[test]
    fn verb_unsupported() {
        let got = Verb::try_from(&http::Method::GET);
        assert_eq!(got, Err(ProtocolError::UnsupportedMethod("GET".into())));
    }
}
