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

/// Violations of the long-running operation protocol.
///
/// The poller wraps these in [Error::protocol][gax::error::Error::protocol].
/// Applications can recover the details using the error source:
///
/// ```
/// # use armlro::ProtocolError;
/// use std::error::Error as _;
/// fn is_missing_location(e: &gax::error::Error) -> bool {
///     e.source()
///         .and_then(|s| s.downcast_ref::<ProtocolError>())
///         .is_some_and(|p| matches!(p, ProtocolError::MissingLocation))
/// }
/// ```
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
#[non_exhaustive]
pub enum ProtocolError {
    /// A `201 Created` response to a DELETE or POST request must include a
    /// `Location` header.
    #[error("missing Location header in 201 response")]
    MissingLocation,

    /// A `202 Accepted` response did not include any usable polling header.
    #[error("didn't get any suitable polling URLs in 202 response")]
    NoPollingUrl,

    /// A PUT response without polling headers must include the resource.
    #[error("the response did not contain a body")]
    MissingBody,

    #[error("the response from the Azure-AsyncOperation endpoint has an empty body")]
    EmptyAsyncOperationBody,

    #[error("the response from the Azure-AsyncOperation endpoint is missing the status field")]
    MissingStatus,

    /// The status code cannot be used to determine the operation state.
    #[error("the response from the async operation has an invalid status code {0}")]
    InvalidStatusCode(u16),

    /// A polling header is not an absolute URL.
    #[error("invalid polling URL in the {header} header ({url:?}): {reason}")]
    InvalidUrl {
        header: &'static str,
        url: String,
        reason: String,
    },

    /// Only DELETE, PATCH, POST, and PUT start long-running operations.
    #[error("the {0} method does not start long-running operations")]
    UnsupportedMethod(String),
}
