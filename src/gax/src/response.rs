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

//! Response types.
//!
//! The polling engine works with raw HTTP responses: it needs the status code,
//! the headers, and the body bytes to decide how to continue polling. It also
//! needs to know which request produced the response, so this type records the
//! request method and URL.
//!
//! # Examples
//!
//! Creating a response for mocks
//!
//! ```
//! # use armlro_gax::response::RawResponse;
//! use http::{HeaderName, HeaderValue};
//! let url = url::Url::parse("https://management.example.com/resource?api-version=1")?;
//! let response = RawResponse::new(http::Method::PUT, url)
//!     .set_status(http::StatusCode::CREATED)
//!     .set_header(
//!         HeaderName::from_static("azure-asyncoperation"),
//!         HeaderValue::from_static("https://management.example.com/op/1"),
//!     )
//!     .set_body(r#"{"properties": {"provisioningState": "Creating"}}"#);
//! assert_eq!(response.status(), http::StatusCode::CREATED);
//! # Ok::<(), url::ParseError>(())
//! ```

use bytes::Bytes;
use http::{HeaderMap, HeaderName, HeaderValue, Method, StatusCode};
use url::Url;

/// An HTTP response and the request that produced it.
///
/// The application creates one of these from the response to the request that
/// starts a long-running operation. The [HttpClient][crate::http_client::HttpClient]
/// returns one for each polling request.
#[derive(Clone, Debug, PartialEq)]
pub struct RawResponse {
    method: Method,
    url: Url,
    status: StatusCode,
    headers: HeaderMap,
    body: Bytes,
}

impl RawResponse {
    /// Creates an empty `200 OK` response for a request.
    pub fn new(method: Method, url: Url) -> Self {
        Self {
            method,
            url,
            status: StatusCode::OK,
            headers: HeaderMap::new(),
            body: Bytes::new(),
        }
    }

    /// The method of the request that produced this response.
    pub fn method(&self) -> &Method {
        &self.method
    }

    /// The URL of the request that produced this response.
    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn body(&self) -> &Bytes {
        &self.body
    }

    /// Returns the value of a header as a string.
    ///
    /// Header names are case-insensitive. Values that are not valid visible
    /// ASCII are treated as missing.
    pub fn header_str(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// Sets the status code.
    pub fn set_status(mut self, v: StatusCode) -> Self {
        self.status = v;
        self
    }

    /// Replaces all the headers.
    pub fn set_headers(mut self, v: HeaderMap) -> Self {
        self.headers = v;
        self
    }

    /// Adds a single header, replacing any previous values.
    pub fn set_header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    /// Sets the body.
    pub fn set_body<T: Into<Bytes>>(mut self, v: T) -> Self {
        self.body = v.into();
        self
    }

    /// Consumes the response and returns its parts.
    pub fn into_parts(self) -> (StatusCode, HeaderMap, Bytes) {
        (self.status, self.headers, self.body)
    }
}
