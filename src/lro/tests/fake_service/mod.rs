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

//! Helpers to simulate an ARM service with `httptest`.
//!
//! The library never sends the request that starts the operation, the
//! application does. These helpers synthesize that first response, pointing
//! its headers at the fake service.

use gax::http_client::{HttpClient, ReqwestClient};
use gax::response::RawResponse;
use http::{HeaderName, HeaderValue, Method, StatusCode};
use httptest::Server;
use lro::PollerOptions;
use std::sync::Arc;
use std::time::Duration;
use url::Url;

pub const RESOURCE: &str = "/subscriptions/s/resourceGroups/g/providers/Test.Fake/resources/r1";
pub const OPERATION: &str = "/subscriptions/s/providers/Test.Fake/operations/op1";
pub const LOCATION: &str = "/subscriptions/s/providers/Test.Fake/locations/loc1";

#[derive(Debug, Default, PartialEq, serde::Deserialize)]
pub struct Resource {
    pub name: String,
}

pub fn url(server: &Server, path: &str) -> anyhow::Result<Url> {
    Ok(Url::parse(&server.url_str(path))?)
}

pub struct Trigger {
    response: RawResponse,
}

impl Trigger {
    pub fn new(method: Method, url: Url, status: u16) -> anyhow::Result<Self> {
        let response = RawResponse::new(method, url).set_status(StatusCode::from_u16(status)?);
        Ok(Self { response })
    }

    pub fn async_operation(self, url: &Url) -> anyhow::Result<Self> {
        self.header("azure-asyncoperation", url.as_str())
    }

    pub fn location(self, url: &Url) -> anyhow::Result<Self> {
        self.header("location", url.as_str())
    }

    pub fn header(self, name: &'static str, value: &str) -> anyhow::Result<Self> {
        let response = self
            .response
            .set_header(HeaderName::from_static(name), HeaderValue::from_str(value)?);
        Ok(Self { response })
    }

    pub fn body(self, body: serde_json::Value) -> Self {
        Self {
            response: self.response.set_body(body.to_string()),
        }
    }

    pub fn build(self) -> RawResponse {
        self.response
    }
}

pub fn client() -> Arc<dyn HttpClient> {
    Arc::new(
        ReqwestClient::builder()
            .with_timeout(Duration::from_secs(5))
            .build(),
    )
}

pub fn options() -> PollerOptions {
    PollerOptions::default().with_frequency(Duration::from_millis(10))
}
