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

use http::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// The message used when the service did not describe the failure.
pub const DEFAULT_MESSAGE: &str = "The async operation failed.";

/// The error payload returned by Azure Resource Manager style services.
///
/// Services report failures using a JSON object, either at the top-level of
/// the response body or wrapped in an `error` field:
///
/// ```json
/// { "error": { "code": "Conflict", "message": "the resource is busy" } }
/// ```
///
/// The polling engine extracts this object on a best-effort basis. When the
/// payload cannot be parsed, or does not include a `code`, the engine
/// substitutes a synthetic error whose `code` is the HTTP status line and
/// whose `additional_info` includes whatever JSON object the body contained.
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
#[non_exhaustive]
pub struct ServiceError {
    /// The error code, e.g. `Conflict`, or the HTTP status line for synthetic
    /// errors.
    pub code: String,

    /// A developer-facing error message.
    pub message: String,

    /// The target of the error, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,

    /// Nested error details, kept as opaque JSON.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub details: Vec<Value>,

    /// Additional, service specific, information about the error.
    #[serde(skip_serializing_if = "Map::is_empty")]
    pub inner_error: Map<String, Value>,

    /// Additional information. Synthetic errors store the response body here.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub additional_info: Vec<Value>,
}

impl ServiceError {
    /// Sets the value of [code][ServiceError::code].
    pub fn set_code<T: Into<String>>(mut self, v: T) -> Self {
        self.code = v.into();
        self
    }

    /// Sets the value of [message][ServiceError::message].
    pub fn set_message<T: Into<String>>(mut self, v: T) -> Self {
        self.message = v.into();
        self
    }

    /// Extracts the service error from a response.
    ///
    /// This never fails. If the payload does not contain a usable error object
    /// the function returns a synthetic error carrying the HTTP status line.
    ///
    /// # Example
    /// ```
    /// use armlro_gax::error::service::ServiceError;
    /// let body = br#"{"error": {"code": "Conflict", "message": "busy"}}"#;
    /// let error = ServiceError::from_http_response(http::StatusCode::CONFLICT, body);
    /// assert_eq!(error.code, "Conflict");
    ///
    /// let error = ServiceError::from_http_response(http::StatusCode::BAD_GATEWAY, b"<html/>");
    /// assert_eq!(error.code, "502 Bad Gateway");
    /// ```
    pub fn from_http_response(status: StatusCode, payload: &[u8]) -> Self {
        match Self::parse(payload) {
            Ok(Some(error)) => error,
            Ok(None) => Self::synthetic(status, payload, None),
            Err(problem) => Self::synthetic(status, payload, Some(problem)),
        }
    }

    fn parse(payload: &[u8]) -> serde_json::Result<Option<Self>> {
        if payload.is_empty() {
            return Ok(None);
        }
        let value = serde_json::from_slice::<Value>(payload)?;
        let error = match value {
            Value::Object(mut object) => match object.remove("error") {
                Some(inner @ Value::Object(_)) => serde_json::from_value::<Self>(inner)?,
                // Not wrapped, try to use the top-level object.
                _ => serde_json::from_value::<Self>(Value::Object(object))?,
            },
            other => serde_json::from_value::<Self>(other)?,
        };
        if error.code.is_empty() {
            return Ok(None);
        }
        Ok(Some(error))
    }

    fn synthetic(status: StatusCode, payload: &[u8], problem: Option<serde_json::Error>) -> Self {
        let code = match status.canonical_reason() {
            Some(reason) => format!("{} {reason}", status.as_u16()),
            None => status.as_u16().to_string(),
        };
        let mut inner_error = Map::new();
        if let Some(p) = problem {
            inner_error.insert("unmarshalError".to_string(), Value::String(p.to_string()));
        }
        let additional_info = serde_json::from_slice::<Value>(payload)
            .ok()
            .filter(|v| v.as_object().is_some_and(|o| !o.is_empty()))
            .into_iter()
            .collect();
        Self {
            code,
            message: DEFAULT_MESSAGE.to_string(),
            inner_error,
            additional_info,
            ..Default::default()
        }
    }
}

impl std::fmt::Display for ServiceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "code={}, message={}", self.code, self.message)?;
        if let Some(t) = &self.target {
            write!(f, ", target={t}")?;
        }
        Ok(())
    }
}
