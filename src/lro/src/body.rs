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

use serde::Deserialize;
use serde_json::Value;

/// The fields of a response body used to track an operation.
///
/// Bodies are decoded once per response. Anything that is not a JSON object
/// (including an empty body) is treated as an empty object.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct StatusBody {
    empty: bool,
    status: Option<String>,
    provisioning_state: Option<String>,
}

// Each field is narrowed on its own, a field with an unexpected type must not
// hide the other.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Schema {
    status: Option<Value>,
    properties: Option<Value>,
}

impl StatusBody {
    pub fn parse(payload: &[u8]) -> Self {
        let object = match serde_json::from_slice::<Value>(payload) {
            Ok(Value::Object(o)) => o,
            _ => return Self::empty(),
        };
        let empty = object.is_empty();
        let schema = Schema::deserialize(Value::Object(object)).unwrap_or_default();
        let string = |v: Option<&Value>| {
            v.and_then(Value::as_str)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
        };
        let provisioning_state = schema
            .properties
            .as_ref()
            .and_then(|p| p.get("provisioningState"));
        Self {
            empty,
            status: string(schema.status.as_ref()),
            provisioning_state: string(provisioning_state),
        }
    }

    fn empty() -> Self {
        Self {
            empty: true,
            ..Default::default()
        }
    }

    /// The body was missing, was not a JSON object, or was an object without
    /// fields.
    pub fn is_empty(&self) -> bool {
        self.empty
    }

    /// The top-level `status` field, used by `Azure-AsyncOperation` endpoints.
    pub fn status(&self) -> Option<&str> {
        self.status.as_deref()
    }

    /// The `properties.provisioningState` field of a resource.
    pub fn provisioning_state(&self) -> Option<&str> {
        self.provisioning_state.as_deref()
    }
}
