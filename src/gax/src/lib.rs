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

//! Helpers shared by the long-running operation (LRO) libraries.
//!
//! This crate contains the error model, the raw HTTP response type, the
//! transport abstraction used to issue polling requests, and the policies that
//! control how long to wait between polling attempts.

/// An alias of [std::result::Result] where the error is always [crate::error::Error].
///
/// This is the result type used by all functions that talk to the service.
pub type Result<T> = std::result::Result<T, crate::error::Error>;

/// The core error types used by the LRO libraries.
pub mod error;

/// The raw HTTP response consumed by the polling engine.
pub mod response;

/// Defines the transport trait and a default implementation based on reqwest.
pub mod http_client;

pub mod polling_backoff_policy;
