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

mod core_error;
pub use core_error::*;

/// Errors and error details returned by the service.
///
/// The LRO libraries distinguish between errors detected while trying to send
/// a request (e.g. cannot open a connection), errors in the polling protocol
/// itself (e.g. a malformed `Location` header), and errors returned by the
/// service (e.g. the operation reached the `Failed` state).
///
/// The types in this module represent the detailed information returned by
/// the service.
///
/// # Examples
///
/// ```
/// use armlro_gax::error::Error;
/// fn handle_error(e: Error) {
///     if let Some(details) = e.service_error() {
///         println!("the service reported {} - {}", details.code, details.message)
///     }
/// }
/// ```
pub mod service;
