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

use super::service::ServiceError;
use http::HeaderMap;
use std::error::Error as StdError;

type BoxError = Box<dyn StdError + Send + Sync>;

/// The core error returned by the LRO libraries.
///
/// Polling a long-running operation can fail for several different reasons.
/// The transport may be unable to reach the service, the service may answer
/// with a response that violates the polling protocol, the operation itself
/// may fail or be canceled, or the application may cancel the polling loop.
///
/// Most applications will just return the error or log it, without any further
/// action. However, some applications may need to interrogate the error
/// details. This type offers a series of predicates to determine the error
/// kind. The type also offers accessors to query the most common error details.
/// Applications can query the error [source][std::error::Error::source] for
/// deeper information.
///
/// # Example
/// ```
/// use armlro_gax::error::Error;
/// match example_function() {
///     Err(e) if e.service_error().is_some() => {
///         println!("the operation failed {e}");
///     },
///     Err(e) if e.is_io() => { println!("cannot reach the service {e}, try again"); },
///     Err(e) => { println!("some other error {e}"); },
///     Ok(_) => { println!("success, how boring"); },
/// }
///
/// fn example_function() -> Result<String, Error> {
///     // ... details omitted ...
///     # use armlro_gax::error::service::ServiceError;
///     # Err(Error::service(ServiceError::default().set_code("Conflict").set_message("busy")))
/// }
/// ```
#[derive(Debug)]
pub struct Error {
    kind: ErrorKind,
    source: Option<BoxError>,
}

impl Error {
    /// Creates an error with the information returned by the service.
    ///
    /// # Example
    /// ```
    /// use armlro_gax::error::Error;
    /// use armlro_gax::error::service::ServiceError;
    /// let details = ServiceError::default().set_code("Conflict").set_message("busy");
    /// let error = Error::service(details.clone());
    /// assert_eq!(error.service_error(), Some(&details));
    /// ```
    pub fn service(error: ServiceError) -> Self {
        let details = ServiceDetails {
            error,
            status_code: None,
            headers: None,
        };
        Self {
            kind: ErrorKind::Service(Box::new(details)),
            source: None,
        }
    }

    /// Creates a service error including transport metadata.
    pub fn service_with_http_metadata(
        error: ServiceError,
        status_code: Option<u16>,
        headers: Option<HeaderMap>,
    ) -> Self {
        let details = ServiceDetails {
            error,
            status_code,
            headers,
        };
        Self {
            kind: ErrorKind::Service(Box::new(details)),
            source: None,
        }
    }

    /// The [ServiceError] payload associated with this error.
    ///
    /// The service reports this error when the long-running operation reached
    /// the `Failed` or `Canceled` states, or when a polling request returned
    /// an unexpected HTTP status code.
    ///
    /// # Troubleshooting
    ///
    /// As this error is created by the service, troubleshooting typically
    /// involves reading the service documentation for the reported `code`.
    pub fn service_error(&self) -> Option<&ServiceError> {
        match &self.kind {
            ErrorKind::Service(d) => Some(&d.error),
            _ => None,
        }
    }

    /// Creates an error representing a violation of the polling protocol.
    ///
    /// # Example
    /// ```
    /// use armlro_gax::error::Error;
    /// let error = Error::protocol("missing Location header in 201 response");
    /// assert!(error.is_protocol());
    /// ```
    pub fn protocol<T: Into<BoxError>>(source: T) -> Self {
        Self {
            kind: ErrorKind::Protocol,
            source: Some(source.into()),
        }
    }

    /// The service response violated the long-running operation protocol.
    ///
    /// These errors are fatal. Polling the same operation again returns the
    /// same error.
    ///
    /// # Troubleshooting
    ///
    /// The most common causes are a missing or malformed `Location` or
    /// `Azure-AsyncOperation` header, or a status endpoint that does not
    /// return a `status` field. Use the error [source][StdError::source] to
    /// find the exact problem.
    pub fn is_protocol(&self) -> bool {
        matches!(self.kind, ErrorKind::Protocol)
    }

    /// Creates an error representing a timeout.
    ///
    /// # Example
    /// ```
    /// use std::error::Error as _;
    /// use armlro_gax::error::Error;
    /// let error = Error::timeout("simulated timeout");
    /// assert!(error.is_timeout());
    /// assert!(error.source().is_some());
    /// ```
    pub fn timeout<T: Into<BoxError>>(source: T) -> Self {
        Self {
            kind: ErrorKind::Timeout,
            source: Some(source.into()),
        }
    }

    /// The request, or the polling loop, did not complete before its deadline.
    ///
    /// This is always a client-side generated error. The long-running
    /// operation may still complete in the service.
    pub fn is_timeout(&self) -> bool {
        matches!(self.kind, ErrorKind::Timeout)
    }

    /// Creates an error representing a cancelled polling loop.
    pub fn cancelled() -> Self {
        Self {
            kind: ErrorKind::Cancelled,
            source: None,
        }
    }

    /// The application cancelled the polling loop.
    ///
    /// The long-running operation is not affected. The application may resume
    /// polling, for example, using a resume token.
    pub fn is_cancelled(&self) -> bool {
        matches!(self.kind, ErrorKind::Cancelled)
    }

    /// Creates an error representing a deserialization problem.
    ///
    /// # Example
    /// ```
    /// use std::error::Error as _;
    /// use armlro_gax::error::Error;
    /// let error = Error::deser("simulated problem");
    /// assert!(error.is_deserialization());
    /// assert!(error.source().is_some());
    /// ```
    pub fn deser<T: Into<BoxError>>(source: T) -> Self {
        Self {
            kind: ErrorKind::Deserialization,
            source: Some(source.into()),
        }
    }

    /// The final result, or a resume token, could not be deserialized.
    ///
    /// # Troubleshooting
    ///
    /// Verify the resume token was produced by a poller for the same
    /// operation, and that the result type matches the service response.
    pub fn is_deserialization(&self) -> bool {
        matches!(self.kind, ErrorKind::Deserialization)
    }

    /// Creates an error representing a serialization problem.
    pub fn ser<T: Into<BoxError>>(source: T) -> Self {
        Self {
            kind: ErrorKind::Serialization,
            source: Some(source.into()),
        }
    }

    /// The resume token could not be serialized.
    pub fn is_serialization(&self) -> bool {
        matches!(self.kind, ErrorKind::Serialization)
    }

    /// A problem in the transport layer.
    ///
    /// Examples include: a broken connection after the request is sent, or a
    /// failure to read the response body.
    pub fn io<T: Into<BoxError>>(source: T) -> Self {
        Self {
            kind: ErrorKind::Transport,
            source: Some(source.into()),
        }
    }

    /// A problem in the transport layer.
    ///
    /// # Troubleshooting
    ///
    /// This indicates a problem completing the request. The polling state is
    /// not modified, and it is safe to poll again.
    pub fn is_io(&self) -> bool {
        matches!(&self.kind, ErrorKind::Transport)
    }

    /// The HTTP status code, if any, associated with this error.
    pub fn http_status_code(&self) -> Option<u16> {
        match &self.kind {
            ErrorKind::Service(d) => d.status_code,
            _ => None,
        }
    }

    /// The headers, if any, associated with this error.
    pub fn http_headers(&self) -> Option<&http::HeaderMap> {
        match &self.kind {
            ErrorKind::Service(d) => d.headers.as_ref(),
            _ => None,
        }
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match (&self.kind, &self.source) {
            (ErrorKind::Protocol, Some(e)) => {
                write!(f, "the long-running operation protocol was violated: {e}")
            }
            (ErrorKind::Serialization, Some(e)) => write!(f, "cannot serialize the poller {e}"),
            (ErrorKind::Deserialization, Some(e)) => {
                write!(f, "cannot deserialize the response {e}")
            }
            (ErrorKind::Timeout, Some(e)) => {
                write!(f, "the request exceeded the deadline {e}")
            }
            (ErrorKind::Cancelled, _) => write!(f, "polling was cancelled by the application"),
            (ErrorKind::Transport, Some(e)) => write!(f, "the transport reports an error: {e}"),
            (ErrorKind::Service(d), _) => {
                write!(
                    f,
                    "the service reports an error with code {} described as: {}",
                    d.error.code, d.error.message
                )
            }
            (_, None) => unreachable!("no constructor allows this"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_ref()
            .map(|e| e.as_ref() as &(dyn std::error::Error))
    }
}

/// The type of error held by an [Error] instance.
#[derive(Debug)]
enum ErrorKind {
    Protocol,
    Serialization,
    Deserialization,
    Timeout,
    Cancelled,
    Transport,
    Service(Box<ServiceDetails>),
}

#[derive(Debug)]
struct ServiceDetails {
    status_code: Option<u16>,
    headers: Option<HeaderMap>,
    error: ServiceError,
}
