//! HTTP request execution error types.
//!
//! This module defines the errors `RequestExecutor::execute` can return. Each
//! one carries its [`FailureClass`] so an outer retry policy can branch on it.

use crate::auth::AuthError;
use crate::failure::FailureClass;
use crate::models::ResponseDescriptor;
use std::fmt;

/// Errors that can occur while executing a request.
#[derive(Debug)]
pub enum ExecuteError {
    /// Network error occurred during request execution.
    ///
    /// This includes connection failures, DNS resolution errors and body read
    /// failures.
    NetworkError(String),

    /// The attempt did not complete within the per-attempt timeout.
    Timeout,

    /// The resolved URL could not be parsed or is not http/https.
    InvalidUrl(String),

    /// The request could not be built (e.g. an illegal header name).
    BuildError(String),

    /// The server answered 404. Never retried.
    ResourceNotFound {
        url: String,
        response: ResponseDescriptor,
    },

    /// The credential was rejected again after one refresh.
    ///
    /// Carries the retry's response.
    CredentialInvalid {
        url: String,
        response: ResponseDescriptor,
    },

    /// Refreshing the credential failed.
    Auth(AuthError),
}

impl ExecuteError {
    /// Classification of this error.
    pub fn class(&self) -> FailureClass {
        match self {
            ExecuteError::NetworkError(_)
            | ExecuteError::Timeout
            | ExecuteError::InvalidUrl(_)
            | ExecuteError::BuildError(_) => FailureClass::Transport,
            ExecuteError::ResourceNotFound { .. } => FailureClass::ResourceNotFound,
            ExecuteError::CredentialInvalid { .. } => FailureClass::CredentialInvalid,
            ExecuteError::Auth(_) => FailureClass::AuthBootstrapFailure,
        }
    }

    /// The response attached to the error, if any.
    pub fn response(&self) -> Option<&ResponseDescriptor> {
        match self {
            ExecuteError::ResourceNotFound { response, .. }
            | ExecuteError::CredentialInvalid { response, .. } => Some(response),
            _ => None,
        }
    }
}

impl fmt::Display for ExecuteError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExecuteError::NetworkError(msg) => write!(f, "Network error: {}", msg),
            ExecuteError::Timeout => write!(f, "Request timed out"),
            ExecuteError::InvalidUrl(url) => write!(f, "Invalid URL: {}", url),
            ExecuteError::BuildError(msg) => write!(f, "Request build error: {}", msg),
            ExecuteError::ResourceNotFound { url, .. } => {
                write!(f, "Resource not found: {}", url)
            }
            ExecuteError::CredentialInvalid { url, response } => write!(
                f,
                "Credential still rejected after refresh: {} (status {})",
                url, response.status_code
            ),
            ExecuteError::Auth(err) => write!(f, "Credential refresh failed: {}", err),
        }
    }
}

impl std::error::Error for ExecuteError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ExecuteError::Auth(err) => Some(err),
            _ => None,
        }
    }
}

/// Convert reqwest errors to ExecuteError.
impl From<reqwest::Error> for ExecuteError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ExecuteError::Timeout
        } else if err.is_builder() {
            ExecuteError::BuildError(err.to_string())
        } else {
            ExecuteError::NetworkError(err.to_string())
        }
    }
}

impl From<url::ParseError> for ExecuteError {
    fn from(err: url::ParseError) -> Self {
        ExecuteError::InvalidUrl(err.to_string())
    }
}

impl From<AuthError> for ExecuteError {
    fn from(err: AuthError) -> Self {
        ExecuteError::Auth(err)
    }
}
