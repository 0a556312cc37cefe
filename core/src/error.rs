//! Error types for the Freedcamp client.
//!
//! # Design
//! `Authentication` and `RemoteOperation` are kept apart because they fail at
//! different points: the first aborts session construction, the second aborts
//! a single listing or mutation on an otherwise healthy session. Both carry
//! the HTTP status and the server-reported `msg` so callers can surface it.

use thiserror::Error;

/// Message used when the server response carries no `msg` field.
pub const UNKNOWN_ERROR: &str = "Unknown error";

/// Errors returned by the client, session and task handles.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Resolving the current user failed; the session was not created.
    #[error("failed to initialize Freedcamp client (status {status}): {message}")]
    Authentication { status: u16, message: String },

    /// A listing, update or comment request returned a non-200 status.
    #[error("Freedcamp request failed (status {status}): {message}")]
    RemoteOperation { status: u16, message: String },

    /// The HTTP round-trip itself failed before a response was received.
    #[error("transport error: {0}")]
    Transport(String),

    /// The response body did not have the expected shape.
    #[error("deserialization failed: {0}")]
    Deserialization(String),

    /// The request payload could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    Serialization(String),

    /// Client configuration is missing or invalid.
    #[error("configuration error: {0}")]
    Config(String),
}

impl ApiError {
    /// HTTP status reported by the server, if the error came from a response.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Authentication { status, .. } | ApiError::RemoteOperation { status, .. } => {
                Some(*status)
            }
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, ApiError>;
