//! Error types for the search pipeline.
//!
//! Malformed request parameters are never errors: every stage normalizes or
//! ignores bad input. The types here only describe failures of the things the
//! pipeline depends on, namely the collaborator services (group membership,
//! URI equivalence) and the search engine itself.

// Error enum variant fields are self-documenting via their #[error(...)] messages
#![allow(missing_docs)]

use thiserror::Error;

/// The primary error type returned by [`Search::run`](crate::Search::run).
#[derive(Error, Debug)]
pub enum SearchError {
    /// A collaborator service failed.
    #[error(transparent)]
    Service(#[from] ServiceError),

    /// The search engine failed or returned something unusable.
    #[error(transparent)]
    Engine(#[from] EngineError),
}

/// Errors raised by collaborator services consulted while building a query.
#[derive(Error, Debug)]
pub enum ServiceError {
    /// The service could not be reached.
    #[error("service unavailable: {service}: {message}")]
    Unavailable { service: String, message: String },

    /// The service was reached but the lookup failed.
    #[error("lookup failed in {service}: {message}")]
    LookupFailed {
        service: String,
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
}

impl ServiceError {
    /// Creates an [`ServiceError::Unavailable`] for the named service.
    pub fn unavailable(service: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Unavailable {
            service: service.into(),
            message: message.into(),
        }
    }

    /// Creates a [`ServiceError::LookupFailed`] without an underlying source.
    pub fn lookup_failed(service: impl Into<String>, message: impl Into<String>) -> Self {
        Self::LookupFailed {
            service: service.into(),
            message: message.into(),
            source: None,
        }
    }
}

/// Errors originating from the search engine.
#[derive(Error, Debug)]
pub enum EngineError {
    /// The engine is currently unavailable.
    #[error("search engine unavailable: {engine}: {message}")]
    Unavailable { engine: String, message: String },

    /// The engine rejected the query.
    #[error("query execution failed: {message}")]
    QueryError { message: String },

    /// The engine answered with a response that could not be decoded.
    #[error("invalid search response: {message}")]
    InvalidResponse { message: String },
}

impl EngineError {
    /// Creates an [`EngineError::QueryError`].
    pub fn query(message: impl Into<String>) -> Self {
        Self::QueryError {
            message: message.into(),
        }
    }

    /// Creates an [`EngineError::InvalidResponse`].
    pub fn invalid_response(message: impl Into<String>) -> Self {
        Self::InvalidResponse {
            message: message.into(),
        }
    }
}

/// Result type for pipeline operations.
pub type QueryResult<T> = Result<T, SearchError>;
