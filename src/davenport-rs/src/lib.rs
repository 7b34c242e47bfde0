//! Davenport Client Library
//!
//! Async HTTP client for CouchDB-compatible document database REST APIs.
//! Every endpoint method is a thin caller of one request gateway
//! ([`Client::request`]) that normalizes success and failure into stable
//! shapes.

mod client;
mod gateway;

pub use client::Client;
pub use gateway::RequestDescriptor;

pub use davenport_core::{
    Connection, Credentials, DocParams, IndexSpec, NameError, SecurityGroup, SecurityObject,
    UserDoc, ViewParams,
};

use std::time::Duration;

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// No database name supplied and no default configured. Raised before
    /// any network call.
    #[error("no database name supplied and no default database configured")]
    MissingDatabase,

    /// A name failed the server's naming rules. Raised before any network
    /// call.
    #[error(transparent)]
    InvalidName(#[from] NameError),

    /// A locally-checkable constraint was violated, e.g. a copy without a
    /// source or destination id.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The server answered with a body of an unexpected shape.
    #[error("invalid response from server")]
    InvalidResponse,

    /// Normalized remote failure: non-success status or transport error.
    /// `status` falls back to 500 when the failure carried none.
    #[error("request failed: {status} {message} ({}ms)", .elapsed.as_millis())]
    Remote {
        status: u16,
        message: String,
        body: Option<serde_json::Value>,
        elapsed: Duration,
        #[source]
        source: Option<reqwest::Error>,
    },
}

pub type Result<T> = std::result::Result<T, ClientError>;
