//! Davenport Core Library
//!
//! This crate provides the transport-independent pieces of the Davenport
//! client, including:
//! - Connection configuration
//! - Response envelope types
//! - Database-name validation and path-segment escaping
//! - HTTP status-message resolution
//! - Query-string composition for read endpoints

pub mod config;
pub mod models;
pub mod name;
pub mod query;
pub mod status;

// Re-export commonly used types
pub use config::{Connection, Credentials};
pub use models::*;
pub use name::{encode_segment, user_doc_id, validate_db_name, NameError};
pub use query::{DocParams, ViewParams};
pub use status::resolve_status_message;
