use regex::Regex;
use std::sync::LazyLock;
use url::form_urlencoded;

/// Allowed database names: lowercase first character, then lowercase
/// letters, digits, and `_$()+-/`.
static DB_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z][a-z0-9_$()+/-]*$").unwrap());

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NameError {
    #[error("invalid database name: {0:?}")]
    InvalidDatabaseName(String),
}

/// Check a database name against the server's naming rules before any
/// network call is made.
pub fn validate_db_name(name: &str) -> Result<(), NameError> {
    if DB_NAME.is_match(name) {
        Ok(())
    } else {
        Err(NameError::InvalidDatabaseName(name.to_string()))
    }
}

/// Percent-encode one untrusted path segment (database name, document id)
/// before it is spliced into a target path.
pub fn encode_segment(segment: &str) -> String {
    let encoded: String = form_urlencoded::byte_serialize(segment.as_bytes()).collect();
    // byte_serialize is form encoding; inside a path a space must be %20
    encoded.replace('+', "%20")
}

/// Document id for a server user record in the `_users` database.
pub fn user_doc_id(username: &str) -> String {
    format!("org.couchdb.user:{}", username)
}
