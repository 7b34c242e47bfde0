use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Response to `GET /` (server welcome banner).
#[derive(Debug, Clone, Deserialize)]
pub struct ServerInfo {
    #[serde(default)]
    pub couchdb: Option<String>,
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub uuid: Option<String>,
    #[serde(default)]
    pub vendor: Value,
}

/// Database metadata from `GET /{db}`.
///
/// `update_seq` and the size fields vary in shape across server versions,
/// so they stay opaque.
#[derive(Debug, Clone, Deserialize)]
pub struct DbInfo {
    pub db_name: String,
    #[serde(default)]
    pub doc_count: u64,
    #[serde(default)]
    pub doc_del_count: u64,
    #[serde(default)]
    pub update_seq: Value,
    #[serde(default)]
    pub purge_seq: Value,
    #[serde(default)]
    pub sizes: Value,
    #[serde(default)]
    pub compact_running: bool,
}

/// Write acknowledgement: `{ok, id, rev}`.
#[derive(Debug, Clone, Deserialize)]
pub struct OpResponse {
    #[serde(default)]
    pub ok: bool,
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub rev: Option<String>,
}

/// Per-document outcome of a `_bulk_docs` upsert.
#[derive(Debug, Clone, Deserialize)]
pub struct BulkDocResult {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub rev: Option<String>,
    #[serde(default)]
    pub ok: Option<bool>,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub reason: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ViewRow {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub key: Value,
    #[serde(default)]
    pub value: Value,
    #[serde(default)]
    pub doc: Option<Value>,
}

/// Rows from `_all_docs` or a design-document view.
#[derive(Debug, Clone, Deserialize)]
pub struct ViewResponse {
    #[serde(default)]
    pub total_rows: Option<u64>,
    #[serde(default)]
    pub offset: Option<u64>,
    #[serde(default)]
    pub rows: Vec<ViewRow>,
}

/// Response to a declarative `_find` query.
#[derive(Debug, Clone, Deserialize)]
pub struct FindResponse {
    #[serde(default)]
    pub docs: Vec<Value>,
    #[serde(default)]
    pub bookmark: Option<String>,
    #[serde(default)]
    pub warning: Option<String>,
    #[serde(default)]
    pub execution_stats: Option<Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SecurityGroup {
    #[serde(default)]
    pub names: Vec<String>,
    #[serde(default)]
    pub roles: Vec<String>,
}

/// `_security` object for a database.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SecurityObject {
    #[serde(default)]
    pub admins: SecurityGroup,
    #[serde(default)]
    pub members: SecurityGroup,
}

/// Request body for `POST /{db}/_index`.
#[derive(Debug, Clone, Serialize)]
pub struct IndexSpec {
    pub index: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ddoc: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub index_type: Option<String>,
}

impl IndexSpec {
    /// Index over the given document fields, server-assigned name.
    pub fn fields(fields: Vec<String>) -> Self {
        Self {
            index: serde_json::json!({ "fields": fields }),
            ddoc: None,
            name: None,
            index_type: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct IndexCreated {
    #[serde(default)]
    pub result: Option<String>,
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct IndexList {
    #[serde(default)]
    pub total_rows: Option<u64>,
    #[serde(default)]
    pub indexes: Vec<Value>,
}

/// User record stored in the `_users` database.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserDoc {
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(rename = "_rev", default, skip_serializing_if = "Option::is_none")]
    pub rev: Option<String>,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(default)]
    pub roles: Vec<String>,
    #[serde(rename = "type", default = "user_type")]
    pub kind: String,
}

fn user_type() -> String {
    "user".to_string()
}

#[derive(Debug, Clone, Deserialize)]
pub struct UuidsResponse {
    #[serde(default)]
    pub uuids: Vec<String>,
}
