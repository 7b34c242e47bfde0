use reqwest::Method;
use serde_json::{json, Value};

use davenport_core::{
    encode_segment, user_doc_id, validate_db_name, BulkDocResult, Connection, DbInfo, DocParams,
    FindResponse, IndexCreated, IndexList, IndexSpec, OpResponse, SecurityObject, ServerInfo,
    UserDoc, UuidsResponse, ViewParams, ViewResponse,
};

use crate::gateway::{copy_method, RequestDescriptor};
use crate::{ClientError, Result};

/// Davenport REST API client.
///
/// All methods are leaf callers of the request gateway; concurrent calls
/// share only the underlying `reqwest::Client` and the immutable
/// [`Connection`]. Database-scoped methods take `db: Option<&str>`; a
/// call-site name wins over the configured default database, and the
/// absence of both is a synchronous error.
pub struct Client {
    pub(crate) config: Connection,
    pub(crate) base_url: String,
    pub(crate) http: reqwest::Client,
}

impl Client {
    pub fn new(config: Connection) -> Self {
        Self {
            base_url: config.base_url(),
            config,
            http: reqwest::Client::new(),
        }
    }

    /// Build a client from a server URL such as `http://localhost:5984`.
    pub fn with_url(url: &str) -> Result<Self> {
        let parsed = url::Url::parse(url)
            .map_err(|e| ClientError::InvalidRequest(format!("invalid server url {:?}: {}", url, e)))?;
        let host_str = parsed
            .host_str()
            .ok_or_else(|| ClientError::InvalidRequest(format!("server url {:?} has no host", url)))?;
        let host = format!("{}://{}", parsed.scheme(), host_str);
        let mut connection = Connection::default();
        connection.host = host;
        if let Some(port) = parsed.port_or_known_default() {
            connection.port = port;
        }
        Ok(Self::new(connection))
    }

    pub fn config(&self) -> &Connection {
        &self.config
    }

    /// Resolve and validate a database name: call-site value over the
    /// configured default, rejected before any network call otherwise.
    fn db_name<'a>(&'a self, db: Option<&'a str>) -> Result<&'a str> {
        let name = db
            .or(self.config.default_database.as_deref())
            .ok_or(ClientError::MissingDatabase)?;
        validate_db_name(name)?;
        Ok(name)
    }

    fn db_path(&self, db: Option<&str>) -> Result<String> {
        Ok(format!("/{}", encode_segment(self.db_name(db)?)))
    }

    fn doc_path(&self, db: Option<&str>, id: &str) -> Result<String> {
        Ok(format!("{}/{}", self.db_path(db)?, encode_segment(id)))
    }

    /// Existence-check translation: 404 means `false`, any other failure
    /// propagates.
    async fn exists(&self, descriptor: RequestDescriptor) -> Result<bool> {
        match self.request(descriptor).await {
            Ok(_) => Ok(true),
            Err(ClientError::Remote { status: 404, .. }) => Ok(false),
            Err(error) => Err(error),
        }
    }

    // ---- Server ----

    /// `GET /` server welcome banner.
    pub async fn info(&self) -> Result<ServerInfo> {
        self.request_typed(RequestDescriptor::default()).await
    }

    /// `GET /_all_dbs`.
    pub async fn list_databases(&self) -> Result<Vec<String>> {
        self.request_typed(RequestDescriptor::new("/_all_dbs")).await
    }

    /// `GET /_uuids` server-generated document ids.
    pub async fn uuids(&self, count: u32) -> Result<Vec<String>> {
        let response: UuidsResponse = self
            .request_typed(RequestDescriptor::new(format!("/_uuids?count={}", count)))
            .await?;
        Ok(response.uuids)
    }

    /// `GET /_up` liveness probe.
    pub async fn up(&self) -> Result<Value> {
        self.request(RequestDescriptor::new("/_up")).await
    }

    // ---- Database lifecycle ----

    pub async fn create_database(&self, db: Option<&str>) -> Result<OpResponse> {
        let descriptor = RequestDescriptor::new(self.db_path(db)?)
            .method(Method::PUT)
            .status_text(412, "Database already exists");
        self.request_typed(descriptor).await
    }

    pub async fn database_info(&self, db: Option<&str>) -> Result<DbInfo> {
        let descriptor =
            RequestDescriptor::new(self.db_path(db)?).status_text(404, "Database does not exist");
        self.request_typed(descriptor).await
    }

    pub async fn delete_database(&self, db: Option<&str>) -> Result<OpResponse> {
        let descriptor = RequestDescriptor::new(self.db_path(db)?)
            .method(Method::DELETE)
            .status_text(404, "Database does not exist");
        self.request_typed(descriptor).await
    }

    /// `HEAD /{db}`, with 404 translated to `false`.
    pub async fn database_exists(&self, db: Option<&str>) -> Result<bool> {
        let descriptor = RequestDescriptor::new(self.db_path(db)?).method(Method::HEAD);
        self.exists(descriptor).await
    }

    pub async fn get_security(&self, db: Option<&str>) -> Result<SecurityObject> {
        let path = format!("{}/_security", self.db_path(db)?);
        self.request_typed(RequestDescriptor::new(path)).await
    }

    pub async fn set_security(
        &self,
        db: Option<&str>,
        security: &SecurityObject,
    ) -> Result<OpResponse> {
        let path = format!("{}/_security", self.db_path(db)?);
        let descriptor = RequestDescriptor::new(path)
            .method(Method::PUT)
            .body(serde_json::to_value(security)?);
        self.request_typed(descriptor).await
    }

    pub async fn get_revision_limit(&self, db: Option<&str>) -> Result<u64> {
        let path = format!("{}/_revs_limit", self.db_path(db)?);
        let value = self.request(RequestDescriptor::new(path)).await?;
        value.as_u64().ok_or(ClientError::InvalidResponse)
    }

    pub async fn set_revision_limit(&self, db: Option<&str>, limit: u64) -> Result<OpResponse> {
        let path = format!("{}/_revs_limit", self.db_path(db)?);
        let descriptor = RequestDescriptor::new(path)
            .method(Method::PUT)
            .body(json!(limit));
        self.request_typed(descriptor).await
    }

    /// `POST /{db}/_compact`; the server acknowledges with 202 and
    /// compacts in the background.
    pub async fn compact(&self, db: Option<&str>) -> Result<OpResponse> {
        let path = format!("{}/_compact", self.db_path(db)?);
        let descriptor = RequestDescriptor::new(path)
            .method(Method::POST)
            .body(json!({}));
        self.request_typed(descriptor).await
    }

    // ---- Users ----

    pub async fn create_user(
        &self,
        name: &str,
        password: &str,
        roles: Vec<String>,
    ) -> Result<OpResponse> {
        let id = user_doc_id(name);
        let user = UserDoc {
            id: Some(id.clone()),
            rev: None,
            name: name.to_string(),
            password: Some(password.to_string()),
            roles,
            kind: "user".to_string(),
        };
        let descriptor = RequestDescriptor::new(format!("/_users/{}", encode_segment(&id)))
            .method(Method::PUT)
            .body(serde_json::to_value(&user)?)
            .status_text(409, "User already exists");
        self.request_typed(descriptor).await
    }

    pub async fn get_user(&self, name: &str) -> Result<UserDoc> {
        let id = user_doc_id(name);
        let descriptor = RequestDescriptor::new(format!("/_users/{}", encode_segment(&id)))
            .status_text(404, "User does not exist");
        self.request_typed(descriptor).await
    }

    pub async fn delete_user(&self, name: &str, rev: &str) -> Result<OpResponse> {
        let id = user_doc_id(name);
        let descriptor = RequestDescriptor::new(format!(
            "/_users/{}?rev={}",
            encode_segment(&id),
            encode_segment(rev)
        ))
        .method(Method::DELETE)
        .status_text(404, "User does not exist");
        self.request_typed(descriptor).await
    }

    // ---- Documents ----

    /// `POST /{db}` with a server-assigned id.
    pub async fn create_document(&self, db: Option<&str>, doc: Value) -> Result<OpResponse> {
        let descriptor = RequestDescriptor::new(self.db_path(db)?)
            .method(Method::POST)
            .body(doc)
            .status_text(409, "Document update conflict");
        self.request_typed(descriptor).await
    }

    /// `PUT /{db}/{id}`. Updating an existing document requires its
    /// current `_rev` inside `doc`.
    pub async fn put_document(&self, db: Option<&str>, id: &str, doc: Value) -> Result<OpResponse> {
        let descriptor = RequestDescriptor::new(self.doc_path(db, id)?)
            .method(Method::PUT)
            .body(doc)
            .status_text(409, "Document update conflict");
        self.request_typed(descriptor).await
    }

    pub async fn get_document(
        &self,
        db: Option<&str>,
        id: &str,
        params: &DocParams,
    ) -> Result<Value> {
        let path = format!("{}{}", self.doc_path(db, id)?, params.to_query_string());
        let descriptor = RequestDescriptor::new(path).status_text(404, "Document not found");
        self.request(descriptor).await
    }

    pub async fn delete_document(&self, db: Option<&str>, id: &str, rev: &str) -> Result<OpResponse> {
        let path = format!("{}?rev={}", self.doc_path(db, id)?, encode_segment(rev));
        let descriptor = RequestDescriptor::new(path)
            .method(Method::DELETE)
            .status_text(409, "Revision mismatch");
        self.request_typed(descriptor).await
    }

    /// `COPY /{db}/{source}` with the target id in the `Destination`
    /// header. Overwriting an existing destination requires
    /// `destination` in the `{id}?rev={rev}` form.
    pub async fn copy_document(
        &self,
        db: Option<&str>,
        source: &str,
        destination: &str,
    ) -> Result<OpResponse> {
        if source.is_empty() || destination.is_empty() {
            return Err(ClientError::InvalidRequest(
                "copy requires a source and a destination document id".to_string(),
            ));
        }
        let descriptor = RequestDescriptor::new(self.doc_path(db, source)?)
            .method(copy_method())
            .header("Destination", destination)
            .status_text(409, "Destination exists with a different revision");
        self.request_typed(descriptor).await
    }

    /// `HEAD /{db}/{id}`, with 404 translated to `false`.
    pub async fn document_exists(&self, db: Option<&str>, id: &str) -> Result<bool> {
        let descriptor = RequestDescriptor::new(self.doc_path(db, id)?).method(Method::HEAD);
        self.exists(descriptor).await
    }

    /// `POST /{db}/_bulk_docs` upsert. Per-document outcomes are reported
    /// individually; the call itself succeeds even when single rows
    /// conflict.
    pub async fn bulk_docs(
        &self,
        db: Option<&str>,
        docs: Vec<Value>,
        new_edits: Option<bool>,
    ) -> Result<Vec<BulkDocResult>> {
        let mut body = json!({ "docs": docs });
        if let Some(new_edits) = new_edits {
            body["new_edits"] = json!(new_edits);
        }
        let path = format!("{}/_bulk_docs", self.db_path(db)?);
        let descriptor = RequestDescriptor::new(path).method(Method::POST).body(body);
        self.request_typed(descriptor).await
    }

    /// `GET /{db}/_all_docs` with typed parameters; row-key filters are
    /// JSON-encoded into the query string.
    pub async fn all_docs(&self, db: Option<&str>, params: &ViewParams) -> Result<ViewResponse> {
        let path = format!("{}/_all_docs{}", self.db_path(db)?, params.to_query_string());
        self.request_typed(RequestDescriptor::new(path)).await
    }

    /// `POST /{db}/_all_docs?include_docs=true` for an exact-keys lookup
    /// with document bodies.
    pub async fn fetch(&self, db: Option<&str>, keys: Vec<Value>) -> Result<ViewResponse> {
        let path = format!("{}/_all_docs?include_docs=true", self.db_path(db)?);
        let descriptor = RequestDescriptor::new(path)
            .method(Method::POST)
            .body(json!({ "keys": keys }));
        self.request_typed(descriptor).await
    }

    // ---- Find ----

    /// `POST /{db}/_find` declarative query; `query` carries the selector
    /// and options.
    pub async fn find(&self, db: Option<&str>, query: Value) -> Result<FindResponse> {
        let path = format!("{}/_find", self.db_path(db)?);
        let descriptor = RequestDescriptor::new(path)
            .method(Method::POST)
            .body(query)
            .status_text(400, "Invalid find query");
        self.request_typed(descriptor).await
    }

    // ---- Design documents and views ----

    pub async fn put_design(&self, db: Option<&str>, name: &str, ddoc: Value) -> Result<OpResponse> {
        let path = format!("{}/_design/{}", self.db_path(db)?, encode_segment(name));
        let descriptor = RequestDescriptor::new(path)
            .method(Method::PUT)
            .body(ddoc)
            .status_text(409, "Design document update conflict");
        self.request_typed(descriptor).await
    }

    pub async fn get_design(&self, db: Option<&str>, name: &str) -> Result<Value> {
        let path = format!("{}/_design/{}", self.db_path(db)?, encode_segment(name));
        let descriptor = RequestDescriptor::new(path).status_text(404, "Design document not found");
        self.request(descriptor).await
    }

    pub async fn delete_design(&self, db: Option<&str>, name: &str, rev: &str) -> Result<OpResponse> {
        let path = format!(
            "{}/_design/{}?rev={}",
            self.db_path(db)?,
            encode_segment(name),
            encode_segment(rev)
        );
        let descriptor = RequestDescriptor::new(path)
            .method(Method::DELETE)
            .status_text(409, "Revision mismatch");
        self.request_typed(descriptor).await
    }

    /// `GET /{db}/_design/{ddoc}/_view/{view}` with typed parameters.
    pub async fn view(
        &self,
        db: Option<&str>,
        ddoc: &str,
        view: &str,
        params: &ViewParams,
    ) -> Result<ViewResponse> {
        let path = format!(
            "{}/_design/{}/_view/{}{}",
            self.db_path(db)?,
            encode_segment(ddoc),
            encode_segment(view),
            params.to_query_string()
        );
        let descriptor = RequestDescriptor::new(path).status_text(404, "View not found");
        self.request_typed(descriptor).await
    }

    // ---- Indexes ----

    pub async fn create_index(&self, db: Option<&str>, spec: &IndexSpec) -> Result<IndexCreated> {
        let path = format!("{}/_index", self.db_path(db)?);
        let descriptor = RequestDescriptor::new(path)
            .method(Method::POST)
            .body(serde_json::to_value(spec)?)
            .status_text(400, "Invalid index definition");
        self.request_typed(descriptor).await
    }

    pub async fn list_indexes(&self, db: Option<&str>) -> Result<IndexList> {
        let path = format!("{}/_index", self.db_path(db)?);
        self.request_typed(RequestDescriptor::new(path)).await
    }

    pub async fn delete_index(&self, db: Option<&str>, ddoc: &str, name: &str) -> Result<OpResponse> {
        let path = format!(
            "{}/_index/{}/json/{}",
            self.db_path(db)?,
            encode_segment(ddoc),
            encode_segment(name)
        );
        let descriptor = RequestDescriptor::new(path)
            .method(Method::DELETE)
            .status_text(404, "Index not found");
        self.request_typed(descriptor).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use davenport_core::NameError;
    use serde_json::json;
    use wiremock::matchers::{body_json, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn offline_client() -> Client {
        // Nothing listens here; synchronous rejections must never reach it
        Client::with_url("http://127.0.0.1:1").unwrap()
    }

    #[tokio::test]
    async fn test_missing_database_rejects_synchronously() {
        let client = offline_client();
        match client.database_info(None).await {
            Err(ClientError::MissingDatabase) => {}
            other => panic!("expected MissingDatabase, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_invalid_database_name_rejects_synchronously() {
        let client = offline_client();
        match client.create_database(Some("Test")).await {
            Err(ClientError::InvalidName(NameError::InvalidDatabaseName(name))) => {
                assert_eq!(name, "Test");
            }
            other => panic!("expected InvalidName, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_copy_requires_both_ids() {
        let client = offline_client();
        match client.copy_document(Some("items"), "src", "").await {
            Err(ClientError::InvalidRequest(_)) => {}
            other => panic!("expected InvalidRequest, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_default_database_is_used() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/items"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({"db_name": "items", "doc_count": 7})),
            )
            .mount(&mock_server)
            .await;

        let mut client = Client::with_url(&mock_server.uri()).unwrap();
        client.config.default_database = Some("items".to_string());

        let info = client.database_info(None).await.unwrap();
        assert_eq!(info.db_name, "items");
        assert_eq!(info.doc_count, 7);
    }

    #[tokio::test]
    async fn test_database_exists_translation() {
        let mock_server = MockServer::start().await;

        Mock::given(method("HEAD"))
            .and(path("/present"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&mock_server)
            .await;
        Mock::given(method("HEAD"))
            .and(path("/absent"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&mock_server)
            .await;
        Mock::given(method("HEAD"))
            .and(path("/broken"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&mock_server)
            .await;

        let client = Client::with_url(&mock_server.uri()).unwrap();
        assert!(client.database_exists(Some("present")).await.unwrap());
        assert!(!client.database_exists(Some("absent")).await.unwrap());
        match client.database_exists(Some("broken")).await {
            Err(ClientError::Remote { status: 500, .. }) => {}
            other => panic!("expected Remote 500, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_document_round_trip() {
        let mock_server = MockServer::start().await;

        Mock::given(method("PUT"))
            .and(path("/items/doc-1"))
            .and(body_json(json!({"title": "sofa"})))
            .respond_with(
                ResponseTemplate::new(201)
                    .set_body_json(json!({"ok": true, "id": "doc-1", "rev": "1-abc"})),
            )
            .mount(&mock_server)
            .await;
        Mock::given(method("GET"))
            .and(path("/items/doc-1"))
            .and(query_param("rev", "1-abc"))
            .respond_with(ResponseTemplate::new(200).set_body_json(
                json!({"_id": "doc-1", "_rev": "1-abc", "title": "sofa"}),
            ))
            .mount(&mock_server)
            .await;

        let client = Client::with_url(&mock_server.uri()).unwrap();
        let ack = client
            .put_document(Some("items"), "doc-1", json!({"title": "sofa"}))
            .await
            .unwrap();
        assert_eq!(ack.rev.as_deref(), Some("1-abc"));

        let doc = client
            .get_document(Some("items"), "doc-1", &DocParams::new().rev("1-abc"))
            .await
            .unwrap();
        assert_eq!(doc["title"], "sofa");
    }

    #[tokio::test]
    async fn test_document_id_is_escaped() {
        let mock_server = MockServer::start().await;

        // `a/b` must travel as one path segment
        Mock::given(method("GET"))
            .and(path("/items/a%2Fb"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"_id": "a/b"})))
            .mount(&mock_server)
            .await;

        let client = Client::with_url(&mock_server.uri()).unwrap();
        let doc = client
            .get_document(Some("items"), "a/b", &DocParams::new())
            .await
            .unwrap();
        assert_eq!(doc["_id"], "a/b");
    }

    #[tokio::test]
    async fn test_copy_sends_destination_header() {
        let mock_server = MockServer::start().await;

        Mock::given(method("COPY"))
            .and(path("/items/src"))
            .and(header("Destination", "dst"))
            .respond_with(
                ResponseTemplate::new(201).set_body_json(json!({"ok": true, "id": "dst", "rev": "1-x"})),
            )
            .mount(&mock_server)
            .await;

        let client = Client::with_url(&mock_server.uri()).unwrap();
        let ack = client.copy_document(Some("items"), "src", "dst").await.unwrap();
        assert_eq!(ack.id.as_deref(), Some("dst"));
    }

    #[tokio::test]
    async fn test_view_keys_travel_as_json() {
        let mock_server = MockServer::start().await;

        // wiremock matches against the decoded query value
        Mock::given(method("GET"))
            .and(path("/items/_design/catalog/_view/by-tag"))
            .and(query_param("keys", r#"["a","b"]"#))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "total_rows": 2,
                "rows": [
                    {"id": "1", "key": "a", "value": 1},
                    {"id": "2", "key": "b", "value": 2}
                ]
            })))
            .mount(&mock_server)
            .await;

        let client = Client::with_url(&mock_server.uri()).unwrap();
        let params = ViewParams::new().keys(vec![json!("a"), json!("b")]);
        let response = client
            .view(Some("items"), "catalog", "by-tag", &params)
            .await
            .unwrap();
        assert_eq!(response.rows.len(), 2);
        assert_eq!(response.rows[0].key, json!("a"));
    }

    #[tokio::test]
    async fn test_bulk_docs_reports_row_outcomes() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/items/_bulk_docs"))
            .and(body_json(json!({"docs": [{"_id": "1"}, {"_id": "2"}]})))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!([
                {"ok": true, "id": "1", "rev": "1-a"},
                {"id": "2", "error": "conflict", "reason": "Document update conflict."}
            ])))
            .mount(&mock_server)
            .await;

        let client = Client::with_url(&mock_server.uri()).unwrap();
        let results = client
            .bulk_docs(Some("items"), vec![json!({"_id": "1"}), json!({"_id": "2"})], None)
            .await
            .unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].ok, Some(true));
        assert_eq!(results[1].error.as_deref(), Some("conflict"));
    }

    #[tokio::test]
    async fn test_find_returns_docs() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/items/_find"))
            .and(body_json(json!({"selector": {"status": "open"}})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "docs": [{"_id": "1", "status": "open"}],
                "bookmark": "g1AAAA"
            })))
            .mount(&mock_server)
            .await;

        let client = Client::with_url(&mock_server.uri()).unwrap();
        let response = client
            .find(Some("items"), json!({"selector": {"status": "open"}}))
            .await
            .unwrap();
        assert_eq!(response.docs.len(), 1);
        assert_eq!(response.bookmark.as_deref(), Some("g1AAAA"));
    }

    #[tokio::test]
    async fn test_user_paths_are_escaped() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/_users/org.couchdb.user%3Abob"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "_id": "org.couchdb.user:bob",
                "name": "bob",
                "roles": [],
                "type": "user"
            })))
            .mount(&mock_server)
            .await;

        let client = Client::with_url(&mock_server.uri()).unwrap();
        let user = client.get_user("bob").await.unwrap();
        assert_eq!(user.name, "bob");
        assert_eq!(user.kind, "user");
    }

    #[tokio::test]
    async fn test_revision_limit_round_trip() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/items/_revs_limit"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!(1000)))
            .mount(&mock_server)
            .await;
        Mock::given(method("PUT"))
            .and(path("/items/_revs_limit"))
            .and(body_json(json!(500)))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true})))
            .mount(&mock_server)
            .await;

        let client = Client::with_url(&mock_server.uri()).unwrap();
        assert_eq!(client.get_revision_limit(Some("items")).await.unwrap(), 1000);
        assert!(client.set_revision_limit(Some("items"), 500).await.unwrap().ok);
    }
}
