use serde_json::Value;
use url::form_urlencoded;

/// Parameters for view reads (`_all_docs`, design-document views).
///
/// Row-key filters (`key`, `keys`, `startkey`, `endkey`) are JSON values;
/// they are JSON-serialized before URL encoding so the server receives
/// valid JSON literals rather than bare strings.
#[derive(Debug, Clone, Default)]
pub struct ViewParams {
    pub key: Option<Value>,
    pub keys: Option<Vec<Value>>,
    pub startkey: Option<Value>,
    pub endkey: Option<Value>,
    pub descending: Option<bool>,
    pub include_docs: Option<bool>,
    pub limit: Option<u64>,
    pub skip: Option<u64>,
    pub reduce: Option<bool>,
    pub group: Option<bool>,
    pub group_level: Option<u32>,
    pub conflicts: Option<bool>,
    pub update_seq: Option<bool>,
}

impl ViewParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn key(mut self, key: impl Into<Value>) -> Self {
        self.key = Some(key.into());
        self
    }

    pub fn keys(mut self, keys: Vec<Value>) -> Self {
        self.keys = Some(keys);
        self
    }

    pub fn startkey(mut self, key: impl Into<Value>) -> Self {
        self.startkey = Some(key.into());
        self
    }

    pub fn endkey(mut self, key: impl Into<Value>) -> Self {
        self.endkey = Some(key.into());
        self
    }

    pub fn descending(mut self, descending: bool) -> Self {
        self.descending = Some(descending);
        self
    }

    pub fn include_docs(mut self, include_docs: bool) -> Self {
        self.include_docs = Some(include_docs);
        self
    }

    pub fn limit(mut self, limit: u64) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn skip(mut self, skip: u64) -> Self {
        self.skip = Some(skip);
        self
    }

    pub fn group(mut self, group: bool) -> Self {
        self.group = Some(group);
        self
    }

    pub fn reduce(mut self, reduce: bool) -> Self {
        self.reduce = Some(reduce);
        self
    }

    /// Serialize into a leading-`?` query string, or `""` when no
    /// parameter is set.
    pub fn to_query_string(&self) -> String {
        let mut pairs: Vec<(&str, String)> = Vec::new();

        // Row-key filters carry JSON literals. Display for Value is its
        // compact JSON encoding.
        if let Some(key) = &self.key {
            pairs.push(("key", key.to_string()));
        }
        if let Some(keys) = &self.keys {
            pairs.push(("keys", Value::Array(keys.clone()).to_string()));
        }
        if let Some(startkey) = &self.startkey {
            pairs.push(("startkey", startkey.to_string()));
        }
        if let Some(endkey) = &self.endkey {
            pairs.push(("endkey", endkey.to_string()));
        }

        push_flag(&mut pairs, "descending", self.descending);
        push_flag(&mut pairs, "include_docs", self.include_docs);
        if let Some(limit) = self.limit {
            pairs.push(("limit", limit.to_string()));
        }
        if let Some(skip) = self.skip {
            pairs.push(("skip", skip.to_string()));
        }
        push_flag(&mut pairs, "reduce", self.reduce);
        push_flag(&mut pairs, "group", self.group);
        if let Some(level) = self.group_level {
            pairs.push(("group_level", level.to_string()));
        }
        push_flag(&mut pairs, "conflicts", self.conflicts);
        push_flag(&mut pairs, "update_seq", self.update_seq);

        encode_pairs(&pairs)
    }
}

/// Parameters for single-document reads.
#[derive(Debug, Clone, Default)]
pub struct DocParams {
    pub rev: Option<String>,
    pub revs: Option<bool>,
    pub revs_info: Option<bool>,
    pub conflicts: Option<bool>,
    pub attachments: Option<bool>,
    pub latest: Option<bool>,
}

impl DocParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rev(mut self, rev: impl Into<String>) -> Self {
        self.rev = Some(rev.into());
        self
    }

    pub fn revs(mut self, revs: bool) -> Self {
        self.revs = Some(revs);
        self
    }

    pub fn conflicts(mut self, conflicts: bool) -> Self {
        self.conflicts = Some(conflicts);
        self
    }

    pub fn to_query_string(&self) -> String {
        let mut pairs: Vec<(&str, String)> = Vec::new();

        if let Some(rev) = &self.rev {
            pairs.push(("rev", rev.clone()));
        }
        push_flag(&mut pairs, "revs", self.revs);
        push_flag(&mut pairs, "revs_info", self.revs_info);
        push_flag(&mut pairs, "conflicts", self.conflicts);
        push_flag(&mut pairs, "attachments", self.attachments);
        push_flag(&mut pairs, "latest", self.latest);

        encode_pairs(&pairs)
    }
}

fn push_flag(pairs: &mut Vec<(&str, String)>, name: &'static str, flag: Option<bool>) {
    if let Some(flag) = flag {
        pairs.push((name, flag.to_string()));
    }
}

/// URL-encode name/value pairs into a query string. An empty slice gives
/// an empty string, never a bare `?`.
fn encode_pairs(pairs: &[(&str, String)]) -> String {
    if pairs.is_empty() {
        return String::new();
    }
    let encoded = form_urlencoded::Serializer::new(String::new())
        .extend_pairs(pairs.iter().map(|(name, value)| (*name, value.as_str())))
        .finish();
    format!("?{}", encoded)
}
