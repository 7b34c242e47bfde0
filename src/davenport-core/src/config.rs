use serde::{Deserialize, Serialize};

/// Connection settings for a Davenport client.
///
/// Set once at client construction and immutable afterwards; there is no
/// reconfiguration API.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Connection {
    /// Scheme and hostname, e.g. `http://localhost`.
    #[serde(default = "default_host")]
    pub host: String,
    /// Server port. A caller-supplied port is always honored.
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub credentials: Option<Credentials>,
    /// When true, the gateway emits one tracing event per successful call.
    #[serde(default)]
    pub logging: bool,
    /// Database used when a call supplies no explicit name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_database: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

fn default_host() -> String {
    "http://localhost".to_string()
}

fn default_port() -> u16 {
    5984
}

impl Connection {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            ..Self::default()
        }
    }

    pub fn load(path: &str) -> anyhow::Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let connection: Connection = serde_json::from_str(&contents)?;
        Ok(connection)
    }

    pub fn credentials(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.credentials = Some(Credentials {
            username: username.into(),
            password: password.into(),
        });
        self
    }

    pub fn default_database(mut self, db: impl Into<String>) -> Self {
        self.default_database = Some(db.into());
        self
    }

    pub fn logging(mut self, enabled: bool) -> Self {
        self.logging = enabled;
        self
    }

    /// Base URL the gateway prefixes every target path with.
    pub fn base_url(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for Connection {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            credentials: None,
            logging: false,
            default_database: None,
        }
    }
}
