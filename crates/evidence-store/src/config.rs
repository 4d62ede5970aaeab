//! Connection configuration for the SurrealDB evidence store.

use std::path::PathBuf;

/// Default namespace for proctoring data.
pub const DEFAULT_NAMESPACE: &str = "proctoring";
/// Default database inside the namespace.
pub const DEFAULT_DATABASE: &str = "main";
/// Local persistence directory used when nothing else is configured.
pub const DEFAULT_LOCAL_PATH: &str = ".proctor/db";

/// Where the evidence store lives and how to authenticate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreConfig {
    /// Remote SurrealDB over WebSocket/HTTP with credentials.
    Remote {
        /// Endpoint URL (e.g., "wss://xxx.aws-use1.surrealdb.cloud")
        endpoint: String,
        username: String,
        password: String,
        namespace: String,
        database: String,
        /// Whether the credentials belong to a root user
        is_root: bool,
    },
    /// Any SurrealDB connection string without authentication
    /// (`mem://`, `surrealkv://path`, `ws://host:port`).
    Url(String),
    /// Embedded SurrealKV store in a local directory.
    Local(PathBuf),
}

impl StoreConfig {
    /// Remote configuration for a database user, default namespace/database.
    pub fn remote(
        endpoint: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        StoreConfig::Remote {
            endpoint: endpoint.into(),
            username: username.into(),
            password: password.into(),
            namespace: DEFAULT_NAMESPACE.to_string(),
            database: DEFAULT_DATABASE.to_string(),
            is_root: false,
        }
    }

    /// Resolve the configuration from environment variables.
    ///
    /// Resolution order:
    /// 1. `SURREALDB_ENDPOINT` + `SURREALDB_USERNAME` + `SURREALDB_PASSWORD`
    ///    (optional `SURREALDB_NAMESPACE`, `SURREALDB_DATABASE`, `SURREALDB_ROOT`)
    /// 2. `SURREALDB_URL`
    /// 3. local persistence in `.proctor/db`
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Resolve the configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        if let (Some(endpoint), Some(username), Some(password)) = (
            lookup("SURREALDB_ENDPOINT"),
            lookup("SURREALDB_USERNAME"),
            lookup("SURREALDB_PASSWORD"),
        ) {
            return StoreConfig::Remote {
                endpoint,
                username,
                password,
                namespace: lookup("SURREALDB_NAMESPACE")
                    .unwrap_or_else(|| DEFAULT_NAMESPACE.to_string()),
                database: lookup("SURREALDB_DATABASE")
                    .unwrap_or_else(|| DEFAULT_DATABASE.to_string()),
                is_root: lookup("SURREALDB_ROOT")
                    .map(|v| v.eq_ignore_ascii_case("true"))
                    .unwrap_or(false),
            };
        }

        if let Some(url) = lookup("SURREALDB_URL") {
            return StoreConfig::Url(url);
        }

        StoreConfig::Local(PathBuf::from(DEFAULT_LOCAL_PATH))
    }

    /// Short description for logs; never includes credentials.
    pub fn describe(&self) -> String {
        match self {
            StoreConfig::Remote {
                endpoint,
                namespace,
                database,
                ..
            } => format!("{endpoint} ({namespace}/{database})"),
            StoreConfig::Url(url) => url.clone(),
            StoreConfig::Local(path) => format!("surrealkv://{}", path.display()),
        }
    }
}
