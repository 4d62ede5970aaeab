//! SurrealDB-backed EvidenceStore implementation
//!
//! Documents are stored in one SCHEMALESS table per collection. A row written
//! here holds the document's own fields (so equality filters run
//! server-side), the document serialized as JSON in `_body`, and a
//! `_stored_at` stamp so reads come back in write order.
//!
//! Rows created by other writers (the ingestion side) carry only their own
//! fields. Reads decode `_body` when present and otherwise return the row
//! minus its record id.

use async_trait::async_trait;
use chrono::{SecondsFormat, Utc};
use serde_json::Value;
use surrealdb::engine::any::Any;
use surrealdb::opt::auth::{Database, Root};
use surrealdb::Surreal;
use tracing::{debug, info, instrument};

use crate::config::{StoreConfig, DEFAULT_DATABASE, DEFAULT_NAMESPACE};
use crate::error::StorageError;
use crate::migrations;
use crate::storage_traits::{CollectionName, Document, EvidenceStore, Filter, StorageResult};

const STORED_AT: &str = "_stored_at";
const BODY: &str = "_body";
const RECORD_ID: &str = "id";

/// SurrealDB-backed implementation of [`EvidenceStore`].
#[derive(Clone)]
pub struct SurrealEvidenceStore {
    db: Surreal<Any>,
}

impl SurrealEvidenceStore {
    /// Create an in-memory instance for testing.
    ///
    /// Connects to `mem://`, selects `proctoring/main`, and runs `init_schema`.
    pub async fn in_memory() -> StorageResult<Self> {
        Self::connect(&StoreConfig::Url("mem://".to_string())).await
    }

    /// Create from environment variables (see [`StoreConfig::from_env`]).
    pub async fn from_env() -> StorageResult<Self> {
        Self::connect(&StoreConfig::from_env()).await
    }

    /// Connect using an explicit configuration and initialize the schema.
    #[instrument(skip_all, fields(store = %config.describe()))]
    pub async fn connect(config: &StoreConfig) -> StorageResult<Self> {
        let db = match config {
            StoreConfig::Remote {
                endpoint,
                username,
                password,
                namespace,
                database,
                is_root,
            } => {
                let db = surrealdb::engine::any::connect(endpoint.as_str()).await?;
                if *is_root {
                    db.signin(Root {
                        username: username.as_str(),
                        password: password.as_str(),
                    })
                    .await?;
                } else {
                    db.signin(Database {
                        namespace: namespace.as_str(),
                        database: database.as_str(),
                        username: username.as_str(),
                        password: password.as_str(),
                    })
                    .await?;
                }
                db.use_ns(namespace.as_str())
                    .use_db(database.as_str())
                    .await?;
                db
            }
            StoreConfig::Url(url) => {
                let db = surrealdb::engine::any::connect(url.as_str()).await?;
                db.use_ns(DEFAULT_NAMESPACE).use_db(DEFAULT_DATABASE).await?;
                db
            }
            StoreConfig::Local(path) => {
                std::fs::create_dir_all(path).map_err(StorageError::unavailable)?;
                let url = format!("surrealkv://{}", path.display());
                let db = surrealdb::engine::any::connect(url.as_str()).await?;
                db.use_ns(DEFAULT_NAMESPACE).use_db(DEFAULT_DATABASE).await?;
                db
            }
        };

        migrations::init_schema(&db).await?;
        info!("SurrealEvidenceStore connected");
        Ok(Self { db })
    }

    /// The underlying connection, for writers outside this adapter.
    pub fn client(&self) -> &Surreal<Any> {
        &self.db
    }

    // -- private helpers -----------------------------------------------------

    /// Build `SELECT ... WHERE a = $v0 AND b = $v1 ...` for a filter.
    fn select_sql(filter: &Filter) -> StorageResult<String> {
        let mut sql = String::from("SELECT * FROM type::table($table)");
        let mut clauses = Vec::new();
        for (i, (field, _)) in filter.iter().enumerate() {
            if !is_plain_identifier(field) {
                return Err(StorageError::Malformed(format!(
                    "filter field is not a plain identifier: {field:?}"
                )));
            }
            clauses.push(format!("{field} = $v{i}"));
        }
        if !clauses.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&clauses.join(" AND "));
        }
        sql.push_str(" ORDER BY _stored_at ASC");
        Ok(sql)
    }

    /// Recover the document from a row, with or without a `_body`.
    fn row_to_document(row: Value) -> StorageResult<Document> {
        let Value::Object(mut row) = row else {
            return Err(StorageError::Malformed(format!("expected an object row, got {row}")));
        };
        match row.remove(BODY) {
            Some(Value::String(body)) => match serde_json::from_str(&body)? {
                Value::Object(doc) => Ok(doc),
                other => Err(StorageError::Malformed(format!(
                    "expected an object body, got {other}"
                ))),
            },
            Some(other) => Err(StorageError::Malformed(format!(
                "expected `{BODY}` to be a string, got {other}"
            ))),
            None => {
                row.remove(RECORD_ID);
                row.remove(STORED_AT);
                Ok(row)
            }
        }
    }
}

/// `[A-Za-z_][A-Za-z0-9_]*`
fn is_plain_identifier(field: &str) -> bool {
    let mut chars = field.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

#[async_trait]
impl EvidenceStore for SurrealEvidenceStore {
    async fn read(
        &self,
        collection: CollectionName,
        filter: &Filter,
    ) -> StorageResult<Vec<Document>> {
        let sql = Self::select_sql(filter)?;
        let mut query = self
            .db
            .query(sql)
            .bind(("table", collection.as_str().to_string()));
        for (i, (_, value)) in filter.iter().enumerate() {
            query = query.bind((format!("v{i}"), value.clone()));
        }

        let mut res = query.await?;
        let rows: Vec<Value> = res.take(0)?;
        debug!(collection = %collection, matches = rows.len(), "read");

        rows.into_iter().map(Self::row_to_document).collect()
    }

    async fn write_once(&self, collection: CollectionName, record: Document) -> StorageResult<()> {
        let existing = self.read(collection, &Filter::from_document(&record)).await?;
        if !existing.is_empty() {
            debug!(collection = %collection, "identical document exists, skipping write");
            return Ok(());
        }

        let body = serde_json::to_string(&record)?;
        let mut row = record;
        row.insert(BODY.to_string(), Value::String(body));
        row.insert(
            STORED_AT.to_string(),
            Value::String(Utc::now().to_rfc3339_opts(SecondsFormat::Nanos, true)),
        );

        self.db
            .query("CREATE type::table($table) CONTENT $row")
            .bind(("table", collection.as_str().to_string()))
            .bind(("row", Value::Object(row)))
            .await?
            .check()?;

        debug!(collection = %collection, "document written");
        Ok(())
    }

    async fn clear(&self, collection: CollectionName) -> StorageResult<()> {
        self.db
            .query("DELETE type::table($table)")
            .bind(("table", collection.as_str().to_string()))
            .await?
            .check()?;

        info!(collection = %collection, "collection cleared");
        Ok(())
    }
}
