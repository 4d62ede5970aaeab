//! SurrealDB schema initialization for the evidence collections
//!
//! Every collection is a SCHEMALESS table: documents are written by the
//! ingestion side in whatever shape each evidence type needs. Indexes cover
//! the fields the evaluators filter on.

use surrealdb::engine::any::Any;
use surrealdb::Surreal;
use tracing::{debug, info};

use crate::storage_traits::{CollectionName, StorageResult};

/// Initialize all evidence tables.
///
/// Safe to call multiple times (idempotent).
pub async fn init_schema(db: &Surreal<Any>) -> StorageResult<()> {
    info!("Initializing proctoring evidence schema");

    for collection in CollectionName::ALL {
        init_collection(db, collection).await?;
    }

    info!("Evidence schema initialization complete");
    Ok(())
}

/// Define one collection table and its lookup indexes.
///
/// Schema (all collections):
/// ```text
/// TABLE <collection> {
///   student:     STRING (indexed, with exam)
///   exam:        STRING (indexed)
///   time:        DATETIME-as-STRING
///   _stored_at:  STRING (write order, internal)
///   ...          type-specific payload
/// }
/// ```
///
/// The `reports` table is keyed by `test` instead of `exam`.
async fn init_collection(db: &Surreal<Any>, collection: CollectionName) -> StorageResult<()> {
    let table = collection.as_str();
    debug!(table, "Initializing evidence table");

    let sql = match collection {
        CollectionName::Report => format!(
            r#"
            DEFINE TABLE IF NOT EXISTS {table} SCHEMALESS;
            DEFINE INDEX IF NOT EXISTS idx_{table}_test ON TABLE {table} COLUMNS test;
            DEFINE INDEX IF NOT EXISTS idx_{table}_stored_at ON TABLE {table} COLUMNS _stored_at;
            "#
        ),
        _ => format!(
            r#"
            DEFINE TABLE IF NOT EXISTS {table} SCHEMALESS;
            DEFINE INDEX IF NOT EXISTS idx_{table}_student_exam ON TABLE {table} COLUMNS student, exam;
            DEFINE INDEX IF NOT EXISTS idx_{table}_exam ON TABLE {table} COLUMNS exam;
            DEFINE INDEX IF NOT EXISTS idx_{table}_stored_at ON TABLE {table} COLUMNS _stored_at;
            "#
        ),
    };

    db.query(sql).await?.check()?;
    debug!(table, "evidence table initialized");
    Ok(())
}
