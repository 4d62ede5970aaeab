use std::sync::Arc;

use anyhow::{Context, Result};
use evidence_store::{EvidenceStore, StoreConfig, SurrealEvidenceStore};
use proctor_core::{
    EvaluationPolicy, HttpPerception, Perception, RefreshSummary, ReportCache, METRICS,
};
use tracing::{info, Level};

/// One partial refresh: every exam without a cached report gets one.
async fn startup_refresh(
    store: Arc<dyn EvidenceStore>,
    perception: &Perception,
) -> Result<RefreshSummary> {
    let cache = ReportCache::new(store, perception, &EvaluationPolicy::default());
    cache.refresh().await.context("Startup refresh failed")
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    proctor_core::init_tracing(false, Level::INFO);
    info!(version = proctor_core::VERSION, "proctord starting");

    let config = StoreConfig::from_env();
    info!(store = %config.describe(), "connecting to evidence store");
    let store = SurrealEvidenceStore::connect(&config)
        .await
        .context("Failed to connect to evidence store")?;

    let client = HttpPerception::from_env().context("Failed to create perception client")?;
    info!(url = %client.config().base_url, "using perception server");

    let summary = startup_refresh(Arc::new(store), &Perception::shared(Arc::new(client))).await?;
    info!(
        materialized = ?summary.materialized,
        skipped = ?summary.skipped,
        failed = ?summary.failed,
        "startup refresh finished"
    );

    METRICS.flush();
    Ok(())
}
