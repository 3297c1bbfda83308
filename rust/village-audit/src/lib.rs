pub mod audit;
pub mod config;
pub mod detector;
pub mod error;
pub mod generator;
pub mod ids;
pub mod models;
pub mod store;
pub mod telemetry;
pub mod text;
pub mod time;
pub mod validator;
pub mod verification;

use crate::{
    config::AppConfig,
    generator::{GeneratedDataset, GeneratorParams},
    store::{DocumentStore, JsonStore},
    text::SpanishWordlist,
};
use anyhow::Context;
use chrono::{DateTime, Utc};
use tracing::info;

/// Generates a dataset as of `now` from `seed` and writes it to `store`.
pub async fn generate_into(
    store: &dyn DocumentStore,
    params: &GeneratorParams,
    seed: u64,
    batch_size: usize,
    now: DateTime<Utc>,
) -> error::Result<GeneratedDataset> {
    let mut rng = generator::seeded_rng(seed);
    let dataset = generator::generate(&mut rng, &SpanishWordlist, params, now)?;
    generator::persist(store, &dataset, batch_size).await?;
    Ok(dataset)
}

/// Entry point for `village-generate`.
pub async fn run_generate() -> anyhow::Result<()> {
    let config = AppConfig::from_env()?;
    let seed = config.resolve_seed();
    let store = JsonStore::new(&config.data_dir);
    info!(seed, data_dir = %config.data_dir.display(), "starting dataset generation");

    println!("Generating village dataset (seed {seed})...");
    let dataset = generate_into(
        &store,
        &GeneratorParams::default(),
        seed,
        config.batch_size,
        Utc::now(),
    )
    .await
    .with_context(|| {
        format!(
            "failed to generate dataset into {}",
            config.data_dir.display()
        )
    })?;

    let snapshot = &dataset.snapshot;
    println!("Users: {}", snapshot.users.len());
    println!("Registered wells: {}", snapshot.wells.len());
    println!("Consumption records: {}", snapshot.consumption.len());
    println!("Control activities: {}", snapshot.activities.len());
    println!("Data generation complete.");
    Ok(())
}

/// Entry point for `village-audit`.
pub async fn run_audit() -> anyhow::Result<()> {
    let config = AppConfig::from_env()?;
    let store = JsonStore::new(&config.data_dir);
    info!(data_dir = %config.data_dir.display(), top_k = config.top_k, "starting audit");

    let report = audit::audit(&store, config.top_k, Utc::now())
        .await
        .with_context(|| format!("failed to audit {}", config.data_dir.display()))?;

    println!("{report}");
    Ok(())
}
