use chrono::{DateTime, TimeZone, Utc};
use std::sync::Once;
use village_audit::{
    generate_into,
    generator::{GeneratedDataset, GeneratorParams},
    store::DocumentStore,
};

static TRACING_INIT: Once = Once::new();

pub const BATCH_SIZE: usize = 500;

pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        let _ = tracing_subscriber::fmt::try_init();
    });
}

/// Audit clock shared by every integration test.
pub fn fixed_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 9, 30, 18, 45, 12).unwrap()
}

pub async fn seed_store(
    store: &dyn DocumentStore,
    users: usize,
    seed: u64,
) -> GeneratedDataset {
    init_tracing();
    generate_into(
        store,
        &GeneratorParams::with_users(users),
        seed,
        BATCH_SIZE,
        fixed_now(),
    )
    .await
    .expect("dataset generation should succeed")
}
