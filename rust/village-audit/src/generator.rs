//! Synthetic village dataset with exactly one planted unlicensed well.

use crate::{
    error::{AuditError, Result},
    ids::next_id,
    models::{
        ConsumptionRecord, ControlActivity, ControlResult, ControlType, Location, Snapshot, User,
        Well, WellStatus,
    },
    store::{self, DocumentStore},
    text::TextProvider,
    time::{at_midnight, date_between, days_after, years_before},
};
use chrono::{DateTime, Duration, Utc};
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::ops::Range;
use tracing::{debug, info};
use uuid::Uuid;

pub const DEFAULT_USERS: usize = 1000;
pub const DEFAULT_READINGS_PER_USER: usize = 50;
pub const DEFAULT_MAX_WELLS_PER_USER: u32 = 10;
pub const DEFAULT_COVERAGE_RATIO: f64 = 0.9;
const OBSERVATION_WORDS: usize = 10;
const READING_INTERVAL_DAYS: i64 = 7;
const SERIES_LOOKBACK_DAYS: i64 = 365;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub min_latitude: f64,
    pub max_latitude: f64,
    pub min_longitude: f64,
    pub max_longitude: f64,
}

/// Geographic extent of the village.
pub const VILLAGE_BOUNDS: BoundingBox = BoundingBox {
    min_latitude: 42.788357,
    max_latitude: 42.822458,
    min_longitude: -5.669483,
    max_longitude: -5.593844,
};

impl BoundingBox {
    pub fn contains(&self, location: &Location) -> bool {
        (self.min_latitude..=self.max_latitude).contains(&location.latitude)
            && (self.min_longitude..=self.max_longitude).contains(&location.longitude)
    }

    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Location {
        Location {
            latitude: rng.gen_range(self.min_latitude..=self.max_latitude),
            longitude: rng.gen_range(self.min_longitude..=self.max_longitude),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct GeneratorParams {
    pub users: usize,
    pub readings_per_user: usize,
    pub max_wells_per_user: u32,
    /// Share of legal wells that receive a control activity.
    pub coverage_ratio: f64,
    /// Weekly meter increment for ordinary residents, in m³.
    pub normal_usage: Range<f64>,
    /// Weekly meter increment for the owner of the unlicensed well, in m³.
    pub illegal_usage: Range<f64>,
    pub bounds: BoundingBox,
}

impl Default for GeneratorParams {
    fn default() -> Self {
        Self {
            users: DEFAULT_USERS,
            readings_per_user: DEFAULT_READINGS_PER_USER,
            max_wells_per_user: DEFAULT_MAX_WELLS_PER_USER,
            coverage_ratio: DEFAULT_COVERAGE_RATIO,
            normal_usage: 0.0..10.0,
            illegal_usage: 20.0..50.0,
            bounds: VILLAGE_BOUNDS,
        }
    }
}

impl GeneratorParams {
    pub fn with_users(users: usize) -> Self {
        Self {
            users,
            ..Self::default()
        }
    }

    fn validate(&self) -> Result<()> {
        if self.users == 0 {
            return Err(AuditError::InvalidParams(
                "user count must be at least 1".into(),
            ));
        }
        if self.max_wells_per_user == 0 {
            return Err(AuditError::InvalidParams(
                "max_wells_per_user must be at least 1".into(),
            ));
        }
        if !(0.0..=1.0).contains(&self.coverage_ratio) {
            return Err(AuditError::InvalidParams(format!(
                "coverage_ratio {} outside [0, 1]",
                self.coverage_ratio
            )));
        }
        for (label, range) in [
            ("normal_usage", &self.normal_usage),
            ("illegal_usage", &self.illegal_usage),
        ] {
            if range.is_empty() || range.start < 0.0 {
                return Err(AuditError::InvalidParams(format!(
                    "{label} must be a non-empty, non-negative range"
                )));
            }
        }
        Ok(())
    }
}

/// Ground truth for the planted anomaly. Never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlantedAnomaly {
    pub user_id: Uuid,
    pub well_id: Uuid,
}

#[derive(Debug, Clone)]
pub struct GeneratedDataset {
    pub snapshot: Snapshot,
    pub planted: PlantedAnomaly,
}

pub fn seeded_rng(seed: u64) -> ChaCha8Rng {
    ChaCha8Rng::seed_from_u64(seed)
}

/// Builds a full dataset as of `now`.
pub fn generate<R: Rng>(
    rng: &mut R,
    text: &dyn TextProvider,
    params: &GeneratorParams,
    now: DateTime<Utc>,
) -> Result<GeneratedDataset> {
    params.validate()?;

    let users = generate_users(rng, text, params.users, now);
    let illegal_user = users[rng.gen_range(0..users.len())].id;

    let (wells, illegal_well) = generate_wells(rng, params, &users, illegal_user, now);
    let consumption = generate_consumption(rng, params, &users, illegal_user, now);
    let activities = generate_control_activities(rng, text, params, &wells, now);

    info!(
        users = users.len(),
        wells = wells.len(),
        consumption = consumption.len(),
        activities = activities.len(),
        "generated village dataset"
    );

    Ok(GeneratedDataset {
        snapshot: Snapshot {
            users,
            wells,
            consumption,
            activities,
        },
        planted: PlantedAnomaly {
            user_id: illegal_user,
            well_id: illegal_well,
        },
    })
}

/// Replaces the store contents with the generated collections.
pub async fn persist(
    store: &dyn DocumentStore,
    dataset: &GeneratedDataset,
    batch_size: usize,
) -> Result<()> {
    store::save_snapshot(store, &dataset.snapshot, batch_size).await
}

fn generate_users<R: Rng>(
    rng: &mut R,
    text: &dyn TextProvider,
    count: usize,
    now: DateTime<Utc>,
) -> Vec<User> {
    let today = now.date_naive();
    let earliest = years_before(today, 5);

    (0..count)
        .map(|_| User {
            id: next_id(rng),
            name: text.name(rng),
            address: text.address(rng),
            registration_date: at_midnight(date_between(rng, earliest, today)),
        })
        .collect()
}

fn generate_wells<R: Rng>(
    rng: &mut R,
    params: &GeneratorParams,
    users: &[User],
    illegal_user: Uuid,
    now: DateTime<Utc>,
) -> (Vec<Well>, Uuid) {
    let today = now.date_naive();
    let long_ago = (years_before(today, 30), years_before(today, 5));
    let recent = (years_before(today, 5), today);

    let mut wells = Vec::new();
    let mut illegal_well = Uuid::nil();

    for user in users {
        if user.id == illegal_user {
            let well = Well {
                id: next_id(rng),
                location: params.bounds.sample(rng),
                owner_user_id: user.id,
                authorization_date: None,
                status: WellStatus::Inactive,
                last_status_change: None,
            };
            illegal_well = well.id;
            debug!(well_id = %well.id, "planted unlicensed well");
            wells.push(well);
            continue;
        }

        let count = rng.gen_range(1..=params.max_wells_per_user);
        for _ in 0..count {
            let (start, end) = if rng.gen_bool(0.5) { long_ago } else { recent };
            let authorization = at_midnight(date_between(rng, start, end));
            let last_change = days_after(rng, authorization, now);
            let status = *WellStatus::ALL
                .choose(rng)
                .unwrap_or(&WellStatus::Inactive);

            wells.push(Well {
                id: next_id(rng),
                location: params.bounds.sample(rng),
                owner_user_id: user.id,
                authorization_date: Some(authorization),
                status,
                last_status_change: Some(last_change),
            });
        }
    }

    (wells, illegal_well)
}

fn generate_consumption<R: Rng>(
    rng: &mut R,
    params: &GeneratorParams,
    users: &[User],
    illegal_user: Uuid,
    now: DateTime<Utc>,
) -> Vec<ConsumptionRecord> {
    let series_start = now - Duration::days(SERIES_LOOKBACK_DAYS);
    let mut records = Vec::with_capacity(users.len() * params.readings_per_user);

    for user in users {
        let usage = if user.id == illegal_user {
            params.illegal_usage.clone()
        } else {
            params.normal_usage.clone()
        };

        let mut previous = rng.gen_range(0.0..100.0);
        let mut timestamp = series_start;
        for _ in 0..params.readings_per_user {
            let current = previous + rng.gen_range(usage.clone());
            records.push(ConsumptionRecord::new(user.id, timestamp, previous, current));
            previous = current;
            timestamp += Duration::days(READING_INTERVAL_DAYS);
        }
    }

    records
}

fn generate_control_activities<R: Rng>(
    rng: &mut R,
    text: &dyn TextProvider,
    params: &GeneratorParams,
    wells: &[Well],
    now: DateTime<Utc>,
) -> Vec<ControlActivity> {
    let legal: Vec<&Well> = wells.iter().filter(|well| well.is_authorized()).collect();
    let sample_size = (params.coverage_ratio * legal.len() as f64).floor() as usize;

    let selected: Vec<&Well> = legal
        .choose_multiple(rng, sample_size)
        .copied()
        .collect();

    let mut activities = Vec::with_capacity(selected.len());
    for well in selected {
        let Some(start) = well.last_status_change.or(well.authorization_date) else {
            continue;
        };
        let control_type = *ControlType::ALL
            .choose(rng)
            .unwrap_or(&ControlType::Inspection);
        let result = *ControlResult::ALL
            .choose(rng)
            .unwrap_or(&ControlResult::Legal);

        activities.push(ControlActivity {
            id: next_id(rng),
            timestamp: days_after(rng, start, now),
            control_type,
            result,
            observations: text.sentence(rng, OBSERVATION_WORDS),
            well_id: well.id,
        });
    }

    activities
}
