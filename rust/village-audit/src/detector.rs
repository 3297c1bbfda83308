//! Recovers the unlicensed well from consumption and inspection signals.
//!
//! The pipeline ranks residents by total metered consumption, keeps the wells
//! of the top `K` that are inactive or unauthorized, and drops any well that
//! was ever inspected. It stops at the first empty stage instead of widening
//! the search.

use crate::models::{Snapshot, User, Well, WellStatus};
use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};
use std::fmt;
use tracing::{debug, info};
use uuid::Uuid;

pub const DEFAULT_TOP_K: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UserConsumption {
    pub user_id: Uuid,
    pub total: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DetectedWell {
    pub well: Well,
    /// Missing only when the owner document itself is absent from the snapshot.
    pub owner: Option<User>,
    pub owner_total_consumption: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MissReason {
    NoConsumption,
    NoSuspectWells,
    AllSuspectsInspected,
}

impl fmt::Display for MissReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MissReason::NoConsumption => f.write_str("No consumption records to rank."),
            MissReason::NoSuspectWells => {
                f.write_str("No suspect wells found among high consumption users.")
            }
            MissReason::AllSuspectsInspected => {
                f.write_str("No illegal well found among suspect wells.")
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Detection {
    Found(Box<DetectedWell>),
    NotFound(MissReason),
}

impl Detection {
    pub fn well_id(&self) -> Option<Uuid> {
        match self {
            Detection::Found(found) => Some(found.well.id),
            Detection::NotFound(_) => None,
        }
    }

    pub fn owner_id(&self) -> Option<Uuid> {
        match self {
            Detection::Found(found) => Some(found.well.owner_user_id),
            Detection::NotFound(_) => None,
        }
    }
}

/// Intermediate stage results, kept for diagnostics.
#[derive(Debug, Clone, PartialEq)]
pub struct DetectionReport {
    pub top_consumers: Vec<UserConsumption>,
    pub suspect_wells: Vec<Uuid>,
    pub uninspected_wells: Vec<Uuid>,
    pub detection: Detection,
}

impl DetectionReport {
    fn miss(
        top_consumers: Vec<UserConsumption>,
        suspect_wells: Vec<Uuid>,
        uninspected_wells: Vec<Uuid>,
        reason: MissReason,
    ) -> Self {
        debug!(reason = ?reason, "detection pipeline emptied");
        Self {
            top_consumers,
            suspect_wells,
            uninspected_wells,
            detection: Detection::NotFound(reason),
        }
    }
}

/// Sums consumption per user, highest first. Equal totals order by user id.
pub fn rank_consumers(snapshot: &Snapshot) -> Vec<UserConsumption> {
    let mut totals: HashMap<Uuid, f64> = HashMap::new();
    for record in &snapshot.consumption {
        *totals.entry(record.user_id).or_default() += record.consumption;
    }

    let mut ranked: Vec<UserConsumption> = totals
        .into_iter()
        .map(|(user_id, total)| UserConsumption { user_id, total })
        .collect();
    ranked.sort_by(|a, b| {
        b.total
            .total_cmp(&a.total)
            .then_with(|| a.user_id.cmp(&b.user_id))
    });
    ranked
}

/// Looks for the unlicensed well among the `top_k` heaviest consumers.
/// A `top_k` of zero is treated as one.
pub fn detect(snapshot: &Snapshot, top_k: usize) -> DetectionReport {
    let mut top_consumers = rank_consumers(snapshot);
    top_consumers.truncate(top_k.max(1));

    if top_consumers.is_empty() {
        return DetectionReport::miss(
            top_consumers,
            Vec::new(),
            Vec::new(),
            MissReason::NoConsumption,
        );
    }

    let rank: HashMap<Uuid, usize> = top_consumers
        .iter()
        .enumerate()
        .map(|(position, consumer)| (consumer.user_id, position))
        .collect();

    let suspects: Vec<&Well> = snapshot
        .wells
        .iter()
        .filter(|well| rank.contains_key(&well.owner_user_id))
        .filter(|well| well.status == WellStatus::Inactive || !well.is_authorized())
        .collect();
    let suspect_wells: Vec<Uuid> = suspects.iter().map(|well| well.id).collect();
    debug!(suspects = suspects.len(), "filtered suspect wells");

    if suspects.is_empty() {
        return DetectionReport::miss(
            top_consumers,
            suspect_wells,
            Vec::new(),
            MissReason::NoSuspectWells,
        );
    }

    let inspected: HashSet<Uuid> = snapshot
        .activities
        .iter()
        .map(|activity| activity.well_id)
        .collect();
    let mut uninspected: Vec<&Well> = suspects
        .into_iter()
        .filter(|well| !inspected.contains(&well.id))
        .collect();
    uninspected.sort_by(|a, b| tie_break(a, b, &rank));
    let uninspected_wells: Vec<Uuid> = uninspected.iter().map(|well| well.id).collect();

    let Some(chosen) = uninspected.first() else {
        return DetectionReport::miss(
            top_consumers,
            suspect_wells,
            uninspected_wells,
            MissReason::AllSuspectsInspected,
        );
    };

    let owner = snapshot
        .users
        .iter()
        .find(|user| user.id == chosen.owner_user_id)
        .cloned();
    let owner_total_consumption = top_consumers[rank[&chosen.owner_user_id]].total;

    info!(
        well_id = %chosen.id,
        owner_id = %chosen.owner_user_id,
        candidates = uninspected_wells.len(),
        "identified illegal well"
    );

    DetectionReport {
        detection: Detection::Found(Box::new(DetectedWell {
            well: (*chosen).clone(),
            owner,
            owner_total_consumption,
        })),
        top_consumers,
        suspect_wells,
        uninspected_wells,
    }
}

/// Unauthorized wells first, then by owner consumption rank, then by well id.
fn tie_break(a: &Well, b: &Well, rank: &HashMap<Uuid, usize>) -> Ordering {
    a.is_authorized()
        .cmp(&b.is_authorized())
        .then_with(|| rank[&a.owner_user_id].cmp(&rank[&b.owner_user_id]))
        .then_with(|| a.id.cmp(&b.id))
}
