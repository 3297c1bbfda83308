//! Documents stored in the village collections.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    #[serde(rename = "user_id")]
    pub id: Uuid,
    pub name: String,
    pub address: String,
    pub registration_date: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WellStatus {
    Active,
    Inactive,
}

impl WellStatus {
    pub const ALL: [WellStatus; 2] = [WellStatus::Active, WellStatus::Inactive];
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Well {
    #[serde(rename = "well_id")]
    pub id: Uuid,
    pub location: Location,
    pub owner_user_id: Uuid,
    pub authorization_date: Option<DateTime<Utc>>,
    pub status: WellStatus,
    pub last_status_change: Option<DateTime<Utc>>,
}

impl Well {
    /// A well is legal once it carries an authorization date.
    pub fn is_authorized(&self) -> bool {
        self.authorization_date.is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConsumptionRecord {
    pub user_id: Uuid,
    #[serde(rename = "date")]
    pub timestamp: DateTime<Utc>,
    #[serde(rename = "consumption_m3")]
    pub consumption: f64,
    pub previous_reading: f64,
    pub current_reading: f64,
    pub variation: f64,
}

impl ConsumptionRecord {
    pub fn new(
        user_id: Uuid,
        timestamp: DateTime<Utc>,
        previous_reading: f64,
        current_reading: f64,
    ) -> Self {
        let delta = current_reading - previous_reading;
        Self {
            user_id,
            timestamp,
            consumption: delta,
            previous_reading,
            current_reading,
            variation: delta,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ControlType {
    Inspection,
    Verification,
    Audit,
}

impl ControlType {
    pub const ALL: [ControlType; 3] = [
        ControlType::Inspection,
        ControlType::Verification,
        ControlType::Audit,
    ];
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ControlResult {
    Legal,
    #[serde(rename = "No anomalies")]
    NoAnomalies,
}

impl ControlResult {
    pub const ALL: [ControlResult; 2] = [ControlResult::Legal, ControlResult::NoAnomalies];
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ControlActivity {
    #[serde(rename = "control_id")]
    pub id: Uuid,
    #[serde(rename = "date")]
    pub timestamp: DateTime<Utc>,
    pub control_type: ControlType,
    pub result: ControlResult,
    pub observations: String,
    pub well_id: Uuid,
}

/// Immutable view of all four collections at one point in time.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Snapshot {
    pub users: Vec<User>,
    pub wells: Vec<Well>,
    pub consumption: Vec<ConsumptionRecord>,
    pub activities: Vec<ControlActivity>,
}

impl Snapshot {
    pub fn legal_wells(&self) -> impl Iterator<Item = &Well> {
        self.wells.iter().filter(|well| well.is_authorized())
    }

    pub fn unauthorized_wells(&self) -> impl Iterator<Item = &Well> {
        self.wells.iter().filter(|well| !well.is_authorized())
    }
}
