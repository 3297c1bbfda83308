//! One audit pass: load the persisted snapshot, run every check, then run
//! the detector and derive the verification code for whoever it names.

use crate::{
    detector::{self, Detection, DetectionReport},
    error::Result,
    store::{self, DocumentStore},
    validator::{self, CheckReport, Summary},
    verification::verification_code,
};
use chrono::{DateTime, Utc};
use std::fmt;
use tracing::info;

#[derive(Debug, Clone, PartialEq)]
pub struct AuditReport {
    pub checks: Vec<CheckReport>,
    pub summary: Summary,
    pub detection: DetectionReport,
    pub verification_code: Option<String>,
}

pub async fn audit(
    store: &dyn DocumentStore,
    top_k: usize,
    now: DateTime<Utc>,
) -> Result<AuditReport> {
    let snapshot = store::load_snapshot(store).await?;

    let checks = validator::run_all(&snapshot, now);
    let summary = validator::summarize(&checks);
    info!(
        passed = summary.passed,
        warned = summary.warned,
        failed = summary.failed,
        "validation finished"
    );

    let detection = detector::detect(&snapshot, top_k);
    let verification_code = match &detection.detection {
        Detection::Found(found) => found
            .owner
            .as_ref()
            .map(|owner| verification_code(&owner.name)),
        Detection::NotFound(_) => None,
    };

    Ok(AuditReport {
        checks,
        summary,
        detection,
        verification_code,
    })
}

impl fmt::Display for AuditReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Starting data validation and analysis...")?;
        for check in &self.checks {
            writeln!(f)?;
            writeln!(f, "{check}")?;
        }

        writeln!(f)?;
        writeln!(f, "Identifying the illegal well and its owner...")?;
        match &self.detection.detection {
            Detection::Found(found) => {
                writeln!(f)?;
                writeln!(f, "=== Illegal Well and Owner Identified ===")?;
                writeln!(f, "Illegal Well ID: {}", found.well.id)?;
                writeln!(f, "Owner User ID: {}", found.well.owner_user_id)?;
                if let Some(owner) = &found.owner {
                    writeln!(f, "Owner Name: {}", owner.name)?;
                    writeln!(f, "Owner Address: {}", owner.address)?;
                }
                writeln!(
                    f,
                    "Owner Total Consumption: {:.2} m3",
                    found.owner_total_consumption
                )?;
                if let Some(code) = &self.verification_code {
                    writeln!(f, "Verification code: {code}")?;
                }
            }
            Detection::NotFound(reason) => writeln!(f, "{reason}")?,
        }

        writeln!(f)?;
        writeln!(
            f,
            "Checks: {} passed, {} warned, {} failed",
            self.summary.passed, self.summary.warned, self.summary.failed
        )?;
        write!(f, "Data validation and analysis complete.")
    }
}
