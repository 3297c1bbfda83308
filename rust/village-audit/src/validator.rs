//! Independent invariant checks over a dataset snapshot.
//!
//! Every check is a plain function from `(&Snapshot, now)` to an [`Outcome`].
//! Checks never read each other's results and never mutate the snapshot, so
//! running the registry twice over the same data yields identical reports.

use crate::models::{ConsumptionRecord, Snapshot, Well};
use chrono::{DateTime, Utc};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::fmt;
use uuid::Uuid;

pub const COVERAGE_MIN: f64 = 0.85;
pub const COVERAGE_MAX: f64 = 0.95;
const READING_TOLERANCE: f64 = 1e-9;

#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Pass {
        message: String,
    },
    /// Soft statistical deviation; the data is plausible but off target.
    Warn {
        message: String,
    },
    Fail {
        message: String,
        violations: Vec<String>,
    },
}

impl Outcome {
    pub fn label(&self) -> &'static str {
        match self {
            Outcome::Pass { .. } => "PASS",
            Outcome::Warn { .. } => "WARN",
            Outcome::Fail { .. } => "FAIL",
        }
    }

    pub fn message(&self) -> &str {
        match self {
            Outcome::Pass { message } | Outcome::Warn { message } => message,
            Outcome::Fail { message, .. } => message,
        }
    }

    pub fn violations(&self) -> &[String] {
        match self {
            Outcome::Fail { violations, .. } => violations.as_slice(),
            _ => &[],
        }
    }

    pub fn is_pass(&self) -> bool {
        matches!(self, Outcome::Pass { .. })
    }

    pub fn is_fail(&self) -> bool {
        matches!(self, Outcome::Fail { .. })
    }
}

pub type CheckFn = fn(&Snapshot, DateTime<Utc>) -> Outcome;

#[derive(Clone, Copy)]
pub struct Check {
    pub name: &'static str,
    pub description: &'static str,
    run: CheckFn,
}

impl Check {
    pub const fn new(name: &'static str, description: &'static str, run: CheckFn) -> Self {
        Self {
            name,
            description,
            run,
        }
    }

    pub fn run(&self, snapshot: &Snapshot, now: DateTime<Utc>) -> CheckReport {
        CheckReport {
            name: self.name,
            description: self.description,
            outcome: (self.run)(snapshot, now),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CheckReport {
    pub name: &'static str,
    pub description: &'static str,
    pub outcome: Outcome,
}

impl fmt::Display for CheckReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.description)?;
        write!(f, "{}: {}", self.outcome.label(), self.outcome.message())?;
        for violation in self.outcome.violations() {
            write!(f, "\n - {violation}")?;
        }
        Ok(())
    }
}

pub const CHECKS: &[Check] = &[
    Check::new(
        "status-change-ordering",
        "Checking that 'last_status_change' dates are after 'authorization_date'...",
        check_status_change_ordering,
    ),
    Check::new(
        "control-coverage",
        "Checking control activities coverage (should be ~90%)...",
        check_control_coverage,
    ),
    Check::new(
        "illegal-well-isolation",
        "Checking that there are no control activities for the illegal well...",
        check_illegal_well_isolation,
    ),
    Check::new(
        "activity-dates",
        "Checking that control activity dates are after 'last_status_change' and not in the future...",
        check_activity_dates,
    ),
    Check::new(
        "future-registrations",
        "Checking for users with 'registration_date' in the future...",
        check_future_registrations,
    ),
    Check::new(
        "future-well-dates",
        "Checking for wells with 'last_status_change' or 'authorization_date' in the future...",
        check_future_well_dates,
    ),
    Check::new(
        "name-length",
        "Checking for users with names shorter than 3 characters...",
        check_name_length,
    ),
    Check::new(
        "referential-integrity",
        "Checking that wells, readings and activities reference existing documents...",
        check_referential_integrity,
    ),
    Check::new(
        "meter-readings",
        "Checking that meter readings never decrease and consumption matches the readings...",
        check_meter_readings,
    ),
];

pub fn find(name: &str) -> Option<&'static Check> {
    CHECKS.iter().find(|check| check.name == name)
}

pub fn run_all(snapshot: &Snapshot, now: DateTime<Utc>) -> Vec<CheckReport> {
    CHECKS.iter().map(|check| check.run(snapshot, now)).collect()
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Summary {
    pub passed: usize,
    pub warned: usize,
    pub failed: usize,
}

pub fn summarize(reports: &[CheckReport]) -> Summary {
    reports
        .iter()
        .fold(Summary::default(), |mut summary, report| {
            match report.outcome {
                Outcome::Pass { .. } => summary.passed += 1,
                Outcome::Warn { .. } => summary.warned += 1,
                Outcome::Fail { .. } => summary.failed += 1,
            }
            summary
        })
}

fn verdict(violations: Vec<String>, pass: &str, fail: &str) -> Outcome {
    if violations.is_empty() {
        Outcome::Pass {
            message: pass.to_string(),
        }
    } else {
        Outcome::Fail {
            message: fail.to_string(),
            violations,
        }
    }
}

fn check_status_change_ordering(snapshot: &Snapshot, _now: DateTime<Utc>) -> Outcome {
    let violations = snapshot
        .legal_wells()
        .filter_map(|well| {
            let authorized = well.authorization_date?;
            match well.last_status_change {
                Some(changed) if changed >= authorized => None,
                Some(changed) => Some(format!(
                    "Well ID: {}, Authorization Date: {authorized}, Last Status Change: {changed}",
                    well.id
                )),
                None => Some(format!(
                    "Well ID: {}, Authorization Date: {authorized}, Last Status Change: missing",
                    well.id
                )),
            }
        })
        .collect();

    verdict(
        violations,
        "All 'last_status_change' dates are after 'authorization_date'.",
        "Found wells where 'last_status_change' is before 'authorization_date':",
    )
}

fn check_control_coverage(snapshot: &Snapshot, _now: DateTime<Utc>) -> Outcome {
    let legal = snapshot.legal_wells().count();
    let covered = snapshot
        .activities
        .iter()
        .map(|activity| activity.well_id)
        .collect::<HashSet<_>>()
        .len();
    let ratio = if legal == 0 {
        0.0
    } else {
        covered as f64 / legal as f64
    };

    let stats = format!(
        "Total legal wells: {legal}, wells with control activities: {covered}, coverage: {:.2}%",
        ratio * 100.0
    );

    if (COVERAGE_MIN..=COVERAGE_MAX).contains(&ratio) {
        Outcome::Pass {
            message: format!("Control activities coverage is within expected range. {stats}"),
        }
    } else {
        Outcome::Warn {
            message: format!("Control activities coverage is outside expected range. {stats}"),
        }
    }
}

fn check_illegal_well_isolation(snapshot: &Snapshot, _now: DateTime<Utc>) -> Outcome {
    let unlicensed: HashSet<Uuid> = snapshot.unauthorized_wells().map(|well| well.id).collect();
    if unlicensed.is_empty() {
        return Outcome::Warn {
            message: "No illegal well found (no well without 'authorization_date').".to_string(),
        };
    }

    let violations = snapshot
        .activities
        .iter()
        .filter(|activity| unlicensed.contains(&activity.well_id))
        .map(|activity| {
            format!(
                "Control ID: {}, Well ID: {}, Date: {}",
                activity.id, activity.well_id, activity.timestamp
            )
        })
        .collect();

    verdict(
        violations,
        "No control activities found for the illegal well.",
        "Found control activities for the illegal well:",
    )
}

fn check_activity_dates(snapshot: &Snapshot, now: DateTime<Utc>) -> Outcome {
    let wells: HashMap<Uuid, &Well> = snapshot.wells.iter().map(|well| (well.id, well)).collect();

    let violations = snapshot
        .activities
        .iter()
        .filter_map(|activity| {
            if activity.timestamp > now {
                return Some(format!(
                    "Control ID: {}, Control Date: {} is in the future",
                    activity.id, activity.timestamp
                ));
            }
            let changed = wells.get(&activity.well_id)?.last_status_change?;
            (activity.timestamp < changed).then(|| {
                format!(
                    "Control ID: {}, Control Date: {}, Last Status Change: {changed}",
                    activity.id, activity.timestamp
                )
            })
        })
        .collect();

    verdict(
        violations,
        "All control activity dates are after 'last_status_change' of the wells.",
        "Found control activities dated before 'last_status_change' or in the future:",
    )
}

fn check_future_registrations(snapshot: &Snapshot, now: DateTime<Utc>) -> Outcome {
    let violations = snapshot
        .users
        .iter()
        .filter(|user| user.registration_date > now)
        .map(|user| {
            format!(
                "User ID: {}, Registration Date: {}",
                user.id, user.registration_date
            )
        })
        .collect();

    verdict(
        violations,
        "No users have 'registration_date' in the future.",
        "Found users with 'registration_date' in the future:",
    )
}

fn check_future_well_dates(snapshot: &Snapshot, now: DateTime<Utc>) -> Outcome {
    let in_future = |date: Option<DateTime<Utc>>| date.is_some_and(|date| date > now);
    let violations = snapshot
        .wells
        .iter()
        .filter(|well| in_future(well.authorization_date) || in_future(well.last_status_change))
        .map(|well| {
            format!(
                "Well ID: {}, Authorization Date: {}, Last Status Change: {}",
                well.id,
                display_optional(well.authorization_date),
                display_optional(well.last_status_change)
            )
        })
        .collect();

    verdict(
        violations,
        "No wells have dates in the future.",
        "Found wells with dates in the future:",
    )
}

fn check_name_length(snapshot: &Snapshot, _now: DateTime<Utc>) -> Outcome {
    let violations = snapshot
        .users
        .iter()
        .filter(|user| user.name.chars().count() < 3)
        .map(|user| format!("User ID: {}, Name: {}", user.id, user.name))
        .collect();

    verdict(
        violations,
        "No users have names shorter than 3 characters.",
        "Found users with names shorter than 3 characters:",
    )
}

fn check_referential_integrity(snapshot: &Snapshot, _now: DateTime<Utc>) -> Outcome {
    let users: HashSet<Uuid> = snapshot.users.iter().map(|user| user.id).collect();
    let wells: HashSet<Uuid> = snapshot.wells.iter().map(|well| well.id).collect();
    let mut violations = Vec::new();

    for well in &snapshot.wells {
        if !users.contains(&well.owner_user_id) {
            violations.push(format!(
                "Well ID: {} references missing owner {}",
                well.id, well.owner_user_id
            ));
        }
    }

    let mut orphan_readings: BTreeMap<Uuid, usize> = BTreeMap::new();
    for record in &snapshot.consumption {
        if !users.contains(&record.user_id) {
            *orphan_readings.entry(record.user_id).or_default() += 1;
        }
    }
    for (user_id, count) in orphan_readings {
        violations.push(format!(
            "User ID: {user_id} has {count} consumption records but no user document"
        ));
    }

    for activity in &snapshot.activities {
        if !wells.contains(&activity.well_id) {
            violations.push(format!(
                "Control ID: {} references missing well {}",
                activity.id, activity.well_id
            ));
        }
    }

    verdict(
        violations,
        "All references resolve to existing documents.",
        "Found documents referencing missing users or wells:",
    )
}

fn check_meter_readings(snapshot: &Snapshot, _now: DateTime<Utc>) -> Outcome {
    let mut series: BTreeMap<Uuid, Vec<&ConsumptionRecord>> = BTreeMap::new();
    for record in &snapshot.consumption {
        series.entry(record.user_id).or_default().push(record);
    }

    let mut violations = Vec::new();
    for (user_id, mut records) in series {
        records.sort_by_key(|record| record.timestamp);

        for record in &records {
            let delta = record.current_reading - record.previous_reading;
            let tolerance = READING_TOLERANCE * record.current_reading.abs().max(1.0);
            if delta < 0.0 {
                violations.push(format!(
                    "User ID: {user_id}, Date: {}, reading went from {:.3} to {:.3}",
                    record.timestamp, record.previous_reading, record.current_reading
                ));
            } else if (record.consumption - delta).abs() > tolerance {
                violations.push(format!(
                    "User ID: {user_id}, Date: {}, consumption {:.3} does not match readings delta {:.3}",
                    record.timestamp, record.consumption, delta
                ));
            }
        }

        // A record may not start below where the previous one ended.
        for pair in records.windows(2) {
            if pair[1].previous_reading < pair[0].current_reading {
                violations.push(format!(
                    "User ID: {user_id}, reading dropped from {:.3} on {} to {:.3} on {}",
                    pair[0].current_reading,
                    pair[0].timestamp,
                    pair[1].previous_reading,
                    pair[1].timestamp
                ));
            }
        }
    }

    verdict(
        violations,
        "All meter readings are non-decreasing and consistent with consumption.",
        "Found inconsistent meter readings:",
    )
}

fn display_optional(date: Option<DateTime<Utc>>) -> String {
    date.map_or_else(|| "none".to_string(), |date| date.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{
        ControlActivity, ControlResult, ControlType, Location, User, WellStatus,
    };
    use chrono::{Duration, TimeZone};
    use pretty_assertions::assert_eq;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 15, 12, 0, 0).unwrap()
    }

    fn id(n: u128) -> Uuid {
        Uuid::from_u128(n)
    }

    fn user(n: u128, name: &str) -> User {
        User {
            id: id(n),
            name: name.to_string(),
            address: "Calle Mayor, 1".to_string(),
            registration_date: now() - Duration::days(100),
        }
    }

    fn legal_well(n: u128, owner: u128) -> Well {
        let authorized = now() - Duration::days(400);
        Well {
            id: id(n),
            location: Location {
                latitude: 42.8,
                longitude: -5.6,
            },
            owner_user_id: id(owner),
            authorization_date: Some(authorized),
            status: WellStatus::Active,
            last_status_change: Some(authorized + Duration::days(10)),
        }
    }

    fn unlicensed_well(n: u128, owner: u128) -> Well {
        Well {
            authorization_date: None,
            last_status_change: None,
            status: WellStatus::Inactive,
            ..legal_well(n, owner)
        }
    }

    fn activity(n: u128, well: u128, timestamp: DateTime<Utc>) -> ControlActivity {
        ControlActivity {
            id: id(n),
            timestamp,
            control_type: ControlType::Inspection,
            result: ControlResult::Legal,
            observations: "Sin incidencias.".to_string(),
            well_id: id(well),
        }
    }

    /// Two users, ten legal wells (nine inspected) and one unlicensed well.
    fn healthy() -> Snapshot {
        let mut wells: Vec<Well> = (10..20).map(|n| legal_well(n, 1)).collect();
        wells.push(unlicensed_well(99, 2));
        let activities = (10..19)
            .map(|n| activity(100 + n, n, now() - Duration::days(5)))
            .collect();
        let consumption = vec![
            ConsumptionRecord::new(id(1), now() - Duration::days(14), 10.0, 12.0),
            ConsumptionRecord::new(id(1), now() - Duration::days(7), 12.0, 15.5),
        ];
        Snapshot {
            users: vec![user(1, "Ana Ruiz"), user(2, "Pedro Gil")],
            wells,
            consumption,
            activities,
        }
    }

    fn outcome(name: &str, snapshot: &Snapshot) -> Outcome {
        find(name).unwrap().run(snapshot, now()).outcome
    }

    #[test]
    fn healthy_snapshot_passes_every_check() {
        let reports = run_all(&healthy(), now());
        assert_eq!(reports.len(), CHECKS.len());
        for report in &reports {
            assert!(report.outcome.is_pass(), "{report}");
        }
        assert_eq!(
            summarize(&reports),
            Summary {
                passed: CHECKS.len(),
                warned: 0,
                failed: 0
            }
        );
    }

    #[test]
    fn check_names_are_unique() {
        let names: HashSet<&str> = CHECKS.iter().map(|check| check.name).collect();
        assert_eq!(names.len(), CHECKS.len());
    }

    #[test]
    fn status_change_before_authorization_fails() {
        let mut snapshot = healthy();
        let well = &mut snapshot.wells[0];
        well.last_status_change = well.authorization_date.map(|d| d - Duration::days(1));

        let result = outcome("status-change-ordering", &snapshot);
        assert!(result.is_fail());
        assert_eq!(result.violations().len(), 1);
        assert!(result.violations()[0].contains(&id(10).to_string()));
    }

    #[test]
    fn coverage_outside_band_warns() {
        let mut snapshot = healthy();
        snapshot.activities.truncate(5);
        let result = outcome("control-coverage", &snapshot);
        assert!(matches!(result, Outcome::Warn { .. }));
        assert!(result.message().contains("50.00%"));
    }

    #[test]
    fn coverage_without_legal_wells_warns() {
        let mut snapshot = healthy();
        snapshot.wells.retain(|well| !well.is_authorized());
        snapshot.activities.clear();
        assert!(matches!(
            outcome("control-coverage", &snapshot),
            Outcome::Warn { .. }
        ));
    }

    #[test]
    fn inspected_unlicensed_well_fails_isolation() {
        let mut snapshot = healthy();
        snapshot.activities.push(activity(500, 99, now()));
        let result = outcome("illegal-well-isolation", &snapshot);
        assert!(result.is_fail());
        assert!(result.violations()[0].contains(&id(500).to_string()));
    }

    #[test]
    fn missing_unlicensed_well_warns() {
        let mut snapshot = healthy();
        snapshot.wells.retain(Well::is_authorized);
        assert!(matches!(
            outcome("illegal-well-isolation", &snapshot),
            Outcome::Warn { .. }
        ));
    }

    #[test]
    fn activity_before_status_change_fails() {
        let mut snapshot = healthy();
        snapshot.activities[0].timestamp = now() - Duration::days(1000);
        let result = outcome("activity-dates", &snapshot);
        assert!(result.is_fail());
        assert_eq!(result.violations().len(), 1);
    }

    #[test]
    fn activity_in_future_fails() {
        let mut snapshot = healthy();
        snapshot.activities[0].timestamp = now() + Duration::days(1);
        assert!(outcome("activity-dates", &snapshot).is_fail());
    }

    #[test]
    fn future_activity_on_unknown_well_fails() {
        let mut snapshot = healthy();
        snapshot
            .activities
            .push(activity(700, 777, now() + Duration::days(3)));
        let result = outcome("activity-dates", &snapshot);
        assert!(result.is_fail());
        assert_eq!(result.violations().len(), 1);
        assert!(result.violations()[0].contains(&id(700).to_string()));
    }

    #[test]
    fn registration_exactly_now_passes_and_one_second_later_fails() {
        let mut snapshot = healthy();
        snapshot.users[0].registration_date = now();
        assert!(outcome("future-registrations", &snapshot).is_pass());

        snapshot.users[0].registration_date = now() + Duration::seconds(1);
        let result = outcome("future-registrations", &snapshot);
        assert!(result.is_fail());
        assert_eq!(result.violations().len(), 1);
    }

    #[test]
    fn future_well_dates_fail() {
        let mut snapshot = healthy();
        snapshot.wells[3].last_status_change = Some(now() + Duration::hours(2));
        let result = outcome("future-well-dates", &snapshot);
        assert!(result.is_fail());
        assert!(result.violations()[0].contains(&id(13).to_string()));
    }

    #[test]
    fn name_length_counts_code_points() {
        let mut snapshot = healthy();
        snapshot.users[0].name = "Íñi".to_string();
        assert!(outcome("name-length", &snapshot).is_pass());

        snapshot.users[1].name = "Ñu".to_string();
        let result = outcome("name-length", &snapshot);
        assert!(result.is_fail());
        assert_eq!(result.violations().len(), 1);
    }

    #[test]
    fn dangling_references_fail_integrity() {
        let mut snapshot = healthy();
        snapshot.activities.push(activity(600, 777, now()));
        snapshot
            .consumption
            .push(ConsumptionRecord::new(id(888), now(), 0.0, 1.0));
        let result = outcome("referential-integrity", &snapshot);
        assert_eq!(result.violations().len(), 2);
    }

    #[test]
    fn decreasing_readings_fail() {
        let mut snapshot = healthy();
        snapshot.consumption.push(ConsumptionRecord::new(
            id(1),
            now() - Duration::days(1),
            15.5,
            15.5,
        ));
        assert!(outcome("meter-readings", &snapshot).is_pass());

        snapshot.consumption.push(ConsumptionRecord::new(
            id(1),
            now(),
            3.0,
            4.0,
        ));
        let result = outcome("meter-readings", &snapshot);
        assert!(result.is_fail());
        assert_eq!(result.violations().len(), 1);
    }

    #[test]
    fn meter_reset_between_records_fails() {
        let mut snapshot = healthy();
        snapshot.consumption = vec![
            ConsumptionRecord::new(id(2), now() - Duration::days(14), 10.0, 12.0),
            ConsumptionRecord::new(id(2), now() - Duration::days(7), 3.0, 13.0),
        ];
        let result = outcome("meter-readings", &snapshot);
        assert!(result.is_fail());
        assert_eq!(result.violations().len(), 1);
        assert!(result.violations()[0].contains("12.000"));
    }

    #[test]
    fn tampered_consumption_fails() {
        let mut snapshot = healthy();
        snapshot.consumption[0].consumption = 40.0;
        assert!(outcome("meter-readings", &snapshot).is_fail());
    }

    #[test]
    fn rerunning_checks_is_idempotent() {
        let mut snapshot = healthy();
        snapshot.activities.truncate(4);
        snapshot.users[1].name = "Al".to_string();
        let first = run_all(&snapshot, now());
        let second = run_all(&snapshot, now());
        assert_eq!(first, second);
    }

    #[test]
    fn report_renders_violations_on_separate_lines() {
        let mut snapshot = healthy();
        snapshot.users[0].name = "Al".to_string();
        let rendered = find("name-length").unwrap().run(&snapshot, now()).to_string();
        let lines: Vec<&str> = rendered.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[1].starts_with("FAIL: "));
        assert!(lines[2].starts_with(" - User ID: "));
    }
}
