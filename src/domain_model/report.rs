use crate::domain_model::{EmployeeDetails, EmployeeId, ReportPeriod, SquadId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(
    Debug, Clone, Copy, Ord, PartialOrd, Eq, PartialEq, Hash, Serialize, Deserialize, sqlx::Type,
)]
#[sqlx(transparent)]
pub struct ReportId(pub uuid::Uuid);

impl ReportId {
    pub fn new_v4() -> Self {
        ReportId(uuid::Uuid::new_v4())
    }
}

impl fmt::Display for ReportId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    pub id: ReportId,
    pub description: String,
    pub employee_id: EmployeeId,
    pub spent_hours: i32,
    pub created_at: DateTime<Utc>,
}

/// A report with its employee and the employee's squad.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportDetails {
    pub id: ReportId,
    pub description: String,
    pub employee_id: EmployeeId,
    pub spent_hours: i32,
    pub created_at: DateTime<Utc>,
    pub employee: EmployeeDetails,
}

impl ReportDetails {
    pub fn new(report: Report, employee: EmployeeDetails) -> Self {
        ReportDetails {
            id: report.id,
            description: report.description,
            employee_id: report.employee_id,
            spent_hours: report.spent_hours,
            created_at: report.created_at,
            employee,
        }
    }
}

#[derive(Debug, Clone)]
pub struct NewReport {
    pub description: String,
    pub employee_id: EmployeeId,
    pub spent_hours: i32,
}

// region aggregates

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberHours {
    pub id: EmployeeId,
    pub name: String,
    pub estimated_hours: i32,
    pub total_spent_hours: i64,
    pub reports: Vec<Report>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SquadTotalHours {
    pub squad_id: SquadId,
    pub squad_name: String,
    pub period: ReportPeriod,
    pub total_hours: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SquadAverageHours {
    pub squad_id: SquadId,
    pub squad_name: String,
    pub period: ReportPeriod,
    pub total_hours: i64,
    pub total_days: i64,
    pub average_hours_per_day: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub total_employees: i64,
    pub total_squads: i64,
    pub total_reports: i64,
}

pub fn total_spent_hours(reports: &[Report]) -> i64 {
    reports.iter().map(|r| r.spent_hours as i64).sum()
}

pub fn round_hundredths(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

// endregion
