use super::util::is_fk_violation;
use crate::application_port::*;
use crate::domain_model::*;
use crate::domain_port::*;
use chrono::{DateTime, Utc};
use sqlx::MySqlPool;

macro_rules! select_report_details {
    ($tail:literal) => {
        concat!(
            r#"
SELECT r.report_id, r.description, r.employee_id, r.spent_hours, r.created_at,
       e.name AS employee_name, e.estimated_hours, e.squad_id,
       e.created_at AS employee_created_at, e.updated_at AS employee_updated_at,
       s.name AS squad_name, s.created_at AS squad_created_at, s.updated_at AS squad_updated_at
FROM time_report r
JOIN employee e ON e.employee_id = r.employee_id
JOIN squad s ON s.squad_id = e.squad_id
"#,
            $tail
        )
    };
}

#[derive(sqlx::FromRow)]
struct ReportRow {
    report_id: ReportId,
    description: String,
    employee_id: EmployeeId,
    spent_hours: i32,
    created_at: DateTime<Utc>,
}

impl From<ReportRow> for Report {
    fn from(row: ReportRow) -> Self {
        Report {
            id: row.report_id,
            description: row.description,
            employee_id: row.employee_id,
            spent_hours: row.spent_hours,
            created_at: row.created_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct ReportDetailsRow {
    #[sqlx(flatten)]
    report: ReportRow,
    employee_name: String,
    estimated_hours: i32,
    squad_id: SquadId,
    employee_created_at: DateTime<Utc>,
    employee_updated_at: DateTime<Utc>,
    squad_name: String,
    squad_created_at: DateTime<Utc>,
    squad_updated_at: DateTime<Utc>,
}

impl From<ReportDetailsRow> for ReportDetails {
    fn from(row: ReportDetailsRow) -> Self {
        let squad = Squad {
            id: row.squad_id,
            name: row.squad_name,
            created_at: row.squad_created_at,
            updated_at: row.squad_updated_at,
        };
        let employee = Employee {
            id: row.report.employee_id,
            name: row.employee_name,
            estimated_hours: row.estimated_hours,
            squad_id: row.squad_id,
            created_at: row.employee_created_at,
            updated_at: row.employee_updated_at,
        };
        ReportDetails::new(row.report.into(), EmployeeDetails::new(employee, squad))
    }
}

fn store_err(e: sqlx::Error) -> RecordError {
    RecordError::Store(e.to_string())
}

pub struct MySqlReportRepo {
    pool: MySqlPool,
}

impl MySqlReportRepo {
    pub fn new(pool: MySqlPool) -> Self {
        MySqlReportRepo { pool }
    }
}

#[async_trait::async_trait]
impl ReportRepo for MySqlReportRepo {
    async fn list(&self) -> Result<Vec<ReportDetails>, RecordError> {
        let rows = sqlx::query_as::<_, ReportDetailsRow>(select_report_details!(
            "ORDER BY r.created_at DESC, r.report_id DESC"
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(store_err)?;
        Ok(rows.into_iter().map(ReportDetails::from).collect())
    }

    async fn create(&self, report: &NewReport) -> Result<ReportDetails, RecordError> {
        let report_id = ReportId::new_v4();
        sqlx::query(
            r#"
INSERT INTO time_report (report_id, description, employee_id, spent_hours, created_at)
VALUES (?, ?, ?, ?, ?)
"#,
        )
        .bind(report_id)
        .bind(&report.description)
        .bind(report.employee_id)
        .bind(report.spent_hours)
        .bind(now_millis())
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if is_fk_violation(&e) {
                RecordError::EmployeeNotFound
            } else {
                store_err(e)
            }
        })?;

        let row = sqlx::query_as::<_, ReportDetailsRow>(select_report_details!(
            "WHERE r.report_id = ?"
        ))
        .bind(report_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(store_err)?;
        row.map(ReportDetails::from)
            .ok_or(RecordError::EmployeeNotFound)
    }

    async fn list_by_squad_between(
        &self,
        squad_id: SquadId,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<Report>, RecordError> {
        let rows = sqlx::query_as::<_, ReportRow>(
            r#"
SELECT r.report_id, r.description, r.employee_id, r.spent_hours, r.created_at
FROM time_report r
JOIN employee e ON e.employee_id = r.employee_id
WHERE e.squad_id = ? AND r.created_at BETWEEN ? AND ?
ORDER BY r.created_at, r.report_id
"#,
        )
        .bind(squad_id)
        .bind(from)
        .bind(to)
        .fetch_all(&self.pool)
        .await
        .map_err(store_err)?;
        Ok(rows.into_iter().map(Report::from).collect())
    }

    async fn count(&self) -> Result<i64, RecordError> {
        sqlx::query_scalar("SELECT COUNT(*) FROM time_report")
            .fetch_one(&self.pool)
            .await
            .map_err(store_err)
    }
}
