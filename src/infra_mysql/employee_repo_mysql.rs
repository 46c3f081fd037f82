use super::util::{is_fk_violation, like_pattern};
use crate::application_port::*;
use crate::domain_model::*;
use crate::domain_port::*;
use chrono::{DateTime, Utc};
use sqlx::MySqlPool;

macro_rules! select_employees {
    ($condition:literal) => {
        concat!(
            r#"
SELECT e.employee_id, e.name, e.estimated_hours, e.squad_id, e.created_at, e.updated_at,
       s.name AS squad_name, s.created_at AS squad_created_at, s.updated_at AS squad_updated_at
FROM employee e
JOIN squad s ON s.squad_id = e.squad_id
WHERE "#,
            $condition,
            r#"
ORDER BY e.name, e.employee_id
"#
        )
    };
}

#[derive(sqlx::FromRow)]
struct EmployeeRow {
    employee_id: EmployeeId,
    name: String,
    estimated_hours: i32,
    squad_id: SquadId,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<EmployeeRow> for Employee {
    fn from(row: EmployeeRow) -> Self {
        Employee {
            id: row.employee_id,
            name: row.name,
            estimated_hours: row.estimated_hours,
            squad_id: row.squad_id,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct EmployeeDetailsRow {
    #[sqlx(flatten)]
    employee: EmployeeRow,
    squad_name: String,
    squad_created_at: DateTime<Utc>,
    squad_updated_at: DateTime<Utc>,
}

impl From<EmployeeDetailsRow> for EmployeeDetails {
    fn from(row: EmployeeDetailsRow) -> Self {
        let squad = Squad {
            id: row.employee.squad_id,
            name: row.squad_name,
            created_at: row.squad_created_at,
            updated_at: row.squad_updated_at,
        };
        EmployeeDetails::new(row.employee.into(), squad)
    }
}

fn store_err(e: sqlx::Error) -> RecordError {
    RecordError::Store(e.to_string())
}

fn write_err(e: sqlx::Error) -> RecordError {
    if is_fk_violation(&e) {
        RecordError::SquadNotFound
    } else {
        store_err(e)
    }
}

pub struct MySqlEmployeeRepo {
    pool: MySqlPool,
}

impl MySqlEmployeeRepo {
    pub fn new(pool: MySqlPool) -> Self {
        MySqlEmployeeRepo { pool }
    }

    async fn require(&self, employee_id: EmployeeId) -> Result<EmployeeDetails, RecordError> {
        self.get(employee_id).await?.ok_or_else(|| {
            RecordError::Store(format!("employee {employee_id} missing after write"))
        })
    }
}

#[async_trait::async_trait]
impl EmployeeRepo for MySqlEmployeeRepo {
    async fn list(&self, search: Option<&str>) -> Result<Vec<EmployeeDetails>, RecordError> {
        let pattern = search.map(like_pattern);
        let rows = sqlx::query_as::<_, EmployeeDetailsRow>(select_employees!(
            "(? IS NULL OR e.name LIKE ?)"
        ))
        .bind(pattern.clone())
        .bind(pattern)
        .fetch_all(&self.pool)
        .await
        .map_err(store_err)?;
        Ok(rows.into_iter().map(EmployeeDetails::from).collect())
    }

    async fn get(&self, employee_id: EmployeeId) -> Result<Option<EmployeeDetails>, RecordError> {
        let row = sqlx::query_as::<_, EmployeeDetailsRow>(select_employees!("e.employee_id = ?"))
            .bind(employee_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(store_err)?;
        Ok(row.map(EmployeeDetails::from))
    }

    async fn exists(&self, employee_id: EmployeeId) -> Result<bool, RecordError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(1) FROM employee WHERE employee_id = ?")
            .bind(employee_id)
            .fetch_one(&self.pool)
            .await
            .map_err(store_err)?;
        Ok(count > 0)
    }

    async fn list_by_squad(&self, squad_id: SquadId) -> Result<Vec<Employee>, RecordError> {
        let rows = sqlx::query_as::<_, EmployeeRow>(
            r#"
SELECT employee_id, name, estimated_hours, squad_id, created_at, updated_at
FROM employee
WHERE squad_id = ?
ORDER BY name, employee_id
"#,
        )
        .bind(squad_id)
        .fetch_all(&self.pool)
        .await
        .map_err(store_err)?;
        Ok(rows.into_iter().map(Employee::from).collect())
    }

    async fn create(&self, employee: &NewEmployee) -> Result<EmployeeDetails, RecordError> {
        let employee_id = EmployeeId::new_v4();
        let now = now_millis();
        sqlx::query(
            r#"
INSERT INTO employee (employee_id, name, estimated_hours, squad_id, created_at, updated_at)
VALUES (?, ?, ?, ?, ?, ?)
"#,
        )
        .bind(employee_id)
        .bind(&employee.name)
        .bind(employee.estimated_hours)
        .bind(employee.squad_id)
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(write_err)?;
        self.require(employee_id).await
    }

    async fn update(
        &self,
        employee_id: EmployeeId,
        patch: &EmployeePatch,
    ) -> Result<Option<EmployeeDetails>, RecordError> {
        sqlx::query(
            r#"
UPDATE employee
SET name = COALESCE(?, name),
    estimated_hours = COALESCE(?, estimated_hours),
    squad_id = COALESCE(?, squad_id),
    updated_at = ?
WHERE employee_id = ?
"#,
        )
        .bind(patch.name.as_deref())
        .bind(patch.estimated_hours)
        .bind(patch.squad_id)
        .bind(now_millis())
        .bind(employee_id)
        .execute(&self.pool)
        .await
        .map_err(write_err)?;
        self.get(employee_id).await
    }

    async fn delete(&self, employee_id: EmployeeId) -> Result<bool, RecordError> {
        let result = sqlx::query("DELETE FROM employee WHERE employee_id = ?")
            .bind(employee_id)
            .execute(&self.pool)
            .await
            .map_err(store_err)?;
        Ok(result.rows_affected() > 0)
    }

    async fn count(&self) -> Result<i64, RecordError> {
        sqlx::query_scalar("SELECT COUNT(*) FROM employee")
            .fetch_one(&self.pool)
            .await
            .map_err(store_err)
    }
}
