use super::util::like_pattern;
use crate::application_port::*;
use crate::domain_model::*;
use crate::domain_port::*;
use chrono::{DateTime, Utc};
use sqlx::MySqlPool;

macro_rules! select_squads {
    ($condition:literal) => {
        concat!(
            r#"
SELECT s.squad_id, s.name AS squad_name, s.created_at AS squad_created_at,
       s.updated_at AS squad_updated_at,
       e.employee_id, e.name AS employee_name, e.estimated_hours,
       e.created_at AS employee_created_at, e.updated_at AS employee_updated_at
FROM squad s
LEFT JOIN employee e ON e.squad_id = s.squad_id
WHERE "#,
            $condition,
            r#"
ORDER BY s.name, s.squad_id, e.name, e.employee_id
"#
        )
    };
}

/// One row per (squad, member); squads without members yield a single row
/// with NULL member columns.
#[derive(sqlx::FromRow)]
struct SquadMemberRow {
    squad_id: SquadId,
    squad_name: String,
    squad_created_at: DateTime<Utc>,
    squad_updated_at: DateTime<Utc>,
    employee_id: Option<EmployeeId>,
    employee_name: Option<String>,
    estimated_hours: Option<i32>,
    employee_created_at: Option<DateTime<Utc>>,
    employee_updated_at: Option<DateTime<Utc>>,
}

impl SquadMemberRow {
    fn squad(&self) -> Squad {
        Squad {
            id: self.squad_id,
            name: self.squad_name.clone(),
            created_at: self.squad_created_at,
            updated_at: self.squad_updated_at,
        }
    }

    fn member(self) -> Option<Employee> {
        Some(Employee {
            id: self.employee_id?,
            name: self.employee_name?,
            estimated_hours: self.estimated_hours?,
            squad_id: self.squad_id,
            created_at: self.employee_created_at?,
            updated_at: self.employee_updated_at?,
        })
    }
}

/// Rows arrive ordered by squad, so members of one squad are adjacent.
fn group_members(rows: Vec<SquadMemberRow>) -> Vec<SquadDetails> {
    let mut squads: Vec<SquadDetails> = Vec::new();
    for row in rows {
        if squads.last().map(|s| s.id) != Some(row.squad_id) {
            squads.push(SquadDetails::new(row.squad(), Vec::new()));
        }
        if let (Some(member), Some(current)) = (row.member(), squads.last_mut()) {
            current.employees.push(member);
        }
    }
    squads
}

fn store_err(e: sqlx::Error) -> RecordError {
    RecordError::Store(e.to_string())
}

pub struct MySqlSquadRepo {
    pool: MySqlPool,
}

impl MySqlSquadRepo {
    pub fn new(pool: MySqlPool) -> Self {
        MySqlSquadRepo { pool }
    }
}

#[async_trait::async_trait]
impl SquadRepo for MySqlSquadRepo {
    async fn list(&self, search: Option<&str>) -> Result<Vec<SquadDetails>, RecordError> {
        let pattern = search.map(like_pattern);
        let rows = sqlx::query_as::<_, SquadMemberRow>(select_squads!("(? IS NULL OR s.name LIKE ?)"))
            .bind(pattern.clone())
            .bind(pattern)
            .fetch_all(&self.pool)
            .await
            .map_err(store_err)?;
        Ok(group_members(rows))
    }

    async fn get(&self, squad_id: SquadId) -> Result<Option<SquadDetails>, RecordError> {
        let rows = sqlx::query_as::<_, SquadMemberRow>(select_squads!("s.squad_id = ?"))
            .bind(squad_id)
            .fetch_all(&self.pool)
            .await
            .map_err(store_err)?;
        Ok(group_members(rows).into_iter().next())
    }

    async fn exists(&self, squad_id: SquadId) -> Result<bool, RecordError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(1) FROM squad WHERE squad_id = ?")
            .bind(squad_id)
            .fetch_one(&self.pool)
            .await
            .map_err(store_err)?;
        Ok(count > 0)
    }

    async fn create(&self, name: &str) -> Result<SquadDetails, RecordError> {
        let squad = Squad {
            id: SquadId::new_v4(),
            name: name.to_string(),
            created_at: now_millis(),
            updated_at: now_millis(),
        };
        sqlx::query(
            "INSERT INTO squad (squad_id, name, created_at, updated_at) VALUES (?, ?, ?, ?)",
        )
        .bind(squad.id)
        .bind(&squad.name)
        .bind(squad.created_at)
        .bind(squad.updated_at)
        .execute(&self.pool)
        .await
        .map_err(store_err)?;
        Ok(SquadDetails::new(squad, Vec::new()))
    }

    async fn update(
        &self,
        squad_id: SquadId,
        name: &str,
    ) -> Result<Option<SquadDetails>, RecordError> {
        sqlx::query("UPDATE squad SET name = ?, updated_at = ? WHERE squad_id = ?")
            .bind(name)
            .bind(now_millis())
            .bind(squad_id)
            .execute(&self.pool)
            .await
            .map_err(store_err)?;
        self.get(squad_id).await
    }

    async fn delete(&self, squad_id: SquadId) -> Result<bool, RecordError> {
        // employees and their reports go with it (ON DELETE CASCADE)
        let result = sqlx::query("DELETE FROM squad WHERE squad_id = ?")
            .bind(squad_id)
            .execute(&self.pool)
            .await
            .map_err(store_err)?;
        Ok(result.rows_affected() > 0)
    }

    async fn count(&self) -> Result<i64, RecordError> {
        sqlx::query_scalar("SELECT COUNT(*) FROM squad")
            .fetch_one(&self.pool)
            .await
            .map_err(store_err)
    }
}
