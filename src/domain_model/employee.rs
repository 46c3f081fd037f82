use crate::domain_model::{Squad, SquadId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

pub const MIN_ESTIMATED_HOURS: i32 = 1;
pub const MAX_ESTIMATED_HOURS: i32 = 12;

#[derive(
    Debug, Clone, Copy, Ord, PartialOrd, Eq, PartialEq, Hash, Serialize, Deserialize, sqlx::Type,
)]
#[sqlx(transparent)]
pub struct EmployeeId(pub uuid::Uuid);

impl EmployeeId {
    pub fn new_v4() -> Self {
        EmployeeId(uuid::Uuid::new_v4())
    }
}

impl fmt::Display for EmployeeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for EmployeeId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        uuid::Uuid::from_str(s).map(EmployeeId)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Employee {
    pub id: EmployeeId,
    pub name: String,
    pub estimated_hours: i32,
    pub squad_id: SquadId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// An employee together with the squad it belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmployeeDetails {
    pub id: EmployeeId,
    pub name: String,
    pub estimated_hours: i32,
    pub squad_id: SquadId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub squad: Squad,
}

impl EmployeeDetails {
    pub fn new(employee: Employee, squad: Squad) -> Self {
        EmployeeDetails {
            id: employee.id,
            name: employee.name,
            estimated_hours: employee.estimated_hours,
            squad_id: employee.squad_id,
            created_at: employee.created_at,
            updated_at: employee.updated_at,
            squad,
        }
    }
}

#[derive(Debug, Clone)]
pub struct NewEmployee {
    pub name: String,
    pub estimated_hours: i32,
    pub squad_id: SquadId,
}

/// Partial update; `None` leaves the column untouched.
#[derive(Debug, Clone, Default)]
pub struct EmployeePatch {
    pub name: Option<String>,
    pub estimated_hours: Option<i32>,
    pub squad_id: Option<SquadId>,
}

impl EmployeePatch {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.estimated_hours.is_none() && self.squad_id.is_none()
    }
}

pub fn estimated_hours_in_range(hours: i32) -> bool {
    (MIN_ESTIMATED_HOURS..=MAX_ESTIMATED_HOURS).contains(&hours)
}
