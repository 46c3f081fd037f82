use crate::application_port::{Cached, RecordError};
use crate::domain_model::{EmployeeDetails, EmployeeId, SquadId};

#[derive(Debug, Clone, Default)]
pub struct EmployeeInput {
    pub name: Option<String>,
    pub estimated_hours: Option<i32>,
    pub squad_id: Option<SquadId>,
}

#[async_trait::async_trait]
pub trait EmployeeService: Send + Sync {
    async fn list(
        &self,
        search: Option<&str>,
    ) -> Result<Cached<Vec<EmployeeDetails>>, RecordError>;
    async fn get(&self, employee_id: EmployeeId) -> Result<Cached<EmployeeDetails>, RecordError>;
    /// All fields are required.
    async fn create(&self, input: EmployeeInput) -> Result<EmployeeDetails, RecordError>;
    /// Absent fields keep their current value.
    async fn update(
        &self,
        employee_id: EmployeeId,
        input: EmployeeInput,
    ) -> Result<EmployeeDetails, RecordError>;
    async fn delete(&self, employee_id: EmployeeId) -> Result<(), RecordError>;
}
