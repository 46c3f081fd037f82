use crate::application_port::*;
use crate::domain_model::*;

#[async_trait::async_trait]
pub trait EmployeeRepo: Send + Sync {
    /// Ordered by name; `search` is a case-insensitive substring of the name.
    async fn list(&self, search: Option<&str>) -> Result<Vec<EmployeeDetails>, RecordError>;

    async fn get(&self, employee_id: EmployeeId) -> Result<Option<EmployeeDetails>, RecordError>;

    async fn exists(&self, employee_id: EmployeeId) -> Result<bool, RecordError>;

    /// Members of a squad ordered by name.
    async fn list_by_squad(&self, squad_id: SquadId) -> Result<Vec<Employee>, RecordError>;

    /// The squad must exist (FK).
    async fn create(&self, employee: &NewEmployee) -> Result<EmployeeDetails, RecordError>;

    async fn update(
        &self,
        employee_id: EmployeeId,
        patch: &EmployeePatch,
    ) -> Result<Option<EmployeeDetails>, RecordError>;

    /// Removes the employee with its reports.
    async fn delete(&self, employee_id: EmployeeId) -> Result<bool, RecordError>;

    async fn count(&self) -> Result<i64, RecordError>;
}
