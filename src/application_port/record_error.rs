#[derive(Debug, thiserror::Error)]
pub enum RecordError {
    #[error("squad not found")]
    SquadNotFound,
    #[error("squad name is required")]
    SquadNameRequired,
    #[error("employee not found")]
    EmployeeNotFound,
    #[error("name, estimatedHours and squadId are required")]
    EmployeeFieldsRequired,
    #[error("estimatedHours must be between 1 and 12")]
    EstimatedHoursOutOfRange,
    #[error("description, employeeId and spentHours are required")]
    ReportFieldsRequired,
    #[error("startDate and endDate are required (YYYY-MM-DD)")]
    InvalidPeriod,
    #[error("duplicate record")]
    Duplicate,
    #[error("store error: {0}")]
    Store(String),
}
