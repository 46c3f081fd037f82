use crate::application_port::{Cached, RecordError};
use crate::domain_model::*;

#[derive(Debug, Clone, Default)]
pub struct ReportInput {
    pub description: Option<String>,
    pub employee_id: Option<EmployeeId>,
    pub spent_hours: Option<i32>,
}

/// Raw `startDate`/`endDate` query values.
#[derive(Debug, Clone, Default)]
pub struct PeriodInput {
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

#[async_trait::async_trait]
pub trait ReportService: Send + Sync {
    async fn list(&self) -> Result<Cached<Vec<ReportDetails>>, RecordError>;
    async fn create(&self, input: ReportInput) -> Result<ReportDetails, RecordError>;
    async fn squad_member_hours(
        &self,
        squad_id: SquadId,
        period: PeriodInput,
    ) -> Result<Cached<Vec<MemberHours>>, RecordError>;
    async fn squad_total_hours(
        &self,
        squad_id: SquadId,
        period: PeriodInput,
    ) -> Result<Cached<SquadTotalHours>, RecordError>;
    async fn squad_average_hours(
        &self,
        squad_id: SquadId,
        period: PeriodInput,
    ) -> Result<Cached<SquadAverageHours>, RecordError>;
    async fn dashboard(&self) -> Result<Cached<DashboardStats>, RecordError>;
}
