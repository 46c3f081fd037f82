use crate::application_port::*;
use crate::domain_model::*;
use chrono::{DateTime, Utc};

#[async_trait::async_trait]
pub trait ReportRepo: Send + Sync {
    /// Newest first.
    async fn list(&self) -> Result<Vec<ReportDetails>, RecordError>;

    /// The employee must exist (FK).
    async fn create(&self, report: &NewReport) -> Result<ReportDetails, RecordError>;

    /// Reports of the squad's employees created within `[from, to]`, oldest first.
    async fn list_by_squad_between(
        &self,
        squad_id: SquadId,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<Report>, RecordError>;

    async fn count(&self) -> Result<i64, RecordError>;
}
