use crate::application_port::*;
use crate::domain_model::*;

#[async_trait::async_trait]
pub trait SquadRepo: Send + Sync {
    /// Ordered by name; `search` is a case-insensitive substring of the name.
    async fn list(&self, search: Option<&str>) -> Result<Vec<SquadDetails>, RecordError>;

    async fn get(&self, squad_id: SquadId) -> Result<Option<SquadDetails>, RecordError>;

    async fn exists(&self, squad_id: SquadId) -> Result<bool, RecordError>;

    async fn create(&self, name: &str) -> Result<SquadDetails, RecordError>;

    async fn update(
        &self,
        squad_id: SquadId,
        name: &str,
    ) -> Result<Option<SquadDetails>, RecordError>;

    /// Removes the squad with its employees and their reports.
    async fn delete(&self, squad_id: SquadId) -> Result<bool, RecordError>;

    async fn count(&self) -> Result<i64, RecordError>;
}
