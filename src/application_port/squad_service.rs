use crate::application_port::{Cached, RecordError};
use crate::domain_model::{SquadDetails, SquadId};

#[derive(Debug, Clone, Default)]
pub struct SquadInput {
    pub name: Option<String>,
}

#[async_trait::async_trait]
pub trait SquadService: Send + Sync {
    async fn list(&self, search: Option<&str>) -> Result<Cached<Vec<SquadDetails>>, RecordError>;
    async fn get(&self, squad_id: SquadId) -> Result<Cached<SquadDetails>, RecordError>;
    async fn create(&self, input: SquadInput) -> Result<SquadDetails, RecordError>;
    async fn update(&self, squad_id: SquadId, input: SquadInput)
    -> Result<SquadDetails, RecordError>;
    async fn delete(&self, squad_id: SquadId) -> Result<(), RecordError>;
}
