use crate::application_impl::cache_aside::read_through;
use crate::application_impl::cache_invalidation::{Mutation, invalidate};
use crate::application_impl::cache_keys::{ENTITY_TTL_SECS, normalize_search, squad_key, squads_key};
use crate::application_port::{CacheService, Cached, RecordError, SquadInput, SquadService};
use crate::domain_model::{SquadDetails, SquadId};
use crate::domain_port::SquadRepo;
use std::sync::Arc;
use tracing::info;

pub struct RealSquadService {
    squad_repo: Arc<dyn SquadRepo>,
    cache: Arc<dyn CacheService>,
}

impl RealSquadService {
    pub fn new(squad_repo: Arc<dyn SquadRepo>, cache: Arc<dyn CacheService>) -> Self {
        RealSquadService { squad_repo, cache }
    }
}

fn required_name(input: SquadInput) -> Result<String, RecordError> {
    input
        .name
        .map(|name| name.trim().to_string())
        .filter(|name| !name.is_empty())
        .ok_or(RecordError::SquadNameRequired)
}

#[async_trait::async_trait]
impl SquadService for RealSquadService {
    async fn list(&self, search: Option<&str>) -> Result<Cached<Vec<SquadDetails>>, RecordError> {
        let search = normalize_search(search);
        read_through(
            self.cache.as_ref(),
            &squads_key(search),
            ENTITY_TTL_SECS,
            || self.squad_repo.list(search),
        )
        .await
    }

    async fn get(&self, squad_id: SquadId) -> Result<Cached<SquadDetails>, RecordError> {
        read_through(
            self.cache.as_ref(),
            &squad_key(squad_id),
            ENTITY_TTL_SECS,
            || async move {
                self.squad_repo
                    .get(squad_id)
                    .await?
                    .ok_or(RecordError::SquadNotFound)
            },
        )
        .await
    }

    async fn create(&self, input: SquadInput) -> Result<SquadDetails, RecordError> {
        let name = required_name(input)?;
        let squad = self.squad_repo.create(&name).await?;
        invalidate(self.cache.as_ref(), Mutation::SquadCreated).await;
        info!(squad_id = %squad.id, "squad created");
        Ok(squad)
    }

    async fn update(
        &self,
        squad_id: SquadId,
        input: SquadInput,
    ) -> Result<SquadDetails, RecordError> {
        let name = required_name(input)?;
        let squad = self
            .squad_repo
            .update(squad_id, &name)
            .await?
            .ok_or(RecordError::SquadNotFound)?;
        invalidate(self.cache.as_ref(), Mutation::SquadUpdated(squad_id)).await;
        Ok(squad)
    }

    async fn delete(&self, squad_id: SquadId) -> Result<(), RecordError> {
        if !self.squad_repo.delete(squad_id).await? {
            return Err(RecordError::SquadNotFound);
        }
        invalidate(self.cache.as_ref(), Mutation::SquadDeleted(squad_id)).await;
        info!(%squad_id, "squad deleted");
        Ok(())
    }
}
