use crate::application_impl::cache_aside::read_through;
use crate::application_impl::cache_invalidation::{Mutation, invalidate};
use crate::application_impl::cache_keys::{
    ENTITY_TTL_SECS, employee_key, employees_key, normalize_search,
};
use crate::application_port::{CacheService, Cached, EmployeeInput, EmployeeService, RecordError};
use crate::domain_model::*;
use crate::domain_port::{EmployeeRepo, SquadRepo};
use std::sync::Arc;
use tracing::info;

pub struct RealEmployeeService {
    employee_repo: Arc<dyn EmployeeRepo>,
    squad_repo: Arc<dyn SquadRepo>,
    cache: Arc<dyn CacheService>,
}

impl RealEmployeeService {
    pub fn new(
        employee_repo: Arc<dyn EmployeeRepo>,
        squad_repo: Arc<dyn SquadRepo>,
        cache: Arc<dyn CacheService>,
    ) -> Self {
        RealEmployeeService {
            employee_repo,
            squad_repo,
            cache,
        }
    }

    async fn ensure_squad(&self, squad_id: SquadId) -> Result<(), RecordError> {
        if self.squad_repo.exists(squad_id).await? {
            Ok(())
        } else {
            Err(RecordError::SquadNotFound)
        }
    }
}

fn check_hours(hours: i32) -> Result<i32, RecordError> {
    if estimated_hours_in_range(hours) {
        Ok(hours)
    } else {
        Err(RecordError::EstimatedHoursOutOfRange)
    }
}

fn trimmed(name: Option<String>) -> Option<String> {
    name.map(|n| n.trim().to_string()).filter(|n| !n.is_empty())
}

#[async_trait::async_trait]
impl EmployeeService for RealEmployeeService {
    async fn list(
        &self,
        search: Option<&str>,
    ) -> Result<Cached<Vec<EmployeeDetails>>, RecordError> {
        let search = normalize_search(search);
        read_through(
            self.cache.as_ref(),
            &employees_key(search),
            ENTITY_TTL_SECS,
            || self.employee_repo.list(search),
        )
        .await
    }

    async fn get(&self, employee_id: EmployeeId) -> Result<Cached<EmployeeDetails>, RecordError> {
        read_through(
            self.cache.as_ref(),
            &employee_key(employee_id),
            ENTITY_TTL_SECS,
            || async move {
                self.employee_repo
                    .get(employee_id)
                    .await?
                    .ok_or(RecordError::EmployeeNotFound)
            },
        )
        .await
    }

    async fn create(&self, input: EmployeeInput) -> Result<EmployeeDetails, RecordError> {
        let (Some(name), Some(hours), Some(squad_id)) =
            (trimmed(input.name), input.estimated_hours, input.squad_id)
        else {
            return Err(RecordError::EmployeeFieldsRequired);
        };
        let estimated_hours = check_hours(hours)?;
        self.ensure_squad(squad_id).await?;

        let employee = self
            .employee_repo
            .create(&NewEmployee {
                name,
                estimated_hours,
                squad_id,
            })
            .await?;
        invalidate(self.cache.as_ref(), Mutation::EmployeeCreated).await;
        info!(employee_id = %employee.id, %squad_id, "employee created");
        Ok(employee)
    }

    async fn update(
        &self,
        employee_id: EmployeeId,
        input: EmployeeInput,
    ) -> Result<EmployeeDetails, RecordError> {
        let patch = EmployeePatch {
            name: trimmed(input.name),
            estimated_hours: input.estimated_hours.map(check_hours).transpose()?,
            squad_id: input.squad_id,
        };
        if let Some(squad_id) = patch.squad_id {
            self.ensure_squad(squad_id).await?;
        }
        if patch.is_empty() {
            return self
                .employee_repo
                .get(employee_id)
                .await?
                .ok_or(RecordError::EmployeeNotFound);
        }

        let employee = self
            .employee_repo
            .update(employee_id, &patch)
            .await?
            .ok_or(RecordError::EmployeeNotFound)?;
        invalidate(self.cache.as_ref(), Mutation::EmployeeUpdated(employee_id)).await;
        Ok(employee)
    }

    async fn delete(&self, employee_id: EmployeeId) -> Result<(), RecordError> {
        if !self.employee_repo.delete(employee_id).await? {
            return Err(RecordError::EmployeeNotFound);
        }
        invalidate(self.cache.as_ref(), Mutation::EmployeeDeleted(employee_id)).await;
        info!(%employee_id, "employee deleted");
        Ok(())
    }
}
