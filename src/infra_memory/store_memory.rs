use crate::application_port::{AuthError, RecordError};
use crate::domain_model::*;
use crate::domain_port::{EmployeeRepo, ReportRepo, SquadRepo, UserRecord, UserRepo};
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use std::collections::HashSet;

/// All four repositories over process memory, with the same cascade and
/// ordering rules as the MySQL schema. No guard of one map is ever held
/// while another map is touched.
#[derive(Default)]
pub struct MemoryStore {
    users: DashMap<UserId, UserRecord>,
    emails: DashMap<String, UserId>,
    squads: DashMap<SquadId, Squad>,
    employees: DashMap<EmployeeId, Employee>,
    reports: DashMap<ReportId, Report>,
}

fn name_contains(name: &str, search: Option<&str>) -> bool {
    match search {
        Some(term) => name.to_lowercase().contains(&term.to_lowercase()),
        None => true,
    }
}

fn sort_by_name<T>(items: &mut [T], key: impl Fn(&T) -> (String, uuid::Uuid)) {
    items.sort_by_cached_key(|item| key(item));
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Move a report's timestamp. Returns `false` for an unknown report.
    pub fn backdate_report(&self, report_id: ReportId, created_at: DateTime<Utc>) -> bool {
        match self.reports.get_mut(&report_id) {
            Some(mut report) => {
                report.created_at = created_at;
                true
            }
            None => false,
        }
    }

    fn user_by_id(&self, user_id: UserId) -> Option<UserRecord> {
        self.users.get(&user_id).map(|u| u.clone())
    }

    fn squad(&self, squad_id: SquadId) -> Option<Squad> {
        self.squads.get(&squad_id).map(|s| s.clone())
    }

    fn members(&self, squad_id: SquadId) -> Vec<Employee> {
        let mut members: Vec<Employee> = self
            .employees
            .iter()
            .filter(|e| e.squad_id == squad_id)
            .map(|e| e.clone())
            .collect();
        sort_by_name(&mut members, |e| (e.name.to_lowercase(), e.id.0));
        members
    }

    fn squad_details(&self, squad: Squad) -> SquadDetails {
        let members = self.members(squad.id);
        SquadDetails::new(squad, members)
    }

    fn employee_details(&self, employee: Employee) -> Option<EmployeeDetails> {
        let squad = self.squad(employee.squad_id)?;
        Some(EmployeeDetails::new(employee, squad))
    }

    fn report_details(&self, report: Report) -> Option<ReportDetails> {
        let employee = self.employees.get(&report.employee_id).map(|e| e.clone())?;
        let employee = self.employee_details(employee)?;
        Some(ReportDetails::new(report, employee))
    }

    fn remove_reports_of(&self, employee_ids: &HashSet<EmployeeId>) {
        self.reports
            .retain(|_, report| !employee_ids.contains(&report.employee_id));
    }
}

#[async_trait::async_trait]
impl UserRepo for MemoryStore {
    async fn create(
        &self,
        email: &str,
        name: &str,
        password_hash: &str,
    ) -> Result<UserRecord, AuthError> {
        let user_id = UserId::new_v4();
        match self.emails.entry(email.to_lowercase()) {
            Entry::Occupied(_) => return Err(AuthError::UserExists),
            Entry::Vacant(slot) => {
                slot.insert(user_id);
            }
        }
        let now = now_millis();
        let rec = UserRecord {
            user_id,
            email: email.to_string(),
            name: name.to_string(),
            password_hash: password_hash.to_string(),
            refresh_token_hash: None,
            reset_token_hash: None,
            reset_token_expires_at: None,
            created_at: now,
            updated_at: now,
        };
        self.users.insert(user_id, rec.clone());
        Ok(rec)
    }

    async fn get_by_email(&self, email: &str) -> Result<Option<UserRecord>, AuthError> {
        let user_id = self.emails.get(&email.to_lowercase()).map(|id| *id);
        Ok(user_id.and_then(|id| self.user_by_id(id)))
    }

    async fn get_by_id(&self, user_id: UserId) -> Result<Option<UserRecord>, AuthError> {
        Ok(self.user_by_id(user_id))
    }

    async fn get_by_refresh_hash(
        &self,
        user_id: UserId,
        token_hash: &str,
    ) -> Result<Option<UserRecord>, AuthError> {
        Ok(self
            .user_by_id(user_id)
            .filter(|u| u.refresh_token_hash.as_deref() == Some(token_hash)))
    }

    async fn set_refresh_hash(
        &self,
        user_id: UserId,
        token_hash: Option<&str>,
    ) -> Result<(), AuthError> {
        if let Some(mut user) = self.users.get_mut(&user_id) {
            user.refresh_token_hash = token_hash.map(str::to_string);
            user.updated_at = now_millis();
        }
        Ok(())
    }

    async fn rotate_refresh_hash(
        &self,
        user_id: UserId,
        expected: &str,
        next: &str,
    ) -> Result<bool, AuthError> {
        let Some(mut user) = self.users.get_mut(&user_id) else {
            return Ok(false);
        };
        if user.refresh_token_hash.as_deref() != Some(expected) {
            return Ok(false);
        }
        user.refresh_token_hash = Some(next.to_string());
        user.updated_at = now_millis();
        Ok(true)
    }

    async fn set_reset_token(
        &self,
        user_id: UserId,
        token_hash: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<(), AuthError> {
        if let Some(mut user) = self.users.get_mut(&user_id) {
            user.reset_token_hash = Some(token_hash.to_string());
            user.reset_token_expires_at = Some(expires_at);
            user.updated_at = now_millis();
        }
        Ok(())
    }

    async fn get_by_reset_hash(
        &self,
        token_hash: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<UserRecord>, AuthError> {
        Ok(self
            .users
            .iter()
            .find(|u| {
                u.reset_token_hash.as_deref() == Some(token_hash)
                    && u.reset_token_expires_at.is_some_and(|at| at > now)
            })
            .map(|u| u.clone()))
    }

    async fn consume_reset_token(
        &self,
        user_id: UserId,
        token_hash: &str,
        now: DateTime<Utc>,
        password_hash: &str,
    ) -> Result<bool, AuthError> {
        let Some(mut user) = self.users.get_mut(&user_id) else {
            return Ok(false);
        };
        let live = user.reset_token_hash.as_deref() == Some(token_hash)
            && user.reset_token_expires_at.is_some_and(|at| at > now);
        if !live {
            return Ok(false);
        }
        user.password_hash = password_hash.to_string();
        user.reset_token_hash = None;
        user.reset_token_expires_at = None;
        user.updated_at = now_millis();
        Ok(true)
    }
}

#[async_trait::async_trait]
impl SquadRepo for MemoryStore {
    async fn list(&self, search: Option<&str>) -> Result<Vec<SquadDetails>, RecordError> {
        let mut squads: Vec<Squad> = self
            .squads
            .iter()
            .filter(|s| name_contains(&s.name, search))
            .map(|s| s.clone())
            .collect();
        sort_by_name(&mut squads, |s| (s.name.to_lowercase(), s.id.0));
        Ok(squads
            .into_iter()
            .map(|squad| self.squad_details(squad))
            .collect())
    }

    async fn get(&self, squad_id: SquadId) -> Result<Option<SquadDetails>, RecordError> {
        Ok(self.squad(squad_id).map(|squad| self.squad_details(squad)))
    }

    async fn exists(&self, squad_id: SquadId) -> Result<bool, RecordError> {
        Ok(self.squads.contains_key(&squad_id))
    }

    async fn create(&self, name: &str) -> Result<SquadDetails, RecordError> {
        let now = now_millis();
        let squad = Squad {
            id: SquadId::new_v4(),
            name: name.to_string(),
            created_at: now,
            updated_at: now,
        };
        self.squads.insert(squad.id, squad.clone());
        Ok(SquadDetails::new(squad, Vec::new()))
    }

    async fn update(
        &self,
        squad_id: SquadId,
        name: &str,
    ) -> Result<Option<SquadDetails>, RecordError> {
        let updated = self.squads.get_mut(&squad_id).map(|mut squad| {
            squad.name = name.to_string();
            squad.updated_at = now_millis();
            squad.clone()
        });
        Ok(updated.map(|squad| self.squad_details(squad)))
    }

    async fn delete(&self, squad_id: SquadId) -> Result<bool, RecordError> {
        if self.squads.remove(&squad_id).is_none() {
            return Ok(false);
        }
        let mut removed = HashSet::new();
        self.employees.retain(|id, employee| {
            if employee.squad_id == squad_id {
                removed.insert(*id);
                false
            } else {
                true
            }
        });
        self.remove_reports_of(&removed);
        Ok(true)
    }

    async fn count(&self) -> Result<i64, RecordError> {
        Ok(self.squads.len() as i64)
    }
}

#[async_trait::async_trait]
impl EmployeeRepo for MemoryStore {
    async fn list(&self, search: Option<&str>) -> Result<Vec<EmployeeDetails>, RecordError> {
        let mut employees: Vec<Employee> = self
            .employees
            .iter()
            .filter(|e| name_contains(&e.name, search))
            .map(|e| e.clone())
            .collect();
        sort_by_name(&mut employees, |e| (e.name.to_lowercase(), e.id.0));
        Ok(employees
            .into_iter()
            .filter_map(|employee| self.employee_details(employee))
            .collect())
    }

    async fn get(&self, employee_id: EmployeeId) -> Result<Option<EmployeeDetails>, RecordError> {
        let employee = self.employees.get(&employee_id).map(|e| e.clone());
        Ok(employee.and_then(|e| self.employee_details(e)))
    }

    async fn exists(&self, employee_id: EmployeeId) -> Result<bool, RecordError> {
        Ok(self.employees.contains_key(&employee_id))
    }

    async fn list_by_squad(&self, squad_id: SquadId) -> Result<Vec<Employee>, RecordError> {
        Ok(self.members(squad_id))
    }

    async fn create(&self, employee: &NewEmployee) -> Result<EmployeeDetails, RecordError> {
        let squad = self
            .squad(employee.squad_id)
            .ok_or(RecordError::SquadNotFound)?;
        let now = now_millis();
        let record = Employee {
            id: EmployeeId::new_v4(),
            name: employee.name.clone(),
            estimated_hours: employee.estimated_hours,
            squad_id: employee.squad_id,
            created_at: now,
            updated_at: now,
        };
        self.employees.insert(record.id, record.clone());
        Ok(EmployeeDetails::new(record, squad))
    }

    async fn update(
        &self,
        employee_id: EmployeeId,
        patch: &EmployeePatch,
    ) -> Result<Option<EmployeeDetails>, RecordError> {
        if let Some(squad_id) = patch.squad_id {
            if !self.squads.contains_key(&squad_id) {
                return Err(RecordError::SquadNotFound);
            }
        }
        let updated = self.employees.get_mut(&employee_id).map(|mut employee| {
            if let Some(name) = &patch.name {
                employee.name = name.clone();
            }
            if let Some(hours) = patch.estimated_hours {
                employee.estimated_hours = hours;
            }
            if let Some(squad_id) = patch.squad_id {
                employee.squad_id = squad_id;
            }
            employee.updated_at = now_millis();
            employee.clone()
        });
        Ok(updated.and_then(|e| self.employee_details(e)))
    }

    async fn delete(&self, employee_id: EmployeeId) -> Result<bool, RecordError> {
        if self.employees.remove(&employee_id).is_none() {
            return Ok(false);
        }
        self.remove_reports_of(&HashSet::from([employee_id]));
        Ok(true)
    }

    async fn count(&self) -> Result<i64, RecordError> {
        Ok(self.employees.len() as i64)
    }
}

#[async_trait::async_trait]
impl ReportRepo for MemoryStore {
    async fn list(&self) -> Result<Vec<ReportDetails>, RecordError> {
        let mut reports: Vec<Report> = self.reports.iter().map(|r| r.clone()).collect();
        reports.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(reports
            .into_iter()
            .filter_map(|report| self.report_details(report))
            .collect())
    }

    async fn create(&self, report: &NewReport) -> Result<ReportDetails, RecordError> {
        let employee = self
            .employees
            .get(&report.employee_id)
            .map(|e| e.clone())
            .ok_or(RecordError::EmployeeNotFound)?;
        let employee = self
            .employee_details(employee)
            .ok_or(RecordError::EmployeeNotFound)?;
        let record = Report {
            id: ReportId::new_v4(),
            description: report.description.clone(),
            employee_id: report.employee_id,
            spent_hours: report.spent_hours,
            created_at: now_millis(),
        };
        self.reports.insert(record.id, record.clone());
        Ok(ReportDetails::new(record, employee))
    }

    async fn list_by_squad_between(
        &self,
        squad_id: SquadId,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<Report>, RecordError> {
        let members: HashSet<EmployeeId> =
            self.members(squad_id).into_iter().map(|e| e.id).collect();
        let mut reports: Vec<Report> = self
            .reports
            .iter()
            .filter(|r| {
                members.contains(&r.employee_id) && r.created_at >= from && r.created_at <= to
            })
            .map(|r| r.clone())
            .collect();
        reports.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        Ok(reports)
    }

    async fn count(&self) -> Result<i64, RecordError> {
        Ok(self.reports.len() as i64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn squad_with(store: &MemoryStore, names: &[&str]) -> (SquadId, Vec<EmployeeId>) {
        let squad = SquadRepo::create(store, "Core").await.unwrap();
        let mut ids = Vec::new();
        for name in names {
            let employee = EmployeeRepo::create(
                store,
                &NewEmployee {
                    name: name.to_string(),
                    estimated_hours: 8,
                    squad_id: squad.id,
                },
            )
            .await
            .unwrap();
            ids.push(employee.id);
        }
        (squad.id, ids)
    }

    async fn log_hours(store: &MemoryStore, employee_id: EmployeeId, hours: i32) -> Report {
        let details = ReportRepo::create(
            store,
            &NewReport {
                description: "work".into(),
                employee_id,
                spent_hours: hours,
            },
        )
        .await
        .unwrap();
        Report {
            id: details.id,
            description: details.description,
            employee_id: details.employee_id,
            spent_hours: details.spent_hours,
            created_at: details.created_at,
        }
    }

    #[tokio::test]
    async fn emails_are_unique_ignoring_case() {
        let store = MemoryStore::new();
        UserRepo::create(&store, "ann@example.com", "Ann", "h").await.unwrap();

        assert!(matches!(
            UserRepo::create(&store, "ANN@example.com", "Ann", "h").await,
            Err(AuthError::UserExists)
        ));
        assert!(store.get_by_email("Ann@Example.com").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn rotate_only_succeeds_against_current_hash() {
        let store = MemoryStore::new();
        let user = UserRepo::create(&store, "ann@example.com", "Ann", "h").await.unwrap();
        store.set_refresh_hash(user.user_id, Some("a")).await.unwrap();

        assert!(store.rotate_refresh_hash(user.user_id, "a", "b").await.unwrap());
        assert!(!store.rotate_refresh_hash(user.user_id, "a", "c").await.unwrap());
        assert!(
            store
                .get_by_refresh_hash(user.user_id, "b")
                .await
                .unwrap()
                .is_some()
        );
    }

    #[tokio::test]
    async fn squads_are_listed_by_name_and_searchable() {
        let store = MemoryStore::new();
        for name in ["payments", "Core", "Platform"] {
            SquadRepo::create(&store, name).await.unwrap();
        }

        let all: Vec<String> = SquadRepo::list(&store, None)
            .await
            .unwrap()
            .into_iter()
            .map(|s| s.name)
            .collect();
        assert_eq!(all, vec!["Core", "payments", "Platform"]);

        let found = SquadRepo::list(&store, Some("PLAT")).await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].name, "Platform");
    }

    #[tokio::test]
    async fn deleting_a_squad_cascades() {
        let store = MemoryStore::new();
        let (squad_id, ids) = squad_with(&store, &["Ann", "Bob"]).await;
        let (_, others) = squad_with(&store, &["Cid"]).await;
        log_hours(&store, ids[0], 3).await;
        log_hours(&store, others[0], 2).await;

        assert!(SquadRepo::delete(&store, squad_id).await.unwrap());

        assert_eq!(EmployeeRepo::count(&store).await.unwrap(), 1);
        assert_eq!(ReportRepo::count(&store).await.unwrap(), 1);
        assert!(!SquadRepo::delete(&store, squad_id).await.unwrap());
    }

    #[tokio::test]
    async fn reports_between_are_bounded_and_oldest_first() {
        let store = MemoryStore::new();
        let (squad_id, ids) = squad_with(&store, &["Ann"]).await;
        let now = Utc::now();
        let early = log_hours(&store, ids[0], 1).await;
        let late = log_hours(&store, ids[0], 2).await;
        let outside = log_hours(&store, ids[0], 4).await;
        assert!(store.backdate_report(early.id, now - chrono::Duration::hours(2)));
        assert!(store.backdate_report(late.id, now - chrono::Duration::hours(1)));
        assert!(store.backdate_report(outside.id, now - chrono::Duration::days(3)));

        let got = store
            .list_by_squad_between(squad_id, now - chrono::Duration::days(1), now)
            .await
            .unwrap();

        assert_eq!(
            got.iter().map(|r| r.id).collect::<Vec<_>>(),
            vec![early.id, late.id]
        );
    }

    #[tokio::test]
    async fn employee_needs_existing_squad() {
        let store = MemoryStore::new();

        assert!(matches!(
            EmployeeRepo::create(
                &store,
                &NewEmployee {
                    name: "Ann".into(),
                    estimated_hours: 8,
                    squad_id: SquadId::new_v4(),
                }
            )
            .await,
            Err(RecordError::SquadNotFound)
        ));
    }
}
