use crate::application_impl::cache_aside::read_through;
use crate::application_impl::cache_invalidation::{Mutation, invalidate};
use crate::application_impl::cache_keys::{
    DASHBOARD_KEY, DASHBOARD_TTL_SECS, REPORT_TTL_SECS, REPORTS_ALL_KEY, SquadMetric,
    squad_report_key,
};
use crate::application_port::{
    CacheService, Cached, PeriodInput, RecordError, ReportInput, ReportService,
};
use crate::domain_model::*;
use crate::domain_port::{EmployeeRepo, ReportRepo, SquadRepo};
use futures_util::future::try_join3;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::info;

pub struct RealReportService {
    report_repo: Arc<dyn ReportRepo>,
    employee_repo: Arc<dyn EmployeeRepo>,
    squad_repo: Arc<dyn SquadRepo>,
    cache: Arc<dyn CacheService>,
}

impl RealReportService {
    pub fn new(
        report_repo: Arc<dyn ReportRepo>,
        employee_repo: Arc<dyn EmployeeRepo>,
        squad_repo: Arc<dyn SquadRepo>,
        cache: Arc<dyn CacheService>,
    ) -> Self {
        RealReportService {
            report_repo,
            employee_repo,
            squad_repo,
            cache,
        }
    }

    async fn squad_name(&self, squad_id: SquadId) -> Result<String, RecordError> {
        self.squad_repo
            .get(squad_id)
            .await?
            .map(|squad| squad.name)
            .ok_or(RecordError::SquadNotFound)
    }

    async fn squad_hours(
        &self,
        squad_id: SquadId,
        period: &ReportPeriod,
    ) -> Result<SquadTotalHours, RecordError> {
        let squad_name = self.squad_name(squad_id).await?;
        let reports = self
            .report_repo
            .list_by_squad_between(squad_id, period.starts_at(), period.ends_at())
            .await?;
        Ok(SquadTotalHours {
            squad_id,
            squad_name,
            period: *period,
            total_hours: total_spent_hours(&reports),
        })
    }
}

fn parse_period(input: &PeriodInput) -> Result<ReportPeriod, RecordError> {
    ReportPeriod::parse(input.start_date.as_deref(), input.end_date.as_deref())
        .ok_or(RecordError::InvalidPeriod)
}

/// One entry per member, in member order, including members without reports.
fn member_hours(employees: Vec<Employee>, reports: Vec<Report>) -> Vec<MemberHours> {
    let mut by_employee: HashMap<EmployeeId, Vec<Report>> = HashMap::new();
    for report in reports {
        by_employee.entry(report.employee_id).or_default().push(report);
    }
    employees
        .into_iter()
        .map(|employee| {
            let reports = by_employee.remove(&employee.id).unwrap_or_default();
            MemberHours {
                id: employee.id,
                name: employee.name,
                estimated_hours: employee.estimated_hours,
                total_spent_hours: total_spent_hours(&reports),
                reports,
            }
        })
        .collect()
}

#[async_trait::async_trait]
impl ReportService for RealReportService {
    async fn list(&self) -> Result<Cached<Vec<ReportDetails>>, RecordError> {
        read_through(self.cache.as_ref(), REPORTS_ALL_KEY, REPORT_TTL_SECS, || {
            self.report_repo.list()
        })
        .await
    }

    async fn create(&self, input: ReportInput) -> Result<ReportDetails, RecordError> {
        let description = input
            .description
            .map(|d| d.trim().to_string())
            .filter(|d| !d.is_empty());
        let (Some(description), Some(employee_id), Some(spent_hours)) =
            (description, input.employee_id, input.spent_hours)
        else {
            return Err(RecordError::ReportFieldsRequired);
        };
        if spent_hours <= 0 {
            return Err(RecordError::ReportFieldsRequired);
        }
        if !self.employee_repo.exists(employee_id).await? {
            return Err(RecordError::EmployeeNotFound);
        }

        let report = self
            .report_repo
            .create(&NewReport {
                description,
                employee_id,
                spent_hours,
            })
            .await?;
        invalidate(self.cache.as_ref(), Mutation::ReportCreated).await;
        info!(report_id = %report.id, %employee_id, spent_hours, "report created");
        Ok(report)
    }

    async fn squad_member_hours(
        &self,
        squad_id: SquadId,
        period: PeriodInput,
    ) -> Result<Cached<Vec<MemberHours>>, RecordError> {
        let period = parse_period(&period)?;
        let key = squad_report_key(squad_id, SquadMetric::MemberHours, &period);
        read_through(self.cache.as_ref(), &key, REPORT_TTL_SECS, || async {
            let employees = self.employee_repo.list_by_squad(squad_id).await?;
            let reports = self
                .report_repo
                .list_by_squad_between(squad_id, period.starts_at(), period.ends_at())
                .await?;
            Ok(member_hours(employees, reports))
        })
        .await
    }

    async fn squad_total_hours(
        &self,
        squad_id: SquadId,
        period: PeriodInput,
    ) -> Result<Cached<SquadTotalHours>, RecordError> {
        let period = parse_period(&period)?;
        let key = squad_report_key(squad_id, SquadMetric::TotalHours, &period);
        read_through(self.cache.as_ref(), &key, REPORT_TTL_SECS, || {
            self.squad_hours(squad_id, &period)
        })
        .await
    }

    async fn squad_average_hours(
        &self,
        squad_id: SquadId,
        period: PeriodInput,
    ) -> Result<Cached<SquadAverageHours>, RecordError> {
        let period = parse_period(&period)?;
        let key = squad_report_key(squad_id, SquadMetric::AverageHours, &period);
        read_through(self.cache.as_ref(), &key, REPORT_TTL_SECS, || async {
            let totals = self.squad_hours(squad_id, &period).await?;
            let total_days = period.total_days();
            Ok(SquadAverageHours {
                squad_id,
                squad_name: totals.squad_name,
                period,
                total_hours: totals.total_hours,
                total_days,
                average_hours_per_day: round_hundredths(
                    totals.total_hours as f64 / total_days as f64,
                ),
            })
        })
        .await
    }

    async fn dashboard(&self) -> Result<Cached<DashboardStats>, RecordError> {
        read_through(self.cache.as_ref(), DASHBOARD_KEY, DASHBOARD_TTL_SECS, || async {
            let (total_employees, total_squads, total_reports) = try_join3(
                self.employee_repo.count(),
                self.squad_repo.count(),
                self.report_repo.count(),
            )
            .await?;
            Ok(DashboardStats {
                total_employees,
                total_squads,
                total_reports,
            })
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application_impl::RealCacheService;
    use crate::infra_memory::{MemoryCacheStore, MemoryStore};
    use chrono::{Duration, NaiveDate, Utc};

    struct Fixture {
        store: Arc<MemoryStore>,
        reports: RealReportService,
    }

    async fn fixture() -> Fixture {
        let store = Arc::new(MemoryStore::new());
        let cache = Arc::new(RealCacheService::new(Arc::new(MemoryCacheStore::new())));
        assert!(cache.connect().await);
        Fixture {
            reports: RealReportService::new(store.clone(), store.clone(), store.clone(), cache),
            store,
        }
    }

    async fn seed_squad(f: &Fixture, members: &[(&str, i32)]) -> (SquadId, Vec<EmployeeId>) {
        let squad = SquadRepo::create(f.store.as_ref(), "Core").await.unwrap();
        let mut ids = Vec::new();
        for (name, hours) in members {
            let employee = EmployeeRepo::create(
                f.store.as_ref(),
                &NewEmployee {
                    name: name.to_string(),
                    estimated_hours: *hours,
                    squad_id: squad.id,
                },
            )
            .await
            .unwrap();
            ids.push(employee.id);
        }
        (squad.id, ids)
    }

    fn report(employee_id: EmployeeId, hours: i32) -> ReportInput {
        ReportInput {
            description: Some("work".into()),
            employee_id: Some(employee_id),
            spent_hours: Some(hours),
        }
    }

    fn period(start: NaiveDate, end: NaiveDate) -> PeriodInput {
        PeriodInput {
            start_date: Some(start.format(DATE_FORMAT).to_string()),
            end_date: Some(end.format(DATE_FORMAT).to_string()),
        }
    }

    fn today() -> NaiveDate {
        Utc::now().date_naive()
    }

    #[tokio::test]
    async fn create_validates_fields_and_employee() {
        let f = fixture().await;
        let (_, ids) = seed_squad(&f, &[("Ann", 8)]).await;

        assert!(matches!(
            f.reports.create(ReportInput::default()).await,
            Err(RecordError::ReportFieldsRequired)
        ));
        assert!(matches!(
            f.reports.create(report(ids[0], 0)).await,
            Err(RecordError::ReportFieldsRequired)
        ));
        assert!(matches!(
            f.reports.create(report(EmployeeId::new_v4(), 2)).await,
            Err(RecordError::EmployeeNotFound)
        ));
        let created = f.reports.create(report(ids[0], 2)).await.unwrap();
        assert_eq!(created.employee.name, "Ann");
        assert_eq!(created.employee.squad.name, "Core");
    }

    #[tokio::test]
    async fn period_must_be_present_and_ordered() {
        let f = fixture().await;
        let (squad_id, _) = seed_squad(&f, &[]).await;

        assert!(matches!(
            f.reports
                .squad_total_hours(squad_id, PeriodInput::default())
                .await,
            Err(RecordError::InvalidPeriod)
        ));
        assert!(matches!(
            f.reports
                .squad_average_hours(squad_id, period(today(), today() - Duration::days(1)))
                .await,
            Err(RecordError::InvalidPeriod)
        ));
    }

    #[tokio::test]
    async fn member_hours_lists_every_member_and_only_in_period_reports() {
        let f = fixture().await;
        let (squad_id, ids) = seed_squad(&f, &[("Ann", 8), ("Bob", 6)]).await;
        f.reports.create(report(ids[0], 3)).await.unwrap();
        f.reports.create(report(ids[0], 4)).await.unwrap();
        let old = f.reports.create(report(ids[0], 9)).await.unwrap();
        assert!(
            f.store
                .backdate_report(old.id, Utc::now() - Duration::days(30))
        );

        let got = f
            .reports
            .squad_member_hours(squad_id, period(today() - Duration::days(1), today()))
            .await
            .unwrap()
            .value;

        assert_eq!(got.len(), 2);
        assert_eq!(got[0].name, "Ann");
        assert_eq!(got[0].total_spent_hours, 7);
        assert_eq!(got[0].reports.len(), 2);
        assert_eq!(got[1].name, "Bob");
        assert_eq!(got[1].total_spent_hours, 0);
        assert!(got[1].reports.is_empty());
    }

    #[tokio::test]
    async fn member_hours_of_unknown_squad_is_empty() {
        let f = fixture().await;

        let got = f
            .reports
            .squad_member_hours(SquadId::new_v4(), period(today(), today()))
            .await
            .unwrap();

        assert!(got.value.is_empty());
    }

    #[tokio::test]
    async fn totals_and_average_over_inclusive_days() {
        let f = fixture().await;
        let (squad_id, ids) = seed_squad(&f, &[("Ann", 8), ("Bob", 6)]).await;
        f.reports.create(report(ids[0], 5)).await.unwrap();
        f.reports.create(report(ids[1], 5)).await.unwrap();
        let window = period(today() - Duration::days(2), today());

        let total = f
            .reports
            .squad_total_hours(squad_id, window.clone())
            .await
            .unwrap()
            .value;
        let average = f
            .reports
            .squad_average_hours(squad_id, window)
            .await
            .unwrap()
            .value;

        assert_eq!(total.total_hours, 10);
        assert_eq!(total.squad_name, "Core");
        assert_eq!(average.total_days, 3);
        assert_eq!(average.average_hours_per_day, 3.33);
    }

    #[tokio::test]
    async fn totals_of_unknown_squad_are_not_found() {
        let f = fixture().await;
        let window = period(today(), today());

        assert!(matches!(
            f.reports
                .squad_total_hours(SquadId::new_v4(), window.clone())
                .await,
            Err(RecordError::SquadNotFound)
        ));
        assert!(matches!(
            f.reports.squad_average_hours(SquadId::new_v4(), window).await,
            Err(RecordError::SquadNotFound)
        ));
    }

    #[tokio::test]
    async fn new_report_refreshes_cached_aggregates() {
        let f = fixture().await;
        let (squad_id, ids) = seed_squad(&f, &[("Ann", 8)]).await;
        let window = period(today(), today());
        let before = f
            .reports
            .squad_total_hours(squad_id, window.clone())
            .await
            .unwrap();
        assert_eq!(before.value.total_hours, 0);
        assert!(f.reports.dashboard().await.unwrap().value.total_reports == 0);

        f.reports.create(report(ids[0], 6)).await.unwrap();

        let after = f
            .reports
            .squad_total_hours(squad_id, window)
            .await
            .unwrap();
        assert!(!after.hit);
        assert_eq!(after.value.total_hours, 6);
        let stats = f.reports.dashboard().await.unwrap();
        assert!(!stats.hit);
        assert_eq!(
            stats.value,
            DashboardStats {
                total_employees: 1,
                total_squads: 1,
                total_reports: 1,
            }
        );
    }

    #[tokio::test]
    async fn report_list_is_newest_first_and_cached() {
        let f = fixture().await;
        let (_, ids) = seed_squad(&f, &[("Ann", 8)]).await;
        let first = f.reports.create(report(ids[0], 1)).await.unwrap();
        assert!(
            f.store
                .backdate_report(first.id, Utc::now() - Duration::hours(1))
        );
        let second = f.reports.create(report(ids[0], 2)).await.unwrap();

        let listed = f.reports.list().await.unwrap();
        assert!(!listed.hit);
        assert_eq!(
            listed.value.iter().map(|r| r.id).collect::<Vec<_>>(),
            vec![second.id, first.id]
        );
        assert!(f.reports.list().await.unwrap().hit);
    }
}
