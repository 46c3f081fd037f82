use crate::application_impl::cache_keys::{employee_key, squad_key};
use crate::application_port::CacheService;
use crate::domain_model::{EmployeeId, SquadId};
use futures_util::future::join_all;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceKind {
    Squad,
    Employee,
    Report,
}

/// Key families held in the cache. Each one records the resource kinds whose
/// data ends up embedded in its documents.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Namespace {
    Squad,
    Squads,
    Employee,
    Employees,
    Reports,
    Dashboard,
}

impl Namespace {
    pub const ALL: [Namespace; 6] = [
        Namespace::Squad,
        Namespace::Squads,
        Namespace::Employee,
        Namespace::Employees,
        Namespace::Reports,
        Namespace::Dashboard,
    ];

    pub fn pattern(self) -> &'static str {
        match self {
            Namespace::Squad => "squad:*",
            Namespace::Squads => "squads:*",
            Namespace::Employee => "employee:*",
            Namespace::Employees => "employees:*",
            Namespace::Reports => "reports:*",
            Namespace::Dashboard => "dashboard:*",
        }
    }

    pub fn depends_on(self) -> &'static [ResourceKind] {
        use ResourceKind::*;
        match self {
            Namespace::Squad | Namespace::Squads => &[Squad, Employee],
            Namespace::Employee | Namespace::Employees => &[Employee, Squad],
            Namespace::Reports => &[Report, Employee, Squad],
            Namespace::Dashboard => &[Squad, Employee, Report],
        }
    }

    /// Single-entity namespaces are keyed by the id of this kind.
    fn keyed_by(self) -> Option<ResourceKind> {
        match self {
            Namespace::Squad => Some(ResourceKind::Squad),
            Namespace::Employee => Some(ResourceKind::Employee),
            _ => None,
        }
    }
}

/// A committed write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mutation {
    SquadCreated,
    SquadUpdated(SquadId),
    SquadDeleted(SquadId),
    EmployeeCreated,
    EmployeeUpdated(EmployeeId),
    EmployeeDeleted(EmployeeId),
    ReportCreated,
}

impl Mutation {
    fn kind(self) -> ResourceKind {
        match self {
            Mutation::SquadCreated | Mutation::SquadUpdated(_) | Mutation::SquadDeleted(_) => {
                ResourceKind::Squad
            }
            Mutation::EmployeeCreated
            | Mutation::EmployeeUpdated(_)
            | Mutation::EmployeeDeleted(_) => ResourceKind::Employee,
            Mutation::ReportCreated => ResourceKind::Report,
        }
    }

    fn own_key(self) -> Option<String> {
        match self {
            Mutation::SquadUpdated(id) | Mutation::SquadDeleted(id) => Some(squad_key(id)),
            Mutation::EmployeeUpdated(id) | Mutation::EmployeeDeleted(id) => {
                Some(employee_key(id))
            }
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Invalidation {
    Key(String),
    Pattern(&'static str),
}

/// Everything that must be dropped after `mutation`. A namespace keyed by the
/// mutated kind only loses the mutated entity's own key (nothing, for a
/// creation); every other dependent namespace is dropped wholesale.
pub fn invalidation_plan(mutation: Mutation) -> Vec<Invalidation> {
    let kind = mutation.kind();
    let mut plan = Vec::new();
    for ns in Namespace::ALL {
        if !ns.depends_on().contains(&kind) {
            continue;
        }
        if ns.keyed_by() == Some(kind) {
            if let Some(key) = mutation.own_key() {
                plan.push(Invalidation::Key(key));
            }
        } else {
            plan.push(Invalidation::Pattern(ns.pattern()));
        }
    }
    plan
}

/// Apply the plan for `mutation`. Cache failures are absorbed by the cache
/// service; callers only invoke this after the write has succeeded.
pub async fn invalidate(cache: &dyn CacheService, mutation: Mutation) {
    let plan = invalidation_plan(mutation);
    debug!(?mutation, steps = plan.len(), "invalidating cache");
    join_all(plan.iter().map(|step| async move {
        match step {
            Invalidation::Key(key) => cache.delete(key).await,
            Invalidation::Pattern(pattern) => cache.delete_pattern(pattern).await,
        }
    }))
    .await;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application_impl::cache_keys::*;
    use crate::domain_model::ReportPeriod;
    use crate::infra_memory::glob_match;

    fn patterns(plan: &[Invalidation]) -> Vec<&'static str> {
        plan.iter()
            .filter_map(|step| match step {
                Invalidation::Pattern(p) => Some(*p),
                Invalidation::Key(_) => None,
            })
            .collect()
    }

    #[test]
    fn squad_update_drops_its_key_and_everything_embedding_squads() {
        let id = SquadId::new_v4();
        let plan = invalidation_plan(Mutation::SquadUpdated(id));

        assert!(plan.contains(&Invalidation::Key(squad_key(id))));
        assert_eq!(
            patterns(&plan),
            vec!["squads:*", "employee:*", "employees:*", "reports:*", "dashboard:*"]
        );
    }

    #[test]
    fn employee_creation_reaches_squads_and_reports() {
        let plan = invalidation_plan(Mutation::EmployeeCreated);

        assert_eq!(
            patterns(&plan),
            vec!["squad:*", "squads:*", "employees:*", "reports:*", "dashboard:*"]
        );
        assert!(!plan.iter().any(|s| matches!(s, Invalidation::Key(_))));
    }

    #[test]
    fn report_creation_only_touches_report_views() {
        let plan = invalidation_plan(Mutation::ReportCreated);

        assert_eq!(patterns(&plan), vec!["reports:*", "dashboard:*"]);
    }

    #[test]
    fn every_cache_key_falls_in_a_namespace() {
        let squad = SquadId::new_v4();
        let employee = EmployeeId::new_v4();
        let period = ReportPeriod::parse(Some("2024-01-01"), Some("2024-01-02")).unwrap();
        let keys = [
            squads_key(None),
            squads_key(Some("core")),
            squad_key(squad),
            employees_key(None),
            employees_key(Some("ann")),
            employee_key(employee),
            REPORTS_ALL_KEY.to_string(),
            squad_report_key(squad, SquadMetric::MemberHours, &period),
            squad_report_key(squad, SquadMetric::TotalHours, &period),
            squad_report_key(squad, SquadMetric::AverageHours, &period),
            DASHBOARD_KEY.to_string(),
        ];

        for key in keys {
            let owners: Vec<_> = Namespace::ALL
                .iter()
                .filter(|ns| glob_match(ns.pattern(), &key))
                .collect();
            assert_eq!(owners.len(), 1, "{key} matched {owners:?}");
        }
    }

    #[test]
    fn every_mutation_invalidates_the_dashboard_when_counts_can_change() {
        for mutation in [
            Mutation::SquadCreated,
            Mutation::SquadDeleted(SquadId::new_v4()),
            Mutation::EmployeeCreated,
            Mutation::EmployeeDeleted(EmployeeId::new_v4()),
            Mutation::ReportCreated,
        ] {
            assert!(
                patterns(&invalidation_plan(mutation)).contains(&"dashboard:*"),
                "{mutation:?}"
            );
        }
    }
}
