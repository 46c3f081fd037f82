use crate::domain_model::{EmployeeId, ReportPeriod, SquadId};

pub const ENTITY_TTL_SECS: u64 = 300;
pub const REPORT_TTL_SECS: u64 = 180;
pub const DASHBOARD_TTL_SECS: u64 = 600;

pub const REPORTS_ALL_KEY: &str = "reports:all";
pub const DASHBOARD_KEY: &str = "dashboard:stats";

/// Blank search terms mean "no filter".
pub fn normalize_search(search: Option<&str>) -> Option<&str> {
    search.map(str::trim).filter(|term| !term.is_empty())
}

pub fn squads_key(search: Option<&str>) -> String {
    match search {
        Some(term) => format!("squads:search:{term}"),
        None => "squads:all".to_string(),
    }
}

pub fn squad_key(squad_id: SquadId) -> String {
    format!("squad:{squad_id}")
}

pub fn employees_key(search: Option<&str>) -> String {
    match search {
        Some(term) => format!("employees:search:{term}"),
        None => "employees:all".to_string(),
    }
}

pub fn employee_key(employee_id: EmployeeId) -> String {
    format!("employee:{employee_id}")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SquadMetric {
    MemberHours,
    TotalHours,
    AverageHours,
}

impl SquadMetric {
    fn as_str(self) -> &'static str {
        match self {
            SquadMetric::MemberHours => "member-hours",
            SquadMetric::TotalHours => "total-hours",
            SquadMetric::AverageHours => "average-hours",
        }
    }
}

pub fn squad_report_key(squad_id: SquadId, metric: SquadMetric, period: &ReportPeriod) -> String {
    format!("reports:squad:{squad_id}:{}:{period}", metric.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn search_terms_are_trimmed_and_blank_means_all() {
        assert_eq!(normalize_search(Some("  ops ")), Some("ops"));
        assert_eq!(normalize_search(Some("   ")), None);
        assert_eq!(squads_key(normalize_search(Some(""))), "squads:all");
        assert_eq!(employees_key(Some("ann")), "employees:search:ann");
    }

    #[test]
    fn report_keys_embed_squad_metric_and_period() {
        let squad = SquadId(uuid::Uuid::nil());
        let period = ReportPeriod::parse(Some("2024-01-01"), Some("2024-01-31")).unwrap();

        assert_eq!(
            squad_report_key(squad, SquadMetric::AverageHours, &period),
            "reports:squad:00000000-0000-0000-0000-000000000000:average-hours:2024-01-01:2024-01-31"
        );
    }
}
